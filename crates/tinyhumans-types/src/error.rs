//! Error taxonomy shared by every client and the LLM bridge.

/// All errors are returned to the immediate caller; nothing is retried or swallowed.
#[derive(Debug, thiserror::Error)]
pub enum TinyHumansError {
    /// Caller misuse detected locally; no request was sent.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// The exchange itself failed: non-JSON body, unexpected envelope, connect error or timeout.
    #[error("transport error: {message}")]
    Transport {
        message: String,
        status: Option<u16>,
        body: String,
    },

    /// The memory service or an LLM provider answered with a failure status.
    #[error("{message}")]
    Api {
        message: String,
        status: u16,
        body: serde_json::Value,
    },
}

impl TinyHumansError {
    pub fn invalid(msg: impl Into<String>) -> Self {
        Self::InvalidArgument(msg.into())
    }

    /// HTTP status, when a response was received.
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::InvalidArgument(_) => None,
            Self::Transport { status, .. } => *status,
            Self::Api { status, .. } => Some(*status),
        }
    }

    pub fn is_invalid_argument(&self) -> bool {
        matches!(self, Self::InvalidArgument(_))
    }
}

pub type Result<T> = std::result::Result<T, TinyHumansError>;
