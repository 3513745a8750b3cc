//! Core types for the TinyHumans memory API.
//!
//! Request/response DTOs mirror the JSON the memory service speaks; everything here is pure
//! (no I/O) and shared by the async and blocking clients.

mod context;
mod dto;
mod envelope;
mod error;
mod normalize;
mod validate;

pub use context::{format_context, truncate_items};
pub use dto::*;
pub use envelope::parse_envelope;
pub use error::{Result, TinyHumansError};
pub use normalize::{normalize_items, IngestItem, IngestPayload};
pub use validate::{validate_timestamps, validate_timestamps_at, MAX_FUTURE_SECS};
