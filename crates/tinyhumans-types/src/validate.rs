//! Timestamp checks applied before an item reaches the network.

use std::time::{SystemTime, UNIX_EPOCH};

use crate::error::{Result, TinyHumansError};

/// Upper bound on how far in the future a timestamp may be (100 years, in seconds).
pub const MAX_FUTURE_SECS: f64 = 100.0 * 365.25 * 24.0 * 60.0 * 60.0;

/// Validate optional created/updated Unix-second timestamps against the current time.
pub fn validate_timestamps(created_at: Option<f64>, updated_at: Option<f64>) -> Result<()> {
    let now = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs_f64())
        .unwrap_or(0.0);
    validate_timestamps_at(created_at, updated_at, now)
}

/// Same as [`validate_timestamps`] with an explicit `now`.
///
/// Order: `created_at` alone, `updated_at` alone, then `updated_at >= created_at`.
pub fn validate_timestamps_at(
    created_at: Option<f64>,
    updated_at: Option<f64>,
    now: f64,
) -> Result<()> {
    if let Some(ts) = created_at {
        check_one("created_at", ts, now)?;
    }
    if let Some(ts) = updated_at {
        check_one("updated_at", ts, now)?;
    }
    if let (Some(created), Some(updated)) = (created_at, updated_at) {
        if updated < created {
            return Err(TinyHumansError::invalid(format!(
                "updated_at ({updated}) must be >= created_at ({created})"
            )));
        }
    }
    Ok(())
}

fn check_one(field: &str, ts: f64, now: f64) -> Result<()> {
    if !ts.is_finite() {
        return Err(TinyHumansError::invalid(format!(
            "{field} must be a finite number, got {ts}"
        )));
    }
    if ts < 0.0 {
        return Err(TinyHumansError::invalid(format!(
            "{field} must be a non-negative Unix timestamp, got {ts}"
        )));
    }
    if ts > now + MAX_FUTURE_SECS {
        return Err(TinyHumansError::invalid(format!(
            "{field} ({ts}) is more than 100 years in the future"
        )));
    }
    Ok(())
}
