//! # Time Utilities
//!
//! A single clock for timestamps written to the store.

use chrono::{DateTime, Utc};

/// Get current UTC time.
pub fn now_utc() -> DateTime<Utc> {
    Utc::now()
}
