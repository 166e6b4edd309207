//! # Data Transfer Objects (DTOs)
//!
//! This module contains all data structures exchanged with clients over the
//! REST API. Domain models never cross the HTTP boundary directly; handlers
//! convert them into these types first.

pub mod auth;
pub mod listing;
pub mod wallet;

pub use auth::*;
pub use listing::*;
pub use wallet::*;
