//! # Core Library
//!
//! Configuration, error taxonomy, money type, persistent store (models and
//! repositories) and wire DTOs for the marketplace.

pub mod config;
pub mod dto;
pub mod error;
pub mod model;

// Re-export commonly used types
pub use config::Config;
pub use error::{AppError, Result};
pub use model::money::Money;
pub use model::store::{create_pool, run_migrations, DbPool};
