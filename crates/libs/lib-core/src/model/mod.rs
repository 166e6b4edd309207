//! # Model
//!
//! Domain value types and the persistent store.

pub mod money;
pub mod store;
