//! # Services Layer
//!
//! This module contains the business logic of the marketplace, sitting between
//! the HTTP handlers and the repositories in `lib_core::model::store`.
//!
//! ## Architecture
//!
//! ```text
//! Handlers (HTTP) → Services (Business Logic) → Repositories → SQLite
//! ```
//!
//! ## Module Organization
//!
//! - [`identity`] - Registration, authentication, user administration
//! - [`authorization`] - Permission resolution and checks
//! - [`catalog`] - Listing creation, browsing and removal
//! - [`ledger`] - Purchases, deposits and withdrawals
//!
//! ## Service Pattern
//!
//! Services are cheap-to-clone structs holding a `DbPool`. Handlers build one
//! per request from state:
//!
//! ```rust,no_run
//! use lib_web::services::LedgerService;
//! # async fn example(db: lib_core::DbPool) -> Result<(), lib_core::AppError> {
//! let ledger = LedgerService::new(db);
//! let balance = ledger.deposit(1, lib_core::Money::from_cents(10_000)).await?;
//! # Ok(())
//! # }
//! ```
//!
//! ## Error Handling
//!
//! All services return `Result<T, AppError>`. Repository errors are converted
//! with `?`, domain failures are returned as the matching `AppError` variant.

pub mod authorization;
pub mod catalog;
pub mod identity;
pub mod ledger;

// Re-export services for convenience
pub use authorization::{AuthorizationService, PermissionSet};
pub use catalog::CatalogService;
pub use identity::{Identity, IdentityService};
pub use ledger::{LedgerService, Receipt};
