//! # Middleware
//!
//! Axum middleware for request stamping, logging, authentication and
//! permission checks.
//!
//! ## Modules
//!
//! - **[`mw_req_stamp`]**: Request ID and start time
//! - **[`mw_logging`]**: Structured request/response logging
//! - **[`mw_auth`]**: JWT authentication
//! - **[`mw_permission`]**: Live permission guard, runs after authentication

// region: --- Modules
pub mod mw_auth;
pub mod mw_logging;
pub mod mw_permission;
pub mod mw_req_stamp;
// endregion: --- Modules

// region: --- Re-exports
pub use mw_auth::require_auth;
pub use mw_logging::log_requests;
pub use mw_permission::{require_permission, PermissionGuard};
pub use mw_req_stamp::{stamp_req, RequestStamp};
// endregion: --- Re-exports
