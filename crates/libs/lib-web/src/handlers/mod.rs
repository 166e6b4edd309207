//! # HTTP Request Handlers
//!
//! Axum handlers for the `/api/v1` surface, grouped by feature. Handlers only
//! extract, delegate to [`crate::services`] and shape the response; business
//! rules live in the services.
//!
//! ## Handler Modules
//!
//! - **[`auth`]**: registration, login and the admin probe
//!   - `POST /api/v1/auth/register`
//!   - `POST /api/v1/auth/login`
//!   - `GET /api/v1/auth/manage_users` (`manage_users`)
//!
//! - **[`listings`]**: the catalog and buying
//!   - `GET /api/v1/listings?page=&per_page=`
//!   - `GET /api/v1/listings/{id}`
//!   - `POST /api/v1/listings` (auth)
//!   - `POST /api/v1/listings/{id}/buy` (auth)
//!   - `DELETE /api/v1/listings/{id}` (auth, owner or `manage_listings`)
//!
//! - **[`users`]**: profile, wallet and user administration
//!   - `GET /api/v1/users/me`, `/me/listings`, `/me/purchases` (auth)
//!   - `POST /api/v1/users/wallet/deposit`, `/wallet/withdraw` (auth)
//!   - `DELETE /api/v1/users/{id}` (`manage_users`)
//!   - `POST /api/v1/users/{id}/roles` (`manage_roles`)
//!
//! ## Handler Architecture
//!
//! ```rust,ignore
//! async fn handler(
//!     State(db): State<DbPool>,              // Shared state
//!     Extension(claims): Extension<Claims>,  // JWT auth
//!     Json(payload): Json<RequestBody>,      // Request body
//! ) -> Result<Json<Response>, AppError> {
//!     // Handler logic...
//!     Ok(Json(response))
//! }
//! ```
//!
//! Errors are returned as [`AppError`], which renders itself as
//! `{"error": ..., "code": ...}` with the matching status.

pub mod auth;
pub mod listings;
pub mod users;

use crate::services::IdentityService;
use axum::extract::State;
use lib_auth::Claims;
use lib_core::model::store::models::User;
use lib_core::{AppError, DbPool};

/// Resolve the token subject to a user row.
///
/// A valid token can outlive its user, so this is never assumed to succeed.
pub(crate) async fn current_user(db: &DbPool, claims: &Claims) -> Result<User, AppError> {
    IdentityService::new(db.clone()).find_by_email(&claims.sub).await
}

/// `GET /health` - liveness plus a round trip to the database.
pub async fn health(State(db): State<DbPool>) -> Result<&'static str, AppError> {
    sqlx::query("SELECT 1").execute(&db).await?;
    Ok("OK")
}
