//! # Authentication Middleware
//!
//! Axum middleware for bearer-token validation.
//!
//! This middleware extracts and validates the JWT from the `Authorization`
//! header, then injects the verified [`Claims`] into the request extensions.
//! The signing secret comes from the [`Config`] passed as middleware state.
//!
//! ## Usage
//!
//! ```rust,no_run
//! use axum::{middleware::from_fn_with_state, routing::get, Extension, Router};
//! use lib_auth::Claims;
//! use lib_core::Config;
//! use lib_web::middleware::require_auth;
//!
//! async fn protected_handler(Extension(claims): Extension<Claims>) -> String {
//!     format!("Hello, {}!", claims.sub)
//! }
//!
//! # fn build(config: Config) -> Router {
//! Router::new()
//!     .route("/protected", get(protected_handler))
//!     .route_layer(from_fn_with_state(config, require_auth))
//! # }
//! ```

use axum::{
    extract::{Request, State},
    http::header::AUTHORIZATION,
    middleware::Next,
    response::Response,
};
use lib_auth::TokenCodec;
use lib_core::{AppError, Config};
use tracing::{debug, warn};

/// Authentication middleware that validates JWT tokens.
///
/// # Behavior
///
/// - **Valid token**: Continues with `Claims` in extensions
/// - **Missing, malformed, forged or expired token**: `401 Unauthenticated`
pub async fn require_auth(
    State(config): State<Config>,
    mut req: Request,
    next: Next,
) -> Result<Response, AppError> {
    let auth_header = req
        .headers()
        .get(AUTHORIZATION)
        .and_then(|h| h.to_str().ok())
        .ok_or_else(|| {
            warn!("[AUTH] Missing Authorization header");
            AppError::Unauthenticated("Missing Authorization header.".to_string())
        })?;

    let token = auth_header.strip_prefix("Bearer ").ok_or_else(|| {
        warn!("[AUTH] Invalid Authorization header format");
        AppError::Unauthenticated("Authorization header must be 'Bearer <token>'.".to_string())
    })?;

    let codec = TokenCodec::new(config.jwt_secret.as_str(), config.jwt_expiration_hours);
    let claims = codec.verify(token.trim()).map_err(|e| {
        warn!("[AUTH] JWT validation failed: {}", e);
        AppError::Unauthenticated("Invalid or expired token.".to_string())
    })?;

    debug!("[AUTH] Authenticated: {} (roles: {:?})", claims.sub, claims.roles);

    req.extensions_mut().insert(claims);

    Ok(next.run(req).await)
}
