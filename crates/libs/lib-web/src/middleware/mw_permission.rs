//! # Permission Guard Middleware
//!
//! Gates a route on a named permission, checked against the live store.
//!
//! The guard must sit inside [`require_auth`](super::require_auth): it reads
//! the verified [`Claims`] that middleware leaves in the request extensions.
//! With axum's `route_layer`, the layer added last runs first, so add the
//! guard before the authentication layer:
//!
//! ```rust,no_run
//! use axum::{middleware::from_fn_with_state, routing::delete, Router};
//! use lib_web::middleware::{require_auth, require_permission, PermissionGuard};
//! # async fn delete_user() {}
//! # fn build(db: lib_core::DbPool, config: lib_core::Config) -> Router {
//! Router::new()
//!     .route("/users/{id}", delete(delete_user))
//!     .route_layer(from_fn_with_state(
//!         PermissionGuard::new(db, "manage_users"),
//!         require_permission,
//!     ))
//!     .route_layer(from_fn_with_state(config, require_auth))
//! # }
//! ```

use crate::services::{AuthorizationService, IdentityService};
use axum::{
    extract::{Request, State},
    middleware::Next,
    response::Response,
};
use lib_auth::Claims;
use lib_core::{AppError, DbPool};
use tracing::debug;

/// Middleware state: the store to resolve against and the permission required.
#[derive(Clone)]
pub struct PermissionGuard {
    pub db: DbPool,
    pub permission: &'static str,
}

impl PermissionGuard {
    pub fn new(db: DbPool, permission: &'static str) -> Self {
        Self { db, permission }
    }
}

/// Reject the request unless the token's subject currently holds the
/// guard's permission.
///
/// - No verified claims: `401 Unauthenticated`
/// - Subject no longer exists: `404 NotFound`
/// - Permission missing: `403 Forbidden`
pub async fn require_permission(
    State(guard): State<PermissionGuard>,
    req: Request,
    next: Next,
) -> Result<Response, AppError> {
    let email = req
        .extensions()
        .get::<Claims>()
        .map(|claims| claims.sub.clone())
        .ok_or_else(|| AppError::Unauthenticated("Authentication required.".to_string()))?;

    let user = IdentityService::new(guard.db.clone())
        .find_by_email(&email)
        .await?;
    AuthorizationService::new(guard.db)
        .require_permission(&user, guard.permission)
        .await?;

    debug!("[AUTHZ] {} granted '{}'", email, guard.permission);
    Ok(next.run(req).await)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::setup_test_db;
    use axum::{body::Body, http::StatusCode, middleware::from_fn_with_state, routing::get, Router};
    use tower::ServiceExt;

    #[tokio::test]
    async fn test_guard_without_claims_is_unauthenticated() {
        let pool = setup_test_db().await;
        let app = Router::new()
            .route("/admin", get(|| async { "ok" }))
            .route_layer(from_fn_with_state(
                PermissionGuard::new(pool, "manage_users"),
                require_permission,
            ));

        let response = app
            .oneshot(
                axum::http::Request::builder()
                    .uri("/admin")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }
}
