//! # Authentication Handlers
//!
//! HTTP request handlers for account creation and login.
//!
//! ## Overview
//!
//! - Registration with username, email and password
//! - Login with email and password, answered with a bearer token
//! - A probe endpoint that only users with `manage_users` can reach
//!
//! ## Example
//!
//! ```rust,no_run
//! use axum::{Router, routing::post};
//! use lib_web::handlers::auth::{register, login};
//! use lib_web::AppState;
//!
//! let app: Router<AppState> = Router::new()
//!     .route("/register", post(register))
//!     .route("/login", post(login));
//! ```

use crate::services::IdentityService;
use axum::{
    extract::{Json, State},
    http::StatusCode,
};
use lib_auth::TokenCodec;
use lib_core::dto::{LoginRequest, LoginResponse, MessageResponse, RegisterRequest, RegisterResponse};
use lib_core::{AppError, Config, DbPool};
use tracing::{error, info, instrument};

/// Register handler - creates a new account with the default `User` role.
///
/// # Returns
///
/// * `201 Created` with [`RegisterResponse`]
/// * `400` for invalid username, email or password
/// * `409` if the username or email is already registered
#[instrument(skip(pool, req), fields(username = %req.username, email = %req.email))]
pub async fn register(
    State(pool): State<DbPool>,
    Json(req): Json<RegisterRequest>,
) -> Result<(StatusCode, Json<RegisterResponse>), AppError> {
    info!("[REGISTER] New registration request");

    let user = IdentityService::new(pool)
        .register(&req.username, &req.email, &req.password)
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(RegisterResponse {
            message: "Registered successfully.".to_string(),
            user_id: user.id,
        }),
    ))
}

/// Login handler - exchanges email and password for a bearer token.
///
/// The token carries the user's email and current role names and expires
/// after `jwt_expiration_hours`.
///
/// # Returns
///
/// * `200 OK` with [`LoginResponse`]
/// * `401` with "Invalid email or password." for any credential mismatch
#[instrument(skip(pool, config, req), fields(email = %req.email))]
pub async fn login(
    State(pool): State<DbPool>,
    State(config): State<Config>,
    Json(req): Json<LoginRequest>,
) -> Result<Json<LoginResponse>, AppError> {
    let identity = IdentityService::new(pool)
        .authenticate(&req.email, &req.password)
        .await?;

    let token = TokenCodec::new(config.jwt_secret.as_str(), config.jwt_expiration_hours)
        .issue(&identity.user.email, identity.roles)
        .map_err(|e| {
            error!("[LOGIN] Token issuance failed: {}", e);
            AppError::Internal("Failed to generate token".to_string())
        })?;

    info!(user_id = identity.user.id, "[LOGIN] Logged in");
    Ok(Json(LoginResponse {
        message: "Logged in successfully.".to_string(),
        token,
    }))
}

/// Probe for the `manage_users` permission; the guard does the work.
pub async fn manage_users() -> Json<MessageResponse> {
    Json(MessageResponse::new("You have access to manage users."))
}

#[cfg(test)]
mod tests;
