//! # Authentication Data Transfer Objects
//!
//! Defines request and response structures for the authentication and
//! user-profile endpoints.
//!
//! ## Endpoints Using These DTOs
//!
//! - `POST /api/v1/auth/register` - [`RegisterRequest`] -> [`RegisterResponse`]
//! - `POST /api/v1/auth/login` - [`LoginRequest`] -> [`LoginResponse`]
//! - `GET /api/v1/users/me` - [`UserInfo`]
//! - `POST /api/v1/users/{id}/roles` - [`AssignRoleRequest`] -> [`MessageResponse`]
//!
//! ## Wire Format
//!
//! All DTOs use **snake_case** field names in JSON (default serde behavior).
//! Money values are rendered as decimal strings (`"50.00"`).
//!
//! ## Login Flow Example
//!
//! ```text
//! POST /api/v1/auth/login
//! Content-Type: application/json
//!
//! {
//!   "email": "alice@example.com",
//!   "password": "MyPassword123!"
//! }
//! ```
//!
//! Response:
//! ```text
//! {
//!   "message": "Logged in successfully.",
//!   "token": "eyJhbGciOiJIUzI1NiIsInR5cCI6IkpXVCJ9..."
//! }
//! ```
//!
//! ## Example Usage
//!
//! ```rust
//! use lib_core::dto::auth::{LoginRequest, LoginResponse};
//!
//! let request = LoginRequest {
//!     email: "alice@example.com".to_string(),
//!     password: "SecurePassword123!".to_string(),
//! };
//! let json = serde_json::to_string(&request).unwrap();
//! assert!(json.contains("alice@example.com"));
//!
//! # let response_json = r#"{"message":"Logged in successfully.","token":"jwt_token"}"#;
//! let response: LoginResponse = serde_json::from_str(response_json).unwrap();
//! assert_eq!(response.token, "jwt_token");
//! ```

use crate::model::money::Money;
use crate::model::store::models::{Permission, RoleWithPermissions, User};
use serde::{Deserialize, Serialize};

/// Registration request for a new account.
///
/// # Fields
///
/// * `username` - Unique, non-blank username of at most 32 characters
/// * `email` - Unique email address
/// * `password` - Plaintext password, at least 8 characters (hashed server-side with Argon2)
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct RegisterRequest {
    pub username: String,
    pub email: String,
    pub password: String,
}

/// Login request. Accounts are identified by email.
///
/// # Security Note
///
/// Password is sent in plaintext over HTTPS. Server only ever compares it
/// against the stored Argon2 hash.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct RegisterResponse {
    pub message: String,
    pub user_id: i64,
}

/// Successful login: a bearer token for the `Authorization` header.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct LoginResponse {
    pub message: String,
    pub token: String,
}

/// Generic acknowledgement for operations with nothing else to return.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct MessageResponse {
    pub message: String,
}

impl MessageResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// Standard error body, matching what `AppError` renders.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ErrorResponse {
    pub error: String,
    pub code: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct PermissionInfo {
    pub id: i64,
    pub name: String,
    pub role_id: i64,
}

impl From<Permission> for PermissionInfo {
    fn from(permission: Permission) -> Self {
        Self {
            id: permission.id,
            name: permission.name,
            role_id: permission.role_id,
        }
    }
}

/// A role together with the permissions it grants.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct RoleInfo {
    pub id: i64,
    pub name: String,
    pub permissions: Vec<PermissionInfo>,
}

impl From<RoleWithPermissions> for RoleInfo {
    fn from(value: RoleWithPermissions) -> Self {
        Self {
            id: value.role.id,
            name: value.role.name,
            permissions: value.permissions.into_iter().map(Into::into).collect(),
        }
    }
}

/// Public view of a user, as returned by `GET /users/me`.
///
/// The password hash never leaves the server.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct UserInfo {
    pub id: i64,
    pub username: String,
    pub email: String,
    pub balance: Money,
    pub roles: Vec<RoleInfo>,
}

impl UserInfo {
    pub fn new(user: User, roles: Vec<RoleWithPermissions>) -> Self {
        Self {
            id: user.id,
            username: user.username,
            email: user.email,
            balance: user.balance,
            roles: roles.into_iter().map(Into::into).collect(),
        }
    }
}

/// Body of `POST /users/{id}/roles`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct AssignRoleRequest {
    pub role: String,
}
