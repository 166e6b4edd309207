//! # User Handlers
//!
//! The caller's own profile, listings, purchases and wallet, plus the two
//! administrative endpoints gated by permission guards in the router.

use super::current_user;
use crate::services::{CatalogService, IdentityService, LedgerService};
use axum::extract::{Extension, Json, Path, State};
use lib_auth::Claims;
use lib_core::dto::{
    AmountRequest, AssignRoleRequest, BalanceResponse, ListingsResponse, MessageResponse,
    PurchaseHistoryResponse, UserInfo,
};
use lib_core::{AppError, DbPool};
use tracing::instrument;

/// `GET /users/me` - the caller with roles and permissions.
pub async fn me(
    State(pool): State<DbPool>,
    Extension(claims): Extension<Claims>,
) -> Result<Json<UserInfo>, AppError> {
    let user = current_user(&pool, &claims).await?;
    let info = IdentityService::new(pool).profile(user).await?;
    Ok(Json(info))
}

pub async fn my_listings(
    State(pool): State<DbPool>,
    Extension(claims): Extension<Claims>,
) -> Result<Json<ListingsResponse>, AppError> {
    let user = current_user(&pool, &claims).await?;
    let listings = CatalogService::new(pool).list_by_owner(user.id).await?;
    Ok(Json(ListingsResponse {
        listings: listings.into_iter().map(Into::into).collect(),
    }))
}

pub async fn my_purchases(
    State(pool): State<DbPool>,
    Extension(claims): Extension<Claims>,
) -> Result<Json<PurchaseHistoryResponse>, AppError> {
    let user = current_user(&pool, &claims).await?;
    let purchases = LedgerService::new(pool).purchases_for(user.id).await?;
    Ok(Json(PurchaseHistoryResponse {
        purchases: purchases.into_iter().map(Into::into).collect(),
    }))
}

/// `POST /users/wallet/deposit`
#[instrument(skip(pool, claims, req), fields(user = %claims.sub))]
pub async fn deposit(
    State(pool): State<DbPool>,
    Extension(claims): Extension<Claims>,
    Json(req): Json<AmountRequest>,
) -> Result<Json<BalanceResponse>, AppError> {
    let user = current_user(&pool, &claims).await?;
    let amount = req.amount.parse_positive()?;
    let new_balance = LedgerService::new(pool).deposit(user.id, amount).await?;

    Ok(Json(BalanceResponse {
        message: format!("Successfully deposited {amount}."),
        new_balance,
    }))
}

/// `POST /users/wallet/withdraw`
#[instrument(skip(pool, claims, req), fields(user = %claims.sub))]
pub async fn withdraw(
    State(pool): State<DbPool>,
    Extension(claims): Extension<Claims>,
    Json(req): Json<AmountRequest>,
) -> Result<Json<BalanceResponse>, AppError> {
    let user = current_user(&pool, &claims).await?;
    let amount = req.amount.parse_positive()?;
    let new_balance = LedgerService::new(pool).withdraw(user.id, amount).await?;

    Ok(Json(BalanceResponse {
        message: format!("Successfully withdrawn {amount}."),
        new_balance,
    }))
}

/// `DELETE /users/{id}` - requires `manage_users`.
#[instrument(skip(pool))]
pub async fn delete_user(
    State(pool): State<DbPool>,
    Path(id): Path<i64>,
) -> Result<Json<MessageResponse>, AppError> {
    IdentityService::new(pool).delete_user(id).await?;
    Ok(Json(MessageResponse::new(format!(
        "User with ID {id} deleted successfully."
    ))))
}

/// `POST /users/{id}/roles` - requires `manage_roles`.
#[instrument(skip(pool, req), fields(role = %req.role))]
pub async fn assign_role(
    State(pool): State<DbPool>,
    Path(id): Path<i64>,
    Json(req): Json<AssignRoleRequest>,
) -> Result<Json<MessageResponse>, AppError> {
    let added = IdentityService::new(pool).assign_role(id, &req.role).await?;
    let message = if added {
        format!("Role '{}' assigned to user {id}.", req.role)
    } else {
        format!("User {id} already has role '{}'.", req.role)
    };
    Ok(Json(MessageResponse::new(message)))
}

#[cfg(test)]
mod tests;
