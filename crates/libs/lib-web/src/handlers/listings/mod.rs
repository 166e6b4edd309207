//! # Listing Handlers
//!
//! Catalog browsing is public; creating, buying and deleting need a token.

use super::current_user;
use crate::services::{CatalogService, LedgerService};
use axum::{
    extract::{Extension, Json, Path, Query, State},
    http::StatusCode,
};
use lib_auth::Claims;
use lib_core::dto::{
    CreateListingRequest, ListingInfo, ListingPage, ListingResponse, MessageResponse, PageQuery,
    PurchaseResponse,
};
use lib_core::{AppError, DbPool};
use tracing::instrument;

/// `GET /listings?page=&per_page=` - one page of the catalog.
pub async fn list_listings(
    State(pool): State<DbPool>,
    Query(query): Query<PageQuery>,
) -> Result<Json<ListingPage>, AppError> {
    let page = CatalogService::new(pool)
        .list(query.page_or_default(), query.per_page_or_default())
        .await?;
    Ok(Json(page.into()))
}

pub async fn get_listing(
    State(pool): State<DbPool>,
    Path(id): Path<i64>,
) -> Result<Json<ListingInfo>, AppError> {
    let listing = CatalogService::new(pool).get(id).await?;
    Ok(Json(listing.into()))
}

/// `POST /listings` - publish a listing owned by the caller.
#[instrument(skip(pool, claims, req), fields(user = %claims.sub))]
pub async fn create_listing(
    State(pool): State<DbPool>,
    Extension(claims): Extension<Claims>,
    Json(req): Json<CreateListingRequest>,
) -> Result<(StatusCode, Json<ListingResponse>), AppError> {
    let user = current_user(&pool, &claims).await?;
    let listing = CatalogService::new(pool).create(user.id, req).await?;

    Ok((
        StatusCode::CREATED,
        Json(ListingResponse {
            message: "Listing created successfully.".to_string(),
            listing: listing.into(),
        }),
    ))
}

/// `POST /listings/{id}/buy` - buy with the caller's wallet balance.
#[instrument(skip(pool, claims), fields(user = %claims.sub))]
pub async fn buy_listing(
    State(pool): State<DbPool>,
    Extension(claims): Extension<Claims>,
    Path(id): Path<i64>,
) -> Result<Json<PurchaseResponse>, AppError> {
    let buyer = current_user(&pool, &claims).await?;
    let receipt = LedgerService::new(pool).buy(id, buyer.id).await?;

    Ok(Json(PurchaseResponse {
        message: "Purchase completed successfully.".to_string(),
        purchase: receipt.purchase.into(),
        listing: receipt.listing.into(),
        new_balance: receipt.buyer_balance,
    }))
}

/// `DELETE /listings/{id}` - owner, or anyone with `manage_listings`.
#[instrument(skip(pool, claims), fields(user = %claims.sub))]
pub async fn delete_listing(
    State(pool): State<DbPool>,
    Extension(claims): Extension<Claims>,
    Path(id): Path<i64>,
) -> Result<Json<MessageResponse>, AppError> {
    let requester = current_user(&pool, &claims).await?;
    CatalogService::new(pool).delete(id, &requester).await?;

    Ok(Json(MessageResponse::new(format!(
        "Listing with ID {id} deleted successfully."
    ))))
}
