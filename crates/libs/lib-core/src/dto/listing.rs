//! # Listing Data Transfer Objects
//!
//! Request and response bodies for the listing catalog endpoints:
//!
//! - `GET /api/v1/listings?page=1&per_page=20` - [`PageQuery`] -> [`ListingPage`]
//! - `GET /api/v1/listings/{id}` - [`ListingInfo`]
//! - `POST /api/v1/listings` - [`CreateListingRequest`] -> [`ListingResponse`]
//! - `GET /api/v1/users/me/listings` - [`ListingsResponse`]
//!
//! Prices accept either a JSON number or a decimal string on input and are
//! always rendered as a decimal string.

use crate::model::money::{Money, MoneyInput};
use crate::model::store::models::{Listing, ListingStatus, Page};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Default page size for listing queries.
pub const DEFAULT_PER_PAGE: i64 = 20;

/// Largest page size served; larger requests are clamped to it.
pub const MAX_PER_PAGE: i64 = 100;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateListingRequest {
    pub title: String,
    pub description: String,
    pub price: MoneyInput,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ListingInfo {
    pub id: i64,
    pub user_id: i64,
    pub title: String,
    pub description: String,
    pub price: Money,
    pub status: ListingStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<Listing> for ListingInfo {
    fn from(listing: Listing) -> Self {
        Self {
            id: listing.id,
            user_id: listing.user_id,
            title: listing.title,
            description: listing.description,
            price: listing.price,
            status: listing.status,
            created_at: listing.created_at,
            updated_at: listing.updated_at,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ListingResponse {
    pub message: String,
    pub listing: ListingInfo,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ListingsResponse {
    pub listings: Vec<ListingInfo>,
}

/// Query string for paginated listing queries. Both fields are optional.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct PageQuery {
    pub page: Option<i64>,
    pub per_page: Option<i64>,
}

impl PageQuery {
    pub fn page_or_default(&self) -> i64 {
        self.page.unwrap_or(1)
    }

    pub fn per_page_or_default(&self) -> i64 {
        self.per_page.unwrap_or(DEFAULT_PER_PAGE)
    }
}

/// One page of the catalog with totals.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ListingPage {
    pub page: i64,
    pub per_page: i64,
    pub total_items: i64,
    pub total_pages: i64,
    pub listings: Vec<ListingInfo>,
}

impl From<Page<Listing>> for ListingPage {
    fn from(page: Page<Listing>) -> Self {
        Self {
            page: page.page,
            per_page: page.per_page,
            total_items: page.total_items,
            total_pages: page.total_pages,
            listings: page.items.into_iter().map(Into::into).collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_request_accepts_number_or_string_price() {
        let from_number: CreateListingRequest =
            serde_json::from_str(r#"{"title":"Bike","description":"Red","price":50.5}"#).unwrap();
        let from_string: CreateListingRequest =
            serde_json::from_str(r#"{"title":"Bike","description":"Red","price":"50.50"}"#)
                .unwrap();

        assert_eq!(from_number.price.parse().unwrap(), Money::from_cents(5_050));
        assert_eq!(from_string.price.parse().unwrap(), Money::from_cents(5_050));
    }

    #[test]
    fn test_page_query_defaults() {
        let query = PageQuery::default();
        assert_eq!(query.page_or_default(), 1);
        assert_eq!(query.per_page_or_default(), DEFAULT_PER_PAGE);
    }

    #[test]
    fn test_listing_info_status_is_snake_case() {
        let now = Utc::now();
        let info = ListingInfo {
            id: 1,
            user_id: 2,
            title: "Bike".into(),
            description: "Red".into(),
            price: Money::from_cents(5_000),
            status: ListingStatus::Sold,
            created_at: now,
            updated_at: now,
        };

        let json = serde_json::to_value(&info).unwrap();
        assert_eq!(json["status"], "sold");
        assert_eq!(json["price"], "50.00");
    }
}
