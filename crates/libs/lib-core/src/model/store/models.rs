use crate::model::money::Money;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use std::fmt;
use std::str::FromStr;

/// User entity representing a complete user record from the database.
#[derive(Debug, Clone, FromRow)]
pub struct User {
    pub id: i64,
    pub username: String,
    pub email: String,
    pub password_hash: String,
    #[sqlx(rename = "balance_cents")]
    pub balance: Money,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Data structure for creating a new user.
///
/// Password must already be hashed.
#[derive(Debug, Clone)]
pub struct UserForCreate {
    pub username: String,
    pub email: String,
    pub password_hash: String,
}

impl UserForCreate {
    /// Create a new `UserForCreate` instance.
    pub fn new(username: String, email: String, password_hash: String) -> Self {
        Self {
            username,
            email,
            password_hash,
        }
    }
}

// region: --- Roles

#[derive(Debug, Clone, PartialEq, Eq, FromRow, Serialize, Deserialize)]
pub struct Role {
    pub id: i64,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, FromRow, Serialize, Deserialize)]
pub struct Permission {
    pub id: i64,
    pub name: String,
    pub role_id: i64,
}

/// A role together with the permissions it owns, loaded eagerly.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoleWithPermissions {
    pub role: Role,
    pub permissions: Vec<Permission>,
}

// endregion: --- Roles

// region: --- Listings

/// Lifecycle state of a listing. `Active` moves to `Sold` exactly once.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ListingStatus {
    Active,
    Sold,
}

impl ListingStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            ListingStatus::Active => "active",
            ListingStatus::Sold => "sold",
        }
    }
}

impl fmt::Display for ListingStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, thiserror::Error)]
#[error("Invalid listing status: {0}")]
pub struct ParseListingStatusError(String);

impl FromStr for ListingStatus {
    type Err = ParseListingStatusError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "active" => Ok(ListingStatus::Active),
            "sold" => Ok(ListingStatus::Sold),
            _ => Err(ParseListingStatusError(s.to_string())),
        }
    }
}

impl TryFrom<String> for ListingStatus {
    type Error = ParseListingStatusError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

#[derive(Debug, Clone, FromRow)]
pub struct Listing {
    pub id: i64,
    /// Owner
    pub user_id: i64,
    pub title: String,
    pub description: String,
    #[sqlx(rename = "price_cents")]
    pub price: Money,
    #[sqlx(try_from = "String")]
    pub status: ListingStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Listing {
    pub fn is_active(&self) -> bool {
        self.status == ListingStatus::Active
    }
}

/// Validated input for a new listing.
#[derive(Debug, Clone)]
pub struct ListingForCreate {
    pub user_id: i64,
    pub title: String,
    pub description: String,
    pub price: Money,
}

// endregion: --- Listings

// region: --- Purchases

/// Receipt of a completed buy. Immutable once written.
#[derive(Debug, Clone, FromRow, PartialEq, Eq)]
pub struct Purchase {
    pub id: i64,
    pub listing_id: i64,
    pub buyer_id: i64,
    pub created_at: DateTime<Utc>,
}

/// A purchase joined with the listing it bought.
#[derive(Debug, Clone, FromRow)]
pub struct PurchaseWithListing {
    #[sqlx(flatten)]
    pub purchase: Purchase,
    pub title: String,
    pub description: String,
    #[sqlx(rename = "price_cents")]
    pub price: Money,
    pub seller_id: i64,
}

// endregion: --- Purchases

/// One page of an ordered collection.
#[derive(Debug, Clone)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub page: i64,
    pub per_page: i64,
    pub total_items: i64,
    pub total_pages: i64,
}

impl<T> Page<T> {
    pub fn new(items: Vec<T>, page: i64, per_page: i64, total_items: i64) -> Self {
        let total_pages = if per_page > 0 {
            (total_items + per_page - 1) / per_page
        } else {
            0
        };
        Self {
            items,
            page,
            per_page,
            total_items,
            total_pages,
        }
    }
}
