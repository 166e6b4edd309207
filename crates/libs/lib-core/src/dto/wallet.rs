//! # Wallet and Purchase Data Transfer Objects
//!
//! - `POST /api/v1/users/wallet/deposit` - [`AmountRequest`] -> [`BalanceResponse`]
//! - `POST /api/v1/users/wallet/withdraw` - [`AmountRequest`] -> [`BalanceResponse`]
//! - `POST /api/v1/listings/{id}/buy` - [`PurchaseResponse`]
//! - `GET /api/v1/users/me/purchases` - [`PurchaseHistoryResponse`]

use super::listing::ListingInfo;
use crate::model::money::{Money, MoneyInput};
use crate::model::store::models::{Purchase, PurchaseWithListing};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Deposit or withdrawal amount, as a JSON number or decimal string.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AmountRequest {
    pub amount: MoneyInput,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct BalanceResponse {
    pub message: String,
    pub new_balance: Money,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct PurchaseInfo {
    pub id: i64,
    pub listing_id: i64,
    pub buyer_id: i64,
    pub created_at: DateTime<Utc>,
}

impl From<Purchase> for PurchaseInfo {
    fn from(purchase: Purchase) -> Self {
        Self {
            id: purchase.id,
            listing_id: purchase.listing_id,
            buyer_id: purchase.buyer_id,
            created_at: purchase.created_at,
        }
    }
}

/// Result of a successful buy.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct PurchaseResponse {
    pub message: String,
    pub purchase: PurchaseInfo,
    pub listing: ListingInfo,
    pub new_balance: Money,
}

/// One entry of a buyer's purchase history.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct PurchaseHistoryItem {
    pub id: i64,
    pub listing_id: i64,
    pub title: String,
    pub description: String,
    pub price: Money,
    pub seller_id: i64,
    pub purchased_at: DateTime<Utc>,
}

impl From<PurchaseWithListing> for PurchaseHistoryItem {
    fn from(row: PurchaseWithListing) -> Self {
        Self {
            id: row.purchase.id,
            listing_id: row.purchase.listing_id,
            title: row.title,
            description: row.description,
            price: row.price,
            seller_id: row.seller_id,
            purchased_at: row.purchase.created_at,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct PurchaseHistoryResponse {
    pub purchases: Vec<PurchaseHistoryItem>,
}
