//! # Ledger Service
//!
//! Every operation that moves money: buying a listing, depositing into and
//! withdrawing from a wallet.
//!
//! ## Consistency
//!
//! A buy is one SQLite transaction made of three guarded writes:
//!
//! ```text
//! UPDATE listings ... WHERE status = 'active' AND user_id <> buyer   (claim)
//! UPDATE users    ... WHERE balance_cents >= price                   (debit)
//! INSERT INTO purchases ...                                          (record)
//! ```
//!
//! The claim is a compare-and-set, so among concurrent buyers exactly one
//! sees the row come back and every other caller gets `Conflict`. The first
//! statement is a write, which makes SQLite hand out the write lock before
//! anything is read; contention waits on the busy timeout instead of failing.
//! If any step fails the transaction is rolled back and nothing is visible.
//!
//! Deposits and withdrawals are single conditional `UPDATE ... RETURNING`
//! statements and need no explicit transaction.
//!
//! The seller's balance is not credited by a sale.

use lib_core::model::store::models::{Listing, Purchase, PurchaseWithListing};
use lib_core::model::store::{ListingRepository, PurchaseRepository, UserRepository};
use lib_core::{AppError, DbPool, Money};
use lib_utils::now_utc;
use tracing::{debug, info, instrument, warn};

/// Everything a successful buy produced.
#[derive(Debug, Clone)]
pub struct Receipt {
    pub purchase: Purchase,
    pub listing: Listing,
    pub buyer_balance: Money,
}

#[derive(Clone)]
pub struct LedgerService {
    db: DbPool,
}

impl LedgerService {
    pub fn new(db: DbPool) -> Self {
        Self { db }
    }

    /// Buy a listing for `buyer_id`.
    ///
    /// # Errors
    ///
    /// Checked in this order:
    /// - `NotFound` if the listing does not exist
    /// - `InvalidOperation` if the buyer owns it
    /// - `Conflict` if it is no longer active
    /// - `InsufficientFunds` if the buyer's balance is below the price
    #[instrument(skip(self))]
    pub async fn buy(&self, listing_id: i64, buyer_id: i64) -> Result<Receipt, AppError> {
        let now = now_utc();
        let mut tx = self.db.begin().await?;

        let Some(listing) = ListingRepository::mark_sold(&mut *tx, listing_id, buyer_id, now).await?
        else {
            let current = ListingRepository::find_by_id(&mut *tx, listing_id).await?;
            tx.rollback().await?;
            return Err(match current {
                None => AppError::NotFound(format!("Listing with ID {listing_id} not found.")),
                Some(listing) if listing.user_id == buyer_id => {
                    AppError::InvalidOperation("You cannot buy your own listing.".to_string())
                }
                Some(_) => {
                    debug!("Listing already sold");
                    AppError::Conflict("Listing is not available for purchase.".to_string())
                }
            });
        };

        let Some(buyer_balance) = UserRepository::debit(&mut *tx, buyer_id, listing.price).await?
        else {
            let buyer = UserRepository::find_by_id(&mut *tx, buyer_id).await?;
            tx.rollback().await?;
            return Err(match buyer {
                None => AppError::NotFound("User not found.".to_string()),
                Some(buyer) => {
                    warn!(balance = %buyer.balance, price = %listing.price, "Insufficient balance");
                    AppError::InsufficientFunds("Insufficient balance.".to_string())
                }
            });
        };

        let purchase = PurchaseRepository::create(&mut *tx, listing.id, buyer_id, now).await?;
        tx.commit().await?;

        info!(
            purchase_id = purchase.id,
            price = %listing.price,
            %buyer_balance,
            "Purchase completed"
        );
        Ok(Receipt {
            purchase,
            listing,
            buyer_balance,
        })
    }

    /// Add funds to a wallet and return the new balance.
    #[instrument(skip(self), fields(amount = %amount))]
    pub async fn deposit(&self, user_id: i64, amount: Money) -> Result<Money, AppError> {
        if !amount.is_positive() {
            return Err(AppError::InvalidInput(
                "Deposit amount must be greater than zero.".to_string(),
            ));
        }

        match UserRepository::credit(&self.db, user_id, amount).await? {
            Some(balance) => {
                info!(%balance, "Deposit completed");
                Ok(balance)
            }
            None => {
                self.ensure_user(user_id).await?;
                Err(AppError::InvalidInput(format!(
                    "Deposit would exceed the maximum balance of {}.",
                    Money::MAX
                )))
            }
        }
    }

    /// Take funds out of a wallet and return the new balance.
    #[instrument(skip(self), fields(amount = %amount))]
    pub async fn withdraw(&self, user_id: i64, amount: Money) -> Result<Money, AppError> {
        if !amount.is_positive() {
            return Err(AppError::InvalidInput(
                "Withdrawal amount must be greater than zero.".to_string(),
            ));
        }

        match UserRepository::debit(&self.db, user_id, amount).await? {
            Some(balance) => {
                info!(%balance, "Withdrawal completed");
                Ok(balance)
            }
            None => {
                self.ensure_user(user_id).await?;
                Err(AppError::InsufficientFunds("Insufficient balance.".to_string()))
            }
        }
    }

    pub async fn purchases_for(&self, buyer_id: i64) -> Result<Vec<PurchaseWithListing>, AppError> {
        Ok(PurchaseRepository::list_for_buyer(&self.db, buyer_id).await?)
    }

    async fn ensure_user(&self, user_id: i64) -> Result<(), AppError> {
        match UserRepository::find_by_id(&self.db, user_id).await? {
            Some(_) => Ok(()),
            None => Err(AppError::NotFound("User not found.".to_string())),
        }
    }
}
