//! # Listing Repository
//!
//! Database access for marketplace listings.
//!
//! The only status transition a listing ever makes is `active → sold`, and it
//! is performed by [`ListingRepository::mark_sold`] as a compare-and-set: the
//! `UPDATE` matches only while the row is still active, so of any number of
//! concurrent callers at most one gets the row back.

use super::models::{Listing, ListingForCreate, ListingStatus};
use chrono::{DateTime, Utc};
use sqlx::sqlite::SqliteExecutor;
use sqlx::{query, query_as, query_scalar};

/// Listing repository for database operations.
pub struct ListingRepository;

impl ListingRepository {
    /// Insert a new active listing.
    ///
    /// # Errors
    ///
    /// Fails on a foreign key violation if `user_id` does not exist, or on the
    /// `price_cents > 0` check.
    pub async fn create<'e, E>(
        executor: E,
        listing: &ListingForCreate,
        now: DateTime<Utc>,
    ) -> Result<Listing, sqlx::Error>
    where
        E: SqliteExecutor<'e>,
    {
        query_as::<_, Listing>(
            r#"
            INSERT INTO listings (user_id, title, description, price_cents, status, created_at, updated_at)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?6)
            RETURNING *
            "#,
        )
        .bind(listing.user_id)
        .bind(&listing.title)
        .bind(&listing.description)
        .bind(listing.price)
        .bind(ListingStatus::Active.as_str())
        .bind(now)
        .fetch_one(executor)
        .await
    }

    pub async fn find_by_id<'e, E>(executor: E, id: i64) -> Result<Option<Listing>, sqlx::Error>
    where
        E: SqliteExecutor<'e>,
    {
        query_as::<_, Listing>("SELECT * FROM listings WHERE id = ?")
            .bind(id)
            .fetch_optional(executor)
            .await
    }

    /// One page of listings in insertion order.
    pub async fn list_page<'e, E>(
        executor: E,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<Listing>, sqlx::Error>
    where
        E: SqliteExecutor<'e>,
    {
        query_as::<_, Listing>("SELECT * FROM listings ORDER BY id LIMIT ? OFFSET ?")
            .bind(limit)
            .bind(offset)
            .fetch_all(executor)
            .await
    }

    pub async fn count<'e, E>(executor: E) -> Result<i64, sqlx::Error>
    where
        E: SqliteExecutor<'e>,
    {
        query_scalar("SELECT COUNT(*) FROM listings")
            .fetch_one(executor)
            .await
    }

    /// All listings created by `user_id`, active and sold.
    pub async fn list_by_owner<'e, E>(executor: E, user_id: i64) -> Result<Vec<Listing>, sqlx::Error>
    where
        E: SqliteExecutor<'e>,
    {
        query_as::<_, Listing>("SELECT * FROM listings WHERE user_id = ? ORDER BY id")
            .bind(user_id)
            .fetch_all(executor)
            .await
    }

    /// Flip an active listing not owned by `buyer_id` to sold.
    ///
    /// # Returns
    ///
    /// * `Ok(Some(Listing))` - This call won the listing
    /// * `Ok(None)` - Missing, already sold, or owned by the buyer; the caller
    ///   re-reads the row to tell which
    pub async fn mark_sold<'e, E>(
        executor: E,
        id: i64,
        buyer_id: i64,
        now: DateTime<Utc>,
    ) -> Result<Option<Listing>, sqlx::Error>
    where
        E: SqliteExecutor<'e>,
    {
        query_as::<_, Listing>(
            r#"
            UPDATE listings
            SET status = ?1, updated_at = ?2
            WHERE id = ?3 AND status = ?4 AND user_id <> ?5
            RETURNING *
            "#,
        )
        .bind(ListingStatus::Sold.as_str())
        .bind(now)
        .bind(id)
        .bind(ListingStatus::Active.as_str())
        .bind(buyer_id)
        .fetch_optional(executor)
        .await
    }

    /// Delete a listing only while it is still active.
    ///
    /// Returns `false` if the row is missing or already sold.
    pub async fn delete_active<'e, E>(executor: E, id: i64) -> Result<bool, sqlx::Error>
    where
        E: SqliteExecutor<'e>,
    {
        let result = query("DELETE FROM listings WHERE id = ? AND status = ?")
            .bind(id)
            .bind(ListingStatus::Active.as_str())
            .execute(executor)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    pub async fn delete_active_for_owner<'e, E>(
        executor: E,
        user_id: i64,
    ) -> Result<u64, sqlx::Error>
    where
        E: SqliteExecutor<'e>,
    {
        let result = query("DELETE FROM listings WHERE user_id = ? AND status = ?")
            .bind(user_id)
            .bind(ListingStatus::Active.as_str())
            .execute(executor)
            .await?;

        Ok(result.rows_affected())
    }

    pub async fn count_sold_for_owner<'e, E>(executor: E, user_id: i64) -> Result<i64, sqlx::Error>
    where
        E: SqliteExecutor<'e>,
    {
        query_scalar("SELECT COUNT(*) FROM listings WHERE user_id = ? AND status = ?")
            .bind(user_id)
            .bind(ListingStatus::Sold.as_str())
            .fetch_one(executor)
            .await
    }
}
