//! # User Repository
//!
//! Provides database access layer for user records and wallet balances.
//!
//! This module implements the repository pattern for user data access,
//! providing a clean abstraction over SQL queries. Balance mutations are
//! single conditional `UPDATE … RETURNING` statements, so each one is an
//! atomic read-modify-write on its row and concurrent callers never lose
//! an update.
//!
//! ## Example
//!
//! ```rust,no_run
//! # use lib_core::model::store::{create_pool, UserRepository, models::UserForCreate};
//! # use lib_core::Money;
//! # async fn example() -> anyhow::Result<()> {
//! let pool = create_pool("sqlite::memory:").await?;
//!
//! // Create a new user
//! let user = UserRepository::create(
//!     &pool,
//!     &UserForCreate::new("alice".into(), "alice@example.com".into(), "hashed".into()),
//! ).await?;
//!
//! // Credit the wallet
//! let balance = UserRepository::credit(&pool, user.id, Money::from_cents(10_000)).await?;
//! assert_eq!(balance, Some(Money::from_cents(10_000)));
//! # Ok(())
//! # }
//! ```

use super::models::{User, UserForCreate};
use crate::model::money::Money;
use sqlx::sqlite::SqliteExecutor;
use sqlx::{query, query_as, query_scalar};

/// User repository for database operations.
///
/// Provides methods for creating, retrieving, deleting users and for
/// mutating their balance. All methods are async and generic over the
/// executor, so they run equally against the pool or inside a transaction.
pub struct UserRepository;

impl UserRepository {
    /// Find a user by their primary key.
    ///
    /// # Returns
    ///
    /// * `Ok(Some(User))` - User found
    /// * `Ok(None)` - No user with that id
    /// * `Err(sqlx::Error)` - Database error occurred
    pub async fn find_by_id<'e, E>(executor: E, id: i64) -> Result<Option<User>, sqlx::Error>
    where
        E: SqliteExecutor<'e>,
    {
        query_as::<_, User>("SELECT * FROM users WHERE id = ?")
            .bind(id)
            .fetch_optional(executor)
            .await
    }

    /// Find a user by their email address.
    ///
    /// # Arguments
    ///
    /// * `executor` - Pool or open transaction
    /// * `email` - The email address to search for
    ///
    /// # Returns
    ///
    /// * `Ok(Some(User))` - User found with matching email
    /// * `Ok(None)` - No user found with that email
    /// * `Err(sqlx::Error)` - Database error occurred
    pub async fn find_by_email<'e, E>(executor: E, email: &str) -> Result<Option<User>, sqlx::Error>
    where
        E: SqliteExecutor<'e>,
    {
        query_as::<_, User>("SELECT * FROM users WHERE email = ?")
            .bind(email)
            .fetch_optional(executor)
            .await
    }

    /// Find a user by their username.
    ///
    /// # Returns
    ///
    /// * `Ok(Some(User))` - User found with matching username
    /// * `Ok(None)` - No user found with that username
    /// * `Err(sqlx::Error)` - Database error occurred
    pub async fn find_by_username<'e, E>(
        executor: E,
        username: &str,
    ) -> Result<Option<User>, sqlx::Error>
    where
        E: SqliteExecutor<'e>,
    {
        query_as::<_, User>("SELECT * FROM users WHERE username = ?")
            .bind(username)
            .fetch_optional(executor)
            .await
    }

    /// Create a new user with a zero balance.
    ///
    /// # Arguments
    ///
    /// * `executor` - Pool or open transaction
    /// * `user_data` - Username, email and an already-hashed password
    ///
    /// # Returns
    ///
    /// * `Ok(User)` - The newly created user with generated ID and timestamps
    /// * `Err(sqlx::Error)` - Database error (e.g., constraint violation for duplicate email/username)
    ///
    /// # Errors
    ///
    /// Returns `sqlx::Error` if:
    /// - Username already exists (UNIQUE constraint violation)
    /// - Email already exists (UNIQUE constraint violation)
    /// - Database connection fails
    pub async fn create<'e, E>(executor: E, user_data: &UserForCreate) -> Result<User, sqlx::Error>
    where
        E: SqliteExecutor<'e>,
    {
        query_as::<_, User>(
            "INSERT INTO users (username, email, password_hash) VALUES (?, ?, ?) RETURNING *",
        )
        .bind(&user_data.username)
        .bind(&user_data.email)
        .bind(&user_data.password_hash)
        .fetch_one(executor)
        .await
    }

    /// Add `amount` to a user's balance.
    ///
    /// The update only applies while the result stays within [`Money::MAX`].
    ///
    /// # Returns
    ///
    /// * `Ok(Some(balance))` - The new balance
    /// * `Ok(None)` - No such user, or the balance would exceed the maximum
    pub async fn credit<'e, E>(
        executor: E,
        id: i64,
        amount: Money,
    ) -> Result<Option<Money>, sqlx::Error>
    where
        E: SqliteExecutor<'e>,
    {
        query_scalar::<_, Money>(
            r#"
            UPDATE users
            SET balance_cents = balance_cents + ?1, updated_at = CURRENT_TIMESTAMP
            WHERE id = ?2 AND balance_cents + ?1 <= ?3
            RETURNING balance_cents
            "#,
        )
        .bind(amount)
        .bind(id)
        .bind(Money::MAX)
        .fetch_optional(executor)
        .await
    }

    /// Subtract `amount` from a user's balance if the balance covers it.
    ///
    /// # Returns
    ///
    /// * `Ok(Some(balance))` - The new balance
    /// * `Ok(None)` - No such user, or the balance is below `amount`
    pub async fn debit<'e, E>(
        executor: E,
        id: i64,
        amount: Money,
    ) -> Result<Option<Money>, sqlx::Error>
    where
        E: SqliteExecutor<'e>,
    {
        query_scalar::<_, Money>(
            r#"
            UPDATE users
            SET balance_cents = balance_cents - ?1, updated_at = CURRENT_TIMESTAMP
            WHERE id = ?2 AND balance_cents >= ?1
            RETURNING balance_cents
            "#,
        )
        .bind(amount)
        .bind(id)
        .fetch_optional(executor)
        .await
    }

    /// Delete a user row.
    ///
    /// Role assignments go with it (`ON DELETE CASCADE`); listings and purchases
    /// must have been resolved by the caller first or the foreign keys reject it.
    ///
    /// # Returns
    ///
    /// * `Ok(true)` - A row was deleted
    /// * `Ok(false)` - No user with that id
    pub async fn delete<'e, E>(executor: E, id: i64) -> Result<bool, sqlx::Error>
    where
        E: SqliteExecutor<'e>,
    {
        let result = query("DELETE FROM users WHERE id = ?")
            .bind(id)
            .execute(executor)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Count all users.
    pub async fn count<'e, E>(executor: E) -> Result<i64, sqlx::Error>
    where
        E: SqliteExecutor<'e>,
    {
        query_scalar("SELECT COUNT(*) FROM users")
            .fetch_one(executor)
            .await
    }
}
