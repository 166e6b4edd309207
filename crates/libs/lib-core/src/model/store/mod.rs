//! # Database Store
//!
//! SQLite connection pool, embedded migrations and repository implementations.
//!
//! Repository functions take any [`SqliteExecutor`](sqlx::sqlite::SqliteExecutor),
//! so the same call works against the pool for one-off reads and against an
//! open `sqlx::Transaction` when it is part of a larger unit of work.

// region: --- Modules
pub mod listing_repository;
pub mod models;
pub mod purchase_repository;
pub mod role_repository;
pub mod user_repository;
// endregion: --- Modules

// region: --- Re-exports
pub use listing_repository::ListingRepository;
pub use purchase_repository::PurchaseRepository;
pub use role_repository::RoleRepository;
pub use user_repository::UserRepository;
// endregion: --- Re-exports

// region: --- Types and Functions
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use sqlx::SqlitePool;
use std::time::Duration;

/// Type alias for SQLite connection pool.
pub type DbPool = SqlitePool;

/// How long a writer waits for the SQLite write lock before giving up.
const BUSY_TIMEOUT: Duration = Duration::from_secs(5);

/// Connections kept for a file-backed database.
const MAX_FILE_CONNECTIONS: u32 = 8;

/// Create a new SQLite connection pool.
///
/// In-memory databases live and die with their connection, so they get a
/// single connection that is never recycled.
pub async fn create_pool(database_url: &str) -> anyhow::Result<DbPool> {
    let options = database_url
        .parse::<SqliteConnectOptions>()?
        .create_if_missing(true)
        .foreign_keys(true)
        .busy_timeout(BUSY_TIMEOUT);

    let pool_options = if is_memory_url(database_url) {
        SqlitePoolOptions::new()
            .max_connections(1)
            .idle_timeout(None)
            .max_lifetime(None)
    } else {
        SqlitePoolOptions::new().max_connections(MAX_FILE_CONNECTIONS)
    };

    let pool = pool_options.connect_with(options).await?;

    Ok(pool)
}

/// Apply the embedded schema migrations.
pub async fn run_migrations(pool: &DbPool) -> Result<(), sqlx::migrate::MigrateError> {
    sqlx::migrate!().run(pool).await
}

fn is_memory_url(database_url: &str) -> bool {
    database_url.contains(":memory:") || database_url.contains("mode=memory")
}
// endregion: --- Types and Functions


#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_memory_url() {
        assert!(is_memory_url("sqlite::memory:"));
        assert!(is_memory_url("sqlite:file:market?mode=memory&cache=shared"));
        assert!(!is_memory_url("sqlite:data/marketplace.db"));
    }

    #[tokio::test]
    async fn test_migrations_seed_roles() {
        let pool = test_db::setup_test_db().await;

        let roles: Vec<String> = sqlx::query_scalar("SELECT name FROM roles ORDER BY name")
            .fetch_all(&pool)
            .await
            .unwrap();
        assert_eq!(roles, vec!["Admin".to_string(), "User".to_string()]);

        let admin_permissions: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM permissions p JOIN roles r ON r.id = p.role_id WHERE r.name = 'Admin'",
        )
        .fetch_one(&pool)
        .await
        .unwrap();
        assert_eq!(admin_permissions, 4);
    }
}
