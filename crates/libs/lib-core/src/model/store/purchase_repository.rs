//! Purchase records.
//!
//! Rows are only written from inside the buy transaction; `listing_id` is
//! UNIQUE so the store itself refuses a second purchase of the same listing.

use super::models::{Purchase, PurchaseWithListing};
use chrono::{DateTime, Utc};
use sqlx::sqlite::SqliteExecutor;
use sqlx::{query_as, query_scalar};

pub struct PurchaseRepository;

impl PurchaseRepository {
    pub async fn create<'e, E>(
        executor: E,
        listing_id: i64,
        buyer_id: i64,
        now: DateTime<Utc>,
    ) -> Result<Purchase, sqlx::Error>
    where
        E: SqliteExecutor<'e>,
    {
        query_as::<_, Purchase>(
            "INSERT INTO purchases (listing_id, buyer_id, created_at) VALUES (?, ?, ?) RETURNING *",
        )
        .bind(listing_id)
        .bind(buyer_id)
        .bind(now)
        .fetch_one(executor)
        .await
    }

    pub async fn find_by_listing<'e, E>(
        executor: E,
        listing_id: i64,
    ) -> Result<Option<Purchase>, sqlx::Error>
    where
        E: SqliteExecutor<'e>,
    {
        query_as::<_, Purchase>("SELECT * FROM purchases WHERE listing_id = ?")
            .bind(listing_id)
            .fetch_optional(executor)
            .await
    }

    /// Purchase history of a buyer, oldest first, joined with what was bought.
    pub async fn list_for_buyer<'e, E>(
        executor: E,
        buyer_id: i64,
    ) -> Result<Vec<PurchaseWithListing>, sqlx::Error>
    where
        E: SqliteExecutor<'e>,
    {
        query_as::<_, PurchaseWithListing>(
            r#"
            SELECT p.id, p.listing_id, p.buyer_id, p.created_at,
                   l.title, l.description, l.price_cents, l.user_id AS seller_id
            FROM purchases p
            JOIN listings l ON l.id = p.listing_id
            WHERE p.buyer_id = ?
            ORDER BY p.id
            "#,
        )
        .bind(buyer_id)
        .fetch_all(executor)
        .await
    }

    pub async fn count_for_buyer<'e, E>(executor: E, buyer_id: i64) -> Result<i64, sqlx::Error>
    where
        E: SqliteExecutor<'e>,
    {
        query_scalar("SELECT COUNT(*) FROM purchases WHERE buyer_id = ?")
            .bind(buyer_id)
            .fetch_one(executor)
            .await
    }

    pub async fn count_for_listing<'e, E>(executor: E, listing_id: i64) -> Result<i64, sqlx::Error>
    where
        E: SqliteExecutor<'e>,
    {
        query_scalar("SELECT COUNT(*) FROM purchases WHERE listing_id = ?")
            .bind(listing_id)
            .fetch_one(executor)
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::money::Money;
    use crate::model::store::models::{ListingForCreate, UserForCreate};
    use crate::model::store::test_db::setup_test_db;
    use crate::model::store::{ListingRepository, UserRepository};

    #[tokio::test]
    async fn test_history_joins_listing_details() {
        let pool = setup_test_db().await;
        let seller = UserRepository::create(
            &pool,
            &UserForCreate::new("seller".into(), "seller@example.com".into(), "hash".into()),
        )
        .await
        .unwrap();
        let buyer = UserRepository::create(
            &pool,
            &UserForCreate::new("buyer".into(), "buyer@example.com".into(), "hash".into()),
        )
        .await
        .unwrap();
        let listing = ListingRepository::create(
            &pool,
            &ListingForCreate {
                user_id: seller.id,
                title: "Desk".into(),
                description: "Oak".into(),
                price: Money::from_cents(12_000),
            },
            Utc::now(),
        )
        .await
        .unwrap();

        PurchaseRepository::create(&pool, listing.id, buyer.id, Utc::now())
            .await
            .unwrap();

        let history = PurchaseRepository::list_for_buyer(&pool, buyer.id).await.unwrap();
        assert_eq!(history.len(), 1);
        assert_eq!(history[0].purchase.listing_id, listing.id);
        assert_eq!(history[0].title, "Desk");
        assert_eq!(history[0].price, Money::from_cents(12_000));
        assert_eq!(history[0].seller_id, seller.id);

        assert_eq!(PurchaseRepository::count_for_buyer(&pool, buyer.id).await.unwrap(), 1);
        assert!(PurchaseRepository::find_by_listing(&pool, listing.id)
            .await
            .unwrap()
            .is_some());
    }

    #[tokio::test]
    async fn test_second_purchase_of_listing_is_rejected() {
        let pool = setup_test_db().await;
        let seller = UserRepository::create(
            &pool,
            &UserForCreate::new("seller".into(), "seller@example.com".into(), "hash".into()),
        )
        .await
        .unwrap();
        let listing = ListingRepository::create(
            &pool,
            &ListingForCreate {
                user_id: seller.id,
                title: "Desk".into(),
                description: "Oak".into(),
                price: Money::from_cents(100),
            },
            Utc::now(),
        )
        .await
        .unwrap();
        let buyer = UserRepository::create(
            &pool,
            &UserForCreate::new("buyer".into(), "buyer@example.com".into(), "hash".into()),
        )
        .await
        .unwrap();

        PurchaseRepository::create(&pool, listing.id, buyer.id, Utc::now())
            .await
            .unwrap();
        let second = PurchaseRepository::create(&pool, listing.id, buyer.id, Utc::now()).await;

        assert!(second.is_err());
        assert_eq!(
            PurchaseRepository::count_for_listing(&pool, listing.id).await.unwrap(),
            1
        );
    }
}
