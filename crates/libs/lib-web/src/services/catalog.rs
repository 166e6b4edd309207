//! # Catalog Service
//!
//! Creating, browsing and removing listings. Selling a listing is not done
//! here; that transition belongs to the [`LedgerService`](super::LedgerService).

use super::AuthorizationService;
use lib_core::dto::{CreateListingRequest, MAX_PER_PAGE};
use lib_core::model::store::models::{Listing, ListingForCreate, Page, User};
use lib_core::model::store::ListingRepository;
use lib_core::{AppError, DbPool};
use lib_utils::{now_utc, validate_max_length, validate_not_empty};
use tracing::{info, instrument, warn};

pub const MAX_TITLE_LEN: usize = 50;

/// Permission that lets a user delete listings they do not own.
pub const MANAGE_LISTINGS: &str = "manage_listings";

#[derive(Clone)]
pub struct CatalogService {
    db: DbPool,
    authz: AuthorizationService,
}

impl CatalogService {
    pub fn new(db: DbPool) -> Self {
        let authz = AuthorizationService::new(db.clone());
        Self { db, authz }
    }

    /// Publish a new active listing owned by `owner_id`.
    #[instrument(skip(self, req), fields(title = %req.title))]
    pub async fn create(
        &self,
        owner_id: i64,
        req: CreateListingRequest,
    ) -> Result<Listing, AppError> {
        let title = req.title.trim();
        let description = req.description.trim();

        validate_not_empty(title, "Title").map_err(AppError::InvalidInput)?;
        validate_max_length(title, MAX_TITLE_LEN, "Title").map_err(AppError::InvalidInput)?;
        validate_not_empty(description, "Description").map_err(AppError::InvalidInput)?;
        let price = req
            .price
            .parse_positive()
            .map_err(|e| AppError::InvalidInput(format!("Price must be a positive number: {e}")))?;

        let listing = ListingRepository::create(
            &self.db,
            &ListingForCreate {
                user_id: owner_id,
                title: title.to_string(),
                description: description.to_string(),
                price,
            },
            now_utc(),
        )
        .await?;

        info!(listing_id = listing.id, %price, "Listing created");
        Ok(listing)
    }

    pub async fn get(&self, id: i64) -> Result<Listing, AppError> {
        ListingRepository::find_by_id(&self.db, id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Listing with ID {id} not found.")))
    }

    /// One page of the catalog in id order.
    ///
    /// Pages past the end come back empty with the real totals. Oversized
    /// pages are clamped to [`MAX_PER_PAGE`].
    #[instrument(skip(self))]
    pub async fn list(&self, page: i64, per_page: i64) -> Result<Page<Listing>, AppError> {
        if page < 1 {
            return Err(AppError::InvalidInput("page must be at least 1".to_string()));
        }
        if per_page < 1 {
            return Err(AppError::InvalidInput(
                "per_page must be at least 1".to_string(),
            ));
        }
        let per_page = per_page.min(MAX_PER_PAGE);

        let offset = (page - 1).saturating_mul(per_page);
        let total = ListingRepository::count(&self.db).await?;
        let items = if offset >= total {
            Vec::new()
        } else {
            ListingRepository::list_page(&self.db, per_page, offset).await?
        };

        Ok(Page::new(items, page, per_page, total))
    }

    pub async fn list_by_owner(&self, owner_id: i64) -> Result<Vec<Listing>, AppError> {
        Ok(ListingRepository::list_by_owner(&self.db, owner_id).await?)
    }

    /// Remove a listing. The owner may always do so; anyone else needs
    /// `manage_listings`. Sold listings stay for the buyer's history.
    #[instrument(skip(self, requester), fields(requester_id = requester.id))]
    pub async fn delete(&self, id: i64, requester: &User) -> Result<(), AppError> {
        let listing = self.get(id).await?;

        if listing.user_id != requester.id
            && !self.authz.has_permission(requester.id, MANAGE_LISTINGS).await?
        {
            warn!(owner_id = listing.user_id, "Delete refused");
            return Err(AppError::Forbidden(
                "You are not authorized to delete this listing.".to_string(),
            ));
        }

        if !listing.is_active() || !ListingRepository::delete_active(&self.db, id).await? {
            return Err(AppError::Conflict(format!(
                "Listing with ID {id} has been sold and cannot be deleted."
            )));
        }

        info!("Listing deleted");
        Ok(())
    }
}
