//! # Authorization Service
//!
//! Answers "may this user do X?" against the live role/permission graph.
//!
//! A user's roles are flattened into a [`PermissionSet`] with a single join, so
//! a check is one query plus a hash lookup. Nothing is cached between calls:
//! a permission attached to a role is honoured on the very next request, even
//! for tokens issued before the change.

use lib_core::model::store::models::User;
use lib_core::model::store::RoleRepository;
use lib_core::{AppError, DbPool};
use std::collections::HashSet;
use tracing::{debug, instrument, warn};

/// Flattened union of permission names over all of a user's roles.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PermissionSet(HashSet<String>);

impl PermissionSet {
    pub fn contains(&self, permission: &str) -> bool {
        self.0.contains(permission)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(String::as_str)
    }
}

impl FromIterator<String> for PermissionSet {
    fn from_iter<I: IntoIterator<Item = String>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

/// Authorization engine over the role store.
#[derive(Clone)]
pub struct AuthorizationService {
    db: DbPool,
}

impl AuthorizationService {
    pub fn new(db: DbPool) -> Self {
        Self { db }
    }

    /// Resolve the effective permissions of a user.
    ///
    /// An unknown user id simply has no permissions.
    #[instrument(skip(self))]
    pub async fn permissions_for(&self, user_id: i64) -> Result<PermissionSet, AppError> {
        let names = RoleRepository::permission_names_for_user(&self.db, user_id).await?;
        debug!(count = names.len(), "Resolved permissions");
        Ok(names.into_iter().collect())
    }

    pub async fn has_permission(&self, user_id: i64, permission: &str) -> Result<bool, AppError> {
        Ok(self.permissions_for(user_id).await?.contains(permission))
    }

    /// Fail with [`AppError::Forbidden`] unless `user` holds `permission`.
    #[instrument(skip(self, user), fields(user_id = user.id))]
    pub async fn require_permission(&self, user: &User, permission: &str) -> Result<(), AppError> {
        if self.has_permission(user.id, permission).await? {
            return Ok(());
        }

        warn!(permission, "Permission denied");
        Err(AppError::Forbidden(format!(
            "You do not have the '{permission}' permission."
        )))
    }
}
