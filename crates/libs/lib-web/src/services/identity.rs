//! # Identity Service
//!
//! Registration, credential checks and user administration.
//!
//! ## Features
//!
//! - **Registration**: validates input, hashes the password with Argon2 and
//!   assigns the default `User` role in one transaction
//! - **Authentication**: email + password, with a single error for both
//!   unknown email and wrong password
//! - **Lookups**: by email or id; absence is always an explicit `NotFound`
//! - **Administration**: user deletion and role assignment
//!
//! ## Error Handling
//!
//! All methods return `Result<T, AppError>`. Common errors:
//! - `AppError::InvalidInput` - Malformed username, email or password
//! - `AppError::Conflict` - Username or email already registered
//! - `AppError::Unauthenticated` - Bad credentials
//! - `AppError::NotFound` - Unknown user or role

use lib_auth::{hash_password, verify_password};
use lib_core::dto::UserInfo;
use lib_core::model::store::models::{User, UserForCreate};
use lib_core::model::store::{
    ListingRepository, PurchaseRepository, RoleRepository, UserRepository,
};
use lib_core::{AppError, DbPool};
use lib_utils::{validate_email, validate_max_length, validate_not_empty};
use std::sync::OnceLock;
use tracing::{debug, error, info, instrument, warn};

/// Role every new account starts with.
pub const DEFAULT_ROLE: &str = "User";

/// Matches the width of the username column in the original schema.
pub const MAX_USERNAME_LEN: usize = 32;

/// Shared by unknown email and wrong password so callers cannot probe accounts.
pub const INVALID_CREDENTIALS: &str = "Invalid email or password.";

/// Hash checked against when the email is unknown, computed once.
fn dummy_hash() -> Option<&'static str> {
    static DUMMY_HASH: OnceLock<Option<String>> = OnceLock::new();
    DUMMY_HASH
        .get_or_init(|| hash_password("unknown-account-placeholder").ok())
        .as_deref()
}

/// An authenticated principal with the role names to embed in its token.
#[derive(Debug, Clone)]
pub struct Identity {
    pub user: User,
    pub roles: Vec<String>,
}

#[derive(Clone)]
pub struct IdentityService {
    db: DbPool,
}

impl IdentityService {
    pub fn new(db: DbPool) -> Self {
        Self { db }
    }

    /// Create a new account.
    ///
    /// # Errors
    ///
    /// - `InvalidInput` if the username is blank or longer than 32 characters,
    ///   the email is malformed or the password is shorter than 8 characters
    /// - `Conflict` if the username or email is taken, including when a
    ///   concurrent registration wins the race
    #[instrument(skip(self, password), fields(username = %username, email = %email))]
    pub async fn register(
        &self,
        username: &str,
        email: &str,
        password: &str,
    ) -> Result<User, AppError> {
        let username = username.trim();
        let email = email.trim();

        validate_not_empty(username, "Username").map_err(AppError::InvalidInput)?;
        validate_max_length(username, MAX_USERNAME_LEN, "Username").map_err(AppError::InvalidInput)?;
        validate_email(email).map_err(AppError::InvalidInput)?;

        if UserRepository::find_by_username(&self.db, username).await?.is_some() {
            warn!("Username already registered");
            return Err(AppError::Conflict("Username already registered.".to_string()));
        }
        if UserRepository::find_by_email(&self.db, email).await?.is_some() {
            warn!("Email already registered");
            return Err(AppError::Conflict("Email already registered.".to_string()));
        }

        let password_hash =
            hash_password(password).map_err(|e| AppError::InvalidInput(e.to_string()))?;

        let role = RoleRepository::find_by_name(&self.db, DEFAULT_ROLE)
            .await?
            .ok_or_else(|| {
                error!("Default role '{DEFAULT_ROLE}' is missing from the store");
                AppError::Internal(format!("Default role '{DEFAULT_ROLE}' is missing"))
            })?;

        let mut tx = self.db.begin().await?;
        let user = UserRepository::create(
            &mut *tx,
            &UserForCreate::new(username.to_string(), email.to_string(), password_hash),
        )
        .await?;
        RoleRepository::assign(&mut *tx, user.id, role.id).await?;
        tx.commit().await?;

        info!(user_id = user.id, "User registered");
        Ok(user)
    }

    /// Verify an email/password pair.
    #[instrument(skip(self, password), fields(email = %email))]
    pub async fn authenticate(&self, email: &str, password: &str) -> Result<Identity, AppError> {
        let Some(user) = UserRepository::find_by_email(&self.db, email.trim()).await? else {
            warn!("Login attempt for unknown email");
            // Pay the same Argon2 cost as a wrong password.
            if let Some(hash) = dummy_hash() {
                let _ = verify_password(password, hash);
            }
            return Err(AppError::Unauthenticated(INVALID_CREDENTIALS.to_string()));
        };

        let matches = verify_password(password, &user.password_hash).map_err(|e| {
            error!(user_id = user.id, "Stored password hash is unusable: {}", e);
            AppError::Internal("Stored password hash is invalid".to_string())
        })?;
        if !matches {
            warn!(user_id = user.id, "Wrong password");
            return Err(AppError::Unauthenticated(INVALID_CREDENTIALS.to_string()));
        }

        let roles = RoleRepository::role_names_for_user(&self.db, user.id).await?;
        debug!(user_id = user.id, ?roles, "Authenticated");
        Ok(Identity { user, roles })
    }

    pub async fn find_by_email(&self, email: &str) -> Result<User, AppError> {
        UserRepository::find_by_email(&self.db, email)
            .await?
            .ok_or_else(|| AppError::NotFound("User not found.".to_string()))
    }

    pub async fn find_by_id(&self, id: i64) -> Result<User, AppError> {
        UserRepository::find_by_id(&self.db, id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("User with ID {id} not found.")))
    }

    /// The user with every role and the permissions each grants.
    pub async fn profile(&self, user: User) -> Result<UserInfo, AppError> {
        let roles = RoleRepository::roles_with_permissions_for_user(&self.db, user.id).await?;
        Ok(UserInfo::new(user, roles))
    }

    /// Delete a user and everything that can go with them.
    ///
    /// Role assignments and active listings are removed. Users who sold a
    /// listing or bought one keep their row so purchase history stays intact;
    /// for them this fails with `Conflict` and nothing changes.
    #[instrument(skip(self))]
    pub async fn delete_user(&self, user_id: i64) -> Result<(), AppError> {
        let mut tx = self.db.begin().await?;

        // Opening with a write takes the lock before anything is read.
        RoleRepository::remove_all_for_user(&mut *tx, user_id).await?;

        if UserRepository::find_by_id(&mut *tx, user_id).await?.is_none() {
            tx.rollback().await?;
            return Err(AppError::NotFound(format!("User with ID {user_id} not found.")));
        }

        let sold = ListingRepository::count_sold_for_owner(&mut *tx, user_id).await?;
        let bought = PurchaseRepository::count_for_buyer(&mut *tx, user_id).await?;
        if sold > 0 || bought > 0 {
            tx.rollback().await?;
            warn!(sold, bought, "Refusing to delete user with purchase history");
            return Err(AppError::Conflict(
                "User has purchase history and cannot be deleted.".to_string(),
            ));
        }

        let listings = ListingRepository::delete_active_for_owner(&mut *tx, user_id).await?;
        UserRepository::delete(&mut *tx, user_id).await?;
        tx.commit().await?;

        info!(listings_removed = listings, "User deleted");
        Ok(())
    }

    /// Grant a role by name. Returns `false` if the user already had it.
    #[instrument(skip(self))]
    pub async fn assign_role(&self, user_id: i64, role_name: &str) -> Result<bool, AppError> {
        let user = self.find_by_id(user_id).await?;
        let role = RoleRepository::find_by_name(&self.db, role_name)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Role '{role_name}' not found.")))?;

        let added = RoleRepository::assign(&self.db, user.id, role.id).await?;
        if added {
            info!(user_id = user.id, role = %role.name, "Role assigned");
        }
        Ok(added)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::setup_test_db;
    use lib_core::Money;

    #[tokio::test]
    async fn test_register_assigns_default_role() {
        let pool = setup_test_db().await;
        let service = IdentityService::new(pool.clone());

        let user = service
            .register("alice", "alice@example.com", "password123")
            .await
            .unwrap();

        assert_eq!(user.balance, Money::ZERO);
        assert_ne!(user.password_hash, "password123");
        assert_eq!(
            RoleRepository::role_names_for_user(&pool, user.id).await.unwrap(),
            vec![DEFAULT_ROLE]
        );
    }

    #[tokio::test]
    async fn test_register_validation() {
        let pool = setup_test_db().await;
        let service = IdentityService::new(pool.clone());

        let blank_name = service.register("   ", "ab@example.com", "password123").await;
        let long_name = service
            .register(&"x".repeat(MAX_USERNAME_LEN + 1), "ab@example.com", "password123")
            .await;
        let bad_email = service.register("alice", "not-an-email", "password123").await;
        let short_password = service.register("alice", "alice@example.com", "short").await;

        assert!(matches!(blank_name, Err(AppError::InvalidInput(_))));
        assert!(matches!(long_name, Err(AppError::InvalidInput(_))));
        assert!(matches!(bad_email, Err(AppError::InvalidInput(_))));
        assert!(matches!(short_password, Err(AppError::InvalidInput(_))));
        assert_eq!(UserRepository::count(&pool).await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_register_accepts_short_and_max_length_usernames() {
        let pool = setup_test_db().await;
        let service = IdentityService::new(pool.clone());

        let u1 = service
            .register("u1", "u1@example.com", "password123")
            .await
            .unwrap();
        let widest = service
            .register(&"x".repeat(MAX_USERNAME_LEN), "wide@example.com", "password123")
            .await
            .unwrap();

        assert_eq!(u1.username, "u1");
        assert_eq!(widest.username.chars().count(), MAX_USERNAME_LEN);
        assert_eq!(UserRepository::count(&pool).await.unwrap(), 2);
    }

    #[tokio::test]
    async fn test_duplicate_registration_conflicts_and_leaves_store() {
        let pool = setup_test_db().await;
        let service = IdentityService::new(pool.clone());
        service
            .register("alice", "alice@example.com", "password123")
            .await
            .unwrap();

        let same_email = service
            .register("alice2", "alice@example.com", "password123")
            .await;
        let same_name = service
            .register("alice", "other@example.com", "password123")
            .await;

        assert!(matches!(same_email, Err(AppError::Conflict(_))));
        assert!(matches!(same_name, Err(AppError::Conflict(_))));
        assert_eq!(UserRepository::count(&pool).await.unwrap(), 1);
        let stored = UserRepository::find_by_email(&pool, "alice@example.com")
            .await
            .unwrap()
            .unwrap();
        assert_eq!(stored.username, "alice");
    }

    #[tokio::test]
    async fn test_authenticate_errors_are_indistinguishable() {
        let pool = setup_test_db().await;
        let service = IdentityService::new(pool);
        service
            .register("alice", "alice@example.com", "password123")
            .await
            .unwrap();

        let wrong_password = service
            .authenticate("alice@example.com", "password124")
            .await
            .unwrap_err();
        let unknown_email = service
            .authenticate("nobody@example.com", "password123")
            .await
            .unwrap_err();

        assert_eq!(wrong_password.to_string(), unknown_email.to_string());
        assert_eq!(wrong_password.user_message(), INVALID_CREDENTIALS);
        assert!(matches!(unknown_email, AppError::Unauthenticated(_)));
    }

    #[test]
    fn test_dummy_hash_is_verifiable_and_never_matches() {
        let hash = dummy_hash().expect("placeholder hash");

        assert!(hash.starts_with("$argon2"));
        assert_eq!(verify_password("password123", hash), Ok(false));
        assert!(std::ptr::eq(hash, dummy_hash().unwrap()));
    }

    #[tokio::test]
    async fn test_authenticate_returns_roles() {
        let pool = setup_test_db().await;
        let service = IdentityService::new(pool);
        service
            .register("alice", "alice@example.com", "password123")
            .await
            .unwrap();

        let identity = service
            .authenticate("alice@example.com", "password123")
            .await
            .unwrap();

        assert_eq!(identity.user.username, "alice");
        assert_eq!(identity.roles, vec!["User"]);
    }

    #[tokio::test]
    async fn test_find_missing_is_not_found() {
        let pool = setup_test_db().await;
        let service = IdentityService::new(pool);

        assert!(matches!(
            service.find_by_email("ghost@example.com").await,
            Err(AppError::NotFound(_))
        ));
        assert!(matches!(service.find_by_id(9).await, Err(AppError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_assign_role() {
        let pool = setup_test_db().await;
        let service = IdentityService::new(pool.clone());
        let user = service
            .register("alice", "alice@example.com", "password123")
            .await
            .unwrap();

        assert!(service.assign_role(user.id, "Admin").await.unwrap());
        assert!(!service.assign_role(user.id, "Admin").await.unwrap());
        assert!(matches!(
            service.assign_role(user.id, "Wizard").await,
            Err(AppError::NotFound(_))
        ));

        let profile = service.profile(user).await.unwrap();
        let names: Vec<_> = profile.roles.iter().map(|r| r.name.as_str()).collect();
        assert_eq!(names, vec!["Admin", "User"]);
    }

    #[tokio::test]
    async fn test_delete_user_without_history() {
        let pool = setup_test_db().await;
        let service = IdentityService::new(pool.clone());
        let user = service
            .register("alice", "alice@example.com", "password123")
            .await
            .unwrap();

        service.delete_user(user.id).await.unwrap();

        assert!(UserRepository::find_by_id(&pool, user.id).await.unwrap().is_none());
        assert!(matches!(
            service.delete_user(user.id).await,
            Err(AppError::NotFound(_))
        ));
    }
}
