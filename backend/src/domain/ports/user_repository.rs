//! Port abstraction for user accounts and issued bearer tokens.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use pagination::{PageRequest, Paginated};

use crate::domain::User;

use super::PersistenceError;

/// Account storage.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Insert a new account. Email or phone collisions yield
    /// [`PersistenceError::Duplicate`].
    async fn insert(&self, user: &User) -> Result<(), PersistenceError>;

    /// Fetch an account by identifier.
    async fn find_by_id(&self, id: &str) -> Result<Option<User>, PersistenceError>;

    /// Fetch an account by normalised email address.
    async fn find_by_email(&self, email: &str) -> Result<Option<User>, PersistenceError>;

    /// Fetch an account by phone number.
    async fn find_by_phone(&self, phone: &str) -> Result<Option<User>, PersistenceError>;

    /// Persist every mutable column of `user`. Returns `false` when the row
    /// no longer exists.
    async fn update(&self, user: &User) -> Result<bool, PersistenceError>;

    /// Page through accounts, optionally filtered by a name, email or phone
    /// fragment.
    async fn list(
        &self,
        search: Option<String>,
        page: PageRequest,
    ) -> Result<Paginated<User>, PersistenceError>;

    /// Remove an account and everything it owns. Returns `false` when the
    /// row did not exist.
    async fn delete(&self, id: &str) -> Result<bool, PersistenceError>;

    /// Subset of `ids` that belong to existing accounts.
    async fn existing_ids(&self, ids: &[String]) -> Result<Vec<String>, PersistenceError>;
}

/// Stored bearer token, identified by its keyed digest.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IssuedToken {
    pub id: String,
    pub user_id: String,
    pub token_hash: String,
    pub expires_at: DateTime<Utc>,
}

/// Bearer token storage.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait TokenRepository: Send + Sync {
    /// Record a freshly issued token.
    async fn insert(&self, token: &IssuedToken) -> Result<(), PersistenceError>;

    /// Look up a token that has not expired at `now`.
    async fn find_active(
        &self,
        token_hash: &str,
        now: DateTime<Utc>,
    ) -> Result<Option<IssuedToken>, PersistenceError>;

    /// Revoke a token. Returns `false` when it was unknown.
    async fn revoke(&self, token_hash: &str) -> Result<bool, PersistenceError>;
}
