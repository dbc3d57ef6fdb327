//! Bearer token issue and validation.
//!
//! Tokens are 32 random bytes rendered as hex. Only a SHA-256 digest keyed
//! by the server secret is stored, so a leaked `auth_tokens` table cannot be
//! replayed.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use mockable::Clock;
use rand::RngCore;
use serde::Serialize;
use sha2::{Digest, Sha256};
use tracing::debug;
use zeroize::Zeroizing;

use super::ports::{PrincipalResolver, TokenRepository, UserRepository};
use super::{Error, Principal, User, UserStatus};

/// Lifetime of an issued bearer token.
pub const TOKEN_TTL_HOURS: i64 = 24;

/// Secret used to key stored token digests.
#[derive(Clone)]
pub struct TokenKey(Arc<Zeroizing<String>>);

impl TokenKey {
    /// Wrap the signing secret.
    pub fn new(secret: impl Into<String>) -> Self {
        Self(Arc::new(Zeroizing::new(secret.into())))
    }

    /// Generate a new opaque bearer token.
    #[must_use]
    pub fn generate_token() -> String {
        let mut bytes = [0_u8; 32];
        rand::thread_rng().fill_bytes(&mut bytes);
        hex::encode(bytes)
    }

    /// Keyed digest stored in place of `token`.
    #[must_use]
    pub fn digest(&self, token: &str) -> String {
        let mut hasher = Sha256::new();
        hasher.update(self.0.as_bytes());
        hasher.update(b":");
        hasher.update(token.as_bytes());
        hex::encode(hasher.finalize())
    }

    /// Expiry for a token issued at `now`.
    #[must_use]
    pub fn expiry_from(now: DateTime<Utc>) -> DateTime<Utc> {
        now + Duration::hours(TOKEN_TTL_HOURS)
    }
}

impl std::fmt::Debug for TokenKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("TokenKey(..)")
    }
}

/// Result of a successful login or refresh.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginSession {
    pub user: User,
    pub token: String,
    pub expires_at: DateTime<Utc>,
}

/// Resolves callers by validating bearer tokens against the store.
#[derive(Clone)]
pub struct TokenPrincipalResolver {
    tokens: Arc<dyn TokenRepository>,
    users: Arc<dyn UserRepository>,
    clock: Arc<dyn Clock>,
    key: TokenKey,
}

impl TokenPrincipalResolver {
    /// Build a resolver over the token and user repositories.
    pub fn new(
        tokens: Arc<dyn TokenRepository>,
        users: Arc<dyn UserRepository>,
        clock: Arc<dyn Clock>,
        key: TokenKey,
    ) -> Self {
        Self {
            tokens,
            users,
            clock,
            key,
        }
    }
}

#[async_trait]
impl PrincipalResolver for TokenPrincipalResolver {
    async fn resolve(&self, bearer_token: Option<&str>) -> Result<Option<Principal>, Error> {
        let Some(token) = bearer_token else {
            return Ok(None);
        };
        let digest = self.key.digest(token);
        let Some(issued) = self.tokens.find_active(&digest, self.clock.utc()).await? else {
            debug!("bearer token unknown or expired");
            return Ok(None);
        };
        let Some(user) = self.users.find_by_id(&issued.user_id).await? else {
            return Ok(None);
        };
        if user.status == UserStatus::Suspended {
            return Err(Error::forbidden("Account is suspended"));
        }
        Ok(Some(
            Principal::new(user.id, user.role).with_bearer_token(token),
        ))
    }
}
