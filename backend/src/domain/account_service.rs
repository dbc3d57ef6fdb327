//! Account use-cases: registration, login, tokens, profiles and
//! administration.

use std::sync::Arc;

use mockable::Clock;
use pagination::{PageRequest, Paginated};
use tracing::info;

use super::password::{Password, hash_password, verify_password};
use super::ports::{IdGenerator, IssuedToken, PersistenceError, TokenRepository, UserRepository};
use super::session::{LoginSession, TokenKey};
use super::{Error, Principal, ProfileUpdate, Registration, Role, User, UserStatus, normalise_email};

/// Account service shared by the auth, users and admin endpoints.
#[derive(Clone)]
pub struct AccountService {
    users: Arc<dyn UserRepository>,
    tokens: Arc<dyn TokenRepository>,
    ids: Arc<dyn IdGenerator>,
    clock: Arc<dyn Clock>,
    key: TokenKey,
}

fn user_not_found() -> Error {
    Error::not_found("User not found")
}

impl AccountService {
    /// Create the service over its repositories.
    pub fn new(
        users: Arc<dyn UserRepository>,
        tokens: Arc<dyn TokenRepository>,
        ids: Arc<dyn IdGenerator>,
        clock: Arc<dyn Clock>,
        key: TokenKey,
    ) -> Self {
        Self {
            users,
            tokens,
            ids,
            clock,
            key,
        }
    }

    /// Register a pending account with the `user` role.
    ///
    /// # Errors
    /// Validation failures, duplicate email or phone, or store failures.
    pub async fn register(&self, registration: Registration) -> Result<User, Error> {
        registration.validate()?;
        let email = registration.normalised_email();
        let phone = registration.phone.trim().to_owned();
        if self.users.find_by_email(&email).await?.is_some() {
            return Err(Error::invalid_request("User with this email already exists"));
        }
        if self.users.find_by_phone(&phone).await?.is_some() {
            return Err(Error::invalid_request("User with this phone already exists"));
        }

        let now = self.clock.utc();
        let user = User {
            id: self.ids.next_id(),
            email,
            phone,
            password_hash: hash_password(&registration.password)?,
            first_name: registration.first_name.trim().to_owned(),
            last_name: registration.last_name.trim().to_owned(),
            role: Role::User,
            status: UserStatus::Pending,
            county: None,
            town: None,
            bio: None,
            rating: 0.0,
            is_email_verified: false,
            is_phone_verified: false,
            created_at: now,
            updated_at: now,
        };
        self.users.insert(&user).await.map_err(|err| match err {
            PersistenceError::Duplicate { .. } => {
                Error::invalid_request("User with this email already exists")
            }
            other => other.into(),
        })?;
        info!(user_id = %user.id, "account registered");
        Ok(user)
    }

    /// Exchange credentials for a bearer token.
    ///
    /// # Errors
    /// Unauthorized for unknown emails or wrong passwords; forbidden for
    /// suspended accounts.
    pub async fn login(&self, email: &str, password: &Password) -> Result<LoginSession, Error> {
        let invalid = || Error::unauthorized("Invalid credentials");
        let user = self
            .users
            .find_by_email(&normalise_email(email))
            .await?
            .ok_or_else(invalid)?;
        if !verify_password(password, &user.password_hash) {
            return Err(invalid());
        }
        if user.status == UserStatus::Suspended {
            return Err(Error::forbidden("Account is suspended"));
        }
        self.issue(user).await
    }

    /// Revoke the caller's presented token.
    ///
    /// # Errors
    /// Store failures only; unknown tokens are ignored.
    pub async fn logout(&self, principal: &Principal) -> Result<(), Error> {
        if let Some(token) = principal.bearer_token() {
            let revoked = self.tokens.revoke(&self.key.digest(token)).await?;
            info!(user_id = principal.user_id(), revoked, "logout");
        }
        Ok(())
    }

    /// Replace the caller's token with a fresh one.
    ///
    /// # Errors
    /// Unauthorized without a bearer token; not found when the account is
    /// gone.
    pub async fn refresh(&self, principal: &Principal) -> Result<LoginSession, Error> {
        let token = principal
            .bearer_token()
            .ok_or_else(|| Error::unauthorized("Authentication required"))?;
        let user = self.profile(principal.user_id()).await?;
        self.tokens.revoke(&self.key.digest(token)).await?;
        self.issue(user).await
    }

    async fn issue(&self, user: User) -> Result<LoginSession, Error> {
        let token = TokenKey::generate_token();
        let expires_at = TokenKey::expiry_from(self.clock.utc());
        self.tokens
            .insert(&IssuedToken {
                id: self.ids.next_id(),
                user_id: user.id.clone(),
                token_hash: self.key.digest(&token),
                expires_at,
            })
            .await?;
        Ok(LoginSession {
            user,
            token,
            expires_at,
        })
    }

    /// Load an account.
    ///
    /// # Errors
    /// Not found when the id is unknown.
    pub async fn profile(&self, user_id: &str) -> Result<User, Error> {
        self.users
            .find_by_id(user_id)
            .await?
            .ok_or_else(user_not_found)
    }

    /// Apply a profile edit to the caller's account.
    ///
    /// # Errors
    /// Validation failures or a missing account.
    pub async fn update_profile(&self, user_id: &str, update: ProfileUpdate) -> Result<User, Error> {
        let mut user = self.profile(user_id).await?;
        update.apply(&mut user, self.clock.utc())?;
        if !self.users.update(&user).await? {
            return Err(user_not_found());
        }
        Ok(user)
    }

    /// Page through accounts.
    ///
    /// # Errors
    /// Store failures.
    pub async fn list_users(
        &self,
        search: Option<String>,
        page: PageRequest,
    ) -> Result<Paginated<User>, Error> {
        let search = search.map(|s| s.trim().to_owned()).filter(|s| !s.is_empty());
        Ok(self.users.list(search, page).await?)
    }

    /// Change an account's role.
    ///
    /// # Errors
    /// Invalid role names or a missing account.
    pub async fn set_role(&self, user_id: &str, role: &str) -> Result<User, Error> {
        let role = role
            .trim()
            .parse::<Role>()
            .map_err(|_| Error::invalid_request("Invalid role"))?;
        let mut user = self.profile(user_id).await?;
        user.role = role;
        user.updated_at = self.clock.utc();
        self.save(&user).await?;
        info!(user_id, role = role.as_str(), "role changed");
        Ok(user)
    }

    /// Change an account's status.
    ///
    /// # Errors
    /// Invalid status names or a missing account.
    pub async fn set_status(&self, user_id: &str, status: &str) -> Result<User, Error> {
        let status = status.trim().parse::<UserStatus>()?;
        let mut user = self.profile(user_id).await?;
        user.status = status;
        user.updated_at = self.clock.utc();
        self.save(&user).await?;
        info!(user_id, status = status.as_str(), "status changed");
        Ok(user)
    }

    /// Delete an account on behalf of `actor`.
    ///
    /// # Errors
    /// Rejects self-deletion and unknown ids.
    pub async fn delete_user(&self, actor: &Principal, user_id: &str) -> Result<(), Error> {
        if actor.user_id() == user_id {
            return Err(Error::invalid_request("Cannot delete your own account"));
        }
        if !self.users.delete(user_id).await? {
            return Err(user_not_found());
        }
        info!(user_id, actor = actor.user_id(), "account deleted");
        Ok(())
    }

    async fn save(&self, user: &User) -> Result<(), Error> {
        if self.users.update(user).await? {
            Ok(())
        } else {
            Err(user_not_found())
        }
    }
}

#[cfg(test)]
#[path = "account_service_tests.rs"]
mod tests;
