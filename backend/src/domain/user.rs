//! User accounts, registration and profile edits.

use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::password::Password;
use super::{Error, Role};

const MIN_PASSWORD_LEN: usize = 8;

/// Lifecycle state of an account.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UserStatus {
    /// Registered but not yet verified by an administrator.
    Pending,
    /// Allowed to sign in and transact.
    Active,
    /// Blocked from signing in.
    Suspended,
}

impl UserStatus {
    /// Stable storage representation.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Active => "active",
            Self::Suspended => "suspended",
        }
    }
}

impl FromStr for UserStatus {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(Self::Pending),
            "active" => Ok(Self::Active),
            "suspended" => Ok(Self::Suspended),
            _ => Err(Error::invalid_request("Invalid status")),
        }
    }
}

/// Registered account.
///
/// The password hash never leaves the server: it is skipped on
/// serialisation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: String,
    pub email: String,
    pub phone: String,
    #[serde(skip)]
    pub password_hash: String,
    pub first_name: String,
    pub last_name: String,
    pub role: Role,
    pub status: UserStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub county: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub town: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bio: Option<String>,
    pub rating: f64,
    pub is_email_verified: bool,
    pub is_phone_verified: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Sign-up request after transport decoding.
#[derive(Debug, Clone)]
pub struct Registration {
    pub email: String,
    pub phone: String,
    pub password: Password,
    pub first_name: String,
    pub last_name: String,
}

impl Registration {
    /// Check required fields and formats.
    ///
    /// # Errors
    /// Returns an invalid-request error naming the first offending field.
    pub fn validate(&self) -> Result<(), Error> {
        let email = self.email.trim();
        if email.is_empty() {
            return Err(Error::invalid_request("Email is required"));
        }
        if !is_valid_email(email) {
            return Err(Error::invalid_request("Invalid email format"));
        }
        if self.phone.trim().is_empty() {
            return Err(Error::invalid_request("Phone is required"));
        }
        if self.password.chars().count() < MIN_PASSWORD_LEN {
            return Err(Error::invalid_request(
                "Password must be at least 8 characters",
            ));
        }
        if self.first_name.trim().is_empty() {
            return Err(Error::invalid_request("First name is required"));
        }
        if self.last_name.trim().is_empty() {
            return Err(Error::invalid_request("Last name is required"));
        }
        Ok(())
    }

    /// Canonical email used for storage and lookups.
    #[must_use]
    pub fn normalised_email(&self) -> String {
        normalise_email(&self.email)
    }
}

/// Lowercase and trim an email address.
#[must_use]
pub fn normalise_email(email: &str) -> String {
    email.trim().to_lowercase()
}

/// Minimal structural email check: one `@`, a local part and a dotted domain.
#[must_use]
pub fn is_valid_email(email: &str) -> bool {
    let Some((local, domain)) = email.split_once('@') else {
        return false;
    };
    !local.is_empty()
        && !domain.contains('@')
        && domain
            .split_once('.')
            .is_some_and(|(host, tld)| !host.is_empty() && !tld.is_empty())
        && !email.chars().any(char::is_whitespace)
}

/// Partial profile edit.
#[derive(Debug, Clone, Default)]
pub struct ProfileUpdate {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub county: Option<String>,
    pub town: Option<String>,
    pub bio: Option<String>,
}

impl ProfileUpdate {
    /// Apply the supplied fields to `user`.
    ///
    /// # Errors
    /// Rejects names that are present but blank.
    pub fn apply(self, user: &mut User, now: DateTime<Utc>) -> Result<(), Error> {
        if let Some(first_name) = self.first_name {
            let first_name = first_name.trim();
            if first_name.is_empty() {
                return Err(Error::invalid_request("First name cannot be empty"));
            }
            first_name.clone_into(&mut user.first_name);
        }
        if let Some(last_name) = self.last_name {
            let last_name = last_name.trim();
            if last_name.is_empty() {
                return Err(Error::invalid_request("Last name cannot be empty"));
            }
            last_name.clone_into(&mut user.last_name);
        }
        if self.county.is_some() {
            user.county = self.county;
        }
        if self.town.is_some() {
            user.town = self.town;
        }
        if self.bio.is_some() {
            user.bio = self.bio;
        }
        user.updated_at = now;
        Ok(())
    }
}
