//! Authenticated caller identity.
//!
//! A [`Principal`] is resolved once per request by the authentication
//! middleware and read by handlers through the `Caller` extractor.

use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Account role governing access to administrative routes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// Regular marketplace and chama member.
    User,
    /// Platform administrator.
    Admin,
}

impl Role {
    /// Stable storage representation.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::User => "user",
            Self::Admin => "admin",
        }
    }
}

/// Error returned when a role string is not recognised.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown role: {0}")]
pub struct UnknownRole(pub String);

impl FromStr for Role {
    type Err = UnknownRole;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "user" => Ok(Self::User),
            "admin" => Ok(Self::Admin),
            other => Err(UnknownRole(other.to_owned())),
        }
    }
}

/// Caller identity attached to a request.
///
/// # Examples
/// ```
/// use vaultke::domain::{Principal, Role};
///
/// let principal = Principal::new("test-user-123", Role::User).with_bearer_token("abc");
/// assert_eq!(principal.user_id(), "test-user-123");
/// assert_eq!(principal.bearer_token(), Some("abc"));
/// assert!(!principal.is_admin());
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Principal {
    user_id: String,
    role: Role,
    bearer_token: Option<String>,
}

impl Principal {
    /// Create a principal without an associated bearer token.
    pub fn new(user_id: impl Into<String>, role: Role) -> Self {
        Self {
            user_id: user_id.into(),
            role,
            bearer_token: None,
        }
    }

    /// Record the bearer token presented with the request.
    #[must_use]
    pub fn with_bearer_token(mut self, token: impl Into<String>) -> Self {
        self.bearer_token = Some(token.into());
        self
    }

    /// Identifier of the calling user.
    #[must_use]
    pub fn user_id(&self) -> &str {
        &self.user_id
    }

    /// Role of the calling user.
    #[must_use]
    pub fn role(&self) -> Role {
        self.role
    }

    /// Bearer token presented with the request, if any.
    #[must_use]
    pub fn bearer_token(&self) -> Option<&str> {
        self.bearer_token.as_deref()
    }

    /// Whether the caller holds the administrator role.
    #[must_use]
    pub fn is_admin(&self) -> bool {
        matches!(self.role, Role::Admin)
    }
}
