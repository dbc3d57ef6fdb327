//! Driving port that turns an `Authorization` header into a caller identity.
//!
//! The HTTP authentication middleware only depends on this trait. Production
//! wiring validates bearer tokens against the store; integration suites plug
//! in [`FixturePrincipalResolver`], which trusts a fixed caller.

use std::collections::HashMap;

use async_trait::async_trait;

use crate::domain::{Error, Principal};

/// Resolve the caller for a request.
#[async_trait]
pub trait PrincipalResolver: Send + Sync {
    /// Resolve the caller from the bearer token, if one was presented.
    ///
    /// `Ok(None)` means the request is anonymous.
    async fn resolve(&self, bearer_token: Option<&str>) -> Result<Option<Principal>, Error>;
}

/// Strip the `Bearer ` scheme from an `Authorization` header value.
#[must_use]
pub fn bearer_token(header: &str) -> Option<&str> {
    let (scheme, token) = header.trim().split_once(' ')?;
    let token = token.trim();
    (scheme.eq_ignore_ascii_case("bearer") && !token.is_empty()).then_some(token)
}

/// Resolver returning a fixed caller without validating tokens.
///
/// Known tokens may be mapped to other principals so a suite can act as an
/// administrator for selected requests. The presented token is recorded on
/// the returned principal either way.
#[derive(Debug, Clone, Default)]
pub struct FixturePrincipalResolver {
    default: Option<Principal>,
    tokens: HashMap<String, Principal>,
}

impl FixturePrincipalResolver {
    /// Resolve every request to `principal`.
    #[must_use]
    pub fn new(principal: Principal) -> Self {
        Self {
            default: Some(principal),
            tokens: HashMap::new(),
        }
    }

    /// Resolve every request without a mapped token as anonymous.
    #[must_use]
    pub fn anonymous() -> Self {
        Self::default()
    }

    /// Map `token` to `principal`.
    #[must_use]
    pub fn with_token(mut self, token: impl Into<String>, principal: Principal) -> Self {
        self.tokens.insert(token.into(), principal);
        self
    }
}

#[async_trait]
impl PrincipalResolver for FixturePrincipalResolver {
    async fn resolve(&self, bearer_token: Option<&str>) -> Result<Option<Principal>, Error> {
        let Some(token) = bearer_token else {
            return Ok(self.default.clone());
        };
        let principal = self
            .tokens
            .get(token)
            .or(self.default.as_ref())
            .cloned()
            .map(|principal| principal.with_bearer_token(token));
        Ok(principal)
    }
}
