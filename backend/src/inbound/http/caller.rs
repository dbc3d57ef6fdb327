//! Caller extractor keeping handlers free of request-extension plumbing.
//!
//! The authentication middleware stores the resolved [`Principal`] in the
//! request extensions; [`Caller`] reads it back and offers the two access
//! checks handlers need.

use actix_web::{FromRequest, HttpMessage as _, HttpRequest, dev::Payload};
use futures_util::future::{Ready, ready};

use crate::domain::{Error, Principal};

/// Identity of the request's caller, if one was resolved.
#[derive(Debug, Clone, Default)]
pub struct Caller(Option<Principal>);

impl Caller {
    /// Wrap an optional principal.
    #[must_use]
    pub fn new(principal: Option<Principal>) -> Self {
        Self(principal)
    }

    /// The resolved principal, if any.
    #[must_use]
    pub fn principal(&self) -> Option<&Principal> {
        self.0.as_ref()
    }

    /// Require an authenticated caller.
    ///
    /// # Errors
    /// `401 Unauthorized` for anonymous requests.
    pub fn require_user(&self) -> Result<&Principal, Error> {
        self.0
            .as_ref()
            .ok_or_else(|| Error::unauthorized("Authentication required"))
    }

    /// Require an authenticated administrator.
    ///
    /// # Errors
    /// `401` for anonymous requests, `403` for non-admin callers.
    pub fn require_admin(&self) -> Result<&Principal, Error> {
        let principal = self.require_user()?;
        if principal.is_admin() {
            Ok(principal)
        } else {
            Err(Error::forbidden("Admin access required"))
        }
    }
}

impl FromRequest for Caller {
    type Error = Error;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        ready(Ok(Self(req.extensions().get::<Principal>().cloned())))
    }
}
