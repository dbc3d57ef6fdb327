//! Request middleware.
//!
//! Purpose: request lifecycle concerns shared by every route, namely trace
//! identifiers and caller resolution.

pub mod auth;
pub mod trace;

pub use auth::Authenticate;
pub use trace::Trace;
