//! VaultKe backend: marketplace, accounts and notifications over SQLite,
//! plus the HTTP test harness that drives them.

pub mod config;
pub mod domain;
pub mod inbound;
pub mod middleware;
pub mod outbound;
pub mod server;
pub mod summary;
#[cfg(feature = "test-support")]
pub mod test_support;

pub use middleware::Trace;
