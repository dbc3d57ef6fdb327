//! Outbound adapters implementing domain ports for external infrastructure.
//!
//! This module follows the hexagonal architecture pattern: the only
//! infrastructure VaultKe talks to directly is its SQLite store, reached
//! through the Diesel repositories in [`persistence`]. Adapters are thin
//! translators between domain types and rows. They contain no business logic.

pub mod persistence;
