//! SQLite persistence adapters using Diesel ORM.
//!
//! This module provides concrete implementations of domain repository ports
//! backed by SQLite via Diesel, driven from async handlers through
//! `diesel-async`'s `SyncConnectionWrapper`.
//!
//! # Architecture
//!
//! - **Thin adapters**: repository implementations only translate between
//!   Diesel rows and domain types. Business rules stay in domain services.
//! - **Internal models**: row structs (`models.rs`) and table definitions
//!   (`schema.rs`) never leave this module.
//! - **One shared connection**: every adapter holds a clone of [`Store`];
//!   closing the store fails all later operations with a connection error.
//!
//! # Example
//!
//! ```no_run
//! # async fn demo() -> Result<(), vaultke::outbound::persistence::StoreError> {
//! use vaultke::outbound::persistence::{DieselUserRepository, Store};
//!
//! let store = Store::open_in_memory().await?;
//! let users = DieselUserRepository::new(store.clone());
//! # let _ = users;
//! # Ok(())
//! # }
//! ```

mod diesel_cart_repository;
pub(crate) mod diesel_helpers;
mod diesel_notification_repository;
mod diesel_order_repository;
mod diesel_product_repository;
mod diesel_user_repository;
mod models;
mod schema;
mod store;
#[cfg(test)]
mod test_helpers;

pub use diesel_cart_repository::DieselCartRepository;
pub use diesel_notification_repository::{
    DieselNotificationRepository, DieselNotificationSettingsRepository,
};
pub use diesel_order_repository::DieselOrderRepository;
pub use diesel_product_repository::{DieselProductRepository, DieselReviewRepository};
pub use diesel_user_repository::{DieselTokenRepository, DieselUserRepository};
pub use store::{SqliteConn, Store, StoreError};
