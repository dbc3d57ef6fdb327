//! Port abstraction for shopping carts.

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::domain::{CartItem, CartLine};

use super::PersistenceError;

/// Cart storage.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait CartRepository: Send + Sync {
    /// Every line in the user's cart joined with its product, oldest first.
    async fn lines_for_user(&self, user_id: &str) -> Result<Vec<CartLine>, PersistenceError>;

    /// Fetch one cart line by identifier.
    async fn find_item(&self, id: &str) -> Result<Option<CartItem>, PersistenceError>;

    /// The user's line for `product_id`, if present.
    async fn find_by_user_and_product(
        &self,
        user_id: &str,
        product_id: &str,
    ) -> Result<Option<CartItem>, PersistenceError>;

    /// Insert a new line.
    async fn insert(&self, item: &CartItem) -> Result<(), PersistenceError>;

    /// Overwrite a line's quantity.
    async fn update_quantity(
        &self,
        id: &str,
        quantity: i32,
        now: DateTime<Utc>,
    ) -> Result<bool, PersistenceError>;

    /// Remove one line.
    async fn delete(&self, id: &str) -> Result<bool, PersistenceError>;

    /// Remove every line of the user's cart, returning how many were removed.
    async fn clear(&self, user_id: &str) -> Result<u64, PersistenceError>;
}
