//! Port abstraction for the product catalogue and its reviews.

use async_trait::async_trait;
use pagination::{PageRequest, Paginated};

use crate::domain::{CategorySummary, Product, ProductFilter, Review};

use super::PersistenceError;

/// Product listing storage.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ProductRepository: Send + Sync {
    /// Insert a new listing.
    async fn insert(&self, product: &Product) -> Result<(), PersistenceError>;

    /// Fetch a listing by identifier regardless of status.
    async fn find_by_id(&self, id: &str) -> Result<Option<Product>, PersistenceError>;

    /// Persist every mutable column of `product`.
    async fn update(&self, product: &Product) -> Result<bool, PersistenceError>;

    /// Remove a listing. Returns `false` when it did not exist.
    async fn delete(&self, id: &str) -> Result<bool, PersistenceError>;

    /// Page through listings matching `filter`, newest first.
    async fn list(
        &self,
        filter: ProductFilter,
        page: PageRequest,
    ) -> Result<Paginated<Product>, PersistenceError>;

    /// Distinct categories of active listings with their sizes.
    async fn categories(&self) -> Result<Vec<CategorySummary>, PersistenceError>;
}

/// Review storage.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ReviewRepository: Send + Sync {
    /// Page through a product's reviews, newest first.
    async fn list_for_product(
        &self,
        product_id: &str,
        page: PageRequest,
    ) -> Result<Paginated<Review>, PersistenceError>;

    /// The review `user_id` left on `product_id`, if any.
    async fn find_by_user_and_product(
        &self,
        user_id: &str,
        product_id: &str,
    ) -> Result<Option<Review>, PersistenceError>;

    /// Insert `review` and recompute the product's rating and review count
    /// in the same transaction.
    async fn insert_and_rerate(&self, review: &Review) -> Result<(), PersistenceError>;
}
