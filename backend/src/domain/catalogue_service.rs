//! Product catalogue use-cases: listings, categories, search and reviews.

use std::sync::Arc;

use mockable::Clock;
use pagination::{PageRequest, Paginated};
use tracing::info;

use super::ports::{IdGenerator, PersistenceError, ProductRepository, ReviewRepository};
use super::{
    CategorySummary, Error, Product, ProductDraft, ProductFilter, ProductPatch, Review,
    ReviewDraft,
};

fn product_not_found() -> Error {
    Error::not_found("Product not found")
}

/// Catalogue service used by the marketplace product and review endpoints.
#[derive(Clone)]
pub struct CatalogueService {
    products: Arc<dyn ProductRepository>,
    reviews: Arc<dyn ReviewRepository>,
    ids: Arc<dyn IdGenerator>,
    clock: Arc<dyn Clock>,
}

impl CatalogueService {
    /// Create the service over its repositories.
    pub fn new(
        products: Arc<dyn ProductRepository>,
        reviews: Arc<dyn ReviewRepository>,
        ids: Arc<dyn IdGenerator>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            products,
            reviews,
            ids,
            clock,
        }
    }

    /// Page through listings.
    ///
    /// # Errors
    /// Invalid price bounds or store failures.
    pub async fn list(
        &self,
        filter: ProductFilter,
        page: PageRequest,
    ) -> Result<Paginated<Product>, Error> {
        filter.validate()?;
        Ok(self.products.list(filter, page).await?)
    }

    /// Full-text search over active listings.
    ///
    /// # Errors
    /// Rejects blank queries.
    pub async fn search(
        &self,
        query: Option<String>,
        mut filter: ProductFilter,
        page: PageRequest,
    ) -> Result<Paginated<Product>, Error> {
        let query = query
            .map(|q| q.trim().to_owned())
            .filter(|q| !q.is_empty())
            .ok_or_else(|| Error::invalid_request("Search query is required"))?;
        filter.search = Some(query);
        self.list(filter, page).await
    }

    /// Categories of active listings.
    ///
    /// # Errors
    /// Store failures.
    pub async fn categories(&self) -> Result<Vec<CategorySummary>, Error> {
        Ok(self.products.categories().await?)
    }

    /// Fetch one listing.
    ///
    /// # Errors
    /// Not found when the id is unknown.
    pub async fn get(&self, id: &str) -> Result<Product, Error> {
        self.products
            .find_by_id(id)
            .await?
            .ok_or_else(product_not_found)
    }

    /// Publish a listing for `seller_id`.
    ///
    /// # Errors
    /// Validation or store failures.
    pub async fn create(&self, seller_id: &str, draft: ProductDraft) -> Result<Product, Error> {
        draft.validate()?;
        let product = draft.into_product(self.ids.next_id(), seller_id, self.clock.utc());
        self.products.insert(&product).await?;
        info!(product_id = %product.id, seller_id, "product listed");
        Ok(product)
    }

    /// Edit a listing owned by `seller_id`.
    ///
    /// # Errors
    /// Not found, forbidden for other sellers, or validation failures.
    pub async fn update(
        &self,
        seller_id: &str,
        id: &str,
        patch: ProductPatch,
    ) -> Result<Product, Error> {
        let mut product = self.get(id).await?;
        if !product.is_sold_by(seller_id) {
            return Err(Error::forbidden("Only the seller can update this product"));
        }
        patch.apply(&mut product, self.clock.utc())?;
        if !self.products.update(&product).await? {
            return Err(product_not_found());
        }
        Ok(product)
    }

    /// Remove a listing owned by `seller_id`.
    ///
    /// # Errors
    /// Not found or forbidden for other sellers.
    pub async fn delete(&self, seller_id: &str, id: &str) -> Result<(), Error> {
        let product = self.get(id).await?;
        if !product.is_sold_by(seller_id) {
            return Err(Error::forbidden("Only the seller can delete this product"));
        }
        if !self.products.delete(id).await? {
            return Err(product_not_found());
        }
        info!(product_id = id, seller_id, "product removed");
        Ok(())
    }

    /// Reviews for a product.
    ///
    /// # Errors
    /// Not found when the product is unknown.
    pub async fn reviews(
        &self,
        product_id: &str,
        page: PageRequest,
    ) -> Result<Paginated<Review>, Error> {
        self.get(product_id).await?;
        Ok(self.reviews.list_for_product(product_id, page).await?)
    }

    /// Record `user_id`'s review and refresh the product rating.
    ///
    /// # Errors
    /// Validation failures, reviewing one's own product, or a second review.
    pub async fn review(&self, user_id: &str, draft: ReviewDraft) -> Result<Review, Error> {
        draft.validate()?;
        let product = self.get(draft.product_id.trim()).await?;
        if product.is_sold_by(user_id) {
            return Err(Error::invalid_request("Cannot review your own product"));
        }
        let already_reviewed = || Error::invalid_request("You have already reviewed this product");
        if self
            .reviews
            .find_by_user_and_product(user_id, &product.id)
            .await?
            .is_some()
        {
            return Err(already_reviewed());
        }
        let review = Review {
            id: self.ids.next_id(),
            user_id: user_id.to_owned(),
            product_id: product.id,
            rating: draft.rating,
            comment: draft.comment.trim().to_owned(),
            created_at: self.clock.utc(),
        };
        self.reviews
            .insert_and_rerate(&review)
            .await
            .map_err(|err| match err {
                PersistenceError::Duplicate { .. } => already_reviewed(),
                other => other.into(),
            })?;
        Ok(review)
    }
}

#[cfg(test)]
#[path = "catalogue_service_tests.rs"]
mod tests;
