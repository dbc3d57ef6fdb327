//! Shopping cart use-cases.

use std::sync::Arc;

use mockable::Clock;
use tracing::debug;

use super::ports::{CartRepository, IdGenerator, PersistenceError, ProductRepository};
use super::{Cart, CartItem, Error, Product, check_purchasable, check_quantity};

fn cart_item_not_found() -> Error {
    Error::not_found("Cart item not found")
}

/// Cart service used by the marketplace cart endpoints.
#[derive(Clone)]
pub struct CartService {
    carts: Arc<dyn CartRepository>,
    products: Arc<dyn ProductRepository>,
    ids: Arc<dyn IdGenerator>,
    clock: Arc<dyn Clock>,
}

impl CartService {
    /// Create the service over its repositories.
    pub fn new(
        carts: Arc<dyn CartRepository>,
        products: Arc<dyn ProductRepository>,
        ids: Arc<dyn IdGenerator>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            carts,
            products,
            ids,
            clock,
        }
    }

    /// The user's cart with totals.
    ///
    /// # Errors
    /// Store failures.
    pub async fn cart(&self, user_id: &str) -> Result<Cart, Error> {
        let lines = self.carts.lines_for_user(user_id).await?;
        Ok(Cart::from_lines(lines))
    }

    async fn product(&self, product_id: &str) -> Result<Product, Error> {
        self.products
            .find_by_id(product_id)
            .await?
            .ok_or_else(|| Error::not_found("Product not found"))
    }

    async fn owned_item(&self, user_id: &str, item_id: &str) -> Result<CartItem, Error> {
        let item = self
            .carts
            .find_item(item_id)
            .await?
            .ok_or_else(cart_item_not_found)?;
        if item.user_id != user_id {
            return Err(Error::forbidden("Cart item does not belong to you"));
        }
        Ok(item)
    }

    /// Add `quantity` units of a product, merging with an existing line.
    ///
    /// # Errors
    /// Quantity, availability, ownership and stock rules.
    pub async fn add(
        &self,
        user_id: &str,
        product_id: &str,
        quantity: i32,
    ) -> Result<CartItem, Error> {
        let product_id = product_id.trim();
        if product_id.is_empty() {
            return Err(Error::invalid_request("Product ID is required"));
        }
        check_quantity(quantity)?;
        let product = self.product(product_id).await?;
        let existing = self
            .carts
            .find_by_user_and_product(user_id, product_id)
            .await?;
        let held = existing.as_ref().map_or(0, |item| item.quantity);
        check_purchasable(&product, user_id, held.saturating_add(quantity))?;

        let now = self.clock.utc();
        if let Some(mut item) = existing {
            item.quantity += quantity;
            item.updated_at = now;
            if !self.carts.update_quantity(&item.id, item.quantity, now).await? {
                return Err(cart_item_not_found());
            }
            debug!(cart_item_id = %item.id, quantity = item.quantity, "cart line merged");
            return Ok(item);
        }

        let item = CartItem {
            id: self.ids.next_id(),
            user_id: user_id.to_owned(),
            product_id: product.id,
            quantity,
            created_at: now,
            updated_at: now,
        };
        self.carts.insert(&item).await.map_err(|err| match err {
            PersistenceError::Duplicate { .. } => {
                Error::invalid_request("Product is already in your cart")
            }
            other => other.into(),
        })?;
        Ok(item)
    }

    /// Replace the quantity of one of the user's lines.
    ///
    /// # Errors
    /// Missing or foreign lines plus the stock rules.
    pub async fn update(
        &self,
        user_id: &str,
        item_id: &str,
        quantity: i32,
    ) -> Result<CartItem, Error> {
        check_quantity(quantity)?;
        let mut item = self.owned_item(user_id, item_id).await?;
        let product = self.product(&item.product_id).await?;
        check_purchasable(&product, user_id, quantity)?;
        let now = self.clock.utc();
        if !self.carts.update_quantity(&item.id, quantity, now).await? {
            return Err(cart_item_not_found());
        }
        item.quantity = quantity;
        item.updated_at = now;
        Ok(item)
    }

    /// Remove one of the user's lines.
    ///
    /// # Errors
    /// Missing or foreign lines.
    pub async fn remove(&self, user_id: &str, item_id: &str) -> Result<(), Error> {
        let item = self.owned_item(user_id, item_id).await?;
        if !self.carts.delete(&item.id).await? {
            return Err(cart_item_not_found());
        }
        Ok(())
    }

    /// Empty the user's cart.
    ///
    /// # Errors
    /// Store failures.
    pub async fn clear(&self, user_id: &str) -> Result<u64, Error> {
        Ok(self.carts.clear(user_id).await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ports::{MockCartRepository, MockProductRepository, PrefixedIdGenerator};
    use crate::domain::{ErrorCode, ProductStatus};
    use chrono::Utc;
    use mockable::DefaultClock;
    use rstest::rstest;

    fn product(stock: i32) -> Product {
        let now = Utc::now();
        Product {
            id: "p-1".to_owned(),
            seller_id: "seller".to_owned(),
            name: "Jiko stove".to_owned(),
            description: "Charcoal stove".to_owned(),
            category: "home".to_owned(),
            price: 2500.0,
            stock,
            images: Vec::new(),
            status: ProductStatus::Active,
            county: None,
            town: None,
            rating: 0.0,
            review_count: 0,
            created_at: now,
            updated_at: now,
        }
    }

    fn line(user_id: &str, quantity: i32) -> CartItem {
        let now = Utc::now();
        CartItem {
            id: "c-1".to_owned(),
            user_id: user_id.to_owned(),
            product_id: "p-1".to_owned(),
            quantity,
            created_at: now,
            updated_at: now,
        }
    }

    fn make_service(carts: MockCartRepository, stock: i32) -> CartService {
        let mut products = MockProductRepository::new();
        products
            .expect_find_by_id()
            .returning(move |_| Ok(Some(product(stock))));
        CartService::new(
            Arc::new(carts),
            Arc::new(products),
            Arc::new(PrefixedIdGenerator::new("cart-")),
            Arc::new(DefaultClock),
        )
    }

    #[tokio::test]
    async fn add_inserts_new_line() {
        let mut carts = MockCartRepository::new();
        carts
            .expect_find_by_user_and_product()
            .returning(|_, _| Ok(None));
        carts.expect_insert().times(1).returning(|_| Ok(()));
        let item = make_service(carts, 5)
            .add("buyer", "p-1", 2)
            .await
            .expect("added");
        assert_eq!(item.quantity, 2);
        assert!(item.id.starts_with("cart-"));
    }

    #[tokio::test]
    async fn add_merges_with_existing_line_within_stock() {
        let mut carts = MockCartRepository::new();
        carts
            .expect_find_by_user_and_product()
            .returning(|user, _| Ok(Some(line(user, 2))));
        carts
            .expect_update_quantity()
            .withf(|_, quantity, _| *quantity == 5)
            .times(1)
            .returning(|_, _, _| Ok(true));
        let item = make_service(carts, 5)
            .add("buyer", "p-1", 3)
            .await
            .expect("merged");
        assert_eq!(item.quantity, 5);
    }

    #[tokio::test]
    async fn add_counts_existing_quantity_against_stock() {
        let mut carts = MockCartRepository::new();
        carts
            .expect_find_by_user_and_product()
            .returning(|user, _| Ok(Some(line(user, 4))));
        let err = make_service(carts, 5)
            .add("buyer", "p-1", 2)
            .await
            .expect_err("over stock");
        assert_eq!(err.message(), "Insufficient stock");
    }

    #[rstest]
    #[case(0, "Quantity must be at least 1")]
    #[case(-3, "Quantity must be at least 1")]
    #[tokio::test]
    async fn add_rejects_bad_quantity(#[case] quantity: i32, #[case] expected: &str) {
        let err = make_service(MockCartRepository::new(), 5)
            .add("buyer", "p-1", quantity)
            .await
            .expect_err("bad quantity");
        assert_eq!(err.message(), expected);
    }

    #[tokio::test]
    async fn update_rejects_foreign_line() {
        let mut carts = MockCartRepository::new();
        carts
            .expect_find_item()
            .returning(|_| Ok(Some(line("someone-else", 1))));
        let err = make_service(carts, 5)
            .update("buyer", "c-1", 2)
            .await
            .expect_err("foreign line");
        assert_eq!(err.code(), ErrorCode::Forbidden);
        assert_eq!(err.message(), "Cart item does not belong to you");
    }

    #[tokio::test]
    async fn remove_missing_line_is_not_found() {
        let mut carts = MockCartRepository::new();
        carts.expect_find_item().returning(|_| Ok(None));
        let err = make_service(carts, 5)
            .remove("buyer", "ghost")
            .await
            .expect_err("missing");
        assert_eq!(err.message(), "Cart item not found");
    }
}
