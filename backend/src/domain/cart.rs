//! Shopping cart lines and stock checks.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{Error, Product};

/// One product line in a buyer's cart.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CartItem {
    pub id: String,
    pub user_id: String,
    pub product_id: String,
    pub quantity: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Cart line joined with its product.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CartLine {
    #[serde(flatten)]
    pub item: CartItem,
    pub product: Product,
    pub subtotal: f64,
}

impl CartLine {
    /// Join `item` with `product`, computing the line subtotal.
    #[must_use]
    pub fn new(item: CartItem, product: Product) -> Self {
        let subtotal = product.price * f64::from(item.quantity);
        Self {
            item,
            product,
            subtotal,
        }
    }
}

/// Buyer's cart with totals.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Cart {
    pub items: Vec<CartLine>,
    pub total: f64,
    pub item_count: i64,
}

impl Cart {
    /// Summarise `lines`.
    #[must_use]
    pub fn from_lines(items: Vec<CartLine>) -> Self {
        let total = items.iter().map(|line| line.subtotal).sum();
        let item_count = items.iter().map(|line| i64::from(line.item.quantity)).sum();
        Self {
            items,
            total,
            item_count,
        }
    }
}

/// Reject quantities below one.
///
/// # Errors
/// Returns an invalid-request error for zero or negative quantities.
pub fn check_quantity(quantity: i32) -> Result<(), Error> {
    if quantity < 1 {
        Err(Error::invalid_request("Quantity must be at least 1"))
    } else {
        Ok(())
    }
}

/// Decide whether `buyer_id` may hold `requested` units of `product`.
///
/// `requested` is the total the cart line would hold after the change.
///
/// # Errors
/// Returns an invalid-request error naming the broken rule.
pub fn check_purchasable(product: &Product, buyer_id: &str, requested: i32) -> Result<(), Error> {
    if !product.is_active() {
        return Err(Error::invalid_request("Product is not available"));
    }
    if product.is_sold_by(buyer_id) {
        return Err(Error::invalid_request(
            "Cannot add your own product to cart",
        ));
    }
    if product.stock <= 0 {
        return Err(Error::invalid_request("Product is out of stock"));
    }
    if requested > product.stock {
        return Err(Error::invalid_request("Insufficient stock"));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ProductStatus;
    use rstest::{fixture, rstest};

    #[fixture]
    fn product() -> Product {
        let now = Utc::now();
        Product {
            id: "p".to_owned(),
            seller_id: "seller".to_owned(),
            name: "Kiondo basket".to_owned(),
            description: "Woven sisal".to_owned(),
            category: "crafts".to_owned(),
            price: 800.0,
            stock: 3,
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

    #[rstest]
    fn allows_quantity_within_stock(product: Product) {
        assert!(check_purchasable(&product, "buyer", 3).is_ok());
    }

    #[rstest]
    fn rejects_quantity_above_stock(product: Product) {
        let err = check_purchasable(&product, "buyer", 4).expect_err("too many");
        assert_eq!(err.message(), "Insufficient stock");
    }

    #[rstest]
    fn rejects_out_of_stock(mut product: Product) {
        product.stock = 0;
        let err = check_purchasable(&product, "buyer", 1).expect_err("no stock");
        assert!(err.message().contains("out of stock"));
    }

    #[rstest]
    fn rejects_inactive(mut product: Product) {
        product.status = ProductStatus::Inactive;
        let err = check_purchasable(&product, "buyer", 1).expect_err("inactive");
        assert_eq!(err.message(), "Product is not available");
    }

    #[rstest]
    fn rejects_own_listing(product: Product) {
        let err = check_purchasable(&product, "seller", 1).expect_err("own product");
        assert_eq!(err.message(), "Cannot add your own product to cart");
    }

    #[rstest]
    #[case(0)]
    #[case(-2)]
    fn rejects_non_positive_quantity(#[case] quantity: i32) {
        assert!(check_quantity(quantity).is_err());
    }

    #[rstest]
    fn cart_totals_sum_lines(product: Product) {
        let now = Utc::now();
        let item = CartItem {
            id: "c".to_owned(),
            user_id: "buyer".to_owned(),
            product_id: product.id.clone(),
            quantity: 2,
            created_at: now,
            updated_at: now,
        };
        let cart = Cart::from_lines(vec![CartLine::new(item, product)]);
        assert!((cart.total - 1600.0).abs() < f64::EPSILON);
        assert_eq!(cart.item_count, 2);
    }
}
