//! Marketplace products and their validation rules.

use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::Error;

/// Listing visibility.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProductStatus {
    /// Visible and purchasable.
    Active,
    /// Hidden from buyers.
    Inactive,
}

impl ProductStatus {
    /// Stable storage representation.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Active => "active",
            Self::Inactive => "inactive",
        }
    }
}

impl FromStr for ProductStatus {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "active" => Ok(Self::Active),
            "inactive" => Ok(Self::Inactive),
            _ => Err(Error::invalid_request("Invalid product status")),
        }
    }
}

/// Product listed by a seller.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    pub id: String,
    pub seller_id: String,
    pub name: String,
    pub description: String,
    pub category: String,
    pub price: f64,
    pub stock: i32,
    pub images: Vec<String>,
    pub status: ProductStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub county: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub town: Option<String>,
    pub rating: f64,
    pub review_count: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Product {
    /// Whether `user_id` listed this product.
    #[must_use]
    pub fn is_sold_by(&self, user_id: &str) -> bool {
        self.seller_id == user_id
    }

    /// Whether buyers can currently purchase the product.
    #[must_use]
    pub fn is_active(&self) -> bool {
        matches!(self.status, ProductStatus::Active)
    }
}

fn check_price(price: f64) -> Result<(), Error> {
    if price.is_finite() && price > 0.0 {
        Ok(())
    } else {
        Err(Error::invalid_request("Price must be positive"))
    }
}

fn check_stock(stock: i32) -> Result<(), Error> {
    if stock < 0 {
        Err(Error::invalid_request("Stock cannot be negative"))
    } else {
        Ok(())
    }
}

fn required(value: &str, message: &'static str) -> Result<(), Error> {
    if value.trim().is_empty() {
        Err(Error::invalid_request(message))
    } else {
        Ok(())
    }
}

/// New listing submitted by a seller.
#[derive(Debug, Clone, Default)]
pub struct ProductDraft {
    pub name: String,
    pub description: String,
    pub category: String,
    pub price: f64,
    pub stock: i32,
    pub images: Vec<String>,
    pub county: Option<String>,
    pub town: Option<String>,
}

impl ProductDraft {
    /// Check required text fields and numeric ranges.
    ///
    /// Categories are free-form; any non-empty label is accepted.
    ///
    /// # Errors
    /// Returns an invalid-request error for the first failing rule.
    pub fn validate(&self) -> Result<(), Error> {
        required(&self.name, "Product name is required")?;
        required(&self.description, "Description is required")?;
        required(&self.category, "Category is required")?;
        check_price(self.price)?;
        check_stock(self.stock)
    }

    /// Materialise the listing for `seller_id`.
    #[must_use]
    pub fn into_product(self, id: String, seller_id: &str, now: DateTime<Utc>) -> Product {
        Product {
            id,
            seller_id: seller_id.to_owned(),
            name: self.name.trim().to_owned(),
            description: self.description.trim().to_owned(),
            category: self.category.trim().to_lowercase(),
            price: self.price,
            stock: self.stock,
            images: self.images,
            status: ProductStatus::Active,
            county: self.county,
            town: self.town,
            rating: 0.0,
            review_count: 0,
            created_at: now,
            updated_at: now,
        }
    }
}

/// Partial listing edit.
#[derive(Debug, Clone, Default)]
pub struct ProductPatch {
    pub name: Option<String>,
    pub description: Option<String>,
    pub category: Option<String>,
    pub price: Option<f64>,
    pub stock: Option<i32>,
    pub images: Option<Vec<String>>,
    pub status: Option<ProductStatus>,
    pub county: Option<String>,
    pub town: Option<String>,
}

impl ProductPatch {
    /// Validate and apply the supplied fields to `product`.
    ///
    /// # Errors
    /// Applies the same rules as [`ProductDraft::validate`] to present fields.
    pub fn apply(self, product: &mut Product, now: DateTime<Utc>) -> Result<(), Error> {
        if let Some(name) = self.name {
            required(&name, "Product name is required")?;
            product.name = name.trim().to_owned();
        }
        if let Some(description) = self.description {
            required(&description, "Description is required")?;
            product.description = description.trim().to_owned();
        }
        if let Some(category) = self.category {
            required(&category, "Category is required")?;
            product.category = category.trim().to_lowercase();
        }
        if let Some(price) = self.price {
            check_price(price)?;
            product.price = price;
        }
        if let Some(stock) = self.stock {
            check_stock(stock)?;
            product.stock = stock;
        }
        if let Some(images) = self.images {
            product.images = images;
        }
        if let Some(status) = self.status {
            product.status = status;
        }
        if self.county.is_some() {
            product.county = self.county;
        }
        if self.town.is_some() {
            product.town = self.town;
        }
        product.updated_at = now;
        Ok(())
    }
}

/// Listing filters accepted by the catalogue endpoints.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ProductFilter {
    pub category: Option<String>,
    pub county: Option<String>,
    pub min_price: Option<f64>,
    pub max_price: Option<f64>,
    pub search: Option<String>,
    pub seller_id: Option<String>,
    /// `None` lists every status.
    pub status: Option<ProductStatus>,
}

impl ProductFilter {
    /// Filter showing only purchasable listings.
    #[must_use]
    pub fn active() -> Self {
        Self {
            status: Some(ProductStatus::Active),
            ..Self::default()
        }
    }

    /// Reject inverted price ranges.
    ///
    /// # Errors
    /// Returns an invalid-request error when bounds are negative or crossed.
    pub fn validate(&self) -> Result<(), Error> {
        if self.min_price.is_some_and(|min| min < 0.0) || self.max_price.is_some_and(|max| max < 0.0)
        {
            return Err(Error::invalid_request("Price filters cannot be negative"));
        }
        if let (Some(min), Some(max)) = (self.min_price, self.max_price) {
            if min > max {
                return Err(Error::invalid_request(
                    "minPrice cannot be greater than maxPrice",
                ));
            }
        }
        Ok(())
    }
}

/// Category label with the number of active listings in it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CategorySummary {
    pub name: String,
    pub count: u64,
}
