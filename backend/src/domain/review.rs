//! Product reviews.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::Error;

/// Buyer's rating of a product. Ratings are whole stars from 1 to 5.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Review {
    pub id: String,
    pub user_id: String,
    pub product_id: String,
    pub rating: i32,
    pub comment: String,
    pub created_at: DateTime<Utc>,
}

/// Review submitted by a buyer.
#[derive(Debug, Clone, Default)]
pub struct ReviewDraft {
    pub product_id: String,
    pub rating: i32,
    pub comment: String,
}

impl ReviewDraft {
    /// Check the product reference and rating range.
    ///
    /// # Errors
    /// Returns an invalid-request error for a missing product or bad rating.
    pub fn validate(&self) -> Result<(), Error> {
        if self.product_id.trim().is_empty() {
            return Err(Error::invalid_request("Product ID is required"));
        }
        if !(1..=5).contains(&self.rating) {
            return Err(Error::invalid_request("Rating must be between 1 and 5"));
        }
        Ok(())
    }
}

/// Mean of `ratings`, or zero when there are none.
#[must_use]
pub fn average_rating(ratings: &[i32]) -> f64 {
    if ratings.is_empty() {
        return 0.0;
    }
    let sum: i64 = ratings.iter().copied().map(i64::from).sum();
    let count = i32::try_from(ratings.len()).unwrap_or(i32::MAX);
    // Ratings are small integers, so the sum fits losslessly in an f64.
    f64::from(i32::try_from(sum).unwrap_or(i32::MAX)) / f64::from(count)
}
