//! Port abstraction for marketplace orders.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use pagination::{PageRequest, Paginated};

use crate::domain::{Error, Order, OrderFilter, OrderStatus, PaymentStatus};

use super::{PersistenceError, define_port_error};

define_port_error! {
    /// Failures raised while converting a cart into orders.
    pub enum CheckoutError {
        /// The store is closed or unreachable.
        Connection { message: String } => "database connection failed: {message}",
        /// A statement failed while executing.
        Query { message: String } => "database query failed: {message}",
        /// Another checkout consumed the stock first.
        InsufficientStock { product_name: String } => "Insufficient stock for {product_name}",
    }
}

impl From<PersistenceError> for CheckoutError {
    fn from(error: PersistenceError) -> Self {
        match error {
            PersistenceError::Connection { message } => Self::Connection { message },
            PersistenceError::Query { message } | PersistenceError::Duplicate { message } => {
                Self::Query { message }
            }
        }
    }
}

impl From<CheckoutError> for Error {
    fn from(error: CheckoutError) -> Self {
        match error {
            CheckoutError::Connection { message } => PersistenceError::connection(message).into(),
            CheckoutError::Query { message } => PersistenceError::query(message).into(),
            err @ CheckoutError::InsufficientStock { .. } => Self::invalid_request(err.to_string()),
        }
    }
}

/// Order storage.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait OrderRepository: Send + Sync {
    /// Atomically insert `orders` with their items, decrement product stock
    /// and clear the buyer's cart.
    async fn checkout(&self, orders: &[Order], buyer_id: &str) -> Result<(), CheckoutError>;

    /// Fetch an order with its items.
    async fn find_by_id(&self, id: &str) -> Result<Option<Order>, PersistenceError>;

    /// Page through the orders `user_id` placed or received, newest first.
    async fn list(
        &self,
        user_id: &str,
        filter: OrderFilter,
        page: PageRequest,
    ) -> Result<Paginated<Order>, PersistenceError>;

    /// Move an order to `status`. When `restock` is set the item quantities
    /// are returned to product stock in the same transaction.
    async fn update_status(
        &self,
        id: &str,
        status: OrderStatus,
        payment_status: PaymentStatus,
        restock: bool,
        now: DateTime<Utc>,
    ) -> Result<bool, PersistenceError>;
}
