//! Checkout and order fulfilment use-cases.

use std::sync::Arc;

use mockable::Clock;
use pagination::{PageRequest, Paginated};
use tracing::info;

use super::ports::{CartRepository, IdGenerator, OrderRepository};
use super::{
    CheckoutDetails, Error, Order, OrderFilter, OrderStatus, authorize_status_change,
    payment_status_after, plan_orders,
};

fn order_not_found() -> Error {
    Error::not_found("Order not found")
}

/// Order service used by the marketplace order endpoints.
#[derive(Clone)]
pub struct OrderService {
    orders: Arc<dyn OrderRepository>,
    carts: Arc<dyn CartRepository>,
    ids: Arc<dyn IdGenerator>,
    clock: Arc<dyn Clock>,
}

impl OrderService {
    /// Create the service over its repositories.
    pub fn new(
        orders: Arc<dyn OrderRepository>,
        carts: Arc<dyn CartRepository>,
        ids: Arc<dyn IdGenerator>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            orders,
            carts,
            ids,
            clock,
        }
    }

    /// Turn the buyer's cart into one order per seller.
    ///
    /// # Errors
    /// Empty carts, stock shortfalls, or store failures.
    pub async fn checkout(
        &self,
        buyer_id: &str,
        details: CheckoutDetails,
    ) -> Result<Vec<Order>, Error> {
        let lines = self.carts.lines_for_user(buyer_id).await?;
        let orders = plan_orders(
            &lines,
            buyer_id,
            &details,
            self.ids.as_ref(),
            self.clock.utc(),
        )?;
        self.orders.checkout(&orders, buyer_id).await?;
        info!(buyer_id, orders = orders.len(), "checkout completed");
        Ok(orders)
    }

    /// Page through the caller's orders.
    ///
    /// # Errors
    /// Store failures.
    pub async fn list(
        &self,
        user_id: &str,
        filter: OrderFilter,
        page: PageRequest,
    ) -> Result<Paginated<Order>, Error> {
        Ok(self.orders.list(user_id, filter, page).await?)
    }

    /// Fetch an order visible to `user_id`.
    ///
    /// # Errors
    /// Not found, or forbidden for users outside the order.
    pub async fn get(&self, user_id: &str, id: &str) -> Result<Order, Error> {
        let order = self
            .orders
            .find_by_id(id)
            .await?
            .ok_or_else(order_not_found)?;
        if !order.involves(user_id) {
            return Err(Error::forbidden("You do not have access to this order"));
        }
        Ok(order)
    }

    /// Move an order to the status named by `status`.
    ///
    /// Cancelling returns the items to stock; completing settles a pending
    /// payment.
    ///
    /// # Errors
    /// Invalid status names, access violations, or terminal orders.
    pub async fn update_status(&self, user_id: &str, id: &str, status: &str) -> Result<Order, Error> {
        let next = status.trim().parse::<OrderStatus>()?;
        let mut order = self
            .orders
            .find_by_id(id)
            .await?
            .ok_or_else(order_not_found)?;
        authorize_status_change(&order, user_id, next)?;

        let payment_status = payment_status_after(order.payment_status, next);
        let now = self.clock.utc();
        let restock = next == OrderStatus::Cancelled;
        if !self
            .orders
            .update_status(id, next, payment_status, restock, now)
            .await?
        {
            return Err(order_not_found());
        }
        info!(order_id = id, status = next.as_str(), "order status changed");
        order.status = next;
        order.payment_status = payment_status;
        order.updated_at = now;
        Ok(order)
    }
}
