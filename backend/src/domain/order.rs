//! Orders placed from a buyer's cart.
//!
//! Checkout splits the cart into one order per seller. Orders move through
//! the fulfilment statuses until they are completed or cancelled, after
//! which they are immutable.

use std::collections::BTreeMap;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::ports::IdGenerator;
use super::{CartLine, Error};

/// Fulfilment status of an order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OrderStatus {
    Pending,
    Confirmed,
    Processing,
    Shipped,
    Delivered,
    Completed,
    Cancelled,
}

impl OrderStatus {
    /// Stable storage representation.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Confirmed => "confirmed",
            Self::Processing => "processing",
            Self::Shipped => "shipped",
            Self::Delivered => "delivered",
            Self::Completed => "completed",
            Self::Cancelled => "cancelled",
        }
    }

    /// Completed and cancelled orders accept no further changes.
    #[must_use]
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Completed | Self::Cancelled)
    }
}

impl FromStr for OrderStatus {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(Self::Pending),
            "confirmed" => Ok(Self::Confirmed),
            "processing" => Ok(Self::Processing),
            "shipped" => Ok(Self::Shipped),
            "delivered" => Ok(Self::Delivered),
            "completed" => Ok(Self::Completed),
            "cancelled" => Ok(Self::Cancelled),
            _ => Err(Error::invalid_request("Invalid order status")),
        }
    }
}

/// Settlement state of an order's payment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PaymentStatus {
    Pending,
    Paid,
    Failed,
    Refunded,
}

impl PaymentStatus {
    /// Stable storage representation.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Paid => "paid",
            Self::Failed => "failed",
            Self::Refunded => "refunded",
        }
    }
}

impl FromStr for PaymentStatus {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(Self::Pending),
            "paid" => Ok(Self::Paid),
            "failed" => Ok(Self::Failed),
            "refunded" => Ok(Self::Refunded),
            _ => Err(Error::invalid_request("Invalid payment status")),
        }
    }
}

/// Payment channel chosen at checkout.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PaymentMethod {
    Mpesa,
    Wallet,
    Cash,
}

impl PaymentMethod {
    /// Stable storage representation.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Mpesa => "mpesa",
            Self::Wallet => "wallet",
            Self::Cash => "cash",
        }
    }
}

impl FromStr for PaymentMethod {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "mpesa" => Ok(Self::Mpesa),
            "wallet" => Ok(Self::Wallet),
            "cash" => Ok(Self::Cash),
            _ => Err(Error::invalid_request("Invalid payment method")),
        }
    }
}

/// Product snapshot captured at purchase time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderItem {
    pub id: String,
    pub order_id: String,
    pub product_id: String,
    pub name: String,
    pub quantity: i32,
    pub price: f64,
}

/// Order between one buyer and one seller.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Order {
    pub id: String,
    pub buyer_id: String,
    pub seller_id: String,
    pub total_amount: f64,
    pub status: OrderStatus,
    pub payment_method: PaymentMethod,
    pub payment_status: PaymentStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub delivery_county: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub delivery_town: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub delivery_phone: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    pub items: Vec<OrderItem>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Order {
    /// Whether `user_id` is the buyer or the seller.
    #[must_use]
    pub fn involves(&self, user_id: &str) -> bool {
        self.buyer_id == user_id || self.seller_id == user_id
    }
}

/// Which side of the orders the caller wants to list.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum OrderRole {
    #[default]
    Buyer,
    Seller,
}

impl FromStr for OrderRole {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "buyer" => Ok(Self::Buyer),
            "seller" => Ok(Self::Seller),
            _ => Err(Error::invalid_request("Role must be buyer or seller")),
        }
    }
}

/// Order listing filter.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct OrderFilter {
    pub role: OrderRole,
    pub status: Option<OrderStatus>,
}

/// Delivery and payment details supplied at checkout.
#[derive(Debug, Clone)]
pub struct CheckoutDetails {
    pub payment_method: PaymentMethod,
    pub delivery_county: Option<String>,
    pub delivery_town: Option<String>,
    pub delivery_phone: Option<String>,
    pub notes: Option<String>,
}

/// Split `lines` into one pending order per seller.
///
/// # Errors
/// Fails when the cart is empty or a line no longer fits the product's
/// stock or availability.
pub fn plan_orders(
    lines: &[CartLine],
    buyer_id: &str,
    details: &CheckoutDetails,
    ids: &dyn IdGenerator,
    now: DateTime<Utc>,
) -> Result<Vec<Order>, Error> {
    if lines.is_empty() {
        return Err(Error::invalid_request("Cart is empty"));
    }

    let mut by_seller: BTreeMap<&str, Vec<&CartLine>> = BTreeMap::new();
    for line in lines {
        let product = &line.product;
        if !product.is_active() {
            return Err(Error::invalid_request(format!(
                "Product {} is no longer available",
                product.name
            )));
        }
        if line.item.quantity > product.stock {
            return Err(Error::invalid_request(format!(
                "Insufficient stock for {}",
                product.name
            )));
        }
        by_seller
            .entry(product.seller_id.as_str())
            .or_default()
            .push(line);
    }

    let orders = by_seller
        .into_iter()
        .map(|(seller_id, seller_lines)| {
            let order_id = ids.next_id();
            let items: Vec<OrderItem> = seller_lines
                .iter()
                .map(|line| OrderItem {
                    id: ids.next_id(),
                    order_id: order_id.clone(),
                    product_id: line.product.id.clone(),
                    name: line.product.name.clone(),
                    quantity: line.item.quantity,
                    price: line.product.price,
                })
                .collect();
            Order {
                id: order_id,
                buyer_id: buyer_id.to_owned(),
                seller_id: seller_id.to_owned(),
                total_amount: seller_lines.iter().map(|line| line.subtotal).sum(),
                status: OrderStatus::Pending,
                payment_method: details.payment_method,
                payment_status: PaymentStatus::Pending,
                delivery_county: details.delivery_county.clone(),
                delivery_town: details.delivery_town.clone(),
                delivery_phone: details.delivery_phone.clone(),
                notes: details.notes.clone(),
                items,
                created_at: now,
                updated_at: now,
            }
        })
        .collect();
    Ok(orders)
}

/// Decide whether `actor` may move `order` to `next`.
///
/// Sellers may set any status; buyers may only cancel.
///
/// # Errors
/// Forbidden for outsiders and buyers attempting fulfilment steps; invalid
/// request for terminal orders.
pub fn authorize_status_change(order: &Order, actor: &str, next: OrderStatus) -> Result<(), Error> {
    if !order.involves(actor) {
        return Err(Error::forbidden("You do not have access to this order"));
    }
    match order.status {
        OrderStatus::Completed => {
            return Err(Error::invalid_request("Cannot update a completed order"));
        }
        OrderStatus::Cancelled => {
            return Err(Error::invalid_request("Cannot update a cancelled order"));
        }
        _ => {}
    }
    if order.seller_id != actor && next != OrderStatus::Cancelled {
        return Err(Error::forbidden("Buyers can only cancel orders"));
    }
    Ok(())
}

/// Payment status implied by moving to `next`.
#[must_use]
pub fn payment_status_after(current: PaymentStatus, next: OrderStatus) -> PaymentStatus {
    match (current, next) {
        (PaymentStatus::Paid, OrderStatus::Cancelled) => PaymentStatus::Refunded,
        (PaymentStatus::Pending, OrderStatus::Completed) => PaymentStatus::Paid,
        (status, _) => status,
    }
}
