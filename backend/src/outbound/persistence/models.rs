//! Internal Diesel row structs for database operations.
//!
//! These types are implementation details of the persistence layer and must
//! never be exposed to the domain. Timestamps are stored as naive UTC and
//! enumerations as their lowercase names; conversions back into domain types
//! fail with a query error when a stored value is not recognised.

use std::fmt::Display;
use std::str::FromStr;

use chrono::{DateTime, NaiveDateTime, Utc};
use diesel::prelude::*;

use crate::domain::ports::{IssuedToken, PersistenceError};
use crate::domain::{
    CartItem, Notification, NotificationSettings, Order, OrderItem, Product, Review, User,
};

use super::schema::{
    auth_tokens, cart_items, notification_settings, notifications, order_items, orders, products,
    reviews, users,
};

/// Parse a stored enumeration value.
fn parse_stored<T>(column: &str, value: &str) -> Result<T, PersistenceError>
where
    T: FromStr,
    T::Err: Display,
{
    value
        .parse()
        .map_err(|err| PersistenceError::query(format!("unexpected {column} `{value}`: {err}")))
}

fn naive(instant: DateTime<Utc>) -> NaiveDateTime {
    instant.naive_utc()
}

// ---------------------------------------------------------------------------
// Users
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = users)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub(crate) struct UserRow {
    pub id: String,
    pub email: String,
    pub phone: String,
    pub password_hash: String,
    pub first_name: String,
    pub last_name: String,
    pub role: String,
    pub status: String,
    pub county: Option<String>,
    pub town: Option<String>,
    pub bio: Option<String>,
    pub rating: f64,
    pub is_email_verified: bool,
    pub is_phone_verified: bool,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

impl TryFrom<UserRow> for User {
    type Error = PersistenceError;

    fn try_from(row: UserRow) -> Result<Self, Self::Error> {
        Ok(Self {
            role: parse_stored("role", &row.role)?,
            status: parse_stored("status", &row.status)?,
            id: row.id,
            email: row.email,
            phone: row.phone,
            password_hash: row.password_hash,
            first_name: row.first_name,
            last_name: row.last_name,
            county: row.county,
            town: row.town,
            bio: row.bio,
            rating: row.rating,
            is_email_verified: row.is_email_verified,
            is_phone_verified: row.is_phone_verified,
            created_at: row.created_at.and_utc(),
            updated_at: row.updated_at.and_utc(),
        })
    }
}

#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = users)]
pub(crate) struct NewUserRow<'a> {
    pub id: &'a str,
    pub email: &'a str,
    pub phone: &'a str,
    pub password_hash: &'a str,
    pub first_name: &'a str,
    pub last_name: &'a str,
    pub role: &'a str,
    pub status: &'a str,
    pub county: Option<&'a str>,
    pub town: Option<&'a str>,
    pub bio: Option<&'a str>,
    pub rating: f64,
    pub is_email_verified: bool,
    pub is_phone_verified: bool,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

impl<'a> From<&'a User> for NewUserRow<'a> {
    fn from(user: &'a User) -> Self {
        Self {
            id: &user.id,
            email: &user.email,
            phone: &user.phone,
            password_hash: &user.password_hash,
            first_name: &user.first_name,
            last_name: &user.last_name,
            role: user.role.as_str(),
            status: user.status.as_str(),
            county: user.county.as_deref(),
            town: user.town.as_deref(),
            bio: user.bio.as_deref(),
            rating: user.rating,
            is_email_verified: user.is_email_verified,
            is_phone_verified: user.is_phone_verified,
            created_at: naive(user.created_at),
            updated_at: naive(user.updated_at),
        }
    }
}

/// Mutable user columns. Cleared optional fields are written as NULL.
#[derive(Debug, Clone, AsChangeset)]
#[diesel(table_name = users)]
#[diesel(treat_none_as_null = true)]
pub(crate) struct UserUpdate<'a> {
    pub email: &'a str,
    pub phone: &'a str,
    pub password_hash: &'a str,
    pub first_name: &'a str,
    pub last_name: &'a str,
    pub role: &'a str,
    pub status: &'a str,
    pub county: Option<&'a str>,
    pub town: Option<&'a str>,
    pub bio: Option<&'a str>,
    pub rating: f64,
    pub is_email_verified: bool,
    pub is_phone_verified: bool,
    pub updated_at: NaiveDateTime,
}

impl<'a> From<&'a User> for UserUpdate<'a> {
    fn from(user: &'a User) -> Self {
        Self {
            email: &user.email,
            phone: &user.phone,
            password_hash: &user.password_hash,
            first_name: &user.first_name,
            last_name: &user.last_name,
            role: user.role.as_str(),
            status: user.status.as_str(),
            county: user.county.as_deref(),
            town: user.town.as_deref(),
            bio: user.bio.as_deref(),
            rating: user.rating,
            is_email_verified: user.is_email_verified,
            is_phone_verified: user.is_phone_verified,
            updated_at: naive(user.updated_at),
        }
    }
}

// ---------------------------------------------------------------------------
// Auth tokens
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = auth_tokens)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub(crate) struct AuthTokenRow {
    pub id: String,
    pub user_id: String,
    pub token_hash: String,
    pub expires_at: NaiveDateTime,
}

impl From<AuthTokenRow> for IssuedToken {
    fn from(row: AuthTokenRow) -> Self {
        Self {
            id: row.id,
            user_id: row.user_id,
            token_hash: row.token_hash,
            expires_at: row.expires_at.and_utc(),
        }
    }
}

#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = auth_tokens)]
pub(crate) struct NewAuthTokenRow<'a> {
    pub id: &'a str,
    pub user_id: &'a str,
    pub token_hash: &'a str,
    pub expires_at: NaiveDateTime,
}

impl<'a> From<&'a IssuedToken> for NewAuthTokenRow<'a> {
    fn from(token: &'a IssuedToken) -> Self {
        Self {
            id: &token.id,
            user_id: &token.user_id,
            token_hash: &token.token_hash,
            expires_at: naive(token.expires_at),
        }
    }
}

// ---------------------------------------------------------------------------
// Products
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = products)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub(crate) struct ProductRow {
    pub id: String,
    pub seller_id: String,
    pub name: String,
    pub description: String,
    pub category: String,
    pub price: f64,
    pub stock: i32,
    pub images: String,
    pub status: String,
    pub county: Option<String>,
    pub town: Option<String>,
    pub rating: f64,
    pub review_count: i32,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

impl TryFrom<ProductRow> for Product {
    type Error = PersistenceError;

    fn try_from(row: ProductRow) -> Result<Self, Self::Error> {
        let images = serde_json::from_str(&row.images)
            .map_err(|err| PersistenceError::query(format!("unexpected images: {err}")))?;
        Ok(Self {
            status: parse_stored("product status", &row.status)?,
            images,
            id: row.id,
            seller_id: row.seller_id,
            name: row.name,
            description: row.description,
            category: row.category,
            price: row.price,
            stock: row.stock,
            county: row.county,
            town: row.town,
            rating: row.rating,
            review_count: row.review_count,
            created_at: row.created_at.and_utc(),
            updated_at: row.updated_at.and_utc(),
        })
    }
}

/// Encode an image list as the JSON text stored in `products.images`.
pub(crate) fn encode_images(images: &[String]) -> Result<String, PersistenceError> {
    serde_json::to_string(images)
        .map_err(|err| PersistenceError::query(format!("failed to encode images: {err}")))
}

#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = products)]
pub(crate) struct NewProductRow<'a> {
    pub id: &'a str,
    pub seller_id: &'a str,
    pub name: &'a str,
    pub description: &'a str,
    pub category: &'a str,
    pub price: f64,
    pub stock: i32,
    pub images: String,
    pub status: &'a str,
    pub county: Option<&'a str>,
    pub town: Option<&'a str>,
    pub rating: f64,
    pub review_count: i32,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

impl<'a> NewProductRow<'a> {
    pub(crate) fn try_from_product(product: &'a Product) -> Result<Self, PersistenceError> {
        Ok(Self {
            id: &product.id,
            seller_id: &product.seller_id,
            name: &product.name,
            description: &product.description,
            category: &product.category,
            price: product.price,
            stock: product.stock,
            images: encode_images(&product.images)?,
            status: product.status.as_str(),
            county: product.county.as_deref(),
            town: product.town.as_deref(),
            rating: product.rating,
            review_count: product.review_count,
            created_at: naive(product.created_at),
            updated_at: naive(product.updated_at),
        })
    }
}

/// Seller-editable product columns.
#[derive(Debug, Clone, AsChangeset)]
#[diesel(table_name = products)]
#[diesel(treat_none_as_null = true)]
pub(crate) struct ProductUpdate<'a> {
    pub name: &'a str,
    pub description: &'a str,
    pub category: &'a str,
    pub price: f64,
    pub stock: i32,
    pub images: String,
    pub status: &'a str,
    pub county: Option<&'a str>,
    pub town: Option<&'a str>,
    pub updated_at: NaiveDateTime,
}

impl<'a> ProductUpdate<'a> {
    pub(crate) fn try_from_product(product: &'a Product) -> Result<Self, PersistenceError> {
        Ok(Self {
            name: &product.name,
            description: &product.description,
            category: &product.category,
            price: product.price,
            stock: product.stock,
            images: encode_images(&product.images)?,
            status: product.status.as_str(),
            county: product.county.as_deref(),
            town: product.town.as_deref(),
            updated_at: naive(product.updated_at),
        })
    }
}

// ---------------------------------------------------------------------------
// Cart
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = cart_items)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub(crate) struct CartItemRow {
    pub id: String,
    pub user_id: String,
    pub product_id: String,
    pub quantity: i32,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

impl From<CartItemRow> for CartItem {
    fn from(row: CartItemRow) -> Self {
        Self {
            id: row.id,
            user_id: row.user_id,
            product_id: row.product_id,
            quantity: row.quantity,
            created_at: row.created_at.and_utc(),
            updated_at: row.updated_at.and_utc(),
        }
    }
}

#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = cart_items)]
pub(crate) struct NewCartItemRow<'a> {
    pub id: &'a str,
    pub user_id: &'a str,
    pub product_id: &'a str,
    pub quantity: i32,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

impl<'a> From<&'a CartItem> for NewCartItemRow<'a> {
    fn from(item: &'a CartItem) -> Self {
        Self {
            id: &item.id,
            user_id: &item.user_id,
            product_id: &item.product_id,
            quantity: item.quantity,
            created_at: naive(item.created_at),
            updated_at: naive(item.updated_at),
        }
    }
}

// ---------------------------------------------------------------------------
// Orders
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = orders)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub(crate) struct OrderRow {
    pub id: String,
    pub buyer_id: String,
    pub seller_id: String,
    pub total_amount: f64,
    pub status: String,
    pub payment_method: String,
    pub payment_status: String,
    pub delivery_county: Option<String>,
    pub delivery_town: Option<String>,
    pub delivery_phone: Option<String>,
    pub notes: Option<String>,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

impl OrderRow {
    /// Attach the order's items and convert to the domain aggregate.
    pub(crate) fn into_order(self, items: Vec<OrderItem>) -> Result<Order, PersistenceError> {
        Ok(Order {
            status: parse_stored("order status", &self.status)?,
            payment_method: parse_stored("payment method", &self.payment_method)?,
            payment_status: parse_stored("payment status", &self.payment_status)?,
            id: self.id,
            buyer_id: self.buyer_id,
            seller_id: self.seller_id,
            total_amount: self.total_amount,
            delivery_county: self.delivery_county,
            delivery_town: self.delivery_town,
            delivery_phone: self.delivery_phone,
            notes: self.notes,
            items,
            created_at: self.created_at.and_utc(),
            updated_at: self.updated_at.and_utc(),
        })
    }
}

#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = orders)]
pub(crate) struct NewOrderRow<'a> {
    pub id: &'a str,
    pub buyer_id: &'a str,
    pub seller_id: &'a str,
    pub total_amount: f64,
    pub status: &'a str,
    pub payment_method: &'a str,
    pub payment_status: &'a str,
    pub delivery_county: Option<&'a str>,
    pub delivery_town: Option<&'a str>,
    pub delivery_phone: Option<&'a str>,
    pub notes: Option<&'a str>,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

impl<'a> From<&'a Order> for NewOrderRow<'a> {
    fn from(order: &'a Order) -> Self {
        Self {
            id: &order.id,
            buyer_id: &order.buyer_id,
            seller_id: &order.seller_id,
            total_amount: order.total_amount,
            status: order.status.as_str(),
            payment_method: order.payment_method.as_str(),
            payment_status: order.payment_status.as_str(),
            delivery_county: order.delivery_county.as_deref(),
            delivery_town: order.delivery_town.as_deref(),
            delivery_phone: order.delivery_phone.as_deref(),
            notes: order.notes.as_deref(),
            created_at: naive(order.created_at),
            updated_at: naive(order.updated_at),
        }
    }
}

#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = order_items)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub(crate) struct OrderItemRow {
    pub id: String,
    pub order_id: String,
    pub product_id: String,
    pub name: String,
    pub quantity: i32,
    pub price: f64,
}

impl From<OrderItemRow> for OrderItem {
    fn from(row: OrderItemRow) -> Self {
        Self {
            id: row.id,
            order_id: row.order_id,
            product_id: row.product_id,
            name: row.name,
            quantity: row.quantity,
            price: row.price,
        }
    }
}

#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = order_items)]
pub(crate) struct NewOrderItemRow<'a> {
    pub id: &'a str,
    pub order_id: &'a str,
    pub product_id: &'a str,
    pub name: &'a str,
    pub quantity: i32,
    pub price: f64,
    pub created_at: NaiveDateTime,
}

impl<'a> NewOrderItemRow<'a> {
    pub(crate) fn new(item: &'a OrderItem, created_at: DateTime<Utc>) -> Self {
        Self {
            id: &item.id,
            order_id: &item.order_id,
            product_id: &item.product_id,
            name: &item.name,
            quantity: item.quantity,
            price: item.price,
            created_at: naive(created_at),
        }
    }
}

// ---------------------------------------------------------------------------
// Reviews
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = reviews)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub(crate) struct ReviewRow {
    pub id: String,
    pub user_id: String,
    pub product_id: String,
    pub rating: i32,
    pub comment: String,
    pub created_at: NaiveDateTime,
}

impl From<ReviewRow> for Review {
    fn from(row: ReviewRow) -> Self {
        Self {
            id: row.id,
            user_id: row.user_id,
            product_id: row.product_id,
            rating: row.rating,
            comment: row.comment,
            created_at: row.created_at.and_utc(),
        }
    }
}

#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = reviews)]
pub(crate) struct NewReviewRow<'a> {
    pub id: &'a str,
    pub user_id: &'a str,
    pub product_id: &'a str,
    pub rating: i32,
    pub comment: &'a str,
    pub created_at: NaiveDateTime,
}

impl<'a> From<&'a Review> for NewReviewRow<'a> {
    fn from(review: &'a Review) -> Self {
        Self {
            id: &review.id,
            user_id: &review.user_id,
            product_id: &review.product_id,
            rating: review.rating,
            comment: &review.comment,
            created_at: naive(review.created_at),
        }
    }
}

// ---------------------------------------------------------------------------
// Notifications
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = notifications)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub(crate) struct NotificationRow {
    pub id: String,
    pub user_id: String,
    pub sender_id: Option<String>,
    pub title: String,
    pub message: String,
    pub notification_type: String,
    pub status: String,
    pub priority: i32,
    pub is_read: bool,
    pub read_at: Option<NaiveDateTime>,
    pub scheduled_at: Option<NaiveDateTime>,
    pub expires_at: Option<NaiveDateTime>,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

impl TryFrom<NotificationRow> for Notification {
    type Error = PersistenceError;

    fn try_from(row: NotificationRow) -> Result<Self, Self::Error> {
        Ok(Self {
            notification_type: parse_stored("notification type", &row.notification_type)?,
            status: parse_stored("notification status", &row.status)?,
            id: row.id,
            user_id: row.user_id,
            sender_id: row.sender_id,
            title: row.title,
            message: row.message,
            priority: row.priority,
            is_read: row.is_read,
            read_at: row.read_at.map(|at| at.and_utc()),
            scheduled_at: row.scheduled_at.map(|at| at.and_utc()),
            expires_at: row.expires_at.map(|at| at.and_utc()),
            created_at: row.created_at.and_utc(),
            updated_at: row.updated_at.and_utc(),
        })
    }
}

#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = notifications)]
pub(crate) struct NewNotificationRow<'a> {
    pub id: &'a str,
    pub user_id: &'a str,
    pub sender_id: Option<&'a str>,
    pub title: &'a str,
    pub message: &'a str,
    pub notification_type: &'a str,
    pub status: &'a str,
    pub priority: i32,
    pub is_read: bool,
    pub read_at: Option<NaiveDateTime>,
    pub scheduled_at: Option<NaiveDateTime>,
    pub expires_at: Option<NaiveDateTime>,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

impl<'a> From<&'a Notification> for NewNotificationRow<'a> {
    fn from(notification: &'a Notification) -> Self {
        Self {
            id: &notification.id,
            user_id: &notification.user_id,
            sender_id: notification.sender_id.as_deref(),
            title: &notification.title,
            message: &notification.message,
            notification_type: notification.notification_type.as_str(),
            status: notification.status.as_str(),
            priority: notification.priority,
            is_read: notification.is_read,
            read_at: notification.read_at.map(naive),
            scheduled_at: notification.scheduled_at.map(naive),
            expires_at: notification.expires_at.map(naive),
            created_at: naive(notification.created_at),
            updated_at: naive(notification.updated_at),
        }
    }
}

/// Editable notification content.
#[derive(Debug, Clone, AsChangeset)]
#[diesel(table_name = notifications)]
#[diesel(treat_none_as_null = true)]
pub(crate) struct NotificationUpdate<'a> {
    pub title: &'a str,
    pub message: &'a str,
    pub status: &'a str,
    pub priority: i32,
    pub scheduled_at: Option<NaiveDateTime>,
    pub expires_at: Option<NaiveDateTime>,
    pub updated_at: NaiveDateTime,
}

impl<'a> From<&'a Notification> for NotificationUpdate<'a> {
    fn from(notification: &'a Notification) -> Self {
        Self {
            title: &notification.title,
            message: &notification.message,
            status: notification.status.as_str(),
            priority: notification.priority,
            scheduled_at: notification.scheduled_at.map(naive),
            expires_at: notification.expires_at.map(naive),
            updated_at: naive(notification.updated_at),
        }
    }
}

/// Read flag transition; `read_at` is cleared when marking unread.
#[derive(Debug, Clone, AsChangeset)]
#[diesel(table_name = notifications)]
#[diesel(treat_none_as_null = true)]
pub(crate) struct ReadStateUpdate {
    pub is_read: bool,
    pub read_at: Option<NaiveDateTime>,
    pub updated_at: NaiveDateTime,
}

impl ReadStateUpdate {
    pub(crate) fn new(is_read: bool, now: DateTime<Utc>) -> Self {
        Self {
            is_read,
            read_at: is_read.then(|| naive(now)),
            updated_at: naive(now),
        }
    }
}

// ---------------------------------------------------------------------------
// Notification settings
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = notification_settings)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub(crate) struct NotificationSettingsRow {
    pub id: String,
    pub user_id: String,
    pub email_enabled: bool,
    pub sms_enabled: bool,
    pub push_enabled: bool,
    pub in_app_enabled: bool,
    pub quiet_hours_enabled: bool,
    pub quiet_hours_start: String,
    pub quiet_hours_end: String,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

impl From<NotificationSettingsRow> for NotificationSettings {
    fn from(row: NotificationSettingsRow) -> Self {
        Self {
            id: row.id,
            user_id: row.user_id,
            email_enabled: row.email_enabled,
            sms_enabled: row.sms_enabled,
            push_enabled: row.push_enabled,
            in_app_enabled: row.in_app_enabled,
            quiet_hours_enabled: row.quiet_hours_enabled,
            quiet_hours_start: row.quiet_hours_start,
            quiet_hours_end: row.quiet_hours_end,
            created_at: row.created_at.and_utc(),
            updated_at: row.updated_at.and_utc(),
        }
    }
}

#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = notification_settings)]
pub(crate) struct NewNotificationSettingsRow<'a> {
    pub id: &'a str,
    pub user_id: &'a str,
    pub email_enabled: bool,
    pub sms_enabled: bool,
    pub push_enabled: bool,
    pub in_app_enabled: bool,
    pub quiet_hours_enabled: bool,
    pub quiet_hours_start: &'a str,
    pub quiet_hours_end: &'a str,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

impl<'a> From<&'a NotificationSettings> for NewNotificationSettingsRow<'a> {
    fn from(settings: &'a NotificationSettings) -> Self {
        Self {
            id: &settings.id,
            user_id: &settings.user_id,
            email_enabled: settings.email_enabled,
            sms_enabled: settings.sms_enabled,
            push_enabled: settings.push_enabled,
            in_app_enabled: settings.in_app_enabled,
            quiet_hours_enabled: settings.quiet_hours_enabled,
            quiet_hours_start: &settings.quiet_hours_start,
            quiet_hours_end: &settings.quiet_hours_end,
            created_at: naive(settings.created_at),
            updated_at: naive(settings.updated_at),
        }
    }
}

#[derive(Debug, Clone, AsChangeset)]
#[diesel(table_name = notification_settings)]
pub(crate) struct NotificationSettingsUpdate<'a> {
    pub email_enabled: bool,
    pub sms_enabled: bool,
    pub push_enabled: bool,
    pub in_app_enabled: bool,
    pub quiet_hours_enabled: bool,
    pub quiet_hours_start: &'a str,
    pub quiet_hours_end: &'a str,
    pub updated_at: NaiveDateTime,
}

impl<'a> From<&'a NotificationSettings> for NotificationSettingsUpdate<'a> {
    fn from(settings: &'a NotificationSettings) -> Self {
        Self {
            email_enabled: settings.email_enabled,
            sms_enabled: settings.sms_enabled,
            push_enabled: settings.push_enabled,
            in_app_enabled: settings.in_app_enabled,
            quiet_hours_enabled: settings.quiet_hours_enabled,
            quiet_hours_start: &settings.quiet_hours_start,
            quiet_hours_end: &settings.quiet_hours_end,
            updated_at: naive(settings.updated_at),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{NotificationStatus, NotificationType};
    use chrono::TimeZone;

    fn stamp() -> NaiveDateTime {
        Utc.with_ymd_and_hms(2026, 2, 1, 10, 30, 0)
            .single()
            .expect("valid timestamp")
            .naive_utc()
    }

    fn notification_row(notification_type: &str) -> NotificationRow {
        NotificationRow {
            id: "n".to_owned(),
            user_id: "u".to_owned(),
            sender_id: None,
            title: "Title".to_owned(),
            message: "Body".to_owned(),
            notification_type: notification_type.to_owned(),
            status: "sent".to_owned(),
            priority: 3,
            is_read: false,
            read_at: None,
            scheduled_at: None,
            expires_at: Some(stamp()),
            created_at: stamp(),
            updated_at: stamp(),
        }
    }

    #[test]
    fn notification_rows_restore_utc_instants() {
        let notification =
            Notification::try_from(notification_row("payment")).expect("valid row");
        assert_eq!(notification.notification_type, NotificationType::Payment);
        assert_eq!(notification.status, NotificationStatus::Sent);
        assert_eq!(notification.expires_at.map(|at| at.naive_utc()), Some(stamp()));
    }

    #[test]
    fn unknown_stored_values_are_query_errors() {
        let err = Notification::try_from(notification_row("carrier-pigeon"))
            .expect_err("unknown type");
        assert!(matches!(err, PersistenceError::Query { .. }));
    }

    #[test]
    fn marking_unread_clears_read_at() {
        let now = stamp().and_utc();
        assert_eq!(ReadStateUpdate::new(true, now).read_at, Some(stamp()));
        assert_eq!(ReadStateUpdate::new(false, now).read_at, None);
    }

    #[test]
    fn images_are_stored_as_json_text() {
        let encoded =
            encode_images(&["https://img/a.jpg".to_owned()]).expect("encode images");
        assert_eq!(encoded, r#"["https://img/a.jpg"]"#);
    }
}
