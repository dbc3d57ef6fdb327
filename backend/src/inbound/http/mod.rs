//! HTTP inbound adapter exposing the REST API under `/api/v1`.
//!
//! Each area module exposes `configure(cfg: &mut web::ServiceConfig)`
//! registering its handlers. Routes with literal segments are registered
//! before their `{id}` siblings.

use actix_web::web;

pub mod admin;
pub mod auth;
pub mod caller;
pub mod cart;
pub mod envelope;
pub mod error;
pub mod health;
pub mod notification_settings;
pub mod notifications;
pub mod orders;
pub mod products;
pub mod reviews;
pub mod state;
#[cfg(test)]
pub(crate) mod test_utils;
pub mod users;
pub mod validation;

pub use error::ApiResult;

/// Products, categories, search, reviews, cart and orders.
pub fn configure_marketplace(cfg: &mut web::ServiceConfig) {
    cfg.configure(products::configure)
        .configure(reviews::configure)
        .configure(cart::configure)
        .configure(orders::configure);
}

/// Settings first so `/notifications/settings` never matches `{id}`.
pub fn configure_notifications(cfg: &mut web::ServiceConfig) {
    cfg.configure(notification_settings::configure)
        .configure(notifications::configure);
}

/// Every production area.
pub fn configure_api(cfg: &mut web::ServiceConfig) {
    cfg.configure(auth::configure)
        .configure(users::configure)
        .configure(admin::configure)
        .configure(configure_marketplace)
        .configure(configure_notifications);
}
