//! Shared HTTP adapter state.
//!
//! Handlers accept this state via `actix_web::web::Data` so they only
//! depend on domain services, which in turn only hold ports. The services
//! in one state share a single store (see `server::build_http_state`), so a
//! suite that closes its store sees the failure on every route.

use crate::domain::{
    AccountService, CartService, CatalogueService, NotificationService, OrderService,
};

/// Dependency bundle for HTTP handlers.
#[derive(Clone)]
pub struct HttpState {
    pub accounts: AccountService,
    pub catalogue: CatalogueService,
    pub carts: CartService,
    pub orders: OrderService,
    pub notifications: NotificationService,
}
