//! Domain primitives, aggregates and services.
//!
//! Purpose: define strongly typed marketplace, account and notification
//! entities, the validation rules that guard them, and the services that
//! apply business rules over repository ports. Inbound and outbound adapters
//! depend on this module; it depends on neither.
//!
//! Public surface:
//! - Error / ErrorCode: failure payload rendered in the response envelope.
//! - Principal / Role: authenticated caller identity.
//! - Entities: User, Product, CartItem, Order, Review, Notification,
//!   NotificationSettings, with their draft and patch types.
//! - Services: AccountService, CatalogueService, CartService, OrderService,
//!   NotificationService.

pub mod error;
pub mod password;
pub mod ports;
pub mod trace_id;

mod account_service;
mod cart;
mod cart_service;
mod catalogue_service;
mod notification;
mod notification_service;
mod order;
mod order_service;
mod principal;
mod product;
mod review;
mod session;
mod user;

pub use self::account_service::AccountService;
pub use self::cart::{Cart, CartItem, CartLine, check_purchasable, check_quantity};
pub use self::cart_service::CartService;
pub use self::catalogue_service::CatalogueService;
pub use self::error::{Error, ErrorCode};
pub use self::notification::{
    DEFAULT_PRIORITY, Notification, NotificationContent, NotificationFilter, NotificationPatch,
    NotificationSettings, NotificationStatus, NotificationType, SettingsPatch, ValidContent,
    is_clock_time,
};
pub use self::notification_service::{Inbox, NotificationService};
pub use self::order::{
    CheckoutDetails, Order, OrderFilter, OrderItem, OrderRole, OrderStatus, PaymentMethod,
    PaymentStatus, authorize_status_change, payment_status_after, plan_orders,
};
pub use self::order_service::OrderService;
pub use self::principal::{Principal, Role, UnknownRole};
pub use self::product::{
    CategorySummary, Product, ProductDraft, ProductFilter, ProductPatch, ProductStatus,
};
pub use self::review::{Review, ReviewDraft, average_rating};
pub use self::session::{LoginSession, TOKEN_TTL_HOURS, TokenKey, TokenPrincipalResolver};
pub use self::trace_id::{TRACE_ID_HEADER, TraceId};
pub use self::user::{
    ProfileUpdate, Registration, User, UserStatus, is_valid_email, normalise_email,
};

/// Convenient API result alias.
///
/// # Examples
/// ```
/// use actix_web::HttpResponse;
/// use vaultke::domain::{ApiResult, Error};
///
/// fn handler() -> ApiResult<HttpResponse> {
///     Err(Error::forbidden("Admin access required"))
/// }
/// ```
pub type ApiResult<T> = Result<T, Error>;
