//! Domain ports and supporting types for the hexagonal boundary.
//!
//! Repository traits are implemented by the Diesel adapters in
//! `outbound::persistence`; services only ever hold them as trait objects.

mod macros;
pub(crate) use macros::define_port_error;

mod cart_repository;
mod id_generator;
mod notification_repository;
mod order_repository;
mod persistence_error;
mod principal_resolver;
mod product_repository;
mod user_repository;

#[cfg(test)]
pub use cart_repository::MockCartRepository;
pub use cart_repository::CartRepository;
pub use id_generator::{IdGenerator, PrefixedIdGenerator, UuidIdGenerator};
#[cfg(test)]
pub use notification_repository::{
    MockNotificationRepository, MockNotificationSettingsRepository,
};
pub use notification_repository::{NotificationRepository, NotificationSettingsRepository};
#[cfg(test)]
pub use order_repository::MockOrderRepository;
pub use order_repository::{CheckoutError, OrderRepository};
pub use persistence_error::PersistenceError;
pub use principal_resolver::{FixturePrincipalResolver, PrincipalResolver, bearer_token};
#[cfg(test)]
pub use product_repository::{MockProductRepository, MockReviewRepository};
pub use product_repository::{ProductRepository, ReviewRepository};
#[cfg(test)]
pub use user_repository::{MockTokenRepository, MockUserRepository};
pub use user_repository::{IssuedToken, TokenRepository, UserRepository};
