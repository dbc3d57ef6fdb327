//! Builders wiring Diesel adapters into domain services.

use std::sync::Arc;

use mockable::Clock;

use crate::domain::ports::IdGenerator;
use crate::domain::{
    AccountService, CartService, CatalogueService, NotificationService, OrderService, TokenKey,
    TokenPrincipalResolver,
};
use crate::inbound::http::state::HttpState;
use crate::outbound::persistence::{
    DieselCartRepository, DieselNotificationRepository, DieselNotificationSettingsRepository,
    DieselOrderRepository, DieselProductRepository, DieselReviewRepository, DieselTokenRepository,
    DieselUserRepository, Store,
};

/// Ambient collaborators shared by every service.
#[derive(Clone)]
pub struct StateWiring {
    /// Identifier source for new rows.
    pub ids: Arc<dyn IdGenerator>,
    /// Time source for timestamps and temporal checks.
    pub clock: Arc<dyn Clock>,
    /// Secret keying stored token digests.
    pub key: TokenKey,
}

/// Build the handler state with every service backed by `store`.
///
/// # Examples
/// ```no_run
/// use std::sync::Arc;
///
/// use mockable::DefaultClock;
/// use vaultke::domain::TokenKey;
/// use vaultke::domain::ports::UuidIdGenerator;
/// use vaultke::outbound::persistence::Store;
/// use vaultke::server::{StateWiring, build_http_state};
///
/// # async fn demo() -> Result<(), Box<dyn std::error::Error>> {
/// let store = Store::open_in_memory().await?;
/// let state = build_http_state(
///     &store,
///     StateWiring {
///         ids: Arc::new(UuidIdGenerator),
///         clock: Arc::new(DefaultClock),
///         key: TokenKey::new("a-sufficiently-long-secret"),
///     },
/// );
/// let _catalogue = state.catalogue.clone();
/// # Ok(())
/// # }
/// ```
#[must_use]
pub fn build_http_state(store: &Store, wiring: StateWiring) -> HttpState {
    let StateWiring { ids, clock, key } = wiring;
    let users = Arc::new(DieselUserRepository::new(store.clone()));
    let tokens = Arc::new(DieselTokenRepository::new(store.clone()));
    let products = Arc::new(DieselProductRepository::new(store.clone()));
    let reviews = Arc::new(DieselReviewRepository::new(store.clone()));
    let carts = Arc::new(DieselCartRepository::new(store.clone()));
    let orders = Arc::new(DieselOrderRepository::new(store.clone()));
    let notifications = Arc::new(DieselNotificationRepository::new(store.clone()));
    let settings = Arc::new(DieselNotificationSettingsRepository::new(store.clone()));

    HttpState {
        accounts: AccountService::new(
            users.clone(),
            tokens,
            ids.clone(),
            clock.clone(),
            key,
        ),
        catalogue: CatalogueService::new(products.clone(), reviews, ids.clone(), clock.clone()),
        carts: CartService::new(carts.clone(), products, ids.clone(), clock.clone()),
        orders: OrderService::new(orders, carts, ids.clone(), clock.clone()),
        notifications: NotificationService::new(notifications, settings, users, ids, clock),
    }
}

/// Resolver validating bearer tokens against `store`.
#[must_use]
pub fn build_token_resolver(
    store: &Store,
    clock: Arc<dyn Clock>,
    key: TokenKey,
) -> TokenPrincipalResolver {
    TokenPrincipalResolver::new(
        Arc::new(DieselTokenRepository::new(store.clone())),
        Arc::new(DieselUserRepository::new(store.clone())),
        clock,
        key,
    )
}
