//! Suite lifecycle.
//!
//! A [`TestSuite`] owns one in-memory store for its whole run. Cases call
//! [`TestSuite::setup_test`] to wipe and re-seed the fixture graph, then build
//! an app over the areas they exercise:
//!
//! ```text
//! setup_suite -> Ready -> setup_test -> Seeded -> request -> Dirty
//!                  |                      |                    |
//!                  +------ teardown_suite / close_store_mid_run -> Closed
//! ```

use std::fmt;
use std::sync::Arc;

use actix_http::Request;
use actix_web::body::MessageBody;
use actix_web::dev::{Service, ServiceFactory, ServiceRequest, ServiceResponse};
use actix_web::{App, web};
use mockable::{Clock, DefaultClock};
use tracing::debug;

use crate::domain::ports::{FixturePrincipalResolver, PrefixedIdGenerator, PrincipalResolver};
use crate::domain::{Principal, Role, TokenKey};
use crate::inbound::http::health::HealthState;
use crate::inbound::http::state::HttpState;
use crate::inbound::http::{admin, auth, configure_marketplace, configure_notifications, users};
use crate::outbound::persistence::{Store, StoreError};
use crate::server::{AppDependencies, StateWiring, build_app_with, build_http_state};

use super::driver::{ADMIN_TOKEN, RecordedResponse, RequestSpec, send};
use super::fixtures::{ADMIN_ID, FixtureError, USER_ID, cleanup_test_data, insert_test_data_at};
use super::stubs;

/// Route group a suite can mount under `/api/v1`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Area {
    Auth,
    Users,
    Admin,
    Marketplace,
    Notifications,
    Chamas,
    Wallets,
    Reminders,
    /// Password reset and verification flows under `/auth`.
    AuthFlows,
    /// `POST /users/avatar`.
    Avatar,
}

impl Area {
    /// Every area, production and stub.
    pub const ALL: [Self; 10] = [
        Self::Auth,
        Self::AuthFlows,
        Self::Users,
        Self::Avatar,
        Self::Admin,
        Self::Marketplace,
        Self::Notifications,
        Self::Chamas,
        Self::Wallets,
        Self::Reminders,
    ];

    fn configure(self) -> fn(&mut web::ServiceConfig) {
        match self {
            Self::Auth => auth::configure,
            Self::Users => users::configure,
            Self::Admin => admin::configure,
            Self::Marketplace => configure_marketplace,
            Self::Notifications => configure_notifications,
            Self::Chamas => stubs::configure_chamas,
            Self::Wallets => stubs::configure_wallets,
            Self::Reminders => stubs::configure_reminders,
            Self::AuthFlows => stubs::configure_auth_flows,
            Self::Avatar => stubs::configure_avatar,
        }
    }
}

/// Lifecycle position of a suite.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SuiteState {
    /// Store open, nothing seeded.
    Ready,
    /// Fixtures freshly seeded.
    Seeded,
    /// A case has issued requests since the last seed.
    Dirty,
    /// Store closed; terminal.
    Closed,
}

impl fmt::Display for SuiteState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Ready => "ready",
            Self::Seeded => "seeded",
            Self::Dirty => "dirty",
            Self::Closed => "closed",
        };
        f.write_str(name)
    }
}

/// Errors raised by suite transitions.
#[derive(Debug, thiserror::Error)]
pub enum SuiteError {
    /// The action is not allowed from the current state.
    #[error("cannot {action} a {from} suite")]
    InvalidTransition {
        from: SuiteState,
        action: &'static str,
    },

    /// The store could not be opened.
    #[error(transparent)]
    Store(#[from] StoreError),

    /// Seeding or wiping failed.
    #[error(transparent)]
    Fixture(#[from] FixtureError),
}

/// Suite construction options.
#[derive(Clone)]
pub struct SuiteOptions {
    /// Principal for requests without a mapped token; `None` makes them
    /// anonymous.
    pub caller: Option<Principal>,
    /// Time source for handlers and fixture timestamps.
    pub clock: Arc<dyn Clock>,
    /// Prefix stamped on ids created during a case.
    pub id_prefix: String,
}

impl Default for SuiteOptions {
    fn default() -> Self {
        Self {
            caller: Some(Principal::new(USER_ID, Role::User)),
            clock: Arc::new(DefaultClock),
            id_prefix: "test-".to_owned(),
        }
    }
}

/// Suite-scoped store, services and caller.
pub struct TestSuite {
    store: Store,
    http_state: web::Data<HttpState>,
    resolver: Arc<dyn PrincipalResolver>,
    clock: Arc<dyn Clock>,
    state: SuiteState,
}

impl TestSuite {
    /// Open a fresh store and wire the services over it.
    ///
    /// # Errors
    /// Returns [`SuiteError::Store`] when the store or its schema fails.
    pub async fn setup_suite(options: SuiteOptions) -> Result<Self, SuiteError> {
        let SuiteOptions {
            caller,
            clock,
            id_prefix,
        } = options;
        let store = Store::open_in_memory().await?;
        let http_state = build_http_state(
            &store,
            StateWiring {
                ids: Arc::new(PrefixedIdGenerator::new(id_prefix)),
                clock: clock.clone(),
                key: TokenKey::new("vaultke-harness-secret"),
            },
        );
        let resolver = caller
            .map_or_else(FixturePrincipalResolver::anonymous, FixturePrincipalResolver::new)
            .with_token(ADMIN_TOKEN, Principal::new(ADMIN_ID, Role::Admin));
        debug!("suite ready");
        Ok(Self {
            store,
            http_state: web::Data::new(http_state),
            resolver: Arc::new(resolver),
            clock,
            state: SuiteState::Ready,
        })
    }

    /// Current lifecycle state.
    #[must_use]
    pub const fn state(&self) -> SuiteState {
        self.state
    }

    /// The suite's store.
    #[must_use]
    pub const fn store(&self) -> &Store {
        &self.store
    }

    /// Services shared by every app the suite builds.
    #[must_use]
    pub fn http_state(&self) -> &HttpState {
        &self.http_state
    }

    fn ensure_open(&self, action: &'static str) -> Result<(), SuiteError> {
        if self.state == SuiteState::Closed {
            return Err(SuiteError::InvalidTransition {
                from: self.state,
                action,
            });
        }
        Ok(())
    }

    /// Wipe every `test-` row and seed the fixture graph again.
    ///
    /// # Errors
    /// Fails on a closed suite or when seeding fails.
    pub async fn setup_test(&mut self) -> Result<(), SuiteError> {
        self.ensure_open("set up a test in")?;
        cleanup_test_data(&self.store).await?;
        insert_test_data_at(&self.store, self.clock.utc()).await?;
        self.state = SuiteState::Seeded;
        Ok(())
    }

    /// Wipe the fixtures and close the store.
    ///
    /// # Errors
    /// Fails when the suite is already closed.
    pub async fn teardown_suite(&mut self) -> Result<(), SuiteError> {
        self.ensure_open("tear down")?;
        cleanup_test_data(&self.store).await?;
        self.store.close().await;
        self.state = SuiteState::Closed;
        debug!("suite closed");
        Ok(())
    }

    /// Close the store in the middle of a case. Requests issued afterwards
    /// observe the closed connection.
    ///
    /// # Errors
    /// Fails when the suite is already closed.
    pub async fn close_store_mid_run(&mut self) -> Result<(), SuiteError> {
        self.ensure_open("close the store of")?;
        self.store.close().await;
        self.state = SuiteState::Closed;
        Ok(())
    }

    /// Application mounting `areas` under `/api/v1` with the fixture caller.
    pub fn app(
        &self,
        areas: &[Area],
    ) -> App<
        impl ServiceFactory<
            ServiceRequest,
            Config = (),
            Response = ServiceResponse<impl MessageBody + use<>>,
            Error = actix_web::Error,
            InitError = (),
        > + use<>,
    > {
        let routes: Vec<fn(&mut web::ServiceConfig)> =
            areas.iter().map(|area| area.configure()).collect();
        build_app_with(
            AppDependencies {
                health_state: web::Data::new(HealthState::new()),
                http_state: self.http_state.clone(),
                resolver: self.resolver.clone(),
            },
            routes,
        )
    }

    /// Send `spec` through `app`, marking a seeded suite dirty.
    pub async fn send<S, B>(&mut self, app: &S, spec: &RequestSpec) -> RecordedResponse
    where
        S: Service<Request, Response = ServiceResponse<B>, Error = actix_web::Error>,
        B: MessageBody,
    {
        if self.state == SuiteState::Seeded {
            self.state = SuiteState::Dirty;
        }
        send(app, spec).await
    }
}
