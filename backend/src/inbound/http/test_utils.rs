//! Test helpers for inbound HTTP components.

use std::sync::Arc;

use actix_web::http::StatusCode;
use actix_web::test::{self as actix_test, TestRequest};
use actix_web::{App, web};
use mockable::DefaultClock;
use serde_json::Value;
use zeroize::Zeroizing;

use crate::domain::ports::{FixturePrincipalResolver, UuidIdGenerator};
use crate::domain::{ProductDraft, Principal, Registration, Role, TokenKey};
use crate::inbound::http::state::HttpState;
use crate::inbound::http::validation::{json_config, path_config, query_config, route_not_found};
use crate::middleware::{Authenticate, Trace};
use crate::outbound::persistence::Store;
use crate::server::{StateWiring, build_http_state};

/// Handler state over a fresh, empty in-memory store.
pub(crate) async fn empty_state() -> (Store, HttpState) {
    let store = Store::open_in_memory().await.expect("open store");
    let state = build_http_state(
        &store,
        StateWiring {
            ids: Arc::new(UuidIdGenerator),
            clock: Arc::new(DefaultClock),
            key: TokenKey::new("handler-tests-secret"),
        },
    );
    (store, state)
}

/// Register an account for `handle` and return its id.
pub(crate) async fn seed_user(state: &HttpState, handle: &str, phone: &str) -> String {
    state
        .accounts
        .register(Registration {
            email: format!("{handle}@example.com"),
            phone: phone.to_owned(),
            password: Zeroizing::new("password123".to_owned()),
            first_name: handle.to_owned(),
            last_name: "Tester".to_owned(),
        })
        .await
        .expect("register")
        .id
}

/// List a product for `seller_id` and return its id.
pub(crate) async fn seed_product(
    state: &HttpState,
    seller_id: &str,
    name: &str,
    price: f64,
    stock: i32,
) -> String {
    state
        .catalogue
        .create(
            seller_id,
            ProductDraft {
                name: name.to_owned(),
                description: format!("{name} from the market"),
                category: "household".to_owned(),
                price,
                stock,
                images: Vec::new(),
                county: Some("Nairobi".to_owned()),
                town: None,
            },
        )
        .await
        .expect("create product")
        .id
}

pub(crate) fn member(user_id: &str) -> Principal {
    Principal::new(user_id, Role::User)
}

pub(crate) fn admin(user_id: &str) -> Principal {
    Principal::new(user_id, Role::Admin)
}

/// Send `request` through an app exposing the routes in `configure` under
/// `/api/v1`, acting as `caller`.
pub(crate) async fn send(
    state: &HttpState,
    caller: Option<Principal>,
    configure: fn(&mut web::ServiceConfig),
    request: TestRequest,
) -> (StatusCode, Value) {
    let resolver = caller.map_or_else(FixturePrincipalResolver::anonymous, FixturePrincipalResolver::new);
    let app = actix_test::init_service(
        App::new()
            .app_data(web::Data::new(state.clone()))
            .app_data(json_config())
            .app_data(query_config())
            .app_data(path_config())
            .wrap(Authenticate::new(Arc::new(resolver)))
            .wrap(Trace)
            .service(web::scope("/api/v1").configure(configure))
            .default_service(web::to(route_not_found)),
    )
    .await;
    let response = actix_test::call_service(&app, request.to_request()).await;
    let status = response.status();
    let body = actix_test::read_body(response).await;
    let value = serde_json::from_slice(&body).unwrap_or(Value::Null);
    (status, value)
}
