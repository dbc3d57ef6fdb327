//! Server construction and middleware wiring.

mod config;
mod state_builders;

pub use config::ServerConfig;
pub use state_builders::{StateWiring, build_http_state, build_token_resolver};

use std::sync::Arc;

use actix_web::body::MessageBody;
use actix_web::dev::{Server, ServiceFactory, ServiceRequest, ServiceResponse};
use actix_web::{App, HttpServer, web};
use tracing::info;

use crate::domain::ports::PrincipalResolver;
use crate::inbound::http::configure_api;
use crate::inbound::http::health::{HealthState, live, ready};
use crate::inbound::http::state::HttpState;
use crate::inbound::http::validation::{json_config, path_config, query_config, route_not_found};
use crate::middleware::{Authenticate, Trace};

/// Shared per-worker dependencies.
#[derive(Clone)]
pub struct AppDependencies {
    pub health_state: web::Data<HealthState>,
    pub http_state: web::Data<HttpState>,
    pub resolver: Arc<dyn PrincipalResolver>,
}

/// Assemble the production application: probes at the root, every API area
/// under `/api/v1`, and envelope-shaped 404s for anything else.
pub fn build_app(
    deps: AppDependencies,
) -> App<
    impl ServiceFactory<
        ServiceRequest,
        Config = (),
        Response = ServiceResponse<impl MessageBody>,
        Error = actix_web::Error,
        InitError = (),
    >,
> {
    build_app_with(deps, vec![configure_api])
}

/// Assemble an application whose `/api/v1` scope registers `areas` in order.
pub fn build_app_with(
    deps: AppDependencies,
    areas: Vec<fn(&mut web::ServiceConfig)>,
) -> App<
    impl ServiceFactory<
        ServiceRequest,
        Config = (),
        Response = ServiceResponse<impl MessageBody>,
        Error = actix_web::Error,
        InitError = (),
    >,
> {
    let AppDependencies {
        health_state,
        http_state,
        resolver,
    } = deps;

    App::new()
        .app_data(health_state)
        .app_data(http_state)
        .app_data(json_config())
        .app_data(query_config())
        .app_data(path_config())
        .wrap(Authenticate::new(resolver))
        .wrap(Trace)
        .service(ready)
        .service(live)
        .service(web::scope("/api/v1").configure(move |cfg| {
            for configure in areas {
                configure(cfg);
            }
        }))
        .default_service(web::to(route_not_found))
}

/// Construct an Actix HTTP server over the configured store.
///
/// The readiness flag flips once the listener is bound.
///
/// # Errors
/// Propagates [`std::io::Error`] when binding the socket fails.
pub fn create_server(
    health_state: web::Data<HealthState>,
    config: ServerConfig,
) -> std::io::Result<Server> {
    let ServerConfig {
        bind_addr,
        store,
        ids,
        clock,
        key,
    } = config;
    let resolver: Arc<dyn PrincipalResolver> =
        Arc::new(build_token_resolver(&store, clock.clone(), key.clone()));
    let http_state = web::Data::new(build_http_state(&store, StateWiring { ids, clock, key }));
    let server_health_state = health_state.clone();

    let server = HttpServer::new(move || {
        build_app(AppDependencies {
            health_state: server_health_state.clone(),
            http_state: http_state.clone(),
            resolver: resolver.clone(),
        })
    })
    .bind(bind_addr)?
    .run();

    health_state.mark_ready();
    info!(%bind_addr, "server listening");
    Ok(server)
}
