//! Backend entry point: loads configuration, opens the store and serves the
//! REST API.

use std::net::{Ipv4Addr, SocketAddr};
use std::sync::Arc;

use actix_web::web;
use color_eyre::eyre::{Context as _, Result};
use mockable::{DefaultClock, DefaultEnv};
use tracing::{info, warn};
use tracing_subscriber::{EnvFilter, fmt};

use vaultke::config::AppConfig;
use vaultke::domain::TokenKey;
use vaultke::domain::ports::UuidIdGenerator;
use vaultke::inbound::http::health::HealthState;
use vaultke::outbound::persistence::Store;
use vaultke::server::{ServerConfig, create_server};

fn init_tracing(default_level: &str) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    if let Err(e) = fmt().with_env_filter(filter).json().try_init() {
        warn!(error = %e, "tracing init failed");
    }
}

/// Application bootstrap.
#[actix_web::main]
async fn main() -> Result<()> {
    color_eyre::install()?;
    let config = AppConfig::from_env(&DefaultEnv::new()).wrap_err("invalid configuration")?;
    init_tracing(&config.observability.log_level);

    let store = Store::open(&config.database_url)
        .await
        .wrap_err("failed to open the database")?;
    let bind_addr = SocketAddr::from((Ipv4Addr::UNSPECIFIED, config.port));
    let health_state = web::Data::new(HealthState::new());
    let server = create_server(
        health_state.clone(),
        ServerConfig::new(
            bind_addr,
            store.clone(),
            Arc::new(UuidIdGenerator),
            Arc::new(DefaultClock),
            TokenKey::new(config.jwt_secret.as_str()),
        ),
    )?;
    info!(
        environment = config.environment.as_str(),
        %bind_addr,
        "vaultke started"
    );

    server.await?;
    health_state.mark_unhealthy();
    store.close().await;
    Ok(())
}
