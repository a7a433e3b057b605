mod api;
mod config;
mod constants;

use std::sync::Arc;

use config::{AppConfig, ConfigError};
use constants::paths;
use design2web_service::{DesignService, InMemoryUsageStore};
use inference::{GatewayError, InferenceGateway, SharedGateway};

/// Errors that stop the server from starting
#[derive(Debug, thiserror::Error)]
enum StartupError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),
    #[error("Failed to create completion backend: {0}")]
    Gateway(#[from] GatewayError),
    #[error("Server I/O error: {0}")]
    Io(#[from] std::io::Error),
}

#[tokio::main]
async fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .format_timestamp_millis()
        .init();

    log::info!("design2web starting...");

    if let Err(e) = run().await {
        log::error!("{}", e);
        std::process::exit(1);
    }
}

async fn run() -> Result<(), StartupError> {
    let data_dir = config::data_dir();
    let mut config = match AppConfig::load(&data_dir).await {
        Ok(config) => {
            log::info!("Loaded configuration from {:?}", data_dir);
            config
        }
        Err(e) => {
            log::warn!("Failed to load config, using defaults: {}", e);
            AppConfig::default()
        }
    };
    if !data_dir.join(paths::CONFIG_FILE).exists() {
        if let Err(e) = config.save(&data_dir).await {
            log::warn!("Could not write default config: {}", e);
        }
    }
    config.apply_env()?;

    let gateway: SharedGateway = Arc::new(InferenceGateway::new(&config.backend, &config.inference)?);
    log::info!(
        "Using {} backend, daily limit {}",
        config.backend,
        config.daily_limit
    );

    let service = Arc::new(DesignService::new(
        gateway,
        Arc::new(InMemoryUsageStore::new()),
        config.daily_limit,
    ));
    let app = api::router(service);

    let listener = tokio::net::TcpListener::bind(config.bind_address()).await?;
    log::info!("Listening on http://{}", listener.local_addr()?);
    axum::serve(listener, app).await?;
    Ok(())
}
