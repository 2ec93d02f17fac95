pub mod api;
pub mod config;
pub mod core_state;
pub mod db;
pub mod models;
pub mod notifications;

use std::sync::Arc;

use thiserror::Error;
use tracing_subscriber::EnvFilter;

#[derive(Error, Debug)]
pub enum StartupError {
    #[error(transparent)]
    Config(#[from] config::ConfigError),

    #[error(transparent)]
    Core(#[from] core_state::CoreError),

    #[error("{0}")]
    Server(String),

    #[error("Failed to listen for shutdown signal: {0}")]
    Signal(#[from] std::io::Error),
}

/// Serve the notification API until Ctrl-C.
pub async fn run() -> Result<(), StartupError> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(config::default_log_filter())),
        )
        .init();

    tracing::info!("{} starting v{}", config::APP_NAME, config::APP_VERSION);

    let server_config = config::ServerConfig::from_env()?;
    tracing::info!(db = %server_config.database_path.display(), "Opening notification database");
    let core = Arc::new(core_state::CoreState::open(&server_config.database_path)?);

    let mut server = api::start_api_server_on(core, server_config.bind_addr)
        .await
        .map_err(StartupError::Server)?;
    tracing::info!(url = %server.base_url(), "Notification API ready");

    tokio::signal::ctrl_c().await?;
    server.shutdown();
    server.wait().await;
    Ok(())
}
