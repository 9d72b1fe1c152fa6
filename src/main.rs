// src/main.rs
mod api;
mod config;

use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

use config::AppConfig;

const LOG_FILTER_VAR: &str = "CONTAINER_LOADER_LOG";

fn init_tracing() {
    let filter = EnvFilter::try_from_env(LOG_FILTER_VAR)
        .or_else(|_| EnvFilter::try_from_default_env())
        .unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).init();
}

#[tokio::main]
async fn main() {
    let dotenv = dotenvy::dotenv();
    init_tracing();
    if let Err(err) = dotenv {
        if !matches!(err, dotenvy::Error::Io(ref io_err) if io_err.kind() == std::io::ErrorKind::NotFound)
        {
            warn!("⚠️ Could not load .env: {}", err);
        }
    }

    let app_config = AppConfig::from_env();

    info!("🚀 Load planner starting...");
    if let Err(err) = api::start_api_server(app_config.api, app_config.planner).await {
        error!("❌ API server terminated with an error: {err}");
        std::process::exit(1);
    }
}
