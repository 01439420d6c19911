use anyhow::Result;
use kc_provision::{config::Config, server, telemetry};
use tracing::info;

#[tokio::main]
async fn main() -> Result<()> {
    // Load configuration
    dotenvy::dotenv().ok();
    let config = Config::from_env()?;

    telemetry::init(&config.log_format);

    info!("Starting kc-provision");
    info!("Keycloak admin API at {}", config.keycloak.url);

    server::run(config).await
}
