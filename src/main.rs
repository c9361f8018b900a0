use anyhow::Context;
use tracing_subscriber::EnvFilter;

use voz_animal_api::config::AppConfig;
use voz_animal_api::database::DatabaseManager;
use voz_animal_api::{app, AppState};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env if present so cargo run picks up DATABASE_URL, JWT_SECRET, etc.
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let config = AppConfig::from_env().context("invalid configuration")?;
    tracing::info!("Starting Voz Animal API in {:?} mode", config.environment);

    let store = DatabaseManager::open_store(&config.database)
        .await
        .context("could not open the record store")?;
    let port = config.server.port;

    let state = AppState::new(config, store);
    state
        .images
        .ensure_dirs()
        .await
        .with_context(|| format!("could not create upload directory {}", state.images.root().display()))?;

    let bind_addr = format!("0.0.0.0:{}", port);
    let listener = tokio::net::TcpListener::bind(&bind_addr)
        .await
        .with_context(|| format!("failed to bind {}", bind_addr))?;

    tracing::info!("Voz Animal API listening on http://{}", bind_addr);
    axum::serve(listener, app(state)).await?;

    Ok(())
}
