//! Daily Slide Server
//!
//! Serves the daily puzzle state, score submission and leaderboards over
//! HTTP. Configured entirely from the environment.

use std::sync::Arc;
use anyhow::Context;
use chrono::Utc;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use daily_slide::{
    VERSION,
    network::{ApiServer, AuthConfig, PuzzleService, ServerConfig},
    store::{FileStore, KvStore, MemoryStore},
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    info!("Daily Slide Server v{}", VERSION);

    let config = ServerConfig::from_env().context("reading server configuration")?;
    let auth = AuthConfig::from_env();
    if auth.is_configured() {
        info!("JWT identity enabled");
    } else {
        warn!("No AUTH_SECRET set, trusting the X-Username header");
    }

    match config.store_path.clone() {
        Some(path) => {
            let store = FileStore::open(&path)
                .await
                .with_context(|| format!("opening store at {}", path.display()))?;
            serve(config, auth, Arc::new(store)).await
        }
        None => {
            warn!("DAILY_SLIDE_STORE_PATH not set, scores are kept in memory only");
            serve(config, auth, Arc::new(MemoryStore::new())).await
        }
    }
}

async fn serve<S: KvStore>(config: ServerConfig, auth: AuthConfig, store: Arc<S>) -> anyhow::Result<()> {
    let service = Arc::new(PuzzleService::new(
        store,
        Arc::new(config.images.clone()),
        config.seed_salt.clone(),
    ));

    let today = Utc::now().date_naive();
    let outcome = service
        .ensure_daily_state(today)
        .await
        .context("publishing today's puzzle")?;
    info!("Daily state for {}: {:?}", today, outcome);

    let server = Arc::new(ApiServer::new(config, service, auth));

    let signal_server = server.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            info!("Ctrl-C received, shutting down");
            signal_server.shutdown();
        }
    });

    server.run().await?;
    info!("Server stopped");
    Ok(())
}
