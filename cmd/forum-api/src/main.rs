//! # forum-api
//!
//! Loads settings, installs logging, picks a storage backend and serves the
//! HTTP API until interrupted.

use std::sync::Arc;

use anyhow::Context;
use api_adapters::AppState;
use configs::{LogSettings, Settings, StorageBackend};
use storage_adapters::MemoryStore;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let settings = Settings::load().context("loading configuration")?;
    init_tracing(&settings.log);

    let state = match settings.storage.backend {
        StorageBackend::Memory => {
            tracing::warn!("using in-memory storage; create users and forums over the api, data is lost on exit");
            AppState::from_store(Arc::new(MemoryStore::new()))
        }
        StorageBackend::Postgres => postgres_state(&settings).await?,
    };

    let addr = settings.server.bind_addr();
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("binding {addr}"))?;
    tracing::info!(%addr, "forum-api listening");

    axum::serve(listener, api_adapters::router(state))
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("serving http")?;
    Ok(())
}

#[cfg(feature = "db-postgres")]
async fn postgres_state(settings: &Settings) -> anyhow::Result<AppState> {
    use secrecy::ExposeSecret;
    use storage_adapters::PgStore;

    let db = &settings.database;
    let store = PgStore::connect(db.url.expose_secret(), db.max_connections, db.acquire_timeout())
        .await
        .context("connecting to postgres")?;
    if db.run_migrations {
        store.migrate().await.context("running migrations")?;
        tracing::info!("migrations applied");
    }
    Ok(AppState::from_store(Arc::new(store)))
}

#[cfg(not(feature = "db-postgres"))]
async fn postgres_state(_settings: &Settings) -> anyhow::Result<AppState> {
    anyhow::bail!("built without the db-postgres feature; set storage.backend = \"memory\"")
}

fn init_tracing(log: &LogSettings) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&log.filter));
    let builder = tracing_subscriber::fmt().with_env_filter(filter);
    if log.json {
        builder.json().init();
    } else {
        builder.init();
    }
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %err, "failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    tracing::info!("shutdown requested");
}
