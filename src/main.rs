//! Game object admin backend entrypoint wiring configuration, storage and the REST layer.

use std::{env, net::SocketAddr, sync::Arc};

use anyhow::Context;
use axum::Router;
use tokio::net::TcpListener;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use game_object_admin_back::{
    config::AppConfig,
    dao::admin_store::{AdminStore, memory::MemoryAdminStore},
    routes,
    state::{AppState, SharedState},
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_tracing();

    let config = AppConfig::load();
    let store = connect_store().await?;
    let app_state = AppState::new(config, store);

    let credentials = app_state.credentials();
    if credentials.is_empty() {
        warn!("no credentials configured; every authenticated route will answer 401");
    } else {
        info!(count = credentials.len(), "credentials registered");
    }

    let app = build_router(app_state);

    let port = env::var("PORT")
        .or_else(|_| env::var("SERVER_PORT"))
        .ok()
        .and_then(|value| value.parse::<u16>().ok())
        .unwrap_or(8080);

    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    info!(%addr, "starting server");

    let listener = TcpListener::bind(addr).await.context("binding server")?;
    let service = app.into_make_service();
    axum::serve(listener, service)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("serving axum")?;

    Ok(())
}

/// Open the SQLite store when `DATABASE_URL` is set, else fall back to memory.
#[cfg(feature = "sqlite-store")]
async fn connect_store() -> anyhow::Result<Arc<dyn AdminStore>> {
    use game_object_admin_back::dao::admin_store::sqlite::{SqliteAdminStore, SqliteConfig};

    if env::var_os("DATABASE_URL").is_none() {
        return Ok(memory_store());
    }

    let config = SqliteConfig::from_env().context("reading SQLite configuration")?;
    let store = SqliteAdminStore::connect(config)
        .await
        .context("connecting to SQLite")?;
    info!("using SQLite admin store");
    Ok(Arc::new(store))
}

#[cfg(not(feature = "sqlite-store"))]
async fn connect_store() -> anyhow::Result<Arc<dyn AdminStore>> {
    if env::var_os("DATABASE_URL").is_some() {
        warn!("DATABASE_URL ignored: built without the `sqlite-store` feature");
    }
    Ok(memory_store())
}

fn memory_store() -> Arc<dyn AdminStore> {
    warn!("DATABASE_URL not set; data lives in memory and is lost on shutdown");
    Arc::new(MemoryAdminStore::new())
}

/// Build the top-level router and attach cross-cutting middleware layers.
fn build_router(state: SharedState) -> Router<()> {
    routes::router(state)
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
}

/// Configure tracing subscribers so logs include spans by default.
fn init_tracing() {
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "info,tower_http=debug".into());
    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer())
        .init();
}

/// Wait for Ctrl+C or SIGTERM and shut the server down gracefully.
async fn shutdown_signal() {
    #[cfg(unix)]
    {
        use tokio::signal::unix::{SignalKind, signal};

        let mut term = signal(SignalKind::terminate()).expect("install SIGTERM handler");
        tokio::select! {
            _ = tokio::signal::ctrl_c() => {},
            _ = term.recv() => {},
        }
    }

    #[cfg(not(unix))]
    {
        let _ = tokio::signal::ctrl_c().await;
    }
}
