use std::sync::Arc;

use anyhow::Context;
use tokio::{net::TcpListener, signal};
use todo_core::{KeyValueStore, MemoryStore, RedisStore, TodoRepository};
use todo_server::{ServerConfig, StoreMode};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "todo_server=info,todo_core=info,tower_http=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = ServerConfig::from_env().context("reading configuration")?;
    let keys = config.keyspace()?;

    let store: Arc<dyn KeyValueStore> = match config.store_mode {
        StoreMode::Memory => {
            tracing::warn!(
                "using in-memory store: lists are lost on restart and ids are only unique \
                 within this process, so do not run more than one instance"
            );
            Arc::new(MemoryStore::new())
        }
        StoreMode::Redis => {
            let store = RedisStore::connect(&config.redis_url, config.store_timeout)
                .with_context(|| format!("creating redis pool for {}", config.redis_url))?;
            if let Err(error) = store.ping().await {
                // Requests fail with 503 until the store comes up.
                tracing::warn!(%error, "redis not reachable at startup");
            }
            Arc::new(store)
        }
    };
    let repository = TodoRepository::new(store, keys);

    let addr = config.bind_addr();
    let listener = TcpListener::bind(&addr)
        .await
        .with_context(|| format!("binding {addr}"))?;
    tracing::info!(%addr, store = ?config.store_mode, "listening");

    axum::serve(listener, todo_server::app(repository))
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("serving requests")?;

    tracing::info!("shutdown complete");
    Ok(())
}

/// Resolves on Ctrl+C, or SIGTERM on Unix.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(error) = signal::ctrl_c().await {
            tracing::warn!(%error, "failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(error) => {
                tracing::warn!(%error, "failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => tracing::info!("received Ctrl+C, shutting down"),
        () = terminate => tracing::info!("received SIGTERM, shutting down"),
    }
}
