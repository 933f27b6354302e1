use std::sync::Arc;

use anyhow::Context;
use clap::Parser;
use tokio::{net::TcpListener, sync::oneshot};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;
use zaca_api::{
    config::{LogFormat, StoreKind, ZacaApiConfig},
    server,
};
use zaca_db::storage::{RecordStore, memory::MemoryStorage, mongodb::MongoDBStorage};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = ZacaApiConfig::parse();

    if config.dump_openapi {
        let (_, api) = server::make(config, Arc::new(MemoryStorage::new()))?;
        print!("{}", api.to_pretty_json()?);
        return Ok(());
    }

    init_tracing(&config);

    let store = connect(&config).await?;
    let (router, _) = server::make(config.clone(), store)?;

    let listener = TcpListener::bind(config.bind_addr)
        .await
        .with_context(|| format!("Failed to bind to {}", config.bind_addr))?;

    info!("Listening on http://{:?}", config.bind_addr);

    let (shutdown_tx, shutdown_rx) = oneshot::channel::<()>();
    let server = tokio::spawn(async move {
        axum::serve(listener, router)
            .with_graceful_shutdown(async {
                let _ = shutdown_rx.await;
            })
            .await
    });

    shutdown_signal().await?;
    let _ = shutdown_tx.send(());

    match tokio::time::timeout(config.shutdown_timeout(), server).await {
        Ok(joined) => joined?.context("Server exited with an error")?,
        Err(_) => warn!(
            grace_secs = config.shutdown_timeout_secs,
            "In-flight requests did not finish in time, exiting anyway"
        ),
    }

    info!("Shut down");
    Ok(())
}

fn init_tracing(config: &ZacaApiConfig) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(config.default_log_filter()));
    let builder = tracing_subscriber::fmt().with_env_filter(filter);

    match config.log_format {
        LogFormat::Pretty => builder.pretty().init(),
        LogFormat::Json => builder.json().init(),
    }
}

async fn connect(config: &ZacaApiConfig) -> anyhow::Result<Arc<dyn RecordStore>> {
    match config.store {
        StoreKind::Mongodb => {
            let store = MongoDBStorage::new(&config.mongodb_uri)
                .await
                .context("Failed to create MongoDB client")?;
            info!("Using MongoDB record store");
            Ok(Arc::new(store))
        }
        StoreKind::Memory => {
            warn!("Using in-memory record store, records will not survive a restart");
            Ok(Arc::new(MemoryStorage::new()))
        }
    }
}

/// Resolves on SIGINT, SIGTERM or SIGQUIT. SIGHUP is logged and ignored.
#[cfg(unix)]
async fn shutdown_signal() -> anyhow::Result<()> {
    use tokio::signal::unix::{SignalKind, signal};

    let mut interrupt = signal(SignalKind::interrupt())?;
    let mut terminate = signal(SignalKind::terminate())?;
    let mut quit = signal(SignalKind::quit())?;
    let mut hangup = signal(SignalKind::hangup())?;

    loop {
        tokio::select! {
            _ = interrupt.recv() => {
                info!("Received SIGINT, shutting down");
                return Ok(());
            }
            _ = terminate.recv() => {
                info!("Received SIGTERM, shutting down");
                return Ok(());
            }
            _ = quit.recv() => {
                info!("Received SIGQUIT, shutting down");
                return Ok(());
            }
            _ = hangup.recv() => {
                info!("Received SIGHUP, ignoring");
            }
        }
    }
}

#[cfg(not(unix))]
async fn shutdown_signal() -> anyhow::Result<()> {
    tokio::signal::ctrl_c().await?;
    info!("Received Ctrl-C, shutting down");
    Ok(())
}
