use std::sync::Arc;

use clap::Parser;
use cloudnav::config::{Cli, Config, default_config_path};
use cloudnav::handler::AppState;
use cloudnav::kv::KvStore;
use tokio::signal;
use tokio_util::sync::CancellationToken;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();
    let args = Cli::parse();

    let config_path = match args.config_path {
        Some(path) => std::path::PathBuf::from(path),
        None => default_config_path(),
    };

    tracing_subscriber::fmt()
        .json()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();
    tracing::info!("cloudnav.svc starting");

    let cfg = Config::new(&config_path.to_string_lossy()).unwrap_or_else(|e| {
        tracing::error!(error = %e, path = ?config_path, "failed to load config file");
        std::process::exit(1);
    });

    let kv = match &cfg.kv {
        Some(kv_cfg) => {
            let store = KvStore::from_config(kv_cfg).await.unwrap_or_else(|e| {
                tracing::error!(error = %cloudnav::unpack_error(&e), "failed to setup kv store");
                std::process::exit(1);
            });
            tracing::info!(backend = store.backend_name(), "kv store ready");
            Some(Arc::new(store))
        }
        None => {
            tracing::warn!("no kv backend configured, storage endpoint will answer 500");
            None
        }
    };

    let password = cfg.app.get_password().map(str::to_string);
    if password.is_none() {
        tracing::warn!("no password configured, saves will be rejected");
    }

    let address = format!("0.0.0.0:{}", cfg.app.get_port());
    let app = cloudnav::router(AppState::new(kv, password));

    let listener = tokio::net::TcpListener::bind(&address).await.unwrap_or_else(|e| {
        tracing::error!(error = %e, "failed to setup tcp listener");
        std::process::exit(1);
    });

    let cancellation_token = CancellationToken::new();
    let shutdown_token = cancellation_token.clone();
    tokio::spawn(async move {
        if let Err(e) = signal::ctrl_c().await {
            tracing::error!(error = %e, "failed to listen for ctrl+c");
            return;
        }
        tracing::info!("ctrl+c signal received, preparing to shutdown");
        shutdown_token.cancel();
    });

    tracing::info!("cloudnav.svc running on {}", &address);
    if let Err(err) = axum::serve(listener, app)
        .with_graceful_shutdown(cancellation_token.cancelled_owned())
        .await
    {
        tracing::error!(error = %err, "server error");
        std::process::exit(1);
    }

    tracing::info!("cloudnav.svc going off, graceful shutdown complete");
}
