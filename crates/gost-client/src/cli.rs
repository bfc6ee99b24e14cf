//! CLI module for the forwarder client.

use std::path::PathBuf;

use clap::Parser;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use gost_config::{init_tracing, load_config, validate_config, ClientConfig, Config};
use gost_core::defaults::DEFAULT_IDLE_TIMEOUT_SECS;

/// Forwarder client CLI arguments.
#[derive(Parser, Debug, Clone)]
#[command(name = "gost-client", version, about = "Local forwarder through an HTTP proxy")]
pub struct ClientArgs {
    /// Config file path (toml/json).
    #[arg(short, long, default_value = "gost.toml")]
    pub config: PathBuf,

    /// Override local listen address.
    #[arg(short, long)]
    pub listen: Option<String>,

    /// Override HTTP proxy address.
    #[arg(short, long)]
    pub proxy: Option<String>,

    /// Override tunnel destination.
    #[arg(short, long)]
    pub target: Option<String>,

    /// Proxy credential, `user` or `user:pass`.
    #[arg(long)]
    pub credential: Option<String>,

    /// Log level override.
    #[arg(long)]
    pub log_level: Option<String>,
}

/// Run the forwarder client with the given CLI arguments.
pub async fn run(args: ClientArgs) -> Result<(), Box<dyn std::error::Error>> {
    // The config file is optional when everything arrives as flags.
    let mut config = if args.config.exists() {
        load_config(&args.config)?
    } else {
        Config::default()
    };

    let mut client = config.client.take().unwrap_or(ClientConfig {
        listen: String::new(),
        proxy: String::new(),
        target: String::new(),
        credential: None,
        idle_timeout_secs: DEFAULT_IDLE_TIMEOUT_SECS,
    });
    if let Some(listen) = &args.listen {
        client.listen = listen.clone();
    }
    if let Some(proxy) = &args.proxy {
        client.proxy = proxy.clone();
    }
    if let Some(target) = &args.target {
        client.target = target.clone();
    }
    if let Some(credential) = &args.credential {
        client.credential = Some(credential.clone());
    }
    if let Some(level) = &args.log_level {
        config.logging.level = Some(level.clone());
    }

    config.client = Some(client.clone());
    config.server = None;
    validate_config(&config)?;
    init_tracing(&config.logging);

    let shutdown = CancellationToken::new();
    let shutdown_signal = shutdown.clone();
    tokio::spawn(async move {
        shutdown_signal_handler().await;
        info!("shutdown signal received");
        shutdown_signal.cancel();
    });

    crate::forward::run(client, shutdown).await?;
    Ok(())
}

/// Wait for shutdown signals (SIGTERM, SIGINT).
async fn shutdown_signal_handler() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            warn!("failed to listen for Ctrl+C: {e}");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(e) => {
                warn!("failed to listen for SIGTERM: {e}");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {}
        _ = terminate => {}
    }
}
