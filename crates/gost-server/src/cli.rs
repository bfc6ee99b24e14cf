//! CLI module for the proxy server.

use std::path::PathBuf;

use clap::Parser;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use gost_config::{init_tracing, load_config, validate_config, Config, ServerConfig};

/// Proxy server CLI arguments.
#[derive(Parser, Debug, Clone)]
#[command(name = "gost-server", version, about = "HTTP CONNECT proxy server")]
pub struct ServerArgs {
    /// Config file path (toml/json).
    #[arg(short, long, default_value = "gost.toml")]
    pub config: PathBuf,

    /// Override listen address.
    #[arg(short, long)]
    pub listen: Option<String>,

    /// Authorized user, `user`, `user:pass`, or `:pass` (repeatable).
    #[arg(short, long)]
    pub user: Vec<String>,

    /// Upstream proxy hop, `[user:pass@]host:port` (repeatable, in order).
    #[arg(short = 'F', long = "forward")]
    pub forward: Vec<String>,

    /// Log level override.
    #[arg(long)]
    pub log_level: Option<String>,
}

/// Run the proxy server with the given CLI arguments.
pub async fn run(args: ServerArgs) -> Result<(), Box<dyn std::error::Error>> {
    // The config file is optional when everything arrives as flags.
    let mut config = if args.config.exists() {
        load_config(&args.config)?
    } else {
        Config::default()
    };

    let mut server = config.server.take().unwrap_or(ServerConfig {
        listen: String::new(),
        users: Vec::new(),
        chain: Vec::new(),
        idle_timeout_secs: gost_core::defaults::DEFAULT_IDLE_TIMEOUT_SECS,
        max_head_bytes: gost_core::defaults::DEFAULT_MAX_HEAD_BYTES,
        max_connections: None,
        resource_limits: Default::default(),
        tcp: Default::default(),
    });
    if let Some(listen) = &args.listen {
        server.listen = listen.clone();
    }
    if !args.user.is_empty() {
        server.users = args.user.clone();
    }
    if !args.forward.is_empty() {
        server.chain = args.forward.clone();
    }
    if let Some(level) = &args.log_level {
        config.logging.level = Some(level.clone());
    }

    config.server = Some(server.clone());
    config.client = None;
    validate_config(&config)?;
    init_tracing(&config.logging);

    let shutdown = CancellationToken::new();
    let shutdown_signal = shutdown.clone();
    tokio::spawn(async move {
        shutdown_signal_handler().await;
        info!("shutdown signal received");
        shutdown_signal.cancel();
    });

    crate::server::run_with_shutdown(server, shutdown).await?;
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
