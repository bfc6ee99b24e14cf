//! Accept loop and connection lifecycle.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::Semaphore;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

use gost_auth::User;
use gost_config::ServerConfig;

use crate::chain::{Chain, DirectChain, ProxyChain};
use crate::error::ServerError;
use crate::handler::{handle_conn, HandlerOptions};
use crate::util::{
    apply_tcp_options, create_listener, ConnectionGuard, ConnectionTracker, TcpOptions,
};

/// How long a graceful shutdown waits for in-flight connections.
pub const DEFAULT_SHUTDOWN_TIMEOUT: Duration =
    Duration::from_secs(gost_core::defaults::DEFAULT_SHUTDOWN_TIMEOUT_SECS);

/// Run the proxy server until the process is killed.
pub async fn run(config: ServerConfig) -> Result<(), ServerError> {
    run_with_shutdown(config, CancellationToken::new()).await
}

/// Run the proxy server until `shutdown` is cancelled, then drain.
pub async fn run_with_shutdown(
    config: ServerConfig,
    shutdown: CancellationToken,
) -> Result<(), ServerError> {
    let listen_addr = config
        .listen
        .parse()
        .map_err(|e| ServerError::Config(format!("invalid listen address {:?}: {e}", config.listen)))?;

    let users: Vec<User> = config.users.iter().map(|s| User::from_spec(s)).collect();

    let tcp_options = TcpOptions {
        no_delay: config.tcp.no_delay,
        keepalive_secs: config.tcp.keepalive_secs,
        send_buffer: config.resource_limits.tcp_send_buffer,
        recv_buffer: config.resource_limits.tcp_recv_buffer,
    };

    let chain: Arc<dyn Chain> = if config.chain.is_empty() {
        Arc::new(DirectChain::new(tcp_options.clone()))
    } else {
        Arc::new(ProxyChain::from_specs(&config.chain, tcp_options.clone())?)
    };

    let opts = Arc::new(
        HandlerOptions::new(chain)
            .with_users(users)
            .with_max_head_bytes(config.max_head_bytes)
            .with_relay_buffer_size(config.resource_limits.relay_buffer_size)
            .with_idle_timeout(Duration::from_secs(config.idle_timeout_secs)),
    );

    let listener = create_listener(listen_addr, config.resource_limits.connection_backlog)?;
    info!(
        listen = %listen_addr,
        auth = !opts.users.is_empty(),
        chain_hops = config.chain.len(),
        "proxy server listening"
    );

    let limiter = config
        .max_connections
        .map(|n| Arc::new(Semaphore::new(n)));
    let tracker = ConnectionTracker::new();

    loop {
        tokio::select! {
            biased;

            _ = shutdown.cancelled() => {
                info!("shutting down, draining connections");
                break;
            }

            accepted = listener.accept() => {
                let (stream, peer) = match accepted {
                    Ok(pair) => pair,
                    Err(e) => {
                        error!("accept failed: {e}");
                        continue;
                    }
                };

                let permit = match &limiter {
                    Some(sem) => match sem.clone().try_acquire_owned() {
                        Ok(permit) => Some(permit),
                        Err(_) => {
                            warn!(peer = %peer, "connection limit reached, dropping");
                            continue;
                        }
                    },
                    None => None,
                };

                if let Err(e) = apply_tcp_options(&stream, &tcp_options) {
                    warn!(peer = %peer, "failed to set socket options: {e}");
                }

                tracker.increment();
                let guard = ConnectionGuard::new(tracker.clone());
                let opts = opts.clone();
                tokio::spawn(async move {
                    let _permit = permit;
                    let _guard = guard;
                    match handle_conn(stream, opts, peer).await {
                        Ok(()) => debug!(peer = %peer, "connection closed"),
                        Err(e) => debug!(peer = %peer, "connection failed: {e}"),
                    }
                });
            }
        }
    }

    if tracker.wait_for_zero(DEFAULT_SHUTDOWN_TIMEOUT).await {
        info!("all connections drained");
    } else {
        warn!(remaining = tracker.count(), "shutdown timeout, abandoning connections");
    }
    Ok(())
}
