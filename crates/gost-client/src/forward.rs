//! Local forwarder: tunnel accepted TCP connections through the proxy.

use std::sync::Arc;
use std::time::Duration;

use tokio::net::{TcpListener, TcpStream};
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info};

use gost_auth::Credential;
use gost_config::ClientConfig;
use gost_core::defaults::DEFAULT_RELAY_BUFFER_SIZE;
use gost_core::io::relay;

use crate::client::Client;
use crate::error::ClientError;
use crate::http::HttpConnector;
use crate::transport::{TcpTransporter, Transporter};

/// Run the forwarder until the token is cancelled.
///
/// Every connection accepted on `client.listen` is tunneled to
/// `client.target` through the HTTP proxy at `client.proxy`.
pub async fn run(config: ClientConfig, shutdown: CancellationToken) -> Result<(), ClientError> {
    let connector = match config.credential.as_deref() {
        Some(spec) => HttpConnector::with_credential(Credential::from_spec(spec)),
        None => HttpConnector::new(),
    };
    let client = Arc::new(Client::new(connector, TcpTransporter));

    let listener = TcpListener::bind(&config.listen).await?;
    info!(
        listen = %config.listen,
        proxy = %config.proxy,
        target = %config.target,
        "forwarder started"
    );

    let idle_timeout = Duration::from_secs(config.idle_timeout_secs);

    loop {
        tokio::select! {
            result = listener.accept() => {
                match result {
                    Ok((local, peer)) => {
                        let client = client.clone();
                        let proxy = config.proxy.clone();
                        let target = config.target.clone();
                        tokio::spawn(async move {
                            if let Err(e) =
                                tunnel(local, &client, &proxy, &target, idle_timeout).await
                            {
                                debug!(peer = %peer, error = %e, "tunnel failed");
                            }
                        });
                    }
                    Err(e) => {
                        error!(error = %e, "failed to accept connection");
                    }
                }
            }
            _ = shutdown.cancelled() => {
                info!("shutting down forwarder");
                break;
            }
        }
    }

    Ok(())
}

async fn tunnel<T>(
    local: TcpStream,
    client: &Client<HttpConnector, T>,
    proxy: &str,
    target: &str,
    idle_timeout: Duration,
) -> Result<(), ClientError>
where
    T: Transporter,
{
    let tcp = client.dial(proxy).await?;
    let mut stream = client.handshake(tcp).await?;
    client.connect(&mut stream, target).await?;
    debug!(proxy = %proxy, target = %target, "tunnel established");

    let moved = relay(local, stream, idle_timeout, DEFAULT_RELAY_BUFFER_SIZE).await?;
    debug!(
        sent = moved.a_to_b,
        received = moved.b_to_a,
        "tunnel finished"
    );
    Ok(())
}
