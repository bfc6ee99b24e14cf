//! The proxy client: one transporter plus one connector.

use std::sync::OnceLock;

use tokio::io::{AsyncRead, AsyncWrite};
use tokio::net::TcpStream;

use crate::connector::Connector;
use crate::error::ClientError;
use crate::http::HttpConnector;
use crate::transport::{TcpTransporter, Transporter};

/// Composes a [`Transporter`] and a [`Connector`] into the three-step
/// usage contract: `dial` the proxy, `handshake`, then `connect` to the
/// destination. Stateless besides its two capabilities; construct once
/// and reuse across sessions.
#[derive(Debug, Clone)]
pub struct Client<C, T> {
    connector: C,
    transporter: T,
}

impl<C, T> Client<C, T>
where
    C: Connector,
    T: Transporter,
{
    pub fn new(connector: C, transporter: T) -> Self {
        Self {
            connector,
            transporter,
        }
    }

    /// Open a raw connection to the proxy at `addr`, using the
    /// transporter's network kind.
    pub async fn dial(&self, addr: &str) -> Result<TcpStream, ClientError> {
        match self.transporter.network() {
            "tcp" => Ok(TcpStream::connect(addr).await?),
            other => Err(ClientError::UnsupportedNetwork(other.to_string())),
        }
    }

    /// Perform the transport handshake with the proxy.
    pub async fn handshake(&self, tcp: TcpStream) -> Result<T::Stream, ClientError> {
        self.transporter.handshake(tcp).await
    }

    /// Ask the proxy to connect to `addr` over the handshaken `stream`.
    pub async fn connect<S>(&self, stream: &mut S, addr: &str) -> Result<(), ClientError>
    where
        S: AsyncRead + AsyncWrite + Unpin + Send,
    {
        self.connector.connect(stream, addr).await
    }
}

/// The standard HTTP proxy client: no credential, plain TCP transport.
pub type DefaultClient = Client<HttpConnector, TcpTransporter>;

impl Default for DefaultClient {
    fn default() -> Self {
        Client::new(HttpConnector::new(), TcpTransporter)
    }
}

impl DefaultClient {
    /// Process-wide shared default client, initialized on first use.
    ///
    /// Callers needing different configuration construct their own
    /// [`Client`] instead.
    pub fn shared() -> &'static DefaultClient {
        static SHARED: OnceLock<DefaultClient> = OnceLock::new();
        SHARED.get_or_init(DefaultClient::default)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn dial_rejects_unknown_network_kinds() {
        struct UdpTransporter;
        impl Transporter for UdpTransporter {
            type Stream = TcpStream;
            fn network(&self) -> &'static str {
                "udp"
            }
            async fn handshake(&self, tcp: TcpStream) -> Result<TcpStream, ClientError> {
                Ok(tcp)
            }
        }

        let client = Client::new(HttpConnector::new(), UdpTransporter);
        let err = client.dial("127.0.0.1:1").await.unwrap_err();
        assert!(matches!(err, ClientError::UnsupportedNetwork(k) if k == "udp"));
    }

    #[tokio::test]
    async fn dial_surfaces_connect_errors() {
        // Port 1 on localhost is almost certainly closed; either way the
        // error must come back as Io, not panic.
        let err = DefaultClient::default().dial("127.0.0.1:1").await;
        assert!(matches!(err, Err(ClientError::Io(_))));
    }

    #[test]
    fn shared_is_one_instance() {
        let a = DefaultClient::shared() as *const DefaultClient;
        let b = DefaultClient::shared() as *const DefaultClient;
        assert_eq!(a, b);
    }
}
