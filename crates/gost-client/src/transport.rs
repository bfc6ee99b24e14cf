//! Transport layer: how the proxy itself is reached.

use std::future::Future;

use tokio::io::{AsyncRead, AsyncWrite};
use tokio::net::TcpStream;

use crate::error::ClientError;

/// Session establishment on top of a raw connection to the proxy.
///
/// Implementations report the network kind used for raw dialing and turn a
/// freshly dialed TCP stream into a protocol-ready stream. The associated
/// `Stream` type lets a TLS or multiplexing transport substitute its own
/// stream without changing callers.
pub trait Transporter: Send + Sync {
    type Stream: AsyncRead + AsyncWrite + Unpin + Send + 'static;

    /// Network kind for the raw dial (e.g. `"tcp"`).
    fn network(&self) -> &'static str;

    /// Establish the transport session on `tcp`.
    fn handshake(
        &self,
        tcp: TcpStream,
    ) -> impl Future<Output = Result<Self::Stream, ClientError>> + Send;
}

/// Plain TCP transport: the handshake is the identity.
#[derive(Debug, Clone, Copy, Default)]
pub struct TcpTransporter;

impl Transporter for TcpTransporter {
    type Stream = TcpStream;

    fn network(&self) -> &'static str {
        "tcp"
    }

    async fn handshake(&self, tcp: TcpStream) -> Result<TcpStream, ClientError> {
        Ok(tcp)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::net::TcpListener;

    #[tokio::test]
    async fn tcp_handshake_is_identity() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let accept = tokio::spawn(async move { listener.accept().await.unwrap() });

        let tcp = TcpStream::connect(addr).await.unwrap();
        let before = tcp.local_addr().unwrap();
        let after = TcpTransporter.handshake(tcp).await.unwrap();
        assert_eq!(after.local_addr().unwrap(), before);
        assert_eq!(TcpTransporter.network(), "tcp");

        accept.await.unwrap();
    }
}
