//! Connector layer: what the proxy is asked to do once reached.

use std::future::Future;

use tokio::io::{AsyncRead, AsyncWrite};

use crate::error::ClientError;

/// Asks an already-handshaken proxy to open a logical connection to a
/// destination address.
///
/// The connector decorates the stream it is given, it never replaces it:
/// on success subsequent I/O on the same stream is a tunnel to `addr`.
/// The stream is borrowed, so the connector cannot close it on failure
/// either; its lifecycle stays with the caller.
pub trait Connector: Send + Sync {
    /// Issue the proxy-specific connect sequence for `addr` (host:port).
    fn connect<S>(
        &self,
        stream: &mut S,
        addr: &str,
    ) -> impl Future<Output = Result<(), ClientError>> + Send
    where
        S: AsyncRead + AsyncWrite + Unpin + Send;
}
