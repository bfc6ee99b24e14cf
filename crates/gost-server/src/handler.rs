//! The inbound HTTP proxy state machine.
//!
//! One call to [`handle_conn`] serves one accepted connection, start to
//! finish: parse, protocol-version guard, authenticate, strip, dial,
//! respond, relay. Every policy rejection answers with a well-formed HTTP
//! response before terminating; only a request that never parsed gets a
//! bare close.

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use bytes::BytesMut;
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};
use tracing::{debug, warn};

use gost_auth::{authenticate, decode_basic, User};
use gost_core::defaults;
use gost_core::io::relay;
use gost_proto::{
    control_response, parse_request_head, ParseResult, ProtoError, STATUS_BAD_REQUEST,
    STATUS_CONNECTION_ESTABLISHED, STATUS_PROXY_AUTH_REQUIRED, STATUS_SERVICE_UNAVAILABLE,
};

use crate::chain::Chain;
use crate::error::ServerError;

/// Immutable per-handler configuration, shared read-only by every
/// connection the handler serves.
pub struct HandlerOptions {
    /// Authorized users; empty disables authentication entirely.
    pub users: Vec<User>,
    /// Destination dialer.
    pub chain: Arc<dyn Chain>,
    /// Maximum bytes accepted for one request head.
    pub max_head_bytes: usize,
    /// Relay buffer size per direction.
    pub relay_buffer_size: usize,
    /// Tunnel idle timeout (zero disables it).
    pub idle_timeout: Duration,
}

impl HandlerOptions {
    pub fn new(chain: Arc<dyn Chain>) -> Self {
        Self {
            users: Vec::new(),
            chain,
            max_head_bytes: defaults::DEFAULT_MAX_HEAD_BYTES,
            relay_buffer_size: defaults::DEFAULT_RELAY_BUFFER_SIZE,
            idle_timeout: Duration::from_secs(defaults::DEFAULT_IDLE_TIMEOUT_SECS),
        }
    }

    pub fn with_users(mut self, users: Vec<User>) -> Self {
        self.users = users;
        self
    }

    pub fn with_max_head_bytes(mut self, max: usize) -> Self {
        self.max_head_bytes = max;
        self
    }

    pub fn with_relay_buffer_size(mut self, size: usize) -> Self {
        self.relay_buffer_size = size;
        self
    }

    pub fn with_idle_timeout(mut self, timeout: Duration) -> Self {
        self.idle_timeout = timeout;
        self
    }
}

/// Serve one inbound connection.
///
/// Returns `Ok(())` both for clean completions and for policy rejections
/// that were answered on the wire; `Err` means the connection died without
/// a meaningful response (parse failure, mid-stream I/O error). The caller
/// logs either way.
pub async fn handle_conn<S>(
    mut stream: S,
    opts: Arc<HandlerOptions>,
    peer: SocketAddr,
) -> Result<(), ServerError>
where
    S: AsyncRead + AsyncWrite + Unpin + Send,
{
    // Read until one full request head is buffered.
    let mut buf = BytesMut::with_capacity(2048);
    let (mut head, consumed) = loop {
        let n = stream.read_buf(&mut buf).await?;
        if n == 0 {
            if buf.is_empty() {
                // Peer connected and hung up; nothing to do.
                return Ok(());
            }
            return Err(std::io::Error::new(
                std::io::ErrorKind::UnexpectedEof,
                "connection closed mid-head",
            )
            .into());
        }
        match parse_request_head(&buf)? {
            ParseResult::Complete { head, consumed } => break (head, consumed),
            ParseResult::Incomplete => {
                if buf.len() > opts.max_head_bytes {
                    return Err(ProtoError::HeadTooLarge(opts.max_head_bytes).into());
                }
            }
        }
    };

    debug!(
        peer = %peer,
        method = %head.method,
        target = %head.target,
        version = ?head.version,
        "request"
    );

    if head.is_h2_preface() {
        debug!(peer = %peer, "not an HTTP/2 server");
        stream
            .write_all(&control_response(STATUS_BAD_REQUEST, &[]))
            .await?;
        return Ok(());
    }

    if !opts.users.is_empty() {
        let (username, password) = head
            .header("Proxy-Authorization")
            .and_then(decode_basic)
            .unwrap_or_default();
        if !authenticate(&opts.users, &username, &password) {
            debug!(peer = %peer, target = %head.target, "proxy authentication required");
            stream
                .write_all(&control_response(
                    STATUS_PROXY_AUTH_REQUIRED,
                    &[("Proxy-Authenticate", "Basic realm=\"gost\"")],
                ))
                .await?;
            return Ok(());
        }
    }

    // Never leak the client's credential upstream.
    head.remove_header("Proxy-Authorization");

    let target = head.dial_address().unwrap_or_default();
    let mut outbound = match opts.chain.dial(&target).await {
        Ok(s) => s,
        Err(e) => {
            warn!(peer = %peer, target = %target, error = %e, "dial failed");
            stream
                .write_all(&control_response(STATUS_SERVICE_UNAVAILABLE, &[]))
                .await?;
            return Ok(());
        }
    };
    // From here on, `outbound` is dropped (closed) on every exit path.

    if head.is_connect() {
        stream
            .write_all(&control_response(STATUS_CONNECTION_ESTABLISHED, &[]))
            .await?;
    } else {
        head.remove_header("Proxy-Connection");
        let mut forwarded = BytesMut::with_capacity(consumed);
        head.encode(&mut forwarded);
        outbound.write_all(&forwarded).await?;
    }

    // Bytes already buffered past the head belong to the tunnel (or the
    // request body) and must reach the destination first.
    if buf.len() > consumed {
        outbound.write_all(&buf[consumed..]).await?;
    }

    debug!(peer = %peer, target = %target, "relaying");
    let moved = relay(stream, outbound, opts.idle_timeout, opts.relay_buffer_size).await?;
    debug!(
        peer = %peer,
        target = %target,
        sent = moved.a_to_b,
        received = moved.b_to_a,
        "relay finished"
    );
    Ok(())
}
