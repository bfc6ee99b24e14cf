//! Utility functions for server operations.

use std::net::SocketAddr;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use socket2::{Domain, Protocol, SockRef, Socket, TcpKeepalive, Type};
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::Notify;

use gost_core::defaults;

use crate::error::ServerError;

/// Outbound TCP socket options.
#[derive(Debug, Clone)]
pub struct TcpOptions {
    pub no_delay: bool,
    /// Keep-alive interval in seconds (0 = disabled).
    pub keepalive_secs: u64,
    /// SO_SNDBUF (0 = OS default).
    pub send_buffer: usize,
    /// SO_RCVBUF (0 = OS default).
    pub recv_buffer: usize,
}

impl Default for TcpOptions {
    fn default() -> Self {
        Self {
            no_delay: defaults::DEFAULT_TCP_NO_DELAY,
            keepalive_secs: defaults::DEFAULT_TCP_KEEPALIVE_SECS,
            send_buffer: defaults::DEFAULT_TCP_SEND_BUFFER,
            recv_buffer: defaults::DEFAULT_TCP_RECV_BUFFER,
        }
    }
}

/// Connect to `addr` and apply the socket options.
pub async fn connect_to(addr: &str, options: &TcpOptions) -> std::io::Result<TcpStream> {
    let tcp = TcpStream::connect(addr).await?;
    apply_tcp_options(&tcp, options)?;
    Ok(tcp)
}

/// Apply TCP socket options to an established stream.
pub fn apply_tcp_options(stream: &TcpStream, options: &TcpOptions) -> std::io::Result<()> {
    stream.set_nodelay(options.no_delay)?;

    let sock = SockRef::from(stream);
    if options.keepalive_secs > 0 {
        let keepalive =
            TcpKeepalive::new().with_time(Duration::from_secs(options.keepalive_secs));
        sock.set_tcp_keepalive(&keepalive)?;
    }
    if options.send_buffer > 0 {
        sock.set_send_buffer_size(options.send_buffer)?;
    }
    if options.recv_buffer > 0 {
        sock.set_recv_buffer_size(options.recv_buffer)?;
    }
    Ok(())
}

/// Create a TCP listener with a custom backlog.
pub fn create_listener(addr: SocketAddr, backlog: u32) -> Result<TcpListener, ServerError> {
    let domain = if addr.is_ipv4() {
        Domain::IPV4
    } else {
        Domain::IPV6
    };
    let socket = Socket::new(domain, Type::STREAM, Some(Protocol::TCP))?;
    socket.set_reuse_address(true)?;
    socket.set_nonblocking(true)?;
    socket.bind(&addr.into())?;
    socket.listen(backlog as i32)?;
    let listener = TcpListener::from_std(std::net::TcpListener::from(socket))?;
    Ok(listener)
}

/// Tracks active connections for graceful shutdown.
#[derive(Clone, Default)]
pub struct ConnectionTracker {
    active: Arc<AtomicUsize>,
    zero_notify: Arc<Notify>,
}

impl ConnectionTracker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn increment(&self) {
        self.active.fetch_add(1, Ordering::Relaxed);
    }

    pub fn decrement(&self) {
        if self.active.fetch_sub(1, Ordering::AcqRel) == 1 {
            self.zero_notify.notify_waiters();
        }
    }

    pub fn count(&self) -> usize {
        self.active.load(Ordering::Acquire)
    }

    /// Wait until no connections remain, bounded by `timeout`.
    pub async fn wait_for_zero(&self, timeout: Duration) -> bool {
        if self.count() == 0 {
            return true;
        }
        tokio::select! {
            _ = self.zero_notify.notified() => self.count() == 0,
            _ = tokio::time::sleep(timeout) => false,
        }
    }
}

/// Guard that decrements the connection count on drop.
pub struct ConnectionGuard {
    tracker: ConnectionTracker,
}

impl ConnectionGuard {
    pub fn new(tracker: ConnectionTracker) -> Self {
        Self { tracker }
    }
}

impl Drop for ConnectionGuard {
    fn drop(&mut self) {
        self.tracker.decrement();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn tracker_counts_and_drains() {
        let tracker = ConnectionTracker::new();
        tracker.increment();
        tracker.increment();
        assert_eq!(tracker.count(), 2);

        let guard = ConnectionGuard::new(tracker.clone());
        tracker.decrement();
        assert_eq!(tracker.count(), 1);
        drop(guard);
        assert_eq!(tracker.count(), 0);
        assert!(tracker.wait_for_zero(Duration::from_millis(10)).await);
    }

    #[tokio::test]
    async fn listener_accepts_with_custom_backlog() {
        let listener = create_listener("127.0.0.1:0".parse().unwrap(), 8).unwrap();
        let addr = listener.local_addr().unwrap();
        let client = tokio::spawn(async move { TcpStream::connect(addr).await.unwrap() });
        let (_server_side, _) = listener.accept().await.unwrap();
        client.await.unwrap();
    }
}
