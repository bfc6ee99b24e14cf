//! Default configuration values.
//!
//! Centralized default constants for use across all crates.

/// Default relay buffer size per direction (32 KiB).
pub const DEFAULT_RELAY_BUFFER_SIZE: usize = 32768;
/// Default maximum bytes accepted for one HTTP request head.
pub const DEFAULT_MAX_HEAD_BYTES: usize = 8192;
/// Default idle timeout for an established tunnel, in seconds (0 = disabled).
pub const DEFAULT_IDLE_TIMEOUT_SECS: u64 = 600;
/// Default graceful shutdown drain timeout in seconds.
pub const DEFAULT_SHUTDOWN_TIMEOUT_SECS: u64 = 30;

/// Default TCP listener backlog.
pub const DEFAULT_CONNECTION_BACKLOG: u32 = 1024;
/// Default TCP_NODELAY (disable Nagle's algorithm for lower latency).
pub const DEFAULT_TCP_NO_DELAY: bool = true;
/// Default TCP keep-alive interval in seconds (0 = disabled).
pub const DEFAULT_TCP_KEEPALIVE_SECS: u64 = 300;
/// Default TCP socket send buffer size (0 = OS default).
pub const DEFAULT_TCP_SEND_BUFFER: usize = 0;
/// Default TCP socket receive buffer size (0 = OS default).
pub const DEFAULT_TCP_RECV_BUFFER: usize = 0;

/// Default port appended to plain proxied requests whose Host has none.
pub const DEFAULT_HTTP_PORT: u16 = 80;
