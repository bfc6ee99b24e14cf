//! Configuration types for the gost-rs binaries.

mod loader;
mod logging;
mod validate;

pub use loader::{load_config, ConfigError};
pub use logging::init_tracing;
pub use validate::validate_config;

use serde::{Deserialize, Serialize};

use gost_core::defaults;

/// Top-level configuration file.
///
/// The `server` and `client` sections are both optional; each subcommand
/// requires only its own.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub server: Option<ServerConfig>,
    #[serde(default)]
    pub client: Option<ClientConfig>,
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Proxy server section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Listen address, `host:port`.
    pub listen: String,
    /// Authorized users as `user`, `user:pass`, or `:pass` specs.
    /// Empty means authentication is disabled.
    #[serde(default)]
    pub users: Vec<String>,
    /// Upstream proxy hops as `host:port` (optionally `user:pass@host:port`).
    /// Empty means destinations are dialed directly.
    #[serde(default)]
    pub chain: Vec<String>,
    /// Idle timeout for established tunnels in seconds (0 = disabled).
    #[serde(default = "default_idle_timeout_secs")]
    pub idle_timeout_secs: u64,
    /// Maximum bytes accepted for one request head.
    #[serde(default = "default_max_head_bytes")]
    pub max_head_bytes: usize,
    /// Maximum concurrent connections (None = unlimited).
    #[serde(default)]
    pub max_connections: Option<usize>,
    /// Resource limits.
    #[serde(default)]
    pub resource_limits: ResourceLimitsConfig,
    /// Outbound TCP socket options.
    #[serde(default)]
    pub tcp: TcpConfig,
}

/// Local forwarder (client) section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClientConfig {
    /// Local listen address, `host:port`.
    pub listen: String,
    /// HTTP proxy address, `host:port`.
    pub proxy: String,
    /// Destination to tunnel to, `host:port`.
    pub target: String,
    /// Proxy credential as `user` or `user:pass`.
    #[serde(default)]
    pub credential: Option<String>,
    /// Idle timeout for established tunnels in seconds (0 = disabled).
    #[serde(default = "default_idle_timeout_secs")]
    pub idle_timeout_secs: u64,
}

/// Buffer and backlog limits.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResourceLimitsConfig {
    /// Relay buffer size per direction (bytes).
    #[serde(default = "default_relay_buffer_size")]
    pub relay_buffer_size: usize,
    /// TCP socket send buffer size (SO_SNDBUF). 0 = OS default.
    #[serde(default)]
    pub tcp_send_buffer: usize,
    /// TCP socket receive buffer size (SO_RCVBUF). 0 = OS default.
    #[serde(default)]
    pub tcp_recv_buffer: usize,
    /// TCP listener backlog.
    #[serde(default = "default_connection_backlog")]
    pub connection_backlog: u32,
}

impl Default for ResourceLimitsConfig {
    fn default() -> Self {
        Self {
            relay_buffer_size: defaults::DEFAULT_RELAY_BUFFER_SIZE,
            tcp_send_buffer: defaults::DEFAULT_TCP_SEND_BUFFER,
            tcp_recv_buffer: defaults::DEFAULT_TCP_RECV_BUFFER,
            connection_backlog: defaults::DEFAULT_CONNECTION_BACKLOG,
        }
    }
}

/// Outbound TCP socket options.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TcpConfig {
    #[serde(default = "default_tcp_no_delay")]
    pub no_delay: bool,
    /// Keep-alive interval in seconds (0 = disabled).
    #[serde(default = "default_tcp_keepalive_secs")]
    pub keepalive_secs: u64,
}

impl Default for TcpConfig {
    fn default() -> Self {
        Self {
            no_delay: defaults::DEFAULT_TCP_NO_DELAY,
            keepalive_secs: defaults::DEFAULT_TCP_KEEPALIVE_SECS,
        }
    }
}

/// Logging section.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Base level, e.g. `info` or `gost_server=debug`.
    #[serde(default)]
    pub level: Option<String>,
    /// `pretty`, `compact`, or `json`.
    #[serde(default)]
    pub format: Option<String>,
    /// `stderr` or `stdout`.
    #[serde(default)]
    pub output: Option<String>,
}

fn default_idle_timeout_secs() -> u64 {
    defaults::DEFAULT_IDLE_TIMEOUT_SECS
}

fn default_max_head_bytes() -> usize {
    defaults::DEFAULT_MAX_HEAD_BYTES
}

fn default_relay_buffer_size() -> usize {
    defaults::DEFAULT_RELAY_BUFFER_SIZE
}

fn default_connection_backlog() -> u32 {
    defaults::DEFAULT_CONNECTION_BACKLOG
}

fn default_tcp_no_delay() -> bool {
    defaults::DEFAULT_TCP_NO_DELAY
}

fn default_tcp_keepalive_secs() -> u64 {
    defaults::DEFAULT_TCP_KEEPALIVE_SECS
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn minimal_server_config_fills_defaults() {
        let config: Config = toml::from_str(
            r#"
            [server]
            listen = "127.0.0.1:8080"
            "#,
        )
        .unwrap();
        let server = config.server.unwrap();
        assert_eq!(server.listen, "127.0.0.1:8080");
        assert!(server.users.is_empty());
        assert!(server.chain.is_empty());
        assert_eq!(
            server.idle_timeout_secs,
            defaults::DEFAULT_IDLE_TIMEOUT_SECS
        );
        assert_eq!(
            server.resource_limits.relay_buffer_size,
            defaults::DEFAULT_RELAY_BUFFER_SIZE
        );
        assert!(config.client.is_none());
    }

    #[test]
    fn client_section_parses() {
        let config: Config = toml::from_str(
            r#"
            [client]
            listen = "127.0.0.1:1080"
            proxy = "proxy.example.com:8080"
            target = "internal.example.com:22"
            credential = "alice:secret"
            "#,
        )
        .unwrap();
        let client = config.client.unwrap();
        assert_eq!(client.proxy, "proxy.example.com:8080");
        assert_eq!(client.credential.as_deref(), Some("alice:secret"));
    }
}
