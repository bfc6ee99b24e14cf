//! HTTP proxy client.
//!
//! A client is split into two capabilities, composed by [`Client`]:
//! - [`Transporter`]: how the proxy itself is reached (today plain TCP;
//!   a TLS or multiplexed transport slots in without touching callers).
//! - [`Connector`]: what the proxy is asked to do once reached (here, the
//!   HTTP `CONNECT` handshake with optional Basic proxy authentication).
//!
//! The expected call sequence is `dial` -> `handshake` -> `connect`; the
//! client does not enforce the order, it is a usage contract.
//!
//! This crate also ships the `gost-rs client` local forwarder: a TCP
//! listener that tunnels every accepted connection to a fixed target
//! through the configured proxy.

pub mod cli;
mod client;
mod connector;
mod error;
mod forward;
mod http;
mod transport;

pub use cli::ClientArgs;
pub use client::{Client, DefaultClient};
pub use connector::Connector;
pub use error::ClientError;
pub use forward::run;
pub use http::HttpConnector;
pub use transport::{TcpTransporter, Transporter};
