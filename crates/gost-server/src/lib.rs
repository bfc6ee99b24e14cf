//! HTTP proxy server.
//!
//! The handler drives the full inbound sequence per connection: parse the
//! request head, guard against HTTP/2 preface requests, authenticate, dial
//! the destination through the configured [`Chain`], respond, and relay.

pub mod cli;

mod chain;
mod error;
mod handler;
mod server;
mod util;

pub use chain::{Chain, ChainStream, DirectChain, ProxyChain};
pub use cli::ServerArgs;
pub use error::ServerError;
pub use handler::{handle_conn, HandlerOptions};
pub use server::{run, run_with_shutdown, DEFAULT_SHUTDOWN_TIMEOUT};
pub use tokio_util::sync::CancellationToken;
pub use util::TcpOptions;
