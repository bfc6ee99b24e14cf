//! Client error types.

use gost_proto::ProtoError;

/// Errors surfaced by the proxy client.
#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    #[error("io: {0}")]
    Io(#[from] std::io::Error),

    #[error("unsupported network kind: {0}")]
    UnsupportedNetwork(String),

    #[error("proto: {0}")]
    Proto(#[from] ProtoError),

    /// The proxy answered the CONNECT with a non-200; carries its status
    /// line verbatim.
    #[error("proxy refused connect: {0}")]
    Rejected(String),
}
