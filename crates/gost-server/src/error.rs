//! Server error types.

use gost_proto::ProtoError;

/// Server error type.
#[derive(Debug, thiserror::Error)]
pub enum ServerError {
    #[error("io: {0}")]
    Io(#[from] std::io::Error),
    #[error("proto: {0}")]
    Proto(#[from] ProtoError),
    #[error("config: {0}")]
    Config(String),
}
