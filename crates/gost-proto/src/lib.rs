//! HTTP/1.1 head codec for the gost proxy protocol.
//!
//! This crate owns everything that touches HTTP bytes: incremental parsing
//! of request and response heads, re-serialization of (possibly modified)
//! request heads for forwarding, and the canned control responses the proxy
//! emits (`400`/`407`/`503`/`200`), rendered bit-exactly.
//!
//! Parsing is head-only by design: bodies and tunneled bytes are never
//! interpreted, they are relayed verbatim.

mod control;
mod head;

pub use control::{
    control_response, STATUS_BAD_REQUEST, STATUS_CONNECTION_ESTABLISHED,
    STATUS_PROXY_AUTH_REQUIRED, STATUS_SERVICE_UNAVAILABLE,
};
pub use head::{
    parse_request_head, parse_response_head, ParseResult, RequestHead, ResponseHead,
};

/// Maximum number of headers accepted in one head.
pub const MAX_HEADERS: usize = 64;

/// Errors surfaced by the head codec.
#[derive(Debug, thiserror::Error)]
pub enum ProtoError {
    #[error("malformed head: {0}")]
    Parse(#[from] httparse::Error),
    #[error("head exceeds {0} bytes")]
    HeadTooLarge(usize),
}
