//! HTTP CONNECT connector with optional Basic proxy authentication.

use bytes::BytesMut;
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};

use gost_auth::Credential;
use gost_core::defaults::DEFAULT_MAX_HEAD_BYTES;
use gost_proto::{parse_response_head, ParseResult, ProtoError, RequestHead};

use crate::connector::Connector;
use crate::error::ClientError;

/// Connector speaking the HTTP proxy protocol.
#[derive(Debug, Clone, Default)]
pub struct HttpConnector {
    credential: Option<Credential>,
}

impl HttpConnector {
    /// A connector with no proxy credential.
    pub fn new() -> Self {
        Self { credential: None }
    }

    /// A connector authenticating with `credential`.
    pub fn with_credential(credential: Credential) -> Self {
        Self {
            credential: Some(credential),
        }
    }

    fn build_request(&self, addr: &str) -> RequestHead {
        let mut head = RequestHead::new("CONNECT", addr);
        head.set_header("Host", addr);
        head.set_header("Proxy-Connection", "keep-alive");
        if let Some(credential) = &self.credential {
            head.set_header("Proxy-Authorization", &credential.authorization());
        }
        head
    }
}

impl Connector for HttpConnector {
    async fn connect<S>(&self, stream: &mut S, addr: &str) -> Result<(), ClientError>
    where
        S: AsyncRead + AsyncWrite + Unpin + Send,
    {
        let mut buf = BytesMut::with_capacity(256);
        self.build_request(addr).encode(&mut buf);
        stream.write_all(&buf).await?;

        let head = read_response_head(stream).await?;
        if head.code != 200 {
            return Err(ClientError::Rejected(head.status_line));
        }
        Ok(())
    }
}

/// Read exactly one response head off `stream`.
///
/// Reads a byte at a time so that no tunneled bytes past the blank-line
/// terminator are consumed; heads are small, the terminator arrives within
/// a few hundred bytes.
async fn read_response_head<S>(stream: &mut S) -> Result<gost_proto::ResponseHead, ClientError>
where
    S: AsyncRead + Unpin + Send,
{
    let mut acc = BytesMut::with_capacity(256);
    let mut byte = [0u8; 1];
    loop {
        if acc.len() >= DEFAULT_MAX_HEAD_BYTES {
            return Err(ProtoError::HeadTooLarge(DEFAULT_MAX_HEAD_BYTES).into());
        }
        let n = stream.read(&mut byte).await?;
        if n == 0 {
            return Err(std::io::Error::new(
                std::io::ErrorKind::UnexpectedEof,
                "proxy closed connection before response head",
            )
            .into());
        }
        acc.extend_from_slice(&byte);
        if acc.ends_with(b"\r\n\r\n") {
            break;
        }
    }

    match parse_response_head(&acc)? {
        ParseResult::Complete { head, .. } => Ok(head),
        ParseResult::Incomplete => Err(std::io::Error::new(
            std::io::ErrorKind::InvalidData,
            "truncated response head",
        )
        .into()),
    }
}
