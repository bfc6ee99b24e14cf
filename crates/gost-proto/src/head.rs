//! Request and response head parsing and serialization.

use bytes::BytesMut;

use crate::{ProtoError, MAX_HEADERS};

/// Start of the HTTP/2 connection preface request line.
///
/// httparse rejects `HTTP/2.0` request lines outright, so the preface is
/// recognized by exact prefix match before general parsing runs. The proxy
/// only ever answers it with `400 Bad Request`.
const H2_PREFACE_LINE: &[u8] = b"PRI * HTTP/2.0\r\n";

/// Outcome of an incremental parse attempt.
#[derive(Debug)]
pub enum ParseResult<T> {
    /// A full head was parsed; `consumed` bytes of input belong to it.
    Complete { head: T, consumed: usize },
    /// More bytes are needed.
    Incomplete,
}

/// An owned, mutable HTTP request head.
#[derive(Debug, Clone)]
pub struct RequestHead {
    pub method: String,
    /// Request target exactly as received (authority form for CONNECT,
    /// absolute or origin form otherwise).
    pub target: String,
    /// (major, minor) protocol version.
    pub version: (u8, u8),
    headers: Vec<(String, String)>,
}

impl RequestHead {
    /// Build a head from scratch (client side).
    pub fn new(method: &str, target: &str) -> Self {
        Self {
            method: method.to_string(),
            target: target.to_string(),
            version: (1, 1),
            headers: Vec::new(),
        }
    }

    pub fn is_connect(&self) -> bool {
        self.method.eq_ignore_ascii_case("CONNECT")
    }

    /// True for the HTTP/2 connection-preface pseudo-request.
    pub fn is_h2_preface(&self) -> bool {
        self.method == "PRI" && self.version.0 == 2
    }

    /// First value of `name`, matched case-insensitively.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    /// Remove every occurrence of `name`.
    pub fn remove_header(&mut self, name: &str) {
        self.headers.retain(|(k, _)| !k.eq_ignore_ascii_case(name));
    }

    /// Set `name` to `value`, replacing any existing occurrences.
    pub fn set_header(&mut self, name: &str, value: &str) {
        self.remove_header(name);
        self.headers.push((name.to_string(), value.to_string()));
    }

    pub fn headers(&self) -> &[(String, String)] {
        &self.headers
    }

    /// The `host:port` the proxy should dial for this request.
    ///
    /// CONNECT carries the authority in the request target; other methods
    /// carry it in the Host header (or the absolute-form target), with the
    /// default HTTP port appended when none is present.
    pub fn dial_address(&self) -> Option<String> {
        if self.is_connect() {
            let target = self.target.trim();
            if target.is_empty() {
                return None;
            }
            return Some(target.to_string());
        }

        let authority = self
            .header("Host")
            .map(str::trim)
            .filter(|h| !h.is_empty())
            .map(str::to_string)
            .or_else(|| authority_of(&self.target).map(str::to_string))?;
        Some(ensure_port(
            &authority,
            gost_core::defaults::DEFAULT_HTTP_PORT,
        ))
    }

    /// Serialize the head: request line, header lines, blank line.
    pub fn encode(&self, buf: &mut BytesMut) {
        buf.extend_from_slice(self.method.as_bytes());
        buf.extend_from_slice(b" ");
        buf.extend_from_slice(self.target.as_bytes());
        buf.extend_from_slice(
            format!(" HTTP/{}.{}\r\n", self.version.0, self.version.1).as_bytes(),
        );
        for (name, value) in &self.headers {
            buf.extend_from_slice(name.as_bytes());
            buf.extend_from_slice(b": ");
            buf.extend_from_slice(value.as_bytes());
            buf.extend_from_slice(b"\r\n");
        }
        buf.extend_from_slice(b"\r\n");
    }
}

/// An owned HTTP response head.
#[derive(Debug, Clone)]
pub struct ResponseHead {
    pub code: u16,
    /// The first line of the response, verbatim (e.g. `HTTP/1.1 200 OK`).
    pub status_line: String,
    headers: Vec<(String, String)>,
}

impl ResponseHead {
    /// First value of `name`, matched case-insensitively.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }
}

/// Try to parse one request head from the front of `buf`.
pub fn parse_request_head(buf: &[u8]) -> Result<ParseResult<RequestHead>, ProtoError> {
    // HTTP/2 preface first; httparse cannot represent it.
    if buf.len() >= H2_PREFACE_LINE.len() {
        if buf.starts_with(H2_PREFACE_LINE) {
            return Ok(ParseResult::Complete {
                head: RequestHead {
                    method: "PRI".to_string(),
                    target: "*".to_string(),
                    version: (2, 0),
                    headers: Vec::new(),
                },
                consumed: H2_PREFACE_LINE.len(),
            });
        }
    } else if H2_PREFACE_LINE.starts_with(buf) {
        return Ok(ParseResult::Incomplete);
    }

    let mut headers = [httparse::EMPTY_HEADER; MAX_HEADERS];
    let mut req = httparse::Request::new(&mut headers);
    match req.parse(buf)? {
        httparse::Status::Complete(consumed) => {
            let head = RequestHead {
                method: req.method.unwrap_or("").to_string(),
                target: req.path.unwrap_or("").to_string(),
                version: (1, req.version.unwrap_or(1)),
                headers: owned_headers(req.headers),
            };
            Ok(ParseResult::Complete { head, consumed })
        }
        httparse::Status::Partial => Ok(ParseResult::Incomplete),
    }
}

/// Try to parse one response head from the front of `buf`.
pub fn parse_response_head(buf: &[u8]) -> Result<ParseResult<ResponseHead>, ProtoError> {
    let mut headers = [httparse::EMPTY_HEADER; MAX_HEADERS];
    let mut resp = httparse::Response::new(&mut headers);
    match resp.parse(buf)? {
        httparse::Status::Complete(consumed) => {
            let line_end = buf
                .windows(2)
                .position(|w| w == b"\r\n")
                .unwrap_or(buf.len());
            let head = ResponseHead {
                code: resp.code.unwrap_or(0),
                status_line: String::from_utf8_lossy(&buf[..line_end]).into_owned(),
                headers: owned_headers(resp.headers),
            };
            Ok(ParseResult::Complete { head, consumed })
        }
        httparse::Status::Partial => Ok(ParseResult::Incomplete),
    }
}

fn owned_headers(parsed: &[httparse::Header<'_>]) -> Vec<(String, String)> {
    parsed
        .iter()
        .map(|h| {
            (
                h.name.to_string(),
                String::from_utf8_lossy(h.value).into_owned(),
            )
        })
        .collect()
}

/// Strip the scheme and path from an absolute-form target, if it has them.
fn authority_of(target: &str) -> Option<&str> {
    let rest = target
        .strip_prefix("http://")
        .or_else(|| target.strip_prefix("https://"))?;
    let authority = rest.split('/').next().unwrap_or(rest);
    if authority.is_empty() {
        None
    } else {
        Some(authority)
    }
}

/// Append `default_port` unless `authority` already carries a port.
fn ensure_port(authority: &str, default_port: u16) -> String {
    if let Some(stripped) = authority.strip_prefix('[') {
        // Bracketed IPv6: a port only follows the closing bracket.
        if let Some(end) = stripped.find(']') {
            if stripped[end + 1..].starts_with(':') {
                return authority.to_string();
            }
        }
        return format!("{authority}:{default_port}");
    }
    if authority.contains(':') {
        authority.to_string()
    } else {
        format!("{authority}:{default_port}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_connect_request() {
        let raw = b"CONNECT example.com:443 HTTP/1.1\r\nHost: example.com:443\r\nProxy-Connection: keep-alive\r\n\r\n";
        match parse_request_head(raw).unwrap() {
            ParseResult::Complete { head, consumed } => {
                assert_eq!(consumed, raw.len());
                assert!(head.is_connect());
                assert_eq!(head.target, "example.com:443");
                assert_eq!(head.version, (1, 1));
                assert_eq!(head.header("proxy-connection"), Some("keep-alive"));
                assert_eq!(head.dial_address().unwrap(), "example.com:443");
            }
            ParseResult::Incomplete => panic!("expected complete head"),
        }
    }

    #[test]
    fn incomplete_head_asks_for_more() {
        let raw = b"GET http://example.com/ HTTP/1.1\r\nHost: exa";
        assert!(matches!(
            parse_request_head(raw).unwrap(),
            ParseResult::Incomplete
        ));
    }

    #[test]
    fn rejects_garbage() {
        assert!(parse_request_head(b"\x16\x03\x01\x02\x00garbage\r\n\r\n").is_err());
    }

    #[test]
    fn detects_h2_preface() {
        let raw = b"PRI * HTTP/2.0\r\n\r\nSM\r\n\r\n";
        match parse_request_head(raw).unwrap() {
            ParseResult::Complete { head, .. } => {
                assert!(head.is_h2_preface());
                assert_eq!(head.method, "PRI");
                assert_eq!(head.version.0, 2);
            }
            ParseResult::Incomplete => panic!("expected complete head"),
        }
        // A prefix of the preface line is not yet decidable.
        assert!(matches!(
            parse_request_head(b"PRI * HT").unwrap(),
            ParseResult::Incomplete
        ));
    }

    #[test]
    fn dial_address_defaults_http_port() {
        let raw = b"GET http://example.com/index.html HTTP/1.1\r\nHost: example.com\r\n\r\n";
        let head = match parse_request_head(raw).unwrap() {
            ParseResult::Complete { head, .. } => head,
            ParseResult::Incomplete => panic!("expected complete head"),
        };
        assert_eq!(head.dial_address().unwrap(), "example.com:80");
    }

    #[test]
    fn dial_address_from_absolute_target_without_host_header() {
        let raw = b"GET http://example.com:8080/x HTTP/1.1\r\n\r\n";
        let head = match parse_request_head(raw).unwrap() {
            ParseResult::Complete { head, .. } => head,
            ParseResult::Incomplete => panic!("expected complete head"),
        };
        assert_eq!(head.dial_address().unwrap(), "example.com:8080");
    }

    #[test]
    fn ensure_port_handles_ipv6() {
        assert_eq!(ensure_port("[::1]", 80), "[::1]:80");
        assert_eq!(ensure_port("[::1]:8080", 80), "[::1]:8080");
        assert_eq!(ensure_port("example.com:443", 80), "example.com:443");
    }

    #[test]
    fn remove_header_is_case_insensitive() {
        let raw =
            b"GET / HTTP/1.1\r\nHost: a\r\nPROXY-AUTHORIZATION: Basic x\r\nproxy-authorization: Basic y\r\n\r\n";
        let mut head = match parse_request_head(raw).unwrap() {
            ParseResult::Complete { head, .. } => head,
            ParseResult::Incomplete => panic!("expected complete head"),
        };
        head.remove_header("Proxy-Authorization");
        assert!(head.header("Proxy-Authorization").is_none());
        assert_eq!(head.header("Host"), Some("a"));
    }

    #[test]
    fn encode_emits_crlf_framing() {
        let mut head = RequestHead::new("CONNECT", "example.com:443");
        head.set_header("Host", "example.com:443");
        head.set_header("Proxy-Connection", "keep-alive");
        let mut buf = BytesMut::new();
        head.encode(&mut buf);
        assert_eq!(
            &buf[..],
            b"CONNECT example.com:443 HTTP/1.1\r\nHost: example.com:443\r\nProxy-Connection: keep-alive\r\n\r\n" as &[u8]
        );
    }

    #[test]
    fn response_status_line_is_verbatim() {
        let raw = b"HTTP/1.1 407 Proxy Authentication Required\r\nProxy-Authenticate: Basic realm=\"gost\"\r\n\r\n";
        match parse_response_head(raw).unwrap() {
            ParseResult::Complete { head, consumed } => {
                assert_eq!(consumed, raw.len());
                assert_eq!(head.code, 407);
                assert_eq!(head.status_line, "HTTP/1.1 407 Proxy Authentication Required");
                assert_eq!(
                    head.header("proxy-authenticate"),
                    Some("Basic realm=\"gost\"")
                );
            }
            ParseResult::Incomplete => panic!("expected complete head"),
        }
    }
}
