//! Canned control responses emitted by the proxy.
//!
//! These are raw status line + header lines + blank line, never a body.
//! The exact bytes are part of the protocol surface and are covered by
//! tests below.

use gost_core::proxy_agent;

pub const STATUS_BAD_REQUEST: &str = "400 Bad Request";
pub const STATUS_PROXY_AUTH_REQUIRED: &str = "407 Proxy Authentication Required";
pub const STATUS_SERVICE_UNAVAILABLE: &str = "503 Service unavailable";
pub const STATUS_CONNECTION_ESTABLISHED: &str = "200 Connection established";

/// Render `HTTP/1.1 <status>\r\n` + `extra_headers` + the `Proxy-Agent`
/// header + the blank-line terminator.
pub fn control_response(status: &str, extra_headers: &[(&str, &str)]) -> Vec<u8> {
    let mut out = String::with_capacity(96);
    out.push_str("HTTP/1.1 ");
    out.push_str(status);
    out.push_str("\r\n");
    for (name, value) in extra_headers {
        out.push_str(name);
        out.push_str(": ");
        out.push_str(value);
        out.push_str("\r\n");
    }
    out.push_str("Proxy-Agent: ");
    out.push_str(&proxy_agent());
    out.push_str("\r\n\r\n");
    out.into_bytes()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn connection_established_bytes() {
        let got = control_response(STATUS_CONNECTION_ESTABLISHED, &[]);
        let want = format!(
            "HTTP/1.1 200 Connection established\r\nProxy-Agent: {}\r\n\r\n",
            proxy_agent()
        );
        assert_eq!(got, want.as_bytes());
    }

    #[test]
    fn auth_required_header_order() {
        let got = control_response(
            STATUS_PROXY_AUTH_REQUIRED,
            &[("Proxy-Authenticate", "Basic realm=\"gost\"")],
        );
        let want = format!(
            "HTTP/1.1 407 Proxy Authentication Required\r\nProxy-Authenticate: Basic realm=\"gost\"\r\nProxy-Agent: {}\r\n\r\n",
            proxy_agent()
        );
        assert_eq!(got, want.as_bytes());
    }

    #[test]
    fn no_body_ever() {
        for status in [
            STATUS_BAD_REQUEST,
            STATUS_PROXY_AUTH_REQUIRED,
            STATUS_SERVICE_UNAVAILABLE,
            STATUS_CONNECTION_ESTABLISHED,
        ] {
            let bytes = control_response(status, &[]);
            assert!(bytes.ends_with(b"\r\n\r\n"));
        }
    }
}
