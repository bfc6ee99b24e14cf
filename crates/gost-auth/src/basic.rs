//! HTTP Basic scheme encode/decode for `Proxy-Authorization`.

use base64::engine::general_purpose::STANDARD;
use base64::Engine;

/// The scheme prefix, including its trailing space.
pub const BASIC_SCHEME: &str = "Basic ";

/// Encode `user:pass` (already joined) as a `Basic <base64>` header value.
pub fn encode_basic(joined: &str) -> String {
    format!("{BASIC_SCHEME}{}", STANDARD.encode(joined))
}

/// Decode a `Proxy-Authorization` header value.
///
/// Anything that is not well-formed Basic - wrong scheme, bad base64, no
/// `:` separator - yields `None`, meaning "no credential supplied" rather
/// than an error.
pub fn decode_basic(value: &str) -> Option<(String, String)> {
    let encoded = value.strip_prefix(BASIC_SCHEME)?;
    let decoded = STANDARD.decode(encoded).ok()?;
    let decoded = String::from_utf8(decoded).ok()?;
    let (user, pass) = decoded.split_once(':')?;
    Some((user.to_string(), pass.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decodes_well_formed() {
        let value = encode_basic("alice:secret");
        assert_eq!(
            decode_basic(&value),
            Some(("alice".to_string(), "secret".to_string()))
        );
    }

    #[test]
    fn rejects_bad_base64() {
        assert_eq!(decode_basic("Basic not-base64!"), None);
    }

    #[test]
    fn rejects_missing_separator() {
        let value = format!("Basic {}", STANDARD.encode("nocolon"));
        assert_eq!(decode_basic(&value), None);
    }

    #[test]
    fn rejects_other_schemes() {
        let value = format!("Bearer {}", STANDARD.encode("alice:secret"));
        assert_eq!(decode_basic(&value), None);
        assert_eq!(decode_basic(""), None);
    }

    #[test]
    fn empty_password_survives() {
        let value = encode_basic("alice:");
        assert_eq!(
            decode_basic(&value),
            Some(("alice".to_string(), String::new()))
        );
    }
}
