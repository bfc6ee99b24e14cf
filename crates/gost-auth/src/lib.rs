//! Credentials and HTTP Basic proxy authentication.
//!
//! Two sides live here:
//! - [`Credential`]: what a client presents to an upstream proxy.
//! - [`User`] + [`authenticate`]: the server-side authorization set and its
//!   wildcard-aware matching policy.

mod basic;
mod users;

pub use basic::{decode_basic, encode_basic, BASIC_SCHEME};
pub use users::{authenticate, User};

/// A client-side credential for upstream proxy authentication.
///
/// `password: None` means "no password was explicitly set", which encodes
/// as `username:` (trailing colon) on the wire.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Credential {
    pub username: String,
    pub password: Option<String>,
}

impl Credential {
    pub fn new(username: &str, password: Option<&str>) -> Self {
        Self {
            username: username.to_string(),
            password: password.map(str::to_string),
        }
    }

    /// Parse `user` or `user:pass`.
    pub fn from_spec(spec: &str) -> Self {
        match spec.split_once(':') {
            Some((user, pass)) => Self::new(user, Some(pass)),
            None => Self::new(spec, None),
        }
    }

    /// Value for the `Proxy-Authorization` header.
    pub fn authorization(&self) -> String {
        let joined = format!(
            "{}:{}",
            self.username,
            self.password.as_deref().unwrap_or("")
        );
        encode_basic(&joined)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn spec_with_password() {
        let c = Credential::from_spec("alice:secret");
        assert_eq!(c.username, "alice");
        assert_eq!(c.password.as_deref(), Some("secret"));
    }

    #[test]
    fn spec_without_password_encodes_trailing_colon() {
        let c = Credential::from_spec("alice");
        assert_eq!(c.password, None);
        assert_eq!(c.authorization(), format!("Basic {}", base64_of("alice:")));
    }

    #[test]
    fn authorization_round_trips_through_decode() {
        let c = Credential::from_spec("alice:secret");
        let (user, pass) = decode_basic(&c.authorization()).unwrap();
        assert_eq!(user, "alice");
        assert_eq!(pass, "secret");
    }

    fn base64_of(s: &str) -> String {
        use base64::Engine;
        base64::engine::general_purpose::STANDARD.encode(s)
    }
}
