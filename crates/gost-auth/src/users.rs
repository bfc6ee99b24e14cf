//! Server-side authorization set and matching policy.

/// One authorized principal.
///
/// Empty components are wildcards: an empty password admits any password
/// for that username, and an empty username admits any username with that
/// password.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct User {
    pub username: String,
    pub password: String,
}

impl User {
    pub fn new(username: &str, password: &str) -> Self {
        Self {
            username: username.to_string(),
            password: password.to_string(),
        }
    }

    /// Parse `user`, `user:pass`, or `:pass`.
    pub fn from_spec(spec: &str) -> Self {
        match spec.split_once(':') {
            Some((user, pass)) => Self::new(user, pass),
            None => Self::new(spec, ""),
        }
    }

    /// Whether a supplied username/password pair satisfies this entry.
    pub fn matches(&self, username: &str, password: &str) -> bool {
        (username == self.username && password == self.password)
            || (username == self.username && self.password.is_empty())
            || (self.username.is_empty() && password == self.password)
    }
}

/// First-match authentication over an ordered user set.
///
/// An empty set authorizes nothing here; skipping authentication entirely
/// for an empty set is the caller's decision.
pub fn authenticate(users: &[User], username: &str, password: &str) -> bool {
    users.iter().any(|u| u.matches(username, password))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn exact_match() {
        let users = [User::new("alice", "secret")];
        assert!(authenticate(&users, "alice", "secret"));
        assert!(!authenticate(&users, "alice", "wrong"));
        assert!(!authenticate(&users, "bob", "secret"));
    }

    #[test]
    fn empty_password_is_wildcard() {
        let users = [User::new("alice", "")];
        assert!(authenticate(&users, "alice", "anything"));
        assert!(authenticate(&users, "alice", ""));
        assert!(!authenticate(&users, "bob", "anything"));
    }

    #[test]
    fn empty_username_is_wildcard() {
        let users = [User::new("", "secret")];
        assert!(authenticate(&users, "whoever", "secret"));
        assert!(authenticate(&users, "", "secret"));
        assert!(!authenticate(&users, "whoever", "wrong"));
    }

    #[test]
    fn first_match_wins_across_entries() {
        let users = [User::new("alice", "a"), User::new("", "b")];
        assert!(authenticate(&users, "alice", "a"));
        assert!(authenticate(&users, "carol", "b"));
        assert!(!authenticate(&users, "carol", "c"));
    }

    #[test]
    fn spec_forms() {
        assert_eq!(User::from_spec("u:p"), User::new("u", "p"));
        assert_eq!(User::from_spec("u"), User::new("u", ""));
        assert_eq!(User::from_spec(":p"), User::new("", "p"));
    }

    #[test]
    fn empty_set_matches_nothing() {
        assert!(!authenticate(&[], "alice", "secret"));
        assert!(!authenticate(&[], "", ""));
    }
}
