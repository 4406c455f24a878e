//! Session token and its provenance.
//!
//! The token is the only mutable state shared by concurrent calls on one
//! client. Writers replace it wholesale; the last writer wins.

use std::fmt::{self, Display, Formatter};
use std::sync::RwLock;

/// Why the current token is held.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TokenSource {
    /// Supplied explicitly by the caller (flag or constructor option).
    Explicit,
    /// Loaded from the resolved configuration.
    Config,
    /// Issued by a successful login.
    Login,
    /// No token, or its origin is not tracked.
    #[default]
    Unknown,
}

impl TokenSource {
    /// Lower-case label used in output.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Explicit => "explicit",
            Self::Config => "config",
            Self::Login => "login",
            Self::Unknown => "unknown",
        }
    }
}

impl Display for TokenSource {
    fn fmt(&self, formatter: &mut Formatter<'_>) -> fmt::Result {
        formatter.write_str(self.as_str())
    }
}

/// Point-in-time copy of the session token.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct SessionTokenSnapshot {
    /// Current token; `None` means logged out.
    pub token: Option<String>,
    /// Provenance of [`Self::token`].
    pub source: TokenSource,
}

/// Holder for the session token.
#[derive(Debug, Default)]
pub struct SessionState {
    inner: RwLock<SessionTokenSnapshot>,
}

impl SessionState {
    /// State seeded with `token`.
    #[must_use]
    pub fn new(token: Option<String>, source: TokenSource) -> Self {
        let state = Self::default();
        state.set_token(token, source);
        state
    }

    /// Replace the token and provenance unconditionally. Empty strings are
    /// stored as logged out.
    pub fn set_token(&self, token: Option<String>, source: TokenSource) {
        let token = token.filter(|value| !value.is_empty());
        let snapshot = SessionTokenSnapshot { token, source };
        match self.inner.write() {
            Ok(mut guard) => *guard = snapshot,
            Err(poisoned) => *poisoned.into_inner() = snapshot,
        }
    }

    /// Current token and provenance.
    #[must_use]
    pub fn snapshot(&self) -> SessionTokenSnapshot {
        match self.inner.read() {
            Ok(guard) => guard.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn set_token_overwrites_value_and_source() {
        let state = SessionState::new(Some("cfg".into()), TokenSource::Config);
        assert_eq!(
            state.snapshot(),
            SessionTokenSnapshot {
                token: Some("cfg".into()),
                source: TokenSource::Config,
            }
        );

        state.set_token(Some("fresh".into()), TokenSource::Login);
        let snapshot = state.snapshot();
        assert_eq!(snapshot.token.as_deref(), Some("fresh"));
        assert_eq!(snapshot.source, TokenSource::Login);
    }

    #[test]
    fn empty_token_is_logged_out() {
        let state = SessionState::default();
        state.set_token(Some(String::new()), TokenSource::Explicit);
        assert!(state.snapshot().token.is_none());
        assert_eq!(state.snapshot().source, TokenSource::Explicit);
    }

    #[test]
    fn source_labels_are_lowercase() {
        assert_eq!(TokenSource::Login.to_string(), "login");
        assert_eq!(TokenSource::default(), TokenSource::Unknown);
    }
}
