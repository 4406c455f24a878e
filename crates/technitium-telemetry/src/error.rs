//! Logging setup failures.

use thiserror::Error;

/// Result alias for telemetry operations.
pub type Result<T> = std::result::Result<T, TelemetryError>;

/// Reasons [`crate::init_logging`] can refuse to install a subscriber.
#[derive(Debug, Error)]
pub enum TelemetryError {
    /// A global subscriber is already in place for this process.
    #[error("a tracing subscriber is already installed")]
    AlreadyInstalled {
        /// Error reported by `tracing-subscriber`.
        #[source]
        source: tracing_subscriber::util::TryInitError,
    },
    /// `--log-level` was not a valid filter directive.
    #[error("invalid log level '{level}'")]
    InvalidLevel {
        /// Directive as supplied.
        level: String,
        /// Parser error.
        #[source]
        source: tracing_subscriber::filter::ParseError,
    },
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::error::Error as _;
    use tracing_subscriber::EnvFilter;

    #[test]
    fn invalid_level_names_the_directive() {
        let source = EnvFilter::try_new("technitium_api=chatty").expect_err("bad level");
        let err = TelemetryError::InvalidLevel {
            level: "technitium_api=chatty".into(),
            source,
        };
        assert_eq!(err.to_string(), "invalid log level 'technitium_api=chatty'");
        assert!(err.source().is_some());
    }
}
