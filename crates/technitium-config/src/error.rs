//! Error types for configuration file operations.

use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// Primary error type for configuration operations.
///
/// Resolution itself never fails; these errors surface from the store's
/// primitives and are converted into diagnostics by the resolver.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The platform configuration directory could not be determined.
    #[error("unable to locate a user configuration directory")]
    HomeUnavailable,
    /// File system operation failed.
    #[error("{operation} failed for {}", path.display())]
    Io {
        /// Operation identifier.
        operation: &'static str,
        /// File or directory involved.
        path: PathBuf,
        /// Source IO error.
        source: io::Error,
    },
    /// The persisted document was not valid TOML for the configuration schema.
    #[error("invalid configuration file {}", path.display())]
    Parse {
        /// File that failed to parse.
        path: PathBuf,
        /// Source TOML error.
        source: toml::de::Error,
    },
    /// Rendering the configuration document failed.
    #[error("failed to serialize configuration")]
    Serialize {
        /// Source TOML error.
        source: toml::ser::Error,
    },
    /// A field contained a value that could not be coerced.
    #[error("invalid value for '{field}' in '{section}': {reason}")]
    InvalidField {
        /// Section that failed validation.
        section: &'static str,
        /// Field that failed validation.
        field: &'static str,
        /// Offending value.
        value: String,
        /// Human-readable reason for the failure.
        reason: &'static str,
    },
}

/// Convenience alias for configuration results.
pub type ConfigResult<T> = Result<T, ConfigError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn messages_name_the_failing_target() {
        let err = ConfigError::Io {
            operation: "read",
            path: PathBuf::from("/tmp/config.toml"),
            source: io::Error::other("boom"),
        };
        assert_eq!(err.to_string(), "read failed for /tmp/config.toml");

        let err = ConfigError::InvalidField {
            section: "api",
            field: "timeoutMs",
            value: "soon".into(),
            reason: "must be a finite number",
        };
        assert_eq!(
            err.to_string(),
            "invalid value for 'timeoutMs' in 'api': must be a finite number"
        );
        assert_eq!(
            ConfigError::HomeUnavailable.to_string(),
            "unable to locate a user configuration directory"
        );
    }
}
