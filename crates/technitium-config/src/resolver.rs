//! Precedence pipeline: embedded defaults < persisted file < environment.
//!
//! # Design
//! - Resolution never fails. Each broken layer is skipped with a `warn!` and a
//!   [`ConfigDiagnostic`] so callers and tests can inspect what happened.
//! - Only [`ConfigResolver::from_env`] reads the process environment.

use std::fmt::{self, Display, Formatter};
use std::path::PathBuf;

use crate::defaults;
use crate::env::EnvOverrides;
use crate::error::ConfigError;
use crate::model::Configuration;
use crate::store::ConfigStore;

/// Structured record of a fallback taken during resolution.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigDiagnostic {
    /// No configuration home could be located; the file layer was skipped.
    HomeUnavailable,
    /// The first-run file could not be created.
    FileCreateFailed {
        /// Target path.
        path: PathBuf,
        /// Failure detail.
        reason: String,
    },
    /// The file existed but could not be read or parsed.
    FileInvalid {
        /// Offending file.
        path: PathBuf,
        /// Failure detail.
        reason: String,
    },
    /// An environment value failed coercion; the embedded default was used.
    InvalidEnvValue {
        /// Variable name.
        variable: String,
        /// Raw value.
        value: String,
        /// Failure detail.
        reason: String,
    },
}

impl ConfigDiagnostic {
    pub(crate) fn invalid_env(variable: &str, value: &str, err: &ConfigError) -> Self {
        Self::InvalidEnvValue {
            variable: variable.to_string(),
            value: value.to_string(),
            reason: err.to_string(),
        }
    }

    fn emit(&self) {
        match self {
            Self::HomeUnavailable => {
                tracing::warn!("no configuration home found; using defaults and environment");
            }
            Self::FileCreateFailed { path, reason } => {
                tracing::warn!(path = %path.display(), %reason, "could not create configuration file");
            }
            Self::FileInvalid { path, reason } => {
                tracing::warn!(path = %path.display(), %reason, "ignoring unreadable configuration file");
            }
            Self::InvalidEnvValue {
                variable, reason, ..
            } => {
                tracing::warn!(%variable, %reason, "ignoring invalid environment override");
            }
        }
    }
}

impl Display for ConfigDiagnostic {
    fn fmt(&self, formatter: &mut Formatter<'_>) -> fmt::Result {
        match self {
            Self::HomeUnavailable => formatter.write_str("configuration home unavailable"),
            Self::FileCreateFailed { path, reason } => {
                write!(formatter, "could not create {}: {reason}", path.display())
            }
            Self::FileInvalid { path, reason } => {
                write!(formatter, "ignored {}: {reason}", path.display())
            }
            Self::InvalidEnvValue {
                variable, value, ..
            } => write!(formatter, "ignored {variable}={value}"),
        }
    }
}

/// Resolved configuration plus the fallbacks taken to produce it.
#[derive(Debug, Clone)]
pub struct Resolution {
    /// Fully merged configuration.
    pub config: Configuration,
    /// Diagnostics in the order they were produced.
    pub diagnostics: Vec<ConfigDiagnostic>,
}

/// Produces a [`Configuration`] from the three layers.
#[derive(Debug, Clone)]
pub struct ConfigResolver {
    store: Option<ConfigStore>,
    env: Vec<(String, String)>,
    create_if_missing: bool,
}

impl ConfigResolver {
    /// Resolver over `store` with no environment overrides.
    #[must_use]
    pub const fn new(store: ConfigStore) -> Self {
        Self {
            store: Some(store),
            env: Vec::new(),
            create_if_missing: true,
        }
    }

    /// Resolver over `store` (or the default location when `None`) reading
    /// overrides from the process environment.
    #[must_use]
    pub fn from_env(store: Option<ConfigStore>) -> Self {
        let store = store.or_else(|| ConfigStore::at_default_location().ok());
        Self {
            store,
            env: std::env::vars().collect(),
            create_if_missing: true,
        }
    }

    /// Replace the environment variables consulted by the override layer.
    #[must_use]
    pub fn with_env<I, K, V>(mut self, vars: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        self.env = vars
            .into_iter()
            .map(|(key, value)| (key.into(), value.into()))
            .collect();
        self
    }

    /// Toggle first-run creation of the persisted file.
    #[must_use]
    pub fn create_if_missing(mut self, create: bool) -> Self {
        self.create_if_missing = create;
        self
    }

    /// Store backing the persisted layer, when one is available.
    #[must_use]
    pub const fn store(&self) -> Option<&ConfigStore> {
        self.store.as_ref()
    }

    /// Resolve the configuration, discarding diagnostics.
    #[must_use]
    pub fn resolve(&self) -> Configuration {
        self.resolve_with_diagnostics().config
    }

    /// Resolve the configuration and report every fallback taken.
    #[must_use]
    pub fn resolve_with_diagnostics(&self) -> Resolution {
        let mut diagnostics = Vec::new();
        let mut config = defaults::embedded();

        match &self.store {
            Some(store) => {
                if self.create_if_missing
                    && let Err(err) = store.ensure_initialized(&config)
                {
                    diagnostics.push(ConfigDiagnostic::FileCreateFailed {
                        path: store.path().to_path_buf(),
                        reason: err.to_string(),
                    });
                }
                match store.read_patch() {
                    Ok(Some(patch)) => config = config.merged(patch),
                    Ok(None) => {}
                    Err(err) => diagnostics.push(ConfigDiagnostic::FileInvalid {
                        path: store.path().to_path_buf(),
                        reason: error_chain(&err),
                    }),
                }
            }
            None => diagnostics.push(ConfigDiagnostic::HomeUnavailable),
        }

        let overrides = EnvOverrides::from_vars(
            self.env
                .iter()
                .map(|(key, value)| (key.as_str(), value.as_str())),
        );
        diagnostics.extend(overrides.diagnostics);
        config = config.merged(overrides.patch);

        for diagnostic in &diagnostics {
            diagnostic.emit();
        }
        Resolution {
            config,
            diagnostics,
        }
    }
}

fn error_chain(err: &ConfigError) -> String {
    let mut message = err.to_string();
    let mut source = std::error::Error::source(err);
    while let Some(cause) = source {
        message.push_str(": ");
        message.push_str(&cause.to_string());
        source = cause.source();
    }
    message
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::Result;
    use technitium_test_support::fixtures::TempConfigHome;

    #[test]
    fn missing_store_falls_back_to_defaults_and_env() {
        let resolver = ConfigResolver {
            store: None,
            env: vec![("TECHNITIUMDNS_CLI_AUTH__USERNAME".into(), "ops".into())],
            create_if_missing: true,
        };
        let resolution = resolver.resolve_with_diagnostics();
        assert_eq!(resolution.diagnostics, vec![ConfigDiagnostic::HomeUnavailable]);
        assert_eq!(resolution.config.auth.username, "ops");
        assert_eq!(resolution.config.api, defaults::embedded().api);
    }

    #[test]
    fn first_run_creates_the_file() -> Result<()> {
        let home = TempConfigHome::new()?;
        let resolver = ConfigResolver::new(ConfigStore::new(home.config_path()));
        let resolution = resolver.resolve_with_diagnostics();
        assert!(resolution.diagnostics.is_empty());
        assert!(home.config_path().exists());
        assert_eq!(resolution.config, defaults::embedded());
        Ok(())
    }

    #[test]
    fn creation_can_be_disabled() -> Result<()> {
        let home = TempConfigHome::new()?;
        let resolver =
            ConfigResolver::new(ConfigStore::new(home.config_path())).create_if_missing(false);
        let _ = resolver.resolve();
        assert!(!home.config_path().exists());
        Ok(())
    }

    #[test]
    fn diagnostics_render_for_humans() {
        let diagnostic = ConfigDiagnostic::InvalidEnvValue {
            variable: "TECHNITIUMDNS_CLI_API__TIMEOUTMS".into(),
            value: "soon".into(),
            reason: "invalid".into(),
        };
        assert_eq!(
            diagnostic.to_string(),
            "ignored TECHNITIUMDNS_CLI_API__TIMEOUTMS=soon"
        );
    }
}
