//! Persisted configuration file.
//!
//! # Design
//! - TOML document with `[app]`, `[api]`, `[auth]`, `[cli]` tables.
//! - Written with owner-only permissions because it holds credentials.
//! - Rendering and parsing go through `toml` only; hand-edited files may use
//!   digit grouping (`15_000`), which is written back without it.

use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};

use crate::defaults::{self, CONFIG_FILE, PROJECT_DIR};
use crate::error::{ConfigError, ConfigResult};
use crate::model::{ConfigPatch, Configuration};

/// Seam through which a client persists a session token after login.
pub trait TokenStore: Send + Sync {
    /// Persist `token` (or clear it for `None`). Returns `false` on failure
    /// without raising so the caller can keep the in-memory token.
    fn store_token(&self, token: Option<&str>) -> bool;
}

/// Reads and writes the persisted configuration document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigStore {
    path: PathBuf,
}

impl ConfigStore {
    /// Store backed by an explicit file path.
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Store at the platform default location
    /// (`<config home>/technitiumdns-cli/config.toml`).
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::HomeUnavailable`] when the platform has no
    /// configuration directory.
    pub fn at_default_location() -> ConfigResult<Self> {
        Self::default_path().map(Self::new)
    }

    /// Default file path under the user configuration home.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::HomeUnavailable`] when the platform has no
    /// configuration directory.
    pub fn default_path() -> ConfigResult<PathBuf> {
        dirs::config_dir()
            .map(|home| home.join(PROJECT_DIR).join(CONFIG_FILE))
            .ok_or(ConfigError::HomeUnavailable)
    }

    /// Location of the backing file.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read the file as a partial layer. Returns `Ok(None)` when the file does
    /// not exist.
    ///
    /// # Errors
    ///
    /// Returns an error when the file exists but cannot be read or parsed.
    pub fn read_patch(&self) -> ConfigResult<Option<ConfigPatch>> {
        let text = match fs::read_to_string(&self.path) {
            Ok(text) => text,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(source) => {
                return Err(ConfigError::Io {
                    operation: "read",
                    path: self.path.clone(),
                    source,
                });
            }
        };
        parse_document(&text)
            .map(Some)
            .map_err(|source| ConfigError::Parse {
                path: self.path.clone(),
                source,
            })
    }

    /// Create the file from `defaults` when it does not exist yet. Returns
    /// `true` when a new file was written.
    ///
    /// # Errors
    ///
    /// Returns an error when the parent directory or the file cannot be
    /// created.
    pub fn ensure_initialized(&self, defaults: &Configuration) -> ConfigResult<bool> {
        if self.path.exists() {
            return Ok(false);
        }
        self.write(defaults)?;
        tracing::info!(path = %self.path.display(), "created configuration file");
        Ok(true)
    }

    /// Replace the file with `config`.
    ///
    /// # Errors
    ///
    /// Returns an error when serialization or any filesystem step fails.
    pub fn write(&self, config: &Configuration) -> ConfigResult<()> {
        let document = render_document(config)?;
        if let Some(parent) = self.path.parent().filter(|dir| !dir.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(|source| ConfigError::Io {
                operation: "create directory",
                path: parent.to_path_buf(),
                source,
            })?;
        }
        let mut file = open_private(&self.path).map_err(|source| ConfigError::Io {
            operation: "open",
            path: self.path.clone(),
            source,
        })?;
        file.write_all(document.as_bytes())
            .map_err(|source| ConfigError::Io {
                operation: "write",
                path: self.path.clone(),
                source,
            })?;
        restrict_permissions(&self.path).map_err(|source| ConfigError::Io {
            operation: "set permissions",
            path: self.path.clone(),
            source,
        })
    }

    /// Persisted layer only: embedded defaults overlaid with the file,
    /// without environment overrides.
    ///
    /// # Errors
    ///
    /// Returns an error when the file exists but cannot be read or parsed.
    pub fn load_persisted(&self) -> ConfigResult<Configuration> {
        let base = defaults::embedded();
        Ok(match self.read_patch()? {
            Some(patch) => base.merged(patch),
            None => base,
        })
    }

    /// Set `auth.token` in the persisted file and rewrite it.
    ///
    /// Environment overrides are never baked into the file. Failures are
    /// logged and reported as `false`.
    #[must_use]
    pub fn update_stored_token(&self, token: Option<&str>) -> bool {
        let result = self.load_persisted().and_then(|mut config| {
            config.auth.token = token.filter(|value| !value.is_empty()).map(str::to_string);
            self.write(&config)
        });
        match result {
            Ok(()) => {
                tracing::debug!(path = %self.path.display(), "stored session token");
                true
            }
            Err(err) => {
                tracing::warn!(
                    path = %self.path.display(),
                    error = %err,
                    "failed to persist session token"
                );
                false
            }
        }
    }
}

impl TokenStore for ConfigStore {
    fn store_token(&self, token: Option<&str>) -> bool {
        self.update_stored_token(token)
    }
}

/// Render `config` as the persisted TOML document.
///
/// # Errors
///
/// Returns [`ConfigError::Serialize`] when TOML rendering fails.
pub fn render_document(config: &Configuration) -> ConfigResult<String> {
    toml::to_string_pretty(config).map_err(|source| ConfigError::Serialize { source })
}

/// Parse a persisted TOML document into a partial layer.
///
/// # Errors
///
/// Returns the TOML error when the document is malformed or a field has the
/// wrong type.
pub fn parse_document(text: &str) -> Result<ConfigPatch, toml::de::Error> {
    toml::from_str(text)
}

#[cfg(unix)]
fn open_private(path: &Path) -> std::io::Result<fs::File> {
    use std::os::unix::fs::OpenOptionsExt;
    OpenOptions::new()
        .write(true)
        .create(true)
        .truncate(true)
        .mode(0o600)
        .open(path)
}

#[cfg(not(unix))]
fn open_private(path: &Path) -> std::io::Result<fs::File> {
    OpenOptions::new()
        .write(true)
        .create(true)
        .truncate(true)
        .open(path)
}

#[cfg(unix)]
fn restrict_permissions(path: &Path) -> std::io::Result<()> {
    use std::os::unix::fs::PermissionsExt;
    fs::set_permissions(path, fs::Permissions::from_mode(0o600))
}

#[cfg(not(unix))]
fn restrict_permissions(_path: &Path) -> std::io::Result<()> {
    Ok(())
}
