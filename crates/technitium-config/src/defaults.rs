//! Embedded defaults compiled into the binary.
//!
//! # Design
//! - Lowest-precedence layer; every other layer falls back to these values.
//! - Also used to seed the persisted file on first run.

use crate::model::{ApiSettings, AppSettings, AuthSettings, CliSettings, Configuration};

/// Application name shown in help and `config show`.
pub const APP_NAME: &str = "technitiumdns-cli";
/// Short description of the tool.
pub const APP_DESCRIPTION: &str = "Command-line client for the Technitium DNS Server HTTP API";
/// Default API endpoint of a local Technitium DNS Server.
pub const DEFAULT_BASE_URL: &str = "http://localhost:5380";
/// Default request budget in milliseconds.
pub const DEFAULT_TIMEOUT_MS: u64 = 15_000;
/// Default administrator account name.
pub const DEFAULT_USERNAME: &str = "admin";
/// Default output format for structured command results.
pub const DEFAULT_OUTPUT_FORMAT: &str = "json";
/// Directory created under the user configuration home.
pub const PROJECT_DIR: &str = "technitiumdns-cli";
/// File name of the persisted configuration document.
pub const CONFIG_FILE: &str = "config.toml";

impl Default for AppSettings {
    fn default() -> Self {
        Self {
            name: APP_NAME.to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
            description: APP_DESCRIPTION.to_string(),
        }
    }
}

impl Default for ApiSettings {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout_ms: DEFAULT_TIMEOUT_MS,
            verify_tls: true,
        }
    }
}

impl Default for AuthSettings {
    fn default() -> Self {
        Self {
            username: DEFAULT_USERNAME.to_string(),
            password: None,
            token: None,
            totp: None,
        }
    }
}

impl Default for CliSettings {
    fn default() -> Self {
        Self {
            default_output_format: DEFAULT_OUTPUT_FORMAT.to_string(),
            pretty_print_json: true,
            colorize_json: true,
        }
    }
}

/// Embedded defaults for every section.
#[must_use]
pub fn embedded() -> Configuration {
    Configuration::default()
}
