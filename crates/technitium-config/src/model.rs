//! Typed configuration sections, partial patches, and per-section merges.
//!
//! # Design
//! - `Configuration` is always fully populated; patches carry only the keys a
//!   layer defines.
//! - Each section has its own merge function; there is no generic deep merge.

use std::time::Duration;

use serde::{Deserialize, Serialize};

const REDACTED: &str = "********";

/// Fully resolved configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Configuration {
    /// Display-only application metadata.
    pub app: AppSettings,
    /// Connection settings for the remote API.
    pub api: ApiSettings,
    /// Credentials and session token.
    pub auth: AuthSettings,
    /// Output preferences for the command surface.
    pub cli: CliSettings,
}

/// `[app]` section.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AppSettings {
    /// Application name.
    pub name: String,
    /// Application version.
    pub version: String,
    /// Short description.
    pub description: String,
}

/// `[api]` section.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiSettings {
    /// Base URL of the DNS server's web service (e.g. `http://localhost:5380`).
    pub base_url: String,
    /// Request budget in milliseconds.
    pub timeout_ms: u64,
    /// Whether TLS certificates are verified.
    pub verify_tls: bool,
}

impl ApiSettings {
    /// Request budget as a [`Duration`].
    #[must_use]
    pub const fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }
}

/// `[auth]` section.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthSettings {
    /// Account used by `login`.
    pub username: String,
    /// Account password, stored in cleartext.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub password: Option<String>,
    /// Session or API token.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub token: Option<String>,
    /// One-time code for accounts with two-factor authentication.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub totp: Option<String>,
}

/// `[cli]` section.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CliSettings {
    /// Output format used when no `--output` flag is passed.
    pub default_output_format: String,
    /// Indent JSON output.
    pub pretty_print_json: bool,
    /// Colorize JSON output on terminals.
    pub colorize_json: bool,
}

/// Partial configuration contributed by one layer.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ConfigPatch {
    /// `[app]` overrides.
    pub app: Option<AppPatch>,
    /// `[api]` overrides.
    pub api: Option<ApiPatch>,
    /// `[auth]` overrides.
    pub auth: Option<AuthPatch>,
    /// `[cli]` overrides.
    pub cli: Option<CliPatch>,
}

/// Partial `[app]` section.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct AppPatch {
    /// Application name.
    pub name: Option<String>,
    /// Application version.
    pub version: Option<String>,
    /// Short description.
    pub description: Option<String>,
}

/// Partial `[api]` section.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ApiPatch {
    /// Base URL.
    pub base_url: Option<String>,
    /// Request budget in milliseconds.
    pub timeout_ms: Option<u64>,
    /// TLS verification flag.
    pub verify_tls: Option<bool>,
}

/// Partial `[auth]` section.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct AuthPatch {
    /// Account name.
    pub username: Option<String>,
    /// Account password.
    pub password: Option<String>,
    /// Session or API token.
    pub token: Option<String>,
    /// One-time code.
    pub totp: Option<String>,
}

/// Partial `[cli]` section.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct CliPatch {
    /// Output format.
    pub default_output_format: Option<String>,
    /// Indent JSON output.
    pub pretty_print_json: Option<bool>,
    /// Colorize JSON output.
    pub colorize_json: Option<bool>,
}

/// Overlay `patch` onto the `[app]` section.
#[must_use]
pub fn merge_app(base: AppSettings, patch: Option<AppPatch>) -> AppSettings {
    let Some(patch) = patch else {
        return base;
    };
    AppSettings {
        name: patch.name.unwrap_or(base.name),
        version: patch.version.unwrap_or(base.version),
        description: patch.description.unwrap_or(base.description),
    }
}

/// Overlay `patch` onto the `[api]` section.
#[must_use]
pub fn merge_api(base: ApiSettings, patch: Option<ApiPatch>) -> ApiSettings {
    let Some(patch) = patch else {
        return base;
    };
    ApiSettings {
        base_url: patch.base_url.unwrap_or(base.base_url),
        timeout_ms: patch.timeout_ms.unwrap_or(base.timeout_ms),
        verify_tls: patch.verify_tls.unwrap_or(base.verify_tls),
    }
}

/// Overlay `patch` onto the `[auth]` section.
#[must_use]
pub fn merge_auth(base: AuthSettings, patch: Option<AuthPatch>) -> AuthSettings {
    let Some(patch) = patch else {
        return base;
    };
    AuthSettings {
        username: patch.username.unwrap_or(base.username),
        password: patch.password.or(base.password),
        token: patch.token.or(base.token),
        totp: patch.totp.or(base.totp),
    }
}

/// Overlay `patch` onto the `[cli]` section.
#[must_use]
pub fn merge_cli(base: CliSettings, patch: Option<CliPatch>) -> CliSettings {
    let Some(patch) = patch else {
        return base;
    };
    CliSettings {
        default_output_format: patch
            .default_output_format
            .unwrap_or(base.default_output_format),
        pretty_print_json: patch.pretty_print_json.unwrap_or(base.pretty_print_json),
        colorize_json: patch.colorize_json.unwrap_or(base.colorize_json),
    }
}

impl Configuration {
    /// Return a new configuration with `patch` layered on top of `self`.
    #[must_use]
    pub fn merged(self, patch: ConfigPatch) -> Self {
        Self {
            app: merge_app(self.app, patch.app),
            api: merge_api(self.api, patch.api),
            auth: merge_auth(self.auth, patch.auth),
            cli: merge_cli(self.cli, patch.cli),
        }
    }

    /// Copy with password, token, and one-time code masked for display.
    #[must_use]
    pub fn redacted(&self) -> Self {
        let mask = |value: &Option<String>| value.as_ref().map(|_| REDACTED.to_string());
        let mut copy = self.clone();
        copy.auth.password = mask(&self.auth.password);
        copy.auth.token = mask(&self.auth.token);
        copy.auth.totp = mask(&self.auth.totp);
        copy
    }

    /// Configured token, treating an empty string as absent.
    #[must_use]
    pub fn token(&self) -> Option<&str> {
        self.auth.token.as_deref().filter(|token| !token.is_empty())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn merge_overrides_only_defined_fields() {
        let base = ApiSettings::default();
        let merged = merge_api(
            base.clone(),
            Some(ApiPatch {
                timeout_ms: Some(12_000),
                ..ApiPatch::default()
            }),
        );
        assert_eq!(merged.timeout_ms, 12_000);
        assert_eq!(merged.base_url, base.base_url);
        assert_eq!(merged.verify_tls, base.verify_tls);
    }

    #[test]
    fn missing_patch_keeps_base_section() {
        let base = CliSettings::default();
        assert_eq!(merge_cli(base.clone(), None), base);
    }

    #[test]
    fn auth_merge_keeps_lower_layer_secrets() {
        let base = AuthSettings {
            password: Some("hunter2".into()),
            ..AuthSettings::default()
        };
        let merged = merge_auth(
            base,
            Some(AuthPatch {
                token: Some("abc".into()),
                ..AuthPatch::default()
            }),
        );
        assert_eq!(merged.password.as_deref(), Some("hunter2"));
        assert_eq!(merged.token.as_deref(), Some("abc"));
    }

    #[test]
    fn redacted_masks_secrets_only_when_present() {
        let mut config = Configuration::default();
        config.auth.token = Some("secret".into());
        let redacted = config.redacted();
        assert_eq!(redacted.auth.token.as_deref(), Some(REDACTED));
        assert!(redacted.auth.password.is_none());
        assert_eq!(redacted.api, config.api);
    }

    #[test]
    fn empty_token_is_treated_as_absent() {
        let mut config = Configuration::default();
        config.auth.token = Some(String::new());
        assert!(config.token().is_none());
        config.auth.token = Some("t".into());
        assert_eq!(config.token(), Some("t"));
    }
}
