//! Environment-variable override layer.
//!
//! Variables look like `TECHNITIUMDNS_CLI_<SECTION>__<PROPERTY>`. Sections
//! match case-insensitively; properties go through a fixed per-section
//! table. Unknown combinations are skipped without a diagnostic.

use crate::defaults;
use crate::model::{ApiPatch, AppPatch, AuthPatch, CliPatch, ConfigPatch, Configuration};
use crate::resolver::ConfigDiagnostic;
use crate::validate::{parse_bool_field, parse_number_field};

/// Prefix every recognised variable carries.
pub const ENV_PREFIX: &str = "TECHNITIUMDNS_CLI_";
/// Separator between the section and property parts.
pub const ENV_SEPARATOR: &str = "__";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Field {
    AppName,
    AppVersion,
    AppDescription,
    ApiBaseUrl,
    ApiTimeoutMs,
    ApiVerifyTls,
    AuthUsername,
    AuthPassword,
    AuthToken,
    AuthTotp,
    CliDefaultOutputFormat,
    CliPrettyPrintJson,
    CliColorizeJson,
}

const APP_FIELDS: &[(&str, Field)] = &[
    ("name", Field::AppName),
    ("version", Field::AppVersion),
    ("description", Field::AppDescription),
];

const API_FIELDS: &[(&str, Field)] = &[
    ("baseurl", Field::ApiBaseUrl),
    ("url", Field::ApiBaseUrl),
    ("timeoutms", Field::ApiTimeoutMs),
    ("timeout", Field::ApiTimeoutMs),
    ("verifytls", Field::ApiVerifyTls),
];

const AUTH_FIELDS: &[(&str, Field)] = &[
    ("username", Field::AuthUsername),
    ("user", Field::AuthUsername),
    ("password", Field::AuthPassword),
    ("pass", Field::AuthPassword),
    ("token", Field::AuthToken),
    ("totp", Field::AuthTotp),
];

const CLI_FIELDS: &[(&str, Field)] = &[
    ("defaultoutputformat", Field::CliDefaultOutputFormat),
    ("outputformat", Field::CliDefaultOutputFormat),
    ("prettyprintjson", Field::CliPrettyPrintJson),
    ("colorizejson", Field::CliColorizeJson),
];

impl Field {
    fn lookup(section: &str, property: &str) -> Option<Self> {
        let table = match section.to_ascii_lowercase().as_str() {
            "app" => APP_FIELDS,
            "api" => API_FIELDS,
            "auth" => AUTH_FIELDS,
            "cli" => CLI_FIELDS,
            _ => return None,
        };
        let key: String = property
            .chars()
            .filter(|ch| *ch != '_')
            .map(|ch| ch.to_ascii_lowercase())
            .collect();
        table
            .iter()
            .find(|(name, _)| *name == key)
            .map(|(_, field)| *field)
    }
}

/// Overrides collected from environment variables.
#[derive(Debug, Clone, Default)]
pub struct EnvOverrides {
    /// Patch to layer on top of the persisted configuration.
    pub patch: ConfigPatch,
    /// Values that failed coercion and fell back to the embedded default.
    pub diagnostics: Vec<ConfigDiagnostic>,
}

impl EnvOverrides {
    /// Collect overrides from `vars`, ignoring everything without
    /// [`ENV_PREFIX`].
    pub fn from_vars<I, K, V>(vars: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: AsRef<str>,
    {
        let defaults = defaults::embedded();
        let mut overrides = Self::default();
        for (name, value) in vars {
            let name = name.as_ref();
            let Some(rest) = name.strip_prefix(ENV_PREFIX) else {
                continue;
            };
            let Some((section, property)) = rest.split_once(ENV_SEPARATOR) else {
                continue;
            };
            let Some(field) = Field::lookup(section, property) else {
                continue;
            };
            overrides.apply(field, name, value.as_ref(), &defaults);
        }
        overrides
    }

    fn apply(&mut self, field: Field, variable: &str, raw: &str, defaults: &Configuration) {
        match field {
            Field::AppName => app(&mut self.patch).name = Some(raw.to_string()),
            Field::AppVersion => app(&mut self.patch).version = Some(raw.to_string()),
            Field::AppDescription => app(&mut self.patch).description = Some(raw.to_string()),
            Field::ApiBaseUrl => api(&mut self.patch).base_url = Some(raw.to_string()),
            Field::ApiTimeoutMs => {
                let value = match parse_number_field("api", "timeoutMs", raw) {
                    Ok(value) => value,
                    Err(err) => {
                        self.diagnostics
                            .push(ConfigDiagnostic::invalid_env(variable, raw, &err));
                        defaults.api.timeout_ms
                    }
                };
                api(&mut self.patch).timeout_ms = Some(value);
            }
            Field::ApiVerifyTls => {
                let value = self.coerce_flag(
                    variable,
                    raw,
                    ("api", "verifyTls"),
                    defaults.api.verify_tls,
                );
                api(&mut self.patch).verify_tls = Some(value);
            }
            Field::AuthUsername => auth(&mut self.patch).username = Some(raw.to_string()),
            Field::AuthPassword => auth(&mut self.patch).password = Some(raw.to_string()),
            Field::AuthToken => auth(&mut self.patch).token = Some(raw.to_string()),
            Field::AuthTotp => auth(&mut self.patch).totp = Some(raw.to_string()),
            Field::CliDefaultOutputFormat => {
                cli(&mut self.patch).default_output_format = Some(raw.to_string());
            }
            Field::CliPrettyPrintJson => {
                let value = self.coerce_flag(
                    variable,
                    raw,
                    ("cli", "prettyPrintJson"),
                    defaults.cli.pretty_print_json,
                );
                cli(&mut self.patch).pretty_print_json = Some(value);
            }
            Field::CliColorizeJson => {
                let value = self.coerce_flag(
                    variable,
                    raw,
                    ("cli", "colorizeJson"),
                    defaults.cli.colorize_json,
                );
                cli(&mut self.patch).colorize_json = Some(value);
            }
        }
    }

    fn coerce_flag(
        &mut self,
        variable: &str,
        raw: &str,
        (section, field): (&'static str, &'static str),
        fallback: bool,
    ) -> bool {
        match parse_bool_field(section, field, raw) {
            Ok(value) => value,
            Err(err) => {
                self.diagnostics
                    .push(ConfigDiagnostic::invalid_env(variable, raw, &err));
                fallback
            }
        }
    }
}

fn app(patch: &mut ConfigPatch) -> &mut AppPatch {
    patch.app.get_or_insert_with(AppPatch::default)
}

fn api(patch: &mut ConfigPatch) -> &mut ApiPatch {
    patch.api.get_or_insert_with(ApiPatch::default)
}

fn auth(patch: &mut ConfigPatch) -> &mut AuthPatch {
    patch.auth.get_or_insert_with(AuthPatch::default)
}

fn cli(patch: &mut ConfigPatch) -> &mut CliPatch {
    patch.cli.get_or_insert_with(CliPatch::default)
}
