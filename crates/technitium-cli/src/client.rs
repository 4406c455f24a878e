//! Shared client construction, error types, and exit-code mapping for the CLI.

use std::fmt::{self, Display, Formatter};
use std::sync::Arc;

use anyhow::anyhow;
use reqwest::header::{HeaderMap, HeaderValue};
use technitium_api::{ApiClient, ApiError, ClientOptions};
use technitium_config::{ConfigStore, Configuration, TokenStore};

use crate::cli::GlobalArgs;
use crate::output::Renderer;

const HEADER_REQUEST_ID: &str = "x-request-id";
const USER_AGENT: &str = concat!("technitium-cli/", env!("CARGO_PKG_VERSION"));

/// CLI-level error type separating bad input from remote failures.
#[derive(Debug)]
pub(crate) enum CliError {
    Validation(String),
    Failure(anyhow::Error),
    UnknownEndpoint {
        id: String,
        known: Vec<&'static str>,
    },
}

/// Result of a command handler.
pub(crate) type CliResult<T> = Result<T, CliError>;

impl CliError {
    pub(crate) fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    pub(crate) fn failure(error: impl Into<anyhow::Error>) -> Self {
        Self::Failure(error.into())
    }

    pub(crate) const fn exit_code(&self) -> i32 {
        match self {
            Self::Validation(_) => 2,
            Self::Failure(_) => 3,
            Self::UnknownEndpoint { .. } => 4,
        }
    }

    pub(crate) fn display_message(&self) -> String {
        match self {
            Self::Validation(message) => message.clone(),
            Self::Failure(error) => format!("{error:#}"),
            Self::UnknownEndpoint { id, known } => {
                let mut message = format!("unknown endpoint '{id}'; known endpoints:");
                for candidate in known {
                    message.push_str("\n  ");
                    message.push_str(candidate);
                }
                message
            }
        }
    }
}

impl Display for CliError {
    fn fmt(&self, formatter: &mut Formatter<'_>) -> fmt::Result {
        formatter.write_str(&self.display_message())
    }
}

impl std::error::Error for CliError {}

impl From<ApiError> for CliError {
    fn from(err: ApiError) -> Self {
        match err {
            ApiError::Configuration { message } => Self::Validation(message),
            ApiError::NotFound { id, known } => Self::UnknownEndpoint { id, known },
            other => Self::Failure(other.into()),
        }
    }
}

/// Everything a command handler needs: the API client, the resolved
/// configuration and the renderer.
pub(crate) struct AppContext {
    pub(crate) api: ApiClient,
    pub(crate) config: Configuration,
    pub(crate) renderer: Renderer,
}

impl AppContext {
    /// Apply flag overrides to `config` and build the API client.
    pub(crate) fn new(
        mut config: Configuration,
        store: Option<ConfigStore>,
        global: &GlobalArgs,
        trace_id: &str,
    ) -> CliResult<Self> {
        apply_overrides(&mut config, global);
        let renderer = Renderer::from_settings(&config.cli, global.output);

        let mut default_headers = HeaderMap::new();
        let request_id = HeaderValue::from_str(trace_id).map_err(|_| {
            CliError::failure(anyhow!("request id {trace_id} is not a valid header value"))
        })?;
        default_headers.insert(HEADER_REQUEST_ID, request_id);

        let http = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .danger_accept_invalid_certs(!config.api.verify_tls)
            .default_headers(default_headers)
            .build()
            .map_err(|err| CliError::failure(anyhow!("failed to build HTTP client: {err}")))?;

        let has_store = store.is_some();
        let token_store = store.map(|store| Arc::new(store) as Arc<dyn TokenStore>);
        let api = ApiClient::new(
            &config,
            ClientOptions {
                token: None,
                token_store,
                http_client: Some(http),
            },
        )?;
        if let Some(token) = global.token.as_deref().filter(|token| !token.is_empty())
            && !api.override_token(token)
            && has_store
        {
            tracing::warn!("--token is used for this invocation only; it could not be saved");
        }

        tracing::debug!(
            base_url = %api.base_url(),
            timeout_ms = u64::try_from(api.timeout().as_millis()).unwrap_or(u64::MAX),
            token_source = %api.token_snapshot().source,
            "client ready"
        );

        let mut ctx = Self {
            api,
            config,
            renderer,
        };
        ctx.sync_token();
        Ok(ctx)
    }

    /// Mirror the session token into `config.auth.token` after it changed.
    pub(crate) fn sync_token(&mut self) {
        self.config.auth.token = self.api.token_snapshot().token;
    }
}

/// Flags win over every configuration layer.
pub(crate) fn apply_overrides(config: &mut Configuration, global: &GlobalArgs) {
    if let Some(base_url) = &global.base_url {
        config.api.base_url.clone_from(base_url);
    }
    if let Some(timeout_ms) = global.timeout_ms {
        config.api.timeout_ms = timeout_ms;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use technitium_config::defaults;
    use technitium_test_support::fixtures::TempConfigHome;

    #[test]
    fn api_errors_map_to_exit_codes() {
        let validation: CliError = ApiError::Configuration {
            message: "zones.list requires a session token".into(),
        }
        .into();
        assert_eq!(validation.exit_code(), 2);

        let unknown: CliError = ApiError::NotFound {
            id: "zones.nope".into(),
            known: vec!["zones.create", "zones.list"],
        }
        .into();
        assert_eq!(unknown.exit_code(), 4);
        let message = unknown.display_message();
        assert!(message.contains("zones.nope"));
        assert!(message.contains("\n  zones.list"));

        let failure: CliError = ApiError::Timeout {
            endpoint: "zones.list".into(),
            budget: std::time::Duration::from_millis(250),
        }
        .into();
        assert_eq!(failure.exit_code(), 3);
        assert_eq!(failure.display_message(), "zones.list timed out after 250ms");
    }

    #[test]
    fn flags_override_resolved_configuration() {
        let mut config = defaults::embedded();
        let global = GlobalArgs {
            base_url: Some("https://dns.example:53443".into()),
            timeout_ms: Some(2_500),
            ..GlobalArgs::default()
        };
        apply_overrides(&mut config, &global);
        assert_eq!(config.api.base_url, "https://dns.example:53443");
        assert_eq!(config.api.timeout_ms, 2_500);
    }

    #[test]
    fn token_flag_seeds_an_explicit_session() {
        let global = GlobalArgs {
            token: Some("flag-token".into()),
            ..GlobalArgs::default()
        };
        let ctx = AppContext::new(defaults::embedded(), None, &global, "trace-1")
            .expect("context builds");
        let snapshot = ctx.api.token_snapshot();
        assert_eq!(snapshot.token.as_deref(), Some("flag-token"));
        assert_eq!(snapshot.source, technitium_api::TokenSource::Explicit);
        assert_eq!(ctx.config.auth.token.as_deref(), Some("flag-token"));
    }

    #[test]
    fn token_flag_is_written_to_the_config_file() -> anyhow::Result<()> {
        let home = TempConfigHome::new()?;
        let store = ConfigStore::new(home.config_path());
        assert!(store.update_stored_token(Some("stale")));

        let global = GlobalArgs {
            token: Some("flag-token".into()),
            ..GlobalArgs::default()
        };
        let mut config = defaults::embedded();
        config.auth.token = Some("stale".into());
        let ctx = AppContext::new(config, Some(store.clone()), &global, "trace-3")
            .map_err(|err| anyhow!(err.display_message()))?;

        assert_eq!(store.load_persisted()?.token(), Some("flag-token"));
        assert_eq!(ctx.config.auth.token.as_deref(), Some("flag-token"));
        Ok(())
    }

    #[test]
    fn bad_base_url_is_a_validation_error() {
        let global = GlobalArgs {
            base_url: Some("not a url".into()),
            ..GlobalArgs::default()
        };
        let err = AppContext::new(defaults::embedded(), None, &global, "trace-2")
            .err()
            .expect("invalid base url");
        assert_eq!(err.exit_code(), 2);
    }
}
