//! Request dispatcher.
//!
//! # Design
//! - `prepare` does every check that can fail without I/O, so a missing token
//!   or a bad header never reaches the network.
//! - `call` races the exchange against its budget and the optional cancel
//!   signal; the losing futures are dropped, which aborts the transport.

use std::fmt;
use std::sync::Arc;
use std::time::{Duration, Instant};

use reqwest::header::{CONTENT_TYPE, HeaderMap, HeaderName, HeaderValue};
use technitium_config::{AuthSettings, Configuration, TokenStore};
use tokio::sync::oneshot;
use tracing::Instrument;
use url::Url;

use crate::catalog::{self, EndpointDefinition, HttpMethod};
use crate::error::{ApiError, ApiResult};
use crate::request::{ApiCallOptions, append_query, merge_query};
use crate::response::{self, ApiCallResult};
use crate::session::{SessionState, SessionTokenSnapshot, TokenSource};

/// Budget applied when neither the call nor the configuration sets one.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(15);

const TOKEN_PARAM: &str = "token";
const USER_AGENT: &str = concat!("technitium-api/", env!("CARGO_PKG_VERSION"));

/// Construction overrides for [`ApiClient`].
#[derive(Default)]
pub struct ClientOptions {
    /// Token that wins over the configured one; seeds the session as
    /// [`TokenSource::Explicit`] without persisting it.
    pub token: Option<String>,
    /// Where login and logout persist the token.
    pub token_store: Option<Arc<dyn TokenStore>>,
    /// Pre-built HTTP client; `verify_tls` is not applied to it.
    pub http_client: Option<reqwest::Client>,
}

impl fmt::Debug for ClientOptions {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter
            .debug_struct("ClientOptions")
            .field("token", &self.token.as_ref().map(|_| "<redacted>"))
            .field("token_store", &self.token_store.is_some())
            .field("http_client", &self.http_client.is_some())
            .finish()
    }
}

/// Fully resolved request, ready for the transport.
#[derive(Debug)]
pub struct PreparedRequest {
    /// Endpoint being invoked.
    pub endpoint: &'static EndpointDefinition,
    /// Effective verb.
    pub method: HttpMethod,
    /// Absolute URL including the query string.
    pub url: Url,
    /// Request headers.
    pub headers: HeaderMap,
    /// Encoded body.
    pub body: Option<Vec<u8>>,
    /// Budget for the exchange.
    pub timeout: Duration,
}

/// Client for the Technitium HTTP API. Clones share the connection pool
/// and the session.
#[derive(Clone)]
pub struct ApiClient {
    http: reqwest::Client,
    base_url: Url,
    timeout: Duration,
    fallback_token: Option<String>,
    session: Arc<SessionState>,
    token_store: Option<Arc<dyn TokenStore>>,
    auth: AuthSettings,
}

impl fmt::Debug for ApiClient {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter
            .debug_struct("ApiClient")
            .field("base_url", &self.base_url.as_str())
            .field("timeout", &self.timeout)
            .field("token_source", &self.session.snapshot().source)
            .finish_non_exhaustive()
    }
}

impl ApiClient {
    /// Build a client from resolved configuration.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::Configuration`] when the base URL is empty or
    /// invalid, or the HTTP client cannot be built.
    pub fn new(config: &Configuration, options: ClientOptions) -> ApiResult<Self> {
        let base_url = parse_base_url(&config.api.base_url)?;
        let http = match options.http_client {
            Some(client) => client,
            None => reqwest::Client::builder()
                .user_agent(USER_AGENT)
                .danger_accept_invalid_certs(!config.api.verify_tls)
                .build()
                .map_err(|err| {
                    ApiError::configuration(format!("failed to build HTTP client: {err}"))
                })?,
        };
        let timeout = if config.api.timeout_ms == 0 {
            DEFAULT_TIMEOUT
        } else {
            config.api.timeout()
        };

        let fallback_token = config.token().map(ToString::to_string);
        let explicit = options.token.filter(|token| !token.is_empty());
        let session = match (explicit, &fallback_token) {
            (Some(token), _) => SessionState::new(Some(token), TokenSource::Explicit),
            (None, Some(token)) => SessionState::new(Some(token.clone()), TokenSource::Config),
            (None, None) => SessionState::default(),
        };

        Ok(Self {
            http,
            base_url,
            timeout,
            fallback_token,
            session: Arc::new(session),
            token_store: options.token_store,
            auth: config.auth.clone(),
        })
    }

    /// Base URL every endpoint path is appended to.
    #[must_use]
    pub const fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Default budget for calls.
    #[must_use]
    pub const fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Shared session state.
    #[must_use]
    pub fn session(&self) -> &SessionState {
        &self.session
    }

    /// Current session token and provenance.
    #[must_use]
    pub fn token_snapshot(&self) -> SessionTokenSnapshot {
        self.session.snapshot()
    }

    /// Replace the session token in memory only. Use
    /// [`Self::override_token`] to persist an explicit token.
    pub fn set_token(&self, token: Option<String>, source: TokenSource) {
        self.session.set_token(token, source);
    }

    pub(crate) const fn auth(&self) -> &AuthSettings {
        &self.auth
    }

    pub(crate) fn token_store(&self) -> Option<&dyn TokenStore> {
        self.token_store.as_deref()
    }

    fn effective_token(&self, per_call: Option<&str>) -> Option<String> {
        per_call
            .filter(|token| !token.is_empty())
            .map(ToString::to_string)
            .or_else(|| self.session.snapshot().token)
            .or_else(|| self.fallback_token.clone())
    }

    fn endpoint_url(&self, endpoint: &EndpointDefinition) -> ApiResult<Url> {
        let joined = format!(
            "{}{}",
            self.base_url.as_str().trim_end_matches('/'),
            endpoint.path
        );
        Url::parse(&joined).map_err(|err| {
            ApiError::configuration(format!("cannot build URL for {}: {err}", endpoint.id))
        })
    }

    /// Resolve `endpoint_id` and `options` into a request without sending it.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::NotFound`] for unknown identifiers and
    /// [`ApiError::Configuration`] when a required token is missing or a
    /// header is malformed.
    pub fn prepare(&self, endpoint_id: &str, options: &ApiCallOptions) -> ApiResult<PreparedRequest> {
        let endpoint = catalog::lookup(endpoint_id)?;
        let mut query = merge_query(endpoint.default_query, &options.query);

        let wants_token = endpoint.requires_token || options.include_token;
        if wants_token && !query.contains_key(TOKEN_PARAM) {
            match self.effective_token(options.token.as_deref()) {
                Some(token) => query.insert(TOKEN_PARAM, token),
                None if endpoint.requires_token => {
                    return Err(ApiError::configuration(format!(
                        "{} requires a session token; log in or supply one",
                        endpoint.id
                    )));
                }
                None => {}
            }
        }

        let mut url = self.endpoint_url(endpoint)?;
        append_query(&mut url, &query);

        let mut headers = HeaderMap::new();
        for (name, value) in &options.headers {
            let name = HeaderName::from_bytes(name.as_bytes()).map_err(|err| {
                ApiError::configuration(format!("invalid header name '{name}': {err}"))
            })?;
            let value = HeaderValue::from_str(value).map_err(|err| {
                ApiError::configuration(format!("invalid value for header '{name}': {err}"))
            })?;
            headers.append(name, value);
        }

        let body = options.body.as_ref().map(|body| {
            let encoded = body.encode();
            if let Some(content_type) = encoded.content_type
                && !headers.contains_key(CONTENT_TYPE)
            {
                headers.insert(CONTENT_TYPE, HeaderValue::from_static(content_type));
            }
            encoded.bytes
        });

        Ok(PreparedRequest {
            endpoint,
            method: options.method.unwrap_or(endpoint.method),
            url,
            headers,
            body,
            timeout: options.timeout.unwrap_or(self.timeout),
        })
    }

    /// Invoke `endpoint_id`.
    ///
    /// # Errors
    ///
    /// Any [`ApiError`] variant; see the variant docs for when each occurs.
    pub async fn call(
        &self,
        endpoint_id: &str,
        mut options: ApiCallOptions,
    ) -> ApiResult<ApiCallResult> {
        let prepared = self.prepare(endpoint_id, &options)?;
        let cancel = options.cancel.take();
        let endpoint = prepared.endpoint;
        let budget = prepared.timeout;
        let kind = options.response;
        let span = tracing::debug_span!(
            "api.call",
            endpoint = endpoint.id,
            method = %prepared.method,
        );

        let mut request = self
            .http
            .request(prepared.method.to_reqwest(), prepared.url)
            .headers(prepared.headers);
        if let Some(body) = prepared.body {
            request = request.body(body);
        }

        let started = Instant::now();
        let exchange = async {
            let response = request
                .send()
                .await
                .map_err(|source| ApiError::Transport {
                    endpoint: endpoint.id.to_string(),
                    source,
                })?;
            response::classify(endpoint, response, kind, started).await
        };

        let outcome = async {
            tokio::select! {
                result = exchange => result,
                () = tokio::time::sleep(budget) => Err(ApiError::Timeout {
                    endpoint: endpoint.id.to_string(),
                    budget,
                }),
                reason = cancelled(cancel) => Err(ApiError::Cancelled {
                    endpoint: endpoint.id.to_string(),
                    reason,
                }),
            }
        }
        .instrument(span.clone())
        .await;

        let elapsed_ms = u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX);
        span.in_scope(|| match &outcome {
            Ok(result) => tracing::debug!(elapsed_ms, status = %result.status, "call completed"),
            Err(err) => tracing::debug!(elapsed_ms, error = %err, "call failed"),
        });
        outcome
    }
}

/// Resolves with the reason once the sender fires; never resolves when there
/// is no signal or the sender was dropped.
async fn cancelled(signal: Option<oneshot::Receiver<String>>) -> String {
    if let Some(receiver) = signal
        && let Ok(reason) = receiver.await
    {
        return reason;
    }
    std::future::pending().await
}

fn parse_base_url(raw: &str) -> ApiResult<Url> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(ApiError::configuration("api.baseUrl is empty"));
    }
    let url = Url::parse(trimmed)
        .map_err(|err| ApiError::configuration(format!("invalid api.baseUrl '{trimmed}': {err}")))?;
    if !matches!(url.scheme(), "http" | "https") {
        return Err(ApiError::configuration(format!(
            "api.baseUrl must use http or https, got '{}'",
            url.scheme()
        )));
    }
    Ok(url)
}
