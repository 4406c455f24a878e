//! Login, API tokens and logout.

use serde_json::Value;
use technitium_config::AuthSettings;

use crate::client::ApiClient;
use crate::error::{ApiError, ApiResult};
use crate::request::ApiCallOptions;
use crate::response::ApiCallResult;
use crate::session::TokenSource;

/// Username, password and optional one-time code.
#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    /// Account name.
    pub username: String,
    /// Account password.
    pub password: String,
    /// Two-factor code, when the account requires one.
    pub totp: Option<String>,
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, formatter: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        formatter
            .debug_struct("Credentials")
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .field("totp", &self.totp.as_ref().map(|_| "<redacted>"))
            .finish()
    }
}

impl Credentials {
    /// Credentials with no one-time code.
    #[must_use]
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            password: password.into(),
            totp: None,
        }
    }

    /// Attach a one-time code.
    #[must_use]
    pub fn with_totp(mut self, totp: impl Into<String>) -> Self {
        self.totp = Some(totp.into());
        self
    }

    /// Build from the `[auth]` section.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::Configuration`] when the username or password is
    /// missing.
    pub fn from_settings(auth: &AuthSettings) -> ApiResult<Self> {
        if auth.username.trim().is_empty() {
            return Err(ApiError::configuration("auth.username is not set"));
        }
        let password = auth
            .password
            .clone()
            .filter(|password| !password.is_empty())
            .ok_or_else(|| ApiError::configuration("auth.password is not set"))?;
        Ok(Self {
            username: auth.username.clone(),
            password,
            totp: auth.totp.clone().filter(|code| !code.is_empty()),
        })
    }

    fn options(&self) -> ApiCallOptions {
        let mut options = ApiCallOptions::new()
            .query("user", &self.username)
            .query("pass", &self.password);
        if let Some(totp) = &self.totp {
            options.query.insert("totp", totp);
        }
        options
    }
}

/// Token issued by a login or token creation call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoginResponse {
    /// Session or API token.
    pub token: String,
    /// Account the token belongs to.
    pub username: Option<String>,
    /// Display name reported by the server.
    pub display_name: Option<String>,
    /// Whether the token reached the persisted configuration.
    pub persisted: bool,
}

impl LoginResponse {
    fn from_result(result: &ApiCallResult) -> ApiResult<Self> {
        let field = |name: &str| {
            result
                .envelope
                .as_ref()
                .and_then(|envelope| envelope.get(name))
                .or_else(|| result.data.as_json().and_then(|data| data.get(name)))
                .and_then(Value::as_str)
                .map(ToString::to_string)
        };
        let token = field("token")
            .filter(|token| !token.is_empty())
            .ok_or_else(|| ApiError::Api {
                endpoint: result.endpoint.id.to_string(),
                path: result.endpoint.path.to_string(),
                status: result.status.clone(),
                message: "response did not include a token".to_string(),
                payload: result.envelope.clone().unwrap_or(Value::Null),
            })?;
        Ok(Self {
            token,
            username: field("username"),
            display_name: field("displayName"),
            persisted: false,
        })
    }
}

impl ApiClient {
    /// Exchange credentials for a session token, store it in the session as
    /// [`TokenSource::Login`] and persist it through the token store.
    ///
    /// # Errors
    ///
    /// Propagates dispatcher errors; a response without a token is an
    /// [`ApiError::Api`].
    pub async fn login(&self, credentials: &Credentials) -> ApiResult<LoginResponse> {
        let result = self.call("user.login", credentials.options()).await?;
        let mut login = LoginResponse::from_result(&result)?;
        self.set_token(Some(login.token.clone()), TokenSource::Login);
        if let Some(store) = self.token_store() {
            login.persisted = store.store_token(Some(&login.token));
        }
        tracing::info!(
            username = %credentials.username,
            persisted = login.persisted,
            "logged in"
        );
        Ok(login)
    }

    /// Use `token` from now on as [`TokenSource::Explicit`] and persist it
    /// through the token store. Returns whether it was persisted; an empty
    /// token clears both the session and the stored value.
    #[must_use]
    pub fn override_token(&self, token: impl Into<String>) -> bool {
        let token = Some(token.into()).filter(|value| !value.is_empty());
        let source = if token.is_some() {
            TokenSource::Explicit
        } else {
            TokenSource::Unknown
        };
        self.set_token(token.clone(), source);
        let persisted = self
            .token_store()
            .is_some_and(|store| store.store_token(token.as_deref()));
        tracing::debug!(persisted, "session token overridden");
        persisted
    }

    /// [`Self::login`] with the credentials from configuration.
    ///
    /// # Errors
    ///
    /// [`ApiError::Configuration`] when no password is configured, otherwise
    /// as [`Self::login`].
    pub async fn login_with_config(&self) -> ApiResult<LoginResponse> {
        let credentials = Credentials::from_settings(self.auth())?;
        self.login(&credentials).await
    }

    /// Create a non-expiring API token named `token_name`. The session is
    /// left untouched.
    ///
    /// # Errors
    ///
    /// As [`Self::login`].
    pub async fn create_token(
        &self,
        credentials: &Credentials,
        token_name: &str,
    ) -> ApiResult<LoginResponse> {
        let options = credentials.options().query("tokenName", token_name);
        let result = self.call("user.createToken", options).await?;
        LoginResponse::from_result(&result)
    }

    /// End the remote session, then clear the session token and the
    /// persisted one. A token the server already rejected still counts as
    /// logged out.
    ///
    /// # Errors
    ///
    /// Dispatcher errors other than a missing or invalid token. Local state
    /// is cleared either way.
    pub async fn logout(&self) -> ApiResult<()> {
        let remote = match self.call("user.logout", ApiCallOptions::new()).await {
            Ok(_) | Err(ApiError::Configuration { .. }) => Ok(()),
            Err(err) if err.is_invalid_token() => Ok(()),
            Err(err) => Err(err),
        };

        self.set_token(None, TokenSource::Unknown);
        if let Some(store) = self.token_store()
            && !store.store_token(None)
        {
            tracing::warn!("could not clear the persisted token");
        }
        remote
    }

    /// Details of the current session.
    ///
    /// # Errors
    ///
    /// Dispatcher errors.
    pub async fn session_info(&self) -> ApiResult<Value> {
        self.call_json("user.session.get", ApiCallOptions::new())
            .await
    }
}
