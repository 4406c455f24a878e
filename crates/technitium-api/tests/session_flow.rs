//! Login and logout drive the session and the persisted token.

use std::sync::Arc;

use anyhow::Result;
use httpmock::MockServer;
use httpmock::prelude::*;
use serde_json::json;
use technitium_api::{ApiClient, ApiError, ClientOptions, Credentials, TokenSource};
use technitium_config::{ConfigResolver, ConfigStore, defaults};
use technitium_test_support::envelopes::{invalid_token_envelope, login_envelope, ok_envelope};
use technitium_test_support::fixtures::TempConfigHome;

fn client_with_store(server: &MockServer, store: ConfigStore) -> Result<ApiClient> {
    let mut config = defaults::embedded();
    config.api.base_url = server.base_url();
    Ok(ApiClient::new(
        &config,
        ClientOptions {
            token_store: Some(Arc::new(store)),
            ..ClientOptions::default()
        },
    )?)
}

#[tokio::test]
async fn login_sets_session_and_persists_token() -> Result<()> {
    let server = MockServer::start_async().await;
    let login = server.mock(|when, then| {
        when.method(GET)
            .path("/api/user/login")
            .query_param("user", "admin")
            .query_param("pass", "secret")
            .query_param("includeInfo", "true");
        then.status(200)
            .header("content-type", "application/json")
            .json_body(login_envelope("admin", "fresh-token"));
    });
    let zones = server.mock(|when, then| {
        when.method(GET)
            .path("/api/zones/list")
            .query_param("token", "fresh-token");
        then.status(200)
            .header("content-type", "application/json")
            .json_body(ok_envelope(json!({"zones": []})));
    });

    let home = TempConfigHome::new()?;
    let store = ConfigStore::new(home.config_path());
    let client = client_with_store(&server, store.clone())?;

    let response = client.login(&Credentials::new("admin", "secret")).await?;
    login.assert();
    assert_eq!(response.token, "fresh-token");
    assert_eq!(response.username.as_deref(), Some("admin"));
    assert!(response.persisted);

    let snapshot = client.token_snapshot();
    assert_eq!(snapshot.token.as_deref(), Some("fresh-token"));
    assert_eq!(snapshot.source, TokenSource::Login);

    let persisted = store.load_persisted()?;
    assert_eq!(persisted.token(), Some("fresh-token"));

    client.list_zones().await?;
    zones.assert();
    Ok(())
}

#[tokio::test]
async fn login_never_bakes_environment_into_the_file() -> Result<()> {
    let server = MockServer::start_async().await;
    server.mock(|when, then| {
        when.method(GET).path("/api/user/login");
        then.status(200)
            .header("content-type", "application/json")
            .json_body(login_envelope("admin", "tok"));
    });

    let home = TempConfigHome::new()?;
    let store = ConfigStore::new(home.config_path());
    let resolved = ConfigResolver::new(store.clone())
        .with_env([("TECHNITIUMDNS_CLI_API__TIMEOUTMS", "9000")])
        .resolve();
    assert_eq!(resolved.api.timeout_ms, 9_000);

    let client = client_with_store(&server, store.clone())?;
    client.login(&Credentials::new("admin", "pw")).await?;

    let persisted = store.load_persisted()?;
    assert_eq!(persisted.api.timeout_ms, defaults::DEFAULT_TIMEOUT_MS);
    assert_eq!(persisted.token(), Some("tok"));
    Ok(())
}

#[tokio::test]
async fn login_with_config_requires_password() {
    let server = MockServer::start_async().await;
    let mut config = defaults::embedded();
    config.api.base_url = server.base_url();
    let client = ApiClient::new(&config, ClientOptions::default()).expect("client");
    let err = client.login_with_config().await.expect_err("no password");
    assert!(matches!(err, ApiError::Configuration { .. }));
}

#[tokio::test]
async fn logout_clears_session_and_store_even_when_token_was_rejected() -> Result<()> {
    let server = MockServer::start_async().await;
    let logout = server.mock(|when, then| {
        when.method(GET)
            .path("/api/user/logout")
            .query_param("token", "old");
        then.status(200)
            .header("content-type", "application/json")
            .json_body(invalid_token_envelope());
    });

    let home = TempConfigHome::new()?;
    let store = ConfigStore::new(home.config_path());
    assert!(store.update_stored_token(Some("old")));

    let client = client_with_store(&server, store.clone())?;
    client.set_token(Some("old".into()), TokenSource::Config);
    client.logout().await?;

    logout.assert();
    assert!(client.token_snapshot().token.is_none());
    assert_eq!(store.load_persisted()?.token(), None);
    Ok(())
}

#[tokio::test]
async fn create_token_leaves_session_alone() -> Result<()> {
    let server = MockServer::start_async().await;
    let create = server.mock(|when, then| {
        when.method(GET)
            .path("/api/user/createToken")
            .query_param("tokenName", "automation");
        then.status(200)
            .header("content-type", "application/json")
            .json_body(json!({"username": "admin", "tokenName": "automation", "token": "api-token", "status": "ok"}));
    });

    let mut config = defaults::embedded();
    config.api.base_url = server.base_url();
    let client = ApiClient::new(&config, ClientOptions::default())?;
    let issued = client
        .create_token(&Credentials::new("admin", "pw"), "automation")
        .await?;

    create.assert();
    assert_eq!(issued.token, "api-token");
    assert!(!issued.persisted);
    assert!(client.token_snapshot().token.is_none());
    Ok(())
}

#[tokio::test]
async fn explicit_override_is_persisted_and_used() -> Result<()> {
    let server = MockServer::start_async().await;
    let zones = server.mock(|when, then| {
        when.method(GET)
            .path("/api/zones/list")
            .query_param("token", "override");
        then.status(200)
            .header("content-type", "application/json")
            .json_body(ok_envelope(json!({"zones": []})));
    });

    let home = TempConfigHome::new()?;
    let store = ConfigStore::new(home.config_path());
    assert!(store.update_stored_token(Some("old")));

    let client = client_with_store(&server, store.clone())?;
    assert!(client.override_token("override"));

    let snapshot = client.token_snapshot();
    assert_eq!(snapshot.token.as_deref(), Some("override"));
    assert_eq!(snapshot.source, TokenSource::Explicit);
    assert_eq!(store.load_persisted()?.token(), Some("override"));

    client.list_zones().await?;
    zones.assert();

    assert!(client.override_token(""));
    assert!(client.token_snapshot().token.is_none());
    assert_eq!(store.load_persisted()?.token(), None);
    Ok(())
}

#[tokio::test]
async fn override_without_a_store_stays_in_memory() -> Result<()> {
    let server = MockServer::start_async().await;
    let mut config = defaults::embedded();
    config.api.base_url = server.base_url();
    let client = ApiClient::new(&config, ClientOptions::default())?;
    assert!(!client.override_token("memory-only"));
    assert_eq!(client.token_snapshot().token.as_deref(), Some("memory-only"));
    Ok(())
}
