use std::io::{self, IsTerminal};

use anyhow::anyhow;
use serde_json::json;
use technitium_api::Credentials;

use crate::cli::LoginArgs;
use crate::client::{AppContext, CliError, CliResult};

pub(crate) async fn handle_login(ctx: &mut AppContext, args: LoginArgs) -> CliResult<()> {
    let credentials = resolve_credentials(ctx, args)?;
    let login = ctx.api.login(&credentials).await?;
    ctx.sync_token();
    if !login.persisted {
        tracing::warn!("token is valid for this invocation only; it could not be saved");
    }
    ctx.renderer.value(&json!({
        "username": login.username.unwrap_or(credentials.username),
        "displayName": login.display_name,
        "tokenSource": ctx.api.token_snapshot().source.as_str(),
        "persisted": login.persisted,
    }))
}

pub(crate) async fn handle_logout(ctx: &mut AppContext) -> CliResult<()> {
    let ended = ctx.api.logout().await;
    ctx.sync_token();
    ended?;
    ctx.renderer.done("logged out")
}

pub(crate) async fn handle_session(ctx: &AppContext) -> CliResult<()> {
    let source = ctx.api.token_snapshot().source;
    let info = ctx.api.session_info().await?;
    ctx.renderer.value(&json!({
        "tokenSource": source.as_str(),
        "session": info,
    }))
}

/// Flags first, then `[auth]`, then an interactive prompt for the password.
fn resolve_credentials(ctx: &AppContext, args: LoginArgs) -> CliResult<Credentials> {
    let auth = &ctx.config.auth;
    let username = args
        .username
        .unwrap_or_else(|| auth.username.clone())
        .trim()
        .to_string();
    if username.is_empty() {
        return Err(CliError::validation("username cannot be empty"));
    }

    let password = match args.password.or_else(|| auth.password.clone()) {
        Some(password) if !password.is_empty() => password,
        _ => prompt_password()?,
    };

    let mut credentials = Credentials::new(username, password);
    if let Some(totp) = args.totp.or_else(|| auth.totp.clone())
        && !totp.trim().is_empty()
    {
        credentials = credentials.with_totp(totp.trim());
    }
    Ok(credentials)
}

fn prompt_password() -> CliResult<String> {
    if !io::stdin().is_terminal() {
        return Err(CliError::validation(
            "password required; supply --password or set TECHNITIUMDNS_CLI_AUTH__PASSWORD",
        ));
    }
    let password = rpassword::prompt_password("Password: ")
        .map_err(|err| CliError::failure(anyhow!("failed to read password: {err}")))?;
    if password.is_empty() {
        return Err(CliError::validation("password cannot be empty"));
    }
    Ok(password)
}
