//! Canned JSON envelopes in the shape the DNS server returns.

use serde_json::{Value, json};

/// Successful envelope wrapping `response`.
#[must_use]
pub fn ok_envelope(response: Value) -> Value {
    json!({ "status": "ok", "response": response })
}

/// Envelope reporting an application-level error.
#[must_use]
pub fn error_envelope(message: &str) -> Value {
    json!({ "status": "error", "errorMessage": message })
}

/// Envelope the server returns when the session token is missing or expired.
#[must_use]
pub fn invalid_token_envelope() -> Value {
    json!({ "status": "invalid-token", "errorMessage": "Invalid token or session expired." })
}

/// Login envelope carrying `token` at the top level, as `/api/user/login` does.
#[must_use]
pub fn login_envelope(username: &str, token: &str) -> Value {
    json!({
        "displayName": username,
        "username": username,
        "token": token,
        "status": "ok",
    })
}
