//! Response decoding and envelope classification.
//!
//! Technitium wraps JSON answers in `{status, response?, errorMessage?}`.
//! A 2xx answer whose envelope reports anything other than `ok` is still a
//! failure.

use std::time::{Duration, Instant};

use reqwest::header::{CONTENT_TYPE, HeaderMap};
use serde_json::Value;
use url::Url;

use crate::catalog::EndpointDefinition;
use crate::error::{ApiError, ApiResult};
use crate::request::ResponseKind;

const STATUS_OK: &str = "ok";

/// Normalized response body.
#[derive(Debug)]
pub enum Payload {
    /// Envelope `response` member, or the whole decoded document.
    Json(Value),
    /// Body decoded as UTF-8 (lossy).
    Text(String),
    /// Raw body.
    Bytes(Vec<u8>),
    /// Unread response for the caller to consume.
    Stream(reqwest::Response),
}

impl Payload {
    /// JSON value, when the payload is JSON.
    #[must_use]
    pub fn as_json(&self) -> Option<&Value> {
        match self {
            Self::Json(value) => Some(value),
            _ => None,
        }
    }

    /// Convert into a JSON value; text becomes a JSON string and bytes or
    /// streams become `null`.
    #[must_use]
    pub fn into_json(self) -> Value {
        match self {
            Self::Json(value) => value,
            Self::Text(text) => Value::String(text),
            Self::Bytes(_) | Self::Stream(_) => Value::Null,
        }
    }

    /// Convert into text; JSON is re-serialized.
    #[must_use]
    pub fn into_text(self) -> Option<String> {
        match self {
            Self::Text(text) => Some(text),
            Self::Json(value) => Some(value.to_string()),
            Self::Bytes(bytes) => Some(String::from_utf8_lossy(&bytes).into_owned()),
            Self::Stream(_) => None,
        }
    }

    /// Convert into raw bytes.
    #[must_use]
    pub fn into_bytes(self) -> Option<Vec<u8>> {
        match self {
            Self::Bytes(bytes) => Some(bytes),
            Self::Text(text) => Some(text.into_bytes()),
            Self::Json(value) => Some(value.to_string().into_bytes()),
            Self::Stream(_) => None,
        }
    }
}

/// Transport-level details of a completed call.
#[derive(Debug, Clone)]
pub struct ResponseMeta {
    /// HTTP status code.
    pub status: u16,
    /// Response headers.
    pub headers: HeaderMap,
    /// Final URL after redirects.
    pub url: Url,
    /// Time from dispatch to classification.
    pub elapsed: Duration,
}

/// Successful outcome of [`crate::ApiClient::call`].
#[derive(Debug)]
pub struct ApiCallResult {
    /// Endpoint that was invoked.
    pub endpoint: &'static EndpointDefinition,
    /// Normalized payload.
    pub data: Payload,
    /// Envelope status; `ok` when the body carried none.
    pub status: String,
    /// Decoded JSON document, when the body was JSON.
    pub envelope: Option<Value>,
    /// Response metadata.
    pub response: ResponseMeta,
}

impl ApiCallResult {
    /// Payload as JSON (see [`Payload::into_json`]).
    #[must_use]
    pub fn into_json(self) -> Value {
        self.data.into_json()
    }
}

fn declares_json(headers: &HeaderMap) -> bool {
    headers
        .get(CONTENT_TYPE)
        .and_then(|value| value.to_str().ok())
        .is_some_and(|value| value.to_ascii_lowercase().contains("json"))
}

struct Classified {
    data: Value,
    status: String,
}

fn classify_envelope(endpoint: &EndpointDefinition, document: &Value) -> ApiResult<Classified> {
    let Some(object) = document.as_object() else {
        return Ok(Classified {
            data: document.clone(),
            status: STATUS_OK.to_string(),
        });
    };

    let status = object
        .get("status")
        .and_then(Value::as_str)
        .unwrap_or(STATUS_OK);
    if status != STATUS_OK {
        let message = object
            .get("errorMessage")
            .and_then(Value::as_str)
            .map_or_else(
                || format!("server reported status '{status}'"),
                ToString::to_string,
            );
        return Err(ApiError::Api {
            endpoint: endpoint.id.to_string(),
            path: endpoint.path.to_string(),
            status: status.to_string(),
            message,
            payload: document.clone(),
        });
    }

    let data = object
        .get("response")
        .cloned()
        .unwrap_or_else(|| document.clone());
    Ok(Classified {
        data,
        status: status.to_string(),
    })
}

fn decode_document(endpoint: &EndpointDefinition, bytes: &[u8]) -> ApiResult<Value> {
    if bytes.iter().all(u8::is_ascii_whitespace) {
        return Ok(Value::Null);
    }
    serde_json::from_slice(bytes).map_err(|source| ApiError::Decode {
        endpoint: endpoint.id.to_string(),
        source,
    })
}

fn meta(response: &reqwest::Response, started: Instant) -> ResponseMeta {
    ResponseMeta {
        status: response.status().as_u16(),
        headers: response.headers().clone(),
        url: response.url().clone(),
        elapsed: started.elapsed(),
    }
}

/// Turn a raw response into an [`ApiCallResult`] or the matching error.
pub(crate) async fn classify(
    endpoint: &'static EndpointDefinition,
    response: reqwest::Response,
    kind: ResponseKind,
    started: Instant,
) -> ApiResult<ApiCallResult> {
    let mut meta = meta(&response, started);
    let json = declares_json(&meta.headers);
    let status = response.status();

    if !status.is_success() {
        let bytes = response.bytes().await.unwrap_or_default();
        let payload = if json {
            serde_json::from_slice(&bytes).ok()
        } else {
            None
        };
        return Err(ApiError::Http {
            endpoint: endpoint.id.to_string(),
            path: endpoint.path.to_string(),
            status: status.as_u16(),
            status_text: status.canonical_reason().unwrap_or_default().to_string(),
            payload,
        });
    }

    if kind == ResponseKind::Stream {
        return Ok(ApiCallResult {
            endpoint,
            data: Payload::Stream(response),
            status: STATUS_OK.to_string(),
            envelope: None,
            response: meta,
        });
    }

    let bytes = response
        .bytes()
        .await
        .map_err(|source| ApiError::Transport {
            endpoint: endpoint.id.to_string(),
            source,
        })?;
    meta.elapsed = started.elapsed();

    let (data, status, envelope) = match kind {
        ResponseKind::Auto if json => {
            let document = decode_document(endpoint, &bytes)?;
            let classified = classify_envelope(endpoint, &document)?;
            (
                Payload::Json(classified.data),
                classified.status,
                Some(document),
            )
        }
        _ => {
            // Raw modes still surface a JSON error envelope.
            let mut status = STATUS_OK.to_string();
            let mut envelope = None;
            if json && let Ok(document) = serde_json::from_slice::<Value>(&bytes) {
                status = classify_envelope(endpoint, &document)?.status;
                envelope = Some(document);
            }
            let data = if kind == ResponseKind::Bytes {
                Payload::Bytes(bytes.to_vec())
            } else {
                Payload::Text(String::from_utf8_lossy(&bytes).into_owned())
            };
            (data, status, envelope)
        }
    };

    Ok(ApiCallResult {
        endpoint,
        data,
        status,
        envelope,
        response: meta,
    })
}
