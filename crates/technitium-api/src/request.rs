//! Per-call options and the encoding rules for query strings and bodies.

use std::fmt::{self, Display, Formatter};
use std::time::Duration;

use serde_json::Value;
use tokio::sync::oneshot;
use url::Url;

use crate::catalog::HttpMethod;

/// Value of a single query parameter.
#[derive(Debug, Clone, PartialEq)]
pub enum QueryValue {
    /// Rendered as-is.
    Text(String),
    /// Rendered as `true` / `false`.
    Bool(bool),
    /// Signed integer.
    Int(i64),
    /// Unsigned integer.
    UInt(u64),
    /// Floating point number.
    Float(f64),
    /// Rendered as an empty string.
    Null,
    /// Appended as one `key=value` pair per element.
    List(Vec<QueryValue>),
}

impl QueryValue {
    fn append_to(&self, key: &str, pairs: &mut Vec<(String, String)>) {
        match self {
            Self::List(items) => {
                for item in items {
                    item.append_to(key, pairs);
                }
            }
            scalar => pairs.push((key.to_string(), scalar.to_string())),
        }
    }
}

impl Display for QueryValue {
    fn fmt(&self, formatter: &mut Formatter<'_>) -> fmt::Result {
        match self {
            Self::Text(value) => formatter.write_str(value),
            Self::Bool(true) => formatter.write_str("true"),
            Self::Bool(false) => formatter.write_str("false"),
            Self::Int(value) => write!(formatter, "{value}"),
            Self::UInt(value) => write!(formatter, "{value}"),
            Self::Float(value) => write!(formatter, "{value}"),
            Self::Null => Ok(()),
            Self::List(items) => {
                let rendered: Vec<String> = items.iter().map(ToString::to_string).collect();
                formatter.write_str(&rendered.join(","))
            }
        }
    }
}

impl From<&str> for QueryValue {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

impl From<String> for QueryValue {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

impl From<&String> for QueryValue {
    fn from(value: &String) -> Self {
        Self::Text(value.clone())
    }
}

impl From<bool> for QueryValue {
    fn from(value: bool) -> Self {
        Self::Bool(value)
    }
}

impl From<i64> for QueryValue {
    fn from(value: i64) -> Self {
        Self::Int(value)
    }
}

impl From<u16> for QueryValue {
    fn from(value: u16) -> Self {
        Self::UInt(u64::from(value))
    }
}

impl From<u32> for QueryValue {
    fn from(value: u32) -> Self {
        Self::UInt(u64::from(value))
    }
}

impl From<u64> for QueryValue {
    fn from(value: u64) -> Self {
        Self::UInt(value)
    }
}

impl From<f64> for QueryValue {
    fn from(value: f64) -> Self {
        Self::Float(value)
    }
}

impl<T: Into<Self>> From<Option<T>> for QueryValue {
    fn from(value: Option<T>) -> Self {
        value.map_or(Self::Null, Into::into)
    }
}

impl<T: Into<Self>> From<Vec<T>> for QueryValue {
    fn from(values: Vec<T>) -> Self {
        Self::List(values.into_iter().map(Into::into).collect())
    }
}

/// Ordered query parameters. Inserting an existing key replaces its value in
/// place.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Query {
    entries: Vec<(String, QueryValue)>,
}

impl Query {
    /// Empty query.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    /// Insert or replace `key`.
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<QueryValue>) {
        let key = key.into();
        let value = value.into();
        match self.entries.iter_mut().find(|(existing, _)| *existing == key) {
            Some(entry) => entry.1 = value,
            None => self.entries.push((key, value)),
        }
    }

    /// Builder form of [`Self::insert`].
    #[must_use]
    pub fn with(mut self, key: impl Into<String>, value: impl Into<QueryValue>) -> Self {
        self.insert(key, value);
        self
    }

    /// Insert `key` only when `value` is present.
    #[must_use]
    pub fn with_opt<V: Into<QueryValue>>(self, key: impl Into<String>, value: Option<V>) -> Self {
        match value {
            Some(value) => self.with(key, value),
            None => self,
        }
    }

    /// Value stored for `key`.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&QueryValue> {
        self.entries
            .iter()
            .find(|(existing, _)| existing == key)
            .map(|(_, value)| value)
    }

    /// Whether `key` is present.
    #[must_use]
    pub fn contains_key(&self, key: &str) -> bool {
        self.get(key).is_some()
    }

    /// Whether no parameters are set.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterate over entries in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &QueryValue)> {
        self.entries.iter().map(|(key, value)| (key.as_str(), value))
    }

    /// Flatten into `key=value` pairs; list values become repeated keys.
    #[must_use]
    pub fn to_pairs(&self) -> Vec<(String, String)> {
        let mut pairs = Vec::with_capacity(self.entries.len());
        for (key, value) in &self.entries {
            value.append_to(key, &mut pairs);
        }
        pairs
    }
}

impl<K: Into<String>, V: Into<QueryValue>> FromIterator<(K, V)> for Query {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut query = Self::new();
        for (key, value) in iter {
            query.insert(key, value);
        }
        query
    }
}

/// Merge endpoint defaults with caller parameters; caller values win.
pub(crate) fn merge_query(defaults: &[(&str, &str)], caller: &Query) -> Query {
    let mut merged: Query = defaults.iter().map(|(key, value)| (*key, *value)).collect();
    for (key, value) in caller.iter() {
        merged.insert(key, value.clone());
    }
    merged
}

/// Append `query` to `url` without disturbing existing parameters.
pub(crate) fn append_query(url: &mut Url, query: &Query) {
    let pairs = query.to_pairs();
    if pairs.is_empty() {
        return;
    }
    let mut serializer = url.query_pairs_mut();
    for (key, value) in &pairs {
        serializer.append_pair(key, value);
    }
}

/// Request payload.
#[derive(Debug, Clone, PartialEq)]
pub enum RequestBody {
    /// Serialized as JSON; `content-type: application/json` is added unless
    /// the caller set one.
    Json(Value),
    /// Sent unchanged.
    Text(String),
    /// Sent unchanged.
    Bytes(Vec<u8>),
    /// URL-encoded form; `content-type: application/x-www-form-urlencoded`
    /// is added unless the caller set one.
    Form(Vec<(String, String)>),
}

/// Encoded body ready for the transport.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct EncodedBody {
    pub(crate) bytes: Vec<u8>,
    pub(crate) content_type: Option<&'static str>,
}

impl RequestBody {
    pub(crate) fn encode(&self) -> EncodedBody {
        match self {
            Self::Json(value) => EncodedBody {
                bytes: value.to_string().into_bytes(),
                content_type: Some("application/json"),
            },
            Self::Text(text) => EncodedBody {
                bytes: text.clone().into_bytes(),
                content_type: None,
            },
            Self::Bytes(bytes) => EncodedBody {
                bytes: bytes.clone(),
                content_type: None,
            },
            Self::Form(fields) => {
                let encoded = url::form_urlencoded::Serializer::new(String::new())
                    .extend_pairs(fields)
                    .finish();
                EncodedBody {
                    bytes: encoded.into_bytes(),
                    content_type: Some("application/x-www-form-urlencoded"),
                }
            }
        }
    }
}

/// How to interpret a successful response body.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ResponseKind {
    /// Decode JSON when `content-type` mentions `json`, otherwise text.
    #[default]
    Auto,
    /// Always decode as (lossy) UTF-8 text.
    Text,
    /// Return the raw bytes.
    Bytes,
    /// Return the unread response; the caller consumes the body.
    Stream,
}

/// Overrides for a single call.
#[derive(Debug, Default)]
pub struct ApiCallOptions {
    /// Replace the endpoint's HTTP verb.
    pub method: Option<HttpMethod>,
    /// Caller query parameters; override endpoint defaults on collision.
    pub query: Query,
    /// Extra request headers.
    pub headers: Vec<(String, String)>,
    /// Request payload.
    pub body: Option<RequestBody>,
    /// Token for this call only; wins over the session token.
    pub token: Option<String>,
    /// Attach a token even when the endpoint does not require one.
    pub include_token: bool,
    /// Budget for this call; falls back to the client timeout.
    pub timeout: Option<Duration>,
    /// Body interpretation.
    pub response: ResponseKind,
    /// Abort signal; the sent string is surfaced as the cancel reason.
    pub cancel: Option<oneshot::Receiver<String>>,
}

impl ApiCallOptions {
    /// Options with every field at its default.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a query parameter.
    #[must_use]
    pub fn query(mut self, key: impl Into<String>, value: impl Into<QueryValue>) -> Self {
        self.query.insert(key, value);
        self
    }

    /// Replace the query wholesale.
    #[must_use]
    pub fn with_query(mut self, query: Query) -> Self {
        self.query = query;
        self
    }

    /// Add a header.
    #[must_use]
    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }

    /// Set the body.
    #[must_use]
    pub fn body(mut self, body: RequestBody) -> Self {
        self.body = Some(body);
        self
    }

    /// Override the verb.
    #[must_use]
    pub const fn method(mut self, method: HttpMethod) -> Self {
        self.method = Some(method);
        self
    }

    /// Use `token` for this call.
    #[must_use]
    pub fn token(mut self, token: impl Into<String>) -> Self {
        self.token = Some(token.into());
        self
    }

    /// Force token attachment on endpoints that do not require one.
    #[must_use]
    pub const fn include_token(mut self) -> Self {
        self.include_token = true;
        self
    }

    /// Budget for this call.
    #[must_use]
    pub const fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Body interpretation.
    #[must_use]
    pub const fn response(mut self, kind: ResponseKind) -> Self {
        self.response = kind;
        self
    }

    /// Abort the call when `signal` receives a reason.
    #[must_use]
    pub fn cancel_on(mut self, signal: oneshot::Receiver<String>) -> Self {
        self.cancel = Some(signal);
        self
    }
}
