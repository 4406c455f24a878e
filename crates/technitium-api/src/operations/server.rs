//! Dashboard, logs, DNS client and settings.

use serde_json::Value;

use crate::client::ApiClient;
use crate::error::ApiResult;
use crate::request::{ApiCallOptions, Query, ResponseKind};

/// Window for dashboard statistics.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum StatsRange {
    /// Last 60 minutes.
    #[default]
    LastHour,
    /// Last 24 hours.
    LastDay,
    /// Last 7 days.
    LastWeek,
    /// Last 30 days.
    LastMonth,
    /// Last 12 months.
    LastYear,
    /// Explicit window; bounds are ISO 8601 timestamps.
    Custom {
        /// Inclusive start.
        start: String,
        /// Inclusive end.
        end: String,
    },
}

impl StatsRange {
    /// Value of the `type` parameter.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::LastHour => "LastHour",
            Self::LastDay => "LastDay",
            Self::LastWeek => "LastWeek",
            Self::LastMonth => "LastMonth",
            Self::LastYear => "LastYear",
            Self::Custom { .. } => "Custom",
        }
    }

    /// Parse a range name case-insensitively (`hour`, `LastDay`, ...).
    #[must_use]
    pub fn parse(value: &str) -> Option<Self> {
        let normalized = value.trim().to_ascii_lowercase();
        let name = normalized.strip_prefix("last").unwrap_or(&normalized);
        match name {
            "hour" => Some(Self::LastHour),
            "day" => Some(Self::LastDay),
            "week" => Some(Self::LastWeek),
            "month" => Some(Self::LastMonth),
            "year" => Some(Self::LastYear),
            _ => None,
        }
    }

    fn to_query(&self) -> Query {
        let query = Query::new().with("type", self.as_str());
        match self {
            Self::Custom { start, end } => query.with("start", start).with("end", end),
            _ => query,
        }
    }
}

/// Parameters for [`ApiClient::resolve_dns`].
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ResolveQuery {
    /// Name to resolve.
    pub domain: String,
    /// Record type; the endpoint default (`A`) when absent.
    pub record_type: Option<String>,
    /// Upstream to ask; the server itself when absent.
    pub server: Option<String>,
    /// Transport protocol (`Udp`, `Tcp`, `Tls`, `Https`, `Quic`).
    pub protocol: Option<String>,
    /// Request DNSSEC validation.
    pub dnssec: bool,
}

impl ResolveQuery {
    /// Query for `domain` with every other field at its default.
    #[must_use]
    pub fn new(domain: impl Into<String>) -> Self {
        Self {
            domain: domain.into(),
            ..Self::default()
        }
    }

    fn to_query(&self) -> Query {
        let query = Query::new()
            .with("domain", &self.domain)
            .with_opt("type", self.record_type.as_deref())
            .with_opt("server", self.server.as_deref())
            .with_opt("protocol", self.protocol.as_deref());
        if self.dnssec {
            query.with("dnssec", true)
        } else {
            query
        }
    }
}

impl ApiClient {
    /// Dashboard counters and charts for `range`.
    ///
    /// # Errors
    ///
    /// Dispatcher errors.
    pub async fn dashboard_stats(&self, range: StatsRange) -> ApiResult<Value> {
        let options = ApiCallOptions::new().with_query(range.to_query());
        self.call_json("dashboard.stats.get", options).await
    }

    /// Available log files.
    ///
    /// # Errors
    ///
    /// Dispatcher errors.
    pub async fn list_logs(&self) -> ApiResult<Value> {
        self.call_json("logs.list", ApiCallOptions::new()).await
    }

    /// Raw contents of log file `name`.
    ///
    /// # Errors
    ///
    /// Dispatcher errors.
    pub async fn download_log(&self, name: &str) -> ApiResult<Vec<u8>> {
        let options = ApiCallOptions::new()
            .query("fileName", name)
            .response(ResponseKind::Bytes);
        let result = self.call("logs.download", options).await?;
        Ok(result.data.into_bytes().unwrap_or_default())
    }

    /// Resolve a name through the server's DNS client.
    ///
    /// # Errors
    ///
    /// Dispatcher errors.
    pub async fn resolve_dns(&self, query: &ResolveQuery) -> ApiResult<Value> {
        let options = ApiCallOptions::new().with_query(query.to_query());
        self.call_json("dnsClient.resolve", options).await
    }

    /// Server settings.
    ///
    /// # Errors
    ///
    /// Dispatcher errors.
    pub async fn get_settings(&self) -> ApiResult<Value> {
        self.call_json("settings.get", ApiCallOptions::new()).await
    }
}
