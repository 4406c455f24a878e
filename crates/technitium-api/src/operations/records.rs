//! Resource records within a zone.

use serde_json::Value;

use crate::client::ApiClient;
use crate::error::ApiResult;
use crate::request::{ApiCallOptions, Query};

/// Selects the records returned by [`ApiClient::get_records`].
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct RecordQuery {
    /// Owner name.
    pub domain: String,
    /// Zone to search; the server infers it when absent.
    pub zone: Option<String>,
    /// Include every record in the zone, not only `domain`.
    pub list_zone: bool,
}

impl RecordQuery {
    fn to_query(&self) -> Query {
        Query::new()
            .with("domain", &self.domain)
            .with_opt("zone", self.zone.as_deref())
            .with("listZone", self.list_zone)
    }
}

/// One record to add or delete.
///
/// `data` carries the type-specific parameters (`ipAddress`, `nameServer`,
/// `text`, ...) under the names the server expects.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct RecordSpec {
    /// Owner name.
    pub domain: String,
    /// Zone the record belongs to.
    pub zone: Option<String>,
    /// Record type (`A`, `AAAA`, `CNAME`, ...).
    pub record_type: String,
    /// Time to live in seconds.
    pub ttl: Option<u32>,
    /// Type-specific parameters.
    pub data: Vec<(String, String)>,
}

impl RecordSpec {
    /// Record of `record_type` at `domain`.
    #[must_use]
    pub fn new(domain: impl Into<String>, record_type: impl Into<String>) -> Self {
        Self {
            domain: domain.into(),
            record_type: record_type.into(),
            ..Self::default()
        }
    }

    /// Add a type-specific parameter.
    #[must_use]
    pub fn with_data(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.data.push((key.into(), value.into()));
        self
    }

    fn to_query(&self, include_ttl: bool) -> Query {
        let mut query = Query::new()
            .with("domain", &self.domain)
            .with_opt("zone", self.zone.as_deref())
            .with("type", &self.record_type);
        if include_ttl {
            query = query.with_opt("ttl", self.ttl);
        }
        for (key, value) in &self.data {
            query.insert(key, value);
        }
        query
    }
}

impl ApiClient {
    /// Records matching `query`.
    ///
    /// # Errors
    ///
    /// Dispatcher errors.
    pub async fn get_records(&self, query: &RecordQuery) -> ApiResult<Value> {
        let options = ApiCallOptions::new().with_query(query.to_query());
        self.call_json("zones.records.get", options).await
    }

    /// Add `record`; returns the record as stored by the server.
    ///
    /// # Errors
    ///
    /// Dispatcher errors.
    pub async fn add_record(&self, record: &RecordSpec) -> ApiResult<Value> {
        let options = ApiCallOptions::new().with_query(record.to_query(true));
        self.call_json("zones.records.add", options).await
    }

    /// Delete `record`; `data` must identify the value to remove.
    ///
    /// # Errors
    ///
    /// Dispatcher errors.
    pub async fn delete_record(&self, record: &RecordSpec) -> ApiResult<()> {
        let options = ApiCallOptions::new().with_query(record.to_query(false));
        self.call_unit("zones.records.delete", options).await
    }
}
