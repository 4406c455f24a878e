//! Authoritative zone management.

use serde_json::Value;

use crate::client::ApiClient;
use crate::error::ApiResult;
use crate::request::{ApiCallOptions, RequestBody, ResponseKind};

impl ApiClient {
    /// Every zone hosted by the server.
    ///
    /// # Errors
    ///
    /// Dispatcher errors.
    pub async fn list_zones(&self) -> ApiResult<Value> {
        self.call_json("zones.list", ApiCallOptions::new()).await
    }

    /// Create `zone`; `zone_type` defaults to `Primary`.
    ///
    /// # Errors
    ///
    /// Dispatcher errors.
    pub async fn create_zone(&self, zone: &str, zone_type: Option<&str>) -> ApiResult<Value> {
        let mut options = ApiCallOptions::new().query("zone", zone);
        if let Some(zone_type) = zone_type {
            options.query.insert("type", zone_type);
        }
        self.call_json("zones.create", options).await
    }

    /// Delete `zone`.
    ///
    /// # Errors
    ///
    /// Dispatcher errors.
    pub async fn delete_zone(&self, zone: &str) -> ApiResult<()> {
        self.call_unit("zones.delete", zone_options(zone)).await
    }

    /// Enable `zone`.
    ///
    /// # Errors
    ///
    /// Dispatcher errors.
    pub async fn enable_zone(&self, zone: &str) -> ApiResult<()> {
        self.call_unit("zones.enable", zone_options(zone)).await
    }

    /// Disable `zone`.
    ///
    /// # Errors
    ///
    /// Dispatcher errors.
    pub async fn disable_zone(&self, zone: &str) -> ApiResult<()> {
        self.call_unit("zones.disable", zone_options(zone)).await
    }

    /// Zone file text for `zone`.
    ///
    /// # Errors
    ///
    /// Dispatcher errors, including a JSON error envelope sent in place of
    /// the file.
    pub async fn export_zone(&self, zone: &str) -> ApiResult<String> {
        let options = zone_options(zone).response(ResponseKind::Text);
        let result = self.call("zones.export", options).await?;
        Ok(result.data.into_text().unwrap_or_default())
    }

    /// Import zone file `text` into `zone`, replacing existing records when
    /// `overwrite` is set.
    ///
    /// # Errors
    ///
    /// Dispatcher errors.
    pub async fn import_zone(&self, zone: &str, text: String, overwrite: bool) -> ApiResult<()> {
        let options = zone_options(zone)
            .query("overwrite", overwrite)
            .header("content-type", "text/plain")
            .body(RequestBody::Text(text));
        self.call_unit("zones.import", options).await
    }
}

fn zone_options(zone: &str) -> ApiCallOptions {
    ApiCallOptions::new().query("zone", zone)
}
