//! Typed convenience wrappers over [`ApiClient::call`].
//!
//! Each wrapper only shapes the query and picks the response mode; envelope
//! handling and token injection stay in the dispatcher.

mod auth;
mod lists;
mod records;
mod server;
mod zones;

use serde_json::Value;

use crate::client::ApiClient;
use crate::error::ApiResult;
use crate::request::ApiCallOptions;

pub use auth::{Credentials, LoginResponse};
pub use lists::DomainList;
pub use records::{RecordQuery, RecordSpec};
pub use server::{ResolveQuery, StatsRange};

impl ApiClient {
    async fn call_json(&self, endpoint_id: &str, options: ApiCallOptions) -> ApiResult<Value> {
        Ok(self.call(endpoint_id, options).await?.into_json())
    }

    async fn call_unit(&self, endpoint_id: &str, options: ApiCallOptions) -> ApiResult<()> {
        self.call(endpoint_id, options).await.map(|_| ())
    }
}
