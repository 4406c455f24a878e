//! Resolver cache and the allowed/blocked domain lists.

use std::fmt::{self, Display, Formatter};

use serde_json::Value;

use crate::client::ApiClient;
use crate::error::ApiResult;
use crate::request::ApiCallOptions;

/// Which domain list an operation targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DomainList {
    /// Domains that bypass blocking.
    Allowed,
    /// Domains answered with a blocking response.
    Blocked,
}

impl DomainList {
    /// Catalog prefix for the list.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Allowed => "allowed",
            Self::Blocked => "blocked",
        }
    }

    const fn endpoint(self, action: Action) -> &'static str {
        match (self, action) {
            (Self::Allowed, Action::List) => "allowed.list",
            (Self::Allowed, Action::Add) => "allowed.add",
            (Self::Allowed, Action::Delete) => "allowed.delete",
            (Self::Allowed, Action::Flush) => "allowed.flush",
            (Self::Blocked, Action::List) => "blocked.list",
            (Self::Blocked, Action::Add) => "blocked.add",
            (Self::Blocked, Action::Delete) => "blocked.delete",
            (Self::Blocked, Action::Flush) => "blocked.flush",
        }
    }
}

impl Display for DomainList {
    fn fmt(&self, formatter: &mut Formatter<'_>) -> fmt::Result {
        formatter.write_str(self.as_str())
    }
}

#[derive(Clone, Copy)]
enum Action {
    List,
    Add,
    Delete,
    Flush,
}

fn domain_options(domain: Option<&str>) -> ApiCallOptions {
    let mut options = ApiCallOptions::new();
    if let Some(domain) = domain {
        options.query.insert("domain", domain);
    }
    options
}

impl ApiClient {
    /// Cached entries below `domain` (the root when `None`).
    ///
    /// # Errors
    ///
    /// Dispatcher errors.
    pub async fn list_cache(&self, domain: Option<&str>) -> ApiResult<Value> {
        self.call_json("cache.list", domain_options(domain)).await
    }

    /// Evict `domain` from the cache.
    ///
    /// # Errors
    ///
    /// Dispatcher errors.
    pub async fn delete_cache(&self, domain: &str) -> ApiResult<()> {
        self.call_unit("cache.delete", domain_options(Some(domain)))
            .await
    }

    /// Empty the cache.
    ///
    /// # Errors
    ///
    /// Dispatcher errors.
    pub async fn flush_cache(&self) -> ApiResult<()> {
        self.call_unit("cache.flush", ApiCallOptions::new()).await
    }

    /// Entries of `list` below `domain` (the root when `None`).
    ///
    /// # Errors
    ///
    /// Dispatcher errors.
    pub async fn list_domains(&self, list: DomainList, domain: Option<&str>) -> ApiResult<Value> {
        self.call_json(list.endpoint(Action::List), domain_options(domain))
            .await
    }

    /// Add `domain` to `list`.
    ///
    /// # Errors
    ///
    /// Dispatcher errors.
    pub async fn add_domain(&self, list: DomainList, domain: &str) -> ApiResult<()> {
        self.call_unit(list.endpoint(Action::Add), domain_options(Some(domain)))
            .await
    }

    /// Remove `domain` from `list`.
    ///
    /// # Errors
    ///
    /// Dispatcher errors.
    pub async fn delete_domain(&self, list: DomainList, domain: &str) -> ApiResult<()> {
        self.call_unit(list.endpoint(Action::Delete), domain_options(Some(domain)))
            .await
    }

    /// Remove every entry from `list`.
    ///
    /// # Errors
    ///
    /// Dispatcher errors.
    pub async fn flush_domains(&self, list: DomainList) -> ApiResult<()> {
        self.call_unit(list.endpoint(Action::Flush), ApiCallOptions::new())
            .await
    }
}
