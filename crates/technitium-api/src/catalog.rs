//! Static catalog of remote endpoints.
//!
//! # Design
//! - One immutable table; identifiers are case-sensitive and unique.
//! - Lookup goes through a lazily built index over the table.

use std::collections::HashMap;
use std::fmt::{self, Display, Formatter};

use once_cell::sync::Lazy;

use crate::error::{ApiError, ApiResult};

/// HTTP verb used by an endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HttpMethod {
    /// `GET`
    Get,
    /// `POST`
    Post,
}

impl HttpMethod {
    /// Upper-case verb.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Get => "GET",
            Self::Post => "POST",
        }
    }

    pub(crate) const fn to_reqwest(self) -> reqwest::Method {
        match self {
            Self::Get => reqwest::Method::GET,
            Self::Post => reqwest::Method::POST,
        }
    }

    /// Parse a verb case-insensitively.
    #[must_use]
    pub fn parse(value: &str) -> Option<Self> {
        if value.eq_ignore_ascii_case("get") {
            Some(Self::Get)
        } else if value.eq_ignore_ascii_case("post") {
            Some(Self::Post)
        } else {
            None
        }
    }
}

impl Display for HttpMethod {
    fn fmt(&self, formatter: &mut Formatter<'_>) -> fmt::Result {
        formatter.write_str(self.as_str())
    }
}

/// One remote operation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EndpointDefinition {
    /// Stable identifier (e.g. `zones.records.get`).
    pub id: &'static str,
    /// HTTP verb.
    pub method: HttpMethod,
    /// Path appended to the configured base URL.
    pub path: &'static str,
    /// Query parameters applied before caller-supplied ones.
    pub default_query: &'static [(&'static str, &'static str)],
    /// Whether a `token` query parameter must be attached.
    pub requires_token: bool,
}

const fn get(id: &'static str, path: &'static str) -> EndpointDefinition {
    EndpointDefinition {
        id,
        method: HttpMethod::Get,
        path,
        default_query: &[],
        requires_token: true,
    }
}

const fn post(id: &'static str, path: &'static str) -> EndpointDefinition {
    EndpointDefinition {
        id,
        method: HttpMethod::Post,
        path,
        default_query: &[],
        requires_token: true,
    }
}

const fn public(mut endpoint: EndpointDefinition) -> EndpointDefinition {
    endpoint.requires_token = false;
    endpoint
}

const fn with_defaults(
    mut endpoint: EndpointDefinition,
    defaults: &'static [(&'static str, &'static str)],
) -> EndpointDefinition {
    endpoint.default_query = defaults;
    endpoint
}

static ENDPOINTS: &[EndpointDefinition] = &[
    // user & session
    with_defaults(
        public(get("user.login", "/api/user/login")),
        &[("includeInfo", "true")],
    ),
    public(get("user.createToken", "/api/user/createToken")),
    get("user.logout", "/api/user/logout"),
    get("user.session.get", "/api/user/session/get"),
    get("user.session.delete", "/api/user/session/delete"),
    get("user.changePassword", "/api/user/changePassword"),
    get("user.profile.get", "/api/user/profile/get"),
    get("user.checkForUpdate", "/api/user/checkForUpdate"),
    // dashboard
    with_defaults(
        get("dashboard.stats.get", "/api/dashboard/stats/get"),
        &[("type", "LastHour"), ("utc", "true")],
    ),
    with_defaults(
        get("dashboard.stats.getTop", "/api/dashboard/stats/getTop"),
        &[("type", "LastHour"), ("statsType", "TopClients"), ("limit", "100")],
    ),
    get("dashboard.stats.deleteAll", "/api/dashboard/stats/deleteAll"),
    // zones
    get("zones.list", "/api/zones/list"),
    with_defaults(
        get("zones.create", "/api/zones/create"),
        &[("type", "Primary")],
    ),
    get("zones.delete", "/api/zones/delete"),
    get("zones.enable", "/api/zones/enable"),
    get("zones.disable", "/api/zones/disable"),
    get("zones.options.get", "/api/zones/options/get"),
    get("zones.export", "/api/zones/export"),
    with_defaults(
        post("zones.import", "/api/zones/import"),
        &[("overwrite", "true")],
    ),
    with_defaults(
        get("zones.records.get", "/api/zones/records/get"),
        &[("listZone", "false")],
    ),
    get("zones.records.add", "/api/zones/records/add"),
    get("zones.records.update", "/api/zones/records/update"),
    get("zones.records.delete", "/api/zones/records/delete"),
    // cache
    get("cache.list", "/api/cache/list"),
    get("cache.delete", "/api/cache/delete"),
    get("cache.flush", "/api/cache/flush"),
    // allowed zones
    get("allowed.list", "/api/allowed/list"),
    get("allowed.add", "/api/allowed/add"),
    get("allowed.delete", "/api/allowed/delete"),
    get("allowed.flush", "/api/allowed/flush"),
    get("allowed.export", "/api/allowed/export"),
    // blocked zones
    get("blocked.list", "/api/blocked/list"),
    get("blocked.add", "/api/blocked/add"),
    get("blocked.delete", "/api/blocked/delete"),
    get("blocked.flush", "/api/blocked/flush"),
    get("blocked.export", "/api/blocked/export"),
    // apps
    get("apps.list", "/api/apps/list"),
    get("apps.listStoreApps", "/api/apps/listStoreApps"),
    // dns client
    with_defaults(
        get("dnsClient.resolve", "/api/dnsClient/resolve"),
        &[("server", "this-server"), ("type", "A"), ("protocol", "Udp")],
    ),
    // settings
    get("settings.get", "/api/settings/get"),
    post("settings.set", "/api/settings/set"),
    get(
        "settings.forceUpdateBlockLists",
        "/api/settings/forceUpdateBlockLists",
    ),
    get(
        "settings.temporaryDisableBlocking",
        "/api/settings/temporaryDisableBlocking",
    ),
    // dhcp
    get("dhcp.leases.list", "/api/dhcp/leases/list"),
    get("dhcp.scopes.list", "/api/dhcp/scopes/list"),
    // logs
    get("logs.list", "/api/logs/list"),
    get("logs.download", "/api/logs/download"),
    get("logs.delete", "/api/logs/delete"),
    get("logs.deleteAll", "/api/logs/deleteAll"),
    // administration
    get("admin.sessions.list", "/api/admin/sessions/list"),
];

static INDEX: Lazy<HashMap<&'static str, &'static EndpointDefinition>> = Lazy::new(|| {
    let mut index = HashMap::with_capacity(ENDPOINTS.len());
    for endpoint in ENDPOINTS {
        let previous = index.insert(endpoint.id, endpoint);
        debug_assert!(previous.is_none(), "duplicate endpoint id {}", endpoint.id);
    }
    index
});

/// Resolve an endpoint by identifier.
///
/// # Errors
///
/// Returns [`ApiError::NotFound`] (carrying every known identifier) when
/// `id` is not registered.
pub fn lookup(id: &str) -> ApiResult<&'static EndpointDefinition> {
    INDEX.get(id).copied().ok_or_else(|| ApiError::NotFound {
        id: id.to_string(),
        known: list_ids(),
    })
}

/// Every registered identifier, sorted lexicographically.
#[must_use]
pub fn list_ids() -> Vec<&'static str> {
    let mut ids: Vec<&'static str> = ENDPOINTS.iter().map(|endpoint| endpoint.id).collect();
    ids.sort_unstable();
    ids
}

/// Every registered endpoint, sorted by identifier.
#[must_use]
pub fn all() -> Vec<&'static EndpointDefinition> {
    let mut endpoints: Vec<_> = ENDPOINTS.iter().collect();
    endpoints.sort_unstable_by_key(|endpoint| endpoint.id);
    endpoints
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn identifiers_are_unique() {
        let unique: HashSet<_> = ENDPOINTS.iter().map(|endpoint| endpoint.id).collect();
        assert_eq!(unique.len(), ENDPOINTS.len());
    }

    #[test]
    fn lookup_is_case_sensitive() {
        assert!(lookup("zones.list").is_ok());
        assert!(matches!(
            lookup("Zones.List"),
            Err(ApiError::NotFound { id, .. }) if id == "Zones.List"
        ));
    }

    #[test]
    fn not_found_lists_sorted_identifiers() {
        let Err(ApiError::NotFound { known, .. }) = lookup("zones.nope") else {
            panic!("expected NotFound");
        };
        let mut sorted = known.clone();
        sorted.sort_unstable();
        assert_eq!(known, sorted);
        assert_eq!(known.len(), ENDPOINTS.len());
        assert!(known.contains(&"dnsClient.resolve"));
    }

    #[test]
    fn login_is_public_and_carries_defaults() {
        let endpoint = lookup("user.login").expect("login endpoint");
        assert!(!endpoint.requires_token);
        assert_eq!(endpoint.method, HttpMethod::Get);
        assert_eq!(endpoint.default_query, &[("includeInfo", "true")]);
        assert!(lookup("zones.list").expect("zones.list").requires_token);
    }

    #[test]
    fn paths_are_absolute_api_paths() {
        for endpoint in all() {
            assert!(endpoint.path.starts_with("/api/"), "{}", endpoint.id);
        }
    }

    #[test]
    fn methods_parse_case_insensitively() {
        assert_eq!(HttpMethod::parse("post"), Some(HttpMethod::Post));
        assert_eq!(HttpMethod::parse("GET"), Some(HttpMethod::Get));
        assert_eq!(HttpMethod::parse("PATCH"), None);
        assert_eq!(HttpMethod::Post.to_string(), "POST");
    }
}
