#![forbid(unsafe_code)]
#![warn(
    unused,
    unused_imports,
    unreachable_pub,
    clippy::all,
    clippy::pedantic,
    rustdoc::broken_intra_doc_links,
    missing_docs
)]
#![deny(unused_must_use)]

//! Typed dispatcher for the Technitium DNS Server HTTP API.
//!
//! Layout:
//! - `catalog.rs`: static endpoint table and lookup
//! - `session.rs`: current token and its provenance
//! - `request.rs`: call options, query encoding, body encoding
//! - `response.rs`: decoding and envelope classification
//! - `client.rs`: `ApiClient::call` with timeout and cancellation
//! - `operations/`: typed wrappers grouped by API area
//! - `error.rs`: `ApiError` taxonomy

pub mod catalog;
pub mod client;
pub mod error;
pub mod operations;
pub mod request;
pub mod response;
pub mod session;

pub use catalog::{EndpointDefinition, HttpMethod, list_ids, lookup};
pub use client::{ApiClient, ClientOptions, DEFAULT_TIMEOUT, PreparedRequest};
pub use error::{ApiError, ApiResult};
pub use operations::{
    Credentials, DomainList, LoginResponse, RecordQuery, RecordSpec, ResolveQuery, StatsRange,
};
pub use request::{ApiCallOptions, Query, QueryValue, RequestBody, ResponseKind};
pub use response::{ApiCallResult, Payload, ResponseMeta};
pub use session::{SessionState, SessionTokenSnapshot, TokenSource};
