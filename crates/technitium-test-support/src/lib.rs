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

//! Shared test helpers used across unit and integration suites.
//! Layout: fixtures.rs (temporary config homes, env lists), envelopes.rs (API response bodies).

pub mod envelopes;
pub mod fixtures;
