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

//! Logging primitives shared across the technitium CLI workspace.
//!
//! Layout: `init.rs` (subscriber installation and format selection),
//! `error.rs` (setup failures).

pub mod error;
pub mod init;

pub use error::{Result, TelemetryError};
pub use init::{DEFAULT_LOG_LEVEL, LogFormat, LoggingConfig, init_logging};
