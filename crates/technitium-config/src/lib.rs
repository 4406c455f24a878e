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

//! Layered configuration for the technitium CLI.
//!
//! Layout: `model.rs` (typed sections, patches, per-section merges),
//! `defaults.rs` (embedded defaults), `validate.rs` (value coercion),
//! `env.rs` (environment override layer), `store.rs` (persisted TOML file),
//! `resolver.rs` (precedence pipeline and diagnostics).

pub mod defaults;
pub mod env;
pub mod error;
pub mod model;
pub mod resolver;
pub mod store;
pub mod validate;

pub use env::{ENV_PREFIX, ENV_SEPARATOR, EnvOverrides};
pub use error::{ConfigError, ConfigResult};
pub use model::{
    ApiPatch, ApiSettings, AppPatch, AppSettings, AuthPatch, AuthSettings, CliPatch, CliSettings,
    ConfigPatch, Configuration,
};
pub use resolver::{ConfigDiagnostic, ConfigResolver, Resolution};
pub use store::{ConfigStore, TokenStore};
