//! Command handlers grouped by API area.

pub(crate) mod auth;
pub(crate) mod call;
pub(crate) mod config;
pub(crate) mod lists;
pub(crate) mod records;
pub(crate) mod server;
pub(crate) mod zones;
