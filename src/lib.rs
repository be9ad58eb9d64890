//! # Easemob Client Library
//!
//! Wraps the Easemob instant-messaging REST API: client-credentials tokens
//! cached for a short fixed TTL, a single HTTP adapter that returns either
//! parsed JSON or raw bytes, and a declarative table of provider endpoints.
//!
//! Modules:
//! - `config`: credentials, settings and YAML loading
//! - `cache`: token cache abstraction and in-memory implementation
//! - `transport`: HTTP request/response adapter
//! - `auth`: token manager (client-credentials grant)
//! - `resources`: endpoint table, generic executor, messages and files
//! - `cursor`: pagination cursor bookmarks on disk

pub mod auth;
pub mod cache;
pub mod config;
pub mod cursor;
pub mod error;
pub mod helpers;
pub mod observability;
pub mod resources;
pub mod transport;
pub mod utils;

#[cfg(test)]
mod tests;

pub use crate::auth::token_manager::TokenManager;
pub use crate::config::credentials::Credentials;
pub use crate::config::settings::{ClientConfig, Settings};
pub use crate::error::{EasemobError, ErrorKind, Result};
pub use crate::resources::client::EasemobClient;
pub use crate::resources::endpoint::{Call, Endpoint};
pub use crate::transport::request::{ApiRequest, Payload, Verb};
pub use crate::transport::response::ApiResult;
