#![forbid(unsafe_code)]
#![cfg_attr(docsrs, feature(doc_cfg))]
#![doc = include_str!("../README.md")]

/// Tracing target for upstream HTTP calls.
pub const TRACING_TARGET: &str = "lacquer_client";

mod authz;
mod catalog;
mod config;
mod directory;
mod error;

pub use authz::AuthzClient;
pub use catalog::{CatalogClient, RemoteService};
pub use config::{DEFAULT_TIMEOUT_SECS, HttpClientConfig};
pub use directory::{DirectoryClient, RemoteAccount};
pub use error::{ClientError, ClientResult};
