#![forbid(unsafe_code)]
#![cfg_attr(docsrs, feature(doc_cfg))]
#![doc = include_str!("../README.md")]

pub mod extract;
pub mod handler;
pub mod service;

/// Tracing target for authorization decisions.
pub const TRACING_TARGET_AUTHORIZATION: &str = "lacquer_catalog::authorization";

pub use crate::handler::{Error, ErrorKind, Result};
