//! Enhanced HTTP request extractors with improved error handling and validation.
//!
//! Drop-in replacements for the standard Axum extractors that return the
//! crate's [`Error`] type with user-friendly messages, plus the JWT
//! authentication extractors.
//!
//! # Extractor Categories
//!
//! ## Authentication
//!
//! - [`AuthHeader`] - JWT token extraction and validation
//! - [`AuthClaims`] - JWT claims with the account's role assignment
//! - [`AuthState`] - Complete authentication state with database verification
//!
//! ## Request Data Extraction
//!
//! - [`Json`] - Enhanced JSON deserialization with better error messages
//! - [`ValidateJson`] - JSON extraction with automatic validation
//! - [`Path`] - Path parameter extraction with detailed error context
//! - [`Query`] - Query parameter extraction with enhanced error messages
//!
//! [`Error`]: crate::handler::Error

// Authentication
pub mod auth;

// Request Data Extraction
pub mod reject;

pub use crate::TRACING_TARGET_AUTHENTICATION;
pub use crate::extract::auth::{AuthClaims, AuthHeader, AuthState};
pub use crate::extract::reject::{Json, Path, Query, ValidateJson};
