//! Request extractors for the catalog handlers.

mod identity;
mod reject;

pub use identity::RemoteIdentity;
pub use reject::{Json, Path, Query, ValidateJson};
