#![forbid(unsafe_code)]
#![cfg_attr(docsrs, feature(doc_cfg))]
#![doc = include_str!("../README.md")]

mod error;
mod health;

pub use error::{BoxedError, Error, ErrorKind, Result};
pub use health::{ServiceHealth, ServiceStatus};

/// Common module tags gating access to resource families.
///
/// These are the canonical values stored in the `permissions.module`
/// column and exchanged over the modules-by-role endpoint. The set is
/// open: a permission row may carry any tag, these constants only cover
/// the resources this workspace serves.
pub mod modules {
    /// Role administration.
    pub const ROLES: &str = "roles";
    /// Service catalog administration.
    pub const SERVICES: &str = "services";
    /// Appointment management.
    pub const APPOINTMENTS: &str = "appointments";
    /// Client profile management.
    pub const CLIENTS: &str = "clients";
    /// Staff profile management.
    pub const STAFF: &str = "staff";
}
