//! Application state and dependency injection.

mod auth_keys;
mod config;
mod identity_resolver;
mod module_gate;
mod state;
mod ttl_cache;

pub use crate::service::auth_keys::{AuthKeys, MIN_SECRET_LEN};
pub use crate::service::config::{ServiceConfig, ServiceConfigBuilder};
pub use crate::service::identity_resolver::IdentityResolver;
pub use crate::service::module_gate::{Decision, DenialReason, GateMemo, ModuleGate};
pub use crate::service::state::ServiceState;
pub use crate::service::ttl_cache::{DEFAULT_CACHE_TTL, TtlCache};
