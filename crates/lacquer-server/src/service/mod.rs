//! Application state and dependency injection.

mod auth_keys;
mod config;
mod password_hasher;
mod state;

pub use crate::service::auth_keys::{AuthKeys, MIN_SECRET_LEN};
pub use crate::service::config::{ServiceConfig, ServiceConfigBuilder};
pub use crate::service::password_hasher::PasswordHasher;
pub use crate::service::state::ServiceState;
