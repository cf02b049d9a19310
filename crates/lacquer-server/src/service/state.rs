//! Application state and dependency injection.

use lacquer_client::CatalogClient;
use lacquer_postgres::PgClient;

use crate::service::{AuthKeys, PasswordHasher, ServiceConfig};

/// Application state.
///
/// Used for the [`State`] extraction (dependency injection).
///
/// [`State`]: axum::extract::State
#[must_use = "state does nothing unless you use it"]
#[derive(Clone)]
pub struct ServiceState {
    // External services:
    pg_client: PgClient,
    catalog_client: CatalogClient,

    // Internal services:
    auth_keys: AuthKeys,
    password_hasher: PasswordHasher,
}

impl ServiceState {
    /// Initializes application state from configuration.
    ///
    /// Connects to all external services and loads required resources.
    pub async fn from_config(config: &ServiceConfig) -> anyhow::Result<Self> {
        let service_state = Self {
            pg_client: config.connect_postgres().await?,
            catalog_client: config.catalog_client()?,

            auth_keys: config.auth_keys()?,
            password_hasher: config.password_hasher(),
        };

        Ok(service_state)
    }

    /// Builds state around an existing database client.
    ///
    /// Used by tests that manage their own pool and migrations.
    pub fn with_pg_client(config: &ServiceConfig, pg_client: PgClient) -> anyhow::Result<Self> {
        Ok(Self {
            pg_client,
            catalog_client: config.catalog_client()?,
            auth_keys: config.auth_keys()?,
            password_hasher: config.password_hasher(),
        })
    }
}

macro_rules! impl_di {
    ($($f:ident: $t:ty),+) => {$(
        impl axum::extract::FromRef<ServiceState> for $t {
            fn from_ref(state: &ServiceState) -> Self {
                state.$f.clone()
            }
        }
    )+};
}

// External services:
impl_di!(pg_client: PgClient);
impl_di!(catalog_client: CatalogClient);

// Internal services:
impl_di!(auth_keys: AuthKeys);
impl_di!(password_hasher: PasswordHasher);
