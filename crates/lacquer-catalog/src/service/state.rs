//! Application state and dependency injection.

use lacquer_client::DirectoryClient;
use lacquer_postgres::PgClient;

use crate::service::{IdentityResolver, ModuleGate, ServiceConfig};

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
    directory_client: DirectoryClient,

    // Internal services:
    identity_resolver: IdentityResolver,
    module_gate: ModuleGate,
}

impl ServiceState {
    /// Initializes application state from configuration.
    ///
    /// Connects to all external services and loads required resources.
    pub async fn from_config(config: &ServiceConfig) -> anyhow::Result<Self> {
        let directory_client = config.directory_client()?;

        let service_state = Self {
            pg_client: config.connect_postgres().await?,
            directory_client: directory_client.clone(),

            identity_resolver: IdentityResolver::new(config.auth_keys()?, directory_client),
            module_gate: ModuleGate::new(config.authz_client()?, config.migration_cutover),
        };

        Ok(service_state)
    }

    /// Builds state around an existing database client.
    ///
    /// Used by tests that manage their own pool and migrations.
    pub fn with_pg_client(config: &ServiceConfig, pg_client: PgClient) -> anyhow::Result<Self> {
        let directory_client = config.directory_client()?;

        Ok(Self {
            pg_client,
            directory_client: directory_client.clone(),
            identity_resolver: IdentityResolver::new(config.auth_keys()?, directory_client),
            module_gate: ModuleGate::new(config.authz_client()?, config.migration_cutover),
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
impl_di!(directory_client: DirectoryClient);

// Internal services:
impl_di!(identity_resolver: IdentityResolver);
impl_di!(module_gate: ModuleGate);
