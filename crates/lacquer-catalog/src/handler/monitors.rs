//! Health monitoring handlers.
//!
//! The health endpoint is public so the booking backend and load
//! balancers can probe it without credentials.

use std::collections::HashMap;
use std::time::Instant;

use axum::extract::State;
use axum::http::StatusCode;
use jiff::Timestamp;
use lacquer_client::DirectoryClient;
use lacquer_core::ServiceHealth;
use lacquer_postgres::PgClient;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use utoipa_axum::router::OpenApiRouter;
use utoipa_axum::routes;

use crate::extract::Json;
use crate::handler::Result;
use crate::service::ServiceState;

/// Tracing target for monitor operations.
const TRACING_TARGET: &str = "lacquer_catalog::handler::monitors";

/// Response for the health endpoint.
#[must_use]
#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct HealthResponse {
    pub is_healthy: bool,
    #[schema(value_type = String)]
    pub checked_at: Timestamp,
    /// Probe result per dependency, keyed by dependency name.
    #[schema(value_type = Object)]
    pub dependencies: HashMap<String, ServiceHealth>,
}

/// Probes the database by checking out a pooled connection.
async fn probe_postgres(pg_client: &PgClient) -> ServiceHealth {
    let started = Instant::now();
    match pg_client.get_connection().await {
        Ok(_) => ServiceHealth::healthy().with_response_time(started.elapsed()),
        Err(error) => {
            tracing::warn!(
                target: TRACING_TARGET,
                error = %error,
                "postgres health probe failed",
            );
            ServiceHealth::unhealthy(error.to_string())
        }
    }
}

/// Probes the booking backend through its health endpoint.
///
/// Reads keep working without the backend, its loss only disables
/// writes, so an unreachable backend degrades rather than fails.
async fn probe_backend(directory_client: &DirectoryClient) -> ServiceHealth {
    let started = Instant::now();
    match directory_client.ping().await {
        Ok(()) => ServiceHealth::healthy().with_response_time(started.elapsed()),
        Err(error) => {
            tracing::warn!(
                target: TRACING_TARGET,
                error = %error,
                "backend health probe failed",
            );
            ServiceHealth::degraded(error.to_string())
        }
    }
}

/// Reports the health of the catalog and its dependencies.
#[tracing::instrument(skip_all)]
#[utoipa::path(
    get, path = "/health", tag = "health",
    responses(
        (
            status = OK,
            description = "Catalog is operational",
            body = HealthResponse,
        ),
        (
            status = SERVICE_UNAVAILABLE,
            description = "Catalog cannot serve requests",
            body = HealthResponse,
        ),
    ),
)]
async fn health_status(
    State(pg_client): State<PgClient>,
    State(directory_client): State<DirectoryClient>,
) -> Result<(StatusCode, Json<HealthResponse>)> {
    let postgres = probe_postgres(&pg_client).await;
    let backend = probe_backend(&directory_client).await;

    let is_healthy = postgres.status.is_operational() && backend.status.is_operational();
    let status_code = if is_healthy {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    tracing::debug!(
        target: TRACING_TARGET,
        is_healthy,
        postgres = ?postgres.status,
        backend = ?backend.status,
        "health status checked",
    );

    let mut dependencies = HashMap::new();
    dependencies.insert("postgres".to_owned(), postgres);
    dependencies.insert("backend".to_owned(), backend);

    let response = HealthResponse {
        is_healthy,
        checked_at: Timestamp::now(),
        dependencies,
    };
    Ok((status_code, Json(response)))
}

/// Returns a [`Router`] with all health monitoring routes.
///
/// [`Router`]: axum::routing::Router
pub fn routes() -> OpenApiRouter<ServiceState> {
    OpenApiRouter::new().routes(routes!(health_status))
}
