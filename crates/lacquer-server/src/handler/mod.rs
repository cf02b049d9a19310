//! All `axum::`[`Router`]s with related `axum::`[`Handler`]s.
//!
//! Routes are split into a private set behind the authentication
//! middleware and a public set. The public set carries the login and
//! health endpoints plus the internal lookups consumed by the catalog
//! microservice.
//!
//! [`Router`]: axum::routing::Router
//! [`Handler`]: axum::handler::Handler

mod accounts;
mod appointment_services;
mod appointment_states;
mod appointments;
mod authentication;
mod error;
mod monitors;
mod permissions;
mod request;
mod response;
mod role_permissions;
mod roles;

use axum::middleware::from_fn_with_state;
use axum::response::{IntoResponse, Response};
use utoipa_axum::router::OpenApiRouter;

pub use crate::handler::error::{Error, ErrorKind, Result};
pub use crate::handler::request::PaginationParams;
pub(crate) use crate::handler::response::ErrorResponse;
use crate::middleware::require_authentication;
use crate::service::ServiceState;

#[inline]
async fn handler() -> Response {
    ErrorKind::NotFound.into_response()
}

/// Returns an [`OpenApiRouter`] with all private routes.
fn private_routes() -> OpenApiRouter<ServiceState> {
    OpenApiRouter::new()
        .merge(accounts::routes())
        .merge(roles::routes())
        .merge(permissions::routes())
        .merge(role_permissions::routes())
        .merge(appointment_states::routes())
        .merge(appointments::routes())
        .merge(appointment_services::routes())
}

/// Returns an [`OpenApiRouter`] with all public routes.
///
/// The internal routes are consumed by the catalog service over the
/// private network and carry no bearer token.
fn public_routes() -> OpenApiRouter<ServiceState> {
    OpenApiRouter::new()
        .merge(authentication::routes())
        .merge(monitors::routes())
        .merge(accounts::internal_routes())
        .merge(role_permissions::internal_routes())
}

/// Returns an [`OpenApiRouter`] with all routes.
pub fn openapi_routes(state: ServiceState) -> OpenApiRouter<ServiceState> {
    let require_authentication = from_fn_with_state(state, require_authentication);

    let private_router = private_routes().route_layer(require_authentication);
    let public_router = public_routes();

    OpenApiRouter::new()
        .merge(private_router)
        .merge(public_router)
        .fallback(handler)
}

#[cfg(test)]
mod test {
    use axum_test::TestServer;
    use lacquer_postgres::PgConfig;
    use utoipa_axum::router::OpenApiRouter;

    use crate::handler::openapi_routes;
    use crate::service::{ServiceConfig, ServiceState};

    /// Builds state around a lazy connection pool.
    ///
    /// No connection is established until a handler checks one out, so
    /// tests that never reach the database run without one.
    pub fn create_test_state() -> anyhow::Result<ServiceState> {
        let config = ServiceConfig::default();
        let pg_client = PgConfig::new(config.postgres_endpoint.clone())
            .with_connection_timeout_secs(1)
            .build()?;
        ServiceState::with_pg_client(&config, pg_client)
    }

    /// Returns a new [`TestServer`] with the given router and state.
    pub fn create_test_server_with_state(
        router: OpenApiRouter<ServiceState>,
        state: ServiceState,
    ) -> anyhow::Result<TestServer> {
        let app = router.with_state(state);
        let (app, _) = app.split_for_parts();
        let server = TestServer::new(app)?;
        Ok(server)
    }

    /// Returns a new [`TestServer`] with the default router and state.
    pub fn create_test_server() -> anyhow::Result<TestServer> {
        let state = create_test_state()?;
        let router = openapi_routes(state.clone());
        create_test_server_with_state(router, state)
    }

    #[tokio::test]
    async fn api_document_renders_status_fields_as_strings() -> anyhow::Result<()> {
        let state = create_test_state()?;
        let (_, api) = openapi_routes(state.clone()).with_state::<()>(state).split_for_parts();
        let document = serde_json::to_value(&api)?;

        let schemas = &document["components"]["schemas"];
        for schema in ["UpdateStateRequest", "UpdateRoleRequest"] {
            let status = &schemas[schema]["properties"]["status"];
            assert!(
                status.to_string().contains("string"),
                "{schema}.status should be documented as a string",
            );
        }

        Ok(())
    }

    #[tokio::test]
    async fn unknown_routes_answer_not_found() -> anyhow::Result<()> {
        let server = create_test_server()?;

        let response = server.get("/no-such-route").await;
        response.assert_status_not_found();

        Ok(())
    }

    #[tokio::test]
    async fn private_routes_require_a_token() -> anyhow::Result<()> {
        let server = create_test_server()?;

        let response = server.get("/roles").await;
        response.assert_status_unauthorized();

        let response = server.get("/appointments").await;
        response.assert_status_unauthorized();

        Ok(())
    }

    #[tokio::test]
    async fn internal_routes_skip_authentication() -> anyhow::Result<()> {
        let server = create_test_server()?;

        // Unknown role, public route: answers without a token.
        let response = server
            .get("/role-permissions/modules-by-role")
            .add_query_param("roleId", uuid::Uuid::nil().to_string())
            .await;
        assert_ne!(response.status_code().as_u16(), 401);

        Ok(())
    }
}
