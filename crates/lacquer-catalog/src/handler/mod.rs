//! All `axum::`[`Router`]s with related `axum::`[`Handler`]s.
//!
//! Every route is mounted without a router-level authentication layer.
//! Reads are open by design and writes are authorized inside each
//! handler by the module gate, which resolves the caller's identity
//! and role permissions against the booking backend.
//!
//! [`Router`]: axum::routing::Router
//! [`Handler`]: axum::handler::Handler

mod error;
mod monitors;
mod request;
mod response;
mod services;

use axum::response::{IntoResponse, Response};
use utoipa_axum::router::OpenApiRouter;

pub use crate::handler::error::{Error, ErrorKind, Result};
pub use crate::handler::request::PaginationParams;
pub(crate) use crate::handler::response::ErrorResponse;
use crate::service::ServiceState;

#[inline]
async fn handler() -> Response {
    ErrorKind::NotFound.into_response()
}

/// Returns an [`OpenApiRouter`] with all routes.
pub fn openapi_routes() -> OpenApiRouter<ServiceState> {
    OpenApiRouter::new()
        .merge(services::routes())
        .merge(monitors::routes())
        .fallback(handler)
}

#[cfg(test)]
mod test {
    use axum_test::TestServer;
    use lacquer_postgres::PgConfig;
    use serde_json::json;
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
        create_test_server_with_state(openapi_routes(), state)
    }

    #[tokio::test]
    async fn unknown_routes_answer_not_found() -> anyhow::Result<()> {
        let server = create_test_server()?;

        let response = server.get("/no-such-route").await;
        response.assert_status_not_found();

        Ok(())
    }

    #[tokio::test]
    async fn writes_without_a_token_are_unauthorized() -> anyhow::Result<()> {
        let server = create_test_server()?;

        // The gate denies before the handler touches the database.
        let response = server
            .post("/services")
            .json(&json!({ "name": "Gel Manicure", "price": "35.00" }))
            .await;
        response.assert_status_unauthorized();

        let response = server
            .delete(&format!("/services/{}", uuid::Uuid::nil()))
            .await;
        response.assert_status_unauthorized();

        Ok(())
    }

    #[tokio::test]
    async fn writes_with_a_garbage_token_are_unauthorized() -> anyhow::Result<()> {
        let server = create_test_server()?;

        let response = server
            .post("/services")
            .authorization_bearer("not-a-jwt")
            .json(&json!({ "name": "Gel Manicure", "price": "35.00" }))
            .await;
        response.assert_status_unauthorized();

        Ok(())
    }
}
