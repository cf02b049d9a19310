use axum::extract::State;
use axum::http::{Method, StatusCode};
use bigdecimal::BigDecimal;
use jiff::Timestamp;
use lacquer_core::modules;
use lacquer_postgres::PgClient;
use lacquer_postgres::model::{NewSalonService, SalonService, UpdateSalonService};
use lacquer_postgres::query::SalonServiceRepository;
use lacquer_postgres::types::EntityStatus;
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use utoipa_axum::router::OpenApiRouter;
use utoipa_axum::routes;
use uuid::Uuid;
use validator::Validate;

use crate::extract::{Json, Path, Query, RemoteIdentity, ValidateJson};
use crate::handler::request::PaginationParams;
use crate::handler::{ErrorKind, ErrorResponse, Result};
use crate::service::{GateMemo, ModuleGate, ServiceState};

/// Tracing target for catalog service operations.
const TRACING_TARGET: &str = "lacquer_catalog::handler::services";

/// `Path` param for `{serviceId}` handlers.
#[must_use]
#[derive(Debug, Serialize, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
pub struct ServicePathParams {
    /// Unique identifier of the catalog service.
    pub service_id: Uuid,
}

/// Catalog service representation returned by all service handlers.
#[must_use]
#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SalonServiceResponse {
    pub id: Uuid,
    pub name: String,
    pub description: String,
    #[schema(value_type = String, example = "35.00")]
    pub price: BigDecimal,
    pub duration_minutes: i32,
    #[schema(value_type = String, example = "active")]
    pub status: EntityStatus,
    #[schema(value_type = String)]
    pub created_at: Timestamp,
    #[schema(value_type = String)]
    pub updated_at: Timestamp,
}

impl From<SalonService> for SalonServiceResponse {
    fn from(service: SalonService) -> Self {
        Self {
            id: service.id,
            name: service.name,
            description: service.description,
            price: service.price,
            duration_minutes: service.duration_minutes,
            status: service.status,
            created_at: service.created_at.into(),
            updated_at: service.updated_at.into(),
        }
    }
}

/// Rejects negative prices before they reach the database.
fn ensure_non_negative(price: &BigDecimal) -> Result<()> {
    if price < &BigDecimal::from(0) {
        return Err(ErrorKind::BadRequest
            .with_message("Price must not be negative")
            .with_resource("service"));
    }
    Ok(())
}

/// Request payload for creating a catalog service.
#[must_use]
#[derive(Debug, Serialize, Deserialize, ToSchema, Validate)]
#[serde(rename_all = "camelCase")]
struct CreateServiceRequest {
    #[validate(length(min = 2, max = 64))]
    pub name: String,
    #[validate(length(max = 1024))]
    pub description: Option<String>,
    #[schema(value_type = String, example = "35.00")]
    pub price: BigDecimal,
    #[validate(range(min = 1, max = 480))]
    pub duration_minutes: Option<i32>,
}

/// Creates a new catalog service.
#[tracing::instrument(skip_all)]
#[utoipa::path(
    post, path = "/services", tag = "services",
    request_body(
        content = CreateServiceRequest,
        description = "New catalog service",
        content_type = "application/json",
    ),
    responses(
        (
            status = CONFLICT,
            description = "Service name already taken",
            body = ErrorResponse,
        ),
        (
            status = CREATED,
            description = "Service created",
            body = SalonServiceResponse,
        ),
    ),
)]
async fn create_service(
    State(pg_client): State<PgClient>,
    State(module_gate): State<ModuleGate>,
    identity: Option<RemoteIdentity>,
    ValidateJson(request): ValidateJson<CreateServiceRequest>,
) -> Result<(StatusCode, Json<SalonServiceResponse>)> {
    let mut memo = GateMemo::default();
    module_gate
        .evaluate(&Method::POST, modules::SERVICES, identity.as_ref(), &mut memo)
        .await
        .into_result()?;

    ensure_non_negative(&request.price)?;

    let mut conn = pg_client.get_connection().await?;
    let new_service = NewSalonService {
        name: request.name,
        description: request.description,
        price: request.price,
        duration_minutes: request.duration_minutes,
        status: None,
    };
    let service = conn.create_salon_service(new_service).await?;

    tracing::info!(
        target: TRACING_TARGET,
        service_id = service.id.to_string(),
        name = service.name,
        "catalog service created",
    );

    Ok((StatusCode::CREATED, Json(service.into())))
}

/// `Query` params for listing catalog services.
#[must_use]
#[derive(Debug, Default, Serialize, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
struct ListServicesParams {
    /// Restricts the listing to one status.
    #[param(value_type = Option<String>, example = "active")]
    pub status: Option<EntityStatus>,
    /// Maximum number of records to return, capped at 200.
    pub limit: Option<i64>,
    /// Number of records to skip.
    pub offset: Option<i64>,
}

/// Response for listing catalog services.
#[must_use]
#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
struct ListServicesResponse {
    pub services: Vec<SalonServiceResponse>,
}

/// Returns catalog services ordered by name, optionally filtered by status.
#[tracing::instrument(skip_all)]
#[utoipa::path(
    get, path = "/services", tag = "services",
    params(ListServicesParams),
    responses(
        (
            status = OK,
            description = "Services listed",
            body = ListServicesResponse,
        ),
    ),
)]
async fn list_services(
    State(pg_client): State<PgClient>,
    Query(params): Query<ListServicesParams>,
) -> Result<(StatusCode, Json<ListServicesResponse>)> {
    let mut conn = pg_client.get_connection().await?;

    let pagination = PaginationParams {
        limit: params.limit,
        offset: params.offset,
    }
    .into();
    let services = match params.status {
        Some(status) => conn.list_salon_services_by_status(status, pagination).await?,
        None => conn.list_salon_services(pagination).await?,
    };

    let response = ListServicesResponse {
        services: services.into_iter().map(SalonServiceResponse::from).collect(),
    };

    Ok((StatusCode::OK, Json(response)))
}

/// Gets a catalog service by its service ID.
///
/// Also consumed by the booking backend to price appointment line
/// items, so the response shape stays stable.
#[tracing::instrument(skip_all)]
#[utoipa::path(
    get, path = "/services/{serviceId}", tag = "services",
    params(ServicePathParams),
    responses(
        (
            status = NOT_FOUND,
            description = "Service not found",
            body = ErrorResponse,
        ),
        (
            status = OK,
            description = "Service details",
            body = SalonServiceResponse,
        ),
    ),
)]
async fn read_service(
    State(pg_client): State<PgClient>,
    Path(path_params): Path<ServicePathParams>,
) -> Result<(StatusCode, Json<SalonServiceResponse>)> {
    let mut conn = pg_client.get_connection().await?;

    let Some(service) = conn.find_salon_service_by_id(path_params.service_id).await? else {
        return Err(ErrorKind::NotFound.with_resource("service"));
    };

    Ok((StatusCode::OK, Json(service.into())))
}

/// Request payload to update a catalog service.
#[must_use]
#[derive(Debug, Serialize, Deserialize, ToSchema, Validate)]
#[serde(rename_all = "camelCase")]
struct UpdateServiceRequest {
    #[validate(length(min = 2, max = 64))]
    pub name: Option<String>,
    #[validate(length(max = 1024))]
    pub description: Option<String>,
    #[schema(value_type = Option<String>, example = "40.00")]
    pub price: Option<BigDecimal>,
    #[validate(range(min = 1, max = 480))]
    pub duration_minutes: Option<i32>,
    #[schema(value_type = Option<String>, example = "inactive")]
    pub status: Option<EntityStatus>,
}

/// Updates a catalog service by the service ID.
#[tracing::instrument(skip_all)]
#[utoipa::path(
    patch, path = "/services/{serviceId}", tag = "services",
    params(ServicePathParams),
    request_body(
        content = UpdateServiceRequest,
        description = "Service changes",
        content_type = "application/json",
    ),
    responses(
        (
            status = NOT_FOUND,
            description = "Service not found",
            body = ErrorResponse,
        ),
        (
            status = OK,
            description = "Service updated",
            body = SalonServiceResponse,
        ),
    ),
)]
async fn update_service(
    State(pg_client): State<PgClient>,
    State(module_gate): State<ModuleGate>,
    identity: Option<RemoteIdentity>,
    Path(path_params): Path<ServicePathParams>,
    ValidateJson(request): ValidateJson<UpdateServiceRequest>,
) -> Result<(StatusCode, Json<SalonServiceResponse>)> {
    let mut memo = GateMemo::default();
    module_gate
        .evaluate(&Method::PATCH, modules::SERVICES, identity.as_ref(), &mut memo)
        .await
        .into_result()?;

    if let Some(price) = &request.price {
        ensure_non_negative(price)?;
    }

    let mut conn = pg_client.get_connection().await?;
    if conn
        .find_salon_service_by_id(path_params.service_id)
        .await?
        .is_none()
    {
        return Err(ErrorKind::NotFound.with_resource("service"));
    }

    let updates = UpdateSalonService {
        name: request.name,
        description: request.description,
        price: request.price,
        duration_minutes: request.duration_minutes,
        status: request.status,
        updated_at: Some(Timestamp::now().into()),
    };
    let service = conn
        .update_salon_service(path_params.service_id, updates)
        .await?;

    tracing::info!(
        target: TRACING_TARGET,
        service_id = path_params.service_id.to_string(),
        "catalog service updated",
    );

    Ok((StatusCode::OK, Json(service.into())))
}

/// Flips a catalog service between active and inactive.
#[tracing::instrument(skip_all)]
#[utoipa::path(
    patch, path = "/services/{serviceId}/toggle-status", tag = "services",
    params(ServicePathParams),
    responses(
        (
            status = NOT_FOUND,
            description = "Service not found",
            body = ErrorResponse,
        ),
        (
            status = OK,
            description = "Service status toggled",
            body = SalonServiceResponse,
        ),
    ),
)]
async fn toggle_service_status(
    State(pg_client): State<PgClient>,
    State(module_gate): State<ModuleGate>,
    identity: Option<RemoteIdentity>,
    Path(path_params): Path<ServicePathParams>,
) -> Result<(StatusCode, Json<SalonServiceResponse>)> {
    let mut memo = GateMemo::default();
    module_gate
        .evaluate(&Method::PATCH, modules::SERVICES, identity.as_ref(), &mut memo)
        .await
        .into_result()?;

    let mut conn = pg_client.get_connection().await?;
    let Some(service) = conn.find_salon_service_by_id(path_params.service_id).await? else {
        return Err(ErrorKind::NotFound.with_resource("service"));
    };

    let updates = UpdateSalonService {
        status: Some(service.status.toggled()),
        updated_at: Some(Timestamp::now().into()),
        ..Default::default()
    };
    let service = conn
        .update_salon_service(path_params.service_id, updates)
        .await?;

    tracing::info!(
        target: TRACING_TARGET,
        service_id = path_params.service_id.to_string(),
        status = service.status.to_string(),
        "catalog service status toggled",
    );

    Ok((StatusCode::OK, Json(service.into())))
}

/// Response returned when a delete deactivates instead of removing.
#[must_use]
#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
struct DeactivatedServiceResponse {
    pub id: Uuid,
    pub message: String,
}

/// Deletes a catalog service.
///
/// An active service is deactivated instead of removed, so existing
/// line items keep resolving its name. Deleting it again while
/// inactive removes the row for good.
#[tracing::instrument(skip_all)]
#[utoipa::path(
    delete, path = "/services/{serviceId}", tag = "services",
    params(ServicePathParams),
    responses(
        (
            status = NOT_FOUND,
            description = "Service not found",
            body = ErrorResponse,
        ),
        (
            status = OK,
            description = "Active service deactivated",
            body = DeactivatedServiceResponse,
        ),
        (
            status = NO_CONTENT,
            description = "Inactive service removed",
        ),
    ),
)]
async fn delete_service(
    State(pg_client): State<PgClient>,
    State(module_gate): State<ModuleGate>,
    identity: Option<RemoteIdentity>,
    Path(path_params): Path<ServicePathParams>,
) -> Result<axum::response::Response> {
    use axum::response::IntoResponse;

    let mut memo = GateMemo::default();
    module_gate
        .evaluate(&Method::DELETE, modules::SERVICES, identity.as_ref(), &mut memo)
        .await
        .into_result()?;

    let mut conn = pg_client.get_connection().await?;
    let Some(service) = conn.find_salon_service_by_id(path_params.service_id).await? else {
        return Err(ErrorKind::NotFound.with_resource("service"));
    };

    if service.is_active() {
        let updates = UpdateSalonService {
            status: Some(EntityStatus::Inactive),
            updated_at: Some(Timestamp::now().into()),
            ..Default::default()
        };
        conn.update_salon_service(path_params.service_id, updates)
            .await?;

        tracing::info!(
            target: TRACING_TARGET,
            service_id = path_params.service_id.to_string(),
            "active catalog service deactivated instead of deleted",
        );

        let response = DeactivatedServiceResponse {
            id: path_params.service_id,
            message: "Service deactivated; delete again to remove it permanently".to_owned(),
        };
        return Ok((StatusCode::OK, Json(response)).into_response());
    }

    conn.delete_salon_service(path_params.service_id).await?;

    tracing::warn!(
        target: TRACING_TARGET,
        service_id = path_params.service_id.to_string(),
        "inactive catalog service deleted",
    );

    Ok(StatusCode::NO_CONTENT.into_response())
}

/// Returns a [`Router`] with all related routes.
///
/// [`Router`]: axum::routing::Router
pub fn routes() -> OpenApiRouter<ServiceState> {
    OpenApiRouter::new()
        .routes(routes!(create_service, list_services))
        .routes(routes!(read_service, update_service, delete_service))
        .routes(routes!(toggle_service_status))
}
