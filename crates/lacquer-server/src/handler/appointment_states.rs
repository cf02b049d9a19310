use axum::extract::State;
use axum::http::StatusCode;
use jiff::Timestamp;
use lacquer_postgres::PgClient;
use lacquer_postgres::model::{AppointmentState, NewAppointmentState, UpdateAppointmentState};
use lacquer_postgres::query::AppointmentStateRepository;
use lacquer_postgres::types::EntityStatus;
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use utoipa_axum::router::OpenApiRouter;
use utoipa_axum::routes;
use uuid::Uuid;
use validator::Validate;

use crate::extract::{AuthState, Json, Path, Query, ValidateJson};
use crate::handler::request::PaginationParams;
use crate::handler::{ErrorKind, ErrorResponse, Result};
use crate::service::ServiceState;

/// Tracing target for workflow state operations.
const TRACING_TARGET: &str = "lacquer_server::handler::appointment_states";

/// `Path` param for `{stateId}` handlers.
#[must_use]
#[derive(Debug, Serialize, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
pub struct StatePathParams {
    /// Unique identifier of the workflow state.
    pub state_id: Uuid,
}

/// Workflow state representation returned by all state handlers.
#[must_use]
#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AppointmentStateResponse {
    pub id: Uuid,
    pub name: String,
    #[schema(value_type = String, example = "active")]
    pub status: EntityStatus,
    #[schema(value_type = String)]
    pub created_at: Timestamp,
    #[schema(value_type = String)]
    pub updated_at: Timestamp,
}

impl From<AppointmentState> for AppointmentStateResponse {
    fn from(state: AppointmentState) -> Self {
        Self {
            id: state.id,
            name: state.name,
            status: state.status,
            created_at: state.created_at.into(),
            updated_at: state.updated_at.into(),
        }
    }
}

/// Request payload for creating a workflow state.
#[must_use]
#[derive(Debug, Serialize, Deserialize, ToSchema, Validate)]
#[serde(rename_all = "camelCase")]
struct CreateStateRequest {
    #[validate(length(min = 2, max = 64))]
    pub name: String,
}

/// Creates a new workflow state.
#[tracing::instrument(skip_all)]
#[utoipa::path(
    post, path = "/appointment-states", tag = "appointment-states",
    request_body(
        content = CreateStateRequest,
        description = "New workflow state",
        content_type = "application/json",
    ),
    responses(
        (
            status = CONFLICT,
            description = "State name already taken",
            body = ErrorResponse,
        ),
        (
            status = CREATED,
            description = "State created",
            body = AppointmentStateResponse,
        ),
    ),
)]
async fn create_state(
    State(pg_client): State<PgClient>,
    AuthState(auth_claims): AuthState,
    ValidateJson(request): ValidateJson<CreateStateRequest>,
) -> Result<(StatusCode, Json<AppointmentStateResponse>)> {
    let mut conn = pg_client.get_connection().await?;

    let new_state = NewAppointmentState {
        name: request.name,
        ..Default::default()
    };
    let state = conn.create_appointment_state(new_state).await?;

    tracing::info!(
        target: TRACING_TARGET,
        account_id = auth_claims.account_id.to_string(),
        state_id = state.id.to_string(),
        "workflow state created",
    );

    Ok((StatusCode::CREATED, Json(state.into())))
}

/// Response for listing workflow states.
#[must_use]
#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
struct ListStatesResponse {
    pub appointment_states: Vec<AppointmentStateResponse>,
}

/// Returns all workflow states ordered by name.
#[tracing::instrument(skip_all)]
#[utoipa::path(
    get, path = "/appointment-states", tag = "appointment-states",
    params(PaginationParams),
    responses(
        (
            status = OK,
            description = "States listed",
            body = ListStatesResponse,
        ),
    ),
)]
async fn list_states(
    State(pg_client): State<PgClient>,
    AuthState(_): AuthState,
    Query(pagination): Query<PaginationParams>,
) -> Result<(StatusCode, Json<ListStatesResponse>)> {
    let mut conn = pg_client.get_connection().await?;

    let states = conn.list_appointment_states(pagination.into()).await?;
    let response = ListStatesResponse {
        appointment_states: states
            .into_iter()
            .map(AppointmentStateResponse::from)
            .collect(),
    };

    Ok((StatusCode::OK, Json(response)))
}

/// Gets a workflow state by its state ID.
#[tracing::instrument(skip_all)]
#[utoipa::path(
    get, path = "/appointment-states/{stateId}", tag = "appointment-states",
    params(StatePathParams),
    responses(
        (
            status = NOT_FOUND,
            description = "State not found",
            body = ErrorResponse,
        ),
        (
            status = OK,
            description = "State details",
            body = AppointmentStateResponse,
        ),
    ),
)]
async fn read_state(
    State(pg_client): State<PgClient>,
    AuthState(_): AuthState,
    Path(path_params): Path<StatePathParams>,
) -> Result<(StatusCode, Json<AppointmentStateResponse>)> {
    let mut conn = pg_client.get_connection().await?;

    let Some(state) = conn.find_appointment_state_by_id(path_params.state_id).await? else {
        return Err(ErrorKind::NotFound.with_resource("appointment-state"));
    };

    Ok((StatusCode::OK, Json(state.into())))
}

/// Request payload to update a workflow state.
#[must_use]
#[derive(Debug, Serialize, Deserialize, ToSchema, Validate)]
#[serde(rename_all = "camelCase")]
struct UpdateStateRequest {
    #[validate(length(min = 2, max = 64))]
    pub name: Option<String>,
    #[schema(value_type = Option<String>, example = "inactive")]
    pub status: Option<EntityStatus>,
}

/// Updates a workflow state by the state ID.
#[tracing::instrument(skip_all)]
#[utoipa::path(
    patch, path = "/appointment-states/{stateId}", tag = "appointment-states",
    params(StatePathParams),
    request_body(
        content = UpdateStateRequest,
        description = "State changes",
        content_type = "application/json",
    ),
    responses(
        (
            status = NOT_FOUND,
            description = "State not found",
            body = ErrorResponse,
        ),
        (
            status = OK,
            description = "State updated",
            body = AppointmentStateResponse,
        ),
    ),
)]
async fn update_state(
    State(pg_client): State<PgClient>,
    AuthState(auth_claims): AuthState,
    Path(path_params): Path<StatePathParams>,
    ValidateJson(request): ValidateJson<UpdateStateRequest>,
) -> Result<(StatusCode, Json<AppointmentStateResponse>)> {
    let mut conn = pg_client.get_connection().await?;

    if conn
        .find_appointment_state_by_id(path_params.state_id)
        .await?
        .is_none()
    {
        return Err(ErrorKind::NotFound.with_resource("appointment-state"));
    }

    let updates = UpdateAppointmentState {
        name: request.name,
        status: request.status,
        updated_at: Some(Timestamp::now().into()),
    };
    let state = conn
        .update_appointment_state(path_params.state_id, updates)
        .await?;

    tracing::info!(
        target: TRACING_TARGET,
        account_id = auth_claims.account_id.to_string(),
        state_id = path_params.state_id.to_string(),
        "workflow state updated",
    );

    Ok((StatusCode::OK, Json(state.into())))
}

/// Deletes a workflow state.
///
/// Rejected with `409 Conflict` while appointments still sit in the
/// state, since deleting it would orphan their workflow position.
#[tracing::instrument(skip_all)]
#[utoipa::path(
    delete, path = "/appointment-states/{stateId}", tag = "appointment-states",
    params(StatePathParams),
    responses(
        (
            status = NOT_FOUND,
            description = "State not found",
            body = ErrorResponse,
        ),
        (
            status = CONFLICT,
            description = "Appointments still reference the state",
            body = ErrorResponse,
        ),
        (
            status = NO_CONTENT,
            description = "State deleted",
        ),
    ),
)]
async fn delete_state(
    State(pg_client): State<PgClient>,
    AuthState(auth_claims): AuthState,
    Path(path_params): Path<StatePathParams>,
) -> Result<StatusCode> {
    let mut conn = pg_client.get_connection().await?;

    if conn
        .find_appointment_state_by_id(path_params.state_id)
        .await?
        .is_none()
    {
        return Err(ErrorKind::NotFound.with_resource("appointment-state"));
    }

    let in_state = conn.count_appointments_in_state(path_params.state_id).await?;
    if in_state > 0 {
        return Err(ErrorKind::Conflict
            .with_message(format!(
                "{in_state} appointment(s) are still in this state"
            ))
            .with_resource("appointment-state"));
    }

    conn.delete_appointment_state(path_params.state_id).await?;

    tracing::warn!(
        target: TRACING_TARGET,
        account_id = auth_claims.account_id.to_string(),
        state_id = path_params.state_id.to_string(),
        "workflow state deleted",
    );

    Ok(StatusCode::NO_CONTENT)
}

/// Returns a [`Router`] with all related routes.
///
/// [`Router`]: axum::routing::Router
pub fn routes() -> OpenApiRouter<ServiceState> {
    OpenApiRouter::new()
        .routes(routes!(create_state, list_states))
        .routes(routes!(read_state, update_state, delete_state))
}
