use axum::extract::State;
use axum::http::StatusCode;
use bigdecimal::BigDecimal;
use jiff::Timestamp;
use jiff::civil::{Date, Time};
use lacquer_postgres::PgClient;
use lacquer_postgres::model::{Appointment, NewAppointment, UpdateAppointment};
use lacquer_postgres::query::AppointmentRepository;
use lacquer_postgres::types::Pagination;
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

/// Tracing target for appointment operations.
const TRACING_TARGET: &str = "lacquer_server::handler::appointments";

/// `Path` param for `{appointmentId}` handlers.
#[must_use]
#[derive(Debug, Serialize, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
pub struct AppointmentPathParams {
    /// Unique identifier of the appointment.
    pub appointment_id: Uuid,
}

/// Appointment representation returned by all appointment handlers.
///
/// The `total` field is derived from the line items and cannot be set
/// directly.
#[must_use]
#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AppointmentResponse {
    pub id: Uuid,
    pub client_id: Uuid,
    pub staff_id: Uuid,
    pub state_id: Uuid,
    #[schema(value_type = String, example = "2026-08-30")]
    pub scheduled_on: Date,
    #[schema(value_type = String, example = "14:30:00")]
    pub scheduled_at: Time,
    #[schema(value_type = String, example = "45.00")]
    pub total: BigDecimal,
    #[schema(value_type = String)]
    pub created_at: Timestamp,
    #[schema(value_type = String)]
    pub updated_at: Timestamp,
}

impl From<Appointment> for AppointmentResponse {
    fn from(appointment: Appointment) -> Self {
        Self {
            id: appointment.id,
            client_id: appointment.client_id,
            staff_id: appointment.staff_id,
            state_id: appointment.state_id,
            scheduled_on: appointment.scheduled_on.into(),
            scheduled_at: appointment.scheduled_at.into(),
            total: appointment.total,
            created_at: appointment.created_at.into(),
            updated_at: appointment.updated_at.into(),
        }
    }
}

/// Request payload for booking an appointment.
#[must_use]
#[derive(Debug, Serialize, Deserialize, ToSchema, Validate)]
#[serde(rename_all = "camelCase")]
struct CreateAppointmentRequest {
    pub client_id: Uuid,
    pub staff_id: Uuid,
    pub state_id: Uuid,
    #[schema(value_type = String, example = "2026-08-30")]
    pub scheduled_on: Date,
    #[schema(value_type = String, example = "14:30:00")]
    pub scheduled_at: Time,
}

/// Books a new appointment.
///
/// The appointment starts with an empty service list and a zero total;
/// line items are attached through the appointment-services endpoints.
#[tracing::instrument(skip_all)]
#[utoipa::path(
    post, path = "/appointments", tag = "appointments",
    request_body(
        content = CreateAppointmentRequest,
        description = "New appointment",
        content_type = "application/json",
    ),
    responses(
        (
            status = BAD_REQUEST,
            description = "Referenced client, staff or state does not exist",
            body = ErrorResponse,
        ),
        (
            status = CREATED,
            description = "Appointment booked",
            body = AppointmentResponse,
        ),
    ),
)]
async fn create_appointment(
    State(pg_client): State<PgClient>,
    AuthState(auth_claims): AuthState,
    ValidateJson(request): ValidateJson<CreateAppointmentRequest>,
) -> Result<(StatusCode, Json<AppointmentResponse>)> {
    let mut conn = pg_client.get_connection().await?;

    let new_appointment = NewAppointment {
        client_id: request.client_id,
        staff_id: request.staff_id,
        state_id: request.state_id,
        scheduled_on: request.scheduled_on.into(),
        scheduled_at: request.scheduled_at.into(),
    };
    let appointment = conn.create_appointment(new_appointment).await?;

    tracing::info!(
        target: TRACING_TARGET,
        account_id = auth_claims.account_id.to_string(),
        appointment_id = appointment.id.to_string(),
        client_id = request.client_id.to_string(),
        staff_id = request.staff_id.to_string(),
        "appointment booked",
    );

    Ok((StatusCode::CREATED, Json(appointment.into())))
}

/// `Query` params for listing appointments.
#[must_use]
#[derive(Debug, Default, Serialize, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
pub struct ListAppointmentsParams {
    /// Only appointments booked for this client.
    pub client_id: Option<Uuid>,
    /// Only appointments assigned to this staff member.
    pub staff_id: Option<Uuid>,
    /// Maximum number of records to return, capped at 200.
    pub limit: Option<i64>,
    /// Number of records to skip.
    pub offset: Option<i64>,
}

/// Response for listing appointments.
#[must_use]
#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
struct ListAppointmentsResponse {
    pub appointments: Vec<AppointmentResponse>,
}

/// Returns appointments, optionally filtered by client or staff member.
#[tracing::instrument(skip_all)]
#[utoipa::path(
    get, path = "/appointments", tag = "appointments",
    params(ListAppointmentsParams),
    responses(
        (
            status = BAD_REQUEST,
            description = "Conflicting filters",
            body = ErrorResponse,
        ),
        (
            status = OK,
            description = "Appointments listed",
            body = ListAppointmentsResponse,
        ),
    ),
)]
async fn list_appointments(
    State(pg_client): State<PgClient>,
    AuthState(_): AuthState,
    Query(params): Query<ListAppointmentsParams>,
) -> Result<(StatusCode, Json<ListAppointmentsResponse>)> {
    let mut conn = pg_client.get_connection().await?;

    let pagination = Pagination::from(PaginationParams {
        limit: params.limit,
        offset: params.offset,
    });

    let appointments = match (params.client_id, params.staff_id) {
        (Some(_), Some(_)) => {
            return Err(ErrorKind::BadRequest
                .with_message("Filter by either clientId or staffId, not both")
                .with_resource("appointments"));
        }
        (Some(client_id), None) => {
            conn.list_appointments_for_client(client_id, pagination)
                .await?
        }
        (None, Some(staff_id)) => {
            conn.list_appointments_for_staff(staff_id, pagination)
                .await?
        }
        (None, None) => conn.list_appointments(pagination).await?,
    };

    let response = ListAppointmentsResponse {
        appointments: appointments
            .into_iter()
            .map(AppointmentResponse::from)
            .collect(),
    };
    Ok((StatusCode::OK, Json(response)))
}

/// Gets an appointment by its appointment ID.
#[tracing::instrument(skip_all)]
#[utoipa::path(
    get, path = "/appointments/{appointmentId}", tag = "appointments",
    params(AppointmentPathParams),
    responses(
        (
            status = NOT_FOUND,
            description = "Appointment not found",
            body = ErrorResponse,
        ),
        (
            status = OK,
            description = "Appointment details",
            body = AppointmentResponse,
        ),
    ),
)]
async fn read_appointment(
    State(pg_client): State<PgClient>,
    AuthState(_): AuthState,
    Path(path_params): Path<AppointmentPathParams>,
) -> Result<(StatusCode, Json<AppointmentResponse>)> {
    let mut conn = pg_client.get_connection().await?;

    let Some(appointment) = conn
        .find_appointment_by_id(path_params.appointment_id)
        .await?
    else {
        return Err(ErrorKind::NotFound.with_resource("appointment"));
    };

    Ok((StatusCode::OK, Json(appointment.into())))
}

/// Request payload to update an appointment.
///
/// Only scheduling fields can change; the total is derived from line
/// items.
#[must_use]
#[derive(Debug, Serialize, Deserialize, ToSchema, Validate)]
#[serde(rename_all = "camelCase")]
struct UpdateAppointmentRequest {
    pub client_id: Option<Uuid>,
    pub staff_id: Option<Uuid>,
    pub state_id: Option<Uuid>,
    #[schema(value_type = Option<String>, example = "2026-08-30")]
    pub scheduled_on: Option<Date>,
    #[schema(value_type = Option<String>, example = "14:30:00")]
    pub scheduled_at: Option<Time>,
}

/// Updates an appointment by the appointment ID.
#[tracing::instrument(skip_all)]
#[utoipa::path(
    patch, path = "/appointments/{appointmentId}", tag = "appointments",
    params(AppointmentPathParams),
    request_body(
        content = UpdateAppointmentRequest,
        description = "Appointment changes",
        content_type = "application/json",
    ),
    responses(
        (
            status = NOT_FOUND,
            description = "Appointment not found",
            body = ErrorResponse,
        ),
        (
            status = BAD_REQUEST,
            description = "Referenced client, staff or state does not exist",
            body = ErrorResponse,
        ),
        (
            status = OK,
            description = "Appointment updated",
            body = AppointmentResponse,
        ),
    ),
)]
async fn update_appointment(
    State(pg_client): State<PgClient>,
    AuthState(auth_claims): AuthState,
    Path(path_params): Path<AppointmentPathParams>,
    ValidateJson(request): ValidateJson<UpdateAppointmentRequest>,
) -> Result<(StatusCode, Json<AppointmentResponse>)> {
    let mut conn = pg_client.get_connection().await?;

    if conn
        .find_appointment_by_id(path_params.appointment_id)
        .await?
        .is_none()
    {
        return Err(ErrorKind::NotFound.with_resource("appointment"));
    }

    let updates = UpdateAppointment {
        client_id: request.client_id,
        staff_id: request.staff_id,
        state_id: request.state_id,
        scheduled_on: request.scheduled_on.map(Into::into),
        scheduled_at: request.scheduled_at.map(Into::into),
        updated_at: Some(Timestamp::now().into()),
    };
    let appointment = conn
        .update_appointment(path_params.appointment_id, updates)
        .await?;

    tracing::info!(
        target: TRACING_TARGET,
        account_id = auth_claims.account_id.to_string(),
        appointment_id = path_params.appointment_id.to_string(),
        "appointment updated",
    );

    Ok((StatusCode::OK, Json(appointment.into())))
}

/// Cancels an appointment, removing it and its line items.
#[tracing::instrument(skip_all)]
#[utoipa::path(
    delete, path = "/appointments/{appointmentId}", tag = "appointments",
    params(AppointmentPathParams),
    responses(
        (
            status = NOT_FOUND,
            description = "Appointment not found",
            body = ErrorResponse,
        ),
        (
            status = NO_CONTENT,
            description = "Appointment deleted",
        ),
    ),
)]
async fn delete_appointment(
    State(pg_client): State<PgClient>,
    AuthState(auth_claims): AuthState,
    Path(path_params): Path<AppointmentPathParams>,
) -> Result<StatusCode> {
    let mut conn = pg_client.get_connection().await?;

    let removed = conn.delete_appointment(path_params.appointment_id).await?;
    if removed == 0 {
        return Err(ErrorKind::NotFound.with_resource("appointment"));
    }

    tracing::warn!(
        target: TRACING_TARGET,
        account_id = auth_claims.account_id.to_string(),
        appointment_id = path_params.appointment_id.to_string(),
        "appointment deleted",
    );

    Ok(StatusCode::NO_CONTENT)
}

/// Returns a [`Router`] with all related routes.
///
/// [`Router`]: axum::routing::Router
pub fn routes() -> OpenApiRouter<ServiceState> {
    OpenApiRouter::new()
        .routes(routes!(create_appointment, list_appointments))
        .routes(routes!(
            read_appointment,
            update_appointment,
            delete_appointment
        ))
}
