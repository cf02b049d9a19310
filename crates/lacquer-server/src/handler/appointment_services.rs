use axum::extract::State;
use axum::http::StatusCode;
use bigdecimal::BigDecimal;
use jiff::Timestamp;
use jiff::civil::{Date, Weekday};
use jiff::{Span, Zoned};
use lacquer_client::CatalogClient;
use lacquer_postgres::model::{AppointmentService, NewAppointmentService, UpdateAppointmentService};
use lacquer_postgres::query::{
    AppointmentRepository, AppointmentServiceRepository, AppointmentStateRepository,
    ServiceBookingCount,
};
use lacquer_postgres::{PgClient, ScopedFutureExt};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use utoipa_axum::router::OpenApiRouter;
use utoipa_axum::routes;
use uuid::Uuid;
use validator::Validate;

use crate::extract::{AuthState, Json, Path, Query, ValidateJson};
use crate::handler::{Error, ErrorKind, ErrorResponse, Result};
use crate::service::ServiceState;

/// Tracing target for appointment line item operations.
const TRACING_TARGET: &str = "lacquer_server::handler::appointment_services";

/// Workflow state counted by the booking reports.
const COMPLETED_STATE: &str = "completed";

/// How many services the ranking reports return.
const TOP_SERVICES_LIMIT: i64 = 3;
const WEEKLY_STAFF_LIMIT: i64 = 5;

/// `Path` param for `{lineId}` handlers.
#[must_use]
#[derive(Debug, Serialize, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
pub struct LinePathParams {
    /// Unique identifier of the line item.
    pub line_id: Uuid,
}

/// Line item representation returned by all line item handlers.
#[must_use]
#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AppointmentServiceResponse {
    pub id: Uuid,
    pub appointment_id: Uuid,
    pub service_id: Uuid,
    pub service_name: String,
    #[schema(value_type = String, example = "25.00")]
    pub subtotal: BigDecimal,
    #[schema(value_type = String)]
    pub created_at: Timestamp,
    #[schema(value_type = String)]
    pub updated_at: Timestamp,
}

impl From<AppointmentService> for AppointmentServiceResponse {
    fn from(line: AppointmentService) -> Self {
        Self {
            id: line.id,
            appointment_id: line.appointment_id,
            service_id: line.service_id,
            service_name: line.service_name,
            subtotal: line.subtotal,
            created_at: line.created_at.into(),
            updated_at: line.updated_at.into(),
        }
    }
}

/// Resolves the name and price of a catalog service for a new line.
///
/// An explicit subtotal overrides the catalog price but the service
/// still has to exist and be active so the captured name is real.
async fn resolve_line_pricing(
    catalog_client: &CatalogClient,
    service_id: Uuid,
    subtotal: Option<BigDecimal>,
) -> Result<(String, BigDecimal)> {
    if let Some(ref subtotal) = subtotal {
        if subtotal < &BigDecimal::from(0) {
            return Err(ErrorKind::BadRequest
                .with_message("Subtotal must not be negative")
                .with_resource("appointment_service"));
        }
    }

    let Some(service) = catalog_client.fetch_service(service_id).await? else {
        return Err(ErrorKind::BadRequest
            .with_message("Service does not exist in the catalog")
            .with_resource("appointment_service"));
    };
    if !service.is_active() {
        return Err(ErrorKind::BadRequest
            .with_message("Service is not bookable")
            .with_resource("appointment_service"));
    }

    let subtotal = subtotal.unwrap_or_else(|| service.price.clone());
    Ok((service.name, subtotal))
}

/// Request payload for attaching a service to an appointment.
#[must_use]
#[derive(Debug, Serialize, Deserialize, ToSchema, Validate)]
#[serde(rename_all = "camelCase")]
struct CreateLineRequest {
    pub appointment_id: Uuid,
    pub service_id: Uuid,
    /// Price override. When omitted the current catalog price is used.
    #[schema(value_type = Option<String>, example = "25.00")]
    pub subtotal: Option<BigDecimal>,
}

/// Attaches a catalog service to an appointment.
///
/// The service name and price are captured from the catalog at creation
/// time and the appointment total is recomputed in the same transaction.
#[tracing::instrument(skip_all)]
#[utoipa::path(
    post, path = "/appointment-services", tag = "appointment-services",
    request_body(
        content = CreateLineRequest,
        description = "New line item",
        content_type = "application/json",
    ),
    responses(
        (
            status = BAD_REQUEST,
            description = "Unknown appointment or service, or negative subtotal",
            body = ErrorResponse,
        ),
        (
            status = CONFLICT,
            description = "Appointment already has a line for this service",
            body = ErrorResponse,
        ),
        (
            status = SERVICE_UNAVAILABLE,
            description = "Catalog service unreachable",
            body = ErrorResponse,
        ),
        (
            status = CREATED,
            description = "Line item created",
            body = AppointmentServiceResponse,
        ),
    ),
)]
async fn create_line(
    State(pg_client): State<PgClient>,
    State(catalog_client): State<CatalogClient>,
    AuthState(auth_claims): AuthState,
    ValidateJson(request): ValidateJson<CreateLineRequest>,
) -> Result<(StatusCode, Json<AppointmentServiceResponse>)> {
    let mut conn = pg_client.get_connection().await?;

    if conn
        .find_appointment_by_id(request.appointment_id)
        .await?
        .is_none()
    {
        return Err(ErrorKind::BadRequest
            .with_message("Appointment does not exist")
            .with_resource("appointment_service"));
    }
    if conn
        .appointment_service_exists(request.appointment_id, request.service_id)
        .await?
    {
        return Err(ErrorKind::Conflict
            .with_message("Appointment already has a line for this service")
            .with_resource("appointment_service"));
    }

    let (service_name, subtotal) =
        resolve_line_pricing(&catalog_client, request.service_id, request.subtotal).await?;

    let appointment_id = request.appointment_id;
    let new_line = NewAppointmentService {
        appointment_id,
        service_id: request.service_id,
        service_name,
        subtotal,
    };
    let line = conn
        .transaction(|conn| {
            async move {
                let line = conn.create_appointment_service(new_line).await?;
                conn.recompute_appointment_total(appointment_id).await?;
                Ok::<_, Error>(line)
            }
            .scope_boxed()
        })
        .await?;

    tracing::info!(
        target: TRACING_TARGET,
        account_id = auth_claims.account_id.to_string(),
        appointment_id = appointment_id.to_string(),
        line_id = line.id.to_string(),
        "line item created",
    );

    Ok((StatusCode::CREATED, Json(line.into())))
}

/// `Query` params for listing line items.
#[must_use]
#[derive(Debug, Serialize, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
pub struct ListLinesParams {
    /// Appointment whose line items are listed.
    pub appointment_id: Uuid,
}

/// Response for listing the line items of an appointment.
#[must_use]
#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
struct ListLinesResponse {
    pub appointment_services: Vec<AppointmentServiceResponse>,
}

/// Returns the line items of one appointment in creation order.
#[tracing::instrument(skip_all)]
#[utoipa::path(
    get, path = "/appointment-services", tag = "appointment-services",
    params(ListLinesParams),
    responses(
        (
            status = OK,
            description = "Line items listed",
            body = ListLinesResponse,
        ),
    ),
)]
async fn list_lines(
    State(pg_client): State<PgClient>,
    AuthState(_): AuthState,
    Query(params): Query<ListLinesParams>,
) -> Result<(StatusCode, Json<ListLinesResponse>)> {
    let mut conn = pg_client.get_connection().await?;

    let lines = conn
        .list_services_for_appointment(params.appointment_id)
        .await?;

    let response = ListLinesResponse {
        appointment_services: lines
            .into_iter()
            .map(AppointmentServiceResponse::from)
            .collect(),
    };
    Ok((StatusCode::OK, Json(response)))
}

/// Gets a line item by its line ID.
#[tracing::instrument(skip_all)]
#[utoipa::path(
    get, path = "/appointment-services/{lineId}", tag = "appointment-services",
    params(LinePathParams),
    responses(
        (
            status = NOT_FOUND,
            description = "Line item not found",
            body = ErrorResponse,
        ),
        (
            status = OK,
            description = "Line item details",
            body = AppointmentServiceResponse,
        ),
    ),
)]
async fn read_line(
    State(pg_client): State<PgClient>,
    AuthState(_): AuthState,
    Path(path_params): Path<LinePathParams>,
) -> Result<(StatusCode, Json<AppointmentServiceResponse>)> {
    let mut conn = pg_client.get_connection().await?;

    let Some(line) = conn
        .find_appointment_service_by_id(path_params.line_id)
        .await?
    else {
        return Err(ErrorKind::NotFound.with_resource("appointment_service"));
    };

    Ok((StatusCode::OK, Json(line.into())))
}

/// Request payload to reprice a line item.
#[must_use]
#[derive(Debug, Serialize, Deserialize, ToSchema, Validate)]
#[serde(rename_all = "camelCase")]
struct UpdateLineRequest {
    #[schema(value_type = String, example = "30.00")]
    pub subtotal: BigDecimal,
}

/// Reprices a line item and recomputes the appointment total.
#[tracing::instrument(skip_all)]
#[utoipa::path(
    patch, path = "/appointment-services/{lineId}", tag = "appointment-services",
    params(LinePathParams),
    request_body(
        content = UpdateLineRequest,
        description = "Line item changes",
        content_type = "application/json",
    ),
    responses(
        (
            status = NOT_FOUND,
            description = "Line item not found",
            body = ErrorResponse,
        ),
        (
            status = BAD_REQUEST,
            description = "Negative subtotal",
            body = ErrorResponse,
        ),
        (
            status = OK,
            description = "Line item updated",
            body = AppointmentServiceResponse,
        ),
    ),
)]
async fn update_line(
    State(pg_client): State<PgClient>,
    AuthState(auth_claims): AuthState,
    Path(path_params): Path<LinePathParams>,
    ValidateJson(request): ValidateJson<UpdateLineRequest>,
) -> Result<(StatusCode, Json<AppointmentServiceResponse>)> {
    if request.subtotal < BigDecimal::from(0) {
        return Err(ErrorKind::BadRequest
            .with_message("Subtotal must not be negative")
            .with_resource("appointment_service"));
    }

    let mut conn = pg_client.get_connection().await?;

    let Some(line) = conn
        .find_appointment_service_by_id(path_params.line_id)
        .await?
    else {
        return Err(ErrorKind::NotFound.with_resource("appointment_service"));
    };

    let line_id = line.id;
    let appointment_id = line.appointment_id;
    let updates = UpdateAppointmentService {
        subtotal: Some(request.subtotal),
        updated_at: Some(Timestamp::now().into()),
        ..UpdateAppointmentService::default()
    };
    let line = conn
        .transaction(|conn| {
            async move {
                let line = conn.update_appointment_service(line_id, updates).await?;
                conn.recompute_appointment_total(appointment_id).await?;
                Ok::<_, Error>(line)
            }
            .scope_boxed()
        })
        .await?;

    tracing::info!(
        target: TRACING_TARGET,
        account_id = auth_claims.account_id.to_string(),
        appointment_id = appointment_id.to_string(),
        line_id = line_id.to_string(),
        "line item repriced",
    );

    Ok((StatusCode::OK, Json(line.into())))
}

/// Removes a line item and recomputes the appointment total.
#[tracing::instrument(skip_all)]
#[utoipa::path(
    delete, path = "/appointment-services/{lineId}", tag = "appointment-services",
    params(LinePathParams),
    responses(
        (
            status = NOT_FOUND,
            description = "Line item not found",
            body = ErrorResponse,
        ),
        (
            status = NO_CONTENT,
            description = "Line item deleted",
        ),
    ),
)]
async fn delete_line(
    State(pg_client): State<PgClient>,
    AuthState(auth_claims): AuthState,
    Path(path_params): Path<LinePathParams>,
) -> Result<StatusCode> {
    let mut conn = pg_client.get_connection().await?;

    let Some(line) = conn
        .find_appointment_service_by_id(path_params.line_id)
        .await?
    else {
        return Err(ErrorKind::NotFound.with_resource("appointment_service"));
    };

    let line_id = line.id;
    let appointment_id = line.appointment_id;
    conn.transaction(|conn| {
        async move {
            conn.delete_appointment_service(line_id).await?;
            conn.recompute_appointment_total(appointment_id).await?;
            Ok::<_, Error>(())
        }
        .scope_boxed()
    })
    .await?;

    tracing::info!(
        target: TRACING_TARGET,
        account_id = auth_claims.account_id.to_string(),
        appointment_id = appointment_id.to_string(),
        line_id = line_id.to_string(),
        "line item deleted",
    );

    Ok(StatusCode::NO_CONTENT)
}

/// One service in a batch attach request.
#[must_use]
#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
struct BatchLineItem {
    pub service_id: Uuid,
    /// Price override. When omitted the current catalog price is used.
    #[schema(value_type = Option<String>, example = "25.00")]
    pub subtotal: Option<BigDecimal>,
}

/// Request payload for attaching multiple services at once.
#[must_use]
#[derive(Debug, Serialize, Deserialize, ToSchema, Validate)]
#[serde(rename_all = "camelCase")]
struct BatchLineRequest {
    pub appointment_id: Uuid,
    #[validate(length(min = 1, max = 50))]
    pub items: Vec<BatchLineItem>,
}

/// Outcome for a single service in a batch attach request.
#[must_use]
#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
struct BatchLineOutcome {
    pub service_id: Uuid,
    /// One of `created`, `duplicate` or `rejected`.
    pub outcome: String,
    /// Identifier of the created line, when one was created.
    pub line_id: Option<Uuid>,
    /// Failure detail for rejected items.
    pub detail: Option<String>,
}

/// Response for a batch attach request.
#[must_use]
#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
struct BatchLineResponse {
    pub appointment_id: Uuid,
    pub results: Vec<BatchLineOutcome>,
}

/// Attaches multiple catalog services to one appointment.
///
/// Catalog lookups happen before the transaction so no database locks
/// are held across upstream calls. Items are reported individually and
/// the whole request answers 201 only when every item was created.
#[tracing::instrument(skip_all)]
#[utoipa::path(
    post, path = "/appointment-services/batch", tag = "appointment-services",
    request_body(
        content = BatchLineRequest,
        description = "Services to attach",
        content_type = "application/json",
    ),
    responses(
        (
            status = BAD_REQUEST,
            description = "Unknown appointment",
            body = ErrorResponse,
        ),
        (
            status = SERVICE_UNAVAILABLE,
            description = "Catalog service unreachable",
            body = ErrorResponse,
        ),
        (
            status = CREATED,
            description = "All line items created",
            body = BatchLineResponse,
        ),
        (
            status = MULTI_STATUS,
            description = "Some items were not created",
            body = BatchLineResponse,
        ),
    ),
)]
async fn batch_create_lines(
    State(pg_client): State<PgClient>,
    State(catalog_client): State<CatalogClient>,
    AuthState(auth_claims): AuthState,
    ValidateJson(request): ValidateJson<BatchLineRequest>,
) -> Result<(StatusCode, Json<BatchLineResponse>)> {
    let mut conn = pg_client.get_connection().await?;

    let appointment_id = request.appointment_id;
    if conn.find_appointment_by_id(appointment_id).await?.is_none() {
        return Err(ErrorKind::BadRequest
            .with_message("Appointment does not exist")
            .with_resource("appointment_service"));
    }

    // Rejected items keep their slot so the response order matches the
    // request order.
    let mut priced = Vec::with_capacity(request.items.len());
    for item in &request.items {
        let pricing =
            resolve_line_pricing(&catalog_client, item.service_id, item.subtotal.clone()).await;
        priced.push((item.service_id, pricing));
    }

    let results = conn
        .transaction(|conn| {
            async move {
                let mut results = Vec::with_capacity(priced.len());
                let mut created_any = false;
                for (service_id, pricing) in priced {
                    let (service_name, subtotal) = match pricing {
                        Ok(pricing) => pricing,
                        Err(error) => {
                            results.push(BatchLineOutcome {
                                service_id,
                                outcome: "rejected".to_owned(),
                                line_id: None,
                                detail: error.message().map(str::to_owned),
                            });
                            continue;
                        }
                    };
                    if conn
                        .appointment_service_exists(appointment_id, service_id)
                        .await?
                    {
                        results.push(BatchLineOutcome {
                            service_id,
                            outcome: "duplicate".to_owned(),
                            line_id: None,
                            detail: None,
                        });
                        continue;
                    }

                    let line = conn
                        .create_appointment_service(NewAppointmentService {
                            appointment_id,
                            service_id,
                            service_name,
                            subtotal,
                        })
                        .await?;
                    created_any = true;
                    results.push(BatchLineOutcome {
                        service_id,
                        outcome: "created".to_owned(),
                        line_id: Some(line.id),
                        detail: None,
                    });
                }

                if created_any {
                    conn.recompute_appointment_total(appointment_id).await?;
                }
                Ok::<_, Error>(results)
            }
            .scope_boxed()
        })
        .await?;

    let all_created = results.iter().all(|result| result.outcome == "created");
    let status = if all_created {
        StatusCode::CREATED
    } else {
        StatusCode::MULTI_STATUS
    };

    tracing::info!(
        target: TRACING_TARGET,
        account_id = auth_claims.account_id.to_string(),
        appointment_id = appointment_id.to_string(),
        items = results.len(),
        all_created,
        "batch line items processed",
    );

    let response = BatchLineResponse {
        appointment_id,
        results,
    };
    Ok((status, Json(response)))
}

/// One ranked service in a booking report.
#[must_use]
#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
struct BookingCountResponse {
    pub service_id: Uuid,
    pub service_name: String,
    pub bookings: i64,
}

impl From<ServiceBookingCount> for BookingCountResponse {
    fn from(count: ServiceBookingCount) -> Self {
        Self {
            service_id: count.service_id,
            service_name: count.service_name,
            bookings: count.bookings,
        }
    }
}

/// `Query` params for the top services report.
#[must_use]
#[derive(Debug, Serialize, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
pub struct TopServicesParams {
    /// Start of the inclusive date range.
    #[param(value_type = String, example = "2026-08-01")]
    pub from: Date,
    /// End of the inclusive date range.
    #[param(value_type = String, example = "2026-08-31")]
    pub to: Date,
}

/// Response for the booking reports.
#[must_use]
#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
struct BookingReportResponse {
    #[schema(value_type = String, example = "2026-08-01")]
    pub from: Date,
    #[schema(value_type = String, example = "2026-08-31")]
    pub to: Date,
    pub services: Vec<BookingCountResponse>,
}

/// Resolves the workflow state counted by the booking reports.
///
/// Reports cover completed appointments only. A deployment without a
/// completed state has nothing to report, which is not an error.
async fn completed_state_id(conn: &mut lacquer_postgres::PgConn) -> Result<Option<Uuid>> {
    let state = conn.find_appointment_state_by_name(COMPLETED_STATE).await?;
    if state.is_none() {
        tracing::warn!(
            target: TRACING_TARGET,
            state = COMPLETED_STATE,
            "report state is not configured",
        );
    }
    Ok(state.map(|state| state.id))
}

/// Ranks the three most-booked services within a date range.
#[tracing::instrument(skip_all)]
#[utoipa::path(
    get, path = "/appointment-services/reports/top", tag = "appointment-services",
    params(TopServicesParams),
    responses(
        (
            status = BAD_REQUEST,
            description = "Range start is after range end",
            body = ErrorResponse,
        ),
        (
            status = OK,
            description = "Most-booked services, most booked first",
            body = BookingReportResponse,
        ),
    ),
)]
async fn report_top_services(
    State(pg_client): State<PgClient>,
    AuthState(_): AuthState,
    Query(params): Query<TopServicesParams>,
) -> Result<(StatusCode, Json<BookingReportResponse>)> {
    if params.from > params.to {
        return Err(ErrorKind::BadRequest
            .with_message("Range start must not be after range end")
            .with_resource("report"));
    }

    let mut conn = pg_client.get_connection().await?;

    let services = match completed_state_id(&mut conn).await? {
        Some(state_id) => {
            conn.top_booked_services(
                state_id,
                params.from.into(),
                params.to.into(),
                TOP_SERVICES_LIMIT,
            )
            .await?
        }
        None => Vec::new(),
    };

    let response = BookingReportResponse {
        from: params.from,
        to: params.to,
        services: services.into_iter().map(Into::into).collect(),
    };
    Ok((StatusCode::OK, Json(response)))
}

/// `Query` params for the weekly staff report.
#[must_use]
#[derive(Debug, Serialize, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
pub struct WeeklyStaffParams {
    /// Staff member the report covers.
    pub staff_id: Uuid,
}

/// Returns the Monday-to-Sunday window containing `today`.
fn current_week(today: Date) -> (Date, Date) {
    let offset = today.weekday().since(Weekday::Monday);
    let week_start = today.saturating_sub(Span::new().days(i64::from(offset)));
    let week_end = week_start.saturating_add(Span::new().days(6));
    (week_start, week_end)
}

/// Ranks the five most-booked services of one staff member in the
/// current calendar week.
#[tracing::instrument(skip_all)]
#[utoipa::path(
    get, path = "/appointment-services/reports/weekly-by-staff", tag = "appointment-services",
    params(WeeklyStaffParams),
    responses(
        (
            status = OK,
            description = "Most-booked services this week, most booked first",
            body = BookingReportResponse,
        ),
    ),
)]
async fn report_weekly_by_staff(
    State(pg_client): State<PgClient>,
    AuthState(_): AuthState,
    Query(params): Query<WeeklyStaffParams>,
) -> Result<(StatusCode, Json<BookingReportResponse>)> {
    let mut conn = pg_client.get_connection().await?;

    let (week_start, week_end) = current_week(Zoned::now().date());
    let services = match completed_state_id(&mut conn).await? {
        Some(state_id) => {
            conn.top_booked_services_for_staff(
                params.staff_id,
                state_id,
                week_start.into(),
                week_end.into(),
                WEEKLY_STAFF_LIMIT,
            )
            .await?
        }
        None => Vec::new(),
    };

    let response = BookingReportResponse {
        from: week_start,
        to: week_end,
        services: services.into_iter().map(Into::into).collect(),
    };
    Ok((StatusCode::OK, Json(response)))
}

/// Returns a [`Router`] with all related routes.
///
/// [`Router`]: axum::routing::Router
pub fn routes() -> OpenApiRouter<ServiceState> {
    OpenApiRouter::new()
        .routes(routes!(create_line, list_lines))
        .routes(routes!(read_line, update_line, delete_line))
        .routes(routes!(batch_create_lines))
        .routes(routes!(report_top_services))
        .routes(routes!(report_weekly_by_staff))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn week_window_from_midweek() {
        let today = jiff::civil::date(2026, 8, 27);
        let (start, end) = current_week(today);
        assert_eq!(start, jiff::civil::date(2026, 8, 24));
        assert_eq!(end, jiff::civil::date(2026, 8, 30));
    }

    #[test]
    fn week_window_on_monday_and_sunday() {
        let monday = jiff::civil::date(2026, 8, 24);
        assert_eq!(current_week(monday).0, monday);

        let sunday = jiff::civil::date(2026, 8, 30);
        let (start, end) = current_week(sunday);
        assert_eq!(start, jiff::civil::date(2026, 8, 24));
        assert_eq!(end, sunday);
    }
}
