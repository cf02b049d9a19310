use axum::extract::State;
use axum::http::StatusCode;
use jiff::Timestamp;
use lacquer_postgres::PgClient;
use lacquer_postgres::model::{NewRole, Role, UpdateRole};
use lacquer_postgres::query::{RolePermissionRepository, RoleRepository};
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

/// Tracing target for role operations.
const TRACING_TARGET: &str = "lacquer_server::handler::roles";

/// `Path` param for `{roleId}` handlers.
#[must_use]
#[derive(Debug, Serialize, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
pub struct RolePathParams {
    /// Unique identifier of the role.
    pub role_id: Uuid,
}

/// Role representation returned by all role handlers.
#[must_use]
#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RoleResponse {
    pub id: Uuid,
    pub name: String,
    pub description: String,
    #[schema(value_type = String, example = "active")]
    pub status: EntityStatus,
    #[schema(value_type = String)]
    pub created_at: Timestamp,
    #[schema(value_type = String)]
    pub updated_at: Timestamp,
}

impl From<Role> for RoleResponse {
    fn from(role: Role) -> Self {
        Self {
            id: role.id,
            name: role.name,
            description: role.description,
            status: role.status,
            created_at: role.created_at.into(),
            updated_at: role.updated_at.into(),
        }
    }
}

/// Request payload for creating a new role.
#[must_use]
#[derive(Debug, Serialize, Deserialize, ToSchema, Validate)]
#[serde(rename_all = "camelCase")]
struct CreateRoleRequest {
    #[validate(length(min = 2, max = 64))]
    pub name: String,
    #[validate(length(max = 500))]
    pub description: Option<String>,
}

/// Creates a new role.
#[tracing::instrument(skip_all)]
#[utoipa::path(
    post, path = "/roles", tag = "roles",
    request_body(
        content = CreateRoleRequest,
        description = "New role",
        content_type = "application/json",
    ),
    responses(
        (
            status = BAD_REQUEST,
            description = "Bad request",
            body = ErrorResponse,
        ),
        (
            status = CONFLICT,
            description = "Role name already taken",
            body = ErrorResponse,
        ),
        (
            status = CREATED,
            description = "Role created",
            body = RoleResponse,
        ),
    ),
)]
async fn create_role(
    State(pg_client): State<PgClient>,
    AuthState(auth_claims): AuthState,
    ValidateJson(request): ValidateJson<CreateRoleRequest>,
) -> Result<(StatusCode, Json<RoleResponse>)> {
    let mut conn = pg_client.get_connection().await?;

    let new_role = NewRole {
        name: request.name,
        description: request.description,
        ..Default::default()
    };
    let role = conn.create_role(new_role).await?;

    tracing::info!(
        target: TRACING_TARGET,
        account_id = auth_claims.account_id.to_string(),
        role_id = role.id.to_string(),
        "role created",
    );

    Ok((StatusCode::CREATED, Json(role.into())))
}

/// Response for listing roles.
#[must_use]
#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
struct ListRolesResponse {
    pub roles: Vec<RoleResponse>,
}

/// Returns all roles.
#[tracing::instrument(skip_all)]
#[utoipa::path(
    get, path = "/roles", tag = "roles",
    params(PaginationParams),
    responses(
        (
            status = INTERNAL_SERVER_ERROR,
            description = "Internal server error",
            body = ErrorResponse,
        ),
        (
            status = OK,
            description = "Roles listed",
            body = ListRolesResponse,
        ),
    ),
)]
async fn list_roles(
    State(pg_client): State<PgClient>,
    AuthState(_): AuthState,
    Query(pagination): Query<PaginationParams>,
) -> Result<(StatusCode, Json<ListRolesResponse>)> {
    let mut conn = pg_client.get_connection().await?;

    let roles = conn.list_roles(pagination.into()).await?;
    let response = ListRolesResponse {
        roles: roles.into_iter().map(RoleResponse::from).collect(),
    };

    Ok((StatusCode::OK, Json(response)))
}

/// Returns all active roles.
#[tracing::instrument(skip_all)]
#[utoipa::path(
    get, path = "/roles/active", tag = "roles",
    params(PaginationParams),
    responses(
        (
            status = OK,
            description = "Active roles listed",
            body = ListRolesResponse,
        ),
    ),
)]
async fn list_active_roles(
    State(pg_client): State<PgClient>,
    AuthState(_): AuthState,
    Query(pagination): Query<PaginationParams>,
) -> Result<(StatusCode, Json<ListRolesResponse>)> {
    let mut conn = pg_client.get_connection().await?;

    let roles = conn
        .list_roles_by_status(EntityStatus::Active, pagination.into())
        .await?;
    let response = ListRolesResponse {
        roles: roles.into_iter().map(RoleResponse::from).collect(),
    };

    Ok((StatusCode::OK, Json(response)))
}

/// Returns all inactive roles.
#[tracing::instrument(skip_all)]
#[utoipa::path(
    get, path = "/roles/inactive", tag = "roles",
    params(PaginationParams),
    responses(
        (
            status = OK,
            description = "Inactive roles listed",
            body = ListRolesResponse,
        ),
    ),
)]
async fn list_inactive_roles(
    State(pg_client): State<PgClient>,
    AuthState(_): AuthState,
    Query(pagination): Query<PaginationParams>,
) -> Result<(StatusCode, Json<ListRolesResponse>)> {
    let mut conn = pg_client.get_connection().await?;

    let roles = conn
        .list_roles_by_status(EntityStatus::Inactive, pagination.into())
        .await?;
    let response = ListRolesResponse {
        roles: roles.into_iter().map(RoleResponse::from).collect(),
    };

    Ok((StatusCode::OK, Json(response)))
}

/// Gets a role by its role ID.
#[tracing::instrument(skip_all)]
#[utoipa::path(
    get, path = "/roles/{roleId}", tag = "roles",
    params(RolePathParams),
    responses(
        (
            status = NOT_FOUND,
            description = "Role not found",
            body = ErrorResponse,
        ),
        (
            status = OK,
            description = "Role details",
            body = RoleResponse,
        ),
    ),
)]
async fn read_role(
    State(pg_client): State<PgClient>,
    AuthState(_): AuthState,
    Path(path_params): Path<RolePathParams>,
) -> Result<(StatusCode, Json<RoleResponse>)> {
    let mut conn = pg_client.get_connection().await?;

    let Some(role) = conn.find_role_by_id(path_params.role_id).await? else {
        return Err(ErrorKind::NotFound.with_resource("role"));
    };

    Ok((StatusCode::OK, Json(role.into())))
}

/// Role together with the permission modules it grants.
#[must_use]
#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
struct RoleDetailResponse {
    #[serde(flatten)]
    pub role: RoleResponse,
    pub assigned_accounts: i64,
    pub modules: Vec<String>,
}

/// Gets a role with its granted modules and assignment count.
#[tracing::instrument(skip_all)]
#[utoipa::path(
    get, path = "/roles/{roleId}/detail", tag = "roles",
    params(RolePathParams),
    responses(
        (
            status = NOT_FOUND,
            description = "Role not found",
            body = ErrorResponse,
        ),
        (
            status = OK,
            description = "Role details with grants",
            body = RoleDetailResponse,
        ),
    ),
)]
async fn read_role_detail(
    State(pg_client): State<PgClient>,
    AuthState(_): AuthState,
    Path(path_params): Path<RolePathParams>,
) -> Result<(StatusCode, Json<RoleDetailResponse>)> {
    let mut conn = pg_client.get_connection().await?;

    let Some(role) = conn.find_role_by_id(path_params.role_id).await? else {
        return Err(ErrorKind::NotFound.with_resource("role"));
    };

    let assigned_accounts = conn.count_accounts_with_role(role.id).await?;
    let modules = conn.find_modules_for_role(role.id).await?;

    let response = RoleDetailResponse {
        role: role.into(),
        assigned_accounts,
        modules,
    };
    Ok((StatusCode::OK, Json(response)))
}

/// Request payload to update a role.
#[must_use]
#[derive(Debug, Serialize, Deserialize, ToSchema, Validate)]
#[serde(rename_all = "camelCase")]
struct UpdateRoleRequest {
    #[validate(length(min = 2, max = 64))]
    pub name: Option<String>,
    #[validate(length(max = 500))]
    pub description: Option<String>,
    #[schema(value_type = Option<String>, example = "inactive")]
    pub status: Option<EntityStatus>,
}

/// Updates a role by the role ID.
///
/// A status change cascades to every account assigned to the role and
/// to their staff and client profiles, in both directions.
#[tracing::instrument(skip_all)]
#[utoipa::path(
    patch, path = "/roles/{roleId}", tag = "roles",
    params(RolePathParams),
    request_body(
        content = UpdateRoleRequest,
        description = "Role changes",
        content_type = "application/json",
    ),
    responses(
        (
            status = NOT_FOUND,
            description = "Role not found",
            body = ErrorResponse,
        ),
        (
            status = CONFLICT,
            description = "Role name already taken",
            body = ErrorResponse,
        ),
        (
            status = OK,
            description = "Role updated",
            body = RoleResponse,
        ),
    ),
)]
async fn update_role(
    State(pg_client): State<PgClient>,
    AuthState(auth_claims): AuthState,
    Path(path_params): Path<RolePathParams>,
    ValidateJson(request): ValidateJson<UpdateRoleRequest>,
) -> Result<(StatusCode, Json<RoleResponse>)> {
    let mut conn = pg_client.get_connection().await?;

    let Some(current) = conn.find_role_by_id(path_params.role_id).await? else {
        return Err(ErrorKind::NotFound.with_resource("role"));
    };

    let updates = UpdateRole {
        name: request.name,
        description: request.description,
        updated_at: Some(Timestamp::now().into()),
        ..Default::default()
    };
    let mut role = conn.update_role(path_params.role_id, updates).await?;

    if let Some(status) = request.status
        && status != current.status
    {
        role = conn
            .set_role_status_cascading(path_params.role_id, status)
            .await?;
    }

    tracing::info!(
        target: TRACING_TARGET,
        account_id = auth_claims.account_id.to_string(),
        role_id = path_params.role_id.to_string(),
        "role updated",
    );

    Ok((StatusCode::OK, Json(role.into())))
}

/// Response returned when a referenced role is deactivated instead of
/// deleted.
#[must_use]
#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
struct DeactivatedRoleResponse {
    pub id: Uuid,
    pub message: String,
}

/// Deletes a role, or deactivates it when active accounts still
/// reference it.
///
/// Returns `204 No Content` after a hard delete and `200 OK` with an
/// explanatory message after a deactivation.
#[tracing::instrument(skip_all)]
#[utoipa::path(
    delete, path = "/roles/{roleId}", tag = "roles",
    params(RolePathParams),
    responses(
        (
            status = NOT_FOUND,
            description = "Role not found",
            body = ErrorResponse,
        ),
        (
            status = OK,
            description = "Role deactivated because accounts reference it",
            body = DeactivatedRoleResponse,
        ),
        (
            status = NO_CONTENT,
            description = "Role deleted",
        ),
    ),
)]
async fn delete_role(
    State(pg_client): State<PgClient>,
    AuthState(auth_claims): AuthState,
    Path(path_params): Path<RolePathParams>,
) -> Result<axum::response::Response> {
    use axum::response::IntoResponse;

    let mut conn = pg_client.get_connection().await?;

    if conn.find_role_by_id(path_params.role_id).await?.is_none() {
        return Err(ErrorKind::NotFound.with_resource("role"));
    }

    let assigned = conn
        .count_active_accounts_with_role(path_params.role_id)
        .await?;
    if assigned > 0 {
        conn.set_role_status_cascading(path_params.role_id, EntityStatus::Inactive)
            .await?;

        tracing::warn!(
            target: TRACING_TARGET,
            account_id = auth_claims.account_id.to_string(),
            role_id = path_params.role_id.to_string(),
            assigned_accounts = assigned,
            "role deactivated instead of deleted",
        );

        let response = DeactivatedRoleResponse {
            id: path_params.role_id,
            message: format!(
                "Role is assigned to {assigned} active account(s) and was deactivated instead of deleted"
            ),
        };
        return Ok((StatusCode::OK, Json(response)).into_response());
    }

    conn.delete_role(path_params.role_id).await?;

    tracing::warn!(
        target: TRACING_TARGET,
        account_id = auth_claims.account_id.to_string(),
        role_id = path_params.role_id.to_string(),
        "role deleted",
    );

    Ok(StatusCode::NO_CONTENT.into_response())
}

/// Toggles a role between active and inactive.
///
/// The new status cascades to the accounts assigned to the role and to
/// their staff and client profiles, in both directions.
#[tracing::instrument(skip_all)]
#[utoipa::path(
    post, path = "/roles/{roleId}/toggle-status", tag = "roles",
    params(RolePathParams),
    responses(
        (
            status = NOT_FOUND,
            description = "Role not found",
            body = ErrorResponse,
        ),
        (
            status = OK,
            description = "Role status toggled",
            body = RoleResponse,
        ),
    ),
)]
async fn toggle_role_status(
    State(pg_client): State<PgClient>,
    AuthState(auth_claims): AuthState,
    Path(path_params): Path<RolePathParams>,
) -> Result<(StatusCode, Json<RoleResponse>)> {
    let mut conn = pg_client.get_connection().await?;

    let Some(role) = conn.find_role_by_id(path_params.role_id).await? else {
        return Err(ErrorKind::NotFound.with_resource("role"));
    };

    let next_status = role.status.toggled();
    let role = conn
        .set_role_status_cascading(path_params.role_id, next_status)
        .await?;

    tracing::info!(
        target: TRACING_TARGET,
        account_id = auth_claims.account_id.to_string(),
        role_id = path_params.role_id.to_string(),
        status = %role.status,
        "role status toggled",
    );

    Ok((StatusCode::OK, Json(role.into())))
}

/// Returns a [`Router`] with all related routes.
///
/// [`Router`]: axum::routing::Router
pub fn routes() -> OpenApiRouter<ServiceState> {
    OpenApiRouter::new()
        .routes(routes!(create_role, list_roles))
        .routes(routes!(list_active_roles))
        .routes(routes!(list_inactive_roles))
        .routes(routes!(read_role, update_role, delete_role))
        .routes(routes!(read_role_detail))
        .routes(routes!(toggle_role_status))
}
