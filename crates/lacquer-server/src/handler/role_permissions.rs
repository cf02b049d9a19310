use axum::extract::State;
use axum::http::StatusCode;
use jiff::Timestamp;
use lacquer_postgres::PgClient;
use lacquer_postgres::model::{NewRolePermission, Permission, RolePermission};
use lacquer_postgres::query::{PermissionRepository, RolePermissionRepository, RoleRepository};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use utoipa_axum::router::OpenApiRouter;
use utoipa_axum::routes;
use uuid::Uuid;
use validator::Validate;

use crate::extract::{AuthState, Json, Path, Query, ValidateJson};
use crate::handler::request::PaginationParams;
use crate::handler::roles::RoleResponse;
use crate::handler::{ErrorKind, ErrorResponse, Result};
use crate::service::ServiceState;

/// Tracing target for permission grant operations.
const TRACING_TARGET: &str = "lacquer_server::handler::role_permissions";

/// `Path` param for `{linkId}` handlers.
#[must_use]
#[derive(Debug, Serialize, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
pub struct LinkPathParams {
    /// Unique identifier of the grant.
    pub link_id: Uuid,
}

/// `Path` param for `{roleId}` scoped handlers.
#[must_use]
#[derive(Debug, Serialize, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
pub struct RolePathParams {
    /// Unique identifier of the role.
    pub role_id: Uuid,
}

/// Grant representation returned by the grant handlers.
#[must_use]
#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RolePermissionResponse {
    pub id: Uuid,
    pub role_id: Uuid,
    pub permission_id: Uuid,
    #[schema(value_type = String)]
    pub created_at: Timestamp,
}

impl From<RolePermission> for RolePermissionResponse {
    fn from(link: RolePermission) -> Self {
        Self {
            id: link.id,
            role_id: link.role_id,
            permission_id: link.permission_id,
            created_at: link.created_at.into(),
        }
    }
}

/// Request payload for granting a permission to a role.
#[must_use]
#[derive(Debug, Clone, Copy, Serialize, Deserialize, ToSchema, Validate)]
#[serde(rename_all = "camelCase")]
struct CreateRolePermissionRequest {
    pub role_id: Uuid,
    pub permission_id: Uuid,
}

/// Grants a permission to a role.
#[tracing::instrument(skip_all)]
#[utoipa::path(
    post, path = "/role-permissions", tag = "role-permissions",
    request_body(
        content = CreateRolePermissionRequest,
        description = "New grant",
        content_type = "application/json",
    ),
    responses(
        (
            status = BAD_REQUEST,
            description = "Role or permission does not exist",
            body = ErrorResponse,
        ),
        (
            status = CONFLICT,
            description = "Grant already exists",
            body = ErrorResponse,
        ),
        (
            status = CREATED,
            description = "Grant created",
            body = RolePermissionResponse,
        ),
    ),
)]
async fn create_role_permission(
    State(pg_client): State<PgClient>,
    AuthState(auth_claims): AuthState,
    ValidateJson(request): ValidateJson<CreateRolePermissionRequest>,
) -> Result<(StatusCode, Json<RolePermissionResponse>)> {
    let mut conn = pg_client.get_connection().await?;

    if conn.find_role_by_id(request.role_id).await?.is_none() {
        return Err(ErrorKind::BadRequest
            .with_message("The referenced role does not exist")
            .with_resource("role"));
    }
    if conn
        .find_permission_by_id(request.permission_id)
        .await?
        .is_none()
    {
        return Err(ErrorKind::BadRequest
            .with_message("The referenced permission does not exist")
            .with_resource("permission"));
    }

    if conn
        .role_permission_exists(request.role_id, request.permission_id)
        .await?
    {
        return Err(ErrorKind::Conflict
            .with_message("The role already holds this permission")
            .with_resource("role-permission"));
    }

    let new_link = NewRolePermission {
        role_id: request.role_id,
        permission_id: request.permission_id,
    };
    let link = conn.create_role_permission(new_link).await?;

    tracing::info!(
        target: TRACING_TARGET,
        account_id = auth_claims.account_id.to_string(),
        role_id = request.role_id.to_string(),
        permission_id = request.permission_id.to_string(),
        "permission granted to role",
    );

    Ok((StatusCode::CREATED, Json(link.into())))
}

/// Response for listing grants.
#[must_use]
#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
struct ListRolePermissionsResponse {
    pub role_permissions: Vec<RolePermissionResponse>,
}

/// Returns all grants.
#[tracing::instrument(skip_all)]
#[utoipa::path(
    get, path = "/role-permissions", tag = "role-permissions",
    params(PaginationParams),
    responses(
        (
            status = OK,
            description = "Grants listed",
            body = ListRolePermissionsResponse,
        ),
    ),
)]
async fn list_role_permissions(
    State(pg_client): State<PgClient>,
    AuthState(_): AuthState,
    Query(pagination): Query<PaginationParams>,
) -> Result<(StatusCode, Json<ListRolePermissionsResponse>)> {
    let mut conn = pg_client.get_connection().await?;

    let links = conn.list_role_permissions(pagination.into()).await?;
    let response = ListRolePermissionsResponse {
        role_permissions: links
            .into_iter()
            .map(RolePermissionResponse::from)
            .collect(),
    };

    Ok((StatusCode::OK, Json(response)))
}

/// Gets a grant by its link ID.
#[tracing::instrument(skip_all)]
#[utoipa::path(
    get, path = "/role-permissions/{linkId}", tag = "role-permissions",
    params(LinkPathParams),
    responses(
        (
            status = NOT_FOUND,
            description = "Grant not found",
            body = ErrorResponse,
        ),
        (
            status = OK,
            description = "Grant details",
            body = RolePermissionResponse,
        ),
    ),
)]
async fn read_role_permission(
    State(pg_client): State<PgClient>,
    AuthState(_): AuthState,
    Path(path_params): Path<LinkPathParams>,
) -> Result<(StatusCode, Json<RolePermissionResponse>)> {
    let mut conn = pg_client.get_connection().await?;

    let Some(link) = conn.find_role_permission_by_id(path_params.link_id).await? else {
        return Err(ErrorKind::NotFound.with_resource("role-permission"));
    };

    Ok((StatusCode::OK, Json(link.into())))
}

/// Revokes a grant by its link ID.
#[tracing::instrument(skip_all)]
#[utoipa::path(
    delete, path = "/role-permissions/{linkId}", tag = "role-permissions",
    params(LinkPathParams),
    responses(
        (
            status = NOT_FOUND,
            description = "Grant not found",
            body = ErrorResponse,
        ),
        (
            status = NO_CONTENT,
            description = "Grant revoked",
        ),
    ),
)]
async fn delete_role_permission(
    State(pg_client): State<PgClient>,
    AuthState(auth_claims): AuthState,
    Path(path_params): Path<LinkPathParams>,
) -> Result<StatusCode> {
    let mut conn = pg_client.get_connection().await?;

    let removed = conn.delete_role_permission(path_params.link_id).await?;
    if removed == 0 {
        return Err(ErrorKind::NotFound.with_resource("role-permission"));
    }

    tracing::info!(
        target: TRACING_TARGET,
        account_id = auth_claims.account_id.to_string(),
        link_id = path_params.link_id.to_string(),
        "permission grant revoked",
    );

    Ok(StatusCode::NO_CONTENT)
}

/// One grant joined with its permission.
#[must_use]
#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
struct GrantResponseItem {
    pub id: Uuid,
    pub permission_id: Uuid,
    pub module: String,
    pub description: String,
}

impl From<(RolePermission, Permission)> for GrantResponseItem {
    fn from((link, permission): (RolePermission, Permission)) -> Self {
        Self {
            id: link.id,
            permission_id: permission.id,
            module: permission.module,
            description: permission.description,
        }
    }
}

/// Response for listing the grants of one role.
#[must_use]
#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
struct RoleGrantsResponse {
    pub role_id: Uuid,
    pub grants: Vec<GrantResponseItem>,
}

/// Returns the grants of one role with permission details.
#[tracing::instrument(skip_all)]
#[utoipa::path(
    get, path = "/role-permissions/by-role/{roleId}", tag = "role-permissions",
    params(RolePathParams),
    responses(
        (
            status = NOT_FOUND,
            description = "Role not found",
            body = ErrorResponse,
        ),
        (
            status = OK,
            description = "Grants of the role",
            body = RoleGrantsResponse,
        ),
    ),
)]
async fn list_grants_for_role(
    State(pg_client): State<PgClient>,
    AuthState(_): AuthState,
    Path(path_params): Path<RolePathParams>,
) -> Result<(StatusCode, Json<RoleGrantsResponse>)> {
    let mut conn = pg_client.get_connection().await?;

    if conn.find_role_by_id(path_params.role_id).await?.is_none() {
        return Err(ErrorKind::NotFound.with_resource("role"));
    }

    let grants = conn.find_grants_for_role(path_params.role_id).await?;
    let response = RoleGrantsResponse {
        role_id: path_params.role_id,
        grants: grants.into_iter().map(GrantResponseItem::from).collect(),
    };

    Ok((StatusCode::OK, Json(response)))
}

/// `Query` params for the modules-by-role endpoint.
#[must_use]
#[derive(Debug, Serialize, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
pub struct ModulesByRoleParams {
    /// Role to resolve modules for.
    pub role_id: Uuid,
}

/// Deduplicated permission module names of one role.
///
/// This is the wire contract the catalog service consumes to make its
/// authorization decisions.
#[must_use]
#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
struct ModulesByRoleResponse {
    pub role_id: Uuid,
    pub modules: Vec<String>,
}

/// Resolves the permission modules a role holds.
///
/// Unknown roles yield an empty module list rather than an error, so a
/// stale role reference denies access instead of failing the caller.
#[tracing::instrument(skip_all)]
#[utoipa::path(
    get, path = "/role-permissions/modules-by-role", tag = "role-permissions",
    params(ModulesByRoleParams),
    responses(
        (
            status = INTERNAL_SERVER_ERROR,
            description = "Internal server error",
            body = ErrorResponse,
        ),
        (
            status = OK,
            description = "Modules resolved",
            body = ModulesByRoleResponse,
        ),
    ),
)]
async fn modules_by_role(
    State(pg_client): State<PgClient>,
    Query(params): Query<ModulesByRoleParams>,
) -> Result<(StatusCode, Json<ModulesByRoleResponse>)> {
    let mut conn = pg_client.get_connection().await?;

    let modules = conn.find_modules_for_role(params.role_id).await?;

    tracing::debug!(
        target: TRACING_TARGET,
        role_id = params.role_id.to_string(),
        modules = modules.len(),
        "resolved modules for role",
    );

    let response = ModulesByRoleResponse {
        role_id: params.role_id,
        modules,
    };
    Ok((StatusCode::OK, Json(response)))
}

/// `Query` params for the roles-by-module endpoint.
#[must_use]
#[derive(Debug, Serialize, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
pub struct RolesByModuleParams {
    /// Module name to resolve roles for.
    pub module: String,
}

/// Response for listing the roles granted a module.
#[must_use]
#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
struct RolesByModuleResponse {
    pub module: String,
    pub roles: Vec<RoleResponse>,
}

/// Returns the roles holding a permission module.
#[tracing::instrument(skip_all)]
#[utoipa::path(
    get, path = "/role-permissions/roles-by-module", tag = "role-permissions",
    params(RolesByModuleParams),
    responses(
        (
            status = OK,
            description = "Roles resolved",
            body = RolesByModuleResponse,
        ),
    ),
)]
async fn roles_by_module(
    State(pg_client): State<PgClient>,
    AuthState(_): AuthState,
    Query(params): Query<RolesByModuleParams>,
) -> Result<(StatusCode, Json<RolesByModuleResponse>)> {
    let mut conn = pg_client.get_connection().await?;

    let roles = conn.find_roles_for_module(&params.module).await?;
    let response = RolesByModuleResponse {
        module: params.module,
        roles: roles.into_iter().map(RoleResponse::from).collect(),
    };

    Ok((StatusCode::OK, Json(response)))
}

/// Request payload for granting several permissions to one role.
#[must_use]
#[derive(Debug, Serialize, Deserialize, ToSchema, Validate)]
#[serde(rename_all = "camelCase")]
struct BatchGrantRequest {
    pub role_id: Uuid,
    #[validate(length(min = 1, max = 100))]
    pub permission_ids: Vec<Uuid>,
}

/// Outcome of one permission in a batch grant.
#[must_use]
#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
struct BatchGrantItem {
    pub permission_id: Uuid,
    /// `created`, `duplicate` or `unknown-permission`.
    pub outcome: String,
    pub link_id: Option<Uuid>,
}

/// Response for a batch grant.
#[must_use]
#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
struct BatchGrantResponse {
    pub role_id: Uuid,
    pub items: Vec<BatchGrantItem>,
}

/// Grants several permissions to a role in one request.
///
/// Answers `201 Created` when every grant was created and `207
/// Multi-Status` when some entries were duplicates or referenced unknown
/// permissions; the response itemizes each outcome.
#[tracing::instrument(skip_all)]
#[utoipa::path(
    post, path = "/role-permissions/batch", tag = "role-permissions",
    request_body(
        content = BatchGrantRequest,
        description = "Permissions to grant",
        content_type = "application/json",
    ),
    responses(
        (
            status = BAD_REQUEST,
            description = "Role does not exist",
            body = ErrorResponse,
        ),
        (
            status = CREATED,
            description = "All grants created",
            body = BatchGrantResponse,
        ),
        (
            status = MULTI_STATUS,
            description = "Partial success, see items",
            body = BatchGrantResponse,
        ),
    ),
)]
async fn batch_grant(
    State(pg_client): State<PgClient>,
    AuthState(auth_claims): AuthState,
    ValidateJson(request): ValidateJson<BatchGrantRequest>,
) -> Result<(StatusCode, Json<BatchGrantResponse>)> {
    let mut conn = pg_client.get_connection().await?;

    if conn.find_role_by_id(request.role_id).await?.is_none() {
        return Err(ErrorKind::BadRequest
            .with_message("The referenced role does not exist")
            .with_resource("role"));
    }

    let mut items = Vec::with_capacity(request.permission_ids.len());
    for permission_id in request.permission_ids {
        if conn.find_permission_by_id(permission_id).await?.is_none() {
            items.push(BatchGrantItem {
                permission_id,
                outcome: "unknown-permission".to_owned(),
                link_id: None,
            });
            continue;
        }

        if conn
            .role_permission_exists(request.role_id, permission_id)
            .await?
        {
            items.push(BatchGrantItem {
                permission_id,
                outcome: "duplicate".to_owned(),
                link_id: None,
            });
            continue;
        }

        let new_link = NewRolePermission {
            role_id: request.role_id,
            permission_id,
        };
        let link = conn.create_role_permission(new_link).await?;
        items.push(BatchGrantItem {
            permission_id,
            outcome: "created".to_owned(),
            link_id: Some(link.id),
        });
    }

    let all_created = items.iter().all(|item| item.outcome == "created");
    let status = if all_created {
        StatusCode::CREATED
    } else {
        StatusCode::MULTI_STATUS
    };

    tracing::info!(
        target: TRACING_TARGET,
        account_id = auth_claims.account_id.to_string(),
        role_id = request.role_id.to_string(),
        granted = items.iter().filter(|i| i.outcome == "created").count(),
        skipped = items.iter().filter(|i| i.outcome != "created").count(),
        "batch grant processed",
    );

    let response = BatchGrantResponse {
        role_id: request.role_id,
        items,
    };
    Ok((status, Json(response)))
}

/// Returns a [`Router`] with all related routes.
///
/// [`Router`]: axum::routing::Router
pub fn routes() -> OpenApiRouter<ServiceState> {
    OpenApiRouter::new()
        .routes(routes!(create_role_permission, list_role_permissions))
        .routes(routes!(roles_by_module))
        .routes(routes!(batch_grant))
        .routes(routes!(list_grants_for_role))
        .routes(routes!(read_role_permission, delete_role_permission))
}

/// Returns a [`Router`] with the routes sibling services call without a
/// session token.
///
/// [`Router`]: axum::routing::Router
pub fn internal_routes() -> OpenApiRouter<ServiceState> {
    OpenApiRouter::new().routes(routes!(modules_by_role))
}
