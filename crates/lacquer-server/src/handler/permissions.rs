use axum::extract::State;
use axum::http::StatusCode;
use jiff::Timestamp;
use lacquer_postgres::PgClient;
use lacquer_postgres::model::Permission;
use lacquer_postgres::query::PermissionRepository;
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use utoipa_axum::router::OpenApiRouter;
use utoipa_axum::routes;
use uuid::Uuid;

use crate::extract::{AuthState, Json, Path};
use crate::handler::{ErrorKind, ErrorResponse, Result};
use crate::service::ServiceState;

/// `Path` param for `{permissionId}` handlers.
#[must_use]
#[derive(Debug, Serialize, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
pub struct PermissionPathParams {
    /// Unique identifier of the permission.
    pub permission_id: Uuid,
}

/// Permission representation returned by all permission handlers.
#[must_use]
#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PermissionResponse {
    pub id: Uuid,
    pub module: String,
    pub description: String,
    #[schema(value_type = String)]
    pub created_at: Timestamp,
}

impl From<Permission> for PermissionResponse {
    fn from(permission: Permission) -> Self {
        Self {
            id: permission.id,
            module: permission.module,
            description: permission.description,
            created_at: permission.created_at.into(),
        }
    }
}

/// Response for listing permissions.
#[must_use]
#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
struct ListPermissionsResponse {
    pub permissions: Vec<PermissionResponse>,
}

/// Returns the full permission catalog.
///
/// Permissions are seeded by migrations; there is no create or delete
/// endpoint.
#[tracing::instrument(skip_all)]
#[utoipa::path(
    get, path = "/permissions", tag = "permissions",
    responses(
        (
            status = INTERNAL_SERVER_ERROR,
            description = "Internal server error",
            body = ErrorResponse,
        ),
        (
            status = OK,
            description = "Permissions listed",
            body = ListPermissionsResponse,
        ),
    ),
)]
async fn list_permissions(
    State(pg_client): State<PgClient>,
    AuthState(_): AuthState,
) -> Result<(StatusCode, Json<ListPermissionsResponse>)> {
    let mut conn = pg_client.get_connection().await?;

    let permissions = conn.list_permissions().await?;
    let response = ListPermissionsResponse {
        permissions: permissions.into_iter().map(PermissionResponse::from).collect(),
    };

    Ok((StatusCode::OK, Json(response)))
}

/// Gets a permission by its permission ID.
#[tracing::instrument(skip_all)]
#[utoipa::path(
    get, path = "/permissions/{permissionId}", tag = "permissions",
    params(PermissionPathParams),
    responses(
        (
            status = NOT_FOUND,
            description = "Permission not found",
            body = ErrorResponse,
        ),
        (
            status = OK,
            description = "Permission details",
            body = PermissionResponse,
        ),
    ),
)]
async fn read_permission(
    State(pg_client): State<PgClient>,
    AuthState(_): AuthState,
    Path(path_params): Path<PermissionPathParams>,
) -> Result<(StatusCode, Json<PermissionResponse>)> {
    let mut conn = pg_client.get_connection().await?;

    let Some(permission) = conn.find_permission_by_id(path_params.permission_id).await? else {
        return Err(ErrorKind::NotFound.with_resource("permission"));
    };

    Ok((StatusCode::OK, Json(permission.into())))
}

/// Returns a [`Router`] with all related routes.
///
/// [`Router`]: axum::routing::Router
pub fn routes() -> OpenApiRouter<ServiceState> {
    OpenApiRouter::new()
        .routes(routes!(list_permissions))
        .routes(routes!(read_permission))
}
