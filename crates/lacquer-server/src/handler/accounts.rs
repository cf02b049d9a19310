use axum::extract::State;
use axum::http::StatusCode;
use lacquer_postgres::PgClient;
use lacquer_postgres::model::Account;
use lacquer_postgres::query::AccountRepository;
use lacquer_postgres::types::EntityStatus;
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use utoipa_axum::router::OpenApiRouter;
use utoipa_axum::routes;
use uuid::Uuid;

use crate::extract::{AuthState, Json, Path, Query};
use crate::handler::request::PaginationParams;
use crate::handler::{ErrorKind, ErrorResponse, Result};
use crate::service::ServiceState;

/// Tracing target for account directory operations.
const TRACING_TARGET: &str = "lacquer_server::handler::accounts";

/// `Path` param for `{accountId}` handlers.
#[must_use]
#[derive(Debug, Serialize, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
pub struct AccountPathParams {
    /// Unique identifier of the account.
    pub account_id: Uuid,
}

/// Account projection without credential material.
///
/// This is the wire contract the catalog service consumes to resolve
/// caller identities, so the field set must stay stable.
#[must_use]
#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AccountResponse {
    pub id: Uuid,
    pub username: String,
    pub email: String,
    pub given_name: String,
    pub family_name: String,
    pub role_id: Option<Uuid>,
    #[schema(value_type = String, example = "active")]
    pub status: EntityStatus,
}

impl From<Account> for AccountResponse {
    fn from(account: Account) -> Self {
        Self {
            id: account.id,
            username: account.username,
            email: account.email,
            given_name: account.given_name,
            family_name: account.family_name,
            role_id: account.role_id,
            status: account.status,
        }
    }
}

/// Gets an account projection by its account ID.
#[tracing::instrument(skip_all)]
#[utoipa::path(
    get, path = "/accounts/{accountId}", tag = "accounts",
    params(AccountPathParams),
    responses(
        (
            status = NOT_FOUND,
            description = "Account not found",
            body = ErrorResponse,
        ),
        (
            status = OK,
            description = "Account projection",
            body = AccountResponse,
        ),
    ),
)]
async fn read_account(
    State(pg_client): State<PgClient>,
    Path(path_params): Path<AccountPathParams>,
) -> Result<(StatusCode, Json<AccountResponse>)> {
    let mut conn = pg_client.get_connection().await?;

    let Some(account) = conn.find_account_by_id(path_params.account_id).await? else {
        return Err(ErrorKind::NotFound.with_resource("account"));
    };

    tracing::debug!(
        target: TRACING_TARGET,
        account_id = path_params.account_id.to_string(),
        "served account projection",
    );

    Ok((StatusCode::OK, Json(account.into())))
}

/// Response for listing accounts.
#[must_use]
#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
struct ListAccountsResponse {
    pub accounts: Vec<AccountResponse>,
}

/// Returns all accounts ordered by username.
#[tracing::instrument(skip_all)]
#[utoipa::path(
    get, path = "/accounts", tag = "accounts",
    params(PaginationParams),
    responses(
        (
            status = INTERNAL_SERVER_ERROR,
            description = "Internal server error",
            body = ErrorResponse,
        ),
        (
            status = OK,
            description = "Accounts listed",
            body = ListAccountsResponse,
        ),
    ),
)]
async fn list_accounts(
    State(pg_client): State<PgClient>,
    AuthState(_): AuthState,
    Query(pagination): Query<PaginationParams>,
) -> Result<(StatusCode, Json<ListAccountsResponse>)> {
    let mut conn = pg_client.get_connection().await?;

    let accounts = conn.list_accounts(pagination.into()).await?;
    let response = ListAccountsResponse {
        accounts: accounts.into_iter().map(AccountResponse::from).collect(),
    };

    Ok((StatusCode::OK, Json(response)))
}

/// Returns a [`Router`] with the authenticated account routes.
///
/// [`Router`]: axum::routing::Router
pub fn routes() -> OpenApiRouter<ServiceState> {
    OpenApiRouter::new().routes(routes!(list_accounts))
}

/// Returns a [`Router`] with the directory route sibling services call
/// without a session token.
///
/// [`Router`]: axum::routing::Router
pub fn internal_routes() -> OpenApiRouter<ServiceState> {
    OpenApiRouter::new().routes(routes!(read_account))
}
