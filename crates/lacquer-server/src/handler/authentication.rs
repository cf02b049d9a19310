use axum::extract::State;
use axum::http::StatusCode;
use jiff::Timestamp;
use lacquer_postgres::PgClient;
use lacquer_postgres::query::AccountRepository;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use utoipa_axum::router::OpenApiRouter;
use utoipa_axum::routes;
use uuid::Uuid;
use validator::Validate;

use crate::extract::{AuthClaims, Json, ValidateJson};
use crate::handler::{ErrorKind, ErrorResponse, Result};
use crate::service::{AuthKeys, PasswordHasher, ServiceState};

/// Tracing target for authentication operations.
const TRACING_TARGET: &str = "lacquer_server::handler::authentication";

/// Request payload for signing in.
#[must_use]
#[derive(Debug, Serialize, Deserialize, ToSchema, Validate)]
#[serde(rename_all = "camelCase")]
struct LoginRequest {
    #[validate(length(min = 3, max = 64))]
    pub username: String,
    #[validate(length(min = 8, max = 128))]
    pub password: String,
}

/// Response returned after a successful sign-in.
#[must_use]
#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
struct LoginResponse {
    pub token: String,
    pub account_id: Uuid,
    pub role_id: Option<Uuid>,
    #[schema(value_type = String)]
    pub expires_at: Timestamp,
}

/// Authenticates an account and issues a session token.
#[tracing::instrument(skip_all)]
#[utoipa::path(
    post, path = "/auth/login", tag = "authentication",
    request_body(
        content = LoginRequest,
        description = "Account credentials",
        content_type = "application/json",
    ),
    responses(
        (
            status = BAD_REQUEST,
            description = "Bad request",
            body = ErrorResponse,
        ),
        (
            status = UNAUTHORIZED,
            description = "Invalid credentials",
            body = ErrorResponse,
        ),
        (
            status = OK,
            description = "Signed in",
            body = LoginResponse,
        ),
    ),
)]
async fn login(
    State(pg_client): State<PgClient>,
    State(auth_keys): State<AuthKeys>,
    State(password_hasher): State<PasswordHasher>,
    ValidateJson(request): ValidateJson<LoginRequest>,
) -> Result<(StatusCode, Json<LoginResponse>)> {
    let mut conn = pg_client.get_connection().await?;

    let account = conn
        .find_account_by_username(&request.username)
        .await?
        .ok_or_else(|| {
            tracing::debug!(
                target: TRACING_TARGET,
                username = %request.username,
                "sign-in attempt for unknown username",
            );
            // Same error as a wrong password so usernames cannot be probed
            ErrorKind::Unauthorized
                .with_message("Invalid username or password")
                .with_resource("authentication")
        })?;

    if !account.is_active() {
        tracing::warn!(
            target: TRACING_TARGET,
            account_id = account.id.to_string(),
            "sign-in attempt for deactivated account",
        );
        return Err(ErrorKind::Unauthorized
            .with_message("Account is deactivated")
            .with_resource("authentication"));
    }

    password_hasher.verify_password(&request.password, &account.password_hash)?;

    let claims = AuthClaims::issue(&account);
    let token = claims.encode(&auth_keys)?;

    tracing::info!(
        target: TRACING_TARGET,
        account_id = account.id.to_string(),
        token_id = claims.token_id.to_string(),
        "account signed in",
    );

    let response = LoginResponse {
        token,
        account_id: account.id,
        role_id: account.role_id,
        expires_at: claims.expires_at,
    };
    Ok((StatusCode::OK, Json(response)))
}

/// Returns a [`Router`] with all related routes.
///
/// [`Router`]: axum::routing::Router
pub fn routes() -> OpenApiRouter<ServiceState> {
    OpenApiRouter::new().routes(routes!(login))
}
