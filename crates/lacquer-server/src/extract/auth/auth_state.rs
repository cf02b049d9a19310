//! Authentication state extractor with database verification.
//!
//! [`AuthState`] validates the JWT token cryptographically and then checks
//! the account against current database state. Unlike [`AuthHeader`], it
//! guarantees the account still exists, is active, and holds the role the
//! token was issued for.

use axum::extract::{FromRef, FromRequestParts, OptionalFromRequestParts};
use axum::http::request::Parts;
use derive_more::Deref;
use lacquer_postgres::PgClient;
use lacquer_postgres::model::Account;
use lacquer_postgres::query::AccountRepository;

use super::{AuthClaims, AuthHeader};
use crate::TRACING_TARGET_AUTHENTICATION;
use crate::handler::{Error, ErrorKind, Result};
use crate::service::AuthKeys;

/// Authenticated user state verified against the database.
///
/// Extraction succeeds only when the JWT token is valid, the account still
/// exists and is active, and the role claim matches the account's current
/// role assignment. Role changes therefore take effect on the next request
/// rather than waiting for token expiry.
///
/// The verified state is cached in request extensions, so repeated
/// extraction within one request performs a single database lookup.
#[derive(Debug, Clone, Deref, PartialEq, Eq)]
pub struct AuthState(pub AuthClaims);

impl AuthState {
    /// Creates a new [`AuthState`] from pre-verified claims.
    ///
    /// Should only be used with claims that have already been verified
    /// against the database.
    #[inline]
    #[must_use]
    pub const fn from_verified_claims(auth_claims: AuthClaims) -> Self {
        Self(auth_claims)
    }

    /// Verifies JWT claims against the database and builds an [`AuthState`].
    ///
    /// # Errors
    ///
    /// Returns `Unauthorized` when the account no longer exists, has been
    /// deactivated, or its role assignment changed since the token was
    /// issued. Database failures map to `InternalServerError`.
    pub async fn from_unverified_header(
        auth_header: AuthHeader,
        pg_client: PgClient,
    ) -> Result<Self> {
        let auth_claims = auth_header.into_auth_claims();

        let mut conn = pg_client.get_connection().await.map_err(|db_error| {
            tracing::error!(
                target: TRACING_TARGET_AUTHENTICATION,
                error = %db_error,
                account_id = %auth_claims.account_id,
                token_id = %auth_claims.token_id,
                "database connection failed during authentication verification"
            );
            ErrorKind::InternalServerError
                .with_message("Authentication verification is temporarily unavailable")
                .with_resource("authentication")
        })?;

        let account = Self::verify_account_status(&mut conn, &auth_claims).await?;
        Self::verify_role_consistency(&auth_claims, &account)?;

        tracing::debug!(
            target: TRACING_TARGET_AUTHENTICATION,
            account_id = %auth_claims.account_id,
            token_id = %auth_claims.token_id,
            role_id = ?auth_claims.role_id,
            "authentication verification completed"
        );

        Ok(Self::from_verified_claims(auth_claims))
    }

    /// Verifies that the account exists and may authenticate.
    async fn verify_account_status(
        conn: &mut lacquer_postgres::PgConn,
        auth_claims: &AuthClaims,
    ) -> Result<Account> {
        let account = conn
            .find_account_by_id(auth_claims.account_id)
            .await
            .map_err(|db_error| {
                tracing::error!(
                    target: TRACING_TARGET_AUTHENTICATION,
                    error = %db_error,
                    account_id = %auth_claims.account_id,
                    token_id = %auth_claims.token_id,
                    "database error during account validation query"
                );
                ErrorKind::InternalServerError
                    .with_message("Account verification encountered an error")
                    .with_resource("authentication")
            })?
            .ok_or_else(|| {
                tracing::warn!(
                    target: TRACING_TARGET_AUTHENTICATION,
                    account_id = %auth_claims.account_id,
                    token_id = %auth_claims.token_id,
                    "authentication failed: account referenced in token no longer exists"
                );
                ErrorKind::Unauthorized
                    .with_message("Account not found")
                    .with_context("Your account may have been deactivated")
                    .with_resource("authentication")
            })?;

        if !account.is_active() {
            tracing::warn!(
                target: TRACING_TARGET_AUTHENTICATION,
                account_id = %auth_claims.account_id,
                token_id = %auth_claims.token_id,
                "authentication failed: account is deactivated"
            );
            return Err(ErrorKind::Unauthorized
                .with_message("Account is deactivated")
                .with_context("Contact an administrator to restore access")
                .with_resource("authentication"));
        }

        Ok(account)
    }

    /// Verifies that the role claim matches the account's current role.
    fn verify_role_consistency(auth_claims: &AuthClaims, account: &Account) -> Result<()> {
        if auth_claims.role_id != account.role_id {
            tracing::warn!(
                target: TRACING_TARGET_AUTHENTICATION,
                account_id = %auth_claims.account_id,
                token_id = %auth_claims.token_id,
                token_role = ?auth_claims.role_id,
                current_role = ?account.role_id,
                "role assignment changed since token was issued"
            );
            return Err(ErrorKind::Unauthorized
                .with_message("Your account role has changed")
                .with_context("Please sign in again to refresh your permissions")
                .with_resource("authentication"));
        }

        Ok(())
    }
}

impl<S> FromRequestParts<S> for AuthState
where
    S: Sync + Send + 'static,
    PgClient: FromRef<S>,
    AuthKeys: FromRef<S>,
{
    type Rejection = Error<'static>;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        // Check for cached auth state to avoid repeated database queries
        if let Some(auth_state) = parts.extensions.get::<Self>() {
            return Ok(auth_state.clone());
        }

        let auth_header = AuthHeader::from_request_parts(parts, state).await?;
        let pg_client = PgClient::from_ref(state);
        let auth_state = Self::from_unverified_header(auth_header, pg_client).await?;

        // Cache the verified state for subsequent extractors in the same request
        parts.extensions.insert(auth_state.clone());
        Ok(auth_state)
    }
}

impl<S> OptionalFromRequestParts<S> for AuthState
where
    S: Sync + Send + 'static,
    PgClient: FromRef<S>,
    AuthKeys: FromRef<S>,
{
    type Rejection = Error<'static>;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &S,
    ) -> Result<Option<Self>, Self::Rejection> {
        match <Self as FromRequestParts<S>>::from_request_parts(parts, state).await {
            Ok(auth_state) => Ok(Some(auth_state)),
            Err(_) => Ok(None),
        }
    }
}
