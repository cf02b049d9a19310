//! Remote identity extraction from bearer tokens.

use axum::extract::{FromRef, FromRequestParts, OptionalFromRequestParts};
use axum::http::request::Parts;
use axum_extra::TypedHeader;
use axum_extra::headers::Authorization;
use axum_extra::headers::authorization::Bearer;
use uuid::Uuid;

use crate::handler::{Error, ErrorKind};
use crate::service::IdentityResolver;

/// The caller's identity as the backend directory knows it.
///
/// An explicit projection rather than the upstream account schema: the
/// gate only acts on these three facts and stays insulated from
/// directory payload changes.
#[must_use]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemoteIdentity {
    /// Account that owns the session token.
    pub account_id: Uuid,
    /// Role assigned to the account, if any.
    pub role_id: Option<Uuid>,
    /// Whether the account is active upstream.
    pub is_active: bool,
}

impl<S> FromRequestParts<S> for RemoteIdentity
where
    S: Send + Sync,
    IdentityResolver: FromRef<S>,
{
    type Rejection = Error<'static>;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        match <Self as OptionalFromRequestParts<S>>::from_request_parts(parts, state).await? {
            Some(identity) => Ok(identity),
            None => Err(ErrorKind::Unauthorized.with_resource("identity")),
        }
    }
}

impl<S> OptionalFromRequestParts<S> for RemoteIdentity
where
    S: Send + Sync,
    IdentityResolver: FromRef<S>,
{
    type Rejection = Error<'static>;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &S,
    ) -> Result<Option<Self>, Self::Rejection> {
        if let Some(identity) = parts.extensions.get::<Option<RemoteIdentity>>() {
            return Ok(identity.clone());
        }

        let bearer = <TypedHeader<Authorization<Bearer>> as OptionalFromRequestParts<S>>
            ::from_request_parts(parts, state)
            .await
            .ok()
            .flatten();

        let identity = match bearer {
            Some(TypedHeader(bearer)) => {
                let resolver = IdentityResolver::from_ref(state);
                resolver.resolve(bearer.token()).await
            }
            None => None,
        };

        parts.extensions.insert(identity.clone());
        Ok(identity)
    }
}
