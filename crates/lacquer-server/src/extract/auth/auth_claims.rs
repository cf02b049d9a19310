use std::borrow::Cow;

use jiff::{Span, Timestamp};
use jsonwebtoken::{Algorithm, Header, Validation, decode, encode};
use lacquer_postgres::model::Account;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::TRACING_TARGET_AUTHENTICATION;
use crate::handler::{ErrorKind, Result};
use crate::service::AuthKeys;

/// JWT claims for authentication tokens.
///
/// Contains the RFC 7519 registered claims plus the account's role, which
/// sibling services use to resolve permissions without a callback per
/// request. Timestamps are serialized as Unix seconds as the JWT spec
/// requires.
#[derive(Debug, Clone, Deserialize, Serialize, Hash, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct AuthClaims {
    // Standard (or registered) claims.
    /// Issuer (who created the token).
    #[serde(rename = "iss")]
    issued_by: Cow<'static, str>,
    /// Audience (who the token is intended for).
    #[serde(rename = "aud")]
    audience: Cow<'static, str>,

    /// JWT ID (unique identifier for token, useful for revocation).
    #[serde(rename = "jti")]
    pub token_id: Uuid,
    /// Subject ID (unique identifier for the associated account).
    #[serde(rename = "sub")]
    pub account_id: Uuid,

    /// Issued at (as Unix seconds).
    #[serde(rename = "iat", with = "jiff::fmt::serde::timestamp::second::required")]
    pub issued_at: Timestamp,
    /// Expiration time (as Unix seconds).
    #[serde(rename = "exp", with = "jiff::fmt::serde::timestamp::second::required")]
    pub expires_at: Timestamp,

    // Private (or custom) claims.
    /// Role held by the account when the token was issued.
    #[serde(rename = "rol")]
    pub role_id: Option<Uuid>,
}

impl AuthClaims {
    /// Default JWT audience identifier for authentication tokens.
    const JWT_AUDIENCE: &str = "lacquer:api";
    /// Default JWT issuer identifier for authentication tokens.
    const JWT_ISSUER: &str = "lacquer";
    /// Token lifetime in hours.
    const TOKEN_TTL_HOURS: i64 = 8;

    /// Creates claims for a freshly authenticated account.
    pub fn issue(account: &Account) -> Self {
        let issued_at = Timestamp::now();
        let expires_at = issued_at + Span::new().hours(Self::TOKEN_TTL_HOURS);

        Self {
            issued_by: Cow::Borrowed(Self::JWT_ISSUER),
            audience: Cow::Borrowed(Self::JWT_AUDIENCE),
            token_id: Uuid::new_v4(),
            account_id: account.id,
            issued_at,
            expires_at,
            role_id: account.role_id,
        }
    }

    /// Checks if the token has expired based on current UTC time.
    #[inline]
    #[must_use]
    pub fn is_expired(&self) -> bool {
        self.expires_at <= Timestamp::now()
    }

    /// Encodes the claims into a signed HS256 JWT.
    ///
    /// # Errors
    ///
    /// Returns an internal server error if encoding fails.
    pub fn encode(&self, keys: &AuthKeys) -> Result<String> {
        let header = Header::new(Algorithm::HS256);
        encode(&header, self, keys.encoding_key()).map_err(|e| {
            tracing::error!(
                target: TRACING_TARGET_AUTHENTICATION,
                error = %e,
                account_id = %self.account_id,
                "failed to encode JWT token"
            );

            ErrorKind::InternalServerError
                .with_message("Authentication token generation failed")
                .with_resource("authentication")
        })
    }

    /// Parses and validates a JWT token.
    ///
    /// Validates the HS256 signature, the registered claims, issuer and
    /// audience, and rejects expired tokens.
    ///
    /// # Errors
    ///
    /// Returns authentication errors for invalid or expired tokens.
    pub fn decode(token: &str, keys: &AuthKeys) -> Result<Self> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.validate_exp = true;
        validation.validate_aud = true;
        validation.set_audience(&[Self::JWT_AUDIENCE]);
        validation.set_issuer(&[Self::JWT_ISSUER]);
        validation.set_required_spec_claims(&["iss", "aud", "jti", "sub", "iat", "exp"]);

        let token_data = decode::<Self>(token, keys.decoding_key(), &validation)?;
        let claims = token_data.claims;

        // Double-check expiration to cover clock leeway
        if claims.is_expired() {
            tracing::warn!(
                target: TRACING_TARGET_AUTHENTICATION,
                token_id = %claims.token_id,
                account_id = %claims.account_id,
                expired_at = %claims.expires_at,
                "JWT token validation failed: token expired"
            );

            return Err(ErrorKind::Unauthorized
                .with_message("Authentication session has expired")
                .with_resource("authentication"));
        }

        Ok(claims)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use lacquer_postgres::types::EntityStatus;

    fn test_account(role_id: Option<Uuid>) -> Account {
        Account {
            id: Uuid::new_v4(),
            username: "amelia".to_owned(),
            email: "amelia@example.com".to_owned(),
            given_name: "Amelia".to_owned(),
            family_name: "Nguyen".to_owned(),
            password_hash: String::new(),
            role_id,
            status: EntityStatus::Active,
            created_at: Timestamp::now().into(),
            updated_at: Timestamp::now().into(),
        }
    }

    fn test_keys() -> AuthKeys {
        AuthKeys::from_secret("0123456789abcdef0123456789abcdef").unwrap()
    }

    #[test]
    fn encode_decode_roundtrip() {
        let role_id = Uuid::new_v4();
        let account = test_account(Some(role_id));
        let claims = AuthClaims::issue(&account);

        let keys = test_keys();
        let token = claims.encode(&keys).unwrap();
        let decoded = AuthClaims::decode(&token, &keys).unwrap();

        assert_eq!(decoded.account_id, account.id);
        assert_eq!(decoded.role_id, Some(role_id));
        assert_eq!(decoded.token_id, claims.token_id);
        assert!(!decoded.is_expired());
    }

    #[test]
    fn rejects_wrong_secret() {
        let account = test_account(None);
        let claims = AuthClaims::issue(&account);

        let token = claims.encode(&test_keys()).unwrap();
        let other_keys = AuthKeys::from_secret("another-secret-entirely-32-bytes!").unwrap();

        assert!(AuthClaims::decode(&token, &other_keys).is_err());
    }

    #[test]
    fn rejects_garbage_tokens() {
        assert!(AuthClaims::decode("not.a.jwt", &test_keys()).is_err());
    }
}
