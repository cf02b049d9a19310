//! Remote identity resolution against the backend directory.

use jiff::Timestamp;
use jsonwebtoken::{Algorithm, Validation};
use lacquer_client::DirectoryClient;
use serde::Deserialize;
use uuid::Uuid;

use crate::extract::RemoteIdentity;
use crate::service::auth_keys::AuthKeys;
use crate::service::ttl_cache::{DEFAULT_CACHE_TTL, TtlCache};

/// Tracing target for identity resolution.
const TRACING_TARGET: &str = "lacquer_catalog::service::identity";

/// Audience the monolith stamps into its tokens.
const JWT_AUDIENCE: &str = "lacquer:api";

/// Issuer the monolith stamps into its tokens.
const JWT_ISSUER: &str = "lacquer";

/// Claims of a session token issued by the monolith.
///
/// Only the claims the catalog acts on are decoded; the rest of the
/// token is covered by the signature check.
#[derive(Debug, Deserialize)]
struct SessionClaims {
    /// Account that owns the session.
    #[serde(rename = "sub")]
    account_id: Uuid,
    /// Expiration, validated again after decoding.
    #[serde(
        rename = "exp",
        with = "jiff::fmt::serde::timestamp::second::required"
    )]
    expires_at: Timestamp,
}

/// Resolves bearer tokens into [`RemoteIdentity`] values.
///
/// The token signature is verified locally with the shared secret; the
/// account projection behind it comes from the backend directory
/// endpoint through a 300 second TTL cache. Every failure mode short of
/// a bug resolves to "no identity" so callers treat the request as
/// unauthenticated instead of erroring.
#[derive(Debug, Clone)]
pub struct IdentityResolver {
    auth_keys: AuthKeys,
    directory_client: DirectoryClient,
    cache: TtlCache<RemoteIdentity>,
}

impl IdentityResolver {
    /// Creates a resolver with the default cache TTL.
    pub fn new(auth_keys: AuthKeys, directory_client: DirectoryClient) -> Self {
        Self {
            auth_keys,
            directory_client,
            cache: TtlCache::new(DEFAULT_CACHE_TTL),
        }
    }

    /// Resolves a bearer token into an identity, `None` when anything
    /// along the way disqualifies it.
    pub async fn resolve(&self, token: &str) -> Option<RemoteIdentity> {
        let account_id = self.verify_token(token)?;

        if let Some(identity) = self.cache.get(account_id).await {
            return Some(identity);
        }

        match self.directory_client.fetch_account(account_id).await {
            Ok(Some(account)) => {
                let identity = RemoteIdentity {
                    account_id: account.id,
                    role_id: account.role_id,
                    is_active: account.is_active(),
                };
                self.cache.insert(account_id, identity.clone()).await;
                Some(identity)
            }
            Ok(None) => {
                tracing::warn!(
                    target: TRACING_TARGET,
                    account_id = account_id.to_string(),
                    "token references an account unknown upstream",
                );
                None
            }
            Err(error) => {
                tracing::warn!(
                    target: TRACING_TARGET,
                    account_id = account_id.to_string(),
                    error = %error,
                    "directory lookup failed, treating request as unauthenticated",
                );
                None
            }
        }
    }

    /// Drops the cached identity of one account.
    pub async fn invalidate(&self, account_id: Uuid) {
        self.cache.invalidate(account_id).await;
    }

    /// Verifies the token signature and returns the subject account.
    fn verify_token(&self, token: &str) -> Option<Uuid> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.validate_exp = true;
        validation.validate_aud = true;
        validation.set_audience(&[JWT_AUDIENCE]);
        validation.set_issuer(&[JWT_ISSUER]);
        validation.set_required_spec_claims(&["iss", "aud", "sub", "exp"]);

        let claims = match jsonwebtoken::decode::<SessionClaims>(
            token,
            self.auth_keys.decoding_key(),
            &validation,
        ) {
            Ok(data) => data.claims,
            Err(error) => {
                tracing::debug!(
                    target: TRACING_TARGET,
                    error = %error,
                    "bearer token rejected",
                );
                return None;
            }
        };

        if claims.expires_at <= Timestamp::now() {
            return None;
        }
        Some(claims.account_id)
    }
}

#[cfg(test)]
mod tests {
    use jsonwebtoken::{EncodingKey, Header};
    use lacquer_client::HttpClientConfig;
    use serde::Serialize;
    use url::Url;

    use super::*;

    const TEST_SECRET: &str = "an-hs256-secret-of-at-least-32-bytes";

    #[derive(Serialize)]
    struct MintedClaims {
        iss: &'static str,
        aud: &'static str,
        sub: Uuid,
        exp: i64,
    }

    fn mint_token(secret: &str, account_id: Uuid, expires_in_secs: i64) -> String {
        let claims = MintedClaims {
            iss: JWT_ISSUER,
            aud: JWT_AUDIENCE,
            sub: account_id,
            exp: Timestamp::now().as_second() + expires_in_secs,
        };

        jsonwebtoken::encode(
            &Header::new(Algorithm::HS256),
            &claims,
            &EncodingKey::from_secret(secret.as_bytes()),
        )
        .unwrap()
    }

    fn resolver_against(base_url: &str) -> IdentityResolver {
        let auth_keys = AuthKeys::from_secret(TEST_SECRET).unwrap();
        let base_url = Url::parse(base_url).unwrap();
        let directory_client = DirectoryClient::new(base_url, HttpClientConfig::new(1));
        IdentityResolver::new(auth_keys, directory_client)
    }

    /// An upstream nothing listens on; any fetch against it fails fast.
    fn dead_upstream_resolver() -> IdentityResolver {
        resolver_against("http://127.0.0.1:9")
    }

    /// Serves an empty router; every directory lookup answers 404.
    async fn empty_upstream() -> Url {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, axum::Router::new()).await.unwrap();
        });
        Url::parse(&format!("http://{addr}/")).unwrap()
    }

    #[tokio::test]
    async fn garbage_tokens_resolve_to_no_identity() {
        let resolver = dead_upstream_resolver();
        assert_eq!(resolver.resolve("not-a-jwt").await, None);
    }

    #[tokio::test]
    async fn expired_tokens_resolve_to_no_identity() {
        let resolver = dead_upstream_resolver();
        let token = mint_token(TEST_SECRET, Uuid::new_v4(), -60);

        assert_eq!(resolver.resolve(&token).await, None);
    }

    #[tokio::test]
    async fn tokens_signed_with_the_wrong_secret_are_rejected() {
        let resolver = dead_upstream_resolver();
        let token = mint_token("a-different-secret-also-32-bytes-long", Uuid::new_v4(), 300);

        assert_eq!(resolver.resolve(&token).await, None);
    }

    #[tokio::test]
    async fn unknown_accounts_resolve_to_no_identity() {
        let base_url = empty_upstream().await;
        let resolver = resolver_against(base_url.as_str());
        let token = mint_token(TEST_SECRET, Uuid::new_v4(), 300);

        assert_eq!(resolver.resolve(&token).await, None);
    }

    #[tokio::test]
    async fn directory_outages_resolve_to_no_identity() {
        let resolver = dead_upstream_resolver();
        let token = mint_token(TEST_SECRET, Uuid::new_v4(), 300);

        assert_eq!(resolver.resolve(&token).await, None);
    }

    #[tokio::test]
    async fn cached_identities_skip_the_directory() {
        let resolver = dead_upstream_resolver();
        let account_id = Uuid::new_v4();
        let identity = RemoteIdentity {
            account_id,
            role_id: Some(Uuid::new_v4()),
            is_active: true,
        };
        resolver.cache.insert(account_id, identity.clone()).await;

        let token = mint_token(TEST_SECRET, account_id, 300);
        assert_eq!(resolver.resolve(&token).await, Some(identity));
    }

    #[tokio::test]
    async fn invalidate_drops_the_cached_identity() {
        let resolver = dead_upstream_resolver();
        let account_id = Uuid::new_v4();
        resolver
            .cache
            .insert(
                account_id,
                RemoteIdentity {
                    account_id,
                    role_id: None,
                    is_active: true,
                },
            )
            .await;

        resolver.invalidate(account_id).await;

        let token = mint_token(TEST_SECRET, account_id, 300);
        assert_eq!(resolver.resolve(&token).await, None);
    }
}
