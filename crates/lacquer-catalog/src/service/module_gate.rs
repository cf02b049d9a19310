//! Module permission gate for mutating catalog routes.

use std::sync::Arc;

use axum::http::Method;
use lacquer_client::AuthzClient;
use uuid::Uuid;

use crate::TRACING_TARGET_AUTHORIZATION;
use crate::extract::RemoteIdentity;
use crate::handler::{Error, ErrorKind, Result};
use crate::service::ttl_cache::{DEFAULT_CACHE_TTL, TtlCache};

/// Outcome of a gate evaluation.
#[must_use]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    /// The request may proceed.
    Allowed,
    /// The request is denied for the given reason.
    Denied(DenialReason),
}

impl Decision {
    /// Converts the decision into a handler result.
    pub fn into_result(self) -> Result<()> {
        match self {
            Decision::Allowed => Ok(()),
            Decision::Denied(reason) => Err(reason.into()),
        }
    }
}

/// Why the gate denied a request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, strum::Display)]
#[strum(serialize_all = "kebab-case")]
pub enum DenialReason {
    /// No identity, an unverifiable token, or an inactive account.
    Unauthenticated,
    /// The account has no role assigned.
    NoRole,
    /// The role does not hold the required module.
    NotPermitted,
    /// The authorization upstream could not be consulted.
    UpstreamUnavailable,
    /// Writes are disabled by the migration cutover flag.
    MigrationCutover,
}

impl From<DenialReason> for Error<'static> {
    fn from(reason: DenialReason) -> Self {
        match reason {
            DenialReason::Unauthenticated => {
                ErrorKind::Unauthorized.with_resource("authorization")
            }
            DenialReason::NoRole => ErrorKind::Forbidden
                .with_message("Your account has no role assigned")
                .with_resource("authorization"),
            DenialReason::NotPermitted => ErrorKind::Forbidden
                .with_message("Your role does not permit this operation")
                .with_resource("authorization"),
            DenialReason::UpstreamUnavailable => ErrorKind::ServiceUnavailable
                .with_message("Authorization could not be verified")
                .with_resource("authorization"),
            DenialReason::MigrationCutover => ErrorKind::Forbidden
                .with_message("Write access is temporarily disabled")
                .with_resource("authorization"),
        }
    }
}

/// Request-scoped memo of the resolved module set.
///
/// Handlers evaluating the gate more than once in a request reuse the
/// first resolution instead of hitting the cache or the upstream again.
#[must_use]
#[derive(Debug, Default)]
pub struct GateMemo {
    modules: Option<Vec<String>>,
}

struct ModuleGateInner {
    authz_client: AuthzClient,
    cache: TtlCache<Vec<String>>,
    migration_cutover: bool,
}

/// Decides whether a request may mutate a module-gated resource.
///
/// Checks short-circuit in a fixed order: safe methods pass, then the
/// identity is required, active and role-bearing, then the cutover flag
/// is consulted, and only then the role's module set is resolved (memo,
/// cache, upstream, in that order). Upstream failures deny the request
/// and are never cached.
#[derive(Clone)]
pub struct ModuleGate {
    inner: Arc<ModuleGateInner>,
}

impl ModuleGate {
    /// Creates a gate with the default cache TTL.
    pub fn new(authz_client: AuthzClient, migration_cutover: bool) -> Self {
        Self {
            inner: Arc::new(ModuleGateInner {
                authz_client,
                cache: TtlCache::new(DEFAULT_CACHE_TTL),
                migration_cutover,
            }),
        }
    }

    /// Creates a gate with a custom cache TTL.
    pub fn with_ttl(
        authz_client: AuthzClient,
        migration_cutover: bool,
        ttl: std::time::Duration,
    ) -> Self {
        Self {
            inner: Arc::new(ModuleGateInner {
                authz_client,
                cache: TtlCache::new(ttl),
                migration_cutover,
            }),
        }
    }

    /// Evaluates one request against the required module tag.
    pub async fn evaluate(
        &self,
        method: &Method,
        module: &str,
        identity: Option<&RemoteIdentity>,
        memo: &mut GateMemo,
    ) -> Decision {
        if matches!(*method, Method::GET | Method::HEAD | Method::OPTIONS) {
            return Decision::Allowed;
        }

        let Some(identity) = identity else {
            return Decision::Denied(DenialReason::Unauthenticated);
        };
        if !identity.is_active {
            return Decision::Denied(DenialReason::Unauthenticated);
        }
        let Some(role_id) = identity.role_id else {
            tracing::info!(
                target: TRACING_TARGET_AUTHORIZATION,
                account_id = identity.account_id.to_string(),
                module,
                "denied: account has no role",
            );
            return Decision::Denied(DenialReason::NoRole);
        };

        if self.inner.migration_cutover {
            return Decision::Denied(DenialReason::MigrationCutover);
        }

        let modules = match self.resolve_modules(role_id, memo).await {
            Ok(modules) => modules,
            Err(()) => return Decision::Denied(DenialReason::UpstreamUnavailable),
        };

        if modules.iter().any(|held| held == module) {
            Decision::Allowed
        } else {
            tracing::info!(
                target: TRACING_TARGET_AUTHORIZATION,
                account_id = identity.account_id.to_string(),
                role_id = role_id.to_string(),
                module,
                held_modules = ?modules,
                "denied: module not granted to role",
            );
            Decision::Denied(DenialReason::NotPermitted)
        }
    }

    /// Drops the cached module set of one role.
    pub async fn invalidate_role(&self, role_id: Uuid) {
        self.inner.cache.invalidate(role_id).await;
    }

    /// Clears the whole permission cache.
    pub async fn invalidate_all(&self) {
        self.inner.cache.invalidate_all().await;
    }

    /// Resolves the module set of a role: memo, then cache, then the
    /// authorization upstream. Only successful fetches are cached.
    async fn resolve_modules(&self, role_id: Uuid, memo: &mut GateMemo) -> Result<Vec<String>, ()> {
        if let Some(modules) = &memo.modules {
            return Ok(modules.clone());
        }

        if let Some(modules) = self.inner.cache.get(role_id).await {
            memo.modules = Some(modules.clone());
            return Ok(modules);
        }

        match self.inner.authz_client.modules_for_role(role_id).await {
            Ok(modules) => {
                self.inner.cache.insert(role_id, modules.clone()).await;
                memo.modules = Some(modules.clone());
                Ok(modules)
            }
            Err(error) => {
                tracing::warn!(
                    target: TRACING_TARGET_AUTHORIZATION,
                    role_id = role_id.to_string(),
                    error = %error,
                    "module resolution failed upstream",
                );
                Err(())
            }
        }
    }
}

impl std::fmt::Debug for ModuleGate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ModuleGate")
            .field("migration_cutover", &self.inner.migration_cutover)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use lacquer_client::HttpClientConfig;
    use url::Url;

    use super::*;

    /// An upstream nothing listens on; any fetch against it fails fast.
    fn dead_upstream() -> AuthzClient {
        let base_url = Url::parse("http://127.0.0.1:9").unwrap();
        AuthzClient::new(base_url, HttpClientConfig::new(1))
    }

    fn identity(role_id: Option<Uuid>, is_active: bool) -> RemoteIdentity {
        RemoteIdentity {
            account_id: Uuid::new_v4(),
            role_id,
            is_active,
        }
    }

    async fn seed(gate: &ModuleGate, role_id: Uuid, modules: &[&str]) {
        gate.inner
            .cache
            .insert(role_id, modules.iter().map(|m| m.to_string()).collect())
            .await;
    }

    #[tokio::test]
    async fn safe_methods_are_always_allowed() {
        let gate = ModuleGate::new(dead_upstream(), false);
        let mut memo = GateMemo::default();

        for method in [Method::GET, Method::HEAD, Method::OPTIONS] {
            let decision = gate.evaluate(&method, "services", None, &mut memo).await;
            assert_eq!(decision, Decision::Allowed);
        }
    }

    #[tokio::test]
    async fn missing_identity_is_denied() {
        let gate = ModuleGate::new(dead_upstream(), false);
        let mut memo = GateMemo::default();

        let decision = gate
            .evaluate(&Method::POST, "services", None, &mut memo)
            .await;
        assert_eq!(
            decision,
            Decision::Denied(DenialReason::Unauthenticated)
        );
    }

    #[tokio::test]
    async fn inactive_identity_is_denied() {
        let gate = ModuleGate::new(dead_upstream(), false);
        let mut memo = GateMemo::default();
        let caller = identity(Some(Uuid::new_v4()), false);

        let decision = gate
            .evaluate(&Method::POST, "services", Some(&caller), &mut memo)
            .await;
        assert_eq!(
            decision,
            Decision::Denied(DenialReason::Unauthenticated)
        );
    }

    #[tokio::test]
    async fn identity_without_role_is_denied() {
        let gate = ModuleGate::new(dead_upstream(), false);
        let mut memo = GateMemo::default();
        let caller = identity(None, true);

        let decision = gate
            .evaluate(&Method::POST, "services", Some(&caller), &mut memo)
            .await;
        assert_eq!(decision, Decision::Denied(DenialReason::NoRole));
    }

    #[tokio::test]
    async fn migration_cutover_denies_without_fetching() {
        let gate = ModuleGate::new(dead_upstream(), true);
        let mut memo = GateMemo::default();
        let caller = identity(Some(Uuid::new_v4()), true);

        let decision = gate
            .evaluate(&Method::DELETE, "services", Some(&caller), &mut memo)
            .await;
        assert_eq!(decision, Decision::Denied(DenialReason::MigrationCutover));
    }

    #[tokio::test]
    async fn cached_modules_decide_without_the_upstream() {
        let gate = ModuleGate::new(dead_upstream(), false);
        let role_id = Uuid::new_v4();
        seed(&gate, role_id, &["services", "appointments"]).await;
        let caller = identity(Some(role_id), true);

        // Stylist scenario: services is granted, roles is not. The
        // upstream is dead, so both answers come from the cache alone.
        let mut memo = GateMemo::default();
        let allowed = gate
            .evaluate(&Method::POST, "services", Some(&caller), &mut memo)
            .await;
        assert_eq!(allowed, Decision::Allowed);

        let mut memo = GateMemo::default();
        let denied = gate
            .evaluate(&Method::POST, "roles", Some(&caller), &mut memo)
            .await;
        assert_eq!(denied, Decision::Denied(DenialReason::NotPermitted));
    }

    #[tokio::test]
    async fn empty_module_set_denies_every_unsafe_method() {
        let gate = ModuleGate::new(dead_upstream(), false);
        let role_id = Uuid::new_v4();
        seed(&gate, role_id, &[]).await;
        let caller = identity(Some(role_id), true);

        for method in [Method::POST, Method::PATCH, Method::DELETE] {
            let mut memo = GateMemo::default();
            let decision = gate
                .evaluate(&method, "services", Some(&caller), &mut memo)
                .await;
            assert_eq!(decision, Decision::Denied(DenialReason::NotPermitted));
        }
    }

    #[tokio::test]
    async fn unreachable_upstream_fails_closed_without_poisoning_the_cache() {
        let gate = ModuleGate::new(dead_upstream(), false);
        let role_id = Uuid::new_v4();
        let caller = identity(Some(role_id), true);

        let mut memo = GateMemo::default();
        let decision = gate
            .evaluate(&Method::POST, "services", Some(&caller), &mut memo)
            .await;
        assert_eq!(
            decision,
            Decision::Denied(DenialReason::UpstreamUnavailable)
        );

        // The failure was not cached; a later successful resolution
        // (seeded here in place of a recovered upstream) wins.
        assert_eq!(gate.inner.cache.get(role_id).await, None);
        seed(&gate, role_id, &["services"]).await;
        let mut memo = GateMemo::default();
        let decision = gate
            .evaluate(&Method::POST, "services", Some(&caller), &mut memo)
            .await;
        assert_eq!(decision, Decision::Allowed);
    }

    #[tokio::test]
    async fn expired_cache_entries_trigger_a_fresh_fetch() {
        let gate = ModuleGate::with_ttl(dead_upstream(), false, Duration::from_millis(10));
        let role_id = Uuid::new_v4();
        seed(&gate, role_id, &["services"]).await;
        let caller = identity(Some(role_id), true);

        tokio::time::sleep(Duration::from_millis(20)).await;

        // The entry expired, so the gate falls through to the dead
        // upstream instead of reusing the stale grant.
        let mut memo = GateMemo::default();
        let decision = gate
            .evaluate(&Method::POST, "services", Some(&caller), &mut memo)
            .await;
        assert_eq!(
            decision,
            Decision::Denied(DenialReason::UpstreamUnavailable)
        );
    }

    #[tokio::test]
    async fn memo_short_circuits_repeat_evaluations() {
        let gate = ModuleGate::new(dead_upstream(), false);
        let role_id = Uuid::new_v4();
        seed(&gate, role_id, &["services"]).await;
        let caller = identity(Some(role_id), true);

        let mut memo = GateMemo::default();
        let first = gate
            .evaluate(&Method::POST, "services", Some(&caller), &mut memo)
            .await;
        assert_eq!(first, Decision::Allowed);

        // The memo now answers even after the cache is cleared.
        gate.invalidate_all().await;
        let second = gate
            .evaluate(&Method::POST, "services", Some(&caller), &mut memo)
            .await;
        assert_eq!(second, Decision::Allowed);
    }

    #[test]
    fn denial_reasons_render_kebab_case() {
        assert_eq!(DenialReason::NoRole.to_string(), "no-role");
        assert_eq!(
            DenialReason::UpstreamUnavailable.to_string(),
            "upstream-unavailable"
        );
        assert_eq!(
            DenialReason::MigrationCutover.to_string(),
            "migration-cutover"
        );
    }
}
