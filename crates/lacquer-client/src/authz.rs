//! Client for the role permission endpoints of the backend.

use std::sync::Arc;

use reqwest::Client;
use serde::Deserialize;
use url::Url;
use uuid::Uuid;

use crate::{ClientError, ClientResult, HttpClientConfig, TRACING_TARGET};

/// Wire shape of the modules-by-role endpoint.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ModulesByRole {
    #[allow(dead_code)]
    role_id: Uuid,
    modules: Vec<String>,
}

struct AuthzClientInner {
    http: Client,
    base_url: Url,
    config: HttpClientConfig,
}

/// Client resolving which permission modules a role holds.
///
/// Failures are returned as [`ClientError`] rather than an empty module
/// list, so callers can tell "role has no permissions" apart from "the
/// upstream was unreachable".
#[derive(Clone)]
pub struct AuthzClient {
    inner: Arc<AuthzClientInner>,
}

impl AuthzClient {
    /// Creates a new client against the given base URL.
    pub fn new(base_url: Url, config: HttpClientConfig) -> Self {
        let http = Client::builder()
            .timeout(config.effective_timeout())
            .user_agent(config.effective_user_agent())
            .build()
            .expect("failed to create HTTP client");

        Self {
            inner: Arc::new(AuthzClientInner {
                http,
                base_url,
                config,
            }),
        }
    }

    /// Gets the client configuration.
    pub fn config(&self) -> &HttpClientConfig {
        &self.inner.config
    }

    /// Fetches the deduplicated permission module list of a role.
    #[tracing::instrument(skip(self), target = TRACING_TARGET)]
    pub async fn modules_for_role(&self, role_id: Uuid) -> ClientResult<Vec<String>> {
        let mut url = self
            .inner
            .base_url
            .join("role-permissions/modules-by-role")
            .map_err(|e| ClientError::BaseUrl(e.to_string()))?;
        url.query_pairs_mut()
            .append_pair("roleId", &role_id.to_string());

        let response = self
            .inner
            .http
            .get(url.clone())
            .send()
            .await
            .map_err(|source| ClientError::Transport {
                url: url.to_string(),
                source,
            })?;

        let status = response.status();
        if !status.is_success() {
            tracing::warn!(
                target: TRACING_TARGET,
                %role_id,
                %status,
                "Permission upstream answered with an error status"
            );
            return Err(ClientError::Status {
                url: url.to_string(),
                status,
            });
        }

        let body: ModulesByRole =
            response
                .json()
                .await
                .map_err(|source| ClientError::Decode {
                    url: url.to_string(),
                    source,
                })?;

        tracing::debug!(
            target: TRACING_TARGET,
            %role_id,
            modules = body.modules.len(),
            "Resolved permission modules for role"
        );

        Ok(body.modules)
    }

    /// Checks whether the upstream answers its health endpoint.
    pub async fn ping(&self) -> ClientResult<()> {
        ping_health(&self.inner.http, &self.inner.base_url).await
    }
}

impl std::fmt::Debug for AuthzClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthzClient")
            .field("base_url", &self.inner.base_url.as_str())
            .field("config", &self.inner.config)
            .finish_non_exhaustive()
    }
}

/// Issues a GET against the upstream `/health` endpoint.
pub(crate) async fn ping_health(http: &Client, base_url: &Url) -> ClientResult<()> {
    let url = base_url
        .join("health")
        .map_err(|e| ClientError::BaseUrl(e.to_string()))?;

    let response = http
        .get(url.clone())
        .send()
        .await
        .map_err(|source| ClientError::Transport {
            url: url.to_string(),
            source,
        })?;

    let status = response.status();
    if !status.is_success() {
        return Err(ClientError::Status {
            url: url.to_string(),
            status,
        });
    }

    Ok(())
}
