//! Client for the account directory endpoints of the backend.

use std::sync::Arc;

use reqwest::{Client, StatusCode};
use serde::Deserialize;
use url::Url;
use uuid::Uuid;

use crate::authz::ping_health;
use crate::{ClientError, ClientResult, HttpClientConfig, TRACING_TARGET};

/// Account projection served by the backend directory endpoint.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RemoteAccount {
    /// Account identifier.
    pub id: Uuid,
    /// Login name.
    pub username: String,
    /// Contact email address.
    pub email: String,
    /// Given name.
    pub given_name: String,
    /// Family name.
    pub family_name: String,
    /// Assigned role, if any.
    pub role_id: Option<Uuid>,
    /// Account status, `"active"` or `"inactive"`.
    pub status: String,
}

impl RemoteAccount {
    /// Returns whether the account is active upstream.
    pub fn is_active(&self) -> bool {
        self.status == "active"
    }
}

struct DirectoryClientInner {
    http: Client,
    base_url: Url,
    config: HttpClientConfig,
}

/// Client resolving account identity data from the backend.
#[derive(Clone)]
pub struct DirectoryClient {
    inner: Arc<DirectoryClientInner>,
}

impl DirectoryClient {
    /// Creates a new client against the given base URL.
    pub fn new(base_url: Url, config: HttpClientConfig) -> Self {
        let http = Client::builder()
            .timeout(config.effective_timeout())
            .user_agent(config.effective_user_agent())
            .build()
            .expect("failed to create HTTP client");

        Self {
            inner: Arc::new(DirectoryClientInner {
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

    /// Fetches one account, returning `Ok(None)` when it does not exist.
    ///
    /// Every other failure mode is an error for the caller to handle.
    #[tracing::instrument(skip(self), target = TRACING_TARGET)]
    pub async fn fetch_account(&self, account_id: Uuid) -> ClientResult<Option<RemoteAccount>> {
        let url = self
            .inner
            .base_url
            .join(&format!("accounts/{account_id}"))
            .map_err(|e| ClientError::BaseUrl(e.to_string()))?;

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
        if status == StatusCode::NOT_FOUND {
            tracing::debug!(target: TRACING_TARGET, %account_id, "Account not found upstream");
            return Ok(None);
        }
        if !status.is_success() {
            tracing::warn!(
                target: TRACING_TARGET,
                %account_id,
                %status,
                "Directory upstream answered with an error status"
            );
            return Err(ClientError::Status {
                url: url.to_string(),
                status,
            });
        }

        let account: RemoteAccount =
            response
                .json()
                .await
                .map_err(|source| ClientError::Decode {
                    url: url.to_string(),
                    source,
                })?;

        Ok(Some(account))
    }

    /// Checks whether the upstream answers its health endpoint.
    pub async fn ping(&self) -> ClientResult<()> {
        ping_health(&self.inner.http, &self.inner.base_url).await
    }
}

impl std::fmt::Debug for DirectoryClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DirectoryClient")
            .field("base_url", &self.inner.base_url.as_str())
            .field("config", &self.inner.config)
            .finish_non_exhaustive()
    }
}
