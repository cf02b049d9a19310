//! Client for the salon service catalog microservice.

use std::sync::Arc;

use bigdecimal::BigDecimal;
use reqwest::{Client, StatusCode};
use serde::Deserialize;
use url::Url;
use uuid::Uuid;

use crate::authz::ping_health;
use crate::{ClientError, ClientResult, HttpClientConfig, TRACING_TARGET};

/// Catalog entry served by the catalog microservice.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RemoteService {
    /// Service identifier.
    pub id: Uuid,
    /// Service name.
    pub name: String,
    /// Current price.
    pub price: BigDecimal,
    /// Service status, `"active"` or `"inactive"`.
    pub status: String,
}

impl RemoteService {
    /// Returns whether the service is bookable.
    pub fn is_active(&self) -> bool {
        self.status == "active"
    }
}

struct CatalogClientInner {
    http: Client,
    base_url: Url,
    config: HttpClientConfig,
}

/// Client resolving catalog services and their prices.
///
/// The backend uses it to price appointment line items when no subtotal
/// is supplied by the caller.
#[derive(Clone)]
pub struct CatalogClient {
    inner: Arc<CatalogClientInner>,
}

impl CatalogClient {
    /// Creates a new client against the given base URL.
    pub fn new(base_url: Url, config: HttpClientConfig) -> Self {
        let http = Client::builder()
            .timeout(config.effective_timeout())
            .user_agent(config.effective_user_agent())
            .build()
            .expect("failed to create HTTP client");

        Self {
            inner: Arc::new(CatalogClientInner {
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

    /// Fetches one catalog service, returning `Ok(None)` when it does
    /// not exist.
    #[tracing::instrument(skip(self), target = TRACING_TARGET)]
    pub async fn fetch_service(&self, service_id: Uuid) -> ClientResult<Option<RemoteService>> {
        let url = self
            .inner
            .base_url
            .join(&format!("services/{service_id}"))
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
            tracing::debug!(target: TRACING_TARGET, %service_id, "Service not found in catalog");
            return Ok(None);
        }
        if !status.is_success() {
            tracing::warn!(
                target: TRACING_TARGET,
                %service_id,
                %status,
                "Catalog upstream answered with an error status"
            );
            return Err(ClientError::Status {
                url: url.to_string(),
                status,
            });
        }

        let service: RemoteService =
            response
                .json()
                .await
                .map_err(|source| ClientError::Decode {
                    url: url.to_string(),
                    source,
                })?;

        Ok(Some(service))
    }

    /// Checks whether the catalog answers its health endpoint.
    pub async fn ping(&self) -> ClientResult<()> {
        ping_health(&self.inner.http, &self.inner.base_url).await
    }
}

impl std::fmt::Debug for CatalogClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CatalogClient")
            .field("base_url", &self.inner.base_url.as_str())
            .field("config", &self.inner.config)
            .finish_non_exhaustive()
    }
}
