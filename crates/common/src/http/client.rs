use super::status_error;
use crate::auth::{ResponseClass, SessionGuard};
use crate::domain::{
    AccessToken, Device, DeviceInput, DeviceType, DomainError, DomainResult, InventoryApi,
    Location, ScanHistoryQuery, ScanLogEntry,
};
use async_trait::async_trait;
use reqwest::{Client, RequestBuilder, Response, StatusCode};
use serde::de::DeserializeOwned;
use std::time::Duration;
use tracing::{debug, instrument, warn};

/// Connection settings for the inventory service
#[derive(Debug, Clone)]
pub struct HttpClientConfig {
    /// Base URL, e.g. `http://127.0.0.1:8000`
    pub base_url: String,
    /// Per-request timeout
    pub timeout: Duration,
}

impl Default for HttpClientConfig {
    fn default() -> Self {
        Self {
            base_url: "http://127.0.0.1:8000".to_string(),
            timeout: Duration::from_secs(30),
        }
    }
}

/// `InventoryApi` over HTTP + JSON.
///
/// Every call goes through the [`SessionGuard`]: the bearer credential is
/// attached on the way out and 401 responses end the session on the way in.
pub struct HttpInventoryClient {
    client: Client,
    base_url: String,
    guard: SessionGuard,
}

impl HttpInventoryClient {
    pub fn new(config: &HttpClientConfig, guard: SessionGuard) -> DomainResult<Self> {
        let client = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| {
                DomainError::RepositoryError(anyhow::anyhow!("failed to build HTTP client: {}", e))
            })?;

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            guard,
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// Send an authorized request and turn failures into domain errors
    async fn send(&self, request: RequestBuilder) -> DomainResult<Response> {
        let (request, ticket) = self.guard.authorize(request).await;
        let response = request
            .send()
            .await
            .map_err(|e| DomainError::NetworkError(e.to_string()))?;

        let status = response.status();
        match self.guard.inspect(status, ticket).await {
            ResponseClass::Ok => Ok(response),
            class => {
                let body = response.text().await.unwrap_or_default();
                warn!(status = status.as_u16(), "inventory service rejected request");
                Err(status_error(class, &body))
            }
        }
    }

    async fn read_json<T: DeserializeOwned>(response: Response) -> DomainResult<T> {
        response.json::<T>().await.map_err(|e| {
            if e.is_decode() {
                DomainError::RepositoryError(anyhow::anyhow!("unexpected response body: {}", e))
            } else {
                DomainError::NetworkError(e.to_string())
            }
        })
    }

    async fn get_json<T: DeserializeOwned>(&self, path: &str) -> DomainResult<T> {
        let response = self.send(self.client.get(self.url(path))).await?;
        Self::read_json(response).await
    }
}

#[async_trait]
impl InventoryApi for HttpInventoryClient {
    #[instrument(skip(self))]
    async fn list_devices(&self) -> DomainResult<Vec<Device>> {
        let devices: Vec<Device> = self.get_json("/devices/").await?;
        debug!(count = devices.len(), "listed devices");
        Ok(devices)
    }

    #[instrument(skip(self))]
    async fn list_locations(&self) -> DomainResult<Vec<Location>> {
        self.get_json("/locations/").await
    }

    #[instrument(skip(self))]
    async fn list_device_types(&self) -> DomainResult<Vec<DeviceType>> {
        self.get_json("/device-types/").await
    }

    #[instrument(skip(self), fields(skip = query.skip, limit = query.limit))]
    async fn list_scan_results(&self, query: ScanHistoryQuery) -> DomainResult<Vec<ScanLogEntry>> {
        let request = self
            .client
            .get(self.url("/scan-results/"))
            .query(&[("skip", query.skip), ("limit", query.limit)]);
        let response = self.send(request).await?;
        Self::read_json(response).await
    }

    #[instrument(skip(self, input), fields(device_name = %input.name))]
    async fn create_device(&self, input: DeviceInput) -> DomainResult<Device> {
        let request = self.client.post(self.url("/devices/")).json(&input);
        let response = self.send(request).await?;
        Self::read_json(response).await
    }

    #[instrument(skip(self, input), fields(device_id = device_id))]
    async fn update_device(&self, device_id: i64, input: DeviceInput) -> DomainResult<Device> {
        let request = self
            .client
            .put(self.url(&format!("/devices/{}", device_id)))
            .json(&input);
        let response = self.send(request).await?;
        Self::read_json(response).await
    }

    #[instrument(skip(self), fields(device_id = device_id))]
    async fn delete_device(&self, device_id: i64) -> DomainResult<()> {
        let request = self.client.delete(self.url(&format!("/devices/{}", device_id)));
        self.send(request).await?;
        Ok(())
    }

    #[instrument(skip(self, password), fields(email = %email))]
    async fn authenticate(&self, email: &str, password: &str) -> DomainResult<AccessToken> {
        // Sign-in carries no bearer credential and must not tear down a session on 401
        let response = self
            .client
            .post(self.url("/token"))
            .form(&[("username", email), ("password", password)])
            .send()
            .await
            .map_err(|e| DomainError::NetworkError(e.to_string()))?;

        let status = response.status();
        match status {
            s if s.is_success() => Self::read_json(response).await,
            StatusCode::BAD_REQUEST | StatusCode::UNAUTHORIZED | StatusCode::UNPROCESSABLE_ENTITY => {
                Err(DomainError::InvalidCredentials)
            }
            s => {
                let body = response.text().await.unwrap_or_default();
                Err(status_error(SessionGuard::classify(s), &body))
            }
        }
    }
}
