//! Transport seam for the dreams endpoint.

use crate::config::AppConfig;
use crate::model::dream::Dream;
use crate::sync::{SyncError, SyncResult};
use async_trait::async_trait;
use reqwest::header::{HeaderValue, ACCEPT};
use std::time::Duration;

/// Remote dream collection.
///
/// One endpoint serves both operations: `GET` lists every shared dream and
/// `POST` accepts one dream as a JSON body.
#[async_trait]
pub trait DreamsApi: Send + Sync {
    async fn list_dreams(&self) -> SyncResult<Vec<Dream>>;

    async fn post_dream(&self, dream: &Dream) -> SyncResult<()>;
}

/// reqwest-backed [`DreamsApi`].
#[derive(Debug, Clone)]
pub struct HttpDreamsApi {
    client: reqwest::Client,
    endpoint: String,
}

impl HttpDreamsApi {
    /// Builds a client bound to `endpoint` with a per-request `timeout`.
    pub fn new(endpoint: impl Into<String>, timeout: Duration) -> SyncResult<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|err| SyncError::Network(err.to_string()))?;
        Ok(Self {
            client,
            endpoint: endpoint.into(),
        })
    }

    pub fn from_config(config: &AppConfig) -> SyncResult<Self> {
        Self::new(config.dreams_endpoint(), config.request_timeout)
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    fn check_status(&self, response: &reqwest::Response) -> SyncResult<()> {
        let status = response.status();
        if status.is_success() {
            Ok(())
        } else {
            Err(SyncError::Status {
                status: status.as_u16(),
                endpoint: self.endpoint.clone(),
            })
        }
    }
}

#[async_trait]
impl DreamsApi for HttpDreamsApi {
    async fn list_dreams(&self) -> SyncResult<Vec<Dream>> {
        let response = self
            .client
            .get(&self.endpoint)
            .header(ACCEPT, HeaderValue::from_static("application/json"))
            .send()
            .await?;
        self.check_status(&response)?;

        let body = response.bytes().await?;
        serde_json::from_slice(&body).map_err(|err| SyncError::Decode(err.to_string()))
    }

    async fn post_dream(&self, dream: &Dream) -> SyncResult<()> {
        // `.json()` sets `Content-Type: application/json`.
        let response = self.client.post(&self.endpoint).json(dream).send().await?;
        self.check_status(&response)
    }
}

#[cfg(test)]
mod tests {
    use super::HttpDreamsApi;
    use crate::config::AppConfig;
    use std::time::Duration;

    #[test]
    fn endpoint_comes_from_config() {
        let config = AppConfig::new("/srv/zlog")
            .expect("absolute data dir")
            .with_remote_base_url("https://dreams.example.com/")
            .expect("valid url");
        let api = HttpDreamsApi::from_config(&config).expect("build client");
        assert_eq!(api.endpoint(), "https://dreams.example.com/api/dreams");
    }

    #[tokio::test]
    async fn unreachable_service_is_a_transport_error() {
        // Port 9 (discard) on loopback is closed in test environments.
        let api = HttpDreamsApi::new("http://127.0.0.1:9/api/dreams", Duration::from_secs(2))
            .expect("build client");
        let err = crate::sync::DreamsApi::list_dreams(&api)
            .await
            .expect_err("nothing listens on the discard port");
        assert!(!matches!(
            err,
            crate::sync::SyncError::Decode(_) | crate::sync::SyncError::NotShareable(_)
        ));
    }
}
