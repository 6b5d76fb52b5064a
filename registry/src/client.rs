//! HTTP client for the agent registry.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::StatusCode;
use serde::de::DeserializeOwned;

use shellbook_types::ChainAccount;

use crate::{RegistryAgent, RegistryError, RegistryLookup, TrustBreakdown};

const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);
const DEFAULT_CONNECT_TIMEOUT: Duration = Duration::from_secs(5);

/// `GET {base}/agents/{account}` and `GET {base}/agents/{account}/trust`.
pub struct HttpRegistryClient {
    http_client: reqwest::Client,
    base_url: String,
}

impl HttpRegistryClient {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self::with_timeout(base_url, DEFAULT_TIMEOUT)
    }

    pub fn with_timeout(base_url: impl Into<String>, timeout: Duration) -> Self {
        let http_client = reqwest::Client::builder()
            .timeout(timeout)
            .connect_timeout(DEFAULT_CONNECT_TIMEOUT)
            .build()
            .unwrap_or_default();
        Self {
            http_client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }

    fn agent_url(&self, account: &ChainAccount) -> String {
        format!("{}/agents/{}", self.base_url, account)
    }

    /// GET `url`, mapping 404 to `None`.
    async fn fetch<T: DeserializeOwned>(&self, url: &str) -> Result<Option<T>, RegistryError> {
        let response = self.http_client.get(url).send().await.map_err(|e| {
            if e.is_timeout() {
                RegistryError::Unreachable(format!("request timed out: {e}"))
            } else if e.is_connect() {
                RegistryError::Unreachable(format!("connection failed: {e}"))
            } else {
                RegistryError::RequestFailed(e.to_string())
            }
        })?;

        if response.status() == StatusCode::NOT_FOUND {
            return Ok(None);
        }
        if !response.status().is_success() {
            return Err(RegistryError::RequestFailed(format!(
                "HTTP status {}",
                response.status()
            )));
        }

        let body = response.json().await.map_err(|e| {
            RegistryError::InvalidResponse(format!("failed to parse registry response: {e}"))
        })?;
        Ok(Some(body))
    }
}

#[async_trait]
impl RegistryLookup for HttpRegistryClient {
    async fn get_agent(
        &self,
        account: &ChainAccount,
    ) -> Result<Option<RegistryAgent>, RegistryError> {
        self.fetch(&self.agent_url(account)).await
    }

    async fn get_trust_score(&self, account: &ChainAccount) -> Result<Option<f64>, RegistryError> {
        let url = format!("{}/trust", self.agent_url(account));
        let trust: Option<TrustBreakdown> = self.fetch(&url).await?;
        Ok(trust.map(|t| t.total))
    }
}
