//! reqwest-backed [`LedgerClient`].

use std::time::Duration;

use async_trait::async_trait;
use reqwest::StatusCode;
use serde::Deserialize;
use tracing::debug;

use shellbook_types::ChainAccount;

use crate::{AccountAuthority, ChainTransaction, LedgerClient, LedgerError};

const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);
const DEFAULT_CONNECT_TIMEOUT: Duration = Duration::from_secs(5);

/// nodeos error code for "unknown account".
const ACCOUNT_QUERY_EXCEPTION: i64 = 3_060_002;

/// Talks to a chain RPC node and a Hyperion history indexer.
///
/// `POST {rpc_url}/v1/chain/get_account` and
/// `GET {indexer_url}/v2/history/get_transaction?id=...`.
pub struct HttpLedgerClient {
    http_client: reqwest::Client,
    rpc_url: String,
    indexer_url: String,
}

/// nodeos error envelope; only the code matters.
#[derive(Debug, Deserialize)]
struct RpcErrorBody {
    error: RpcErrorDetail,
}

#[derive(Debug, Deserialize)]
struct RpcErrorDetail {
    #[serde(default)]
    code: i64,
    #[serde(default)]
    name: String,
}

impl HttpLedgerClient {
    pub fn new(rpc_url: impl Into<String>, indexer_url: impl Into<String>) -> Self {
        Self::with_timeout(rpc_url, indexer_url, DEFAULT_TIMEOUT)
    }

    pub fn with_timeout(
        rpc_url: impl Into<String>,
        indexer_url: impl Into<String>,
        timeout: Duration,
    ) -> Self {
        let http_client = reqwest::Client::builder()
            .timeout(timeout)
            .connect_timeout(DEFAULT_CONNECT_TIMEOUT)
            .build()
            .unwrap_or_default();
        Self {
            http_client,
            rpc_url: rpc_url.into().trim_end_matches('/').to_string(),
            indexer_url: indexer_url.into().trim_end_matches('/').to_string(),
        }
    }

    fn account_url(&self) -> String {
        format!("{}/v1/chain/get_account", self.rpc_url)
    }

    fn transaction_url(&self) -> String {
        format!("{}/v2/history/get_transaction", self.indexer_url)
    }
}

fn map_send_error(e: reqwest::Error) -> LedgerError {
    if e.is_timeout() {
        LedgerError::Unreachable(format!("request timed out: {e}"))
    } else if e.is_connect() {
        LedgerError::Unreachable(format!("connection failed: {e}"))
    } else {
        LedgerError::RequestFailed(e.to_string())
    }
}

fn is_unknown_account(body: &str) -> bool {
    serde_json::from_str::<RpcErrorBody>(body)
        .map(|b| b.error.code == ACCOUNT_QUERY_EXCEPTION || b.error.name == "account_query_exception")
        .unwrap_or(false)
}

#[async_trait]
impl LedgerClient for HttpLedgerClient {
    async fn get_account(
        &self,
        account: &ChainAccount,
    ) -> Result<Option<AccountAuthority>, LedgerError> {
        debug!(account = %account, "fetching account permissions");
        let response = self
            .http_client
            .post(self.account_url())
            .json(&serde_json::json!({ "account_name": account.as_str() }))
            .send()
            .await
            .map_err(map_send_error)?;

        let status = response.status();
        if !status.is_success() {
            // nodeos reports a missing account as a 500 with a typed error body.
            let body = response.text().await.unwrap_or_default();
            if status == StatusCode::NOT_FOUND || is_unknown_account(&body) {
                return Ok(None);
            }
            return Err(LedgerError::RequestFailed(format!("HTTP status {status}")));
        }

        let authority: AccountAuthority = response.json().await.map_err(|e| {
            LedgerError::InvalidResponse(format!("failed to parse account response: {e}"))
        })?;
        Ok(Some(authority))
    }

    async fn get_transaction(&self, tx_id: &str) -> Result<Option<ChainTransaction>, LedgerError> {
        debug!(tx_id, "fetching transaction");
        let response = self
            .http_client
            .get(self.transaction_url())
            .query(&[("id", tx_id)])
            .send()
            .await
            .map_err(map_send_error)?;

        let status = response.status();
        if status == StatusCode::NOT_FOUND {
            return Ok(None);
        }
        if !status.is_success() {
            return Err(LedgerError::RequestFailed(format!("HTTP status {status}")));
        }

        let mut tx: ChainTransaction = response.json().await.map_err(|e| {
            LedgerError::InvalidResponse(format!("failed to parse transaction response: {e}"))
        })?;
        if tx.actions.is_empty() {
            return Ok(None);
        }
        if tx.id.is_empty() {
            tx.id = tx_id.to_string();
        }
        Ok(Some(tx))
    }
}
