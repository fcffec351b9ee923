use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::json;
use std::time::{Duration, Instant};

use crate::config::ledger_config::LedgerConfig;

#[derive(Debug, thiserror::Error)]
pub enum LedgerError {
    #[error("Network error: {0}")]
    Network(String),
    #[error("RPC error: {0}")]
    Rpc(String),
    #[error("Parse error: {0}")]
    Parse(String),
    #[error("Rejected by node: {0}")]
    Rejected(String),
    #[error("Timeout: {0}")]
    Timeout(String),
}

/// Inclusion proof returned once a transaction is mined.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Confirmation {
    pub block_number: u64,
}

/// Remote ledger capability consumed by the scanner and the transfer engine.
///
/// Implementations are already connected; retries and polling backoff are
/// the implementation's business. Nonce assignment is not serialized here,
/// so two transfers from the same signer must not run concurrently unless
/// the implementation orders them itself.
#[async_trait]
pub trait LedgerClient: Send + Sync {
    /// Balance in the smallest unit.
    async fn get_balance(&self, address: &str) -> Result<u128, LedgerError>;
    /// Price per unit of work, in the smallest unit.
    async fn get_fee_rate(&self) -> Result<u128, LedgerError>;
    async fn get_transaction_count(&self, address: &str) -> Result<u64, LedgerError>;
    /// Broadcast a raw signed transaction. Returns its hash.
    async fn submit(&self, raw_tx: &str) -> Result<String, LedgerError>;
    /// Block until the transaction is included, or fail with `Timeout`.
    async fn await_confirmation(&self, tx_hash: &str) -> Result<Confirmation, LedgerError>;
}

/// JSON-RPC 2.0 client for an EVM-compatible node.
pub struct HttpRpcClient {
    client: reqwest::Client,
    url: String,
    confirmation_timeout: Duration,
    receipt_poll_interval: Duration,
}

impl HttpRpcClient {
    pub fn new(config: &LedgerConfig) -> Self {
        Self {
            client: reqwest::Client::builder()
                .timeout(config.request_timeout)
                .build()
                .unwrap_or_default(),
            url: config.rpc_url.clone(),
            confirmation_timeout: config.confirmation_timeout,
            receipt_poll_interval: config.receipt_poll_interval,
        }
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    async fn call_rpc_optional<T: DeserializeOwned>(
        &self,
        method: &str,
        params: serde_json::Value,
    ) -> Result<Option<T>, LedgerError> {
        let payload = json!({
            "jsonrpc": "2.0",
            "method": method,
            "params": params,
            "id": 1
        });

        let response = self.client.post(&self.url)
            .json(&payload)
            .send()
            .await
            .map_err(|e| LedgerError::Network(e.to_string()))?;

        if !response.status().is_success() {
            return Err(LedgerError::Network(format!("node returned HTTP {}", response.status())));
        }

        let rpc_response: RpcResponse<T> = response.json()
            .await
            .map_err(|e| LedgerError::Parse(e.to_string()))?;

        if let Some(err) = rpc_response.error {
            return Err(LedgerError::Rpc(err.message));
        }

        Ok(rpc_response.result)
    }

    async fn call_rpc<T: DeserializeOwned>(
        &self,
        method: &str,
        params: serde_json::Value,
    ) -> Result<T, LedgerError> {
        self.call_rpc_optional(method, params)
            .await?
            .ok_or_else(|| LedgerError::Parse(format!("Missing result for {}", method)))
    }
}

#[derive(Deserialize)]
struct RpcResponse<T> {
    result: Option<T>,
    error: Option<RpcErrorObj>,
}

#[derive(Deserialize)]
struct RpcErrorObj {
    message: String,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct TransactionReceipt {
    block_number: Option<String>,
    status: Option<String>,
}

fn parse_quantity(hex_value: &str, what: &str) -> Result<u128, LedgerError> {
    u128::from_str_radix(hex_value.trim_start_matches("0x"), 16)
        .map_err(|e| LedgerError::Parse(format!("Invalid {} hex: {}", what, e)))
}

#[async_trait]
impl LedgerClient for HttpRpcClient {
    async fn get_balance(&self, address: &str) -> Result<u128, LedgerError> {
        let hex_balance: String = self.call_rpc("eth_getBalance", json!([address, "latest"])).await?;
        parse_quantity(&hex_balance, "balance")
    }

    async fn get_fee_rate(&self) -> Result<u128, LedgerError> {
        let hex_price: String = self.call_rpc("eth_gasPrice", json!([])).await?;
        parse_quantity(&hex_price, "gas price")
    }

    async fn get_transaction_count(&self, address: &str) -> Result<u64, LedgerError> {
        let hex_count: String = self.call_rpc("eth_getTransactionCount", json!([address, "pending"])).await?;
        u64::from_str_radix(hex_count.trim_start_matches("0x"), 16)
            .map_err(|e| LedgerError::Parse(format!("Invalid nonce hex: {}", e)))
    }

    async fn submit(&self, raw_tx: &str) -> Result<String, LedgerError> {
        match self.call_rpc("eth_sendRawTransaction", json!([raw_tx])).await {
            Err(LedgerError::Rpc(message)) => Err(LedgerError::Rejected(message)),
            other => other,
        }
    }

    async fn await_confirmation(&self, tx_hash: &str) -> Result<Confirmation, LedgerError> {
        let deadline = Instant::now() + self.confirmation_timeout;
        let max_interval = self.receipt_poll_interval * 4;
        let mut interval = self.receipt_poll_interval;

        loop {
            match self
                .call_rpc_optional::<TransactionReceipt>("eth_getTransactionReceipt", json!([tx_hash]))
                .await
            {
                Ok(Some(TransactionReceipt { block_number: Some(block_hex), status })) => {
                    let block_number = u64::from_str_radix(block_hex.trim_start_matches("0x"), 16)
                        .map_err(|e| LedgerError::Parse(format!("Invalid block number hex: {}", e)))?;
                    if status.as_deref() == Some("0x0") {
                        return Err(LedgerError::Rejected(format!(
                            "{} reverted in block {}",
                            tx_hash, block_number
                        )));
                    }
                    return Ok(Confirmation { block_number });
                }
                Ok(_) => tracing::debug!(tx_hash, "receipt not available yet"),
                Err(LedgerError::Network(e)) => {
                    tracing::warn!(tx_hash, error = %e, "receipt poll failed, retrying");
                }
                Err(e) => return Err(e),
            }

            let now = Instant::now();
            if now >= deadline {
                return Err(LedgerError::Timeout(format!(
                    "{} not confirmed within {:?}",
                    tx_hash, self.confirmation_timeout
                )));
            }
            tokio::time::sleep(interval.min(deadline - now)).await;
            interval = (interval * 2).min(max_interval);
        }
    }
}
