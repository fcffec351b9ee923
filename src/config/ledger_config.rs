use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Remote ledger endpoint and transport timing.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LedgerConfig {
    /// JSON-RPC endpoint of the node
    pub rpc_url: String,

    /// Per-request HTTP timeout
    pub request_timeout: Duration,

    /// Upper bound on waiting for a receipt after submission
    pub confirmation_timeout: Duration,

    /// Initial delay between receipt polls (doubles up to 4x)
    pub receipt_poll_interval: Duration,
}

impl LedgerConfig {
    pub fn new(rpc_url: impl Into<String>) -> Self {
        Self {
            rpc_url: rpc_url.into(),
            ..Self::default()
        }
    }
}

impl Default for LedgerConfig {
    fn default() -> Self {
        Self {
            rpc_url: "http://127.0.0.1:8545".to_string(),
            request_timeout: Duration::from_secs(10),
            confirmation_timeout: Duration::from_secs(120),
            receipt_poll_interval: Duration::from_millis(2000),
        }
    }
}

/// Parameters for derivation, scanning and transfers.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WalletConfig {
    /// EIP-155 chain id used when signing
    pub chain_id: u64,

    /// Indices scanned per phrase: `0..max_index_per_phrase`
    pub max_index_per_phrase: u32,

    /// In-flight balance queries during a scan. 1 means sequential.
    pub scan_concurrency: usize,

    /// Caller-side bound on the confirmation wait
    pub confirmation_timeout: Duration,
}

impl Default for WalletConfig {
    fn default() -> Self {
        Self {
            chain_id: 1,
            max_index_per_phrase: 20,
            scan_concurrency: 1,
            confirmation_timeout: Duration::from_secs(120),
        }
    }
}
