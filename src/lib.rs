//! Deterministic HD accounts from BIP39 seed phrases, balance scanning over
//! a JSON-RPC ledger, and confirmed native value transfers.

pub mod config;
pub mod services;

pub use config::{Config, ConfigError, LedgerConfig, WalletConfig};
pub use services::wallet::{
    BalanceScanner, HttpRpcClient, KeyDeriver, LedgerClient, TransferEngine, TransferRequest,
    TransferResult, WalletError, WalletInfo,
};
