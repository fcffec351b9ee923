pub mod environment;
pub mod ledger_config;

pub use environment::{Config, ConfigError};
pub use ledger_config::{LedgerConfig, WalletConfig};
