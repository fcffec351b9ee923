pub mod address;
pub mod derivation;
pub mod error;
pub mod rpc;
pub mod scanner;
pub mod signing;
pub mod transfer;
pub mod types;
pub mod units;

pub use address::{is_valid_address, parse_address, to_checksum_address};
pub use derivation::{is_valid_seed_phrase, KeyDeriver};
pub use error::WalletError;
pub use rpc::{Confirmation, HttpRpcClient, LedgerClient, LedgerError};
pub use scanner::BalanceScanner;
pub use transfer::TransferEngine;
pub use types::*;
pub use units::{format_units, parse_units};
