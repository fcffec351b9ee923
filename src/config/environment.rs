use std::env;
use std::str::FromStr;
use std::time::Duration;

use super::ledger_config::{LedgerConfig, WalletConfig};

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("{0} must be set")]
    Missing(String),
    #[error("{name} is invalid: {reason}")]
    Invalid { name: String, reason: String },
}

/// Environment configuration
/// Loads and validates environment variables
///
/// Not `Debug`: it holds seed phrases.
#[derive(Clone)]
pub struct Config {
    pub seed_phrases: Vec<String>,
    pub ledger: LedgerConfig,
    pub wallet: WalletConfig,
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        let seed_phrases = load_seed_phrases()?;

        let rpc_url = env::var("RPC_URL")
            .map_err(|_| ConfigError::Missing("RPC_URL".to_string()))?;

        let confirmation_timeout = Duration::from_secs(parse_var("CONFIRMATION_TIMEOUT_SECS", 120)?);

        let ledger = LedgerConfig {
            rpc_url,
            request_timeout: Duration::from_secs(parse_var("RPC_REQUEST_TIMEOUT_SECS", 10)?),
            confirmation_timeout,
            receipt_poll_interval: Duration::from_millis(parse_var("RECEIPT_POLL_INTERVAL_MS", 2000)?),
        };

        let scan_concurrency: usize = parse_var("SCAN_CONCURRENCY", 1)?;
        if scan_concurrency == 0 {
            return Err(ConfigError::Invalid {
                name: "SCAN_CONCURRENCY".to_string(),
                reason: "must be at least 1".to_string(),
            });
        }

        let wallet = WalletConfig {
            chain_id: parse_var("CHAIN_ID", 1)?,
            max_index_per_phrase: parse_var("MAX_INDEX_PER_PHRASE", 20)?,
            scan_concurrency,
            confirmation_timeout,
        };

        Ok(Self {
            seed_phrases,
            ledger,
            wallet,
        })
    }

    /// 1-based lookup, matching the numbering of `SEED_PHRASE_<n>`.
    pub fn seed_phrase(&self, number: usize) -> Option<&str> {
        number
            .checked_sub(1)
            .and_then(|i| self.seed_phrases.get(i))
            .map(String::as_str)
    }
}

/// Numbered keys (`SEED_PHRASE_1`, `SEED_PHRASE_2`, ...) win over the
/// comma-separated `SEED_PHRASES` field. Numbering stops at the first gap.
fn load_seed_phrases() -> Result<Vec<String>, ConfigError> {
    let mut phrases = Vec::new();
    let mut number = 1;
    while let Ok(phrase) = env::var(format!("SEED_PHRASE_{}", number)) {
        phrases.push(phrase);
        number += 1;
    }

    if phrases.is_empty() {
        if let Ok(joined) = env::var("SEED_PHRASES") {
            phrases = joined.split(',').map(str::to_string).collect();
        }
    }

    let phrases: Vec<String> = phrases
        .iter()
        .map(|p| p.split_whitespace().collect::<Vec<_>>().join(" "))
        .filter(|p| !p.is_empty())
        .collect();

    if phrases.is_empty() {
        return Err(ConfigError::Missing("SEED_PHRASE_1 or SEED_PHRASES".to_string()));
    }
    Ok(phrases)
}

fn parse_var<T>(name: &str, default: T) -> Result<T, ConfigError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match env::var(name) {
        Ok(raw) => raw.trim().parse().map_err(|e: T::Err| ConfigError::Invalid {
            name: name.to_string(),
            reason: e.to_string(),
        }),
        Err(_) => Ok(default),
    }
}
