use futures::stream::{self, StreamExt};
use std::sync::Arc;

use super::address::parse_address;
use super::derivation::KeyDeriver;
use super::error::WalletError;
use super::rpc::LedgerClient;
use super::types::{seed_phrase_label, WalletInfo};
use super::units::format_units;
use crate::config::WalletConfig;

/// Finds funded accounts across a set of seed phrases.
pub struct BalanceScanner {
    deriver: KeyDeriver,
    ledger: Arc<dyn LedgerClient>,
    config: WalletConfig,
}

struct ScanTarget {
    phrase_label: String,
    account_index: u32,
    address: String,
}

impl BalanceScanner {
    pub fn new(deriver: KeyDeriver, ledger: Arc<dyn LedgerClient>, config: WalletConfig) -> Self {
        Self { deriver, ledger, config }
    }

    /// Scan `0..max_index_per_phrase` from the config for every phrase.
    pub async fn scan(&self, seed_phrases: &[String]) -> Result<Vec<WalletInfo>, WalletError> {
        self.scan_window(seed_phrases, self.config.max_index_per_phrase).await
    }

    /// Every (phrase, index) with `index < max_index` is derived and queried.
    ///
    /// Results keep phrase order, then index order, and only include nonzero
    /// balances. A network failure on one account is logged and skipped.
    /// Any other failure, including an undecodable phrase, aborts the scan;
    /// all phrases are derived before the first balance query is sent.
    pub async fn scan_window(
        &self,
        seed_phrases: &[String],
        max_index: u32,
    ) -> Result<Vec<WalletInfo>, WalletError> {
        let mut targets = Vec::with_capacity(seed_phrases.len() * max_index as usize);
        for phrase in seed_phrases {
            let phrase_label = seed_phrase_label(phrase);
            for account_index in 0..max_index {
                let address = self.deriver.derive_address(phrase, account_index)?;
                tracing::debug!(phrase = %phrase_label, account_index, %address, "derived");
                targets.push(ScanTarget {
                    phrase_label: phrase_label.clone(),
                    account_index,
                    address,
                });
            }
        }

        let total = targets.len();
        let concurrency = self.config.scan_concurrency.max(1);

        // `buffered` yields in input order regardless of completion order
        let outcomes: Vec<Result<Option<WalletInfo>, WalletError>> = stream::iter(targets)
            .map(|target| self.query(target))
            .buffered(concurrency)
            .collect()
            .await;

        let mut wallets = Vec::new();
        for outcome in outcomes {
            if let Some(info) = outcome? {
                wallets.push(info);
            }
        }

        tracing::info!(scanned = total, funded = wallets.len(), "balance scan complete");
        Ok(wallets)
    }

    async fn query(&self, target: ScanTarget) -> Result<Option<WalletInfo>, WalletError> {
        match self.ledger.get_balance(&target.address).await.map_err(WalletError::from) {
            Ok(0) => Ok(None),
            Ok(balance_raw) => Ok(Some(WalletInfo {
                balance_display: format_units(balance_raw),
                address: target.address,
                balance_raw,
                account_index: target.account_index,
                seed_phrase_label: target.phrase_label,
            })),
            Err(WalletError::Network(e)) => {
                tracing::error!(
                    phrase = %target.phrase_label,
                    account_index = target.account_index,
                    address = %target.address,
                    error = %e,
                    "balance query failed, skipping"
                );
                Ok(None)
            }
            Err(e) => Err(e),
        }
    }

    /// Display balance of one address.
    pub async fn check_balance(&self, address: &str) -> Result<String, WalletError> {
        parse_address(address)?;
        let balance = self.ledger.get_balance(address).await?;
        Ok(format_units(balance))
    }
}
