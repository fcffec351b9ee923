use std::sync::Arc;

use super::types::{FeeEstimate, TxType};
use crate::services::wallet::error::WalletError;
use crate::services::wallet::rpc::LedgerClient;

/// Fee quotes from the live fee rate. No caching: every call hits the ledger.
pub struct GasEstimator {
    ledger: Arc<dyn LedgerClient>,
}

impl GasEstimator {
    pub fn new(ledger: Arc<dyn LedgerClient>) -> Self {
        Self { ledger }
    }

    pub async fn estimate(&self, tx_type: TxType) -> Result<FeeEstimate, WalletError> {
        let fee_rate = self.ledger.get_fee_rate().await?;

        let estimate = FeeEstimate::new(tx_type, fee_rate).ok_or_else(|| {
            WalletError::InvalidInput(format!("Fee overflow at rate {}", fee_rate))
        })?;

        tracing::debug!(
            ?tx_type,
            fee_rate = %estimate.fee_rate,
            gas_limit = estimate.gas_limit,
            total_fee = %estimate.total_fee,
            "fee estimated"
        );
        Ok(estimate)
    }
}
