use std::sync::Arc;

use super::address::parse_address;
use super::derivation::KeyDeriver;
use super::error::WalletError;
use super::rpc::{LedgerClient, LedgerError};
use super::signing::{SigningService, TransferTransaction};
use super::types::{seed_phrase_label, TransferRequest, TransferResult, TransferState};
use super::units::{format_units, parse_units};
use crate::config::WalletConfig;
use crate::services::gas::{GasEstimator, TxType};

/// Runs one native value transfer from a derived signer.
///
/// Steps run strictly in order and nothing is retried. The submit call is
/// issued at most once per `transfer`; a `Timeout` after it means the
/// outcome is unknown, so callers must look the hash up instead of calling
/// again. Two transfers from the same signer must not overlap unless the
/// ledger client serializes nonces.
pub struct TransferEngine {
    deriver: KeyDeriver,
    ledger: Arc<dyn LedgerClient>,
    estimator: GasEstimator,
    config: WalletConfig,
}

impl TransferEngine {
    pub fn new(deriver: KeyDeriver, ledger: Arc<dyn LedgerClient>, config: WalletConfig) -> Self {
        Self {
            deriver,
            estimator: GasEstimator::new(Arc::clone(&ledger)),
            ledger,
            config,
        }
    }

    pub async fn transfer(&self, request: &TransferRequest) -> Result<TransferResult, WalletError> {
        let mut state = TransferState::Validating;
        let result = self.execute(request, &mut state).await;

        if let Err(e) = &result {
            if e.is_ambiguous() {
                tracing::error!(?state, error = %e, "transfer outcome unknown, query the transaction before retrying");
            } else {
                tracing::warn!(?state, error = %e, "transfer failed");
            }
        }
        result
    }

    async fn execute(
        &self,
        request: &TransferRequest,
        state: &mut TransferState,
    ) -> Result<TransferResult, WalletError> {
        // Local checks only; no ledger call before both pass
        let recipient = parse_address(&request.recipient_address)?;
        let amount = parse_units(&request.amount_display)?;

        advance(state, TransferState::Deriving);
        let signer = self.deriver.derive(&request.signer_seed_phrase, request.signer_index)?;
        tracing::info!(
            phrase = %seed_phrase_label(&request.signer_seed_phrase),
            signer_index = request.signer_index,
            from = signer.address(),
            to = %request.recipient_address,
            amount = %request.amount_display,
            "transfer requested"
        );

        advance(state, TransferState::CheckingBalance);
        let balance = self.ledger.get_balance(signer.address()).await?;
        if amount > balance {
            return Err(WalletError::InsufficientFunds {
                needed: amount,
                available: balance,
            });
        }

        advance(state, TransferState::EstimatingFee);
        let fee = self.estimator.estimate(TxType::NativeTransfer).await?;
        let total_cost = fee
            .total_cost(amount)
            .ok_or_else(|| WalletError::InvalidInput("Amount plus fee overflows".to_string()))?;
        if total_cost > balance {
            return Err(WalletError::InsufficientFunds {
                needed: total_cost,
                available: balance,
            });
        }
        tracing::info!(
            fee = %format_units(fee.total_fee),
            total = %format_units(total_cost),
            balance = %format_units(balance),
            "funds sufficient"
        );

        advance(state, TransferState::Submitting);
        let nonce = self.ledger.get_transaction_count(signer.address()).await?;
        let tx = TransferTransaction {
            nonce,
            gas_price: fee.fee_rate,
            gas_limit: fee.gas_limit,
            to: recipient,
            value: amount,
            chain_id: self.config.chain_id,
        };
        let signed = SigningService::sign_transfer(&signer, &tx)?;

        // From here on the transaction may be on the wire: only an explicit
        // rejection is a definite failure, anything else leaves it unknown
        let tx_hash = self
            .ledger
            .submit(&signed.raw)
            .await
            .map_err(|e| outcome_unknown(e, &signed.hash))?;
        if !tx_hash.eq_ignore_ascii_case(&signed.hash) {
            tracing::warn!(local = %signed.hash, remote = %tx_hash, "node reported a different transaction hash");
        }
        tracing::info!(%tx_hash, nonce, "transaction submitted");

        advance(state, TransferState::Confirming);
        let confirmation = tokio::time::timeout(
            self.config.confirmation_timeout,
            self.ledger.await_confirmation(&tx_hash),
        )
        .await
        .map_err(|_| {
            WalletError::Timeout(format!(
                "{} not confirmed within {:?}",
                tx_hash, self.config.confirmation_timeout
            ))
        })?
        .map_err(|e| outcome_unknown(e, &tx_hash))?;

        advance(state, TransferState::Done);
        tracing::info!(%tx_hash, block = confirmation.block_number, "transfer confirmed");

        Ok(TransferResult {
            transaction_hash: tx_hash,
            confirmed_block: confirmation.block_number,
        })
    }
}

/// Classify a ledger failure raised after the signed transaction left this process.
fn outcome_unknown(err: LedgerError, tx_hash: &str) -> WalletError {
    match err {
        LedgerError::Rejected(reason) => WalletError::RejectedTransaction(reason),
        other => WalletError::Timeout(format!(
            "{} outcome unknown, look it up before resubmitting: {}",
            tx_hash, other
        )),
    }
}

fn advance(state: &mut TransferState, next: TransferState) {
    tracing::debug!(from = ?*state, to = ?next, "transfer state");
    *state = next;
}
