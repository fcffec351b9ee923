use super::rpc::LedgerError;

/// Failure kinds surfaced by derivation, scanning and transfers.
///
/// Callers match on the variant, never on the message text.
#[derive(Debug, thiserror::Error)]
pub enum WalletError {
    /// Phrase does not decode to a BIP39 seed. Retrying the same input is pointless.
    #[error("Invalid seed phrase: {0}")]
    InvalidSeedPhrase(String),

    /// Malformed address or amount. Nothing was sent to the ledger.
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Insufficient funds: need {needed}, have {available}")]
    InsufficientFunds { needed: u128, available: u128 },

    /// Transport failure on a read-only call.
    #[error("Network error: {0}")]
    Network(String),

    /// The node refused the signed transaction. Do not resubmit blindly.
    #[error("Transaction rejected: {0}")]
    RejectedTransaction(String),

    /// Confirmation was not observed in time, or the transport failed after
    /// the transaction was handed to it. The transaction may still land.
    #[error("Timed out waiting for confirmation: {0}")]
    Timeout(String),
}

impl WalletError {
    /// True when the outcome of a submitted transfer is unknown.
    /// The caller has to re-query the transaction instead of resubmitting.
    pub fn is_ambiguous(&self) -> bool {
        matches!(self, WalletError::Timeout(_))
    }
}

impl From<LedgerError> for WalletError {
    fn from(err: LedgerError) -> Self {
        match err {
            LedgerError::Network(msg) => WalletError::Network(msg),
            LedgerError::Rpc(msg) => WalletError::Network(format!("RPC error: {}", msg)),
            LedgerError::Parse(msg) => WalletError::Network(format!("Parse error: {}", msg)),
            LedgerError::Rejected(msg) => WalletError::RejectedTransaction(msg),
            LedgerError::Timeout(msg) => WalletError::Timeout(msg),
        }
    }
}
