use secp256k1::SecretKey;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Signer material for one (seed phrase, index) pair.
///
/// The secret scalar stays inside this struct; `Debug` never prints it.
#[derive(Clone)]
pub struct KeyPair {
    pub(crate) secret_key: SecretKey,
    pub(crate) address: String,
    pub(crate) account_index: u32,
}

impl KeyPair {
    /// EIP-55 checksummed address
    pub fn address(&self) -> &str {
        &self.address
    }

    pub fn account_index(&self) -> u32 {
        self.account_index
    }
}

impl fmt::Debug for KeyPair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("KeyPair")
            .field("address", &self.address)
            .field("account_index", &self.account_index)
            .field("secret_key", &"<redacted>")
            .finish()
    }
}

/// Read-only snapshot of a funded account found by a scan.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WalletInfo {
    pub address: String,
    pub balance_raw: u128,
    pub balance_display: String,
    pub account_index: u32,
    /// Non-secret preview of the phrase the account came from
    pub seed_phrase_label: String,
}

#[derive(Clone, Serialize, Deserialize)]
pub struct TransferRequest {
    pub signer_seed_phrase: String,
    pub signer_index: u32,
    pub recipient_address: String,
    /// Decimal amount in native units, e.g. "0.25"
    pub amount_display: String,
}

impl fmt::Debug for TransferRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TransferRequest")
            .field("signer_seed_phrase", &seed_phrase_label(&self.signer_seed_phrase))
            .field("signer_index", &self.signer_index)
            .field("recipient_address", &self.recipient_address)
            .field("amount_display", &self.amount_display)
            .finish()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransferResult {
    pub transaction_hash: String,
    pub confirmed_block: u64,
}

/// Progress of a single transfer. Each state strictly follows the previous one.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransferState {
    Validating,
    Deriving,
    CheckingBalance,
    EstimatingFee,
    Submitting,
    Confirming,
    Done,
}

/// First two words of the phrase followed by an ellipsis.
pub fn seed_phrase_label(seed_phrase: &str) -> String {
    let preview: Vec<&str> = seed_phrase.split_whitespace().take(2).collect();
    format!("{}...", preview.join(" "))
}
