use bip39::{Language, Mnemonic};
use coins_bip32::path::DerivationPath;
use coins_bip32::prelude::*;
use secp256k1::{All, PublicKey, Secp256k1, SecretKey};
use sha3::{Digest, Keccak256};
use std::str::FromStr;

use super::address::to_checksum_address;
use super::error::WalletError;
use super::types::KeyPair;

// =============================================================================
// HD WALLET DERIVATION
// BIP39 mnemonic -> BIP32 seed -> BIP44 path m/44'/60'/0'/0/[index]
// =============================================================================

/// BIP44 account branch for the native ledger; the index is appended.
pub const DEFAULT_BASE_PATH: &str = "m/44'/60'/0'/0";

/// Highest index usable as a non-hardened child
pub const MAX_ACCOUNT_INDEX: u32 = (1 << 31) - 1;

/// Deterministic (seed phrase, index) -> key-pair derivation.
///
/// Side-effect free: identical inputs always produce identical output.
/// `reveal_private_key` is the only method that hands the secret scalar
/// back to the caller; everything else keeps it inside [`KeyPair`].
#[derive(Clone)]
pub struct KeyDeriver {
    base_path: String,
    secp: Secp256k1<All>,
}

impl KeyDeriver {
    pub fn new() -> Self {
        Self::with_base_path(DEFAULT_BASE_PATH)
    }

    pub fn with_base_path(base_path: impl Into<String>) -> Self {
        Self {
            base_path: base_path.into(),
            secp: Secp256k1::new(),
        }
    }

    pub fn base_path(&self) -> &str {
        &self.base_path
    }

    /// Derive the signer key-pair for `index` under `seed_phrase`.
    pub fn derive(&self, seed_phrase: &str, index: u32) -> Result<KeyPair, WalletError> {
        let secret_key = self.derive_secret_key(seed_phrase, index)?;
        let address = self.address_of(&secret_key);
        Ok(KeyPair {
            secret_key,
            address,
            account_index: index,
        })
    }

    /// Address only. The key-pair never leaves this call.
    pub fn derive_address(&self, seed_phrase: &str, index: u32) -> Result<String, WalletError> {
        let secret_key = self.derive_secret_key(seed_phrase, index)?;
        Ok(self.address_of(&secret_key))
    }

    /// Raw private key as `0x`-prefixed hex.
    ///
    /// The returned string is the account's secret. Never log or transmit it.
    pub fn reveal_private_key(&self, seed_phrase: &str, index: u32) -> Result<String, WalletError> {
        let secret_key = self.derive_secret_key(seed_phrase, index)?;
        Ok(format!("0x{}", hex::encode(secret_key.secret_bytes())))
    }

    fn derive_secret_key(&self, seed_phrase: &str, index: u32) -> Result<SecretKey, WalletError> {
        if index > MAX_ACCOUNT_INDEX {
            return Err(WalletError::InvalidInput(format!(
                "Account index {} exceeds {}",
                index, MAX_ACCOUNT_INDEX
            )));
        }

        let seed = mnemonic_seed(seed_phrase)?;

        let path_str = format!("{}/{}", self.base_path, index);
        let derivation_path = DerivationPath::from_str(&path_str)
            .map_err(|e| WalletError::InvalidInput(format!("Invalid derivation path: {}", e)))?;

        let key = coins_bip32::xkeys::XPriv::root_from_seed(&seed, None)
            .map_err(|e| WalletError::InvalidSeedPhrase(format!("Failed to create root key: {}", e)))?
            .derive_path(&derivation_path)
            .map_err(|e| WalletError::InvalidSeedPhrase(format!("Failed to derive path: {}", e)))?;

        let signing_key: &SigningKey = key.as_ref();
        let priv_bytes = signing_key.to_bytes();

        SecretKey::from_slice(&priv_bytes)
            .map_err(|e| WalletError::InvalidSeedPhrase(format!("Invalid private key bytes: {}", e)))
    }

    /// Ethereum-style address = Keccak256(uncompressed_pubkey[1..])[12..]
    fn address_of(&self, secret_key: &SecretKey) -> String {
        let public_key = PublicKey::from_secret_key(&self.secp, secret_key);
        let public_key_bytes = public_key.serialize_uncompressed();

        let hash = Keccak256::digest(&public_key_bytes[1..]);
        let mut address = [0u8; 20];
        address.copy_from_slice(&hash[12..]);
        to_checksum_address(&address)
    }
}

impl Default for KeyDeriver {
    fn default() -> Self {
        Self::new()
    }
}

/// Validate BIP39 seed phrase
pub fn is_valid_seed_phrase(seed_phrase: &str) -> bool {
    mnemonic_seed(seed_phrase).is_ok()
}

fn mnemonic_seed(seed_phrase: &str) -> Result<[u8; 64], WalletError> {
    let normalized = seed_phrase.split_whitespace().collect::<Vec<_>>().join(" ");
    let word_count = normalized.split(' ').filter(|w| !w.is_empty()).count();
    if !matches!(word_count, 12 | 15 | 18 | 21 | 24) {
        return Err(WalletError::InvalidSeedPhrase(format!(
            "Expected 12, 15, 18, 21 or 24 words, got {}",
            word_count
        )));
    }

    let mnemonic = Mnemonic::parse_in_normalized(Language::English, &normalized)
        .map_err(|e| WalletError::InvalidSeedPhrase(format!("Invalid mnemonic: {}", e)))?;
    Ok(mnemonic.to_seed(""))
}
