use secp256k1::{Message, Secp256k1};
use sha3::{Digest, Keccak256};

use super::error::WalletError;
use super::types::KeyPair;

/// Unsigned legacy value transfer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransferTransaction {
    pub nonce: u64,
    pub gas_price: u128,
    pub gas_limit: u64,
    pub to: [u8; 20],
    pub value: u128,
    pub chain_id: u64,
}

/// Broadcast-ready transaction and the hash the ledger will know it by.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignedTransfer {
    /// `0x`-prefixed RLP of the signed transaction
    pub raw: String,
    /// `0x`-prefixed Keccak256 of the raw bytes
    pub hash: String,
}

pub struct SigningService;

impl SigningService {
    /// Sign a value transfer.
    /// Implements EIP-155 signing with RLP encoding
    pub fn sign_transfer(key_pair: &KeyPair, tx: &TransferTransaction) -> Result<SignedTransfer, WalletError> {
        let secp = Secp256k1::new();

        let hash = signing_hash(tx);
        let message = Message::from_digest_slice(&hash)
            .map_err(|e| WalletError::InvalidInput(format!("Invalid message hash: {}", e)))?;

        let sig = secp.sign_ecdsa_recoverable(&message, &key_pair.secret_key);
        let (rec_id, sig_bytes) = sig.serialize_compact();

        // EIP-155: v = recovery_id + 35 + chain_id * 2
        let v = tx
            .chain_id
            .checked_mul(2)
            .and_then(|doubled| doubled.checked_add(35 + rec_id.to_i32() as u64))
            .ok_or_else(|| WalletError::InvalidInput(format!("Chain id {} is out of range", tx.chain_id)))?;

        let mut fields = base_fields(tx);
        fields.push(encode_uint(v as u128));
        fields.push(trim_leading_zeros(&sig_bytes[..32]));
        fields.push(trim_leading_zeros(&sig_bytes[32..]));

        let raw = encode_list(&fields);
        let tx_hash = Keccak256::digest(&raw);

        Ok(SignedTransfer {
            raw: format!("0x{}", hex::encode(&raw)),
            hash: format!("0x{}", hex::encode(tx_hash)),
        })
    }
}

/// Keccak256 of the EIP-155 preimage
/// `[nonce, gasPrice, gasLimit, to, value, data, chainId, 0, 0]`.
pub fn signing_hash(tx: &TransferTransaction) -> [u8; 32] {
    let mut fields = base_fields(tx);
    fields.push(encode_uint(tx.chain_id as u128));
    fields.push(Vec::new());
    fields.push(Vec::new());

    let mut hash = [0u8; 32];
    hash.copy_from_slice(&Keccak256::digest(encode_list(&fields)));
    hash
}

fn base_fields(tx: &TransferTransaction) -> Vec<Vec<u8>> {
    vec![
        encode_uint(tx.nonce as u128),
        encode_uint(tx.gas_price),
        encode_uint(tx.gas_limit as u128),
        tx.to.to_vec(),
        encode_uint(tx.value),
        Vec::new(), // no calldata
    ]
}

// =============================================================================
// MINIMAL RLP ENCODER
// =============================================================================

fn encode_uint(val: u128) -> Vec<u8> {
    trim_leading_zeros(&val.to_be_bytes())
}

fn trim_leading_zeros(bytes: &[u8]) -> Vec<u8> {
    let start = bytes.iter().position(|&b| b != 0).unwrap_or(bytes.len());
    bytes[start..].to_vec()
}

fn encode_length(len: usize, short_offset: u8, long_offset: u8, out: &mut Vec<u8>) {
    if len < 56 {
        out.push(short_offset + len as u8);
    } else {
        let len_bytes = encode_uint(len as u128);
        out.push(long_offset + len_bytes.len() as u8);
        out.extend_from_slice(&len_bytes);
    }
}

fn encode_list(elements: &[Vec<u8>]) -> Vec<u8> {
    let mut payload = Vec::new();
    for el in elements {
        if el.len() == 1 && el[0] < 0x80 {
            payload.push(el[0]);
        } else {
            encode_length(el.len(), 0x80, 0xb7, &mut payload);
            payload.extend_from_slice(el);
        }
    }

    let mut result = Vec::with_capacity(payload.len() + 9);
    encode_length(payload.len(), 0xc0, 0xf7, &mut result);
    result.extend(payload);
    result
}
