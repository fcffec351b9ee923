use sha3::{Digest, Keccak256};

use super::error::WalletError;

/// Render 20 address bytes in EIP-55 mixed-case checksum form.
pub fn to_checksum_address(bytes: &[u8; 20]) -> String {
    let lower = hex::encode(bytes);
    let hash = Keccak256::digest(lower.as_bytes());

    let mut out = String::with_capacity(42);
    out.push_str("0x");
    for (i, c) in lower.chars().enumerate() {
        let nibble = if i % 2 == 0 { hash[i / 2] >> 4 } else { hash[i / 2] & 0x0f };
        if c.is_ascii_alphabetic() && nibble >= 8 {
            out.push(c.to_ascii_uppercase());
        } else {
            out.push(c);
        }
    }
    out
}

/// Parse a `0x`-prefixed 40 hex digit address.
///
/// Single-case bodies are accepted as-is; mixed case must carry a valid
/// EIP-55 checksum.
pub fn parse_address(address: &str) -> Result<[u8; 20], WalletError> {
    let body = address
        .strip_prefix("0x")
        .or_else(|| address.strip_prefix("0X"))
        .ok_or_else(|| WalletError::InvalidInput(format!("Address must start with 0x: {}", address)))?;

    if body.len() != 40 {
        return Err(WalletError::InvalidInput(format!(
            "Address must have 40 hex digits, got {}: {}",
            body.len(),
            address
        )));
    }

    let mut bytes = [0u8; 20];
    hex::decode_to_slice(body, &mut bytes)
        .map_err(|e| WalletError::InvalidInput(format!("Address is not hex ({}): {}", e, address)))?;

    let has_lower = body.chars().any(|c| c.is_ascii_lowercase());
    let has_upper = body.chars().any(|c| c.is_ascii_uppercase());
    if has_lower && has_upper && to_checksum_address(&bytes)[2..] != *body {
        return Err(WalletError::InvalidInput(format!("Address checksum mismatch: {}", address)));
    }

    Ok(bytes)
}

pub fn is_valid_address(address: &str) -> bool {
    parse_address(address).is_ok()
}
