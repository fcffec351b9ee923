use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use std::str::FromStr;

use super::error::WalletError;

/// Decimals of the native currency (1 ether = 10^18 wei)
pub const NATIVE_DECIMALS: u32 = 18;

const WEI_PER_NATIVE: u128 = 1_000_000_000_000_000_000;

/// Convert a decimal amount in native units to the smallest unit.
pub fn parse_units(amount: &str) -> Result<u128, WalletError> {
    let trimmed = amount.trim();
    let value = Decimal::from_str(trimmed)
        .map_err(|e| WalletError::InvalidInput(format!("Invalid amount '{}': {}", trimmed, e)))?;

    if value.is_sign_negative() && !value.is_zero() {
        return Err(WalletError::InvalidInput(format!("Amount must not be negative: {}", trimmed)));
    }

    let value = value.normalize();
    if value.scale() > NATIVE_DECIMALS {
        return Err(WalletError::InvalidInput(format!(
            "Amount has more than {} decimal places: {}",
            NATIVE_DECIMALS, trimmed
        )));
    }

    value
        .checked_mul(Decimal::from(WEI_PER_NATIVE as u64))
        .and_then(|wei| wei.trunc().to_u128())
        .ok_or_else(|| WalletError::InvalidInput(format!("Amount out of range: {}", trimmed)))
}

/// Exact decimal rendering of a smallest-unit quantity, trailing zeros trimmed.
pub fn format_units(raw: u128) -> String {
    let whole = raw / WEI_PER_NATIVE;
    let frac = raw % WEI_PER_NATIVE;
    if frac == 0 {
        return whole.to_string();
    }
    let frac = format!("{:018}", frac);
    format!("{}.{}", whole, frac.trim_end_matches('0'))
}
