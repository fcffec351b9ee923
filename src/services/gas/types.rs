use serde::{Deserialize, Serialize};

/// Transaction types with different gas requirements
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TxType {
    /// Native value transfer (21,000 gas)
    NativeTransfer,
}

impl TxType {
    /// Fixed work units the ledger charges for this transaction type
    pub fn gas_limit(&self) -> u64 {
        match self {
            TxType::NativeTransfer => 21_000,
        }
    }
}

/// Fee quote for one transaction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeeEstimate {
    pub tx_type: TxType,
    /// Price per unit of work, smallest unit
    pub fee_rate: u128,
    pub gas_limit: u64,
    /// fee_rate × gas_limit
    pub total_fee: u128,
}

impl FeeEstimate {
    /// `None` when the product overflows.
    pub fn new(tx_type: TxType, fee_rate: u128) -> Option<Self> {
        let gas_limit = tx_type.gas_limit();
        let total_fee = fee_rate.checked_mul(gas_limit as u128)?;
        Some(Self {
            tx_type,
            fee_rate,
            gas_limit,
            total_fee,
        })
    }

    /// amount + total_fee, `None` on overflow
    pub fn total_cost(&self, amount: u128) -> Option<u128> {
        amount.checked_add(self.total_fee)
    }
}
