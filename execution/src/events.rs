use {
    feemarket_shared::primitives::{Address, Coin, Decimal},
    serde::{Deserialize, Serialize},
};

/// Events emitted by the fee market, tagged by their snake case name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum FeeMarketEvent {
    TxFee {
        payer: Address,
        required: Coin,
        tip: Coin,
    },
    TxRefund {
        payee: Address,
        refund: Coin,
    },
    FeeMarketUpdate {
        base_fee: Decimal,
        learning_rate: Decimal,
        height: u64,
    },
}

impl FeeMarketEvent {
    pub fn name(&self) -> &'static str {
        match self {
            Self::TxFee { .. } => "tx_fee",
            Self::TxRefund { .. } => "tx_refund",
            Self::FeeMarketUpdate { .. } => "fee_market_update",
        }
    }
}
