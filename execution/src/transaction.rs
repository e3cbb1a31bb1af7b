use {
    feemarket_shared::primitives::{Address, Coin},
    serde::{Deserialize, Serialize},
};

/// The fee-bearing part of a transaction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeeTx {
    /// The signer paying for the transaction unless a granter covers it.
    pub payer: Address,
    pub fee_granter: Option<Address>,
    /// Offered fee. At most one denomination is admissible, none counts as a zero fee.
    pub fee: Vec<Coin>,
    pub gas_limit: u64,
    /// Type URLs of the messages, forwarded to fee grant checks.
    pub msgs: Vec<String>,
}

impl FeeTx {
    pub fn new(payer: Address, fee: Coin, gas_limit: u64) -> Self {
        Self {
            payer,
            fee_granter: None,
            fee: vec![fee],
            gas_limit,
            msgs: Vec::new(),
        }
    }

    pub fn with_fee_granter(mut self, granter: Address) -> Self {
        self.fee_granter = Some(granter);
        self
    }

    pub fn with_msgs(mut self, msgs: impl IntoIterator<Item = impl Into<String>>) -> Self {
        self.msgs = msgs.into_iter().map(Into::into).collect();
        self
    }

    /// The account charged for the fee.
    pub fn fee_payer(&self) -> Address {
        self.fee_granter.unwrap_or(self.payer)
    }
}

/// Execution mode an admission check runs in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct CheckContext {
    /// Gas estimation, where a zero gas limit is tolerated.
    pub simulate: bool,
    pub height: u64,
}

impl CheckContext {
    pub fn at_height(height: u64) -> Self {
        Self {
            simulate: false,
            height,
        }
    }

    pub fn simulation(height: u64) -> Self {
        Self {
            simulate: true,
            height,
        }
    }

    pub(crate) fn requires_gas_limit(&self) -> bool {
        !self.simulate && self.height > 0
    }
}
