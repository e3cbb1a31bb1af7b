use {
    crate::Params,
    alloy::primitives::{I256, U256},
    feemarket_shared::{
        error::{Error, InvalidTransactionCause, Result},
        primitives::Decimal,
    },
    serde::{Deserialize, Serialize},
};

/// Mutable controller state.
///
/// Between block boundaries the state upholds these invariants:
/// 1. The window has exactly [`Params::window`] slots.
/// 2. No slot exceeds [`Self::max_block_utilization`].
/// 3. [`Self::base_fee`] is not below [`Self::min_base_fee`].
/// 4. [`Self::learning_rate`] stays within the learning rate bounds of the params.
/// 5. The target is positive and not above the max block utilization.
/// 6. [`Self::index`] points inside the window.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct State {
    /// Gas consumed per block, a ring indexed by [`Self::index`].
    pub window: Vec<u64>,
    /// Slot of the current block.
    pub index: usize,
    pub base_fee: Decimal,
    /// The base fee floor captured at the last params update.
    pub min_base_fee: Decimal,
    pub learning_rate: Decimal,
    pub target_block_utilization: u64,
    pub max_block_utilization: u64,
}

impl State {
    /// Creates the genesis state for `params`: an empty window with the base fee and the learning
    /// rate at their floors.
    ///
    /// The window is allocated in full, so `params` are expected to be validated.
    pub fn new(params: &Params) -> Self {
        Self {
            window: vec![0; params.window as usize],
            index: 0,
            base_fee: params.min_base_fee,
            min_base_fee: params.min_base_fee,
            learning_rate: params.min_learning_rate,
            target_block_utilization: params.target_block_utilization,
            max_block_utilization: params.max_block_utilization,
        }
    }

    pub fn validate(&self, params: &Params) -> Result<()> {
        if self.window.len() as u64 != params.window {
            return Err(Error::invalid_state(format!(
                "window has {} slots, expected {}",
                self.window.len(),
                params.window
            )));
        }
        if let Some(gas) = self
            .window
            .iter()
            .find(|gas| **gas > self.max_block_utilization)
        {
            return Err(Error::invalid_state(format!(
                "window slot holds {gas} gas above max block utilization {}",
                self.max_block_utilization
            )));
        }
        if self.base_fee < self.min_base_fee {
            return Err(Error::invalid_state(format!(
                "base fee {} is below min base fee {}",
                self.base_fee, self.min_base_fee
            )));
        }
        if self.learning_rate < params.min_learning_rate
            || self.learning_rate > params.max_learning_rate
        {
            return Err(Error::invalid_state(format!(
                "learning rate {} is outside [{}, {}]",
                self.learning_rate, params.min_learning_rate, params.max_learning_rate
            )));
        }
        if self.target_block_utilization == 0 {
            return Err(Error::invalid_state(
                "target block utilization must be positive",
            ));
        }
        if self.target_block_utilization > self.max_block_utilization {
            return Err(Error::invalid_state(
                "target block utilization must not exceed max block utilization",
            ));
        }
        if self.index >= self.window.len() {
            return Err(Error::invalid_state(format!(
                "index {} is outside a window of {} slots",
                self.index,
                self.window.len()
            )));
        }

        Ok(())
    }

    /// Gas consumed so far by the current block.
    pub fn current_gas(&self) -> u64 {
        self.window.get(self.index).copied().unwrap_or_default()
    }

    /// Adds `gas_used` to the current block.
    ///
    /// Fails without changing anything when the block would exceed the max block utilization.
    pub fn record_gas(&mut self, gas_used: u64) -> Result<()> {
        let max = self.max_block_utilization;
        let slot = self.window.get_mut(self.index).ok_or_else(|| {
            Error::invalid_state(format!("index {} is outside the window", self.index))
        })?;
        let used = *slot;

        match used.checked_add(gas_used) {
            Some(total) if total <= max => {
                *slot = total;
                Ok(())
            }
            _ => Err(InvalidTransactionCause::BlockGasOverflow {
                used,
                additional: gas_used,
                max,
            }
            .into()),
        }
    }

    /// Moves to the slot of the next block and clears it.
    pub fn advance_window(&mut self) -> Result<()> {
        if self.window.is_empty() {
            return Err(Error::invalid_state("window is empty"));
        }

        self.index = (self.index + 1) % self.window.len();
        self.window[self.index] = 0;

        Ok(())
    }

    /// Total gas in the window.
    pub fn total_gas(&self) -> U256 {
        self.window
            .iter()
            .fold(U256::ZERO, |total, gas| total + U256::from(*gas))
    }

    /// `Σ (gas - target)` over the window. Negative when blocks ran below target on aggregate.
    pub fn net_utilization(&self) -> Result<I256> {
        let target_total = U256::from(self.target_block_utilization)
            .checked_mul(U256::from(self.window.len()))
            .ok_or_else(Error::arithmetic_overflow)?;

        I256::from_raw(self.total_gas())
            .checked_sub(I256::from_raw(target_total))
            .ok_or_else(Error::arithmetic_overflow)
    }

    /// Window gas over window capacity, in `[0, 1]` for a valid state.
    pub fn average_utilization(&self) -> Result<Decimal> {
        let capacity = U256::from(self.max_block_utilization)
            .checked_mul(U256::from(self.window.len()))
            .ok_or_else(Error::arithmetic_overflow)?;

        Decimal::from_uint(self.total_gas())?.checked_quo(Decimal::from_uint(capacity)?)
    }
}
