use {
    crate::{Params, State},
    feemarket_shared::{
        error::{Error, Result},
        primitives::{Decimal, i256_from_i128},
    },
    serde::{Deserialize, Serialize},
};

/// Outcome of closing a block.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BlockUpdate {
    /// Gas consumed by the block that was closed.
    pub block_gas: u64,
    /// Base fee for the next block.
    pub base_fee: Decimal,
    /// Learning rate for the next block.
    pub learning_rate: Decimal,
}

impl State {
    /// Grows the learning rate additively when the window sits near empty or near full blocks,
    /// and decays it multiplicatively otherwise.
    pub fn update_learning_rate(&mut self, params: &Params) -> Result<Decimal> {
        let utilization = self.average_utilization()?;
        let upper_band = Decimal::ONE.checked_sub(params.theta)?;

        self.learning_rate = if utilization <= params.theta || utilization >= upper_band {
            self.learning_rate
                .checked_add(params.alpha)?
                .min(params.max_learning_rate)
        } else {
            self.learning_rate
                .checked_mul(params.beta)?
                .max(params.min_learning_rate)
        };

        Ok(self.learning_rate)
    }

    /// Recomputes the base fee from the gas of the current block and the net utilization of the
    /// window.
    ///
    /// Uses the learning rate already in place, so [`Self::update_learning_rate`] runs first.
    pub fn update_base_fee(&mut self, params: &Params) -> Result<Decimal> {
        let target = Decimal::from(self.target_block_utilization);
        if target.is_zero() {
            return Err(Error::division_by_zero());
        }

        let deviation = i256_from_i128(
            i128::from(self.current_gas()) - i128::from(self.target_block_utilization),
        );
        let ratio = Decimal::from_int(deviation)?.checked_quo(target)?;
        let adjustment = Decimal::ONE.checked_add(self.learning_rate.checked_mul(ratio)?)?;
        let net = Decimal::from_int(self.net_utilization()?)?.checked_mul(params.delta)?;

        let base_fee = self.base_fee.checked_mul(adjustment)?.checked_add(net)?;
        self.base_fee = base_fee.max(self.min_base_fee);

        Ok(self.base_fee)
    }

    /// Runs the end of block sequence on a copy of the state.
    ///
    /// The copy is returned only when every step succeeds. Any error is fatal for the block being
    /// finalized.
    pub fn next_block(&self, params: &Params) -> Result<(State, BlockUpdate)> {
        let mut next = self.clone();
        let block_gas = next.current_gas();

        let learning_rate = next.update_learning_rate(params)?;
        let base_fee = next.update_base_fee(params)?;
        next.advance_window()?;

        let update = BlockUpdate {
            block_gas,
            base_fee,
            learning_rate,
        };

        Ok((next, update))
    }
}
