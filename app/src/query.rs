use {
    crate::{Application, ApplicationReader, Dependencies},
    feemarket_blockchain::FeeMarketQueries,
    feemarket_execution::{CheckContext, FeeTx, check, gas_price, priority},
    feemarket_shared::{
        error::{Error, Result},
        primitives::{Coin, DecCoin},
    },
    feemarket_state::{Params, State},
};

impl<D: Dependencies> Application<D> {
    pub fn params(&self) -> &Params {
        &self.params
    }

    pub fn state(&self) -> &State {
        &self.state
    }

    /// Current base fee per unit of gas in the fee denomination.
    pub fn base_gas_price(&self) -> DecCoin {
        DecCoin::new(self.params.fee_denom.clone(), self.state.base_fee)
    }

    /// Current base fee per unit of gas converted into `denom`.
    pub fn gas_price(&self, denom: &str) -> Result<DecCoin> {
        gas_price(&self.params, &self.state, denom, &self.resolver)
    }

    /// Gas prices in every denomination the market is quoted in.
    pub fn gas_prices(&self) -> Vec<DecCoin> {
        vec![self.base_gas_price()]
    }

    /// Ordering score of `tx` based on the fee it offers.
    pub fn priority(&self, tx: &FeeTx) -> i64 {
        match tx.fee.as_slice() {
            [fee] => priority(fee, tx.gas_limit),
            _ => priority(&Coin::zero(self.params.fee_denom.clone()), tx.gas_limit),
        }
    }
}

impl<D: Dependencies> ApplicationReader<D> {
    /// Params and state last published to storage, always from the same publication.
    pub fn snapshot(&self) -> Result<(Params, State)> {
        self.fee_market_queries
            .snapshot(&self.storage)
            .map_err(Error::storage)?
            .ok_or_else(|| Error::invalid_state("fee market is missing from storage"))
    }

    /// Params last published to storage.
    pub fn params(&self) -> Result<Params> {
        self.snapshot().map(|(params, _)| params)
    }

    /// State last published to storage.
    pub fn state(&self) -> Result<State> {
        self.snapshot().map(|(_, state)| state)
    }

    pub fn base_gas_price(&self) -> Result<DecCoin> {
        let (params, state) = self.snapshot()?;

        Ok(DecCoin::new(params.fee_denom, state.base_fee))
    }

    pub fn gas_price(&self, denom: &str) -> Result<DecCoin> {
        let (params, state) = self.snapshot()?;

        gas_price(&params, &state, denom, &self.resolver)
    }

    /// Admits the fee of `tx` against the last published base fee.
    pub fn check_fee(&self, tx: &FeeTx, context: CheckContext) -> Result<(Coin, Coin)> {
        let (params, state) = self.snapshot()?;

        check(tx, context, &params, &state, &self.resolver)
    }
}
