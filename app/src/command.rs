use {
    crate::{Application, Dependencies},
    feemarket_blockchain::FeeMarketRepository,
    feemarket_execution::{
        Charge, CheckContext, FeeMarketEvent, FeeTx, Refund, check,
        ports::ConsensusPort, required_fee,
    },
    feemarket_genesis::GenesisState,
    feemarket_shared::{
        error::{Error, InvalidTransactionCause, RejectionCause, Result},
        primitives::{Address, Coin},
    },
    feemarket_state::{BlockUpdate, Params, State},
    tracing::{debug, info, warn},
};

impl<D: Dependencies> Application<D> {
    /// Validates and persists `genesis`, making it the current params and state.
    pub fn init_genesis(&mut self, genesis: GenesisState) -> Result<()> {
        let GenesisState { params, state } = genesis;

        self.validate_params(&params)?;
        state.validate(&params)?;

        self.persist(&params, &state)?;
        self.params = params;
        self.state = state;

        info!(
            base_fee = %self.state.base_fee,
            learning_rate = %self.state.learning_rate,
            calibration = ?self.params.calibration(),
            "Fee market initialized"
        );

        Ok(())
    }

    pub fn export_genesis(&self) -> GenesisState {
        GenesisState {
            params: self.params.clone(),
            state: self.state.clone(),
        }
    }

    pub fn begin_block(&mut self, height: u64) {
        self.height = height;
    }

    /// Closes the block at `height`, moving the controller to the next block.
    ///
    /// The new state is persisted before it replaces the current one. Any error is fatal for the
    /// block. A disabled market is left untouched.
    pub fn end_block(&mut self, height: u64) -> Result<Option<BlockUpdate>> {
        self.height = height;

        if !self.params.enabled {
            return Ok(None);
        }

        let (state, update) = self.state.next_block(&self.params)?;
        self.fee_market_repository
            .save_state(&mut self.storage, &state)
            .map_err(Error::storage)?;
        self.state = state;

        info!(
            height,
            block_gas = update.block_gas,
            base_fee = %update.base_fee,
            learning_rate = %update.learning_rate,
            "Fee market updated"
        );
        self.events.push(FeeMarketEvent::FeeMarketUpdate {
            base_fee: update.base_fee,
            learning_rate: update.learning_rate,
            height,
        });

        Ok(Some(update))
    }

    /// Replaces the params on behalf of `authority` and resets the state to the new floors.
    pub fn update_params(&mut self, authority: Address, params: Params) -> Result<()> {
        if authority != self.genesis_config.authority {
            warn!(%authority, "Params update by unauthorized account");
            return Err(RejectionCause::Unauthorized {
                expected: self.genesis_config.authority,
                got: authority,
            }
            .into());
        }

        self.validate_params(&params)
            .inspect_err(|e| warn!(reason = %e, "Params update rejected"))?;

        let state = State::new(&params);
        self.persist(&params, &state)?;
        self.params = params;
        self.state = state;

        info!(
            window = self.params.window,
            target = self.params.target_block_utilization,
            max = self.params.max_block_utilization,
            min_base_fee = %self.params.min_base_fee,
            calibration = ?self.params.calibration(),
            "Fee market params updated"
        );

        Ok(())
    }

    /// Admits the fee of `tx` against the current base fee, returning the required fee and the
    /// tip.
    pub fn check_fee(&self, tx: &FeeTx, context: CheckContext) -> Result<(Coin, Coin)> {
        check(tx, context, &self.params, &self.state, &self.resolver)
    }

    /// Charges the admitted fee of `tx` before its execution.
    pub fn deduct(&mut self, tx: &FeeTx, required: Coin, tip: Coin) -> Result<Charge> {
        let charge = self.fee_token.deduct(
            tx,
            required,
            tip,
            &self.accounts,
            &mut self.bank,
            &mut self.fee_grant,
        )?;

        debug!(payer = %charge.payer, required = %charge.required, tip = %charge.tip, "Fee deducted");
        self.events.push(charge.event());

        Ok(charge)
    }

    /// Accounts `gas_used` of an executed `tx` to the current block and settles its `charge`.
    ///
    /// The recorded gas is persisted before any funds move. Nothing changes when the gas does
    /// not fit into the block.
    pub fn refund(
        &mut self,
        tx: &FeeTx,
        charge: &Charge,
        gas_used: u64,
        success: bool,
    ) -> Result<Refund> {
        if gas_used > tx.gas_limit {
            return Err(InvalidTransactionCause::GasUsedExceedsLimit {
                used: gas_used,
                limit: tx.gas_limit,
            }
            .into());
        }

        let mut state = self.state.clone();
        if self.params.enabled {
            state.record_gas(gas_used).inspect_err(|e| {
                warn!(payer = %tx.payer, gas_used, reason = %e, "Gas does not fit into block")
            })?;
        }

        let used_fee = required_fee(
            &self.params,
            &self.state,
            gas_used,
            &charge.required.denom,
            &self.resolver,
        )?;

        if state != self.state {
            self.fee_market_repository
                .save_state(&mut self.storage, &state)
                .map_err(Error::storage)?;
            self.state = state;
        }

        let refund = self.fee_token.refund(
            charge,
            &used_fee,
            success,
            self.params.distribute_fees,
            &mut self.accounts,
            &mut self.bank,
        )?;

        debug!(
            payee = %refund.payee,
            refund = %refund.refund,
            distributed = %refund.distributed,
            gas_used,
            success,
            "Fee settled"
        );
        self.events.extend(refund.event());

        Ok(refund)
    }

    fn validate_params(&self, params: &Params) -> Result<()> {
        params.validate()?;

        match self.consensus.max_gas_per_block() {
            Some(max_gas) if params.max_block_utilization > max_gas => Err(Error::invalid_params(
                format!(
                    "max block utilization {} exceeds max gas per block {max_gas}",
                    params.max_block_utilization
                ),
            )),
            _ => Ok(()),
        }
    }

    fn persist(&mut self, params: &Params, state: &State) -> Result<()> {
        self.fee_market_repository
            .save(&mut self.storage, params, state)
            .map_err(Error::storage)
    }
}
