use {
    crate::{
        events::FeeMarketEvent,
        ports::{AccountPort, BankPort, FeeGrantPort},
        transaction::FeeTx,
    },
    feemarket_shared::{
        error::{Error, InvalidTransactionCause, InvariantViolation, Result},
        primitives::{Address, Coin},
    },
    std::slice,
    tracing::warn,
};

/// A fee taken into the fee collector before execution.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Charge {
    /// The account the fee was taken from, the granter when a fee grant paid.
    pub payer: Address,
    pub required: Coin,
    pub tip: Coin,
}

impl Charge {
    pub fn event(&self) -> FeeMarketEvent {
        FeeMarketEvent::TxFee {
            payer: self.payer,
            required: self.required.clone(),
            tip: self.tip.clone(),
        }
    }
}

/// Funds moved out of the fee collector after execution.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Refund {
    pub payee: Address,
    /// Returned to the payee.
    pub refund: Coin,
    /// Forwarded to the distribution account.
    pub distributed: Coin,
}

impl Refund {
    pub fn event(&self) -> Option<FeeMarketEvent> {
        (!self.refund.is_zero()).then(|| FeeMarketEvent::TxRefund {
            payee: self.payee,
            refund: self.refund.clone(),
        })
    }
}

/// Moves transaction fees between payers and the module accounts of the fee market.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FeeTokenAccounts {
    fee_collector: String,
    fee_collector_address: Address,
    distribution_address: Address,
}

impl FeeTokenAccounts {
    /// Looks up the module accounts named `fee_collector` and `distribution`.
    pub fn resolve(
        accounts: &impl AccountPort,
        fee_collector: &str,
        distribution: &str,
    ) -> Result<Self> {
        let module_address = |name: &str| {
            accounts
                .module_address(name)
                .ok_or_else(|| InvariantViolation::MissingModuleAccount(name.to_owned()))
        };

        Ok(Self {
            fee_collector: fee_collector.to_owned(),
            fee_collector_address: module_address(fee_collector)?,
            distribution_address: module_address(distribution)?,
        })
    }

    pub fn fee_collector(&self) -> Address {
        self.fee_collector_address
    }

    pub fn distribution(&self) -> Address {
        self.distribution_address
    }

    /// Takes `required + tip` from the fee payer of `tx` into the fee collector.
    ///
    /// A granter pays through its fee allowance, which is spent only once the funds have moved.
    /// A zero fee moves no funds.
    pub fn deduct(
        &self,
        tx: &FeeTx,
        required: Coin,
        tip: Coin,
        accounts: &impl AccountPort,
        bank: &mut impl BankPort,
        fee_grant: &mut impl FeeGrantPort,
    ) -> Result<Charge> {
        let payer = tx.fee_payer();
        if !accounts.account_exists(&payer) {
            return Err(InvalidTransactionCause::UnknownAccount(payer).into());
        }

        let fee = required.checked_add(&tip)?;
        let fees = slice::from_ref(&fee);

        if !fee.is_zero() {
            bank.is_send_enabled(fees)?;
            bank.send_from_account_to_module(&payer, &self.fee_collector, fees)
                .inspect_err(|e| warn!(%payer, %fee, reason = %e, "Fee deduction failed"))?;
        }

        if let Some(granter) = tx.fee_granter {
            if let Err(e) = fee_grant.use_granted_fees(&granter, &tx.payer, fees, &tx.msgs) {
                warn!(%granter, grantee = %tx.payer, reason = %e, "Fee grant denied");
                if !fee.is_zero() {
                    self.send_from_collector(&payer, &fee, bank)?;
                }
                return Err(InvalidTransactionCause::FeeGrantDenied {
                    granter,
                    grantee: tx.payer,
                    reason: e.0,
                }
                .into());
            }
        }

        Ok(Charge {
            payer,
            required,
            tip,
        })
    }

    /// Settles `charge` once the transaction consumed fees worth `used_fee`.
    ///
    /// The unused part of the required fee goes back to the payer together with the tip when
    /// execution failed. A successful tip either stays in the fee collector or, with
    /// `distribute_fees`, moves on to the distribution account.
    pub fn refund(
        &self,
        charge: &Charge,
        used_fee: &Coin,
        success: bool,
        distribute_fees: bool,
        accounts: &mut impl AccountPort,
        bank: &mut impl BankPort,
    ) -> Result<Refund> {
        if used_fee.denom != charge.required.denom {
            return Err(Error::invalid_state(format!(
                "used fee {used_fee} is not in the denom of the charged {}",
                charge.required
            )));
        }

        let unused = Coin::new(
            charge.required.denom.clone(),
            charge.required.amount.saturating_sub(used_fee.amount),
        );
        let (refund, distributed) = match (success, distribute_fees) {
            (false, _) => (unused.checked_add(&charge.tip)?, Coin::zero(&charge.tip.denom)),
            (true, true) => (unused, charge.tip.clone()),
            (true, false) => (unused, Coin::zero(&charge.tip.denom)),
        };

        if !distributed.is_zero() {
            self.pay_out(&self.distribution_address, &distributed, accounts, bank)?;
        }
        if !refund.is_zero() {
            self.pay_out(&charge.payer, &refund, accounts, bank)?;
        }

        Ok(Refund {
            payee: charge.payer,
            refund,
            distributed,
        })
    }

    fn send_from_collector(
        &self,
        to: &Address,
        amount: &Coin,
        bank: &mut impl BankPort,
    ) -> Result<()> {
        bank.send(&self.fee_collector_address, to, slice::from_ref(amount))
            .map_err(|e| {
                Error::invalid_state(format!("Fee collector cannot pay {amount} to {to}: {e}"))
            })
    }

    fn pay_out(
        &self,
        to: &Address,
        amount: &Coin,
        accounts: &mut impl AccountPort,
        bank: &mut impl BankPort,
    ) -> Result<()> {
        if !accounts.account_exists(to) {
            accounts.create_account(*to);
        }

        self.send_from_collector(to, amount, bank)
    }
}
