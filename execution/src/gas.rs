use {
    crate::{
        ports::DenomResolver,
        transaction::{CheckContext, FeeTx},
    },
    feemarket_shared::{
        error::{InvalidTransactionCause, Result},
        primitives::{Coin, DecCoin, MAX_PRIORITY, Rounding, ToU64, U256},
    },
    feemarket_state::{Params, State},
    tracing::debug,
};

/// Price of a single unit of gas in `denom`.
///
/// The base fee is quoted in the fee denom of the params, any other denomination goes through
/// the `resolver`.
pub fn gas_price(
    params: &Params,
    state: &State,
    denom: &str,
    resolver: &impl DenomResolver,
) -> Result<DecCoin> {
    let base_price = DecCoin::new(params.fee_denom.clone(), state.base_fee);

    if denom == params.fee_denom {
        return Ok(base_price);
    }

    Ok(resolver.convert(&base_price, denom)?)
}

/// The least fee in `denom` that covers `gas` at the current base fee, rounded up.
///
/// A disabled market requires nothing.
pub fn required_fee(
    params: &Params,
    state: &State,
    gas: u64,
    denom: &str,
    resolver: &impl DenomResolver,
) -> Result<Coin> {
    if !params.enabled {
        return Ok(Coin::zero(denom));
    }

    let price = gas_price(params, state, denom, resolver)?;
    let amount = price.amount.checked_mul_int(gas)?.to_uint(Rounding::Ceil)?;

    Ok(Coin::new(denom, amount))
}

/// Admits the fee of `tx`, returning the required part of the fee and the tip above it.
pub fn check(
    tx: &FeeTx,
    context: CheckContext,
    params: &Params,
    state: &State,
    resolver: &impl DenomResolver,
) -> Result<(Coin, Coin)> {
    if tx.gas_limit == 0 && context.requires_gas_limit() {
        return Err(InvalidTransactionCause::InvalidGasLimit.into());
    }

    let fee = match tx.fee.as_slice() {
        [] => Coin::zero(params.fee_denom.clone()),
        [fee] => fee.clone(),
        fees => return Err(InvalidTransactionCause::TooManyFeeCoins(fees.len()).into()),
    };

    let required = required_fee(params, state, tx.gas_limit, &fee.denom, resolver)?;
    let Ok(tip) = fee.checked_sub(&required) else {
        debug!(payer = %tx.payer, %required, got = %fee, "Fee below base fee");
        return Err(InvalidTransactionCause::InsufficientFee { required, got: fee }.into());
    };

    debug!(payer = %tx.payer, %required, %tip, gas_limit = tx.gas_limit, "Fee admitted");

    Ok((required, tip))
}

/// Ordering score of an admitted transaction: its fee per unit of gas, truncated and clamped into
/// `[0, i64::MAX]`.
pub fn priority(fee: &Coin, gas_limit: u64) -> i64 {
    if gas_limit == 0 {
        return 0;
    }

    let price = (fee.amount / U256::from(gas_limit)).to_u64();

    i64::try_from(price).unwrap_or(MAX_PRIORITY)
}
