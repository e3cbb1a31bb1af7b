//! Fee admission and settlement of transactions against the fee market controller.
//!
//! A transaction is admitted with [`check`], charged with [`FeeTokenAccounts::deduct`] before
//! execution and settled with [`FeeTokenAccounts::refund`] once its gas usage is known.

pub use {
    events::FeeMarketEvent,
    fee_token::{Charge, FeeTokenAccounts, Refund},
    gas::{check, gas_price, priority, required_fee},
    transaction::{CheckContext, FeeTx},
};

pub mod ports;

mod events;
mod fee_token;
mod gas;
mod transaction;
