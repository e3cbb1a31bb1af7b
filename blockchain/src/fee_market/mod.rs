//! The fee market module is responsible for the storage concerns of the controller such that it:
//!
//! * Keeps the current [`Params`] and [`State`] under fixed keys.
//! * Encodes them deterministically.
//! * Lets readers see only fully written values.
//!
//! [`Params`]: feemarket_state::Params
//! [`State`]: feemarket_state::State

mod in_memory;
mod read;
mod write;

pub use {
    in_memory::{FeeMarketMemory, FeeMarketMemoryReader, shared_memory},
    read::{FeeMarketQueries, in_memory::InMemoryFeeMarketQueries},
    write::{FeeMarketRepository, in_memory::InMemoryFeeMarketRepository},
};

pub const PARAMS_KEY: &str = "params";
pub const STATE_KEY: &str = "state";
