//! Persistence of the fee market.
//!
//! The module keyspace has two slots, `params` and `state`, each holding the JSON encoding of the
//! respective value. Writes go through a [`FeeMarketRepository`], reads through
//! [`FeeMarketQueries`].

pub mod fee_market;

pub use fee_market::{
    FeeMarketMemory, FeeMarketMemoryReader, FeeMarketQueries, FeeMarketRepository,
    InMemoryFeeMarketQueries, InMemoryFeeMarketRepository, PARAMS_KEY, STATE_KEY, shared_memory,
};
