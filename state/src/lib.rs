//! The fee market controller.
//!
//! This crate holds the controller [`Params`], its mutable [`State`] and the update engine that
//! moves the state from one block to the next:
//! * [`State::record_gas`] accumulates gas consumed by transactions of the current block.
//! * [`State::update_learning_rate`] adapts the learning rate with an additive-increase /
//!   multiplicative-decrease rule over the sliding window.
//! * [`State::update_base_fee`] recomputes the base fee from the block that just closed and the
//!   window-integrated net utilization.
//! * [`State::advance_window`] moves to the slot of the next block.
//!
//! [`State::next_block`] runs the last three in order on a copy so that a failure never leaves a
//! partially advanced state behind.

pub use {
    params::{
        Calibration, DEFAULT_FEE_DENOM, DEFAULT_MIN_BASE_FEE, DEFAULT_TARGET_BLOCK_UTILIZATION,
        MAX_BLOCK_UTILIZATION_RATIO, MAX_WINDOW, Params, default_aimd_params, default_params,
    },
    state::State,
    update::BlockUpdate,
};

mod params;
mod state;
mod update;
