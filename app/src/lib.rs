//! Orchestration of the fee market over the block lifecycle.
//!
//! [`Application`] owns the params and the controller state, persists them through the
//! repository of its [`Dependencies`] and settles transaction fees through the account ports.
//! [`ApplicationReader`] serves queries and admission checks from the last published state.

pub use {actor::*, dependency::*, input::*};

pub(crate) mod input;

mod actor;
mod command;
mod dependency;
mod query;

#[cfg(test)]
mod tests;
