use {feemarket_shared::primitives::Address, feemarket_state::Params};

/// Messages that drive the fee market through the block lifecycle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    BeginBlock {
        height: u64,
    },
    EndBlock {
        height: u64,
    },
    UpdateParams {
        authority: Address,
        params: Params,
    },
}
