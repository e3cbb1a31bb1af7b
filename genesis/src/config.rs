use {
    feemarket_shared::primitives::{Address, address},
    feemarket_state::{Calibration, DEFAULT_TARGET_BLOCK_UTILIZATION},
    serde::{Deserialize, Serialize},
};

pub const FEE_COLLECTOR_MODULE: &str = "fee_collector";
pub const DISTRIBUTION_MODULE: &str = "distribution";
/// Address of the governance module, the authority of a development chain.
pub const DEFAULT_AUTHORITY: Address = address!("7b5fe22b5446f7c62ea27b8bd71cef94e03f3df2");

/// Host configuration of the fee market, fixed for the lifetime of the process.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GenesisConfig {
    /// The only account allowed to update params.
    pub authority: Address,
    /// Module account collecting fees.
    pub fee_collector: String,
    /// Module account receiving tips when fees are distributed.
    pub distribution: String,
    /// Calibration of the params applied when no genesis state is supplied.
    pub calibration: Calibration,
    pub target_block_utilization: u64,
}

impl Default for GenesisConfig {
    fn default() -> Self {
        Self {
            authority: DEFAULT_AUTHORITY,
            fee_collector: FEE_COLLECTOR_MODULE.to_owned(),
            distribution: DISTRIBUTION_MODULE.to_owned(),
            calibration: Calibration::Eip1559,
            target_block_utilization: DEFAULT_TARGET_BLOCK_UTILIZATION,
        }
    }
}
