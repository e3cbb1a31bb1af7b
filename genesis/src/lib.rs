use {
    self::config::GenesisConfig,
    feemarket_shared::error::Error,
    feemarket_state::{Params, State},
    serde::{Deserialize, Serialize},
};

pub mod config;

#[derive(Debug, thiserror::Error)]
pub enum GenesisError {
    #[error("Malformed genesis: {0}")]
    Json(#[from] serde_json::Error),
    #[error("{0}")]
    Invalid(#[from] Error),
}

/// Params and controller state the fee market starts a chain with or exports at a height.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GenesisState {
    pub params: Params,
    pub state: State,
}

impl GenesisState {
    /// A fresh controller state for `params`.
    pub fn new(params: Params) -> Self {
        let state = State::new(&params);

        Self { params, state }
    }

    /// Parses and validates a JSON encoded genesis state.
    pub fn from_json(json: &str) -> Result<Self, GenesisError> {
        let genesis: Self = serde_json::from_str(json)?;
        genesis.validate()?;

        Ok(genesis)
    }

    pub fn to_json(&self) -> Result<String, GenesisError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn validate(&self) -> Result<(), Error> {
        self.params.validate()?;
        self.state.validate(&self.params)
    }
}

impl Default for GenesisState {
    fn default() -> Self {
        build(&GenesisConfig::default())
    }
}

/// The genesis state implied by `config` alone.
pub fn build(config: &GenesisConfig) -> GenesisState {
    let params = Params::new(config.calibration)
        .with_target_block_utilization(config.target_block_utilization);

    GenesisState::new(params)
}
