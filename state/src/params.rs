use {
    feemarket_shared::{
        error::{Error, Result},
        primitives::Decimal,
    },
    once_cell::sync::Lazy,
    regex::Regex,
    serde::{Deserialize, Serialize},
};

pub const DEFAULT_FEE_DENOM: &str = "stake";
pub const DEFAULT_TARGET_BLOCK_UTILIZATION: u64 = 15_000_000;
/// Upper bound of `max_block_utilization / target_block_utilization`.
pub const MAX_BLOCK_UTILIZATION_RATIO: u64 = 10;
/// Largest number of blocks the sliding window may span.
pub const MAX_WINDOW: u64 = 65_536;
pub const DEFAULT_MIN_BASE_FEE: u64 = 1_000_000_000;

const EIP1559_LEARNING_RATE: Decimal = Decimal::from_atoms(125_000_000_000_000_000);

const AIMD_WINDOW: u64 = 8;
const AIMD_ALPHA: Decimal = Decimal::from_atoms(25_000_000_000_000_000);
const AIMD_BETA: Decimal = Decimal::from_atoms(950_000_000_000_000_000);
const AIMD_THETA: Decimal = Decimal::from_atoms(250_000_000_000_000_000);
const AIMD_DELTA: Decimal = Decimal::from_atoms(500_000_000_000_000_000);
const AIMD_MIN_LEARNING_RATE: Decimal = Decimal::from_atoms(10_000_000_000_000_000);
const AIMD_MAX_LEARNING_RATE: Decimal = Decimal::from_atoms(500_000_000_000_000_000);

static DENOM_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[a-zA-Z][a-zA-Z0-9/:._-]{2,127}$").expect("Denomination pattern should compile")
});

/// Configuration of the controller for an epoch.
///
/// Params are replaced only as a whole by an authority-approved update, which also resets the
/// controller [`State`](crate::State).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Params {
    /// Length of the sliding window in blocks.
    pub window: u64,
    /// Additive learning rate increment.
    pub alpha: Decimal,
    /// Multiplicative learning rate decay.
    pub beta: Decimal,
    /// Half-width of the band around full and empty blocks in which the learning rate grows.
    pub theta: Decimal,
    /// Weight of the window-integrated net utilization in the base fee update.
    pub delta: Decimal,
    /// Desired gas consumed per block.
    pub target_block_utilization: u64,
    /// Hard gas cap per block.
    pub max_block_utilization: u64,
    pub min_base_fee: Decimal,
    pub min_learning_rate: Decimal,
    pub max_learning_rate: Decimal,
    pub fee_denom: String,
    pub enabled: bool,
    /// Forward tips of successful transactions from the fee collector to the distribution account.
    pub distribute_fees: bool,
}

/// The calibration a set of [`Params`] amounts to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Calibration {
    /// The learning rate never moves and the update reduces to classic EIP-1559.
    Eip1559,
    /// The learning rate adapts to the sliding window.
    Aimd,
}

/// The non-adaptive calibration. It degenerates to classic EIP-1559: a single block window and
/// a constant learning rate of `0.125`.
pub fn default_params() -> Params {
    Params {
        window: 1,
        alpha: Decimal::ZERO,
        beta: Decimal::ONE,
        theta: Decimal::ZERO,
        delta: Decimal::ZERO,
        target_block_utilization: DEFAULT_TARGET_BLOCK_UTILIZATION,
        max_block_utilization: 2 * DEFAULT_TARGET_BLOCK_UTILIZATION,
        min_base_fee: Decimal::from(DEFAULT_MIN_BASE_FEE),
        min_learning_rate: EIP1559_LEARNING_RATE,
        max_learning_rate: EIP1559_LEARNING_RATE,
        fee_denom: DEFAULT_FEE_DENOM.to_owned(),
        enabled: true,
        distribute_fees: false,
    }
}

/// The adaptive calibration over an eight block window.
pub fn default_aimd_params() -> Params {
    Params {
        window: AIMD_WINDOW,
        alpha: AIMD_ALPHA,
        beta: AIMD_BETA,
        theta: AIMD_THETA,
        delta: AIMD_DELTA,
        min_learning_rate: AIMD_MIN_LEARNING_RATE,
        max_learning_rate: AIMD_MAX_LEARNING_RATE,
        ..default_params()
    }
}

impl Default for Params {
    fn default() -> Self {
        default_params()
    }
}

impl Params {
    pub fn new(calibration: Calibration) -> Self {
        match calibration {
            Calibration::Eip1559 => default_params(),
            Calibration::Aimd => default_aimd_params(),
        }
    }

    pub fn with_target_block_utilization(mut self, target: u64) -> Self {
        self.target_block_utilization = target;
        self.max_block_utilization = target.saturating_mul(2);
        self
    }

    pub fn with_fee_denom(mut self, fee_denom: impl Into<String>) -> Self {
        self.fee_denom = fee_denom.into();
        self
    }

    pub fn calibration(&self) -> Calibration {
        let constant_learning_rate = self.alpha.is_zero() && self.beta == Decimal::ONE;

        if constant_learning_rate || self.min_learning_rate == self.max_learning_rate {
            Calibration::Eip1559
        } else {
            Calibration::Aimd
        }
    }

    /// Checks every constraint on the params, reporting the first one that is violated.
    pub fn validate(&self) -> Result<()> {
        if self.window == 0 {
            return Err(Error::invalid_params("window must be positive"));
        }
        if self.window > MAX_WINDOW {
            return Err(Error::invalid_params(format!(
                "window must not exceed {MAX_WINDOW} blocks"
            )));
        }
        if self.alpha.is_negative() {
            return Err(Error::invalid_params("alpha must not be negative"));
        }
        if !is_unit_interval(self.beta) {
            return Err(Error::invalid_params("beta must be within [0, 1]"));
        }
        if !is_unit_interval(self.theta) {
            return Err(Error::invalid_params("theta must be within [0, 1]"));
        }
        if self.delta.is_negative() {
            return Err(Error::invalid_params("delta must not be negative"));
        }
        if self.target_block_utilization == 0 {
            return Err(Error::invalid_params(
                "target block utilization must be positive",
            ));
        }
        if self.max_block_utilization < self.target_block_utilization {
            return Err(Error::invalid_params(
                "max block utilization must not be below target block utilization",
            ));
        }
        if u128::from(self.max_block_utilization)
            > u128::from(self.target_block_utilization) * u128::from(MAX_BLOCK_UTILIZATION_RATIO)
        {
            return Err(Error::invalid_params(format!(
                "max block utilization must not exceed {MAX_BLOCK_UTILIZATION_RATIO} times the target"
            )));
        }
        if self.min_base_fee.is_negative() {
            return Err(Error::invalid_params("min base fee must not be negative"));
        }
        if self.min_learning_rate.is_negative() {
            return Err(Error::invalid_params("min learning rate must not be negative"));
        }
        if self.max_learning_rate.is_negative() {
            return Err(Error::invalid_params("max learning rate must not be negative"));
        }
        if self.min_learning_rate > self.max_learning_rate {
            return Err(Error::invalid_params(
                "min learning rate must not exceed max learning rate",
            ));
        }
        if self.fee_denom.is_empty() {
            return Err(Error::invalid_params("fee denom must not be empty"));
        }
        if !DENOM_REGEX.is_match(&self.fee_denom) {
            return Err(Error::invalid_params(format!(
                "invalid fee denom: {}",
                self.fee_denom
            )));
        }

        Ok(())
    }
}

fn is_unit_interval(value: Decimal) -> bool {
    !value.is_negative() && value <= Decimal::ONE
}
