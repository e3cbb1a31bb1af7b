//! # The error module
//!
//! This module is responsible for providing structured error types that are easily processable.
//! They implement [`Display`] and [`Debug`] traits so that they are representable and printable to
//! log files.
//!
//! It is important that any logic processing the error only uses the structured data, most
//! conveniently the stable tag returned by [`Error::kind`]. No logic should be dependent on the
//! particular error message that are reachable by the [`Debug`] or [`Display`] trait, they serve
//! only an informative purpose and a human-readable representation.
//!
//! [`Display`]: std::fmt::Display

use {
    crate::primitives::{Address, Coin},
    std::fmt,
    thiserror::Error,
};

/// The result type with its error type set to [`Error`].
pub type Result<T> = std::result::Result<T, Error>;

/// Error for operations of the fee market.
///
/// # Variants
/// * [`InvalidTransaction`] rejects a single transaction. The block carries on.
/// * [`Rejected`] rejects a message at the boundary, such as an authority parameter update.
/// * [`InvariantViolation`] is an internal issue. It is fatal for the block being finalized.
///
/// [`InvalidTransaction`]: Error::InvalidTransaction
/// [`Rejected`]: Error::Rejected
/// [`InvariantViolation`]: Error::InvariantViolation
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Error {
    #[error("{0}")]
    InvalidTransaction(InvalidTransactionCause),
    #[error("{0}")]
    Rejected(RejectionCause),
    #[error("{0}")]
    InvariantViolation(InvariantViolation),
}

impl Error {
    pub fn invalid_params(reason: impl Into<String>) -> Self {
        Self::Rejected(RejectionCause::InvalidParams(reason.into()))
    }

    pub fn invalid_state(reason: impl Into<String>) -> Self {
        Self::InvariantViolation(InvariantViolation::InvalidState(reason.into()))
    }

    pub const fn arithmetic_overflow() -> Self {
        Self::InvariantViolation(InvariantViolation::ArithmeticOverflow)
    }

    pub const fn division_by_zero() -> Self {
        Self::InvariantViolation(InvariantViolation::DivisionByZero)
    }

    pub fn storage(reason: impl fmt::Debug) -> Self {
        Self::InvariantViolation(InvariantViolation::Storage(format!("{reason:?}")))
    }

    /// Returns the stable tag of this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::InvalidTransaction(cause) => cause.kind(),
            Self::Rejected(cause) => cause.kind(),
            Self::InvariantViolation(invariant) => invariant.kind(),
        }
    }

    /// Whether the error must abort block finalization instead of only rejecting a transaction or
    /// a message.
    pub fn is_fatal(&self) -> bool {
        matches!(self, Self::InvariantViolation(_))
    }
}

impl From<InvalidTransactionCause> for Error {
    fn from(value: InvalidTransactionCause) -> Self {
        Error::InvalidTransaction(value)
    }
}

impl From<RejectionCause> for Error {
    fn from(value: RejectionCause) -> Self {
        Error::Rejected(value)
    }
}

impl From<InvariantViolation> for Error {
    fn from(value: InvariantViolation) -> Self {
        Error::InvariantViolation(value)
    }
}

/// The error caused by a transaction that cannot be admitted, charged or settled.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum InvalidTransactionCause {
    #[error("Gas limit must be greater than zero")]
    InvalidGasLimit,
    #[error("Fee must be paid in a single denomination, got {0}")]
    TooManyFeeCoins(usize),
    #[error("Insufficient fee: required={required} got={got}")]
    InsufficientFee { required: Coin, got: Coin },
    #[error("Unknown fee denomination: {0}")]
    UnknownDenom(String),
    #[error("Insufficient funds: {address} cannot pay {amount}")]
    InsufficientFunds { address: Address, amount: Coin },
    #[error("Fee grant denied: {granter} does not cover {grantee}: {reason}")]
    FeeGrantDenied {
        granter: Address,
        grantee: Address,
        reason: String,
    },
    #[error("Block gas overflow: used={used} additional={additional} max={max}")]
    BlockGasOverflow { used: u64, additional: u64, max: u64 },
    #[error("Unknown account: {0}")]
    UnknownAccount(Address),
    #[error("Gas used exceeds gas limit: used={used} limit={limit}")]
    GasUsedExceedsLimit { used: u64, limit: u64 },
    #[error("Transfers of {0} are disabled")]
    SendDisabled(String),
}

impl InvalidTransactionCause {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::InvalidGasLimit => ErrorKind::InvalidGasLimit,
            Self::TooManyFeeCoins(_) => ErrorKind::TooManyFeeCoins,
            Self::InsufficientFee { .. } => ErrorKind::InsufficientFee,
            Self::UnknownDenom(_) => ErrorKind::UnknownDenom,
            Self::InsufficientFunds { .. } => ErrorKind::InsufficientFunds,
            Self::FeeGrantDenied { .. } => ErrorKind::FeeGrantDenied,
            Self::BlockGasOverflow { .. } => ErrorKind::BlockGasOverflow,
            Self::UnknownAccount(_) => ErrorKind::UnknownAccount,
            Self::GasUsedExceedsLimit { .. } => ErrorKind::GasUsedExceedsLimit,
            Self::SendDisabled(_) => ErrorKind::SendDisabled,
        }
    }
}

/// The error caused by a message that is refused at the boundary.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RejectionCause {
    #[error("Invalid params: {0}")]
    InvalidParams(String),
    #[error("Unauthorized: expected={expected} got={got}")]
    Unauthorized { expected: Address, got: Address },
}

impl RejectionCause {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::InvalidParams(_) => ErrorKind::InvalidParams,
            Self::Unauthorized { .. } => ErrorKind::Unauthorized,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum InvariantViolation {
    #[error("Invalid state: {0}")]
    InvalidState(String),
    #[error("Arithmetic overflow")]
    ArithmeticOverflow,
    #[error("Division by zero")]
    DivisionByZero,
    #[error("Module account does not exist: {0}")]
    MissingModuleAccount(String),
    #[error("Storage failure: {0}")]
    Storage(String),
}

impl InvariantViolation {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::InvalidState(_) => ErrorKind::InvalidState,
            Self::ArithmeticOverflow => ErrorKind::ArithmeticOverflow,
            Self::DivisionByZero => ErrorKind::DivisionByZero,
            Self::MissingModuleAccount(_) => ErrorKind::MissingModuleAccount,
            Self::Storage(_) => ErrorKind::Storage,
        }
    }
}

/// Stable tag of an [`Error`] that hosts can match on or forward across their boundary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    InvalidParams,
    InvalidState,
    BlockGasOverflow,
    InvalidGasLimit,
    TooManyFeeCoins,
    InsufficientFee,
    UnknownDenom,
    InsufficientFunds,
    FeeGrantDenied,
    Unauthorized,
    UnknownAccount,
    GasUsedExceedsLimit,
    SendDisabled,
    ArithmeticOverflow,
    DivisionByZero,
    MissingModuleAccount,
    Storage,
}

impl ErrorKind {
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::InvalidParams => "invalid_params",
            Self::InvalidState => "invalid_state",
            Self::BlockGasOverflow => "block_gas_overflow",
            Self::InvalidGasLimit => "invalid_gas_limit",
            Self::TooManyFeeCoins => "too_many_fee_coins",
            Self::InsufficientFee => "insufficient_fee",
            Self::UnknownDenom => "unknown_denom",
            Self::InsufficientFunds => "insufficient_funds",
            Self::FeeGrantDenied => "fee_grant_denied",
            Self::Unauthorized => "unauthorized",
            Self::UnknownAccount => "unknown_account",
            Self::GasUsedExceedsLimit => "gas_used_exceeds_limit",
            Self::SendDisabled => "send_disabled",
            Self::ArithmeticOverflow => "arithmetic_overflow",
            Self::DivisionByZero => "division_by_zero",
            Self::MissingModuleAccount => "missing_module_account",
            Self::Storage => "storage",
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
