use {
    crate::{
        decimal::Decimal,
        error::{Error, Result},
    },
    alloy::primitives::U256,
    serde::{Deserialize, Serialize},
    std::fmt,
};

/// An integer amount of a single denomination.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Coin {
    pub denom: String,
    pub amount: U256,
}

impl Coin {
    pub fn new(denom: impl Into<String>, amount: U256) -> Self {
        Self {
            denom: denom.into(),
            amount,
        }
    }

    pub fn zero(denom: impl Into<String>) -> Self {
        Self::new(denom, U256::ZERO)
    }

    pub fn is_zero(&self) -> bool {
        self.amount.is_zero()
    }

    /// Adds an amount of the same denomination.
    pub fn checked_add(&self, other: &Coin) -> Result<Coin> {
        self.combine(other, U256::checked_add)
    }

    /// Subtracts an amount of the same denomination, failing instead of going below zero.
    pub fn checked_sub(&self, other: &Coin) -> Result<Coin> {
        self.combine(other, U256::checked_sub)
    }

    fn combine(&self, other: &Coin, op: impl FnOnce(U256, U256) -> Option<U256>) -> Result<Coin> {
        if self.denom != other.denom {
            return Err(Error::invalid_state(format!(
                "Cannot combine {} with {}",
                self.denom, other.denom
            )));
        }

        op(self.amount, other.amount)
            .map(|amount| Coin::new(self.denom.clone(), amount))
            .ok_or_else(Error::arithmetic_overflow)
    }
}

impl fmt::Display for Coin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.amount, self.denom)
    }
}

/// A fractional amount of a single denomination, used for prices.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DecCoin {
    pub denom: String,
    pub amount: Decimal,
}

impl DecCoin {
    pub fn new(denom: impl Into<String>, amount: Decimal) -> Self {
        Self {
            denom: denom.into(),
            amount,
        }
    }
}

impl fmt::Display for DecCoin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.amount, self.denom)
    }
}
