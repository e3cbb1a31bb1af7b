//! Deterministic signed fixed-point arithmetic.
//!
//! A [`Decimal`] stores its value as an integer count of `10^-18` units inside an [`I256`]. Every
//! operation is checked: leaving the representable range fails with
//! [`InvariantViolation::ArithmeticOverflow`] and dividing by zero fails with
//! [`InvariantViolation::DivisionByZero`]. Division truncates toward zero unless a [`Rounding`] is
//! given explicitly.
//!
//! [`InvariantViolation::ArithmeticOverflow`]: crate::error::InvariantViolation::ArithmeticOverflow
//! [`InvariantViolation::DivisionByZero`]: crate::error::InvariantViolation::DivisionByZero

use {
    crate::error::{Error, Result},
    alloy::primitives::{I256, U256},
    serde::{Deserialize, Deserializer, Serialize, Serializer, de},
    std::{fmt, str::FromStr},
};

/// Number of fractional decimal digits.
pub const PRECISION: usize = 18;

const SCALE: u64 = 1_000_000_000_000_000_000;
const SCALE_RAW: I256 = I256::from_raw(U256::from_limbs([SCALE, 0, 0, 0]));
const ONE_UNIT: I256 = I256::from_raw(U256::from_limbs([1, 0, 0, 0]));

/// Rounding applied when a result cannot be represented exactly.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Rounding {
    /// Toward zero.
    Truncate,
    /// Toward positive infinity.
    Ceil,
    /// To the nearest value, ties away from zero.
    HalfAwayFromZero,
}

#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct Decimal(I256);

impl Decimal {
    pub const ZERO: Self = Self(I256::ZERO);
    pub const ONE: Self = Self(SCALE_RAW);

    /// Creates a decimal from its raw count of `10^-18` units.
    pub const fn from_raw(raw: I256) -> Self {
        Self(raw)
    }

    /// Creates a non-negative decimal from a count of `10^-18` units that fits into 64 bits.
    ///
    /// Useful for constants, e.g. `Decimal::from_atoms(125_000_000_000_000_000)` is `0.125`.
    pub const fn from_atoms(atoms: u64) -> Self {
        Self(I256::from_raw(U256::from_limbs([atoms, 0, 0, 0])))
    }

    pub const fn raw(&self) -> I256 {
        self.0
    }

    /// Converts an unsigned integer.
    pub fn from_uint(value: U256) -> Result<Self> {
        let raw = value
            .checked_mul(U256::from(SCALE))
            .ok_or_else(Error::arithmetic_overflow)?;

        if raw > I256::MAX.into_raw() {
            return Err(Error::arithmetic_overflow());
        }

        Ok(Self(I256::from_raw(raw)))
    }

    /// Converts a signed integer.
    pub fn from_int(value: I256) -> Result<Self> {
        value
            .checked_mul(SCALE_RAW)
            .map(Self)
            .ok_or_else(Error::arithmetic_overflow)
    }

    /// Builds `numerator / denominator` truncated toward zero.
    pub fn from_ratio(numerator: u64, denominator: u64) -> Result<Self> {
        Self::from(numerator).checked_quo(Self::from(denominator))
    }

    pub fn is_zero(&self) -> bool {
        self.0 == I256::ZERO
    }

    pub fn is_negative(&self) -> bool {
        self.0.is_negative()
    }

    pub fn checked_add(self, rhs: Self) -> Result<Self> {
        self.0
            .checked_add(rhs.0)
            .map(Self)
            .ok_or_else(Error::arithmetic_overflow)
    }

    pub fn checked_sub(self, rhs: Self) -> Result<Self> {
        self.0
            .checked_sub(rhs.0)
            .map(Self)
            .ok_or_else(Error::arithmetic_overflow)
    }

    /// Multiplies two decimals truncating the product toward zero.
    pub fn checked_mul(self, rhs: Self) -> Result<Self> {
        self.checked_mul_with(rhs, Rounding::Truncate)
    }

    pub fn checked_mul_with(self, rhs: Self, rounding: Rounding) -> Result<Self> {
        let product = self
            .0
            .checked_mul(rhs.0)
            .ok_or_else(Error::arithmetic_overflow)?;

        div_rounded(product, SCALE_RAW, rounding).map(Self)
    }

    /// Multiplies by an integer. The product is exact.
    pub fn checked_mul_int(self, rhs: u64) -> Result<Self> {
        self.0
            .checked_mul(I256::from_raw(U256::from(rhs)))
            .map(Self)
            .ok_or_else(Error::arithmetic_overflow)
    }

    /// Divides two decimals truncating the quotient toward zero.
    pub fn checked_quo(self, rhs: Self) -> Result<Self> {
        self.checked_quo_with(rhs, Rounding::Truncate)
    }

    pub fn checked_quo_with(self, rhs: Self, rounding: Rounding) -> Result<Self> {
        if rhs.is_zero() {
            return Err(Error::division_by_zero());
        }

        let numerator = self
            .0
            .checked_mul(SCALE_RAW)
            .ok_or_else(Error::arithmetic_overflow)?;

        div_rounded(numerator, rhs.0, rounding).map(Self)
    }

    /// Rounds to an integer.
    pub fn to_int(self, rounding: Rounding) -> Result<I256> {
        div_rounded(self.0, SCALE_RAW, rounding)
    }

    /// Rounds to an unsigned integer, failing for negative results.
    pub fn to_uint(self, rounding: Rounding) -> Result<U256> {
        let value = self.to_int(rounding)?;

        if value.is_negative() {
            return Err(Error::arithmetic_overflow());
        }

        Ok(value.into_raw())
    }
}

fn div_rounded(numerator: I256, denominator: I256, rounding: Rounding) -> Result<I256> {
    if denominator == I256::ZERO {
        return Err(Error::division_by_zero());
    }

    let quotient = numerator
        .checked_div(denominator)
        .ok_or_else(Error::arithmetic_overflow)?;
    let remainder = quotient
        .checked_mul(denominator)
        .and_then(|product| numerator.checked_sub(product))
        .ok_or_else(Error::arithmetic_overflow)?;

    if remainder == I256::ZERO {
        return Ok(quotient);
    }

    let positive = numerator.is_negative() == denominator.is_negative();
    let away_from_zero = if positive {
        quotient.checked_add(ONE_UNIT)
    } else {
        quotient.checked_sub(ONE_UNIT)
    };

    match rounding {
        Rounding::Truncate => Ok(quotient),
        Rounding::Ceil if positive => away_from_zero.ok_or_else(Error::arithmetic_overflow),
        Rounding::Ceil => Ok(quotient),
        Rounding::HalfAwayFromZero => {
            let twice_remainder = remainder
                .unsigned_abs()
                .checked_mul(U256::from(2u64))
                .ok_or_else(Error::arithmetic_overflow)?;

            if twice_remainder >= denominator.unsigned_abs() {
                away_from_zero.ok_or_else(Error::arithmetic_overflow)
            } else {
                Ok(quotient)
            }
        }
    }
}

impl Default for Decimal {
    fn default() -> Self {
        Self::ZERO
    }
}

impl From<u64> for Decimal {
    fn from(value: u64) -> Self {
        // `u64::MAX * 10^18` is far below `I256::MAX`.
        Self(I256::from_raw(U256::from(value) * U256::from(SCALE)))
    }
}

impl fmt::Display for Decimal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let magnitude = self.0.unsigned_abs();
        let scale = U256::from(SCALE);
        let integer = magnitude / scale;
        let fraction: u64 = (magnitude % scale).saturating_to();
        let sign = if self.is_negative() { "-" } else { "" };

        write!(f, "{sign}{integer}.{fraction:0width$}", width = PRECISION)
    }
}

impl fmt::Debug for Decimal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Decimal({self})")
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ParseDecimalError {
    #[error("Decimal string is empty")]
    Empty,
    #[error("Decimal string contains a non-digit character")]
    InvalidDigit,
    #[error("Decimal string has more than {PRECISION} fractional digits")]
    TooPrecise,
    #[error("Decimal string is out of range")]
    OutOfRange,
}

impl FromStr for Decimal {
    type Err = ParseDecimalError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        let (negative, unsigned) = match s.strip_prefix('-') {
            Some(rest) => (true, rest),
            None => (false, s),
        };
        let (integer, fraction) = unsigned.split_once('.').unwrap_or((unsigned, ""));

        if integer.is_empty() {
            return Err(ParseDecimalError::Empty);
        }
        if !integer.bytes().chain(fraction.bytes()).all(|b| b.is_ascii_digit()) {
            return Err(ParseDecimalError::InvalidDigit);
        }
        if fraction.len() > PRECISION {
            return Err(ParseDecimalError::TooPrecise);
        }

        let integer: U256 = integer
            .parse()
            .map_err(|_| ParseDecimalError::OutOfRange)?;
        let fraction: u64 = if fraction.is_empty() {
            0
        } else {
            format!("{fraction:0<width$}", width = PRECISION)
                .parse()
                .map_err(|_| ParseDecimalError::InvalidDigit)?
        };

        let magnitude = integer
            .checked_mul(U256::from(SCALE))
            .and_then(|scaled| scaled.checked_add(U256::from(fraction)))
            .filter(|raw| *raw <= I256::MAX.into_raw())
            .ok_or(ParseDecimalError::OutOfRange)?;
        let raw = I256::from_raw(magnitude);

        if negative {
            I256::ZERO
                .checked_sub(raw)
                .map(Self)
                .ok_or(ParseDecimalError::OutOfRange)
        } else {
            Ok(Self(raw))
        }
    }
}

impl Serialize for Decimal {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Decimal {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;

        s.parse().map_err(de::Error::custom)
    }
}
