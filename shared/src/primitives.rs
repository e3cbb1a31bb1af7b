pub use {
    crate::{
        coin::{Coin, DecCoin},
        decimal::{Decimal, Rounding},
    },
    alloy::primitives::{Address, I256, U256, address},
};

/// Largest value a transaction priority may take, inherited from the host's signed 64-bit typing.
pub const MAX_PRIORITY: i64 = i64::MAX;

pub trait ToU64 {
    fn to_u64(self) -> u64;
}

impl ToU64 for U256 {
    fn to_u64(self) -> u64 {
        self.saturating_to()
    }
}

/// Widens a signed 128-bit machine integer into [`I256`].
pub fn i256_from_i128(value: i128) -> I256 {
    let magnitude = I256::from_raw(U256::from(value.unsigned_abs()));

    if value < 0 {
        I256::ZERO
            .checked_sub(magnitude)
            .unwrap_or_else(|| unreachable!("Magnitude of i128 always fits into I256"))
    } else {
        magnitude
    }
}
