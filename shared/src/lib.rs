pub mod coin;
pub mod decimal;
pub mod error;
pub mod primitives;
