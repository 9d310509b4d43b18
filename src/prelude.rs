//! Convenience re-exports for common types and traits.
//!
//! ```rust
//! use weighted_amm::prelude::*;
//! ```

pub use crate::config::{PoolConfig, PoolLimits};
pub use crate::domain::{
    Amount, Fraction, JoinExitOutcome, Price, Rounding, Shares, SingleAssetOutcome, SwapOutcome,
    TokenAddress, TokenAmount, Weight,
};
pub use crate::error::{AmmError, Result};
pub use crate::math::{CheckedArithmetic, Fixed};
pub use crate::pools::{Phase, WeightedPool};
pub use crate::traits::{FromConfig, LiquidityPool, SwapPool};
