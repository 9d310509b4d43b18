//! Outcome of a swap.

use core::fmt;

use super::{Amount, Price, Rounding};

/// Result of an executed swap.
///
/// `spot_price_after` is fee-inclusive and computed from the committed
/// balances.  `reserve` is the part of `amount_in` diverted to the
/// protocol reserve instead of the pool balance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SwapOutcome {
    /// Tokens paid into the pool.
    pub amount_in: Amount,
    /// Tokens paid out of the pool.
    pub amount_out: Amount,
    /// Fee-inclusive spot price before the swap.
    pub spot_price_before: Price,
    /// Fee-inclusive spot price after the swap.
    pub spot_price_after: Price,
    /// Portion of `amount_in` diverted to the protocol reserve.
    pub reserve: Amount,
}

impl SwapOutcome {
    /// Realized price `amount_in / amount_out`.
    ///
    /// # Errors
    ///
    /// Returns [`AmmError::DivisionByZero`](crate::error::AmmError::DivisionByZero)
    /// if `amount_out` is zero.
    pub fn effective_price(&self, rounding: Rounding) -> crate::error::Result<Price> {
        Price::from_amounts(self.amount_in, self.amount_out, rounding)
    }
}

impl fmt::Display for SwapOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "SwapOutcome(in={}, out={}, spot_after={}, reserve={})",
            self.amount_in, self.amount_out, self.spot_price_after, self.reserve
        )
    }
}
