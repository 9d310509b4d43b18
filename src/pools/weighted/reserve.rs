//! Protocol reserve skim.
//!
//! Part of every fee a flow pays is diverted to the protocol reserve
//! instead of compounding into the pool balance:
//!
//! ```text
//! reserve = |fee_inclusive_amount − fee_free_amount| · reserve_ratio
//! ```
//!
//! The fee-free amount is what the same operation would move with a zero
//! swap fee.  LPs therefore earn an effective fee of
//! `swap_fee · (1 − reserve_ratio)` while traders pay `swap_fee`.

use crate::domain::{Amount, Fraction, Rounding};
use crate::error::AmmError;
use crate::math::CheckedArithmetic;

/// Computes reserve diversions for one reserve ratio.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReserveSkim {
    ratio: Fraction,
}

impl ReserveSkim {
    /// Creates a skim diverting `ratio` of every fee.
    #[must_use]
    pub const fn new(ratio: Fraction) -> Self {
        Self { ratio }
    }

    /// Reserve ratio in effect.
    #[must_use]
    pub const fn ratio(&self) -> Fraction {
        self.ratio
    }

    /// Reserve owed on a flow whose fee-inclusive and fee-free amounts are
    /// given.  Rounded down.
    ///
    /// # Errors
    ///
    /// Returns [`AmmError::Overflow`] if the product is not representable.
    pub fn skim(&self, fee_inclusive: Amount, fee_free: Amount) -> Result<Amount, AmmError> {
        if self.ratio.is_zero() {
            return Ok(Amount::ZERO);
        }
        let fee = Amount::new(fee_inclusive.get().abs_diff(&fee_free.get()))?;
        self.ratio.apply(fee, Rounding::Down)
    }

    /// Reserve owed on a swap paying `amount_in` with `swap_fee`.
    ///
    /// # Errors
    ///
    /// Returns [`AmmError::Overflow`] if the product is not representable.
    pub fn on_swap(&self, amount_in: Amount, swap_fee: Fraction) -> Result<Amount, AmmError> {
        let fee_free = amount_in.safe_scale(&swap_fee.complement().get(), Rounding::Down)?;
        self.skim(amount_in, fee_free)
    }
}
