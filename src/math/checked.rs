//! Checked arithmetic trait for domain wrapper types.
//!
//! The [`CheckedArithmetic`] trait provides fallible arithmetic operations
//! that return [`Result<Self, AmmError>`](crate::error::AmmError) instead
//! of panicking on overflow, underflow, or division by zero.
//!
//! # Implementations
//!
//! - [`Amount`] — token quantities
//! - [`Shares`] — pool share quantities
//!
//! # Examples
//!
//! ```
//! use weighted_amm::domain::{Amount, Rounding};
//! use weighted_amm::math::CheckedArithmetic;
//!
//! let a = Amount::from_int(100);
//! let b = Amount::from_int(200);
//! assert!(a.safe_add(&b).is_ok());
//! assert!(a.safe_sub(&b).is_err());
//! ```

use super::Fixed;
use crate::domain::{Amount, Rounding, Shares};
use crate::error::AmmError;

/// Fallible arithmetic for domain wrapper types.
///
/// # Contract
///
/// - **No panics**: all error conditions produce `Err`.
/// - **No saturation**: errors propagate instead.
/// - Results stay non-negative; a negative difference is
///   [`AmmError::Underflow`].
pub trait CheckedArithmetic: Sized {
    /// Checked addition.
    ///
    /// # Errors
    ///
    /// Returns [`AmmError::Overflow`] if the result exceeds the
    /// representable range.
    fn safe_add(&self, other: &Self) -> Result<Self, AmmError>;

    /// Checked subtraction.
    ///
    /// # Errors
    ///
    /// Returns [`AmmError::Underflow`] if the result would be negative.
    fn safe_sub(&self, other: &Self) -> Result<Self, AmmError>;

    /// Checked multiplication by a dimensionless factor.
    ///
    /// # Errors
    ///
    /// Returns [`AmmError::Overflow`] if the result exceeds the
    /// representable range and [`AmmError::Underflow`] if `factor` is
    /// negative.
    fn safe_scale(&self, factor: &Fixed, rounding: Rounding) -> Result<Self, AmmError>;

    /// Checked division by a dimensionless divisor.
    ///
    /// # Errors
    ///
    /// Returns [`AmmError::DivisionByZero`] if `divisor` is zero.
    fn safe_div(&self, divisor: &Fixed, rounding: Rounding) -> Result<Self, AmmError>;

    /// Dimensionless ratio `self / other`.
    ///
    /// # Errors
    ///
    /// Returns [`AmmError::DivisionByZero`] if `other` is zero.
    fn safe_ratio(&self, other: &Self, rounding: Rounding) -> Result<Fixed, AmmError>;
}

// ---------------------------------------------------------------------------
// Amount
// ---------------------------------------------------------------------------

impl CheckedArithmetic for Amount {
    #[inline]
    fn safe_add(&self, other: &Self) -> Result<Self, AmmError> {
        self.checked_add(other)
            .ok_or(AmmError::Overflow("amount addition overflow"))
    }

    #[inline]
    fn safe_sub(&self, other: &Self) -> Result<Self, AmmError> {
        self.checked_sub(other)
            .ok_or(AmmError::Underflow("amount subtraction underflow"))
    }

    fn safe_scale(&self, factor: &Fixed, rounding: Rounding) -> Result<Self, AmmError> {
        let scaled = self.get().checked_mul_rounded(factor, rounding)?;
        Self::new(scaled).map_err(|_| AmmError::Underflow("negative amount scale factor"))
    }

    fn safe_div(&self, divisor: &Fixed, rounding: Rounding) -> Result<Self, AmmError> {
        let quotient = self.get().checked_div(divisor, rounding)?;
        Self::new(quotient).map_err(|_| AmmError::Underflow("negative amount divisor"))
    }

    #[inline]
    fn safe_ratio(&self, other: &Self, rounding: Rounding) -> Result<Fixed, AmmError> {
        self.get().checked_div(&other.get(), rounding)
    }
}

// ---------------------------------------------------------------------------
// Shares
// ---------------------------------------------------------------------------

impl CheckedArithmetic for Shares {
    #[inline]
    fn safe_add(&self, other: &Self) -> Result<Self, AmmError> {
        self.checked_add(other)
            .ok_or(AmmError::Overflow("share addition overflow"))
    }

    #[inline]
    fn safe_sub(&self, other: &Self) -> Result<Self, AmmError> {
        self.checked_sub(other)
            .ok_or(AmmError::Underflow("share subtraction underflow"))
    }

    fn safe_scale(&self, factor: &Fixed, rounding: Rounding) -> Result<Self, AmmError> {
        let scaled = self.get().checked_mul_rounded(factor, rounding)?;
        Self::new(scaled).map_err(|_| AmmError::Underflow("negative share scale factor"))
    }

    fn safe_div(&self, divisor: &Fixed, rounding: Rounding) -> Result<Self, AmmError> {
        let quotient = self.get().checked_div(divisor, rounding)?;
        Self::new(quotient).map_err(|_| AmmError::Underflow("negative share divisor"))
    }

    #[inline]
    fn safe_ratio(&self, other: &Self, rounding: Rounding) -> Result<Fixed, AmmError> {
        self.get().checked_div(&other.get(), rounding)
    }
}
