//! Fractions in `[0, 1]`: swap fee, exit fee and reserve ratio.

use core::fmt;
use core::str::FromStr;

use super::{Amount, Rounding};
use crate::error::AmmError;
use crate::math::Fixed;

/// A fraction in the closed interval `[0, 1]`.
///
/// Fees use the half-open interval `[0, 1)`; see [`Fraction::fee`].
///
/// # Examples
///
/// ```
/// use weighted_amm::domain::{Amount, Fraction, Rounding};
///
/// let Ok(fee) = Fraction::fee("0.001".parse().unwrap_or_default()) else { panic!("valid fee") };
/// let Ok(part) = fee.apply(Amount::from_int(500), Rounding::Down) else { panic!("no overflow") };
/// assert!((part.get().to_f64_lossy() - 0.5).abs() < 1e-9);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Fraction(Fixed);

impl Fraction {
    /// `0`.
    pub const ZERO: Self = Self(Fixed::ZERO);

    /// `1`.
    pub const ONE: Self = Self(Fixed::ONE);

    /// Creates a fraction in `[0, 1]`.
    ///
    /// # Errors
    ///
    /// Returns [`AmmError::InvalidFee`] if `value` is outside `[0, 1]`.
    pub fn new(value: Fixed) -> crate::error::Result<Self> {
        if value.is_negative() || value > Fixed::ONE {
            return Err(AmmError::InvalidFee("fraction must lie in [0, 1]"));
        }
        Ok(Self(value))
    }

    /// Creates a fraction in const context, clamping to `[0, 1]`.
    #[must_use]
    pub const fn saturating_new(value: Fixed) -> Self {
        if value.is_negative() {
            return Self::ZERO;
        }
        if value.to_bits() > Fixed::ONE.to_bits() {
            return Self::ONE;
        }
        Self(value)
    }

    /// Creates a fee fraction in `[0, 1)`.
    ///
    /// # Errors
    ///
    /// Returns [`AmmError::InvalidFee`] if `value` is outside `[0, 1)`.
    pub fn fee(value: Fixed) -> crate::error::Result<Self> {
        let fraction = Self::new(value)?;
        if !fraction.is_below_one() {
            return Err(AmmError::InvalidFee("fee must be below 1"));
        }
        Ok(fraction)
    }

    /// Returns the underlying fixed-point value.
    #[must_use]
    pub const fn get(&self) -> Fixed {
        self.0
    }

    /// Returns `true` if the fraction is zero.
    #[must_use]
    pub const fn is_zero(&self) -> bool {
        self.0.is_zero()
    }

    /// Returns `true` if the fraction is strictly below one.
    #[must_use]
    pub fn is_below_one(&self) -> bool {
        self.0 < Fixed::ONE
    }

    /// `1 − self`, itself a fraction in `[0, 1]`.
    #[must_use]
    pub fn complement(&self) -> Self {
        Self(Fixed::from_bits(Fixed::ONE.to_bits() - self.0.to_bits()))
    }

    /// `self · other`, a fraction in `[0, 1]`.
    ///
    /// # Errors
    ///
    /// Returns [`AmmError::Overflow`] only if the product is not representable.
    pub fn checked_mul(&self, other: &Self) -> crate::error::Result<Self> {
        Ok(Self(self.0.checked_mul(&other.0)?))
    }

    /// Applies the fraction to an amount: `amount · self`.
    ///
    /// `rounding` selects whether a discarded remainder bumps the result
    /// by one unit in the last place.
    ///
    /// # Errors
    ///
    /// Returns [`AmmError::Overflow`] if the product is not representable.
    pub fn apply(&self, amount: Amount, rounding: Rounding) -> crate::error::Result<Amount> {
        Amount::new(amount.get().checked_mul_rounded(&self.0, rounding)?)
    }
}

impl FromStr for Fraction {
    type Err = AmmError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s.parse::<Fixed>()?)
    }
}

impl fmt::Display for Fraction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
