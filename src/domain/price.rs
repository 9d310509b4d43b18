//! Exchange rate between two tokens.

use core::fmt;
use core::str::FromStr;

use super::{Amount, Rounding};
use crate::error::AmmError;
use crate::math::Fixed;

/// Exchange rate between two tokens, in units of `token_in` per unit of
/// `token_out`.
///
/// Wraps a non-negative [`Fixed`].  [`Price::MAX`] is the conventional
/// "no price limit" bound for swaps.
///
/// # Examples
///
/// ```
/// use weighted_amm::domain::{Amount, Price, Rounding};
///
/// let p = Price::from_amounts(Amount::from_int(3), Amount::from_int(2), Rounding::Down);
/// assert_eq!(p.map(|p| p.get().to_f64_lossy()), Ok(1.5));
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Price(Fixed);

impl Price {
    /// Price ratio of zero.
    pub const ZERO: Self = Self(Fixed::ZERO);

    /// Price ratio of 1:1.
    pub const ONE: Self = Self(Fixed::ONE);

    /// Largest representable price.
    pub const MAX: Self = Self(Fixed::MAX);

    /// Creates a price.
    ///
    /// # Errors
    ///
    /// Returns [`AmmError::InvalidQuantity`] if `value` is negative.
    pub fn new(value: Fixed) -> crate::error::Result<Self> {
        if value.is_negative() {
            return Err(AmmError::InvalidQuantity("price must be non-negative"));
        }
        Ok(Self(value))
    }

    /// Returns the underlying fixed-point value.
    #[must_use]
    pub const fn get(&self) -> Fixed {
        self.0
    }

    /// Computes `numerator / denominator`, e.g. the effective price
    /// `amount_in / amount_out` of an executed swap.
    ///
    /// # Errors
    ///
    /// Returns [`AmmError::DivisionByZero`] if `denominator` is zero.
    pub fn from_amounts(
        numerator: Amount,
        denominator: Amount,
        rounding: Rounding,
    ) -> crate::error::Result<Self> {
        Ok(Self(numerator.get().checked_div(&denominator.get(), rounding)?))
    }

    /// Relative distance `|self − other| / other`, for tolerance checks.
    ///
    /// # Errors
    ///
    /// Returns [`AmmError::DivisionByZero`] if `other` is zero.
    pub fn relative_diff(&self, other: &Self) -> crate::error::Result<Fixed> {
        self.0.abs_diff(&other.0).checked_div(&other.0, Rounding::Up)
    }
}

impl FromStr for Price {
    type Err = AmmError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s.parse::<Fixed>()?)
    }
}

impl fmt::Display for Price {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use super::*;

    // -- Construction -------------------------------------------------------

    #[test]
    fn rejects_negative() {
        assert!("-0.5".parse::<Price>().is_err());
        assert!("0".parse::<Price>().is_ok());
    }

    #[test]
    fn constants_are_ordered() {
        assert!(Price::ZERO < Price::ONE);
        assert!(Price::ONE < Price::MAX);
    }

    // -- from_amounts -------------------------------------------------------

    #[test]
    fn from_amounts_divides() {
        let Ok(p) = Price::from_amounts(Amount::from_int(49), Amount::from_int(1), Rounding::Down)
        else {
            panic!("expected Ok");
        };
        assert_eq!(p.get(), Fixed::from_int(49));
    }

    #[test]
    fn from_amounts_zero_denominator() {
        let result = Price::from_amounts(Amount::from_int(1), Amount::ZERO, Rounding::Down);
        assert_eq!(result, Err(AmmError::DivisionByZero));
    }

    #[test]
    fn from_amounts_rounding_up_is_not_smaller() {
        let Ok(down) = Price::from_amounts(Amount::from_int(1), Amount::from_int(3), Rounding::Down)
        else {
            panic!("expected Ok");
        };
        let Ok(up) = Price::from_amounts(Amount::from_int(1), Amount::from_int(3), Rounding::Up)
        else {
            panic!("expected Ok");
        };
        assert_eq!(up.get().to_bits() - down.get().to_bits(), 1);
    }

    // -- relative_diff ------------------------------------------------------

    #[test]
    fn relative_diff_of_equal_prices_is_zero() {
        let Ok(d) = Price::ONE.relative_diff(&Price::ONE) else {
            panic!("expected Ok");
        };
        assert!(d.is_zero());
    }
}
