//! Non-negative token amount.

use core::fmt;
use core::str::FromStr;

use crate::error::AmmError;
use crate::math::Fixed;

/// A token quantity held by or moved through the pool.
///
/// Wraps a [`Fixed`] that is guaranteed to be non-negative.  Checked
/// arithmetic returns `None` when the result would be negative or not
/// representable; use [`CheckedArithmetic`](crate::math::CheckedArithmetic)
/// for `Result`-returning variants.
///
/// # Examples
///
/// ```
/// use weighted_amm::domain::Amount;
///
/// let a = Amount::from_int(100);
/// let b: Amount = "0.5".parse().unwrap_or(Amount::ZERO);
/// assert_eq!(a.checked_add(&b), "100.5".parse().ok());
/// assert_eq!(b.checked_sub(&a), None);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[must_use]
pub struct Amount(Fixed);

impl Amount {
    /// Zero amount.
    pub const ZERO: Self = Self(Fixed::ZERO);

    /// Largest representable amount; the conventional "no limit" bound.
    pub const MAX: Self = Self(Fixed::MAX);

    /// Creates an amount from a fixed-point value.
    ///
    /// # Errors
    ///
    /// Returns [`AmmError::InvalidQuantity`] if `value` is negative.
    pub fn new(value: Fixed) -> crate::error::Result<Self> {
        if value.is_negative() {
            return Err(AmmError::InvalidQuantity("amount must be non-negative"));
        }
        Ok(Self(value))
    }

    /// Creates an amount in const context, clamping negative values to
    /// zero.
    pub const fn saturating_new(value: Fixed) -> Self {
        if value.is_negative() {
            return Self::ZERO;
        }
        Self(value)
    }

    /// Creates a whole-unit amount.
    pub const fn from_int(value: u64) -> Self {
        Self(Fixed::from_int(value))
    }

    /// Returns the underlying fixed-point value.
    #[must_use]
    pub const fn get(&self) -> Fixed {
        self.0
    }

    /// Returns `true` if the amount is zero.
    #[must_use]
    pub const fn is_zero(&self) -> bool {
        self.0.is_zero()
    }

    /// Checked addition.  Returns `None` on overflow.
    #[must_use]
    pub fn checked_add(&self, other: &Self) -> Option<Self> {
        self.0.checked_add(&other.0).ok().map(Self)
    }

    /// Checked subtraction.  Returns `None` if the result would be negative.
    #[must_use]
    pub fn checked_sub(&self, other: &Self) -> Option<Self> {
        if other.0 > self.0 {
            return None;
        }
        self.0.checked_sub(&other.0).ok().map(Self)
    }
}

impl FromStr for Amount {
    type Err = AmmError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s.parse::<Fixed>()?)
    }
}

impl fmt::Display for Amount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use super::*;

    #[test]
    fn constructors() {
        assert_eq!(Amount::from_int(42).get(), Fixed::from_int(42));
        assert_eq!(Amount::default(), Amount::ZERO);
        assert!(Amount::ZERO.is_zero());
        assert!(!Amount::from_int(1).is_zero());
    }

    #[test]
    fn negative_is_rejected() {
        let Ok(neg) = "-1".parse::<Fixed>() else {
            panic!("valid literal");
        };
        assert!(Amount::new(neg).is_err());
        assert!("-0.5".parse::<Amount>().is_err());
    }

    #[test]
    fn parse_decimal() {
        let Ok(a) = "333.333333333333333333".parse::<Amount>() else {
            panic!("expected Ok");
        };
        assert!((a.get().to_f64_lossy() - 333.333_333_333_333_3).abs() < 1e-9);
    }

    #[test]
    fn add_and_sub() {
        let a = Amount::from_int(300);
        let b = Amount::from_int(100);
        assert_eq!(a.checked_add(&b), Some(Amount::from_int(400)));
        assert_eq!(a.checked_sub(&b), Some(Amount::from_int(200)));
        assert_eq!(b.checked_sub(&a), None);
        assert_eq!(a.checked_sub(&a), Some(Amount::ZERO));
    }

    #[test]
    fn add_overflow() {
        assert_eq!(Amount::MAX.checked_add(&Amount::from_int(1)), None);
    }

    #[test]
    fn ordering() {
        assert!(Amount::from_int(1) < Amount::from_int(2));
        assert!(Amount::MAX > Amount::from_int(u64::MAX));
    }

    #[test]
    fn display() {
        assert_eq!(format!("{}", Amount::from_int(1_000)), "1000");
    }
}
