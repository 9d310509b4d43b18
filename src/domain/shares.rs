//! Pool-share quantities.

use core::fmt;
use core::str::FromStr;

use crate::error::AmmError;
use crate::math::Fixed;

/// Pool shares: a fungible, proportional claim on every pooled balance.
///
/// Kept distinct from [`Amount`](super::Amount) so that token quantities
/// and share quantities cannot be mixed up in operation signatures.
///
/// # Examples
///
/// ```
/// use weighted_amm::domain::Shares;
///
/// let supply = Shares::from_int(100);
/// assert_eq!(supply.checked_add(&Shares::from_int(1)), Some(Shares::from_int(101)));
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[must_use]
pub struct Shares(Fixed);

impl Shares {
    /// No shares.
    pub const ZERO: Self = Self(Fixed::ZERO);

    /// Largest representable share quantity; the conventional "no limit" bound.
    pub const MAX: Self = Self(Fixed::MAX);

    /// Creates a share quantity from a fixed-point value.
    ///
    /// # Errors
    ///
    /// Returns [`AmmError::InvalidQuantity`] if `value` is negative.
    pub fn new(value: Fixed) -> crate::error::Result<Self> {
        if value.is_negative() {
            return Err(AmmError::InvalidQuantity("shares must be non-negative"));
        }
        Ok(Self(value))
    }

    /// Creates a whole-unit share quantity.
    pub const fn from_int(value: u64) -> Self {
        Self(Fixed::from_int(value))
    }

    /// Returns the underlying fixed-point value.
    #[must_use]
    pub const fn get(&self) -> Fixed {
        self.0
    }

    /// Returns `true` if there are no shares.
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

impl FromStr for Shares {
    type Err = AmmError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s.parse::<Fixed>()?)
    }
}

impl fmt::Display for Shares {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
