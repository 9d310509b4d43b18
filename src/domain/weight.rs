//! Denormalized token weights.

use core::fmt;
use core::str::FromStr;

use crate::error::AmmError;
use crate::math::Fixed;

/// A token's denormalized weight.
///
/// Only ratios of weights matter: a token's normalized weight is
/// `weight / Σ weights`, always derived, never stored.  Range limits
/// (e.g. `1..=50`) are enforced by the pool at bind time through
/// [`PoolLimits`](crate::config::PoolLimits); the type itself only
/// guarantees positivity.
///
/// # Examples
///
/// ```
/// use weighted_amm::domain::Weight;
///
/// let w = Weight::from_int(49);
/// assert!(Weight::new(w.get()).is_ok());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Weight(Fixed);

impl Weight {
    /// Creates a weight.
    ///
    /// # Errors
    ///
    /// Returns [`AmmError::InvalidWeight`] if `value` is not strictly positive.
    pub fn new(value: Fixed) -> crate::error::Result<Self> {
        if !value.is_positive() {
            return Err(AmmError::InvalidWeight("weight must be positive"));
        }
        Ok(Self(value))
    }

    /// Creates a whole-unit weight.  `0` is clamped to the smallest
    /// positive weight so that the positivity invariant holds.
    #[must_use]
    pub const fn from_int(value: u64) -> Self {
        if value == 0 {
            return Self(Fixed::EPSILON);
        }
        Self(Fixed::from_int(value))
    }

    /// Returns the underlying fixed-point value.
    #[must_use]
    pub const fn get(&self) -> Fixed {
        self.0
    }
}

impl FromStr for Weight {
    type Err = AmmError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s.parse::<Fixed>()?)
    }
}

impl fmt::Display for Weight {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
