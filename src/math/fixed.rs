//! Deterministic fixed-point number backing every pool quantity.
//!
//! [`Fixed`] is a newtype over [`I80F48`](fixed::types::I80F48) from the
//! [`fixed`] crate.  All arithmetic is checked and reports failures as
//! [`AmmError`] instead of panicking, and division takes an explicit
//! [`Rounding`] direction.
//!
//! # Precision characteristics
//!
//! | Aspect | Value |
//! |--------|-------|
//! | Integer bits | 80 (signed) |
//! | Fractional bits | 48 |
//! | Resolution | 2^−48 ≈ 3.55 × 10⁻¹⁵ |
//! | Range | ±2^79 ≈ ±6.0 × 10²³ |
//! | Determinism | 100 % bit-for-bit |
//!
//! Decimal literals are parsed with [`FromStr`], rounding to the nearest
//! representable value.

use core::fmt;
use core::str::FromStr;

use ::fixed::types::I80F48;

use crate::domain::Rounding;
use crate::error::AmmError;

/// Number of fractional bits in the underlying representation.
const FRAC_BITS: u32 = 48;

/// Raw bit pattern of `1.0`.
pub(crate) const ONE_BITS: i128 = 1_i128 << FRAC_BITS;

/// Signed `I80F48` fixed-point value with checked arithmetic.
///
/// # Examples
///
/// ```
/// use weighted_amm::domain::Rounding;
/// use weighted_amm::math::Fixed;
///
/// let a = Fixed::from_int(10);
/// let b = Fixed::from_int(4);
/// let Ok(q) = a.checked_div(&b, Rounding::Down) else { panic!("non-zero divisor") };
/// assert_eq!(q, "2.5".parse::<Fixed>().unwrap_or(Fixed::ZERO));
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(transparent))]
pub struct Fixed(I80F48);

impl Fixed {
    /// `0`.
    pub const ZERO: Self = Self(I80F48::ZERO);

    /// `1`.
    pub const ONE: Self = Self(I80F48::ONE);

    /// `2`.
    pub const TWO: Self = Self::from_int(2);

    /// Smallest positive value (one unit in the last place).
    pub const EPSILON: Self = Self(I80F48::DELTA);

    /// Largest representable value.
    pub const MAX: Self = Self(I80F48::MAX);

    /// Wraps a raw [`I80F48`].
    #[inline]
    #[must_use]
    pub const fn new(value: I80F48) -> Self {
        Self(value)
    }

    /// Returns the underlying [`I80F48`].
    #[inline]
    #[must_use]
    pub const fn get(&self) -> I80F48 {
        self.0
    }

    /// Builds a value from its raw bit pattern.
    #[inline]
    #[must_use]
    pub const fn from_bits(bits: i128) -> Self {
        Self(I80F48::from_bits(bits))
    }

    /// Returns the raw bit pattern.
    #[inline]
    #[must_use]
    pub const fn to_bits(&self) -> i128 {
        self.0.to_bits()
    }

    /// Converts an integer.  Every `u64` is exactly representable.
    #[inline]
    #[must_use]
    pub const fn from_int(value: u64) -> Self {
        Self::from_bits((value as i128) << FRAC_BITS)
    }

    /// Builds `numerator / denominator` rounded toward zero.
    ///
    /// # Errors
    ///
    /// Returns [`AmmError::DivisionByZero`] if `denominator` is zero.
    pub fn from_ratio(numerator: u64, denominator: u64) -> Result<Self, AmmError> {
        Self::from_int(numerator).checked_div(&Self::from_int(denominator), Rounding::Down)
    }

    /// Returns `true` if the value is zero.
    #[inline]
    #[must_use]
    pub const fn is_zero(&self) -> bool {
        self.0.to_bits() == 0
    }

    /// Returns `true` if the value is strictly negative.
    #[inline]
    #[must_use]
    pub const fn is_negative(&self) -> bool {
        self.0.to_bits() < 0
    }

    /// Returns `true` if the value is strictly positive.
    #[inline]
    #[must_use]
    pub const fn is_positive(&self) -> bool {
        self.0.to_bits() > 0
    }

    /// Absolute value, saturating at [`Fixed::MAX`].
    #[inline]
    #[must_use]
    pub fn abs(&self) -> Self {
        Self(self.0.saturating_abs())
    }

    /// `|self − other|`, saturating at [`Fixed::MAX`].
    #[must_use]
    pub fn abs_diff(&self, other: &Self) -> Self {
        if self >= other {
            Self(self.0.saturating_sub(other.0))
        } else {
            Self(other.0.saturating_sub(self.0))
        }
    }

    /// Integer part, rounded toward negative infinity.
    #[inline]
    #[must_use]
    pub fn floor(&self) -> Self {
        Self(self.0.int())
    }

    /// Fractional part, always in `[0, 1)`.
    #[inline]
    #[must_use]
    pub fn fract(&self) -> Self {
        Self(self.0.frac())
    }

    /// Integer part as `u64`, or `None` if negative or too large.
    #[must_use]
    pub fn to_u64_floor(&self) -> Option<u64> {
        if self.is_negative() {
            return None;
        }
        self.0.int().checked_to_num::<u64>()
    }

    /// Lossy conversion for diagnostics and tests.
    #[inline]
    #[must_use]
    pub fn to_f64_lossy(&self) -> f64 {
        self.0.to_num::<f64>()
    }

    /// `1 − self`.
    ///
    /// # Errors
    ///
    /// Returns [`AmmError::Underflow`] only if the subtraction is not
    /// representable.
    pub fn complement(&self) -> Result<Self, AmmError> {
        Self::ONE.checked_sub(self)
    }

    // -- Checked arithmetic -------------------------------------------------

    /// Checked addition.
    ///
    /// # Errors
    ///
    /// Returns [`AmmError::Overflow`] if the sum is not representable.
    pub fn checked_add(&self, other: &Self) -> Result<Self, AmmError> {
        self.0
            .checked_add(other.0)
            .map(Self)
            .ok_or(AmmError::Overflow("fixed-point addition overflow"))
    }

    /// Checked subtraction.  Negative results are allowed; callers that
    /// need non-negative values wrap the result in a domain type.
    ///
    /// # Errors
    ///
    /// Returns [`AmmError::Underflow`] if the difference is not representable.
    pub fn checked_sub(&self, other: &Self) -> Result<Self, AmmError> {
        self.0
            .checked_sub(other.0)
            .map(Self)
            .ok_or(AmmError::Underflow("fixed-point subtraction underflow"))
    }

    /// Checked multiplication.  The product is truncated to 48 fractional
    /// bits.
    ///
    /// # Errors
    ///
    /// Returns [`AmmError::Overflow`] if the product is not representable.
    pub fn checked_mul(&self, other: &Self) -> Result<Self, AmmError> {
        self.0
            .checked_mul(other.0)
            .map(Self)
            .ok_or(AmmError::Overflow("fixed-point multiplication overflow"))
    }

    /// Multiplies with explicit rounding direction.
    ///
    /// [`Rounding::Up`] adds one ULP when the exact product of two
    /// non-negative operands has bits below the 48th fractional bit.
    ///
    /// # Errors
    ///
    /// Returns [`AmmError::Overflow`] if the product is not representable.
    pub fn checked_mul_rounded(&self, other: &Self, rounding: Rounding) -> Result<Self, AmmError> {
        let product = self.checked_mul(other)?;
        if rounding.is_down() || self.is_negative() || other.is_negative() {
            return Ok(product);
        }
        let mask = ONE_BITS - 1;
        let low = (self.to_bits() & mask) * (other.to_bits() & mask);
        if low & mask == 0 {
            return Ok(product);
        }
        product.checked_add(&Self::EPSILON)
    }

    /// Divides with explicit rounding direction.
    ///
    /// - [`Rounding::Down`] — truncates toward zero.
    /// - [`Rounding::Up`] — adds one ULP when truncation discards a
    ///   non-zero remainder.
    ///
    /// # Errors
    ///
    /// Returns [`AmmError::DivisionByZero`] if `other` is zero and
    /// [`AmmError::Overflow`] if the quotient is not representable.
    pub fn checked_div(&self, other: &Self, rounding: Rounding) -> Result<Self, AmmError> {
        if other.is_zero() {
            return Err(AmmError::DivisionByZero);
        }

        let quotient = self
            .0
            .checked_div(other.0)
            .ok_or(AmmError::Overflow("fixed-point division overflow"))?;

        match rounding {
            Rounding::Down => Ok(Self(quotient)),
            Rounding::Up => {
                let product = quotient
                    .checked_mul(other.0)
                    .ok_or(AmmError::Overflow("fixed-point division rounding overflow"))?;
                if product == self.0 {
                    return Ok(Self(quotient));
                }
                quotient
                    .checked_add(I80F48::DELTA)
                    .map(Self)
                    .ok_or(AmmError::Overflow("fixed-point division rounding overflow"))
            }
        }
    }
}

impl From<I80F48> for Fixed {
    #[inline]
    fn from(value: I80F48) -> Self {
        Self(value)
    }
}

impl From<u64> for Fixed {
    #[inline]
    fn from(value: u64) -> Self {
        Self::from_int(value)
    }
}

impl FromStr for Fixed {
    type Err = AmmError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        I80F48::from_str(s.trim())
            .map(Self)
            .map_err(|_| AmmError::InvalidQuantity("not a representable decimal number"))
    }
}

impl fmt::Display for Fixed {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
