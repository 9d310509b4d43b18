//! Fixed-point exponentiation for weighted-pool pricing.
//!
//! Weighted formulas raise balance ratios to (possibly fractional) weight
//! ratios.  [`bpow`] splits the exponent into its integer part, handled
//! exactly by square-and-multiply ([`bpowi`]), and its fractional part,
//! approximated by the binomial series ([`bpow_approx`]):
//!
//! ```text
//! (1 + x)^a = Σ_k  a·(a−1)·…·(a−k+1) / k!  · x^k        x = base − 1
//! ```
//!
//! The series converges only for `|x| < 1`, so the base must lie strictly
//! between `0` and `2`.  Summation stops right after adding the first
//! term whose magnitude falls below [`POW_PRECISION`].
//!
//! Near either end of that interval the series needs thousands of terms.
//! [`pow_unbounded`] lifts the base restriction by factoring out powers of
//! two until the remaining mantissa sits in `[0.75, 1.5)`, where `|x| ≤ 0.5`
//! and the series settles in a few dozen terms.  It is used wherever the
//! base is not already held near `1` by the pool's ratio limits: the
//! bonding-curve invariant and the share-denominated single-sided flows.

use crate::domain::Rounding;
use crate::error::AmmError;

use super::fixed::ONE_BITS;
use super::Fixed;

/// Series truncation threshold (`1e-12`).
pub const POW_PRECISION: Fixed = Fixed::from_bits(ONE_BITS / 1_000_000_000_000);

/// Smallest admissible base for [`bpow`].
pub const MIN_POW_BASE: Fixed = Fixed::EPSILON;

/// Largest admissible base for [`bpow`] (`2 − ε`).
pub const MAX_POW_BASE: Fixed = Fixed::from_bits(2 * ONE_BITS - 1);

const HALF: Fixed = Fixed::from_bits(ONE_BITS / 2);

/// Mantissa band used by [`pow_unbounded`].
const MANTISSA_LOW: Fixed = Fixed::from_bits(ONE_BITS / 4 * 3);
const MANTISSA_HIGH: Fixed = Fixed::from_bits(ONE_BITS / 2 * 3);

/// Iteration cap for the binomial series.  Bases inside the ratio limits
/// the pool enforces converge in a few dozen terms.
const MAX_SERIES_TERMS: u32 = 20_000;

/// `base^exp` for a non-negative integer exponent.
///
/// # Errors
///
/// Returns [`AmmError::Overflow`] if an intermediate power is not
/// representable.
pub fn bpowi(base: Fixed, exp: u64) -> Result<Fixed, AmmError> {
    let mut a = base;
    let mut n = exp;
    let mut z = if n % 2 != 0 { a } else { Fixed::ONE };

    n /= 2;
    while n != 0 {
        a = a.checked_mul(&a)?;
        if n % 2 != 0 {
            z = z.checked_mul(&a)?;
        }
        n /= 2;
    }
    Ok(z)
}

/// `base^exp` for `exp` in `[0, 1)` via the binomial series.
///
/// `precision` is the magnitude below which the series stops.
///
/// # Errors
///
/// - [`AmmError::PowBaseOutOfRange`] if `base` is outside `(0, 2)`.
/// - [`AmmError::MathApproximation`] if the series fails to converge.
/// - [`AmmError::Overflow`] on intermediate overflow.
pub fn bpow_approx(base: Fixed, exp: Fixed, precision: Fixed) -> Result<Fixed, AmmError> {
    check_base(base)?;

    let x = base.checked_sub(&Fixed::ONE)?;
    let mut term = Fixed::ONE;
    let mut sum = term;
    let mut k: u32 = 1;

    while term.abs() >= precision {
        if k > MAX_SERIES_TERMS {
            return Err(AmmError::MathApproximation("power series did not converge"));
        }
        let big_k = Fixed::from_int(u64::from(k));
        // c = exp − (k − 1)
        let c = exp.checked_sub(&big_k.checked_sub(&Fixed::ONE)?)?;
        term = term.checked_mul(&c.checked_mul(&x)?)?;
        term = term.checked_div(&big_k, Rounding::Down)?;
        if term.is_zero() {
            break;
        }
        sum = sum.checked_add(&term)?;
        k += 1;
    }
    Ok(sum)
}

/// `base^exp` for a base in `(0, 2)` and a non-negative exponent.
///
/// # Errors
///
/// - [`AmmError::PowBaseOutOfRange`] if `base` is outside `(0, 2)`.
/// - [`AmmError::InvalidQuantity`] if `exp` is negative.
/// - [`AmmError::Overflow`] / [`AmmError::MathApproximation`] from the
///   underlying steps.
pub fn bpow(base: Fixed, exp: Fixed) -> Result<Fixed, AmmError> {
    check_base(base)?;
    let Some(whole) = exp.to_u64_floor() else {
        return Err(AmmError::InvalidQuantity("exponent must be non-negative"));
    };
    let remain = exp.fract();

    let whole_pow = bpowi(base, whole)?;
    if remain.is_zero() {
        return Ok(whole_pow);
    }

    let partial = bpow_approx(base, remain, POW_PRECISION)?;
    whole_pow.checked_mul(&partial)
}

/// `base^exp` for any positive base and non-negative exponent.
///
/// The base is written as `m · 2^k` with `m` in `[0.75, 1.5)`, so that
/// `base^exp = m^exp · 2^(k·exp)`.  Both factors go through [`bpow`]; a
/// positive power of two uses `2^f = 1 / 0.5^f` for its fractional part,
/// a negative one is taken directly as `0.5^(|k|·exp)`.
///
/// # Errors
///
/// - [`AmmError::InvalidQuantity`] if `base` is not positive or `exp` is
///   negative.
/// - [`AmmError::Overflow`] if the result is not representable.
pub fn pow_unbounded(base: Fixed, exp: Fixed) -> Result<Fixed, AmmError> {
    if !base.is_positive() {
        return Err(AmmError::InvalidQuantity("power base must be positive"));
    }
    if exp.is_negative() {
        return Err(AmmError::InvalidQuantity("exponent must be non-negative"));
    }

    let mut mantissa = base;
    let mut shift: i64 = 0;
    while mantissa >= MANTISSA_HIGH {
        mantissa = Fixed::from_bits(mantissa.to_bits() >> 1);
        shift += 1;
    }
    while mantissa < MANTISSA_LOW {
        mantissa = Fixed::from_bits(mantissa.to_bits() << 1);
        shift -= 1;
    }

    let mantissa_pow = bpow(mantissa, exp)?;
    if shift == 0 {
        return Ok(mantissa_pow);
    }

    let two_exp = Fixed::from_int(shift.unsigned_abs()).checked_mul(&exp)?;
    if shift > 0 {
        mantissa_pow.checked_mul(&pow_of_two(two_exp)?)
    } else {
        // 0.5^e sinks toward zero instead of overflowing for tiny bases
        mantissa_pow.checked_mul(&bpow(HALF, two_exp)?)
    }
}

/// `2^e` for non-negative `e`.
fn pow_of_two(e: Fixed) -> Result<Fixed, AmmError> {
    let Some(whole) = e.to_u64_floor() else {
        return Err(AmmError::InvalidQuantity("exponent must be non-negative"));
    };
    if whole >= 79 {
        return Err(AmmError::Overflow("power of two exceeds fixed-point range"));
    }
    let whole_pow = Fixed::from_bits(ONE_BITS << whole);
    let remain = e.fract();
    if remain.is_zero() {
        return Ok(whole_pow);
    }
    let inverse = bpow(HALF, remain)?;
    whole_pow.checked_div(&inverse, Rounding::Down)
}

fn check_base(base: Fixed) -> Result<(), AmmError> {
    if base < MIN_POW_BASE || base > MAX_POW_BASE {
        return Err(AmmError::PowBaseOutOfRange);
    }
    Ok(())
}
