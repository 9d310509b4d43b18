//! Arithmetic for AMM calculations.
//!
//! - [`Fixed`]: deterministic `I80F48` fixed-point value with checked
//!   operations and explicit division rounding.
//! - [`CheckedArithmetic`]: overflow-safe operations on domain quantities.
//! - [`pow`]: `bpow`, the fractional power function behind every
//!   weighted formula.
//! - [`weighted_math`]: closed-form swap, join and exit pricing.

mod checked;
mod fixed;
pub mod pow;
pub mod weighted_math;

pub use checked::CheckedArithmetic;
pub use self::fixed::Fixed;
pub use pow::{bpow, bpowi, pow_unbounded, POW_PRECISION};
