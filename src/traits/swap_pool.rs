//! Core swap trait for executing swaps and querying prices.
//!
//! [`SwapPool`] covers the trading surface of a pool:
//!
//! 1. **Quote**: [`SwapPool::spot_price`] and
//!    [`SwapPool::spot_price_sans_fee`] return the marginal exchange rate
//!    between two bound tokens.
//! 2. **Execute**: [`SwapPool::swap_exact_amount_in`] and
//!    [`SwapPool::swap_exact_amount_out`] perform a token exchange.
//! 3. **Inspect fees**: [`SwapPool::swap_fee`].
//!
//! # Fee Invariant
//!
//! The swap fee is charged on the input side.  A fee-bearing swap never
//! decreases the pool's bonding-curve value, and it never changes the
//! share supply.
//!
//! # Price Limits
//!
//! Both swap directions take a `max_price` bound on the fee-inclusive
//! spot price; pass [`Price::MAX`] for no bound.

use crate::domain::{Amount, Fraction, Price, SwapOutcome, TokenAddress};
use crate::error::AmmError;

/// Core trait for pools that trade between bound tokens.
///
/// # Errors
///
/// Methods that can fail return [`Result<T, AmmError>`].  Common error
/// variants include:
///
/// - [`AmmError::NotFinalized`]: trading before the pool is finalized
/// - [`AmmError::InvalidToken`]: a token is not bound to the pool
/// - [`AmmError::LimitExceeded`]: the trade exceeds the pool's ratio limits
/// - [`AmmError::PriceLimitExceeded`]: the spot price passes `max_price`
pub trait SwapPool {
    /// Fee-inclusive spot price of `token_out` in units of `token_in`.
    ///
    /// # Errors
    ///
    /// - [`AmmError::InvalidToken`] if either token is not bound.
    fn spot_price(
        &self,
        token_in: &TokenAddress,
        token_out: &TokenAddress,
    ) -> Result<Price, AmmError>;

    /// Spot price of `token_out` in units of `token_in`, without fee.
    ///
    /// # Errors
    ///
    /// - [`AmmError::InvalidToken`] if either token is not bound.
    fn spot_price_sans_fee(
        &self,
        token_in: &TokenAddress,
        token_out: &TokenAddress,
    ) -> Result<Price, AmmError>;

    /// Sells exactly `amount_in` of `token_in` for as much `token_out` as
    /// the curve yields.
    ///
    /// The swap either completes fully or leaves the pool untouched.
    ///
    /// # Errors
    ///
    /// - [`AmmError::InsufficientOutput`] if the output is below
    ///   `min_amount_out`.
    /// - [`AmmError::PriceLimitExceeded`] if the spot price before or after
    ///   the swap exceeds `max_price`.
    /// - [`AmmError::LimitExceeded`] if `amount_in` exceeds the input ratio
    ///   limit.
    /// - [`AmmError::MathApproximation`] if a post-trade sanity check fails.
    fn swap_exact_amount_in(
        &mut self,
        token_in: &TokenAddress,
        amount_in: Amount,
        token_out: &TokenAddress,
        min_amount_out: Amount,
        max_price: Price,
    ) -> Result<SwapOutcome, AmmError>;

    /// Buys exactly `amount_out` of `token_out`, paying as little
    /// `token_in` as the curve allows.
    ///
    /// # Errors
    ///
    /// - [`AmmError::ExcessiveInput`] if the required input exceeds
    ///   `max_amount_in`.
    /// - [`AmmError::LimitExceeded`] if `amount_out` exceeds the output
    ///   ratio limit.
    /// - Otherwise as [`SwapPool::swap_exact_amount_in`].
    fn swap_exact_amount_out(
        &mut self,
        token_in: &TokenAddress,
        max_amount_in: Amount,
        token_out: &TokenAddress,
        amount_out: Amount,
        max_price: Price,
    ) -> Result<SwapOutcome, AmmError>;

    /// Returns the swap fee.
    #[must_use]
    fn swap_fee(&self) -> Fraction;
}
