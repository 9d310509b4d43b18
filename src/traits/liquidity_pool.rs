//! Liquidity management trait extending [`SwapPool`].
//!
//! [`LiquidityPool`] adds share minting and burning on top of trading.
//! Two families of operations exist:
//!
//! - **Proportional**: [`LiquidityPool::join_pool`] and
//!   [`LiquidityPool::exit_pool`] move every bound token in proportion
//!   to its balance and never pay the swap fee.
//! - **Single-sided**: the `joinswap_*` and `exitswap_*` methods move a
//!   single token, behaving like a swap plus a proportional join or
//!   exit, and pay the swap fee on the implicitly swapped portion.
//!
//! # Share Accounting Invariant
//!
//! The share supply reported by [`LiquidityPool::total_supply`] only
//! changes through the operations on this trait.  A proportional join or
//! exit changes every balance by the same fraction as the supply.

use super::SwapPool;
use crate::domain::{Amount, JoinExitOutcome, Shares, SingleAssetOutcome, TokenAddress};
use crate::error::AmmError;

/// Trait for pools that mint and burn pool shares.
///
/// # Errors
///
/// Beyond those of [`SwapPool`]:
///
/// - [`AmmError::LimitExceeded`]: a caller bound or a pool ratio limit
///   is violated
/// - [`AmmError::MathApproximation`]: an amount rounds to zero
/// - [`AmmError::MinimumBalance`]: a balance would fall below the minimum
pub trait LiquidityPool: SwapPool {
    /// Mints exactly `pool_amount_out` shares against a proportional
    /// deposit of every bound token.
    ///
    /// `max_amounts_in` follows the pool's bind order.
    ///
    /// # Errors
    ///
    /// - [`AmmError::InvalidQuantity`] if `max_amounts_in` does not have one
    ///   entry per bound token.
    /// - [`AmmError::LimitExceeded`] if a deposit exceeds its maximum.
    fn join_pool(
        &mut self,
        pool_amount_out: Shares,
        max_amounts_in: &[Amount],
    ) -> Result<JoinExitOutcome, AmmError>;

    /// Burns exactly `pool_amount_in` shares against a proportional
    /// withdrawal of every bound token, net of the exit fee.
    ///
    /// # Errors
    ///
    /// - [`AmmError::InvalidQuantity`] if `min_amounts_out` does not have
    ///   one entry per bound token.
    /// - [`AmmError::LimitExceeded`] if a payout is below its minimum.
    fn exit_pool(
        &mut self,
        pool_amount_in: Shares,
        min_amounts_out: &[Amount],
    ) -> Result<JoinExitOutcome, AmmError>;

    /// Deposits exactly `amount_in` of `token_in` and mints the shares it
    /// is worth.
    ///
    /// # Errors
    ///
    /// - [`AmmError::LimitExceeded`] if fewer than `min_pool_amount_out`
    ///   shares are minted or `amount_in` exceeds the input ratio limit.
    fn joinswap_extern_amount_in(
        &mut self,
        token_in: &TokenAddress,
        amount_in: Amount,
        min_pool_amount_out: Shares,
    ) -> Result<SingleAssetOutcome, AmmError>;

    /// Mints exactly `pool_amount_out` shares against a deposit of
    /// `token_in`.
    ///
    /// # Errors
    ///
    /// - [`AmmError::LimitExceeded`] if the deposit exceeds `max_amount_in`
    ///   or the input ratio limit.
    fn joinswap_pool_amount_out(
        &mut self,
        token_in: &TokenAddress,
        pool_amount_out: Shares,
        max_amount_in: Amount,
    ) -> Result<SingleAssetOutcome, AmmError>;

    /// Burns exactly `pool_amount_in` shares for a payout in `token_out`.
    ///
    /// # Errors
    ///
    /// - [`AmmError::LimitExceeded`] if the payout is below
    ///   `min_amount_out` or exceeds the output ratio limit.
    fn exitswap_pool_amount_in(
        &mut self,
        token_out: &TokenAddress,
        pool_amount_in: Shares,
        min_amount_out: Amount,
    ) -> Result<SingleAssetOutcome, AmmError>;

    /// Pays out exactly `amount_out` of `token_out`, burning the shares it
    /// is worth.
    ///
    /// # Errors
    ///
    /// - [`AmmError::LimitExceeded`] if more than `max_pool_amount_in`
    ///   shares would burn or `amount_out` exceeds the output ratio limit.
    fn exitswap_extern_amount_out(
        &mut self,
        token_out: &TokenAddress,
        amount_out: Amount,
        max_pool_amount_in: Shares,
    ) -> Result<SingleAssetOutcome, AmmError>;

    /// Returns the outstanding share supply.
    #[must_use]
    fn total_supply(&self) -> Shares;
}
