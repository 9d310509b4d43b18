//! Core trait abstractions for pool operations.
//!
//! [`SwapPool`] executes swaps and quotes prices, [`LiquidityPool`] mints
//! and burns pool shares, and [`FromConfig`] builds a pool from its
//! configuration.

mod from_config;
mod liquidity_pool;
mod swap_pool;

pub use from_config::FromConfig;
pub use liquidity_pool::LiquidityPool;
pub use swap_pool::SwapPool;
