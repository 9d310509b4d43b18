//! Pool configuration.
//!
//! [`PoolConfig`] carries the fees and reserve ratio a pool starts with;
//! [`PoolLimits`] carries the numeric bounds it enforces.

mod pool_config;

pub use pool_config::{PoolConfig, PoolLimits};
