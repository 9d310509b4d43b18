//! Pool implementations.
//!
//! The engine ships a single pool family, the Balancer-style
//! [`WeightedPool`], split into the pieces an operation passes through:
//!
//! | Piece | Role |
//! |-------|------|
//! | [`PoolState`] | bindings, fees, supply and lifecycle [`Phase`] |
//! | [`weighted_math`](crate::math::weighted_math) | closed-form pricing |
//! | [`ReserveSkim`] | protocol share of every fee |
//! | [`BalanceUpdate`] | staged, all-or-nothing state changes |

pub mod weighted;

pub use weighted::{BalanceUpdate, Phase, PoolState, ReserveSkim, TokenRecord, WeightedPool};

#[cfg(test)]
#[allow(clippy::panic)]
mod proptest_properties;
