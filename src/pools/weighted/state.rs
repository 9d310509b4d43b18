//! Held pool data: bindings, fees, share supply and lifecycle phase.

use std::collections::BTreeMap;

use crate::config::PoolConfig;
use crate::domain::{Amount, Fraction, Shares, TokenAddress, Weight};
use crate::error::AmmError;
use crate::math::Fixed;

/// Lifecycle phase of a pool.
///
/// A pool starts in [`Phase::Configuring`], where tokens are bound and
/// fees set, and moves to [`Phase::Finalized`] exactly once.  Trading,
/// joins and exits are only available once finalized; configuration is
/// only available before.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Phase {
    /// Bindings and fees may change; trading is closed.
    #[default]
    Configuring,
    /// Bindings and fees are frozen; trading is open.
    Finalized,
}

/// One bound token.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TokenRecord {
    /// Token identifier.
    pub token: TokenAddress,
    /// Balance held by the pool.
    pub balance: Amount,
    /// Denormalized weight.
    pub weight: Weight,
    /// Reserve skimmed from flows of this token and not yet claimed.
    pub reserves: Amount,
}

/// State of a weighted pool.
///
/// Bound tokens live in a vector in bind order, with a lookup from token
/// to position.  Aggregates over tokens always iterate in bind order, so
/// they are reproducible.  The weight sum is derived on every read.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PoolState {
    phase: Phase,
    records: Vec<TokenRecord>,
    index: BTreeMap<TokenAddress, usize>,
    swap_fee: Fraction,
    exit_fee: Fraction,
    reserve_ratio: Fraction,
    total_supply: Shares,
}

impl PoolState {
    /// Creates an empty, configurable state with the fees of `config`.
    #[must_use]
    pub fn new(config: &PoolConfig) -> Self {
        Self {
            phase: Phase::Configuring,
            records: Vec::with_capacity(config.limits().max_bound_tokens),
            index: BTreeMap::new(),
            swap_fee: config.swap_fee(),
            exit_fee: config.exit_fee(),
            reserve_ratio: config.reserve_ratio(),
            total_supply: Shares::ZERO,
        }
    }

    /// Current lifecycle phase.
    #[must_use]
    pub const fn phase(&self) -> Phase {
        self.phase
    }

    /// Bound tokens in bind order.
    #[must_use]
    pub fn records(&self) -> &[TokenRecord] {
        &self.records
    }

    /// Position of `token` in bind order.
    ///
    /// # Errors
    ///
    /// Returns [`AmmError::InvalidToken`] if `token` is not bound.
    pub fn position(&self, token: &TokenAddress) -> Result<usize, AmmError> {
        self.index
            .get(token)
            .copied()
            .ok_or(AmmError::InvalidToken("token is not bound"))
    }

    /// Record of a bound token.
    ///
    /// # Errors
    ///
    /// Returns [`AmmError::InvalidToken`] if `token` is not bound.
    pub fn record(&self, token: &TokenAddress) -> Result<&TokenRecord, AmmError> {
        let position = self.position(token)?;
        self.records
            .get(position)
            .ok_or(AmmError::InvalidToken("token index out of range"))
    }

    /// Returns `true` if `token` is bound.
    #[must_use]
    pub fn is_bound(&self, token: &TokenAddress) -> bool {
        self.index.contains_key(token)
    }

    /// Sum of denormalized weights.
    ///
    /// # Errors
    ///
    /// Returns [`AmmError::Overflow`] if the sum is not representable.
    pub fn total_weight(&self) -> Result<Fixed, AmmError> {
        self.records
            .iter()
            .try_fold(Fixed::ZERO, |sum, record| sum.checked_add(&record.weight.get()))
    }

    /// Swap fee.
    #[must_use]
    pub const fn swap_fee(&self) -> Fraction {
        self.swap_fee
    }

    /// Exit fee.
    #[must_use]
    pub const fn exit_fee(&self) -> Fraction {
        self.exit_fee
    }

    /// Reserve ratio.
    #[must_use]
    pub const fn reserve_ratio(&self) -> Fraction {
        self.reserve_ratio
    }

    /// Outstanding shares.
    #[must_use]
    pub const fn total_supply(&self) -> Shares {
        self.total_supply
    }

    // -- Mutation (pool-internal) -------------------------------------------

    pub(super) fn push_record(&mut self, record: TokenRecord) {
        self.index.insert(record.token, self.records.len());
        self.records.push(record);
    }

    pub(super) fn record_mut(&mut self, position: usize) -> Result<&mut TokenRecord, AmmError> {
        self.records
            .get_mut(position)
            .ok_or(AmmError::InvalidToken("token index out of range"))
    }

    /// Removes a record, keeping the remaining tokens in bind order.
    pub(super) fn remove_record(&mut self, position: usize) -> Option<TokenRecord> {
        if position >= self.records.len() {
            return None;
        }
        let removed = self.records.remove(position);
        self.index = self
            .records
            .iter()
            .enumerate()
            .map(|(i, record)| (record.token, i))
            .collect();
        Some(removed)
    }

    pub(super) fn set_swap_fee(&mut self, fee: Fraction) {
        self.swap_fee = fee;
    }

    pub(super) fn set_exit_fee(&mut self, fee: Fraction) {
        self.exit_fee = fee;
    }

    pub(super) fn set_reserve_ratio(&mut self, ratio: Fraction) {
        self.reserve_ratio = ratio;
    }

    pub(super) fn set_total_supply(&mut self, supply: Shares) {
        self.total_supply = supply;
    }

    pub(super) fn finalize(&mut self, initial_supply: Shares) {
        self.phase = Phase::Finalized;
        self.total_supply = initial_supply;
    }
}
