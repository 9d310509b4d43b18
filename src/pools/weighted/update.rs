//! Staged, all-or-nothing balance updates.
//!
//! An operation stages every token delta, reserve diversion and share
//! delta in a [`BalanceUpdate`], then [`BalanceUpdate::commit`] checks the
//! staged state against the pool limits and writes it in one step.  An
//! error at any point before the write leaves the pool untouched.

use super::state::PoolState;
use crate::config::PoolLimits;
use crate::domain::{Amount, Shares};
use crate::error::AmmError;
use crate::math::CheckedArithmetic;

/// Pending changes to a pool's balances, reserves and share supply.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BalanceUpdate {
    balances: Vec<Amount>,
    reserves: Vec<Amount>,
    total_supply: Shares,
}

impl BalanceUpdate {
    /// Stages an update starting from the current state.
    #[must_use]
    pub fn begin(state: &PoolState) -> Self {
        let records = state.records();
        Self {
            balances: records.iter().map(|record| record.balance).collect(),
            reserves: records.iter().map(|record| record.reserves).collect(),
            total_supply: state.total_supply(),
        }
    }

    /// Staged balance at `position`.
    ///
    /// # Errors
    ///
    /// Returns [`AmmError::InvalidToken`] if `position` is out of range.
    pub fn balance(&self, position: usize) -> Result<Amount, AmmError> {
        self.balances
            .get(position)
            .copied()
            .ok_or(AmmError::InvalidToken("token index out of range"))
    }

    /// Staged share supply.
    #[must_use]
    pub const fn total_supply(&self) -> Shares {
        self.total_supply
    }

    fn slot(&mut self, position: usize) -> Result<&mut Amount, AmmError> {
        self.balances
            .get_mut(position)
            .ok_or(AmmError::InvalidToken("token index out of range"))
    }

    /// Adds `amount` to the balance at `position`.
    ///
    /// # Errors
    ///
    /// Returns [`AmmError::Overflow`] if the balance overflows.
    pub fn credit(&mut self, position: usize, amount: Amount) -> Result<&mut Self, AmmError> {
        let slot = self.slot(position)?;
        *slot = slot.safe_add(&amount)?;
        Ok(self)
    }

    /// Removes `amount` from the balance at `position`.
    ///
    /// # Errors
    ///
    /// Returns [`AmmError::Underflow`] if the balance would go negative.
    pub fn debit(&mut self, position: usize, amount: Amount) -> Result<&mut Self, AmmError> {
        let slot = self.slot(position)?;
        *slot = slot.safe_sub(&amount)?;
        Ok(self)
    }

    /// Moves `reserve` out of the balance at `position` into its
    /// accumulated protocol reserve.
    ///
    /// # Errors
    ///
    /// Returns [`AmmError::Underflow`] if the balance would go negative.
    pub fn divert(&mut self, position: usize, reserve: Amount) -> Result<&mut Self, AmmError> {
        if reserve.is_zero() {
            return Ok(self);
        }
        self.debit(position, reserve)?;
        let accumulated = self
            .reserves
            .get_mut(position)
            .ok_or(AmmError::InvalidToken("token index out of range"))?;
        *accumulated = accumulated.safe_add(&reserve)?;
        Ok(self)
    }

    /// Increases the share supply.
    ///
    /// # Errors
    ///
    /// Returns [`AmmError::Overflow`] if the supply overflows.
    pub fn mint(&mut self, shares: Shares) -> Result<&mut Self, AmmError> {
        self.total_supply = self.total_supply.safe_add(&shares)?;
        Ok(self)
    }

    /// Decreases the share supply.
    ///
    /// # Errors
    ///
    /// Returns [`AmmError::Underflow`] if more shares are burned than exist.
    pub fn burn(&mut self, shares: Shares) -> Result<&mut Self, AmmError> {
        self.total_supply = self.total_supply.safe_sub(&shares)?;
        Ok(self)
    }

    /// Checks the staged state against `limits`.
    ///
    /// # Errors
    ///
    /// - [`AmmError::MinimumBalance`] if a balance is below
    ///   `limits.min_balance`.
    /// - [`AmmError::Underflow`] if the update burns the whole supply of a
    ///   pool that had shares outstanding.
    pub fn validate(&self, state: &PoolState, limits: &PoolLimits) -> Result<(), AmmError> {
        if self.balances.len() != state.records().len() {
            return Err(AmmError::InvalidToken("bindings changed while staging"));
        }
        if self.balances.iter().any(|balance| *balance < limits.min_balance) {
            return Err(AmmError::MinimumBalance);
        }
        if self.total_supply.is_zero() && !state.total_supply().is_zero() {
            return Err(AmmError::Underflow("update burns the entire share supply"));
        }
        Ok(())
    }

    /// Validates and writes the staged state into `state`.
    ///
    /// # Errors
    ///
    /// Any error from [`BalanceUpdate::validate`]; `state` is unchanged.
    pub fn commit(self, state: &mut PoolState, limits: &PoolLimits) -> Result<(), AmmError> {
        self.validate(state, limits)?;
        for (position, (balance, reserves)) in self.balances.into_iter().zip(self.reserves).enumerate()
        {
            let record = state.record_mut(position)?;
            record.balance = balance;
            record.reserves = reserves;
        }
        state.set_total_supply(self.total_supply);
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use super::super::state::TokenRecord;
    use super::*;
    use crate::config::PoolConfig;
    use crate::domain::{TokenAddress, Weight};

    fn state() -> PoolState {
        let mut state = PoolState::new(&PoolConfig::default());
        for symbol in ["WETH", "DAI"] {
            state.push_record(TokenRecord {
                token: TokenAddress::from_symbol(symbol),
                balance: Amount::from_int(1000),
                weight: Weight::from_int(25),
                reserves: Amount::ZERO,
            });
        }
        state.finalize(Shares::from_int(100));
        state
    }

    #[test]
    fn commit_applies_every_delta() {
        let mut state = state();
        let mut update = BalanceUpdate::begin(&state);
        let staged = update
            .credit(0, Amount::from_int(10))
            .and_then(|u| u.divert(0, Amount::from_int(1)))
            .and_then(|u| u.debit(1, Amount::from_int(5)))
            .and_then(|u| u.mint(Shares::from_int(2)));
        assert!(staged.is_ok());
        assert_eq!(update.commit(&mut state, &PoolLimits::default()), Ok(()));

        let records = state.records();
        assert_eq!(records.first().map(|r| r.balance), Some(Amount::from_int(1009)));
        assert_eq!(records.first().map(|r| r.reserves), Some(Amount::from_int(1)));
        assert_eq!(records.get(1).map(|r| r.balance), Some(Amount::from_int(995)));
        assert_eq!(state.total_supply(), Shares::from_int(102));
    }

    #[test]
    fn debit_below_zero_fails() {
        let state = state();
        let mut update = BalanceUpdate::begin(&state);
        let result = update.debit(0, Amount::from_int(1001));
        assert!(matches!(result, Err(AmmError::Underflow(_))));
    }

    #[test]
    fn minimum_balance_blocks_commit() {
        let mut state = state();
        let before = state.clone();
        let mut update = BalanceUpdate::begin(&state);
        assert!(update.credit(0, Amount::from_int(1)).is_ok());
        assert!(update.debit(1, Amount::from_int(1000)).is_ok());
        assert_eq!(
            update.commit(&mut state, &PoolLimits::default()),
            Err(AmmError::MinimumBalance)
        );
        assert_eq!(state, before);
    }

    #[test]
    fn burning_entire_supply_blocks_commit() {
        let mut state = state();
        let mut update = BalanceUpdate::begin(&state);
        assert!(update.burn(Shares::from_int(100)).is_ok());
        assert!(matches!(
            update.commit(&mut state, &PoolLimits::default()),
            Err(AmmError::Underflow(_))
        ));
        assert_eq!(state.total_supply(), Shares::from_int(100));
    }

    #[test]
    fn unknown_position_is_rejected() {
        let state = state();
        let mut update = BalanceUpdate::begin(&state);
        assert!(matches!(
            update.credit(7, Amount::from_int(1)),
            Err(AmmError::InvalidToken(_))
        ));
    }
}
