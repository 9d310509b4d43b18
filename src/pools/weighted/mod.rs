//! Weighted pool implementation (Balancer style).
//!
//! A weighted pool holds 2 to 8 tokens at fixed relative weights and keeps
//! the bonding-curve value `V = Π Bt^(wt/W)` from decreasing.  Prices
//! come from the closed forms in [`weighted_math`](crate::math::weighted_math).
//!
//! # Lifecycle
//!
//! ```text
//!  from_config ──► Configuring ──finalize()──► Finalized
//!                  bind / rebind / unbind      swaps, joins, exits
//!                  set_swap_fee / ...
//! ```
//!
//! # Operation Pipeline
//!
//! Every state-changing operation follows the same steps:
//!
//! 1. Check the phase and look up the tokens involved.
//! 2. Price the operation with the pure formulas.
//! 3. Compute the reserve diversion with [`ReserveSkim`].
//! 4. Stage all deltas in a [`BalanceUpdate`] and run the caller and pool
//!    limit checks.
//! 5. Commit the update in one step.
//!
//! Any failure before step 5 leaves the pool untouched.

mod reserve;
mod state;
mod update;

pub use reserve::ReserveSkim;
pub use state::{Phase, PoolState, TokenRecord};
pub use update::BalanceUpdate;

use tracing::{debug, info, warn};

use crate::config::{PoolConfig, PoolLimits};
use crate::domain::{
    Amount, Fraction, JoinExitOutcome, Price, Rounding, Shares, SingleAssetOutcome, SwapOutcome,
    TokenAddress, TokenAmount, Weight,
};
use crate::error::AmmError;
use crate::math::{weighted_math, CheckedArithmetic, Fixed};
use crate::traits::{FromConfig, LiquidityPool, SwapPool};

/// A weighted constant-product pool.
///
/// Created empty from a [`PoolConfig`] via [`FromConfig`]; tokens are
/// bound one at a time and the pool is then finalized, minting the
/// initial share supply.
///
/// # Example
///
/// ```rust
/// use weighted_amm::config::PoolConfig;
/// use weighted_amm::domain::{Amount, Price, TokenAddress, Weight};
/// use weighted_amm::pools::WeightedPool;
/// use weighted_amm::traits::{FromConfig, SwapPool};
///
/// let weth = TokenAddress::from_symbol("WETH");
/// let dai = TokenAddress::from_symbol("DAI");
///
/// let mut pool = WeightedPool::from_config(&PoolConfig::default()).expect("valid config");
/// pool.bind(weth, Amount::from_int(1_000), Weight::from_int(1)).expect("bound");
/// pool.bind(dai, Amount::from_int(1_000), Weight::from_int(49)).expect("bound");
/// pool.finalize().expect("finalized");
///
/// let outcome = pool
///     .swap_exact_amount_in(&weth, Amount::from_int(10), &dai, Amount::ZERO, Price::MAX)
///     .expect("swap ok");
/// assert!(outcome.amount_out > Amount::ZERO);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WeightedPool {
    limits: PoolLimits,
    state: PoolState,
}

impl FromConfig<PoolConfig> for WeightedPool {
    /// Creates an empty pool in the [`Phase::Configuring`] phase.
    ///
    /// # Errors
    ///
    /// Propagates any error from [`PoolConfig::validate`].
    fn from_config(config: &PoolConfig) -> Result<Self, AmmError> {
        config.validate()?;
        Ok(Self {
            limits: *config.limits(),
            state: PoolState::new(config),
        })
    }
}

impl WeightedPool {
    // -- Configuration --------------------------------------------------------

    /// Binds `token` with an initial `balance` and denormalized `weight`.
    ///
    /// # Errors
    ///
    /// - [`AmmError::AlreadyFinalized`] after finalize.
    /// - [`AmmError::TokenAlreadyBound`] if `token` is bound.
    /// - [`AmmError::LimitExceeded`] if the pool is full.
    /// - [`AmmError::InvalidWeight`] if `weight` or the new weight sum is
    ///   out of bounds.
    /// - [`AmmError::MinimumBalance`] if `balance` is below the minimum.
    pub fn bind(
        &mut self,
        token: TokenAddress,
        balance: Amount,
        weight: Weight,
    ) -> Result<(), AmmError> {
        self.ensure_configuring()?;
        if self.state.is_bound(&token) {
            return Err(AmmError::TokenAlreadyBound);
        }
        if self.state.records().len() >= self.limits.max_bound_tokens {
            return Err(AmmError::LimitExceeded("pool already holds the maximum number of tokens"));
        }
        let others = self.state.total_weight()?;
        self.check_binding(balance, weight, others)?;

        self.state.push_record(TokenRecord {
            token,
            balance,
            weight,
            reserves: Amount::ZERO,
        });
        info!(%token, %balance, %weight, "token bound");
        Ok(())
    }

    /// Changes the balance and weight of a bound token.
    ///
    /// Returns the previous balance so the caller can settle the
    /// difference.
    ///
    /// # Errors
    ///
    /// - [`AmmError::AlreadyFinalized`] after finalize.
    /// - [`AmmError::InvalidToken`] if `token` is not bound.
    /// - As [`WeightedPool::bind`] for weight and balance bounds.
    pub fn rebind(
        &mut self,
        token: &TokenAddress,
        balance: Amount,
        weight: Weight,
    ) -> Result<Amount, AmmError> {
        self.ensure_configuring()?;
        let position = self.state.position(token)?;
        let previous = *self.state.record(token)?;
        let others = self.state.total_weight()?.checked_sub(&previous.weight.get())?;
        self.check_binding(balance, weight, others)?;

        let record = self.state.record_mut(position)?;
        record.balance = balance;
        record.weight = weight;
        info!(%token, %balance, %weight, previous_balance = %previous.balance, "token rebound");
        Ok(previous.balance)
    }

    /// Removes a bound token and returns its balance.
    ///
    /// # Errors
    ///
    /// - [`AmmError::AlreadyFinalized`] after finalize.
    /// - [`AmmError::InvalidToken`] if `token` is not bound.
    pub fn unbind(&mut self, token: &TokenAddress) -> Result<Amount, AmmError> {
        self.ensure_configuring()?;
        let position = self.state.position(token)?;
        let removed = self
            .state
            .remove_record(position)
            .ok_or(AmmError::InvalidToken("token is not bound"))?;
        info!(%token, balance = %removed.balance, "token unbound");
        Ok(removed.balance)
    }

    /// Sets the swap fee.
    ///
    /// # Errors
    ///
    /// - [`AmmError::AlreadyFinalized`] after finalize.
    /// - [`AmmError::InvalidFee`] if `fee` is `1`.
    pub fn set_swap_fee(&mut self, fee: Fraction) -> Result<(), AmmError> {
        self.ensure_configuring()?;
        let fee = Fraction::fee(fee.get())?;
        self.state.set_swap_fee(fee);
        info!(%fee, "swap fee set");
        Ok(())
    }

    /// Sets the exit fee.
    ///
    /// # Errors
    ///
    /// - [`AmmError::AlreadyFinalized`] after finalize.
    /// - [`AmmError::InvalidFee`] if `fee` is `1`.
    pub fn set_exit_fee(&mut self, fee: Fraction) -> Result<(), AmmError> {
        self.ensure_configuring()?;
        let fee = Fraction::fee(fee.get())?;
        self.state.set_exit_fee(fee);
        info!(%fee, "exit fee set");
        Ok(())
    }

    /// Sets the reserve ratio.  Any value in `[0, 1]` is accepted.
    ///
    /// # Errors
    ///
    /// - [`AmmError::AlreadyFinalized`] after finalize.
    pub fn set_reserve_ratio(&mut self, ratio: Fraction) -> Result<(), AmmError> {
        self.ensure_configuring()?;
        self.state.set_reserve_ratio(ratio);
        info!(%ratio, "reserve ratio set");
        Ok(())
    }

    /// Freezes bindings and fees, opens trading and mints the initial
    /// share supply, which is returned.
    ///
    /// # Errors
    ///
    /// - [`AmmError::AlreadyFinalized`] if called twice.
    /// - [`AmmError::InvalidConfiguration`] if fewer than the minimum
    ///   number of tokens are bound.
    pub fn finalize(&mut self) -> Result<Shares, AmmError> {
        self.ensure_configuring()?;
        if self.state.records().len() < self.limits.min_bound_tokens {
            return Err(AmmError::InvalidConfiguration(
                "not enough tokens bound to finalize",
            ));
        }
        let supply = self.limits.initial_supply;
        self.state.finalize(supply);
        info!(tokens = self.state.records().len(), %supply, "pool finalized");
        Ok(supply)
    }

    // -- Accessors --------------------------------------------------------------

    /// Pool limits.
    #[must_use]
    pub const fn limits(&self) -> &PoolLimits {
        &self.limits
    }

    /// Full pool state.
    #[must_use]
    pub const fn state(&self) -> &PoolState {
        &self.state
    }

    /// Lifecycle phase.
    #[must_use]
    pub const fn phase(&self) -> Phase {
        self.state.phase()
    }

    /// Returns `true` once the pool is finalized.
    #[must_use]
    pub fn is_finalized(&self) -> bool {
        self.state.phase() == Phase::Finalized
    }

    /// Returns `true` if `token` is bound.
    #[must_use]
    pub fn is_bound(&self, token: &TokenAddress) -> bool {
        self.state.is_bound(token)
    }

    /// Number of bound tokens.
    #[must_use]
    pub fn num_tokens(&self) -> usize {
        self.state.records().len()
    }

    /// Bound tokens in bind order.
    #[must_use]
    pub fn current_tokens(&self) -> Vec<TokenAddress> {
        self.state.records().iter().map(|record| record.token).collect()
    }

    /// Bound tokens of a finalized pool.
    ///
    /// # Errors
    ///
    /// Returns [`AmmError::NotFinalized`] before finalize.
    pub fn final_tokens(&self) -> Result<Vec<TokenAddress>, AmmError> {
        self.ensure_finalized()?;
        Ok(self.current_tokens())
    }

    /// Balance of a bound token.
    ///
    /// # Errors
    ///
    /// Returns [`AmmError::InvalidToken`] if `token` is not bound.
    pub fn get_balance(&self, token: &TokenAddress) -> Result<Amount, AmmError> {
        Ok(self.state.record(token)?.balance)
    }

    /// Denormalized weight of a bound token.
    ///
    /// # Errors
    ///
    /// Returns [`AmmError::InvalidToken`] if `token` is not bound.
    pub fn denormalized_weight(&self, token: &TokenAddress) -> Result<Weight, AmmError> {
        Ok(self.state.record(token)?.weight)
    }

    /// Sum of denormalized weights.
    ///
    /// # Errors
    ///
    /// Returns [`AmmError::Overflow`] if the sum is not representable.
    pub fn total_denormalized_weight(&self) -> Result<Fixed, AmmError> {
        self.state.total_weight()
    }

    /// Normalized weight `w / W` of a bound token.
    ///
    /// # Errors
    ///
    /// Returns [`AmmError::InvalidToken`] if `token` is not bound.
    pub fn normalized_weight(&self, token: &TokenAddress) -> Result<Fixed, AmmError> {
        let weight = self.state.record(token)?.weight;
        weighted_math::normalized_weight(weight, self.state.total_weight()?, Rounding::Down)
    }

    /// Exit fee.
    #[must_use]
    pub const fn exit_fee(&self) -> Fraction {
        self.state.exit_fee()
    }

    /// Reserve ratio.
    #[must_use]
    pub const fn reserve_ratio(&self) -> Fraction {
        self.state.reserve_ratio()
    }

    /// Bonding-curve value `V = Π Bt^(wt/W)`.
    ///
    /// # Errors
    ///
    /// Returns [`AmmError::DivisionByZero`] if no token is bound.
    pub fn invariant(&self) -> Result<Fixed, AmmError> {
        weighted_math::calc_invariant(
            self.state
                .records()
                .iter()
                .map(|record| (record.balance, record.weight)),
        )
    }

    /// Reserve accumulated for `token` and not yet claimed.
    ///
    /// # Errors
    ///
    /// Returns [`AmmError::InvalidToken`] if `token` is not bound.
    pub fn accumulated_reserves(&self, token: &TokenAddress) -> Result<Amount, AmmError> {
        Ok(self.state.record(token)?.reserves)
    }

    /// Drains and returns the accumulated reserves of every token with a
    /// non-zero reserve, in bind order.  Balances are not touched.
    pub fn claim_reserves(&mut self) -> Vec<TokenAmount> {
        let mut claimed = Vec::new();
        for position in 0..self.state.records().len() {
            let Ok(record) = self.state.record_mut(position) else {
                continue;
            };
            if record.reserves.is_zero() {
                continue;
            }
            claimed.push(TokenAmount {
                token: record.token,
                amount: record.reserves,
            });
            record.reserves = Amount::ZERO;
        }
        info!(tokens = claimed.len(), "reserves claimed");
        claimed
    }

    // -- Helpers ----------------------------------------------------------------

    fn ensure_configuring(&self) -> Result<(), AmmError> {
        match self.state.phase() {
            Phase::Configuring => Ok(()),
            Phase::Finalized => Err(AmmError::AlreadyFinalized),
        }
    }

    fn ensure_finalized(&self) -> Result<(), AmmError> {
        match self.state.phase() {
            Phase::Finalized => Ok(()),
            Phase::Configuring => Err(AmmError::NotFinalized),
        }
    }

    fn check_binding(
        &self,
        balance: Amount,
        weight: Weight,
        other_weights: Fixed,
    ) -> Result<(), AmmError> {
        if weight < self.limits.min_weight {
            return Err(AmmError::InvalidWeight("weight below minimum"));
        }
        if weight > self.limits.max_weight {
            return Err(AmmError::InvalidWeight("weight above maximum"));
        }
        if other_weights.checked_add(&weight.get())? > self.limits.max_total_weight {
            return Err(AmmError::InvalidWeight("total weight above maximum"));
        }
        if balance < self.limits.min_balance {
            return Err(AmmError::MinimumBalance);
        }
        Ok(())
    }

    fn trading_pair(
        &self,
        token_in: &TokenAddress,
        token_out: &TokenAddress,
    ) -> Result<(usize, TokenRecord, usize, TokenRecord), AmmError> {
        self.ensure_finalized()?;
        if token_in == token_out {
            return Err(AmmError::InvalidToken("token_in and token_out must differ"));
        }
        let position_in = self.state.position(token_in)?;
        let position_out = self.state.position(token_out)?;
        Ok((
            position_in,
            *self.state.record(token_in)?,
            position_out,
            *self.state.record(token_out)?,
        ))
    }

    fn max_in(&self, balance: Amount) -> Result<Amount, AmmError> {
        self.limits.max_in_ratio.apply(balance, Rounding::Down)
    }

    fn max_out(&self, balance: Amount) -> Result<Amount, AmmError> {
        self.limits.max_out_ratio.apply(balance, Rounding::Down)
    }

    fn skim(&self) -> ReserveSkim {
        ReserveSkim::new(self.state.reserve_ratio())
    }

    /// Stages a swap, runs the post-trade price checks and commits.
    fn execute_swap(
        &mut self,
        (position_in, record_in): (usize, TokenRecord),
        (position_out, record_out): (usize, TokenRecord),
        amount_in: Amount,
        amount_out: Amount,
        spot_price_before: Price,
        max_price: Price,
    ) -> Result<SwapOutcome, AmmError> {
        let swap_fee = self.state.swap_fee();
        let reserve = self.skim().on_swap(amount_in, swap_fee)?;

        let mut update = BalanceUpdate::begin(&self.state);
        update
            .credit(position_in, amount_in)?
            .divert(position_in, reserve)?
            .debit(position_out, amount_out)?;

        let spot_price_after = weighted_math::calc_spot_price(
            update.balance(position_in)?,
            record_in.weight,
            update.balance(position_out)?,
            record_out.weight,
            swap_fee,
        )?;
        if spot_price_after < spot_price_before {
            warn!(%spot_price_before, %spot_price_after, "spot price fell across a swap");
            return Err(AmmError::MathApproximation("spot price decreased after swap"));
        }
        if spot_price_after > max_price {
            return Err(AmmError::PriceLimitExceeded(
                "spot price after swap exceeds max price",
            ));
        }
        let effective = Price::from_amounts(amount_in, amount_out, Rounding::Up)?;
        if spot_price_before > effective {
            warn!(%spot_price_before, %effective, "swap beat the pre-trade spot price");
            return Err(AmmError::MathApproximation(
                "effective price below pre-trade spot price",
            ));
        }

        update.commit(&mut self.state, &self.limits)?;
        debug!(
            token_in = %record_in.token,
            token_out = %record_out.token,
            %amount_in,
            %amount_out,
            %reserve,
            %spot_price_after,
            "swap executed"
        );
        Ok(SwapOutcome {
            amount_in,
            amount_out,
            spot_price_before,
            spot_price_after,
            reserve,
        })
    }

    fn check_spot_before(
        &self,
        record_in: &TokenRecord,
        record_out: &TokenRecord,
        max_price: Price,
    ) -> Result<Price, AmmError> {
        let spot = weighted_math::calc_spot_price(
            record_in.balance,
            record_in.weight,
            record_out.balance,
            record_out.weight,
            self.state.swap_fee(),
        )?;
        if spot > max_price {
            return Err(AmmError::PriceLimitExceeded(
                "spot price before swap exceeds max price",
            ));
        }
        Ok(spot)
    }

    fn bounds_len(&self, bounds: &[Amount]) -> Result<(), AmmError> {
        if bounds.len() != self.state.records().len() {
            return Err(AmmError::InvalidQuantity(
                "expected one bound per bound token",
            ));
        }
        Ok(())
    }

    fn single_asset_outcome(
        update: &BalanceUpdate,
        position: usize,
        token: TokenAddress,
        token_amount: Amount,
        pool_amount: Shares,
        reserve: Amount,
    ) -> Result<SingleAssetOutcome, AmmError> {
        Ok(SingleAssetOutcome {
            token,
            token_amount,
            pool_amount,
            reserve,
            balance_after: update.balance(position)?,
            total_supply: update.total_supply(),
        })
    }
}

impl SwapPool for WeightedPool {
    /// Fee-inclusive spot price.  Available in every phase.
    ///
    /// # Errors
    ///
    /// - [`AmmError::InvalidToken`] if either token is not bound.
    fn spot_price(
        &self,
        token_in: &TokenAddress,
        token_out: &TokenAddress,
    ) -> Result<Price, AmmError> {
        let record_in = self.state.record(token_in)?;
        let record_out = self.state.record(token_out)?;
        weighted_math::calc_spot_price(
            record_in.balance,
            record_in.weight,
            record_out.balance,
            record_out.weight,
            self.state.swap_fee(),
        )
    }

    fn spot_price_sans_fee(
        &self,
        token_in: &TokenAddress,
        token_out: &TokenAddress,
    ) -> Result<Price, AmmError> {
        let record_in = self.state.record(token_in)?;
        let record_out = self.state.record(token_out)?;
        weighted_math::calc_spot_price_sans_fee(
            record_in.balance,
            record_in.weight,
            record_out.balance,
            record_out.weight,
        )
    }

    fn swap_exact_amount_in(
        &mut self,
        token_in: &TokenAddress,
        amount_in: Amount,
        token_out: &TokenAddress,
        min_amount_out: Amount,
        max_price: Price,
    ) -> Result<SwapOutcome, AmmError> {
        let (position_in, record_in, position_out, record_out) =
            self.trading_pair(token_in, token_out)?;
        if amount_in.is_zero() {
            return Err(AmmError::InvalidQuantity("amount_in must be positive"));
        }
        if amount_in > self.max_in(record_in.balance)? {
            return Err(AmmError::LimitExceeded("amount_in exceeds the max in ratio"));
        }
        let spot_price_before = self.check_spot_before(&record_in, &record_out, max_price)?;

        let amount_out = weighted_math::calc_out_given_in(
            record_in.balance,
            record_in.weight,
            record_out.balance,
            record_out.weight,
            amount_in,
            self.state.swap_fee(),
        )?;
        if amount_out.is_zero() || amount_out < min_amount_out {
            return Err(AmmError::InsufficientOutput);
        }

        self.execute_swap(
            (position_in, record_in),
            (position_out, record_out),
            amount_in,
            amount_out,
            spot_price_before,
            max_price,
        )
    }

    fn swap_exact_amount_out(
        &mut self,
        token_in: &TokenAddress,
        max_amount_in: Amount,
        token_out: &TokenAddress,
        amount_out: Amount,
        max_price: Price,
    ) -> Result<SwapOutcome, AmmError> {
        let (position_in, record_in, position_out, record_out) =
            self.trading_pair(token_in, token_out)?;
        if amount_out.is_zero() {
            return Err(AmmError::InvalidQuantity("amount_out must be positive"));
        }
        if amount_out > self.max_out(record_out.balance)? {
            return Err(AmmError::LimitExceeded("amount_out exceeds the max out ratio"));
        }
        let spot_price_before = self.check_spot_before(&record_in, &record_out, max_price)?;

        let amount_in = weighted_math::calc_in_given_out(
            record_in.balance,
            record_in.weight,
            record_out.balance,
            record_out.weight,
            amount_out,
            self.state.swap_fee(),
        )?;
        if amount_in > max_amount_in {
            return Err(AmmError::ExcessiveInput);
        }

        self.execute_swap(
            (position_in, record_in),
            (position_out, record_out),
            amount_in,
            amount_out,
            spot_price_before,
            max_price,
        )
    }

    fn swap_fee(&self) -> Fraction {
        self.state.swap_fee()
    }
}

impl LiquidityPool for WeightedPool {
    /// Deposits `balance · pool_amount_out / supply` of every token,
    /// rounded up.  No swap fee applies.
    fn join_pool(
        &mut self,
        pool_amount_out: Shares,
        max_amounts_in: &[Amount],
    ) -> Result<JoinExitOutcome, AmmError> {
        self.ensure_finalized()?;
        self.bounds_len(max_amounts_in)?;
        let ratio = pool_amount_out.safe_ratio(&self.state.total_supply(), Rounding::Up)?;
        if ratio.is_zero() {
            return Err(AmmError::MathApproximation("join ratio rounds to zero"));
        }

        let mut update = BalanceUpdate::begin(&self.state);
        let mut amounts = Vec::with_capacity(max_amounts_in.len());
        for (position, (record, max_in)) in
            self.state.records().iter().zip(max_amounts_in).enumerate()
        {
            let amount_in = record.balance.safe_scale(&ratio, Rounding::Up)?;
            if amount_in.is_zero() {
                return Err(AmmError::MathApproximation("join amount rounds to zero"));
            }
            if amount_in > *max_in {
                return Err(AmmError::LimitExceeded("amount in exceeds max amount in"));
            }
            update.credit(position, amount_in)?;
            amounts.push(TokenAmount {
                token: record.token,
                amount: amount_in,
            });
        }
        update.mint(pool_amount_out)?;
        let total_supply = update.total_supply();

        update.commit(&mut self.state, &self.limits)?;
        debug!(%pool_amount_out, %total_supply, "pool joined");
        Ok(JoinExitOutcome {
            pool_amount: pool_amount_out,
            amounts,
            total_supply,
        })
    }

    /// Pays out `balance · pool_amount_in · (1 − exit_fee) / supply` of
    /// every token, rounded down, and burns all of `pool_amount_in`.
    fn exit_pool(
        &mut self,
        pool_amount_in: Shares,
        min_amounts_out: &[Amount],
    ) -> Result<JoinExitOutcome, AmmError> {
        self.ensure_finalized()?;
        self.bounds_len(min_amounts_out)?;
        let after_exit_fee =
            pool_amount_in.safe_scale(&self.state.exit_fee().complement().get(), Rounding::Down)?;
        let ratio = after_exit_fee.safe_ratio(&self.state.total_supply(), Rounding::Down)?;
        if ratio.is_zero() {
            return Err(AmmError::MathApproximation("exit ratio rounds to zero"));
        }

        let mut update = BalanceUpdate::begin(&self.state);
        update.burn(pool_amount_in)?;
        let mut amounts = Vec::with_capacity(min_amounts_out.len());
        for (position, (record, min_out)) in
            self.state.records().iter().zip(min_amounts_out).enumerate()
        {
            let amount_out = record.balance.safe_scale(&ratio, Rounding::Down)?;
            if amount_out.is_zero() {
                return Err(AmmError::MathApproximation("exit amount rounds to zero"));
            }
            if amount_out < *min_out {
                return Err(AmmError::LimitExceeded("amount out below min amount out"));
            }
            update.debit(position, amount_out)?;
            amounts.push(TokenAmount {
                token: record.token,
                amount: amount_out,
            });
        }
        let total_supply = update.total_supply();

        update.commit(&mut self.state, &self.limits)?;
        debug!(%pool_amount_in, %total_supply, "pool exited");
        Ok(JoinExitOutcome {
            pool_amount: pool_amount_in,
            amounts,
            total_supply,
        })
    }

    fn joinswap_extern_amount_in(
        &mut self,
        token_in: &TokenAddress,
        amount_in: Amount,
        min_pool_amount_out: Shares,
    ) -> Result<SingleAssetOutcome, AmmError> {
        self.ensure_finalized()?;
        let position = self.state.position(token_in)?;
        let record = *self.state.record(token_in)?;
        if amount_in.is_zero() {
            return Err(AmmError::InvalidQuantity("amount_in must be positive"));
        }
        if amount_in > self.max_in(record.balance)? {
            return Err(AmmError::LimitExceeded("amount_in exceeds the max in ratio"));
        }

        let total_weight = self.state.total_weight()?;
        let swap_fee = self.state.swap_fee();
        let pool_amount_out = weighted_math::calc_pool_out_given_single_in(
            record.balance,
            record.weight,
            self.state.total_supply(),
            total_weight,
            amount_in,
            swap_fee,
        )?;
        if pool_amount_out.is_zero() {
            return Err(AmmError::MathApproximation("pool amount out rounds to zero"));
        }
        if pool_amount_out < min_pool_amount_out {
            return Err(AmmError::LimitExceeded("pool amount out below minimum"));
        }

        let fee_free =
            weighted_math::calc_single_in_after_fee(amount_in, record.weight, total_weight, swap_fee)?;
        let reserve = self.skim().skim(amount_in, fee_free)?;

        let mut update = BalanceUpdate::begin(&self.state);
        update
            .credit(position, amount_in)?
            .divert(position, reserve)?
            .mint(pool_amount_out)?;
        let outcome = Self::single_asset_outcome(
            &update,
            position,
            record.token,
            amount_in,
            pool_amount_out,
            reserve,
        )?;

        update.commit(&mut self.state, &self.limits)?;
        debug!(
            token_in = %record.token,
            %amount_in,
            %pool_amount_out,
            %reserve,
            total_supply = %outcome.total_supply,
            "single-sided join"
        );
        Ok(outcome)
    }

    fn joinswap_pool_amount_out(
        &mut self,
        token_in: &TokenAddress,
        pool_amount_out: Shares,
        max_amount_in: Amount,
    ) -> Result<SingleAssetOutcome, AmmError> {
        self.ensure_finalized()?;
        let position = self.state.position(token_in)?;
        let record = *self.state.record(token_in)?;
        if pool_amount_out.is_zero() {
            return Err(AmmError::InvalidQuantity("pool_amount_out must be positive"));
        }
        // the deposit ratio is never below the share ratio
        let share_ratio = pool_amount_out.safe_ratio(&self.state.total_supply(), Rounding::Down)?;
        if share_ratio > self.limits.max_in_ratio.get() {
            return Err(AmmError::LimitExceeded(
                "pool_amount_out implies more than the max in ratio",
            ));
        }

        let (amount_in, fee_free) = weighted_math::calc_single_in_given_pool_out(
            record.balance,
            record.weight,
            self.state.total_supply(),
            self.state.total_weight()?,
            pool_amount_out,
            self.state.swap_fee(),
        )?;
        if amount_in.is_zero() {
            return Err(AmmError::MathApproximation("amount in rounds to zero"));
        }
        if amount_in > max_amount_in {
            return Err(AmmError::LimitExceeded("amount in exceeds max amount in"));
        }
        if amount_in > self.max_in(record.balance)? {
            return Err(AmmError::LimitExceeded("amount in exceeds the max in ratio"));
        }

        let reserve = self.skim().skim(amount_in, fee_free)?;

        let mut update = BalanceUpdate::begin(&self.state);
        update
            .credit(position, amount_in)?
            .divert(position, reserve)?
            .mint(pool_amount_out)?;
        let outcome = Self::single_asset_outcome(
            &update,
            position,
            record.token,
            amount_in,
            pool_amount_out,
            reserve,
        )?;

        update.commit(&mut self.state, &self.limits)?;
        debug!(
            token_in = %record.token,
            %amount_in,
            %pool_amount_out,
            %reserve,
            total_supply = %outcome.total_supply,
            "single-sided join"
        );
        Ok(outcome)
    }

    fn exitswap_pool_amount_in(
        &mut self,
        token_out: &TokenAddress,
        pool_amount_in: Shares,
        min_amount_out: Amount,
    ) -> Result<SingleAssetOutcome, AmmError> {
        self.ensure_finalized()?;
        let position = self.state.position(token_out)?;
        let record = *self.state.record(token_out)?;
        if pool_amount_in.is_zero() {
            return Err(AmmError::InvalidQuantity("pool_amount_in must be positive"));
        }
        if pool_amount_in >= self.state.total_supply() {
            return Err(AmmError::Underflow("exit would burn the entire supply"));
        }
        // the payout ratio is never below burned / supply · (1 − swap_fee)
        let burned =
            pool_amount_in.safe_scale(&self.state.exit_fee().complement().get(), Rounding::Down)?;
        let payout_floor = burned
            .safe_ratio(&self.state.total_supply(), Rounding::Down)?
            .checked_mul_rounded(&self.state.swap_fee().complement().get(), Rounding::Down)?;
        if payout_floor > self.limits.max_out_ratio.get() {
            return Err(AmmError::LimitExceeded(
                "pool_amount_in implies more than the max out ratio",
            ));
        }

        let (amount_out, before_fee) = weighted_math::calc_single_out_given_pool_in(
            record.balance,
            record.weight,
            self.state.total_supply(),
            self.state.total_weight()?,
            pool_amount_in,
            self.state.swap_fee(),
            self.state.exit_fee(),
        )?;
        if amount_out.is_zero() {
            return Err(AmmError::MathApproximation("amount out rounds to zero"));
        }
        if amount_out < min_amount_out {
            return Err(AmmError::LimitExceeded("amount out below min amount out"));
        }
        if amount_out > self.max_out(record.balance)? {
            return Err(AmmError::LimitExceeded("amount out exceeds the max out ratio"));
        }

        let reserve = self.skim().skim(before_fee, amount_out)?;

        let mut update = BalanceUpdate::begin(&self.state);
        update
            .debit(position, amount_out)?
            .divert(position, reserve)?
            .burn(pool_amount_in)?;
        let outcome = Self::single_asset_outcome(
            &update,
            position,
            record.token,
            amount_out,
            pool_amount_in,
            reserve,
        )?;

        update.commit(&mut self.state, &self.limits)?;
        debug!(
            token_out = %record.token,
            %amount_out,
            %pool_amount_in,
            %reserve,
            total_supply = %outcome.total_supply,
            "single-sided exit"
        );
        Ok(outcome)
    }

    fn exitswap_extern_amount_out(
        &mut self,
        token_out: &TokenAddress,
        amount_out: Amount,
        max_pool_amount_in: Shares,
    ) -> Result<SingleAssetOutcome, AmmError> {
        self.ensure_finalized()?;
        let position = self.state.position(token_out)?;
        let record = *self.state.record(token_out)?;
        if amount_out.is_zero() {
            return Err(AmmError::InvalidQuantity("amount_out must be positive"));
        }
        if amount_out > self.max_out(record.balance)? {
            return Err(AmmError::LimitExceeded("amount out exceeds the max out ratio"));
        }

        let (pool_amount_in, before_fee) = weighted_math::calc_pool_in_given_single_out(
            record.balance,
            record.weight,
            self.state.total_supply(),
            self.state.total_weight()?,
            amount_out,
            self.state.swap_fee(),
            self.state.exit_fee(),
        )?;
        if pool_amount_in.is_zero() {
            return Err(AmmError::MathApproximation("pool amount in rounds to zero"));
        }
        if pool_amount_in > max_pool_amount_in {
            return Err(AmmError::LimitExceeded("pool amount in exceeds maximum"));
        }

        let reserve = self.skim().skim(before_fee, amount_out)?;

        let mut update = BalanceUpdate::begin(&self.state);
        update
            .debit(position, amount_out)?
            .divert(position, reserve)?
            .burn(pool_amount_in)?;
        let outcome = Self::single_asset_outcome(
            &update,
            position,
            record.token,
            amount_out,
            pool_amount_in,
            reserve,
        )?;

        update.commit(&mut self.state, &self.limits)?;
        debug!(
            token_out = %record.token,
            %amount_out,
            %pool_amount_in,
            %reserve,
            total_supply = %outcome.total_supply,
            "single-sided exit"
        );
        Ok(outcome)
    }

    fn total_supply(&self) -> Shares {
        self.state.total_supply()
    }
}
