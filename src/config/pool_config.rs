//! Configuration for weighted pools.

use crate::domain::{Amount, Fraction, Shares, Weight};
use crate::error::AmmError;
use crate::math::Fixed;

/// Raw bits of `1.0` in the fixed-point representation.
const ONE_BITS: i128 = Fixed::ONE.to_bits();

/// Numeric bounds a pool enforces on bindings, balances and trade sizes.
///
/// | Limit | Default |
/// |-------|---------|
/// | `min_bound_tokens` / `max_bound_tokens` | 2 / 8 |
/// | `min_weight` / `max_weight` | 1 / 50 |
/// | `max_total_weight` | 50 |
/// | `min_balance` | 1e-12 |
/// | `max_in_ratio` | 1/2 of the input balance |
/// | `max_out_ratio` | 1/3 of the output balance |
/// | `initial_supply` | 100 shares |
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PoolLimits {
    /// Fewest tokens a pool may be finalized with.
    pub min_bound_tokens: usize,
    /// Most tokens a pool may bind.
    pub max_bound_tokens: usize,
    /// Smallest denormalized weight accepted at bind time.
    pub min_weight: Weight,
    /// Largest denormalized weight accepted at bind time.
    pub max_weight: Weight,
    /// Upper bound on the sum of denormalized weights.
    pub max_total_weight: Fixed,
    /// Smallest balance any token may be left with.
    pub min_balance: Amount,
    /// Largest input, as a fraction of the input balance, for swaps and
    /// single-sided joins.
    pub max_in_ratio: Fraction,
    /// Largest output, as a fraction of the output balance, for swaps and
    /// single-sided exits.
    pub max_out_ratio: Fraction,
    /// Shares minted to the controller on finalize.
    pub initial_supply: Shares,
}

impl PoolLimits {
    /// Validates internal consistency of the limits.
    ///
    /// # Errors
    ///
    /// - [`AmmError::InvalidConfiguration`] if token counts, weight bounds
    ///   or trade ratios are inconsistent, or the minimum balance or
    ///   initial supply is zero.
    pub fn validate(&self) -> Result<(), AmmError> {
        if self.min_bound_tokens < 2 {
            return Err(AmmError::InvalidConfiguration(
                "a pool needs at least 2 tokens",
            ));
        }
        if self.min_bound_tokens > self.max_bound_tokens {
            return Err(AmmError::InvalidConfiguration(
                "min_bound_tokens exceeds max_bound_tokens",
            ));
        }
        if self.min_weight > self.max_weight {
            return Err(AmmError::InvalidConfiguration(
                "min_weight exceeds max_weight",
            ));
        }
        if self.max_weight.get() > self.max_total_weight {
            return Err(AmmError::InvalidConfiguration(
                "max_weight exceeds max_total_weight",
            ));
        }
        if self.min_balance.is_zero() {
            return Err(AmmError::InvalidConfiguration(
                "min_balance must be positive",
            ));
        }
        if self.max_in_ratio.is_zero() || self.max_out_ratio.is_zero() {
            return Err(AmmError::InvalidConfiguration(
                "trade ratio limits must be positive",
            ));
        }
        if !self.max_out_ratio.is_below_one() {
            return Err(AmmError::InvalidConfiguration(
                "max_out_ratio must leave a balance behind",
            ));
        }
        if self.initial_supply.is_zero() {
            return Err(AmmError::InvalidConfiguration(
                "initial_supply must be positive",
            ));
        }
        Ok(())
    }
}

impl Default for PoolLimits {
    fn default() -> Self {
        Self {
            min_bound_tokens: 2,
            max_bound_tokens: 8,
            min_weight: Weight::from_int(1),
            max_weight: Weight::from_int(50),
            max_total_weight: Fixed::from_int(50),
            min_balance: Amount::saturating_new(Fixed::from_bits(ONE_BITS / 1_000_000_000_000)),
            max_in_ratio: Fraction::saturating_new(Fixed::from_bits(ONE_BITS / 2)),
            // one ulp above a third so that a literal third of the balance passes
            max_out_ratio: Fraction::saturating_new(Fixed::from_bits(ONE_BITS / 3 + 1)),
            initial_supply: Shares::from_int(100),
        }
    }
}

/// Configuration of a weighted pool: fees, reserve skim and limits.
///
/// Fees and the reserve ratio can also be changed on the pool itself
/// until it is finalized.
///
/// # Validation
///
/// - `swap_fee` and `exit_fee` lie in `[0, 1)`.
/// - `reserve_ratio` lies in `[0, 1]` (guaranteed by [`Fraction`]).
/// - [`PoolLimits::validate`] passes.
///
/// # Examples
///
/// ```
/// use weighted_amm::config::PoolConfig;
///
/// let config = PoolConfig::default()
///     .with_swap_fee("0.001".parse().unwrap_or_default())
///     .with_reserve_ratio("0.5".parse().unwrap_or_default());
/// assert!(config.validate().is_ok());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PoolConfig {
    swap_fee: Fraction,
    exit_fee: Fraction,
    reserve_ratio: Fraction,
    limits: PoolLimits,
}

impl PoolConfig {
    /// Creates a validated configuration with default limits.
    ///
    /// # Errors
    ///
    /// - [`AmmError::InvalidFee`] if either fee is `1`.
    pub fn new(
        swap_fee: Fraction,
        exit_fee: Fraction,
        reserve_ratio: Fraction,
    ) -> Result<Self, AmmError> {
        let config = Self {
            swap_fee,
            exit_fee,
            reserve_ratio,
            limits: PoolLimits::default(),
        };
        config.validate()?;
        Ok(config)
    }

    /// Replaces the swap fee.
    #[must_use]
    pub const fn with_swap_fee(mut self, swap_fee: Fraction) -> Self {
        self.swap_fee = swap_fee;
        self
    }

    /// Replaces the exit fee.
    #[must_use]
    pub const fn with_exit_fee(mut self, exit_fee: Fraction) -> Self {
        self.exit_fee = exit_fee;
        self
    }

    /// Replaces the reserve ratio.
    #[must_use]
    pub const fn with_reserve_ratio(mut self, reserve_ratio: Fraction) -> Self {
        self.reserve_ratio = reserve_ratio;
        self
    }

    /// Replaces the limits.
    #[must_use]
    pub const fn with_limits(mut self, limits: PoolLimits) -> Self {
        self.limits = limits;
        self
    }

    /// Validates all configuration invariants.
    ///
    /// # Errors
    ///
    /// - [`AmmError::InvalidFee`] if either fee is `1`.
    /// - [`AmmError::InvalidConfiguration`] from [`PoolLimits::validate`].
    pub fn validate(&self) -> Result<(), AmmError> {
        if !self.swap_fee.is_below_one() {
            return Err(AmmError::InvalidFee("swap fee must be below 100%"));
        }
        if !self.exit_fee.is_below_one() {
            return Err(AmmError::InvalidFee("exit fee must be below 100%"));
        }
        self.limits.validate()
    }

    /// Returns the swap fee.
    #[must_use]
    pub const fn swap_fee(&self) -> Fraction {
        self.swap_fee
    }

    /// Returns the exit fee.
    #[must_use]
    pub const fn exit_fee(&self) -> Fraction {
        self.exit_fee
    }

    /// Returns the reserve ratio.
    #[must_use]
    pub const fn reserve_ratio(&self) -> Fraction {
        self.reserve_ratio
    }

    /// Returns the limits.
    #[must_use]
    pub const fn limits(&self) -> &PoolLimits {
        &self.limits
    }
}

impl Default for PoolConfig {
    /// A swap fee of `1e-6`, no exit fee, no reserve skim and default
    /// limits.
    fn default() -> Self {
        Self {
            swap_fee: Fraction::saturating_new(Fixed::from_bits(ONE_BITS / 1_000_000)),
            exit_fee: Fraction::ZERO,
            reserve_ratio: Fraction::ZERO,
            limits: PoolLimits::default(),
        }
    }
}
