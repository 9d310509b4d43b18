//! # Weighted AMM
//!
//! Weighted constant-product pool engine (Balancer style): N tokens held
//! at fixed relative weights, closed-form pricing for swaps, proportional
//! and single-sided joins and exits, and a protocol reserve skimmed from
//! every fee.
//!
//! All quantities are deterministic `I80F48` fixed-point values; every
//! operation is all-or-nothing and reports failures through
//! [`AmmError`](error::AmmError).
//!
//! # Feature Flags
//!
//! | Feature | Default | Description |
//! |---------|---------|-------------|
//! | `serde` | no | `Serialize` / `Deserialize` for domain types, config and state |
//!
//! # Quick Start
//!
//! ```rust
//! use weighted_amm::prelude::*;
//!
//! let weth = TokenAddress::from_symbol("WETH");
//! let dai = TokenAddress::from_symbol("DAI");
//!
//! // 1. Configure: 0.3% swap fee, half of every fee to the reserve
//! let config = PoolConfig::default()
//!     .with_swap_fee("0.003".parse().expect("valid fee"))
//!     .with_reserve_ratio("0.5".parse().expect("valid ratio"));
//! let mut pool = WeightedPool::from_config(&config).expect("valid config");
//!
//! // 2. Bind tokens at an 80/20 weighting and open trading
//! pool.bind(weth, Amount::from_int(100), Weight::from_int(40)).expect("bound");
//! pool.bind(dai, Amount::from_int(100_000), Weight::from_int(10)).expect("bound");
//! pool.finalize().expect("finalized");
//!
//! // 3. Sell 1 WETH for DAI
//! let outcome = pool
//!     .swap_exact_amount_in(&weth, Amount::from_int(1), &dai, Amount::ZERO, Price::MAX)
//!     .expect("swap succeeded");
//! assert!(outcome.amount_out > Amount::ZERO);
//! assert!(outcome.spot_price_after > outcome.spot_price_before);
//!
//! // 4. Deposit 1% of the pool
//! let joined = pool
//!     .join_pool(Shares::from_int(1), &[Amount::MAX, Amount::MAX])
//!     .expect("join succeeded");
//! assert_eq!(joined.total_supply, Shares::from_int(101));
//! ```
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────┐
//! │   Consumer    │  PoolConfig + FromConfig, bind / finalize
//! └──────┬───────┘
//!        │ SwapPool + LiquidityPool traits
//!        ▼
//! ┌──────────────┐
//! │ WeightedPool  │  phase checks, limits, sanity checks
//! └──────┬───────┘
//!        │ price            │ stage + commit
//!        ▼                  ▼
//! ┌──────────────┐   ┌──────────────┐
//! │ weighted_math │   │ BalanceUpdate │ ◄── ReserveSkim
//! └──────┬───────┘   └──────┬───────┘
//!        │ bpow             │
//!        ▼                  ▼
//! ┌──────────────┐   ┌──────────────┐
//! │  math::pow    │   │  PoolState    │
//! └──────────────┘   └──────────────┘
//! ```
//!
//! # Module Guide
//!
//! | Module | Purpose |
//! |--------|---------|
//! | [`domain`] | Newtype value types: [`Amount`](domain::Amount), [`Shares`](domain::Shares), [`Weight`](domain::Weight), [`Price`](domain::Price), operation outcomes |
//! | [`traits`] | Core abstractions: [`SwapPool`](traits::SwapPool), [`LiquidityPool`](traits::LiquidityPool), [`FromConfig`](traits::FromConfig) |
//! | [`config`] | [`PoolConfig`](config::PoolConfig) fees and [`PoolLimits`](config::PoolLimits) |
//! | [`pools`]  | [`WeightedPool`](pools::WeightedPool) and its state, update and reserve pieces |
//! | [`math`]   | Fixed-point type, checked arithmetic, `bpow`, weighted pricing formulas |
//! | [`error`]  | [`AmmError`](error::AmmError) unified error enum |
//! | [`prelude`] | Convenience re-exports for common types and traits |

pub mod config;
pub mod domain;
pub mod error;
pub mod math;
pub mod pools;
pub mod prelude;
pub mod traits;
