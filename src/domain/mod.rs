//! Domain value types used throughout the pool engine.
//!
//! Every quantity is a validated newtype over [`Fixed`](crate::math::Fixed):
//! token amounts, pool shares, weights, fractions and prices.  Operation
//! results are plain structs carrying the amounts moved and the state
//! after the operation.

mod amount;
mod fraction;
mod liquidity_outcome;
mod price;
mod rounding;
mod shares;
mod swap_outcome;
mod token_address;
mod weight;

pub use amount::Amount;
pub use fraction::Fraction;
pub use liquidity_outcome::{JoinExitOutcome, SingleAssetOutcome, TokenAmount};
pub use price::Price;
pub use rounding::Rounding;
pub use shares::Shares;
pub use swap_outcome::SwapOutcome;
pub use token_address::TokenAddress;
pub use weight::Weight;
