//! Unified error types for the weighted AMM engine.
//!
//! All fallible operations across the crate return `AmmError` as their
//! error type.  Every error is raised *before* any pool state is mutated,
//! so a returned `Err` always means the pool is unchanged.

use thiserror::Error;

/// Convenience alias used throughout the crate.
pub type Result<T> = core::result::Result<T, AmmError>;

/// Errors produced by pool configuration, pricing and balance updates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum AmmError {
    /// Trading and liquidity operations require a finalized pool.
    #[error("pool is not finalized")]
    NotFinalized,

    /// Configuration changes are rejected once the pool is finalized.
    #[error("pool is already finalized")]
    AlreadyFinalized,

    /// A referenced token is not bound to the pool.
    #[error("invalid token: {0}")]
    InvalidToken(&'static str),

    /// `bind` was called for a token that is already bound.
    #[error("token is already bound")]
    TokenAlreadyBound,

    /// The computed output is below the caller's minimum.
    #[error("computed output is below the requested minimum")]
    InsufficientOutput,

    /// The computed input is above the caller's maximum.
    #[error("computed input exceeds the allowed maximum")]
    ExcessiveInput,

    /// A caller bound or a pool ratio limit was violated.
    #[error("limit exceeded: {0}")]
    LimitExceeded(&'static str),

    /// The spot price before or after a swap is above the caller's limit.
    #[error("price limit exceeded: {0}")]
    PriceLimitExceeded(&'static str),

    /// A post-trade sanity check failed; indicates numeric corruption.
    #[error("math approximation error: {0}")]
    MathApproximation(&'static str),

    /// Division by zero.
    #[error("division by zero")]
    DivisionByZero,

    /// Arithmetic overflow.
    #[error("arithmetic overflow: {0}")]
    Overflow(&'static str),

    /// A quantity that must stay non-negative went below zero.
    #[error("arithmetic underflow: {0}")]
    Underflow(&'static str),

    /// `bpow` was asked for a base outside the convergent range `(0, 2)`.
    #[error("power base must lie strictly between 0 and 2")]
    PowBaseOutOfRange,

    /// A token balance would fall below the pool minimum.
    #[error("token balance would fall below the pool minimum")]
    MinimumBalance,

    /// Pool configuration is inconsistent or out of range.
    #[error("invalid configuration: {0}")]
    InvalidConfiguration(&'static str),

    /// A fee or ratio is outside its allowed range.
    #[error("invalid fee: {0}")]
    InvalidFee(&'static str),

    /// A denormalized weight is outside its allowed range.
    #[error("invalid weight: {0}")]
    InvalidWeight(&'static str),

    /// A caller supplied quantity is malformed (zero, negative, unparsable).
    #[error("invalid quantity: {0}")]
    InvalidQuantity(&'static str),
}

impl AmmError {
    /// Returns `true` for errors that signal numeric corruption rather
    /// than a caller mistake.  These must never be retried.
    #[must_use]
    pub const fn is_fatal(&self) -> bool {
        matches!(self, Self::MathApproximation(_))
    }

    /// Returns `true` if the error is a violated caller-supplied bound.
    #[must_use]
    pub const fn is_limit_violation(&self) -> bool {
        matches!(
            self,
            Self::InsufficientOutput
                | Self::ExcessiveInput
                | Self::LimitExceeded(_)
                | Self::PriceLimitExceeded(_)
        )
    }
}
