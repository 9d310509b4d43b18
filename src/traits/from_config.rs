//! Generic construction trait for pool instantiation from configuration.
//!
//! # Validation Contract
//!
//! Implementations **must** validate the configuration during
//! construction.  A successfully constructed pool is in a valid initial
//! state: for weighted pools that means empty and configurable, with
//! fees inside `[0, 1)` and consistent limits.

use crate::error::AmmError;

/// Builds a pool from a configuration.
///
/// There is no blanket implementation; each pool implements the trait for
/// its own configuration type.
pub trait FromConfig<C> {
    /// Creates a new pool instance from the given configuration.
    ///
    /// # Errors
    ///
    /// - [`AmmError::InvalidConfiguration`] if a limit is inconsistent.
    /// - [`AmmError::InvalidFee`] if a fee is out of range.
    fn from_config(config: &C) -> Result<Self, AmmError>
    where
        Self: Sized;
}
