//! Explicit rounding direction for fixed-point division.

/// Rounding direction for division on pool quantities.
///
/// Every division in the pricing engine names its direction so that
/// round-off always favours the pool:
///
/// | Quantity | Direction |
/// |----------|-----------|
/// | Token amount the pool receives | [`Rounding::Up`] |
/// | Token amount the pool pays out | [`Rounding::Down`] |
/// | Pool shares minted | [`Rounding::Down`] |
/// | Pool shares burned | [`Rounding::Up`] |
///
/// # Examples
///
/// ```
/// use weighted_amm::domain::Rounding;
///
/// assert!(Rounding::Up.is_up());
/// assert_eq!(Rounding::Up.opposite(), Rounding::Down);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Rounding {
    /// Round towards positive infinity (ceiling).
    Up,
    /// Round towards zero (floor).
    Down,
}

impl Rounding {
    /// Returns `true` if this is [`Rounding::Up`].
    #[must_use]
    pub const fn is_up(&self) -> bool {
        matches!(self, Self::Up)
    }

    /// Returns `true` if this is [`Rounding::Down`].
    #[must_use]
    pub const fn is_down(&self) -> bool {
        matches!(self, Self::Down)
    }

    /// Returns the other direction.
    #[must_use]
    pub const fn opposite(&self) -> Self {
        match self {
            Self::Up => Self::Down,
            Self::Down => Self::Up,
        }
    }
}
