//! Outcomes of joins and exits.

use core::fmt;

use super::{Amount, Shares, TokenAddress};

/// A token paired with an amount moved for it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TokenAmount {
    /// Token moved.
    pub token: TokenAddress,
    /// Amount moved.
    pub amount: Amount,
}

impl fmt::Display for TokenAmount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.amount, self.token)
    }
}

/// Result of a proportional [`join_pool`] or [`exit_pool`].
///
/// `amounts` follows the pool's bind order.
///
/// [`join_pool`]: crate::traits::LiquidityPool::join_pool
/// [`exit_pool`]: crate::traits::LiquidityPool::exit_pool
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct JoinExitOutcome {
    /// Shares minted (join) or burned (exit).
    pub pool_amount: Shares,
    /// Per-token amounts paid in (join) or out (exit).
    pub amounts: Vec<TokenAmount>,
    /// Share supply after the operation.
    pub total_supply: Shares,
}

impl JoinExitOutcome {
    /// Amount moved for `token`, if it took part.
    #[must_use]
    pub fn amount_of(&self, token: &TokenAddress) -> Option<Amount> {
        self.amounts
            .iter()
            .find(|entry| entry.token == *token)
            .map(|entry| entry.amount)
    }
}

/// Result of a single-sided join or exit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SingleAssetOutcome {
    /// Token paid in or out.
    pub token: TokenAddress,
    /// Token amount paid in (join) or out (exit).
    pub token_amount: Amount,
    /// Shares minted (join) or burned (exit).
    pub pool_amount: Shares,
    /// Amount diverted to the protocol reserve.
    pub reserve: Amount,
    /// Pool balance of `token` after the operation.
    pub balance_after: Amount,
    /// Share supply after the operation.
    pub total_supply: Shares,
}

impl fmt::Display for SingleAssetOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "SingleAssetOutcome({} {}, shares={}, reserve={})",
            self.token_amount, self.token, self.pool_amount, self.reserve
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn amount_of_finds_token() {
        let weth = TokenAddress::from_symbol("WETH");
        let dai = TokenAddress::from_symbol("DAI");
        let outcome = JoinExitOutcome {
            pool_amount: Shares::from_int(1),
            amounts: vec![
                TokenAmount { token: weth, amount: Amount::from_int(10) },
                TokenAmount { token: dai, amount: Amount::from_int(20) },
            ],
            total_supply: Shares::from_int(101),
        };
        assert_eq!(outcome.amount_of(&dai), Some(Amount::from_int(20)));
        assert_eq!(outcome.amount_of(&TokenAddress::from_symbol("MKR")), None);
    }

    #[test]
    fn token_amount_display() {
        let entry = TokenAmount {
            token: TokenAddress::from_symbol("DAI"),
            amount: Amount::from_int(5),
        };
        assert_eq!(entry.to_string(), "5 DAI");
    }
}
