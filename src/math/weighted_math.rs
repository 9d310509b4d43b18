//! Closed-form pricing for weighted constant-product pools.
//!
//! Every function here is pure: it reads balances, weights, supply and
//! fees and returns the amount an operation would move.  Callers apply
//! the results through the pool's balance update.
//!
//! # Notation
//!
//! | Symbol | Meaning |
//! |--------|---------|
//! | `Bi`, `Bo` | balance of the token paid in / out |
//! | `wi`, `wo` | denormalized weight of the token paid in / out |
//! | `W` | sum of denormalized weights |
//! | `S` | total share supply |
//! | `f` | swap fee, `e` exit fee |
//!
//! Only weight ratios enter the swap formulas, so they take denormalized
//! weights directly and never round a normalized weight.
//!
//! # Rounding
//!
//! Each intermediate rounds in the direction that leaves the pool no
//! worse off: amounts paid out and shares minted come out low, amounts
//! paid in and shares burned come out high.

use super::pow::{bpow, pow_unbounded};
use super::Fixed;
use crate::domain::{Amount, Fraction, Price, Rounding, Shares, Weight};
use crate::error::AmmError;

// ---------------------------------------------------------------------------
// Shared helpers
// ---------------------------------------------------------------------------

/// `w / W`.
///
/// # Errors
///
/// Returns [`AmmError::DivisionByZero`] if `total_weight` is zero.
pub fn normalized_weight(
    weight: Weight,
    total_weight: Fixed,
    rounding: Rounding,
) -> Result<Fixed, AmmError> {
    weight.get().checked_div(&total_weight, rounding)
}

/// Share of the swap fee a single-sided flow pays: `(1 − w/W) · f`.
///
/// Only the portion of the deposit implicitly swapped into the other
/// tokens is charged.
fn single_sided_fee(normalized: Fixed, swap_fee: Fraction) -> Result<Fixed, AmmError> {
    normalized
        .complement()?
        .checked_mul_rounded(&swap_fee.get(), Rounding::Up)
}

fn amount(value: Fixed) -> Result<Amount, AmmError> {
    Amount::new(value).map_err(|_| AmmError::Underflow("negative token amount"))
}

fn shares(value: Fixed) -> Result<Shares, AmmError> {
    Shares::new(value).map_err(|_| AmmError::Underflow("negative share amount"))
}

fn fee_complement(fee: Fraction) -> Result<Fixed, AmmError> {
    let complement = fee.complement().get();
    if complement.is_zero() {
        return Err(AmmError::InvalidFee("fee of 100% leaves nothing to trade"));
    }
    Ok(complement)
}

// ---------------------------------------------------------------------------
// Spot price
// ---------------------------------------------------------------------------

/// Spot price of `token_out` in units of `token_in`, without fee:
/// `(Bi / wi) / (Bo / wo)`.
///
/// # Errors
///
/// Returns [`AmmError::DivisionByZero`] if `balance_out` is zero.
pub fn calc_spot_price_sans_fee(
    balance_in: Amount,
    weight_in: Weight,
    balance_out: Amount,
    weight_out: Weight,
) -> Result<Price, AmmError> {
    let numer = balance_in.get().checked_div(&weight_in.get(), Rounding::Down)?;
    let denom = balance_out.get().checked_div(&weight_out.get(), Rounding::Down)?;
    Price::new(numer.checked_div(&denom, Rounding::Down)?)
}

/// Fee-inclusive spot price: `(Bi / wi) / (Bo / wo) · 1 / (1 − f)`.
///
/// This is the marginal price a trader pays and the quantity swap price
/// limits are compared against.
///
/// # Errors
///
/// Returns [`AmmError::DivisionByZero`] if `balance_out` is zero and
/// [`AmmError::InvalidFee`] if `swap_fee` is `1`.
pub fn calc_spot_price(
    balance_in: Amount,
    weight_in: Weight,
    balance_out: Amount,
    weight_out: Weight,
    swap_fee: Fraction,
) -> Result<Price, AmmError> {
    let sans_fee = calc_spot_price_sans_fee(balance_in, weight_in, balance_out, weight_out)?;
    let scaled = sans_fee
        .get()
        .checked_div(&fee_complement(swap_fee)?, Rounding::Down)?;
    Price::new(scaled)
}

// ---------------------------------------------------------------------------
// Swaps
// ---------------------------------------------------------------------------

/// Tokens paid out for an exact input:
///
/// ```text
/// Ao = Bo · (1 − (Bi / (Bi + Ai·(1 − f)))^(wi/wo))
/// ```
///
/// # Errors
///
/// Propagates arithmetic and power-function errors.
pub fn calc_out_given_in(
    balance_in: Amount,
    weight_in: Weight,
    balance_out: Amount,
    weight_out: Weight,
    amount_in: Amount,
    swap_fee: Fraction,
) -> Result<Amount, AmmError> {
    let weight_ratio = weight_in.get().checked_div(&weight_out.get(), Rounding::Down)?;
    let adjusted_in = amount_in
        .get()
        .checked_mul_rounded(&swap_fee.complement().get(), Rounding::Down)?;
    let grown = balance_in.get().checked_add(&adjusted_in)?;
    let y = balance_in.get().checked_div(&grown, Rounding::Up)?;
    let foo = bpow(y, weight_ratio)?;
    let bar = foo.complement()?;
    amount(balance_out.get().checked_mul_rounded(&bar, Rounding::Down)?)
}

/// Tokens required to receive an exact output:
///
/// ```text
/// Ai = Bi · ((Bo / (Bo − Ao))^(wo/wi) − 1) / (1 − f)
/// ```
///
/// # Errors
///
/// - [`AmmError::Underflow`] if `amount_out >= balance_out`.
/// - [`AmmError::PowBaseOutOfRange`] if `amount_out` reaches half the
///   balance; the pool's output ratio limit rejects such trades first.
pub fn calc_in_given_out(
    balance_in: Amount,
    weight_in: Weight,
    balance_out: Amount,
    weight_out: Weight,
    amount_out: Amount,
    swap_fee: Fraction,
) -> Result<Amount, AmmError> {
    if amount_out >= balance_out {
        return Err(AmmError::Underflow("amount out exhausts the balance"));
    }
    let weight_ratio = weight_out.get().checked_div(&weight_in.get(), Rounding::Up)?;
    let remaining = balance_out.get().checked_sub(&amount_out.get())?;
    let y = balance_out.get().checked_div(&remaining, Rounding::Up)?;
    let foo = bpow(y, weight_ratio)?.checked_sub(&Fixed::ONE)?;
    let before_fee = balance_in.get().checked_mul_rounded(&foo, Rounding::Up)?;
    amount(before_fee.checked_div(&fee_complement(swap_fee)?, Rounding::Up)?)
}

// ---------------------------------------------------------------------------
// Single-sided joins
// ---------------------------------------------------------------------------

/// Part of a single-sided deposit that remains once the implicit swap fee
/// is charged: `Ai · (1 − (1 − wi/W)·f)`.
///
/// This is the amount a zero-fee pool would need for the same shares.
///
/// # Errors
///
/// Propagates arithmetic errors.
pub fn calc_single_in_after_fee(
    amount_in: Amount,
    weight_in: Weight,
    total_weight: Fixed,
    swap_fee: Fraction,
) -> Result<Amount, AmmError> {
    let nw = normalized_weight(weight_in, total_weight, Rounding::Down)?;
    let zaz = single_sided_fee(nw, swap_fee)?;
    amount(
        amount_in
            .get()
            .checked_mul_rounded(&zaz.complement()?, Rounding::Down)?,
    )
}

/// Shares minted for depositing `amount_in` of one token:
///
/// ```text
/// P = S · ((1 + Ai·(1 − (1 − wi/W)·f) / Bi)^(wi/W) − 1)
/// ```
///
/// # Errors
///
/// - [`AmmError::PowBaseOutOfRange`] if the deposit doubles the balance;
///   the pool's input ratio limit rejects such deposits first.
/// - Arithmetic errors otherwise.
pub fn calc_pool_out_given_single_in(
    balance_in: Amount,
    weight_in: Weight,
    pool_supply: Shares,
    total_weight: Fixed,
    amount_in: Amount,
    swap_fee: Fraction,
) -> Result<Shares, AmmError> {
    let nw = normalized_weight(weight_in, total_weight, Rounding::Down)?;
    let after_fee = calc_single_in_after_fee(amount_in, weight_in, total_weight, swap_fee)?;
    let new_balance = balance_in.get().checked_add(&after_fee.get())?;
    let token_ratio = new_balance.checked_div(&balance_in.get(), Rounding::Down)?;
    let pool_ratio = bpow(token_ratio, nw)?;
    let new_supply = pool_ratio.checked_mul_rounded(&pool_supply.get(), Rounding::Down)?;
    shares(new_supply.checked_sub(&pool_supply.get())?)
}

/// Tokens required to mint exactly `pool_out` shares with one token:
///
/// ```text
/// Ai = Bi · (((S + P) / S)^(W/wi) − 1) / (1 − (1 − wi/W)·f)
/// ```
///
/// Returns `(amount_in, fee_free_amount_in)`, the second being the
/// deposit a zero-fee pool would require.
///
/// # Errors
///
/// Propagates arithmetic and power-function errors.
pub fn calc_single_in_given_pool_out(
    balance_in: Amount,
    weight_in: Weight,
    pool_supply: Shares,
    total_weight: Fixed,
    pool_out: Shares,
    swap_fee: Fraction,
) -> Result<(Amount, Amount), AmmError> {
    let nw = normalized_weight(weight_in, total_weight, Rounding::Down)?;
    let new_supply = pool_supply.get().checked_add(&pool_out.get())?;
    let pool_ratio = new_supply.checked_div(&pool_supply.get(), Rounding::Up)?;
    let boo = Fixed::ONE.checked_div(&nw, Rounding::Up)?;
    let token_ratio = pow_unbounded(pool_ratio, boo)?;
    let new_balance = balance_in.get().checked_mul_rounded(&token_ratio, Rounding::Up)?;
    let after_fee = new_balance.checked_sub(&balance_in.get())?;

    let zar = single_sided_fee(nw, swap_fee)?;
    let amount_in = after_fee.checked_div(&zar.complement()?, Rounding::Up)?;
    Ok((amount(amount_in)?, amount(after_fee)?))
}

// ---------------------------------------------------------------------------
// Single-sided exits
// ---------------------------------------------------------------------------

/// Withdrawal before the implicit swap fee for a net payout of
/// `amount_out`: `Ao / (1 − (1 − wo/W)·f)`.
///
/// # Errors
///
/// Propagates arithmetic errors.
pub fn calc_single_out_before_fee(
    amount_out: Amount,
    weight_out: Weight,
    total_weight: Fixed,
    swap_fee: Fraction,
) -> Result<Amount, AmmError> {
    let nw = normalized_weight(weight_out, total_weight, Rounding::Up)?;
    let zar = single_sided_fee(nw, swap_fee)?;
    amount(amount_out.get().checked_div(&zar.complement()?, Rounding::Up)?)
}

/// Tokens paid out for burning `pool_in` shares into one token:
///
/// ```text
/// S' = S − P·(1 − e)
/// Ao = Bo · (1 − (S'/S)^(W/wo)) · (1 − (1 − wo/W)·f)
/// ```
///
/// Returns `(amount_out, amount_before_fee)`.
///
/// # Errors
///
/// - [`AmmError::Underflow`] if the burn consumes the whole supply.
/// - Arithmetic and power-function errors otherwise.
pub fn calc_single_out_given_pool_in(
    balance_out: Amount,
    weight_out: Weight,
    pool_supply: Shares,
    total_weight: Fixed,
    pool_in: Shares,
    swap_fee: Fraction,
    exit_fee: Fraction,
) -> Result<(Amount, Amount), AmmError> {
    let nw = normalized_weight(weight_out, total_weight, Rounding::Up)?;
    let burned = pool_in
        .get()
        .checked_mul_rounded(&exit_fee.complement().get(), Rounding::Down)?;
    let new_supply = pool_supply.get().checked_sub(&burned)?;
    if !new_supply.is_positive() {
        return Err(AmmError::Underflow("exit would burn the entire supply"));
    }
    let pool_ratio = new_supply.checked_div(&pool_supply.get(), Rounding::Up)?;
    let boo = Fixed::ONE.checked_div(&nw, Rounding::Down)?;
    let token_ratio = pow_unbounded(pool_ratio, boo)?;
    let new_balance = token_ratio.checked_mul_rounded(&balance_out.get(), Rounding::Up)?;
    let before_fee = balance_out.get().checked_sub(&new_balance)?;

    let zaz = single_sided_fee(nw, swap_fee)?;
    let amount_out = before_fee.checked_mul_rounded(&zaz.complement()?, Rounding::Down)?;
    Ok((amount(amount_out)?, amount(before_fee)?))
}

/// Shares burned for a net payout of exactly `amount_out` of one token:
///
/// ```text
/// A  = Ao / (1 − (1 − wo/W)·f)
/// P  = S · (1 − ((Bo − A) / Bo)^(wo/W)) / (1 − e)
/// ```
///
/// Returns `(pool_in, amount_before_fee)`.
///
/// # Errors
///
/// - [`AmmError::Underflow`] if the withdrawal exhausts the balance.
/// - [`AmmError::InvalidFee`] if `exit_fee` is `1`.
pub fn calc_pool_in_given_single_out(
    balance_out: Amount,
    weight_out: Weight,
    pool_supply: Shares,
    total_weight: Fixed,
    amount_out: Amount,
    swap_fee: Fraction,
    exit_fee: Fraction,
) -> Result<(Shares, Amount), AmmError> {
    let nw = normalized_weight(weight_out, total_weight, Rounding::Up)?;
    let before_fee = calc_single_out_before_fee(amount_out, weight_out, total_weight, swap_fee)?;
    if before_fee >= balance_out {
        return Err(AmmError::Underflow("amount out exhausts the balance"));
    }
    let new_balance = balance_out.get().checked_sub(&before_fee.get())?;
    let token_ratio = new_balance.checked_div(&balance_out.get(), Rounding::Down)?;
    let pool_ratio = bpow(token_ratio, nw)?;
    let new_supply = pool_ratio.checked_mul_rounded(&pool_supply.get(), Rounding::Down)?;
    let after_exit_fee = pool_supply.get().checked_sub(&new_supply)?;
    let pool_in = after_exit_fee.checked_div(&fee_complement(exit_fee)?, Rounding::Up)?;
    Ok((shares(pool_in)?, before_fee))
}

// ---------------------------------------------------------------------------
// Invariant
// ---------------------------------------------------------------------------

/// Bonding-curve value `V = Π Bt^(wt/W)` over `(balance, weight)` pairs.
///
/// # Errors
///
/// - [`AmmError::InvalidQuantity`] if a balance is zero.
/// - [`AmmError::DivisionByZero`] if the weights sum to zero.
pub fn calc_invariant<I>(tokens: I) -> Result<Fixed, AmmError>
where
    I: IntoIterator<Item = (Amount, Weight)> + Clone,
{
    let mut total_weight = Fixed::ZERO;
    for (_, weight) in tokens.clone() {
        total_weight = total_weight.checked_add(&weight.get())?;
    }

    let mut value = Fixed::ONE;
    for (balance, weight) in tokens {
        let nw = normalized_weight(weight, total_weight, Rounding::Down)?;
        let factor = pow_unbounded(balance.get(), nw)?;
        value = value.checked_mul(&factor)?;
    }
    Ok(value)
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use super::*;
    use crate::math::CheckedArithmetic;

    fn amt(s: &str) -> Amount {
        let Ok(v) = s.parse::<Amount>() else {
            panic!("valid amount {s}");
        };
        v
    }

    fn frac(s: &str) -> Fraction {
        let Ok(v) = s.parse::<Fraction>() else {
            panic!("valid fraction {s}");
        };
        v
    }

    fn rel_diff(actual: Fixed, expected: f64) -> f64 {
        ((actual.to_f64_lossy() - expected) / expected).abs()
    }

    const TOL: f64 = 1e-8;

    // 1:49 weights, 1000:1000 balances, 0.1% fee.
    fn weth() -> (Amount, Weight) {
        (Amount::from_int(1000), Weight::from_int(1))
    }

    fn dai() -> (Amount, Weight) {
        (Amount::from_int(1000), Weight::from_int(49))
    }

    fn total() -> Fixed {
        Fixed::from_int(50)
    }

    // -- Spot price ---------------------------------------------------------

    #[test]
    fn spot_price_equal_weights() {
        let Ok(p) = calc_spot_price_sans_fee(
            Amount::from_int(200),
            Weight::from_int(5),
            Amount::from_int(100),
            Weight::from_int(5),
        ) else {
            panic!("expected Ok");
        };
        assert_eq!(p.get(), Fixed::TWO);
    }

    #[test]
    fn spot_price_includes_fee() {
        let (bi, wi) = weth();
        let (bo, wo) = dai();
        let Ok(p) = calc_spot_price(bi, wi, bo, wo, frac("0.001")) else {
            panic!("expected Ok");
        };
        assert!(rel_diff(p.get(), 49.0 / 0.999) < 1e-12);
    }

    #[test]
    fn spot_price_zero_balance_out() {
        let result =
            calc_spot_price_sans_fee(Amount::from_int(1), Weight::from_int(1), Amount::ZERO, Weight::from_int(1));
        assert_eq!(result, Err(AmmError::DivisionByZero));
    }

    // -- Swaps --------------------------------------------------------------

    #[test]
    fn out_given_in_extreme_weights() {
        let (bi, wi) = weth();
        let (bo, wo) = dai();
        let Ok(out) = calc_out_given_in(bi, wi, bo, wo, Amount::from_int(500), frac("0.001"))
        else {
            panic!("expected Ok");
        };
        assert!(rel_diff(out.get(), 8.233_908_410_161_245) < TOL);
    }

    #[test]
    fn in_given_out_extreme_weights() {
        let (bi, wi) = weth();
        let (bo, wo) = dai();
        let Ok(inp) = calc_in_given_out(
            bi,
            wi,
            bo,
            wo,
            amt("333.333333333333333333"),
            frac("0.001"),
        ) else {
            panic!("expected Ok");
        };
        assert!(rel_diff(inp.get(), 425_506_505_648.348_073) < TOL);
    }

    #[test]
    fn equal_weights_match_constant_product() {
        // x·y = k with no fee: out = 100 · 10 / 110
        let Ok(out) = calc_out_given_in(
            Amount::from_int(100),
            Weight::from_int(10),
            Amount::from_int(100),
            Weight::from_int(10),
            Amount::from_int(10),
            Fraction::ZERO,
        ) else {
            panic!("expected Ok");
        };
        assert!(rel_diff(out.get(), 1000.0 / 110.0) < 1e-12);
    }

    #[test]
    fn in_given_out_rejects_full_drain() {
        let (bi, wi) = weth();
        let (bo, wo) = dai();
        let result = calc_in_given_out(bi, wi, bo, wo, bo, Fraction::ZERO);
        assert!(matches!(result, Err(AmmError::Underflow(_))));
    }

    #[test]
    fn swap_formulas_are_inverse() {
        let (bi, wi) = weth();
        let (bo, wo) = dai();
        let fee = frac("0.003");
        let Ok(out) = calc_out_given_in(bi, wi, bo, wo, Amount::from_int(100), fee) else {
            panic!("expected Ok");
        };
        let Ok(back) = calc_in_given_out(bi, wi, bo, wo, out, fee) else {
            panic!("expected Ok");
        };
        assert!(rel_diff(back.get(), 100.0) < 1e-7);
    }

    // -- Single-sided joins -------------------------------------------------

    #[test]
    fn pool_out_given_single_in_grows_supply_by_weighted_ratio() {
        let (bi, wi) = weth();
        let Ok(after_fee_factor) = frac("0.001").checked_mul(&frac("0.98")) else {
            panic!("expected Ok");
        };
        // deposit that grows the balance by 10% after fee
        let Ok(amount_in) =
            Amount::from_int(100).safe_div(&after_fee_factor.complement().get(), Rounding::Down)
        else {
            panic!("expected Ok");
        };
        let Ok(pool_out) = calc_pool_out_given_single_in(
            bi,
            wi,
            Shares::from_int(100),
            total(),
            amount_in,
            frac("0.001"),
        ) else {
            panic!("expected Ok");
        };
        let expected = 100.0 * (1.1_f64.powf(0.02) - 1.0);
        assert!(rel_diff(pool_out.get(), expected) < 1e-7);
    }

    #[test]
    fn single_in_round_trip() {
        let (bi, wi) = dai();
        let fee = frac("0.001");
        let supply = Shares::from_int(100);
        let Ok((amount_in, after_fee)) =
            calc_single_in_given_pool_out(bi, wi, supply, total(), Shares::from_int(1), fee)
        else {
            panic!("expected Ok");
        };
        assert!(after_fee < amount_in);
        let Ok(pool_out) = calc_pool_out_given_single_in(bi, wi, supply, total(), amount_in, fee)
        else {
            panic!("expected Ok");
        };
        assert!(rel_diff(pool_out.get(), 1.0) < TOL);
    }

    #[test]
    fn zero_fee_has_no_fee_portion() {
        let (bi, wi) = dai();
        let Ok((amount_in, after_fee)) = calc_single_in_given_pool_out(
            bi,
            wi,
            Shares::from_int(100),
            total(),
            Shares::from_int(1),
            Fraction::ZERO,
        ) else {
            panic!("expected Ok");
        };
        assert_eq!(amount_in, after_fee);
    }

    // -- Single-sided exits -------------------------------------------------

    #[test]
    fn single_out_round_trip() {
        let (bo, wo) = dai();
        let fee = frac("0.001");
        let supply = Shares::from_int(100);
        let Ok((pool_in, before_fee)) = calc_pool_in_given_single_out(
            bo,
            wo,
            supply,
            total(),
            Amount::from_int(1),
            fee,
            Fraction::ZERO,
        ) else {
            panic!("expected Ok");
        };
        assert!(before_fee > Amount::from_int(1));
        let Ok((amount_out, _)) = calc_single_out_given_pool_in(
            bo,
            wo,
            supply,
            total(),
            pool_in,
            fee,
            Fraction::ZERO,
        ) else {
            panic!("expected Ok");
        };
        assert!(rel_diff(amount_out.get(), 1.0) < TOL);
    }

    #[test]
    fn exit_fee_increases_shares_burned() {
        let (bo, wo) = dai();
        let supply = Shares::from_int(100);
        let quote = |exit_fee: Fraction| {
            calc_pool_in_given_single_out(
                bo,
                wo,
                supply,
                total(),
                Amount::from_int(10),
                Fraction::ZERO,
                exit_fee,
            )
        };
        let (Ok((without, _)), Ok((with, _))) = (quote(Fraction::ZERO), quote(frac("0.01"))) else {
            panic!("expected Ok");
        };
        assert!(with > without);
    }

    #[test]
    fn burning_whole_supply_is_rejected() {
        let (bo, wo) = dai();
        let result = calc_single_out_given_pool_in(
            bo,
            wo,
            Shares::from_int(100),
            total(),
            Shares::from_int(100),
            Fraction::ZERO,
            Fraction::ZERO,
        );
        assert!(matches!(result, Err(AmmError::Underflow(_))));
    }

    // -- Invariant ----------------------------------------------------------

    #[test]
    fn invariant_of_equal_balances_is_the_balance() {
        let Ok(v) = calc_invariant([weth(), dai()]) else {
            panic!("expected Ok");
        };
        assert!(rel_diff(v, 1000.0) < 1e-8);
    }

    #[test]
    fn invariant_weighted_geometric_mean() {
        let tokens = [
            (Amount::from_int(400), Weight::from_int(1)),
            (Amount::from_int(100), Weight::from_int(1)),
        ];
        let Ok(v) = calc_invariant(tokens) else {
            panic!("expected Ok");
        };
        assert!(rel_diff(v, 200.0) < 1e-8);
    }
}
