//! Property-based tests for the weighted pool.
//!
//! 1. **Swap reversibility**: A→B→A returns at most the original input.
//! 2. **Invariant growth**: swaps never shrink `Π Bt^(wt/W)`, and leave it
//!    unchanged when the swap fee is zero.
//! 3. **Price movement**: buying a token raises its spot price and the
//!    effective price is never below the pre-trade spot price.
//! 4. **Exact-in / exact-out agreement**: quoting one direction and
//!    executing the other lands on the same amounts.
//! 5. **Liquidity conservation**: joins and exits move every token in the
//!    same proportion and keep `V` per share, join then exit returns at
//!    most the deposit, and a single-sided join then exit likewise.
//! 6. **Atomicity**: a rejected operation leaves the pool unchanged.
//! 7. **`bpow` accuracy** against `f64::powf`.
//!
//! Cases the pool rejects for a violated bound are discarded; any other
//! error fails the case.

use proptest::prelude::*;

use crate::config::PoolConfig;
use crate::domain::{
    Amount, Fraction, JoinExitOutcome, Price, Rounding, Shares, TokenAddress, Weight,
};
use crate::error::AmmError;
use crate::math::{bpow, Fixed};
use crate::traits::{FromConfig, LiquidityPool, SwapPool};

use super::WeightedPool;

// ---------------------------------------------------------------------------
// Shared helpers
// ---------------------------------------------------------------------------

fn tok_a() -> TokenAddress {
    TokenAddress::from_symbol("AAA")
}

fn tok_b() -> TokenAddress {
    TokenAddress::from_symbol("BBB")
}

fn per_mille(n: u64) -> Fraction {
    let Ok(value) = Fixed::from_ratio(n, 1_000) else {
        panic!("valid ratio");
    };
    let Ok(fraction) = Fraction::new(value) else {
        panic!("valid fraction");
    };
    fraction
}

fn amount_of(value: Fixed) -> Amount {
    let Ok(amount) = Amount::new(value) else {
        panic!("non-negative amount");
    };
    amount
}

#[derive(Debug, Clone, Copy)]
struct Setup {
    balance_a: u64,
    balance_b: u64,
    weight_a: u64,
    weight_b: u64,
    fee_per_mille: u64,
    reserve_per_mille: u64,
}

fn make_pool(setup: Setup) -> WeightedPool {
    let config = PoolConfig::default()
        .with_swap_fee(per_mille(setup.fee_per_mille))
        .with_reserve_ratio(per_mille(setup.reserve_per_mille));
    let Ok(mut pool) = WeightedPool::from_config(&config) else {
        panic!("valid config");
    };
    let Ok(()) = pool.bind(
        tok_a(),
        Amount::from_int(setup.balance_a),
        Weight::from_int(setup.weight_a),
    ) else {
        panic!("bind A");
    };
    let Ok(()) = pool.bind(
        tok_b(),
        Amount::from_int(setup.balance_b),
        Weight::from_int(setup.weight_b),
    ) else {
        panic!("bind B");
    };
    let Ok(_) = pool.finalize() else {
        panic!("finalize");
    };
    pool
}

/// Passes `Ok` through, discards bound violations and fails on the rest.
fn settle<T>(result: Result<T, AmmError>) -> Result<T, TestCaseError> {
    match result {
        Ok(value) => Ok(value),
        Err(err) if err.is_limit_violation() => Err(TestCaseError::reject(err.to_string())),
        Err(err) => Err(TestCaseError::fail(format!("unexpected error: {err}"))),
    }
}

/// Fails the case on any error.
fn must<T>(result: Result<T, AmmError>) -> Result<T, TestCaseError> {
    result.map_err(|err| TestCaseError::fail(format!("unexpected error: {err}")))
}

fn paid(outcome: &JoinExitOutcome, token: &TokenAddress) -> Result<f64, TestCaseError> {
    outcome
        .amount_of(token)
        .map(|amount| amount.get().to_f64_lossy())
        .ok_or_else(|| TestCaseError::fail(format!("no amount for {token}")))
}

/// `V / total_supply`.
fn value_per_share(pool: &WeightedPool) -> Result<f64, TestCaseError> {
    let value = must(pool.invariant())?.to_f64_lossy();
    Ok(value / pool.total_supply().get().to_f64_lossy())
}

fn rel_gap(a: f64, b: f64) -> f64 {
    ((a - b) / b).abs()
}

// ---------------------------------------------------------------------------
// Strategies
// ---------------------------------------------------------------------------

fn setup_strategy() -> impl Strategy<Value = Setup> {
    (
        1_000_u64..1_000_000,
        1_000_u64..1_000_000,
        1_u64..=25,
        1_u64..=25,
        prop::sample::select(vec![1_u64, 3, 10, 30]),
        prop::sample::select(vec![0_u64, 200, 500, 1_000]),
    )
        .prop_map(
            |(balance_a, balance_b, weight_a, weight_b, fee_per_mille, reserve_per_mille)| Setup {
                balance_a,
                balance_b,
                weight_a,
                weight_b,
                fee_per_mille,
                reserve_per_mille,
            },
        )
}

fn fee_free_setup_strategy() -> impl Strategy<Value = Setup> {
    setup_strategy().prop_map(|setup| Setup {
        fee_per_mille: 0,
        ..setup
    })
}

/// Trade size as a fraction of the input balance, in per-mille.
fn trade_strategy() -> impl Strategy<Value = u64> {
    1_u64..=300
}

fn slice(balance: u64, per_mille_of: u64) -> Amount {
    let Ok(value) = Fixed::from_ratio(balance.saturating_mul(per_mille_of), 1_000) else {
        panic!("valid ratio");
    };
    amount_of(value)
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    // -- 1. Swap reversibility ------------------------------------------------

    #[test]
    fn prop_swap_round_trip_loses_value(
        setup in setup_strategy(),
        trade in trade_strategy(),
    ) {
        let mut pool = make_pool(setup);
        let swap_in = slice(setup.balance_a, trade);

        let forward = settle(
            pool.swap_exact_amount_in(&tok_a(), swap_in, &tok_b(), Amount::ZERO, Price::MAX),
        )?;
        let back = settle(pool.swap_exact_amount_in(
            &tok_b(),
            forward.amount_out,
            &tok_a(),
            Amount::ZERO,
            Price::MAX,
        ))?;

        prop_assert!(
            back.amount_out <= swap_in,
            "round-trip should lose value: final={} > original={}",
            back.amount_out, swap_in
        );
    }

    // -- 2. Invariant growth --------------------------------------------------

    #[test]
    fn prop_swap_does_not_shrink_invariant(
        setup in setup_strategy(),
        trade in trade_strategy(),
    ) {
        let mut pool = make_pool(setup);
        let before = must(pool.invariant())?.to_f64_lossy();
        let swap_in = slice(setup.balance_a, trade);
        settle(pool.swap_exact_amount_in(&tok_a(), swap_in, &tok_b(), Amount::ZERO, Price::MAX))?;
        let after = must(pool.invariant())?.to_f64_lossy();

        prop_assert!(
            after >= before * (1.0 - 1e-9),
            "invariant shrank: before={} after={}",
            before, after
        );
    }

    #[test]
    fn prop_fee_free_swap_keeps_invariant(
        setup in fee_free_setup_strategy(),
        trade in trade_strategy(),
    ) {
        let mut pool = make_pool(setup);
        let before = must(pool.invariant())?.to_f64_lossy();
        let swap_in = slice(setup.balance_a, trade);
        let outcome = settle(
            pool.swap_exact_amount_in(&tok_a(), swap_in, &tok_b(), Amount::ZERO, Price::MAX),
        )?;
        prop_assert_eq!(outcome.reserve, Amount::ZERO);
        let after = must(pool.invariant())?.to_f64_lossy();

        prop_assert!(
            rel_gap(after, before) < 1e-9,
            "fee-free swap moved the invariant: before={} after={}",
            before, after
        );
    }

    // -- 3. Price movement ----------------------------------------------------

    #[test]
    fn prop_swap_moves_price_against_trader(
        setup in setup_strategy(),
        trade in trade_strategy(),
    ) {
        let mut pool = make_pool(setup);
        let swap_in = slice(setup.balance_a, trade);
        let outcome = settle(
            pool.swap_exact_amount_in(&tok_a(), swap_in, &tok_b(), Amount::ZERO, Price::MAX),
        )?;

        prop_assert!(outcome.spot_price_after >= outcome.spot_price_before);
        let effective = must(outcome.effective_price(Rounding::Up))?;
        prop_assert!(outcome.spot_price_before <= effective);
        prop_assert_eq!(pool.spot_price(&tok_a(), &tok_b()), Ok(outcome.spot_price_after));
    }

    // -- 4. Exact-in / exact-out agreement -----------------------------------

    #[test]
    fn prop_exact_in_and_exact_out_agree(
        setup in setup_strategy(),
        trade in 1_u64..=200,
    ) {
        let pool = make_pool(setup);
        let amount_out = slice(setup.balance_b, trade);

        let mut quote = pool.clone();
        let exact_out = settle(
            quote.swap_exact_amount_out(&tok_a(), Amount::MAX, &tok_b(), amount_out, Price::MAX),
        )?;

        let mut check = pool.clone();
        let exact_in = settle(check.swap_exact_amount_in(
            &tok_a(),
            exact_out.amount_in,
            &tok_b(),
            Amount::ZERO,
            Price::MAX,
        ))?;

        let wanted = amount_out.get().to_f64_lossy();
        let got = exact_in.amount_out.get().to_f64_lossy();
        prop_assert!(
            rel_gap(got, wanted) < 1e-8,
            "exact-in returned {} for an exact-out of {}",
            got, wanted
        );
    }

    // -- 5. Liquidity conservation --------------------------------------------

    #[test]
    fn prop_join_then_exit_returns_at_most_deposit(
        setup in setup_strategy(),
        shares in 1_u64..=50,
    ) {
        let mut pool = make_pool(setup);
        let pool_amount = Shares::from_int(shares);
        let joined = must(pool.join_pool(pool_amount, &[Amount::MAX, Amount::MAX]))?;
        let exited = must(pool.exit_pool(pool_amount, &[Amount::ZERO, Amount::ZERO]))?;

        prop_assert_eq!(pool.total_supply(), Shares::from_int(100));
        for token in [tok_a(), tok_b()] {
            let deposited = paid(&joined, &token)?;
            let withdrawn = paid(&exited, &token)?;
            prop_assert!(
                withdrawn <= deposited,
                "exit returned more than the join took for {}: {} > {}",
                token, withdrawn, deposited
            );
        }
    }

    #[test]
    fn prop_join_is_proportional(
        setup in setup_strategy(),
        shares in 1_u64..=50,
    ) {
        let mut pool = make_pool(setup);
        let joined = must(pool.join_pool(Shares::from_int(shares), &[Amount::MAX, Amount::MAX]))?;

        let ratio_a = paid(&joined, &tok_a())? / setup.balance_a as f64;
        let ratio_b = paid(&joined, &tok_b())? / setup.balance_b as f64;
        let expected = shares as f64 / 100.0;
        prop_assert!(rel_gap(ratio_a, expected) < 1e-9);
        prop_assert!(rel_gap(ratio_b, expected) < 1e-9);
    }

    #[test]
    fn prop_exit_is_proportional(
        setup in setup_strategy(),
        shares in 1_u64..=50,
    ) {
        let mut pool = make_pool(setup);
        let exited = must(pool.exit_pool(Shares::from_int(shares), &[Amount::ZERO, Amount::ZERO]))?;

        let ratio_a = paid(&exited, &tok_a())? / setup.balance_a as f64;
        let ratio_b = paid(&exited, &tok_b())? / setup.balance_b as f64;
        let expected = shares as f64 / 100.0;
        prop_assert!(rel_gap(ratio_a, expected) < 1e-9, "A ratio {} vs {}", ratio_a, expected);
        prop_assert!(rel_gap(ratio_b, expected) < 1e-9, "B ratio {} vs {}", ratio_b, expected);
        prop_assert_eq!(pool.total_supply(), Shares::from_int(100 - shares));
    }

    #[test]
    fn prop_proportional_liquidity_keeps_value_per_share(
        setup in setup_strategy(),
        shares in 1_u64..=50,
    ) {
        let mut pool = make_pool(setup);
        let start = value_per_share(&pool)?;

        must(pool.join_pool(Shares::from_int(shares), &[Amount::MAX, Amount::MAX]))?;
        let after_join = value_per_share(&pool)?;
        prop_assert!(
            rel_gap(after_join, start) < 1e-9,
            "join moved V per share: {} -> {}",
            start, after_join
        );

        must(pool.exit_pool(Shares::from_int(shares), &[Amount::ZERO, Amount::ZERO]))?;
        let after_exit = value_per_share(&pool)?;
        prop_assert!(
            rel_gap(after_exit, start) < 1e-9,
            "exit moved V per share: {} -> {}",
            start, after_exit
        );
    }

    #[test]
    fn prop_single_sided_round_trip_loses_value(
        setup in setup_strategy(),
        trade in 1_u64..=300,
    ) {
        let mut pool = make_pool(setup);
        let amount_in = slice(setup.balance_a, trade);
        let joined = settle(pool.joinswap_extern_amount_in(&tok_a(), amount_in, Shares::ZERO))?;
        let exited = settle(pool.exitswap_pool_amount_in(&tok_a(), joined.pool_amount, Amount::ZERO))?;

        prop_assert!(
            exited.token_amount <= amount_in,
            "single-sided round-trip gained: {} > {}",
            exited.token_amount, amount_in
        );
    }

    #[test]
    fn prop_oversized_share_requests_hit_limits(
        setup in setup_strategy(),
        shares_per_mille in 501_u64..1_000,
    ) {
        let mut pool = make_pool(setup);
        let pristine = pool.clone();
        let Ok(pool_amount) = Fixed::from_ratio(shares_per_mille, 10) else {
            return Err(TestCaseError::fail("valid ratio"));
        };
        let Ok(pool_amount) = Shares::new(pool_amount) else {
            return Err(TestCaseError::fail("non-negative shares"));
        };

        for token in [tok_a(), tok_b()] {
            let joined = pool.joinswap_pool_amount_out(&token, pool_amount, Amount::MAX);
            prop_assert!(
                matches!(joined, Err(AmmError::LimitExceeded(_))),
                "join of {} shares: {:?}", pool_amount, joined
            );
            let exited = pool.exitswap_pool_amount_in(&token, pool_amount, Amount::ZERO);
            prop_assert!(
                matches!(exited, Err(AmmError::LimitExceeded(_))),
                "exit of {} shares: {:?}", pool_amount, exited
            );
        }
        prop_assert_eq!(&pool, &pristine);
    }

    // -- 6. Atomicity ---------------------------------------------------------

    #[test]
    fn prop_rejected_operations_leave_pool_unchanged(
        setup in setup_strategy(),
        trade in 501_u64..=900,
    ) {
        let mut pool = make_pool(setup);
        let pristine = pool.clone();

        // above the max in ratio
        let oversized = slice(setup.balance_a, trade);
        let result =
            pool.swap_exact_amount_in(&tok_a(), oversized, &tok_b(), Amount::ZERO, Price::MAX);
        prop_assert!(matches!(result, Err(AmmError::LimitExceeded(_))), "{:?}", result);
        prop_assert_eq!(&pool, &pristine);

        // unreachable minimum output
        let small = slice(setup.balance_a, 10);
        let result = pool.swap_exact_amount_in(&tok_a(), small, &tok_b(), Amount::MAX, Price::MAX);
        prop_assert!(result.as_ref().is_err_and(AmmError::is_limit_violation), "{:?}", result);
        prop_assert_eq!(&pool, &pristine);

        // burning the whole supply
        prop_assert!(pool
            .exit_pool(Shares::from_int(100), &[Amount::ZERO, Amount::ZERO])
            .is_err());
        prop_assert_eq!(&pool, &pristine);
    }

    // -- 7. bpow accuracy -----------------------------------------------------

    #[test]
    fn prop_bpow_matches_float(
        base_per_mille in 500_u64..1_950,
        exp_per_mille in 0_u64..3_000,
    ) {
        let (Ok(base), Ok(exp)) = (
            Fixed::from_ratio(base_per_mille, 1_000),
            Fixed::from_ratio(exp_per_mille, 1_000),
        ) else {
            return Err(TestCaseError::fail("valid ratios"));
        };
        let result = must(bpow(base, exp))?;

        let expected = base.to_f64_lossy().powf(exp.to_f64_lossy());
        let actual = result.to_f64_lossy();
        prop_assert!(
            rel_gap(actual, expected) < 1e-9,
            "bpow({}, {}) = {}, expected {}",
            base, exp, actual, expected
        );
    }
}
