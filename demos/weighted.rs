//! Weighted pool walkthrough (Balancer style).
//!
//! Builds an 80/20 WETH/DAI pool with a swap fee and a protocol reserve
//! skim, then swaps, joins and exits it.  Pool operations log through
//! `tracing`; set `RUST_LOG=weighted_amm=debug` to see every step.
//!
//! # Run
//!
//! ```bash
//! cargo run --example weighted
//! ```

use tracing_subscriber::prelude::*;
use weighted_amm::prelude::*;

fn main() -> std::result::Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "weighted_amm=info,warn".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    println!("=== Weighted Pool AMM (Balancer style) ===\n");

    // ── 1. Configure ────────────────────────────────────────────────────
    //    0.3% swap fee; half of every fee goes to the protocol reserve.
    let config = PoolConfig::default()
        .with_swap_fee("0.003".parse()?)
        .with_reserve_ratio("0.5".parse()?);
    let mut pool = WeightedPool::from_config(&config)?;

    // ── 2. Bind tokens at 80/20 and finalize ────────────────────────────
    let weth = TokenAddress::from_symbol("WETH");
    let dai = TokenAddress::from_symbol("DAI");
    pool.bind(weth, Amount::from_int(1_000), Weight::from_int(40))?;
    pool.bind(dai, Amount::from_int(500_000), Weight::from_int(10))?;
    let supply = pool.finalize()?;

    println!("Pool finalized with {supply} shares");
    for token in pool.current_tokens() {
        println!(
            "  {token:<5} balance {:>12}  normalized weight {}",
            pool.get_balance(&token)?,
            pool.normalized_weight(&token)?
        );
    }

    // ── 3. Spot price ───────────────────────────────────────────────────
    println!("\nSpot price (DAI per WETH, no fee): {}", pool.spot_price_sans_fee(&dai, &weth)?);
    println!("Spot price (WETH per DAI, with fee): {}", pool.spot_price(&weth, &dai)?);

    // ── 4. Sell WETH for DAI ────────────────────────────────────────────
    let outcome =
        pool.swap_exact_amount_in(&weth, Amount::from_int(10), &dai, Amount::ZERO, Price::MAX)?;
    println!("\n--- Swap: sell 10 WETH ---\n  {outcome}");
    println!("  Effective price: {}", outcome.effective_price(Rounding::Up)?);

    // ── 5. Buy exactly 1 WETH with DAI ──────────────────────────────────
    let outcome =
        pool.swap_exact_amount_out(&dai, Amount::MAX, &weth, Amount::from_int(1), Price::MAX)?;
    println!("\n--- Swap: buy 1 WETH ---\n  {outcome}");

    // ── 6. Proportional join and exit ───────────────────────────────────
    let joined = pool.join_pool(Shares::from_int(5), &[Amount::MAX, Amount::MAX])?;
    println!("\n--- Join for 5 shares ---");
    for entry in &joined.amounts {
        println!("  paid {entry}");
    }
    let exited = pool.exit_pool(Shares::from_int(5), &[Amount::ZERO, Amount::ZERO])?;
    println!("--- Exit 5 shares ---");
    for entry in &exited.amounts {
        println!("  received {entry}");
    }

    // ── 7. Single-sided join with DAI ───────────────────────────────────
    let single = pool.joinswap_extern_amount_in(&dai, Amount::from_int(10_000), Shares::ZERO)?;
    println!("\n--- Single-sided join ---\n  {single}");

    // ── 8. Collect the protocol reserve ─────────────────────────────────
    println!("\nInvariant: {}", pool.invariant()?);
    for entry in pool.claim_reserves() {
        println!("Reserve claimed: {entry}");
    }

    Ok(())
}
