//! The arbitrage kernel (spec §4.3): a pure function from three ask-side
//! depth slices and a `ChainContext` to either *no opportunity* or the three
//! `(sell, receive)` volume pairs to submit plus the realized profit.
//!
//! Grounded in `arbitrage-cross::detector`'s shape (a pure, config-driven,
//! `Option<Opportunity>`-returning function with no internal state) and in
//! `original_source/libs/algorithms/bitsharesarbitrage.py::run_chain_data_thorough_algo`
//! for the forward-clamp-then-back-propagate volume walk.

use rust_decimal::Decimal;
use triarb_core::{decimal::truncate, ChainContext, DepthSlice, Opportunity};

/// Evaluates one chain tick. Returns `None` if no level clears
/// `asset_vol_limit` and `min_profit` after fees, or if any considered level
/// is degenerate (spec §4.3 edge cases).
///
/// Step A screens candidate levels with a cheap forward-rate estimate; Step C
/// recomputes profit from the truncated volumes actually selected and is the
/// authoritative accept/reject decision.
#[must_use]
pub fn evaluate(depths: [&DepthSlice; 3], ctx: &ChainContext) -> Option<Opportunity> {
    let aligned_len = DepthSlice::align(&depths);
    if aligned_len == 0 {
        return None;
    }

    let chosen_level = select_level(depths, ctx, aligned_len)?;
    reconcile(depths, ctx, chosen_level)
}

/// Step A: picks the deepest level whose compounded fee-adjusted rate beats
/// 1 and whose estimated notional profit clears `min_profit`, bailing out
/// entirely if any level up to the deepest considered is degenerate.
fn select_level(depths: [&DepthSlice; 3], ctx: &ChainContext, aligned_len: usize) -> Option<usize> {
    let mut chosen = None;

    for k in 0..aligned_len {
        let levels = [depths[0].levels()[k], depths[1].levels()[k], depths[2].levels()[k]];
        if levels.iter().any(triarb_core::OrderLevel::is_degenerate) {
            return None;
        }

        let (cum_b0, _) = depths[0].cumulative(k);
        if cum_b0 < ctx.asset_vol_limit {
            continue;
        }

        let rate = Decimal::ONE / (levels[0].price * levels[1].price * levels[2].price);
        let fee_mult = (Decimal::ONE - ctx.gateway_fees[0]) * (Decimal::ONE - ctx.gateway_fees[1]) * (Decimal::ONE - ctx.gateway_fees[2]);
        let adjusted_rate = rate * fee_mult;
        if adjusted_rate <= Decimal::ONE {
            continue;
        }

        let estimated_profit = cum_b0 * (adjusted_rate - Decimal::ONE) - ctx.network_fee;
        if estimated_profit <= ctx.min_profit {
            continue;
        }

        chosen = Some(k);
    }

    chosen
}

/// Step B + C: chains each leg's realized volume into the next leg's input —
/// leg 1 sells exactly what leg 0 delivered, leg 2 exactly what leg 1
/// delivered — clamping against each leg's own book capacity and
/// back-propagating a leg-1 shortfall all the way to leg 0's required sell
/// amount, mirroring `run_chain_data_thorough_algo`'s `quote0`/`base1` and
/// `quote1`/`base2` clamp pair. Truncates to asset precision and recomputes
/// the final profit from the truncated, chained volumes.
fn reconcile(depths: [&DepthSlice; 3], ctx: &ChainContext, k: usize) -> Option<Opportunity> {
    let (cum_b0, cum_q0) = depths[0].cumulative(k);
    let (cum_b1, cum_q1) = depths[1].cumulative(k);
    let (cum_b2, cum_q2) = depths[2].cumulative(k);

    let p0 = depths[0].levels()[k].price;
    let p1 = depths[1].levels()[k].price;
    let p2 = depths[2].levels()[k].price;

    let fee0_mult = Decimal::ONE - ctx.gateway_fees[0];
    let fee1_mult = Decimal::ONE - ctx.gateway_fees[1];
    let fee2_mult = Decimal::ONE - ctx.gateway_fees[2];

    // `base_i`/`quote_i` mirror the original's working state: base_i is what
    // leg i would need to sell, quote_i what it delivers net of its gateway
    // fee. Both start at each leg's own book capacity, then get clamped down
    // (never up) as the chain is walked.
    let mut base0 = cum_b0;
    let mut quote0 = cum_q0 * fee0_mult;
    let mut base1 = cum_b1;
    let mut quote1 = cum_q1 * fee1_mult;
    let mut base2 = cum_b2;
    let mut quote2 = cum_q2 * fee2_mult;

    if quote0 > base1 {
        // Leg 1 can't absorb all of leg 0's output: shrink leg 0's delivery
        // to leg 1's capacity and recompute the sell amount that produces it.
        quote0 = base1;
        base0 = quote0 * p0;
    } else if quote0 < base1 {
        // Leg 1 has spare capacity: it only ever sees what leg 0 delivers.
        base1 = quote0;
        quote1 = ((base1 / p1) * fee1_mult).min(cum_q1 * fee1_mult);
    }

    if quote1 > base2 {
        // Leg 2 can't absorb all of leg 1's (possibly just-recomputed)
        // output: shrink it, then cascade the shortfall back through leg 1's
        // required input and leg 0's required sell amount.
        quote1 = base2;
        base1 = quote1 * p1;
        quote0 = base1;
        base0 = quote0 * p0;
    } else if quote1 < base2 {
        base2 = quote1;
        quote2 = ((base2 / p2) * fee2_mult).min(cum_q2 * fee2_mult);
    }

    let v0_in = truncate(base0, ctx.precisions[0]);
    let v0_out = truncate(quote0, ctx.precisions[1]);
    let v1_in = truncate(quote0, ctx.precisions[1]);
    let v1_out = truncate(quote1, ctx.precisions[2]);
    let v2_in = truncate(quote1, ctx.precisions[2]);
    let v2_out = truncate(quote2, ctx.precisions[3]);

    let profit = v2_out - v0_in - ctx.network_fee;
    if profit < ctx.min_profit {
        return None;
    }

    Some(Opportunity {
        legs: [(v0_in, v0_out), (v1_in, v1_out), (v2_in, v2_out)],
        profit,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;
    use triarb_core::OrderLevel;

    fn flat_slice(price: Decimal, base_vol: Decimal, quote_vol: Decimal, levels: usize) -> DepthSlice {
        DepthSlice::new(vec![OrderLevel::new(price, base_vol, quote_vol); levels]).unwrap()
    }

    fn zero_fee_ctx(precisions: [u32; 5]) -> ChainContext {
        ChainContext {
            asset_vol_limit: Decimal::ZERO,
            network_fee: Decimal::ZERO,
            gateway_fees: [Decimal::ZERO; 3],
            min_profit: Decimal::ZERO,
            precisions,
            core_assets: vec![],
        }
    }

    #[test]
    fn finds_opportunity_when_cycle_rate_exceeds_one() {
        // p0 * p1 * p2 = 0.125 clears the Step A screen. Leg 1's book base
        // capacity (500) is the only binding clamp: leg 0's delivery shrinks
        // to it, and legs 1/2 have ample depth to pass the rest through
        // untouched, so the chain realizes a genuine profit end to end.
        let d0 = flat_slice(dec!(0.5), dec!(1000), dec!(2000), 1);
        let d1 = flat_slice(dec!(0.5), dec!(500), dec!(5000), 1);
        let d2 = flat_slice(dec!(0.5), dec!(5000), dec!(5000), 1);
        let ctx = zero_fee_ctx([2, 2, 2, 2, 2]);

        let result = evaluate([&d0, &d1, &d2], &ctx);
        let opportunity = result.expect("chained volumes should clear min_profit");
        assert_eq!(opportunity.profit, dec!(4750));
        assert_eq!(opportunity.legs[0], (dec!(250), dec!(500)));
        assert_eq!(opportunity.legs[2].1, dec!(5000));
    }

    #[test]
    fn rejects_when_rate_does_not_clear_one_after_fees() {
        let d0 = flat_slice(dec!(1.0), dec!(100), dec!(100), 1);
        let d1 = flat_slice(dec!(1.0), dec!(100), dec!(100), 1);
        let d2 = flat_slice(dec!(1.0), dec!(100), dec!(100), 1);
        let mut ctx = zero_fee_ctx([2, 2, 2, 2, 2]);
        ctx.gateway_fees = [dec!(0.01), dec!(0.01), dec!(0.01)];

        assert!(evaluate([&d0, &d1, &d2], &ctx).is_none());
    }

    #[test]
    fn rejects_when_asset_vol_limit_unmet_at_every_level() {
        let d0 = flat_slice(dec!(0.2), dec!(10), dec!(2), 1);
        let d1 = flat_slice(dec!(0.2), dec!(10), dec!(2), 1);
        let d2 = flat_slice(dec!(0.2), dec!(10), dec!(2), 1);
        let mut ctx = zero_fee_ctx([2, 2, 2, 2, 2]);
        ctx.asset_vol_limit = dec!(1000);

        assert!(evaluate([&d0, &d1, &d2], &ctx).is_none());
    }

    #[test]
    fn aborts_on_degenerate_level() {
        let degenerate = DepthSlice::new(vec![OrderLevel::new(Decimal::ZERO, dec!(1), dec!(1))]).unwrap();
        let ok = flat_slice(dec!(0.4), dec!(100), dec!(40), 1);
        let ctx = zero_fee_ctx([2, 2, 2, 2, 2]);

        assert!(evaluate([&degenerate, &ok, &ok], &ctx).is_none());
    }

    #[test]
    fn unequal_length_slices_align_to_shortest() {
        let short = flat_slice(dec!(0.4), dec!(1000), dec!(400), 1);
        let long = flat_slice(dec!(0.4), dec!(1000), dec!(400), 5);
        let ctx = zero_fee_ctx([2, 2, 2, 2, 2]);

        let from_short = evaluate([&short, &long, &long], &ctx);
        let from_long = evaluate([&long, &long, &long], &ctx);
        assert_eq!(from_short.is_some(), from_long.is_some());
    }

    #[test]
    fn profit_is_monotone_non_increasing_in_gateway_fees() {
        let d0 = flat_slice(dec!(0.4), dec!(1000), dec!(400), 1);
        let d1 = flat_slice(dec!(0.4), dec!(1000), dec!(400), 1);
        let d2 = flat_slice(dec!(0.4), dec!(1000), dec!(400), 1);

        let low_fee_ctx = zero_fee_ctx([2, 2, 2, 2, 2]);
        let mut high_fee_ctx = low_fee_ctx.clone();
        high_fee_ctx.gateway_fees = [dec!(0.05), dec!(0.05), dec!(0.05)];

        let low = evaluate([&d0, &d1, &d2], &low_fee_ctx);
        let high = evaluate([&d0, &d1, &d2], &high_fee_ctx);

        let low_profit = low.map(|o| o.profit).unwrap_or(Decimal::ZERO);
        let high_profit = high.map(|o| o.profit).unwrap_or(Decimal::ZERO);
        assert!(high_profit <= low_profit);
    }

    #[test]
    fn truncation_never_increases_emitted_volume() {
        let d0 = flat_slice(dec!(0.4), dec!(1000), dec!(400), 1);
        let d1 = flat_slice(dec!(0.4), dec!(1000), dec!(400), 1);
        let d2 = flat_slice(dec!(0.4), dec!(1000), dec!(400), 1);
        let ctx = zero_fee_ctx([0, 0, 0, 0, 0]);

        if let Some(opportunity) = evaluate([&d0, &d1, &d2], &ctx) {
            for (sell, receive) in opportunity.legs {
                assert_eq!(sell, truncate(sell, 0));
                assert_eq!(receive, truncate(receive, 0));
            }
        }
    }
}
