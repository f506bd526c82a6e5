//! `FeeAndLimitProvider`: builds a `ChainContext` from configured fee/limit
//! tables and a chain's resolved assets (spec §4.2).
//!
//! Grounded in `original_source/src/core/bitsharesarbitrage.py::_get_specific_data`
//! for which config tables feed which `ChainContext` field, and in
//! `arbitrage-cross::fees::FeeCalculator` for the config-struct shape.

use rust_decimal::Decimal;
use std::collections::HashMap;
use triarb_core::{Asset, Chain, ChainContext};

/// Per-chain gateway fee rate, keyed by leg index.
pub type GatewayFees = [Decimal; 3];

/// Builds `ChainContext`s from the configured fee/limit/network-fee tables.
///
/// All three maps are keyed by asset symbol. `core_assets` is carried
/// straight through into every emitted `ChainContext` (spec §12 decision 2).
pub struct FeeAndLimitProvider {
    min_profit_limits: HashMap<String, Decimal>,
    vols_limits: HashMap<String, Decimal>,
    default_network_fee: HashMap<String, Decimal>,
    gateway_fees: HashMap<String, Decimal>,
    core_assets: Vec<String>,
}

impl FeeAndLimitProvider {
    #[must_use]
    pub fn new(
        min_profit_limits: HashMap<String, Decimal>,
        vols_limits: HashMap<String, Decimal>,
        default_network_fee: HashMap<String, Decimal>,
        gateway_fees: HashMap<String, Decimal>,
        core_assets: Vec<String>,
    ) -> Self {
        Self {
            min_profit_limits,
            vols_limits,
            default_network_fee,
            gateway_fees,
            core_assets,
        }
    }

    /// Builds the economic context for one chain, resolving fee/limit/
    /// profit entries against the chain's first-pair base asset and the
    /// per-leg quote assets for gateway fees.
    ///
    /// Missing entries default to zero rather than erroring: a chain with no
    /// configured floor simply has no floor, matching the original's
    /// `.get(asset, 0)` lookup style.
    #[must_use]
    pub fn build_context(&self, chain: &Chain, precisions: [u32; 5]) -> ChainContext {
        let anchor = chain.anchor_asset().symbol.clone();

        let asset_vol_limit = self.vols_limits.get(&anchor).copied().unwrap_or(Decimal::ZERO);
        let min_profit = self.min_profit_limits.get(&anchor).copied().unwrap_or(Decimal::ZERO);
        let network_fee = self.default_network_fee.get(&anchor).copied().unwrap_or(Decimal::ZERO);

        let gateway_fees: GatewayFees = [
            self.leg_fee(&chain.pairs[0].quote),
            self.leg_fee(&chain.pairs[1].quote),
            self.leg_fee(&chain.pairs[2].quote),
        ];

        ChainContext {
            asset_vol_limit,
            network_fee,
            gateway_fees,
            min_profit,
            precisions,
            core_assets: self.core_assets.clone(),
        }
    }

    fn leg_fee(&self, quote: &Asset) -> Decimal {
        self.gateway_fees.get(&quote.symbol).copied().unwrap_or(Decimal::ZERO)
    }
}

/// Derives the five-slot precisions array per spec §9's open question
/// decision: read directly from the four distinct assets a chain touches,
/// never by copying a neighboring slot.
///
/// Order: `[leg0-base, leg0-quote, leg1-quote, leg2-quote, leg0-base]`.
#[must_use]
pub fn derive_precisions(chain: &Chain) -> [u32; 5] {
    let assets = chain.distinct_assets();
    [
        assets[0].precision,
        assets[1].precision,
        assets[2].precision,
        assets[3].precision,
        assets[0].precision,
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use triarb_core::{AssetId, Pair};

    fn asset(sym: &str, precision: u32) -> Asset {
        Asset::new(sym, AssetId::from(sym), precision)
    }

    fn sample_chain() -> Chain {
        let p0 = Pair::new(asset("BTS", 5), asset("CNY", 4));
        let p1 = Pair::new(asset("CNY", 4), asset("USD", 4));
        let p2 = Pair::new(asset("USD", 4), asset("BTS", 5));
        Chain::new([p0, p1, p2]).unwrap()
    }

    #[test]
    fn derives_precisions_without_slot_duplication() {
        let chain = sample_chain();
        let precisions = derive_precisions(&chain);
        assert_eq!(precisions, [5, 4, 4, 4, 5]);
    }

    #[test]
    fn context_defaults_missing_entries_to_zero() {
        let provider = FeeAndLimitProvider::new(HashMap::new(), HashMap::new(), HashMap::new(), HashMap::new(), vec!["BTS".to_string()]);
        let chain = sample_chain();
        let ctx = provider.build_context(&chain, derive_precisions(&chain));
        assert_eq!(ctx.asset_vol_limit, Decimal::ZERO);
        assert_eq!(ctx.min_profit, Decimal::ZERO);
        assert_eq!(ctx.gateway_fees, [Decimal::ZERO; 3]);
    }

    #[test]
    fn context_resolves_per_leg_gateway_fees() {
        let mut gateway_fees = HashMap::new();
        gateway_fees.insert("CNY".to_string(), Decimal::new(1, 3));
        gateway_fees.insert("USD".to_string(), Decimal::new(2, 3));
        gateway_fees.insert("BTS".to_string(), Decimal::new(3, 3));

        let provider = FeeAndLimitProvider::new(HashMap::new(), HashMap::new(), HashMap::new(), gateway_fees, vec![]);
        let chain = sample_chain();
        let ctx = provider.build_context(&chain, derive_precisions(&chain));
        assert_eq!(ctx.gateway_fees, [Decimal::new(1, 3), Decimal::new(2, 3), Decimal::new(3, 3)]);
    }
}
