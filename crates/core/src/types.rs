//! Domain types shared across the arbitrage engine.
//!
//! These mirror the entities of the data model: tradable assets, directed
//! markets (pairs), three-leg cycles (chains), order-book depth, and the
//! per-chain economic configuration the kernel consumes.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Opaque exchange-assigned handle for an asset (e.g. a BitShares-style
/// `"1.3.0"` object id). Treated as an interchangeable string on the wire.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct AssetId(pub String);

impl std::fmt::Display for AssetId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<String> for AssetId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<&str> for AssetId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

/// A tradable token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Asset {
    /// Uppercase ticker, e.g. "BTS".
    pub symbol: String,
    /// Exchange-assigned handle, resolved lazily.
    pub id: AssetId,
    /// Decimal places the exchange supports for this asset.
    pub precision: u32,
}

impl Asset {
    /// Creates a new asset, upper-casing the symbol.
    #[must_use]
    pub fn new(symbol: impl Into<String>, id: AssetId, precision: u32) -> Self {
        Self {
            symbol: symbol.into().to_uppercase(),
            id,
            precision,
        }
    }
}

/// A directed market: sell `base`, receive `quote`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Pair {
    pub base: Asset,
    pub quote: Asset,
}

impl Pair {
    /// Creates a pair, asserting `base != quote` by symbol.
    ///
    /// # Panics
    /// Panics if `base` and `quote` have the same symbol — callers are
    /// expected to validate chain input before constructing pairs.
    #[must_use]
    pub fn new(base: Asset, quote: Asset) -> Self {
        assert_ne!(base.symbol, quote.symbol, "pair base and quote must differ");
        Self { base, quote }
    }

    /// Renders as `BASE:QUOTE`, matching the chain input file format.
    #[must_use]
    pub fn as_chain_token(&self) -> String {
        format!("{}:{}", self.base.symbol, self.quote.symbol)
    }
}

/// An ordered triple of pairs forming a cycle: `P0.base -> P0.quote ==
/// P1.base -> P1.quote == P2.base -> P2.quote == P0.base`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Chain {
    pub pairs: [Pair; 3],
}

impl Chain {
    /// Builds a chain, checking the cycle-closure invariants.
    pub fn new(pairs: [Pair; 3]) -> Result<Self, ChainError> {
        let [p0, p1, p2] = &pairs;
        if p0.quote.symbol != p1.base.symbol {
            return Err(ChainError::Discontinuous {
                leg: 0,
                expected: p0.quote.symbol.clone(),
                found: p1.base.symbol.clone(),
            });
        }
        if p1.quote.symbol != p2.base.symbol {
            return Err(ChainError::Discontinuous {
                leg: 1,
                expected: p1.quote.symbol.clone(),
                found: p2.base.symbol.clone(),
            });
        }
        if p2.quote.symbol != p0.base.symbol {
            return Err(ChainError::Discontinuous {
                leg: 2,
                expected: p2.quote.symbol.clone(),
                found: p0.base.symbol.clone(),
            });
        }
        Ok(Self { pairs })
    }

    /// The first leg's base asset — the chain's unit of account for fees,
    /// limits, and profit thresholds.
    #[must_use]
    pub fn anchor_asset(&self) -> &Asset {
        &self.pairs[0].base
    }

    /// Every distinct asset symbol touched by this chain, in traversal order:
    /// `[leg0-base, leg0-quote, leg1-quote, leg2-quote]`.
    #[must_use]
    pub fn distinct_assets(&self) -> [&Asset; 4] {
        [
            &self.pairs[0].base,
            &self.pairs[0].quote,
            &self.pairs[1].quote,
            &self.pairs[2].quote,
        ]
    }

    /// Returns true if any of this chain's four assets appears in `blocked`.
    #[must_use]
    pub fn touches_any(&self, blocked: &std::collections::HashSet<String>) -> bool {
        self.distinct_assets()
            .iter()
            .any(|a| blocked.contains(&a.symbol))
    }
}

/// Chain-construction error: the three pairs don't close on themselves.
#[derive(Debug, thiserror::Error)]
pub enum ChainError {
    #[error("chain leg {leg} discontinuous: expected base '{expected}', found '{found}'")]
    Discontinuous {
        leg: u8,
        expected: String,
        found: String,
    },
}

/// One price level on one side of an order book.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct OrderLevel {
    pub price: Decimal,
    pub base_vol: Decimal,
    pub quote_vol: Decimal,
}

impl OrderLevel {
    #[must_use]
    pub fn new(price: Decimal, base_vol: Decimal, quote_vol: Decimal) -> Self {
        Self {
            price,
            base_vol,
            quote_vol,
        }
    }

    /// True if either side of this level is non-positive — an invalid level
    /// that must abort evaluation for the tick (spec §4.3 edge case).
    #[must_use]
    pub fn is_degenerate(&self) -> bool {
        self.price <= Decimal::ZERO || self.base_vol <= Decimal::ZERO || self.quote_vol <= Decimal::ZERO
    }
}

/// Up to *D* top ask levels for one pair, non-empty, non-decreasing in price.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DepthSlice {
    levels: Vec<OrderLevel>,
}

impl DepthSlice {
    /// Builds a depth slice. Returns `None` if `levels` is empty.
    #[must_use]
    pub fn new(levels: Vec<OrderLevel>) -> Option<Self> {
        if levels.is_empty() {
            None
        } else {
            Some(Self { levels })
        }
    }

    #[must_use]
    pub fn levels(&self) -> &[OrderLevel] {
        &self.levels
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.levels.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.levels.is_empty()
    }

    /// Cumulative (base, quote) volume through level `k` inclusive.
    #[must_use]
    pub fn cumulative(&self, k: usize) -> (Decimal, Decimal) {
        self.levels
            .iter()
            .take(k + 1)
            .fold((Decimal::ZERO, Decimal::ZERO), |(b, q), level| {
                (b + level.base_vol, q + level.quote_vol)
            })
    }

    /// Truncates to the shortest of the given slices, returning references
    /// aligned to the common length (spec §4.3: unequal-length alignment).
    #[must_use]
    pub fn align<'a>(slices: &'a [&'a DepthSlice; 3]) -> usize {
        slices.iter().map(|s| s.len()).min().unwrap_or(0)
    }
}

/// Per-chain economic configuration produced by the fee/limit provider.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChainContext {
    /// Minimum notional in the first leg's base asset below which an
    /// opportunity is ignored.
    pub asset_vol_limit: Decimal,
    /// Flat per-order protocol fee, pre-converted into the first leg's base
    /// asset units.
    pub network_fee: Decimal,
    /// Gateway fee rate applied to the received side of each leg.
    pub gateway_fees: [Decimal; 3],
    /// Profit floor in the first leg's base asset.
    pub min_profit: Decimal,
    /// Precisions for `[leg0-base, leg0-quote, leg1-quote, leg2-quote, leg0-base]`.
    pub precisions: [u32; 5],
    /// Assets whose pre-existing balance is treated as "already present"
    /// when measuring a leg's realized receive volume (spec §4.5, §9).
    pub core_assets: Vec<String>,
}

impl ChainContext {
    /// Returns true if `symbol` is configured as a core asset for this chain.
    #[must_use]
    pub fn is_core_asset(&self, symbol: &str) -> bool {
        self.core_assets.iter().any(|a| a == symbol)
    }
}

/// Kernel verdict: the three `(sell_in, receive_out)` volume pairs to submit,
/// plus the recomputed realized profit.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Opportunity {
    /// `(sell_volume, receive_volume)` for each of the three legs.
    pub legs: [(Decimal, Decimal); 3],
    /// Profit in the first leg's base asset, after truncation.
    pub profit: Decimal,
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn asset(sym: &str) -> Asset {
        Asset::new(sym, AssetId::from(sym), 5)
    }

    #[test]
    fn chain_requires_closed_cycle() {
        let p0 = Pair::new(asset("A"), asset("B"));
        let p1 = Pair::new(asset("B"), asset("C"));
        let p2 = Pair::new(asset("C"), asset("A"));
        assert!(Chain::new([p0, p1, p2]).is_ok());
    }

    #[test]
    fn chain_rejects_discontinuous_legs() {
        let p0 = Pair::new(asset("A"), asset("B"));
        let p1 = Pair::new(asset("X"), asset("C"));
        let p2 = Pair::new(asset("C"), asset("A"));
        assert!(Chain::new([p0, p1, p2]).is_err());
    }

    #[test]
    fn pair_rejects_equal_base_quote() {
        let result = std::panic::catch_unwind(|| Pair::new(asset("A"), asset("A")));
        assert!(result.is_err());
    }

    #[test]
    fn depth_slice_rejects_empty() {
        assert!(DepthSlice::new(vec![]).is_none());
    }

    #[test]
    fn depth_slice_cumulative_sums_levels() {
        let slice = DepthSlice::new(vec![
            OrderLevel::new(dec!(0.5), dec!(10), dec!(5)),
            OrderLevel::new(dec!(0.5), dec!(20), dec!(10)),
        ])
        .unwrap();
        assert_eq!(slice.cumulative(0), (dec!(10), dec!(5)));
        assert_eq!(slice.cumulative(1), (dec!(30), dec!(15)));
    }

    #[test]
    fn order_level_degenerate_on_zero() {
        assert!(OrderLevel::new(Decimal::ZERO, dec!(1), dec!(1)).is_degenerate());
        assert!(OrderLevel::new(dec!(1), Decimal::ZERO, dec!(1)).is_degenerate());
        assert!(!OrderLevel::new(dec!(1), dec!(1), dec!(1)).is_degenerate());
    }

    #[test]
    fn chain_touches_any_detects_blacklisted_asset() {
        let p0 = Pair::new(asset("A"), asset("B"));
        let p1 = Pair::new(asset("B"), asset("C"));
        let p2 = Pair::new(asset("C"), asset("A"));
        let chain = Chain::new([p0, p1, p2]).unwrap();

        let mut blocked = std::collections::HashSet::new();
        blocked.insert("C".to_string());
        assert!(chain.touches_any(&blocked));

        blocked.clear();
        blocked.insert("ZZZ".to_string());
        assert!(!chain.touches_any(&blocked));
    }
}
