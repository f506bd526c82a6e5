//! `OrderPlacer` (spec §4.5) and the per-chain `ChainExecutor` state machine
//! (spec §4.4).
//!
//! Grounded in `arbitrage-cross::executor::CrossExchangeExecutor::execute`
//! for the "free async function over local state, no shared mutable fields"
//! shape, and in `original_source/src/core/bitsharesarbitrage.py::_orders_setter`
//! for the sequential three-leg balance-delta mechanics.

use rust_decimal::Decimal;
use std::time::Duration;
use tokio::time::Instant;
use triarb_core::decimal::{format_plain, truncate};
use triarb_core::{ArbError, Chain, ChainContext, Opportunity};
use triarb_exchange::{ExchangeClient, OrderSide};

use crate::blacklist::Blacklist;
use crate::gate::ExecutionGate;
use crate::kernel;

/// Per-leg connection pair: `market` serves read-only RPCs (order book,
/// balances) against `node_uri`, `wallet` submits orders against
/// `wallet_uri`. Mirrors `original_source/src/core/bitsharesarbitrage.py`'s
/// `_orders_setter`, which opens `Order` objects on `self.wallet_uri` and
/// `Account` objects on `self.node_uri` side by side.
pub struct LegConnections {
    pub market: ExchangeClient,
    pub wallet: ExchangeClient,
}

impl LegConnections {
    async fn close(&self) {
        self.market.close().await;
        self.wallet.close().await;
    }
}

/// Outcome of one `OrderPlacer::place` call.
#[derive(Debug)]
pub enum ExecutionOutcome {
    /// All three legs filled. Carries the realized first-leg-in / last-leg-out
    /// volumes and profit, for the profit log.
    Completed {
        first_leg_in: Decimal,
        last_leg_out: Decimal,
        profit: Decimal,
    },
    /// A leg was rejected fill-or-kill; remaining legs were not submitted.
    Partial { failed_at_leg: u8, pair: String },
}

/// Executes the three legs of `opportunity` sequentially, one client per
/// pair, enrolling authorized-asset rejections into `blacklist`.
///
/// # Errors
/// Returns `UnknownOrderException` (propagated, not recoverable) or any
/// transport-level `ArbError` from the underlying clients.
pub async fn place(
    chain: &Chain,
    opportunity: &Opportunity,
    clients: [&LegConnections; 3],
    ctx: &ChainContext,
    blacklist: &Blacklist,
) -> Result<ExecutionOutcome, ArbError> {
    let pairs = &chain.pairs;
    let (v0_in, v0_out) = opportunity.legs[0];

    tracing::info!(
        pair = %pairs[0].as_chain_token(),
        sell = %format_plain(v0_in),
        "submitting leg 0"
    );

    let balance_before_leg0 = clients[0].market.get_account_balance(&pairs[0].quote).await?;
    let leg0_price = price_for(v0_in, v0_out);
    if let Err(e) = clients[0]
        .wallet
        .create_market_order(&pairs[0].base, &pairs[0].quote, OrderSide::Sell, v0_in, leg0_price)
        .await
    {
        return handle_leg_failure(0, &pairs[0].as_chain_token(), &pairs[0].quote.symbol, e, blacklist).await;
    }

    let realized_v1_in =
        realized_receive(&clients[0].market, &pairs[0].quote, balance_before_leg0, ctx, ctx.precisions[1]).await?;

    tracing::info!(
        pair = %pairs[1].as_chain_token(),
        sell = %format_plain(realized_v1_in),
        "submitting leg 1"
    );

    let (_, v1_out) = opportunity.legs[1];
    let balance_before_leg1 = clients[1].market.get_account_balance(&pairs[1].quote).await?;
    let leg1_price = price_for(realized_v1_in, v1_out);
    if let Err(e) = clients[1]
        .wallet
        .create_market_order(&pairs[1].base, &pairs[1].quote, OrderSide::Sell, realized_v1_in, leg1_price)
        .await
    {
        return handle_leg_failure(1, &pairs[1].as_chain_token(), &pairs[1].quote.symbol, e, blacklist).await;
    }

    let realized_v2_in =
        realized_receive(&clients[1].market, &pairs[1].quote, balance_before_leg1, ctx, ctx.precisions[2]).await?;

    tracing::info!(
        pair = %pairs[2].as_chain_token(),
        sell = %format_plain(realized_v2_in),
        "submitting leg 2"
    );

    let (_, v2_out) = opportunity.legs[2];
    let leg2_price = price_for(realized_v2_in, v2_out);
    if let Err(e) = clients[2]
        .wallet
        .create_market_order(&pairs[2].base, &pairs[2].quote, OrderSide::Sell, realized_v2_in, leg2_price)
        .await
    {
        return handle_leg_failure(2, &pairs[2].as_chain_token(), &pairs[2].quote.symbol, e, blacklist).await;
    }

    let profit = v2_out - v0_in - ctx.network_fee;
    tracing::info!(
        profit = %format_plain(profit),
        first_leg_in = %format_plain(v0_in),
        last_leg_out = %format_plain(v2_out),
        "chain fully executed"
    );

    Ok(ExecutionOutcome::Completed {
        first_leg_in: v0_in,
        last_leg_out: v2_out,
        profit,
    })
}

async fn handle_leg_failure(
    leg: u8,
    pair: &str,
    asset_symbol: &str,
    error: ArbError,
    blacklist: &Blacklist,
) -> Result<ExecutionOutcome, ArbError> {
    match error {
        ArbError::OrderNotFilled { pair } => {
            tracing::warn!(pair = %pair, leg, "order not filled, aborting remaining legs");
            Ok(ExecutionOutcome::Partial { failed_at_leg: leg, pair })
        }
        ArbError::AuthorizedAsset { asset } => {
            tracing::warn!(asset = %asset, leg, "asset requires authorization, blacklisting");
            if let Err(io_err) = blacklist.insert(&asset) {
                tracing::error!(asset = %asset, error = %io_err, "failed to persist blacklist entry");
            }
            Ok(ExecutionOutcome::Partial {
                failed_at_leg: leg,
                pair: pair.to_string(),
            })
        }
        other @ ArbError::UnknownOrderException(_) => {
            tracing::error!(pair, asset = asset_symbol, leg, error = %other, "unknown order exception, propagating");
            Err(other)
        }
        other => Err(other),
    }
}

/// Converts a balance delta (or raw balance, for non-core assets) into the
/// sell-volume for the next leg, per spec §4.5 step 2. `get_account_balance`
/// already scales the exchange's raw integer balance down by the asset's
/// precision (spec §4.1), so the delta computed here is already in decimal
/// units; `precision` is only needed for the final truncation.
async fn realized_receive(
    client: &ExchangeClient,
    asset: &triarb_core::Asset,
    balance_before: Decimal,
    ctx: &ChainContext,
    precision: u32,
) -> Result<Decimal, ArbError> {
    let balance_after = client.get_account_balance(asset).await?;
    let realized = if ctx.is_core_asset(&asset.symbol) && !balance_before.is_zero() {
        balance_after - balance_before
    } else {
        balance_after
    };
    Ok(truncate(realized, precision))
}

fn price_for(sell: Decimal, receive: Decimal) -> Decimal {
    if sell.is_zero() {
        Decimal::ZERO
    } else {
        receive / sell
    }
}

/// Per-chain poll/execute loop (spec §4.4). Owns the three `LegConnections`
/// (six sockets total: one market + one wallet connection per leg)
/// exclusively for the lifetime of the task; runs until the configured
/// data-update horizon elapses or a fatal error occurs.
pub async fn run_chain(
    chain: Chain,
    ctx: ChainContext,
    clients: [LegConnections; 3],
    gate: ExecutionGate,
    blacklist: std::sync::Arc<Blacklist>,
    depth: u32,
    horizon: Duration,
) -> Result<(), ArbError> {
    if chain.touches_any(&blacklist.snapshot()) {
        tracing::debug!(chain = ?chain.pairs.iter().map(|p| p.as_chain_token()).collect::<Vec<_>>(), "chain touches a blacklisted asset, skipping");
        for client in &clients {
            client.close().await;
        }
        return Ok(());
    }

    let start = Instant::now();

    loop {
        if start.elapsed() >= horizon {
            tracing::debug!("chain data-update horizon elapsed, tearing down for refresh");
            break;
        }

        let poll = tokio::try_join!(
            fetch_depth(&clients[0].market, &chain.pairs[0].base, &chain.pairs[0].quote, depth),
            fetch_depth(&clients[1].market, &chain.pairs[1].base, &chain.pairs[1].quote, depth),
            fetch_depth(&clients[2].market, &chain.pairs[2].base, &chain.pairs[2].quote, depth),
        );

        let (d0, d1, d2) = match poll {
            Ok(slices) => slices,
            Err(ArbError::EmptyOrdersList { pair }) => {
                tracing::debug!(pair, "empty order book, tearing down chain for this cycle");
                break;
            }
            Err(e) => return Err(e),
        };

        if let Some(opportunity) = kernel::evaluate([&d0, &d1, &d2], &ctx) {
            if let Some(_guard) = gate.try_acquire() {
                let clients_ref = [&clients[0], &clients[1], &clients[2]];
                match place(&chain, &opportunity, clients_ref, &ctx, &blacklist).await {
                    Ok(ExecutionOutcome::Completed { profit, .. }) => {
                        tracing::info!(profit = %format_plain(profit), "cycle complete");
                    }
                    Ok(ExecutionOutcome::Partial { failed_at_leg, pair }) => {
                        tracing::warn!(failed_at_leg, pair, "cycle partially executed");
                    }
                    Err(e) => return Err(e),
                }
            } else {
                tracing::debug!("execution gate busy, skipping this tick's opportunity");
            }
        }
    }

    for client in &clients {
        client.close().await;
    }
    Ok(())
}

async fn fetch_depth(
    client: &ExchangeClient,
    base: &triarb_core::Asset,
    quote: &triarb_core::Asset,
    depth: u32,
) -> Result<triarb_core::DepthSlice, ArbError> {
    client.get_order_book(base, quote, depth).await
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn price_for_is_zero_when_sell_is_zero() {
        assert_eq!(price_for(Decimal::ZERO, Decimal::ONE), Decimal::ZERO);
    }

    #[test]
    fn price_for_divides_receive_by_sell() {
        assert_eq!(price_for(Decimal::new(2, 0), Decimal::ONE), Decimal::new(5, 1));
    }
}
