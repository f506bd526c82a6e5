//! Top-level cycle loop: loads chains and contexts, reloads the blacklist,
//! spawns one `ChainExecutor` task per chain, and awaits them all (spec §2,
//! §4.4, §5).
//!
//! Grounded in `original_source/src/core/bitsharesarbitrage.py::start_arbitrage`
//! for the reconnect-sleep-retry shape, kept a thin free function here (the
//! teacher splits a thin `cli::main` from crate-level orchestration logic,
//! e.g. `bot-orchestrator`).

use std::io;
use std::path::Path;
use std::sync::Arc;
use triarb_core::{Asset, ArbError, Chain, Pair};
use triarb_exchange::ExchangeClient;

use crate::blacklist::Blacklist;
use crate::executor::{run_chain, LegConnections};
use crate::fees::{derive_precisions, FeeAndLimitProvider};
use crate::gate::ExecutionGate;

/// Parses the chain input file: one chain per line, pairs comma-separated,
/// each pair `BASE:QUOTE` (spec §6 "Chain input file").
///
/// Assets are created with a placeholder id/precision; `ExchangeClient`
/// resolution during `ChainExecutor::INIT` fills in the real values.
///
/// # Errors
/// Returns an I/O error if the file cannot be read.
pub fn load_chains(path: impl AsRef<Path>) -> io::Result<Vec<Chain>> {
    let contents = std::fs::read_to_string(path)?;
    let mut chains = Vec::new();

    for line in contents.lines().map(str::trim).filter(|l| !l.is_empty()) {
        let mut pairs = Vec::with_capacity(3);
        for token in line.split(',') {
            let Some((base, quote)) = token.trim().split_once(':') else {
                tracing::warn!(line, "skipping chain line with malformed pair token");
                continue;
            };
            pairs.push(Pair::new(placeholder_asset(base), placeholder_asset(quote)));
        }

        if pairs.len() != 3 {
            tracing::warn!(line, "skipping chain line without exactly three pairs");
            continue;
        }

        match Chain::new([pairs[0].clone(), pairs[1].clone(), pairs[2].clone()]) {
            Ok(chain) => chains.push(chain),
            Err(e) => tracing::warn!(line, error = %e, "skipping discontinuous chain"),
        }
    }

    Ok(chains)
}

fn placeholder_asset(symbol: &str) -> Asset {
    Asset::new(symbol.to_uppercase(), triarb_core::AssetId::from(symbol.to_uppercase()), 0)
}

/// Runs cycles forever. Each cycle: reload the blacklist, resolve asset
/// precisions, build contexts, connect clients, spawn executors, await them.
/// On `ClientConnectionError` sleeps `reconnect_interval` and retries
/// without incrementing the cycle counter.
///
/// # Errors
/// Propagates any non-connection error from chain loading.
pub async fn run(
    node_uri: &str,
    wallet_uri: &str,
    account_id: &str,
    account_name: &str,
    chain_file: impl AsRef<Path>,
    blacklist: Arc<Blacklist>,
    provider: &FeeAndLimitProvider,
    depth: u32,
    horizon: std::time::Duration,
    reconnect_interval: std::time::Duration,
) -> Result<(), ArbError> {
    let gate = ExecutionGate::new();
    let mut cycle: u64 = 0;

    loop {
        if let Err(e) = blacklist.reload() {
            tracing::warn!(error = %e, "blacklist reload failed, continuing with in-memory state");
        }

        let chains = load_chains(&chain_file).map_err(|e| ArbError::ClientConnectionError(e.to_string()))?;
        let mut tasks = Vec::with_capacity(chains.len());

        for chain in chains {
            if chain.touches_any(&blacklist.snapshot()) {
                continue;
            }

            let resolved = match resolve_chain(&chain, node_uri, wallet_uri, account_id, account_name).await {
                Ok(resolved) => resolved,
                Err(ArbError::ClientConnectionError(msg)) => {
                    tracing::warn!(error = msg, "connection error resolving chain, sleeping before retry");
                    tokio::time::sleep(reconnect_interval).await;
                    continue;
                }
                Err(e) => {
                    tracing::warn!(error = %e, "failed to resolve chain, skipping this cycle");
                    continue;
                }
            };

            let precisions = derive_precisions(&resolved);
            let ctx = provider.build_context(&resolved, precisions);
            let gate = gate.clone();
            let blacklist = blacklist.clone();

            tasks.push(tokio::spawn(async move {
                run_chain(resolved.chain, ctx, resolved.clients, gate, blacklist, depth, horizon).await
            }));
        }

        for task in tasks {
            match task.await {
                Ok(Ok(())) => {}
                Ok(Err(ArbError::ClientConnectionError(msg))) => {
                    tracing::warn!(error = msg, "chain executor hit a connection error");
                    tokio::time::sleep(reconnect_interval).await;
                }
                Ok(Err(e)) => tracing::error!(error = %e, "chain executor exited with a fatal error"),
                Err(join_err) => tracing::error!(error = %join_err, "chain executor task panicked"),
            }
        }

        cycle += 1;
        tracing::info!(cycle, "orchestrator cycle complete");
    }
}

struct ResolvedChain {
    chain: Chain,
    clients: [LegConnections; 3],
}

/// Opens one `ExchangeClient` pair per leg (spec §4.4 INIT: "Open one
/// ExchangeClient per leg (parallel)") — a market connection against
/// `node_uri` for read-only RPCs and a wallet connection against
/// `wallet_uri` for order submission, resolving each pair's base/quote
/// precision against the market connection.
async fn resolve_chain(
    chain: &Chain,
    node_uri: &str,
    wallet_uri: &str,
    account_id: &str,
    account_name: &str,
) -> Result<ResolvedChain, ArbError> {
    let connects = futures::future::join_all(
        chain.pairs.iter().map(|pair| resolve_leg(pair, node_uri, wallet_uri, account_id, account_name)),
    )
    .await;

    let mut clients = Vec::with_capacity(3);
    let mut resolved_pairs = Vec::with_capacity(3);
    for leg in connects {
        let (leg_clients, pair) = leg?;
        clients.push(leg_clients);
        resolved_pairs.push(pair);
    }

    let chain = Chain::new([resolved_pairs[0].clone(), resolved_pairs[1].clone(), resolved_pairs[2].clone()])
        .map_err(|e| ArbError::ClientConnectionError(e.to_string()))?;

    let clients: [LegConnections; 3] = clients
        .try_into()
        .unwrap_or_else(|_| unreachable!("exactly three legs resolved above"));

    Ok(ResolvedChain { chain, clients })
}

async fn resolve_leg(
    pair: &Pair,
    node_uri: &str,
    wallet_uri: &str,
    account_id: &str,
    account_name: &str,
) -> Result<(LegConnections, Pair), ArbError> {
    let market = ExchangeClient::connect(node_uri, account_id).await?;
    // Order submission identifies the account by name, not id (spec §6,
    // `original_source`'s `Order.create_order(self.account_name, ...)`).
    let wallet = ExchangeClient::connect(wallet_uri, account_name).await?;
    let base = market.get_asset_info(&pair.base.symbol).await?;
    let quote = market.get_asset_info(&pair.quote.symbol).await?;
    Ok((LegConnections { market, wallet }, Pair::new(base, quote)))
}
