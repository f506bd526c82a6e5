//! Single entry point for the arbitrage loop (spec §6 "CLI": no flags beyond
//! an optional config path override). Bootstraps logging and configuration,
//! then hands off to `triarb_arbitrage::orchestrator::run`.

use clap::Parser;
use std::sync::Arc;
use triarb_arbitrage::fees::FeeAndLimitProvider;
use triarb_arbitrage::Blacklist;
use triarb_core::ConfigLoader;

#[derive(Parser)]
#[command(name = "triarb")]
#[command(about = "Triangular arbitrage bot", long_about = None)]
struct Cli {
    /// Config file path.
    #[arg(short, long, default_value = "config/Config.toml")]
    config: String,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let app_config = ConfigLoader::load_from(&cli.config)?;
    let arb = app_config.arbitrage;

    let _log_guard = init_logging(&arb.log_dir);
    tracing::info!(config = %cli.config, "starting triangular arbitrage bot");

    let blacklist = Arc::new(Blacklist::load(arb.blacklist_file())?);
    let provider = FeeAndLimitProvider::new(
        arb.min_profit_limits,
        arb.vols_limits,
        arb.default_network_fee,
        arb.gateway_fees,
        arb.core_assets,
    );

    triarb_arbitrage::orchestrator::run(
        &arb.node_uri,
        &arb.wallet_uri,
        &arb.account_id,
        &arb.account_name,
        arb.chain_file(),
        blacklist,
        &provider,
        arb.orders_depth as u32,
        arb.data_update_time(),
        arb.time_to_reconnect(),
    )
    .await?;

    Ok(())
}

/// Wires two targets: the general log (stdout) and a rolling-file profit
/// log, mirroring the original's separate `Rin.BitsharesArbitrage`/`Profit`
/// loggers (spec §6 "Logs").
fn init_logging(log_dir: &str) -> tracing_appender::non_blocking::WorkerGuard {
    let file_appender = tracing_appender::rolling::daily(log_dir, "profit.log");
    let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);

    use tracing_subscriber::fmt::writer::MakeWriterExt;
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));

    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stdout.and(non_blocking))
        .init();

    guard
}
