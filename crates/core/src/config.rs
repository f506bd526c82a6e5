//! Application configuration (spec §6 "Configuration (enumerated)").

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::time::Duration;

/// Top-level configuration document, loaded from `config/Config.toml` plus
/// `APP_`-prefixed environment overrides (see `config_loader`).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    pub arbitrage: ArbitrageConfig,
}

/// The `[arbitrage]` table: every key spec §6 enumerates.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ArbitrageConfig {
    /// Location of the chain input file and blacklist file.
    pub work_dir: String,
    /// Log output directory.
    pub log_dir: String,
    /// WebSocket endpoint for the exchange node (read-only RPCs).
    pub node_uri: String,
    /// WebSocket endpoint for the wallet node (order placement).
    pub wallet_uri: String,
    /// Account name used when submitting orders.
    pub account_name: String,
    /// Account id used when querying balances.
    pub account_id: String,
    /// Per-chain loop horizon, in hours.
    pub data_update_time_hours: f64,
    /// Sleep duration after a connection failure, in seconds.
    pub time_to_reconnect_secs: u64,
    /// Number of depth levels requested per pair (`D` in spec §4.3).
    #[serde(default = "default_orders_depth")]
    pub orders_depth: usize,
    /// `first-leg-base-asset symbol -> min profit` map.
    #[serde(default)]
    pub min_profit_limits: HashMap<String, Decimal>,
    /// `asset symbol -> volume floor` map.
    #[serde(default)]
    pub vols_limits: HashMap<String, Decimal>,
    /// Default per-order network fee, keyed by the asset it is denominated
    /// in, before conversion into a chain's first-leg base asset.
    #[serde(default)]
    pub default_network_fee: HashMap<String, Decimal>,
    /// Gateway fee rate charged by a wrapped asset's issuer on receipt,
    /// keyed by that asset's symbol (spec §4.2 `ChainsWithGatewayPairFees`).
    #[serde(default)]
    pub gateway_fees: HashMap<String, Decimal>,
    /// Assets whose pre-existing balance is "already present" when measuring
    /// realized leg receive-volume (spec §4.5, §9 Open Question).
    #[serde(default = "default_core_assets")]
    pub core_assets: Vec<String>,
    /// Minimum 24h volume (in a reference currency) for a whole chain to be
    /// considered by the pair-discovery collaborator. Not consumed by this
    /// crate; carried through so the config document matches spec §6.
    #[serde(default)]
    pub overall_min_daily_volume: Option<Decimal>,
    /// Minimum 24h volume per pair for the pair-discovery collaborator.
    #[serde(default)]
    pub pair_min_daily_volume: Option<Decimal>,
}

fn default_orders_depth() -> usize {
    5
}

fn default_core_assets() -> Vec<String> {
    ["BTS", "CNY", "USD", "BRIDGE.BTC"]
        .into_iter()
        .map(String::from)
        .collect()
}

impl ArbitrageConfig {
    #[must_use]
    pub fn data_update_time(&self) -> Duration {
        Duration::from_secs_f64(self.data_update_time_hours * 3600.0)
    }

    #[must_use]
    pub fn time_to_reconnect(&self) -> Duration {
        Duration::from_secs(self.time_to_reconnect_secs)
    }

    #[must_use]
    pub fn chain_file(&self) -> std::path::PathBuf {
        std::path::Path::new(&self.work_dir).join("chains.lst")
    }

    #[must_use]
    pub fn blacklist_file(&self) -> std::path::PathBuf {
        std::path::Path::new(&self.work_dir).join("blacklist.lst")
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            arbitrage: ArbitrageConfig {
                work_dir: "output".to_string(),
                log_dir: "logs".to_string(),
                node_uri: "ws://127.0.0.1:8090/ws".to_string(),
                wallet_uri: "ws://127.0.0.1:8093/ws".to_string(),
                account_name: String::new(),
                account_id: String::new(),
                data_update_time_hours: 3.0,
                time_to_reconnect_secs: 30,
                orders_depth: default_orders_depth(),
                min_profit_limits: HashMap::new(),
                vols_limits: HashMap::new(),
                default_network_fee: HashMap::new(),
                gateway_fees: HashMap::new(),
                core_assets: default_core_assets(),
                overall_min_daily_volume: None,
                pair_min_daily_volume: None,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_has_sane_horizon() {
        let config = AppConfig::default();
        assert_eq!(config.arbitrage.data_update_time().as_secs(), 3 * 3600);
        assert_eq!(config.arbitrage.orders_depth, 5);
        assert_eq!(config.arbitrage.core_assets.len(), 4);
    }

    #[test]
    fn chain_and_blacklist_files_live_under_work_dir() {
        let config = AppConfig::default();
        assert_eq!(config.arbitrage.chain_file(), std::path::Path::new("output/chains.lst"));
        assert_eq!(
            config.arbitrage.blacklist_file(),
            std::path::Path::new("output/blacklist.lst")
        );
    }
}
