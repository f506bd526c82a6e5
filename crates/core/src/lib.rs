//! Shared types, error taxonomy, decimal helpers, and configuration for the
//! triangular arbitrage bot.

pub mod config;
pub mod config_loader;
pub mod decimal;
pub mod error;
pub mod types;

pub use config::{AppConfig, ArbitrageConfig};
pub use config_loader::ConfigLoader;
pub use error::{ArbError, Result};
pub use types::{Asset, AssetId, Chain, ChainContext, ChainError, DepthSlice, Opportunity, OrderLevel, Pair};
