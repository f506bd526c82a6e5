//! Fee/limit provisioning, the arbitrage kernel, blacklist, execution gate,
//! per-chain execution, and the top-level orchestrator.

pub mod blacklist;
pub mod executor;
pub mod fees;
pub mod gate;
pub mod kernel;
pub mod orchestrator;

pub use blacklist::Blacklist;
pub use executor::{run_chain, ExecutionOutcome, LegConnections};
pub use fees::{derive_precisions, FeeAndLimitProvider};
pub use gate::{ExecutionGate, ExecutionGuard};
