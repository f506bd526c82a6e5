//! WebSocket JSON-RPC client for the triangular arbitrage engine's target
//! exchange.

pub mod client;
pub mod connection;
pub mod protocol;

pub use client::{ExchangeClient, OrderFill, OrderSide};
pub use connection::Connection;
pub use protocol::{RpcErrorPayload, RpcRequest, RpcResponse};
