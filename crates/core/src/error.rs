//! Error taxonomy for the arbitrage engine (spec §7).
//!
//! One enum covers RPC/transport failures and the chain-execution outcomes
//! they map to, grounded in `exchange-kalshi::error::KalshiError`'s
//! variant-per-condition shape.

use thiserror::Error;

/// Errors surfaced by `ExchangeClient`, `ChainExecutor`, and `OrderPlacer`.
#[derive(Debug, Error)]
pub enum ArbError {
    /// A depth request returned zero levels. Chain is skipped for this cycle.
    #[error("empty order book for {pair}")]
    EmptyOrdersList { pair: String },

    /// Asset name -> id resolution returned an empty result set.
    #[error("could not resolve asset '{symbol}'")]
    LookupFailed { symbol: String },

    /// Gateway asset requires whitelisting before it can be traded.
    #[error("asset '{asset}' requires authorization")]
    AuthorizedAsset { asset: String },

    /// A fill-or-kill order was rejected by the exchange.
    #[error("order for pair {pair} was not filled")]
    OrderNotFilled { pair: String },

    /// Any other order-RPC error.
    #[error("order RPC failed: {0}")]
    UnknownOrderException(String),

    /// Transport-level failure (connect, send, or receive).
    #[error("client connection error: {0}")]
    ClientConnectionError(String),

    /// The RPC transport returned a response whose `id` did not match any
    /// pending request, or the connection was dropped before a reply arrived.
    #[error("RPC call '{method}' failed: {message}")]
    RpcError { method: String, message: String },
}

impl ArbError {
    /// Classifies a `create_order` RPC error message per spec §4.1: messages
    /// containing the unauthorized-asset marker map to `AuthorizedAsset`,
    /// the not-filled marker to `OrderNotFilled`, anything else to
    /// `UnknownOrderException`.
    #[must_use]
    pub fn classify_order_error(pair: &str, asset: &str, message: &str) -> Self {
        const UNAUTHORIZED_MARKER: &str = "not authorized";
        const NOT_FILLED_MARKER: &str = "not filled";

        let lower = message.to_lowercase();
        if lower.contains(UNAUTHORIZED_MARKER) {
            Self::AuthorizedAsset {
                asset: asset.to_string(),
            }
        } else if lower.contains(NOT_FILLED_MARKER) {
            Self::OrderNotFilled {
                pair: pair.to_string(),
            }
        } else {
            Self::UnknownOrderException(message.to_string())
        }
    }
}

impl From<tokio_tungstenite::tungstenite::Error> for ArbError {
    fn from(err: tokio_tungstenite::tungstenite::Error) -> Self {
        Self::ClientConnectionError(err.to_string())
    }
}

impl From<serde_json::Error> for ArbError {
    fn from(err: serde_json::Error) -> Self {
        Self::RpcError {
            method: "<decode>".to_string(),
            message: err.to_string(),
        }
    }
}

/// Result alias for arbitrage-engine operations.
pub type Result<T> = std::result::Result<T, ArbError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn classifies_unauthorized_marker() {
        let err = ArbError::classify_order_error("BTS:CNY", "CNY", "Asset CNY is not authorized for this account");
        assert!(matches!(err, ArbError::AuthorizedAsset { asset } if asset == "CNY"));
    }

    #[test]
    fn classifies_not_filled_marker() {
        let err = ArbError::classify_order_error("BTS:CNY", "CNY", "Order was not filled: insufficient liquidity");
        assert!(matches!(err, ArbError::OrderNotFilled { pair } if pair == "BTS:CNY"));
    }

    #[test]
    fn classifies_unknown_as_fallback() {
        let err = ArbError::classify_order_error("BTS:CNY", "CNY", "internal server error");
        assert!(matches!(err, ArbError::UnknownOrderException(_)));
    }
}
