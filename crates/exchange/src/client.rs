//! High-level exchange client: asset lookup, order-book depth, balances, and
//! order placement on top of a raw `Connection` (spec §4.1).

use dashmap::DashMap;
use rust_decimal::Decimal;
use serde_json::Value;
use std::str::FromStr;
use triarb_core::{ArbError, Asset, AssetId, DepthSlice, OrderLevel};

use crate::connection::Connection;

/// Side of a market order, matching the exchange's `create_order` RPC.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OrderSide {
    Buy,
    Sell,
}

impl OrderSide {
    fn as_rpc_str(self) -> &'static str {
        match self {
            Self::Buy => "buy",
            Self::Sell => "sell",
        }
    }
}

/// Outcome of a submitted market order.
#[derive(Debug, Clone)]
pub struct OrderFill {
    pub filled_base: Decimal,
    pub filled_quote: Decimal,
}

/// JSON-RPC-over-WebSocket client for the target exchange.
///
/// Caches symbol -> id resolution in a `DashMap` (grounded in
/// `strongca22-cpu-dexarb`'s `pool::state` pool cache) since asset ids are
/// immutable for the lifetime of a run but are looked up on every chain
/// evaluation.
pub struct ExchangeClient {
    conn: Connection,
    id_cache: DashMap<String, AssetId>,
    account_id: String,
}

impl ExchangeClient {
    /// Connects to `node_uri` and authenticates nothing yet — login happens
    /// lazily on the first account-scoped call, matching the original's
    /// session model.
    ///
    /// # Errors
    /// Returns `ClientConnectionError` if the handshake fails.
    pub async fn connect(node_uri: &str, account_id: &str) -> Result<Self, ArbError> {
        let conn = Connection::connect(node_uri).await?;
        Ok(Self {
            conn,
            id_cache: DashMap::new(),
            account_id: account_id.to_string(),
        })
    }

    /// Resolves a symbol to an `Asset`, caching the id after first lookup.
    ///
    /// # Errors
    /// Returns `LookupFailed` if the exchange's asset list is empty for
    /// `symbol`, or `RpcError` if the call itself fails.
    pub async fn get_asset_info(&self, symbol: &str) -> Result<Asset, ArbError> {
        if let Some(id) = self.id_cache.get(symbol) {
            return Ok(Asset::new(symbol, id.clone(), self.lookup_precision(symbol).await?));
        }

        let resp = self
            .conn
            .call("list_assets", vec![Value::from(symbol), Value::from(1)])
            .await?;
        let result = resp.result.ok_or_else(|| ArbError::RpcError {
            method: "list_assets".to_string(),
            message: resp.error.map(|e| e.message).unwrap_or_else(|| "no result".to_string()),
        })?;

        let entries = result.as_array().ok_or_else(|| ArbError::LookupFailed {
            symbol: symbol.to_string(),
        })?;
        let first = entries.first().ok_or_else(|| ArbError::LookupFailed {
            symbol: symbol.to_string(),
        })?;

        let id = first
            .get("id")
            .and_then(Value::as_str)
            .ok_or_else(|| ArbError::LookupFailed {
                symbol: symbol.to_string(),
            })?;
        let precision = first
            .get("precision")
            .and_then(Value::as_u64)
            .ok_or_else(|| ArbError::LookupFailed {
                symbol: symbol.to_string(),
            })? as u32;

        let asset_id = AssetId::from(id);
        self.id_cache.insert(symbol.to_string(), asset_id.clone());
        Ok(Asset::new(symbol, asset_id, precision))
    }

    async fn lookup_precision(&self, symbol: &str) -> Result<u32, ArbError> {
        let id = self
            .id_cache
            .get(symbol)
            .ok_or_else(|| ArbError::LookupFailed {
                symbol: symbol.to_string(),
            })?
            .clone();
        let resp = self.conn.call("get_objects", vec![Value::from(vec![id.0.clone()])]).await?;
        let result = resp.result.ok_or_else(|| ArbError::RpcError {
            method: "get_objects".to_string(),
            message: resp.error.map(|e| e.message).unwrap_or_else(|| "no result".to_string()),
        })?;
        result
            .as_array()
            .and_then(|arr| arr.first())
            .and_then(|obj| obj.get("precision"))
            .and_then(Value::as_u64)
            .map(|p| p as u32)
            .ok_or_else(|| ArbError::LookupFailed {
                symbol: symbol.to_string(),
            })
    }

    /// Fetches up to `depth` ask levels for `base`/`quote` (spec §4.1,
    /// §4.2). Returns `EmptyOrdersList` if the book has zero levels.
    ///
    /// # Errors
    /// Returns `EmptyOrdersList` on an empty book, `RpcError` on transport
    /// or malformed-payload failure.
    pub async fn get_order_book(&self, base: &Asset, quote: &Asset, depth: u32) -> Result<DepthSlice, ArbError> {
        let resp = self
            .conn
            .call(
                "get_order_book",
                vec![Value::from(base.id.0.clone()), Value::from(quote.id.0.clone()), Value::from(depth)],
            )
            .await?;

        let result = resp.result.ok_or_else(|| ArbError::RpcError {
            method: "get_order_book".to_string(),
            message: resp.error.map(|e| e.message).unwrap_or_else(|| "no result".to_string()),
        })?;

        let asks = result.get("asks").and_then(Value::as_array).ok_or_else(|| ArbError::EmptyOrdersList {
            pair: format!("{}:{}", base.symbol, quote.symbol),
        })?;

        let mut levels = Vec::with_capacity(asks.len());
        for entry in asks {
            let price = decimal_field(entry, "price")?;
            let base_vol = decimal_field(entry, "base_volume")?;
            let quote_vol = decimal_field(entry, "quote_volume")?;
            levels.push(OrderLevel::new(price, base_vol, quote_vol));
        }

        DepthSlice::new(levels).ok_or_else(|| ArbError::EmptyOrdersList {
            pair: format!("{}:{}", base.symbol, quote.symbol),
        })
    }

    /// Returns the account's available balance of `asset`, scaled from the
    /// exchange's raw smallest-unit integer down to a decimal amount by
    /// `asset.precision` (spec §4.1 `raw_integer_balance` / §4.5).
    ///
    /// # Errors
    /// Returns `RpcError` on transport or malformed-payload failure.
    pub async fn get_account_balance(&self, asset: &Asset) -> Result<Decimal, ArbError> {
        let resp = self
            .conn
            .call(
                "get_account_balances",
                vec![Value::from(self.account_id.clone()), Value::from(vec![asset.id.0.clone()])],
            )
            .await?;

        let result = resp.result.ok_or_else(|| ArbError::RpcError {
            method: "get_account_balances".to_string(),
            message: resp.error.map(|e| e.message).unwrap_or_else(|| "no result".to_string()),
        })?;

        let raw = result
            .as_array()
            .and_then(|arr| arr.first())
            .and_then(Value::as_str)
            .and_then(|s| Decimal::from_str(s).ok())
            .ok_or_else(|| ArbError::RpcError {
                method: "get_account_balances".to_string(),
                message: format!("malformed balance payload for {}", asset.symbol),
            })?;

        Ok(triarb_core::decimal::scale_down(raw, asset.precision))
    }

    /// Places a fill-or-kill market order. Maps exchange-side rejections to
    /// the order-error taxonomy via `ArbError::classify_order_error`.
    ///
    /// # Errors
    /// Returns `AuthorizedAsset`, `OrderNotFilled`, or
    /// `UnknownOrderException` per the exchange's rejection message;
    /// `RpcError` on transport failure.
    pub async fn create_market_order(
        &self,
        base: &Asset,
        quote: &Asset,
        side: OrderSide,
        amount: Decimal,
        price: Decimal,
    ) -> Result<OrderFill, ArbError> {
        let pair_token = format!("{}:{}", base.symbol, quote.symbol);
        let resp = self
            .conn
            .call(
                "create_order",
                vec![
                    Value::from(self.account_id.clone()),
                    Value::from(base.id.0.clone()),
                    Value::from(quote.id.0.clone()),
                    Value::from(side.as_rpc_str()),
                    Value::from(amount.to_string()),
                    Value::from(price.to_string()),
                    Value::from(true), // fill-or-kill
                ],
            )
            .await?;

        if let Some(error) = resp.error {
            let quote_symbol = quote.symbol.clone();
            return Err(ArbError::classify_order_error(&pair_token, &quote_symbol, &error.message));
        }

        let result = resp.result.ok_or(ArbError::OrderNotFilled { pair: pair_token.clone() })?;
        let filled_base = decimal_field(&result, "filled_base")?;
        let filled_quote = decimal_field(&result, "filled_quote")?;

        if filled_base.is_zero() || filled_quote.is_zero() {
            return Err(ArbError::OrderNotFilled { pair: pair_token });
        }

        Ok(OrderFill { filled_base, filled_quote })
    }

    /// Closes the underlying connection.
    pub async fn close(&self) {
        self.conn.close().await;
    }
}

fn decimal_field(value: &Value, field: &str) -> Result<Decimal, ArbError> {
    let raw = value.get(field).and_then(Value::as_str).ok_or_else(|| ArbError::RpcError {
        method: "<decode>".to_string(),
        message: format!("missing or non-string field '{field}'"),
    })?;
    Decimal::from_str(raw).map_err(|e| ArbError::RpcError {
        method: "<decode>".to_string(),
        message: format!("invalid decimal in '{field}': {e}"),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn decimal_field_parses_string_number() {
        let value = serde_json::json!({"price": "1.25000"});
        assert_eq!(decimal_field(&value, "price").unwrap(), dec!(1.25000));
    }

    #[test]
    fn decimal_field_rejects_missing() {
        let value = serde_json::json!({});
        assert!(decimal_field(&value, "price").is_err());
    }

    #[test]
    fn order_side_rpc_strings() {
        assert_eq!(OrderSide::Buy.as_rpc_str(), "buy");
        assert_eq!(OrderSide::Sell.as_rpc_str(), "sell");
    }
}
