//! Single persistent WebSocket connection with request/response
//! correlation by RPC id.
//!
//! Grounded in `exchange-hyperliquid::websocket::HyperliquidWebSocket`
//! (connect/reconnect/ping shape), generalized from a one-request-at-a-time
//! client into one that demultiplexes concurrent logical calls onto a single
//! socket: a reader task matches each inbound `{"id", ...}` reply to the
//! pending oneshot sender registered by `call`, which keeps "one in-flight
//! call per connection" (spec §4.1) at the transport level while still
//! letting multiple `ExchangeClient` callers share a connection.

use dashmap::DashMap;
use futures_util::stream::SplitSink;
use futures_util::{SinkExt, StreamExt};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tokio::net::TcpStream;
use tokio::sync::{oneshot, Mutex};
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::{connect_async, MaybeTlsStream, WebSocketStream};
use triarb_core::ArbError;

use crate::protocol::{RpcRequest, RpcResponse};

type WsSink = SplitSink<WebSocketStream<MaybeTlsStream<TcpStream>>, Message>;
type Pending = Arc<DashMap<u64, oneshot::Sender<RpcResponse>>>;

/// A single persistent WebSocket RPC connection.
pub struct Connection {
    sink: Mutex<WsSink>,
    pending: Pending,
    next_id: AtomicU64,
    reader: tokio::task::JoinHandle<()>,
}

impl Connection {
    /// Opens a connection and spawns its reader task.
    ///
    /// # Errors
    /// Returns `ClientConnectionError` if the WebSocket handshake fails.
    pub async fn connect(uri: &str) -> Result<Self, ArbError> {
        let (stream, _response) = connect_async(uri)
            .await
            .map_err(|e| ArbError::ClientConnectionError(format!("connect to {uri}: {e}")))?;

        let (sink, mut source) = stream.split();
        let pending: Pending = Arc::new(DashMap::new());
        let reader_pending = pending.clone();

        let reader = tokio::spawn(async move {
            while let Some(msg) = source.next().await {
                match msg {
                    Ok(Message::Text(text)) => {
                        if let Ok(resp) = serde_json::from_str::<RpcResponse>(&text) {
                            if let Some((_, tx)) = reader_pending.remove(&resp.id) {
                                let _ = tx.send(resp);
                            }
                        }
                    }
                    Ok(Message::Close(_)) | Err(_) => {
                        tracing::warn!("exchange connection closed or errored, draining pending calls");
                        reader_pending.clear();
                        break;
                    }
                    _ => {}
                }
            }
        });

        Ok(Self {
            sink: Mutex::new(sink),
            pending,
            next_id: AtomicU64::new(1),
            reader,
        })
    }

    /// Issues one RPC call and awaits its matched response.
    ///
    /// # Errors
    /// Returns `ClientConnectionError` if the send fails or the connection
    /// drops before a reply with this call's id arrives.
    pub async fn call(&self, method: &str, params: Vec<serde_json::Value>) -> Result<RpcResponse, ArbError> {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let (tx, rx) = oneshot::channel();
        self.pending.insert(id, tx);

        let request = RpcRequest::new(id, method, params);
        let payload = serde_json::to_string(&request)?;

        {
            let mut sink = self.sink.lock().await;
            if let Err(e) = sink.send(Message::Text(payload)).await {
                self.pending.remove(&id);
                return Err(ArbError::ClientConnectionError(format!("send failed: {e}")));
            }
        }

        rx.await
            .map_err(|_| ArbError::ClientConnectionError(format!("connection dropped awaiting reply to '{method}' (id={id})")))
    }

    /// Closes the connection, aborting the reader task.
    pub async fn close(&self) {
        self.reader.abort();
        let mut sink = self.sink.lock().await;
        let _ = sink.close().await;
    }
}
