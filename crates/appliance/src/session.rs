//! WebSocket JSON-RPC session
//!
//! One session owns one persistent connection and a monotonically
//! increasing correlation-id counter. The protocol is strict lock-step:
//! write one request frame, then block reading its response. Responses are
//! still matched by id, never by arrival order; an unexpected id fails the
//! call rather than pairing silently. If calls ever need to overlap on one
//! connection this must grow a per-id response demultiplexer.

use futures::{SinkExt, StreamExt};
use serde_json::Value;
use tokio::net::TcpStream;
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::{connect_async_tls_with_config, Connector, MaybeTlsStream, WebSocketStream};

use tnb_core::{Error, Result};

use crate::protocol::{Request, Response};

/// Handshake timeout for the WebSocket dial
const HANDSHAKE_TIMEOUT: std::time::Duration = std::time::Duration::from_secs(10);

/// Fixed API path on the appliance
const API_PATH: &str = "/api/current";

/// One authenticated JSON-RPC session
///
/// Not safe for concurrent calls; the pipeline issues exactly one call at
/// a time.
#[derive(Debug)]
pub struct RpcSession {
    stream: WebSocketStream<MaybeTlsStream<TcpStream>>,
    next_id: u64,
}

impl RpcSession {
    /// Dial the appliance's RPC endpoint
    ///
    /// The base URL scheme is rewritten to its WebSocket equivalent
    /// (`https` → `wss`, `http` → `ws`) and the fixed API path appended.
    /// When `verify_ssl` is false, certificate and hostname validation are
    /// skipped for this connection only.
    pub async fn connect(base_url: &str, verify_ssl: bool) -> Result<Self> {
        let endpoint = rpc_endpoint(base_url)?;

        let connector = if verify_ssl {
            None
        } else {
            let tls = native_tls::TlsConnector::builder()
                .danger_accept_invalid_certs(true)
                .danger_accept_invalid_hostnames(true)
                .build()
                .map_err(|e| Error::Connection(format!("building TLS connector: {e}")))?;
            Some(Connector::NativeTls(tls))
        };

        let dial = connect_async_tls_with_config(endpoint.as_str(), None, false, connector);
        let (stream, _) = tokio::time::timeout(HANDSHAKE_TIMEOUT, dial)
            .await
            .map_err(|_| Error::Connection(format!("handshake with {endpoint} timed out")))?
            .map_err(|e| Error::Connection(format!("websocket dial failed: {e}")))?;

        Ok(Self { stream, next_id: 0 })
    }

    /// Authenticate with an API key
    ///
    /// Must be the first call on a fresh session. The appliance answers
    /// the login method with a bare boolean; anything else is a rejection.
    pub async fn login(&mut self, api_key: &str) -> Result<()> {
        let result = self
            .call("auth.login_with_api_key", Some(Value::from(vec![api_key])))
            .await?;
        match result.as_bool() {
            Some(true) => Ok(()),
            Some(false) => Err(Error::Auth("appliance rejected the API key".to_string())),
            None => Err(Error::Auth(format!(
                "unexpected login result: {result}"
            ))),
        }
    }

    /// Issue one RPC call and block for its response
    ///
    /// Returns the raw `result` value; the caller owns typed decoding. An
    /// appliance-reported error object becomes [`Error::Rpc`] and is never
    /// retried here.
    pub async fn call(&mut self, method: &str, params: Option<Value>) -> Result<Value> {
        self.next_id += 1;
        let id = self.next_id;

        let request = Request::new(method, id, params);
        let frame = serde_json::to_string(&request)
            .map_err(|e| Error::Protocol(format!("encoding {method} request: {e}")))?;
        self.stream
            .send(Message::Text(frame))
            .await
            .map_err(|e| Error::Connection(format!("write failed: {e}")))?;

        loop {
            let message = self
                .stream
                .next()
                .await
                .ok_or_else(|| Error::Connection("connection closed mid-call".to_string()))?
                .map_err(|e| Error::Connection(format!("read failed: {e}")))?;

            let text = match message {
                Message::Text(text) => text,
                // tungstenite answers pings internally on the next flush
                Message::Ping(_) | Message::Pong(_) | Message::Frame(_) => continue,
                Message::Close(_) => {
                    return Err(Error::Connection(
                        "connection closed by appliance".to_string(),
                    ))
                }
                Message::Binary(_) => {
                    return Err(Error::Protocol("unexpected binary frame".to_string()))
                }
            };

            let response: Response = serde_json::from_str(&text)
                .map_err(|e| Error::Protocol(format!("malformed response frame: {e}")))?;

            if response.id != Some(id) {
                return Err(Error::Protocol(format!(
                    "response id {:?} does not match request id {id}",
                    response.id
                )));
            }

            if let Some(err) = response.error {
                return Err(Error::Rpc {
                    code: err.code,
                    message: err.message,
                });
            }

            return Ok(response.result.unwrap_or(Value::Null));
        }
    }

    /// Close the underlying connection
    ///
    /// Best-effort and idempotent; safe to call after a failed call.
    pub async fn close(&mut self) {
        let _ = self.stream.close(None).await;
    }
}

/// Rewrite a base URL into the WebSocket RPC endpoint
fn rpc_endpoint(base_url: &str) -> Result<String> {
    let rewritten = if let Some(rest) = base_url.strip_prefix("https://") {
        format!("wss://{rest}")
    } else if let Some(rest) = base_url.strip_prefix("http://") {
        format!("ws://{rest}")
    } else {
        return Err(Error::Connection(format!(
            "unsupported URL scheme in {base_url}"
        )));
    };
    Ok(format!("{}{API_PATH}", rewritten.trim_end_matches('/')))
}
