//! Config archive generation and retrieval
//!
//! Drives one RPC session: login, request archive generation via
//! `core.download`, then fetch the archive bytes over plain HTTP with the
//! API key as bearer token. The session is always closed before this
//! module returns, success or failure.

use serde_json::{json, Value};

use tnb_core::{Error, Result};

use crate::session::RpcSession;

/// HTTP timeout for the archive download
const DOWNLOAD_TIMEOUT: std::time::Duration = std::time::Duration::from_secs(120);

/// Appliance connection settings for one run
#[derive(Debug, Clone)]
pub struct ApplianceConfig {
    /// Base URL, e.g. `https://truenas.local`
    pub base_url: String,
    /// API key used for RPC login and as download bearer token
    pub api_key: String,
    /// When false, certificate validation is skipped
    pub verify_ssl: bool,
}

/// Generate a configuration archive and return its bytes
pub async fn generate_backup(cfg: &ApplianceConfig) -> Result<Vec<u8>> {
    let mut session = RpcSession::connect(&cfg.base_url, cfg.verify_ssl).await?;
    let requested = request_archive(&mut session, cfg).await;
    session.close().await;
    let locator = requested?;

    let data = download_archive(cfg, &locator).await?;
    if data.is_empty() {
        tracing::warn!("appliance returned an empty config archive");
    }
    tracing::info!(bytes = data.len(), "config backup generated");
    Ok(data)
}

async fn request_archive(session: &mut RpcSession, cfg: &ApplianceConfig) -> Result<String> {
    session.login(&cfg.api_key).await?;

    tracing::info!(url = %cfg.base_url, "requesting config backup");
    let params = json!([
        "config.save",
        [{"secretseed": true}],
        "config.tar",
    ]);
    let result = session.call("core.download", Some(params)).await?;
    parse_download_locator(&result)
}

/// Extract the download path from a `core.download` result
///
/// The appliance answers with `[job_id, "/path?auth_token=…"]`; only the
/// path matters here.
fn parse_download_locator(result: &Value) -> Result<String> {
    let items = result
        .as_array()
        .ok_or_else(|| Error::Protocol(format!("download result is not an array: {result}")))?;
    if items.len() < 2 {
        return Err(Error::Protocol(format!(
            "download result has {} elements, expected at least 2",
            items.len()
        )));
    }
    items[1]
        .as_str()
        .map(str::to_string)
        .ok_or_else(|| Error::Protocol("download URL is not a string".to_string()))
}

async fn download_archive(cfg: &ApplianceConfig, locator: &str) -> Result<Vec<u8>> {
    let url = format!("{}{locator}", cfg.base_url.trim_end_matches('/'));

    let mut builder = reqwest::Client::builder().timeout(DOWNLOAD_TIMEOUT);
    if !cfg.verify_ssl {
        builder = builder.danger_accept_invalid_certs(true);
    }
    let client = builder
        .build()
        .map_err(|e| Error::Connection(format!("building download client: {e}")))?;

    let response = client
        .get(&url)
        .bearer_auth(&cfg.api_key)
        .send()
        .await
        .map_err(|e| Error::Connection(format!("download request failed: {e}")))?;

    let status = response.status();
    if status != reqwest::StatusCode::OK {
        let body = response.text().await.unwrap_or_default();
        return Err(Error::Download {
            status: status.as_u16(),
            body: Error::body_snippet(&body),
        });
    }

    let data = response
        .bytes()
        .await
        .map_err(|e| Error::Connection(format!("reading archive body: {e}")))?;
    Ok(data.to_vec())
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures::{SinkExt, StreamExt};
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::{TcpListener, TcpStream};
    use tokio_tungstenite::tungstenite::Message;

    #[test]
    fn test_parse_download_locator() {
        let result = json!([42, "/_download/42?auth_token=abc"]);
        assert_eq!(
            parse_download_locator(&result).unwrap(),
            "/_download/42?auth_token=abc"
        );
    }

    #[test]
    fn test_parse_download_locator_rejects_short_array() {
        let err = parse_download_locator(&json!([42])).unwrap_err();
        assert!(matches!(err, Error::Protocol(_)));
    }

    #[test]
    fn test_parse_download_locator_rejects_non_array() {
        let err = parse_download_locator(&json!({"url": "/x"})).unwrap_err();
        assert!(matches!(err, Error::Protocol(_)));
    }

    #[test]
    fn test_parse_download_locator_rejects_non_string_path() {
        let err = parse_download_locator(&json!([42, 7])).unwrap_err();
        assert!(matches!(err, Error::Protocol(_)));
    }

    /// Serve the RPC handshake on the first connection and a raw HTTP
    /// download on the second, the exact order the generator uses them.
    async fn spawn_appliance(status: u16, archive: &'static [u8]) -> String {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();

        tokio::spawn(async move {
            let (stream, _) = listener.accept().await.unwrap();
            serve_rpc(stream).await;

            let (stream, _) = listener.accept().await.unwrap();
            serve_download(stream, status, archive).await;
        });

        format!("http://{addr}")
    }

    async fn serve_rpc(stream: TcpStream) {
        let mut socket = tokio_tungstenite::accept_async(stream).await.unwrap();

        // login
        let login: Value = match socket.next().await.unwrap().unwrap() {
            Message::Text(text) => serde_json::from_str(&text).unwrap(),
            other => panic!("unexpected frame: {other:?}"),
        };
        assert_eq!(login["method"], "auth.login_with_api_key");
        socket
            .send(Message::Text(
                json!({"jsonrpc": "2.0", "id": login["id"], "result": true}).to_string(),
            ))
            .await
            .unwrap();

        // core.download
        let download: Value = match socket.next().await.unwrap().unwrap() {
            Message::Text(text) => serde_json::from_str(&text).unwrap(),
            other => panic!("unexpected frame: {other:?}"),
        };
        assert_eq!(download["method"], "core.download");
        assert_eq!(download["params"][0], "config.save");
        assert_eq!(download["params"][1][0]["secretseed"], true);
        assert_eq!(download["params"][2], "config.tar");
        socket
            .send(Message::Text(
                json!({
                    "jsonrpc": "2.0",
                    "id": download["id"],
                    "result": [42, "/_download/42?auth_token=tok"]
                })
                .to_string(),
            ))
            .await
            .unwrap();

        while socket.next().await.is_some() {}
    }

    async fn serve_download(mut stream: TcpStream, status: u16, body: &[u8]) {
        let mut request = Vec::new();
        let mut buf = [0u8; 1024];
        loop {
            let n = stream.read(&mut buf).await.unwrap();
            request.extend_from_slice(&buf[..n]);
            if request.windows(4).any(|w| w == b"\r\n\r\n") {
                break;
            }
        }
        let request = String::from_utf8_lossy(&request);
        assert!(request.starts_with("GET /_download/42?auth_token=tok "));
        assert!(request.to_lowercase().contains("authorization: bearer 1-key"));

        let reason = if status == 200 { "OK" } else { "Error" };
        let head = format!(
            "HTTP/1.1 {status} {reason}\r\nContent-Length: {}\r\nConnection: close\r\n\r\n",
            body.len()
        );
        stream.write_all(head.as_bytes()).await.unwrap();
        stream.write_all(body).await.unwrap();
        stream.shutdown().await.unwrap();
    }

    fn appliance_config(base_url: String) -> ApplianceConfig {
        ApplianceConfig {
            base_url,
            api_key: "1-key".to_string(),
            verify_ssl: true,
        }
    }

    #[tokio::test]
    async fn test_generate_backup_end_to_end() {
        static ARCHIVE: [u8; 1024] = [7u8; 1024];
        let url = spawn_appliance(200, &ARCHIVE).await;

        let data = generate_backup(&appliance_config(url)).await.unwrap();
        assert_eq!(data.len(), 1024);
        assert_eq!(data, ARCHIVE);
    }

    #[tokio::test]
    async fn test_download_failure_carries_status_and_body() {
        let url = spawn_appliance(503, b"maintenance window").await;

        let err = generate_backup(&appliance_config(url)).await.unwrap_err();
        match err {
            Error::Download { status, body } => {
                assert_eq!(status, 503);
                assert!(body.contains("maintenance window"));
            }
            other => panic!("expected Download error, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_malformed_download_result_skips_download() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();

        tokio::spawn(async move {
            let (stream, _) = listener.accept().await.unwrap();
            let mut socket = tokio_tungstenite::accept_async(stream).await.unwrap();

            let login: Value = match socket.next().await.unwrap().unwrap() {
                Message::Text(text) => serde_json::from_str(&text).unwrap(),
                other => panic!("unexpected frame: {other:?}"),
            };
            socket
                .send(Message::Text(
                    json!({"jsonrpc": "2.0", "id": login["id"], "result": true}).to_string(),
                ))
                .await
                .unwrap();

            let download: Value = match socket.next().await.unwrap().unwrap() {
                Message::Text(text) => serde_json::from_str(&text).unwrap(),
                other => panic!("unexpected frame: {other:?}"),
            };
            socket
                .send(Message::Text(
                    json!({"jsonrpc": "2.0", "id": download["id"], "result": "not-an-array"})
                        .to_string(),
                ))
                .await
                .unwrap();

            // A second connection here would be the download; none may arrive.
            while socket.next().await.is_some() {}
        });

        let err = generate_backup(&appliance_config(format!("http://{addr}")))
            .await
            .unwrap_err();
        assert!(matches!(err, Error::Protocol(_)));
    }
}
