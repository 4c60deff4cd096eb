//! Keep-alive pinger
//!
//! Free hosting tiers suspend web services that receive no inbound traffic for
//! a while. Pinging our own public URL every few minutes keeps the process
//! (and with it the long-polling dispatcher) awake.

use reqwest::{Client, StatusCode};
use std::time::Duration;
use tokio::time::interval;

use crate::core::config;
use crate::core::error::AppResult;

/// Builds the HTTP client used for pings.
pub fn build_client() -> AppResult<Client> {
    Ok(Client::builder().timeout(config::keepalive::request_timeout()).build()?)
}

/// Sends one GET to `url`.
///
/// Returns `true` only for a `200 OK` answer; network errors and other status
/// codes are logged and reported as `false`.
pub async fn ping_once(client: &Client, url: &str) -> bool {
    match client.get(url).send().await {
        Ok(response) if response.status() == StatusCode::OK => {
            log::debug!("Keepalive ping successful: {}", url);
            true
        }
        Ok(response) => {
            log::warn!("Keepalive ping to {} returned {}", url, response.status());
            false
        }
        Err(e) => {
            log::warn!("Keepalive error: {}", e);
            false
        }
    }
}

/// Pings `url` forever, once per `period`.
pub async fn run_keepalive(url: String, period: Duration) -> AppResult<()> {
    let client = build_client()?;
    log::info!("Starting keepalive service for {} (every {:?})", url, period);

    let mut ticker = interval(period);
    let mut failures: u64 = 0;
    loop {
        ticker.tick().await;
        if ping_once(&client, &url).await {
            if failures > 0 {
                log::info!("Keepalive recovered after {} failed pings", failures);
            }
            failures = 0;
        } else {
            failures += 1;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;

    /// Serves exactly one HTTP response with the given status line.
    async fn one_shot_server(status_line: &'static str) -> String {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            if let Ok((mut socket, _)) = listener.accept().await {
                let mut buf = [0u8; 1024];
                let _ = socket.read(&mut buf).await;
                let response = format!("HTTP/1.1 {}\r\ncontent-length: 2\r\nconnection: close\r\n\r\nok", status_line);
                let _ = socket.write_all(response.as_bytes()).await;
            }
        });
        format!("http://{}/", addr)
    }

    #[tokio::test]
    async fn test_ping_once_ok() {
        let url = one_shot_server("200 OK").await;
        let client = build_client().unwrap();
        assert!(ping_once(&client, &url).await);
    }

    #[tokio::test]
    async fn test_ping_once_non_200_is_failure() {
        let url = one_shot_server("503 Service Unavailable").await;
        let client = build_client().unwrap();
        assert!(!ping_once(&client, &url).await);
    }

    #[tokio::test]
    async fn test_ping_once_unreachable_is_failure() {
        // Bind then drop to get a port nobody listens on
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let client = build_client().unwrap();
        assert!(!ping_once(&client, &format!("http://{}/", addr)).await);
    }
}
