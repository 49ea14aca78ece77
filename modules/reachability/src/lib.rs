//! Transport-level reachability: can a TCP connection be opened at all,
//! independent of authentication.

use async_trait::async_trait;
use std::time::Duration;
use tokio::net::TcpStream;
use tokio::time::timeout;
use tracing::debug;

/// Default bound for a single connect attempt.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(5);

/// Answers whether `host:port` accepts TCP connections.
#[async_trait]
pub trait Reachability: Send + Sync {
    async fn check(&self, host: &str, port: u16, timeout: Duration) -> bool;
}

/// Real checker backed by a tokio TCP connect.
#[derive(Debug, Default, Clone, Copy)]
pub struct TcpReachability;

#[async_trait]
impl Reachability for TcpReachability {
    async fn check(&self, host: &str, port: u16, per_attempt: Duration) -> bool {
        check(host, port, per_attempt).await
    }
}

/// Attempt one TCP connect bounded by `per_attempt`. Resolution is inside the bound.
/// Any failure (resolution, refusal, timeout) is `false`; the stream is dropped at once.
pub async fn check(host: &str, port: u16, per_attempt: Duration) -> bool {
    let host = strip_brackets(host);
    match timeout(per_attempt, TcpStream::connect((host, port))).await {
        Ok(Ok(stream)) => {
            drop(stream);
            debug!(host, port, "tcp connect ok");
            true
        }
        Ok(Err(e)) => {
            debug!(host, port, error = %e, "tcp connect failed");
            false
        }
        Err(_) => {
            debug!(host, port, timeout_ms = per_attempt.as_millis() as u64, "tcp connect timed out");
            false
        }
    }
}

fn strip_brackets(host: &str) -> &str {
    host.strip_prefix('[').and_then(|h| h.strip_suffix(']')).unwrap_or(host)
}
