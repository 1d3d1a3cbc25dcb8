//! Probe functions for diagnosing SMB share access
//!
//! Two stages, always run in this order by the orchestrator:
//!
//! 1. [`probe_reachability`] - bounded TCP connect to the service port
//! 2. [`probe_share`] - session setup plus a listing of the share root
//!
//! # Architecture
//!
//! Probes are designed to:
//! - Accept a ShareClient trait object (enabling mocking in tests)
//! - Never return an error: every failure is folded into the result variant
//! - Emit a trace line before each step through the supplied [`LogSink`]
//!
//! # Example
//!
//! ```ignore
//! use smbprobe::core::{probe_reachability, ReachabilityResult};
//! use smbprobe::logger::MemoryLogSink;
//! use std::time::Duration;
//!
//! #[tokio::main]
//! async fn main() {
//!     let log = MemoryLogSink::new();
//!     let result = probe_reachability("10.0.0.5", 445, Duration::from_secs(5), &log).await;
//!     if let ReachabilityResult::Unreachable { cause } = result {
//!         println!("SMB port closed: {}", cause);
//!     }
//! }
//! ```

use super::session::{DirectoryEntry, ShareClient};
use crate::logger::LogSink;
use crate::models::{ProbeRequest, ShareAuth};
use crate::utils::{ShareError, ValidationError};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tokio::net::TcpStream;
use tokio::time::timeout;

/// Outcome of the TCP reachability check
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum ReachabilityResult {
    Reachable,
    /// `cause` is the transport error text, unmodified
    Unreachable { cause: String },
}

impl ReachabilityResult {
    pub fn is_reachable(&self) -> bool {
        matches!(self, ReachabilityResult::Reachable)
    }
}

/// Outcome of the authenticated (or anonymous) share listing
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum ProtocolProbeResult {
    Listed {
        entries: Vec<DirectoryEntry>,
    },
    Failed {
        error_kind: String,
        error_message: String,
    },
}

impl ProtocolProbeResult {
    fn from_error(error: &ShareError) -> Self {
        ProtocolProbeResult::Failed {
            error_kind: error.kind().to_string(),
            error_message: error.to_string(),
        }
    }
}

/// Opens the TCP connection behind the reachability check
///
/// Tests substitute a connector that never completes to exercise the timeout
/// without depending on the local network.
#[async_trait::async_trait]
pub trait TcpConnector: Send + Sync {
    /// Connect and immediately close
    async fn connect(&self, host: &str, port: u16) -> std::io::Result<()>;
}

/// Plain `tokio` TCP connect
#[derive(Debug, Default, Clone, Copy)]
pub struct TokioConnector;

#[async_trait::async_trait]
impl TcpConnector for TokioConnector {
    async fn connect(&self, host: &str, port: u16) -> std::io::Result<()> {
        let stream = TcpStream::connect((host, port)).await?;
        drop(stream);
        Ok(())
    }
}

/// Probe whether `host:port` accepts a TCP connection within `connect_timeout`
///
/// The connection is closed as soon as it is established.
pub async fn probe_reachability(
    host: &str,
    port: u16,
    connect_timeout: Duration,
    log: &dyn LogSink,
) -> ReachabilityResult {
    probe_reachability_via(&TokioConnector, host, port, connect_timeout, log).await
}

/// [`probe_reachability`] through an explicit connector
pub async fn probe_reachability_via(
    connector: &dyn TcpConnector,
    host: &str,
    port: u16,
    connect_timeout: Duration,
    log: &dyn LogSink,
) -> ReachabilityResult {
    if host.is_empty() {
        let cause = ValidationError::EmptyHost.to_string();
        log.append_line(&format!("Socket connection FAILED: {}", cause));
        return ReachabilityResult::Unreachable { cause };
    }

    log.append_line(&format!("Attempting to connect to {}:{}", host, port));

    let result = match timeout(connect_timeout, connector.connect(host, port)).await {
        Ok(Ok(())) => ReachabilityResult::Reachable,
        Ok(Err(e)) => ReachabilityResult::Unreachable {
            cause: e.to_string(),
        },
        Err(_) => ReachabilityResult::Unreachable {
            cause: format!(
                "connect timed out after {}ms",
                connect_timeout.as_millis()
            ),
        },
    };

    match &result {
        ReachabilityResult::Reachable => log.append_line("Socket connection successful"),
        ReachabilityResult::Unreachable { cause } => {
            log.append_line(&format!("Socket connection FAILED: {}", cause))
        }
    }

    result
}

/// Open a session on the requested share and list its root
///
/// Session setup and listing together are bounded by `session_timeout`. No retries.
pub async fn probe_share(
    client: &dyn ShareClient,
    request: &ProbeRequest,
    session_timeout: Duration,
    log: &dyn LogSink,
) -> ProtocolProbeResult {
    log.append_line(&format!("SMB URL: {}", request.share_url()));

    match request.auth() {
        ShareAuth::Anonymous => log.append_line("Using anonymous access"),
        ShareAuth::Ntlm { username, .. } => log.append_line(&format!(
            "Using authenticated access with user: {}",
            username
        )),
    }

    let listing = match timeout(session_timeout, list_share_root(client, request, log)).await {
        Ok(listing) => listing,
        Err(_) => Err(ShareError::timed_out(session_timeout)),
    };

    match listing {
        Ok(entries) => {
            log.append_line(&format!(
                "File listing successful, found {} items",
                entries.len()
            ));
            if entries.is_empty() {
                log.append_line("Directory is empty");
            }
            for entry in &entries {
                log.append_line(&format!("Found: {} {}", entry.type_tag(), entry.name));
            }
            log.append_line("SMB connection test completed successfully");
            ProtocolProbeResult::Listed { entries }
        }
        Err(error) => {
            log.append_line(&format!("SMB connection FAILED: {}", error));
            log.append_line(&format!("Exception type: {}", error.kind()));
            ProtocolProbeResult::from_error(&error)
        }
    }
}

async fn list_share_root(
    client: &dyn ShareClient,
    request: &ProbeRequest,
    log: &dyn LogSink,
) -> Result<Vec<DirectoryEntry>, ShareError> {
    log.append_line("Creating SMB session...");
    let session = client.connect(request).await?;
    log.append_line("SMB session created");

    log.append_line("Attempting to list files...");
    session.list_root().await
}
