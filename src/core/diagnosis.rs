//! Diagnosis orchestration
//!
//! Runs the reachability probe, then (only if it passed) the share probe, and
//! turns both outcomes into a [`DiagnosisReport`]. Nothing escapes as an error:
//! bad input, a panicking backend or a cancelled task all end as a failed
//! report or, for cancellation, no report at all.

use super::probes::{
    probe_reachability_via, probe_share, ReachabilityResult, TcpConnector, TokioConnector,
};
use super::report::{format_report, DiagnosisReport, ReportContext};
use super::session::ShareClient;
use crate::config::ProbeConfig;
use crate::logger::LogSink;
use crate::models::{ProbeRequest, SecureString};
use futures::FutureExt;
use std::any::Any;
use std::panic::AssertUnwindSafe;
use std::path::Path;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio::task::JoinHandle;

/// Runs one probe sequence per call; holds no per-run state
pub struct Diagnostician {
    client: Arc<dyn ShareClient>,
    connector: Arc<dyn TcpConnector>,
    log: Arc<dyn LogSink>,
    config: ProbeConfig,
}

impl Diagnostician {
    pub fn new(client: Arc<dyn ShareClient>, log: Arc<dyn LogSink>, config: ProbeConfig) -> Self {
        Self {
            client,
            connector: Arc::new(TokioConnector),
            log,
            config,
        }
    }

    /// Replace the TCP connector used by the reachability check
    pub fn with_connector(mut self, connector: Arc<dyn TcpConnector>) -> Self {
        self.connector = connector;
        self
    }

    pub fn config(&self) -> &ProbeConfig {
        &self.config
    }

    /// Diagnose access to `share_name` on `host` from the four raw front-end fields
    pub async fn run(
        &self,
        host: &str,
        share_name: &str,
        username: &str,
        password: &str,
    ) -> DiagnosisReport {
        self.log.append_line("=== SMB Connection Test Started ===");
        self.log.append_line(&format!("IP Address: {}", host));
        self.log.append_line(&format!("Share Name: {}", share_name));
        self.log.append_line(&format!("Username: {}", username));
        self.log.append_line(&format!(
            "Password: {}",
            if password.is_empty() { "empty" } else { "***" }
        ));

        match ProbeRequest::from_parts(host, share_name, username, password) {
            Ok(request) => self.run_request(&request).await,
            Err(e) => self.unexpected_failure(&e.to_string(), "ValidationError"),
        }
    }

    /// [`Self::run`], with a panic anywhere in the run turned into a failed report
    pub async fn run_catching(
        &self,
        host: &str,
        share_name: &str,
        username: &str,
        password: &str,
    ) -> DiagnosisReport {
        match AssertUnwindSafe(self.run(host, share_name, username, password))
            .catch_unwind()
            .await
        {
            Ok(report) => report,
            Err(payload) => self.unexpected_failure(&panic_message(payload), "panic"),
        }
    }

    /// Diagnose an already validated request
    pub async fn run_request(&self, request: &ProbeRequest) -> DiagnosisReport {
        let log = self.log.as_ref();
        let context = ReportContext::new(request, self.config.port)
            .with_log_path(self.log.location().map(Path::to_path_buf));

        log.append_line("Testing network connectivity...");
        let reachability = probe_reachability_via(
            self.connector.as_ref(),
            request.host(),
            self.config.port,
            self.config.connect_timeout,
            log,
        )
        .await;

        let protocol = match &reachability {
            ReachabilityResult::Unreachable { cause } => {
                log.append_line(&format!("Network test FAILED: {}", cause));
                None
            }
            ReachabilityResult::Reachable => {
                log.append_line("Network test PASSED");
                log.append_line("Testing SMB connection...");
                Some(
                    probe_share(
                        self.client.as_ref(),
                        request,
                        self.config.session_timeout,
                        log,
                    )
                    .await,
                )
            }
        };

        let report = format_report(&context, &reachability, protocol.as_ref());
        log.append_line(&format!(
            "Test completed: {}",
            if report.succeeded { "SUCCESS" } else { "FAILED" }
        ));
        report
    }

    /// Start a run on a background task
    ///
    /// The password is moved into a [`SecureString`] so it is zeroed when the task ends.
    pub fn spawn(
        self: &Arc<Self>,
        host: String,
        share_name: String,
        username: String,
        password: SecureString,
    ) -> DiagnosisTask {
        let this = Arc::clone(self);
        let handle = tokio::spawn(async move {
            this.run_catching(&host, &share_name, &username, password.as_str())
                .await
        });
        DiagnosisTask {
            handle,
            log: Arc::clone(&self.log),
        }
    }

    fn unexpected_failure(&self, message: &str, kind: &str) -> DiagnosisReport {
        record_unexpected(self.log.as_ref(), message, kind);
        DiagnosisReport::unexpected_failure(
            message,
            self.log.location().map(Path::to_path_buf).as_ref(),
        )
    }
}

/// One-shot diagnosis without keeping a [`Diagnostician`] around
pub async fn run_diagnosis(
    client: Arc<dyn ShareClient>,
    log: Arc<dyn LogSink>,
    config: ProbeConfig,
    host: &str,
    share_name: &str,
    username: &str,
    password: &str,
) -> DiagnosisReport {
    Diagnostician::new(client, log, config)
        .run_catching(host, share_name, username, password)
        .await
}

fn record_unexpected(log: &dyn LogSink, message: &str, kind: &str) {
    log.append_line(&format!("Test FAILED with exception: {}", message));
    log.append_line(&format!("Exception type: {}", kind));
}

/// Handle to a diagnosis running in the background
pub struct DiagnosisTask {
    handle: JoinHandle<DiagnosisReport>,
    log: Arc<dyn LogSink>,
}

impl DiagnosisTask {
    /// Tear the run down; any in-flight result is discarded
    pub fn abort(&self) {
        self.handle.abort();
    }

    /// Wait for the report
    ///
    /// `None` when the task was cancelled. A panic inside the run becomes a failed report.
    pub async fn report(self) -> Option<DiagnosisReport> {
        match self.handle.await {
            Ok(report) => Some(report),
            Err(e) if e.is_cancelled() => {
                self.log.append_line("Test cancelled");
                None
            }
            Err(e) => {
                let message = panic_message(e.into_panic());
                record_unexpected(self.log.as_ref(), &message, "panic");
                Some(DiagnosisReport::unexpected_failure(
                    &message,
                    self.log.location().map(Path::to_path_buf).as_ref(),
                ))
            }
        }
    }
}

fn panic_message(payload: Box<dyn Any + Send>) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        (*message).to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "unknown internal error".to_string()
    }
}

/// Single-flight gate for the front end's "run" control
///
/// Holding the guard is the disabled state; dropping it re-enables the control
/// on every exit path.
#[derive(Debug, Default)]
pub struct ProbeLatch {
    busy: AtomicBool,
}

impl ProbeLatch {
    pub fn new() -> Self {
        Self::default()
    }

    /// `None` while another probe holds the latch
    pub fn try_acquire(&self) -> Option<ProbeLatchGuard<'_>> {
        self.busy
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .ok()
            .map(|_| ProbeLatchGuard { latch: self })
    }

    pub fn is_busy(&self) -> bool {
        self.busy.load(Ordering::Acquire)
    }
}

#[must_use = "the latch is released as soon as the guard is dropped"]
pub struct ProbeLatchGuard<'a> {
    latch: &'a ProbeLatch,
}

impl Drop for ProbeLatchGuard<'_> {
    fn drop(&mut self) {
        self.latch.busy.store(false, Ordering::Release);
    }
}
