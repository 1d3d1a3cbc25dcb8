//! Core diagnosis logic (platform-agnostic)
//!
//! CRITICAL: This module MUST NOT import platform-specific code or front-end concerns.

pub mod classifier;
pub mod diagnosis;
pub mod probes;
pub mod report;
pub mod session;

// Test utilities for mock sessions (tests only)
#[cfg(test)]
pub mod mock_session;

pub use classifier::{classify, ErrorCategory, CLASSIFICATION_RULES};
pub use diagnosis::{
    run_diagnosis, DiagnosisTask, Diagnostician, ProbeLatch, ProbeLatchGuard,
};
pub use probes::{
    probe_reachability, probe_reachability_via, probe_share, ProtocolProbeResult,
    ReachabilityResult, TcpConnector, TokioConnector,
};
pub use report::{format_report, DiagnosisReport, ReportContext};
pub use session::{DirectoryEntry, ShareClient, ShareSession};
