//! Error types for smbprobe
//!
//! All error types use thiserror for clean error handling.
//! SECURITY: Error messages MUST NOT contain passwords or sensitive data.

use std::time::Duration;

/// Failures raised by an SMB session or directory listing
///
/// The `Display` text is the descriptive message handed to the classifier,
/// so variants keep the wording the lower layer produced.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ShareError {
    #[error("{0}")]
    Timeout(String),

    #[error("{0}")]
    Authentication(String),

    #[error("{0}")]
    AccessDenied(String),

    #[error("{0}")]
    NotFound(String),

    #[error("{0}")]
    ConnectionRefused(String),

    #[error("{0}")]
    Connection(String),

    #[error("{0}")]
    Protocol(String),

    #[error("{0}")]
    Io(String),
}

impl ShareError {
    /// Session setup plus listing exceeded its bound
    pub fn timed_out(after: Duration) -> Self {
        ShareError::Timeout(format!(
            "Timed out after {:?} waiting for SMB response",
            after
        ))
    }

    /// Category name reported alongside the message
    pub fn kind(&self) -> &'static str {
        match self {
            ShareError::Timeout(_) => "Timeout",
            ShareError::Authentication(_) => "Authentication",
            ShareError::AccessDenied(_) => "AccessDenied",
            ShareError::NotFound(_) => "NotFound",
            ShareError::ConnectionRefused(_) => "ConnectionRefused",
            ShareError::Connection(_) => "Connection",
            ShareError::Protocol(_) => "Protocol",
            ShareError::Io(_) => "Io",
        }
    }
}

/// Precondition violations on a probe request
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("Host cannot be empty")]
    EmptyHost,

    #[error("Invalid host: {0}")]
    InvalidHost(String),

    #[error("Share name cannot be empty")]
    EmptyShare,

    #[error("Invalid username format: {0}")]
    InvalidUsername(String),
}

/// Errors from writing to a log sink
#[derive(Debug, thiserror::Error)]
pub enum LogError {
    #[error("Failed to write log file {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
}
