//! smbprobe - SMB/CIFS share connectivity diagnosis
//!
//! Core library exposing the probes, the failure classifier and the report
//! formatter. The `smbprobe` binary is a thin front end over [`Diagnostician`].

// Public modules
pub mod config;
pub mod constants;
pub mod core;
pub mod logger;
pub mod models;
pub mod normalize;
pub mod platform;
pub mod utils;

// Re-export commonly used types
pub use config::ProbeConfig;
pub use core::{classify, DiagnosisReport, Diagnostician, ErrorCategory, ProbeLatch};
pub use models::{ProbeRequest, SecureString, ShareAuth, Username};
pub use utils::{LogError, ShareError, ValidationError};
