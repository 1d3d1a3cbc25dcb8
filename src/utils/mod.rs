//! # Utilities Module
//!
//! Cross-cutting concerns shared by the probes, the orchestrator and the platform backends.
//!
//! ## Modules
//!
//! - [`errors`]: Typed error hierarchy using `thiserror` for domain-specific errors
//!
//! ## Design Notes
//!
//! Error types are defined here to avoid circular dependencies between the `core`
//! and `platform` modules. A probe never lets one of these escape its boundary:
//! `core::probes` folds them into result variants before the orchestrator sees them.

pub mod errors;

pub use errors::{LogError, ShareError, ValidationError};
