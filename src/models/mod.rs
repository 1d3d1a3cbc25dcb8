//! # Domain Models
//!
//! Request and credential types shared by the probes and the front end.
//!
//! ## Security Design
//!
//! The [`SecureString`] type provides memory-safe credential handling:
//! - Password data is zeroed on drop to prevent leakage via swap/core dumps
//! - Never exposed in `Debug` or `Display` implementations
//!
//! Passwords only ever leave this module through [`SecureString::as_str`],
//! which the SMB backend calls when handing the secret to the protocol tool.

pub mod credentials;
pub mod request;

pub use credentials::{SecureString, ShareAuth, Username};
pub use request::ProbeRequest;
