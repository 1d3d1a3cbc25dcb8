//! Production share access
//!
//! Everything that touches a real SMB server lives here. Core logic only sees
//! the [`ShareClient`](crate::core::ShareClient) trait.

pub mod smbclient;

pub use smbclient::{SmbClient, SmbClientSession};
