//! # Application-Wide Constants
//!
//! Centralized configuration values and magic numbers used throughout smbprobe.
//!
//! ## Usage
//!
//! ```rust
//! use smbprobe::constants::*;
//! use std::time::Duration;
//!
//! let timeout = Duration::from_millis(TCP_PROBE_TIMEOUT_MS);
//! assert_eq!(SMB_PORT, 445);
//! ```

// ============================================================================
// Network Defaults
// ============================================================================

/// Well-known SMB over TCP port (direct hosting, no NetBIOS)
pub const SMB_PORT: u16 = 445;

/// TCP connection timeout for the reachability probe (milliseconds)
///
/// **Rationale**: 5 seconds tolerates slow Wi-Fi and VPN links while still
/// failing fast enough that a user waiting on the result is not left guessing.
pub const TCP_PROBE_TIMEOUT_MS: u64 = 5000;

/// Upper bound for the SMB session setup plus root listing (seconds)
///
/// Covers negotiate, NTLM handshake, tree connect and one directory query.
pub const SMB_SESSION_TIMEOUT_SECS: u64 = 30;

// ============================================================================
// Platform Tools
// ============================================================================

/// Samba client binary used by the production share backend
pub const SMBCLIENT_BINARY: &str = "smbclient";

/// Environment variable smbclient reads the password from
///
/// Keeps the secret out of the process argument list.
pub const SMBCLIENT_PASSWORD_ENV: &str = "PASSWD";

// ============================================================================
// Logging
// ============================================================================

/// Directory created under the user's local data dir
pub const APP_DIR_NAME: &str = "smbprobe";

/// Append-only diagnostic log file name
pub const LOG_FILE_NAME: &str = "smbprobe_debug.log";

/// Timestamp layout for log lines (`2024-05-01 13:04:55.123`)
pub const LOG_TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S%.3f";

// ============================================================================
// Validation
// ============================================================================

/// Maximum hostname length (characters)
///
/// DNS hostnames are limited to 253 characters (RFC 1035); 255 leaves room
/// for bracketed IPv6 literals.
pub const MAX_HOSTNAME_LENGTH: usize = 255;

/// Maximum username length accepted for NTLM authentication
pub const MAX_USERNAME_LENGTH: usize = 256;
