//! Probe configuration
//!
//! There is no config file. Defaults come from [`crate::constants`] and the
//! front end overrides individual fields with the `with_*` builders.

use crate::constants::{
    SMBCLIENT_BINARY, SMB_PORT, SMB_SESSION_TIMEOUT_SECS, TCP_PROBE_TIMEOUT_MS,
};
use std::path::PathBuf;
use std::time::Duration;

/// Tunables for a single diagnosis run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProbeConfig {
    /// TCP port probed for reachability and used for the SMB session
    pub port: u16,
    /// Bound on the TCP connect attempt
    pub connect_timeout: Duration,
    /// Bound on session setup plus root listing
    pub session_timeout: Duration,
    /// smbclient executable (bare name resolves through `PATH`)
    pub smbclient_path: PathBuf,
}

impl Default for ProbeConfig {
    fn default() -> Self {
        Self {
            port: SMB_PORT,
            connect_timeout: Duration::from_millis(TCP_PROBE_TIMEOUT_MS),
            session_timeout: Duration::from_secs(SMB_SESSION_TIMEOUT_SECS),
            smbclient_path: PathBuf::from(SMBCLIENT_BINARY),
        }
    }
}

impl ProbeConfig {
    pub fn with_port(mut self, port: u16) -> Self {
        self.port = port;
        self
    }

    pub fn with_connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout = timeout;
        self
    }

    pub fn with_session_timeout(mut self, timeout: Duration) -> Self {
        self.session_timeout = timeout;
        self
    }

    pub fn with_smbclient_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.smbclient_path = path.into();
        self
    }
}
