//! SMB session abstraction
//!
//! This trait pair allows testing without real file servers by supporting mock implementations.
//! The production implementation lives in `src/platform/`.

use crate::models::ProbeRequest;
use crate::utils::ShareError;
use serde::{Deserialize, Serialize};

/// One item in a share's root directory
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct DirectoryEntry {
    pub name: String,
    pub is_directory: bool,
}

impl DirectoryEntry {
    pub fn directory(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            is_directory: true,
        }
    }

    pub fn file(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            is_directory: false,
        }
    }

    /// `[DIR]` or `[FILE]`
    pub fn type_tag(&self) -> &'static str {
        if self.is_directory {
            "[DIR]"
        } else {
            "[FILE]"
        }
    }
}

/// Factory for sessions against a share
///
/// `connect` selects the authentication mode from the request: anonymous when the
/// username is empty, NTLM otherwise. It may defer network traffic to the first
/// operation on the returned session.
#[async_trait::async_trait]
pub trait ShareClient: Send + Sync {
    async fn connect(&self, request: &ProbeRequest) -> Result<Box<dyn ShareSession>, ShareError>;
}

/// An established (or lazily established) session bound to one share
#[async_trait::async_trait]
pub trait ShareSession: Send + Sync {
    /// List the share root, in the order the server returns entries
    ///
    /// `.` and `..` are never included.
    async fn list_root(&self) -> Result<Vec<DirectoryEntry>, ShareError>;
}
