//! Credential types for SMB authentication
//!
//! SECURITY: Credential types implement Drop to clear sensitive data.

use crate::constants::MAX_USERNAME_LENGTH;
use crate::utils::ValidationError;
use std::fmt;

/// Windows-style username
///
/// Valid formats:
/// - `user` (local user)
/// - `COMPUTERNAME\\user` (local account qualified by machine)
/// - `DOMAIN\\user` (domain user)
/// - `user@domain.com` (UPN format)
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Username(String);

impl Username {
    /// Create a new username after validation
    pub fn new(username: impl Into<String>) -> Result<Self, ValidationError> {
        let username = username.into();

        if username.is_empty() {
            return Err(ValidationError::InvalidUsername(
                "Username cannot be empty".to_string(),
            ));
        }

        if username.len() > MAX_USERNAME_LENGTH {
            return Err(ValidationError::InvalidUsername(format!(
                "Username exceeds maximum length ({})",
                MAX_USERNAME_LENGTH
            )));
        }

        Ok(Username(username))
    }

    /// Get the username as a string slice
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Username {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Password that zeros memory on drop
///
/// SECURITY: This type never implements Display or Debug in a way that reveals the password.
pub struct SecureString(String);

impl Clone for SecureString {
    fn clone(&self) -> Self {
        SecureString(self.0.clone())
    }
}

impl SecureString {
    /// Create a new secure string
    pub fn new(password: impl Into<String>) -> Self {
        SecureString(password.into())
    }

    /// Get the password as a string slice
    ///
    /// Use this sparingly and only when handing the secret to the protocol layer.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl Drop for SecureString {
    fn drop(&mut self) {
        // SAFETY: writing zero bytes keeps the buffer valid UTF-8
        unsafe {
            let bytes = self.0.as_bytes_mut();
            for byte in bytes {
                std::ptr::write_volatile(byte, 0);
            }
        }
    }
}

impl fmt::Debug for SecureString {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "SecureString(*** {} bytes ***)", self.0.len())
    }
}

/// How the SMB session authenticates
#[derive(Clone, Debug)]
pub enum ShareAuth {
    /// Null session; chosen whenever the username is empty
    Anonymous,
    /// NTLM with an empty domain, matching what a user types into a login box
    Ntlm {
        domain: String,
        username: Username,
        password: SecureString,
    },
}

impl ShareAuth {
    /// Pick the auth mode from raw front-end fields.
    ///
    /// An empty username always selects [`ShareAuth::Anonymous`], whatever the password holds.
    pub fn from_parts(username: &str, password: &str) -> Result<Self, ValidationError> {
        if username.is_empty() {
            return Ok(ShareAuth::Anonymous);
        }
        Ok(ShareAuth::Ntlm {
            domain: String::new(),
            username: Username::new(username)?,
            password: SecureString::new(password),
        })
    }

    pub fn is_anonymous(&self) -> bool {
        matches!(self, ShareAuth::Anonymous)
    }

    /// Username for display, empty when anonymous
    pub fn username(&self) -> &str {
        match self {
            ShareAuth::Anonymous => "",
            ShareAuth::Ntlm { username, .. } => username.as_str(),
        }
    }

    pub fn has_password(&self) -> bool {
        match self {
            ShareAuth::Anonymous => false,
            ShareAuth::Ntlm { password, .. } => !password.is_empty(),
        }
    }
}
