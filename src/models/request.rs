use super::credentials::ShareAuth;
use crate::constants::MAX_HOSTNAME_LENGTH;
use crate::utils::ValidationError;

/// One validated diagnosis target
///
/// Host and share are guaranteed non-empty once constructed.
#[derive(Clone, Debug)]
pub struct ProbeRequest {
    host: String,
    share_name: String,
    auth: ShareAuth,
}

impl ProbeRequest {
    pub fn new(
        host: impl Into<String>,
        share_name: impl Into<String>,
        auth: ShareAuth,
    ) -> Result<Self, ValidationError> {
        let host = host.into();
        let share_name = share_name.into();

        if host.is_empty() {
            return Err(ValidationError::EmptyHost);
        }
        if host.len() > MAX_HOSTNAME_LENGTH {
            return Err(ValidationError::InvalidHost(format!(
                "exceeds maximum length ({})",
                MAX_HOSTNAME_LENGTH
            )));
        }
        if share_name.is_empty() {
            return Err(ValidationError::EmptyShare);
        }

        Ok(Self {
            host,
            share_name,
            auth,
        })
    }

    /// Build from the four raw strings a front end collects
    pub fn from_parts(
        host: &str,
        share_name: &str,
        username: &str,
        password: &str,
    ) -> Result<Self, ValidationError> {
        Self::new(host, share_name, ShareAuth::from_parts(username, password)?)
    }

    pub fn host(&self) -> &str {
        &self.host
    }

    pub fn share_name(&self) -> &str {
        &self.share_name
    }

    pub fn auth(&self) -> &ShareAuth {
        &self.auth
    }

    /// `smb://host/share/` address of the share root
    pub fn share_url(&self) -> String {
        format!("smb://{}/{}/", self.host, self.share_name)
    }
}
