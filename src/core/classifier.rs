//! Maps SMB failure messages to remediation categories
//!
//! Matching is a case-insensitive substring search over an ordered table; the
//! first row that matches wins. Access denial sits above share-not-found
//! because some servers phrase a denial as "... not found".
//!
//! The messages come from the protocol layer as free text and vary by server
//! and locale, so [`ErrorCategory::Unclassified`] is an ordinary outcome.

use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ErrorCategory {
    AccessDenied,
    ConnectionRefused,
    AuthenticationFailed,
    ShareNotFound,
    Unclassified,
}

impl ErrorCategory {
    /// Heading used in the remediation block, `None` for unclassified failures
    pub fn heading(&self) -> Option<&'static str> {
        match self {
            ErrorCategory::AccessDenied => Some("ACCESS DENIED - permissions problem:"),
            ErrorCategory::ConnectionRefused => Some("CONNECTION REFUSED - network problem:"),
            ErrorCategory::AuthenticationFailed => {
                Some("AUTHENTICATION FAILED - credentials problem:")
            }
            ErrorCategory::ShareNotFound => Some("SHARE NOT FOUND - share name problem:"),
            ErrorCategory::Unclassified => None,
        }
    }

    /// Category-specific remediation steps
    pub fn remediation(&self) -> &'static [&'static str] {
        match self {
            ErrorCategory::AccessDenied => &[
                "Check the Windows account permissions",
                "Make sure the user has access to the shared folder",
                "Try an Administrator account",
            ],
            ErrorCategory::ConnectionRefused => &[
                "Check the IP address is correct",
                "Make sure both computers are on the same network",
                "Check Windows Firewall",
            ],
            ErrorCategory::AuthenticationFailed => &[
                "Check the username and password are correct",
                "Try the format: COMPUTERNAME\\Username",
                "Make sure the account is not locked",
            ],
            ErrorCategory::ShareNotFound => &[
                "Check the share name is correct",
                "Make sure the folder has been shared",
                "Try 'SharedDocs' or 'C$'",
            ],
            ErrorCategory::Unclassified => &[],
        }
    }
}

impl fmt::Display for ErrorCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ErrorCategory::AccessDenied => "access denied",
            ErrorCategory::ConnectionRefused => "connection refused",
            ErrorCategory::AuthenticationFailed => "authentication failed",
            ErrorCategory::ShareNotFound => "share not found",
            ErrorCategory::Unclassified => "unclassified",
        };
        f.write_str(name)
    }
}

/// Priority-ordered `(lowercase pattern, category)` table
pub const CLASSIFICATION_RULES: &[(&str, ErrorCategory)] = &[
    ("access is denied", ErrorCategory::AccessDenied),
    ("connection refused", ErrorCategory::ConnectionRefused),
    ("authentication failed", ErrorCategory::AuthenticationFailed),
    ("not found", ErrorCategory::ShareNotFound),
];

/// Classify a failure message
pub fn classify(error_message: &str) -> ErrorCategory {
    let lowercase = error_message.to_lowercase();

    CLASSIFICATION_RULES
        .iter()
        .find(|(pattern, _)| lowercase.contains(pattern))
        .map(|(_, category)| *category)
        .unwrap_or(ErrorCategory::Unclassified)
}
