//! Human-readable diagnosis reports
//!
//! A report is a flat list of lines; the front end decides how to show them.
//! It never carries the password, not even masked.

use super::classifier::classify;
use super::probes::{ProtocolProbeResult, ReachabilityResult};
use crate::models::ProbeRequest;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;

/// Terminal artifact of one diagnosis run
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct DiagnosisReport {
    pub succeeded: bool,
    pub summary_lines: Vec<String>,
}

impl DiagnosisReport {
    /// Report for a fault that prevented the probes from completing
    pub fn unexpected_failure(message: &str, log_path: Option<&PathBuf>) -> Self {
        let mut lines = vec![format!("Error: {}", message)];
        push_general_checklist(&mut lines, log_path);
        Self {
            succeeded: false,
            summary_lines: lines,
        }
    }

    pub fn render(&self) -> String {
        self.summary_lines.join("\n")
    }

    /// True when any line contains `needle`
    pub fn contains(&self, needle: &str) -> bool {
        self.summary_lines.iter().any(|line| line.contains(needle))
    }
}

impl fmt::Display for DiagnosisReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.render())
    }
}

/// Request details echoed back in the report
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReportContext {
    pub host: String,
    pub share_name: String,
    pub username: String,
    pub url: String,
    pub port: u16,
    pub log_path: Option<PathBuf>,
}

impl ReportContext {
    pub fn new(request: &ProbeRequest, port: u16) -> Self {
        Self {
            host: request.host().to_string(),
            share_name: request.share_name().to_string(),
            username: request.auth().username().to_string(),
            url: request.share_url(),
            port,
            log_path: None,
        }
    }

    pub fn with_log_path(mut self, path: Option<PathBuf>) -> Self {
        self.log_path = path;
        self
    }
}

/// Assemble the report from both probe outcomes
///
/// `protocol` is ignored when the host was unreachable; it never ran.
pub fn format_report(
    context: &ReportContext,
    reachability: &ReachabilityResult,
    protocol: Option<&ProtocolProbeResult>,
) -> DiagnosisReport {
    match (reachability, protocol) {
        (ReachabilityResult::Unreachable { cause }, _) => network_failure(context, cause),
        (ReachabilityResult::Reachable, Some(ProtocolProbeResult::Listed { entries })) => {
            let mut lines = vec![
                "Connection SUCCESSFUL!".to_string(),
                String::new(),
                format!("Server: {}", context.host),
                format!("Share: {}", context.share_name),
                format!("User: {}", display_user(&context.username)),
                format!("URL: {}", context.url),
                "Files in root directory:".to_string(),
            ];
            if entries.is_empty() {
                lines.push("(Empty directory)".to_string());
            } else {
                lines.extend(
                    entries
                        .iter()
                        .map(|entry| format!("{} {}", entry.type_tag(), entry.name)),
                );
            }
            lines.push(String::new());
            lines.push("SMB connection test completed successfully.".to_string());

            DiagnosisReport {
                succeeded: true,
                summary_lines: lines,
            }
        }
        (
            ReachabilityResult::Reachable,
            Some(ProtocolProbeResult::Failed {
                error_kind,
                error_message,
            }),
        ) => protocol_failure(context, error_kind, error_message),
        (ReachabilityResult::Reachable, None) => DiagnosisReport::unexpected_failure(
            "SMB probe did not run after a successful network test",
            context.log_path.as_ref(),
        ),
    }
}

fn display_user(username: &str) -> &str {
    if username.is_empty() {
        "(anonymous)"
    } else {
        username
    }
}

fn network_failure(context: &ReportContext, cause: &str) -> DiagnosisReport {
    let lines = vec![
        "NETWORK CONNECTION FAILED!".to_string(),
        String::new(),
        format!(
            "Cannot connect to {}:{} (SMB port)",
            context.host, context.port
        ),
        format!("Error: {}", cause),
        String::new(),
        "TROUBLESHOOTING:".to_string(),
        "1. Check the IP address is correct".to_string(),
        "2. Make sure both computers are on the same network".to_string(),
        "3. Check Windows Firewall:".to_string(),
        format!("   - Allow port {} (SMB)", context.port),
        "   - Allow File and Printer Sharing".to_string(),
        format!("4. Test ping: ping {}", context.host),
        "5. Check the Windows SMB service is running".to_string(),
        "6. Try disabling Windows Firewall temporarily".to_string(),
    ];

    DiagnosisReport {
        succeeded: false,
        summary_lines: lines,
    }
}

fn protocol_failure(
    context: &ReportContext,
    error_kind: &str,
    error_message: &str,
) -> DiagnosisReport {
    let mut lines = vec![
        "Connection FAILED!".to_string(),
        String::new(),
        format!("Error: {}", error_message),
        format!("Error Type: {}", error_kind),
    ];

    let category = classify(error_message);
    if let Some(heading) = category.heading() {
        lines.push(String::new());
        lines.push(heading.to_string());
        lines.extend(
            category
                .remediation()
                .iter()
                .enumerate()
                .map(|(i, step)| format!("{}. {}", i + 1, step)),
        );
    }

    push_general_checklist(&mut lines, context.log_path.as_ref());

    DiagnosisReport {
        succeeded: false,
        summary_lines: lines,
    }
}

const GENERAL_CHECKLIST: &[&str] = &[
    "CHECKLIST for Windows 10/11:",
    "1. Enable Network Discovery:",
    "   - Control Panel > Network > Network and Sharing Center",
    "   - Advanced sharing settings > Turn on network discovery",
    "2. Enable File Sharing:",
    "   - Advanced sharing settings > Turn on file and printer sharing",
    "3. Check Windows Credentials:",
    "   - Use username: COMPUTERNAME\\Username",
    "   - Or use the local account password",
    "4. Enable SMB:",
    "   - Run: optionalfeatures.exe",
    "   - Enable SMB 1.0/CIFS File Sharing Support",
    "5. Check Firewall:",
    "   - Allow File and Printer Sharing",
    "6. Test Share Permissions:",
    "   - Right-click folder > Properties > Sharing",
    "   - Add the user with Full Control",
    "7. Test with the correct IP address",
    "8. Run 'net share' on the server to list shares",
];

fn push_general_checklist(lines: &mut Vec<String>, log_path: Option<&PathBuf>) {
    lines.push(String::new());
    lines.extend(GENERAL_CHECKLIST.iter().map(|line| line.to_string()));
    if let Some(path) = log_path {
        lines.push(String::new());
        lines.push(format!("Log file saved to: {}", path.display()));
    }
}
