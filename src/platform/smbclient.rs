//! SMB share access through the Samba `smbclient` tool
//!
//! Implements [`ShareClient`] for production use by running
//! `smbclient //host/share -p <port> -c ls` and parsing its output.
//!
//! # Session lifecycle
//!
//! `connect()` is lightweight (no network call). Session setup, tree connect
//! and the listing all happen inside the single `smbclient` run made by
//! `list_root()`. The child is spawned with `kill_on_drop`, so a caller that
//! times out the future also terminates the process.
//!
//! # Credentials
//!
//! Anonymous requests pass `-U %` (empty user, empty password) plus `-N`, so
//! smbclient cannot fall back to the local account. Authenticated requests pass
//! `-U <username>` and hand the password over in the `PASSWD` environment
//! variable, so it never appears in the process arguments.

use crate::config::ProbeConfig;
use crate::constants::SMBCLIENT_PASSWORD_ENV;
use crate::core::session::{DirectoryEntry, ShareClient, ShareSession};
use crate::models::{ProbeRequest, ShareAuth};
use crate::utils::ShareError;
use regex::Regex;
use std::path::PathBuf;
use std::process::Stdio;
use std::sync::LazyLock;
use tokio::process::Command;

/// `  name   DA   1234  Tue Feb 13 09:21:44 2024`
static LISTING_LINE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"^\s+(?P<name>.+?)\s+(?P<attrs>[A-Za-z]*)\s+(?P<size>\d+)\s+\w{3}\s+\w{3}\s+\d{1,2}\s+\d{2}:\d{2}:\d{2}\s+\d{4}\s*$",
    )
    .expect("listing pattern compiles")
});

/// stderr chatter from a client without a usable smb.conf
const NOISE_PREFIXES: &[&str] = &[
    "Can't load ",
    "lp_load_ex:",
    "WARNING: The \"syslog\" option is deprecated",
    "Try \"help\" to get a list of possible commands.",
];

static NT_STATUS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"NT_STATUS_[A-Z0-9_]+").expect("status pattern compiles"));

/// Production share client
pub struct SmbClient {
    program: PathBuf,
    port: u16,
}

impl SmbClient {
    pub fn new(config: &ProbeConfig) -> Self {
        Self {
            program: config.smbclient_path.clone(),
            port: config.port,
        }
    }
}

#[async_trait::async_trait]
impl ShareClient for SmbClient {
    async fn connect(&self, request: &ProbeRequest) -> Result<Box<dyn ShareSession>, ShareError> {
        Ok(Box::new(SmbClientSession {
            program: self.program.clone(),
            port: self.port,
            request: request.clone(),
        }))
    }
}

/// One share bound to one set of credentials
pub struct SmbClientSession {
    program: PathBuf,
    port: u16,
    request: ProbeRequest,
}

impl SmbClientSession {
    fn command(&self) -> Command {
        let mut cmd = Command::new(&self.program);
        cmd.arg(format!(
            "//{}/{}",
            self.request.host(),
            self.request.share_name()
        ))
        .arg("-p")
        .arg(self.port.to_string())
        .arg("-c")
        .arg("ls")
        .env_remove(SMBCLIENT_PASSWORD_ENV)
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .kill_on_drop(true);

        match self.request.auth() {
            ShareAuth::Anonymous => {
                cmd.arg("-U").arg("%").arg("-N");
            }
            ShareAuth::Ntlm {
                domain,
                username,
                password,
            } => {
                cmd.arg("-U").arg(username.as_str());
                if !domain.is_empty() {
                    cmd.arg("-W").arg(domain);
                }
                // SECURITY: environment, not argv
                cmd.env(SMBCLIENT_PASSWORD_ENV, password.as_str());
            }
        }

        cmd
    }

    fn redact(&self, text: &str) -> String {
        match self.request.auth() {
            ShareAuth::Ntlm { password, .. } if !password.is_empty() => {
                text.replace(password.as_str(), "<redacted>")
            }
            _ => text.to_string(),
        }
    }
}

#[async_trait::async_trait]
impl ShareSession for SmbClientSession {
    async fn list_root(&self) -> Result<Vec<DirectoryEntry>, ShareError> {
        let output = self.command().output().await.map_err(|e| {
            ShareError::Io(format!(
                "Failed to launch {}: {}",
                self.program.display(),
                e
            ))
        })?;

        let stdout = self.redact(&String::from_utf8_lossy(&output.stdout));
        let stderr = self.redact(&String::from_utf8_lossy(&output.stderr));

        if let Some(code) = find_status(&stderr).or_else(|| find_status(&stdout)) {
            // An empty share answers `ls` with NO_SUCH_FILE
            if code == "NT_STATUS_NO_SUCH_FILE" {
                return Ok(parse_listing(&stdout));
            }
            return Err(map_status(code, &stderr, &stdout));
        }

        if !output.status.success() {
            let detail = first_line(&stderr)
                .or_else(|| first_line(&stdout))
                .map(str::to_string)
                .unwrap_or_else(|| format!("smbclient exited with {}", output.status));
            return Err(ShareError::Protocol(detail));
        }

        Ok(parse_listing(&stdout))
    }
}

/// Parse `ls` output into entries, in server order, without `.` and `..`
pub fn parse_listing(output: &str) -> Vec<DirectoryEntry> {
    output
        .lines()
        .filter_map(|line| LISTING_LINE.captures(line))
        .filter_map(|caps| {
            let name = caps.name("name")?.as_str();
            if name == "." || name == ".." {
                return None;
            }
            let attrs = caps.name("attrs").map(|m| m.as_str()).unwrap_or_default();
            Some(DirectoryEntry {
                name: name.to_string(),
                is_directory: attrs.contains('D'),
            })
        })
        .collect()
}

/// First status code outside the listing rows; file names may contain one
fn find_status(text: &str) -> Option<&str> {
    text.lines()
        .filter(|line| !LISTING_LINE.is_match(line))
        .find_map(|line| NT_STATUS.find(line))
        .map(|m| m.as_str())
}

fn first_line(text: &str) -> Option<&str> {
    text.lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .find(|line| !NOISE_PREFIXES.iter().any(|noise| line.starts_with(noise)))
}

/// Translate an `NT_STATUS_*` code into a typed error
///
/// Messages carry the phrases the failure classifier looks for.
fn map_status(code: &str, stderr: &str, stdout: &str) -> ShareError {
    match code {
        "NT_STATUS_ACCESS_DENIED" => {
            ShareError::AccessDenied(format!("Access is denied. ({})", code))
        }
        "NT_STATUS_LOGON_FAILURE" | "NT_STATUS_WRONG_PASSWORD" | "NT_STATUS_NO_SUCH_USER" => {
            ShareError::Authentication(format!(
                "Authentication failed: unknown user name or bad password ({})",
                code
            ))
        }
        "NT_STATUS_ACCOUNT_LOCKED_OUT" => ShareError::Authentication(format!(
            "Authentication failed: account is locked out ({})",
            code
        )),
        "NT_STATUS_ACCOUNT_DISABLED" => ShareError::Authentication(format!(
            "Authentication failed: account is disabled ({})",
            code
        )),
        "NT_STATUS_PASSWORD_EXPIRED" | "NT_STATUS_PASSWORD_MUST_CHANGE" => {
            ShareError::Authentication(format!(
                "Authentication failed: password has expired ({})",
                code
            ))
        }
        "NT_STATUS_BAD_NETWORK_NAME" => {
            ShareError::NotFound(format!("The network name was not found ({})", code))
        }
        "NT_STATUS_OBJECT_NAME_NOT_FOUND" | "NT_STATUS_OBJECT_PATH_NOT_FOUND" => {
            ShareError::NotFound(format!("The object name was not found ({})", code))
        }
        "NT_STATUS_CONNECTION_REFUSED" => {
            ShareError::ConnectionRefused(format!("Connection refused ({})", code))
        }
        "NT_STATUS_IO_TIMEOUT" => {
            ShareError::Timeout(format!("Timed out waiting for SMB response ({})", code))
        }
        "NT_STATUS_HOST_UNREACHABLE" | "NT_STATUS_NETWORK_UNREACHABLE" => {
            ShareError::Connection(format!("Host is unreachable ({})", code))
        }
        _ => {
            let detail = stderr
                .lines()
                .chain(stdout.lines())
                .filter(|line| !LISTING_LINE.is_match(line))
                .map(str::trim)
                .find(|line| line.contains(code))
                .unwrap_or(code);
            ShareError::Protocol(detail.to_string())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE_LISTING: &str = "  .                                   D        0  Mon Jan  8 10:15:02 2024
  ..                                  D        0  Mon Jan  8 10:15:02 2024
  Shared                              D        0  Tue Feb 13 09:21:44 2024
  readme.txt                          A      123  Tue Feb 13 09:21:44 2024
  My Documents                       DH        0  Wed Mar  6 17:03:11 2024
  notes DH.txt                        N     4096  Thu Mar  7 08:00:00 2024

\t\t30297016 blocks of size 1024. 12637128 blocks available
";

    #[test]
    fn test_parse_listing_skips_dot_entries_and_keeps_order() {
        let entries = parse_listing(SAMPLE_LISTING);
        assert_eq!(
            entries,
            vec![
                DirectoryEntry::directory("Shared"),
                DirectoryEntry::file("readme.txt"),
                DirectoryEntry::directory("My Documents"),
                DirectoryEntry::file("notes DH.txt"),
            ]
        );
    }

    #[test]
    fn test_parse_listing_ignores_noise() {
        let output = "Can't load /etc/samba/smb.conf - run testparm to debug it\n\
                      Try \"help\" to get a list of possible commands.\n";
        assert!(parse_listing(output).is_empty());
    }

    #[test]
    fn test_status_mapping_feeds_classifier() {
        use crate::core::classifier::{classify, ErrorCategory};

        let cases = [
            ("NT_STATUS_ACCESS_DENIED", ErrorCategory::AccessDenied),
            ("NT_STATUS_LOGON_FAILURE", ErrorCategory::AuthenticationFailed),
            ("NT_STATUS_ACCOUNT_LOCKED_OUT", ErrorCategory::AuthenticationFailed),
            ("NT_STATUS_BAD_NETWORK_NAME", ErrorCategory::ShareNotFound),
            ("NT_STATUS_CONNECTION_REFUSED", ErrorCategory::ConnectionRefused),
            ("NT_STATUS_IO_TIMEOUT", ErrorCategory::Unclassified),
        ];
        for (code, expected) in cases {
            let error = map_status(code, "", "");
            assert_eq!(classify(&error.to_string()), expected, "{}", code);
        }
    }

    #[test]
    fn test_unknown_status_keeps_tool_line() {
        let error = map_status(
            "NT_STATUS_INVALID_NETWORK_RESPONSE",
            "protocol negotiation failed: NT_STATUS_INVALID_NETWORK_RESPONSE\n",
            "",
        );
        assert_eq!(error.kind(), "Protocol");
        assert_eq!(
            error.to_string(),
            "protocol negotiation failed: NT_STATUS_INVALID_NETWORK_RESPONSE"
        );
    }

    #[cfg(unix)]
    mod fake_tool {
        use super::*;
        use std::os::unix::fs::PermissionsExt;
        use std::path::Path;
        use tempfile::TempDir;

        /// Script that records its arguments and `PASSWD`, then runs `body`
        fn fake_smbclient(dir: &Path, body: &str) -> PathBuf {
            let script = dir.join("smbclient");
            let contents = format!(
                "#!/bin/sh\n\
                 printf '%s\\n' \"$@\" > \"{dir}/args.txt\"\n\
                 printf '%s' \"${{PASSWD-<unset>}}\" > \"{dir}/passwd.txt\"\n\
                 {body}\n",
                dir = dir.display(),
                body = body
            );
            std::fs::write(&script, contents).unwrap();
            std::fs::set_permissions(&script, std::fs::Permissions::from_mode(0o755)).unwrap();
            script
        }

        fn client(script: PathBuf) -> SmbClient {
            SmbClient::new(
                &ProbeConfig::default()
                    .with_port(1445)
                    .with_smbclient_path(script),
            )
        }

        async fn list(
            client: &SmbClient,
            request: &ProbeRequest,
        ) -> Result<Vec<DirectoryEntry>, ShareError> {
            client.connect(request).await?.list_root().await
        }

        #[tokio::test]
        async fn test_anonymous_run_uses_null_session() {
            let dir = TempDir::new().unwrap();
            let script = fake_smbclient(
                dir.path(),
                "echo '  Shared                              D        0  Tue Feb 13 09:21:44 2024'",
            );
            let request = ProbeRequest::from_parts("10.0.0.5", "Public", "", "").unwrap();

            let entries = list(&client(script), &request).await.unwrap();

            assert_eq!(entries, vec![DirectoryEntry::directory("Shared")]);
            let args = std::fs::read_to_string(dir.path().join("args.txt")).unwrap();
            let args: Vec<&str> = args.lines().collect();
            assert_eq!(
                args,
                vec!["//10.0.0.5/Public", "-p", "1445", "-c", "ls", "-U", "%", "-N"]
            );
            let passwd = std::fs::read_to_string(dir.path().join("passwd.txt")).unwrap();
            assert_eq!(passwd, "<unset>");
        }

        #[tokio::test]
        async fn test_password_travels_in_environment() {
            let dir = TempDir::new().unwrap();
            let script = fake_smbclient(dir.path(), "true");
            let request =
                ProbeRequest::from_parts("fileserver", "Docs", "alice", "s3cret!").unwrap();

            let entries = list(&client(script), &request).await.unwrap();

            assert!(entries.is_empty());
            let args = std::fs::read_to_string(dir.path().join("args.txt")).unwrap();
            assert!(args.lines().any(|a| a == "-U"));
            assert!(args.lines().any(|a| a == "alice"));
            assert!(!args.contains("s3cret!"));
            assert!(!args.lines().any(|a| a == "-N"));
            let passwd = std::fs::read_to_string(dir.path().join("passwd.txt")).unwrap();
            assert_eq!(passwd, "s3cret!");
        }

        #[tokio::test]
        async fn test_logon_failure_maps_to_authentication() {
            let dir = TempDir::new().unwrap();
            let script = fake_smbclient(
                dir.path(),
                "echo 'session setup failed: NT_STATUS_LOGON_FAILURE' >&2; exit 1",
            );
            let request = ProbeRequest::from_parts("fileserver", "Docs", "alice", "bad").unwrap();

            let error = list(&client(script), &request).await.unwrap_err();

            assert_eq!(error.kind(), "Authentication");
            assert!(error.to_string().contains("Authentication failed"));
        }

        #[tokio::test]
        async fn test_empty_share_is_not_an_error() {
            let dir = TempDir::new().unwrap();
            let script = fake_smbclient(
                dir.path(),
                "echo 'NT_STATUS_NO_SUCH_FILE listing \\*'; exit 1",
            );
            let request = ProbeRequest::from_parts("fileserver", "Empty", "", "").unwrap();

            let entries = list(&client(script), &request).await.unwrap();

            assert!(entries.is_empty());
        }

        #[tokio::test]
        async fn test_echoed_password_is_redacted() {
            let dir = TempDir::new().unwrap();
            let script = fake_smbclient(dir.path(), "echo \"bad option $PASSWD\" >&2; exit 2");
            let request =
                ProbeRequest::from_parts("fileserver", "Docs", "alice", "hunter2").unwrap();

            let error = list(&client(script), &request).await.unwrap_err();

            assert_eq!(error.kind(), "Protocol");
            assert_eq!(error.to_string(), "bad option <redacted>");
        }

        #[tokio::test]
        async fn test_status_code_in_file_name_is_still_a_listing() {
            let dir = TempDir::new().unwrap();
            let script = fake_smbclient(
                dir.path(),
                "echo '  NT_STATUS_ACCESS_DENIED.txt          A      123  Tue Feb 13 09:21:44 2024'",
            );
            let request = ProbeRequest::from_parts("fileserver", "Docs", "", "").unwrap();

            let entries = list(&client(script), &request).await.unwrap();

            assert_eq!(entries, vec![DirectoryEntry::file("NT_STATUS_ACCESS_DENIED.txt")]);
        }

        #[tokio::test]
        async fn test_config_noise_does_not_hide_failure() {
            let dir = TempDir::new().unwrap();
            let script = fake_smbclient(
                dir.path(),
                "echo \"Can't load /etc/samba/smb.conf - run testparm to debug it\" >&2\n\
                 echo 'protocol negotiation failed: broken pipe' >&2\n\
                 exit 1",
            );
            let request = ProbeRequest::from_parts("fileserver", "Docs", "", "").unwrap();

            let error = list(&client(script), &request).await.unwrap_err();

            assert_eq!(error.kind(), "Protocol");
            assert_eq!(error.to_string(), "protocol negotiation failed: broken pipe");
        }

        #[tokio::test]
        async fn test_missing_binary_is_io_error() {
            let dir = TempDir::new().unwrap();
            let request = ProbeRequest::from_parts("fileserver", "Docs", "", "").unwrap();

            let error = list(&client(dir.path().join("no-such-tool")), &request)
                .await
                .unwrap_err();

            assert_eq!(error.kind(), "Io");
            assert!(error.to_string().starts_with("Failed to launch"));
        }
    }
}
