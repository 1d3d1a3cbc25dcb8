//! smbprobe command-line front end
//!
//! Collects host, share, username and password, runs one diagnosis on a
//! background task and prints the report. Exits non-zero when the diagnosis failed.

use clap::Parser;
use smbprobe::constants::{SMB_PORT, SMB_SESSION_TIMEOUT_SECS, TCP_PROBE_TIMEOUT_MS};
use smbprobe::logger::{self, FileLogSink, LogSink};
use smbprobe::normalize::{normalize_host, normalize_share_name, normalize_username};
use smbprobe::platform::SmbClient;
use smbprobe::{Diagnostician, ProbeConfig, ProbeLatch, SecureString};
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;
use std::time::Duration;

/// Diagnose why an SMB/CIFS share cannot be reached
#[derive(Debug, Parser)]
#[command(name = "smbprobe", version, about)]
struct Args {
    /// Server IP address or hostname (smb:// and \\server forms accepted)
    host: String,

    /// Share name, e.g. Public or C$
    share: String,

    /// Account name; leave empty for anonymous access
    #[arg(short, long, default_value = "")]
    username: String,

    /// Account password
    #[arg(short, long, env = "SMBPROBE_PASSWORD", default_value = "", hide_env_values = true)]
    password: String,

    /// SMB port used for both the network test and the session
    #[arg(long, default_value_t = SMB_PORT)]
    port: u16,

    /// TCP connect timeout in milliseconds
    #[arg(long, default_value_t = TCP_PROBE_TIMEOUT_MS)]
    timeout_ms: u64,

    /// Bound on session setup plus the root listing, in seconds
    #[arg(long, default_value_t = SMB_SESSION_TIMEOUT_SECS)]
    session_timeout_secs: u64,

    /// Path to the smbclient executable
    #[arg(long)]
    smbclient: Option<PathBuf>,

    /// Append the trace log here instead of the per-user data directory
    #[arg(long)]
    log_file: Option<PathBuf>,

    /// Print the report as JSON
    #[arg(long)]
    json: bool,
}

impl Args {
    fn config(&self) -> ProbeConfig {
        let config = ProbeConfig::default()
            .with_port(self.port)
            .with_connect_timeout(Duration::from_millis(self.timeout_ms))
            .with_session_timeout(Duration::from_secs(self.session_timeout_secs));
        match &self.smbclient {
            Some(path) => config.with_smbclient_path(path.clone()),
            None => config,
        }
    }
}

fn main() -> ExitCode {
    let args = Args::parse();

    let sink: Arc<dyn LogSink> = Arc::new(match &args.log_file {
        Some(path) => FileLogSink::new(path.clone()),
        None => FileLogSink::default_location(),
    });
    logger::init_log_sink(Arc::clone(&sink));

    let runtime = match tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
    {
        Ok(runtime) => runtime,
        Err(e) => {
            eprintln!("Failed to start async runtime: {}", e);
            return ExitCode::FAILURE;
        }
    };

    let code = runtime.block_on(run(args, sink));
    logger::shutdown();
    code
}

async fn run(args: Args, sink: Arc<dyn LogSink>) -> ExitCode {
    let latch = ProbeLatch::new();
    let Some(_guard) = latch.try_acquire() else {
        eprintln!("A test is already running");
        return ExitCode::FAILURE;
    };

    let config = args.config();
    let client = Arc::new(SmbClient::new(&config));
    let diagnostician = Arc::new(Diagnostician::new(client, sink, config));

    let task = diagnostician.spawn(
        normalize_host(&args.host),
        normalize_share_name(&args.share),
        normalize_username(&args.username),
        SecureString::new(args.password),
    );

    let Some(report) = task.report().await else {
        eprintln!("Test cancelled");
        return ExitCode::FAILURE;
    };

    if args.json {
        match serde_json::to_string_pretty(&report) {
            Ok(json) => println!("{}", json),
            Err(e) => {
                eprintln!("Failed to serialize report: {}", e);
                return ExitCode::FAILURE;
            }
        }
    } else {
        println!("{}", report);
    }

    if report.succeeded {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    }
}
