//! Diagnostic trace log
//!
//! Probes write through the [`LogSink`] capability they are handed. The file
//! sink opens, appends one line and closes on every call, so there is no
//! handle to leak and no buffering to reorder lines.

use crate::constants::{APP_DIR_NAME, LOG_FILE_NAME, LOG_TIMESTAMP_FORMAT};
use crate::utils::LogError;
use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, OnceLock};

/// Destination for trace lines
pub trait LogSink: Send + Sync {
    /// Append one message. Implementations add their own framing.
    fn append_line(&self, message: &str);

    /// Where the log ends up on disk, when it is a file
    fn location(&self) -> Option<&Path> {
        None
    }
}

/// Append-only file sink with `[yyyy-MM-dd HH:mm:ss.SSS] message` lines
#[derive(Debug, Clone)]
pub struct FileLogSink {
    path: PathBuf,
}

impl FileLogSink {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Sink at `<local data dir>/smbprobe/smbprobe_debug.log`
    pub fn default_location() -> Self {
        let dir = dirs::data_local_dir()
            .map(|base| base.join(APP_DIR_NAME))
            .unwrap_or_else(|| PathBuf::from("."));
        Self::new(dir.join(LOG_FILE_NAME))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn timestamp() -> String {
        chrono::Local::now()
            .format(LOG_TIMESTAMP_FORMAT)
            .to_string()
    }

    /// Format a message the way it is stored on disk
    pub fn frame(message: &str) -> String {
        format!("[{}] {}", Self::timestamp(), message)
    }

    pub fn try_append(&self, message: &str) -> Result<(), LogError> {
        let to_log_error = |source| LogError::Io {
            path: self.path.display().to_string(),
            source,
        };

        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent).map_err(to_log_error)?;
            }
        }

        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .map_err(to_log_error)?;
        writeln!(file, "{}", Self::frame(message)).map_err(to_log_error)
    }
}

impl LogSink for FileLogSink {
    fn append_line(&self, message: &str) {
        // Console echo in dev builds, unbuffered
        #[cfg(debug_assertions)]
        eprintln!("[smbprobe] {}", message);

        if let Err(e) = self.try_append(message) {
            #[cfg(debug_assertions)]
            eprintln!("[smbprobe] {}", e);
            #[cfg(not(debug_assertions))]
            let _ = e;
        }
    }

    fn location(&self) -> Option<&Path> {
        Some(&self.path)
    }
}

/// In-memory sink, keeps messages unframed and in call order
#[derive(Debug, Default)]
pub struct MemoryLogSink {
    lines: Mutex<Vec<String>>,
}

impl MemoryLogSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn lines(&self) -> Vec<String> {
        self.lines
            .lock()
            .map(|lines| lines.clone())
            .unwrap_or_else(|poisoned| poisoned.into_inner().clone())
    }

    /// True when any recorded line contains `needle`
    pub fn contains(&self, needle: &str) -> bool {
        self.lines().iter().any(|line| line.contains(needle))
    }
}

impl LogSink for MemoryLogSink {
    fn append_line(&self, message: &str) {
        let mut lines = self
            .lines
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        lines.push(message.to_string());
    }
}

static GLOBAL_SINK: OnceLock<Arc<dyn LogSink>> = OnceLock::new();

/// Install the process-wide sink. Returns false if one was already installed.
pub fn init_log_sink(sink: Arc<dyn LogSink>) -> bool {
    let installed = GLOBAL_SINK.set(sink).is_ok();
    if installed {
        log_startup_banner();
    }
    installed
}

fn log_startup_banner() {
    if let Some(sink) = GLOBAL_SINK.get() {
        sink.append_line("=== SMB Probe Started ===");
        sink.append_line(&format!("Version: {}", env!("CARGO_PKG_VERSION")));
        sink.append_line(&format!(
            "Platform: {} {}",
            std::env::consts::OS,
            std::env::consts::ARCH
        ));
    }
}

/// Write the shutdown banner. The sink holds no open handle, so nothing else to release.
pub fn shutdown() {
    if let Some(sink) = GLOBAL_SINK.get() {
        sink.append_line("=== SMB Probe Shutting Down ===");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn file_sink_appends_framed_lines_in_order() {
        let dir = tempdir().expect("tempdir");
        let sink = FileLogSink::new(dir.path().join("nested").join("probe.log"));

        sink.append_line("first");
        sink.append_line("second");

        let contents = fs::read_to_string(sink.path()).expect("log file written");
        let lines: Vec<&str> = contents.lines().collect();
        assert_eq!(lines.len(), 2);
        assert!(lines[0].ends_with("] first"));
        assert!(lines[1].ends_with("] second"));
    }

    #[test]
    fn file_sink_preserves_existing_content() {
        let dir = tempdir().expect("tempdir");
        let path = dir.path().join("probe.log");
        fs::write(&path, "older line\n").expect("seed");

        FileLogSink::new(&path).append_line("newer line");

        let contents = fs::read_to_string(&path).expect("read back");
        assert!(contents.starts_with("older line\n"));
        assert!(contents.contains("] newer line"));
    }

    #[test]
    fn frame_uses_millisecond_timestamp() {
        let framed = FileLogSink::frame("hello");
        // [2024-05-01 13:04:55.123] hello
        let stamp = &framed[1..24];
        assert_eq!(&framed[0..1], "[");
        assert_eq!(&framed[24..], "] hello");
        assert!(chrono::NaiveDateTime::parse_from_str(stamp, LOG_TIMESTAMP_FORMAT).is_ok());
    }

    #[test]
    fn unwritable_path_reports_error() {
        let dir = tempdir().expect("tempdir");
        // A directory cannot be opened for append
        let sink = FileLogSink::new(dir.path());
        assert!(sink.try_append("line").is_err());
    }

    #[test]
    fn memory_sink_records_messages() {
        let sink = MemoryLogSink::new();
        sink.append_line("one");
        sink.append_line("two");
        assert_eq!(sink.lines(), vec!["one".to_string(), "two".to_string()]);
        assert!(sink.contains("tw"));
        assert!(sink.location().is_none());
    }

    // Only test that touches the process-wide sink
    #[test]
    fn global_sink_lifecycle_writes_banners_once() {
        let sink = Arc::new(MemoryLogSink::new());

        assert!(init_log_sink(sink.clone()));
        assert!(!init_log_sink(Arc::new(MemoryLogSink::new())));
        shutdown();

        let lines = sink.lines();
        assert_eq!(lines[0], "=== SMB Probe Started ===");
        assert_eq!(lines.iter().filter(|l| l.contains("Started")).count(), 1);
        assert_eq!(
            lines.last().map(String::as_str),
            Some("=== SMB Probe Shutting Down ===")
        );
    }
}
