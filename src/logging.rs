//! Log output for the relay server and the client commands
//!
//! Everything goes through `tracing`. The server writes to stderr or to a
//! daily-rolling file; client commands stay quiet so stdout carries only the
//! events they print.

use std::io::{self, IsTerminal};
use std::path::{Path, PathBuf};
use std::time::{Duration, SystemTime};
use tracing::Level;
use tracing_subscriber::{
    fmt::{self, format::FmtSpan, writer::BoxMakeWriter},
    layer::SubscriberExt,
    util::SubscriberInitExt,
    EnvFilter, Layer, Registry,
};

type BoxedLayer = Box<dyn Layer<Registry> + Send + Sync>;

#[derive(Debug, Clone)]
pub struct LoggingConfig {
    pub level: Level,
    /// ANSI colours, only honoured on stderr
    pub color: bool,
    pub show_timestamps: bool,
    pub show_target: bool,
    /// One JSON object per line
    pub json_format: bool,
    /// Emit an event when each span closes
    pub enable_spans: bool,
    /// Daily-rolling file instead of stderr
    pub file_output: Option<PathBuf>,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: Level::INFO,
            color: true,
            show_timestamps: false,
            show_target: false,
            json_format: false,
            enable_spans: false,
            file_output: None,
        }
    }
}

/// Who is logging
#[derive(Debug, Clone, Copy)]
pub enum ApplicationMode {
    /// Long-running relay, usually under a supervisor
    Server,
    /// One-shot client command
    Client,
}

impl LoggingConfig {
    pub fn for_mode(mode: ApplicationMode) -> Self {
        match mode {
            ApplicationMode::Server => Self {
                color: false,
                show_timestamps: true,
                show_target: true,
                ..Self::default()
            },
            ApplicationMode::Client => Self {
                level: Level::WARN,
                ..Self::default()
            },
        }
    }

    /// Settings implied by the global `-v`, `-q` and `--json` flags
    pub fn from_args(quiet: bool, verbose: bool, json: bool) -> Self {
        let level = match (verbose, quiet) {
            (true, _) => Level::DEBUG,
            (false, true) => Level::ERROR,
            (false, false) => Level::INFO,
        };

        Self {
            level,
            color: !quiet && !json && io::stderr().is_terminal(),
            show_timestamps: verbose || json,
            show_target: verbose,
            json_format: json,
            enable_spans: verbose,
            file_output: None,
        }
    }

    /// Default filter directive when RUST_LOG is unset
    pub fn filter_directive(&self) -> String {
        format!("lostfound_relay={},tower_http={}", self.level, self.level)
    }

    fn span_events(&self) -> FmtSpan {
        if self.enable_spans {
            FmtSpan::CLOSE
        } else {
            FmtSpan::NONE
        }
    }
}

/// Install the global subscriber
pub fn init_logging(config: LoggingConfig) -> io::Result<()> {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(config.filter_directive()));

    let (writer, ansi) = match &config.file_output {
        Some(path) => (BoxMakeWriter::new(rolling_file(path)?), false),
        None => (BoxMakeWriter::new(io::stderr), config.color),
    };

    let layer: BoxedLayer = if config.json_format {
        fmt::layer()
            .json()
            .with_current_span(config.enable_spans)
            .with_span_events(config.span_events())
            .with_writer(writer)
            .boxed()
    } else {
        let text = fmt::layer()
            .with_target(config.show_target)
            .with_ansi(ansi)
            .with_span_events(config.span_events())
            .with_writer(writer);
        if config.show_timestamps {
            text.with_timer(fmt::time::ChronoUtc::rfc_3339()).boxed()
        } else {
            text.without_time().boxed()
        }
    };

    Registry::default().with(layer.with_filter(filter)).init();
    Ok(())
}

fn rolling_file(path: &Path) -> io::Result<tracing_appender::rolling::RollingFileAppender> {
    let invalid = |what: &str| {
        io::Error::new(
            io::ErrorKind::InvalidInput,
            format!("invalid log file {}: {}", what, path.display()),
        )
    };
    let dir = path.parent().ok_or_else(|| invalid("directory"))?;
    let name = path.file_name().ok_or_else(|| invalid("name"))?;
    Ok(tracing_appender::rolling::daily(dir, name))
}

/// Remove rotated log files older than `retention_days`.
///
/// Only files named like `<name>.log.YYYY-MM-DD` are considered, so the live
/// file and anything unrelated in the directory survive. Returns how many
/// files were removed.
pub fn cleanup_old_logs(log_dir: &Path, retention_days: u32) -> io::Result<usize> {
    if !log_dir.exists() {
        return Ok(0);
    }

    let retention = Duration::from_secs(u64::from(retention_days) * 24 * 60 * 60);
    let now = SystemTime::now();

    let mut expired = Vec::new();
    for entry in std::fs::read_dir(log_dir)? {
        let path = entry?.path();
        if !path.is_file() || !is_rotated_log(&path) {
            continue;
        }
        let modified = std::fs::metadata(&path)?.modified()?;
        if now.duration_since(modified).is_ok_and(|age| age > retention) {
            expired.push(path);
        }
    }

    let mut removed = 0;
    for path in expired {
        match std::fs::remove_file(&path) {
            Ok(()) => {
                removed += 1;
                tracing::debug!("Removed expired log {}", path.display());
            },
            Err(e) => tracing::warn!("Failed to remove expired log {}: {}", path.display(), e),
        }
    }

    if removed > 0 {
        tracing::info!(
            retention_days,
            "Removed {} expired log file(s) from {}",
            removed,
            log_dir.display()
        );
    }

    Ok(removed)
}

// relay.log.2026-10-17
fn is_rotated_log(path: &Path) -> bool {
    let Some(name) = path.file_name().and_then(|n| n.to_str()) else {
        return false;
    };
    let Some((_, date)) = name.rsplit_once(".log.") else {
        return false;
    };
    chrono::NaiveDate::parse_from_str(date, "%Y-%m-%d").is_ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_args_levels() {
        assert_eq!(LoggingConfig::from_args(false, true, false).level, Level::DEBUG);
        assert_eq!(LoggingConfig::from_args(true, false, false).level, Level::ERROR);
        assert_eq!(LoggingConfig::from_args(false, false, false).level, Level::INFO);
        assert_eq!(LoggingConfig::from_args(true, true, false).level, Level::DEBUG);
    }

    #[test]
    fn test_json_disables_color() {
        let config = LoggingConfig::from_args(false, false, true);
        assert!(config.json_format);
        assert!(!config.color);
        assert!(config.show_timestamps);
    }

    #[test]
    fn test_mode_presets() {
        let server = LoggingConfig::for_mode(ApplicationMode::Server);
        assert!(server.show_timestamps);
        assert!(!server.color);
        assert_eq!(server.level, Level::INFO);

        let client = LoggingConfig::for_mode(ApplicationMode::Client);
        assert_eq!(client.level, Level::WARN);
        assert!(!client.show_timestamps);
    }

    #[test]
    fn test_span_events_follow_verbosity() {
        assert_eq!(LoggingConfig::from_args(false, true, false).span_events(), FmtSpan::CLOSE);
        assert_eq!(LoggingConfig::default().span_events(), FmtSpan::NONE);
    }

    #[test]
    fn test_filter_directive() {
        let config = LoggingConfig::default();
        assert_eq!(
            config.filter_directive(),
            "lostfound_relay=INFO,tower_http=INFO"
        );
    }

    #[test]
    fn test_rolling_file_needs_a_file_name() {
        assert!(rolling_file(Path::new("/")).is_err());
    }

    #[test]
    fn test_is_rotated_log() {
        assert!(is_rotated_log(Path::new("/tmp/relay.log.2026-10-17")));
        assert!(!is_rotated_log(Path::new("/tmp/relay.log")));
        assert!(!is_rotated_log(Path::new("/tmp/relay.log.backup")));
        assert!(!is_rotated_log(Path::new("/tmp/notes.txt")));
    }

    #[test]
    fn test_cleanup_missing_dir_is_noop() {
        let removed = cleanup_old_logs(Path::new("/nonexistent/lfr-logs"), 7).unwrap();
        assert_eq!(removed, 0);
    }
}
