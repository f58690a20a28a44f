//! Logging bootstrap
//!
//! Two layers: a terse console layer on stderr and a plain-text file layer.
//! The file is written through a non-blocking appender whose worker lives as
//! long as the returned [`LogGuard`]; keep it alive for the whole of `main`.

use std::fs;
use std::path::PathBuf;

use tracing::Level;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::{
    filter::LevelFilter,
    fmt::{self, format::Writer, FmtContext, FormatEvent, FormatFields},
    layer::SubscriberExt,
    registry::LookupSpan,
    util::SubscriberInitExt,
    EnvFilter, Layer,
};

use crate::error::{Error, Result};

/// Default log file name inside the log directory
pub const DEFAULT_LOG_FILE: &str = "calculator.log";

const TIMESTAMP_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%.3fZ";

/// `[LEVEL] message`, prefixed with a UTC timestamp for the log file
///
/// File: `2025-12-02T00:50:44.809Z [INFO] Calculation performed: add (2, 3) = 5`.
/// Console: `[WARN] Observer auto_save failed: ...`.
#[derive(Debug, Clone, Copy)]
struct LogLineFormat {
    timestamp: bool,
}

fn level_color(level: Level) -> &'static str {
    match level {
        Level::ERROR => "\x1b[31m",
        Level::WARN => "\x1b[33m",
        Level::INFO => "\x1b[32m",
        Level::DEBUG | Level::TRACE => "\x1b[2m",
    }
}

impl<S, N> FormatEvent<S, N> for LogLineFormat
where
    S: tracing::Subscriber + for<'a> LookupSpan<'a>,
    N: for<'a> FormatFields<'a> + 'static,
{
    fn format_event(
        &self,
        ctx: &FmtContext<'_, S, N>,
        mut writer: Writer<'_>,
        event: &tracing::Event<'_>,
    ) -> std::fmt::Result {
        if self.timestamp {
            write!(writer, "{} ", chrono::Utc::now().format(TIMESTAMP_FORMAT))?;
        }

        let level = *event.metadata().level();
        if writer.has_ansi_escapes() {
            write!(writer, "{}[{}]\x1b[0m ", level_color(level), level)?;
        } else {
            write!(writer, "[{}] ", level)?;
        }

        ctx.field_format().format_fields(writer.by_ref(), event)?;
        writeln!(writer)
    }
}

/// Logger configuration
#[derive(Debug, Clone)]
pub struct LogConfig {
    /// Application name, used as the default filter target
    pub service_name: String,
    /// Directory holding the log file
    pub log_dir: PathBuf,
    /// Log file name inside `log_dir`
    pub file_name: String,
    /// Console (stderr) level
    pub console_level: Level,
    /// File level; `RUST_LOG` overrides it when set
    pub file_level: Level,
    /// Disable to log to the console only
    pub enable_file: bool,
    /// ANSI colours on the console layer
    pub ansi: bool,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            service_name: "abacus".to_string(),
            log_dir: PathBuf::from("logs"),
            file_name: DEFAULT_LOG_FILE.to_string(),
            console_level: Level::WARN,
            file_level: Level::INFO,
            enable_file: true,
            ansi: true,
        }
    }
}

impl LogConfig {
    /// Full path of the log file
    pub fn log_file(&self) -> PathBuf {
        self.log_dir.join(&self.file_name)
    }
}

/// Keeps the file appender worker alive; logs are flushed when dropped
#[must_use = "dropping the guard stops file logging"]
pub struct LogGuard {
    _file_guard: Option<WorkerGuard>,
}

/// Parse a level name such as `info` or `DEBUG`
pub fn parse_level(name: &str) -> Result<Level> {
    name.trim()
        .parse::<Level>()
        .map_err(|_| Error::config(format!("invalid log level '{}'", name)))
}

/// Install the global subscriber
pub fn init(config: &LogConfig) -> Result<LogGuard> {
    let console_layer = fmt::layer()
        .with_writer(std::io::stderr)
        .with_ansi(config.ansi)
        .event_format(LogLineFormat { timestamp: false })
        .with_filter(LevelFilter::from_level(config.console_level));

    let (file_layer, file_guard) = if config.enable_file {
        fs::create_dir_all(&config.log_dir)?;

        let appender = RollingFileAppender::builder()
            .rotation(Rotation::NEVER)
            .filename_prefix(&config.file_name)
            .build(&config.log_dir)
            .map_err(|e| Error::Logging(e.to_string()))?;
        let (non_blocking, guard) = tracing_appender::non_blocking(appender);

        // Respect RUST_LOG, otherwise fall back to the configured file level
        let filter = match std::env::var("RUST_LOG") {
            Ok(directives) if !directives.trim().is_empty() => EnvFilter::new(directives),
            _ => EnvFilter::new(config.file_level.as_str().to_lowercase()),
        };

        let layer = fmt::layer()
            .with_writer(non_blocking)
            .with_ansi(false)
            .event_format(LogLineFormat { timestamp: true })
            .with_filter(filter);
        (Some(layer), Some(guard))
    } else {
        (None, None)
    };

    tracing_subscriber::registry()
        .with(console_layer)
        .with(file_layer)
        .try_init()
        .map_err(|e| Error::Logging(e.to_string()))?;

    tracing::debug!(
        "Logging: {} @ {}",
        config.service_name,
        config.log_file().display()
    );

    Ok(LogGuard {
        _file_guard: file_guard,
    })
}

#[cfg(test)]
#[allow(clippy::disallowed_methods)] // Test code - unwrap is acceptable
mod tests {
    use super::*;
    use std::io;
    use std::sync::{Arc, Mutex};

    #[test]
    fn test_parse_level() {
        assert_eq!(parse_level("info").unwrap(), Level::INFO);
        assert_eq!(parse_level(" DEBUG ").unwrap(), Level::DEBUG);
        assert!(parse_level("loud").is_err());
    }

    #[derive(Clone, Default)]
    struct Captured(Arc<Mutex<Vec<u8>>>);

    impl io::Write for Captured {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    fn capture(format: LogLineFormat, emit: impl FnOnce()) -> String {
        let captured = Captured::default();
        let writer = captured.clone();
        let subscriber = tracing_subscriber::fmt()
            .with_ansi(false)
            .with_writer(move || writer.clone())
            .event_format(format)
            .finish();
        tracing::subscriber::with_default(subscriber, emit);
        let bytes = captured.0.lock().unwrap().clone();
        String::from_utf8(bytes).unwrap()
    }

    #[test]
    fn test_console_line_has_no_timestamp() {
        let line = capture(LogLineFormat { timestamp: false }, || {
            tracing::warn!("Observer auto_save failed: disk full");
        });
        assert_eq!(line, "[WARN] Observer auto_save failed: disk full\n");
    }

    #[test]
    fn test_file_line_is_timestamped() {
        let line = capture(LogLineFormat { timestamp: true }, || {
            tracing::info!("Calculation performed: add (2, 3) = 5");
        });
        let (stamp, rest) = line.split_once(' ').unwrap();
        assert!(stamp.ends_with('Z'));
        assert!(stamp.contains('T'));
        assert_eq!(rest, "[INFO] Calculation performed: add (2, 3) = 5\n");
    }

    #[test]
    fn test_default_log_file() {
        let config = LogConfig::default();
        assert_eq!(config.log_file(), PathBuf::from("logs").join("calculator.log"));
        assert_eq!(config.console_level, Level::WARN);
    }
}
