//! Structured logging for the solar monitoring service
//!
//! Every record is tagged with the pipeline stage that produced it and,
//! where relevant, the site it concerns. Records go through the `log`
//! facade; `Logger` is the installed backend and writes to the console and
//! optionally to a file.

use std::fmt;
use std::fs::OpenOptions;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::str::FromStr;

use chrono::Utc;

use crate::model::{ConfigError, Site, SourceError};

// ---------------------------------------------------------------------------
// Log Levels
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum LogLevel {
    Debug,
    Info,
    Warning,
    Error,
}

impl LogLevel {
    pub fn to_filter(self) -> log::LevelFilter {
        match self {
            LogLevel::Debug => log::LevelFilter::Debug,
            LogLevel::Info => log::LevelFilter::Info,
            LogLevel::Warning => log::LevelFilter::Warn,
            LogLevel::Error => log::LevelFilter::Error,
        }
    }

    fn from_level(level: log::Level) -> Self {
        match level {
            log::Level::Error => LogLevel::Error,
            log::Level::Warn => LogLevel::Warning,
            log::Level::Info => LogLevel::Info,
            log::Level::Debug | log::Level::Trace => LogLevel::Debug,
        }
    }
}

impl fmt::Display for LogLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LogLevel::Debug => write!(f, "DEBUG"),
            LogLevel::Info => write!(f, "INFO"),
            LogLevel::Warning => write!(f, "WARN"),
            LogLevel::Error => write!(f, "ERROR"),
        }
    }
}

impl FromStr for LogLevel {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "debug" | "trace" => Ok(LogLevel::Debug),
            "info" => Ok(LogLevel::Info),
            "warn" | "warning" => Ok(LogLevel::Warning),
            "error" => Ok(LogLevel::Error),
            other => Err(ConfigError::Invalid(format!("unknown log level '{}'", other))),
        }
    }
}

// ---------------------------------------------------------------------------
// Pipeline Stages
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Load,
    Cache,
    Merge,
    Filter,
    Aggregate,
    Resample,
    Wind,
    Verify,
    Config,
    System,
}

impl Stage {
    /// Used as the `log` target of every record from this stage.
    pub fn tag(self) -> &'static str {
        match self {
            Stage::Load => "LOAD",
            Stage::Cache => "CACHE",
            Stage::Merge => "MERGE",
            Stage::Filter => "FILTER",
            Stage::Aggregate => "AGG",
            Stage::Resample => "RESAMPLE",
            Stage::Wind => "WIND",
            Stage::Verify => "VERIFY",
            Stage::Config => "CONFIG",
            Stage::System => "SYS",
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.tag())
    }
}

// ---------------------------------------------------------------------------
// Failure Classification
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FailureType {
    /// Expected failure - the site simply has no export in this data directory
    Expected,
    /// Unexpected failure - the export exists but is broken or has the wrong shape
    Unexpected,
    /// Unknown - cannot determine if this is expected or not
    Unknown,
}

impl fmt::Display for FailureType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FailureType::Expected => write!(f, "EXPECTED"),
            FailureType::Unexpected => write!(f, "UNEXPECTED"),
            FailureType::Unknown => write!(f, "UNKNOWN"),
        }
    }
}

// ---------------------------------------------------------------------------
// Logger
// ---------------------------------------------------------------------------

pub struct Logger {
    /// Minimum log level to display
    min_level: LogLevel,
    /// Optional file path for logging
    log_file: Option<PathBuf>,
    /// Whether to include timestamps in console output
    console_timestamps: bool,
}

impl Logger {
    pub fn new(min_level: LogLevel, log_file: Option<PathBuf>, console_timestamps: bool) -> Self {
        Logger {
            min_level,
            log_file,
            console_timestamps,
        }
    }

    /// Full line written to the log file, and to the console in timestamp mode.
    fn format_entry(level: LogLevel, target: &str, message: &str) -> String {
        let timestamp = Utc::now().format("%Y-%m-%d %H:%M:%S UTC");
        format!("{} {} {}: {}", timestamp, level, target, message)
    }

    fn append_to_file(path: &Path, entry: &str) -> std::io::Result<()> {
        let mut file = OpenOptions::new().create(true).append(true).open(path)?;
        writeln!(file, "{}", entry)?;
        Ok(())
    }
}

impl log::Log for Logger {
    fn enabled(&self, metadata: &log::Metadata) -> bool {
        LogLevel::from_level(metadata.level()) >= self.min_level
    }

    fn log(&self, record: &log::Record) {
        if !self.enabled(record.metadata()) {
            return;
        }

        let level = LogLevel::from_level(record.level());
        let target = record.target();
        let message = record.args().to_string();
        let log_entry = Self::format_entry(level, target, &message);

        if self.console_timestamps {
            match level {
                LogLevel::Error => eprintln!("{}", log_entry),
                LogLevel::Warning => eprintln!("   {}", log_entry),
                LogLevel::Info => println!("   {}", message),
                LogLevel::Debug => println!("   [DEBUG] {}", message),
            }
        } else {
            match level {
                LogLevel::Error => eprintln!("   ✗ {}: {}", target, message),
                LogLevel::Warning => eprintln!("   ⚠ {}: {}", target, message),
                LogLevel::Info => println!("   {}", message),
                LogLevel::Debug => {} // Skip debug in non-timestamp mode
            }
        }

        if let Some(ref path) = self.log_file {
            if let Err(e) = Self::append_to_file(path, &log_entry) {
                eprintln!("Failed to write to log file {}: {}", path.display(), e);
            }
        }
    }

    fn flush(&self) {}
}

// ---------------------------------------------------------------------------
// Public Logging Functions
// ---------------------------------------------------------------------------

/// Install `Logger` as the `log` backend. Fails if a logger is already set.
pub fn init_logger(
    min_level: LogLevel,
    log_file: Option<&Path>,
    console_timestamps: bool,
) -> Result<(), log::SetLoggerError> {
    let logger = Logger::new(min_level, log_file.map(Path::to_path_buf), console_timestamps);
    log::set_boxed_logger(Box::new(logger))?;
    log::set_max_level(min_level.to_filter());
    Ok(())
}

fn with_site(site: Option<Site>, message: &str) -> String {
    match site {
        Some(site) => format!("[{}] {}", site, message),
        None => message.to_string(),
    }
}

/// Log a general informational message
pub fn info(stage: Stage, site: Option<Site>, message: &str) {
    log::info!(target: stage.tag(), "{}", with_site(site, message));
}

/// Log a warning message
pub fn warn(stage: Stage, site: Option<Site>, message: &str) {
    log::warn!(target: stage.tag(), "{}", with_site(site, message));
}

/// Log an error message
pub fn error(stage: Stage, site: Option<Site>, message: &str) {
    log::error!(target: stage.tag(), "{}", with_site(site, message));
}

/// Log a debug message
pub fn debug(stage: Stage, site: Option<Site>, message: &str) {
    log::debug!(target: stage.tag(), "{}", with_site(site, message));
}

// ---------------------------------------------------------------------------
// Failure Classification Helpers
// ---------------------------------------------------------------------------

/// Classify a source load failure.
pub fn classify_source_failure(err: &SourceError) -> FailureType {
    match err {
        // A site without an export is a normal partial deployment
        SourceError::NotFound { .. } => FailureType::Expected,
        // The export is there but does not follow the cleaned-file layout
        SourceError::MissingColumn { .. } => FailureType::Unexpected,
        SourceError::Unreadable { kind, .. } => match kind {
            io::ErrorKind::PermissionDenied | io::ErrorKind::InvalidData => {
                FailureType::Unexpected
            }
            _ => FailureType::Unknown,
        },
    }
}

// ---------------------------------------------------------------------------
// Structured Failure Logging
// ---------------------------------------------------------------------------

/// Log a source failure with automatic classification
pub fn log_source_failure(operation: &str, err: &SourceError) {
    let failure_type = classify_source_failure(err);
    let message = format!("{} failed [{}]: {}", operation, failure_type, err);

    match failure_type {
        FailureType::Expected => warn(Stage::Load, Some(err.site()), &message),
        FailureType::Unexpected => error(Stage::Load, Some(err.site()), &message),
        FailureType::Unknown => warn(Stage::Load, Some(err.site()), &message),
    }
}

/// Log a summary of a multi-site load
pub fn log_load_summary(total: usize, successful: usize, failed: usize) {
    let message = format!(
        "Load complete: {}/{} successful, {} failed",
        successful, total, failed
    );

    if failed == 0 {
        info(Stage::Load, None, &message);
    } else if successful == 0 {
        error(Stage::Load, None, &message);
    } else {
        warn(Stage::Load, None, &message);
    }
}
