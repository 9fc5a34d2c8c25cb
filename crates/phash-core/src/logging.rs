use log::{error, info, warn, LevelFilter};
use std::path::Path;

// For file-based logging with rotation
use log4rs::append::rolling_file::policy::compound::roll::fixed_window::FixedWindowRoller;
use log4rs::append::rolling_file::policy::compound::trigger::size::SizeTrigger;
use log4rs::append::rolling_file::policy::compound::CompoundPolicy;
use log4rs::append::rolling_file::RollingFileAppender;
use log4rs::config::{Appender, Config, Root};
use log4rs::encode::pattern::PatternEncoder;

use crate::config::LogLevel;

/// Environment variable that overrides the configured log level
pub const LOG_ENV_VAR: &str = "PHASH_LOG";

impl From<LogLevel> for LevelFilter {
    fn from(level: LogLevel) -> Self {
        match level {
            LogLevel::Error => LevelFilter::Error,
            LogLevel::Warn => LevelFilter::Warn,
            LogLevel::Info => LevelFilter::Info,
            LogLevel::Debug => LevelFilter::Debug,
            LogLevel::Trace => LevelFilter::Trace,
        }
    }
}

/// Level the logger runs at: `override_filter` when it parses, else `configured`.
///
/// Returns the unparseable override alongside so the caller can report it
/// once logging is up.
pub fn effective_level(
    configured: LogLevel,
    override_filter: Option<&str>,
) -> (LevelFilter, Option<String>) {
    match override_filter {
        Some(filter) => match filter.trim().parse::<LevelFilter>() {
            Ok(level) => (level, None),
            Err(_) => (configured.into(), Some(filter.to_string())),
        },
        None => (configured.into(), None),
    }
}

/// Initialize the logger with timestamp, log level, and module path.
/// Logs are written to a rotating file in `log_dir`.
///
/// `PHASH_LOG` (e.g. `debug`) replaces `level` when set.
pub fn init_logger(log_dir: &Path, level: LogLevel) -> Result<(), Box<dyn std::error::Error>> {
    std::fs::create_dir_all(log_dir)?;

    let env_filter = std::env::var(LOG_ENV_VAR).ok();
    let (root_level, ignored) = effective_level(level, env_filter.as_deref());

    let log_file_path = log_dir.join("phash.log");
    let archived_logs_pattern = format!("{}/phash.{{}}.log", log_dir.display());

    // Rotate at 10MB, keep 5 archived files
    let file_trigger = SizeTrigger::new(10 * 1024 * 1024);
    let file_roller = FixedWindowRoller::builder()
        .build(&archived_logs_pattern, 5)
        .map_err(|e| format!("Failed to create log roller: {}", e))?;
    let compound_policy = CompoundPolicy::new(Box::new(file_trigger), Box::new(file_roller));

    let rolling_file = RollingFileAppender::builder()
        .encoder(Box::new(PatternEncoder::new(
            "{d(%Y-%m-%d %H:%M:%S)} [{l}] [{M}:{L}] - {m}{n}",
        )))
        .build(&log_file_path, Box::new(compound_policy))
        .map_err(|e| format!("Failed to create log appender: {}", e))?;

    let config = Config::builder()
        .appender(Appender::builder().build("file", Box::new(rolling_file)))
        .build(Root::builder().appender("file").build(root_level))
        .map_err(|e| format!("Failed to build log config: {}", e))?;

    log4rs::init_config(config).map_err(|e| format!("Failed to initialize log4rs: {}", e))?;

    if let Some(filter) = ignored {
        warn!("Ignoring unparseable {}={}", LOG_ENV_VAR, filter);
    }

    info!(
        "Logging to file: {} (level {})",
        log_file_path.display(),
        root_level
    );
    Ok(())
}

/// Log file operation that failed
pub fn log_file_error(path: &Path, operation: &str, error: &dyn std::error::Error) {
    error!(
        "File operation failed - Operation: {}, Path: {}, Error: {}",
        operation,
        path.display(),
        error
    );
}

/// Log hash computation error
pub fn log_hash_error(path: &Path, error: &dyn std::error::Error) {
    error!(
        "Hash computation failed - Path: {}, Error: {}",
        path.display(),
        error
    );
}
