use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::error::{Error, Result};
use crate::fingerprint::FINGERPRINT_BITS;

/// Log level for the application
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

/// Configuration for fingerprinting and comparison
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Number of worker threads for background hashing (0 = auto)
    pub threads: usize,

    /// Maximum Hamming distance at which two fingerprints count as similar
    pub similarity_threshold: u32,

    /// Log level
    pub log_level: LogLevel,

    /// Directory for rotated log files; `None` leaves logging to the caller
    pub log_dir: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            threads: 0, // Auto
            similarity_threshold: 10,
            log_level: LogLevel::Info,
            log_dir: None,
        }
    }
}

impl Config {
    /// Load configuration from a file
    pub fn from_file(path: &Path) -> Result<Self> {
        let file = std::fs::File::open(path)
            .map_err(|e| Error::Configuration(format!("Failed to open config file: {}", e)))?;

        let config: Config = serde_json::from_reader(file)
            .map_err(|e| Error::Configuration(format!("Failed to parse config file: {}", e)))?;

        Ok(config)
    }

    /// Save configuration to a file
    pub fn save_to_file(&self, path: &Path) -> Result<()> {
        let file = std::fs::File::create(path)?;

        serde_json::to_writer_pretty(file, self)
            .map_err(|e| Error::Configuration(format!("Failed to write config file: {}", e)))?;

        Ok(())
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<()> {
        if self.similarity_threshold > FINGERPRINT_BITS {
            return Err(Error::Configuration(format!(
                "Similarity threshold must be between 0 and {}",
                FINGERPRINT_BITS
            )));
        }

        Ok(())
    }

    /// Worker count after resolving `0` to the number of CPUs
    pub fn worker_threads(&self) -> usize {
        if self.threads == 0 {
            num_cpus::get()
        } else {
            self.threads
        }
    }
}
