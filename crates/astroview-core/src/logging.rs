//! Logging configuration consumed by the application's tracing setup.

use std::fs;
use std::path::PathBuf;

use chrono::Local;
use serde::{Deserialize, Serialize};
use tracing::level_filters::LevelFilter;
use tracing::warn;

/// User-configurable logging options, persisted with the viewer settings.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct LogConfig {
    /// Log level name: "trace", "debug", "info", "warn" or "error".
    pub level: String,
    /// Mirror log output to stderr.
    pub console_output: bool,
    /// Write log output to a file in the log directory.
    pub file_output: bool,
    /// Override for the log directory; platform data-local dir when unset.
    pub directory: Option<PathBuf>,
    /// Number of log files kept by [`LogConfig::cleanup_old_logs`].
    pub max_files: usize,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            console_output: true,
            file_output: true,
            directory: None,
            max_files: 5,
        }
    }
}

impl LogConfig {
    /// Parse the configured level, defaulting to INFO for unknown names.
    pub fn parse_level(&self) -> LevelFilter {
        match self.level.to_lowercase().as_str() {
            "trace" => LevelFilter::TRACE,
            "debug" => LevelFilter::DEBUG,
            "info" => LevelFilter::INFO,
            "warn" => LevelFilter::WARN,
            "error" => LevelFilter::ERROR,
            other => {
                warn!("Unknown log level '{}', falling back to info", other);
                LevelFilter::INFO
            }
        }
    }

    /// The directory log files are written to.
    pub fn log_directory(&self) -> PathBuf {
        self.directory.clone().unwrap_or_else(|| {
            dirs::data_local_dir()
                .unwrap_or_else(|| PathBuf::from("."))
                .join("astroview")
                .join("logs")
        })
    }

    /// Create the log directory if it does not exist yet.
    pub fn ensure_log_directory(&self) -> crate::Result<()> {
        fs::create_dir_all(self.log_directory())?;
        Ok(())
    }

    /// Path for this session's log file, timestamped to keep sessions apart.
    pub fn current_log_path(&self) -> PathBuf {
        let stamp = Local::now().format("%Y%m%d-%H%M%S");
        self.log_directory().join(format!("astroview-{}.log", stamp))
    }

    /// Delete the oldest `.log` files beyond [`LogConfig::max_files`].
    pub fn cleanup_old_logs(&self) -> crate::Result<()> {
        let dir = self.log_directory();
        if !dir.exists() {
            return Ok(());
        }

        let mut logs: Vec<(std::time::SystemTime, PathBuf)> = fs::read_dir(&dir)?
            .filter_map(|entry| entry.ok())
            .filter(|entry| {
                entry
                    .path()
                    .extension()
                    .is_some_and(|ext| ext == "log")
            })
            .filter_map(|entry| {
                let modified = entry.metadata().ok()?.modified().ok()?;
                Some((modified, entry.path()))
            })
            .collect();

        if logs.len() <= self.max_files {
            return Ok(());
        }

        logs.sort_by_key(|(modified, _)| *modified);
        let excess = logs.len() - self.max_files;
        for (_, path) in logs.into_iter().take(excess) {
            if let Err(e) = fs::remove_file(&path) {
                warn!("Failed to remove old log file {:?}: {}", path, e);
            }
        }
        Ok(())
    }
}
