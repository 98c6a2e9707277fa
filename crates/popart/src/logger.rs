//! File-based logging for PopArt.
//!
//! Writes log messages to ~/.popart/logs/{run_metadata}/log, one
//! directory per run. Warnings and errors are mirrored to stderr so CLI
//! output on stdout stays clean.

use anyhow::{Context, Result};
use chrono::Local;
use dirs::home_dir;
use log::{Level, LevelFilter, Log, Metadata, Record};
use std::fs::{create_dir_all, File, OpenOptions};
use std::io::Write;
use std::path::PathBuf;
use std::sync::Mutex;
use uuid::Uuid;

/// Structure representing the PopArt logger
pub struct PopArtLogger {
    level: LevelFilter,
    file: Mutex<File>,
    run_id: String,
    log_path: PathBuf,
}

impl PopArtLogger {
    /// Create a new logger with the specified log level
    ///
    /// This will create a log file at ~/.popart/logs/{timestamp}_{uuid}/log
    /// where {timestamp} is the current local time and {uuid} is a
    /// unique identifier for this run.
    fn new(level: LevelFilter) -> Result<Self> {
        let timestamp = Local::now().format("%Y%m%d_%H%M%S").to_string();
        let uuid_string = Uuid::new_v4().to_string();
        let uuid = uuid_string.split('-').next().unwrap_or("unknown");
        let run_id = format!("{timestamp}_{uuid}");

        let log_dir = Self::log_dir(&run_id)?;
        create_dir_all(&log_dir)
            .with_context(|| format!("Failed to create log directory: {}", log_dir.display()))?;

        let log_path = log_dir.join("log");
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&log_path)
            .with_context(|| format!("Failed to open log file: {}", log_path.display()))?;

        Ok(Self {
            level,
            file: Mutex::new(file),
            run_id,
            log_path,
        })
    }

    fn log_dir(run_id: &str) -> Result<PathBuf> {
        let home = home_dir().ok_or_else(|| anyhow::anyhow!("Could not find home directory"))?;
        Ok(home.join(".popart").join("logs").join(run_id))
    }

    /// Initialize the logger with the specified log level
    pub fn init(level: LevelFilter) -> Result<()> {
        let logger = Self::new(level)?;
        let run_id = logger.run_id.clone();
        let log_path = logger.log_path.clone();

        log::set_boxed_logger(Box::new(logger))
            .map(|()| log::set_max_level(level))
            .map_err(|e| anyhow::anyhow!("Failed to set logger: {}", e))?;

        log::debug!("PopArt logger initialized. Run ID: {}", run_id);
        log::debug!("Log file: {}", log_path.display());
        Ok(())
    }
}

impl Log for PopArtLogger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= self.level
    }

    fn log(&self, record: &Record) {
        if self.enabled(record.metadata()) {
            let timestamp = Local::now().format("%Y-%m-%d %H:%M:%S%.3f").to_string();
            let level = record.level();
            let target = record.target();
            let message = format!("{} {} [{}] {}", timestamp, level, target, record.args());

            if let Ok(mut file) = self.file.lock() {
                // Ignore write errors; logging must not take the CLI down
                let _ = writeln!(file, "{}", message);
                let _ = file.flush();
            }

            if level <= Level::Warn {
                eprintln!("{}", message);
            }
        }
    }

    fn flush(&self) {
        if let Ok(mut file) = self.file.lock() {
            let _ = file.flush();
        }
    }
}
