use chrono::Local;
use log::{LevelFilter, Metadata, Record, SetLoggerError};
use once_cell::sync::OnceCell;
use std::fs::{OpenOptions, create_dir_all};
use std::io::Write;
use std::path::PathBuf;

// Appends `timestamp LEVEL - message` lines to `<log_dir>/log.txt`.
#[derive(Debug)]
struct FileLogger {
    log_path: PathBuf,
    level: LevelFilter,
}

static LOGGER: OnceCell<FileLogger> = OnceCell::new();

impl log::Log for FileLogger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= self.level
    }

    fn log(&self, record: &Record) {
        if self.enabled(record.metadata()) {
            let log_entry = format!(
                "{} {} - {}\n",
                Local::now().format("%Y-%m-%d %H:%M:%S"),
                record.level(),
                record.args()
            );
            let log_file = self.log_path.join("log.txt");

            if let Ok(mut file) = OpenOptions::new().create(true).append(true).open(log_file) {
                let _ = file.write_all(log_entry.as_bytes());
            }
        }
    }

    fn flush(&self) {}
}

#[derive(Debug, thiserror::Error)]
pub enum LoggingError {
    #[error("Could not determine the home directory")]
    NoHomeDir,
    #[error("Could not create log directory: {0}")]
    Io(#[from] std::io::Error),
    #[error("Logger already set")]
    AlreadySet,
    #[error("Failed to install logger: {0}")]
    SetLogger(#[from] SetLoggerError),
}

pub fn default_log_dir() -> Result<PathBuf, LoggingError> {
    let home = dir::home_dir().ok_or(LoggingError::NoHomeDir)?;
    Ok(home.join("gm_forge").join("data"))
}

// Installs the file logger. Only the first call in a process succeeds.
pub fn init(log_dir: Option<PathBuf>, debug: bool) -> Result<PathBuf, LoggingError> {
    let log_path = match log_dir {
        Some(path) => path,
        None => default_log_dir()?,
    };
    create_dir_all(&log_path)?;

    let level = if debug {
        LevelFilter::Debug
    } else {
        LevelFilter::Info
    };
    LOGGER
        .set(FileLogger {
            log_path: log_path.clone(),
            level,
        })
        .map_err(|_| LoggingError::AlreadySet)?;

    let logger = LOGGER.get().ok_or(LoggingError::AlreadySet)?;
    log::set_logger(logger)?;
    log::set_max_level(level);
    Ok(log_path)
}
