//! Append-only activity log shared by every operation
//!
//! Each event becomes one `[YYYY-MM-DD HH:MM:SS] message` line. The file is
//! never truncated or rotated here.

use crate::error::{ConverterError, Result};
use chrono::Local;
use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

#[derive(Debug, Clone)]
pub struct ActivityLog {
    path: PathBuf,
    enabled: bool,
}

impl ActivityLog {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            enabled: true,
        }
    }

    /// A log that drops every event
    pub fn disabled() -> Self {
        Self {
            path: PathBuf::new(),
            enabled: false,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Append one timestamped line. Failures are reported but never propagated.
    pub fn record(&self, message: &str) {
        if !self.enabled {
            return;
        }

        let line = format!("[{}] {}\n", Local::now().format(TIMESTAMP_FORMAT), message);
        let written = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .and_then(|mut file| file.write_all(line.as_bytes()));

        match written {
            Ok(()) => debug!("Logged: {}", message),
            Err(e) => warn!("Could not append to activity log {}: {}", self.path.display(), e),
        }
    }

    /// Read the whole log back for display
    pub fn read_all(&self) -> Result<String> {
        fs::read_to_string(&self.path).map_err(|e| ConverterError::io("read log", &self.path, e))
    }
}
