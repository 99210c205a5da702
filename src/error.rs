use std::path::PathBuf;
use thiserror::Error;

/// Error types for file operations and conversions
#[derive(Error, Debug)]
pub enum ConverterError {
    #[error("Failed to {operation} '{}': {source}", path.display())]
    Io {
        operation: &'static str,
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("External tool `{tool}` failed: {reason}")]
    ExternalTool { tool: String, reason: String },

    #[error("PDF rendering error: {0}")]
    PdfRender(String),

    #[error("File too large: '{}' is {size} bytes, limit is {limit} bytes", path.display())]
    TooLarge { path: PathBuf, size: u64, limit: u64 },

    #[error("Invalid input: {0}")]
    Validation(String),

    #[error("Configuration error: {0}")]
    Config(String),
}

impl ConverterError {
    /// Wrap an I/O failure together with the path and the operation that hit it
    pub fn io(operation: &'static str, path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        ConverterError::Io {
            operation,
            path: path.into(),
            source,
        }
    }

    /// True for the open/read/write/remove class of failures
    pub fn is_io(&self) -> bool {
        matches!(self, ConverterError::Io { .. } | ConverterError::TooLarge { .. })
    }
}

/// Convenience Result type with ConverterError
pub type Result<T> = std::result::Result<T, ConverterError>;
