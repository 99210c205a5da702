//! File Format Converter Library
//!
//! Single-pass conversions between TXT, CSV, HTML, JSON and PDF plus basic
//! file management (create, delete, read, write, append, search), with every
//! operation recorded in an append-only activity log.

pub mod activity;
pub mod app;
pub mod cli;
pub mod config;
pub mod convert;
pub mod error;
pub mod interactive;
pub mod outcome;
pub mod store;

pub use config::Config;
pub use error::{ConverterError, Result};
pub use outcome::Outcome;

/// Re-export commonly used types
pub mod prelude {
    pub use crate::{
        activity::ActivityLog,
        app::{AppState, Command},
        config::Config,
        convert::{ConversionKind, ConversionRequest, Converter},
        error::{ConverterError, Result},
        outcome::Outcome,
        store::{FileStore, SearchMatch, SearchResult},
    };

    pub use tracing::{debug, error, info, warn};
}
