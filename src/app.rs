//! Application state shared by the front ends
//!
//! Front ends own one [`AppState`] and pass every user request through
//! [`AppState::dispatch`]; nothing in the core is reachable through globals.

use crate::activity::ActivityLog;
use crate::config::Config;
use crate::convert::{ConversionKind, ConversionRequest, Converter};
use crate::outcome::Outcome;
use crate::store::FileStore;
use std::path::PathBuf;
use tracing::debug;

/// A request collected by a front end
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Convert {
        kind: ConversionKind,
        input: PathBuf,
        output: PathBuf,
    },
    Create { path: PathBuf, content: String },
    Delete { path: PathBuf },
    Read { path: PathBuf },
    Write { path: PathBuf, content: String },
    Append { path: PathBuf, content: String },
    Search { path: PathBuf, term: String },
    ViewLogs,
}

pub struct AppState {
    config: Config,
    log: ActivityLog,
    store: FileStore,
    converter: Converter,
}

impl AppState {
    pub fn new(config: Config) -> Self {
        let log = if config.log.enabled {
            ActivityLog::new(config.log.path.clone())
        } else {
            ActivityLog::disabled()
        };
        let store = FileStore::new(log.clone(), config.store.max_read_bytes);
        let converter = Converter::from_config(&config, log.clone());
        Self::from_parts(config, log, store, converter)
    }

    /// Assemble from pre-built parts, e.g. a converter with mock collaborators
    pub fn from_parts(config: Config, log: ActivityLog, store: FileStore, converter: Converter) -> Self {
        Self {
            config,
            log,
            store,
            converter,
        }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn store(&self) -> &FileStore {
        &self.store
    }

    pub fn converter(&self) -> &Converter {
        &self.converter
    }

    pub fn dispatch(&self, command: Command) -> Outcome {
        debug!("Dispatching {:?}", command);

        match command {
            Command::Convert { kind, input, output } => {
                match ConversionRequest::new(input, output, kind) {
                    Ok(request) => self.converter.convert(&request),
                    Err(e) => {
                        let outcome = Outcome::failure(e.to_string());
                        self.log.record(&outcome.message);
                        outcome
                    }
                }
            }
            Command::Create { path, content } => self.store.create(&path, &content),
            Command::Delete { path } => self.store.delete(&path),
            Command::Read { path } => self.store.read_outcome(&path),
            Command::Write { path, content } => self.store.write(&path, &content),
            Command::Append { path, content } => self.store.append(&path, &content),
            Command::Search { path, term } => self.store.search_outcome(&path, &term),
            Command::ViewLogs => self.view_logs(),
        }
    }

    fn view_logs(&self) -> Outcome {
        if !self.log.is_enabled() {
            return Outcome::failure("Activity log is disabled");
        }
        match self.log.read_all() {
            Ok(content) if !content.is_empty() => Outcome::success(content),
            Ok(_) | Err(_) => Outcome::success("No logs found"),
        }
    }
}
