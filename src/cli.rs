use crate::app::Command;
use crate::convert::ConversionKind;
use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use std::io::Read;
use std::path::PathBuf;

/// CLI arguments for the file format converter
#[derive(Parser, Debug, Clone)]
#[command(
    name = "file-format-converter",
    version,
    about = "Convert between TXT, CSV, HTML, JSON and PDF and manage plain files",
    long_about = "
Converts files between simple text formats and performs basic file operations.
Every operation is recorded in an append-only activity log (logs.txt by default).

EXAMPLES:
  file-format-converter convert txt-to-csv -i notes.txt -o notes.csv
  file-format-converter search notes.txt TODO
  echo 'more text' | file-format-converter append notes.txt -
  file-format-converter menu
"
)]
pub struct CliArgs {
    #[command(subcommand)]
    pub command: CliCommand,

    /// Configuration file (TOML)
    #[arg(short = 'c', long = "config", value_name = "FILE", global = true)]
    pub config: Option<PathBuf>,

    /// Verbose logging
    #[arg(short = 'v', long = "verbose", global = true, help = "Enable verbose logging")]
    pub verbose: bool,

    /// Log level
    #[arg(
        long = "log-level",
        value_enum,
        default_value_t = LogLevel::Warn,
        global = true,
        help = "Set the diagnostic logging level"
    )]
    pub log_level: LogLevel,

    /// Print outcomes as JSON objects
    #[arg(long = "json", global = true)]
    pub json: bool,
}

#[derive(Subcommand, Debug, Clone, PartialEq)]
pub enum CliCommand {
    /// Convert a file from one format to another
    Convert {
        /// Conversion to perform
        #[arg(value_enum)]
        kind: ConversionKind,

        /// Input file path
        #[arg(short, long)]
        input: PathBuf,

        /// Output file path
        #[arg(short, long)]
        output: PathBuf,
    },

    /// Create (or truncate) a file, optionally with content (`-` reads stdin)
    Create { path: PathBuf, content: Option<String> },

    /// Delete a file
    Delete { path: PathBuf },

    /// Print a file's content
    Read { path: PathBuf },

    /// Overwrite a file with content (`-` reads stdin)
    Write { path: PathBuf, content: String },

    /// Append content to a file (`-` reads stdin)
    Append { path: PathBuf, content: String },

    /// Print every line containing a term, with line numbers
    Search { path: PathBuf, term: String },

    /// Print the activity log
    Logs,

    /// Interactive numbered menu
    Menu,

    /// Write the default configuration to a file
    InitConfig {
        #[arg(default_value = "converter.toml")]
        path: PathBuf,

        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },
}

/// Log level enumeration
#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogLevel {
    /// Show error messages only
    Error,
    /// Show warnings and errors (default)
    Warn,
    /// Show info, warnings, and errors
    Info,
    /// Show debug information
    Debug,
    /// Show all log messages including trace
    Trace,
}

impl LogLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            LogLevel::Error => "error",
            LogLevel::Warn => "warn",
            LogLevel::Info => "info",
            LogLevel::Debug => "debug",
            LogLevel::Trace => "trace",
        }
    }
}

/// What the binary should do once arguments are parsed
#[derive(Debug, Clone, PartialEq)]
pub enum Action {
    Run(Command),
    Menu,
    InitConfig { path: PathBuf, force: bool },
}

impl CliArgs {
    /// Initialize diagnostic logging based on CLI arguments
    pub fn setup_logging(&self) -> Result<()> {
        let level = if self.verbose {
            "debug"
        } else {
            self.log_level.as_str()
        };

        tracing_subscriber::fmt()
            .with_env_filter(
                tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                    tracing_subscriber::EnvFilter::new(format!(
                        "{}={}",
                        env!("CARGO_PKG_NAME").replace('-', "_"),
                        level
                    ))
                }),
            )
            .with_target(false)
            .with_level(true)
            .with_writer(std::io::stderr)
            .init();

        Ok(())
    }

    /// Resolve the subcommand, reading `-` content arguments from `stdin`
    pub fn action<R: Read>(&self, stdin: R) -> Result<Action> {
        let command = match self.command.clone() {
            CliCommand::Convert { kind, input, output } => Command::Convert { kind, input, output },
            CliCommand::Create { path, content } => Command::Create {
                path,
                content: match content {
                    Some(content) => resolve_content(content, stdin)?,
                    None => String::new(),
                },
            },
            CliCommand::Delete { path } => Command::Delete { path },
            CliCommand::Read { path } => Command::Read { path },
            CliCommand::Write { path, content } => Command::Write {
                path,
                content: resolve_content(content, stdin)?,
            },
            CliCommand::Append { path, content } => Command::Append {
                path,
                content: resolve_content(content, stdin)?,
            },
            CliCommand::Search { path, term } => Command::Search { path, term },
            CliCommand::Logs => Command::ViewLogs,
            CliCommand::Menu => return Ok(Action::Menu),
            CliCommand::InitConfig { path, force } => return Ok(Action::InitConfig { path, force }),
        };
        Ok(Action::Run(command))
    }
}

/// `-` stands for the whole of standard input
fn resolve_content<R: Read>(content: String, mut stdin: R) -> Result<String> {
    if content != "-" {
        return Ok(content);
    }
    let mut buffer = String::new();
    stdin
        .read_to_string(&mut buffer)
        .context("Failed to read content from standard input")?;
    Ok(buffer)
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_consistent() {
        CliArgs::command().debug_assert();
    }

    #[test]
    fn test_parse_convert() {
        let args = CliArgs::try_parse_from([
            "file-format-converter",
            "convert",
            "txt-to-json",
            "-i",
            "in.txt",
            "-o",
            "out.json",
        ])
        .unwrap();

        let action = args.action(std::io::empty()).unwrap();
        assert_eq!(
            action,
            Action::Run(Command::Convert {
                kind: ConversionKind::TxtToJson,
                input: PathBuf::from("in.txt"),
                output: PathBuf::from("out.json"),
            })
        );
    }

    #[test]
    fn test_unknown_kind_is_rejected() {
        let result = CliArgs::try_parse_from([
            "file-format-converter",
            "convert",
            "txt-to-docx",
            "-i",
            "a",
            "-o",
            "b",
        ]);
        assert!(result.is_err());
    }

    #[test]
    fn test_dash_reads_content_from_stdin() {
        let args = CliArgs::try_parse_from(["file-format-converter", "append", "notes.txt", "-"]).unwrap();
        let action = args.action("piped text\n".as_bytes()).unwrap();
        assert_eq!(
            action,
            Action::Run(Command::Append {
                path: PathBuf::from("notes.txt"),
                content: "piped text\n".to_string(),
            })
        );
    }

    #[test]
    fn test_create_without_content() {
        let args = CliArgs::try_parse_from(["file-format-converter", "create", "new.txt"]).unwrap();
        assert_eq!(
            args.action(std::io::empty()).unwrap(),
            Action::Run(Command::Create {
                path: PathBuf::from("new.txt"),
                content: String::new(),
            })
        );
    }

    #[test]
    fn test_global_flags_after_subcommand() {
        let args =
            CliArgs::try_parse_from(["file-format-converter", "logs", "--json", "--log-level", "debug"]).unwrap();
        assert!(args.json);
        assert_eq!(args.log_level, LogLevel::Debug);
        assert_eq!(args.action(std::io::empty()).unwrap(), Action::Run(Command::ViewLogs));
    }
}
