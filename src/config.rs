//! Configuration for the converter, loaded from TOML with every field defaulted

use crate::error::{ConverterError, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

/// Placeholder replaced by the source path in extractor arguments
pub const INPUT_PLACEHOLDER: &str = "{input}";
/// Placeholder replaced by the destination path in extractor arguments
pub const OUTPUT_PLACEHOLDER: &str = "{output}";

/// A4 page height in millimetres
pub const A4_HEIGHT_MM: f64 = 297.0;

/// Top-level configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Config {
    /// Activity log settings
    #[serde(default)]
    pub log: LogConfig,
    /// File store settings
    #[serde(default)]
    pub store: StoreConfig,
    /// Text conversion settings
    #[serde(default)]
    pub conversion: ConversionConfig,
    /// PDF input/output settings
    #[serde(default)]
    pub pdf: PdfConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LogConfig {
    /// Append-only activity log file
    #[serde(default = "default_log_path")]
    pub path: PathBuf,
    /// Disable to keep operations from touching the log file
    #[serde(default = "default_true")]
    pub enabled: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoreConfig {
    /// Largest file `read` will load into memory
    #[serde(default = "default_max_read_bytes")]
    pub max_read_bytes: u64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ConversionConfig {
    /// How TXT to JSON emits each line
    #[serde(default)]
    pub json_encoding: JsonEncoding,
}

/// String emission policy for TXT to JSON
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum JsonEncoding {
    /// Lines are quoted as-is; embedded quotes and control characters are not escaped
    #[default]
    Raw,
    /// Lines are escaped as proper JSON strings
    Escaped,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PdfConfig {
    /// Directory searched first for the font family
    #[serde(default = "default_font_dir")]
    pub font_dir: PathBuf,
    /// Font family name, loaded as `<name>-Regular.ttf` and friends
    #[serde(default = "default_font_name")]
    pub font_name: String,
    /// Font size in points
    #[serde(default = "default_font_size")]
    pub font_size: u8,
    /// Page margin on every side
    #[serde(default = "default_margin_mm")]
    pub margin_mm: f64,
    /// Vertical cursor advance per line
    #[serde(default = "default_line_height_mm")]
    pub line_height_mm: f64,
    /// Document title written into the PDF metadata
    #[serde(default = "default_title")]
    pub title: String,
    /// External PDF to text tool
    #[serde(default)]
    pub extractor: ExtractorConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExtractorConfig {
    /// Program to spawn
    #[serde(default = "default_extractor_program")]
    pub program: String,
    /// Argument template; `{input}` and `{output}` are substituted
    #[serde(default = "default_extractor_args")]
    pub args: Vec<String>,
    /// Use the embedded extractor when the program cannot be spawned
    #[serde(default)]
    pub fallback_to_embedded: bool,
}

// Default value functions
fn default_true() -> bool { true }
fn default_log_path() -> PathBuf { PathBuf::from("logs.txt") }
fn default_max_read_bytes() -> u64 { 64 * 1024 * 1024 } // 64MB
fn default_font_dir() -> PathBuf { PathBuf::from("./fonts") }
fn default_font_name() -> String { "LiberationMono".to_string() }
fn default_font_size() -> u8 { 12 }
fn default_margin_mm() -> f64 { 15.0 }
fn default_line_height_mm() -> f64 { 6.35 } // 18pt
fn default_title() -> String { "Converted Document".to_string() }
fn default_extractor_program() -> String { "pdftotext".to_string() }
fn default_extractor_args() -> Vec<String> {
    vec![INPUT_PLACEHOLDER.to_string(), OUTPUT_PLACEHOLDER.to_string()]
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            path: default_log_path(),
            enabled: default_true(),
        }
    }
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            max_read_bytes: default_max_read_bytes(),
        }
    }
}

impl Default for PdfConfig {
    fn default() -> Self {
        Self {
            font_dir: default_font_dir(),
            font_name: default_font_name(),
            font_size: default_font_size(),
            margin_mm: default_margin_mm(),
            line_height_mm: default_line_height_mm(),
            title: default_title(),
            extractor: ExtractorConfig::default(),
        }
    }
}

impl Default for ExtractorConfig {
    fn default() -> Self {
        Self {
            program: default_extractor_program(),
            args: default_extractor_args(),
            fallback_to_embedded: false,
        }
    }
}

impl PdfConfig {
    /// Height available to text between the top and bottom margins
    pub fn usable_height_mm(&self) -> f64 {
        A4_HEIGHT_MM - 2.0 * self.margin_mm
    }
}

impl Config {
    /// Load configuration from a TOML file and validate it
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();

        let content = fs::read_to_string(path)
            .map_err(|e| ConverterError::io("read config", path, e))?;

        let config: Config = toml::from_str(&content).map_err(|e| {
            ConverterError::Config(format!("{}: {}", path.display(), e))
        })?;

        config.validate()?;
        info!("Configuration loaded from: {}", path.display());
        Ok(config)
    }

    /// Save configuration as pretty TOML
    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let path = path.as_ref();

        let content = toml::to_string_pretty(self)
            .map_err(|e| ConverterError::Config(format!("Serialization error: {}", e)))?;

        fs::write(path, content).map_err(|e| ConverterError::io("write config", path, e))?;

        info!("Configuration saved to: {}", path.display());
        Ok(())
    }

    /// Validate configuration values
    pub fn validate(&self) -> Result<()> {
        if self.store.max_read_bytes == 0 {
            return Err(ConverterError::Config(
                "store.max_read_bytes cannot be zero".to_string(),
            ));
        }

        if self.log.enabled && self.log.path.as_os_str().is_empty() {
            return Err(ConverterError::Config(
                "log.path cannot be empty while logging is enabled".to_string(),
            ));
        }

        let pdf = &self.pdf;
        if pdf.font_size == 0 {
            return Err(ConverterError::Config("pdf.font_size cannot be zero".to_string()));
        }
        if !pdf.line_height_mm.is_finite() || pdf.line_height_mm <= 0.0 {
            return Err(ConverterError::Config(
                "pdf.line_height_mm must be positive".to_string(),
            ));
        }
        if pdf.margin_mm < 0.0 || pdf.line_height_mm >= pdf.usable_height_mm() {
            return Err(ConverterError::Config(format!(
                "pdf layout leaves no room for a line: margin {}mm, line height {}mm",
                pdf.margin_mm, pdf.line_height_mm
            )));
        }

        let extractor = &pdf.extractor;
        if extractor.program.trim().is_empty() {
            return Err(ConverterError::Config(
                "pdf.extractor.program cannot be empty".to_string(),
            ));
        }
        for placeholder in [INPUT_PLACEHOLDER, OUTPUT_PLACEHOLDER] {
            if !extractor.args.iter().any(|arg| arg.contains(placeholder)) {
                return Err(ConverterError::Config(format!(
                    "pdf.extractor.args must mention {}",
                    placeholder
                )));
            }
        }

        if !pdf.font_dir.exists() {
            warn!(
                "Font directory {} does not exist, system font paths will be tried",
                pdf.font_dir.display()
            );
        }

        Ok(())
    }
}
