//! Format conversions
//!
//! A [`ConversionRequest`] names a source, a target and one
//! [`ConversionKind`]. [`Converter::convert`] runs that single transform and
//! reports the result as an [`Outcome`]; it never returns an error or panics
//! on a bad path.

pub mod pdf;
pub mod text;

use crate::activity::ActivityLog;
use crate::config::{Config, JsonEncoding};
use crate::error::{ConverterError, Result};
use crate::outcome::Outcome;
use pdf::{DocumentRenderer, ExternalCommand, GenpdfRenderer, PdfTextExtractor};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::fs::File;
use std::io::{BufRead, BufReader, BufWriter};
use std::path::{Path, PathBuf};
use std::str::FromStr;
use tracing::{info, warn};

/// The closed set of supported format pairs
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "kebab-case")]
pub enum ConversionKind {
    TxtToCsv,
    CsvToTxt,
    TxtToHtml,
    HtmlToTxt,
    TxtToJson,
    JsonToTxt,
    PdfToTxt,
    TxtToPdf,
}

impl ConversionKind {
    pub const ALL: [ConversionKind; 8] = [
        ConversionKind::TxtToCsv,
        ConversionKind::CsvToTxt,
        ConversionKind::PdfToTxt,
        ConversionKind::TxtToPdf,
        ConversionKind::TxtToHtml,
        ConversionKind::HtmlToTxt,
        ConversionKind::JsonToTxt,
        ConversionKind::TxtToJson,
    ];

    /// Kebab-case name used on the command line
    pub fn as_str(&self) -> &'static str {
        match self {
            ConversionKind::TxtToCsv => "txt-to-csv",
            ConversionKind::CsvToTxt => "csv-to-txt",
            ConversionKind::TxtToHtml => "txt-to-html",
            ConversionKind::HtmlToTxt => "html-to-txt",
            ConversionKind::TxtToJson => "txt-to-json",
            ConversionKind::JsonToTxt => "json-to-txt",
            ConversionKind::PdfToTxt => "pdf-to-txt",
            ConversionKind::TxtToPdf => "txt-to-pdf",
        }
    }

    /// Number of the conversion in the menu, 1 through 8
    pub fn menu_code(&self) -> u8 {
        match self {
            ConversionKind::TxtToCsv => 1,
            ConversionKind::CsvToTxt => 2,
            ConversionKind::PdfToTxt => 3,
            ConversionKind::TxtToPdf => 4,
            ConversionKind::TxtToHtml => 5,
            ConversionKind::HtmlToTxt => 6,
            ConversionKind::JsonToTxt => 7,
            ConversionKind::TxtToJson => 8,
        }
    }

    pub fn from_menu_code(code: u8) -> Option<Self> {
        Self::ALL.into_iter().find(|kind| kind.menu_code() == code)
    }
}

impl fmt::Display for ConversionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            ConversionKind::TxtToCsv => "TXT to CSV",
            ConversionKind::CsvToTxt => "CSV to TXT",
            ConversionKind::TxtToHtml => "TXT to HTML",
            ConversionKind::HtmlToTxt => "HTML to TXT",
            ConversionKind::TxtToJson => "TXT to JSON",
            ConversionKind::JsonToTxt => "JSON to TXT",
            ConversionKind::PdfToTxt => "PDF to TXT",
            ConversionKind::TxtToPdf => "TXT to PDF",
        };
        f.write_str(label)
    }
}

impl FromStr for ConversionKind {
    type Err = ConverterError;

    /// Accepts `txt-to-csv`, `txt_to_csv`, `TXT to CSV` or a menu number
    fn from_str(s: &str) -> Result<Self> {
        let trimmed = s.trim();
        if let Ok(code) = trimmed.parse::<u8>() {
            return Self::from_menu_code(code).ok_or_else(|| {
                ConverterError::Validation(format!("Invalid conversion choice: {}", code))
            });
        }

        let normalized = trimmed.to_ascii_lowercase().replace(['_', ' '], "-");
        Self::ALL
            .into_iter()
            .find(|kind| kind.as_str() == normalized)
            .ok_or_else(|| ConverterError::Validation(format!("Unknown conversion kind: {}", s)))
    }
}

/// One conversion to run; both paths are guaranteed non-empty
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConversionRequest {
    source: PathBuf,
    target: PathBuf,
    kind: ConversionKind,
}

impl ConversionRequest {
    pub fn new(
        source: impl Into<PathBuf>,
        target: impl Into<PathBuf>,
        kind: ConversionKind,
    ) -> Result<Self> {
        let source = source.into();
        let target = target.into();

        if source.as_os_str().is_empty() || target.as_os_str().is_empty() {
            return Err(ConverterError::Validation(
                "Please select both input and output files".to_string(),
            ));
        }

        Ok(Self { source, target, kind })
    }

    pub fn source(&self) -> &Path {
        &self.source
    }

    pub fn target(&self) -> &Path {
        &self.target
    }

    pub fn kind(&self) -> ConversionKind {
        self.kind
    }
}

/// Runs conversions and records each result in the activity log
pub struct Converter {
    log: ActivityLog,
    json_encoding: JsonEncoding,
    extractor: Box<dyn PdfTextExtractor>,
    renderer: Box<dyn DocumentRenderer>,
}

impl Converter {
    /// Converter wired to the external `pdftotext`-style tool and genpdf
    pub fn from_config(config: &Config, log: ActivityLog) -> Self {
        Self::with_collaborators(
            log,
            config.conversion.json_encoding,
            Box::new(ExternalCommand::from_config(&config.pdf.extractor)),
            Box::new(GenpdfRenderer::new(config.pdf.clone())),
        )
    }

    pub fn with_collaborators(
        log: ActivityLog,
        json_encoding: JsonEncoding,
        extractor: Box<dyn PdfTextExtractor>,
        renderer: Box<dyn DocumentRenderer>,
    ) -> Self {
        Self {
            log,
            json_encoding,
            extractor,
            renderer,
        }
    }

    pub fn convert(&self, request: &ConversionRequest) -> Outcome {
        let kind = request.kind();
        info!(
            "Converting {} -> {} ({})",
            request.source().display(),
            request.target().display(),
            kind
        );

        let outcome = match self.run(request) {
            Ok(()) => Outcome::success(format!("{} conversion complete.", kind)),
            Err(e) => Outcome::failure(failure_message(kind, self.extractor.name(), &e)),
        };

        if outcome.success {
            info!("{}", outcome.message);
            self.log.record(&format!("{} conversion successful.", kind));
        } else {
            warn!("{}", outcome.message);
            self.log
                .record(&format!("Error in {} conversion. {}", kind, outcome.message));
        }
        outcome
    }

    fn run(&self, request: &ConversionRequest) -> Result<()> {
        let (source, target) = (request.source(), request.target());

        match request.kind() {
            ConversionKind::TxtToCsv => stream(source, target, text::txt_to_csv),
            ConversionKind::CsvToTxt => stream(source, target, text::csv_to_txt),
            ConversionKind::TxtToHtml => stream(source, target, text::txt_to_html),
            ConversionKind::HtmlToTxt => stream(source, target, text::html_to_txt),
            ConversionKind::JsonToTxt => stream(source, target, text::json_to_txt),
            ConversionKind::TxtToJson => {
                let encoding = self.json_encoding;
                stream(source, target, |input, output| {
                    text::txt_to_json(input, output, encoding)
                })
            }
            ConversionKind::PdfToTxt => self.extractor.extract(source, target),
            ConversionKind::TxtToPdf => {
                let lines = read_lines(source)?;
                self.renderer.render(&lines, target)
            }
        }
    }
}

/// Open the source, then the target, and run `transform` between them.
/// The target is never created when the source cannot be opened.
fn stream<F>(source: &Path, target: &Path, transform: F) -> Result<()>
where
    F: FnOnce(BufReader<File>, BufWriter<File>) -> std::io::Result<()>,
{
    let input = File::open(source).map_err(|e| ConverterError::io("open", source, e))?;
    let output = File::create(target).map_err(|e| ConverterError::io("create", target, e))?;

    transform(BufReader::new(input), BufWriter::new(output))
        .map_err(|e| ConverterError::io("convert", source, e))
}

/// Source lines, terminators kept, decoded lossily
fn read_lines(source: &Path) -> Result<Vec<String>> {
    let file = File::open(source).map_err(|e| ConverterError::io("open", source, e))?;
    let mut reader = BufReader::new(file);
    let mut lines = Vec::new();
    let mut buf = Vec::new();

    loop {
        buf.clear();
        let read = reader
            .read_until(b'\n', &mut buf)
            .map_err(|e| ConverterError::io("read", source, e))?;
        if read == 0 {
            break;
        }
        lines.push(String::from_utf8_lossy(&buf).into_owned());
    }
    Ok(lines)
}

fn failure_message(kind: ConversionKind, tool: &str, error: &ConverterError) -> String {
    match error {
        ConverterError::ExternalTool { .. } => format!(
            "Conversion failed. Make sure `{}` is installed. ({})",
            tool, error
        ),
        ConverterError::Io { .. } => format!("File error. Check paths. ({})", error),
        other => format!("{} conversion failed: {}", kind, other),
    }
}
