//! Shared helpers for the integration tests
#![allow(dead_code)]

use file_format_converter::prelude::*;
use file_format_converter::config::JsonEncoding;
use file_format_converter::convert::pdf::{DocumentRenderer, PdfTextExtractor};
use std::cell::RefCell;
use std::fs;
use std::path::{Path, PathBuf};
use std::rc::Rc;
use tempfile::TempDir;

/// Scratch directory with its own activity log
pub struct Workspace {
    pub dir: TempDir,
}

impl Workspace {
    pub fn new() -> Self {
        Self {
            dir: TempDir::new().expect("create temp dir"),
        }
    }

    pub fn path(&self, name: &str) -> PathBuf {
        self.dir.path().join(name)
    }

    pub fn write(&self, name: &str, content: &str) -> PathBuf {
        let path = self.path(name);
        fs::write(&path, content).expect("write fixture");
        path
    }

    pub fn read(&self, name: &str) -> String {
        fs::read_to_string(self.path(name)).expect("read output")
    }

    pub fn log(&self) -> ActivityLog {
        ActivityLog::new(self.path("logs.txt"))
    }

    pub fn log_lines(&self) -> Vec<String> {
        fs::read_to_string(self.path("logs.txt"))
            .map(|content| content.lines().map(str::to_string).collect())
            .unwrap_or_default()
    }

    pub fn store(&self) -> FileStore {
        FileStore::new(self.log(), 1024 * 1024)
    }

    /// Converter with the real genpdf/pdftotext collaborators replaced
    pub fn converter(&self, extractor: Box<dyn PdfTextExtractor>, renderer: Box<dyn DocumentRenderer>) -> Converter {
        Converter::with_collaborators(self.log(), JsonEncoding::Raw, extractor, renderer)
    }

    pub fn text_converter(&self) -> Converter {
        self.converter(Box::new(FailingExtractor), Box::new(RecordingRenderer::default()))
    }
}

/// Extractor standing in for a missing external tool
pub struct FailingExtractor;

impl PdfTextExtractor for FailingExtractor {
    fn name(&self) -> &str {
        "pdftotext"
    }

    fn extract(&self, _source: &Path, _target: &Path) -> Result<()> {
        Err(ConverterError::ExternalTool {
            tool: "pdftotext".to_string(),
            reason: "could not be started: No such file or directory".to_string(),
        })
    }
}

/// Extractor that writes fixed text, like a successful external run
pub struct FixedTextExtractor(pub &'static str);

impl PdfTextExtractor for FixedTextExtractor {
    fn name(&self) -> &str {
        "fixed"
    }

    fn extract(&self, source: &Path, target: &Path) -> Result<()> {
        if !source.exists() {
            return Err(ConverterError::ExternalTool {
                tool: "fixed".to_string(),
                reason: "exit status: 1".to_string(),
            });
        }
        fs::write(target, self.0).map_err(|e| ConverterError::io("write", target, e))
    }
}

/// Renderer that remembers the lines it was asked to lay out
#[derive(Default, Clone)]
pub struct RecordingRenderer {
    pub rendered: Rc<RefCell<Vec<Vec<String>>>>,
}

impl DocumentRenderer for RecordingRenderer {
    fn render(&self, lines: &[String], target: &Path) -> Result<()> {
        self.rendered.borrow_mut().push(lines.to_vec());
        fs::write(target, b"%PDF-1.4\n").map_err(|e| ConverterError::io("write", target, e))
    }
}
