//! PDF input and output
//!
//! Text extraction is delegated to an external program (`pdftotext` by
//! default) behind the [`PdfTextExtractor`] trait; the embedded `pdf-extract`
//! parser can stand in when that program is missing. Rendering goes through
//! [`DocumentRenderer`], implemented with genpdf: every input line is placed
//! at a fixed left margin on A4 pages while a vertical cursor walks down the
//! page and wraps to the next one.

use crate::config::{ExtractorConfig, PdfConfig, INPUT_PLACEHOLDER, OUTPUT_PLACEHOLDER};
use crate::error::{ConverterError, Result};
use genpdf::{
    error::{Error as GenpdfError, ErrorKind as GenpdfErrorKind},
    fonts::{self, FontData, FontFamily},
    render,
    style::Style,
    Context, Document, Element, Margins, PaperSize, Position, RenderResult, SimplePageDecorator, Size,
};
use std::ffi::OsString;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::process::Command;
use tracing::{debug, info, warn};

/// Turns a PDF file into a text file
pub trait PdfTextExtractor {
    /// Name shown to the user when extraction fails
    fn name(&self) -> &str;

    fn extract(&self, source: &Path, target: &Path) -> Result<()>;
}

/// Lays out text lines into a PDF file
pub trait DocumentRenderer {
    fn render(&self, lines: &[String], target: &Path) -> Result<()>;
}

/// Runs an external program built from an argument template
pub struct ExternalCommand {
    program: String,
    args: Vec<String>,
    fallback: Option<Box<dyn PdfTextExtractor>>,
}

impl ExternalCommand {
    pub fn new(program: impl Into<String>, args: Vec<String>) -> Self {
        Self {
            program: program.into(),
            args,
            fallback: None,
        }
    }

    pub fn from_config(config: &ExtractorConfig) -> Self {
        let command = Self::new(config.program.clone(), config.args.clone());
        if config.fallback_to_embedded {
            command.with_fallback(Box::new(EmbeddedExtractor))
        } else {
            command
        }
    }

    /// Extractor used when the program cannot be started at all
    pub fn with_fallback(mut self, fallback: Box<dyn PdfTextExtractor>) -> Self {
        self.fallback = Some(fallback);
        self
    }

    /// Arguments with `{input}` and `{output}` substituted
    pub fn arguments(&self, source: &Path, target: &Path) -> Vec<OsString> {
        self.args
            .iter()
            .map(|arg| match arg.as_str() {
                INPUT_PLACEHOLDER => source.as_os_str().to_owned(),
                OUTPUT_PLACEHOLDER => target.as_os_str().to_owned(),
                other => OsString::from(
                    other
                        .replace(INPUT_PLACEHOLDER, &source.to_string_lossy())
                        .replace(OUTPUT_PLACEHOLDER, &target.to_string_lossy()),
                ),
            })
            .collect()
    }
}

impl PdfTextExtractor for ExternalCommand {
    fn name(&self) -> &str {
        &self.program
    }

    fn extract(&self, source: &Path, target: &Path) -> Result<()> {
        let args = self.arguments(source, target);
        debug!("Running {} {:?}", self.program, args);

        let output = match Command::new(&self.program).args(&args).output() {
            Ok(output) => output,
            Err(e) => {
                if let (ErrorKind::NotFound, Some(fallback)) = (e.kind(), &self.fallback) {
                    warn!(
                        "{} is not installed, falling back to {}",
                        self.program,
                        fallback.name()
                    );
                    return fallback.extract(source, target);
                }
                return Err(ConverterError::ExternalTool {
                    tool: self.program.clone(),
                    reason: format!("could not be started: {}", e),
                });
            }
        };

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(ConverterError::ExternalTool {
                tool: self.program.clone(),
                reason: format!("{} {}", output.status, stderr.trim()).trim().to_string(),
            });
        }

        info!("{} extracted {} into {}", self.program, source.display(), target.display());
        Ok(())
    }
}

/// In-process extraction with the pdf-extract crate
#[derive(Debug, Default, Clone, Copy)]
pub struct EmbeddedExtractor;

impl PdfTextExtractor for EmbeddedExtractor {
    fn name(&self) -> &str {
        "pdf-extract"
    }

    fn extract(&self, source: &Path, target: &Path) -> Result<()> {
        let bytes = fs::read(source).map_err(|e| ConverterError::io("read", source, e))?;

        let text = pdf_extract::extract_text_from_mem(&bytes).map_err(|e| {
            ConverterError::ExternalTool {
                tool: self.name().to_string(),
                reason: e.to_string(),
            }
        })?;

        fs::write(target, &text).map_err(|e| ConverterError::io("write", target, e))?;
        info!("Extracted {} characters of text from {}", text.len(), source.display());
        Ok(())
    }
}

/// Vertical position tracking for fixed-height lines on a page
#[derive(Debug, Clone, PartialEq)]
pub struct LineCursor {
    line_height: f64,
    usable_height: f64,
    y: f64,
}

impl LineCursor {
    pub fn new(line_height: f64, usable_height: f64) -> Self {
        Self {
            line_height,
            usable_height,
            y: 0.0,
        }
    }

    /// Top of the next line, or `None` when the page is full
    pub fn next_line(&mut self) -> Option<f64> {
        if self.y + self.line_height > self.usable_height {
            return None;
        }
        let top = self.y;
        self.y += self.line_height;
        Some(top)
    }

    pub fn new_page(&mut self) {
        self.y = 0.0;
    }

    pub fn used(&self) -> f64 {
        self.y
    }

    pub fn lines_per_page(&self) -> usize {
        (self.usable_height / self.line_height).floor() as usize
    }
}

/// Number of pages `line_count` lines occupy; an empty document still has one page
pub fn page_count(line_count: usize, lines_per_page: usize) -> usize {
    if line_count == 0 || lines_per_page == 0 {
        return 1;
    }
    (line_count + lines_per_page - 1) / lines_per_page
}

/// genpdf element printing pre-split lines, one per cursor step
struct MonospaceLines {
    lines: Vec<String>,
    next: usize,
    cursor: LineCursor,
}

impl MonospaceLines {
    fn new(lines: Vec<String>, cursor: LineCursor) -> Self {
        Self {
            lines,
            next: 0,
            cursor,
        }
    }
}

impl Element for MonospaceLines {
    fn render(
        &mut self,
        context: &Context,
        area: render::Area<'_>,
        style: Style,
    ) -> std::result::Result<RenderResult, GenpdfError> {
        self.cursor.new_page();
        let mut placed = 0;

        while self.next < self.lines.len() {
            let top = match self.cursor.next_line() {
                Some(top) => top,
                None => break,
            };
            let line = &self.lines[self.next];
            if !area.print_str(&context.font_cache, Position::new(0.0, top), style, line)? {
                break;
            }
            self.next += 1;
            placed += 1;
        }

        let has_more = self.next < self.lines.len();
        if has_more && placed == 0 {
            return Err(GenpdfError::new(
                format!("line {} does not fit on an empty page", self.next + 1),
                GenpdfErrorKind::PageSizeExceeded,
            ));
        }

        Ok(RenderResult {
            size: Size::new(area.size().width, self.cursor.used()),
            has_more,
        })
    }
}

/// Renders with genpdf, embedding the configured monospace TrueType family
pub struct GenpdfRenderer {
    config: PdfConfig,
}

impl GenpdfRenderer {
    pub fn new(config: PdfConfig) -> Self {
        Self { config }
    }

    /// Load the font family, trying the configured directory first
    fn load_font_family(&self) -> Result<FontFamily<FontData>> {
        let name = &self.config.font_name;
        let mut search_dirs: Vec<PathBuf> = vec![self.config.font_dir.clone()];
        search_dirs.extend(
            [
                "/usr/share/fonts/truetype/liberation",
                "/usr/share/fonts/liberation",
                "/usr/share/fonts",
                "/System/Library/Fonts",
                "C:\\Windows\\Fonts",
            ]
            .iter()
            .map(PathBuf::from),
        );

        for dir in &search_dirs {
            match fonts::from_files(dir, name, None) {
                Ok(family) => {
                    debug!("Loaded font '{}' from {}", name, dir.display());
                    return Ok(family);
                }
                Err(e) => debug!("Font '{}' not in {}: {}", name, dir.display(), e),
            }
        }

        Err(ConverterError::PdfRender(format!(
            "could not load font '{}' from {} or the system font directories",
            name,
            self.config.font_dir.display()
        )))
    }
}

impl DocumentRenderer for GenpdfRenderer {
    fn render(&self, lines: &[String], target: &Path) -> Result<()> {
        let bytes = self.render_to_bytes(lines)?;
        fs::write(target, &bytes).map_err(|e| ConverterError::io("write", target, e))?;
        info!("Wrote {} bytes of PDF to {}", bytes.len(), target.display());
        Ok(())
    }
}

impl GenpdfRenderer {
    /// Lay out the whole document in memory; nothing touches disk on failure
    fn render_to_bytes(&self, lines: &[String]) -> Result<Vec<u8>> {
        let font_family = self.load_font_family()?;

        let mut doc = Document::new(font_family);
        doc.set_title(self.config.title.clone());
        doc.set_paper_size(PaperSize::A4);
        doc.set_font_size(self.config.font_size);

        let mut decorator = SimplePageDecorator::new();
        decorator.set_margins(Margins::all(self.config.margin_mm));
        doc.set_page_decorator(decorator);

        let cursor = LineCursor::new(self.config.line_height_mm, self.config.usable_height_mm());
        info!(
            "Rendering {} lines onto {} page(s)",
            lines.len(),
            page_count(lines.len(), cursor.lines_per_page())
        );

        let printable = lines.iter().map(|line| printable_line(line)).collect();
        doc.push(MonospaceLines::new(printable, cursor));

        let mut buffer = Vec::new();
        doc.render(&mut buffer)
            .map_err(|e| ConverterError::PdfRender(e.to_string()))?;
        Ok(buffer)
    }
}

/// Strip the line terminator and expand tabs, which have no glyph
fn printable_line(line: &str) -> String {
    line.trim_end_matches(['\n', '\r']).replace('\t', "    ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_arguments_substitute_placeholders() {
        let command = ExternalCommand::new(
            "pdftotext",
            vec!["-layout".to_string(), "{input}".to_string(), "{output}".to_string()],
        );
        let args = command.arguments(Path::new("in.pdf"), Path::new("out dir/out.txt"));
        assert_eq!(
            args,
            vec![
                OsString::from("-layout"),
                OsString::from("in.pdf"),
                OsString::from("out dir/out.txt"),
            ]
        );
    }

    #[test]
    fn test_arguments_substitute_inside_larger_argument() {
        let command = ExternalCommand::new("tool", vec!["--out={output}".to_string(), "{input}".to_string()]);
        let args = command.arguments(Path::new("a.pdf"), Path::new("b.txt"));
        assert_eq!(args[0], OsString::from("--out=b.txt"));
    }

    #[test]
    fn test_missing_program_is_external_tool_error() {
        let dir = TempDir::new().unwrap();
        let command = ExternalCommand::new(
            "definitely-not-an-installed-pdf-tool",
            vec!["{input}".to_string(), "{output}".to_string()],
        );

        let err = command
            .extract(&dir.path().join("in.pdf"), &dir.path().join("out.txt"))
            .unwrap_err();
        assert!(matches!(err, ConverterError::ExternalTool { .. }));
        assert!(!dir.path().join("out.txt").exists());
    }

    struct Recording(&'static str);

    impl PdfTextExtractor for Recording {
        fn name(&self) -> &str {
            "recording"
        }

        fn extract(&self, _source: &Path, target: &Path) -> Result<()> {
            fs::write(target, self.0).map_err(|e| ConverterError::io("write", target, e))
        }
    }

    #[test]
    fn test_fallback_runs_when_program_is_missing() {
        let dir = TempDir::new().unwrap();
        let target = dir.path().join("out.txt");
        let command = ExternalCommand::new("definitely-not-an-installed-pdf-tool", vec![])
            .with_fallback(Box::new(Recording("from fallback")));

        command.extract(&dir.path().join("in.pdf"), &target).unwrap();
        assert_eq!(fs::read_to_string(&target).unwrap(), "from fallback");
    }

    #[test]
    fn test_embedded_extractor_rejects_non_pdf() {
        let dir = TempDir::new().unwrap();
        let source = dir.path().join("fake.pdf");
        fs::write(&source, "not a pdf").unwrap();

        let err = EmbeddedExtractor
            .extract(&source, &dir.path().join("out.txt"))
            .unwrap_err();
        assert!(matches!(err, ConverterError::ExternalTool { .. }));
    }

    #[test]
    fn test_cursor_fills_page_then_stops() {
        let mut cursor = LineCursor::new(10.0, 35.0);
        assert_eq!(cursor.lines_per_page(), 3);
        assert_eq!(cursor.next_line(), Some(0.0));
        assert_eq!(cursor.next_line(), Some(10.0));
        assert_eq!(cursor.next_line(), Some(20.0));
        assert_eq!(cursor.next_line(), None);
        assert_eq!(cursor.used(), 30.0);

        cursor.new_page();
        assert_eq!(cursor.next_line(), Some(0.0));
    }

    #[test]
    fn test_page_count() {
        assert_eq!(page_count(0, 42), 1);
        assert_eq!(page_count(42, 42), 1);
        assert_eq!(page_count(43, 42), 2);
        assert_eq!(page_count(100, 42), 3);
    }

    #[test]
    fn test_default_layout_fits_forty_two_lines() {
        let config = PdfConfig::default();
        let cursor = LineCursor::new(config.line_height_mm, config.usable_height_mm());
        assert_eq!(cursor.lines_per_page(), 42);
    }

    #[test]
    fn test_printable_line() {
        assert_eq!(printable_line("a\tb\r\n"), "a    b");
        assert_eq!(printable_line("plain"), "plain");
    }

    #[test]
    fn test_renderer_without_fonts_fails_cleanly() {
        let dir = TempDir::new().unwrap();
        let renderer = GenpdfRenderer::new(PdfConfig {
            font_dir: dir.path().join("no-fonts"),
            font_name: "NoSuchFontFamily".to_string(),
            ..PdfConfig::default()
        });

        let target = dir.path().join("out.pdf");
        let err = renderer.render(&["hello".to_string()], &target).unwrap_err();
        assert!(matches!(err, ConverterError::PdfRender(_)));
        assert!(!target.exists());
    }

    /// Renderer with the default layout, or `None` when no font family is installed
    fn installed_renderer() -> Option<GenpdfRenderer> {
        let renderer = GenpdfRenderer::new(PdfConfig::default());
        match renderer.load_font_family() {
            Ok(_) => Some(renderer),
            Err(e) => {
                eprintln!("skipping: {}", e);
                None
            }
        }
    }

    fn numbered_lines(count: usize) -> Vec<String> {
        (1..=count).map(|n| format!("line {}\n", n)).collect()
    }

    /// Page objects in the PDF, whitespace between `/Type` and `/Page` tolerated
    fn count_pages(pdf: &[u8]) -> usize {
        let text = String::from_utf8_lossy(pdf);
        text.match_indices("/Type")
            .filter(|(i, _)| {
                let rest = text[i + "/Type".len()..].trim_start();
                rest.starts_with("/Page") && !rest.starts_with("/Pages")
            })
            .count()
    }

    #[test]
    fn test_render_full_page_then_overflow() {
        let Some(renderer) = installed_renderer() else { return };

        let one_page = renderer.render_to_bytes(&numbered_lines(42)).unwrap();
        assert_eq!(count_pages(&one_page), 1);

        let two_pages = renderer.render_to_bytes(&numbered_lines(43)).unwrap();
        assert!(two_pages.starts_with(b"%PDF"));
        assert_eq!(count_pages(&two_pages), 2);
    }

    #[test]
    fn test_render_writes_target() {
        let Some(renderer) = installed_renderer() else { return };
        let dir = TempDir::new().unwrap();
        let target = dir.path().join("out.pdf");

        renderer.render(&numbered_lines(3), &target).unwrap();
        assert!(fs::read(&target).unwrap().starts_with(b"%PDF"));
    }

    #[test]
    fn test_render_non_latin_text() {
        let Some(renderer) = installed_renderer() else { return };
        let dir = TempDir::new().unwrap();
        let target = dir.path().join("greek.pdf");

        let lines = vec!["ok\n".to_string(), "Привет, κόσμος\n".to_string()];
        renderer.render(&lines, &target).unwrap();
        assert!(fs::metadata(&target).unwrap().len() > 0);
    }

    #[test]
    fn test_failed_render_leaves_no_target() {
        let Some(renderer) = installed_renderer() else { return };
        let renderer = GenpdfRenderer::new(PdfConfig {
            line_height_mm: 300.0,
            ..renderer.config
        });
        let dir = TempDir::new().unwrap();
        let target = dir.path().join("out.pdf");

        let err = renderer.render(&numbered_lines(1), &target).unwrap_err();
        assert!(matches!(err, ConverterError::PdfRender(_)));
        assert!(!target.exists());
    }

    #[test]
    fn test_unwritable_target_is_io_error() {
        let Some(renderer) = installed_renderer() else { return };
        let dir = TempDir::new().unwrap();
        let target = dir.path().join("missing").join("out.pdf");

        let err = renderer.render(&numbered_lines(1), &target).unwrap_err();
        assert!(err.is_io());
        assert!(!target.exists());
    }
}
