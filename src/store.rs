//! Elementary file operations backed by the activity log
//!
//! Every operation records exactly one line in the [`ActivityLog`], whether it
//! succeeds or fails, and hands the caller either an [`Outcome`] or a typed
//! result that a front end can turn into one.

use crate::activity::ActivityLog;
use crate::error::{ConverterError, Result};
use crate::outcome::Outcome;
use std::fs::{self, File, OpenOptions};
use std::io::{BufRead, BufReader, Read, Write};
use std::path::Path;
use tracing::{debug, info, warn};

/// One line of a file that contains the search term
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchMatch {
    /// 1-based line number
    pub line_number: usize,
    /// Full line text, trailing newline included when present
    pub line_text: String,
}

/// Ordered matches; empty means the term was not found
pub type SearchResult = Vec<SearchMatch>;

#[derive(Debug, Clone)]
pub struct FileStore {
    log: ActivityLog,
    max_read_bytes: u64,
}

impl FileStore {
    pub fn new(log: ActivityLog, max_read_bytes: u64) -> Self {
        Self { log, max_read_bytes }
    }

    /// Create (or truncate) `path` and write `content` into it
    pub fn create(&self, path: &Path, content: &str) -> Outcome {
        let result = require_path(path).and_then(|_| {
            let mut file = File::create(path).map_err(|e| ConverterError::io("create", path, e))?;
            if !content.is_empty() {
                file.write_all(content.as_bytes())
                    .map_err(|e| ConverterError::io("write", path, e))?;
            }
            Ok(())
        });

        self.finish(
            result,
            format!("File '{}' created.", path.display()),
            "Failed to create file",
        )
    }

    pub fn delete(&self, path: &Path) -> Outcome {
        let result = require_path(path)
            .and_then(|_| fs::remove_file(path).map_err(|e| ConverterError::io("delete", path, e)));

        self.finish(
            result,
            format!("File '{}' deleted.", path.display()),
            "Could not delete file",
        )
    }

    /// Read the entire file into memory, refusing files above the configured limit
    pub fn read(&self, path: &Path) -> Result<String> {
        let result = require_path(path).and_then(|_| self.read_bounded(path));

        match &result {
            Ok(content) => {
                info!("Read {} bytes from {}", content.len(), path.display());
                self.log.record(&format!("File '{}' read successfully.", path.display()));
            }
            Err(e) => {
                warn!("Read failed: {}", e);
                self.log.record(&format!("Failed to open file for reading. {}", e));
            }
        }
        result
    }

    /// Replace the file's contents with `content`
    pub fn write(&self, path: &Path, content: &str) -> Outcome {
        let result = require_path(path).and_then(|_| {
            let mut file = File::create(path).map_err(|e| ConverterError::io("open for writing", path, e))?;
            file.write_all(content.as_bytes())
                .map_err(|e| ConverterError::io("write", path, e))
        });

        self.finish(
            result,
            format!("Content written to '{}'.", path.display()),
            "Error writing to file",
        )
    }

    /// Extend the file with `content`, creating it when absent
    pub fn append(&self, path: &Path, content: &str) -> Outcome {
        let result = require_path(path).and_then(|_| {
            let mut file = OpenOptions::new()
                .create(true)
                .append(true)
                .open(path)
                .map_err(|e| ConverterError::io("open for appending", path, e))?;
            file.write_all(content.as_bytes())
                .map_err(|e| ConverterError::io("append", path, e))
        });

        self.finish(
            result,
            format!("Content appended to '{}'.", path.display()),
            "Error appending to file",
        )
    }

    /// Every line containing `term` as a literal substring, in file order
    pub fn search(&self, path: &Path, term: &str) -> Result<SearchResult> {
        let result = require_path(path).and_then(|_| {
            if term.is_empty() {
                return Err(ConverterError::Validation("search term cannot be empty".to_string()));
            }
            let file = File::open(path).map_err(|e| ConverterError::io("open for searching", path, e))?;
            scan_lines(BufReader::new(file), term.as_bytes())
                .map_err(|e| ConverterError::io("search", path, e))
        });

        match &result {
            Ok(matches) if matches.is_empty() => {
                info!("'{}' not found in {}", term, path.display());
                self.log.record(&format!("'{}' not found in the file.", term));
            }
            Ok(matches) => {
                info!("{} matches for '{}' in {}", matches.len(), term, path.display());
                self.log
                    .record(&format!("Search completed, found matches for '{}'.", term));
            }
            Err(e) => {
                warn!("Search failed: {}", e);
                self.log.record(&format!("Failed to open file for searching. {}", e));
            }
        }
        result
    }

    /// `read` for front ends: the file content on success, the error otherwise
    pub fn read_outcome(&self, path: &Path) -> Outcome {
        match self.read(path) {
            Ok(content) => Outcome::success(content),
            Err(e) => Outcome::failure(format!("Cannot open file for reading. {}", e)),
        }
    }

    /// `search` for front ends, rendered as `Line N: text` rows
    pub fn search_outcome(&self, path: &Path, term: &str) -> Outcome {
        match self.search(path, term) {
            Ok(matches) if matches.is_empty() => {
                Outcome::success(format!("'{}' not found in the file.", term))
            }
            Ok(matches) => Outcome::success(format_matches(&matches)),
            Err(e) => Outcome::failure(format!("Cannot search file. {}", e)),
        }
    }

    fn read_bounded(&self, path: &Path) -> Result<String> {
        let file = File::open(path).map_err(|e| ConverterError::io("open for reading", path, e))?;
        let size = file
            .metadata()
            .map_err(|e| ConverterError::io("inspect", path, e))?
            .len();

        if size > self.max_read_bytes {
            return Err(ConverterError::TooLarge {
                path: path.to_path_buf(),
                size,
                limit: self.max_read_bytes,
            });
        }

        // The reported size only sizes the buffer; the reader itself is capped
        // one byte past the limit so a file that grew meanwhile is still caught.
        let mut bytes = Vec::with_capacity(size as usize);
        file.take(self.max_read_bytes + 1)
            .read_to_end(&mut bytes)
            .map_err(|e| ConverterError::io("read", path, e))?;

        if bytes.len() as u64 > self.max_read_bytes {
            return Err(ConverterError::TooLarge {
                path: path.to_path_buf(),
                size: bytes.len() as u64,
                limit: self.max_read_bytes,
            });
        }

        Ok(String::from_utf8_lossy(&bytes).into_owned())
    }

    fn finish(&self, result: Result<()>, success: String, failure: &str) -> Outcome {
        match result {
            Ok(()) => {
                info!("{}", success);
                self.log.record(&success);
                Outcome::success(success)
            }
            Err(e) => {
                let message = format!("{}. {}", failure, e);
                warn!("{}", message);
                self.log.record(&message);
                Outcome::failure(message)
            }
        }
    }
}

fn require_path(path: &Path) -> Result<()> {
    if path.as_os_str().is_empty() {
        return Err(ConverterError::Validation("file path cannot be empty".to_string()));
    }
    Ok(())
}

/// Linear scan over newline-terminated lines, matching raw bytes
fn scan_lines<R: BufRead>(mut reader: R, term: &[u8]) -> std::io::Result<SearchResult> {
    let mut matches = Vec::new();
    let mut line = Vec::new();
    let mut line_number = 0;

    loop {
        line.clear();
        if reader.read_until(b'\n', &mut line)? == 0 {
            break;
        }
        line_number += 1;

        if contains(&line, term) {
            debug!("Match on line {}", line_number);
            matches.push(SearchMatch {
                line_number,
                line_text: String::from_utf8_lossy(&line).into_owned(),
            });
        }
    }

    Ok(matches)
}

/// `needle` is never empty: `search` rejects an empty term before scanning
fn contains(haystack: &[u8], needle: &[u8]) -> bool {
    haystack.windows(needle.len()).any(|window| window == needle)
}

/// Render matches the way the search screen shows them
pub fn format_matches(matches: &[SearchMatch]) -> String {
    let mut out = String::new();
    for m in matches {
        out.push_str(&format!("Line {}: {}", m.line_number, m.line_text));
        if !m.line_text.ends_with('\n') {
            out.push('\n');
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;
    use tempfile::TempDir;

    fn store_in(dir: &TempDir) -> FileStore {
        FileStore::new(ActivityLog::new(dir.path().join("logs.txt")), 1024)
    }

    #[test]
    fn test_scan_lines_keeps_newlines_and_numbers() {
        let input = Cursor::new("alpha\nbeta\nalphabet");
        let matches = scan_lines(input, b"alpha").unwrap();

        assert_eq!(
            matches,
            vec![
                SearchMatch { line_number: 1, line_text: "alpha\n".to_string() },
                SearchMatch { line_number: 3, line_text: "alphabet".to_string() },
            ]
        );
    }

    #[test]
    fn test_scan_lines_counts_every_occurrence_once_per_line() {
        let matches = scan_lines(Cursor::new("aa aa\n"), b"aa").unwrap();
        assert_eq!(matches.len(), 1);
    }

    #[test]
    fn test_format_matches() {
        let matches = vec![
            SearchMatch { line_number: 2, line_text: "two\n".to_string() },
            SearchMatch { line_number: 5, line_text: "five".to_string() },
        ];
        assert_eq!(format_matches(&matches), "Line 2: two\nLine 5: five\n");
    }

    #[test]
    fn test_read_rejects_files_over_limit() {
        let dir = TempDir::new().unwrap();
        let store = store_in(&dir);
        let path = dir.path().join("big.txt");
        fs::write(&path, vec![b'x'; 2048]).unwrap();

        let err = store.read(&path).unwrap_err();
        assert!(matches!(err, ConverterError::TooLarge { size: 2048, limit: 1024, .. }));
    }

    #[test]
    fn test_empty_path_is_rejected_before_io() {
        let dir = TempDir::new().unwrap();
        let store = store_in(&dir);

        let outcome = store.create(Path::new(""), "content");
        assert!(!outcome.success);
        assert!(matches!(
            store.read(Path::new("")),
            Err(ConverterError::Validation(_))
        ));
    }

    #[test]
    fn test_every_operation_logs_one_line() {
        let dir = TempDir::new().unwrap();
        let store = store_in(&dir);
        let path = dir.path().join("notes.txt");

        store.create(&path, "hello\n");
        store.append(&path, "world\n");
        store.read(&path).unwrap();
        store.search(&path, "world").unwrap();
        store.delete(&path);
        store.delete(&path);

        let log = fs::read_to_string(dir.path().join("logs.txt")).unwrap();
        let lines: Vec<&str> = log.lines().collect();
        assert_eq!(lines.len(), 6);
        assert!(lines[0].contains("created"));
        assert!(lines[3].contains("Search completed, found matches for 'world'."));
        assert!(lines[5].contains("Could not delete file"));
    }

    #[test]
    fn test_search_outcome_messages() {
        let dir = TempDir::new().unwrap();
        let store = store_in(&dir);
        let path = dir.path().join("notes.txt");
        fs::write(&path, "one\ntwo\n").unwrap();

        let found = store.search_outcome(&path, "two");
        assert!(found.success);
        assert_eq!(found.message, "Line 2: two\n");

        let missing = store.search_outcome(&path, "three");
        assert!(missing.success);
        assert_eq!(missing.message, "'three' not found in the file.");

        let broken = store.search_outcome(&dir.path().join("absent.txt"), "x");
        assert!(!broken.success);
    }
}
