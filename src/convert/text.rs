//! Single-pass text transforms
//!
//! Each function streams from a `BufRead` into a `Write` and works on raw
//! bytes, so input that is not valid UTF-8 passes through untouched.

use crate::config::JsonEncoding;
use std::io::{self, BufRead, Write};

pub const HTML_PROLOGUE: &str = "<html><body><pre>\n";
pub const HTML_EPILOGUE: &str = "</pre></body></html>\n";

/// Copy line by line with every byte `from` replaced by `to`
fn replace_byte<R: BufRead, W: Write>(mut input: R, mut output: W, from: u8, to: u8) -> io::Result<()> {
    let mut line = Vec::new();
    while input.read_until(b'\n', &mut line)? > 0 {
        for byte in line.iter_mut().filter(|b| **b == from) {
            *byte = to;
        }
        output.write_all(&line)?;
        line.clear();
    }
    output.flush()
}

/// Spaces become commas
pub fn txt_to_csv<R: BufRead, W: Write>(input: R, output: W) -> io::Result<()> {
    replace_byte(input, output, b' ', b',')
}

/// Commas become spaces
pub fn csv_to_txt<R: BufRead, W: Write>(input: R, output: W) -> io::Result<()> {
    replace_byte(input, output, b',', b' ')
}

/// Wrap the text in a fixed `<pre>` page
pub fn txt_to_html<R: BufRead, W: Write>(mut input: R, mut output: W) -> io::Result<()> {
    output.write_all(HTML_PROLOGUE.as_bytes())?;
    io::copy(&mut input, &mut output)?;
    output.write_all(HTML_EPILOGUE.as_bytes())?;
    output.flush()
}

/// Drops everything from `<` through the next `>`.
///
/// A `>` outside a tag is dropped as well. There is no notion of quoting,
/// comments or entities.
#[derive(Debug, Default)]
pub struct TagStripper {
    inside_tag: bool,
}

impl TagStripper {
    pub fn new() -> Self {
        Self::default()
    }

    /// Feed one byte, returning it when it belongs to the text
    pub fn feed(&mut self, byte: u8) -> Option<u8> {
        match byte {
            b'<' => {
                self.inside_tag = true;
                None
            }
            b'>' => {
                self.inside_tag = false;
                None
            }
            _ if self.inside_tag => None,
            _ => Some(byte),
        }
    }
}

pub fn html_to_txt<R: BufRead, W: Write>(mut input: R, mut output: W) -> io::Result<()> {
    let mut stripper = TagStripper::new();
    let mut kept = Vec::new();

    loop {
        let chunk = input.fill_buf()?;
        if chunk.is_empty() {
            break;
        }
        kept.clear();
        kept.extend(chunk.iter().filter_map(|&b| stripper.feed(b)));
        let consumed = chunk.len();
        input.consume(consumed);
        output.write_all(&kept)?;
    }
    output.flush()
}

/// JSON is treated as opaque text
pub fn json_to_txt<R: BufRead, W: Write>(mut input: R, mut output: W) -> io::Result<()> {
    io::copy(&mut input, &mut output)?;
    output.flush()
}

/// Emit the lines of the input as a JSON array of strings
pub fn txt_to_json<R: BufRead, W: Write>(
    mut input: R,
    mut output: W,
    encoding: JsonEncoding,
) -> io::Result<()> {
    output.write_all(b"[\n")?;

    let mut line = Vec::new();
    let mut first = true;
    while input.read_until(b'\n', &mut line)? > 0 {
        if line.last() == Some(&b'\n') {
            line.pop();
        }
        if !first {
            output.write_all(b",\n")?;
        }
        output.write_all(b"  ")?;
        match encoding {
            JsonEncoding::Raw => {
                output.write_all(b"\"")?;
                output.write_all(&line)?;
                output.write_all(b"\"")?;
            }
            JsonEncoding::Escaped => {
                let text = String::from_utf8_lossy(&line);
                serde_json::to_writer(&mut output, &*text).map_err(io::Error::from)?;
            }
        }
        first = false;
        line.clear();
    }

    output.write_all(b"\n]\n")?;
    output.flush()
}
