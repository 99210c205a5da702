//! Numbered terminal menu
//!
//! Works over any `BufRead`/`Write` pair so sessions can be scripted in tests.
//! Blank answers are refused here, before a request is built.

use crate::app::{AppState, Command};
use crate::convert::ConversionKind;
use std::io::{self, BufRead, Write};
use std::path::PathBuf;
use tracing::info;

/// A line starting with this character ends multi-line content entry
const CONTENT_TERMINATOR: char = '#';

pub struct Session<'a, R, W> {
    app: &'a AppState,
    input: R,
    output: W,
}

impl<'a, R: BufRead, W: Write> Session<'a, R, W> {
    pub fn new(app: &'a AppState, input: R, output: W) -> Self {
        Self { app, input, output }
    }

    /// Run until the user picks Exit or input ends
    pub fn run(&mut self) -> io::Result<()> {
        loop {
            self.show_menu()?;
            let choice = match self.read_line()? {
                Some(choice) => choice,
                None => break,
            };

            match choice.trim() {
                "1" => self.convert()?,
                "2" => self.dispatch(Command::ViewLogs)?,
                "3" => {
                    writeln!(self.output, "Exiting...")?;
                    break;
                }
                "4" => {
                    if let Some(path) = self.ask_path("Enter filename to create: ")? {
                        self.dispatch(Command::Create { path, content: String::new() })?;
                    }
                }
                "5" => {
                    if let Some(path) = self.ask_path("Enter filename to delete: ")? {
                        self.dispatch(Command::Delete { path })?;
                    }
                }
                "6" => {
                    if let Some(path) = self.ask_path("Enter filename to read: ")? {
                        self.dispatch(Command::Read { path })?;
                    }
                }
                "7" => {
                    if let Some(path) = self.ask_path("Enter filename to write to: ")? {
                        writeln!(self.output, "Enter content (end with '{}'): ", CONTENT_TERMINATOR)?;
                        let content = self.read_content()?;
                        self.dispatch(Command::Write { path, content })?;
                    }
                }
                "8" => {
                    if let Some(path) = self.ask_path("Enter filename to modify: ")? {
                        writeln!(
                            self.output,
                            "Enter content to append (end with '{}'): ",
                            CONTENT_TERMINATOR
                        )?;
                        let content = self.read_content()?;
                        self.dispatch(Command::Append { path, content })?;
                    }
                }
                "9" => {
                    if let Some(path) = self.ask_path("Enter filename to search in: ")? {
                        match self.ask("Enter word to search: ")? {
                            Some(term) => self.dispatch(Command::Search { path, term })?,
                            None => writeln!(self.output, "Please enter both filename and search term")?,
                        }
                    }
                }
                _ => writeln!(self.output, "Invalid option. Try again.")?,
            }
        }

        info!("Interactive session ended");
        Ok(())
    }

    fn show_menu(&mut self) -> io::Result<()> {
        write!(
            self.output,
            "\n==== File Format Conversion System ====\n\
             1. Convert File Format\n\
             2. View Logs\n\
             3. Exit\n\
             4. Create File\n\
             5. Delete File\n\
             6. Read File\n\
             7. Write to File\n\
             8. Modify (Append to) File\n\
             9. Search in File\n\
             Enter your choice: "
        )?;
        self.output.flush()
    }

    fn convert(&mut self) -> io::Result<()> {
        writeln!(self.output, "\n-- File Conversion Options --")?;
        for kind in ConversionKind::ALL {
            let note = match kind {
                ConversionKind::PdfToTxt => format!(" (requires `{}`)", self.app.config().pdf.extractor.program),
                _ => String::new(),
            };
            writeln!(self.output, "{}. {}{}", kind.menu_code(), kind, note)?;
        }

        let kind = match self.ask("Enter your choice: ")? {
            Some(answer) => match answer.parse::<u8>().ok().and_then(ConversionKind::from_menu_code) {
                Some(kind) => kind,
                None => return writeln!(self.output, "Invalid conversion choice."),
            },
            None => return writeln!(self.output, "Invalid conversion choice."),
        };

        let input = self.ask("Enter input file: ")?;
        let output = self.ask("Enter output file: ")?;
        match (input, output) {
            (Some(input), Some(output)) => self.dispatch(Command::Convert {
                kind,
                input: PathBuf::from(input),
                output: PathBuf::from(output),
            }),
            _ => writeln!(self.output, "Please select both input and output files"),
        }
    }

    fn dispatch(&mut self, command: Command) -> io::Result<()> {
        let outcome = self.app.dispatch(command);
        write!(self.output, "{}", outcome.message)?;
        if !outcome.message.ends_with('\n') {
            writeln!(self.output)?;
        }
        Ok(())
    }

    fn ask_path(&mut self, prompt: &str) -> io::Result<Option<PathBuf>> {
        match self.ask(prompt)? {
            Some(answer) => Ok(Some(PathBuf::from(answer))),
            None => {
                writeln!(self.output, "Please enter a filename")?;
                Ok(None)
            }
        }
    }

    /// Prompt and return the answer without its line ending; blank answers are `None`
    fn ask(&mut self, prompt: &str) -> io::Result<Option<String>> {
        write!(self.output, "{}", prompt)?;
        self.output.flush()?;

        Ok(self
            .read_line()?
            .map(|line| line.trim_end_matches(['\n', '\r']).to_string())
            .filter(|answer| !answer.trim().is_empty()))
    }

    fn read_content(&mut self) -> io::Result<String> {
        let mut content = String::new();
        while let Some(line) = self.read_line()? {
            if line.starts_with(CONTENT_TERMINATOR) {
                break;
            }
            content.push_str(&line);
        }
        Ok(content)
    }

    fn read_line(&mut self) -> io::Result<Option<String>> {
        let mut line = String::new();
        if self.input.read_line(&mut line)? == 0 {
            return Ok(None);
        }
        Ok(Some(line))
    }
}
