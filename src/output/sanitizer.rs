//! Terminal escape sequence removal.
//!
//! PowerShell 7 and many CLI tools colour their diagnostics even when
//! writing to a pipe. The sanitizer runs the text through a VTE parser and
//! keeps only printable characters and layout whitespace.

use vte::{Parser, Perform};

/// Output sanitizer using VTE parser.
pub struct OutputSanitizer;

impl OutputSanitizer {
    /// Strip escape sequences from raw bytes.
    ///
    /// CSI, OSC, DCS and plain ESC sequences are dropped, as are control
    /// characters other than newline, carriage return and tab.
    pub fn strip_ansi(input: &[u8]) -> String {
        let mut text = TextCollector::default();
        let mut parser = Parser::new();
        parser.advance(&mut text, input);
        text.0
    }

    /// Strip escape sequences from a string.
    pub fn strip_ansi_str(input: &str) -> String {
        if !input.contains(|c: char| c.is_ascii_control() && c != '\t') {
            return input.to_string();
        }
        Self::strip_ansi(input.as_bytes())
    }
}

/// Accumulates printable text; every dispatch hook keeps its no-op default.
#[derive(Default)]
struct TextCollector(String);

impl Perform for TextCollector {
    fn print(&mut self, c: char) {
        self.0.push(c);
    }

    fn execute(&mut self, byte: u8) {
        if matches!(byte, b'\n' | b'\r' | b'\t') {
            self.0.push(byte as char);
        }
    }
}
