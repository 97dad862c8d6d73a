//! Terminal emulation for parser input.
//!
//! Interactive CLIs position their output with cursor movement, redraw
//! regions in place, and clear lines they are about to overwrite. Naively
//! deleting escape sequences from such output interleaves every
//! intermediate frame into one unreadable string. The renderer instead
//! feeds the raw bytes through a terminal emulator and reads back the
//! final character grid -- the text a human would see on screen -- so
//! parsers receive layout-stable input whether the CLI emitted plain
//! progress bars or styled, cursor-addressed ones.

use tracing::trace;

/// Default grid width, matching the PTY runner's default.
const DEFAULT_COLS: u16 = 120;

/// Default grid height. Taller than any real PTY so line-fed output that
/// would scroll off a 40-row terminal stays on the grid.
const DEFAULT_ROWS: u16 = 500;

/// Flattens raw terminal output into the visually rendered text.
#[derive(Debug, Clone)]
pub struct TerminalRenderer {
    rows: u16,
    cols: u16,
}

impl Default for TerminalRenderer {
    fn default() -> Self {
        Self::new(DEFAULT_ROWS, DEFAULT_COLS)
    }
}

impl TerminalRenderer {
    /// Creates a renderer with an explicit grid size.
    ///
    /// `cols` must match the width the producing PTY advertised, otherwise
    /// wrapped lines land differently than the CLI laid them out.
    pub fn new(rows: u16, cols: u16) -> Self {
        Self { rows, cols }
    }

    /// Creates a renderer for output captured from a PTY of the given
    /// width, with the default tall grid.
    pub fn for_cols(cols: u16) -> Self {
        Self::new(DEFAULT_ROWS, cols)
    }

    /// Renders raw bytes into flat text.
    ///
    /// Color and style sequences are dropped; cursor movement repositions
    /// subsequently written text; line and screen clears erase it. Trailing
    /// whitespace per row and trailing blank rows are trimmed.
    pub fn render(&self, raw: &[u8]) -> String {
        let mut parser = vt100::Parser::new(self.rows, self.cols, 0);
        parser.process(&normalize_newlines(raw));
        let contents = parser.screen().contents();
        trace!(raw_len = raw.len(), rendered_len = contents.len(), "Rendered terminal output");

        // vt100 already trims per-row trailing whitespace; drop trailing
        // blank rows and any stray carriage returns.
        let trimmed = contents.trim_end_matches(['\n', ' ']);
        trimmed.replace('\r', "")
    }

    /// Convenience wrapper for textual input.
    pub fn render_str(&self, raw: &str) -> String {
        self.render(raw.as_bytes())
    }
}

/// Expands bare `\n` to `\r\n`.
///
/// PTY output arrives with ONLCR applied, but text captured from pipes or
/// fixtures uses lone line feeds; a terminal would treat those as "cursor
/// down, same column" and stagger every line rightward.
fn normalize_newlines(raw: &[u8]) -> Vec<u8> {
    let mut out = Vec::with_capacity(raw.len() + raw.len() / 16);
    let mut prev = 0u8;
    for &byte in raw {
        if byte == b'\n' && prev != b'\r' {
            out.push(b'\r');
        }
        out.push(byte);
        prev = byte;
    }
    out
}
