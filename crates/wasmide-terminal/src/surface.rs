use crate::error::{Result, TerminalError};
use crossterm::{queue, style::Print};
use parking_lot::Mutex;
use std::borrow::Cow;
use std::collections::VecDeque;
use std::io::Write;
use std::sync::Arc;
use tracing::debug;

/// Dimensions of the container a viewport is fitted to, in cells.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ViewportSize {
    pub cols: u16,
    pub rows: u16,
}

impl ViewportSize {
    pub fn new(cols: u16, rows: u16) -> Self {
        Self {
            cols: cols.max(1),
            rows: rows.max(1),
        }
    }
}

impl Default for ViewportSize {
    fn default() -> Self {
        Self::new(80, 24)
    }
}

/// Something a viewport renders into.
pub trait Surface: Send {
    /// Append raw text. Control characters `\r`, `\n` and `\x08` move the
    /// cursor; everything else is printed at it.
    fn write(&mut self, text: &str) -> Result<()>;
    /// Lay the surface out for `size`.
    fn fit(&mut self, size: ViewportSize) -> Result<()>;
    fn scroll_to_bottom(&mut self) -> Result<()>;
    /// Give the surface up. Called once, when the viewport is disposed.
    fn release(&mut self) -> Result<()> {
        Ok(())
    }
}

/// Line-oriented transcript with bounded scrollback.
///
/// Lines are kept as chars so the cursor can overwrite in place; this is what
/// the erase sequence `\x08 \x08` relies on.
#[derive(Debug)]
pub struct Transcript {
    lines: VecDeque<Vec<char>>,
    cursor: usize,
    scrollback: usize,
    size: ViewportSize,
    scroll_offset: usize,
    released: bool,
}

impl Transcript {
    pub fn new(scrollback: usize) -> Self {
        let mut lines = VecDeque::new();
        lines.push_back(Vec::new());
        Self {
            lines,
            cursor: 0,
            scrollback,
            size: ViewportSize::default(),
            scroll_offset: 0,
            released: false,
        }
    }

    fn print(&mut self, text: &str) {
        for c in text.chars() {
            match c {
                '\n' => {
                    self.lines.push_back(Vec::new());
                    self.cursor = 0;
                }
                '\r' => self.cursor = 0,
                '\x08' => self.cursor = self.cursor.saturating_sub(1),
                c => {
                    let cursor = self.cursor;
                    let line = self.current_line_mut();
                    if cursor < line.len() {
                        line[cursor] = c;
                    } else {
                        line.push(c);
                    }
                    self.cursor += 1;
                }
            }
        }
        self.trim_scrollback();
    }

    fn current_line_mut(&mut self) -> &mut Vec<char> {
        if self.lines.is_empty() {
            self.lines.push_back(Vec::new());
        }
        let last = self.lines.len() - 1;
        &mut self.lines[last]
    }

    fn trim_scrollback(&mut self) {
        let limit = self.scrollback + self.size.rows as usize;
        while self.lines.len() > limit {
            self.lines.pop_front();
        }
    }

    /// Every retained line, oldest first, with trailing blanks removed.
    pub fn lines(&self) -> Vec<String> {
        self.lines
            .iter()
            .map(|line| line.iter().collect::<String>().trim_end().to_string())
            .collect()
    }

    /// Retained lines joined with `\n`.
    pub fn contents(&self) -> String {
        self.lines().join("\n")
    }

    /// The line the cursor is on, exactly as printed.
    pub fn current_line(&self) -> String {
        self.lines.back().map(|l| l.iter().collect()).unwrap_or_default()
    }

    /// Lines currently inside the fitted window, honouring the scroll offset.
    pub fn visible_lines(&self) -> Vec<String> {
        let lines = self.lines();
        let rows = self.size.rows as usize;
        let end = lines.len().saturating_sub(self.scroll_offset);
        let start = end.saturating_sub(rows);
        lines[start..end].to_vec()
    }

    pub fn size(&self) -> ViewportSize {
        self.size
    }

    pub fn scroll_offset(&self) -> usize {
        self.scroll_offset
    }

    /// Scroll towards older lines, stopping at the top of the scrollback.
    pub fn scroll_up(&mut self, lines: usize) {
        let max = self.lines.len().saturating_sub(self.size.rows as usize);
        self.scroll_offset = (self.scroll_offset + lines).min(max);
    }

    pub fn is_released(&self) -> bool {
        self.released
    }
}

/// In-memory surface. Clones of [`handle`](Self::handle) observe the same
/// transcript, which outlives the surface itself.
#[derive(Debug, Clone)]
pub struct TranscriptSurface {
    transcript: Arc<Mutex<Transcript>>,
}

impl TranscriptSurface {
    pub fn new(scrollback: usize) -> Self {
        Self {
            transcript: Arc::new(Mutex::new(Transcript::new(scrollback))),
        }
    }

    pub fn handle(&self) -> Arc<Mutex<Transcript>> {
        self.transcript.clone()
    }
}

impl Surface for TranscriptSurface {
    fn write(&mut self, text: &str) -> Result<()> {
        let mut transcript = self.transcript.lock();
        if transcript.released {
            return Err(TerminalError::Render("transcript released".to_string()));
        }
        transcript.print(text);
        Ok(())
    }

    fn fit(&mut self, size: ViewportSize) -> Result<()> {
        let mut transcript = self.transcript.lock();
        transcript.size = size;
        transcript.trim_scrollback();
        Ok(())
    }

    fn scroll_to_bottom(&mut self) -> Result<()> {
        self.transcript.lock().scroll_offset = 0;
        Ok(())
    }

    fn release(&mut self) -> Result<()> {
        self.transcript.lock().released = true;
        Ok(())
    }
}

/// Surface backed by the process's terminal (or any writer), for use with
/// the terminal in raw mode.
pub struct StdoutSurface<W: Write + Send = std::io::Stdout> {
    out: W,
    convert_eol: bool,
    size: ViewportSize,
}

impl StdoutSurface {
    pub fn stdout(convert_eol: bool) -> Self {
        Self::new(std::io::stdout(), convert_eol)
    }
}

impl<W: Write + Send> StdoutSurface<W> {
    pub fn new(out: W, convert_eol: bool) -> Self {
        Self {
            out,
            convert_eol,
            size: ViewportSize::default(),
        }
    }

    pub fn size(&self) -> ViewportSize {
        self.size
    }

    pub fn into_inner(self) -> W {
        self.out
    }
}

impl<W: Write + Send> Surface for StdoutSurface<W> {
    fn write(&mut self, text: &str) -> Result<()> {
        let text = if self.convert_eol {
            convert_eol(text)
        } else {
            Cow::Borrowed(text)
        };
        queue!(self.out, Print(text))?;
        self.out.flush()?;
        Ok(())
    }

    fn fit(&mut self, size: ViewportSize) -> Result<()> {
        debug!("Viewport fitted to {}x{}", size.cols, size.rows);
        self.size = size;
        Ok(())
    }

    fn scroll_to_bottom(&mut self) -> Result<()> {
        // The host terminal keeps its cursor row in view.
        Ok(())
    }

    fn release(&mut self) -> Result<()> {
        self.out.flush()?;
        Ok(())
    }
}

/// Turn bare `\n` into `\r\n`; raw mode does not return the carriage itself.
fn convert_eol(text: &str) -> Cow<'_, str> {
    if !text.contains('\n') {
        return Cow::Borrowed(text);
    }
    let mut out = String::with_capacity(text.len() + 8);
    let mut prev = '\0';
    for c in text.chars() {
        if c == '\n' && prev != '\r' {
            out.push('\r');
        }
        out.push(c);
        prev = c;
    }
    Cow::Owned(out)
}
