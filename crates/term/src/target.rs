//! Console targets: where text-based backends send their output.
//!
//! Backends talk to a [`ConsoleTarget`] instead of stdout directly, so the
//! same encoder can drive a real terminal or an in-memory model.

use std::io::{self, Write};

use crossterm::{
    cursor,
    style::{Color as TermColor, Print, SetBackgroundColor, SetForegroundColor},
    terminal, QueueableCommand,
};

use crate::types::{Color, ColorSet, DEFAULT_TAB_WIDTH};

/// How a target can move the cursor right without overwriting cells.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JumpSupport {
    /// Horizontal tabs to the next stop, then backspaces back to the column.
    TabTrim { tab_width: u16 },
    /// `CSI n C` cursor-forward sequences.
    CursorForward,
    /// No relative jumps; callers must reposition absolutely.
    Unsupported,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Capabilities {
    /// Printing a character advances the cursor to the next column.
    pub auto_advance: bool,
    pub jump: JumpSupport,
}

impl Default for Capabilities {
    fn default() -> Self {
        Self {
            auto_advance: true,
            jump: JumpSupport::TabTrim {
                tab_width: DEFAULT_TAB_WIDTH,
            },
        }
    }
}

pub trait ConsoleTarget {
    fn capabilities(&self) -> Capabilities;

    /// Physical console size in columns and rows, if known.
    fn size(&self) -> Option<(u16, u16)>;

    fn move_to(&mut self, x: u16, y: u16) -> io::Result<()>;

    fn set_colors(&mut self, colors: ColorSet) -> io::Result<()>;

    /// Write text at the cursor. Cursor control characters (`\r`, `\n`,
    /// `\t`, backspace) and `CSI n C` are interpreted by the console.
    fn write_str(&mut self, text: &str) -> io::Result<()>;

    fn flush(&mut self) -> io::Result<()>;
}

/// Map a palette color to its crossterm equivalent.
pub fn term_color(color: Color) -> TermColor {
    match color {
        Color::Black => TermColor::Black,
        Color::DarkBlue => TermColor::DarkBlue,
        Color::DarkGreen => TermColor::DarkGreen,
        Color::DarkCyan => TermColor::DarkCyan,
        Color::DarkRed => TermColor::DarkRed,
        Color::DarkMagenta => TermColor::DarkMagenta,
        Color::DarkYellow => TermColor::DarkYellow,
        Color::Gray => TermColor::Grey,
        Color::DarkGray => TermColor::DarkGrey,
        Color::Blue => TermColor::Blue,
        Color::Green => TermColor::Green,
        Color::Cyan => TermColor::Cyan,
        Color::Red => TermColor::Red,
        Color::Magenta => TermColor::Magenta,
        Color::Yellow => TermColor::Yellow,
        Color::White => TermColor::White,
        Color::Transparent => TermColor::Reset,
    }
}

/// A real terminal driven through crossterm commands.
///
/// Commands are queued into an internal buffer and written to the underlying
/// writer in one go on [`ConsoleTarget::flush`].
pub struct CrosstermTarget<W: Write> {
    out: W,
    buf: Vec<u8>,
    caps: Capabilities,
    size: Option<(u16, u16)>,
}

impl CrosstermTarget<io::Stdout> {
    pub fn stdout() -> Self {
        Self::new(io::stdout())
    }
}

impl<W: Write> CrosstermTarget<W> {
    pub fn new(out: W) -> Self {
        Self {
            out,
            buf: Vec::with_capacity(64 * 1024),
            caps: Capabilities::default(),
            size: None,
        }
    }

    pub fn with_capabilities(mut self, caps: Capabilities) -> Self {
        self.caps = caps;
        self
    }

    /// Report a fixed size instead of querying the terminal.
    pub fn with_size(mut self, width: u16, height: u16) -> Self {
        self.size = Some((width, height));
        self
    }

    pub fn get_ref(&self) -> &W {
        &self.out
    }

    /// Bytes queued since the last flush.
    pub fn pending(&self) -> &[u8] {
        &self.buf
    }
}

impl<W: Write> ConsoleTarget for CrosstermTarget<W> {
    fn capabilities(&self) -> Capabilities {
        self.caps
    }

    fn size(&self) -> Option<(u16, u16)> {
        self.size.or_else(|| terminal::size().ok())
    }

    fn move_to(&mut self, x: u16, y: u16) -> io::Result<()> {
        self.buf.queue(cursor::MoveTo(x, y))?;
        Ok(())
    }

    fn set_colors(&mut self, colors: ColorSet) -> io::Result<()> {
        self.buf.queue(SetForegroundColor(term_color(colors.fg)))?;
        self.buf.queue(SetBackgroundColor(term_color(colors.bg)))?;
        Ok(())
    }

    fn write_str(&mut self, text: &str) -> io::Result<()> {
        self.buf.queue(Print(text))?;
        Ok(())
    }

    fn flush(&mut self) -> io::Result<()> {
        self.out.write_all(&self.buf)?;
        self.out.flush()?;
        self.buf.clear();
        Ok(())
    }
}
