//! TerminalSession: puts the terminal into drawing mode and restores it.

use std::io::{self, Write};

use anyhow::Result;
use crossterm::{
    cursor,
    style::{Attribute, ResetColor, SetAttribute},
    terminal, QueueableCommand,
};
use tracing::{debug, warn};

/// Raw mode, alternate screen, hidden cursor and no line wrap while alive.
///
/// [`TerminalSession::exit`] restores the terminal; dropping an active
/// session does the same on a best-effort basis.
pub struct TerminalSession {
    stdout: io::Stdout,
    buf: Vec<u8>,
    active: bool,
}

impl TerminalSession {
    pub fn new() -> Self {
        Self {
            stdout: io::stdout(),
            buf: Vec::with_capacity(256),
            active: false,
        }
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    pub fn enter(&mut self) -> Result<()> {
        terminal::enable_raw_mode()?;
        self.buf.clear();
        self.buf.queue(terminal::EnterAlternateScreen)?;
        self.buf.queue(cursor::Hide)?;
        self.buf.queue(terminal::DisableLineWrap)?;
        self.buf.queue(terminal::Clear(terminal::ClearType::All))?;
        self.flush_buf()?;
        self.active = true;
        debug!("entered terminal session");
        Ok(())
    }

    pub fn exit(&mut self) -> Result<()> {
        if !self.active {
            return Ok(());
        }
        self.buf.clear();
        self.buf.queue(ResetColor)?;
        self.buf.queue(SetAttribute(Attribute::Reset))?;
        self.buf.queue(terminal::EnableLineWrap)?;
        self.buf.queue(cursor::Show)?;
        self.buf.queue(terminal::LeaveAlternateScreen)?;
        self.flush_buf()?;
        terminal::disable_raw_mode()?;
        self.active = false;
        debug!("left terminal session");
        Ok(())
    }

    /// Ask the terminal to resize its window. Many terminals ignore this;
    /// failures are logged, never returned.
    pub fn try_resize(&mut self, columns: u16, rows: u16) {
        self.buf.clear();
        let result = self
            .buf
            .queue(terminal::SetSize(columns, rows))
            .map(|_| ())
            .and_then(|_| self.flush_buf());
        if let Err(e) = result {
            warn!(columns, rows, error = %e, "terminal resize failed");
        }
    }

    /// Current terminal size in columns and rows.
    pub fn size(&self) -> Option<(u16, u16)> {
        terminal::size().ok()
    }

    fn flush_buf(&mut self) -> io::Result<()> {
        self.stdout.write_all(&self.buf)?;
        self.stdout.flush()?;
        Ok(())
    }
}

impl Default for TerminalSession {
    fn default() -> Self {
        Self::new()
    }
}

impl Drop for TerminalSession {
    fn drop(&mut self) {
        if let Err(e) = self.exit() {
            warn!(error = %e, "failed to restore terminal");
        }
    }
}
