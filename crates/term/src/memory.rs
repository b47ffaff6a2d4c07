//! MemoryConsole: an in-memory console model.
//!
//! It interprets the small subset of console behavior the backends rely on
//! (cursor moves, colors, tabs, backspace, line feeds, `CSI` cursor-forward,
//! cursor-position and SGR color sequences) and records the resulting cells.
//! Line wrapping is off: printing at the last column leaves the cursor there.

use std::io;

use crate::core::{Grid, Pixel};
use crate::target::{Capabilities, ConsoleTarget, JumpSupport};
use crate::types::{Color, ColorSet, DEFAULT_TAB_WIDTH};

#[derive(Debug, Clone, PartialEq, Eq)]
enum ParseState {
    Ground,
    Escape,
    Csi(String),
}

#[derive(Debug, Clone)]
pub struct MemoryConsole {
    screen: Grid<Pixel>,
    x: usize,
    y: usize,
    colors: ColorSet,
    caps: Capabilities,
    state: ParseState,
    color_switches: usize,
    bytes_written: usize,
    flushes: usize,
}

impl MemoryConsole {
    /// A console with every cell still transparent (never written).
    pub fn new(width: u16, height: u16) -> Self {
        Self {
            screen: Grid::new(width as usize, height as usize),
            x: 0,
            y: 0,
            colors: ColorSet::FALLBACK,
            caps: Capabilities::default(),
            state: ParseState::Ground,
            color_switches: 0,
            bytes_written: 0,
            flushes: 0,
        }
    }

    pub fn with_capabilities(mut self, caps: Capabilities) -> Self {
        self.caps = caps;
        self
    }

    pub fn screen(&self) -> &Grid<Pixel> {
        &self.screen
    }

    pub fn cursor(&self) -> (usize, usize) {
        (self.x, self.y)
    }

    /// Number of color changes requested so far.
    pub fn color_switches(&self) -> usize {
        self.color_switches
    }

    /// Total bytes of text written, escape sequences included.
    pub fn bytes_written(&self) -> usize {
        self.bytes_written
    }

    pub fn flushes(&self) -> usize {
        self.flushes
    }

    pub fn reset_counters(&mut self) {
        self.color_switches = 0;
        self.bytes_written = 0;
        self.flushes = 0;
    }

    /// Feed raw bytes, as a backend writing straight to a descriptor would.
    pub fn write_bytes(&mut self, bytes: &[u8]) -> io::Result<()> {
        let text = std::str::from_utf8(bytes)
            .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))?;
        self.write_str(text)
    }

    fn last_col(&self) -> usize {
        self.screen.width().saturating_sub(1)
    }

    fn tab_width(&self) -> usize {
        match self.caps.jump {
            JumpSupport::TabTrim { tab_width } => tab_width.max(1) as usize,
            _ => DEFAULT_TAB_WIDTH as usize,
        }
    }

    fn print(&mut self, ch: char) {
        if let Ok(px) = Pixel::new(ch, self.colors.fg, self.colors.bg) {
            let _ = self.screen.set(self.x as i32, self.y as i32, px);
        }
        self.x = (self.x + 1).min(self.last_col());
    }

    fn ground(&mut self, ch: char) {
        match ch {
            '\x1b' => self.state = ParseState::Escape,
            '\r' => self.x = 0,
            '\n' => self.y = (self.y + 1).min(self.screen.height().saturating_sub(1)),
            '\t' => {
                let tw = self.tab_width();
                self.x = ((self.x / tw + 1) * tw).min(self.last_col());
            }
            '\x08' => self.x = self.x.saturating_sub(1),
            c if c.is_control() => {}
            c => self.print(c),
        }
    }

    fn csi(&mut self, params: &str, action: char) {
        let mut nums = params
            .split(';')
            .map(|p| p.parse::<usize>().ok());
        match action {
            'C' => {
                let n = nums.next().flatten().unwrap_or(1).max(1);
                self.x = (self.x + n).min(self.last_col());
            }
            'H' => {
                let row = nums.next().flatten().unwrap_or(1).max(1);
                let col = nums.next().flatten().unwrap_or(1).max(1);
                self.y = (row - 1).min(self.screen.height().saturating_sub(1));
                self.x = (col - 1).min(self.last_col());
            }
            'm' => {
                self.color_switches += 1;
                let codes: Vec<usize> = params
                    .split(';')
                    .map(|p| p.parse::<usize>().unwrap_or(0))
                    .collect();
                for code in codes {
                    self.sgr(code);
                }
            }
            _ => {}
        }
    }

    fn sgr(&mut self, code: usize) {
        match code {
            0 => self.colors = ColorSet::FALLBACK,
            30..=37 => self.colors.fg = ansi_color(code - 30, false),
            90..=97 => self.colors.fg = ansi_color(code - 90, true),
            39 => self.colors.fg = ColorSet::FALLBACK.fg,
            40..=47 => self.colors.bg = ansi_color(code - 40, false),
            100..=107 => self.colors.bg = ansi_color(code - 100, true),
            49 => self.colors.bg = ColorSet::FALLBACK.bg,
            _ => {}
        }
    }
}

/// ANSI color number (bit 0 red, bit 1 green, bit 2 blue) to the palette.
fn ansi_color(n: usize, bright: bool) -> Color {
    let n = n as u8;
    let index = ((n & 1) << 2) | (n & 2) | ((n & 4) >> 2) | if bright { 8 } else { 0 };
    Color::from_console_index(index)
}

impl ConsoleTarget for MemoryConsole {
    fn capabilities(&self) -> Capabilities {
        self.caps
    }

    fn size(&self) -> Option<(u16, u16)> {
        Some((self.screen.width() as u16, self.screen.height() as u16))
    }

    fn move_to(&mut self, x: u16, y: u16) -> io::Result<()> {
        self.x = (x as usize).min(self.last_col());
        self.y = (y as usize).min(self.screen.height().saturating_sub(1));
        Ok(())
    }

    fn set_colors(&mut self, colors: ColorSet) -> io::Result<()> {
        self.colors = colors;
        self.color_switches += 1;
        Ok(())
    }

    fn write_str(&mut self, text: &str) -> io::Result<()> {
        self.bytes_written += text.len();
        for ch in text.chars() {
            match std::mem::replace(&mut self.state, ParseState::Ground) {
                ParseState::Ground => self.ground(ch),
                ParseState::Escape => {
                    if ch == '[' {
                        self.state = ParseState::Csi(String::new());
                    }
                }
                ParseState::Csi(mut params) => {
                    if ch.is_ascii_digit() || ch == ';' {
                        params.push(ch);
                        self.state = ParseState::Csi(params);
                    } else if ('@'..='~').contains(&ch) {
                        self.csi(&params, ch);
                    }
                }
            }
        }
        Ok(())
    }

    fn flush(&mut self) -> io::Result<()> {
        self.flushes += 1;
        Ok(())
    }
}
