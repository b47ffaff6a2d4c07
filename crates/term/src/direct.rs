//! Direct backend: packs the frame into a cell array and writes it in one call.
//!
//! The console descriptor is detected once per process and shared by every
//! engine. Only standard output attached to a terminal qualifies; anything
//! else fails construction so selection can fall back to a text backend.

use std::io::{self, Write};
use std::sync::OnceLock;

use tracing::debug;

use crate::core::{Grid, Pixel};
use crate::engine::{check_origin, visible_extent, RenderEngine};
use crate::error::BackendError;
use crate::types::IntVector;

/// One packed console cell: glyph plus `fg | bg << 4` attribute.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CharInfo {
    pub ch: char,
    pub attr: u16,
}

impl CharInfo {
    pub fn from_pixel(px: &Pixel) -> Self {
        Self {
            ch: px.glyph(),
            attr: px.colors().attribute(),
        }
    }
}

/// Pack the top-left `width` x `height` cells of `frame`, row-major.
pub fn pack_cells(frame: &Grid<Pixel>, width: usize, height: usize, out: &mut Vec<CharInfo>) {
    out.clear();
    for row in frame.rows().take(height) {
        out.extend(row[..width.min(row.len())].iter().map(CharInfo::from_pixel));
    }
}

/// Encode a packed rectangle placed at `origin` as console output.
///
/// Each row starts with an absolute cursor position; colors change only
/// where the attribute does. Output ends with a color reset.
pub fn encode_rect(cells: &[CharInfo], width: usize, origin: (u16, u16), out: &mut Vec<u8>) -> io::Result<()> {
    let (ox, oy) = origin;
    let mut current: Option<u16> = None;
    let mut buf = [0u8; 4];

    if width > 0 {
        for (y, row) in cells.chunks(width).enumerate() {
            write!(out, "\x1b[{};{}H", oy as usize + y + 1, ox as usize + 1)?;
            for cell in row {
                if current != Some(cell.attr) {
                    write_sgr(out, cell.attr)?;
                    current = Some(cell.attr);
                }
                out.extend_from_slice(cell.ch.encode_utf8(&mut buf).as_bytes());
            }
        }
    }
    out.extend_from_slice(b"\x1b[0m");
    Ok(())
}

fn write_sgr(out: &mut Vec<u8>, attr: u16) -> io::Result<()> {
    let fg = (attr & 0x0f) as u8;
    let bg = ((attr >> 4) & 0x0f) as u8;
    let fg_base = if fg & 8 != 0 { 90 } else { 30 };
    let bg_base = if bg & 8 != 0 { 100 } else { 40 };
    write!(out, "\x1b[{};{}m", fg_base + ansi_index(fg), bg_base + ansi_index(bg))
}

/// Console bit order (blue 1, green 2, red 4) to ANSI order (red 1, green 2, blue 4).
fn ansi_index(console: u8) -> u8 {
    ((console & 4) >> 2) | (console & 2) | ((console & 1) << 2)
}

/// Handle to the process console output.
#[derive(Debug, Clone, Copy)]
pub struct ConsoleHandle {
    fd: i32,
}

static CONSOLE: OnceLock<Option<ConsoleHandle>> = OnceLock::new();

/// The process console, detected on first use.
pub fn console_handle() -> Result<ConsoleHandle, BackendError> {
    #[cfg(unix)]
    {
        let handle = CONSOLE.get_or_init(|| {
            let handle = sys::detect();
            debug!(available = handle.is_some(), "detected console output");
            handle
        });
        (*handle).ok_or(BackendError::NotAConsole)
    }
    #[cfg(not(unix))]
    {
        let _ = &CONSOLE;
        Err(BackendError::Unsupported { backend: "direct" })
    }
}

impl ConsoleHandle {
    /// Current console size in columns and rows.
    pub fn size(&self) -> io::Result<(u16, u16)> {
        #[cfg(unix)]
        {
            sys::window_size(self.fd)
        }
        #[cfg(not(unix))]
        {
            Err(io::Error::from(io::ErrorKind::Unsupported))
        }
    }

    pub fn write_all(&self, bytes: &[u8]) -> io::Result<()> {
        #[cfg(unix)]
        {
            sys::write_all(self.fd, bytes)
        }
        #[cfg(not(unix))]
        {
            let _ = bytes;
            Err(io::Error::from(io::ErrorKind::Unsupported))
        }
    }
}

#[cfg(unix)]
mod sys {
    use std::io;

    use super::ConsoleHandle;

    pub fn detect() -> Option<ConsoleHandle> {
        let fd = libc::STDOUT_FILENO;
        if unsafe { libc::isatty(fd) } == 1 {
            Some(ConsoleHandle { fd })
        } else {
            None
        }
    }

    pub fn window_size(fd: i32) -> io::Result<(u16, u16)> {
        let mut ws: libc::winsize = unsafe { std::mem::zeroed() };
        let result = unsafe { libc::ioctl(fd, libc::TIOCGWINSZ, &mut ws) };
        if result == -1 {
            Err(io::Error::last_os_error())
        } else {
            Ok((ws.ws_col, ws.ws_row))
        }
    }

    pub fn write_all(fd: i32, mut data: &[u8]) -> io::Result<()> {
        while !data.is_empty() {
            let n = unsafe { libc::write(fd, data.as_ptr() as *const libc::c_void, data.len()) };
            if n < 0 {
                let err = io::Error::last_os_error();
                if err.kind() == io::ErrorKind::Interrupted {
                    continue;
                }
                return Err(err);
            }
            if n == 0 {
                return Err(io::Error::from(io::ErrorKind::WriteZero));
            }
            data = &data[n as usize..];
        }
        Ok(())
    }
}

pub struct DirectEngine {
    handle: ConsoleHandle,
    cells: Vec<CharInfo>,
    out: Vec<u8>,
}

impl DirectEngine {
    /// Fails when the process has no console output to write to.
    pub fn new() -> Result<Self, BackendError> {
        let handle = console_handle()?;
        Ok(Self {
            handle,
            cells: Vec::new(),
            out: Vec::with_capacity(64 * 1024),
        })
    }
}

impl RenderEngine for DirectEngine {
    fn render(&mut self, frame: &Grid<Pixel>, origin: IntVector) -> Result<(), BackendError> {
        let origin = check_origin(origin)?;
        let (w, h) = visible_extent(frame, origin, self.handle.size().ok());
        pack_cells(frame, w, h, &mut self.cells);

        self.out.clear();
        encode_rect(&self.cells, w, origin, &mut self.out)?;
        self.handle.write_all(&self.out)?;
        Ok(())
    }

    fn viewport_size(&self) -> Option<IntVector> {
        self.handle
            .size()
            .ok()
            .map(|(w, h)| IntVector::new(w as i32, h as i32))
    }
}
