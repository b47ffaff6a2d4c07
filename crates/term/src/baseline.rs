//! Baseline backend: one color switch and one text write per run.
//!
//! Walks the frame row-major and groups contiguous cells of identical
//! (resolved) colors. The cursor is placed at the start of every row; targets
//! that do not auto-advance also get a reposition before every cell.

use std::io;

use crate::core::{Grid, Pixel};
use crate::engine::{check_origin, visible_extent, RenderEngine};
use crate::error::BackendError;
use crate::target::ConsoleTarget;
use crate::types::{ColorSet, IntVector};

pub struct BaselineEngine<T: ConsoleTarget> {
    target: T,
}

impl<T: ConsoleTarget> BaselineEngine<T> {
    pub fn new(target: T) -> Self {
        Self { target }
    }

    pub fn target(&self) -> &T {
        &self.target
    }

    pub fn target_mut(&mut self) -> &mut T {
        &mut self.target
    }

    pub fn into_target(self) -> T {
        self.target
    }
}

impl<T: ConsoleTarget> RenderEngine for BaselineEngine<T> {
    fn render(&mut self, frame: &Grid<Pixel>, origin: IntVector) -> Result<(), BackendError> {
        let origin = check_origin(origin)?;
        encode_runs(&mut self.target, frame, origin, Pixel::glyph)?;
        Ok(())
    }

    fn viewport_size(&self) -> Option<IntVector> {
        self.target
            .size()
            .map(|(w, h)| IntVector::new(w as i32, h as i32))
    }
}

/// Write `frame` run by run, printing each cell with `glyph`.
///
/// Shared by the baseline and debug backends; they differ only in the glyph.
pub(crate) fn encode_runs<T: ConsoleTarget + ?Sized>(
    target: &mut T,
    frame: &Grid<Pixel>,
    origin: (u16, u16),
    glyph: fn(&Pixel) -> char,
) -> io::Result<()> {
    let (ox, oy) = origin;
    let auto_advance = target.capabilities().auto_advance;
    let (w, h) = visible_extent(frame, origin, target.size());

    let mut current: Option<ColorSet> = None;
    let mut text = String::with_capacity(w);

    for (y, row) in frame.rows().take(h).enumerate() {
        let row = &row[..w];
        let sy = oy + y as u16;
        target.move_to(ox, sy)?;

        let mut x = 0;
        while x < w {
            let colors = row[x].colors().resolve();
            if current != Some(colors) {
                target.set_colors(colors)?;
                current = Some(colors);
            }

            if auto_advance {
                text.clear();
                while x < w && row[x].colors().resolve() == colors {
                    text.push(glyph(&row[x]));
                    x += 1;
                }
                target.write_str(&text)?;
            } else {
                while x < w && row[x].colors().resolve() == colors {
                    let mut buf = [0u8; 4];
                    target.move_to(ox + x as u16, sy)?;
                    target.write_str(glyph(&row[x]).encode_utf8(&mut buf))?;
                    x += 1;
                }
            }
        }
    }

    target.flush()
}
