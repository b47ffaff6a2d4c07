//! Debug backend: the baseline encoder with visible blanks.
//!
//! Blank cells print a letter naming their background color, so layout and
//! transparency problems show up on screen.

use crate::baseline::encode_runs;
use crate::core::{Grid, Pixel, NUL};
use crate::engine::{check_origin, RenderEngine};
use crate::error::BackendError;
use crate::target::ConsoleTarget;
use crate::types::{Color, IntVector};

pub struct DebugEngine<T: ConsoleTarget> {
    target: T,
}

impl<T: ConsoleTarget> DebugEngine<T> {
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

impl<T: ConsoleTarget> RenderEngine for DebugEngine<T> {
    fn render(&mut self, frame: &Grid<Pixel>, origin: IntVector) -> Result<(), BackendError> {
        let origin = check_origin(origin)?;
        encode_runs(&mut self.target, frame, origin, debug_glyph)?;
        Ok(())
    }

    fn viewport_size(&self) -> Option<IntVector> {
        self.target
            .size()
            .map(|(w, h)| IntVector::new(w as i32, h as i32))
    }
}

/// Glyph printed by the debug backend.
///
/// Dark backgrounds use lowercase letters, bright ones uppercase; black is
/// `.`, dark gray `:` and an unresolved transparent background `?`.
pub fn debug_glyph(px: &Pixel) -> char {
    if px.ch() != NUL && px.ch() != ' ' {
        return px.ch();
    }
    match px.bg() {
        Color::Black => '.',
        Color::DarkBlue => 'b',
        Color::DarkGreen => 'g',
        Color::DarkCyan => 'c',
        Color::DarkRed => 'r',
        Color::DarkMagenta => 'm',
        Color::DarkYellow => 'y',
        Color::Gray => 'w',
        Color::DarkGray => ':',
        Color::Blue => 'B',
        Color::Green => 'G',
        Color::Cyan => 'C',
        Color::Red => 'R',
        Color::Magenta => 'M',
        Color::Yellow => 'Y',
        Color::White => 'W',
        Color::Transparent => '?',
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::MemoryConsole;
    use crate::types::ColorSet;

    #[test]
    fn blanks_show_background() {
        let mut frame = Grid::filled(4, 1, Pixel::blank(Color::DarkRed));
        frame.set(1, 0, Pixel::tint(Color::Cyan)).unwrap();
        frame.set(2, 0, Pixel::TRANSPARENT).unwrap();
        frame.put_str(3, 0, "k", ColorSet::new(Color::White, Color::Black)).unwrap();

        let mut e = DebugEngine::new(MemoryConsole::new(4, 1));
        e.render(&frame, IntVector::ZERO).unwrap();
        assert_eq!(e.target().screen().row_text(0), "rC?k");
    }

    #[test]
    fn every_color_has_a_distinct_glyph() {
        let mut glyphs: Vec<char> = Color::ALL
            .iter()
            .map(|c| debug_glyph(&Pixel::blank(*c)))
            .collect();
        glyphs.sort_unstable();
        glyphs.dedup();
        assert_eq!(glyphs.len(), Color::ALL.len());
    }
}
