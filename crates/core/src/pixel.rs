//! Pixel: a single character cell and its compositing rule.

use crate::error::PixelError;
use crate::types::{Color, ColorSet};

/// Glyph meaning "no character here, show what is below".
pub const NUL: char = '\0';

/// A single console cell: glyph plus foreground/background colors.
///
/// Pixels are plain values. The glyph is never a control character other than
/// [`NUL`], which [`Pixel::new`] enforces.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Pixel {
    ch: char,
    fg: Color,
    bg: Color,
}

impl Default for Pixel {
    fn default() -> Self {
        Pixel::TRANSPARENT
    }
}

impl Pixel {
    /// Fully see-through pixel: no glyph, both colors transparent.
    pub const TRANSPARENT: Pixel = Pixel {
        ch: NUL,
        fg: Color::Transparent,
        bg: Color::Transparent,
    };

    pub fn new(ch: char, fg: Color, bg: Color) -> Result<Self, PixelError> {
        if ch != NUL && ch.is_control() {
            return Err(PixelError::ControlCharacter(ch as u32));
        }
        Ok(Self { ch, fg, bg })
    }

    /// A space with the given background.
    pub const fn blank(bg: Color) -> Self {
        Self {
            ch: ' ',
            fg: Color::Transparent,
            bg,
        }
    }

    /// A pixel that only tints: glyph and foreground pass through.
    pub const fn tint(bg: Color) -> Self {
        Self {
            ch: NUL,
            fg: Color::Transparent,
            bg,
        }
    }

    pub const fn ch(&self) -> char {
        self.ch
    }

    pub const fn fg(&self) -> Color {
        self.fg
    }

    pub const fn bg(&self) -> Color {
        self.bg
    }

    pub const fn colors(&self) -> ColorSet {
        ColorSet::new(self.fg, self.bg)
    }

    /// Character a console should print for this pixel (NUL prints as a space).
    pub const fn glyph(&self) -> char {
        if self.ch == NUL {
            ' '
        } else {
            self.ch
        }
    }

    pub const fn is_transparent(&self) -> bool {
        self.ch == NUL && self.fg.is_transparent() && self.bg.is_transparent()
    }

    pub fn with_colors(self, colors: ColorSet) -> Self {
        Self {
            fg: colors.fg,
            bg: colors.bg,
            ..self
        }
    }
}

/// Color stacking: a transparent top shows the bottom color.
///
/// Transparent over transparent stays transparent, so folding a stack of
/// layers yields the top-most opaque color at that cell.
#[inline]
pub const fn stack_color(top: Color, bottom: Color) -> Color {
    if top.is_transparent() {
        bottom
    } else {
        top
    }
}

/// Composite `top` over `bottom`.
///
/// The glyph comes from `top` unless it is [`NUL`]; each color channel is
/// resolved independently with [`stack_color`]. The operation is associative,
/// so layers can be folded in paint order.
#[inline]
pub const fn merge(top: Pixel, bottom: Pixel) -> Pixel {
    Pixel {
        ch: if top.ch == NUL { bottom.ch } else { top.ch },
        fg: stack_color(top.fg, bottom.fg),
        bg: stack_color(top.bg, bottom.bg),
    }
}
