//! Core types module - shared data structures and constants
//!
//! This module defines the plain value types shared by every crate in the
//! workspace: positions, rectangles, the console color palette and anchor
//! flags. Nothing here does I/O, so the types are usable from the compositor,
//! the console backends and the input pipeline alike.
//!
//! # Coordinates
//!
//! - Origin `(0, 0)` is the top-left cell
//! - `x` grows to the right, `y` grows downwards
//! - Positions are signed so that layers can sit partly off-frame
//!
//! # Timing Defaults
//!
//! | Constant | Value | Description |
//! |----------|-------|-------------|
//! | `DEFAULT_FRAME_RATE` | 60 | Update loop cap in updates/second |
//! | `DEFAULT_FPS_SAMPLE_MS` | 1000 | Window for the rolling FPS estimate |
//! | `DEFAULT_HYBRID_SPIN_MS` | 2 | Spin margin kept by hybrid pacing |
//! | `DEFAULT_KEY_RELEASE_MS` | 150 | Hold timeout for key-down edge detection |
//!
//! # Examples
//!
//! ```
//! use tui_canvas_types::{Anchor, Color, ColorSet, IntVector};
//!
//! let colors = ColorSet::new(Color::White, Color::DarkBlue);
//! assert_eq!(colors.resolve(), colors);
//!
//! let anchor = Anchor::from_str("bottom-right").unwrap();
//! assert!(anchor.contains(Anchor::RIGHT | Anchor::BOTTOM));
//!
//! let p = IntVector::new(3, 4) + IntVector::new(1, -1);
//! assert_eq!(p, IntVector::new(4, 3));
//! ```

use std::ops::{Add, AddAssign, Neg, Sub};

use bitflags::bitflags;

/// Default update loop cap (updates per second).
pub const DEFAULT_FRAME_RATE: u32 = 60;

/// Default window over which the rolling FPS estimate is recomputed.
pub const DEFAULT_FPS_SAMPLE_MS: u64 = 1000;

/// Time before a frame deadline at which hybrid pacing stops sleeping and spins.
pub const DEFAULT_HYBRID_SPIN_MS: u64 = 2;

/// A key pressed again within this window counts as held, not as a new edge.
pub const DEFAULT_KEY_RELEASE_MS: u32 = 150;

/// Horizontal tab stop spacing assumed for console cursor jumps.
pub const DEFAULT_TAB_WIDTH: u16 = 8;

/// Signed 2D integer vector used for positions, offsets and sizes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct IntVector {
    pub x: i32,
    pub y: i32,
}

impl IntVector {
    pub const ZERO: IntVector = IntVector { x: 0, y: 0 };

    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// Component-wise sum, or `None` if either axis overflows.
    pub const fn checked_add(self, rhs: IntVector) -> Option<IntVector> {
        match (self.x.checked_add(rhs.x), self.y.checked_add(rhs.y)) {
            (Some(x), Some(y)) => Some(IntVector::new(x, y)),
            _ => None,
        }
    }
}

impl Add for IntVector {
    type Output = IntVector;

    fn add(self, rhs: IntVector) -> IntVector {
        IntVector::new(self.x + rhs.x, self.y + rhs.y)
    }
}

impl AddAssign for IntVector {
    fn add_assign(&mut self, rhs: IntVector) {
        self.x += rhs.x;
        self.y += rhs.y;
    }
}

impl Sub for IntVector {
    type Output = IntVector;

    fn sub(self, rhs: IntVector) -> IntVector {
        IntVector::new(self.x - rhs.x, self.y - rhs.y)
    }
}

impl Neg for IntVector {
    type Output = IntVector;

    fn neg(self) -> IntVector {
        IntVector::new(-self.x, -self.y)
    }
}

/// Axis-aligned rectangle in cell coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Rect {
    pub x: i32,
    pub y: i32,
    pub width: i32,
    pub height: i32,
}

impl Rect {
    pub const fn new(x: i32, y: i32, width: i32, height: i32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Rectangle anchored at `pos` with the given size.
    pub const fn at(pos: IntVector, size: IntVector) -> Self {
        Self::new(pos.x, pos.y, size.x, size.y)
    }

    /// Exclusive right edge, saturating at `i32::MAX`.
    pub const fn right(&self) -> i32 {
        self.x.saturating_add(self.width)
    }

    /// Exclusive bottom edge, saturating at `i32::MAX`.
    pub const fn bottom(&self) -> i32 {
        self.y.saturating_add(self.height)
    }

    pub const fn is_empty(&self) -> bool {
        self.width <= 0 || self.height <= 0
    }

    pub const fn contains(&self, p: IntVector) -> bool {
        p.x >= self.x && p.y >= self.y && p.x < self.right() && p.y < self.bottom()
    }

    /// Overlapping region of two rectangles, or `None` when they do not touch.
    pub fn intersect(&self, other: &Rect) -> Option<Rect> {
        let x = self.x.max(other.x);
        let y = self.y.max(other.y);
        let right = self.right().min(other.right());
        let bottom = self.bottom().min(other.bottom());
        let r = Rect::new(x, y, right.saturating_sub(x), bottom.saturating_sub(y));
        if r.is_empty() {
            None
        } else {
            Some(r)
        }
    }
}

/// The fixed console palette.
///
/// The 16 colors follow classic console ordering. `Transparent` is a sentinel
/// used while compositing: it means "take the color of whatever is below".
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Color {
    Black,
    DarkBlue,
    DarkGreen,
    DarkCyan,
    DarkRed,
    DarkMagenta,
    DarkYellow,
    Gray,
    DarkGray,
    Blue,
    Green,
    Cyan,
    Red,
    Magenta,
    Yellow,
    White,
    #[default]
    Transparent,
}

impl Color {
    /// Every value, including `Transparent` (last).
    pub const ALL: [Color; 17] = [
        Color::Black,
        Color::DarkBlue,
        Color::DarkGreen,
        Color::DarkCyan,
        Color::DarkRed,
        Color::DarkMagenta,
        Color::DarkYellow,
        Color::Gray,
        Color::DarkGray,
        Color::Blue,
        Color::Green,
        Color::Cyan,
        Color::Red,
        Color::Magenta,
        Color::Yellow,
        Color::White,
        Color::Transparent,
    ];

    /// Console attribute index: bit 0 blue, bit 1 green, bit 2 red, bit 3 intensity.
    ///
    /// `None` for `Transparent`, which has no physical representation.
    pub const fn console_index(self) -> Option<u8> {
        match self {
            Color::Transparent => None,
            c => Some(c as u8),
        }
    }

    /// Inverse of [`Color::console_index`]; only the low nibble is used.
    pub const fn from_console_index(index: u8) -> Color {
        Color::ALL[(index & 0x0f) as usize]
    }

    pub const fn is_transparent(self) -> bool {
        matches!(self, Color::Transparent)
    }

    /// Parse a color name (case-insensitive, `-`/`_` ignored).
    ///
    /// ```
    /// use tui_canvas_types::Color;
    ///
    /// assert_eq!(Color::from_str("dark_blue"), Some(Color::DarkBlue));
    /// assert_eq!(Color::from_str("WHITE"), Some(Color::White));
    /// assert_eq!(Color::from_str("mauve"), None);
    /// ```
    pub fn from_str(s: &str) -> Option<Self> {
        let key: String = s
            .chars()
            .filter(|c| *c != '-' && *c != '_')
            .collect::<String>()
            .to_lowercase();
        match key.as_str() {
            "black" => Some(Color::Black),
            "darkblue" => Some(Color::DarkBlue),
            "darkgreen" => Some(Color::DarkGreen),
            "darkcyan" => Some(Color::DarkCyan),
            "darkred" => Some(Color::DarkRed),
            "darkmagenta" => Some(Color::DarkMagenta),
            "darkyellow" => Some(Color::DarkYellow),
            "gray" | "grey" => Some(Color::Gray),
            "darkgray" | "darkgrey" => Some(Color::DarkGray),
            "blue" => Some(Color::Blue),
            "green" => Some(Color::Green),
            "cyan" => Some(Color::Cyan),
            "red" => Some(Color::Red),
            "magenta" => Some(Color::Magenta),
            "yellow" => Some(Color::Yellow),
            "white" => Some(Color::White),
            "transparent" => Some(Color::Transparent),
            _ => None,
        }
    }
}

/// Foreground/background pair, used as the grouping key by console backends.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct ColorSet {
    pub fg: Color,
    pub bg: Color,
}

impl ColorSet {
    /// Colors a console shows when nothing opaque was painted.
    pub const FALLBACK: ColorSet = ColorSet::new(Color::Gray, Color::Black);

    pub const fn new(fg: Color, bg: Color) -> Self {
        Self { fg, bg }
    }

    /// Replace transparent channels with the console fallback colors.
    pub const fn resolve(self) -> ColorSet {
        let fg = if self.fg.is_transparent() {
            Self::FALLBACK.fg
        } else {
            self.fg
        };
        let bg = if self.bg.is_transparent() {
            Self::FALLBACK.bg
        } else {
            self.bg
        };
        ColorSet::new(fg, bg)
    }

    /// Packed console attribute (`fg | bg << 4`) of the resolved colors.
    pub const fn attribute(self) -> u16 {
        let r = self.resolve();
        let fg = match r.fg.console_index() {
            Some(i) => i,
            None => 7,
        };
        let bg = match r.bg.console_index() {
            Some(i) => i,
            None => 0,
        };
        (fg as u16) | ((bg as u16) << 4)
    }

    /// Inverse of [`ColorSet::attribute`].
    pub const fn from_attribute(attr: u16) -> ColorSet {
        ColorSet::new(
            Color::from_console_index((attr & 0x0f) as u8),
            Color::from_console_index(((attr >> 4) & 0x0f) as u8),
        )
    }
}

bitflags! {
    /// Placement of a child grid inside a parent, per axis.
    ///
    /// Horizontal: `CENTER_X` wins over `RIGHT`, and with neither the child
    /// sits at the left edge. Vertical works the same way with `CENTER_Y` and
    /// `BOTTOM`. Centering floors by default; `BIAS_RIGHT` / `BIAS_BOTTOM`
    /// make the matching axis round up instead.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct Anchor: u8 {
        const LEFT = 1 << 0;
        const RIGHT = 1 << 1;
        const TOP = 1 << 2;
        const BOTTOM = 1 << 3;
        const CENTER_X = 1 << 4;
        const CENTER_Y = 1 << 5;
        const BIAS_RIGHT = 1 << 6;
        const BIAS_BOTTOM = 1 << 7;

        const TOP_LEFT = Self::TOP.bits() | Self::LEFT.bits();
        const TOP_RIGHT = Self::TOP.bits() | Self::RIGHT.bits();
        const BOTTOM_LEFT = Self::BOTTOM.bits() | Self::LEFT.bits();
        const BOTTOM_RIGHT = Self::BOTTOM.bits() | Self::RIGHT.bits();
        const CENTER = Self::CENTER_X.bits() | Self::CENTER_Y.bits();
    }
}

impl Default for Anchor {
    fn default() -> Self {
        Anchor::TOP_LEFT
    }
}

impl Anchor {
    /// Parse names like `"top-left"`, `"center"`, `"bottom right"`.
    ///
    /// Words are combined; `center` applies to every axis not otherwise named.
    pub fn from_str(s: &str) -> Option<Self> {
        let mut anchor = Anchor::empty();
        let mut center = false;
        for word in s
            .split(|c: char| c == '-' || c == '_' || c == '|' || c.is_whitespace())
            .filter(|w| !w.is_empty())
        {
            match word.to_lowercase().as_str() {
                "left" => anchor |= Anchor::LEFT,
                "right" => anchor |= Anchor::RIGHT,
                "top" => anchor |= Anchor::TOP,
                "bottom" => anchor |= Anchor::BOTTOM,
                "center" | "centre" | "middle" => center = true,
                _ => return None,
            }
        }
        if center {
            if !anchor.intersects(Anchor::LEFT | Anchor::RIGHT) {
                anchor |= Anchor::CENTER_X;
            }
            if !anchor.intersects(Anchor::TOP | Anchor::BOTTOM) {
                anchor |= Anchor::CENTER_Y;
            }
        }
        if anchor.is_empty() {
            None
        } else {
            Some(anchor)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn timing_defaults() {
        assert_eq!(DEFAULT_FRAME_RATE, 60);
        assert_eq!(DEFAULT_FPS_SAMPLE_MS, 1000);
        assert_eq!(DEFAULT_KEY_RELEASE_MS, 150);
        assert_eq!(DEFAULT_TAB_WIDTH, 8);
    }

    #[test]
    fn console_index_roundtrips_every_opaque_color() {
        for c in Color::ALL.iter().copied().filter(|c| !c.is_transparent()) {
            let i = c.console_index().unwrap();
            assert_eq!(Color::from_console_index(i), c);
        }
        assert_eq!(Color::Transparent.console_index(), None);
    }

    #[test]
    fn console_index_bits_follow_rgbi_layout() {
        assert_eq!(Color::Blue.console_index(), Some(0b1001));
        assert_eq!(Color::DarkGreen.console_index(), Some(0b0010));
        assert_eq!(Color::DarkRed.console_index(), Some(0b0100));
        assert_eq!(Color::White.console_index(), Some(0b1111));
    }

    #[test]
    fn attribute_packs_fg_low_bg_high() {
        let set = ColorSet::new(Color::Yellow, Color::DarkBlue);
        assert_eq!(set.attribute(), 14 | (1 << 4));
        assert_eq!(ColorSet::from_attribute(set.attribute()), set);
    }

    #[test]
    fn transparent_resolves_to_fallback() {
        let set = ColorSet::new(Color::Transparent, Color::Transparent);
        assert_eq!(set.resolve(), ColorSet::FALLBACK);
        assert_eq!(set.attribute(), ColorSet::FALLBACK.attribute());
    }

    #[test]
    fn rect_intersection() {
        let a = Rect::new(0, 0, 10, 4);
        let b = Rect::new(8, 2, 5, 5);
        assert_eq!(a.intersect(&b), Some(Rect::new(8, 2, 2, 2)));
        assert_eq!(a.intersect(&Rect::new(10, 0, 2, 2)), None);
        assert!(a.contains(IntVector::new(9, 3)));
        assert!(!a.contains(IntVector::new(10, 3)));
    }

    #[test]
    fn rect_edges_saturate_near_the_coordinate_limit() {
        let far = Rect::new(i32::MAX - 1, 0, 4, 1);
        assert_eq!(far.right(), i32::MAX);
        assert_eq!(Rect::new(0, 0, 10, 3).intersect(&far), None);

        let edge = Rect::new(i32::MAX - 3, i32::MAX - 3, 8, 8);
        assert_eq!(
            edge.intersect(&Rect::new(i32::MAX - 2, i32::MAX - 2, 1, 1)),
            Some(Rect::new(i32::MAX - 2, i32::MAX - 2, 1, 1))
        );
        assert_eq!(Rect::new(i32::MIN, 0, 5, 1).intersect(&far), None);
    }

    #[test]
    fn checked_add_reports_overflow() {
        assert_eq!(
            IntVector::new(2, 3).checked_add(IntVector::new(-1, 1)),
            Some(IntVector::new(1, 4))
        );
        assert_eq!(IntVector::new(i32::MAX - 1, 0).checked_add(IntVector::new(5, 0)), None);
        assert_eq!(IntVector::new(0, i32::MIN).checked_add(IntVector::new(0, -1)), None);
    }

    #[test]
    fn anchor_parsing() {
        assert_eq!(Anchor::from_str("top-left"), Some(Anchor::TOP_LEFT));
        assert_eq!(Anchor::from_str("center"), Some(Anchor::CENTER));
        assert_eq!(
            Anchor::from_str("bottom center"),
            Some(Anchor::BOTTOM | Anchor::CENTER_X)
        );
        assert_eq!(Anchor::from_str("sideways"), None);
        assert_eq!(Anchor::from_str(""), None);
    }

    #[test]
    fn color_parsing_is_case_insensitive() {
        assert_eq!(Color::from_str("DarkMagenta"), Some(Color::DarkMagenta));
        assert_eq!(Color::from_str("dark-gray"), Some(Color::DarkGray));
    }
}
