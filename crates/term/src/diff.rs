//! Diff backend: one pass per distinct color set.
//!
//! For every distinct resolved [`ColorSet`] in the frame the backend switches
//! colors exactly once and writes a single string that covers the whole frame.
//! Cells that belong to other color sets are stepped over with cursor-relative
//! jumps, so they keep whatever an earlier pass wrote there. Jump strings are
//! memoized in a [`JumpCache`] that lives as long as the engine.

use std::collections::HashMap;

use arrayvec::ArrayVec;

use crate::core::{Grid, Pixel};
use crate::engine::{check_origin, visible_extent, RenderEngine};
use crate::error::BackendError;
use crate::target::{ConsoleTarget, JumpSupport};
use crate::types::{ColorSet, IntVector};

/// Resolved color sets are packed attributes, so there are at most 256.
const MAX_COLOR_SETS: usize = 256;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
enum JumpKey {
    /// Tab stops are absolute, so the start column's phase is part of the key.
    Tab { tab_width: u16, phase: u16, distance: u16 },
    Forward { distance: u16 },
}

/// Memoized cursor-jump strings.
///
/// Grows monotonically; entries depend only on the key, never on the frame.
#[derive(Debug, Default)]
pub struct JumpCache {
    entries: HashMap<JumpKey, String>,
    hits: u64,
    misses: u64,
}

impl JumpCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn hits(&self) -> u64 {
        self.hits
    }

    pub fn misses(&self) -> u64 {
        self.misses
    }

    /// Append the sequence moving the cursor `distance` columns right of
    /// `from` without touching the cells in between.
    ///
    /// Returns `false` when `support` has no relative jumps; nothing is
    /// written in that case.
    pub fn push_jump(
        &mut self,
        out: &mut String,
        support: JumpSupport,
        from: u16,
        distance: u16,
        console_width: u16,
    ) -> bool {
        if distance == 0 {
            return true;
        }
        match support {
            JumpSupport::Unsupported => false,
            JumpSupport::CursorForward => {
                let key = JumpKey::Forward { distance };
                out.push_str(self.lookup(key, || format!("\x1b[{distance}C")));
                true
            }
            JumpSupport::TabTrim { tab_width } => {
                let tw = u32::from(tab_width.max(1));
                let phase = u32::from(from) % tw;
                let d = u32::from(distance);
                let tabs = (phase + d).div_ceil(tw);
                let stop = u32::from(from) - phase + tabs * tw;
                let target = u32::from(from) + d;
                let last = u32::from(console_width.max(1)) - 1;

                if stop > last {
                    // The final tab parks at the last column; not cacheable by phase.
                    out.extend(std::iter::repeat('\t').take(tabs as usize));
                    let back = last.saturating_sub(target) as usize;
                    out.extend(std::iter::repeat('\x08').take(back));
                    return true;
                }

                let key = JumpKey::Tab {
                    tab_width: tw as u16,
                    phase: phase as u16,
                    distance,
                };
                out.push_str(self.lookup(key, || {
                    let mut s = String::with_capacity((tabs + stop - target) as usize);
                    s.extend(std::iter::repeat('\t').take(tabs as usize));
                    s.extend(std::iter::repeat('\x08').take((stop - target) as usize));
                    s
                }));
                true
            }
        }
    }

    fn lookup(&mut self, key: JumpKey, build: impl FnOnce() -> String) -> &str {
        if self.entries.contains_key(&key) {
            self.hits += 1;
        } else {
            self.misses += 1;
        }
        self.entries.entry(key).or_insert_with(build)
    }
}

pub struct DiffEngine<T: ConsoleTarget> {
    target: T,
    jumps: JumpCache,
    text: String,
}

impl<T: ConsoleTarget> DiffEngine<T> {
    pub fn new(target: T) -> Self {
        Self {
            target,
            jumps: JumpCache::new(),
            text: String::with_capacity(16 * 1024),
        }
    }

    pub fn jump_cache(&self) -> &JumpCache {
        &self.jumps
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

    fn encode(&mut self, frame: &Grid<Pixel>, origin: (u16, u16)) -> std::io::Result<()> {
        let (ox, oy) = origin;
        let caps = self.target.capabilities();
        let console_size = self.target.size();
        let console_width = console_size.map_or(u16::MAX, |(w, _)| w);
        let (w, h) = visible_extent(frame, origin, console_size);

        for colors in distinct_color_sets(frame, w, h) {
            self.target.set_colors(colors)?;
            self.text.clear();

            // Position of the cursor relative to the frame, once placed.
            let mut cursor: Option<(usize, usize)> = None;
            for (y, row) in frame.rows().take(h).enumerate() {
                for (x, px) in row[..w].iter().enumerate() {
                    if px.colors().resolve() != colors {
                        continue;
                    }
                    let sx = ox + x as u16;
                    let sy = oy + y as u16;

                    let placed = match cursor {
                        Some(c) if c == (x, y) && caps.auto_advance => true,
                        Some((cx, cy)) if caps.auto_advance => {
                            if cy == y {
                                self.jumps.push_jump(
                                    &mut self.text,
                                    caps.jump,
                                    ox + cx as u16,
                                    (x - cx) as u16,
                                    console_width,
                                )
                            } else if caps.jump != JumpSupport::Unsupported {
                                for _ in cy..y {
                                    self.text.push_str("\r\n");
                                }
                                self.jumps
                                    .push_jump(&mut self.text, caps.jump, 0, sx, console_width)
                            } else {
                                false
                            }
                        }
                        _ => false,
                    };
                    if !placed {
                        if !self.text.is_empty() {
                            self.target.write_str(&self.text)?;
                            self.text.clear();
                        }
                        self.target.move_to(sx, sy)?;
                    }

                    self.text.push(px.glyph());
                    // The cursor does not advance past the last column.
                    cursor = if u32::from(sx) + 1 < u32::from(console_width) {
                        Some((x + 1, y))
                    } else {
                        None
                    };
                }
            }

            if !self.text.is_empty() {
                self.target.write_str(&self.text)?;
            }
        }

        self.target.flush()
    }
}

/// Distinct resolved color sets of the visible area, in first-seen order.
fn distinct_color_sets(frame: &Grid<Pixel>, w: usize, h: usize) -> ArrayVec<ColorSet, MAX_COLOR_SETS> {
    let mut seen = [false; MAX_COLOR_SETS];
    let mut sets = ArrayVec::new();
    for row in frame.rows().take(h) {
        for px in &row[..w] {
            let colors = px.colors().resolve();
            let slot = &mut seen[colors.attribute() as usize];
            if !*slot {
                *slot = true;
                sets.push(colors);
            }
        }
    }
    sets
}

impl<T: ConsoleTarget> RenderEngine for DiffEngine<T> {
    fn render(&mut self, frame: &Grid<Pixel>, origin: IntVector) -> Result<(), BackendError> {
        let origin = check_origin(origin)?;
        self.encode(frame, origin)?;
        Ok(())
    }

    fn viewport_size(&self) -> Option<IntVector> {
        self.target
            .size()
            .map(|(w, h)| IntVector::new(w as i32, h as i32))
    }
}

/// Human-readable form of a jump string, for logs and test failures.
pub fn describe_jump(jump: &str) -> String {
    let mut out = String::new();
    for ch in jump.chars() {
        match ch {
            '\t' => out.push_str("<TAB>"),
            '\x08' => out.push_str("<BS>"),
            '\x1b' => out.push_str("<ESC>"),
            c => out.push(c),
        }
    }
    out
}
