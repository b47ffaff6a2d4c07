//! Compositor: merges the grids of many renderables into one frame buffer.
//!
//! This module is pure (no I/O). The compositor owns its buffer; callers get
//! a shared borrow back from [`Compositor::render`] that stays valid until the
//! next mutation.

use tracing::trace;

use crate::anchor::resolve_anchor;
use crate::error::GridError;
use crate::grid::{CopyMode, Grid, ResizeMode};
use crate::pixel::{merge, Pixel};
use crate::renderable::Renderable;
use crate::types::{Color, IntVector, Rect};

/// How a layer's pixels combine with what is already in the buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MergeMode {
    /// Use the transparency rule of [`merge`].
    #[default]
    Transparent,
    /// Copy pixels as they are, transparent ones included.
    Overwrite,
}

#[derive(Debug, Clone)]
pub struct Compositor {
    buffer: Grid<Pixel>,
    background: Pixel,
    clear_each_frame: bool,
    strict_bounds: bool,
    merge_mode: MergeMode,
}

impl Compositor {
    pub fn new(width: i32, height: i32) -> Result<Self, GridError> {
        check_dimensions(width, height)?;
        let background = Pixel::blank(Color::Black);
        Ok(Self {
            buffer: Grid::filled(width as usize, height as usize, background),
            background,
            clear_each_frame: true,
            strict_bounds: false,
            merge_mode: MergeMode::Transparent,
        })
    }

    pub fn with_background(mut self, background: Pixel) -> Self {
        self.background = background;
        self.buffer.fill(background);
        self
    }

    /// Whether the buffer is refilled with the background before each frame.
    pub fn with_clear_each_frame(mut self, clear: bool) -> Self {
        self.clear_each_frame = clear;
        self
    }

    /// Whether a renderable entirely outside the frame is an error.
    pub fn with_strict_bounds(mut self, strict: bool) -> Self {
        self.strict_bounds = strict;
        self
    }

    pub fn with_merge_mode(mut self, mode: MergeMode) -> Self {
        self.merge_mode = mode;
        self
    }

    pub fn background(&self) -> Pixel {
        self.background
    }

    pub fn size(&self) -> IntVector {
        self.buffer.size()
    }

    /// The most recently rendered frame.
    pub fn frame(&self) -> &Grid<Pixel> {
        &self.buffer
    }

    /// Resize the frame buffer, e.g. to a backend's viewport size.
    pub fn resize(&mut self, size: IntVector) -> Result<(), GridError> {
        check_dimensions(size.x, size.y)?;
        self.buffer.resize(
            size.x as usize,
            size.y as usize,
            self.background,
            ResizeMode::Preserve,
        );
        Ok(())
    }

    /// Composite all active `layers` into the frame buffer.
    ///
    /// Layers are painted in ascending [`Renderable::layer`] order; equal
    /// layers keep the order they were given in.
    pub fn render<'r, I, R>(&mut self, layers: I) -> Result<&Grid<Pixel>, GridError>
    where
        I: IntoIterator<Item = &'r R>,
        R: Renderable + ?Sized + 'r,
    {
        if self.clear_each_frame {
            self.buffer.fill(self.background);
        }

        let mut active: Vec<&R> = layers.into_iter().filter(|r| r.is_active()).collect();
        active.sort_by_key(|r| r.layer());

        let bounds = self.buffer.bounds();
        let size = self.buffer.size();
        for r in active {
            let grid = r.frame();
            if grid.is_empty() {
                continue;
            }
            let anchored = resolve_anchor(r.anchor(), size, grid.size());
            let offset = r.offset();
            // A position that overflows i32 cannot overlap the frame.
            let visible = anchored
                .checked_add(offset)
                .filter(|p| Rect::at(*p, grid.size()).intersect(&bounds).is_some());
            let Some(pos) = visible else {
                let x = anchored.x.saturating_add(offset.x);
                let y = anchored.y.saturating_add(offset.y);
                if self.strict_bounds {
                    return Err(GridError::OutOfFrame {
                        layer: r.layer(),
                        x,
                        y,
                    });
                }
                trace!(layer = r.layer(), x, y, "skipping renderable outside frame");
                continue;
            };

            match self.merge_mode {
                MergeMode::Transparent => {
                    self.buffer
                        .merge_from(grid, grid.bounds(), pos, CopyMode::Trim, |top, bottom| {
                            merge(*top, *bottom)
                        })?
                }
                MergeMode::Overwrite => {
                    self.buffer
                        .copy_from(grid, grid.bounds(), pos, CopyMode::Trim)?
                }
            }
        }

        Ok(&self.buffer)
    }
}

fn check_dimensions(width: i32, height: i32) -> Result<(), GridError> {
    if width <= 0 || height <= 0 {
        return Err(GridError::InvalidDimensions { width, height });
    }
    Ok(())
}
