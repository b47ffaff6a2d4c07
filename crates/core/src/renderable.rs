//! The contract every visual layer implements, plus a plain owned layer.

use crate::grid::Grid;
use crate::pixel::Pixel;
use crate::types::{Anchor, IntVector};

/// Anything the [`Compositor`](crate::compositor::Compositor) can draw.
///
/// Layers with a higher [`layer`](Renderable::layer) value are painted later
/// and therefore end up on top.
pub trait Renderable {
    fn is_active(&self) -> bool {
        true
    }

    /// Offset added to the anchored position.
    fn offset(&self) -> IntVector {
        IntVector::ZERO
    }

    fn layer(&self) -> i32 {
        0
    }

    fn anchor(&self) -> Anchor {
        Anchor::TOP_LEFT
    }

    /// Current contents of the layer.
    fn frame(&self) -> &Grid<Pixel>;
}

/// An owned grid with placement settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Sprite {
    pub grid: Grid<Pixel>,
    pub active: bool,
    pub offset: IntVector,
    pub layer: i32,
    pub anchor: Anchor,
}

impl Sprite {
    pub fn new(grid: Grid<Pixel>) -> Self {
        Self {
            grid,
            active: true,
            offset: IntVector::ZERO,
            layer: 0,
            anchor: Anchor::TOP_LEFT,
        }
    }

    /// A transparent sprite of the given size.
    pub fn empty(width: usize, height: usize) -> Self {
        Self::new(Grid::new(width, height))
    }

    pub fn with_layer(mut self, layer: i32) -> Self {
        self.layer = layer;
        self
    }

    pub fn with_offset(mut self, offset: IntVector) -> Self {
        self.offset = offset;
        self
    }

    pub fn with_anchor(mut self, anchor: Anchor) -> Self {
        self.anchor = anchor;
        self
    }
}

impl Renderable for Sprite {
    fn is_active(&self) -> bool {
        self.active
    }

    fn offset(&self) -> IntVector {
        self.offset
    }

    fn layer(&self) -> i32 {
        self.layer
    }

    fn anchor(&self) -> Anchor {
        self.anchor
    }

    fn frame(&self) -> &Grid<Pixel> {
        &self.grid
    }
}
