//! Core canvas module - pixels, grids and layer compositing
//!
//! Everything in this crate is pure and deterministic: it has no dependency on
//! a terminal, a thread or a clock, which keeps the compositing rules easy to
//! test exhaustively.
//!
//! # Module Structure
//!
//! - [`pixel`]: the cell value type and its transparency merge rule
//! - [`grid`]: bounds-checked 2D storage with area copies and resizing
//! - [`anchor`]: placement of a child grid inside a parent
//! - [`renderable`]: the layer contract and a plain [`Sprite`] layer
//! - [`compositor`]: folds active layers into one frame buffer
//!
//! # Layer Order
//!
//! Layers are painted in ascending `layer()` order, so a higher layer covers a
//! lower one. Layers with equal values keep their input order.
//!
//! # Example
//!
//! ```
//! use tui_canvas_core::{Compositor, Grid, Pixel, Sprite};
//! use tui_canvas_core::types::{Anchor, Color, ColorSet};
//!
//! let mut label = Sprite::new(Grid::new(5, 1)).with_anchor(Anchor::CENTER).with_layer(1);
//! label.grid.put_str(0, 0, "hello", ColorSet::new(Color::White, Color::Transparent)).unwrap();
//! let backdrop = Sprite::new(Grid::filled(9, 3, Pixel::blank(Color::DarkBlue)));
//!
//! let mut compositor = Compositor::new(9, 3).unwrap();
//! let frame = compositor.render([&label, &backdrop]).unwrap();
//! assert_eq!(frame.row_text(1), "  hello  ");
//! assert_eq!(frame.get(2, 1).unwrap().bg(), Color::DarkBlue);
//! ```

pub mod anchor;
pub mod compositor;
pub mod error;
pub mod grid;
pub mod pixel;
pub mod renderable;

pub use tui_canvas_types as types;

pub use anchor::{resolve_anchor, AxisAnchor};
pub use compositor::{Compositor, MergeMode};
pub use error::{GridError, PixelError};
pub use grid::{CopyMode, Grid, ResizeMode};
pub use pixel::{merge, stack_color, Pixel, NUL};
pub use renderable::{Renderable, Sprite};
