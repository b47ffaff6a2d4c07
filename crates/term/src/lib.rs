//! Console output for composited frames.
//!
//! A [`RenderEngine`] turns a `Grid<Pixel>` into console output. Four backends
//! exist, chosen once through [`RenderBackend::select`]:
//!
//! - [`DirectEngine`]: packs cells and writes the whole rectangle in one call
//!   to the process console
//! - [`DiffEngine`]: one color switch per distinct color set, stepping over
//!   foreign cells with memoized cursor jumps
//! - [`BaselineEngine`]: one color switch and one write per run
//! - [`DebugEngine`]: baseline output with blanks shown as color letters
//!
//! Text backends draw through a [`ConsoleTarget`]: [`CrosstermTarget`] for a
//! real terminal, [`MemoryConsole`] to inspect the result in tests.

pub mod baseline;
pub mod debug;
pub mod diff;
pub mod direct;
pub mod engine;
pub mod error;
pub mod memory;
pub mod session;
pub mod target;

pub use tui_canvas_core as core;
pub use tui_canvas_types as types;

pub use baseline::BaselineEngine;
pub use debug::{debug_glyph, DebugEngine};
pub use diff::{describe_jump, DiffEngine, JumpCache};
pub use direct::{encode_rect, pack_cells, CharInfo, DirectEngine};
pub use engine::{BackendKind, RenderBackend, RenderEngine};
pub use error::BackendError;
pub use memory::MemoryConsole;
pub use session::TerminalSession;
pub use target::{term_color, Capabilities, ConsoleTarget, CrosstermTarget, JumpSupport};
