//! tui-canvas (workspace facade crate).
//!
//! Re-exports the member crates under one roof so applications can depend on
//! a single package: `tui_canvas::{types, core, term, engine, input}`.

pub use tui_canvas_core as core;
pub use tui_canvas_engine as engine;
pub use tui_canvas_input as input;
pub use tui_canvas_term as term;
pub use tui_canvas_types as types;
