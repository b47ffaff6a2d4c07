//! Input pipeline: a reader thread feeding per-handler queues that are
//! drained through prioritized layers of receivers.
//!
//! ```text
//! KeySource -> InputController thread -> InputSink (one per handler)
//!           -> InputHandler::process_pending (update thread)
//!           -> InputLayer (descending priority) -> InputReceiver
//! ```
//!
//! Terminals without key-release events are supported through a timeout; see
//! [`EdgeDetector`].

pub mod controller;
pub mod error;
pub mod event;
pub mod handler;
pub mod layer;
pub mod map;

pub use tui_canvas_engine as engine;
pub use tui_canvas_types as types;

pub use controller::{CrosstermKeys, InputController, KeySource};
pub use error::InputError;
pub use event::{DispatchMode, DispatchModes, EdgeDetector, InputConfig, InputEvent};
pub use handler::{InputHandler, InputSink};
pub use layer::{InputLayer, InputReceiver, Propagation};
pub use map::{direction, should_quit};
