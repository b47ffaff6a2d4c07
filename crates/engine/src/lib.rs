//! Update loop: a dedicated thread that drives scenes and updatables at a
//! fixed or uncapped rate.
//!
//! Each iteration measures its delta, runs one update pass in the configured
//! [`PriorityMode`], publishes [`FrameStats`] and then waits out the rest of
//! the frame with a [`FramePacer`].

pub mod config;
pub mod error;
pub mod pacer;
pub mod scheduler;

pub use tui_canvas_types as types;

pub use config::{parse_frame_rate, PriorityMode, SchedulerConfig};
pub use error::SchedulerError;
pub use pacer::{FramePacer, PacingMode};
pub use scheduler::{FrameStats, FrameTime, Scene, Scheduler, Updatable};
