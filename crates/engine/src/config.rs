//! Scheduler configuration.

use std::time::Duration;

use crate::pacer::PacingMode;
use crate::types::{DEFAULT_FPS_SAMPLE_MS, DEFAULT_FRAME_RATE};

/// Which collection is updated first in each iteration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PriorityMode {
    #[default]
    ScenesFirst,
    UpdatablesFirst,
}

impl PriorityMode {
    pub fn from_str(s: &str) -> Option<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "scenes" | "scenes-first" => Some(Self::ScenesFirst),
            "updatables" | "updatables-first" => Some(Self::UpdatablesFirst),
            _ => None,
        }
    }
}

#[derive(Debug, Clone)]
pub struct SchedulerConfig {
    /// Updates per second; 0 runs uncapped.
    pub frame_rate: u32,
    pub priority: PriorityMode,
    pub pacing: PacingMode,
    /// Window over which the published FPS is measured.
    pub fps_sample: Duration,
    pub thread_name: String,
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            frame_rate: DEFAULT_FRAME_RATE,
            priority: PriorityMode::ScenesFirst,
            pacing: PacingMode::Spin,
            fps_sample: Duration::from_millis(DEFAULT_FPS_SAMPLE_MS),
            thread_name: "tui-canvas-update".to_string(),
        }
    }
}

impl SchedulerConfig {
    pub fn from_env() -> Self {
        use std::env;

        let defaults = Self::default();

        let frame_rate = env::var("TUI_CANVAS_FPS")
            .ok()
            .and_then(|s| parse_frame_rate(&s))
            .unwrap_or(defaults.frame_rate);

        let priority = env::var("TUI_CANVAS_PRIORITY")
            .ok()
            .and_then(|s| PriorityMode::from_str(&s))
            .unwrap_or(defaults.priority);

        let pacing = env::var("TUI_CANVAS_PACING")
            .ok()
            .and_then(|s| PacingMode::from_str(&s))
            .unwrap_or(defaults.pacing);

        let fps_sample = env::var("TUI_CANVAS_FPS_INTERVAL_MS")
            .ok()
            .and_then(|s| s.trim().parse::<u64>().ok())
            .filter(|ms| *ms > 0)
            .map(Duration::from_millis)
            .unwrap_or(defaults.fps_sample);

        Self {
            frame_rate,
            priority,
            pacing,
            fps_sample,
            ..defaults
        }
    }

    pub fn with_frame_rate(mut self, frame_rate: u32) -> Self {
        self.frame_rate = frame_rate;
        self
    }

    pub fn with_priority(mut self, priority: PriorityMode) -> Self {
        self.priority = priority;
        self
    }

    pub fn with_pacing(mut self, pacing: PacingMode) -> Self {
        self.pacing = pacing;
        self
    }
}

/// `"uncapped"` or `"0"` disable the cap; otherwise a positive integer.
pub fn parse_frame_rate(s: &str) -> Option<u32> {
    let s = s.trim();
    if s.eq_ignore_ascii_case("uncapped") {
        return Some(0);
    }
    s.parse().ok()
}
