//! Frame pacing for the update loop.

use std::time::{Duration, Instant};

use crate::types::DEFAULT_HYBRID_SPIN_MS;

/// How the loop waits out the rest of a frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PacingMode {
    /// Busy-wait for the whole remainder.
    #[default]
    Spin,
    /// Sleep until `spin_margin` before the deadline, then busy-wait.
    Hybrid { spin_margin: Duration },
}

impl PacingMode {
    pub fn from_str(s: &str) -> Option<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "spin" => Some(Self::Spin),
            "hybrid" => Some(Self::Hybrid {
                spin_margin: Duration::from_millis(DEFAULT_HYBRID_SPIN_MS),
            }),
            _ => None,
        }
    }
}

#[derive(Debug, Clone)]
pub struct FramePacer {
    period: Option<Duration>,
    mode: PacingMode,
}

impl FramePacer {
    /// A `frame_rate` of 0 means uncapped.
    pub fn new(frame_rate: u32, mode: PacingMode) -> Self {
        Self {
            period: period_for(frame_rate),
            mode,
        }
    }

    pub fn period(&self) -> Option<Duration> {
        self.period
    }

    pub fn set_frame_rate(&mut self, frame_rate: u32) {
        self.period = period_for(frame_rate);
    }

    /// Block until one period after `frame_start`. Returns immediately when
    /// uncapped or when the deadline already passed.
    pub fn wait(&self, frame_start: Instant) {
        let Some(period) = self.period else {
            return;
        };
        let deadline = frame_start + period;

        if let PacingMode::Hybrid { spin_margin } = self.mode {
            let remaining = deadline.saturating_duration_since(Instant::now());
            if remaining > spin_margin {
                std::thread::sleep(remaining - spin_margin);
            }
        }
        while Instant::now() < deadline {
            std::hint::spin_loop();
        }
    }
}

fn period_for(frame_rate: u32) -> Option<Duration> {
    if frame_rate == 0 {
        None
    } else {
        Some(Duration::from_secs(1) / frame_rate)
    }
}
