//! Input events and key-down edge detection.
//!
//! A key counts as held once the terminal reports a repeat for it, until a
//! release arrives or nothing was seen for the release timeout. Presses are
//! edges unless they belong to such a hold, so fast double taps stay two
//! edges.

use std::collections::HashMap;
use std::time::{Duration, Instant};

use arrayvec::ArrayVec;
use bitflags::bitflags;
use crossterm::event::{KeyCode, KeyEvent, KeyEventKind};

use crate::types::DEFAULT_KEY_RELEASE_MS;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DispatchMode {
    /// Key-down transition.
    Edge,
    /// Every press or repeat the terminal reports.
    Stream,
}

bitflags! {
    /// Dispatch modes a receiver accepts.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct DispatchModes: u8 {
        const EDGE = 1 << 0;
        const STREAM = 1 << 1;
    }
}

impl DispatchModes {
    pub fn accepts(self, mode: DispatchMode) -> bool {
        match mode {
            DispatchMode::Edge => self.contains(Self::EDGE),
            DispatchMode::Stream => self.contains(Self::STREAM),
        }
    }
}

impl Default for DispatchModes {
    fn default() -> Self {
        Self::EDGE
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct InputEvent {
    key: KeyEvent,
    mode: DispatchMode,
}

impl InputEvent {
    pub fn new(key: KeyEvent, mode: DispatchMode) -> Self {
        Self { key, mode }
    }

    pub fn key(&self) -> KeyEvent {
        self.key
    }

    pub fn code(&self) -> KeyCode {
        self.key.code
    }

    pub fn mode(&self) -> DispatchMode {
        self.mode
    }
}

#[derive(Debug, Clone)]
pub struct InputConfig {
    pub key_release_timeout: Duration,
    pub thread_name: String,
}

impl Default for InputConfig {
    fn default() -> Self {
        Self {
            key_release_timeout: Duration::from_millis(DEFAULT_KEY_RELEASE_MS as u64),
            thread_name: "tui-canvas-input".to_string(),
        }
    }
}

impl InputConfig {
    pub fn from_env() -> Self {
        let defaults = Self::default();
        let key_release_timeout = std::env::var("TUI_CANVAS_KEY_RELEASE_MS")
            .ok()
            .and_then(|s| s.trim().parse::<u64>().ok())
            .map(Duration::from_millis)
            .unwrap_or(defaults.key_release_timeout);
        Self {
            key_release_timeout,
            ..defaults
        }
    }
}

#[derive(Debug, Clone)]
pub struct EdgeDetector {
    /// Last repeat or in-hold press per repeating key.
    repeating: HashMap<KeyCode, Instant>,
    release_timeout: Duration,
}

impl EdgeDetector {
    pub fn new(release_timeout: Duration) -> Self {
        Self {
            repeating: HashMap::new(),
            release_timeout,
        }
    }

    pub fn release_timeout(&self) -> Duration {
        self.release_timeout
    }

    /// Events for one key read: the edge (if any) first, then the stream event.
    pub fn process(&mut self, key: KeyEvent) -> ArrayVec<InputEvent, 2> {
        self.process_at(key, Instant::now())
    }

    pub fn process_at(&mut self, key: KeyEvent, now: Instant) -> ArrayVec<InputEvent, 2> {
        let mut events = ArrayVec::new();
        match key.kind {
            KeyEventKind::Release => {
                self.repeating.remove(&key.code);
            }
            KeyEventKind::Repeat => {
                self.repeating.insert(key.code, now);
                events.push(InputEvent::new(key, DispatchMode::Stream));
            }
            KeyEventKind::Press => {
                let held = self
                    .repeating
                    .get(&key.code)
                    .is_some_and(|last| now.saturating_duration_since(*last) <= self.release_timeout);
                if held {
                    self.repeating.insert(key.code, now);
                } else {
                    self.repeating.remove(&key.code);
                    events.push(InputEvent::new(key, DispatchMode::Edge));
                }
                events.push(InputEvent::new(key, DispatchMode::Stream));
            }
        }
        events
    }
}

impl Default for EdgeDetector {
    fn default() -> Self {
        Self::new(InputConfig::default().key_release_timeout)
    }
}
