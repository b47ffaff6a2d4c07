//! Receivers and the prioritized layers that group them.

use crate::event::{DispatchModes, InputEvent};

/// What a receiver wants to happen after it saw an event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Propagation {
    #[default]
    Continue,
    /// Hide this event from everything below.
    Quit,
    /// Drop the rest of this tick's events.
    Flush,
}

pub trait InputReceiver {
    fn is_active(&self) -> bool {
        true
    }

    /// Modes this receiver accepts; defaults to edges only.
    fn modes(&self) -> DispatchModes {
        DispatchModes::EDGE
    }

    fn load_event(&mut self, event: &InputEvent) -> Propagation;
}

/// A group of receivers sharing one priority.
///
/// Receivers see events in insertion order.
pub struct InputLayer {
    name: String,
    priority: i32,
    active: bool,
    receivers: Vec<Box<dyn InputReceiver + Send>>,
}

impl InputLayer {
    pub fn new(name: impl Into<String>, priority: i32) -> Self {
        Self {
            name: name.into(),
            priority,
            active: true,
            receivers: Vec::new(),
        }
    }

    pub fn with_receiver(mut self, receiver: impl InputReceiver + Send + 'static) -> Self {
        self.push(receiver);
        self
    }

    pub fn push(&mut self, receiver: impl InputReceiver + Send + 'static) {
        self.receivers.push(Box::new(receiver));
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn priority(&self) -> i32 {
        self.priority
    }

    pub fn set_priority(&mut self, priority: i32) {
        self.priority = priority;
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    pub fn set_active(&mut self, active: bool) {
        self.active = active;
    }

    pub fn len(&self) -> usize {
        self.receivers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.receivers.is_empty()
    }

    /// Offer `event` to every active receiver that accepts its mode.
    ///
    /// `Quit` from a receiver also skips the receivers after it.
    pub fn dispatch(&mut self, event: &InputEvent) -> Propagation {
        for r in self.receivers.iter_mut() {
            if !r.is_active() || !r.modes().accepts(event.mode()) {
                continue;
            }
            match r.load_event(event) {
                Propagation::Continue => {}
                other => return other,
            }
        }
        Propagation::Continue
    }
}
