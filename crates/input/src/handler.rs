//! InputHandler: drains a thread-safe queue through prioritized layers.
//!
//! The input thread pushes into an [`InputSink`]; the update thread calls
//! [`InputHandler::process_pending`] (directly or as an [`Updatable`]) once
//! per tick. Each tick only handles the events that were queued when it
//! began.

use std::collections::VecDeque;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use tracing::trace;

use crate::engine::{FrameTime, Updatable};
use crate::event::InputEvent;
use crate::layer::{InputLayer, Propagation};

/// Producer side of a handler's queue. Cheap to clone.
#[derive(Debug, Clone, Default)]
pub struct InputSink {
    queue: Arc<Mutex<VecDeque<InputEvent>>>,
}

impl InputSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&self, event: InputEvent) {
        self.lock().push_back(event);
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    /// Whether both sinks feed the same queue.
    pub fn same_queue(&self, other: &InputSink) -> bool {
        Arc::ptr_eq(&self.queue, &other.queue)
    }

    /// Everything queued right now, oldest first.
    pub(crate) fn take_snapshot(&self) -> Vec<InputEvent> {
        self.lock().drain(..).collect()
    }

    fn lock(&self) -> MutexGuard<'_, VecDeque<InputEvent>> {
        self.queue.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

pub struct InputHandler {
    sink: InputSink,
    layers: Vec<InputLayer>,
    active: bool,
}

impl InputHandler {
    pub fn new() -> Self {
        Self {
            sink: InputSink::new(),
            layers: Vec::new(),
            active: true,
        }
    }

    /// A producer handle for this handler's queue.
    pub fn sink(&self) -> InputSink {
        self.sink.clone()
    }

    pub fn add_layer(&mut self, layer: InputLayer) {
        self.layers.push(layer);
    }

    pub fn with_layer(mut self, layer: InputLayer) -> Self {
        self.add_layer(layer);
        self
    }

    pub fn layer_mut(&mut self, name: &str) -> Option<&mut InputLayer> {
        self.layers.iter_mut().find(|l| l.name() == name)
    }

    pub fn remove_layer(&mut self, name: &str) -> Option<InputLayer> {
        let at = self.layers.iter().position(|l| l.name() == name)?;
        Some(self.layers.remove(at))
    }

    pub fn set_active(&mut self, active: bool) {
        self.active = active;
    }

    /// Dispatch the events queued so far. Returns how many were delivered.
    ///
    /// Layers are re-sorted by descending priority first (ties keep insertion
    /// order), so priority changes apply on the next tick.
    pub fn process_pending(&mut self) -> usize {
        self.layers.sort_by(|a, b| b.priority().cmp(&a.priority()));

        let batch = self.sink.take_snapshot();
        let total = batch.len();
        for (i, event) in batch.iter().enumerate() {
            if self.dispatch(event) == Propagation::Flush {
                trace!(dropped = total - i - 1, "input flushed");
                return i + 1;
            }
        }
        total
    }

    fn dispatch(&mut self, event: &InputEvent) -> Propagation {
        for layer in self.layers.iter_mut().filter(|l| l.is_active()) {
            match layer.dispatch(event) {
                Propagation::Continue => {}
                other => return other,
            }
        }
        Propagation::Continue
    }
}

impl Default for InputHandler {
    fn default() -> Self {
        Self::new()
    }
}

impl Updatable for InputHandler {
    fn is_active(&self) -> bool {
        self.active
    }

    fn update(&mut self, _time: &FrameTime) {
        self.process_pending();
    }
}
