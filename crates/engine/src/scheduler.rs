//! Scheduler: owns the update thread and the registered scenes/updatables.
//!
//! Registries sit behind one mutex that is only held briefly. An update pass
//! checks the entries out, so entries can be added or removed from any
//! thread while running, including from inside an update.

use std::sync::atomic::{AtomicBool, AtomicU32, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use tracing::{debug, info};

use crate::config::{PriorityMode, SchedulerConfig};
use crate::error::SchedulerError;
use crate::pacer::FramePacer;

/// Timing handed to every update call.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct FrameTime {
    /// Index of this update pass, starting at 0.
    pub frame: u64,
    /// Time since the previous iteration started.
    pub delta: Duration,
    /// Work time of the previous iteration, without the cap wait.
    pub real_delta: Duration,
    /// Most recent rolling FPS sample.
    pub fps: f64,
}

/// Published loop statistics.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct FrameStats {
    pub frames: u64,
    pub delta: Duration,
    pub real_delta: Duration,
    pub fps: f64,
}

pub trait Updatable {
    fn is_active(&self) -> bool {
        true
    }

    fn update(&mut self, time: &FrameTime);
}

pub trait Scene: Updatable {
    /// Called once per scheduler start, before the first update.
    fn start(&mut self) {}
}

struct Entry<T: ?Sized> {
    name: String,
    priority: i32,
    item: Box<T>,
}

/// Where a new priority lands: descending order, equal priorities keep
/// insertion order.
fn sorted_position(mut priorities: impl Iterator<Item = i32>, priority: i32) -> Option<usize> {
    priorities.position(|p| p < priority)
}

fn insert_sorted<T: ?Sized>(list: &mut Vec<Entry<T>>, entry: Entry<T>) {
    let at = sorted_position(list.iter().map(|e| e.priority), entry.priority).unwrap_or(list.len());
    list.insert(at, entry);
}

fn remove_named<T: ?Sized>(list: &mut Vec<Entry<T>>, name: &str) -> bool {
    let before = list.len();
    list.retain(|e| e.name != name);
    list.len() != before
}

/// The boxed scenes and updatables, in update order.
#[derive(Default)]
struct Entries {
    scenes: Vec<Entry<dyn Scene + Send>>,
    updatables: Vec<Entry<dyn Updatable + Send>>,
}

impl Entries {
    fn update(&mut self, mode: PriorityMode, time: &FrameTime) {
        match mode {
            PriorityMode::ScenesFirst => {
                self.update_scenes(time);
                self.update_updatables(time);
            }
            PriorityMode::UpdatablesFirst => {
                self.update_updatables(time);
                self.update_scenes(time);
            }
        }
    }

    fn update_scenes(&mut self, time: &FrameTime) {
        for e in self.scenes.iter_mut().filter(|e| e.item.is_active()) {
            e.item.update(time);
        }
    }

    fn update_updatables(&mut self, time: &FrameTime) {
        for e in self.updatables.iter_mut().filter(|e| e.item.is_active()) {
            e.item.update(time);
        }
    }

    fn start_scenes(&mut self) {
        for e in self.scenes.iter_mut().filter(|e| e.item.is_active()) {
            e.item.start();
        }
    }

    fn apply(&mut self, change: Change) {
        match change {
            Change::AddScene(entry) => insert_sorted(&mut self.scenes, entry),
            Change::AddUpdatable(entry) => insert_sorted(&mut self.updatables, entry),
            Change::RemoveScene(name) => {
                remove_named(&mut self.scenes, &name);
            }
            Change::RemoveUpdatable(name) => {
                remove_named(&mut self.updatables, &name);
            }
        }
    }
}

/// A registration made while a pass had the entries checked out.
enum Change {
    AddScene(Entry<dyn Scene + Send>),
    AddUpdatable(Entry<dyn Updatable + Send>),
    RemoveScene(String),
    RemoveUpdatable(String),
}

/// Name and priority of a registered entry.
struct Slot {
    name: String,
    priority: i32,
}

/// Reserve `name` at its priority position, or report it as taken.
fn claim(slots: &mut Vec<Slot>, name: &str, priority: i32) -> Result<(), SchedulerError> {
    if slots.iter().any(|s| s.name == name) {
        return Err(SchedulerError::DuplicateName(name.to_string()));
    }
    let at = sorted_position(slots.iter().map(|s| s.priority), priority).unwrap_or(slots.len());
    slots.insert(
        at,
        Slot {
            name: name.to_string(),
            priority,
        },
    );
    Ok(())
}

fn release(slots: &mut Vec<Slot>, name: &str) -> bool {
    let before = slots.len();
    slots.retain(|s| s.name != name);
    slots.len() != before
}

/// Names are always current. Entries are checked out for the length of a
/// pass; changes made meanwhile wait in `pending` until it ends.
#[derive(Default)]
struct Registry {
    entries: Entries,
    scene_names: Vec<Slot>,
    updatable_names: Vec<Slot>,
    in_pass: bool,
    pending: Vec<Change>,
}

impl Registry {
    fn add_scene(&mut self, entry: Entry<dyn Scene + Send>) -> Result<(), SchedulerError> {
        claim(&mut self.scene_names, &entry.name, entry.priority)?;
        self.change(Change::AddScene(entry));
        Ok(())
    }

    fn add_updatable(&mut self, entry: Entry<dyn Updatable + Send>) -> Result<(), SchedulerError> {
        claim(&mut self.updatable_names, &entry.name, entry.priority)?;
        self.change(Change::AddUpdatable(entry));
        Ok(())
    }

    fn remove_scene(&mut self, name: &str) -> bool {
        let removed = release(&mut self.scene_names, name);
        if removed {
            self.change(Change::RemoveScene(name.to_string()));
        }
        removed
    }

    fn remove_updatable(&mut self, name: &str) -> bool {
        let removed = release(&mut self.updatable_names, name);
        if removed {
            self.change(Change::RemoveUpdatable(name.to_string()));
        }
        removed
    }

    fn change(&mut self, change: Change) {
        if self.in_pass {
            self.pending.push(change);
        } else {
            self.entries.apply(change);
        }
    }
}

/// Entries checked out of the registry. Dropping it hands them back and
/// applies the queued changes, also when an update panicked.
struct Pass<'a> {
    registry: &'a Mutex<Registry>,
    entries: Entries,
}

impl Drop for Pass<'_> {
    fn drop(&mut self) {
        let mut reg = lock(self.registry);
        let reg = &mut *reg;
        reg.entries = std::mem::take(&mut self.entries);
        reg.in_pass = false;
        if !reg.pending.is_empty() {
            debug!(changes = reg.pending.len(), "applying registrations made during the pass");
        }
        for change in reg.pending.drain(..) {
            reg.entries.apply(change);
        }
    }
}

struct Shared {
    registry: Mutex<Registry>,
    /// Serializes passes; registration only takes `registry`.
    pass: Mutex<()>,
    running: AtomicBool,
    paused: AtomicBool,
    updatables_first: AtomicBool,
    frame_rate: AtomicU32,
    stats: Mutex<FrameStats>,
}

fn lock<T>(m: &Mutex<T>) -> MutexGuard<'_, T> {
    m.lock().unwrap_or_else(PoisonError::into_inner)
}

impl Shared {
    fn priority(&self) -> PriorityMode {
        if self.updatables_first.load(Ordering::Relaxed) {
            PriorityMode::UpdatablesFirst
        } else {
            PriorityMode::ScenesFirst
        }
    }

    /// Run `f` over the entries without holding the registry lock, so
    /// updates may add or remove entries themselves.
    fn with_entries(&self, f: impl FnOnce(&mut Entries)) {
        let _serial = lock(&self.pass);
        let mut pass = {
            let mut reg = lock(&self.registry);
            reg.in_pass = true;
            Pass {
                registry: &self.registry,
                entries: std::mem::take(&mut reg.entries),
            }
        };
        f(&mut pass.entries);
    }
}

/// Drives registered scenes and updatables from a dedicated thread.
///
/// The scheduler is an explicit context object: create as many as needed,
/// start and stop them independently. A stopped scheduler can be started
/// again.
pub struct Scheduler {
    config: SchedulerConfig,
    shared: Arc<Shared>,
    handle: Option<JoinHandle<()>>,
}

impl Scheduler {
    pub fn new(config: SchedulerConfig) -> Self {
        let shared = Arc::new(Shared {
            registry: Mutex::new(Registry::default()),
            pass: Mutex::new(()),
            running: AtomicBool::new(false),
            paused: AtomicBool::new(false),
            updatables_first: AtomicBool::new(config.priority == PriorityMode::UpdatablesFirst),
            frame_rate: AtomicU32::new(config.frame_rate),
            stats: Mutex::new(FrameStats::default()),
        });
        Self {
            config,
            shared,
            handle: None,
        }
    }

    pub fn add_scene(
        &self,
        name: impl Into<String>,
        priority: i32,
        scene: impl Scene + Send + 'static,
    ) -> Result<(), SchedulerError> {
        let entry = Entry {
            name: name.into(),
            priority,
            item: Box::new(scene) as Box<dyn Scene + Send>,
        };
        lock(&self.shared.registry).add_scene(entry)
    }

    pub fn add_updatable(
        &self,
        name: impl Into<String>,
        priority: i32,
        updatable: impl Updatable + Send + 'static,
    ) -> Result<(), SchedulerError> {
        let entry = Entry {
            name: name.into(),
            priority,
            item: Box::new(updatable) as Box<dyn Updatable + Send>,
        };
        lock(&self.shared.registry).add_updatable(entry)
    }

    pub fn remove_scene(&self, name: &str) -> bool {
        lock(&self.shared.registry).remove_scene(name)
    }

    pub fn remove_updatable(&self, name: &str) -> bool {
        lock(&self.shared.registry).remove_updatable(name)
    }

    /// Registered names in update order: scenes, then updatables.
    ///
    /// Changes made during an update show up here at once and take part
    /// in updates from the next pass on.
    pub fn names(&self) -> (Vec<String>, Vec<String>) {
        let reg = lock(&self.shared.registry);
        (
            reg.scene_names.iter().map(|s| s.name.clone()).collect(),
            reg.updatable_names.iter().map(|s| s.name.clone()).collect(),
        )
    }

    pub fn is_running(&self) -> bool {
        self.shared.running.load(Ordering::SeqCst)
    }

    pub fn is_paused(&self) -> bool {
        self.shared.paused.load(Ordering::SeqCst)
    }

    /// While paused the loop keeps pacing but skips updates.
    pub fn set_paused(&self, paused: bool) {
        self.shared.paused.store(paused, Ordering::SeqCst);
    }

    pub fn priority(&self) -> PriorityMode {
        self.shared.priority()
    }

    pub fn set_priority(&self, mode: PriorityMode) {
        self.shared
            .updatables_first
            .store(mode == PriorityMode::UpdatablesFirst, Ordering::Relaxed);
    }

    /// Takes effect from the next iteration; 0 means uncapped.
    pub fn set_frame_rate(&self, frame_rate: u32) {
        self.shared.frame_rate.store(frame_rate, Ordering::Relaxed);
    }

    pub fn stats(&self) -> FrameStats {
        *lock(&self.shared.stats)
    }

    /// Run one update pass on the calling thread.
    pub fn step(&self, time: &FrameTime) {
        let mode = self.shared.priority();
        self.shared.with_entries(|entries| entries.update(mode, time));
    }

    /// Start active scenes, then launch the update thread.
    pub fn start(&mut self) -> Result<(), SchedulerError> {
        if self.is_running() {
            return Err(SchedulerError::AlreadyRunning);
        }
        self.join();

        self.shared.with_entries(Entries::start_scenes);

        self.shared.running.store(true, Ordering::SeqCst);
        *lock(&self.shared.stats) = FrameStats::default();
        let shared = Arc::clone(&self.shared);
        let config = self.config.clone();
        let spawned = thread::Builder::new()
            .name(self.config.thread_name.clone())
            .spawn(move || run_loop(shared, config));

        match spawned {
            Ok(handle) => {
                self.handle = Some(handle);
                info!(
                    frame_rate = self.shared.frame_rate.load(Ordering::Relaxed),
                    "scheduler started"
                );
                Ok(())
            }
            Err(e) => {
                self.shared.running.store(false, Ordering::SeqCst);
                Err(SchedulerError::Spawn(e))
            }
        }
    }

    /// Ask the loop to exit after the current iteration.
    pub fn stop(&self) {
        self.shared.running.store(false, Ordering::SeqCst);
    }

    /// Wait for the update thread to finish.
    pub fn join(&mut self) {
        if let Some(handle) = self.handle.take() {
            if handle.join().is_err() {
                debug!("update thread panicked");
            }
        }
    }

    pub fn stop_and_join(&mut self) {
        self.stop();
        self.join();
    }
}

impl Default for Scheduler {
    fn default() -> Self {
        Self::new(SchedulerConfig::default())
    }
}

impl Drop for Scheduler {
    fn drop(&mut self) {
        self.stop_and_join();
    }
}

fn run_loop(shared: Arc<Shared>, config: SchedulerConfig) {
    debug!("update thread started");
    let mut rate = shared.frame_rate.load(Ordering::Relaxed);
    let mut pacer = FramePacer::new(rate, config.pacing);

    let mut frame = 0u64;
    let mut fps = 0.0;
    let mut real_delta = Duration::ZERO;
    let mut last_start = Instant::now();
    let mut sample_start = last_start;
    let mut sample_frames = 0u32;

    while shared.running.load(Ordering::SeqCst) {
        let start = Instant::now();
        let delta = start - last_start;
        last_start = start;

        let wanted = shared.frame_rate.load(Ordering::Relaxed);
        if wanted != rate {
            rate = wanted;
            pacer.set_frame_rate(rate);
        }

        if !shared.paused.load(Ordering::SeqCst) {
            let time = FrameTime {
                frame,
                delta,
                real_delta,
                fps,
            };
            let mode = shared.priority();
            shared.with_entries(|entries| entries.update(mode, &time));
            frame += 1;
        }

        sample_frames += 1;
        let window = start.duration_since(sample_start);
        if window >= config.fps_sample {
            fps = f64::from(sample_frames) / window.as_secs_f64();
            sample_start = start;
            sample_frames = 0;
        }

        real_delta = start.elapsed();
        *lock(&shared.stats) = FrameStats {
            frames: frame,
            delta,
            real_delta,
            fps,
        };

        pacer.wait(start);
    }
    debug!(frames = frame, "update thread stopped");
}
