//! InputController: a dedicated thread reading one key at a time.
//!
//! Every key read is turned into events by an [`EdgeDetector`] and pushed to
//! each subscribed [`InputSink`]. Stopping is cooperative: a thread blocked in
//! a read only notices after that read returns, and then discards the key.

use std::io;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::thread::{self, JoinHandle};

use crossterm::event::{self, Event, KeyEvent};
use tracing::{debug, error};

use crate::error::InputError;
use crate::event::{EdgeDetector, InputConfig};
use crate::handler::InputSink;

/// A blocking source of key events.
pub trait KeySource: Send + 'static {
    /// Block until the next input. `Ok(None)` means a non-key event was read.
    /// An `UnexpectedEof` error ends the input thread quietly.
    fn read_key(&mut self) -> io::Result<Option<KeyEvent>>;
}

/// Keys from the terminal through crossterm.
#[derive(Debug, Default, Clone, Copy)]
pub struct CrosstermKeys;

impl KeySource for CrosstermKeys {
    fn read_key(&mut self) -> io::Result<Option<KeyEvent>> {
        match event::read()? {
            Event::Key(key) => Ok(Some(key)),
            _ => Ok(None),
        }
    }
}

/// Scripted keys; the thread ends when every sender is dropped.
impl KeySource for mpsc::Receiver<KeyEvent> {
    fn read_key(&mut self) -> io::Result<Option<KeyEvent>> {
        self.recv()
            .map(Some)
            .map_err(|_| io::Error::new(io::ErrorKind::UnexpectedEof, "key channel closed"))
    }
}

type Subscribers = Arc<Mutex<Vec<InputSink>>>;

fn lock(subs: &Subscribers) -> MutexGuard<'_, Vec<InputSink>> {
    subs.lock().unwrap_or_else(PoisonError::into_inner)
}

pub struct InputController {
    config: InputConfig,
    subscribers: Subscribers,
    running: Arc<AtomicBool>,
    handle: Option<JoinHandle<()>>,
}

impl InputController {
    pub fn new(config: InputConfig) -> Self {
        Self {
            config,
            subscribers: Arc::default(),
            running: Arc::new(AtomicBool::new(false)),
            handle: None,
        }
    }

    pub fn subscribe(&self, sink: InputSink) {
        let mut subs = lock(&self.subscribers);
        if !subs.iter().any(|s| s.same_queue(&sink)) {
            subs.push(sink);
        }
    }

    pub fn unsubscribe(&self, sink: &InputSink) -> bool {
        let mut subs = lock(&self.subscribers);
        let before = subs.len();
        subs.retain(|s| !s.same_queue(sink));
        subs.len() != before
    }

    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::SeqCst)
    }

    pub fn start(&mut self, source: impl KeySource) -> Result<(), InputError> {
        if self.is_running() {
            return Err(InputError::AlreadyRunning);
        }
        self.reap();

        // A fresh flag per run, so a thread left blocked by an earlier stop
        // cannot be revived by this start.
        let running = Arc::new(AtomicBool::new(true));
        let flag = Arc::clone(&running);
        let subscribers = Arc::clone(&self.subscribers);
        let edges = EdgeDetector::new(self.config.key_release_timeout);

        let handle = thread::Builder::new()
            .name(self.config.thread_name.clone())
            .spawn(move || read_loop(source, edges, flag, subscribers))
            .map_err(InputError::Spawn)?;

        self.running = running;
        self.handle = Some(handle);
        debug!("input thread started");
        Ok(())
    }

    /// Request the thread to stop. Takes effect once the current read returns.
    pub fn stop(&mut self) {
        self.running.store(false, Ordering::SeqCst);
        self.reap();
    }

    /// Wait for the thread. Blocks until the pending read returns.
    pub fn join(&mut self) {
        if let Some(handle) = self.handle.take() {
            if handle.join().is_err() {
                error!("input thread panicked");
            }
        }
    }

    fn reap(&mut self) {
        match self.handle.take() {
            Some(handle) if handle.is_finished() => {
                let _ = handle.join();
            }
            Some(_) => debug!("input thread still blocked in a read, detaching"),
            None => {}
        }
    }
}

impl Default for InputController {
    fn default() -> Self {
        Self::new(InputConfig::default())
    }
}

impl Drop for InputController {
    fn drop(&mut self) {
        self.stop();
    }
}

fn read_loop(
    mut source: impl KeySource,
    mut edges: EdgeDetector,
    running: Arc<AtomicBool>,
    subscribers: Subscribers,
) {
    while running.load(Ordering::SeqCst) {
        let key = match source.read_key() {
            Ok(Some(key)) => key,
            Ok(None) => continue,
            Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
            Err(e) if e.kind() == io::ErrorKind::UnexpectedEof => {
                debug!("key source closed");
                break;
            }
            Err(e) => {
                error!(error = %e, "key source failed");
                break;
            }
        };
        if !running.load(Ordering::SeqCst) {
            break;
        }

        let events = edges.process(key);
        for sink in lock(&subscribers).iter() {
            for event in &events {
                sink.push(*event);
            }
        }
    }
    running.store(false, Ordering::SeqCst);
    debug!("input thread stopped");
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::event::DispatchMode;
    use crossterm::event::KeyCode;
    use std::time::{Duration, Instant};

    fn wait_for(cond: impl Fn() -> bool) {
        let deadline = Instant::now() + Duration::from_secs(2);
        while !cond() && Instant::now() < deadline {
            thread::sleep(Duration::from_millis(2));
        }
    }

    #[test]
    fn publishes_to_every_subscriber_in_order() {
        let (tx, rx) = mpsc::channel();
        let a = InputSink::new();
        let b = InputSink::new();
        let mut c = InputController::default();
        c.subscribe(a.clone());
        c.subscribe(b.clone());
        c.subscribe(a.clone());
        c.start(rx).unwrap();

        tx.send(KeyEvent::from(KeyCode::Char('1'))).unwrap();
        tx.send(KeyEvent::from(KeyCode::Char('2'))).unwrap();
        wait_for(|| b.len() == 4);
        assert_eq!(a.len(), 4);
        assert_eq!(b.len(), 4);

        drop(tx);
        c.join();
        assert!(!c.is_running());
    }

    #[test]
    fn start_twice_is_an_error_and_restart_works() {
        let (tx, rx) = mpsc::channel::<KeyEvent>();
        let mut c = InputController::default();
        c.start(rx).unwrap();
        let (_tx2, rx2) = mpsc::channel::<KeyEvent>();
        assert!(matches!(c.start(rx2), Err(InputError::AlreadyRunning)));

        drop(tx);
        c.join();

        let sink = InputSink::new();
        c.subscribe(sink.clone());
        let (tx3, rx3) = mpsc::channel();
        c.start(rx3).unwrap();
        tx3.send(KeyEvent::from(KeyCode::Esc)).unwrap();
        wait_for(|| sink.len() == 2);
        assert_eq!(sink.len(), 2);
        drop(tx3);
        c.join();
    }

    #[test]
    fn edge_then_stream_per_key() {
        let (tx, rx) = mpsc::channel();
        let sink = InputSink::new();
        let mut c = InputController::default();
        c.subscribe(sink.clone());
        c.start(rx).unwrap();
        tx.send(KeyEvent::from(KeyCode::Tab)).unwrap();
        drop(tx);
        c.join();

        let modes: Vec<_> = sink.take_snapshot().iter().map(|e| e.mode()).collect();
        assert_eq!(modes, [DispatchMode::Edge, DispatchMode::Stream]);
    }

    #[test]
    fn unsubscribe_by_queue() {
        let c = InputController::default();
        let s = InputSink::new();
        c.subscribe(s.clone());
        assert!(c.unsubscribe(&s));
        assert!(!c.unsubscribe(&s));
    }
}
