//! End-to-end input: scripted keys through the controller thread into a
//! handler with prioritized layers, drained by the update loop.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{mpsc, Arc, Mutex};
use std::thread;
use std::time::{Duration, Instant};

use crossterm::event::{KeyCode, KeyEvent, KeyEventKind, KeyEventState, KeyModifiers};
use tui_canvas::engine::{Scheduler, SchedulerConfig};
use tui_canvas::input::{
    DispatchMode, DispatchModes, InputConfig, InputController, InputEvent, InputHandler,
    InputLayer, InputReceiver, InputSink, Propagation,
};

type Log = Arc<Mutex<Vec<(String, char, DispatchMode)>>>;

struct Recorder {
    name: String,
    log: Log,
    modes: DispatchModes,
    quit_on: Option<char>,
    flush_on: Option<char>,
}

impl Recorder {
    fn new(name: &str, log: &Log) -> Self {
        Self {
            name: name.to_string(),
            log: Arc::clone(log),
            modes: DispatchModes::EDGE,
            quit_on: None,
            flush_on: None,
        }
    }
}

impl InputReceiver for Recorder {
    fn modes(&self) -> DispatchModes {
        self.modes
    }

    fn load_event(&mut self, event: &InputEvent) -> Propagation {
        let KeyCode::Char(c) = event.code() else {
            return Propagation::Continue;
        };
        self.log
            .lock()
            .unwrap()
            .push((self.name.clone(), c, event.mode()));
        if self.quit_on == Some(c) {
            Propagation::Quit
        } else if self.flush_on == Some(c) {
            Propagation::Flush
        } else {
            Propagation::Continue
        }
    }
}

fn press(c: char) -> KeyEvent {
    KeyEvent::from(KeyCode::Char(c))
}

fn edge(c: char) -> InputEvent {
    InputEvent::new(press(c), DispatchMode::Edge)
}

fn names(log: &Log) -> Vec<(String, char)> {
    log.lock()
        .unwrap()
        .iter()
        .map(|(n, c, _)| (n.clone(), *c))
        .collect()
}

fn entry(name: &str, c: char) -> (String, char) {
    (name.to_string(), c)
}

fn wait_for(cond: impl Fn() -> bool) -> bool {
    let deadline = Instant::now() + Duration::from_secs(3);
    while !cond() {
        if Instant::now() > deadline {
            return false;
        }
        thread::sleep(Duration::from_millis(2));
    }
    true
}

#[test]
fn single_event_reaches_layers_in_priority_order() {
    let log: Log = Arc::default();
    let mut handler = InputHandler::new();
    for (name, priority) in [("two", 2), ("zero", 0), ("one", 1)] {
        handler.add_layer(InputLayer::new(name, priority).with_receiver(Recorder::new(name, &log)));
    }

    handler.sink().push(edge('x'));
    assert_eq!(handler.process_pending(), 1);
    assert_eq!(
        names(&log),
        [entry("two", 'x'), entry("one", 'x'), entry("zero", 'x')]
    );
}

#[test]
fn quit_hides_the_event_from_lower_layers_but_not_the_next_event() {
    let log: Log = Arc::default();
    let mut quitter = Recorder::new("one", &log);
    quitter.quit_on = Some('q');

    let mut handler = InputHandler::new()
        .with_layer(InputLayer::new("zero", 0).with_receiver(Recorder::new("zero", &log)))
        .with_layer(InputLayer::new("one", 1).with_receiver(quitter))
        .with_layer(InputLayer::new("two", 2).with_receiver(Recorder::new("two", &log)));

    let sink = handler.sink();
    sink.push(edge('q'));
    sink.push(edge('n'));
    handler.process_pending();

    assert_eq!(
        names(&log),
        [
            entry("two", 'q'),
            entry("one", 'q'),
            entry("two", 'n'),
            entry("one", 'n'),
            entry("zero", 'n'),
        ]
    );
}

#[test]
fn quit_also_skips_later_receivers_in_the_same_layer() {
    let log: Log = Arc::default();
    let mut first = Recorder::new("first", &log);
    first.quit_on = Some('q');
    let mut layer = InputLayer::new("shared", 0).with_receiver(first);
    layer.push(Recorder::new("second", &log));
    let mut handler = InputHandler::new().with_layer(layer);

    handler.sink().push(edge('q'));
    handler.sink().push(edge('w'));
    handler.process_pending();
    assert_eq!(
        names(&log),
        [entry("first", 'q'), entry("first", 'w'), entry("second", 'w')]
    );
}

#[test]
fn flush_drops_the_rest_of_the_tick() {
    let log: Log = Arc::default();
    let mut flusher = Recorder::new("top", &log);
    flusher.flush_on = Some('f');
    let mut handler = InputHandler::new()
        .with_layer(InputLayer::new("top", 1).with_receiver(flusher))
        .with_layer(InputLayer::new("bottom", 0).with_receiver(Recorder::new("bottom", &log)));

    let sink = handler.sink();
    for c in ['a', 'f', 'b', 'c'] {
        sink.push(edge(c));
    }
    assert_eq!(handler.process_pending(), 2);
    assert!(sink.is_empty());
    assert_eq!(
        names(&log),
        [entry("top", 'a'), entry("bottom", 'a'), entry("top", 'f')]
    );
}

#[test]
fn receivers_only_see_modes_they_accept() {
    let log: Log = Arc::default();
    let mut streamer = Recorder::new("stream", &log);
    streamer.modes = DispatchModes::STREAM;
    let mut both = Recorder::new("both", &log);
    both.modes = DispatchModes::EDGE | DispatchModes::STREAM;

    let mut layer = InputLayer::new("all", 0).with_receiver(Recorder::new("edge", &log));
    layer.push(streamer);
    layer.push(both);
    let mut handler = InputHandler::new().with_layer(layer);

    handler.sink().push(edge('k'));
    handler
        .sink()
        .push(InputEvent::new(press('k'), DispatchMode::Stream));
    handler.process_pending();

    let seen: Vec<_> = log
        .lock()
        .unwrap()
        .iter()
        .map(|(n, _, m)| (n.clone(), *m))
        .collect();
    assert_eq!(
        seen,
        [
            ("edge".to_string(), DispatchMode::Edge),
            ("both".to_string(), DispatchMode::Edge),
            ("stream".to_string(), DispatchMode::Stream),
            ("both".to_string(), DispatchMode::Stream),
        ]
    );
}

#[test]
fn controller_feeds_handlers_through_the_update_loop() {
    let log: Log = Arc::default();
    let handler = InputHandler::new()
        .with_layer(InputLayer::new("game", 0).with_receiver(Recorder::new("game", &log)));
    let other = InputSink::new();

    let mut controller = InputController::new(InputConfig::default());
    controller.subscribe(handler.sink());
    controller.subscribe(other.clone());

    let mut scheduler = Scheduler::new(SchedulerConfig::default().with_frame_rate(200));
    scheduler.add_updatable("input", 0, handler).unwrap();
    scheduler.start().unwrap();

    let (keys, source) = mpsc::channel();
    controller.start(source).unwrap();
    for c in ['a', 'b', 'c'] {
        keys.send(press(c)).unwrap();
    }

    assert!(wait_for(|| log.lock().unwrap().len() == 3));
    // Every subscriber gets its own copy: an edge and a stream event per key.
    assert!(wait_for(|| other.len() == 6));

    drop(keys);
    controller.join();
    scheduler.stop_and_join();
    assert_eq!(names(&log), [entry("game", 'a'), entry("game", 'b'), entry("game", 'c')]);
}

fn with_kind(c: char, kind: KeyEventKind) -> KeyEvent {
    KeyEvent {
        code: KeyCode::Char(c),
        modifiers: KeyModifiers::NONE,
        kind,
        state: KeyEventState::NONE,
    }
}

#[test]
fn a_hold_is_one_edge_and_each_tap_is_another() {
    let count = Arc::new(AtomicUsize::new(0));

    struct Edges(Arc<AtomicUsize>);
    impl InputReceiver for Edges {
        fn load_event(&mut self, _event: &InputEvent) -> Propagation {
            self.0.fetch_add(1, Ordering::SeqCst);
            Propagation::Continue
        }
    }

    let mut handler =
        InputHandler::new().with_layer(InputLayer::new("edges", 0).with_receiver(Edges(Arc::clone(&count))));
    let config = InputConfig {
        key_release_timeout: Duration::from_secs(5),
        ..InputConfig::default()
    };
    let mut controller = InputController::new(config);
    controller.subscribe(handler.sink());

    let (keys, source) = mpsc::channel();
    controller.start(source).unwrap();
    // One hold: press, repeats, release.
    keys.send(press('z')).unwrap();
    keys.send(with_kind('z', KeyEventKind::Repeat)).unwrap();
    keys.send(with_kind('z', KeyEventKind::Repeat)).unwrap();
    keys.send(press('z')).unwrap();
    keys.send(with_kind('z', KeyEventKind::Release)).unwrap();
    // Two quick taps.
    keys.send(press('z')).unwrap();
    keys.send(press('z')).unwrap();
    drop(keys);
    controller.join();

    handler.process_pending();
    assert_eq!(count.load(Ordering::SeqCst), 3);
}
