//! tui-canvas runner (default binary).
//!
//! A small scene wired end to end: a bouncing sprite on a backdrop with a
//! status line, drawn by the configured backend from the update thread while
//! the input thread feeds key presses through an input layer.
//!
//! Keys: arrows / `hjkl` / `wasd` nudge the sprite, `space` pauses the motion,
//! `q`, `Esc` or Ctrl-C quit.

use std::fs::File;
use std::io;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{mpsc, Arc, Mutex};
use std::thread;
use std::time::Duration;

use anyhow::{Context, Result};
use crossterm::event::KeyCode;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use tui_canvas::core::{Compositor, Grid, Pixel, Sprite};
use tui_canvas::engine::{FrameTime, Scene, Scheduler, SchedulerConfig, Updatable};
use tui_canvas::input::{
    direction, should_quit, CrosstermKeys, InputConfig, InputController, InputEvent, InputHandler,
    InputLayer, InputReceiver, Propagation,
};
use tui_canvas::term::{BackendKind, CrosstermTarget, RenderBackend, RenderEngine, TerminalSession};
use tui_canvas::types::{Anchor, Color, ColorSet, IntVector};

const FALLBACK_SIZE: IntVector = IntVector::new(80, 24);

fn main() -> Result<()> {
    init_logging()?;

    let mut session = TerminalSession::new();
    session.enter()?;
    if let Some((columns, rows)) = requested_window() {
        session.try_resize(columns, rows);
    }

    let result = run();

    // Always try to restore terminal state.
    let _ = session.exit();
    result
}

/// Logs go to the file named by `TUI_CANVAS_LOG`; stdout belongs to the canvas.
fn init_logging() -> Result<()> {
    let Some(path) = std::env::var("TUI_CANVAS_LOG")
        .ok()
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
    else {
        return Ok(());
    };
    let file = File::create(&path).with_context(|| format!("creating log file {path}"))?;
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with(
            tracing_subscriber::fmt::layer()
                .with_ansi(false)
                .with_writer(Mutex::new(file)),
        )
        .init();
    Ok(())
}

/// `TUI_CANVAS_WINDOW=COLSxROWS` asks the terminal to resize.
fn requested_window() -> Option<(u16, u16)> {
    let value = std::env::var("TUI_CANVAS_WINDOW").ok()?;
    let (cols, rows) = value.trim().split_once(|c: char| c == 'x' || c == 'X')?;
    Some((cols.parse().ok()?, rows.parse().ok()?))
}

fn run() -> Result<()> {
    let quit = Arc::new(AtomicBool::new(false));
    let (commands, command_rx) = mpsc::channel();

    let backend = RenderBackend::select(BackendKind::from_env(), CrosstermTarget::stdout())?;
    info!(backend = backend.name(), "render backend ready");
    let demo = Demo::new(backend, command_rx, Arc::clone(&quit))?;

    let mut handler = InputHandler::new();
    handler.add_layer(InputLayer::new("demo", 0).with_receiver(DemoKeys {
        commands,
        quit: Arc::clone(&quit),
    }));

    let mut controller = InputController::new(InputConfig::from_env());
    controller.subscribe(handler.sink());

    let mut scheduler = Scheduler::new(SchedulerConfig::from_env());
    scheduler.add_updatable("input", 0, handler)?;
    scheduler.add_scene("demo", 0, demo)?;

    scheduler.start()?;
    controller.start(CrosstermKeys)?;

    while !quit.load(Ordering::SeqCst) {
        thread::sleep(Duration::from_millis(20));
    }

    scheduler.stop_and_join();
    controller.stop();
    let stats = scheduler.stats();
    info!(frames = stats.frames, fps = stats.fps, "stopped");
    Ok(())
}

enum Command {
    Nudge(IntVector),
    TogglePause,
}

struct DemoKeys {
    commands: mpsc::Sender<Command>,
    quit: Arc<AtomicBool>,
}

impl InputReceiver for DemoKeys {
    fn load_event(&mut self, event: &InputEvent) -> Propagation {
        let key = event.key();
        if should_quit(key) {
            self.quit.store(true, Ordering::SeqCst);
            return Propagation::Flush;
        }
        let command = match (direction(key), key.code) {
            (Some(step), _) => Command::Nudge(step),
            (None, KeyCode::Char(' ')) => Command::TogglePause,
            _ => return Propagation::Continue,
        };
        if self.commands.send(command).is_err() {
            self.quit.store(true, Ordering::SeqCst);
        }
        Propagation::Quit
    }
}

struct Demo {
    compositor: Compositor,
    backend: RenderBackend<CrosstermTarget<io::Stdout>>,
    backdrop: Sprite,
    ball: Sprite,
    status: Sprite,
    position: (f64, f64),
    velocity: (f64, f64),
    moving: bool,
    commands: mpsc::Receiver<Command>,
    quit: Arc<AtomicBool>,
}

impl Demo {
    fn new(
        backend: RenderBackend<CrosstermTarget<io::Stdout>>,
        commands: mpsc::Receiver<Command>,
        quit: Arc<AtomicBool>,
    ) -> Result<Self> {
        let size = backend.viewport_size().unwrap_or(FALLBACK_SIZE);
        let compositor = Compositor::new(size.x, size.y)?;

        let mut ball = Sprite::empty(3, 1).with_layer(2);
        ball.grid
            .put_str(0, 0, "(o)", ColorSet::new(Color::Yellow, Color::Transparent))?;

        let status = Sprite::empty(size.x.max(1) as usize, 1)
            .with_layer(3)
            .with_anchor(Anchor::BOTTOM_LEFT);

        Ok(Self {
            compositor,
            backend,
            backdrop: backdrop(size),
            ball,
            status,
            position: (1.0, 1.0),
            velocity: (18.0, 7.0),
            moving: true,
            commands,
            quit,
        })
    }

    fn apply_commands(&mut self) {
        while let Ok(command) = self.commands.try_recv() {
            match command {
                Command::Nudge(step) => {
                    self.position.0 += f64::from(step.x);
                    self.position.1 += f64::from(step.y);
                }
                Command::TogglePause => self.moving = !self.moving,
            }
        }
    }

    fn follow_viewport(&mut self) -> Result<()> {
        let size = self.backend.viewport_size().unwrap_or(FALLBACK_SIZE);
        if size != self.compositor.size() && size.x > 0 && size.y > 0 {
            self.compositor.resize(size)?;
            self.backdrop = backdrop(size);
            self.status.grid = Grid::new(size.x as usize, 1);
        }
        Ok(())
    }

    fn step(&mut self, dt: f64) {
        let size = self.compositor.size();
        let max_x = f64::from((size.x - self.ball.grid.width() as i32).max(0));
        let max_y = f64::from((size.y - 2).max(0));

        if self.moving {
            self.position.0 += self.velocity.0 * dt;
            self.position.1 += self.velocity.1 * dt;
        }
        if self.position.0 <= 0.0 {
            self.velocity.0 = self.velocity.0.abs();
        } else if self.position.0 >= max_x {
            self.velocity.0 = -self.velocity.0.abs();
        }
        if self.position.1 <= 0.0 {
            self.velocity.1 = self.velocity.1.abs();
        } else if self.position.1 >= max_y {
            self.velocity.1 = -self.velocity.1.abs();
        }
        self.position.0 = self.position.0.clamp(0.0, max_x);
        self.position.1 = self.position.1.clamp(0.0, max_y);
        self.ball.offset = IntVector::new(self.position.0 as i32, self.position.1 as i32);
    }

    fn frame(&mut self, time: &FrameTime) -> Result<()> {
        self.apply_commands();
        self.follow_viewport()?;
        self.step(time.delta.as_secs_f64());
        self.draw(time)
    }

    fn draw(&mut self, time: &FrameTime) -> Result<()> {
        let text = format!(
            " {} | frame {} | {:.1} fps | work {:.2} ms ",
            self.backend.name(),
            time.frame,
            time.fps,
            time.real_delta.as_secs_f64() * 1000.0
        );
        self.status.grid.fill(Pixel::TRANSPARENT);
        self.status
            .grid
            .put_str(0, 0, &text, ColorSet::new(Color::Black, Color::Gray))?;

        let frame = self
            .compositor
            .render([&self.backdrop, &self.ball, &self.status])?;
        self.backend.render(frame, IntVector::ZERO)?;
        Ok(())
    }
}

fn backdrop(size: IntVector) -> Sprite {
    let plain = Pixel::blank(Color::DarkBlue);
    let dot = Pixel::new('.', Color::Blue, Color::DarkBlue).unwrap_or(plain);
    let grid = Grid::from_fn(size.x as usize, size.y as usize, |x, y| {
        if (x + y) % 8 == 0 {
            dot
        } else {
            plain
        }
    });
    Sprite::new(grid)
}

impl Updatable for Demo {
    fn update(&mut self, time: &FrameTime) {
        if let Err(e) = self.frame(time) {
            warn!(error = %e, "frame failed, quitting");
            self.quit.store(true, Ordering::SeqCst);
        }
    }
}

impl Scene for Demo {
    fn start(&mut self) {
        if let Err(e) = self.follow_viewport() {
            warn!(error = %e, "viewport unavailable");
        }
    }
}
