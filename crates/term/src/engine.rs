//! Render engine abstraction and backend selection.

use tracing::{debug, warn};

use crate::baseline::BaselineEngine;
use crate::core::{Grid, Pixel};
use crate::debug::DebugEngine;
use crate::diff::DiffEngine;
use crate::direct::DirectEngine;
use crate::error::BackendError;
use crate::target::ConsoleTarget;
use crate::types::IntVector;

/// Turns a composited frame into console output.
///
/// Engines borrow the frame for the duration of one call and never modify it.
pub trait RenderEngine {
    /// Draw `frame` with its top-left cell at console position `origin`.
    ///
    /// Cells falling outside the console are not drawn.
    fn render(&mut self, frame: &Grid<Pixel>, origin: IntVector) -> Result<(), BackendError>;

    /// Size of the area this engine can draw into, if known.
    fn viewport_size(&self) -> Option<IntVector> {
        None
    }
}

/// Requested backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BackendKind {
    /// Direct when a console is available, otherwise diff.
    #[default]
    Auto,
    Direct,
    Diff,
    Baseline,
    Debug,
}

impl BackendKind {
    pub fn from_str(s: &str) -> Option<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "auto" => Some(Self::Auto),
            "direct" => Some(Self::Direct),
            "diff" => Some(Self::Diff),
            "baseline" => Some(Self::Baseline),
            "debug" => Some(Self::Debug),
            _ => None,
        }
    }

    /// Read `TUI_CANVAS_BACKEND`, defaulting to [`BackendKind::Auto`].
    pub fn from_env() -> Self {
        match std::env::var("TUI_CANVAS_BACKEND") {
            Ok(v) => Self::from_str(&v).unwrap_or_else(|| {
                warn!(value = %v, "unknown TUI_CANVAS_BACKEND, using auto");
                Self::Auto
            }),
            Err(_) => Self::Auto,
        }
    }
}

/// The closed set of backends, selected once at startup.
pub enum RenderBackend<T: ConsoleTarget> {
    Direct(DirectEngine),
    Diff(DiffEngine<T>),
    Baseline(BaselineEngine<T>),
    Debug(DebugEngine<T>),
}

impl<T: ConsoleTarget> RenderBackend<T> {
    /// Build the backend for `kind`, drawing through `target` where a text
    /// backend is used.
    ///
    /// An explicit `Direct` request fails when no console is available;
    /// `Auto` falls back to the diff backend instead.
    pub fn select(kind: BackendKind, target: T) -> Result<Self, BackendError> {
        let backend = match kind {
            BackendKind::Direct => Self::Direct(DirectEngine::new()?),
            BackendKind::Diff => Self::Diff(DiffEngine::new(target)),
            BackendKind::Baseline => Self::Baseline(BaselineEngine::new(target)),
            BackendKind::Debug => Self::Debug(DebugEngine::new(target)),
            BackendKind::Auto => match DirectEngine::new() {
                Ok(engine) => Self::Direct(engine),
                Err(e) => {
                    warn!(error = %e, "direct backend unavailable, falling back to diff");
                    Self::Diff(DiffEngine::new(target))
                }
            },
        };
        debug!(backend = backend.name(), "selected render backend");
        Ok(backend)
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::Direct(_) => "direct",
            Self::Diff(_) => "diff",
            Self::Baseline(_) => "baseline",
            Self::Debug(_) => "debug",
        }
    }

    /// The text target, unless the direct backend is in use.
    pub fn target(&self) -> Option<&T> {
        match self {
            Self::Direct(_) => None,
            Self::Diff(e) => Some(e.target()),
            Self::Baseline(e) => Some(e.target()),
            Self::Debug(e) => Some(e.target()),
        }
    }
}

impl<T: ConsoleTarget> RenderEngine for RenderBackend<T> {
    fn render(&mut self, frame: &Grid<Pixel>, origin: IntVector) -> Result<(), BackendError> {
        match self {
            Self::Direct(e) => e.render(frame, origin),
            Self::Diff(e) => e.render(frame, origin),
            Self::Baseline(e) => e.render(frame, origin),
            Self::Debug(e) => e.render(frame, origin),
        }
    }

    fn viewport_size(&self) -> Option<IntVector> {
        match self {
            Self::Direct(e) => e.viewport_size(),
            Self::Diff(e) => e.viewport_size(),
            Self::Baseline(e) => e.viewport_size(),
            Self::Debug(e) => e.viewport_size(),
        }
    }
}

/// Console coordinates are unsigned 16-bit.
pub(crate) fn check_origin(origin: IntVector) -> Result<(u16, u16), BackendError> {
    match (u16::try_from(origin.x), u16::try_from(origin.y)) {
        (Ok(x), Ok(y)) => Ok((x, y)),
        _ => Err(BackendError::InvalidOrigin {
            x: origin.x,
            y: origin.y,
        }),
    }
}

/// Columns and rows of `frame` that land on a console of `console` size
/// when drawn at `origin`. Without a known size only the coordinate range
/// limits the extent.
pub(crate) fn visible_extent(
    frame: &Grid<Pixel>,
    origin: (u16, u16),
    console: Option<(u16, u16)>,
) -> (usize, usize) {
    let (cw, ch) = console.unwrap_or((u16::MAX, u16::MAX));
    let w = (cw.saturating_sub(origin.0) as usize).min(frame.width());
    let h = (ch.saturating_sub(origin.1) as usize).min(frame.height());
    (w, h)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::MemoryConsole;
    use crate::types::Color;

    #[test]
    fn parses_backend_names() {
        assert_eq!(BackendKind::from_str("Diff"), Some(BackendKind::Diff));
        assert_eq!(BackendKind::from_str(" baseline "), Some(BackendKind::Baseline));
        assert_eq!(BackendKind::from_str("gpu"), None);
        assert_eq!(BackendKind::default(), BackendKind::Auto);
    }

    #[test]
    fn explicit_text_backends_use_the_target() {
        for (kind, name) in [
            (BackendKind::Diff, "diff"),
            (BackendKind::Baseline, "baseline"),
            (BackendKind::Debug, "debug"),
        ] {
            let backend = RenderBackend::select(kind, MemoryConsole::new(3, 2)).unwrap();
            assert_eq!(backend.name(), name);
            assert_eq!(backend.viewport_size(), Some(IntVector::new(3, 2)));
        }
    }

    #[test]
    fn auto_always_yields_a_backend() {
        let mut backend = RenderBackend::select(BackendKind::Auto, MemoryConsole::new(3, 1)).unwrap();
        assert!(matches!(backend.name(), "direct" | "diff"));
        if backend.name() == "diff" {
            let frame = Grid::filled(2, 1, Pixel::blank(Color::Blue));
            backend.render(&frame, IntVector::ZERO).unwrap();
            let target = backend.target().unwrap();
            assert_eq!(target.screen().get(1, 0).unwrap().bg(), Color::Blue);
        }
    }

    #[test]
    fn visible_extent_clips() {
        let frame: Grid<Pixel> = Grid::new(10, 10);
        assert_eq!(visible_extent(&frame, (0, 0), Some((4, 20))), (4, 10));
        assert_eq!(visible_extent(&frame, (3, 18), Some((4, 20))), (1, 2));
        assert_eq!(visible_extent(&frame, (9, 9), Some((4, 4))), (0, 0));
        assert_eq!(visible_extent(&frame, (9, 9), None), (10, 10));
    }

    #[test]
    fn origin_must_fit_console_coordinates() {
        assert_eq!(check_origin(IntVector::new(3, 4)).unwrap(), (3, 4));
        assert!(check_origin(IntVector::new(0, -2)).is_err());
        assert!(check_origin(IntVector::new(70_000, 0)).is_err());
    }
}
