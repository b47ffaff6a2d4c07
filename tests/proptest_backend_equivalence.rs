//! Property-based tests for the text backends on the in-memory console.
//!
//! 1. Diff and baseline output leave identical screens for any frame, origin,
//!    console size and capability set
//! 2. Diff switches colors exactly once per distinct visible color set
//! 3. The debug backend only differs from baseline in blank glyphs

use std::collections::HashSet;

use proptest::prelude::*;
use tui_canvas::core::{Grid, Pixel, NUL};
use tui_canvas::term::{
    debug_glyph, BaselineEngine, Capabilities, DebugEngine, DiffEngine, JumpSupport,
    MemoryConsole, RenderEngine,
};
use tui_canvas::types::{Color, IntVector};

// ── Strategies ──────────────────────────────────────────────────────────────

fn color_strategy() -> impl Strategy<Value = Color> {
    prop::sample::select(Color::ALL.to_vec())
}

/// A small palette so runs of equal colors and foreign cells both show up.
fn pixel_strategy() -> impl Strategy<Value = Pixel> {
    let colors = prop::sample::select(vec![
        Color::Black,
        Color::Red,
        Color::Yellow,
        Color::Transparent,
    ]);
    (
        prop_oneof![Just(NUL), Just(' '), Just('#'), Just('o')],
        colors.clone(),
        colors,
    )
        .prop_map(|(ch, fg, bg)| Pixel::new(ch, fg, bg).unwrap())
}

fn frame_strategy() -> impl Strategy<Value = Grid<Pixel>> {
    (1usize..=24, 1usize..=6).prop_flat_map(|(w, h)| {
        proptest::collection::vec(pixel_strategy(), w * h)
            .prop_map(move |cells| Grid::from_fn(w, h, |x, y| cells[y * w + x]))
    })
}

fn caps_strategy() -> impl Strategy<Value = Capabilities> {
    let jump = prop_oneof![
        (1u16..=9).prop_map(|tab_width| JumpSupport::TabTrim { tab_width }),
        Just(JumpSupport::CursorForward),
        Just(JumpSupport::Unsupported),
    ];
    (any::<bool>(), jump).prop_map(|(auto_advance, jump)| Capabilities { auto_advance, jump })
}

fn console_strategy() -> impl Strategy<Value = (u16, u16)> {
    (1u16..=30, 1u16..=8)
}

fn origin_strategy() -> impl Strategy<Value = IntVector> {
    (0i32..=10, 0i32..=4).prop_map(|(x, y)| IntVector::new(x, y))
}

fn render<E: RenderEngine>(engine: &mut E, frame: &Grid<Pixel>, origin: IntVector) {
    engine.render(frame, origin).unwrap();
}

/// Distinct resolved color sets inside the console-visible part of `frame`.
fn visible_color_sets(frame: &Grid<Pixel>, origin: IntVector, console: (u16, u16)) -> usize {
    let w = (i32::from(console.0) - origin.x).clamp(0, frame.width() as i32) as usize;
    let h = (i32::from(console.1) - origin.y).clamp(0, frame.height() as i32) as usize;
    let mut sets = HashSet::new();
    for row in frame.rows().take(h) {
        for px in &row[..w] {
            sets.insert(px.colors().resolve());
        }
    }
    sets.len()
}

// ═════════════════════════════════════════════════════════════════════════════
// 1-2. Diff against baseline
// ═════════════════════════════════════════════════════════════════════════════

proptest! {
    #![proptest_config(ProptestConfig::with_cases(512))]

    #[test]
    fn diff_and_baseline_leave_the_same_screen(
        frame in frame_strategy(),
        (cw, ch) in console_strategy(),
        origin in origin_strategy(),
        caps in caps_strategy(),
    ) {
        let mut baseline = BaselineEngine::new(MemoryConsole::new(cw, ch).with_capabilities(caps));
        let mut diff = DiffEngine::new(MemoryConsole::new(cw, ch).with_capabilities(caps));
        render(&mut baseline, &frame, origin);
        render(&mut diff, &frame, origin);

        prop_assert_eq!(diff.target().screen(), baseline.target().screen());
    }

    #[test]
    fn diff_switches_once_per_color_set(
        frame in frame_strategy(),
        (cw, ch) in console_strategy(),
        origin in origin_strategy(),
        caps in caps_strategy(),
    ) {
        let mut diff = DiffEngine::new(MemoryConsole::new(cw, ch).with_capabilities(caps));
        render(&mut diff, &frame, origin);

        prop_assert_eq!(
            diff.target().color_switches(),
            visible_color_sets(&frame, origin, (cw, ch))
        );
    }

    #[test]
    fn repeated_diff_frames_stay_equivalent(
        first in frame_strategy(),
        second in frame_strategy(),
        caps in caps_strategy(),
    ) {
        // Jumps cached during the first frame must still be right for the second.
        let mut baseline = BaselineEngine::new(MemoryConsole::new(24, 6).with_capabilities(caps));
        let mut diff = DiffEngine::new(MemoryConsole::new(24, 6).with_capabilities(caps));
        for frame in [&first, &second] {
            render(&mut baseline, frame, IntVector::ZERO);
            render(&mut diff, frame, IntVector::ZERO);
        }
        prop_assert_eq!(diff.target().screen(), baseline.target().screen());
    }
}

// ═════════════════════════════════════════════════════════════════════════════
// 3. Debug glyphs
// ═════════════════════════════════════════════════════════════════════════════

proptest! {
    #[test]
    fn debug_only_replaces_blank_glyphs(
        frame in frame_strategy(),
        bg in color_strategy(),
    ) {
        let (w, h) = (frame.width() as u16, frame.height() as u16);
        let mut baseline = BaselineEngine::new(MemoryConsole::new(w, h));
        let mut debug = DebugEngine::new(MemoryConsole::new(w, h));
        render(&mut baseline, &frame, IntVector::ZERO);
        render(&mut debug, &frame, IntVector::ZERO);

        let plain = baseline.target().screen();
        let shown = debug.target().screen();
        for (src, (a, b)) in frame.cells().iter().zip(plain.cells().iter().zip(shown.cells())) {
            prop_assert_eq!(a.colors(), b.colors());
            prop_assert_eq!(b.ch(), debug_glyph(src));
            if src.ch() != NUL && src.ch() != ' ' {
                prop_assert_eq!(a.ch(), b.ch());
            }
        }

        // A blank pixel's debug glyph depends on its background only.
        let blank = Pixel::blank(bg);
        prop_assert_eq!(debug_glyph(&blank), debug_glyph(&Pixel::tint(bg)));
    }
}
