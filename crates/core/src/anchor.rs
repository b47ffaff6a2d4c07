//! Anchor resolution: where a child grid sits inside its parent.
//!
//! This module is pure. Sizes may be such that the child is larger than the
//! parent, in which case the resolved coordinates go negative.

use crate::types::{Anchor, IntVector};

/// Placement along a single axis.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AxisAnchor {
    Start,
    Center { round_up: bool },
    End,
}

impl AxisAnchor {
    pub fn horizontal(anchor: Anchor) -> Self {
        if anchor.contains(Anchor::CENTER_X) {
            AxisAnchor::Center {
                round_up: anchor.contains(Anchor::BIAS_RIGHT),
            }
        } else if anchor.contains(Anchor::RIGHT) {
            AxisAnchor::End
        } else {
            AxisAnchor::Start
        }
    }

    pub fn vertical(anchor: Anchor) -> Self {
        if anchor.contains(Anchor::CENTER_Y) {
            AxisAnchor::Center {
                round_up: anchor.contains(Anchor::BIAS_BOTTOM),
            }
        } else if anchor.contains(Anchor::BOTTOM) {
            AxisAnchor::End
        } else {
            AxisAnchor::Start
        }
    }

    /// Start coordinate of a `child`-sized span inside a `parent`-sized one.
    pub fn resolve(self, parent: i32, child: i32) -> i32 {
        let space = parent - child;
        match self {
            AxisAnchor::Start => 0,
            AxisAnchor::End => space,
            // Floor and ceiling of space / 2, also for negative space.
            AxisAnchor::Center { round_up: false } => space.div_euclid(2),
            AxisAnchor::Center { round_up: true } => space - space.div_euclid(2),
        }
    }
}

/// Top-left corner of a `child`-sized grid anchored inside `parent`.
pub fn resolve_anchor(anchor: Anchor, parent: IntVector, child: IntVector) -> IntVector {
    IntVector::new(
        AxisAnchor::horizontal(anchor).resolve(parent.x, child.x),
        AxisAnchor::vertical(anchor).resolve(parent.y, child.y),
    )
}
