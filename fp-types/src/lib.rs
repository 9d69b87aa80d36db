//! Shared value types for the floorplan workspace: rectangles, layouts,
//! two-pin nets, wirelength, and the packing cost function.

use serde::{Deserialize, Serialize};
use std::fmt;

mod layout;
mod rect;

pub use layout::Layout;
pub use rect::Rect;

/// Coordinates and sizes are integral (YAL dimensions are integers).
pub type Dim = i32;

/// Areas can exceed `i32` for large designs.
pub type Area = i64;

/// A two-pin connection between modules `a` and `b` (indices into a layout).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Net {
    pub a: usize,
    pub b: usize,
}

impl Net {
    pub fn new(a: usize, b: usize) -> Self {
        Net { a, b }
    }
}

impl fmt::Display for Net {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.a, self.b)
    }
}

/// Total Manhattan distance between module centers, summed over all nets.
///
/// Works on doubled center coordinates (`2x + w`) so the result is exact in
/// integers; the single halving happens at the end.
pub fn sum_manhattan_distances(layout: &Layout, nets: &[Net]) -> f64 {
    let mut twice: i64 = 0;
    for net in nets {
        let cx0 = 2 * layout.x()[net.a] as i64 + layout.widths()[net.a] as i64;
        let cx1 = 2 * layout.x()[net.b] as i64 + layout.widths()[net.b] as i64;
        let cy0 = 2 * layout.y()[net.a] as i64 + layout.heights()[net.a] as i64;
        let cy1 = 2 * layout.y()[net.b] as i64 + layout.heights()[net.b] as i64;
        twice += (cx1 - cx0).abs() + (cy1 - cy0).abs();
    }
    twice as f64 / 2.0
}

/// The annealing energy: `alpha * area + (1 - alpha) * wirelength`.
pub fn packing_cost(layout: &Layout, nets: &[Net], w: Dim, h: Dim, alpha: f64) -> f64 {
    let area = w as f64 * h as f64;
    let len = sum_manhattan_distances(layout, nets);
    alpha * area + (1.0 - alpha) * len
}

/// Pairwise overlap check used by tests and post-run validation.
pub fn has_overlap(layout: &Layout) -> bool {
    for i in 0..layout.len() {
        for j in i + 1..layout.len() {
            if layout.rect(i).intersects(&layout.rect(j)) {
                return true;
            }
        }
    }
    false
}
