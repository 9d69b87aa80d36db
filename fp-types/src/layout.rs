use crate::{Area, Dim, Rect};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Positions and sizes of all placed modules, stored as parallel columns.
///
/// Sizes are owned here as well: evaluators that rotate modules write the
/// effective width/height for the current orientation before computing
/// positions.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Layout {
    x: Vec<Dim>,
    y: Vec<Dim>,
    widths: Vec<Dim>,
    heights: Vec<Dim>,
}

impl Layout {
    /// Build a layout from module sizes, all placed at the origin.
    pub fn from_sizes(sizes: impl IntoIterator<Item = (Dim, Dim)>) -> Self {
        let mut layout = Layout::default();
        for (w, h) in sizes {
            layout.push(w, h);
        }
        layout
    }

    /// Append a module of the given size at the origin.
    pub fn push(&mut self, width: Dim, height: Dim) {
        self.widths.push(width);
        self.heights.push(height);
        self.x.push(0);
        self.y.push(0);
    }

    pub fn len(&self) -> usize {
        self.x.len()
    }

    pub fn is_empty(&self) -> bool {
        self.x.is_empty()
    }

    pub fn x(&self) -> &[Dim] {
        &self.x
    }

    pub fn y(&self) -> &[Dim] {
        &self.y
    }

    pub fn widths(&self) -> &[Dim] {
        &self.widths
    }

    pub fn heights(&self) -> &[Dim] {
        &self.heights
    }

    pub fn x_mut(&mut self) -> &mut [Dim] {
        &mut self.x
    }

    pub fn y_mut(&mut self) -> &mut [Dim] {
        &mut self.y
    }

    pub fn widths_mut(&mut self) -> &mut [Dim] {
        &mut self.widths
    }

    pub fn heights_mut(&mut self) -> &mut [Dim] {
        &mut self.heights
    }

    pub fn set_position(&mut self, k: usize, x: Dim, y: Dim) {
        self.x[k] = x;
        self.y[k] = y;
    }

    pub fn set_size(&mut self, k: usize, width: Dim, height: Dim) {
        self.widths[k] = width;
        self.heights[k] = height;
    }

    pub fn rect(&self, k: usize) -> Rect {
        Rect::new(self.x[k], self.y[k], self.widths[k], self.heights[k])
    }

    /// Extent of the bounding box over all modules.
    pub fn bounding_box(&self) -> (Dim, Dim) {
        if self.is_empty() {
            return (0, 0);
        }
        let mut left = Dim::MAX;
        let mut right = Dim::MIN;
        let mut bottom = Dim::MAX;
        let mut top = Dim::MIN;
        for k in 0..self.len() {
            let r = self.rect(k);
            left = left.min(r.left());
            right = right.max(r.right());
            bottom = bottom.min(r.bottom());
            top = top.max(r.top());
        }
        (right - left, top - bottom)
    }

    /// Sum of module areas, for utilization reporting.
    pub fn sum_component_areas(&self) -> Area {
        self.widths
            .iter()
            .zip(&self.heights)
            .map(|(&w, &h)| w as Area * h as Area)
            .sum()
    }
}

/// One `x y w h` line per module, the tool's output format.
impl fmt::Display for Layout {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for k in 0..self.len() {
            writeln!(f, "{}", self.rect(k))?;
        }
        Ok(())
    }
}
