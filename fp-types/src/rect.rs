use crate::{Area, Dim};
use serde::{Deserialize, Serialize};
use std::fmt;

/// An axis-aligned rectangle with its bottom-left corner at `(x, y)`.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Rect {
    pub x: Dim,
    pub y: Dim,
    pub width: Dim,
    pub height: Dim,
}

impl Rect {
    pub fn new(x: Dim, y: Dim, width: Dim, height: Dim) -> Self {
        Rect {
            x,
            y,
            width,
            height,
        }
    }

    pub fn left(&self) -> Dim {
        self.x
    }

    pub fn right(&self) -> Dim {
        self.x + self.width
    }

    pub fn bottom(&self) -> Dim {
        self.y
    }

    pub fn top(&self) -> Dim {
        self.y + self.height
    }

    pub fn area(&self) -> Area {
        self.width as Area * self.height as Area
    }

    /// Strict interior intersection; rectangles sharing only an edge do not
    /// intersect.
    pub fn intersects(&self, other: &Rect) -> bool {
        self.left() < other.right()
            && other.left() < self.right()
            && self.bottom() < other.top()
            && other.bottom() < self.top()
    }
}

impl fmt::Display for Rect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {} {} {}", self.x, self.y, self.width, self.height)
    }
}
