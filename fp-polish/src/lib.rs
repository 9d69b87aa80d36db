//! Slicing-tree floorplan representations.
//!
//! A slicing floorplan is a binary tree whose leaves are modules and whose
//! internal nodes combine their children either side by side (`*`,
//! horizontal) or stacked (`+`, vertical). The tree's post-order read is the
//! Polish expression of the floorplan.
//!
//! Two payload types share one tree skeleton: [`ScalarShape`] stores a single
//! `(width, height)` per subtree (hard modules, rotated explicitly by the M4
//! move), while [`ShapeCurve`] stores the whole Pareto frontier of subtree
//! shapes, so both orientations of every leaf are represented at once.

use fp_types::Dim;
use thiserror::Error;

mod curve;
mod plan;
mod tree;

pub use curve::{CurvePoint, ShapeCurve};
pub use plan::{extract_floorplan, extract_floorplan_at};
pub use tree::{NodeIdx, PostOrder, SlicingTree};

/// How an internal node combines its children.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CombineType {
    /// No combination: the node is a module.
    Leaf,
    /// Side by side; widths add, heights max.
    Horizontal,
    /// Stacked; heights add, widths max.
    Vertical,
}

impl CombineType {
    pub fn invert(self) -> Self {
        match self {
            CombineType::Leaf => CombineType::Leaf,
            CombineType::Horizontal => CombineType::Vertical,
            CombineType::Vertical => CombineType::Horizontal,
        }
    }
}

/// One token of a Polish expression.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ExprToken {
    /// A module index.
    Operand(usize),
    /// The `*` combiner.
    Horizontal,
    /// The `+` combiner.
    Vertical,
}

/// Rejected Polish-expression input.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ExprError {
    #[error("operator at token {0} has fewer than two operands")]
    MissingOperands(usize),
    #[error("operand index {index} out of range for {modules} modules")]
    OperandOutOfRange { index: usize, modules: usize },
    #[error("expression ends with {0} disconnected subtrees")]
    Disconnected(usize),
    #[error("empty expression")]
    Empty,
}

/// The per-node data of a slicing tree, recomputed bottom-up after moves.
pub trait NodePayload: Clone + PartialEq {
    fn leaf(width: Dim, height: Dim) -> Self;
    fn combine(ty: CombineType, left: &Self, right: &Self) -> Self;
}

/// Shape of a subtree of hard (fixed-orientation) modules.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ScalarShape {
    pub width: Dim,
    pub height: Dim,
}

impl ScalarShape {
    pub fn area(&self) -> fp_types::Area {
        self.width as fp_types::Area * self.height as fp_types::Area
    }

    /// Rotate by 90 degrees.
    pub fn rotate(&mut self) {
        std::mem::swap(&mut self.width, &mut self.height);
    }
}

impl NodePayload for ScalarShape {
    fn leaf(width: Dim, height: Dim) -> Self {
        ScalarShape { width, height }
    }

    fn combine(ty: CombineType, left: &Self, right: &Self) -> Self {
        match ty {
            CombineType::Horizontal => ScalarShape {
                width: left.width + right.width,
                height: left.height.max(right.height),
            },
            CombineType::Vertical => ScalarShape {
                width: left.width.max(right.width),
                height: left.height + right.height,
            },
            CombineType::Leaf => unreachable!("leaves are never recombined"),
        }
    }
}
