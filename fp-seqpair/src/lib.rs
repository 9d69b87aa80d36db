//! Sequence-pair floorplan representation.
//!
//! Two permutations `sp_x`, `sp_y` of the module indices encode the relative
//! placement topology: `i` left of `j` iff `i` precedes `j` in both
//! sequences, `i` below `j` iff `i` precedes `j` in `sp_y` only. Two
//! evaluators turn a sequence pair into coordinates: a quadratic
//! longest-path pass over the constraint DAGs and an `O(n log n)`
//! longest-common-subsequence pass over an ordered map. They agree to the
//! integer on every input.

use fp_types::{Dim, Layout};
use rand::Rng;

mod change;
mod eval;

pub use change::{Change, ChangeDistribution, DistributionError, CHANGE_COUNT};
pub use eval::{DagEvaluator, Evaluator, LcsEvaluator};

/// The mutable sequence-pair state: both permutations plus the effective
/// module sizes (rotation swaps width and height in place).
///
/// Every operator records a one-shot memo for [`SequencePair::rollback`];
/// [`SequencePair::shuffle`] and [`SequencePair::construct`] invalidate it.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SequencePair {
    widths: Vec<Dim>,
    heights: Vec<Dim>,
    sp_x: Vec<usize>,
    sp_y: Vec<usize>,
    last_change: Option<(Change, usize, usize)>,
}

impl SequencePair {
    /// Identity sequences; call [`Self::shuffle`] for a random start.
    pub fn new(sizes: impl IntoIterator<Item = (Dim, Dim)>) -> Self {
        let (widths, heights): (Vec<Dim>, Vec<Dim>) = sizes.into_iter().unzip();
        let n = widths.len();
        SequencePair {
            widths,
            heights,
            sp_x: (0..n).collect(),
            sp_y: (0..n).collect(),
            last_change: None,
        }
    }

    /// Reset to the given sizes and a fresh random state.
    pub fn construct(
        &mut self,
        sizes: impl IntoIterator<Item = (Dim, Dim)>,
        rng: &mut impl Rng,
    ) {
        *self = SequencePair::new(sizes);
        self.shuffle(rng, 0.5);
    }

    pub fn len(&self) -> usize {
        self.widths.len()
    }

    pub fn is_empty(&self) -> bool {
        self.widths.is_empty()
    }

    pub fn widths(&self) -> &[Dim] {
        &self.widths
    }

    pub fn heights(&self) -> &[Dim] {
        &self.heights
    }

    pub fn sp_x(&self) -> &[usize] {
        &self.sp_x
    }

    pub fn sp_y(&self) -> &[usize] {
        &self.sp_y
    }

    /// Copy the effective sizes into a layout before evaluation.
    pub fn sync_layout(&self, layout: &mut Layout) {
        debug_assert_eq!(layout.len(), self.len());
        layout.widths_mut().copy_from_slice(&self.widths);
        layout.heights_mut().copy_from_slice(&self.heights);
    }

    /// Restore `self` from a snapshot without reallocating.
    pub fn copy_from(&mut self, other: &Self) {
        debug_assert_eq!(self.len(), other.len());
        self.widths.copy_from_slice(&other.widths);
        self.heights.copy_from_slice(&other.heights);
        self.sp_x.copy_from_slice(&other.sp_x);
        self.sp_y.copy_from_slice(&other.sp_y);
        self.last_change = other.last_change;
    }

    /// Randomize orientations (with probability `p_rotate` each) and both
    /// sequences. Invalidates rollback.
    pub fn shuffle(&mut self, rng: &mut impl Rng, p_rotate: f64) {
        for k in 0..self.len() {
            if rng.gen_bool(p_rotate) {
                self.rotate_module(k);
            }
        }
        Self::shuffle_seq(&mut self.sp_x, rng);
        Self::shuffle_seq(&mut self.sp_y, rng);
        self.last_change = None;
    }

    fn shuffle_seq(seq: &mut [usize], rng: &mut impl Rng) {
        for i in (1..seq.len()).rev() {
            seq.swap(i, rng.gen_range(0..=i));
        }
    }

    /// Draw an operator from the distribution, draw its parameters, apply
    /// it, and remember it for rollback. Returns the operator applied.
    pub fn apply_change(&mut self, rng: &mut impl Rng, dist: &ChangeDistribution) -> Change {
        let change = dist.sample(rng);
        match change {
            Change::Rotate => {
                let k = rng.gen_range(0..self.len());
                self.rotate_module(k);
                self.last_change = Some((change, k, k));
            }
            Change::SwapX | Change::SwapY | Change::SwapXy => {
                let (i, j) = self.draw_distinct(rng);
                self.swap_seqs(i, j, change);
                self.last_change = Some((change, i, j));
            }
            Change::ReverseX | Change::ReverseY | Change::ReverseXy => {
                let (i, j) = self.draw_range(rng);
                self.reverse_seqs(i, j, change);
                self.last_change = Some((change, i, j));
            }
            Change::RotateX | Change::RotateY | Change::RotateXy => {
                let (i, j) = self.draw_range(rng);
                self.rotate_seqs_left(i, j, change);
                self.last_change = Some((change, i, j));
            }
        }
        change
    }

    /// One-shot undo of the last applied operator. Returns `false` when
    /// there is nothing to undo.
    pub fn rollback(&mut self) -> bool {
        let Some((change, i, j)) = self.last_change.take() else {
            return false;
        };
        match change {
            Change::Rotate => self.rotate_module(i),
            Change::SwapX | Change::SwapY | Change::SwapXy => self.swap_seqs(i, j, change),
            Change::ReverseX | Change::ReverseY | Change::ReverseXy => {
                self.reverse_seqs(i, j, change)
            }
            Change::RotateX | Change::RotateY | Change::RotateXy => {
                // A left rotation by one over [i, j) is undone by a right one.
                self.rotate_seqs_right(i, j, change)
            }
        }
        true
    }

    fn rotate_module(&mut self, k: usize) {
        std::mem::swap(&mut self.widths[k], &mut self.heights[k]);
    }

    /// Two distinct positions in `[0, n)`.
    fn draw_distinct(&self, rng: &mut impl Rng) -> (usize, usize) {
        loop {
            let i = rng.gen_range(0..self.len());
            let j = rng.gen_range(0..self.len());
            if i != j {
                return (i, j);
            }
        }
    }

    /// A range `[i, j)` with at least two elements, endpoints in `[0, n]`.
    fn draw_range(&self, rng: &mut impl Rng) -> (usize, usize) {
        loop {
            let mut i = rng.gen_range(0..=self.len());
            let mut j = rng.gen_range(0..=self.len());
            if i > j {
                std::mem::swap(&mut i, &mut j);
            }
            if j > i + 1 {
                return (i, j);
            }
        }
    }

    fn swap_seqs(&mut self, i: usize, j: usize, change: Change) {
        if matches!(change, Change::SwapX | Change::SwapXy) {
            self.sp_x.swap(i, j);
        }
        if matches!(change, Change::SwapY | Change::SwapXy) {
            self.sp_y.swap(i, j);
        }
    }

    fn reverse_seqs(&mut self, i: usize, j: usize, change: Change) {
        if matches!(change, Change::ReverseX | Change::ReverseXy) {
            self.sp_x[i..j].reverse();
        }
        if matches!(change, Change::ReverseY | Change::ReverseXy) {
            self.sp_y[i..j].reverse();
        }
    }

    fn rotate_seqs_left(&mut self, i: usize, j: usize, change: Change) {
        if matches!(change, Change::RotateX | Change::RotateXy) {
            self.sp_x[i..j].rotate_left(1);
        }
        if matches!(change, Change::RotateY | Change::RotateXy) {
            self.sp_y[i..j].rotate_left(1);
        }
    }

    fn rotate_seqs_right(&mut self, i: usize, j: usize, change: Change) {
        if matches!(change, Change::RotateX | Change::RotateXy) {
            self.sp_x[i..j].rotate_right(1);
        }
        if matches!(change, Change::RotateY | Change::RotateXy) {
            self.sp_y[i..j].rotate_right(1);
        }
    }
}

#[cfg(test)]
mod tests;
