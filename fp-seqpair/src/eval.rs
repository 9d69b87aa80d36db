use crate::SequencePair;
use fp_types::{Dim, Layout};
use std::collections::BTreeMap;
use std::ops::Bound::{Excluded, Unbounded};

/// Turns a sequence pair into bottom-left coordinates and the bounding-box
/// extent. Implementations own their scratch buffers so evaluation does not
/// allocate in the annealing loop.
pub trait Evaluator {
    /// Write positions and effective sizes into `layout`; return `(w, h)` of
    /// the packing.
    fn evaluate(&mut self, sp: &SequencePair, layout: &mut Layout) -> (Dim, Dim);
}

/// O(n^2) evaluation over the horizontal and vertical constraint DAGs.
///
/// For modules `i` before `j` in `sp_y`: agreement with `sp_x` is a
/// horizontal constraint (`i` left of `j`), disagreement a vertical one
/// (`i` below `j`). Since every constraint edge runs forward in `sp_y`,
/// scanning modules in `sp_y` order relaxes both DAGs' longest paths in one
/// topological sweep; the sink distances are the maxima of `pos + extent`.
#[derive(Clone, Debug, Default)]
pub struct DagEvaluator {
    inv_x: Vec<usize>,
}

impl DagEvaluator {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Evaluator for DagEvaluator {
    fn evaluate(&mut self, sp: &SequencePair, layout: &mut Layout) -> (Dim, Dim) {
        sp.sync_layout(layout);
        if sp.is_empty() {
            return (0, 0);
        }
        let n = sp.len();
        self.inv_x.resize(n, 0);
        for (pos, &m) in sp.sp_x().iter().enumerate() {
            self.inv_x[m] = pos;
        }

        let mut width: Dim = 0;
        let mut height: Dim = 0;
        for (pos, &b) in sp.sp_y().iter().enumerate() {
            let mut x: Dim = 0;
            let mut y: Dim = 0;
            for &a in &sp.sp_y()[..pos] {
                if self.inv_x[a] < self.inv_x[b] {
                    x = x.max(layout.x()[a] + sp.widths()[a]);
                } else {
                    y = y.max(layout.y()[a] + sp.heights()[a]);
                }
            }
            layout.set_position(b, x, y);
            width = width.max(x + sp.widths()[b]);
            height = height.max(y + sp.heights()[b]);
        }
        (width, height)
    }
}

/// O(n log n) evaluation via weighted longest common subsequences.
///
/// An ordered map from match position to running extent acts as the
/// priority structure: inserting a module reads its coordinate off the
/// predecessor entry, then the dominated suffix (entries with no larger
/// extent at a larger key) is purged, keeping values strictly increasing.
/// The x-pass scans `sp_x` forward, the y-pass scans it reversed.
#[derive(Clone, Debug, Default)]
pub struct LcsEvaluator {
    inv_y: Vec<usize>,
    pq: BTreeMap<i64, i64>,
    dead: Vec<i64>,
}

impl LcsEvaluator {
    pub fn new() -> Self {
        Self::default()
    }

    /// One LCS pass; writes per-module positions through `set_pos` and
    /// returns the packed extent along this axis.
    fn pass<'a>(
        &mut self,
        order: impl Iterator<Item = &'a usize>,
        lens: &[Dim],
        layout: &mut Layout,
        horizontal: bool,
    ) -> Dim {
        self.pq.clear();
        self.pq.insert(-1, 0);
        for &b in order {
            let p = self.inv_y[b] as i64;
            self.pq.entry(p).or_insert(0);
            let pos = *self
                .pq
                .range(..p)
                .next_back()
                .expect("the -1 sentinel precedes every key")
                .1;
            if horizontal {
                layout.x_mut()[b] = pos as Dim;
            } else {
                layout.y_mut()[b] = pos as Dim;
            }
            let t = pos + lens[b] as i64;
            *self.pq.get_mut(&p).unwrap() = t;

            self.dead.clear();
            for (&k, &v) in self.pq.range((Excluded(p), Unbounded)) {
                if v <= t {
                    self.dead.push(k);
                } else {
                    break;
                }
            }
            for k in &self.dead {
                self.pq.remove(k);
            }
        }
        *self.pq.values().next_back().unwrap() as Dim
    }
}

impl Evaluator for LcsEvaluator {
    fn evaluate(&mut self, sp: &SequencePair, layout: &mut Layout) -> (Dim, Dim) {
        sp.sync_layout(layout);
        if sp.is_empty() {
            return (0, 0);
        }
        let n = sp.len();
        self.inv_y.resize(n, 0);
        for (pos, &m) in sp.sp_y().iter().enumerate() {
            self.inv_y[m] = pos;
        }

        let w = self.pass(sp.sp_x().iter(), sp.widths(), layout, true);
        let h = self.pass(sp.sp_x().iter().rev(), sp.heights(), layout, false);
        (w, h)
    }
}
