use crate::{CombineType, NodePayload};
use fp_types::{Area, Dim};
use smallvec::SmallVec;

/// One admissible `(width, height)` shape of a subtree.
pub type CurvePoint = (Dim, Dim);

/// The staircase Pareto frontier of admissible shapes of a subtree.
///
/// Points are kept with strictly increasing widths and strictly decreasing
/// heights; no point dominates another. A leaf's curve holds the module in
/// both orientations (one point when square).
///
/// ```text
///    |
///    *----
///         |
///         *-----
///               |
///               *------
/// ```
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ShapeCurve {
    points: SmallVec<[CurvePoint; 4]>,
}

impl ShapeCurve {
    pub fn points(&self) -> &[CurvePoint] {
        &self.points
    }

    /// The smallest-area point and its index.
    pub fn min_area(&self) -> (Area, usize) {
        let mut best = Area::MAX;
        let mut best_idx = 0;
        for (k, &(w, h)) in self.points.iter().enumerate() {
            let area = w as Area * h as Area;
            if area < best {
                best = area;
                best_idx = k;
            }
        }
        (best, best_idx)
    }

    /// Index of the widest point not exceeding `width`.
    pub(crate) fn index_at_width(&self, width: Dim) -> usize {
        let k = self.points.partition_point(|p| p.0 <= width);
        debug_assert!(k > 0, "no curve point fits width {width}");
        k - 1
    }

    /// Index of the first (narrowest) point not exceeding `height`.
    pub(crate) fn index_at_height(&self, height: Dim) -> usize {
        let k = self.points.partition_point(|p| p.1 > height);
        debug_assert!(k < self.points.len(), "no curve point fits height {height}");
        k
    }

    /// Stack two curves: merge by increasing width, heights add.
    ///
    /// While one side's height at the current width is still unknown the
    /// stack is infeasible and nothing is emitted; once a side runs out its
    /// last-seen height keeps contributing to the other side's trailing
    /// points.
    fn combine_vertical(f: &Self, g: &Self) -> Self {
        let fs = f.points.as_slice();
        let gs = g.points.as_slice();
        let mut points = SmallVec::new();
        let (mut i, mut j) = (0, 0);
        let (mut yi, mut yj) = (None, None);
        while i < fs.len() && j < gs.len() {
            let a = fs[i];
            let b = gs[j];
            if a.0 < b.0 {
                if let Some(yj) = yj {
                    points.push((a.0, a.1 + yj));
                }
                yi = Some(a.1);
                i += 1;
            } else if a.0 > b.0 {
                if let Some(yi) = yi {
                    points.push((b.0, b.1 + yi));
                }
                yj = Some(b.1);
                j += 1;
            } else {
                points.push((a.0, a.1 + b.1));
                yi = Some(a.1);
                yj = Some(b.1);
                i += 1;
                j += 1;
            }
        }
        while i < fs.len() {
            points.push((fs[i].0, fs[i].1 + yj.unwrap()));
            i += 1;
        }
        while j < gs.len() {
            points.push((gs[j].0, gs[j].1 + yi.unwrap()));
            j += 1;
        }
        ShapeCurve { points }
    }

    /// Place two curves side by side: merge by decreasing height, widths add,
    /// the taller side advances (both on ties).
    ///
    /// Once a side is exhausted the combined height is pinned at that side's
    /// final height, so every would-be trailing point is dominated by the
    /// last emitted one; no trailing points exist.
    fn combine_horizontal(f: &Self, g: &Self) -> Self {
        let fs = f.points.as_slice();
        let gs = g.points.as_slice();
        let mut points = SmallVec::new();
        let (mut i, mut j) = (0, 0);
        while i < fs.len() && j < gs.len() {
            let a = fs[i];
            let b = gs[j];
            points.push((a.0 + b.0, a.1.max(b.1)));
            if a.1 >= b.1 {
                i += 1;
            }
            if b.1 >= a.1 {
                j += 1;
            }
        }
        ShapeCurve { points }
    }
}

impl NodePayload for ShapeCurve {
    fn leaf(width: Dim, height: Dim) -> Self {
        let lo = width.min(height);
        let hi = width.max(height);
        let mut points = SmallVec::new();
        points.push((lo, hi));
        if lo != hi {
            points.push((hi, lo));
        }
        ShapeCurve { points }
    }

    fn combine(ty: CombineType, left: &Self, right: &Self) -> Self {
        debug_assert!(!left.points.is_empty() && !right.points.is_empty());
        match ty {
            CombineType::Vertical => Self::combine_vertical(left, right),
            CombineType::Horizontal => Self::combine_horizontal(left, right),
            CombineType::Leaf => unreachable!("leaves are never recombined"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn curve(points: &[CurvePoint]) -> ShapeCurve {
        ShapeCurve {
            points: points.iter().copied().collect(),
        }
    }

    #[test]
    fn leaf_orients_and_collapses() {
        assert_eq!(ShapeCurve::leaf(30, 20).points(), &[(20, 30), (30, 20)]);
        assert_eq!(ShapeCurve::leaf(20, 30).points(), &[(20, 30), (30, 20)]);
        assert_eq!(ShapeCurve::leaf(25, 25).points(), &[(25, 25)]);
    }

    #[test]
    fn vertical_combine_emits_trailing_segments() {
        let l = curve(&[(1, 5), (3, 2), (5, 0)]);
        let r = curve(&[(2, 3), (4, 1), (5, 0)]);
        let v = ShapeCurve::combine(CombineType::Vertical, &l, &r);
        assert_eq!(v.points(), &[(2, 8), (3, 5), (4, 3), (5, 0)]);
    }

    #[test]
    fn horizontal_combine_sums_widths() {
        let l = curve(&[(1, 5), (3, 2), (5, 0)]);
        let r = curve(&[(2, 3), (4, 1), (5, 0)]);
        let h = ShapeCurve::combine(CombineType::Horizontal, &l, &r);
        assert_eq!(h.points(), &[(3, 5), (5, 3), (7, 2), (9, 1), (10, 0)]);
    }

    #[test]
    fn combine_is_staircase() {
        let l = curve(&[(2, 9), (4, 6), (7, 3)]);
        let r = curve(&[(1, 8), (5, 5), (6, 1)]);
        for ty in [CombineType::Vertical, CombineType::Horizontal] {
            let c = ShapeCurve::combine(ty, &l, &r);
            for w in c.points().windows(2) {
                assert!(w[0].0 < w[1].0, "widths must increase: {:?}", c.points());
                assert!(w[0].1 > w[1].1, "heights must decrease: {:?}", c.points());
            }
        }
    }

    #[test]
    fn min_area_picks_first_minimum() {
        let c = curve(&[(2, 9), (4, 6), (6, 4), (30, 1)]);
        assert_eq!(c.min_area(), (18, 0));
    }
}
