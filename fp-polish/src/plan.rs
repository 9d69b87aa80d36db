use crate::{CombineType, NodeIdx, ScalarShape, ShapeCurve, SlicingTree};
use fp_types::{Dim, Layout};

/// Write the placement of a scalar tree into `layout`: the left child sits at
/// the parent's offset, the right child beside it (H) or on top of it (V).
pub fn extract_floorplan(tree: &SlicingTree<ScalarShape>, layout: &mut Layout) {
    if let Some(root) = tree.root() {
        place_scalar(tree, root, 0, 0, layout);
    }
}

fn place_scalar(
    tree: &SlicingTree<ScalarShape>,
    t: NodeIdx,
    x: Dim,
    y: Dim,
    layout: &mut Layout,
) {
    if let Some(m) = tree.module_of(t) {
        let shape = tree.payload(t);
        layout.set_position(m, x, y);
        layout.set_size(m, shape.width, shape.height);
        return;
    }
    let left = tree.left_of(t).unwrap();
    let right = tree.right_of(t).unwrap();
    let left_shape = *tree.payload(left);
    place_scalar(tree, left, x, y, layout);
    match tree.combine_of(t) {
        CombineType::Horizontal => place_scalar(tree, right, x + left_shape.width, y, layout),
        CombineType::Vertical => place_scalar(tree, right, x, y + left_shape.height, layout),
        CombineType::Leaf => unreachable!("operators are never leaves"),
    }
}

/// Write the placement of a vectorized tree into `layout`, realizing curve
/// point `point` of the root. Each internal node looks up the child points
/// its own point was combined from (by width for V, by height for H) and
/// recurses; leaves land with the orientation their chosen point encodes.
pub fn extract_floorplan_at(tree: &SlicingTree<ShapeCurve>, point: usize, layout: &mut Layout) {
    if let Some(root) = tree.root() {
        place_curve(tree, root, point, 0, 0, layout);
    }
}

fn place_curve(
    tree: &SlicingTree<ShapeCurve>,
    t: NodeIdx,
    point: usize,
    x: Dim,
    y: Dim,
    layout: &mut Layout,
) {
    let (w, h) = tree.payload(t).points()[point];
    if let Some(m) = tree.module_of(t) {
        layout.set_position(m, x, y);
        layout.set_size(m, w, h);
        return;
    }
    let left = tree.left_of(t).unwrap();
    let right = tree.right_of(t).unwrap();
    let left_curve = tree.payload(left);
    let right_curve = tree.payload(right);
    match tree.combine_of(t) {
        CombineType::Vertical => {
            let li = left_curve.index_at_width(w);
            let ri = right_curve.index_at_width(w);
            let left_h = left_curve.points()[li].1;
            debug_assert_eq!(left_h + right_curve.points()[ri].1, h);
            place_curve(tree, left, li, x, y, layout);
            place_curve(tree, right, ri, x, y + left_h, layout);
        }
        CombineType::Horizontal => {
            let li = left_curve.index_at_height(h);
            let ri = right_curve.index_at_height(h);
            let left_w = left_curve.points()[li].0;
            debug_assert_eq!(left_w + right_curve.points()[ri].0, w);
            place_curve(tree, left, li, x, y, layout);
            place_curve(tree, right, ri, x + left_w, y, layout);
        }
        CombineType::Leaf => unreachable!("operators are never leaves"),
    }
}
