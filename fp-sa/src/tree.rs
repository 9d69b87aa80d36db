use crate::{Representation, MOVE_RETRY_LIMIT};
use fp_polish::{NodeIdx, NodePayload, ScalarShape, ShapeCurve, SlicingTree};
use rand::Rng;
use rand_chacha::ChaCha8Rng;

/// What the two slicing-tree payloads tell the annealer: how to price a
/// tree, and whether leaf rotation is a move (scalar trees only; a curve
/// leaf already holds both orientations).
pub trait TreePayload: NodePayload {
    const HAS_ROTATE: bool;

    fn tree_cost(tree: &SlicingTree<Self>) -> f64;

    fn rotate_leaf(tree: &mut SlicingTree<Self>, t: NodeIdx) -> bool;
}

impl TreePayload for ScalarShape {
    const HAS_ROTATE: bool = true;

    fn tree_cost(tree: &SlicingTree<Self>) -> f64 {
        tree.root()
            .map_or(0.0, |r| tree.payload(r).area() as f64)
    }

    fn rotate_leaf(tree: &mut SlicingTree<Self>, t: NodeIdx) -> bool {
        tree.rotate_leaf(t)
    }
}

impl TreePayload for ShapeCurve {
    const HAS_ROTATE: bool = false;

    fn tree_cost(tree: &SlicingTree<Self>) -> f64 {
        tree.root()
            .map_or(0.0, |r| tree.payload(r).min_area().0 as f64)
    }

    fn rotate_leaf(_tree: &mut SlicingTree<Self>, _t: NodeIdx) -> bool {
        false
    }
}

/// One applied tree move, identified by post-order positions so that the
/// inverse is the same move at the same positions.
#[derive(Clone, Copy, Debug)]
pub enum TreeMove {
    /// M1: the leaves at two post-order positions changed places.
    SwapLeaves(usize, usize),
    /// M2: combiners inverted from this position up to the root.
    InvertChain(usize),
    /// M3: the nodes at positions `i` and `i + 1` swapped.
    SwapAdjacent(usize),
    /// M4: the leaf at this position rotated.
    RotateLeaf(usize),
}

/// A slicing tree plus its post-order index buffer, kept in sync across
/// moves so operands are drawn by position in O(1).
#[derive(Clone, Debug)]
pub struct TreeState<P: TreePayload> {
    tree: SlicingTree<P>,
    order: Vec<NodeIdx>,
    probe: Option<TreeMove>,
}

impl<P: TreePayload> TreeState<P> {
    pub fn new(tree: SlicingTree<P>) -> Self {
        let order = tree.iter().collect();
        TreeState {
            tree,
            order,
            probe: None,
        }
    }

    pub fn tree(&self) -> &SlicingTree<P> {
        &self.tree
    }

    fn is_leaf_at(&self, pos: usize) -> bool {
        self.tree.is_leaf(self.order[pos])
    }

    fn apply(&mut self, mv: TreeMove) {
        let ok = match mv {
            TreeMove::SwapLeaves(i, j) => {
                let ok = self.tree.swap_nodes(self.order[i], self.order[j]);
                self.order.swap(i, j);
                ok
            }
            TreeMove::InvertChain(i) => self.tree.invert_chain(self.order[i]),
            TreeMove::SwapAdjacent(i) => {
                let ok = self.tree.swap_nodes(self.order[i], self.order[i + 1]);
                self.order.swap(i, i + 1);
                ok
            }
            TreeMove::RotateLeaf(i) => P::rotate_leaf(&mut self.tree, self.order[i]),
        };
        debug_assert!(ok, "moves must be validated before application");
    }
}

impl<P: TreePayload> Representation for TreeState<P> {
    type Move = TreeMove;

    const BOOTSTRAP_STEPS: usize = 100;

    fn size(&self) -> usize {
        (self.order.len() + 1) / 2
    }

    /// Draw uniformly among the applicable move kinds, redrawing operands
    /// until they form a valid move. Positions are drawn over `[0, n - 1)`,
    /// which leaves the root (always last in post-order) untargeted.
    fn propose(&mut self, rng: &mut ChaCha8Rng) -> TreeMove {
        let len = self.order.len();
        let kinds = if P::HAS_ROTATE { 4 } else { 3 };
        for _ in 0..MOVE_RETRY_LIMIT {
            match rng.gen_range(0..kinds) {
                0 => {
                    let i = rng.gen_range(0..len - 1);
                    let j = rng.gen_range(0..len - 1);
                    if i != j && self.is_leaf_at(i) && self.is_leaf_at(j) {
                        let mv = TreeMove::SwapLeaves(i, j);
                        self.apply(mv);
                        return mv;
                    }
                }
                1 => {
                    let i = rng.gen_range(0..len - 1);
                    if !self.is_leaf_at(i) {
                        let mv = TreeMove::InvertChain(i);
                        self.apply(mv);
                        return mv;
                    }
                }
                2 => {
                    let i = rng.gen_range(0..len - 1);
                    if self.is_leaf_at(i) != self.is_leaf_at(i + 1)
                        && self.tree.swap_nodes(self.order[i], self.order[i + 1])
                    {
                        self.order.swap(i, i + 1);
                        return TreeMove::SwapAdjacent(i);
                    }
                }
                _ => {
                    let i = rng.gen_range(0..len - 1);
                    if self.is_leaf_at(i) {
                        let mv = TreeMove::RotateLeaf(i);
                        self.apply(mv);
                        return mv;
                    }
                }
            }
        }
        // Candidate draws kept missing; fall back to swapping the first two
        // leaves, which any tree with two modules has.
        let mut leaves = (0..len).filter(|&k| self.is_leaf_at(k));
        let i = leaves.next().expect("trees have leaves");
        let j = leaves.next().expect("proposals require two modules");
        let mv = TreeMove::SwapLeaves(i, j);
        self.apply(mv);
        mv
    }

    /// Every move is undone by replaying it at the same positions: swaps
    /// and rotations are involutions, and the adjacent swap's mirror image
    /// is its inverse.
    fn rollback(&mut self, mv: &TreeMove) {
        self.apply(*mv);
    }

    fn cost(&mut self) -> f64 {
        P::tree_cost(&self.tree)
    }

    fn bootstrap_sample(&mut self, rng: &mut ChaCha8Rng) -> f64 {
        let mv = self.propose(rng);
        self.probe = Some(mv);
        self.cost()
    }

    fn bootstrap_reset(&mut self, _rng: &mut ChaCha8Rng) {
        if let Some(mv) = self.probe.take() {
            self.rollback(&mv);
        }
    }

    /// `T0 = -mean|cost - initial| / ln(p_init)`.
    fn bootstrap_temperature(initial: f64, samples: &[f64], p_init: f64) -> f64 {
        let total_drop: f64 = samples.iter().map(|&c| (c - initial).abs()).sum();
        -(total_drop / samples.len() as f64) / p_init.ln()
    }

    fn clone_from_repr(&mut self, other: &Self) {
        self.tree.clone_from_tree(&other.tree);
        self.order.clone_from(&other.order);
        self.probe = other.probe;
    }
}
