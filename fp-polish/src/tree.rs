use crate::{CombineType, ExprError, ExprToken, NodePayload, ScalarShape};
use fp_types::Dim;
use rand::Rng;

/// Index of a node in the tree's arena.
pub type NodeIdx = usize;

/// The header node: its left child is the root, it has no parent. Every real
/// node therefore has a parent, which simplifies rewiring and traversal.
const HEADER: NodeIdx = 0;

#[derive(Clone, Debug)]
struct Node<P> {
    combine: CombineType,
    parent: Option<NodeIdx>,
    left: Option<NodeIdx>,
    right: Option<NodeIdx>,
    /// Number of nodes in this subtree (1 for leaves).
    size: u32,
    /// Operand index for leaves.
    module: Option<usize>,
    payload: P,
}

impl<P: NodePayload> Node<P> {
    fn header() -> Self {
        Node {
            combine: CombineType::Leaf,
            parent: None,
            left: None,
            right: None,
            size: 1,
            module: None,
            payload: P::leaf(0, 0),
        }
    }

    fn leaf(module: usize, width: Dim, height: Dim) -> Self {
        Node {
            combine: CombineType::Leaf,
            parent: None,
            left: None,
            right: None,
            size: 1,
            module: Some(module),
            payload: P::leaf(width, height),
        }
    }

    fn is_leaf(&self) -> bool {
        self.left.is_none()
    }
}

/// A slicing tree over an arena of nodes, with post-order bidirectional
/// traversal and the M1/M2/M3 (and, for scalar payloads, M4) moves.
///
/// Moves only rewire links and recompute payloads; nodes are never freed, so
/// snapshots are plain clones of the arena.
#[derive(Clone, Debug)]
pub struct SlicingTree<P: NodePayload> {
    nodes: Vec<Node<P>>,
}

impl<P: NodePayload> Default for SlicingTree<P> {
    fn default() -> Self {
        Self::new()
    }
}

impl<P: NodePayload> SlicingTree<P> {
    pub fn new() -> Self {
        SlicingTree {
            nodes: vec![Node::header()],
        }
    }

    pub fn is_empty(&self) -> bool {
        self.nodes[HEADER].left.is_none()
    }

    /// Number of nodes (leaves and operators).
    pub fn len(&self) -> usize {
        self.root().map_or(0, |r| self.nodes[r].size as usize)
    }

    pub fn root(&self) -> Option<NodeIdx> {
        self.nodes[HEADER].left
    }

    pub fn is_leaf(&self, t: NodeIdx) -> bool {
        self.nodes[t].is_leaf()
    }

    pub fn is_header(&self, t: NodeIdx) -> bool {
        t == HEADER
    }

    pub fn combine_of(&self, t: NodeIdx) -> CombineType {
        self.nodes[t].combine
    }

    pub fn module_of(&self, t: NodeIdx) -> Option<usize> {
        self.nodes[t].module
    }

    pub fn payload(&self, t: NodeIdx) -> &P {
        &self.nodes[t].payload
    }

    pub fn left_of(&self, t: NodeIdx) -> Option<NodeIdx> {
        self.nodes[t].left
    }

    pub fn right_of(&self, t: NodeIdx) -> Option<NodeIdx> {
        self.nodes[t].right
    }

    /// Reuse `other`'s node storage allocation when restoring a snapshot.
    pub fn clone_from_tree(&mut self, other: &Self) {
        self.nodes.clone_from(&other.nodes);
    }

    // ---------- construction ----------

    /// Build the tree from modules sizes and a Polish expression, e.g.
    /// `0 1 * 2 +`. Non-normalized expressions are accepted. On error the
    /// tree is left unchanged.
    pub fn construct(
        &mut self,
        dims: &[(Dim, Dim)],
        expr: &[ExprToken],
    ) -> Result<(), ExprError> {
        let mut nodes: Vec<Node<P>> = Vec::with_capacity(expr.len() + 1);
        nodes.push(Node::header());
        let mut stack: Vec<NodeIdx> = Vec::new();

        for (pos, &token) in expr.iter().enumerate() {
            match token {
                ExprToken::Operand(m) => {
                    let &(w, h) = dims.get(m).ok_or(ExprError::OperandOutOfRange {
                        index: m,
                        modules: dims.len(),
                    })?;
                    nodes.push(Node::leaf(m, w, h));
                    stack.push(nodes.len() - 1);
                }
                ExprToken::Horizontal | ExprToken::Vertical => {
                    let ty = if token == ExprToken::Horizontal {
                        CombineType::Horizontal
                    } else {
                        CombineType::Vertical
                    };
                    if stack.len() < 2 {
                        return Err(ExprError::MissingOperands(pos));
                    }
                    let t2 = stack.pop().unwrap();
                    let t1 = stack.pop().unwrap();
                    let payload = P::combine(ty, &nodes[t1].payload, &nodes[t2].payload);
                    let op = nodes.len();
                    nodes.push(Node {
                        combine: ty,
                        parent: None,
                        left: Some(t1),
                        right: Some(t2),
                        size: nodes[t1].size + nodes[t2].size + 1,
                        module: None,
                        payload,
                    });
                    nodes[t1].parent = Some(op);
                    nodes[t2].parent = Some(op);
                    stack.push(op);
                }
            }
        }

        match stack.len() {
            0 => Err(ExprError::Empty),
            1 => {
                let root = stack[0];
                nodes[HEADER].left = Some(root);
                nodes[root].parent = Some(HEADER);
                self.nodes = nodes;
                Ok(())
            }
            n => Err(ExprError::Disconnected(n)),
        }
    }

    /// Build a uniformly random *normalized* tree: leaves in a random order,
    /// then repeatedly merge a random tree of the pool with the last one,
    /// choosing the combiner so that no operator repeats its right child's.
    pub fn construct_random(&mut self, dims: &[(Dim, Dim)], rng: &mut impl Rng) {
        let mut nodes: Vec<Node<P>> = Vec::with_capacity(2 * dims.len());
        nodes.push(Node::header());
        if dims.is_empty() {
            self.nodes = nodes;
            return;
        }

        let mut order: Vec<usize> = (0..dims.len()).collect();
        for i in (1..order.len()).rev() {
            order.swap(i, rng.gen_range(0..=i));
        }
        let mut pool: Vec<NodeIdx> = Vec::with_capacity(dims.len());
        for m in order {
            let (w, h) = dims[m];
            nodes.push(Node::leaf(m, w, h));
            pool.push(nodes.len() - 1);
        }

        while pool.len() > 1 {
            let k = rng.gen_range(0..pool.len() - 1);
            let right = pool.pop().unwrap();
            let left = pool[k];
            let ty = if nodes[right].is_leaf() {
                if rng.gen_bool(0.5) {
                    CombineType::Horizontal
                } else {
                    CombineType::Vertical
                }
            } else {
                nodes[right].combine.invert()
            };
            let payload = P::combine(ty, &nodes[left].payload, &nodes[right].payload);
            let op = nodes.len();
            nodes.push(Node {
                combine: ty,
                parent: None,
                left: Some(left),
                right: Some(right),
                size: nodes[left].size + nodes[right].size + 1,
                module: None,
                payload,
            });
            nodes[left].parent = Some(op);
            nodes[right].parent = Some(op);
            pool[k] = op;
        }

        let root = pool[0];
        nodes[HEADER].left = Some(root);
        nodes[root].parent = Some(HEADER);
        self.nodes = nodes;
    }

    // ---------- post-order traversal ----------

    /// First node of the subtree rooted at `t` in post-order: the chain of
    /// left children down to a leaf.
    fn leftmost(&self, mut t: NodeIdx) -> NodeIdx {
        while let Some(l) = self.nodes[t].left {
            t = l;
        }
        t
    }

    /// First node in post-order, or the header when empty.
    pub fn first(&self) -> NodeIdx {
        self.leftmost(HEADER)
    }

    /// Post-order successor. The successor of the root is the header, and the
    /// successor of the header wraps to the first node.
    pub fn next_node(&self, t: NodeIdx) -> NodeIdx {
        if t == HEADER {
            return self.first();
        }
        let p = self.nodes[t].parent.expect("non-header nodes have parents");
        if p == HEADER || self.nodes[p].right == Some(t) {
            p
        } else {
            self.leftmost(self.nodes[p].right.expect("operators have two children"))
        }
    }

    /// Post-order predecessor; the mirror of [`Self::next_node`].
    pub fn prev_node(&self, t: NodeIdx) -> NodeIdx {
        if t == HEADER {
            return self.root().unwrap_or(HEADER);
        }
        if let Some(r) = self.nodes[t].right {
            // A subtree's post-order ends at its root, so an operator's
            // predecessor is its right child.
            return r;
        }
        let mut t = t;
        loop {
            let p = self.nodes[t].parent.expect("non-header nodes have parents");
            if p == HEADER {
                return HEADER;
            }
            if self.nodes[p].left == Some(t) {
                t = p;
            } else {
                return self.nodes[p].left.expect("operators have two children");
            }
        }
    }

    /// Node at post-order position `k`, in O(height) via subtree sizes.
    pub fn get(&self, k: usize) -> Option<NodeIdx> {
        if k >= self.len() {
            return None;
        }
        let mut t = self.root()?;
        let mut offset = k as u32;
        loop {
            let left_size = self.nodes[t].left.map_or(0, |l| self.nodes[l].size);
            if offset < left_size {
                t = self.nodes[t].left.unwrap();
            } else if offset < self.nodes[t].size - 1 {
                t = self.nodes[t].right.unwrap();
                offset -= left_size;
            } else {
                return Some(t);
            }
        }
    }

    /// Forward post-order iterator over node indices.
    pub fn iter(&self) -> PostOrder<'_, P> {
        PostOrder {
            tree: self,
            cur: self.first(),
        }
    }

    /// The tree's Polish expression (post-order read).
    pub fn polish_expression(&self) -> Vec<ExprToken> {
        self.iter()
            .map(|t| match self.nodes[t].combine {
                CombineType::Leaf => ExprToken::Operand(self.nodes[t].module.unwrap()),
                CombineType::Horizontal => ExprToken::Horizontal,
                CombineType::Vertical => ExprToken::Vertical,
            })
            .collect()
    }

    // ---------- moves ----------

    /// M1 / M3: swap two nodes. Two leaves swap places anywhere in the tree;
    /// a post-order-adjacent (operator, leaf) or (leaf, operator) pair swaps
    /// post-order positions. Returns `false`, leaving the tree unchanged, for
    /// two operators or an invalid leaf-operator swap.
    pub fn swap_nodes(&mut self, t1: NodeIdx, t2: NodeIdx) -> bool {
        if t1 == t2 || t1 == HEADER || t2 == HEADER {
            return false;
        }
        match (self.is_leaf(t1), self.is_leaf(t2)) {
            (true, true) => {
                self.swap_leaves(t1, t2);
                true
            }
            (false, true) => self.swap_operator_leaf(t1, t2),
            (true, false) => self.swap_leaf_operator(t1, t2),
            (false, false) => false,
        }
    }

    /// M2: invert the combiners on the path from `t` to the root.
    pub fn invert_chain(&mut self, t: NodeIdx) -> bool {
        if t == HEADER || self.is_leaf(t) {
            return false;
        }
        let mut cur = t;
        while cur != HEADER {
            self.nodes[cur].combine = self.nodes[cur].combine.invert();
            self.recompute_payload(cur);
            cur = self.nodes[cur].parent.unwrap();
        }
        true
    }

    fn attach_left(&mut self, parent: NodeIdx, child: NodeIdx) {
        self.nodes[parent].left = Some(child);
        self.nodes[child].parent = Some(parent);
    }

    fn attach_right(&mut self, parent: NodeIdx, child: NodeIdx) {
        self.nodes[parent].right = Some(child);
        self.nodes[child].parent = Some(parent);
    }

    fn recompute_payload(&mut self, t: NodeIdx) {
        if let (Some(l), Some(r)) = (self.nodes[t].left, self.nodes[t].right) {
            let payload =
                P::combine(self.nodes[t].combine, &self.nodes[l].payload, &self.nodes[r].payload);
            self.nodes[t].payload = payload;
        }
    }

    /// Recompute payloads (and sizes, after structural moves) from `t` up to
    /// the header.
    fn update_upward(&mut self, mut t: NodeIdx, update_size: bool) {
        while t != HEADER {
            self.recompute_payload(t);
            if update_size {
                if let (Some(l), Some(r)) = (self.nodes[t].left, self.nodes[t].right) {
                    self.nodes[t].size = self.nodes[l].size + self.nodes[r].size + 1;
                }
            }
            t = self.nodes[t].parent.unwrap();
        }
    }

    fn swap_leaves(&mut self, t1: NodeIdx, t2: NodeIdx) {
        let p1 = self.nodes[t1].parent.unwrap();
        let p2 = self.nodes[t2].parent.unwrap();
        if self.nodes[p2].left == Some(t2) {
            self.nodes[p2].left = Some(t1);
        } else {
            self.nodes[p2].right = Some(t1);
        }
        if self.nodes[p1].left == Some(t1) {
            self.nodes[p1].left = Some(t2);
        } else {
            self.nodes[p1].right = Some(t2);
        }
        self.nodes[t1].parent = Some(p2);
        self.nodes[t2].parent = Some(p1);
        // Both chains run to the header, so shared ancestors settle on the
        // second pass.
        self.update_upward(p1, false);
        self.update_upward(p2, false);
    }

    /// M3 with the operator first in post-order:
    ///
    /// ```text
    /// case a:      p1                 case b:     p1
    ///            /    \                         /    \
    ///         t1        *                    t1        t2
    ///        /  \      / \                  /  \
    ///      ...  ...  ...  ...             ...  ...
    ///                / \
    ///               p2 ...
    ///              / \
    ///             t2 ...
    /// ```
    ///
    /// Always valid: `t1` is a left child and `t2` is the first node of the
    /// subtree to its right.
    fn swap_operator_leaf(&mut self, t1: NodeIdx, t2: NodeIdx) -> bool {
        debug_assert_eq!(self.next_node(t1), t2);
        let p1 = self.nodes[t1].parent.unwrap();
        let p2 = self.nodes[t2].parent.unwrap();
        debug_assert_eq!(self.nodes[p1].left, Some(t1));
        let t1_left = self.nodes[t1].left.unwrap();
        let t1_right = self.nodes[t1].right.unwrap();
        self.attach_left(p1, t1_left);
        self.nodes[t1].left = Some(t1_right);
        self.attach_right(t1, t2);
        if p1 != p2 {
            self.attach_left(p2, t1); // case a
        } else {
            self.attach_right(p2, t1); // case b
        }
        // p1 lies on t1's new parent chain, so one pass suffices.
        self.update_upward(t1, true);
        true
    }

    /// M3 with the leaf first in post-order:
    ///
    /// ```text
    /// case a:      ca                 case b:     ca
    ///            /    \                         /    \
    ///         pre      *                     pre      t2
    ///        /  \     / \                   /  \     /  \
    ///      ...  ... ...  ...              ...  ... ...   t1
    ///               /
    ///              t2
    ///             /  \
    ///           ...   t1
    /// ```
    ///
    /// Valid iff some ancestor chain from `t2` turns right before the header;
    /// equivalently, the swapped expression still has more operands than
    /// operators in every prefix.
    fn swap_leaf_operator(&mut self, t1: NodeIdx, t2: NodeIdx) -> bool {
        if self.nodes[t2].right != Some(t1) {
            return false;
        }
        let mut pre = t2;
        let mut ca = self.nodes[t2].parent.unwrap();
        while self.nodes[ca].left == Some(pre) {
            pre = ca;
            match self.nodes[ca].parent {
                Some(p) => ca = p,
                None => return false, // all-left chain up to the root
            }
        }
        let pre = self.nodes[ca].left.unwrap();
        let p2 = self.nodes[t2].parent.unwrap();
        if p2 != ca {
            self.attach_left(p2, t1); // case a
        } else {
            self.attach_right(p2, t1); // case b
        }
        let t2_left = self.nodes[t2].left.unwrap();
        self.nodes[t2].right = Some(t2_left);
        self.attach_left(t2, pre);
        self.attach_left(ca, t2);
        let t1_parent = self.nodes[t1].parent.unwrap();
        self.update_upward(t2, true);
        self.update_upward(t1_parent, true);
        true
    }

    // ---------- invariants ----------

    /// Payloads, sizes, parent links and the two-children rule, checked over
    /// the whole tree. Used by tests and debug assertions.
    pub fn check_integrity(&self) -> bool {
        match self.root() {
            None => true,
            Some(r) => self.nodes[r].parent == Some(HEADER) && self.check_subtree(r),
        }
    }

    fn check_subtree(&self, t: NodeIdx) -> bool {
        let n = &self.nodes[t];
        match (n.left, n.right) {
            (None, None) => n.size == 1 && n.combine == CombineType::Leaf && n.module.is_some(),
            (Some(l), Some(r)) => {
                n.combine != CombineType::Leaf
                    && self.nodes[l].parent == Some(t)
                    && self.nodes[r].parent == Some(t)
                    && n.size == self.nodes[l].size + self.nodes[r].size + 1
                    && n.payload
                        == P::combine(n.combine, &self.nodes[l].payload, &self.nodes[r].payload)
                    && self.check_subtree(l)
                    && self.check_subtree(r)
            }
            _ => false,
        }
    }

    /// No operator shares its combiner with its right child.
    pub fn is_normalized(&self) -> bool {
        self.iter().all(|t| {
            self.is_leaf(t)
                || self
                    .right_of(t)
                    .map_or(true, |r| self.nodes[r].combine != self.nodes[t].combine)
        })
    }
}

impl SlicingTree<ScalarShape> {
    /// M4: rotate a module by 90 degrees (scalar trees only; a shape curve
    /// already carries both orientations).
    pub fn rotate_leaf(&mut self, t: NodeIdx) -> bool {
        if t == HEADER || !self.is_leaf(t) {
            return false;
        }
        let mut payload = self.nodes[t].payload;
        payload.rotate();
        self.nodes[t].payload = payload;
        self.update_upward(self.nodes[t].parent.unwrap(), false);
        true
    }
}

/// Streaming post-order walk; ends at the header.
pub struct PostOrder<'a, P: NodePayload> {
    tree: &'a SlicingTree<P>,
    cur: NodeIdx,
}

impl<'a, P: NodePayload> Iterator for PostOrder<'a, P> {
    type Item = NodeIdx;

    fn next(&mut self) -> Option<NodeIdx> {
        if self.tree.is_header(self.cur) {
            return None;
        }
        let t = self.cur;
        self.cur = self.tree.next_node(t);
        Some(t)
    }
}
