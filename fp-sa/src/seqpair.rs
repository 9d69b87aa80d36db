use crate::Representation;
use fp_seqpair::{ChangeDistribution, Evaluator, SequencePair};
use fp_types::{packing_cost, Dim, Layout, Net};
use rand_chacha::ChaCha8Rng;

/// A sequence pair wired up for annealing: the evaluator that turns it into
/// a layout, the netlist, and the area/wirelength trade-off `alpha`.
#[derive(Clone, Debug)]
pub struct SeqPairState<E: Evaluator + Clone> {
    sp: SequencePair,
    eval: E,
    layout: Layout,
    nets: Vec<Net>,
    dist: ChangeDistribution,
    alpha: f64,
}

impl<E: Evaluator + Clone> SeqPairState<E> {
    pub fn new(
        sizes: &[(Dim, Dim)],
        nets: Vec<Net>,
        alpha: f64,
        dist: ChangeDistribution,
        eval: E,
    ) -> Self {
        SeqPairState {
            sp: SequencePair::new(sizes.iter().copied()),
            eval,
            layout: Layout::from_sizes(sizes.iter().copied()),
            nets,
            dist,
            alpha,
        }
    }

    /// Start from a fresh random orientation and ordering.
    pub fn shuffle(&mut self, rng: &mut ChaCha8Rng) {
        self.sp.shuffle(rng, 0.5);
    }

    pub fn sequence_pair(&self) -> &SequencePair {
        &self.sp
    }

    pub fn nets(&self) -> &[Net] {
        &self.nets
    }

    pub fn alpha(&self) -> f64 {
        self.alpha
    }

    /// Evaluate the current state into the owned layout and return it.
    pub fn realize(&mut self) -> (&Layout, (Dim, Dim)) {
        let bbox = self.eval.evaluate(&self.sp, &mut self.layout);
        (&self.layout, bbox)
    }
}

/// The applied operator is memoized inside [`SequencePair`]; the move token
/// carries nothing.
#[derive(Clone, Copy, Debug)]
pub struct SpMove;

impl<E: Evaluator + Clone> Representation for SeqPairState<E> {
    type Move = SpMove;

    const BOOTSTRAP_STEPS: usize = 64;

    fn size(&self) -> usize {
        self.sp.len()
    }

    fn propose(&mut self, rng: &mut ChaCha8Rng) -> SpMove {
        self.sp.apply_change(rng, &self.dist);
        SpMove
    }

    fn rollback(&mut self, _mv: &SpMove) {
        let undone = self.sp.rollback();
        debug_assert!(undone, "rollback must follow a proposal");
    }

    fn cost(&mut self) -> f64 {
        let (w, h) = self.eval.evaluate(&self.sp, &mut self.layout);
        packing_cost(&self.layout, &self.nets, w, h, self.alpha)
    }

    /// One probe is a random operator; probes are decorrelated by
    /// reshuffling rather than undone.
    fn bootstrap_sample(&mut self, rng: &mut ChaCha8Rng) -> f64 {
        self.propose(rng);
        self.cost()
    }

    fn bootstrap_reset(&mut self, rng: &mut ChaCha8Rng) {
        self.sp.shuffle(rng, 0.5);
    }

    /// `T0 = (stddev(costs) + eps) / ln(1 / p_init)`.
    fn bootstrap_temperature(_initial: f64, samples: &[f64], p_init: f64) -> f64 {
        let n = samples.len() as f64;
        let sum: f64 = samples.iter().sum();
        let sum_sqrs: f64 = samples.iter().map(|c| c * c).sum();
        let stddev = ((sum_sqrs - sum * sum / n) / (n - 1.0)).max(0.0).sqrt();
        (stddev + f64::EPSILON) / (1.0 / p_init).ln()
    }

    fn clone_from_repr(&mut self, other: &Self) {
        self.sp.copy_from(&other.sp);
        self.layout.clone_from(&other.layout);
        debug_assert_eq!(self.nets.len(), other.nets.len());
        self.alpha = other.alpha;
    }
}
