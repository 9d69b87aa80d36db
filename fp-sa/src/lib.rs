//! The simulated-annealing driver, generic over the floorplan
//! representation.
//!
//! A [`Representation`] exposes valid-move proposal, rollback, cost, and the
//! representation-specific temperature bootstrap. The [`Annealer`] owns the
//! schedule and the seeded random source; with equal seeds, inputs, and
//! options, two runs are bitwise identical.

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use std::time::Instant;

mod options;
mod seqpair;
mod stats;
mod tree;

pub use options::{OptionsError, SaOptions};
pub use seqpair::SeqPairState;
pub use stats::SaStats;
pub use tree::{TreeMove, TreePayload, TreeState};

/// Retries granted to a proposal loop before it falls back to a move that is
/// always valid; guards against the rare state where draws keep missing the
/// few valid candidates.
pub const MOVE_RETRY_LIMIT: usize = 1 << 16;

/// A mutable floorplan state the annealer can explore.
pub trait Representation: Clone {
    /// What [`Representation::propose`] applied, with enough information to
    /// invert it.
    type Move;

    /// Probes used to pick the starting temperature.
    const BOOTSTRAP_STEPS: usize;

    /// Number of modules.
    fn size(&self) -> usize;

    /// Apply one randomly drawn valid move and return it.
    fn propose(&mut self, rng: &mut ChaCha8Rng) -> Self::Move;

    /// Invert the given move (the one most recently proposed).
    fn rollback(&mut self, mv: &Self::Move);

    /// Cost of the current state.
    fn cost(&mut self) -> f64;

    /// Perturb for one bootstrap probe and return the probe's cost. The
    /// state is settled afterwards by [`Representation::bootstrap_reset`].
    fn bootstrap_sample(&mut self, rng: &mut ChaCha8Rng) -> f64;

    /// Settle the state between bootstrap probes (undo the probe, or move to
    /// a fresh random state, as the representation prescribes).
    fn bootstrap_reset(&mut self, rng: &mut ChaCha8Rng);

    /// Starting temperature from the initial cost and the probe costs.
    fn bootstrap_temperature(initial: f64, samples: &[f64], p_init: f64) -> f64;

    /// Restore `self` from a snapshot, reusing allocations.
    fn clone_from_repr(&mut self, other: &Self);
}

/// Cooling stops outright below this temperature; prevents an endless tail
/// of near-zero temperatures when the acceptance rate never quite drops.
const TEMP_FLOOR: f64 = 1.0;

/// The annealing loop: propose, evaluate, accept or roll back, cool,
/// restart on stagnation, and track the best state seen.
#[derive(Clone, Debug)]
pub struct Annealer {
    opts: SaOptions,
    rng: ChaCha8Rng,
}

impl Annealer {
    pub fn new(opts: SaOptions, seed: u64) -> Result<Self, OptionsError> {
        opts.validate()?;
        Ok(Annealer {
            opts,
            rng: ChaCha8Rng::seed_from_u64(seed),
        })
    }

    pub fn options(&self) -> &SaOptions {
        &self.opts
    }

    /// Run one full annealing; `repr` ends at the best state found.
    /// Returns the best cost.
    pub fn anneal<R: Representation>(&mut self, repr: &mut R) -> (f64, SaStats) {
        let start = Instant::now();
        let mut stats = SaStats::default();
        let initial_cost = repr.cost();
        if repr.size() <= 1 {
            // Nothing to move.
            stats.timing.total = start.elapsed().as_secs_f32();
            return (initial_cost, stats);
        }

        let mut best = repr.clone();
        let mut best_cost = initial_cost;

        // Temperature bootstrap: sample cost responses to random moves.
        let mut samples = Vec::with_capacity(R::BOOTSTRAP_STEPS);
        for _ in 0..R::BOOTSTRAP_STEPS {
            let cost = repr.bootstrap_sample(&mut self.rng);
            stats.simulations += 1;
            if cost < best_cost {
                best_cost = cost;
                best.clone_from_repr(repr);
            }
            samples.push(cost);
            repr.bootstrap_reset(&mut self.rng);
        }
        let mut temp = R::bootstrap_temperature(initial_cost, &samples, self.opts.p_init);
        stats.timing.bootstrap = start.elapsed().as_secs_f32();
        tracing::info!(temp, best_cost, "starting temperature");

        let mut curr = repr.cost();
        loop {
            let mut accepts = 0usize;
            let mut sum_costs = 0.0;
            for _ in 0..self.opts.reps_per_t {
                let mv = repr.propose(&mut self.rng);
                stats.simulations += 1;
                let new_cost = repr.cost();
                sum_costs += new_cost;
                if new_cost < curr
                    || self.rng.gen::<f64>() < ((curr - new_cost) / temp).exp()
                {
                    if new_cost < best_cost {
                        best_cost = new_cost;
                        best.clone_from_repr(repr);
                    }
                    curr = new_cost;
                    accepts += 1;
                } else {
                    repr.rollback(&mv);
                }
            }

            let avg = sum_costs / self.opts.reps_per_t as f64;
            let accept_rate = accepts as f64 / self.opts.reps_per_t as f64;
            tracing::debug!(temp, avg, accept_rate, best_cost, "temperature step");

            if (accepts as f64) < self.opts.p_stop * self.opts.reps_per_t as f64
                || temp < TEMP_FLOOR
            {
                break;
            }
            if avg > self.opts.restart_ratio * best_cost {
                repr.clone_from_repr(&best);
                curr = best_cost;
                stats.restarts += 1;
            }
            temp *= self.opts.cooling_ratio;
        }

        repr.clone_from_repr(&best);
        stats.rounds = 1;
        stats.timing.total = start.elapsed().as_secs_f32();
        tracing::info!(
            best_cost,
            simulations = stats.simulations,
            restarts = stats.restarts,
            "annealing finished"
        );
        (best_cost, stats)
    }

    /// Re-anneal from the best state until `rounds` consecutive runs agree
    /// on the best cost (the outer loop of the tree methods).
    pub fn anneal_stable<R: Representation>(
        &mut self,
        repr: &mut R,
        rounds: usize,
    ) -> (f64, SaStats) {
        let rounds = rounds.max(1);
        let mut total = SaStats::default();
        let mut streak = 0;
        let mut last_best = f64::INFINITY;
        loop {
            let (best, stats) = self.anneal(repr);
            total += stats;
            if best == last_best {
                streak += 1;
            } else {
                streak = 1;
                last_best = best;
            }
            tracing::info!(round = total.rounds, best, streak, "outer round");
            if streak >= rounds {
                return (best, total);
            }
        }
    }
}

#[cfg(test)]
mod tests;
