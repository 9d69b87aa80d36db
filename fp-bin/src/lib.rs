//! Front-end wiring: YAL in, SA per the chosen method, placement out.

use anyhow::{bail, Context, Result};
use fp_polish::{extract_floorplan, extract_floorplan_at, ScalarShape, ShapeCurve, SlicingTree};
use fp_sa::{Annealer, SaOptions, SeqPairState, TreeState};
use fp_seqpair::{ChangeDistribution, DagEvaluator, Evaluator, LcsEvaluator};
use fp_types::{has_overlap, packing_cost, Dim, Layout, Net};
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use std::fs;
use std::io::Read;

pub mod cli;

pub use cli::{Cli, Method};

/// Read input, optimize, and return the placement text. I/O-free except for
/// the input and options files, so tests can drive it directly via
/// [`run_on`].
pub fn run(cli: &Cli) -> Result<String> {
    let text = match &cli.input {
        Some(path) => fs::read_to_string(path)
            .with_context(|| format!("cannot open input file {}", path.display()))?,
        None => {
            let mut text = String::new();
            std::io::stdin()
                .read_to_string(&mut text)
                .context("cannot read standard input")?;
            text
        }
    };
    run_on(&text, cli)
}

/// [`run`] on in-memory YAL text.
pub fn run_on(text: &str, cli: &Cli) -> Result<String> {
    if !(0.0..=1.0).contains(&cli.alpha) {
        bail!("alpha must lie in [0, 1], got {}", cli.alpha);
    }
    let design = fp_yal::parse(text).context("YAL parse error")?;
    let index = design.resolve_instances()?;
    let sizes = design.instance_sizes(&index);
    let nets = design.derive_nets();
    tracing::info!(
        modules = design.modules.len(),
        instances = sizes.len(),
        nets = nets.len(),
        method = ?cli.method,
        "parsed input"
    );

    let opts = match &cli.option {
        Some(path) => {
            let text = fs::read_to_string(path)
                .with_context(|| format!("cannot open options file {}", path.display()))?;
            SaOptions::parse(&text)
                .with_context(|| format!("invalid options file {}", path.display()))?
        }
        None => SaOptions::for_size(sizes.len()),
    };
    let rounds = if cli.rounds <= 0 { 10 } else { cli.rounds as usize };

    let layout = match cli.method {
        Method::Polish => anneal_scalar_tree(&sizes, opts, cli.seed, rounds)?,
        Method::PolishCurve => anneal_curve_tree(&sizes, opts, cli.seed, rounds)?,
        Method::Lcs => anneal_seqpair(&sizes, &nets, opts, cli, LcsEvaluator::new())?,
        Method::Dag => anneal_seqpair(&sizes, &nets, opts, cli, DagEvaluator::new())?,
    };
    Ok(layout.to_string())
}

fn anneal_scalar_tree(
    sizes: &[(Dim, Dim)],
    opts: SaOptions,
    seed: u64,
    rounds: usize,
) -> Result<Layout> {
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    let mut tree = SlicingTree::<ScalarShape>::new();
    tree.construct_random(sizes, &mut rng);
    let mut state = TreeState::new(tree);
    let mut annealer = Annealer::new(opts, seed)?;
    let (best, stats) = annealer.anneal_stable(&mut state, rounds);
    tracing::info!(best, rounds = stats.rounds, simulations = stats.simulations, "polish done");

    let mut layout = Layout::from_sizes(sizes.iter().copied());
    extract_floorplan(state.tree(), &mut layout);
    validate(&layout, &[], 1.0, best);
    Ok(layout)
}

fn anneal_curve_tree(
    sizes: &[(Dim, Dim)],
    opts: SaOptions,
    seed: u64,
    rounds: usize,
) -> Result<Layout> {
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    let mut tree = SlicingTree::<ShapeCurve>::new();
    tree.construct_random(sizes, &mut rng);
    let mut state = TreeState::new(tree);
    let mut annealer = Annealer::new(opts, seed)?;
    let (best, stats) = annealer.anneal_stable(&mut state, rounds);
    tracing::info!(best, rounds = stats.rounds, simulations = stats.simulations, "polish-curve done");

    let mut layout = Layout::from_sizes(sizes.iter().copied());
    if let Some(root) = state.tree().root() {
        let (_, point) = state.tree().payload(root).min_area();
        extract_floorplan_at(state.tree(), point, &mut layout);
    }
    validate(&layout, &[], 1.0, best);
    Ok(layout)
}

fn anneal_seqpair<E: Evaluator + Clone>(
    sizes: &[(Dim, Dim)],
    nets: &[Net],
    opts: SaOptions,
    cli: &Cli,
    eval: E,
) -> Result<Layout> {
    let mut state = SeqPairState::new(
        sizes,
        nets.to_vec(),
        cli.alpha,
        ChangeDistribution::default(),
        eval,
    );
    let mut rng = ChaCha8Rng::seed_from_u64(cli.seed);
    state.shuffle(&mut rng);
    let mut annealer = Annealer::new(opts, cli.seed)?;
    let (best, stats) = annealer.anneal(&mut state);
    tracing::info!(best, simulations = stats.simulations, restarts = stats.restarts, "sequence pair done");

    let (layout, _) = state.realize();
    let layout = layout.clone();
    validate(&layout, nets, cli.alpha, best);
    Ok(layout)
}

/// Post-optimization validation: the reported cost must reproduce from the
/// emitted layout, and the layout must be overlap-free. Failures are
/// warnings; the layout is still printed for inspection.
fn validate(layout: &Layout, nets: &[Net], alpha: f64, best: f64) {
    let (w, h) = layout.bounding_box();
    let recomputed = packing_cost(layout, nets, w, h, alpha);
    if best > 0.0 && (recomputed / best - 1.0).abs() >= 1e-5 {
        tracing::warn!(best, recomputed, "cost does not reproduce from the layout");
    }
    if has_overlap(layout) {
        tracing::warn!("layout contains overlapping modules");
    }
}

#[cfg(test)]
mod tests;
