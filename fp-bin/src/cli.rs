use clap::{Parser, ValueEnum};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum, Serialize, Deserialize)]
pub enum Method {
    /// Scalar slicing tree (moves M1-M4).
    Polish,
    /// Shape-curve slicing tree (moves M1-M3).
    PolishCurve,
    /// Sequence pair with the O(n log n) LCS evaluator.
    Lcs,
    /// Sequence pair with the O(n^2) DAG evaluator.
    Dag,
}

impl Method {
    pub fn is_tree(self) -> bool {
        matches!(self, Method::Polish | Method::PolishCurve)
    }
}

#[derive(Parser, Debug, Clone)]
#[clap(author, about, disable_version_flag(true))]
pub struct Cli {
    /// A YAL macro-cell file to place; stdin when omitted.
    #[clap(short, long, display_order = 1)]
    pub input: Option<PathBuf>,

    /// Write `x y w h` placement lines here; stdout when omitted.
    #[clap(short, long, display_order = 1)]
    pub output: Option<PathBuf>,

    /// Floorplan representation and evaluator.
    #[clap(short, long, value_enum, default_value_t = Method::PolishCurve)]
    pub method: Method,

    /// Outer stability rounds for the tree methods. Non-positive values
    /// fall back to the default.
    #[clap(short, long, default_value_t = 10)]
    pub rounds: i32,

    /// Five-value SA options file, in order: p_init reps_per_t
    /// cooling_ratio restart_ratio p_stop.
    #[clap(short = 'O', long = "option")]
    pub option: Option<PathBuf>,

    /// Area/wirelength trade-off in [0, 1] for the sequence-pair methods
    /// (1 = area only).
    #[clap(short, long, default_value_t = 1.0)]
    pub alpha: f64,

    /// Random seed; two runs with equal seeds, inputs, and options produce
    /// identical output.
    #[clap(short, long, default_value_t = 42)]
    pub seed: u64,

    /// 0 = warnings only, 1 = run summaries, 2 = per-temperature progress.
    #[clap(short, long, default_value_t = 0)]
    pub verbose: u8,
}
