use derive_more::AddAssign;

#[derive(Clone, Copy, Debug, Default, AddAssign)]
pub struct Timing {
    /// Whole run, seconds.
    pub total: f32,
    /// Temperature bootstrap only.
    pub bootstrap: f32,
}

/// Counters of one annealing run; `+=` merges runs (outer rounds).
#[derive(Clone, Copy, Debug, Default, AddAssign)]
pub struct SaStats {
    /// Moves evaluated, bootstrap probes included.
    pub simulations: usize,
    /// Times the state was reset to the best snapshot.
    pub restarts: usize,
    /// Annealing runs merged into this record.
    pub rounds: usize,
    pub timing: Timing,
}
