use rand::Rng;
use thiserror::Error;

/// The neighborhood operators of the sequence-pair representation.
///
/// All operators are reversible: swaps and reversals are involutions, a
/// module rotation undoes itself, and a one-step sequence rotation is undone
/// by rotating the other way.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Change {
    /// Rotate one module by 90 degrees.
    Rotate,
    SwapX,
    SwapY,
    SwapXy,
    ReverseX,
    ReverseY,
    ReverseXy,
    RotateX,
    RotateY,
    RotateXy,
}

pub const CHANGE_COUNT: usize = 10;

const ALL_CHANGES: [Change; CHANGE_COUNT] = [
    Change::Rotate,
    Change::SwapX,
    Change::SwapY,
    Change::SwapXy,
    Change::ReverseX,
    Change::ReverseY,
    Change::ReverseXy,
    Change::RotateX,
    Change::RotateY,
    Change::RotateXy,
];

#[derive(Debug, Error, PartialEq)]
pub enum DistributionError {
    #[error("negative probability {weight} for {change:?}")]
    NegativeWeight { change: Change, weight: f64 },
}

/// A normalized discrete distribution over [`Change`], sampled with one
/// uniform draw and a binary search on the cumulative table.
///
/// Zero weights are allowed and disable an operator (up to a vanishing
/// epsilon that keeps the table strictly increasing).
#[derive(Clone, Debug, PartialEq)]
pub struct ChangeDistribution {
    cdf: [f64; CHANGE_COUNT],
}

impl Default for ChangeDistribution {
    /// Equal weight for each segment reversal and rotation, and 6/9 for
    /// module rotation.
    fn default() -> Self {
        ChangeDistribution::from_pairs(&[
            (Change::ReverseX, 1.0),
            (Change::ReverseY, 1.0),
            (Change::ReverseXy, 1.0),
            (Change::RotateX, 1.0),
            (Change::RotateY, 1.0),
            (Change::RotateXy, 1.0),
            (Change::Rotate, 6.0 / 9.0),
        ])
        .unwrap()
    }
}

impl ChangeDistribution {
    /// Build from one weight per operator, in [`Change`] declaration order.
    /// On a negative weight the error carries the offending operator and the
    /// target distribution is not constructed.
    pub fn from_weights(weights: &[f64; CHANGE_COUNT]) -> Result<Self, DistributionError> {
        for (k, &w) in weights.iter().enumerate() {
            if w < 0.0 {
                return Err(DistributionError::NegativeWeight {
                    change: ALL_CHANGES[k],
                    weight: w,
                });
            }
        }
        let mut cdf = *weights;
        for w in &mut cdf {
            *w += f64::EPSILON;
        }
        let mut acc = 0.0;
        for w in &mut cdf {
            acc += *w;
            *w = acc;
        }
        for w in &mut cdf {
            *w /= acc;
        }
        Ok(ChangeDistribution { cdf })
    }

    /// Build from `(operator, weight)` pairs; weights of repeated operators
    /// add up, unlisted operators get zero.
    pub fn from_pairs(pairs: &[(Change, f64)]) -> Result<Self, DistributionError> {
        let mut weights = [0.0; CHANGE_COUNT];
        for &(change, w) in pairs {
            weights[change as usize] += w;
        }
        Self::from_weights(&weights)
    }

    pub fn sample(&self, rng: &mut impl Rng) -> Change {
        let x: f64 = rng.gen();
        let k = self.cdf.partition_point(|&c| c < x);
        ALL_CHANGES[k.min(CHANGE_COUNT - 1)]
    }
}
