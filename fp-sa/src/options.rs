use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Simulated-annealing schedule parameters.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct SaOptions {
    /// Probability of accepting an average uphill move at the starting
    /// temperature; in (0, 1).
    pub p_init: f64,
    /// Moves simulated per temperature; at least 1.
    pub reps_per_t: usize,
    /// Geometric cooling factor; in (0, 1).
    pub cooling_ratio: f64,
    /// Restore the best state when the temperature's average cost exceeds
    /// `restart_ratio` times the best cost; greater than 1.
    pub restart_ratio: f64,
    /// Terminate once the acceptance rate drops below this; in (0, 1].
    pub p_stop: f64,
}

impl Default for SaOptions {
    fn default() -> Self {
        SaOptions {
            p_init: 0.9,
            reps_per_t: 1024,
            cooling_ratio: 0.9,
            restart_ratio: 2.0,
            p_stop: 0.05,
        }
    }
}

#[derive(Debug, Error, PartialEq)]
pub enum OptionsError {
    #[error("expected five numeric tokens, found {0}")]
    TokenCount(usize),
    #[error("malformed numeric token {0:?}")]
    BadToken(String),
    #[error("{name} = {value} is out of range; expected {range}")]
    OutOfRange {
        name: &'static str,
        value: f64,
        range: &'static str,
    },
}

impl SaOptions {
    /// Default options scaled to the instance: more moves per temperature
    /// for larger designs.
    pub fn for_size(n: usize) -> Self {
        SaOptions {
            reps_per_t: (30 * n).max(1024),
            ..SaOptions::default()
        }
    }

    pub fn validate(&self) -> Result<(), OptionsError> {
        fn check(
            ok: bool,
            name: &'static str,
            value: f64,
            range: &'static str,
        ) -> Result<(), OptionsError> {
            if ok {
                Ok(())
            } else {
                Err(OptionsError::OutOfRange { name, value, range })
            }
        }
        check(
            self.p_init > 0.0 && self.p_init < 1.0,
            "p_init",
            self.p_init,
            "(0, 1)",
        )?;
        check(
            self.reps_per_t >= 1,
            "reps_per_t",
            self.reps_per_t as f64,
            ">= 1",
        )?;
        check(
            self.cooling_ratio > 0.0 && self.cooling_ratio < 1.0,
            "cooling_ratio",
            self.cooling_ratio,
            "(0, 1)",
        )?;
        check(
            self.restart_ratio > 1.0,
            "restart_ratio",
            self.restart_ratio,
            "> 1",
        )?;
        check(
            self.p_stop > 0.0 && self.p_stop <= 1.0,
            "p_stop",
            self.p_stop,
            "(0, 1]",
        )
    }

    /// Parse the five-value options file: `p_init reps_per_t cooling_ratio
    /// restart_ratio p_stop`, whitespace-separated. The result is validated.
    pub fn parse(text: &str) -> Result<Self, OptionsError> {
        let tokens: Vec<&str> = text.split_whitespace().collect();
        if tokens.len() != 5 {
            return Err(OptionsError::TokenCount(tokens.len()));
        }
        fn num(token: &str) -> Result<f64, OptionsError> {
            token
                .parse()
                .map_err(|_| OptionsError::BadToken(token.to_string()))
        }
        let reps = num(tokens[1])?;
        if reps < 0.0 || reps.fract() != 0.0 {
            return Err(OptionsError::BadToken(tokens[1].to_string()));
        }
        let opts = SaOptions {
            p_init: num(tokens[0])?,
            reps_per_t: reps as usize,
            cooling_ratio: num(tokens[2])?,
            restart_ratio: num(tokens[3])?,
            p_stop: num(tokens[4])?,
        };
        opts.validate()?;
        Ok(opts)
    }
}
