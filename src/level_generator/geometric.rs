//! Geometric level generator.

use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};
use thiserror::Error;

use crate::level_generator::LevelGenerator;

/// Errors that can occur when creating a [`Geometric`] level generator.
#[derive(Error, Debug, PartialEq, Eq)]
#[non_exhaustive]
pub enum GeometricError {
    /// The maximum height must be non-zero.
    #[error("total must be non-zero.")]
    ZeroTotal,
    /// The probability `p` must be in the range `(0, 1)`.
    #[error("p must be in (0, 1).")]
    InvalidProbability,
}

/// A level generator producing geometrically distributed heights.
///
/// A height of at least `k` is drawn with probability `p^(k-1)`, truncated
/// at the maximum height: starting from 1, the height is incremented while a
/// fresh 16-bit uniform draw falls below `p * 0xFFFF`.  With the default
/// `p = 1/4` a node has one link in expectation `3/4` of the time, two links
/// `3/16` of the time, and so on.
#[derive(Debug)]
pub struct Geometric {
    /// The maximum height that will ever be drawn.
    total: usize,
    /// The probability that a node present at one level reaches the next.
    p: f64,
    /// The random number generator.
    rng: SmallRng,
}

impl Geometric {
    /// Create a new geometric level generator drawing heights in
    /// `[1, total]`, where `p` is the probability that a node present at one
    /// level is also present at the level above.
    ///
    /// The generator is seeded from the system entropy source; use
    /// [`Geometric::with_seed`] for reproducible draws.
    ///
    /// # Errors
    ///
    /// `total` must be non-zero and `p` must lie strictly between 0 and 1.
    pub fn new(total: usize, p: f64) -> Result<Self, GeometricError> {
        Self::from_rng(total, p, SmallRng::from_entropy())
    }

    /// Create a new geometric level generator with a fixed seed.
    ///
    /// Two generators constructed with the same parameters and seed draw
    /// identical height sequences, which makes the link structure of a list
    /// reproducible across runs.
    ///
    /// # Errors
    ///
    /// `total` must be non-zero and `p` must lie strictly between 0 and 1.
    pub fn with_seed(total: usize, p: f64, seed: u64) -> Result<Self, GeometricError> {
        Self::from_rng(total, p, SmallRng::seed_from_u64(seed))
    }

    fn from_rng(total: usize, p: f64, rng: SmallRng) -> Result<Self, GeometricError> {
        if total == 0 {
            return Err(GeometricError::ZeroTotal);
        }
        if !(0.0 < p && p < 1.0) {
            return Err(GeometricError::InvalidProbability);
        }
        Ok(Geometric { total, p, rng })
    }
}

impl LevelGenerator for Geometric {
    fn total(&self) -> usize {
        self.total
    }

    fn level(&mut self) -> usize {
        let threshold = self.p * f64::from(u16::MAX);
        let mut height = 1;
        while height < self.total && f64::from(self.rng.gen::<u16>()) < threshold {
            height += 1;
        }
        height
    }
}
