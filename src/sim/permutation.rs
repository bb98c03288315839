//! Box contents for one trial: a bijection on `0..N` drawn uniformly at random.

#![allow(missing_docs)]

use std::fmt;

use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use serde::Serialize;

use crate::core::errors::{Result, SimError};

/// A permutation of `0..N`. Position `i` holds the label found inside box `i`,
/// which is also the next box a prisoner following the cycle opens.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct Permutation(Vec<usize>);

impl Permutation {
    /// The identity mapping `i -> i`.
    #[must_use]
    pub fn identity(n: usize) -> Self {
        Self((0..n).collect())
    }

    /// Draw a permutation uniformly from all `n!` orderings.
    ///
    /// Uses the Fisher–Yates shuffle provided by [`SliceRandom::shuffle`].
    /// `n == 0` is a caller bug and panics.
    pub fn random<R: Rng + ?Sized>(n: usize, rng: &mut R) -> Self {
        assert!(n >= 1, "permutation size must be >= 1, got {n}");
        let mut boxes: Vec<usize> = (0..n).collect();
        boxes.shuffle(rng);
        Self(boxes)
    }

    /// Wrap externally supplied box contents, checking that every value in
    /// `0..len` appears exactly once.
    pub fn try_from_vec(values: Vec<usize>) -> Result<Self> {
        let n = values.len();
        if n == 0 {
            return Err(SimError::invalid_input("permutation must not be empty"));
        }
        let mut seen = vec![false; n];
        for (pos, &value) in values.iter().enumerate() {
            if value >= n {
                return Err(SimError::invalid_input(format!(
                    "value {value} at position {pos} is out of range for size {n}"
                )));
            }
            if seen[value] {
                return Err(SimError::invalid_input(format!(
                    "value {value} appears more than once"
                )));
            }
            seen[value] = true;
        }
        Ok(Self(values))
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    #[must_use]
    pub fn as_slice(&self) -> &[usize] {
        &self.0
    }

    #[must_use]
    pub fn into_vec(self) -> Vec<usize> {
        self.0
    }
}

impl fmt::Display for Permutation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}", self.0)
    }
}

/// Build the simulation RNG. A fixed seed reproduces every trial exactly.
#[must_use]
pub fn seeded_rng(seed: Option<u64>) -> StdRng {
    seed.map_or_else(StdRng::from_os_rng, StdRng::seed_from_u64)
}
