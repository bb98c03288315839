//! Cycle decomposition and the pass/fail rule of the cycle-following strategy.
//!
//! Prisoner `i` opens box `i`, then the box named by its contents, and so on.
//! They find their own label exactly when the cycle through `i` closes, so the
//! whole group succeeds iff no cycle is longer than the per-prisoner budget.
//!
//! Decomposition walks every index once across all cycles: a shared visited
//! set means no cycle is ever re-walked from a different starting point.

#![allow(missing_docs)]

use crate::sim::permutation::Permutation;

/// Outcome of a single trial. Owns the permutation so it can be logged.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrialOutcome {
    pub permutation: Permutation,
    pub success: bool,
}

impl TrialOutcome {
    /// Label written to the experiment log.
    #[must_use]
    pub const fn label(&self) -> &'static str {
        if self.success { "success" } else { "fail" }
    }
}

/// Boxes each prisoner may open: `max(1, n / 2)`.
#[must_use]
pub fn success_threshold(n: usize) -> usize {
    (n / 2).max(1)
}

/// Lazily yields the length of each cycle, in order of the smallest index the
/// cycle contains.
#[derive(Debug)]
pub struct Cycles<'a> {
    mapping: &'a [usize],
    visited: Vec<bool>,
    next_start: usize,
}

impl<'a> Cycles<'a> {
    #[must_use]
    pub fn new(permutation: &'a Permutation) -> Self {
        let mapping = permutation.as_slice();
        Self {
            mapping,
            visited: vec![false; mapping.len()],
            next_start: 0,
        }
    }
}

impl Iterator for Cycles<'_> {
    type Item = usize;

    fn next(&mut self) -> Option<usize> {
        while self.next_start < self.mapping.len() && self.visited[self.next_start] {
            self.next_start += 1;
        }
        let start = self.next_start;
        if start >= self.mapping.len() {
            return None;
        }

        let mut length = 0;
        let mut j = start;
        while !self.visited[j] {
            self.visited[j] = true;
            j = self.mapping[j];
            length += 1;
        }
        Some(length)
    }
}

/// Full list of cycle lengths. Sums to `permutation.len()`.
#[must_use]
pub fn cycle_lengths(permutation: &Permutation) -> Vec<usize> {
    Cycles::new(permutation).collect()
}

/// Length of the longest cycle (0 for an empty permutation).
#[must_use]
pub fn longest_cycle(permutation: &Permutation) -> usize {
    Cycles::new(permutation).max().unwrap_or(0)
}

/// Whether every cycle fits the budget. Stops at the first cycle that does not.
#[must_use]
pub fn all_cycles_within(permutation: &Permutation, threshold: usize) -> bool {
    Cycles::new(permutation).all(|length| length <= threshold)
}

/// Decide a trial: success iff no cycle exceeds [`success_threshold`].
#[must_use]
pub fn evaluate(permutation: Permutation) -> TrialOutcome {
    let threshold = success_threshold(permutation.len());
    let success = all_cycles_within(&permutation, threshold);
    TrialOutcome {
        permutation,
        success,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn perm(values: &[usize]) -> Permutation {
        Permutation::try_from_vec(values.to_vec()).unwrap()
    }

    #[test]
    fn threshold_is_half_with_floor_of_one() {
        assert_eq!(success_threshold(1), 1);
        assert_eq!(success_threshold(2), 1);
        assert_eq!(success_threshold(4), 2);
        assert_eq!(success_threshold(100), 50);
        assert_eq!(success_threshold(101), 50);
    }

    #[test]
    fn two_transpositions_succeed() {
        let outcome = evaluate(perm(&[1, 0, 3, 2]));
        assert!(outcome.success);
        assert_eq!(outcome.label(), "success");
        assert_eq!(outcome.permutation.as_slice(), &[1, 0, 3, 2]);
    }

    #[test]
    fn single_four_cycle_fails() {
        let outcome = evaluate(perm(&[1, 2, 3, 0]));
        assert!(!outcome.success);
        assert_eq!(outcome.label(), "fail");
    }

    #[test]
    fn identity_always_succeeds() {
        for n in (2..=200).step_by(2) {
            assert!(evaluate(Permutation::identity(n)).success, "n={n}");
        }
    }

    #[test]
    fn full_rotation_always_fails() {
        for n in (2..=200).step_by(2) {
            let rotation: Vec<usize> = (0..n).map(|i| (i + 1) % n).collect();
            assert!(!evaluate(perm(&rotation)).success, "n={n}");
        }
    }

    #[test]
    fn cycle_lengths_in_start_order() {
        // (0 2 4) (1) (3 5)
        let p = perm(&[2, 1, 4, 5, 0, 3]);
        assert_eq!(cycle_lengths(&p), vec![3, 1, 2]);
        assert_eq!(longest_cycle(&p), 3);
    }

    #[test]
    fn cycle_exactly_at_threshold_passes() {
        // N = 6, threshold 3: (0 1 2) (3 4 5)
        let p = perm(&[1, 2, 0, 4, 5, 3]);
        assert!(evaluate(p).success);
        // N = 6: (0 1 2 3) (4 5) has a 4-cycle.
        let p = perm(&[1, 2, 3, 0, 5, 4]);
        assert!(!evaluate(p).success);
    }

    #[test]
    fn short_circuit_agrees_with_full_decomposition() {
        use rand::SeedableRng;
        let mut rng = rand::rngs::StdRng::seed_from_u64(7);
        for _ in 0..500 {
            let p = Permutation::random(40, &mut rng);
            let expected = longest_cycle(&p) <= success_threshold(40);
            assert_eq!(evaluate(p).success, expected);
        }
    }

    #[test]
    fn fixed_point_on_singleton() {
        let p = Permutation::identity(1);
        assert_eq!(cycle_lengths(&p), vec![1]);
        assert!(evaluate(p).success);
    }
}
