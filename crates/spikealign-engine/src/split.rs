// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! Screen/test trial split
//!
//! Shuffles a trial-id set and splits it into a screening prefix (used only
//! to determine the preferred side) and a disjoint test remainder (used for
//! every reported statistic and PSTH). Keeping the two disjoint prevents the
//! preference label from being correlated with the data it is tested on.
//!
//! Randomness comes from the caller-owned generator; the same seed always
//! yields the same split.

use rand::seq::SliceRandom;
use rand::Rng;

/// Disjoint screening/test partition of one side's trial ids
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrialSplit {
    pub screened: Vec<i32>,
    pub test: Vec<i32>,
}

/// Shuffle `ids` and take the first `screen_size` as the screening subset
///
/// Invariants: `screened ∩ test = ∅`, `screened ∪ test = ids`, and
/// `|screened| = min(screen_size, |ids|)`.
pub fn screen_test_split<R: Rng + ?Sized>(
    ids: &[i32],
    screen_size: usize,
    rng: &mut R,
) -> TrialSplit {
    let mut shuffled = ids.to_vec();
    shuffled.shuffle(rng);
    let take = screen_size.min(shuffled.len());
    let test = shuffled.split_off(take);
    TrialSplit {
        screened: shuffled,
        test,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn test_split_invariants() {
        let ids: Vec<i32> = (0..20).collect();
        let mut rng = StdRng::seed_from_u64(7);
        let split = screen_test_split(&ids, 5, &mut rng);

        assert_eq!(split.screened.len(), 5);
        assert_eq!(split.test.len(), 15);
        assert!(split.screened.iter().all(|id| !split.test.contains(id)));

        let mut all: Vec<i32> = split
            .screened
            .iter()
            .chain(split.test.iter())
            .copied()
            .collect();
        all.sort_unstable();
        assert_eq!(all, ids);
    }

    #[test]
    fn test_short_set_is_all_screened() {
        let ids = [1, 2, 3];
        let mut rng = StdRng::seed_from_u64(7);
        let split = screen_test_split(&ids, 10, &mut rng);
        assert_eq!(split.screened.len(), 3);
        assert!(split.test.is_empty());
    }

    #[test]
    fn test_deterministic_under_fixed_seed() {
        let ids: Vec<i32> = (0..30).collect();
        let a = screen_test_split(&ids, 10, &mut StdRng::seed_from_u64(99));
        let b = screen_test_split(&ids, 10, &mut StdRng::seed_from_u64(99));
        assert_eq!(a, b);
    }

    #[test]
    fn test_seeds_vary_the_split() {
        let ids: Vec<i32> = (0..30).collect();
        let a = screen_test_split(&ids, 10, &mut StdRng::seed_from_u64(1));
        let b = screen_test_split(&ids, 10, &mut StdRng::seed_from_u64(2));
        assert_ne!(a, b);
    }
}
