use std::cmp::Ordering;
use std::collections::{BTreeSet, HashMap};

use crate::model::{api::condorcet::PairwiseCount, common::ActivityId};

use super::store::RankingsByBallot;

/// Pairwise preference counts: for each ordered pair `(a, b)`, the number of
/// ballots ranking `a` strictly ahead of `b`.
///
/// Building a tally costs O(ballots × candidates²).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Tally {
    counts: HashMap<(ActivityId, ActivityId), u32>,
}

impl Tally {
    /// Count pairwise preferences over `candidates` across all ballots.
    ///
    /// A ballot only takes part in the duels between candidates it actually
    /// ranks; leaving a candidate out is not the same as ranking it last.
    pub fn build(candidates: &BTreeSet<ActivityId>, rankings: &RankingsByBallot) -> Self {
        let mut counts = HashMap::new();
        for ranks in rankings.values() {
            let present = candidates
                .iter()
                .filter_map(|&candidate| ranks.get(&candidate).map(|&rank| (candidate, rank)))
                .collect::<Vec<_>>();

            for (i, &(a, rank_a)) in present.iter().enumerate() {
                for &(b, rank_b) in &present[i + 1..] {
                    let duel = match rank_a.cmp(&rank_b) {
                        Ordering::Less => (a, b),
                        Ordering::Greater => (b, a),
                        // Stored ballots never tie, but a tie expresses no preference.
                        Ordering::Equal => continue,
                    };
                    *counts.entry(duel).or_insert(0) += 1;
                }
            }
        }
        Self { counts }
    }

    /// Number of ballots ranking `a` ahead of `b`.
    pub fn preferring(&self, a: ActivityId, b: ActivityId) -> u32 {
        self.counts.get(&(a, b)).copied().unwrap_or(0)
    }

    /// Whether a strict majority of the ballots ranking both prefer `a` to `b`.
    pub fn beats(&self, a: ActivityId, b: ActivityId) -> bool {
        self.preferring(a, b) > self.preferring(b, a)
    }

    #[cfg(test)]
    pub fn is_empty(&self) -> bool {
        self.counts.is_empty()
    }

    /// Every duel at least one ballot expressed a preference in, reported
    /// once per unordered pair with the lower ID first and both directions
    /// explicit.
    pub fn pairwise(&self) -> Vec<PairwiseCount> {
        let pairs = self
            .counts
            .keys()
            .map(|&(a, b)| (a.min(b), a.max(b)))
            .collect::<BTreeSet<_>>();
        pairs
            .into_iter()
            .map(|(a, b)| PairwiseCount {
                a,
                b,
                a_over_b: self.preferring(a, b),
                b_over_a: self.preferring(b, a),
            })
            .collect()
    }
}
