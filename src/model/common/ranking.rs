use std::collections::HashSet;
use std::ops::Deref;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

use super::ActivityId;

/// One candidate's position in a voter's ranking. Rank 1 is most preferred.
///
/// Ranks are signed on the wire so that a negative rank reaches validation
/// instead of failing deserialisation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RankingEntry {
    pub activity_id: ActivityId,
    pub rank: i64,
}

/// A ranking that has passed validation: non-empty, with no candidate and no
/// rank value repeated, and every rank positive.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Ranking(Vec<RankingEntry>);

impl Ranking {
    /// Validate raw entries. Checks run in a fixed order and the first
    /// failure is reported.
    pub fn new(entries: Vec<RankingEntry>) -> Result<Self> {
        if entries.is_empty() {
            return Err(Error::Validation("empty ranking".to_string()));
        }

        let mut candidates = HashSet::with_capacity(entries.len());
        if !entries.iter().all(|e| candidates.insert(e.activity_id)) {
            return Err(Error::Validation("duplicate candidate".to_string()));
        }

        let mut ranks = HashSet::with_capacity(entries.len());
        if !entries.iter().all(|e| ranks.insert(e.rank)) {
            return Err(Error::Validation("duplicate rank".to_string()));
        }

        if entries.iter().any(|e| e.rank < 1) {
            return Err(Error::Validation("rank must be positive".to_string()));
        }

        Ok(Self(entries))
    }

}

impl Deref for Ranking {
    type Target = [RankingEntry];

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

/// Build ranking entries from `(activity_id, rank)` pairs.
#[cfg(test)]
pub fn entries(pairs: &[(ActivityId, i64)]) -> Vec<RankingEntry> {
    pairs
        .iter()
        .map(|&(activity_id, rank)| RankingEntry { activity_id, rank })
        .collect()
}
