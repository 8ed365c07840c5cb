use serde::{Deserialize, Serialize};

use crate::model::common::{context::VoteContext, ActivityId};

/// Head-to-head result between two candidates, with `a < b`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PairwiseCount {
    pub a: ActivityId,
    pub b: ActivityId,
    /// Ballots ranking `a` ahead of `b`.
    pub a_over_b: u32,
    /// Ballots ranking `b` ahead of `a`.
    pub b_over_a: u32,
}

/// The outcome of a Condorcet aggregation over one context.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CondorcetResult {
    pub context: VoteContext,
    /// The candidate set considered, in ascending order.
    pub candidates: Vec<ActivityId>,
    /// `None` when no candidate beats every other one.
    pub winner: Option<ActivityId>,
    /// Only duels in which at least one ballot expressed a preference.
    pub pairwise: Vec<PairwiseCount>,
}
