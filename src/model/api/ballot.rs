use serde::{Deserialize, Serialize};

use crate::model::common::{context::VoteContext, ranking::RankingEntry};

use super::id::ApiId;

/// A ranked ballot as submitted by a voter.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BallotSubmission {
    pub context: VoteContext,
    pub rankings: Vec<RankingEntry>,
}

/// Acknowledgement of an accepted ballot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BallotReceipt {
    pub ballot_id: ApiId,
    pub context: VoteContext,
}

#[cfg(test)]
mod examples {
    use crate::model::common::ranking::entries;

    use super::*;

    impl BallotSubmission {
        pub fn example() -> Self {
            Self {
                context: VoteContext::example(),
                rankings: entries(&[(1, 1), (2, 2), (3, 3)]),
            }
        }
    }
}
