use std::collections::HashMap;

use mongodb::error::Error as DbError;
use thiserror::Error;

use crate::model::{
    common::{context::VoteContext, ranking::Ranking, ActivityId},
    db::ballot::NewBallot,
    mongodb::Id,
};

/// Each stored ballot's ranking: ballot ID to (candidate to rank).
pub type RankingsByBallot = HashMap<Id, HashMap<ActivityId, i64>>;

/// Failures reported by a [`BallotStore`].
#[derive(Debug, Error)]
pub enum StoreError {
    /// The voter already has a ballot for the context.
    #[error("ballot uniqueness constraint violated")]
    UniqueViolation,
    /// The write could not be committed, or the read could not be served.
    #[error("{0}")]
    Unavailable(String),
}

impl From<DbError> for StoreError {
    fn from(err: DbError) -> Self {
        Self::Unavailable(err.to_string())
    }
}

/// Persistence for ballots and their ranks.
#[rocket::async_trait]
pub trait BallotStore: Send + Sync {
    /// Atomically persist a ballot together with one rank per ranking entry.
    ///
    /// Either everything is written or nothing is. Uniqueness of
    /// `(voter_id, context)` must be enforced at commit time, and a violation
    /// reported as [`StoreError::UniqueViolation`].
    async fn insert_ballot(&self, ballot: &NewBallot, ranking: &Ranking) -> Result<Id, StoreError>;

    /// Read every ranking cast in the given context as one consistent snapshot.
    async fn rankings_for_context(
        &self,
        context: &VoteContext,
    ) -> Result<RankingsByBallot, StoreError>;
}
