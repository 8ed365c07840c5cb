use std::collections::BTreeSet;
use std::sync::Arc;

use crate::error::{Error, Result};
use crate::model::{
    api::condorcet::CondorcetResult,
    common::{
        context::VoteContext,
        ranking::{Ranking, RankingEntry},
        ActivityId,
    },
    db::ballot::NewBallot,
    mongodb::Id,
};

use super::{
    store::{BallotStore, StoreError},
    tally::Tally,
    winner::find_winner,
};

/// Accepts ranked ballots and aggregates them into a group choice.
///
/// Cheap to clone; all clones share the same store handle.
#[derive(Clone)]
pub struct PreferenceEngine {
    store: Arc<dyn BallotStore>,
}

impl PreferenceEngine {
    pub fn new(store: Arc<dyn BallotStore>) -> Self {
        Self { store }
    }

    /// Validate and persist a voter's ranking for a context, returning the new
    /// ballot's ID.
    ///
    /// Nothing is written unless validation passes. Whether the voter already
    /// voted is decided by the store at commit time, so concurrent submissions
    /// for the same voter and context yield exactly one success.
    pub async fn submit_ballot(
        &self,
        voter_id: Id,
        context: VoteContext,
        rankings: Vec<RankingEntry>,
    ) -> Result<Id> {
        let ranking = Ranking::new(rankings)?;
        context.validate()?;

        let ballot = NewBallot::new(voter_id, context);
        match self.store.insert_ballot(&ballot, &ranking).await {
            Ok(ballot_id) => {
                info!(
                    "Voter {voter_id} cast ballot {ballot_id} ranking {} candidates in {}",
                    ranking.len(),
                    ballot.context
                );
                Ok(ballot_id)
            }
            Err(StoreError::UniqueViolation) => {
                warn!("Voter {voter_id} already voted in {}", ballot.context);
                Err(Error::DuplicateVote)
            }
            Err(StoreError::Unavailable(msg)) => {
                error!("Failed to store ballot for voter {voter_id}: {msg}");
                Err(Error::StoreUnavailable(msg))
            }
        }
    }

    /// Compute the Condorcet winner for a context.
    ///
    /// If `candidates` is empty, the candidate set is every activity ranked in
    /// the context. Fails with [`Error::NotFound`] if nobody has voted in the
    /// context; a vote with no winner is a successful result.
    pub async fn compute_condorcet_winner(
        &self,
        context: VoteContext,
        candidates: &[ActivityId],
    ) -> Result<CondorcetResult> {
        context.validate()?;

        let rankings = self
            .store
            .rankings_for_context(&context)
            .await
            .map_err(|err| Error::StoreUnavailable(err.to_string()))?;
        if rankings.is_empty() {
            return Err(Error::not_found(format!("Ballots for {context}")));
        }

        let candidate_set = if candidates.is_empty() {
            rankings
                .values()
                .flat_map(|ranks| ranks.keys().copied())
                .collect::<BTreeSet<_>>()
        } else {
            candidates.iter().copied().collect::<BTreeSet<_>>()
        };

        let tally = Tally::build(&candidate_set, &rankings);
        let candidates = candidate_set.into_iter().collect::<Vec<_>>();
        let winner = find_winner(&candidates, &tally);
        debug!(
            "Aggregated {} ballots over {} candidates in {context}: winner {winner:?}",
            rankings.len(),
            candidates.len()
        );

        Ok(CondorcetResult {
            context,
            candidates,
            winner,
            pairwise: tally.pairwise(),
        })
    }
}
