use std::collections::HashMap;
use std::sync::Mutex;

use crate::model::{
    common::{context::VoteContext, ranking::Ranking, ActivityId},
    db::ballot::NewBallot,
    mongodb::Id,
};

use super::store::{BallotStore, RankingsByBallot, StoreError};

#[derive(Default)]
struct MemoryState {
    /// Enforces one ballot per voter per context.
    voters: HashMap<(Id, VoteContext), Id>,
    ballots: HashMap<Id, (VoteContext, HashMap<ActivityId, i64>)>,
}

/// A [`BallotStore`] held in process memory, for exercising the engine
/// without a database. A single lock makes every insert atomic.
#[derive(Default)]
pub struct MemoryBallotStore {
    state: Mutex<MemoryState>,
}

impl MemoryBallotStore {
    pub fn ballot_count(&self) -> usize {
        self.state.lock().unwrap().ballots.len()
    }
}

#[rocket::async_trait]
impl BallotStore for MemoryBallotStore {
    async fn insert_ballot(&self, ballot: &NewBallot, ranking: &Ranking) -> Result<Id, StoreError> {
        let mut state = self
            .state
            .lock()
            .map_err(|_| StoreError::Unavailable("store lock poisoned".to_string()))?;

        let key = (ballot.voter_id, ballot.context.clone());
        if state.voters.contains_key(&key) {
            return Err(StoreError::UniqueViolation);
        }

        let id = Id::new();
        let ranks = ranking
            .iter()
            .map(|entry| (entry.activity_id, entry.rank))
            .collect();
        state.voters.insert(key, id);
        state.ballots.insert(id, (ballot.context.clone(), ranks));
        Ok(id)
    }

    async fn rankings_for_context(
        &self,
        context: &VoteContext,
    ) -> Result<RankingsByBallot, StoreError> {
        let state = self
            .state
            .lock()
            .map_err(|_| StoreError::Unavailable("store lock poisoned".to_string()))?;

        Ok(state
            .ballots
            .iter()
            .filter(|(_, (ballot_context, _))| ballot_context == context)
            .map(|(id, (_, ranks))| (*id, ranks.clone()))
            .collect())
    }
}
