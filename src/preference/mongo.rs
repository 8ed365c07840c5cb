use std::time::{Duration, Instant};

use mongodb::{
    bson::doc, error::Error as DbError, options::SessionOptions, Client, ClientSession, Database,
};
use rocket::tokio::time::sleep;

use crate::model::{
    common::{context::VoteContext, ranking::Ranking},
    db::ballot::{Ballot, NewBallot, PreferenceRank, PreferenceRankCore},
    mongodb::{is_duplicate_key_error, is_transient_transaction_error, Coll, Id},
};

use super::store::{BallotStore, RankingsByBallot, StoreError};

/// How long to keep re-running a ballot transaction the server reports as
/// transient. Matches the driver's own `with_transaction` limit.
const TRANSACTION_RETRY_DEADLINE: Duration = Duration::from_secs(120);

/// First pause between attempts; doubled after each transient failure.
const INITIAL_BACKOFF: Duration = Duration::from_millis(5);
const MAX_BACKOFF: Duration = Duration::from_millis(500);

/// Why one attempt at the ballot transaction failed.
enum AttemptError {
    /// The ballot insert hit the one-ballot-per-context unique index.
    Duplicate,
    Db(DbError),
}

impl From<DbError> for AttemptError {
    fn from(err: DbError) -> Self {
        Self::Db(err)
    }
}

/// A [`BallotStore`] backed by MongoDB multi-document transactions.
///
/// Requires the server to run as a replica set.
#[derive(Clone)]
pub struct MongoBallotStore {
    client: Client,
    ballots: Coll<Ballot>,
    ranks: Coll<PreferenceRank>,
}

impl MongoBallotStore {
    pub fn new(client: Client, db: &Database) -> Self {
        Self {
            client,
            ballots: Coll::from_db(db),
            ranks: Coll::from_db(db),
        }
    }

    /// Run the ballot transaction once, aborting it on any failure.
    async fn try_insert(&self, ballot: &NewBallot, ranking: &Ranking) -> Result<Id, AttemptError> {
        let mut session = self.client.start_session(None).await?;
        session.start_transaction(None).await?;

        match self.write_ballot(&mut session, ballot, ranking).await {
            Ok(id) => {
                session.commit_transaction().await?;
                Ok(id)
            }
            Err(err) => {
                if let Err(abort_err) = session.abort_transaction().await {
                    debug!("Failed to abort ballot transaction: {abort_err}");
                }
                Err(err)
            }
        }
    }

    async fn write_ballot(
        &self,
        session: &mut ClientSession,
        ballot: &NewBallot,
        ranking: &Ranking,
    ) -> Result<Id, AttemptError> {
        let ballot = Ballot {
            id: Id::new(),
            ballot: ballot.clone(),
        };
        self.ballots
            .insert_one_with_session(&ballot, None, session)
            .await
            .map_err(|err| {
                if is_duplicate_key_error(&err) {
                    AttemptError::Duplicate
                } else {
                    AttemptError::Db(err)
                }
            })?;

        let ranks = ranking
            .iter()
            .map(|entry| PreferenceRank {
                id: Id::new(),
                entry: PreferenceRankCore {
                    ballot_id: ballot.id,
                    activity_id: entry.activity_id,
                    rank: entry.rank,
                },
            })
            .collect::<Vec<_>>();
        self.ranks
            .insert_many_with_session(&ranks, None, session)
            .await?;

        Ok(ballot.id)
    }
}

#[rocket::async_trait]
impl BallotStore for MongoBallotStore {
    async fn insert_ballot(&self, ballot: &NewBallot, ranking: &Ranking) -> Result<Id, StoreError> {
        // A racing transaction on the same voter and context makes this one
        // fail with a transient write conflict until the winner commits, after
        // which a re-run observes the duplicate key.
        let deadline = Instant::now() + TRANSACTION_RETRY_DEADLINE;
        let mut backoff = INITIAL_BACKOFF;
        let mut attempt = 1;
        loop {
            match self.try_insert(ballot, ranking).await {
                Ok(id) => return Ok(id),
                Err(AttemptError::Duplicate) => return Err(StoreError::UniqueViolation),
                Err(AttemptError::Db(err)) if is_duplicate_key_error(&err) => {
                    return Err(StoreError::UniqueViolation)
                }
                Err(AttemptError::Db(err))
                    if is_transient_transaction_error(&err) && Instant::now() < deadline =>
                {
                    debug!("Retrying ballot transaction (attempt {attempt}) after transient failure: {err}");
                    sleep(backoff).await;
                    backoff = (backoff * 2).min(MAX_BACKOFF);
                    attempt += 1;
                }
                Err(AttemptError::Db(err)) => return Err(err.into()),
            }
        }
    }

    async fn rankings_for_context(
        &self,
        context: &VoteContext,
    ) -> Result<RankingsByBallot, StoreError> {
        // Read ballots and their ranks from one consistent snapshot.
        let session_options = SessionOptions::builder().snapshot(true).build();
        let mut session = self.client.start_session(Some(session_options)).await?;

        let mut ballot_ids = Vec::new();
        let mut ballots = self
            .ballots
            .find_with_session(context.as_filter(), None, &mut session)
            .await?;
        while let Some(ballot) = ballots.next(&mut session).await {
            ballot_ids.push(ballot?.id);
        }
        if ballot_ids.is_empty() {
            return Ok(RankingsByBallot::new());
        }

        let mut rankings = RankingsByBallot::new();
        let ranks_filter = doc! {
            "ballot_id": { "$in": ballot_ids },
        };
        let mut ranks = self
            .ranks
            .find_with_session(ranks_filter, None, &mut session)
            .await?;
        while let Some(rank) = ranks.next(&mut session).await {
            let rank = rank?;
            rankings
                .entry(rank.ballot_id)
                .or_default()
                .insert(rank.activity_id, rank.rank);
        }

        Ok(rankings)
    }
}
