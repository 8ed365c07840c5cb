use std::ops::Deref;

use chrono::{DateTime, Utc};
use mongodb::bson::serde_helpers::chrono_datetime_as_bson_datetime;
use serde::{Deserialize, Serialize};

use crate::model::{
    common::{context::VoteContext, ActivityId},
    mongodb::Id,
};

/// Core ballot data, as stored in the database. The ranking itself lives in
/// the `preference_ranks` collection, keyed by the ballot's ID.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BallotCore {
    /// Foreign Key user ID of the voter.
    pub voter_id: Id,
    /// The voting period this ballot belongs to.
    pub context: VoteContext,
    #[serde(with = "chrono_datetime_as_bson_datetime")]
    pub created_at: DateTime<Utc>,
}

impl BallotCore {
    pub fn new(voter_id: Id, context: VoteContext) -> Self {
        Self {
            voter_id,
            context,
            created_at: Utc::now(),
        }
    }
}

/// A ballot without an ID.
pub type NewBallot = BallotCore;

/// A ballot from the database, with its unique ID.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Ballot {
    #[serde(rename = "_id")]
    pub id: Id,
    #[serde(flatten)]
    pub ballot: BallotCore,
}

impl Deref for Ballot {
    type Target = BallotCore;

    fn deref(&self) -> &Self::Target {
        &self.ballot
    }
}

/// A single candidate's rank within a ballot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PreferenceRankCore {
    /// Foreign Key ballot ID.
    pub ballot_id: Id,
    pub activity_id: ActivityId,
    pub rank: i64,
}

/// A preference rank as stored, with its unique ID.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PreferenceRank {
    #[serde(rename = "_id")]
    pub id: Id,
    #[serde(flatten)]
    pub entry: PreferenceRankCore,
}

impl Deref for PreferenceRank {
    type Target = PreferenceRankCore;

    fn deref(&self) -> &Self::Target {
        &self.entry
    }
}
