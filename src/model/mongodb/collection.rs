use std::ops::Deref;

use mongodb::{
    bson::doc, error::Error as DbError, options::IndexOptions, Collection, Database, IndexModel,
};
use rocket::{
    request::{self, FromRequest, Request},
    State,
};

use crate::model::db::{
    activity::Activity,
    ballot::{Ballot, PreferenceRank},
    history::{HistoryEntry, NewHistoryEntry},
    user::{NewUser, User},
};

/// A type that can be directly inserted/read to/from the database.
pub trait MongoCollection {
    /// The name of the collection.
    const NAME: &'static str;
}

/// A database collection of the given type.
pub struct Coll<T>(Collection<T>);

impl<T> Coll<T>
where
    T: MongoCollection,
{
    /// Get a handle on this collection in the given database.
    pub fn from_db(db: &Database) -> Self {
        Self(db.collection(T::NAME))
    }
}

// `Derive(Clone)` would only derive if `T: Clone`, but we don't need that bound.
impl<T> Clone for Coll<T> {
    fn clone(&self) -> Self {
        Self(self.0.clone())
    }
}

impl<T> Deref for Coll<T> {
    type Target = Collection<T>;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

#[rocket::async_trait]
impl<'r, T> FromRequest<'r> for Coll<T>
where
    T: MongoCollection,
{
    type Error = ();

    /// Get the database connection from the managed state and wrap it in a collection.
    ///
    /// Panics iff the [`Database`] is not managed by [`rocket::Rocket`].
    async fn from_request(req: &'r Request<'_>) -> request::Outcome<Self, Self::Error> {
        let db = req.guard::<&State<Database>>().await.unwrap();
        request::Outcome::Success(Coll::from_db(db))
    }
}

// User collections
const USERS: &str = "users";
impl MongoCollection for User {
    const NAME: &'static str = USERS;
}
impl MongoCollection for NewUser {
    const NAME: &'static str = USERS;
}

// Ballot collections
const BALLOTS: &str = "ballots";
impl MongoCollection for Ballot {
    const NAME: &'static str = BALLOTS;
}

// Preference rank collections
const PREFERENCE_RANKS: &str = "preference_ranks";
impl MongoCollection for PreferenceRank {
    const NAME: &'static str = PREFERENCE_RANKS;
}

// Activity catalog collection
const ACTIVITIES: &str = "activities";
impl MongoCollection for Activity {
    const NAME: &'static str = ACTIVITIES;
}

// History collections
const HISTORY: &str = "history";
impl MongoCollection for HistoryEntry {
    const NAME: &'static str = HISTORY;
}
impl MongoCollection for NewHistoryEntry {
    const NAME: &'static str = HISTORY;
}

/// Ensure that all the required indexes exist on the given database.
///
/// This operation is idempotent.
pub async fn ensure_indexes_exist(db: &Database) -> Result<(), DbError> {
    debug!("Ensuring collection indexes exist");

    let unique = IndexOptions::builder().unique(true).build();

    // User collection.
    let email_index = IndexModel::builder()
        .keys(doc! {"email": 1})
        .options(unique.clone())
        .build();
    let username_index = IndexModel::builder()
        .keys(doc! {"username": 1})
        .options(unique.clone())
        .build();
    Coll::<User>::from_db(db)
        .create_indexes([email_index, username_index], None)
        .await?;

    // Ballot collection: one ballot per voter per context.
    let ballot_index = IndexModel::builder()
        .keys(doc! {"voter_id": 1, "context.kind": 1, "context.value": 1})
        .options(unique.clone())
        .build();
    Coll::<Ballot>::from_db(db)
        .create_index(ballot_index, None)
        .await?;

    // Preference rank collection: no candidate or rank twice within a ballot.
    let candidate_index = IndexModel::builder()
        .keys(doc! {"ballot_id": 1, "activity_id": 1})
        .options(unique.clone())
        .build();
    let rank_index = IndexModel::builder()
        .keys(doc! {"ballot_id": 1, "rank": 1})
        .options(unique.clone())
        .build();
    Coll::<PreferenceRank>::from_db(db)
        .create_indexes([candidate_index, rank_index], None)
        .await?;

    // History collection.
    let history_index = IndexModel::builder()
        .keys(doc! {"user_id": 1, "activity_id": 1})
        .options(unique)
        .build();
    Coll::<HistoryEntry>::from_db(db)
        .create_index(history_index, None)
        .await?;

    Ok(())
}
