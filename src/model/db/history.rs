use std::ops::Deref;

use chrono::{DateTime, Utc};
use mongodb::bson::serde_helpers::chrono_datetime_as_bson_datetime;
use serde::{Deserialize, Serialize};

use crate::model::{common::ActivityId, mongodb::Id};

/// A record that a user viewed an activity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistoryCore {
    /// Foreign Key user ID.
    pub user_id: Id,
    pub activity_id: ActivityId,
    #[serde(with = "chrono_datetime_as_bson_datetime")]
    pub viewed_at: DateTime<Utc>,
}

impl HistoryCore {
    pub fn new(user_id: Id, activity_id: ActivityId) -> Self {
        Self {
            user_id,
            activity_id,
            viewed_at: Utc::now(),
        }
    }
}

/// A history entry without an ID.
pub type NewHistoryEntry = HistoryCore;

/// A history entry from the database, with its unique ID.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HistoryEntry {
    #[serde(rename = "_id")]
    pub id: Id,
    #[serde(flatten)]
    pub entry: HistoryCore,
}

impl Deref for HistoryEntry {
    type Target = HistoryCore;

    fn deref(&self) -> &Self::Target {
        &self.entry
    }
}
