use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::model::{api::id::ApiId, common::ActivityId, db::history::HistoryEntry};

/// A viewed activity, as reported to its viewer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistoryItem {
    pub id: ApiId,
    pub activity_id: ActivityId,
    pub viewed_at: DateTime<Utc>,
}

impl From<HistoryEntry> for HistoryItem {
    fn from(entry: HistoryEntry) -> Self {
        Self {
            id: entry.id.into(),
            activity_id: entry.activity_id,
            viewed_at: entry.viewed_at,
        }
    }
}
