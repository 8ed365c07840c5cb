use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::model::{common::ActivityId, db::activity::Activity};

/// A catalog activity as shown to clients.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActivityDescription {
    pub id: ActivityId,
    pub name: String,
    pub description: Option<String>,
    pub is_outdoor: Option<bool>,
    pub min_age: Option<u32>,
    pub max_age: Option<u32>,
    pub created_at: DateTime<Utc>,
}

impl From<Activity> for ActivityDescription {
    fn from(activity: Activity) -> Self {
        Self {
            id: activity.id,
            name: activity.name,
            description: activity.description,
            is_outdoor: activity.is_outdoor,
            min_age: activity.min_age,
            max_age: activity.max_age,
            created_at: activity.created_at,
        }
    }
}

/// Activities suggested to a user, best first.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Recommendations {
    pub activities: Vec<ActivityDescription>,
}
