use std::fmt::Display;

use chrono::NaiveDate;
use mongodb::bson::{doc, Document};
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// The scope within which each voter may cast at most one ballot.
///
/// A session is a one-off named vote, such as a group picking tonight's
/// outing; a date is a recurring daily vote. The two kinds never collide,
/// even if a session token happens to look like a date.
#[derive(Debug, Clone, Hash, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum VoteContext {
    Session(String),
    Date(NaiveDate),
}

impl VoteContext {
    /// Reject contexts that cannot identify a voting period.
    pub fn validate(&self) -> Result<()> {
        match self {
            Self::Session(token) if token.trim().is_empty() => {
                Err(Error::Validation("empty session token".to_string()))
            }
            _ => Ok(()),
        }
    }

    /// A filter matching documents whose `context` field equals this context.
    /// Matches field by field so the ballots unique index can serve the query.
    pub fn as_filter(&self) -> Document {
        match self {
            Self::Session(token) => doc! {
                "context.kind": "session",
                "context.value": token,
            },
            Self::Date(date) => doc! {
                "context.kind": "date",
                "context.value": date.format("%Y-%m-%d").to_string(),
            },
        }
    }

    /// Parse a date context from its `YYYY-MM-DD` form.
    pub fn parse_date(raw: &str) -> Result<Self> {
        NaiveDate::parse_from_str(raw, "%Y-%m-%d")
            .map(Self::Date)
            .map_err(|_| Error::Validation(format!("invalid date '{raw}', expected YYYY-MM-DD")))
    }
}

impl Display for VoteContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Session(token) => write!(f, "session '{token}'"),
            Self::Date(date) => write!(f, "date {date}"),
        }
    }
}

#[cfg(test)]
mod examples {
    use super::*;

    impl VoteContext {
        pub fn example() -> Self {
            Self::Session("pack_1234".to_string())
        }

        pub fn example_date() -> Self {
            Self::Date(NaiveDate::from_ymd_opt(2024, 5, 1).unwrap())
        }
    }
}
