//! Types shared between the API and database representations.

pub mod context;
pub mod ranking;

/// Identifier of an activity in the catalog. Candidates in a vote are activities.
pub type ActivityId = u32;
