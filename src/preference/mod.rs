//! Ranked-preference voting: ballot submission and Condorcet aggregation.
//!
//! The [`PreferenceEngine`] owns no state of its own beyond a handle to a
//! [`BallotStore`]; every request reads or writes through that store.

mod engine;
mod mongo;
mod store;
mod tally;
mod winner;

#[cfg(test)]
mod memory;

pub use engine::PreferenceEngine;
pub use mongo::MongoBallotStore;
pub use store::{BallotStore, RankingsByBallot, StoreError};
