use rocket::{serde::json::Json, Route, State};

use crate::{
    error::{Error, Result},
    model::{
        api::{
            auth::{AuthToken, Member},
            ballot::{BallotReceipt, BallotSubmission},
            condorcet::CondorcetResult,
        },
        common::{context::VoteContext, ActivityId},
    },
    preference::PreferenceEngine,
};

pub fn routes() -> Vec<Route> {
    routes![
        submit_ballot,
        submit_ballot_unauthenticated,
        condorcet_session,
        condorcet_date,
    ]
}

#[post("/preferences/ballots", data = "<submission>", format = "json")]
async fn submit_ballot(
    token: AuthToken<Member>,
    submission: Json<BallotSubmission>,
    engine: &State<PreferenceEngine>,
) -> Result<Json<BallotReceipt>> {
    let BallotSubmission { context, rankings } = submission.0;
    let ballot_id = engine
        .submit_ballot(token.id, context.clone(), rankings)
        .await?;
    Ok(Json(BallotReceipt {
        ballot_id: ballot_id.into(),
        context,
    }))
}

#[post("/preferences/ballots", format = "json", rank = 2)]
fn submit_ballot_unauthenticated() -> Error {
    Error::Unauthorized("log in to vote".to_string())
}

#[get("/preferences/condorcet/session/<token>?<candidates>")]
async fn condorcet_session(
    token: String,
    candidates: Vec<ActivityId>,
    engine: &State<PreferenceEngine>,
) -> Result<Json<CondorcetResult>> {
    let result = engine
        .compute_condorcet_winner(VoteContext::Session(token), &candidates)
        .await?;
    Ok(Json(result))
}

#[get("/preferences/condorcet/date/<date>?<candidates>")]
async fn condorcet_date(
    date: &str,
    candidates: Vec<ActivityId>,
    engine: &State<PreferenceEngine>,
) -> Result<Json<CondorcetResult>> {
    let context = VoteContext::parse_date(date)?;
    let result = engine
        .compute_condorcet_winner(context, &candidates)
        .await?;
    Ok(Json(result))
}
