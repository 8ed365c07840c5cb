use mongodb::{
    bson::{doc, Bson, Document},
    options::FindOptions,
};
use rocket::{futures::TryStreamExt, serde::json::Json, Route};

use crate::{
    error::{Error, Result},
    model::{
        api::{
            activity::{ActivityDescription, Recommendations},
            auth::{AuthToken, Member},
        },
        db::{activity::Activity, history::HistoryEntry, user::User},
        mongodb::Coll,
    },
};

pub const DEFAULT_RECOMMENDATIONS: u32 = 5;
pub const MAX_RECOMMENDATIONS: u32 = 50;

pub fn routes() -> Vec<Route> {
    routes![recommendations, recommendations_unauthenticated]
}

/// Catalog activities the caller has not viewed yet, newest first.
///
/// Activities are limited to the caller's age, if known, and optionally to
/// outdoor or indoor ones.
#[get("/recommendations?<is_outdoor>&<limit>")]
async fn recommendations(
    token: AuthToken<Member>,
    is_outdoor: Option<bool>,
    limit: Option<u32>,
    users: Coll<User>,
    activities: Coll<Activity>,
    history: Coll<HistoryEntry>,
) -> Result<Json<Recommendations>> {
    let limit = limit.unwrap_or(DEFAULT_RECOMMENDATIONS);
    if !(1..=MAX_RECOMMENDATIONS).contains(&limit) {
        return Err(Error::Validation(format!(
            "limit must be between 1 and {MAX_RECOMMENDATIONS}"
        )));
    }

    let user = users
        .find_one(token.id.as_doc(), None)
        .await?
        .ok_or_else(|| Error::not_found(format!("User {}", token.id)))?;
    let viewed = history
        .distinct("activity_id", doc! { "user_id": token.id }, None)
        .await?;

    let options = FindOptions::builder()
        .sort(doc! { "created_at": -1, "_id": -1 })
        .limit(i64::from(limit))
        .build();
    let suggested = activities
        .find(recommendation_filter(user.age, viewed, is_outdoor), options)
        .await?
        .map_ok(ActivityDescription::from)
        .try_collect::<Vec<_>>()
        .await?;

    debug!(
        "Recommending {} activities to user {}",
        suggested.len(),
        token.id
    );
    Ok(Json(Recommendations {
        activities: suggested,
    }))
}

#[get("/recommendations", rank = 2)]
fn recommendations_unauthenticated() -> Error {
    Error::Unauthorized("log in for recommendations".to_string())
}

/// The catalog filter for a user of the given age who has already viewed the
/// `viewed` activity IDs.
fn recommendation_filter(age: Option<u32>, viewed: Vec<Bson>, is_outdoor: Option<bool>) -> Document {
    let mut filter = doc! {};
    if !viewed.is_empty() {
        filter.insert("_id", doc! { "$nin": viewed });
    }
    if let Some(age) = age {
        let age = i64::from(age);
        filter.insert(
            "$and",
            vec![
                doc! { "$or": [{ "min_age": null }, { "min_age": { "$lte": age } }] },
                doc! { "$or": [{ "max_age": null }, { "max_age": { "$gte": age } }] },
            ],
        );
    }
    if let Some(is_outdoor) = is_outdoor {
        filter.insert("is_outdoor", is_outdoor);
    }
    filter
}

#[cfg(test)]
mod tests {
    use rocket::{http::Status, local::asynchronous::Client};

    use crate::model::common::ActivityId;

    use super::*;

    async fn recommended(client: &Client, query: &str) -> (Status, Vec<u32>) {
        let response = client
            .get(format!("/recommendations{query}"))
            .dispatch()
            .await;
        let status = response.status();
        let ids = response
            .into_json::<Recommendations>()
            .await
            .map(|r| r.activities.into_iter().map(|a| a.id).collect())
            .unwrap_or_default();
        (status, ids)
    }

    async fn seed_catalog(activities: &Coll<Activity>) {
        activities
            .insert_many(
                [
                    Activity::example(),
                    Activity::example2(),
                    Activity::example3(),
                    Activity::example4(),
                ],
                None,
            )
            .await
            .unwrap();
    }

    #[test]
    fn empty_filter_without_constraints() {
        assert_eq!(recommendation_filter(None, Vec::new(), None), doc! {});
    }

    #[test]
    fn filter_combines_constraints() {
        let filter = recommendation_filter(Some(29), vec![Bson::Int64(1)], Some(true));
        assert_eq!(filter.get_document("_id").unwrap(), &doc! { "$nin": [1_i64] });
        assert_eq!(filter.get_array("$and").unwrap().len(), 2);
        assert!(filter.get_bool("is_outdoor").unwrap());
    }

    #[backend_test(user)]
    async fn respects_age_and_orders_newest_first(client: Client, activities: Coll<Activity>) {
        seed_catalog(&activities).await;

        // The example user is 29: old enough for the pub quiz, too old for
        // the playground.
        let (status, ids) = recommended(&client, "").await;
        assert_eq!(Status::Ok, status);
        assert_eq!(ids, vec![3, 2, 1]);
    }

    #[backend_test(user)]
    async fn skips_viewed_activities(client: Client, activities: Coll<Activity>) {
        seed_catalog(&activities).await;
        let response = client
            .post(uri!(crate::api::history::add_history(3)))
            .dispatch()
            .await;
        assert_eq!(Status::Ok, response.status());

        let (_, ids) = recommended(&client, "").await;
        assert_eq!(ids, vec![2, 1]);
    }

    #[backend_test(user)]
    async fn filters_outdoor_and_limits(client: Client, activities: Coll<Activity>) {
        seed_catalog(&activities).await;

        let (_, outdoor) = recommended(&client, "?is_outdoor=true").await;
        assert_eq!(outdoor, vec![2]);
        let (_, indoor) = recommended(&client, "?is_outdoor=false").await;
        assert_eq!(indoor, vec![3, 1]);
        let (_, first_two) = recommended(&client, "?limit=2").await;
        assert_eq!(first_two, vec![3, 2]);
    }

    #[backend_test(user)]
    async fn rejects_out_of_range_limit(client: Client) {
        let (status, _) = recommended(&client, "?limit=0").await;
        assert_eq!(Status::BadRequest, status);
        let (status, _) = recommended(&client, "?limit=500").await;
        assert_eq!(Status::BadRequest, status);
    }

    #[backend_test]
    async fn requires_login(client: Client) {
        let (status, _) = recommended(&client, "").await;
        assert_eq!(Status::Unauthorized, status);
    }
}
