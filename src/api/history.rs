use mongodb::{bson::doc, options::FindOptions};
use rocket::{futures::TryStreamExt, http::Status, serde::json::Json, Route};

use crate::{
    error::{Error, Result},
    model::{
        api::{
            auth::{AuthToken, Member},
            history::HistoryItem,
            pagination::{Paginated, PaginationRequest},
        },
        common::ActivityId,
        db::{
            activity::Activity,
            history::{HistoryEntry, NewHistoryEntry},
        },
        mongodb::{is_duplicate_key_error, u32_id_filter, Coll, Id},
    },
};

pub fn routes() -> Vec<Route> {
    routes![
        add_history,
        add_history_unauthenticated,
        list_history,
        list_history_unauthenticated,
    ]
}

/// Record that the caller viewed an activity. Viewing the same activity
/// again returns the original entry.
#[post("/history/<activity_id>")]
pub async fn add_history(
    token: AuthToken<Member>,
    activity_id: ActivityId,
    activities: Coll<Activity>,
    new_entries: Coll<NewHistoryEntry>,
    entries: Coll<HistoryEntry>,
) -> Result<Json<HistoryItem>> {
    if activities
        .find_one(u32_id_filter(activity_id), None)
        .await?
        .is_none()
    {
        return Err(Error::not_found(format!("Activity {activity_id}")));
    }

    let existing = doc! {
        "user_id": token.id,
        "activity_id": activity_id,
    };
    if let Some(entry) = entries.find_one(existing.clone(), None).await? {
        return Ok(Json(entry.into()));
    }

    let entry = NewHistoryEntry::new(token.id, activity_id);
    match new_entries.insert_one(&entry, None).await {
        Ok(inserted) => {
            let id: Id = inserted
                .inserted_id
                .as_object_id()
                .ok_or_else(|| {
                    Error::Status(
                        Status::InternalServerError,
                        "Database returned a non-ObjectId history ID".to_string(),
                    )
                })?
                .into();
            debug!("User {} viewed activity {activity_id}", token.id);
            Ok(Json(HistoryEntry { id, entry }.into()))
        }
        // A concurrent request recorded the same view first.
        Err(err) if is_duplicate_key_error(&err) => entries
            .find_one(existing, None)
            .await?
            .map(|entry| Json(entry.into()))
            .ok_or_else(|| Error::not_found(format!("History entry for {activity_id}"))),
        Err(err) => Err(err.into()),
    }
}

#[post("/history/<_activity_id>", rank = 2)]
fn add_history_unauthenticated(_activity_id: &str) -> Error {
    Error::Unauthorized("log in to record history".to_string())
}

/// The caller's viewing history, newest first.
#[get("/history")]
async fn list_history(
    token: AuthToken<Member>,
    pagination: PaginationRequest,
    entries: Coll<HistoryEntry>,
) -> Result<Json<Paginated<HistoryItem>>> {
    let mine = doc! {
        "user_id": token.id,
    };
    let total = entries.count_documents(mine.clone(), None).await?;

    let options = FindOptions::builder()
        .sort(doc! { "viewed_at": -1, "_id": -1 })
        .skip(pagination.skip())
        .limit(i64::from(pagination.page_size()))
        .build();
    let items = entries
        .find(mine, options)
        .await?
        .map_ok(HistoryItem::from)
        .try_collect()
        .await?;

    Ok(Json(pagination.to_paginated(total, items)))
}

#[get("/history", rank = 2)]
fn list_history_unauthenticated() -> Error {
    Error::Unauthorized("log in to view history".to_string())
}

#[cfg(test)]
mod tests {
    use rocket::local::asynchronous::Client;

    use super::*;

    async fn add(client: &Client, activity_id: ActivityId) -> (Status, Option<HistoryItem>) {
        let response = client
            .post(uri!(add_history(activity_id)))
            .dispatch()
            .await;
        let status = response.status();
        (status, response.into_json().await)
    }

    async fn list(client: &Client, query: &str) -> (Status, Option<Paginated<HistoryItem>>) {
        let response = client.get(format!("/history{query}")).dispatch().await;
        let status = response.status();
        (status, response.into_json().await)
    }

    #[backend_test(user)]
    async fn add_is_idempotent(client: Client, activities: Coll<Activity>, entries: Coll<HistoryEntry>) {
        activities.insert_one(Activity::example(), None).await.unwrap();

        let (status, first) = add(&client, Activity::example().id).await;
        assert_eq!(Status::Ok, status);
        let first = first.unwrap();
        assert_eq!(first.activity_id, Activity::example().id);

        let (status, second) = add(&client, Activity::example().id).await;
        assert_eq!(Status::Ok, status);
        assert_eq!(second.unwrap().id, first.id);

        assert_eq!(entries.count_documents(None, None).await.unwrap(), 1);
    }

    #[backend_test(user)]
    async fn add_unknown_activity(client: Client, entries: Coll<HistoryEntry>) {
        let (status, _) = add(&client, 404).await;
        assert_eq!(Status::NotFound, status);
        assert_eq!(entries.count_documents(None, None).await.unwrap(), 0);
    }

    #[backend_test]
    async fn history_requires_login(client: Client, activities: Coll<Activity>) {
        activities.insert_one(Activity::example(), None).await.unwrap();

        let (status, _) = add(&client, Activity::example().id).await;
        assert_eq!(Status::Unauthorized, status);
        let (status, _) = list(&client, "").await;
        assert_eq!(Status::Unauthorized, status);
    }

    #[backend_test(user)]
    async fn list_newest_first_and_paginated(client: Client, activities: Coll<Activity>) {
        activities.insert_one(Activity::example(), None).await.unwrap();
        activities.insert_one(Activity::example2(), None).await.unwrap();
        let (_, older) = add(&client, Activity::example().id).await;
        let (_, newer) = add(&client, Activity::example2().id).await;

        let (status, page) = list(&client, "").await;
        assert_eq!(Status::Ok, status);
        let page = page.unwrap();
        assert_eq!(page.pagination.total, 2);
        assert_eq!(page.pagination.page_num, 1);
        let ids: Vec<_> = page.items.iter().map(|item| item.id).collect();
        assert_eq!(ids, vec![newer.unwrap().id, older.clone().unwrap().id]);

        let (_, page) = list(&client, "?page_num=2&page_size=1").await;
        let page = page.unwrap();
        assert_eq!(page.pagination.total, 2);
        assert_eq!(page.items.len(), 1);
        assert_eq!(page.items[0].id, older.unwrap().id);
    }

    #[backend_test(user)]
    async fn list_rejects_bad_pagination(client: Client) {
        let (status, _) = list(&client, "?page_num=0").await;
        assert_eq!(Status::BadRequest, status);
        let (status, _) = list(&client, "?page_size=0").await;
        assert_eq!(Status::BadRequest, status);
    }
}
