use mongodb::{
    bson::doc,
    options::{FindOneAndUpdateOptions, ReturnDocument},
};
use rocket::{serde::json::Json, Route};

use crate::{
    error::{Error, Result},
    model::{
        api::{
            auth::{Administrator, AuthToken},
            user::UserDescription,
        },
        db::user::User,
        mongodb::{Coll, Id},
    },
};

pub fn routes() -> Vec<Route> {
    routes![deactivate_user, deactivate_user_unauthorized]
}

/// Deactivate a user. Their existing auth tokens stop being accepted and they
/// can no longer log in.
#[post("/users/<user_id>/deactivate")]
async fn deactivate_user(
    _token: AuthToken<Administrator>,
    user_id: Id,
    users: Coll<User>,
) -> Result<Json<UserDescription>> {
    let update = doc! {
        "$set": { "is_active": false },
    };
    let options = FindOneAndUpdateOptions::builder()
        .return_document(ReturnDocument::After)
        .build();
    let user = users
        .find_one_and_update(user_id.as_doc(), update, options)
        .await?
        .ok_or_else(|| Error::not_found(format!("User {user_id}")))?;

    warn!("Deactivated user {user_id} ({})", user.username);
    Ok(Json(user.into()))
}

#[post("/users/<_user_id>/deactivate", rank = 2)]
fn deactivate_user_unauthorized(_user_id: &str) -> Error {
    Error::Unauthorized("administrator rights required".to_string())
}

#[cfg(test)]
mod tests {
    use rocket::{
        http::{ContentType, Status},
        local::asynchronous::Client,
        serde::json::serde_json::json,
    };

    use crate::model::{api::auth::RegisterRequest, db::user::NewUser};

    use super::*;

    async fn insert_user(new_users: &Coll<NewUser>, registration: RegisterRequest) -> Id {
        let user: NewUser = registration.try_into().unwrap();
        new_users
            .insert_one(user, None)
            .await
            .unwrap()
            .inserted_id
            .as_object_id()
            .unwrap()
            .into()
    }

    #[backend_test(admin)]
    async fn deactivate_existing(client: Client, new_users: Coll<NewUser>, users: Coll<User>) {
        let bob = insert_user(&new_users, RegisterRequest::example2()).await;

        let response = client
            .post(uri!(deactivate_user(bob)))
            .dispatch()
            .await;
        assert_eq!(Status::Ok, response.status());
        let description: UserDescription = response.into_json().await.unwrap();
        assert!(!description.is_active);

        let stored = users.find_one(bob.as_doc(), None).await.unwrap().unwrap();
        assert!(!stored.is_active);

        // Bob can no longer log in.
        let response = client
            .post(uri!(crate::api::auth::login))
            .header(ContentType::JSON)
            .body(json!(RegisterRequest::example2().login()).to_string())
            .dispatch()
            .await;
        assert_eq!(Status::Unauthorized, response.status());
    }

    #[backend_test(admin)]
    async fn deactivate_missing(client: Client) {
        let response = client
            .post(uri!(deactivate_user(Id::new())))
            .dispatch()
            .await;
        assert_eq!(Status::NotFound, response.status());
    }

    #[backend_test(user)]
    async fn deactivate_requires_admin(client: Client, new_users: Coll<NewUser>, users: Coll<User>) {
        let bob = insert_user(&new_users, RegisterRequest::example2()).await;

        let response = client
            .post(uri!(deactivate_user(bob)))
            .dispatch()
            .await;
        assert_eq!(Status::Unauthorized, response.status());

        let stored = users.find_one(bob.as_doc(), None).await.unwrap().unwrap();
        assert!(stored.is_active);
    }
}
