use mongodb::bson::doc;
use rocket::{
    http::{Cookie, CookieJar, Status},
    serde::json::Json,
    Route, State,
};

use crate::{
    error::{Error, Result},
    model::{
        api::{
            auth::{AuthToken, LoginRequest, Member, RegisterRequest, AUTH_TOKEN_COOKIE},
            user::UserDescription,
        },
        db::user::{NewUser, User},
        mongodb::{is_duplicate_key_error, Coll, Id},
    },
    Config,
};

pub fn routes() -> Vec<Route> {
    routes![register, login, logout]
}

#[post("/auth/register", data = "<registration>", format = "json")]
pub async fn register(
    registration: Json<RegisterRequest>,
    new_users: Coll<NewUser>,
) -> Result<Json<UserDescription>> {
    let user: NewUser = registration.0.try_into()?;

    // Email and username uniqueness are enforced by the users indexes.
    let inserted = match new_users.insert_one(&user, None).await {
        Ok(inserted) => inserted,
        Err(err) if is_duplicate_key_error(&err) => {
            return Err(Error::Status(
                Status::Conflict,
                format!("Email or username already in use: {}", user.username),
            ));
        }
        Err(err) => return Err(err.into()),
    };
    let id: Id = inserted
        .inserted_id
        .as_object_id()
        .ok_or_else(|| {
            Error::Status(
                Status::InternalServerError,
                "Database returned a non-ObjectId user ID".to_string(),
            )
        })?
        .into();

    info!("Registered user {id} ({})", user.username);
    Ok(Json(User { id, user }.into()))
}

#[post("/auth/login", data = "<credentials>", format = "json")]
pub async fn login(
    cookies: &CookieJar<'_>,
    credentials: Json<LoginRequest>,
    users: Coll<User>,
    config: &State<Config>,
) -> Result<()> {
    let with_email = doc! {
        "email": credentials.email.trim().to_lowercase(),
    };

    let user = users
        .find_one(with_email, None)
        .await?
        .filter(|user| user.is_active && user.verify_password(&credentials.password))
        .ok_or_else(|| {
            Error::Unauthorized(
                "No active user found with the provided email and password combination"
                    .to_string(),
            )
        })?;

    let token = AuthToken::<Member>::new(&user);
    cookies.add(token.into_cookie(config)?);

    Ok(())
}

#[delete("/auth")]
pub fn logout(cookies: &CookieJar) -> Status {
    cookies.remove(Cookie::named(AUTH_TOKEN_COOKIE));
    Status::Ok
}

#[cfg(test)]
mod tests {
    use rocket::{http::ContentType, local::asynchronous::Client, serde::json::serde_json::json};

    use crate::model::api::auth::Rights;

    use super::*;

    async fn register_example(client: &Client, registration: &RegisterRequest) -> Status {
        client
            .post(uri!(register))
            .header(ContentType::JSON)
            .body(json!(registration).to_string())
            .dispatch()
            .await
            .status()
    }

    #[backend_test]
    async fn register_valid(client: Client, users: Coll<User>) {
        let response = client
            .post(uri!(register))
            .header(ContentType::JSON)
            .body(json!(RegisterRequest::example()).to_string())
            .dispatch()
            .await;
        assert_eq!(Status::Ok, response.status());

        let description: UserDescription = response.into_json().await.unwrap();
        assert_eq!(description.email, RegisterRequest::example().email);
        assert_eq!(description.rights, Rights::User);
        assert_eq!(description.age, Some(29));
        assert!(description.is_active);

        let stored = users
            .find_one(description.id.as_doc(), None)
            .await
            .unwrap()
            .unwrap();
        assert_ne!(stored.password_hash, RegisterRequest::example().password);
    }

    #[backend_test]
    async fn register_duplicate_email_or_username(client: Client, users: Coll<User>) {
        let alice = RegisterRequest::example();
        assert_eq!(Status::Ok, register_example(&client, &alice).await);

        let same_email = RegisterRequest {
            username: "someone-else".into(),
            ..alice.clone()
        };
        assert_eq!(Status::Conflict, register_example(&client, &same_email).await);

        let same_username = RegisterRequest {
            email: "other@example.com".into(),
            ..alice
        };
        assert_eq!(
            Status::Conflict,
            register_example(&client, &same_username).await
        );

        assert_eq!(users.count_documents(None, None).await.unwrap(), 1);
    }

    #[backend_test]
    async fn register_short_password(client: Client, users: Coll<User>) {
        let request = RegisterRequest {
            password: "short".into(),
            ..RegisterRequest::example()
        };
        assert_eq!(Status::BadRequest, register_example(&client, &request).await);
        assert_eq!(users.count_documents(None, None).await.unwrap(), 0);
    }

    #[backend_test]
    async fn login_valid(client: Client) {
        let alice = RegisterRequest::example();
        register_example(&client, &alice).await;

        let response = client
            .post(uri!(login))
            .header(ContentType::JSON)
            .body(json!(alice.login()).to_string())
            .dispatch()
            .await;

        assert_eq!(Status::Ok, response.status());
        assert!(client.cookies().get(AUTH_TOKEN_COOKIE).is_some());
    }

    #[backend_test]
    async fn login_invalid(client: Client) {
        let alice = RegisterRequest::example();
        register_example(&client, &alice).await;

        let wrong_password = LoginRequest {
            password: "not-the-password".into(),
            ..alice.login()
        };
        let response = client
            .post(uri!(login))
            .header(ContentType::JSON)
            .body(json!(wrong_password).to_string())
            .dispatch()
            .await;
        assert_eq!(Status::Unauthorized, response.status());
        assert_eq!(None, client.cookies().get(AUTH_TOKEN_COOKIE));

        let unknown = RegisterRequest::example2().login();
        let response = client
            .post(uri!(login))
            .header(ContentType::JSON)
            .body(json!(unknown).to_string())
            .dispatch()
            .await;
        assert_eq!(Status::Unauthorized, response.status());
    }

    #[backend_test]
    async fn login_inactive(client: Client, users: Coll<User>) {
        let alice = RegisterRequest::example();
        register_example(&client, &alice).await;
        users
            .update_one(
                doc! { "email": &alice.email },
                doc! { "$set": { "is_active": false } },
                None,
            )
            .await
            .unwrap();

        let response = client
            .post(uri!(login))
            .header(ContentType::JSON)
            .body(json!(alice.login()).to_string())
            .dispatch()
            .await;
        assert_eq!(Status::Unauthorized, response.status());
    }

    #[backend_test(user)]
    async fn logout_user(client: Client) {
        assert!(client.cookies().get(AUTH_TOKEN_COOKIE).is_some());
        let response = client.delete(uri!(logout)).dispatch().await;

        assert_eq!(Status::Ok, response.status());
        assert_eq!(None, client.cookies().get(AUTH_TOKEN_COOKIE));
    }

    #[backend_test]
    async fn logout_not_logged_in(client: Client) {
        let response = client.delete(uri!(logout)).dispatch().await;

        assert_eq!(Status::Ok, response.status());
    }
}
