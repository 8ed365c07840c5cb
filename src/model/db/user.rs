use std::ops::{Deref, DerefMut};

use mongodb::bson::doc;
use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::model::{
    api::auth::{RegisterRequest, Rights},
    mongodb::{Coll, Id},
};

/// Core user data, as stored in the database.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserCore {
    pub email: String,
    pub username: String,
    pub password_hash: String,
    #[serde(default)]
    pub age: Option<u32>,
    pub rights: Rights,
    pub is_active: bool,
}

impl UserCore {
    /// Check whether the given password is correct.
    ///
    /// A malformed stored hash can never match, so it counts as a wrong password.
    pub fn verify_password<T: AsRef<[u8]>>(&self, password: T) -> bool {
        argon2::verify_encoded(&self.password_hash, password.as_ref()).unwrap_or(false)
    }
}

/// A user without an ID.
pub type NewUser = UserCore;

/// A user from the database, with its unique ID.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    #[serde(rename = "_id")]
    pub id: Id,
    #[serde(flatten)]
    pub user: UserCore,
}

impl Deref for User {
    type Target = UserCore;

    fn deref(&self) -> &Self::Target {
        &self.user
    }
}

impl DerefMut for User {
    fn deref_mut(&mut self) -> &mut Self::Target {
        &mut self.user
    }
}

/// Credentials for the administrator created on first launch.
#[derive(Deserialize)]
pub struct BootstrapAdmin {
    admin_email: String,
    admin_username: String,
    // secret
    admin_password: String,
}

/// Ensure that at least one administrator exists, creating one from the
/// bootstrap credentials if not.
///
/// This operation is idempotent.
pub async fn ensure_admin_exists(users: &Coll<NewUser>, admin: BootstrapAdmin) -> Result<()> {
    let any_admin = doc! {
        "rights": Rights::Admin,
    };
    if users.find_one(any_admin, None).await?.is_some() {
        return Ok(());
    }

    let request = RegisterRequest {
        email: admin.admin_email,
        username: admin.admin_username,
        password: admin.admin_password,
        age: None,
    };
    let mut new_admin = NewUser::try_from(request)?;
    new_admin.rights = Rights::Admin;
    users.insert_one(&new_admin, None).await?;
    warn!(
        "No admin found, created bootstrap admin '{}'; change its password",
        new_admin.username
    );
    Ok(())
}
