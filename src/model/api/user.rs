use serde::{Deserialize, Serialize};

use crate::model::{
    api::{auth::Rights, id::ApiId},
    db::user::User,
};

/// A user's public profile. Never includes the password hash.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserDescription {
    pub id: ApiId,
    pub email: String,
    pub username: String,
    pub age: Option<u32>,
    pub rights: Rights,
    pub is_active: bool,
}

impl From<User> for UserDescription {
    fn from(user: User) -> Self {
        Self {
            id: user.id.into(),
            email: user.user.email,
            username: user.user.username,
            age: user.user.age,
            rights: user.user.rights,
            is_active: user.user.is_active,
        }
    }
}
