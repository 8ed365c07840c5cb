use std::fmt::Display;

use mongodb::bson::Bson;
use serde_repr::{Deserialize_repr, Serialize_repr};

/// Different privilege levels. Higher levels include the lower ones.
#[derive(Debug, PartialEq, Eq, PartialOrd, Ord, Clone, Copy, Serialize_repr, Deserialize_repr)]
#[repr(u8)]
pub enum Rights {
    User = 0,
    Admin = 1,
}

impl Display for Rights {
    fn fmt(&self, formatter: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            formatter,
            "{}",
            match self {
                Self::User => "user",
                Self::Admin => "admin",
            }
        )
    }
}

impl From<Rights> for Bson {
    fn from(rights: Rights) -> Self {
        Bson::Int32(rights as i32)
    }
}

/// The minimum rights an endpoint requires, expressed as a type so that
/// `AuthToken<Administrator>` and `AuthToken<Member>` are distinct guards.
pub trait Role {
    const RIGHTS: Rights;
}

/// Any signed-in, active user.
pub struct Member;

impl Role for Member {
    const RIGHTS: Rights = Rights::User;
}

/// A signed-in, active administrator.
pub struct Administrator;

impl Role for Administrator {
    const RIGHTS: Rights = Rights::Admin;
}
