use argon2::Config;
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::model::{api::auth::Rights, db::user::NewUser};

pub const MIN_PASSWORD_LENGTH: usize = 8;

/// Raw registration details, received from a user. These are never stored
/// directly, since the password is in plaintext.
#[derive(Clone, Deserialize, Serialize)]
pub struct RegisterRequest {
    pub email: String,
    pub username: String,
    pub password: String,
    /// Used to filter recommendations by age range.
    #[serde(default)]
    pub age: Option<u32>,
}

impl TryFrom<RegisterRequest> for NewUser {
    type Error = Error;

    /// Convert a [`RegisterRequest`] to a new ordinary user by hashing the
    /// password. This enforces that the email and username are non-empty, and
    /// the password meets minimum length.
    fn try_from(request: RegisterRequest) -> Result<Self> {
        let email = request.email.trim();
        if email.is_empty() || !email.contains('@') {
            return Err(Error::Validation("invalid email address".to_string()));
        }
        if request.username.trim().is_empty() {
            return Err(Error::Validation("empty username".to_string()));
        }
        if request.password.len() < MIN_PASSWORD_LENGTH {
            return Err(Error::Validation(format!(
                "password must be at least {MIN_PASSWORD_LENGTH} characters"
            )));
        }

        // 16 bytes is recommended for password hashing:
        //  https://en.wikipedia.org/wiki/Argon2
        let mut salt = [0_u8; 16];
        rand::thread_rng().fill(&mut salt);
        let password_hash =
            argon2::hash_encoded(request.password.as_bytes(), &salt, &Config::default())?;

        Ok(Self {
            email: email.to_lowercase(),
            username: request.username.trim().to_string(),
            password_hash,
            age: request.age,
            rights: Rights::User,
            is_active: true,
        })
    }
}

/// Credentials presented at login.
#[derive(Clone, Deserialize, Serialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[cfg(test)]
mod examples {
    use super::*;

    impl RegisterRequest {
        pub fn example() -> Self {
            Self {
                email: "alice@example.com".into(),
                username: "alice112".into(),
                password: "outdoors4lyfe".into(),
                age: Some(29),
            }
        }

        pub fn example2() -> Self {
            Self {
                email: "bob@example.com".into(),
                username: "bobthebowler".into(),
                password: "totallysecurepassword".into(),
                age: None,
            }
        }

        pub fn example_admin() -> Self {
            Self {
                email: "coordinator@example.com".into(),
                username: "coordinator".into(),
                password: "foobarbaz".into(),
                age: None,
            }
        }

        /// The matching login credentials.
        pub fn login(&self) -> LoginRequest {
            LoginRequest {
                email: self.email.clone(),
                password: self.password.clone(),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rejection(request: RegisterRequest) -> String {
        match NewUser::try_from(request) {
            Err(Error::Validation(msg)) => msg,
            Err(other) => panic!("unexpected error {other:?}"),
            Ok(_) => panic!("registration unexpectedly accepted"),
        }
    }

    #[test]
    fn registration_hashes_password() {
        let request = RegisterRequest::example();
        let user = NewUser::try_from(request.clone()).unwrap();

        assert_ne!(user.password_hash, request.password);
        assert!(user.password_hash.starts_with("$argon2"));
        assert_eq!(user.rights, Rights::User);
        assert!(user.is_active);
    }

    #[test]
    fn email_is_normalised() {
        let mut request = RegisterRequest::example();
        request.email = "  Alice@Example.COM ".into();
        let user = NewUser::try_from(request).unwrap();
        assert_eq!(user.email, "alice@example.com");
    }

    #[test]
    fn registration_rejects_bad_input() {
        let mut request = RegisterRequest::example();
        request.email = "not-an-email".into();
        assert_eq!(rejection(request), "invalid email address");

        let mut request = RegisterRequest::example();
        request.username = " ".into();
        assert_eq!(rejection(request), "empty username");

        let mut request = RegisterRequest::example();
        request.password = "short".into();
        assert_eq!(rejection(request), "password must be at least 8 characters");
    }
}
