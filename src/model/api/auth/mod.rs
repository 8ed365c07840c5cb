mod request;
mod token;
mod user;

pub use request::{LoginRequest, RegisterRequest};
pub use token::{AuthToken, AUTH_TOKEN_COOKIE};
pub use user::{Administrator, Member, Rights, Role};
