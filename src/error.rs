use argon2::Error as Argon2Error;
use jsonwebtoken::errors::{Error as JwtError, ErrorKind as JwtErrorKind};
use mongodb::error::Error as DbError;
use rocket::{http::Status, response::Responder, Request};
use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Error)]
pub enum Error {
    /// Malformed input; the caller should fix the request rather than retry.
    #[error("Validation failed: {0}")]
    Validation(String),
    /// The voter already holds a ballot for this context.
    #[error("A ballot has already been cast for this context")]
    DuplicateVote,
    #[error("Not found: {0}")]
    NotFound(String),
    /// Transient infrastructure fault; safe to retry with backoff.
    #[error("Store unavailable: {0}")]
    StoreUnavailable(String),
    #[error("Unauthorized: {0}")]
    Unauthorized(String),
    #[error("{1}")]
    Status(Status, String),
    #[error(transparent)]
    Db(#[from] DbError),
    #[error(transparent)]
    Jwt(#[from] JwtError),
    #[error(transparent)]
    Argon2(#[from] Argon2Error),
}

impl Error {
    pub fn not_found(what: impl Into<String>) -> Self {
        Self::NotFound(what.into())
    }

    /// The HTTP status this error is reported as.
    pub fn status(&self) -> Status {
        match self {
            Self::Validation(_) => Status::BadRequest,
            Self::DuplicateVote => Status::Conflict,
            Self::NotFound(_) => Status::NotFound,
            Self::StoreUnavailable(_) => Status::ServiceUnavailable,
            Self::Unauthorized(_) => Status::Unauthorized,
            Self::Status(status, _) => *status,
            Self::Db(_) | Self::Argon2(_) => Status::InternalServerError,
            Self::Jwt(err) => match err.kind() {
                JwtErrorKind::ExpiredSignature | JwtErrorKind::ImmatureSignature => {
                    Status::Unauthorized
                }
                _ => Status::BadRequest,
            },
        }
    }
}

impl<'r, 'o: 'r> Responder<'r, 'o> for Error {
    fn respond_to(self, req: &'r Request<'_>) -> rocket::response::Result<'o> {
        let status = self.status();
        let route = req.uri();
        if status.class().is_server_error() {
            error!("{route}: {self}");
        } else {
            warn!("{route}: {self}");
        }
        Err(status)
    }
}
