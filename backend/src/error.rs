use rocket::http::{ContentType, Status};
use rocket::response::Responder;
use shared::error::{Error, ErrorCode};
use shared::validation::ValidationError;
use shared::vote_logic::VoteError;
use thiserror::Error as ThisError;

use crate::store::StoreError;

#[derive(Debug, ThisError)]
pub enum ApiError {
    #[error("Not found")]
    NotFound,
    #[error("Invalid id")]
    InvalidId,
    #[error("{0}")]
    Vote(#[from] VoteError),
    #[error("{0}")]
    Validation(#[from] ValidationError),
    #[error("{0}")]
    Unauthorized(String),
    #[error("{0}")]
    Conflict(String),
    #[error("Rate limit exceeded. Please try again in {0} minutes.")]
    RateLimited(i64),
    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<StoreError> for ApiError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::Duplicate(msg) => ApiError::Conflict(msg),
            other => ApiError::Internal(other.to_string()),
        }
    }
}

impl ApiError {
    fn status(&self) -> Status {
        match self {
            ApiError::NotFound => Status::NotFound,
            ApiError::InvalidId => Status::BadRequest,
            ApiError::Vote(_) => Status::Conflict,
            ApiError::Validation(_) => Status::BadRequest,
            ApiError::Unauthorized(_) => Status::Unauthorized,
            ApiError::Conflict(_) => Status::Conflict,
            ApiError::RateLimited(_) => Status::TooManyRequests,
            ApiError::Internal(_) => Status::InternalServerError,
        }
    }

    fn code(&self) -> ErrorCode {
        match self {
            ApiError::NotFound => ErrorCode::NotFound,
            ApiError::InvalidId => ErrorCode::InvalidInput,
            ApiError::Vote(_) | ApiError::Conflict(_) => ErrorCode::Conflict,
            ApiError::Validation(_) => ErrorCode::ValidationFailed,
            ApiError::Unauthorized(_) => ErrorCode::Unauthorized,
            ApiError::RateLimited(_) => ErrorCode::RateLimited,
            ApiError::Internal(_) => ErrorCode::SystemError,
        }
    }
}

impl<'r, 'o: 'r> Responder<'r, 'o> for ApiError {
    fn respond_to(self, req: &'r rocket::Request<'_>) -> rocket::response::Result<'o> {
        let status = self.status();
        let body = Error::new(self.code(), self.to_string());
        let json = serde_json::to_string(&body).map_err(|_| Status::InternalServerError)?;

        rocket::Response::build_from(json.respond_to(req)?)
            .status(status)
            .header(ContentType::JSON)
            .ok()
    }
}
