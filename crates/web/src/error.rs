use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use std::fmt;
use storage::{
    dto::{common::ErrorResponse, submission::SubmissionError},
    error::StorageError,
};

/// Web layer errors
#[derive(Debug)]
pub enum WebError {
    Submission(SubmissionError),
    BadRequest(String),
    Storage(StorageError),
    LeaderboardUnavailable(StorageError),
    NotFound,
}

impl fmt::Display for WebError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Submission(e) => write!(f, "Invalid submission: {}", e),
            Self::BadRequest(msg) => write!(f, "Bad request: {}", msg),
            Self::Storage(e) => write!(f, "Storage error: {}", e),
            Self::LeaderboardUnavailable(e) => write!(f, "Leaderboard unavailable: {}", e),
            Self::NotFound => write!(f, "Resource not found"),
        }
    }
}

impl IntoResponse for WebError {
    fn into_response(self) -> Response {
        let (status_code, message) = match self {
            Self::Submission(e) => (StatusCode::BAD_REQUEST, e.to_string()),
            Self::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg),
            Self::Storage(e) => {
                tracing::error!("Submit error: {:?}", e);
                (StatusCode::INTERNAL_SERVER_ERROR, e.to_string())
            }
            Self::LeaderboardUnavailable(e) => {
                tracing::error!("Error fetching leaderboard: {:?}", e);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Failed to fetch leaderboard".to_string(),
                )
            }
            Self::NotFound => (StatusCode::NOT_FOUND, "Resource not found".to_string()),
        };

        (status_code, Json(ErrorResponse::new(message))).into_response()
    }
}

impl From<StorageError> for WebError {
    fn from(error: StorageError) -> Self {
        Self::Storage(error)
    }
}

impl From<SubmissionError> for WebError {
    fn from(error: SubmissionError) -> Self {
        Self::Submission(error)
    }
}

pub type WebResult<T> = Result<T, WebError>;
