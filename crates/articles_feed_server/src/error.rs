//! HTTP error mapping.
//!
//! # Responsibility
//! - Map [`ErrorKind`] to status codes through one table.
//! - Render failures in the shared envelope.
//!
//! # Invariants
//! - Server-side faults never leak internal details to clients.

use crate::envelope::ApiResponse;
use articles_feed_core::{ErrorKind, FeedError};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use log::error;

const INTERNAL_MESSAGE: &str = "internal server error";

/// Status code for every error kind.
pub fn status_for(kind: ErrorKind) -> StatusCode {
    match kind {
        ErrorKind::Validation => StatusCode::BAD_REQUEST,
        ErrorKind::NotFound => StatusCode::NOT_FOUND,
        ErrorKind::Configuration | ErrorKind::Storage => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

/// Request failure carrying its status and a client-facing message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiError {
    pub status: StatusCode,
    pub message: String,
}

impl ApiError {
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            status: status_for(kind),
            message: message.into(),
        }
    }

    pub fn validation(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Validation, message)
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::NotFound, message)
    }

    /// Request exceeded the configured handling time.
    pub fn timeout() -> Self {
        Self {
            status: StatusCode::SERVICE_UNAVAILABLE,
            message: "request timed out".to_string(),
        }
    }

    pub fn internal() -> Self {
        Self {
            status: StatusCode::INTERNAL_SERVER_ERROR,
            message: INTERNAL_MESSAGE.to_string(),
        }
    }
}

impl From<FeedError> for ApiError {
    fn from(err: FeedError) -> Self {
        let kind = err.kind();
        match kind {
            ErrorKind::Validation | ErrorKind::NotFound => Self::new(kind, err.to_string()),
            ErrorKind::Configuration | ErrorKind::Storage => {
                error!(
                    "event=request_failed module=http status=error error_kind={} error={}",
                    kind.as_str(),
                    err
                );
                Self::new(kind, INTERNAL_MESSAGE)
            }
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (
            self.status,
            Json(ApiResponse::failure(self.status.as_u16(), self.message)),
        )
            .into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::{status_for, ApiError};
    use articles_feed_core::{ArticleValidationError, ErrorKind, FeedError, RepoError};
    use axum::http::StatusCode;

    #[test]
    fn every_kind_has_a_status() {
        assert_eq!(status_for(ErrorKind::Validation), StatusCode::BAD_REQUEST);
        assert_eq!(status_for(ErrorKind::NotFound), StatusCode::NOT_FOUND);
        assert_eq!(
            status_for(ErrorKind::Configuration),
            StatusCode::INTERNAL_SERVER_ERROR
        );
        assert_eq!(
            status_for(ErrorKind::Storage),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn validation_message_is_passed_through() {
        let err = ApiError::from(FeedError::from(ArticleValidationError::MissingTitle));
        assert_eq!(err.status, StatusCode::BAD_REQUEST);
        assert_eq!(err.message, "'title' is required");
    }

    #[test]
    fn storage_details_are_hidden() {
        let err = ApiError::from(FeedError::from(RepoError::InvalidData(
            "invalid uuid value `x` in authors.author_uuid".to_string(),
        )));
        assert_eq!(err.status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(err.message, "internal server error");
    }
}
