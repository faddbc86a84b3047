//! HTTP mapping for [`AppError`].

use actix_web::http::StatusCode;
use actix_web::{HttpResponse, ResponseError};
use rr_core::error::AppError;
use serde_json::json;
use std::fmt;

/// Wraps the domain error so it can be returned from handlers.
#[derive(Debug, Clone, PartialEq)]
pub struct ApiError(pub AppError);

pub type ApiResult<T> = Result<T, ApiError>;

impl ApiError {
    pub fn bad_request(message: impl Into<String>) -> Self {
        ApiError(AppError::ValidationError(message.into()))
    }

    /// The text placed in the `message` field of the response body.
    pub fn message(&self) -> String {
        match &self.0 {
            // List pagination reports its own wording.
            AppError::NotFound(kind, detail) if kind == "Page" => detail.clone(),
            AppError::NotFound(..) => "Not found.".to_string(),
            AppError::Internal(_) => "Internal server error.".to_string(),
            other => other.to_string(),
        }
    }
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl From<AppError> for ApiError {
    fn from(err: AppError) -> Self {
        ApiError(err)
    }
}

impl ResponseError for ApiError {
    fn status_code(&self) -> StatusCode {
        match &self.0 {
            AppError::NotFound(..) => StatusCode::NOT_FOUND,
            AppError::ValidationError(_) | AppError::Conflict(_) => StatusCode::BAD_REQUEST,
            AppError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            AppError::Forbidden(_) => StatusCode::FORBIDDEN,
            AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        if let AppError::Internal(detail) = &self.0 {
            tracing::error!(error = %detail, "request failed");
        }
        HttpResponse::build(self.status_code()).json(json!({ "message": self.message() }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rr_core::listing::INVALID_PAGE;

    #[test]
    fn conflicts_are_bad_requests() {
        let err = ApiError(AppError::Conflict("Username already exists".into()));
        assert_eq!(err.status_code(), StatusCode::BAD_REQUEST);
        assert_eq!(err.message(), "Username already exists");
    }

    #[test]
    fn internal_detail_is_hidden() {
        let err = ApiError(AppError::Internal("disk on fire".into()));
        assert_eq!(err.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
        assert!(!err.message().contains("disk"));
    }

    #[test]
    fn invalid_page_keeps_its_wording() {
        let err = ApiError(AppError::not_found("Page", INVALID_PAGE));
        assert_eq!(err.status_code(), StatusCode::NOT_FOUND);
        assert_eq!(err.message(), INVALID_PAGE);
        assert_eq!(ApiError(AppError::not_found("Post", 3)).message(), "Not found.");
    }
}
