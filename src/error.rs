use axum::{
    extract::multipart::MultipartError,
    extract::{
        multipart::MultipartRejection,
        rejection::{JsonRejection, PathRejection},
    },
    http::StatusCode,
    response::{IntoResponse, Response},
};

use crate::{models::ValidationError, repository::RepoError, response::ApiResponse, storage::StorageError};

/// ApiError
///
/// The failure taxonomy every handler maps into. Rendering always produces the uniform
/// envelope with `success: false`; 5xx variants hide their detail behind a generic
/// message and attach it as an `ErrorDetail` extension instead.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("{0}")]
    Validation(String),

    #[error("{0} not found")]
    NotFound(&'static str),

    #[error("{0}")]
    Unauthorized(&'static str),

    #[error("Invalid credentials")]
    InvalidCredentials,

    #[error("{0}")]
    PayloadTooLarge(String),

    #[error("storage error: {0}")]
    Storage(#[from] RepoError),

    #[error("upload error: {0}")]
    Upload(#[from] StorageError),

    #[error("internal error: {0}")]
    Internal(String),
}

/// ErrorDetail
///
/// Internal description of a server-side failure, carried on the response extensions
/// so the development-mode layer can surface it.
#[derive(Debug, Clone)]
pub struct ErrorDetail(pub String);

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::Validation(_) => StatusCode::BAD_REQUEST,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::Unauthorized(_) | ApiError::InvalidCredentials => StatusCode::UNAUTHORIZED,
            ApiError::PayloadTooLarge(_) => StatusCode::PAYLOAD_TOO_LARGE,
            ApiError::Storage(_) | ApiError::Upload(_) | ApiError::Internal(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    pub fn internal(msg: impl Into<String>) -> Self {
        ApiError::Internal(msg.into())
    }

    /// A rejected request body. Bodies over the configured limit keep their 413.
    fn rejected_body(status: StatusCode, text: String) -> Self {
        if status == StatusCode::PAYLOAD_TOO_LARGE {
            ApiError::PayloadTooLarge(text)
        } else {
            ApiError::Validation(text)
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();

        if status.is_server_error() {
            tracing::error!(error = %self, "request failed");
            let mut response = (status, ApiResponse::failure("Server error")).into_response();
            response
                .extensions_mut()
                .insert(ErrorDetail(self.to_string()));
            return response;
        }

        tracing::warn!(status = status.as_u16(), error = %self, "request rejected");
        (status, ApiResponse::failure(self.to_string())).into_response()
    }
}

impl From<ValidationError> for ApiError {
    fn from(err: ValidationError) -> Self {
        ApiError::Validation(err.to_string())
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError::rejected_body(rejection.status(), rejection.body_text())
    }
}

impl From<PathRejection> for ApiError {
    fn from(rejection: PathRejection) -> Self {
        ApiError::Validation(rejection.body_text())
    }
}

impl From<MultipartError> for ApiError {
    fn from(err: MultipartError) -> Self {
        ApiError::rejected_body(err.status(), err.body_text())
    }
}

impl From<MultipartRejection> for ApiError {
    fn from(rejection: MultipartRejection) -> Self {
        ApiError::rejected_body(rejection.status(), rejection.body_text())
    }
}
