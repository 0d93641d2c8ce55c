use axum::extract::multipart::MultipartError;
use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use tracing::error;

/// Failures of the standard-point calculation.
#[derive(Debug, thiserror::Error)]
pub enum RatingError {
    #[error("invalid input: {reason}")]
    InvalidInput { reason: String },
}

/// Failures while reading an uploaded CSV document.
#[derive(Debug, thiserror::Error)]
pub enum TransferError {
    #[error("unknown text encoding, save the file as UTF-8 or CP949")]
    UnknownEncoding,

    #[error("CSV parse error: {0}")]
    Csv(#[from] csv::Error),
}

/// Error surfaced by an HTTP handler, rendered as `{"error": "..."}`.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("{0}")]
    BadRequest(String),

    #[error("{0}")]
    NotFound(String),

    /// Unique-key collisions; reported as 400 like other intake rejections.
    #[error("{0}")]
    Conflict(String),

    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

impl ApiError {
    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::BadRequest(message.into())
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::NotFound(message.into())
    }
}

impl From<RatingError> for ApiError {
    fn from(err: RatingError) -> Self {
        Self::BadRequest(err.to_string())
    }
}

impl From<TransferError> for ApiError {
    fn from(err: TransferError) -> Self {
        Self::BadRequest(err.to_string())
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        Self::BadRequest(rejection.body_text())
    }
}

impl From<MultipartError> for ApiError {
    fn from(err: MultipartError) -> Self {
        Self::BadRequest(err.body_text())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match &self {
            Self::BadRequest(_) | Self::Conflict(_) => StatusCode::BAD_REQUEST,
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::Internal(err) => {
                error!("Request failed: {:#}", err);
                StatusCode::INTERNAL_SERVER_ERROR
            }
        };
        (status, Json(serde_json::json!({ "error": self.to_string() }))).into_response()
    }
}
