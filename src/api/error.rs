use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;

use crate::ShopError;

/// API-layer error type mapped onto HTTP statuses.
#[derive(Debug)]
pub enum ApiError {
    /// 400 - invalid input
    BadRequest(String),

    /// 404 - unknown resource
    NotFound(String),

    /// 500 - internal error
    Internal(String),
}

/// JSON error response body
#[derive(Serialize)]
struct ErrorBody {
    error: &'static str,
    message: String,
}

impl IntoResponse for ApiError {
    #[inline]
    fn into_response(self) -> Response {
        let (status, error, message) = match self {
            ApiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, "bad_request", msg),
            ApiError::NotFound(msg) => (StatusCode::NOT_FOUND, "not_found", msg),
            ApiError::Internal(msg) => (StatusCode::INTERNAL_SERVER_ERROR, "internal_error", msg),
        };

        let body = ErrorBody { error, message };

        (status, Json(body)).into_response()
    }
}

impl From<ShopError> for ApiError {
    #[inline]
    fn from(err: ShopError) -> Self {
        ApiError::Internal(err.to_string())
    }
}
