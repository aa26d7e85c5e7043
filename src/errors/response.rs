use axum::{
    http::StatusCode,
    response::{IntoResponse, Json, Response},
};
use serde_json::json;

use crate::errors::AppError;
use crate::models::ApiResponse;

// The IntoResponse trait implementation converts AppError into a well-formed HTTP response.
// Every error goes out in the same {message, data} envelope the success paths use.
impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, message, data) = match &self {
            // Field validation failures are bad requests
            AppError::Validation(msg) => (StatusCode::BAD_REQUEST, msg.clone(), json!({})),

            // Malformed query parameters answer with an empty result list
            AppError::InvalidParam(_) => (StatusCode::BAD_REQUEST, self.to_string(), json!([])),

            AppError::Duplicate(msg) => (StatusCode::BAD_REQUEST, msg.clone(), json!({})),

            AppError::UnknownReference(msg) => (StatusCode::BAD_REQUEST, msg.clone(), json!({})),

            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, msg.clone(), json!({})),

            // Persistence-boundary failures are internal server errors; the raw
            // error text is exposed as data on purpose.
            AppError::Store(e) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "Server Error".to_string(),
                json!(e.to_string()),
            ),

            AppError::Serialization(e) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "Server Error".to_string(),
                json!(e.to_string()),
            ),
        };

        (status, Json(ApiResponse::new(message, data))).into_response()
    }
}
