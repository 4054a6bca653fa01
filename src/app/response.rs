use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;

use crate::utils::error::AppError;

impl AppError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            AppError::ValidationError { .. } => StatusCode::BAD_REQUEST,
            AppError::NotFoundError { .. } => StatusCode::NOT_FOUND,
            AppError::ConflictError { .. } => StatusCode::CONFLICT,
            AppError::HttpError(_) | AppError::UpstreamError { .. } => StatusCode::BAD_GATEWAY,
            AppError::UnavailableError { .. } => StatusCode::SERVICE_UNAVAILABLE,
            AppError::IoError(_)
            | AppError::SerializationError(_)
            | AppError::InvalidConfigValueError { .. }
            | AppError::ConfigValidationError { .. }
            | AppError::ModelError { .. }
            | AppError::StorageError { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status_code();

        let message = if status.is_server_error() {
            tracing::error!(
                "❌ Request failed: {} (Category: {:?}, Severity: {:?})",
                self,
                self.category(),
                self.severity()
            );
            match status {
                StatusCode::INTERNAL_SERVER_ERROR => "Internal Server Error".to_string(),
                _ => self.user_friendly_message(),
            }
        } else {
            self.to_string()
        };

        (status, Json(json!({ "error": message }))).into_response()
    }
}
