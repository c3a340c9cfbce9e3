//! Unified error handling with consistent API response envelope.

use std::sync::atomic::{AtomicBool, Ordering};

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;

/// When set, 5xx responses carry the underlying error text in `error.detail`.
static EXPOSE_INTERNAL_DETAILS: AtomicBool = AtomicBool::new(false);

/// Toggle exposure of internal error details (development mode only).
pub fn expose_internal_details(enabled: bool) {
    EXPOSE_INTERNAL_DETAILS.store(enabled, Ordering::Relaxed);
}

/// Error detail in the API response envelope.
#[derive(Debug, Serialize)]
pub struct ApiError {
    pub code: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
}

/// Consistent JSON envelope for all API responses.
///
/// `status` is `success`, `fail` (client error) or `error` (server error).
#[derive(Debug, Serialize)]
pub struct ApiResponse<T: Serialize> {
    pub status: &'static str,
    pub data: Option<T>,
    pub error: Option<ApiError>,
}

impl<T: Serialize> ApiResponse<T> {
    /// Wrap a successful result in the envelope.
    pub fn success(data: T) -> Json<Self> {
        Json(Self {
            status: "success",
            data: Some(data),
            error: None,
        })
    }

    /// Wrap a client error in the envelope.
    pub fn error(code: &str, message: &str) -> Json<Self> {
        Json(Self {
            status: "fail",
            data: None,
            error: Some(ApiError {
                code: code.to_string(),
                message: message.to_string(),
                detail: None,
            }),
        })
    }
}

const INTERNAL_ERROR_MESSAGE: &str = "An internal error occurred";

/// Application error type mapping to HTTP status codes.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("Forbidden: {0}")]
    Forbidden(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl AppError {
    /// Missing or invalid bearer credential.
    pub fn not_logged_in() -> Self {
        Self::Unauthorized("You are not logged in! Please log in to get access.".to_string())
    }

    /// Check if this error represents a not-found condition.
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound(_))
    }

    /// Message safe to show a client; server errors are masked.
    pub fn client_message(&self) -> String {
        match self {
            AppError::NotFound(msg)
            | AppError::Validation(msg)
            | AppError::Unauthorized(msg)
            | AppError::Forbidden(msg)
            | AppError::Conflict(msg) => msg.clone(),
            AppError::Database(_) | AppError::Internal(_) => INTERNAL_ERROR_MESSAGE.to_string(),
        }
    }

    pub fn status_code(&self) -> StatusCode {
        match self {
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::Validation(_) => StatusCode::BAD_REQUEST,
            AppError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            AppError::Forbidden(_) => StatusCode::FORBIDDEN,
            AppError::Conflict(_) => StatusCode::CONFLICT,
            AppError::Database(_) | AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<validator::ValidationErrors> for AppError {
    fn from(errors: validator::ValidationErrors) -> Self {
        let message = errors
            .field_errors()
            .into_iter()
            .flat_map(|(field, errs)| {
                errs.iter().map(move |e| {
                    e.message
                        .as_ref()
                        .map(|m| m.to_string())
                        .unwrap_or_else(|| format!("Invalid value for '{field}'"))
                })
            })
            .next()
            .unwrap_or_else(|| "Invalid request body".to_string());
        AppError::Validation(message)
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let message = self.client_message();
        let (code, detail) = match &self {
            AppError::NotFound(_) => ("NOT_FOUND", None),
            AppError::Validation(_) => ("VALIDATION_ERROR", None),
            AppError::Unauthorized(_) => ("UNAUTHORIZED", None),
            AppError::Forbidden(_) => ("FORBIDDEN", None),
            AppError::Conflict(_) => ("CONFLICT", None),
            AppError::Database(e) => {
                tracing::error!(error = %e, "Database error");
                ("INTERNAL_ERROR", Some(e.to_string()))
            }
            AppError::Internal(msg) => {
                tracing::error!(error = %msg, "Internal error");
                ("INTERNAL_ERROR", Some(msg.clone()))
            }
        };

        let detail = detail.filter(|_| EXPOSE_INTERNAL_DETAILS.load(Ordering::Relaxed));
        let body = ApiResponse::<()> {
            status: if status.is_server_error() { "error" } else { "fail" },
            data: None,
            error: Some(ApiError {
                code: code.to_string(),
                message,
                detail,
            }),
        };

        (status, Json(body)).into_response()
    }
}
