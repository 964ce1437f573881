use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Message returned when a patient cannot be found
pub const PATIENT_NOT_FOUND: &str = "Patient Not Found!";

/// Message returned when creating a patient whose id is taken
pub const PATIENT_EXISTS: &str = "Patient with this ID already exists!";

/// Standardized error response format
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ErrorResponse {
    /// Human-readable error message
    pub detail: String,

    /// Error code for client-side handling
    pub code: String,

    /// Per-field details for validation errors
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<Vec<String>>,
}

impl ErrorResponse {
    /// Create a not found error response
    pub fn not_found() -> Self {
        Self {
            detail: PATIENT_NOT_FOUND.to_string(),
            code: "not_found".to_string(),
            details: None,
        }
    }

    /// Create a duplicate id error response
    pub fn conflict() -> Self {
        Self {
            detail: PATIENT_EXISTS.to_string(),
            code: "conflict".to_string(),
            details: None,
        }
    }

    /// Create a validation error response
    pub fn validation_error(message: &str, details: Vec<String>) -> Self {
        Self {
            detail: message.to_string(),
            code: "validation_error".to_string(),
            details: Some(details),
        }
    }

    /// Create a bad request error response
    pub fn bad_request(message: &str) -> Self {
        Self {
            detail: message.to_string(),
            code: "bad_request".to_string(),
            details: None,
        }
    }

    /// Create an internal error response
    pub fn internal_error() -> Self {
        Self {
            detail: "An unexpected error occurred".to_string(),
            code: "internal_error".to_string(),
            details: None,
        }
    }

    /// HTTP status for this error
    pub fn status(&self) -> StatusCode {
        match self.code.as_str() {
            "not_found" => StatusCode::NOT_FOUND,
            "conflict" | "validation_error" | "bad_request" => StatusCode::BAD_REQUEST,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ErrorResponse {
    fn into_response(self) -> Response {
        (self.status(), Json(self)).into_response()
    }
}

/// Plain message response
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct MessageResponse {
    /// Message text
    pub message: String,
}

impl MessageResponse {
    pub fn new(message: &str) -> Self {
        Self {
            message: message.to_string(),
        }
    }
}
