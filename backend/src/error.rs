//! Error handling for the Shamba Advisory Platform
//!
//! Provides consistent error responses in English and Swahili

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;

/// Application error types
#[derive(Error, Debug)]
pub enum AppError {
    // Lookup errors
    #[error("Resource not found: {0}")]
    NotFound(String),

    #[error("Not initialized: {0}")]
    NotInitialized(String),

    // Validation errors
    #[error("Validation error: {message}")]
    Validation {
        field: String,
        message: String,
        message_sw: String,
    },

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    // Storage errors
    #[error("Storage error: {0}")]
    StorageError(String),

    // Internal errors
    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("Internal server error: {0}")]
    Internal(String),

    #[error("Internal server error")]
    InternalError(#[from] anyhow::Error),
}

/// Error response structure
#[derive(Serialize)]
pub struct ErrorResponse {
    pub error: ErrorDetail,
}

#[derive(Serialize)]
pub struct ErrorDetail {
    pub code: String,
    pub message_en: String,
    pub message_sw: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub field: Option<String>,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error_detail) = match &self {
            AppError::NotFound(resource) => (
                StatusCode::NOT_FOUND,
                ErrorDetail {
                    code: "NOT_FOUND".to_string(),
                    message_en: format!("{} not found", resource),
                    message_sw: format!("{} haipatikani", resource),
                    field: None,
                },
            ),
            AppError::NotInitialized(resource) => (
                StatusCode::CONFLICT,
                ErrorDetail {
                    code: "NOT_INITIALIZED".to_string(),
                    message_en: format!("{} has not been initialized", resource),
                    message_sw: format!("{} haijaanzishwa bado", resource),
                    field: None,
                },
            ),
            AppError::Validation { field, message, message_sw } => (
                StatusCode::BAD_REQUEST,
                ErrorDetail {
                    code: "VALIDATION_ERROR".to_string(),
                    message_en: message.clone(),
                    message_sw: message_sw.clone(),
                    field: Some(field.clone()),
                },
            ),
            AppError::InvalidInput(msg) => (
                StatusCode::BAD_REQUEST,
                ErrorDetail {
                    code: "INVALID_INPUT".to_string(),
                    message_en: msg.clone(),
                    message_sw: format!("Ingizo si sahihi: {}", msg),
                    field: None,
                },
            ),
            AppError::StorageError(msg) => (
                StatusCode::SERVICE_UNAVAILABLE,
                ErrorDetail {
                    code: "STORAGE_ERROR".to_string(),
                    message_en: format!("Storage error: {}", msg),
                    message_sw: "Hitilafu ya hifadhi ya data".to_string(),
                    field: None,
                },
            ),
            AppError::Configuration(msg) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                ErrorDetail {
                    code: "CONFIGURATION_ERROR".to_string(),
                    message_en: format!("Configuration error: {}", msg),
                    message_sw: "Hitilafu ya usanidi wa mfumo".to_string(),
                    field: None,
                },
            ),
            AppError::Internal(msg) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                ErrorDetail {
                    code: "INTERNAL_ERROR".to_string(),
                    message_en: msg.clone(),
                    message_sw: "Hitilafu ya ndani ya seva".to_string(),
                    field: None,
                },
            ),
            AppError::InternalError(_) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                ErrorDetail {
                    code: "INTERNAL_ERROR".to_string(),
                    message_en: "An internal server error occurred".to_string(),
                    message_sw: "Hitilafu ya ndani ya seva".to_string(),
                    field: None,
                },
            ),
        };

        // Log the error for debugging
        tracing::error!("Error: {:?}", self);

        (status, Json(ErrorResponse { error: error_detail })).into_response()
    }
}

/// Result type alias for handlers
pub type AppResult<T> = Result<T, AppError>;

impl From<&'static str> for AppError {
    fn from(message: &'static str) -> Self {
        AppError::InvalidInput(message.to_string())
    }
}
