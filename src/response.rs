use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;
use tracing::error;

/// Every endpoint, success or failure, answers with this shape.
#[derive(Debug, Serialize)]
pub struct Envelope<T> {
    pub message: String,
    pub data: Option<T>,
}

impl<T: Serialize> Envelope<T> {
    pub fn ok(message: &str, data: T) -> Json<Self> {
        Json(Self {
            message: message.to_string(),
            data: Some(data),
        })
    }
}

#[derive(Debug, Error)]
pub enum ApiError {
    /// All token failures collapse here so the response never reveals
    /// which check rejected the request.
    #[error("Unauthorized!")]
    Unauthorized,
    /// Unknown identifier, inactive account and wrong password share one
    /// message to prevent user enumeration.
    #[error("User not found")]
    InvalidCredentials,
    #[error("{0}")]
    Validation(String),
    #[error("User activation failed")]
    ActivationFailed,
    #[error("{0}")]
    Internal(#[from] anyhow::Error),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match self {
            ApiError::Unauthorized | ApiError::InvalidCredentials => StatusCode::FORBIDDEN,
            ApiError::Validation(_) | ApiError::ActivationFailed | ApiError::Internal(_) => {
                StatusCode::BAD_REQUEST
            }
        };
        if let ApiError::Internal(e) = &self {
            error!(error = %e, "request failed");
        }
        let body = Envelope::<serde_json::Value> {
            message: self.to_string(),
            data: None,
        };
        (status, Json(body)).into_response()
    }
}
