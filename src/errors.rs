use actix_web::http::StatusCode;
use actix_web::HttpResponse;
use serde::Serialize;
use thiserror::Error;
use utoipa::ToSchema;

use crate::domain::errors::{AuthError, DomainError};

const REDACTED_MESSAGE: &str = "internal server error";

/// Body of every error response.
#[derive(Debug, Serialize, ToSchema)]
pub struct ErrorResponse {
    pub error: String,
}

#[derive(Debug, Error)]
pub enum AppError {
    #[error("missing or invalid authentication token")]
    Unauthenticated,

    #[error("invalid or expired token")]
    InvalidToken,

    #[error("method not allowed")]
    MethodNotAllowed,

    #[error("{0}")]
    MalformedBody(String),

    #[error("{0}")]
    MissingFields(String),

    #[error("{0}")]
    InvalidItem(String),

    #[error("order not found")]
    NotFound,

    #[error("{0}")]
    Internal(String),
}

impl AppError {
    pub fn order_id_missing() -> Self {
        AppError::MissingFields("order id not provided correctly".to_string())
    }
}

impl From<AuthError> for AppError {
    fn from(e: AuthError) -> Self {
        match e {
            AuthError::Unauthenticated => AppError::Unauthenticated,
            AuthError::InvalidToken => AppError::InvalidToken,
        }
    }
}

impl From<DomainError> for AppError {
    fn from(e: DomainError) -> Self {
        match e {
            DomainError::NotFound => AppError::NotFound,
            DomainError::MalformedBody(msg) => AppError::MalformedBody(msg),
            DomainError::MissingFields(msg) => AppError::MissingFields(msg),
            DomainError::InvalidItem(msg) => AppError::InvalidItem(msg),
            DomainError::Store(e) => AppError::Internal(e.to_string()),
            DomainError::Identity(e) => AppError::Internal(e.to_string()),
        }
    }
}

impl actix_web::ResponseError for AppError {
    fn status_code(&self) -> StatusCode {
        match self {
            AppError::Unauthenticated | AppError::InvalidToken => StatusCode::UNAUTHORIZED,
            AppError::MethodNotAllowed => StatusCode::METHOD_NOT_ALLOWED,
            AppError::MalformedBody(_) | AppError::MissingFields(_) | AppError::InvalidItem(_) => {
                StatusCode::BAD_REQUEST
            }
            AppError::NotFound => StatusCode::NOT_FOUND,
            AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        HttpResponse::build(self.status_code()).json(ErrorResponse {
            error: self.to_string(),
        })
    }
}

/// Decides whether the text of internal failures reaches the client.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ErrorPolicy {
    pub expose_internal_errors: bool,
}

impl ErrorPolicy {
    /// Converts `e`, logging internal failures and redacting them if configured to.
    pub fn apply(&self, e: impl Into<AppError>) -> AppError {
        match e.into() {
            AppError::Internal(msg) => {
                log::error!("Internal error: {}", msg);
                if self.expose_internal_errors {
                    AppError::Internal(msg)
                } else {
                    AppError::Internal(REDACTED_MESSAGE.to_string())
                }
            }
            other => other,
        }
    }
}
