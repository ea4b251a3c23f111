use actix_web::{error, http::StatusCode, HttpRequest, HttpResponse, ResponseError};
use thiserror::Error;
use validator::ValidationErrors;

use crate::core::validation::field_messages;
use crate::models::ErrorResponse;
use crate::services::ServiceError;

const GENERIC_FAILURE: &str = "Something went wrong. Please try again.";

/// Errors surfaced to HTTP clients
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("No active session")]
    Unauthenticated,

    /// Credential or registration problem, shown verbatim
    #[error("{0}")]
    Auth(String),

    #[error("Validation failed")]
    Validation(#[from] ValidationErrors),

    #[error("{0}")]
    BadRequest(String),

    #[error("Not found: {0}")]
    NotFound(String),

    /// Store or network failure; details are logged, not returned
    #[error("{0}")]
    Unexpected(String),
}

impl From<ServiceError> for ApiError {
    fn from(err: ServiceError) -> Self {
        match err {
            ServiceError::Auth(message) => ApiError::Auth(message),
            ServiceError::NotFound(what) => ApiError::NotFound(what),
            ServiceError::Backend(detail) => ApiError::Unexpected(detail),
        }
    }
}

impl ApiError {
    fn code(&self) -> &'static str {
        match self {
            ApiError::Unauthenticated => "unauthenticated",
            ApiError::Auth(_) => "auth_failed",
            ApiError::Validation(_) => "validation_failed",
            ApiError::BadRequest(_) => "bad_request",
            ApiError::NotFound(_) => "not_found",
            ApiError::Unexpected(_) => "unexpected",
        }
    }

    pub fn to_response_body(&self) -> ErrorResponse {
        let (message, fields) = match self {
            ApiError::Validation(errors) => (self.to_string(), Some(field_messages(errors))),
            ApiError::Unexpected(_) => (GENERIC_FAILURE.to_string(), None),
            other => (other.to_string(), None),
        };

        ErrorResponse {
            error: self.code().to_string(),
            message,
            status_code: self.status_code().as_u16(),
            fields,
        }
    }
}

impl ResponseError for ApiError {
    fn status_code(&self) -> StatusCode {
        match self {
            ApiError::Unauthenticated | ApiError::Auth(_) => StatusCode::UNAUTHORIZED,
            ApiError::Validation(_) | ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::Unexpected(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        if let ApiError::Unexpected(detail) = self {
            tracing::error!("Request failed: {}", detail);
        }
        HttpResponse::build(self.status_code()).json(self.to_response_body())
    }
}

/// Handle JSON payload errors
pub fn handle_json_payload_error(err: error::JsonPayloadError, req: &HttpRequest) -> actix_web::Error {
    tracing::info!("JSON payload error on {}: {}", req.path(), err);
    ApiError::BadRequest(format!("Invalid JSON: {}", err)).into()
}

/// Handle query payload errors
pub fn handle_query_payload_error(err: error::QueryPayloadError, _req: &HttpRequest) -> actix_web::Error {
    ApiError::BadRequest(format!("Invalid query: {}", err)).into()
}
