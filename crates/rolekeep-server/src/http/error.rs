//! API error format and the JSON body extractor.
//!
//! Every failure leaves the server as `{"code": ..., "message": ...}`.

use axum::{
    Json,
    extract::{FromRequest, FromRequestParts, Query, Request, rejection::JsonRejection},
    http::{StatusCode, request::Parts},
    response::IntoResponse,
};
use rolekeep_core::RolekeepError;
use serde::{Serialize, de::DeserializeOwned};
use tracing::error;
use utoipa::ToSchema;

/// Machine-readable error codes.
pub mod error_codes {
    /// Malformed or incomplete request (400).
    pub const VALIDATION_ERROR: &str = "validation_error";
    /// Requested entity does not exist (404).
    pub const NOT_FOUND: &str = "not_found";
    /// Uniqueness violation on create (409).
    pub const CONFLICT: &str = "conflict";
    /// Request body exceeds the configured limit (413).
    pub const PAYLOAD_TOO_LARGE: &str = "payload_too_large";
    /// Handler did not finish within the request timeout (408).
    pub const REQUEST_TIMEOUT: &str = "request_timeout";
    /// Store failure or other unexpected error (500).
    pub const INTERNAL_ERROR: &str = "internal_error";
}

#[derive(Debug, Serialize, ToSchema)]
pub struct ApiError {
    pub code: String,
    pub message: String,
}

impl ApiError {
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
        }
    }

    pub fn validation_error(message: impl Into<String>) -> Self {
        Self::new(error_codes::VALIDATION_ERROR, message)
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(error_codes::NOT_FOUND, message)
    }

    pub fn conflict(message: impl Into<String>) -> Self {
        Self::new(error_codes::CONFLICT, message)
    }

    pub fn internal_error(message: impl Into<String>) -> Self {
        Self::new(error_codes::INTERNAL_ERROR, message)
    }

    pub fn status(&self) -> StatusCode {
        use error_codes::*;

        match self.code.as_str() {
            VALIDATION_ERROR => StatusCode::BAD_REQUEST,
            NOT_FOUND => StatusCode::NOT_FOUND,
            CONFLICT => StatusCode::CONFLICT,
            PAYLOAD_TOO_LARGE => StatusCode::PAYLOAD_TOO_LARGE,
            REQUEST_TIMEOUT => StatusCode::REQUEST_TIMEOUT,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> axum::response::Response {
        (self.status(), Json(self)).into_response()
    }
}

impl From<RolekeepError> for ApiError {
    fn from(err: RolekeepError) -> Self {
        match err {
            RolekeepError::Validation { message } => ApiError::validation_error(message),
            RolekeepError::NotFound { entity, id } => {
                ApiError::not_found(format!("{entity} not found: {id}"))
            }
            RolekeepError::AlreadyExists { entity } => {
                ApiError::conflict(format!("{entity} already exists"))
            }
            RolekeepError::Database(msg) => {
                error!(error = %msg, "Store error while handling request");
                ApiError::internal_error("storage operation failed")
            }
            RolekeepError::Internal(msg) => {
                error!(error = %msg, "Internal error while handling request");
                ApiError::internal_error("internal error")
            }
        }
    }
}

pub type ApiResult<T> = Result<T, ApiError>;

/// JSON extractor that reports deserialization failures as 400 with the
/// API error body instead of axum's plain-text 422.
///
/// Preserves 413 Payload Too Large for body limit errors.
pub struct JsonBody<T>(pub T);

impl<S, T> FromRequest<S> for JsonBody<T>
where
    T: DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        match Json::<T>::from_request(req, state).await {
            Ok(Json(value)) => Ok(JsonBody(value)),
            Err(rejection) => {
                let too_large = matches!(rejection, JsonRejection::BytesRejection(_))
                    && rejection.status() == StatusCode::PAYLOAD_TOO_LARGE;

                if too_large {
                    Err(ApiError::new(
                        error_codes::PAYLOAD_TOO_LARGE,
                        rejection.body_text(),
                    ))
                } else {
                    Err(ApiError::validation_error(rejection.body_text()))
                }
            }
        }
    }
}

/// Query string extractor with the same error body as [`JsonBody`].
pub struct QueryParams<T>(pub T);

impl<S, T> FromRequestParts<S> for QueryParams<T>
where
    T: DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        Query::<T>::from_request_parts(parts, state)
            .await
            .map(|Query(value)| QueryParams(value))
            .map_err(|rejection| ApiError::validation_error(rejection.body_text()))
    }
}
