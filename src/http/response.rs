//! Error responses.
//!
//! # Design Decisions
//! - WrongCredentials → 401, ServiceUnavailable → 503
//! - Dependency diagnostics never reach the response body

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::{Deserialize, Serialize};

use crate::auth::LoginError;

/// JSON error body.
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorBody {
    pub error: String,
}

/// Errors returned by HTTP handlers.
#[derive(Debug)]
pub enum ApiError {
    Login(LoginError),
    BadRequest(String),
    Internal,
}

impl From<LoginError> for ApiError {
    fn from(err: LoginError) -> Self {
        ApiError::Login(err)
    }
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::Login(LoginError::WrongCredentials) => StatusCode::UNAUTHORIZED,
            ApiError::Login(LoginError::ServiceUnavailable) => StatusCode::SERVICE_UNAVAILABLE,
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::Internal => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let error = match self {
            ApiError::Login(err) => err.to_string(),
            ApiError::BadRequest(reason) => reason,
            ApiError::Internal => "internal error".to_string(),
        };
        (status, Json(ErrorBody { error })).into_response()
    }
}
