//! Request-boundary error mapping.
//!
//! # Responsibility
//! - Translate repository errors into status codes and `{"message": ...}`
//!   JSON bodies.
//!
//! # Invariants
//! - Every error is recovered here; no request failure is fatal to the
//!   process.
//! - Storage/internal failures are logged but never leak details to the
//!   client.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use log::error;
use phonebook_core::RepoError;
use serde::Serialize;

/// Client-facing request failure.
#[derive(Debug)]
pub struct ApiError {
    status: StatusCode,
    message: &'static str,
}

#[derive(Debug, Serialize)]
struct ErrorBody {
    message: &'static str,
}

impl ApiError {
    fn new(status: StatusCode, message: &'static str) -> Self {
        Self { status, message }
    }

    /// Missing or empty required field, or an unreadable JSON body.
    pub fn invalid_input() -> Self {
        Self::new(StatusCode::BAD_REQUEST, "Invalid input")
    }

    pub fn contact_not_found() -> Self {
        Self::new(StatusCode::NOT_FOUND, "Contact not found")
    }

    pub fn duplicate_phone() -> Self {
        Self::new(StatusCode::CONFLICT, "Phone number already exists")
    }

    fn internal() -> Self {
        Self::new(StatusCode::INTERNAL_SERVER_ERROR, "Internal server error")
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (
            self.status,
            Json(ErrorBody {
                message: self.message,
            }),
        )
            .into_response()
    }
}

impl From<RepoError> for ApiError {
    fn from(err: RepoError) -> Self {
        match err {
            RepoError::Validation(_) => Self::invalid_input(),
            RepoError::NotFound(_) => Self::contact_not_found(),
            RepoError::DuplicatePhone(_) => Self::duplicate_phone(),
            other => {
                error!("event=storage_error module=server status=error error={other}");
                Self::internal()
            }
        }
    }
}
