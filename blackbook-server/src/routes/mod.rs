pub mod events;
pub mod masterdata;
pub mod sessions;

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;

use blackbook_core::BlackbookError;
use blackbook_core::navigation::NavigationError;

/// Standard API error response
#[derive(Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

/// Convert anyhow errors to HTTP responses
#[derive(Debug)]
pub struct AppError(anyhow::Error);

impl AppError {
    fn status(&self) -> StatusCode {
        if self.0.downcast_ref::<NavigationError>().is_some() {
            return StatusCode::BAD_REQUEST;
        }
        match self.0.downcast_ref::<BlackbookError>() {
            Some(BlackbookError::NotFound { .. }) => StatusCode::NOT_FOUND,
            Some(BlackbookError::Auth(_)) => StatusCode::UNAUTHORIZED,
            Some(BlackbookError::Navigation(_)) => StatusCode::BAD_REQUEST,
            Some(BlackbookError::InvalidEvent(_)) => StatusCode::UNPROCESSABLE_ENTITY,
            Some(BlackbookError::InUse { .. }) => StatusCode::CONFLICT,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            tracing::error!(error = %self.0, "request failed");
        }
        let body = Json(ErrorResponse {
            error: self.0.to_string(),
        });
        (status, body).into_response()
    }
}

impl<E> From<E> for AppError
where
    E: Into<anyhow::Error>,
{
    fn from(err: E) -> Self {
        Self(err.into())
    }
}
