use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use tracing::error;

use crate::users::{error::UserError, validation::ValidationError};

/// JSON error returned by the `/api` routes.
#[derive(Debug)]
pub struct ApiError(pub UserError);

#[derive(Serialize)]
struct ApiErrBody {
    error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    validation: Option<ValidationError>,
}

impl ApiError {
    pub fn status_code(&self) -> StatusCode {
        match &self.0 {
            UserError::Validation(_) => StatusCode::UNPROCESSABLE_ENTITY,
            UserError::DuplicateUsername
            | UserError::DuplicateEmail
            | UserError::DuplicateConstraint
            | UserError::ConstraintViolation => StatusCode::CONFLICT,
            UserError::NotFound => StatusCode::NOT_FOUND,
            UserError::Hashing(_) | UserError::Storage(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<UserError> for ApiError {
    fn from(e: UserError) -> Self {
        Self(e)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        if status.is_server_error() {
            error!(error = ?self.0, "request failed");
        }
        let validation = match &self.0 {
            UserError::Validation(v) => Some(*v),
            _ => None,
        };
        let body = ApiErrBody {
            error: self.0.to_string(),
            validation,
        };
        (status, Json(body)).into_response()
    }
}
