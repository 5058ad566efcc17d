use std::fmt;

use axum::{http::StatusCode, response::IntoResponse, Json};
use serde::{Deserialize, Serialize};
use tracing::{error, warn};
use uuid::Uuid;

#[derive(Debug, PartialEq, Eq, Clone)]
pub struct CtxError {
    pub error: AppError,
    pub req_id: Uuid,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum AppError {
    Generic { description: String },
    EntityFailIdNotFound { ident: String },
    Conflict { ident: String },
    AlreadyExists { ident: String },
    InvalidTransition { from: String, to: String },
    NotClaimant { ident: String },
    Forbidden { required: String },
    AuthFailNoToken,
    AuthFailTokenInvalid { source: String },
    Validation { description: String },
    Serde { source: String },
    SurrealDb { source: String },
}

/// Error carrying the request id that is reported back to the client.
pub type CtxResult<T> = core::result::Result<T, CtxError>;
/// Any error raised before a response is composed.
pub type AppResult<T> = core::result::Result<T, AppError>;

impl std::error::Error for AppError {}

impl From<AppError> for CtxError {
    fn from(value: AppError) -> Self {
        CtxError {
            req_id: Uuid::new_v4(),
            error: value,
        }
    }
}

impl From<surrealdb::Error> for CtxError {
    fn from(value: surrealdb::Error) -> Self {
        AppError::from(value).into()
    }
}

impl From<validator::ValidationErrors> for CtxError {
    fn from(value: validator::ValidationErrors) -> Self {
        AppError::from(value).into()
    }
}

impl From<CtxError> for AppError {
    fn from(value: CtxError) -> Self {
        value.error
    }
}

const INTERNAL: &str = "Internal error";

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Generic { description } => write!(f, "{description}"),
            Self::EntityFailIdNotFound { ident } => write!(f, "Record id= {ident} not found"),
            Self::Conflict { .. } => write!(f, "Task already taken, refresh the list"),
            Self::AlreadyExists { ident } => write!(f, "Record id= {ident} already exists"),
            Self::InvalidTransition { from, to } => {
                write!(f, "Transition {from} -> {to} is not allowed")
            }
            Self::NotClaimant { .. } => write!(f, "Task is not claimed by you"),
            Self::Forbidden { required } => write!(f, "Requires {required} role"),
            Self::AuthFailNoToken => write!(f, "You are not logged in"),
            Self::AuthFailTokenInvalid { .. } => write!(f, "The provided token is not valid"),
            Self::Validation { description } => write!(f, "{description}"),
            Self::Serde { source } => write!(f, "Serde error - {source}"),
            Self::SurrealDb { .. } => write!(f, "{INTERNAL}, try again"),
        }
    }
}

impl AppError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            AppError::EntityFailIdNotFound { .. } => StatusCode::NOT_FOUND,
            AppError::Conflict { .. } | AppError::AlreadyExists { .. } => StatusCode::CONFLICT,
            AppError::InvalidTransition { .. }
            | AppError::Validation { .. }
            | AppError::Serde { .. }
            | AppError::Generic { .. } => StatusCode::BAD_REQUEST,
            AppError::NotClaimant { .. } | AppError::Forbidden { .. } => StatusCode::FORBIDDEN,
            AppError::AuthFailNoToken | AppError::AuthFailTokenInvalid { .. } => {
                StatusCode::UNAUTHORIZED
            }
            AppError::SurrealDb { .. } => StatusCode::SERVICE_UNAVAILABLE,
        }
    }
}

#[derive(Serialize, Deserialize, Debug)]
pub struct ErrorResponseBody {
    pub error: String,
    pub req_id: String,
}

impl ErrorResponseBody {
    pub fn new(error: String, req_id: Option<String>) -> Self {
        ErrorResponseBody {
            error,
            req_id: req_id.unwrap_or_else(|| Uuid::new_v4().to_string()),
        }
    }
}

// REST error response
impl IntoResponse for CtxError {
    fn into_response(self) -> axum::response::Response {
        let status_code = self.error.status_code();
        match &self.error {
            AppError::SurrealDb { source } => {
                error!(req_id = %self.req_id, "storage failure: {source}")
            }
            AppError::Conflict { ident } => warn!(req_id = %self.req_id, "conflict on {ident}"),
            err => warn!(req_id = %self.req_id, "request failed: {err:?}"),
        }
        let body = ErrorResponseBody::new(self.error.to_string(), Some(self.req_id.to_string()));
        let mut response = (status_code, Json(body)).into_response();
        response.extensions_mut().insert(self.error);
        response
    }
}

// External Errors
impl From<serde_json::Error> for AppError {
    fn from(value: serde_json::Error) -> Self {
        Self::Serde {
            source: value.to_string(),
        }
    }
}

impl From<surrealdb::Error> for AppError {
    fn from(value: surrealdb::Error) -> Self {
        Self::SurrealDb {
            source: value.to_string(),
        }
    }
}

impl From<validator::ValidationErrors> for AppError {
    fn from(value: validator::ValidationErrors) -> Self {
        Self::Validation {
            description: value.to_string(),
        }
    }
}

impl From<jsonwebtoken::errors::Error> for AppError {
    fn from(value: jsonwebtoken::errors::Error) -> Self {
        Self::AuthFailTokenInvalid {
            source: value.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn storage_errors_are_never_conflicts() {
        let err = AppError::SurrealDb {
            source: "io".to_string(),
        };
        assert_eq!(err.status_code(), StatusCode::SERVICE_UNAVAILABLE);
        assert_ne!(err.status_code(), StatusCode::CONFLICT);
    }

    #[test]
    fn taxonomy_status_codes() {
        let conflict = AppError::Conflict {
            ident: "task:1".to_string(),
        };
        assert_eq!(conflict.status_code(), StatusCode::CONFLICT);
        assert_eq!(conflict.to_string(), "Task already taken, refresh the list");
        let not_claimant = AppError::NotClaimant {
            ident: "task:1".to_string(),
        };
        assert_eq!(not_claimant.status_code(), StatusCode::FORBIDDEN);
        let not_found = AppError::EntityFailIdNotFound {
            ident: "task:1".to_string(),
        };
        assert_eq!(not_found.status_code(), StatusCode::NOT_FOUND);
    }
}
