use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

use crate::engine::MutationError;
use crate::path::PathError;
use crate::sections::drag::DragError;
use crate::sections::SectionError;
use crate::store::StoreError;

/// Application-level error type.
/// Implements `IntoResponse` so Axum handlers can return `Result<T, AppError>`.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Invalid path: {0}")]
    InvalidPath(#[from] PathError),

    #[error("Edit rejected: {0}")]
    Mutation(#[from] MutationError),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Storage error: {0}")]
    Store(StoreError),

    #[error("Internal server error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl From<StoreError> for AppError {
    fn from(e: StoreError) -> Self {
        match e {
            StoreError::NotFound(id) => AppError::NotFound(format!("resume {id}")),
            other => AppError::Store(other),
        }
    }
}

impl From<SectionError> for AppError {
    fn from(e: SectionError) -> Self {
        match e {
            SectionError::Mutation(inner) => AppError::Mutation(inner),
            SectionError::NoSuchSection { .. } => AppError::NotFound(e.to_string()),
            SectionError::AlreadyAdded(_) => AppError::Conflict(e.to_string()),
        }
    }
}

impl From<DragError> for AppError {
    fn from(e: DragError) -> Self {
        match e {
            DragError::Section(inner) => inner.into(),
            DragError::UnknownSection(_) => AppError::NotFound(e.to_string()),
            DragError::AlreadyActive | DragError::AlreadyAdded(_) => {
                AppError::Conflict(e.to_string())
            }
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code, message) = match &self {
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, "NOT_FOUND", msg.clone()),
            AppError::Validation(msg) => (StatusCode::BAD_REQUEST, "VALIDATION_ERROR", msg.clone()),
            AppError::InvalidPath(e) => (StatusCode::BAD_REQUEST, "INVALID_PATH", e.to_string()),
            AppError::Mutation(e) => {
                let status = match e {
                    MutationError::Unresolved { .. } | MutationError::IndexOutOfRange { .. } => {
                        StatusCode::NOT_FOUND
                    }
                    MutationError::InvalidValue { .. } | MutationError::TagLocked { .. } => {
                        StatusCode::UNPROCESSABLE_ENTITY
                    }
                };
                (status, "EDIT_REJECTED", e.to_string())
            }
            AppError::Conflict(msg) => (StatusCode::CONFLICT, "CONFLICT", msg.clone()),
            AppError::Store(e) => {
                tracing::error!("Storage error: {e}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "STORAGE_ERROR",
                    "A storage error occurred".to_string(),
                )
            }
            AppError::Internal(e) => {
                tracing::error!("Internal error: {e:?}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "INTERNAL_ERROR",
                    "An internal server error occurred".to_string(),
                )
            }
        };

        let body = Json(json!({
            "error": {
                "code": code,
                "message": message
            }
        }));

        (status, body).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    #[test]
    fn test_status_codes() {
        let cases: Vec<(AppError, StatusCode)> = vec![
            (StoreError::NotFound(Uuid::nil()).into(), StatusCode::NOT_FOUND),
            (PathError::Empty.into(), StatusCode::BAD_REQUEST),
            (
                MutationError::IndexOutOfRange {
                    path: "skills".into(),
                    index: 3,
                    len: 0,
                }
                .into(),
                StatusCode::NOT_FOUND,
            ),
            (
                MutationError::TagLocked {
                    path: "dynamicSections[0]".into(),
                    field: "type".into(),
                }
                .into(),
                StatusCode::UNPROCESSABLE_ENTITY,
            ),
            (DragError::AlreadyActive.into(), StatusCode::CONFLICT),
            (
                SectionError::NoSuchSection { index: 1, len: 0 }.into(),
                StatusCode::NOT_FOUND,
            ),
        ];
        for (error, status) in cases {
            assert_eq!(error.into_response().status(), status);
        }
    }
}
