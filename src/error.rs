use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use sea_orm::{DbErr, SqlErr};
use serde::Serialize;
use thiserror::Error;
use utoipa::ToSchema;

use crate::{
    entity::EntityKind,
    response::{ApiResponse, Meta},
    validation::FieldErrors,
};

/// Rows of one kind that prevent a delete.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
pub struct BlockingReference {
    pub entity: EntityKind,
    pub ids: Vec<i32>,
}

#[derive(Debug, Error)]
pub enum AppError {
    #[error("{entity} {id} not found")]
    NotFound { entity: EntityKind, id: i32 },

    #[error("Validation failed")]
    Validation(FieldErrors),

    #[error("Cannot delete {entity} {id}: it is still referenced")]
    ReferentialIntegrity {
        entity: EntityKind,
        id: i32,
        blocked_by: Vec<BlockingReference>,
    },

    #[error("{entity} with {field} {value:?} already exists")]
    Uniqueness {
        entity: EntityKind,
        field: &'static str,
        value: String,
    },

    #[error("Bad Request {0}")]
    BadRequest(String),

    #[error("ORM error")]
    OrmError(#[from] DbErr),

    #[error("Internal Server Error")]
    Internal(#[from] anyhow::Error),
}

impl AppError {
    pub fn not_found(entity: EntityKind, id: i32) -> Self {
        AppError::NotFound { entity, id }
    }

    /// Turns a unique-constraint violation raised by the database into `Uniqueness`.
    pub fn from_unique_violation(
        err: DbErr,
        entity: EntityKind,
        field: &'static str,
        value: &str,
    ) -> Self {
        match err.sql_err() {
            Some(SqlErr::UniqueConstraintViolation(_)) => AppError::Uniqueness {
                entity,
                field,
                value: value.to_owned(),
            },
            _ => AppError::OrmError(err),
        }
    }
}

#[derive(Serialize)]
struct ErrorData {
    error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    details: Option<serde_json::Value>,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, details) = match &self {
            AppError::NotFound { .. } => (StatusCode::NOT_FOUND, None),
            AppError::Validation(errors) => (
                StatusCode::UNPROCESSABLE_ENTITY,
                serde_json::to_value(errors).ok(),
            ),
            AppError::ReferentialIntegrity { blocked_by, .. } => (
                StatusCode::CONFLICT,
                Some(serde_json::json!({ "blocked_by": blocked_by })),
            ),
            AppError::Uniqueness { field, .. } => (
                StatusCode::CONFLICT,
                Some(serde_json::json!({ "field": field })),
            ),
            AppError::BadRequest(_) => (StatusCode::BAD_REQUEST, None),
            AppError::OrmError(err) => {
                tracing::error!(error = %err, "database error");
                (StatusCode::INTERNAL_SERVER_ERROR, None)
            }
            AppError::Internal(err) => {
                tracing::error!(error = %err, "internal error");
                (StatusCode::INTERNAL_SERVER_ERROR, None)
            }
        };

        let body = ApiResponse {
            message: self.to_string(),
            data: Some(ErrorData {
                error: self.to_string(),
                details,
            }),
            meta: Some(Meta::empty()),
        };

        (status, axum::Json(body)).into_response()
    }
}

pub type AppResult<T> = Result<T, AppError>;
