//! Typed errors and HTTP mapping. Every error renders as the standard envelope with `success: false`.

use crate::response::error_body;
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("missing environment variable {0}")]
    Missing(&'static str),
    #[error("invalid {key}: {reason}")]
    Invalid { key: &'static str, reason: String },
}

#[derive(Error, Debug)]
pub enum AppError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error("{0}")]
    NotFound(String),
    #[error("{0}")]
    Conflict(String),
    #[error("{0}")]
    Unauthorized(String),
    #[error("{0}")]
    Forbidden(String),
    #[error("{0}")]
    Validation(String),
    #[error("{0}")]
    OperationFailed(String),
    #[error("database: {0}")]
    Db(#[from] sqlx::Error),
    #[error("CAS server: {0}")]
    Upstream(String),
}

impl AppError {
    /// Classify a failed insert/update/delete. Constraint violations become Conflict,
    /// anything else is an OperationFailed (the transaction has already been dropped).
    pub fn from_write(label: &str, err: sqlx::Error) -> Self {
        if let sqlx::Error::Database(db) = &err {
            let constraint = db.constraint().unwrap_or("unknown constraint");
            if db.is_unique_violation() {
                return AppError::Conflict(format!("{} already exists ({})", label, constraint));
            }
            if db.is_foreign_key_violation() {
                return AppError::Conflict(format!(
                    "{} references a record that does not exist ({})",
                    label, constraint
                ));
            }
        }
        tracing::error!(entity = label, error = %err, "write failed");
        AppError::OperationFailed(format!("Failed to write {}", label.to_lowercase()))
    }

    pub fn status(&self) -> StatusCode {
        match self {
            AppError::Config(_) => StatusCode::INTERNAL_SERVER_ERROR,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::Conflict(_) => StatusCode::CONFLICT,
            AppError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            AppError::Forbidden(_) => StatusCode::FORBIDDEN,
            AppError::Validation(_) => StatusCode::UNPROCESSABLE_ENTITY,
            AppError::OperationFailed(_) => StatusCode::INTERNAL_SERVER_ERROR,
            AppError::Db(sqlx::Error::RowNotFound) => StatusCode::NOT_FOUND,
            AppError::Db(_) => StatusCode::INTERNAL_SERVER_ERROR,
            AppError::Upstream(_) => StatusCode::BAD_GATEWAY,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        let message = match &self {
            AppError::Db(sqlx::Error::RowNotFound) => "Record not found".to_string(),
            AppError::Db(e) => {
                tracing::error!(error = %e, "database error");
                "Internal database error".to_string()
            }
            AppError::Config(e) => {
                tracing::error!(error = %e, "configuration error");
                "Server misconfigured".to_string()
            }
            other => other.to_string(),
        };
        if status.is_client_error() {
            tracing::warn!(%status, error = %message, "request rejected");
        }
        (status, Json(error_body(message))).into_response()
    }
}
