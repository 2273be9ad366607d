//! Typed errors and HTTP mapping.

use crate::model::EMAIL_UNIQUE_CONSTRAINT;
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("invalid value for {key}: {value}")]
    InvalidValue { key: &'static str, value: String },
    #[error("unknown store backend '{0}' (expected 'postgres' or 'memory')")]
    UnknownStore(String),
}

/// Failures reported by a [`crate::store::CustomerStore`].
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("email already registered: {0}")]
    DuplicateEmail(String),
    #[error("unique constraint {constraint} violated")]
    UniqueViolation { constraint: String },
    #[error("database: {0}")]
    Db(#[source] sqlx::Error),
    #[error("store unavailable: {0}")]
    Unavailable(String),
}

/// SQLSTATE for `unique_violation`.
const PG_UNIQUE_VIOLATION: &str = "23505";

impl StoreError {
    /// Map a sqlx error. A unique violation on the email constraint becomes
    /// [`StoreError::DuplicateEmail`] carrying `email`, or the key Postgres reports when `email`
    /// is not known (batch inserts). Other unique violations keep their constraint name.
    pub fn from_sqlx(e: sqlx::Error, email: Option<&str>) -> Self {
        if let sqlx::Error::Database(db) = &e {
            if db.code().as_deref() == Some(PG_UNIQUE_VIOLATION) {
                let detail = db
                    .try_downcast_ref::<sqlx::postgres::PgDatabaseError>()
                    .and_then(|pg| pg.detail());
                return unique_violation(db.constraint(), email, detail);
            }
        }
        if matches!(e, sqlx::Error::Io(_) | sqlx::Error::PoolTimedOut | sqlx::Error::PoolClosed) {
            return StoreError::Unavailable(e.to_string());
        }
        StoreError::Db(e)
    }
}

fn unique_violation(constraint: Option<&str>, email: Option<&str>, detail: Option<&str>) -> StoreError {
    match constraint {
        Some(EMAIL_UNIQUE_CONSTRAINT) => {
            let email = email
                .map(str::to_string)
                .or_else(|| detail.and_then(conflicting_email))
                .unwrap_or_default();
            StoreError::DuplicateEmail(email)
        }
        other => StoreError::UniqueViolation {
            constraint: other.unwrap_or("unknown").to_string(),
        },
    }
}

/// Value from a Postgres detail line such as `Key (email)=(a@b.io) already exists.`
fn conflicting_email(detail: &str) -> Option<String> {
    let rest = detail.strip_prefix("Key (email)=(")?;
    let end = rest.rfind(") already exists")?;
    Some(rest[..end].to_string())
}

impl From<sqlx::Error> for StoreError {
    fn from(e: sqlx::Error) -> Self {
        StoreError::from_sqlx(e, None)
    }
}

/// Failures of the dev utilities (bulk generation and table clear).
#[derive(Error, Debug)]
pub enum DevError {
    #[error("could not draw a unique email for record {slot} after {attempts} attempts; no records were added")]
    GenerationExhausted { slot: u64, attempts: u64 },
    #[error("bulk insert failed: {source}. No records were added. Current count: {prior_count}")]
    BulkInsertFailed {
        prior_count: u64,
        #[source]
        source: StoreError,
    },
    #[error("failed to truncate the customers table: {source}")]
    ClearFailed {
        #[source]
        source: StoreError,
    },
    #[error(transparent)]
    Store(#[from] StoreError),
}

#[derive(Error, Debug)]
pub enum AppError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error("not found: {0}")]
    NotFound(String),
    #[error("validation: {0}")]
    Validation(String),
    #[error("email already registered: {0}")]
    DuplicateEmail(String),
    #[error("bad request: {0}")]
    BadRequest(String),
    #[error(transparent)]
    Store(StoreError),
    #[error(transparent)]
    Dev(#[from] DevError),
}

impl From<StoreError> for AppError {
    fn from(e: StoreError) -> Self {
        match e {
            StoreError::DuplicateEmail(email) => AppError::DuplicateEmail(email),
            other => AppError::Store(other),
        }
    }
}

#[derive(Serialize)]
pub struct ErrorBody {
    pub error: ErrorDetail,
}

#[derive(Serialize)]
pub struct ErrorDetail {
    pub code: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
}

impl AppError {
    pub fn status_and_code(&self) -> (StatusCode, &'static str) {
        match self {
            AppError::Config(_) => (StatusCode::INTERNAL_SERVER_ERROR, "config_error"),
            AppError::NotFound(_) => (StatusCode::NOT_FOUND, "not_found"),
            AppError::Validation(_) => (StatusCode::UNPROCESSABLE_ENTITY, "validation_error"),
            AppError::DuplicateEmail(_) => (StatusCode::CONFLICT, "duplicate_email"),
            AppError::BadRequest(_) => (StatusCode::BAD_REQUEST, "bad_request"),
            AppError::Store(StoreError::UniqueViolation { .. }) => (StatusCode::CONFLICT, "unique_violation"),
            AppError::Store(StoreError::Unavailable(_)) => (StatusCode::SERVICE_UNAVAILABLE, "store_unavailable"),
            AppError::Store(_) => (StatusCode::INTERNAL_SERVER_ERROR, "database_error"),
            AppError::Dev(DevError::GenerationExhausted { .. }) => {
                (StatusCode::INTERNAL_SERVER_ERROR, "generation_exhausted")
            }
            AppError::Dev(DevError::BulkInsertFailed { .. }) => (StatusCode::INTERNAL_SERVER_ERROR, "bulk_insert_failed"),
            AppError::Dev(DevError::ClearFailed { .. }) => (StatusCode::INTERNAL_SERVER_ERROR, "clear_failed"),
            AppError::Dev(DevError::Store(_)) => (StatusCode::INTERNAL_SERVER_ERROR, "database_error"),
        }
    }

    fn details(&self) -> Option<serde_json::Value> {
        match self {
            AppError::Dev(DevError::BulkInsertFailed { prior_count, .. }) => {
                Some(serde_json::json!({ "prior_count": prior_count }))
            }
            AppError::Dev(DevError::GenerationExhausted { slot, attempts }) => {
                Some(serde_json::json!({ "slot": slot, "attempts": attempts }))
            }
            _ => None,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code) = self.status_and_code();
        if status.is_server_error() {
            tracing::error!(error = %self, code, "request failed");
        }
        let body = ErrorBody {
            error: ErrorDetail {
                code: code.to_string(),
                message: self.to_string(),
                details: self.details(),
            },
        };
        (status, Json(body)).into_response()
    }
}
