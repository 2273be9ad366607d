//! HTTP handlers for customer CRUD and the dev utilities.

pub mod customer;
pub mod dev;

use crate::error::AppError;
use axum::extract::{rejection::QueryRejection, Query};

/// Unwrap query parameters, reporting a malformed query string as a validation error.
fn query_params<T>(params: Result<Query<T>, QueryRejection>) -> Result<T, AppError> {
    params
        .map(|Query(v)| v)
        .map_err(|e| AppError::Validation(e.body_text()))
}
