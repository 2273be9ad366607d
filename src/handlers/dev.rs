//! Development endpoints: bulk populate and clear the customers table.

use super::query_params;
use crate::dev::{clear_all, populate as populate_store};
use crate::error::AppError;
use crate::response::success_with_message;
use crate::service::RequestValidator;
use crate::state::AppState;
use axum::extract::{rejection::QueryRejection, Query, State};
use serde::Deserialize;
use utoipa::IntoParams;

/// Rows generated when `count` is omitted.
pub const DEFAULT_POPULATE_COUNT: u64 = 10_000;

#[derive(Debug, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct PopulateParams {
    /// Records to generate, 1..=50000 (default 10000).
    pub count: Option<u64>,
    /// Populate even when the table already has rows.
    #[serde(default)]
    pub force: bool,
}

#[utoipa::path(
    post,
    path = "/api/dev/populate",
    params(PopulateParams),
    responses(
        (status = 200, description = "Populated, or skipped because the table is not empty"),
        (status = 422, description = "count out of range or malformed query string"),
        (status = 500, description = "Generation exhausted or bulk insert failed; nothing was written")
    )
)]
pub async fn populate(
    State(state): State<AppState>,
    params: Result<Query<PopulateParams>, QueryRejection>,
) -> Result<impl axum::response::IntoResponse, AppError> {
    let params = query_params(params)?;
    let count = params.count.unwrap_or(DEFAULT_POPULATE_COUNT);
    RequestValidator::validate_populate_count(count)?;
    let outcome = populate_store(state.store.as_ref(), count, params.force).await?;
    let message = outcome.to_string();
    Ok(success_with_message(outcome, message))
}

#[utoipa::path(
    post,
    path = "/api/dev/clear",
    responses(
        (status = 200, description = "Table truncated and id sequence reset"),
        (status = 500, description = "Truncate failed; table unchanged")
    )
)]
pub async fn clear(State(state): State<AppState>) -> Result<impl axum::response::IntoResponse, AppError> {
    let outcome = clear_all(state.store.as_ref()).await?;
    let message = outcome.to_string();
    Ok(success_with_message(outcome, message))
}
