//! Customer CRUD handlers: create, read, update, delete, list.

use super::query_params;
use crate::error::AppError;
use crate::model::{Customer, CustomerPatch, NewCustomer};
use crate::response::{success_one, success_one_ok, success_page};
use crate::service::{CustomerService, RequestValidator, MAX_PAGE_LIMIT};
use crate::state::AppState;
use axum::{
    extract::{
        rejection::{JsonRejection, QueryRejection},
        Path, Query, State,
    },
    Json,
};
use serde::Deserialize;
use utoipa::IntoParams;

#[derive(Debug, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct ListParams {
    /// Rows to skip (default 0).
    pub skip: Option<u64>,
    /// Page size, 1..=100 (default 100).
    pub limit: Option<u64>,
}

fn parse_id(id_str: &str) -> Result<i32, AppError> {
    id_str
        .parse()
        .map_err(|_| AppError::BadRequest("invalid id".into()))
}

fn json_body<T>(body: Result<Json<T>, JsonRejection>) -> Result<T, AppError> {
    body.map(|Json(v)| v)
        .map_err(|e| AppError::Validation(e.body_text()))
}

#[utoipa::path(
    get,
    path = "/api/customers",
    params(ListParams),
    responses(
        (status = 200, description = "Page of customers with total count", body = [Customer]),
        (status = 422, description = "limit out of range or malformed query string")
    )
)]
pub async fn list(
    State(state): State<AppState>,
    params: Result<Query<ListParams>, QueryRejection>,
) -> Result<impl axum::response::IntoResponse, AppError> {
    let params = query_params(params)?;
    RequestValidator::validate_page(params.limit.unwrap_or(MAX_PAGE_LIMIT))?;
    let page = CustomerService::list(state.store.as_ref(), params.skip, params.limit).await?;
    Ok(success_page(page))
}

#[utoipa::path(
    post,
    path = "/api/customers",
    request_body = NewCustomer,
    responses(
        (status = 201, description = "Customer created", body = Customer),
        (status = 409, description = "Email already registered"),
        (status = 422, description = "Invalid payload")
    )
)]
pub async fn create(
    State(state): State<AppState>,
    body: Result<Json<NewCustomer>, JsonRejection>,
) -> Result<impl axum::response::IntoResponse, AppError> {
    let body = json_body(body)?;
    RequestValidator::validate_new(&body)?;
    let row = CustomerService::create(state.store.as_ref(), &body).await?;
    Ok(success_one(row))
}

#[utoipa::path(
    get,
    path = "/api/customers/{id}",
    params(("id" = i32, Path, description = "Customer id")),
    responses(
        (status = 200, description = "Customer", body = Customer),
        (status = 404, description = "Customer not found")
    )
)]
pub async fn read(
    State(state): State<AppState>,
    Path(id_str): Path<String>,
) -> Result<impl axum::response::IntoResponse, AppError> {
    let id = parse_id(&id_str)?;
    let row = CustomerService::get(state.store.as_ref(), id).await?;
    Ok(success_one_ok(row))
}

#[utoipa::path(
    patch,
    path = "/api/customers/{id}",
    params(("id" = i32, Path, description = "Customer id")),
    request_body = CustomerPatch,
    responses(
        (status = 200, description = "Updated customer", body = Customer),
        (status = 404, description = "Customer not found"),
        (status = 409, description = "Email belongs to another customer")
    )
)]
pub async fn update(
    State(state): State<AppState>,
    Path(id_str): Path<String>,
    body: Result<Json<CustomerPatch>, JsonRejection>,
) -> Result<impl axum::response::IntoResponse, AppError> {
    let id = parse_id(&id_str)?;
    let patch = json_body(body)?;
    RequestValidator::validate_patch(&patch)?;
    let row = CustomerService::update(state.store.as_ref(), id, &patch).await?;
    Ok(success_one_ok(row))
}

#[utoipa::path(
    delete,
    path = "/api/customers/{id}",
    params(("id" = i32, Path, description = "Customer id")),
    responses(
        (status = 200, description = "Deleted customer", body = Customer),
        (status = 404, description = "Customer not found")
    )
)]
pub async fn delete(
    State(state): State<AppState>,
    Path(id_str): Path<String>,
) -> Result<impl axum::response::IntoResponse, AppError> {
    let id = parse_id(&id_str)?;
    let row: Customer = CustomerService::delete(state.store.as_ref(), id).await?;
    Ok(success_one_ok(row))
}
