//! Standard response envelope helpers.

use crate::model::Page;
use axum::{http::StatusCode, Json};
use serde::Serialize;

#[derive(Serialize)]
pub struct SuccessOne<T> {
    pub data: T,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub meta: Option<serde_json::Value>,
}

#[derive(Serialize)]
pub struct SuccessPage<T> {
    pub data: Vec<T>,
    pub meta: PageMeta,
}

#[derive(Serialize)]
pub struct PageMeta {
    pub total: u64,
    pub skip: u64,
    pub limit: u64,
    pub count: u64,
}

pub fn success_one<T: Serialize>(data: T) -> (StatusCode, Json<SuccessOne<T>>) {
    (
        StatusCode::CREATED,
        Json(SuccessOne {
            data,
            meta: None,
        }),
    )
}

pub fn success_one_ok<T: Serialize>(data: T) -> (StatusCode, Json<SuccessOne<T>>) {
    (
        StatusCode::OK,
        Json(SuccessOne {
            data,
            meta: None,
        }),
    )
}

/// 200 with a human-readable `meta.message` next to the typed payload.
pub fn success_with_message<T: Serialize>(data: T, message: String) -> (StatusCode, Json<SuccessOne<T>>) {
    (
        StatusCode::OK,
        Json(SuccessOne {
            data,
            meta: Some(serde_json::json!({ "message": message })),
        }),
    )
}

pub fn success_page<T: Serialize>(page: Page<T>) -> (StatusCode, Json<SuccessPage<T>>) {
    let count = page.records.len() as u64;
    (
        StatusCode::OK,
        Json(SuccessPage {
            data: page.records,
            meta: PageMeta {
                total: page.total,
                skip: page.skip,
                limit: page.limit,
                count,
            },
        }),
    )
}
