//! OpenAPI document for the HTTP API, served at `/api/openapi.json`.

use crate::handlers::{customer, dev};
use crate::model::{Customer, CustomerPatch, NewCustomer};
use axum::{routing::get, Json, Router};
use utoipa::OpenApi;

#[derive(OpenApi)]
#[openapi(
    info(title = "Customer Service"),
    paths(
        customer::list,
        customer::create,
        customer::read,
        customer::update,
        customer::delete,
        dev::populate,
        dev::clear
    ),
    components(schemas(Customer, NewCustomer, CustomerPatch))
)]
pub struct ApiDoc;

async fn openapi_json() -> Json<utoipa::openapi::OpenApi> {
    Json(ApiDoc::openapi())
}

pub fn openapi_routes() -> Router {
    Router::new().route("/openapi.json", get(openapi_json))
}
