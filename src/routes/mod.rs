//! Routers for the customer API, dev utilities, common endpoints and the OpenAPI document.

mod common;
mod customer;
mod dev;

pub use common::{common_routes, probe_routes};
pub use customer::customer_routes;
pub use dev::dev_routes;

use crate::openapi::openapi_routes;
use crate::state::AppState;
use axum::Router;
use tower_http::limit::RequestBodyLimitLayer;

/// Request bodies above this size are rejected with 413.
pub const BODY_LIMIT_BYTES: usize = 1024 * 1024;

/// The full application: common routes at the root, everything else under `/api`.
pub fn app(state: AppState, with_dev_routes: bool) -> Router {
    let mut api = Router::new()
        .merge(customer_routes(state.clone()))
        .merge(probe_routes(state.clone()))
        .merge(openapi_routes());
    if with_dev_routes {
        api = api.merge(dev_routes(state.clone()));
    }
    Router::new()
        .merge(common_routes(state))
        .nest("/api", api)
        .layer(RequestBodyLimitLayer::new(BODY_LIMIT_BYTES))
}
