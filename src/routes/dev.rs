//! Dev utility routes. Mount only where bulk writes and truncation are acceptable.

use crate::handlers::dev::{clear, populate};
use crate::state::AppState;
use axum::{routing::post, Router};

pub fn dev_routes(state: AppState) -> Router {
    Router::new()
        .route("/dev/populate", post(populate))
        .route("/dev/clear", post(clear))
        .with_state(state)
}
