//! Common routes: root greeting, health, readiness, version, store probe.

use crate::state::AppState;
use axum::{extract::State, http::StatusCode, routing::get, Json, Router};
use serde::Serialize;

#[derive(Serialize)]
struct HealthBody {
    status: &'static str,
}

#[derive(Serialize)]
struct ReadyBody {
    status: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    database: Option<&'static str>,
}

#[derive(Serialize)]
struct ProbeBody {
    status: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
}

async fn root() -> Json<serde_json::Value> {
    Json(serde_json::json!({ "message": "Hello World!" }))
}

async fn health() -> Json<HealthBody> {
    Json(HealthBody { status: "ok" })
}

async fn ready(State(state): State<AppState>) -> Result<Json<ReadyBody>, (StatusCode, Json<ReadyBody>)> {
    if state.store.ping().await.is_err() {
        return Err((
            StatusCode::SERVICE_UNAVAILABLE,
            Json(ReadyBody {
                status: "degraded",
                database: Some("unavailable"),
            }),
        ));
    }
    Ok(Json(ReadyBody {
        status: "ok",
        database: Some("ok"),
    }))
}

/// Always 200; the body says whether the store answered.
async fn test_db(State(state): State<AppState>) -> Json<ProbeBody> {
    match state.store.ping().await {
        Ok(()) => Json(ProbeBody {
            status: "successful",
            error: None,
        }),
        Err(e) => Json(ProbeBody {
            status: "failed",
            error: Some(e.to_string()),
        }),
    }
}

async fn version() -> Json<serde_json::Value> {
    Json(serde_json::json!({
        "name": env!("CARGO_PKG_NAME"),
        "version": env!("CARGO_PKG_VERSION")
    }))
}

/// Common routes including readiness with a store check. Requires AppState.
pub fn common_routes(state: AppState) -> Router {
    Router::new()
        .route("/", get(root))
        .route("/health", get(health))
        .route("/ready", get(ready))
        .route("/version", get(version))
        .route("/info", get(version))
        .with_state(state)
}

/// GET /test-db, mounted under the API prefix.
pub fn probe_routes(state: AppState) -> Router {
    Router::new().route("/test-db", get(test_db)).with_state(state)
}
