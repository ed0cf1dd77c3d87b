//! Common routes: health, readiness, version.

use crate::registry::ResourceStatus;
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
    resources: Vec<ResourceReport>,
}

#[derive(Serialize)]
struct ResourceReport {
    name: String,
    backend: &'static str,
    status: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    reason: Option<String>,
}

async fn health() -> Json<HealthBody> {
    Json(HealthBody { status: "ok" })
}

async fn ready(State(state): State<AppState>) -> (StatusCode, Json<ReadyBody>) {
    let mut healthy = true;
    let mut resources = Vec::with_capacity(state.registry.entries().len());
    for entry in state.registry.entries() {
        let (status, reason) = match (&entry.status, &entry.collection) {
            (ResourceStatus::Available, Some(collection)) => match collection.ping().await {
                Ok(()) => ("ok", None),
                Err(e) => ("unreachable", Some(e.to_string())),
            },
            (ResourceStatus::Unavailable(reason), _) => ("unavailable", Some(reason.clone())),
            (ResourceStatus::Available, None) => ("unavailable", None),
        };
        healthy &= status == "ok";
        resources.push(ResourceReport {
            name: entry.name.clone(),
            backend: entry.backend.as_str(),
            status,
            reason,
        });
    }
    if healthy {
        (StatusCode::OK, Json(ReadyBody { status: "ok", resources }))
    } else {
        (
            StatusCode::SERVICE_UNAVAILABLE,
            Json(ReadyBody {
                status: "degraded",
                resources,
            }),
        )
    }
}

async fn version() -> Json<serde_json::Value> {
    Json(serde_json::json!({
        "name": env!("CARGO_PKG_NAME"),
        "version": env!("CARGO_PKG_VERSION")
    }))
}

/// GET /health, GET /ready (per-resource status), GET /version, GET /info.
pub fn common_routes(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/ready", get(ready))
        .route("/version", get(version))
        .route("/info", get(version))
        .with_state(state)
}
