//! The CRUD router factory. Paths are relative; whoever mounts the router picks
//! the resource prefix (e.g. `/api/teas`).

use crate::collection::SharedCollection;
use crate::error::AppError;
use crate::handlers::resource::{create, destroy, index, show, update};
use crate::state::ResourceState;
use axum::{routing::any, routing::get, Router};

/// Five routes over one collection:
/// `GET /`, `POST /`, `GET /:id`, `PUT /:id`, `DELETE /:id`.
pub fn resource_routes(collection: SharedCollection) -> Router {
    Router::new()
        .route("/", get(index).post(create))
        .route("/:id", get(show).put(update).delete(destroy))
        .with_state(ResourceState { collection })
}

/// Stand-in for a resource whose collection failed to open: every path under the
/// prefix answers 503 instead of falling through to a 404.
pub fn unavailable_routes(name: &str, reason: &str) -> Router {
    let message = format!("{}: {}", name, reason);
    let handler = move || {
        let message = message.clone();
        async move { AppError::Unavailable(message) }
    };
    Router::new()
        .route("/", any(handler.clone()))
        .route("/*rest", any(handler))
}
