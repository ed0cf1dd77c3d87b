//! Bootstrap: connect the store, build collections, mount one CRUD router per
//! resource under the API prefix, and serve until shutdown.

use crate::config::{HubConfig, ServerConfig, StartupPolicy};
use crate::error::AppError;
use crate::registry::{build_registry, ResourceRegistry, ResourceStatus};
use crate::routes::{common_routes, resource_routes, unavailable_routes};
use crate::state::AppState;
use crate::store;
use axum::extract::DefaultBodyLimit;
use axum::Router;
use sqlx::PgPool;
use std::sync::Arc;
use tokio::net::TcpListener;
use tower::ServiceBuilder;
use tower_http::cors::CorsLayer;
use tower_http::limit::RequestBodyLimitLayer;
use tower_http::trace::TraceLayer;

/// Mount path for a resource, e.g. `/api` + `teas` gives `/api/teas`.
pub fn mount_path(api_prefix: &str, resource: &str) -> String {
    format!("{}/{}", api_prefix.trim_end_matches('/'), resource)
}

/// Open the document store when a postgres resource is configured.
/// A connection failure is fatal under `FailFast`; under `Degraded` it yields `None`.
pub async fn connect_store(config: &HubConfig) -> Result<Option<PgPool>, AppError> {
    if !config.uses_postgres() {
        return Ok(None);
    }
    match store::connect(&config.store).await {
        Ok(pool) => Ok(Some(pool)),
        Err(e) if config.server.startup == StartupPolicy::Degraded => {
            tracing::error!(error = %e, "document store unreachable, postgres resources will answer 503");
            Ok(None)
        }
        Err(e) => {
            tracing::error!(error = %e, "document store unreachable");
            Err(e)
        }
    }
}

/// Build the full application router from an already-populated registry.
pub fn build_app(server: &ServerConfig, registry: Arc<ResourceRegistry>) -> Router {
    let mut app = Router::new().merge(common_routes(AppState {
        registry: registry.clone(),
    }));

    for entry in registry.entries() {
        let path = mount_path(&server.api_prefix, &entry.name);
        let router = match &entry.collection {
            Some(collection) => {
                tracing::info!(path = %path, backend = entry.backend.as_str(), "mounted resource");
                resource_routes(collection.clone())
            }
            None => {
                let reason = match &entry.status {
                    ResourceStatus::Unavailable(reason) => reason.as_str(),
                    ResourceStatus::Available => "no collection",
                };
                tracing::warn!(path = %path, reason = %reason, "mounted unavailable resource");
                unavailable_routes(&entry.name, reason)
            }
        };
        app = app.nest(&path, router);
    }

    app.layer(
        ServiceBuilder::new()
            .layer(TraceLayer::new_for_http())
            .layer(RequestBodyLimitLayer::new(server.body_limit_bytes))
            .layer(DefaultBodyLimit::disable())
            .layer(CorsLayer::permissive()),
    )
}

/// Connect, build, bind, and serve with graceful shutdown on Ctrl-C / SIGTERM.
pub async fn run(config: HubConfig) -> Result<(), AppError> {
    let pool = connect_store(&config).await?;
    let registry = Arc::new(build_registry(&config, pool.as_ref()).await?);
    let app = build_app(&config.server, registry);

    let address = config.server.bind_address();
    let listener = TcpListener::bind(&address)
        .await
        .map_err(|e| AppError::Internal(format!("bind {}: {}", address, e)))?;
    let local = listener
        .local_addr()
        .map_err(|e| AppError::Internal(e.to_string()))?;
    tracing::info!("listening on {}", local);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(|e| AppError::Internal(format!("server: {}", e)))?;
    tracing::info!("server stopped");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::warn!(error = %e, "failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
        tracing::info!("received Ctrl+C, shutting down");
    };

    #[cfg(unix)]
    let terminate = async {
        use tokio::signal::unix::{signal, SignalKind};
        match signal(SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
                tracing::info!("received terminate signal, shutting down");
            }
            Err(e) => {
                tracing::warn!(error = %e, "failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn joins_prefix_and_name() {
        assert_eq!(mount_path("/api", "teas"), "/api/teas");
        assert_eq!(mount_path("/", "teas"), "/teas");
    }
}
