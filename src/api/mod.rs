mod handlers;

use std::sync::Arc;

use axum::{
    http::{HeaderValue, Method},
    routing::get,
    Router,
};
use tower_http::{
    cors::{AllowOrigin, CorsLayer},
    trace::TraceLayer,
};

use crate::catalog::DocumentCatalog;
use crate::content::ContentPipeline;

pub use handlers::ApiError;

/// Shared, read-only state handed to every handler.
#[derive(Debug, Clone)]
pub struct AppState {
    pub catalog: Arc<DocumentCatalog>,
    pub pipeline: Arc<ContentPipeline>,
}

impl AppState {
    pub fn new(catalog: DocumentCatalog, pipeline: ContentPipeline) -> Self {
        Self {
            catalog: Arc::new(catalog),
            pipeline: Arc::new(pipeline),
        }
    }
}

pub fn create_router(state: AppState) -> Router {
    create_router_with_origins(state, None)
}

/// Router with CORS restricted to `origins`, or open to any origin when
/// `None`.
pub fn create_router_with_origins(state: AppState, origins: Option<&[String]>) -> Router {
    let api = Router::new()
        // Documents
        .route("/docs/{*file}", get(handlers::get_document))
        .route("/raw/{*file}", get(handlers::download_document))
        // Catalog
        .route("/catalog", get(handlers::list_catalog))
        .route("/catalog/featured", get(handlers::list_featured))
        .route("/catalog/entry", get(handlers::get_entry))
        .route("/catalog/neighbors", get(handlers::get_neighbors))
        .route("/search", get(handlers::search));

    Router::new()
        .nest("/api", api)
        .route("/health", get(handlers::health))
        .layer(TraceLayer::new_for_http())
        .layer(cors_layer(origins))
        .with_state(state)
}

fn cors_layer(origins: Option<&[String]>) -> CorsLayer {
    let Some(origins) = origins else {
        return CorsLayer::permissive();
    };

    let allowed: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|origin| match HeaderValue::from_str(origin) {
            Ok(value) => Some(value),
            Err(_) => {
                tracing::warn!("Ignoring invalid CORS origin '{}'", origin);
                None
            }
        })
        .collect();

    CorsLayer::new()
        .allow_origin(AllowOrigin::list(allowed))
        .allow_methods([Method::GET])
}
