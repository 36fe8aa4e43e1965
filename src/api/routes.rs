use axum::{
    Router,
    routing::{get, put},
};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use super::handlers::{self, SharedCatalog};

pub fn create_router(catalog: SharedCatalog) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/api/health", get(handlers::health_check))
        .route("/api/parshiot", get(handlers::list_parshiot))
        .route("/api/parshiot/{title}", get(handlers::get_parsha))
        .route(
            "/api/parshiot/{title}/aliyot/{number}",
            put(handlers::update_aliyah),
        )
        .route("/api/stats", get(handlers::get_stats))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(catalog)
}
