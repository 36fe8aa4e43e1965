use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
};
use std::sync::Arc;

use crate::storage::{Catalog, CatalogError};

use super::models::{ErrorResponse, HealthResponse, UpdateAliyahRequest};

pub type SharedCatalog = Arc<Catalog>;

fn catalog_error(e: CatalogError) -> axum::response::Response {
    match e {
        CatalogError::ParshaNotFound(_) | CatalogError::AliyahNotFound { .. } => {
            ErrorResponse::not_found(e.to_string())
        }
        CatalogError::Storage(e) => {
            tracing::error!("Storage failure: {e:#}");
            ErrorResponse::internal(format!("{e:#}"))
        }
    }
}

pub async fn health_check(State(catalog): State<SharedCatalog>) -> impl IntoResponse {
    Json(HealthResponse {
        status: "healthy".to_string(),
        data_initialized: catalog.is_initialized(),
    })
}

pub async fn list_parshiot(State(catalog): State<SharedCatalog>) -> impl IntoResponse {
    match catalog.parshiot() {
        Ok(parshiot) => (StatusCode::OK, Json(parshiot)).into_response(),
        Err(e) => ErrorResponse::internal(format!("{e:#}")),
    }
}

pub async fn get_parsha(
    State(catalog): State<SharedCatalog>,
    Path(title): Path<String>,
) -> impl IntoResponse {
    match catalog.parsha(&title) {
        Ok(parsha) => (StatusCode::OK, Json(parsha)).into_response(),
        Err(e) => catalog_error(e),
    }
}

pub async fn update_aliyah(
    State(catalog): State<SharedCatalog>,
    Path((title, number)): Path<(String, u32)>,
    Json(req): Json<UpdateAliyahRequest>,
) -> impl IntoResponse {
    match catalog.set_aliyah(&title, number, req.is_complete) {
        Ok(aliyah) => {
            tracing::info!(title = %title, number, is_complete = req.is_complete, "Aliyah updated");
            (StatusCode::OK, Json(aliyah)).into_response()
        }
        Err(e) => catalog_error(e),
    }
}

pub async fn get_stats(State(catalog): State<SharedCatalog>) -> impl IntoResponse {
    match catalog.stats() {
        Ok(stats) => (StatusCode::OK, Json(stats)).into_response(),
        Err(e) => ErrorResponse::internal(format!("{e:#}")),
    }
}
