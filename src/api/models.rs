use axum::{Json, body::Body, http::StatusCode, response::{IntoResponse, Response}};
use serde::{Deserialize, Serialize};

#[derive(Debug, Deserialize)]
pub struct UpdateAliyahRequest {
    #[serde(default)]
    pub is_complete: bool,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub data_initialized: bool,
}

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

impl ErrorResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            error: message.into(),
        }
    }

    pub fn internal(e: impl std::fmt::Display) -> Response<Body> {
        (StatusCode::INTERNAL_SERVER_ERROR, Json(Self::new(e.to_string()))).into_response()
    }

    pub fn not_found(message: impl Into<String>) -> Response<Body> {
        (StatusCode::NOT_FOUND, Json(Self::new(message))).into_response()
    }
}
