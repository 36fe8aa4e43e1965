//! Access to reading data and progress updates.
//!
//! The tracker only talks to a [`Gateway`]; whether the data lives behind the
//! HTTP API or in the local database is decided by the caller.

pub mod http;
pub mod local;

pub use http::HttpGateway;
pub use local::LocalGateway;

use crate::reading::{AggregateStats, Aliyah, Parsha};
use async_trait::async_trait;
use thiserror::Error;

/// Any failed gateway call: network, non-success status, or a payload that
/// could not be decoded.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum TransportError {
    #[error("request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("server returned {status}: {message}")]
    Status {
        status: reqwest::StatusCode,
        message: String,
    },
    #[error("not found: {0}")]
    NotFound(String),
    #[error("malformed payload: {0}")]
    Malformed(String),
    #[error("storage error: {0}")]
    Storage(String),
}

#[async_trait]
pub trait Gateway: Send + Sync {
    async fn fetch_parshiot(&self) -> Result<Vec<Parsha>, TransportError>;

    async fn fetch_parsha(&self, title: &str) -> Result<Parsha, TransportError>;

    /// Persists one aliyah's completion flag and returns the aliyah as stored.
    async fn update_aliyah(
        &self,
        title: &str,
        number: u32,
        is_complete: bool,
    ) -> Result<Aliyah, TransportError>;

    async fn fetch_stats(&self) -> Result<AggregateStats, TransportError>;
}
