use super::{Gateway, TransportError};
use crate::reading::{AggregateStats, Aliyah, Parsha};
use async_trait::async_trait;
use reqwest::{Client, Response, StatusCode, Url};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Gateway backed by the tracker's JSON API.
#[derive(Clone, Debug)]
pub struct HttpGateway {
    client: Client,
    base_url: Url,
}

#[derive(Debug, Serialize)]
struct UpdateAliyahRequest {
    is_complete: bool,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    error: String,
}

impl HttpGateway {
    /// `base_url` is the API root, e.g. `http://127.0.0.1:5001/api`.
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, TransportError> {
        let base_url = Url::parse(base_url.trim_end_matches('/'))
            .map_err(|e| TransportError::Malformed(format!("invalid API URL {base_url}: {e}")))?;
        if base_url.cannot_be_a_base() {
            return Err(TransportError::Malformed(format!(
                "invalid API URL {base_url}"
            )));
        }

        let client = Client::builder()
            .timeout(timeout)
            .user_agent(concat!("parsha-tracker/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self { client, base_url })
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Appends path segments to the API root, percent-encoding each one.
    fn endpoint(&self, segments: &[&str]) -> Url {
        let mut url = self.base_url.clone();
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty();
            path.extend(segments);
        }
        url
    }

    async fn decode<T: DeserializeOwned>(response: Response) -> Result<T, TransportError> {
        let status = response.status();
        if status.is_success() {
            let bytes = response.bytes().await?;
            return serde_json::from_slice(&bytes)
                .map_err(|e| TransportError::Malformed(e.to_string()));
        }

        let url = response.url().to_string();
        let message = match response.json::<ErrorBody>().await {
            Ok(body) => body.error,
            Err(_) => status
                .canonical_reason()
                .unwrap_or("unknown error")
                .to_string(),
        };

        if status == StatusCode::NOT_FOUND {
            tracing::debug!(url = %url, "Gateway lookup returned 404");
            return Err(TransportError::NotFound(message));
        }

        tracing::warn!(url = %url, status = %status, "Gateway request rejected");
        Err(TransportError::Status { status, message })
    }
}

#[async_trait]
impl Gateway for HttpGateway {
    async fn fetch_parshiot(&self) -> Result<Vec<Parsha>, TransportError> {
        let response = self.client.get(self.endpoint(&["parshiot"])).send().await?;
        Self::decode(response).await
    }

    async fn fetch_parsha(&self, title: &str) -> Result<Parsha, TransportError> {
        let response = self
            .client
            .get(self.endpoint(&["parshiot", title]))
            .send()
            .await?;
        Self::decode(response).await
    }

    async fn update_aliyah(
        &self,
        title: &str,
        number: u32,
        is_complete: bool,
    ) -> Result<Aliyah, TransportError> {
        let number = number.to_string();
        let response = self
            .client
            .put(self.endpoint(&["parshiot", title, "aliyot", &number]))
            .json(&UpdateAliyahRequest { is_complete })
            .send()
            .await?;
        Self::decode(response).await
    }

    async fn fetch_stats(&self) -> Result<AggregateStats, TransportError> {
        let response = self.client.get(self.endpoint(&["stats"])).send().await?;
        Self::decode(response).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn gateway(base: &str) -> HttpGateway {
        HttpGateway::new(base, Duration::from_secs(1)).unwrap()
    }

    #[test]
    fn test_endpoint_appends_segments() {
        let gw = gateway("http://127.0.0.1:5001/api");
        assert_eq!(
            gw.endpoint(&["parshiot"]).as_str(),
            "http://127.0.0.1:5001/api/parshiot"
        );
    }

    #[test]
    fn test_endpoint_ignores_trailing_slash() {
        let gw = gateway("http://127.0.0.1:5001/api/");
        assert_eq!(gw.endpoint(&["stats"]).as_str(), "http://127.0.0.1:5001/api/stats");
    }

    #[test]
    fn test_endpoint_encodes_titles_as_one_segment() {
        let gw = gateway("http://localhost:5001/api");
        let url = gw.endpoint(&["parshiot", "Parashat V'Zot HaBerachah/x", "aliyot", "3"]);
        assert_eq!(
            url.as_str(),
            "http://localhost:5001/api/parshiot/Parashat%20V'Zot%20HaBerachah%2Fx/aliyot/3"
        );
    }

    #[test]
    fn test_invalid_base_url_is_rejected() {
        assert!(matches!(
            HttpGateway::new("not a url", Duration::from_secs(1)),
            Err(TransportError::Malformed(_))
        ));
        assert!(matches!(
            HttpGateway::new("mailto:someone@example.com", Duration::from_secs(1)),
            Err(TransportError::Malformed(_))
        ));
    }
}
