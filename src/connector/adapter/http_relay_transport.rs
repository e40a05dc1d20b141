use std::time::Duration;

use async_trait::async_trait;
use futures_util::StreamExt;
use tracing::{debug, warn};

use crate::application::{ByteStream, RelayTransport};
use crate::domain::{DomainError, Message};

pub const DEFAULT_RELAY_URL: &str = "http://127.0.0.1:3000/api/chat";

/// [`RelayTransport`] that POSTs the history as JSON to the relay endpoint and
/// hands back the chunked response body untouched.
pub struct HttpRelayTransport {
    client: reqwest::Client,
    url: String,
}

impl HttpRelayTransport {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::builder()
                .connect_timeout(Duration::from_secs(5))
                .build()
                .unwrap_or_default(),
            url: url.into(),
        }
    }

    pub fn url(&self) -> &str {
        &self.url
    }
}

#[async_trait]
impl RelayTransport for HttpRelayTransport {
    async fn send(&self, history: &[Message]) -> Result<ByteStream, DomainError> {
        debug!("Posting {} message(s) to {}", history.len(), self.url);

        let response = self
            .client
            .post(&self.url)
            .json(history)
            .send()
            .await
            .map_err(|e| DomainError::transport(format!("HttpRelayTransport: request failed: {e}")))?;

        if !response.status().is_success() {
            let status = response.status();
            warn!("HttpRelayTransport: relay returned {status}");
            return Err(DomainError::transport(format!(
                "HttpRelayTransport: relay returned {status}"
            )));
        }

        let body = response.bytes_stream().map(|chunk| {
            chunk.map_err(|e| DomainError::transport(format!("HttpRelayTransport: stream failed: {e}")))
        });
        Ok(Box::pin(body))
    }
}
