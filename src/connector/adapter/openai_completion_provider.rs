use std::time::Duration;

use async_trait::async_trait;
use futures_util::StreamExt;
use serde::Deserialize;
use tracing::{debug, warn};

use crate::application::{CompletionProvider, TextDeltaStream};
use crate::domain::{ChatMessage, DomainError};

pub const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1";
pub const DEFAULT_MODEL: &str = "gpt-4o-mini";
const COMPLETIONS_PATH: &str = "/chat/completions";
const DONE_MARKER: &str = "[DONE]";

#[derive(serde::Serialize)]
struct ApiRequest<'a> {
    model: &'a str,
    messages: &'a [ChatMessage],
    stream: bool,
}

/// One `data:` event of a streamed chat completion.
#[derive(Deserialize)]
struct ApiChunk {
    #[serde(default)]
    choices: Vec<ApiChoice>,
    #[serde(default)]
    error: Option<ApiError>,
}

#[derive(Deserialize)]
struct ApiChoice {
    #[serde(default)]
    delta: ApiDelta,
}

#[derive(Deserialize, Default)]
struct ApiDelta {
    #[serde(default)]
    content: Option<String>,
}

#[derive(Deserialize)]
struct ApiError {
    message: String,
}

/// What a single SSE line means for the completion.
#[derive(Debug, PartialEq)]
enum SseLine {
    /// Not a data line: blank separators, comments, `event:` fields.
    Skip,
    Delta(Option<String>),
    Done,
}

/// Splits a byte stream into lines, carrying partial lines across chunks.
#[derive(Default)]
struct LineBuffer {
    pending: Vec<u8>,
}

impl LineBuffer {
    fn push(&mut self, chunk: &[u8]) -> Result<Vec<String>, DomainError> {
        self.pending.extend_from_slice(chunk);

        let mut lines = Vec::new();
        while let Some(pos) = self.pending.iter().position(|b| *b == b'\n') {
            let raw: Vec<u8> = self.pending.drain(..=pos).collect();
            lines.push(Self::decode(&raw[..pos])?);
        }
        Ok(lines)
    }

    fn finish(&mut self) -> Result<Option<String>, DomainError> {
        if self.pending.is_empty() {
            return Ok(None);
        }
        let raw = std::mem::take(&mut self.pending);
        Self::decode(&raw).map(Some)
    }

    fn decode(raw: &[u8]) -> Result<String, DomainError> {
        let line = std::str::from_utf8(raw).map_err(|e| {
            DomainError::provider(format!("OpenAiCompletionProvider: invalid UTF-8 in stream: {e}"))
        })?;
        Ok(line.trim_end_matches('\r').to_string())
    }
}

fn parse_line(line: &str) -> Result<SseLine, DomainError> {
    let Some(data) = line.strip_prefix("data:") else {
        return Ok(SseLine::Skip);
    };
    let data = data.trim();
    if data == DONE_MARKER {
        return Ok(SseLine::Done);
    }

    let chunk: ApiChunk = serde_json::from_str(data).map_err(|e| {
        DomainError::provider(format!("OpenAiCompletionProvider: malformed stream event: {e}"))
    })?;

    if let Some(error) = chunk.error {
        return Err(DomainError::provider(format!(
            "OpenAiCompletionProvider: stream error: {}",
            error.message
        )));
    }

    Ok(SseLine::Delta(
        chunk.choices.into_iter().next().and_then(|c| c.delta.content),
    ))
}

/// Streaming client for OpenAI-compatible `/chat/completions` endpoints.
///
/// The response is read as Server-Sent Events; each `data:` event contributes
/// `choices[0].delta.content` (possibly absent) and `data: [DONE]` ends the
/// completion.
///
/// ```text
/// OPENAI_API_KEY=sk-...
/// OPENAI_BASE_URL=https://api.openai.com/v1
/// OPENAI_MODEL=gpt-4o-mini
/// ```
pub struct OpenAiCompletionProvider {
    client: reqwest::Client,
    api_key: String,
    model: String,
    /// Full endpoint URL (base + COMPLETIONS_PATH).
    url: String,
}

impl OpenAiCompletionProvider {
    pub fn new(
        api_key: impl Into<String>,
        model: impl Into<String>,
        base_url: impl Into<String>,
    ) -> Self {
        let base: String = base_url.into();
        let url = format!("{}{}", base.trim_end_matches('/'), COMPLETIONS_PATH);
        Self {
            // No overall timeout: a completion stays open as long as tokens flow.
            client: reqwest::Client::builder()
                .connect_timeout(Duration::from_secs(10))
                .build()
                .unwrap_or_default(),
            api_key: api_key.into(),
            model: model.into(),
            url,
        }
    }

    /// Construct from environment variables:
    ///
    /// | Variable          | Default                     |
    /// |-------------------|-----------------------------|
    /// | `OPENAI_API_KEY`  | required; `None` when unset |
    /// | `OPENAI_BASE_URL` | `https://api.openai.com/v1` |
    /// | `OPENAI_MODEL`    | `gpt-4o-mini`               |
    pub fn from_env() -> Option<Self> {
        let key = std::env::var("OPENAI_API_KEY").ok()?;
        let base =
            std::env::var("OPENAI_BASE_URL").unwrap_or_else(|_| DEFAULT_BASE_URL.to_string());
        let model = std::env::var("OPENAI_MODEL").unwrap_or_else(|_| DEFAULT_MODEL.to_string());
        Some(Self::new(key, model, base))
    }

    pub fn url(&self) -> &str {
        &self.url
    }
}

#[async_trait]
impl CompletionProvider for OpenAiCompletionProvider {
    async fn stream_completion(
        &self,
        messages: Vec<ChatMessage>,
    ) -> Result<TextDeltaStream, DomainError> {
        let request = ApiRequest {
            model: &self.model,
            messages: &messages,
            stream: true,
        };

        let response = self
            .client
            .post(&self.url)
            .bearer_auth(&self.api_key)
            .json(&request)
            .send()
            .await
            .map_err(|e| {
                DomainError::provider(format!("OpenAiCompletionProvider: request failed: {e}"))
            })?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            warn!("OpenAiCompletionProvider: API returned {status}: {body}");
            return Err(DomainError::provider(format!(
                "OpenAiCompletionProvider: API returned {status}"
            )));
        }

        debug!("OpenAiCompletionProvider: streaming from {}", self.url);
        let mut body = Box::pin(response.bytes_stream());

        Ok(Box::pin(async_stream::stream! {
            let mut buffer = LineBuffer::default();

            while let Some(chunk) = body.next().await {
                let chunk = match chunk {
                    Ok(chunk) => chunk,
                    Err(e) => {
                        yield Err(DomainError::provider(format!(
                            "OpenAiCompletionProvider: stream read failed: {e}"
                        )));
                        return;
                    }
                };

                let lines = match buffer.push(&chunk) {
                    Ok(lines) => lines,
                    Err(e) => {
                        yield Err(e);
                        return;
                    }
                };

                for line in lines {
                    match parse_line(&line) {
                        Ok(SseLine::Skip) => {}
                        Ok(SseLine::Delta(delta)) => {
                            yield Ok(delta);
                        }
                        Ok(SseLine::Done) => return,
                        Err(e) => {
                            yield Err(e);
                            return;
                        }
                    }
                }
            }

            match buffer.finish().and_then(|line| line.map(|l| parse_line(&l)).transpose()) {
                Ok(Some(SseLine::Delta(delta))) => {
                    yield Ok(delta);
                }
                Ok(_) => {}
                Err(e) => {
                    yield Err(e);
                }
            }
        }))
    }

    fn model(&self) -> &str {
        &self.model
    }
}
