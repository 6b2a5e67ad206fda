// HTTP client for the agent engine service (no SDK)

use anyhow::{Context, Result};
use async_trait::async_trait;
use futures::StreamExt;
use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION, CONTENT_TYPE};
use std::collections::VecDeque;
use uuid::Uuid;

use crate::events::{decode_line, DecodedLine};
use crate::traits::{AgentEngine, EngineSession, RawEventStream};

/// Connection settings for the engine service.
#[derive(Debug, Clone)]
pub struct EngineConfig {
    pub base_url: String,
    pub api_key: Option<String>,
}

/// Agent engine client
///
/// Talks to the engine over HTTP: `POST {base}/runs` streams one JSON
/// event per line until the run completes, `DELETE {base}/sessions/{id}`
/// releases engine-side clients.
pub struct EngineClient {
    http_client: reqwest::Client,
    base_url: String,
}

impl EngineClient {
    pub fn new(config: &EngineConfig) -> Result<Self> {
        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));

        if let Some(api_key) = &config.api_key {
            headers.insert(
                AUTHORIZATION,
                HeaderValue::from_str(&format!("Bearer {}", api_key))
                    .context("Invalid API key format")?,
            );
        }

        let http_client = reqwest::Client::builder()
            .default_headers(headers)
            .build()
            .context("Failed to create HTTP client")?;

        Ok(Self {
            http_client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
        })
    }
}

#[async_trait]
impl AgentEngine for EngineClient {
    async fn open_session(&self) -> Result<Box<dyn EngineSession>> {
        Ok(Box::new(HttpEngineSession {
            http_client: self.http_client.clone(),
            base_url: self.base_url.clone(),
            query_id: Uuid::new_v4().to_string(),
        }))
    }
}

struct HttpEngineSession {
    http_client: reqwest::Client,
    base_url: String,
    query_id: String,
}

#[async_trait]
impl EngineSession for HttpEngineSession {
    fn query_id(&self) -> &str {
        &self.query_id
    }

    async fn run(&mut self, question: &str, collection_names: &[String]) -> Result<RawEventStream> {
        let response = self
            .http_client
            .post(format!("{}/runs", self.base_url))
            .json(&serde_json::json!({
                "question": question,
                "collection_names": collection_names,
                "query_id": self.query_id,
            }))
            .send()
            .await
            .context("Engine request failed")?
            .error_for_status()
            .context("Engine returned an error status")?;

        Ok(parse_event_stream(response))
    }

    async fn close(self: Box<Self>) -> Result<()> {
        let response = self
            .http_client
            .delete(format!("{}/sessions/{}", self.base_url, self.query_id))
            .send()
            .await
            .context("Engine session close failed")?;

        // A session the engine never materialized is already closed.
        if response.status() == reqwest::StatusCode::NOT_FOUND {
            return Ok(());
        }

        response
            .error_for_status()
            .context("Engine rejected session close")?;
        Ok(())
    }
}

/// Parse the engine's NDJSON response body into raw events.
///
/// Blank lines are skipped, unparseable lines are a per-event conversion
/// failure (logged, skipped), `null` lines surface as `Ok(None)`. Only
/// transport errors end the stream with an `Err` item.
fn parse_event_stream(response: reqwest::Response) -> RawEventStream {
    let stream = response.bytes_stream();

    Box::pin(async_stream::stream! {
        let mut byte_chunks = Box::pin(stream);
        let mut buffer = VecDeque::with_capacity(8192);

        while let Some(chunk_result) = byte_chunks.next().await {
            match chunk_result {
                Ok(bytes) => {
                    buffer.extend(bytes);

                    while let Some(newline_pos) = buffer.iter().position(|&b| b == b'\n') {
                        let line_bytes: Vec<u8> = buffer.drain(..=newline_pos).collect();

                        if let Ok(line_str) = std::str::from_utf8(&line_bytes) {
                            match decode_line(line_str) {
                                DecodedLine::Empty => continue,
                                DecodedLine::Null => yield Ok(None),
                                DecodedLine::Event(event) => yield Ok(Some(event)),
                                DecodedLine::Invalid => {
                                    tracing::warn!("Skipping malformed engine event: {}", line_str.trim());
                                }
                            }
                        }
                    }
                }
                Err(e) => {
                    yield Err(anyhow::anyhow!("Engine stream error: {}", e));
                    return;
                }
            }
        }
    })
}
