use async_trait::async_trait;
use serde::de::DeserializeOwned;
use tracing::debug;

use super::types::{BatchResponse, HealthStatus, SynthesisResponse, SynthesisResult};
use super::{SynthesisGateway, BATCH_PATH, HEALTH_PATH, SYNTHESIZE_PATH};
use crate::config::EffectiveConfig;
use crate::request::{BatchRequest, SynthesisRequest};
use crate::{Error, ErrorContext, Result};

/// Gateway over one persistent HTTP session.
///
/// The session is released when the gateway is dropped.
#[derive(Debug)]
pub struct HttpGateway {
    client: reqwest::Client,
    base_url: String,
    timeout_secs: u64,
}

impl HttpGateway {
    pub fn new(config: &EffectiveConfig) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(config.timeout())
            .build()
            .map_err(|e| Error::transport("failed to create HTTP client", Some(e)))?;

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            timeout_secs: config.timeout_seconds,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// Send, read the full body, and split off non-success statuses.
    async fn execute(&self, request: reqwest::RequestBuilder) -> Result<Vec<u8>> {
        let response = request.send().await.map_err(|e| self.classify(e))?;
        let status = response.status();
        let bytes = response.bytes().await.map_err(|e| self.classify(e))?;
        debug!(status = status.as_u16(), bytes = bytes.len(), "service response");

        if !status.is_success() {
            return Err(Error::Service {
                status: status.as_u16(),
                body: String::from_utf8_lossy(&bytes).into_owned(),
            });
        }
        Ok(bytes.to_vec())
    }

    fn classify(&self, e: reqwest::Error) -> Error {
        let message = if e.is_connect() {
            format!("cannot connect to server at {}", self.base_url)
        } else if e.is_timeout() {
            format!(
                "request to {} timed out after {}s",
                self.base_url, self.timeout_secs
            )
        } else {
            format!("request to {} failed: {}", self.base_url, e)
        };
        Error::transport(message, Some(e))
    }
}

fn parse_json<T: DeserializeOwned>(bytes: &[u8], what: &str) -> Result<T> {
    serde_json::from_slice(bytes).map_err(|e| {
        Error::protocol_with_context(
            format!("unexpected {} response body", what),
            ErrorContext::new()
                .with_details(e.to_string())
                .with_source("gateway"),
        )
    })
}

#[async_trait]
impl SynthesisGateway for HttpGateway {
    async fn health(&self) -> Result<HealthStatus> {
        let bytes = self.execute(self.client.get(self.url(HEALTH_PATH))).await?;
        parse_json(&bytes, "health")
    }

    async fn synthesize_one(&self, request: &SynthesisRequest) -> Result<SynthesisResult> {
        debug!(
            chars = request.text.chars().count(),
            voice = ?request.voice_identifier,
            steps = request.quality_steps,
            "synthesize"
        );
        let bytes = self
            .execute(self.client.post(self.url(SYNTHESIZE_PATH)).json(request))
            .await?;
        let response: SynthesisResponse = parse_json(&bytes, "synthesize")?;
        response.decode("audio_base64")
    }

    async fn synthesize_batch(&self, batch: &BatchRequest) -> Result<Vec<SynthesisResult>> {
        debug!(items = batch.len(), "batch synthesize");
        let bytes = self
            .execute(self.client.post(self.url(BATCH_PATH)).json(batch))
            .await?;
        let response: BatchResponse = parse_json(&bytes, "batch")?;
        let results = response.results.ok_or_else(|| {
            Error::protocol_with_context(
                "batch response is missing results",
                ErrorContext::new()
                    .with_field_path("results")
                    .with_source("gateway"),
            )
        })?;

        if results.len() != batch.len() {
            return Err(Error::protocol_with_context(
                "batch response length does not match request",
                ErrorContext::new()
                    .with_field_path("results")
                    .with_details(format!(
                        "expected {}, got {}",
                        batch.len(),
                        results.len()
                    ))
                    .with_source("gateway"),
            ));
        }

        results
            .into_iter()
            .enumerate()
            .map(|(i, item)| item.decode(&format!("results[{}].audio_base64", i)))
            .collect()
    }
}
