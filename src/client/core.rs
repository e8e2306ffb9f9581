use std::path::{Path, PathBuf};
use std::sync::Arc;

use tracing::info;

use crate::batch::{BatchDelivery, BatchOrchestrator, BatchOutcome};
use crate::client::builder::SupertonicClientBuilder;
use crate::config::EffectiveConfig;
use crate::delivery::{DeliveryMode, DeliveryOutcome, DeliveryRouter};
use crate::gateway::{HealthStatus, SynthesisGateway};
use crate::request::{RequestBuilder, SynthesisOptions};
use crate::{Error, ErrorContext, Result};

/// Client for a Supertonic TTS service.
///
/// Owns one gateway session for its whole lifetime. Call [`close`] (or drop
/// the client) to release it.
///
/// [`close`]: SupertonicClient::close
pub struct SupertonicClient {
    pub(crate) config: EffectiveConfig,
    pub(crate) gateway: Arc<dyn SynthesisGateway>,
    pub(crate) router: DeliveryRouter,
}

impl SupertonicClient {
    /// Client resolved from the environment with detected backends.
    pub fn new() -> Result<Self> {
        SupertonicClientBuilder::new().build()
    }

    pub fn builder() -> SupertonicClientBuilder {
        SupertonicClientBuilder::new()
    }

    pub fn config(&self) -> &EffectiveConfig {
        &self.config
    }

    pub fn router(&self) -> &DeliveryRouter {
        &self.router
    }

    pub async fn health(&self) -> Result<HealthStatus> {
        self.gateway.health().await
    }

    /// Synthesize `text` and deliver it through `mode`.
    pub async fn synthesize(
        &self,
        text: &str,
        options: &SynthesisOptions,
        mode: &DeliveryMode,
    ) -> Result<DeliveryOutcome> {
        let request = RequestBuilder::new(&self.config).build(text, options)?;
        let result = self.gateway.synthesize_one(&request).await?;
        info!(
            voice = request.voice_identifier.as_deref().unwrap_or("default"),
            bytes = result.len(),
            "synthesized"
        );
        self.router.deliver(&result, mode)
    }

    /// Raw audio exactly as the service returned it.
    pub async fn synthesize_bytes(
        &self,
        text: &str,
        options: &SynthesisOptions,
    ) -> Result<Vec<u8>> {
        let request = RequestBuilder::new(&self.config).build(text, options)?;
        Ok(self.gateway.synthesize_one(&request).await?.into_bytes())
    }

    /// Synthesize straight to `path`; its extension picks the format.
    pub async fn synthesize_to_file(
        &self,
        text: &str,
        path: impl AsRef<Path>,
        options: &SynthesisOptions,
    ) -> Result<PathBuf> {
        let mode = DeliveryMode::Save(path.as_ref().to_path_buf());
        match self.synthesize(text, options, &mode).await? {
            DeliveryOutcome::Saved(path) => Ok(path),
            other => Err(Error::unknown_with_context(
                format!("save produced {:?}", other),
                ErrorContext::new().with_source("synthesize_to_file"),
            )),
        }
    }

    /// Synthesize many texts in one round trip.
    ///
    /// `voices`, when given, must have one entry per text; a mismatch fails
    /// before anything is sent.
    pub async fn batch_synthesize<T, V>(
        &self,
        texts: &[T],
        voices: Option<&[V]>,
        options: &SynthesisOptions,
        delivery: &BatchDelivery,
    ) -> Result<BatchOutcome>
    where
        T: AsRef<str>,
        V: AsRef<str>,
    {
        let batch = RequestBuilder::new(&self.config).build_batch(texts, voices, options)?;
        BatchOrchestrator::new(self.gateway.as_ref(), &self.router)
            .run(&batch, delivery)
            .await
    }

    /// Release the HTTP session.
    pub fn close(self) {
        drop(self);
    }
}

impl std::fmt::Debug for SupertonicClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SupertonicClient")
            .field("base_url", &self.config.base_url)
            .field("router", &self.router)
            .finish()
    }
}
