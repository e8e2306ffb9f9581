use std::sync::Arc;

use crate::client::core::SupertonicClient;
use crate::codec::{CodecAdapter, Transcoder};
use crate::config::{sanitize_timeout, ConfigOverrides, EffectiveConfig};
use crate::delivery::DeliveryRouter;
use crate::gateway::{HttpGateway, SynthesisGateway};
use crate::playback::{self, PlaybackBackend};
use crate::Result;

/// Builder for [`SupertonicClient`].
///
/// By default the configuration is resolved from the environment, the HTTP
/// gateway talks to `BASE_URL`, and codec/playback backends are detected on the
/// host.
#[derive(Default)]
pub struct SupertonicClientBuilder {
    overrides: ConfigOverrides,
    config: Option<EffectiveConfig>,
    gateway: Option<Arc<dyn SynthesisGateway>>,
    transcoder: Option<Option<Arc<dyn Transcoder>>>,
    playback: Option<Option<Arc<dyn PlaybackBackend>>>,
}

impl SupertonicClientBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Explicit values that win over the environment.
    pub fn overrides(mut self, overrides: ConfigOverrides) -> Self {
        self.overrides = overrides;
        self
    }

    /// Use an already resolved configuration; skips environment resolution.
    /// `base_url_override` and `timeout_seconds` still apply.
    pub fn config(mut self, config: EffectiveConfig) -> Self {
        self.config = Some(config);
        self
    }

    /// Point at another service (primarily for testing with mock servers).
    pub fn base_url_override(mut self, base_url: impl Into<String>) -> Self {
        self.overrides.base_url = Some(base_url.into());
        self
    }

    pub fn timeout_seconds(mut self, secs: u64) -> Self {
        self.overrides.timeout_seconds = Some(secs);
        self
    }

    /// Replace the HTTP gateway.
    pub fn gateway(mut self, gateway: Arc<dyn SynthesisGateway>) -> Self {
        self.gateway = Some(gateway);
        self
    }

    /// Replace the detected transcoding engine. `None` restricts output to WAV.
    pub fn transcoder(mut self, transcoder: Option<Arc<dyn Transcoder>>) -> Self {
        self.transcoder = Some(transcoder);
        self
    }

    /// Replace the detected playback backend. `None` disables playback.
    pub fn playback(mut self, backend: Option<Arc<dyn PlaybackBackend>>) -> Self {
        self.playback = Some(backend);
        self
    }

    pub fn build(self) -> Result<SupertonicClient> {
        let config = match self.config {
            // Session knobs still apply on top of an explicit config.
            Some(mut config) => {
                if let Some(url) = self.overrides.base_url.as_deref() {
                    config.base_url = url.trim_end_matches('/').to_string();
                }
                if let Some(secs) = self.overrides.timeout_seconds {
                    config.timeout_seconds = sanitize_timeout(secs);
                }
                config
            }
            None => EffectiveConfig::resolve(&self.overrides),
        };

        let gateway = match self.gateway {
            Some(gateway) => gateway,
            None => Arc::new(HttpGateway::new(&config)?),
        };

        let mut codec = CodecAdapter::new(&config);
        if let Some(transcoder) = self.transcoder {
            codec = codec.with_transcoder(transcoder);
        }
        let playback = self.playback.unwrap_or_else(playback::detect_host);

        tracing::debug!(
            base_url = %config.base_url,
            transcoding = codec.can_transcode(),
            playback = playback.as_ref().map(|p| p.name()).unwrap_or("none"),
            "client ready"
        );

        Ok(SupertonicClient {
            router: DeliveryRouter::new(codec, playback),
            gateway,
            config,
        })
    }
}
