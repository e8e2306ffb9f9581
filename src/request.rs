//! Synthesis request construction.

use serde::{Deserialize, Serialize};

use crate::config::EffectiveConfig;
use crate::voice;
use crate::{Error, ErrorContext, Result};

/// One wire-level synthesis request.
///
/// `voice_identifier` is always in canonical form when set; `None` omits the
/// field and lets the service pick its default voice.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SynthesisRequest {
    pub text: String,
    #[serde(rename = "total_step")]
    pub quality_steps: u32,
    pub speed: f32,
    #[serde(
        rename = "voice_style",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub voice_identifier: Option<String>,
}

/// Ordered, non-empty list of requests submitted in one round trip.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BatchRequest {
    requests: Vec<SynthesisRequest>,
}

impl BatchRequest {
    pub fn new(requests: Vec<SynthesisRequest>) -> Result<Self> {
        if requests.is_empty() {
            return Err(Error::invalid_parameter_with_context(
                "batch must contain at least one request",
                ErrorContext::new()
                    .with_field_path("texts")
                    .with_source("request_builder"),
            ));
        }
        Ok(Self { requests })
    }

    pub fn requests(&self) -> &[SynthesisRequest] {
        &self.requests
    }

    pub fn len(&self) -> usize {
        self.requests.len()
    }

    pub fn is_empty(&self) -> bool {
        self.requests.is_empty()
    }
}

/// Per-call knobs. Anything left `None` falls back to the resolved config.
#[derive(Debug, Clone, Default)]
pub struct SynthesisOptions {
    pub voice: Option<String>,
    pub quality: Option<u32>,
    pub speed: Option<f32>,
}

impl SynthesisOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn voice(mut self, voice: impl Into<String>) -> Self {
        self.voice = Some(voice.into());
        self
    }

    pub fn quality(mut self, steps: u32) -> Self {
        self.quality = Some(steps);
        self
    }

    pub fn speed(mut self, speed: f32) -> Self {
        self.speed = Some(speed);
        self
    }
}

/// Builds requests against one resolved configuration.
#[derive(Debug, Clone, Copy)]
pub struct RequestBuilder<'a> {
    config: &'a EffectiveConfig,
}

impl<'a> RequestBuilder<'a> {
    pub fn new(config: &'a EffectiveConfig) -> Self {
        Self { config }
    }

    pub fn build(&self, text: &str, options: &SynthesisOptions) -> Result<SynthesisRequest> {
        if text.trim().is_empty() {
            return Err(Error::invalid_parameter_with_context(
                "text must not be empty",
                ErrorContext::new()
                    .with_field_path("text")
                    .with_source("request_builder"),
            ));
        }
        Ok(self.assemble(text, options.voice.as_deref(), options))
    }

    /// Build a batch. `voices`, when given, must be index-aligned with `texts`.
    ///
    /// Every check runs before anything is returned, so a rejected batch never
    /// reaches the network.
    pub fn build_batch<T, V>(
        &self,
        texts: &[T],
        voices: Option<&[V]>,
        options: &SynthesisOptions,
    ) -> Result<BatchRequest>
    where
        T: AsRef<str>,
        V: AsRef<str>,
    {
        if let Some(voices) = voices {
            if voices.len() != texts.len() {
                return Err(Error::invalid_parameter_with_context(
                    "length of texts and voice_styles must match",
                    ErrorContext::new()
                        .with_field_path("voice_styles")
                        .with_details(format!(
                            "{} texts, {} voice styles",
                            texts.len(),
                            voices.len()
                        ))
                        .with_source("request_builder"),
                ));
            }
        }

        let mut requests = Vec::with_capacity(texts.len());
        for (i, text) in texts.iter().enumerate() {
            let text = text.as_ref();
            if text.trim().is_empty() {
                return Err(Error::invalid_parameter_with_context(
                    "text must not be empty",
                    ErrorContext::new()
                        .with_field_path(format!("texts[{}]", i))
                        .with_source("request_builder"),
                ));
            }
            let voice = voices
                .map(|v| v[i].as_ref())
                .filter(|v| !v.trim().is_empty())
                .or(options.voice.as_deref());
            requests.push(self.assemble(text, voice, options));
        }
        BatchRequest::new(requests)
    }

    fn assemble(
        &self,
        text: &str,
        voice: Option<&str>,
        options: &SynthesisOptions,
    ) -> SynthesisRequest {
        let voice = voice
            .filter(|v| !v.trim().is_empty())
            .unwrap_or(self.config.default_voice.as_str());
        let voice = if voice.trim().is_empty() {
            None
        } else {
            Some(voice.trim())
        };
        SynthesisRequest {
            text: text.to_string(),
            quality_steps: options.quality.unwrap_or(self.config.default_quality),
            speed: options.speed.unwrap_or(self.config.default_speed),
            voice_identifier: voice::normalize(voice),
        }
    }
}
