//! Gateway wire and result types.

use base64::{engine::general_purpose::STANDARD as BASE64_STANDARD, Engine as _};
use serde::{Deserialize, Serialize};

use crate::{Error, ErrorContext, Result};

/// `GET /health` payload.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HealthStatus {
    pub status: String,
    #[serde(default)]
    pub model_loaded: bool,
    #[serde(default)]
    pub default_voice: Option<String>,
    #[serde(default)]
    pub available_voices: Vec<String>,
}

/// Decoded audio returned by the service (uncompressed container, or bare PCM).
#[derive(Clone, PartialEq, Eq)]
pub struct SynthesisResult {
    audio: Vec<u8>,
}

impl SynthesisResult {
    pub fn from_bytes(audio: Vec<u8>) -> Self {
        Self { audio }
    }

    /// Decode an `audio_base64` field. `field_path` names the field in errors.
    pub fn from_base64(encoded: &str, field_path: &str) -> Result<Self> {
        let audio = BASE64_STANDARD.decode(encoded.trim()).map_err(|e| {
            Error::protocol_with_context(
                format!("malformed base64 audio: {}", e),
                ErrorContext::new()
                    .with_field_path(field_path)
                    .with_source("gateway"),
            )
        })?;
        Ok(Self { audio })
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.audio
    }

    pub fn into_bytes(self) -> Vec<u8> {
        self.audio
    }

    pub fn len(&self) -> usize {
        self.audio.len()
    }

    pub fn is_empty(&self) -> bool {
        self.audio.is_empty()
    }

    pub fn to_base64(&self) -> String {
        BASE64_STANDARD.encode(&self.audio)
    }
}

impl std::fmt::Debug for SynthesisResult {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SynthesisResult")
            .field("bytes", &self.audio.len())
            .finish()
    }
}

#[derive(Debug, Deserialize)]
pub(crate) struct SynthesisResponse {
    #[serde(default)]
    pub audio_base64: Option<String>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct BatchResponse {
    #[serde(default)]
    pub results: Option<Vec<SynthesisResponse>>,
}

impl SynthesisResponse {
    pub(crate) fn decode(self, field_path: &str) -> Result<SynthesisResult> {
        let encoded = self.audio_base64.ok_or_else(|| {
            Error::protocol_with_context(
                "response is missing audio data",
                ErrorContext::new()
                    .with_field_path(field_path)
                    .with_source("gateway"),
            )
        })?;
        SynthesisResult::from_base64(&encoded, field_path)
    }
}
