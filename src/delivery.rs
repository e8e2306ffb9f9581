//! Routes a synthesis result to exactly one sink: a file, the speakers, or
//! the caller.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use base64::Engine as _;
use tracing::{debug, info};

use crate::codec::{AudioFormat, CodecAdapter};
use crate::gateway::SynthesisResult;
use crate::playback::{PlaybackBackend, PlaybackHandle};
use crate::{Error, Result};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeliveryMode {
    /// Write to a path; its extension selects the container.
    Save(PathBuf),
    /// Schedule local playback and return immediately.
    Play,
    /// Hand the bytes back, optionally converted (`None` = as received).
    ReturnInline { format: Option<AudioFormat> },
}

impl DeliveryMode {
    /// Playback wins over a destination; with neither the audio is returned.
    pub fn select(destination: Option<PathBuf>, play: bool) -> Self {
        match (play, destination) {
            (true, _) => DeliveryMode::Play,
            (false, Some(path)) => DeliveryMode::Save(path),
            (false, None) => DeliveryMode::inline(),
        }
    }

    pub fn inline() -> Self {
        DeliveryMode::ReturnInline { format: None }
    }
}

/// Audio handed back to the caller.
#[derive(Clone, PartialEq, Eq)]
pub struct InlineAudio {
    bytes: Vec<u8>,
    format: AudioFormat,
}

impl InlineAudio {
    pub fn new(bytes: Vec<u8>, format: AudioFormat) -> Self {
        Self { bytes, format }
    }

    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn into_bytes(self) -> Vec<u8> {
        self.bytes
    }

    pub fn format(&self) -> &AudioFormat {
        &self.format
    }

    /// Text-safe form for JSON boundaries.
    pub fn to_base64(&self) -> String {
        base64::engine::general_purpose::STANDARD.encode(&self.bytes)
    }
}

impl std::fmt::Debug for InlineAudio {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InlineAudio")
            .field("format", &self.format)
            .field("bytes", &self.bytes.len())
            .finish()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeliveryOutcome {
    Saved(PathBuf),
    /// Backend diagnostic for the scheduled playback.
    Played(String),
    Returned(InlineAudio),
}

impl DeliveryOutcome {
    pub fn saved_path(&self) -> Option<&Path> {
        match self {
            DeliveryOutcome::Saved(path) => Some(path),
            _ => None,
        }
    }

    pub fn inline_audio(&self) -> Option<&InlineAudio> {
        match self {
            DeliveryOutcome::Returned(audio) => Some(audio),
            _ => None,
        }
    }
}

#[derive(Debug, Clone)]
pub struct DeliveryRouter {
    codec: CodecAdapter,
    playback: Option<Arc<dyn PlaybackBackend>>,
}

impl DeliveryRouter {
    pub fn new(codec: CodecAdapter, playback: Option<Arc<dyn PlaybackBackend>>) -> Self {
        Self { codec, playback }
    }

    pub fn codec(&self) -> &CodecAdapter {
        &self.codec
    }

    pub fn playback(&self) -> Option<&Arc<dyn PlaybackBackend>> {
        self.playback.as_ref()
    }

    pub fn deliver(
        &self,
        result: &SynthesisResult,
        mode: &DeliveryMode,
    ) -> Result<DeliveryOutcome> {
        match mode {
            DeliveryMode::Save(destination) => self.save(result.as_bytes(), destination),
            DeliveryMode::Play => self
                .start_playback(result)
                .map(|handle| DeliveryOutcome::Played(handle.into_message())),
            DeliveryMode::ReturnInline { format } => {
                let format = format.clone().unwrap_or(AudioFormat::Wav);
                let bytes = self.codec.encode(result.as_bytes(), &format)?;
                debug!(bytes = bytes.len(), %format, "returning audio inline");
                Ok(DeliveryOutcome::Returned(InlineAudio::new(bytes, format)))
            }
        }
    }

    fn save(&self, audio: &[u8], destination: &Path) -> Result<DeliveryOutcome> {
        if let Some(parent) = destination.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }
        let format = self.codec.write_to(audio, destination)?;
        info!(path = %destination.display(), %format, "saved audio");
        Ok(DeliveryOutcome::Saved(destination.to_path_buf()))
    }

    /// Start playback and keep the handle, for callers that need to wait.
    pub fn start_playback(&self, result: &SynthesisResult) -> Result<PlaybackHandle> {
        let backend = self.playback.as_ref().ok_or_else(|| {
            Error::playback_unavailable(
                "no audio output backend found on this host; install a sound player \
                 (afplay, paplay, aplay, pw-play or ffplay) or save to a file instead",
            )
        })?;
        let scratch = self.codec.materialize(result.as_bytes())?.into_temp_path();
        let handle = backend.play(scratch)?;
        info!(backend = backend.name(), "playback scheduled");
        Ok(handle)
    }
}
