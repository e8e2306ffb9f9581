//! Audio codec adapter.
//!
//! WAV targets are written byte-for-byte. Every other format goes through a
//! [`Transcoder`]: the audio is first materialized as a WAV file in the scratch
//! directory, the engine converts it, and the intermediate file is removed on
//! every exit path (it lives in a [`tempfile::NamedTempFile`]).

mod format;
mod transcode;
pub mod wav;

pub use format::AudioFormat;
pub use transcode::{FfmpegTranscoder, Transcoder};

use std::path::{Path, PathBuf};
use std::sync::Arc;

use tempfile::NamedTempFile;
use tracing::{debug, warn};

use crate::config::EffectiveConfig;
use crate::{Error, Result};

pub(crate) const TEMP_PREFIX: &str = "supertonic_";

#[derive(Debug, Clone)]
pub struct CodecAdapter {
    transcoder: Option<Arc<dyn Transcoder>>,
    scratch_dir: PathBuf,
    sample_rate: u32,
    default_format: AudioFormat,
}

impl CodecAdapter {
    /// Adapter for `config`, probing the host for the configured ffmpeg binary.
    pub fn new(config: &EffectiveConfig) -> Self {
        let transcoder = FfmpegTranscoder::detect(&config.ffmpeg_path)
            .map(|t| Arc::new(t) as Arc<dyn Transcoder>);
        if transcoder.is_none() {
            debug!(
                ffmpeg = %config.ffmpeg_path.display(),
                "no transcoding engine found; only WAV output is available"
            );
        }
        Self {
            transcoder,
            scratch_dir: config.scratch_dir(),
            sample_rate: config.sample_rate,
            default_format: AudioFormat::from_extension(&config.default_format),
        }
    }

    /// Replace the detected engine (`None` = WAV only).
    pub fn with_transcoder(mut self, transcoder: Option<Arc<dyn Transcoder>>) -> Self {
        self.transcoder = transcoder;
        self
    }

    pub fn can_transcode(&self) -> bool {
        self.transcoder.is_some()
    }

    pub fn scratch_dir(&self) -> &Path {
        &self.scratch_dir
    }

    pub fn default_format(&self) -> &AudioFormat {
        &self.default_format
    }

    /// Format for `path`: its extension, else the configured default.
    pub fn format_for(&self, path: &Path) -> AudioFormat {
        AudioFormat::from_path(path).unwrap_or_else(|| self.default_format.clone())
    }

    /// Write `audio` to `destination` in the format its extension names.
    pub fn write_to(&self, audio: &[u8], destination: &Path) -> Result<AudioFormat> {
        let format = self.format_for(destination);
        if format.is_passthrough() {
            std::fs::write(destination, audio)?;
            return Ok(format);
        }

        let transcoder = self.require_transcoder(&format)?;
        let intermediate = self.materialize(audio)?;
        let result = transcoder.transcode(
            intermediate.path(),
            destination,
            &format,
            format.bitrate_kbps(),
        );
        if result.is_err() && destination.exists() {
            if let Err(e) = std::fs::remove_file(destination) {
                warn!(path = %destination.display(), error = %e, "could not remove partial output");
            }
        }
        result.map(|_| format)
    }

    /// Encode `audio` in memory. WAV returns the bytes unchanged.
    pub fn encode(&self, audio: &[u8], format: &AudioFormat) -> Result<Vec<u8>> {
        if format.is_passthrough() {
            return Ok(audio.to_vec());
        }

        let transcoder = self.require_transcoder(format)?;
        let intermediate = self.materialize(audio)?;
        let output = tempfile::Builder::new()
            .prefix(TEMP_PREFIX)
            .suffix(&format!(".{}", format.extension()))
            .tempfile_in(&self.scratch_dir)?;
        transcoder.transcode(
            intermediate.path(),
            output.path(),
            format,
            format.bitrate_kbps(),
        )?;
        Ok(std::fs::read(output.path())?)
    }

    /// Write `audio` as a well-formed WAV into a private scratch file.
    ///
    /// The file is deleted when the returned handle is dropped.
    pub fn materialize(&self, audio: &[u8]) -> Result<NamedTempFile> {
        let mut file = tempfile::Builder::new()
            .prefix(TEMP_PREFIX)
            .suffix(".wav")
            .tempfile_in(&self.scratch_dir)?;
        wav::write_container(audio, self.sample_rate, file.as_file_mut())?;
        Ok(file)
    }

    fn require_transcoder(&self, format: &AudioFormat) -> Result<&Arc<dyn Transcoder>> {
        self.transcoder.as_ref().ok_or_else(|| {
            Error::codec_unavailable(
                format.extension(),
                format!(
                    "no transcoding engine available on this host; {}",
                    transcode::FFMPEG_INSTALL_HINT
                ),
            )
        })
    }
}
