//! External transcoding engines.

use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};

use tracing::debug;

use super::AudioFormat;
use crate::{Error, Result};

pub(crate) const FFMPEG_INSTALL_HINT: &str = "converting to compressed formats requires ffmpeg:\n  \
     Windows: choco install ffmpeg  OR  download from https://ffmpeg.org/\n  \
     Linux: sudo apt-get install ffmpeg\n  \
     Mac: brew install ffmpeg\n\
     or point FFMPEG_PATH at an ffmpeg binary";

/// Converts a WAV file on disk into another container/codec.
pub trait Transcoder: Send + Sync + std::fmt::Debug {
    fn name(&self) -> &str;

    fn transcode(
        &self,
        input_wav: &Path,
        output: &Path,
        format: &AudioFormat,
        bitrate_kbps: Option<u32>,
    ) -> Result<()>;
}

/// Shells out to an `ffmpeg` binary.
#[derive(Debug, Clone)]
pub struct FfmpegTranscoder {
    program: PathBuf,
}

impl FfmpegTranscoder {
    pub fn new(program: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
        }
    }

    /// Find `program` on the host; `None` if it is not installed.
    pub fn detect(program: &Path) -> Option<Self> {
        crate::utils::which(program).map(Self::new)
    }

    pub fn program(&self) -> &Path {
        &self.program
    }
}

impl Transcoder for FfmpegTranscoder {
    fn name(&self) -> &str {
        "ffmpeg"
    }

    fn transcode(
        &self,
        input_wav: &Path,
        output: &Path,
        format: &AudioFormat,
        bitrate_kbps: Option<u32>,
    ) -> Result<()> {
        let mut cmd = Command::new(&self.program);
        cmd.args(["-hide_banner", "-loglevel", "error", "-y", "-i"])
            .arg(input_wav);
        if let Some(kbps) = bitrate_kbps {
            cmd.arg("-b:a").arg(format!("{}k", kbps));
        }
        cmd.arg(output)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::piped());

        debug!(program = %self.program.display(), target = %format, "transcoding");
        let result = cmd.output().map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                Error::codec_unavailable(
                    format.extension(),
                    format!(
                        "transcoding engine '{}' not found; {}",
                        self.program.display(),
                        FFMPEG_INSTALL_HINT
                    ),
                )
            } else {
                Error::Io(e)
            }
        })?;

        if !result.status.success() {
            let stderr = String::from_utf8_lossy(&result.stderr);
            return Err(Error::Transcode {
                format: format.extension().to_string(),
                message: format!(
                    "{} exited with {}: {}",
                    self.name(),
                    result.status,
                    stderr.trim()
                ),
            });
        }
        Ok(())
    }
}
