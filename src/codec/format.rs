//! Target audio formats, selected by file extension.

use std::path::Path;

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum AudioFormat {
    Wav,
    Mp3,
    Flac,
    Ogg,
    Opus,
    Aac,
    M4a,
    /// Any other extension; handed to the transcoding engine as-is.
    Other(String),
}

impl AudioFormat {
    pub fn from_extension(ext: &str) -> Self {
        match ext.trim_start_matches('.').to_lowercase().as_str() {
            "wav" | "wave" => Self::Wav,
            "mp3" => Self::Mp3,
            "flac" => Self::Flac,
            "ogg" | "oga" => Self::Ogg,
            "opus" => Self::Opus,
            "aac" => Self::Aac,
            "m4a" => Self::M4a,
            other => Self::Other(other.to_string()),
        }
    }

    /// Format named by the path's extension, if it has one.
    pub fn from_path(path: &Path) -> Option<Self> {
        path.extension()
            .and_then(|e| e.to_str())
            .filter(|e| !e.is_empty())
            .map(Self::from_extension)
    }

    pub fn extension(&self) -> &str {
        match self {
            Self::Wav => "wav",
            Self::Mp3 => "mp3",
            Self::Flac => "flac",
            Self::Ogg => "ogg",
            Self::Opus => "opus",
            Self::Aac => "aac",
            Self::M4a => "m4a",
            Self::Other(ext) => ext.as_str(),
        }
    }

    pub fn mime_type(&self) -> &'static str {
        match self {
            Self::Wav => "audio/wav",
            Self::Mp3 => "audio/mpeg",
            Self::Flac => "audio/flac",
            Self::Ogg => "audio/ogg",
            Self::Opus => "audio/opus",
            Self::Aac => "audio/aac",
            Self::M4a => "audio/mp4",
            Self::Other(_) => "application/octet-stream",
        }
    }

    /// The service's native container; written without re-encoding.
    pub fn is_passthrough(&self) -> bool {
        matches!(self, Self::Wav)
    }

    /// Fixed encoder bitrate, where one is pinned.
    pub fn bitrate_kbps(&self) -> Option<u32> {
        match self {
            Self::Mp3 => Some(192),
            _ => None,
        }
    }
}

impl std::fmt::Display for AudioFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.extension())
    }
}
