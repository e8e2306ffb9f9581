//! WAV container helpers.
//!
//! The service normally answers with a complete RIFF/WAVE file. Some builds
//! return a bare little-endian PCM16 mono buffer instead; those are wrapped in a
//! header before anything downstream reads them.

use std::io::{Seek, Write};

use hound::{SampleFormat, WavSpec, WavWriter};
use tracing::warn;

use crate::{Error, Result};

pub fn is_wav_container(bytes: &[u8]) -> bool {
    bytes.len() >= 12 && &bytes[0..4] == b"RIFF" && &bytes[8..12] == b"WAVE"
}

/// Write `audio` as a well-formed WAV stream.
///
/// Complete containers are copied verbatim; bare buffers are framed as
/// PCM16 mono at `sample_rate`.
pub fn write_container<W: Write + Seek>(audio: &[u8], sample_rate: u32, out: &mut W) -> Result<()> {
    if is_wav_container(audio) {
        out.write_all(audio)?;
        out.flush()?;
        return Ok(());
    }

    if audio.len() % 2 != 0 {
        warn!(bytes = audio.len(), "odd-length PCM buffer, dropping trailing byte");
    }
    let spec = WavSpec {
        channels: 1,
        sample_rate,
        bits_per_sample: 16,
        sample_format: SampleFormat::Int,
    };
    let mut writer = WavWriter::new(out, spec).map_err(map_hound)?;
    for pair in audio.chunks_exact(2) {
        writer
            .write_sample(i16::from_le_bytes([pair[0], pair[1]]))
            .map_err(map_hound)?;
    }
    writer.finalize().map_err(map_hound)?;
    Ok(())
}

/// In-memory variant of [`write_container`].
pub fn to_container(audio: &[u8], sample_rate: u32) -> Result<Vec<u8>> {
    if is_wav_container(audio) {
        return Ok(audio.to_vec());
    }
    let mut cursor = std::io::Cursor::new(Vec::with_capacity(audio.len() + 44));
    write_container(audio, sample_rate, &mut cursor)?;
    Ok(cursor.into_inner())
}

pub(crate) fn map_hound(e: hound::Error) -> Error {
    match e {
        hound::Error::IoError(io) => Error::Io(io),
        other => Error::Transcode {
            format: "wav".to_string(),
            message: other.to_string(),
        },
    }
}
