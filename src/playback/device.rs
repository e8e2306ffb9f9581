use std::path::Path;
use std::sync::mpsc::{self, RecvTimeoutError};
use std::sync::Mutex;
use std::time::{Duration, Instant};

use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use cpal::{Sample, SampleFormat};
use tempfile::TempPath;
use tracing::{debug, warn};

use super::convert::Clip;
use super::{lock, PlaybackBackend, PlaybackHandle, SystemPlayer};
use crate::{Error, Result};

const TAIL: Duration = Duration::from_millis(250);

/// Plays through the default output device of the default audio host.
///
/// Clips are converted to the device's default stream layout. If the device
/// still refuses the stream, the clip goes to the fallback sound player.
#[derive(Debug, Default)]
pub struct DevicePlayer {
    fallback: Option<SystemPlayer>,
    stop: Mutex<Option<mpsc::Sender<()>>>,
}

impl DevicePlayer {
    /// `None` unless there is an output device with a usable default config.
    pub fn detect() -> Option<Self> {
        let host = cpal::default_host();
        let device = host.default_output_device()?;
        match device.default_output_config() {
            Ok(config) => debug!(
                host = ?host.id(),
                device = %device.name().unwrap_or_default(),
                channels = config.channels(),
                rate = config.sample_rate().0,
                format = ?config.sample_format(),
                "found output device"
            ),
            Err(e) => {
                debug!(error = %e, "output device has no default stream config");
                return None;
            }
        }
        Some(Self::default())
    }

    pub fn with_fallback(mut self, fallback: Option<SystemPlayer>) -> Self {
        self.fallback = fallback;
        self
    }

    fn start(&self, file: &Path, label: &str) -> Result<PlaybackHandle> {
        let clip = load(file)?;
        let (stop_tx, stop_rx) = mpsc::channel::<()>();
        let (started_tx, started_rx) = mpsc::channel::<std::result::Result<(), String>>();

        let mut current = lock(&self.stop);
        if let Some(previous) = current.take() {
            debug!("interrupting previous clip");
            let _ = previous.send(());
        }

        // cpal streams are not Send on every platform, so the stream lives on
        // its own thread and reports whether it started.
        let finished = std::thread::spawn(move || {
            let (stream, linger) = match open_stream(clip) {
                Ok(opened) => opened,
                Err(message) => {
                    let _ = started_tx.send(Err(message));
                    return;
                }
            };
            if let Err(e) = stream.play() {
                let _ = started_tx.send(Err(e.to_string()));
                return;
            }
            let _ = started_tx.send(Ok(()));

            let deadline = Instant::now() + linger;
            match stop_rx.recv_timeout(linger) {
                Ok(()) => debug!("output stream interrupted"),
                // The player is gone; let the clip finish on its own.
                Err(RecvTimeoutError::Disconnected) => {
                    std::thread::sleep(deadline.saturating_duration_since(Instant::now()))
                }
                Err(RecvTimeoutError::Timeout) => {}
            }
            drop(stream);
        });

        match started_rx.recv() {
            Ok(Ok(())) => {
                *current = Some(stop_tx);
                Ok(PlaybackHandle::new(
                    format!("Playback of {} started on the output device.", label),
                    Some(finished),
                ))
            }
            Ok(Err(message)) => Err(Error::playback_unavailable(format!(
                "output device rejected the stream: {}",
                message
            ))),
            Err(_) => Err(Error::playback_unavailable(
                "output device thread exited before starting playback",
            )),
        }
    }
}

impl PlaybackBackend for DevicePlayer {
    fn name(&self) -> &str {
        "output-device"
    }

    fn play(&self, file: TempPath) -> Result<PlaybackHandle> {
        let label = file
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();

        match self.start(&file, &label) {
            Ok(handle) => {
                // Samples are in memory; the scratch file is no longer needed.
                if let Err(e) = file.close() {
                    warn!(error = %e, "could not remove playback scratch file");
                }
                Ok(handle)
            }
            Err(e) => match &self.fallback {
                Some(fallback) => {
                    warn!(error = %e, fallback = fallback.name(), "output device failed");
                    fallback.play(file)
                }
                None => Err(e),
            },
        }
    }
}

fn load(file: &Path) -> Result<Clip> {
    let reader = hound::WavReader::open(file).map_err(crate::codec::wav::map_hound)?;
    let spec = reader.spec();
    let samples = match spec.sample_format {
        hound::SampleFormat::Float => reader
            .into_samples::<f32>()
            .collect::<std::result::Result<Vec<_>, _>>()
            .map_err(crate::codec::wav::map_hound)?,
        hound::SampleFormat::Int => {
            let scale = (1_i64 << (spec.bits_per_sample.saturating_sub(1))) as f32;
            reader
                .into_samples::<i32>()
                .map(|s| s.map(|v| v as f32 / scale))
                .collect::<std::result::Result<Vec<_>, _>>()
                .map_err(crate::codec::wav::map_hound)?
        }
    };
    Ok(Clip {
        samples,
        channels: spec.channels,
        sample_rate: spec.sample_rate,
    })
}

/// Open a stream in the device's default layout; returns it with the time to
/// keep it alive.
fn open_stream(clip: Clip) -> std::result::Result<(cpal::Stream, Duration), String> {
    let device = cpal::default_host()
        .default_output_device()
        .ok_or("no default output device")?;
    let supported = device.default_output_config().map_err(|e| e.to_string())?;
    let config = supported.config();

    let clip = clip.adapt(config.channels, config.sample_rate.0);
    let linger = clip.duration() + TAIL;
    let stream = match supported.sample_format() {
        SampleFormat::F32 => build::<f32>(&device, &config, clip.samples),
        SampleFormat::I16 => build::<i16>(&device, &config, clip.samples),
        SampleFormat::U16 => build::<u16>(&device, &config, clip.samples),
        SampleFormat::I32 => build::<i32>(&device, &config, clip.samples),
        other => return Err(format!("unsupported sample format {:?}", other)),
    }
    .map_err(|e| e.to_string())?;
    Ok((stream, linger))
}

fn build<T>(
    device: &cpal::Device,
    config: &cpal::StreamConfig,
    samples: Vec<f32>,
) -> std::result::Result<cpal::Stream, cpal::BuildStreamError>
where
    T: cpal::SizedSample + cpal::FromSample<f32>,
{
    let mut cursor = 0usize;
    device.build_output_stream(
        config,
        move |out: &mut [T], _: &cpal::OutputCallbackInfo| {
            for slot in out.iter_mut() {
                *slot = T::from_sample(samples.get(cursor).copied().unwrap_or(0.0));
                cursor += 1;
            }
        },
        |e| warn!(error = %e, "output stream error"),
        None,
    )
}
