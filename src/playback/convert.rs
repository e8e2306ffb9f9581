//! Sample layout conversion for output devices.
//!
//! Devices rarely accept the service's mono stream as-is, so clips are
//! re-laid out for the device's own channel count and rate before playback.
#![cfg_attr(not(feature = "device-playback"), allow(dead_code))]

use std::time::Duration;

/// Interleaved f32 audio.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct Clip {
    pub samples: Vec<f32>,
    pub channels: u16,
    pub sample_rate: u32,
}

impl Clip {
    pub fn frames(&self) -> usize {
        self.samples.len() / usize::from(self.channels.max(1))
    }

    pub fn duration(&self) -> Duration {
        let rate = u64::from(self.sample_rate.max(1));
        Duration::from_millis(self.frames() as u64 * 1000 / rate)
    }

    /// Map channels (duplicate or average), then resample linearly.
    pub fn adapt(&self, channels: u16, sample_rate: u32) -> Clip {
        let mapped = self.remap(channels.max(1));
        mapped.resample(sample_rate.max(1))
    }

    fn remap(&self, channels: u16) -> Clip {
        let input = usize::from(self.channels.max(1));
        let output = usize::from(channels);
        if input == output {
            return self.clone();
        }

        let mut samples = Vec::with_capacity(self.frames() * output);
        for frame in self.samples.chunks_exact(input) {
            if output == 1 {
                samples.push(frame.iter().sum::<f32>() / input as f32);
            } else {
                for c in 0..output {
                    samples.push(frame[c.min(input - 1)]);
                }
            }
        }
        Clip {
            samples,
            channels,
            sample_rate: self.sample_rate,
        }
    }

    fn resample(&self, sample_rate: u32) -> Clip {
        let from = self.sample_rate.max(1);
        let frames = self.frames();
        if from == sample_rate || frames == 0 {
            return Clip {
                sample_rate,
                ..self.clone()
            };
        }

        let channels = usize::from(self.channels.max(1));
        let out_frames = (frames as u64 * u64::from(sample_rate) / u64::from(from)) as usize;
        let step = f64::from(from) / f64::from(sample_rate);
        let mut samples = Vec::with_capacity(out_frames * channels);
        for j in 0..out_frames {
            let pos = j as f64 * step;
            let i0 = (pos.floor() as usize).min(frames - 1);
            let i1 = (i0 + 1).min(frames - 1);
            let frac = (pos - i0 as f64) as f32;
            for c in 0..channels {
                let a = self.samples[i0 * channels + c];
                let b = self.samples[i1 * channels + c];
                samples.push(a + (b - a) * frac);
            }
        }
        Clip {
            samples,
            channels: self.channels,
            sample_rate,
        }
    }
}
