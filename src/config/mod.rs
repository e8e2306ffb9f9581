//! Configuration resolution: built-in defaults < environment < explicit overrides.
//!
//! [`EffectiveConfig`] is resolved once per client and never mutated afterwards.
//! Per-call arguments (voice, quality, speed) override it at request-build time
//! without touching the resolved value.
//!
//! ## Recognized keys
//!
//! | Key | Default |
//! |-----|---------|
//! | `BASE_URL` | `http://localhost:8765` |
//! | `TIMEOUT` | `30` (seconds) |
//! | `DEFAULT_VOICE` | `M1` |
//! | `DEFAULT_QUALITY` | `5` |
//! | `DEFAULT_SPEED` | `1.05` |
//! | `DEFAULT_FORMAT` | `wav` |
//! | `TEMP_DIR` | system temp directory |
//! | `OUTPUT_DIR` | `output` |
//! | `SAMPLE_RATE` | `44100` (only for headerless PCM responses) |
//! | `FFMPEG_PATH` | `ffmpeg` |

use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::time::Duration;

use tracing::warn;

pub const ENV_BASE_URL: &str = "BASE_URL";
pub const ENV_TIMEOUT: &str = "TIMEOUT";
pub const ENV_DEFAULT_VOICE: &str = "DEFAULT_VOICE";
pub const ENV_DEFAULT_QUALITY: &str = "DEFAULT_QUALITY";
pub const ENV_DEFAULT_SPEED: &str = "DEFAULT_SPEED";
pub const ENV_DEFAULT_FORMAT: &str = "DEFAULT_FORMAT";
pub const ENV_TEMP_DIR: &str = "TEMP_DIR";
pub const ENV_OUTPUT_DIR: &str = "OUTPUT_DIR";
pub const ENV_SAMPLE_RATE: &str = "SAMPLE_RATE";
pub const ENV_FFMPEG_PATH: &str = "FFMPEG_PATH";

pub const DEFAULT_BASE_URL: &str = "http://localhost:8765";
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;
pub const DEFAULT_VOICE: &str = "M1";
pub const DEFAULT_QUALITY: u32 = 5;
pub const DEFAULT_SPEED: f32 = 1.05;
pub const DEFAULT_FORMAT: &str = "wav";
pub const DEFAULT_OUTPUT_DIR: &str = "output";
pub const DEFAULT_SAMPLE_RATE: u32 = 44_100;
pub const DEFAULT_FFMPEG_PATH: &str = "ffmpeg";

/// Fully resolved client configuration. Every field has a value.
#[derive(Debug, Clone, PartialEq)]
pub struct EffectiveConfig {
    pub base_url: String,
    pub timeout_seconds: u64,
    pub default_voice: String,
    pub default_quality: u32,
    pub default_speed: f32,
    pub default_format: String,
    pub output_dir: PathBuf,
    /// `None` means the system temp directory.
    pub temp_dir: Option<PathBuf>,
    pub sample_rate: u32,
    pub ffmpeg_path: PathBuf,
}

/// Explicit values that win over the environment.
#[derive(Debug, Clone, Default)]
pub struct ConfigOverrides {
    pub base_url: Option<String>,
    pub timeout_seconds: Option<u64>,
    pub default_voice: Option<String>,
    pub default_quality: Option<u32>,
    pub default_speed: Option<f32>,
    pub default_format: Option<String>,
    pub output_dir: Option<PathBuf>,
    pub temp_dir: Option<PathBuf>,
    pub sample_rate: Option<u32>,
    pub ffmpeg_path: Option<PathBuf>,
}

impl ConfigOverrides {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = Some(url.into());
        self
    }

    pub fn timeout_seconds(mut self, secs: u64) -> Self {
        self.timeout_seconds = Some(secs);
        self
    }

    pub fn default_voice(mut self, voice: impl Into<String>) -> Self {
        self.default_voice = Some(voice.into());
        self
    }

    pub fn default_format(mut self, format: impl Into<String>) -> Self {
        self.default_format = Some(format.into());
        self
    }

    pub fn output_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.output_dir = Some(dir.into());
        self
    }

    pub fn temp_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.temp_dir = Some(dir.into());
        self
    }

    pub fn ffmpeg_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.ffmpeg_path = Some(path.into());
        self
    }
}

impl EffectiveConfig {
    /// Resolve against the process environment.
    pub fn resolve(overrides: &ConfigOverrides) -> Self {
        Self::resolve_with(|key| std::env::var(key).ok(), overrides)
    }

    /// Resolve against an arbitrary key lookup.
    ///
    /// Also creates the output and temp directories if missing. A directory that
    /// cannot be created is logged and surfaces later as a save failure.
    pub fn resolve_with<F>(lookup: F, overrides: &ConfigOverrides) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let env = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let base_url = overrides
            .base_url
            .clone()
            .or_else(|| env(ENV_BASE_URL))
            .unwrap_or_else(|| DEFAULT_BASE_URL.to_string());

        let config = Self {
            base_url: normalize_base_url(&base_url),
            timeout_seconds: sanitize_timeout(
                overrides
                    .timeout_seconds
                    .unwrap_or_else(|| parse_or(&env, ENV_TIMEOUT, DEFAULT_TIMEOUT_SECS)),
            ),
            default_voice: overrides
                .default_voice
                .clone()
                .or_else(|| env(ENV_DEFAULT_VOICE))
                .unwrap_or_else(|| DEFAULT_VOICE.to_string()),
            default_quality: overrides
                .default_quality
                .unwrap_or_else(|| parse_or(&env, ENV_DEFAULT_QUALITY, DEFAULT_QUALITY)),
            default_speed: overrides
                .default_speed
                .unwrap_or_else(|| parse_or(&env, ENV_DEFAULT_SPEED, DEFAULT_SPEED)),
            default_format: overrides
                .default_format
                .clone()
                .or_else(|| env(ENV_DEFAULT_FORMAT))
                .unwrap_or_else(|| DEFAULT_FORMAT.to_string())
                .trim_start_matches('.')
                .to_lowercase(),
            output_dir: overrides
                .output_dir
                .clone()
                .or_else(|| env(ENV_OUTPUT_DIR).map(PathBuf::from))
                .unwrap_or_else(|| PathBuf::from(DEFAULT_OUTPUT_DIR)),
            temp_dir: overrides
                .temp_dir
                .clone()
                .or_else(|| env(ENV_TEMP_DIR).map(PathBuf::from)),
            sample_rate: overrides
                .sample_rate
                .unwrap_or_else(|| parse_or(&env, ENV_SAMPLE_RATE, DEFAULT_SAMPLE_RATE)),
            ffmpeg_path: overrides
                .ffmpeg_path
                .clone()
                .or_else(|| env(ENV_FFMPEG_PATH).map(PathBuf::from))
                .unwrap_or_else(|| PathBuf::from(DEFAULT_FFMPEG_PATH)),
        };

        config.ensure_directories();
        config
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_seconds)
    }

    /// Absolute URL for a service path such as `/health`.
    pub fn endpoint(&self, path: &str) -> String {
        if path.starts_with('/') {
            format!("{}{}", self.base_url, path)
        } else {
            format!("{}/{}", self.base_url, path)
        }
    }

    /// Directory for private scratch files.
    pub fn scratch_dir(&self) -> PathBuf {
        self.temp_dir.clone().unwrap_or_else(std::env::temp_dir)
    }

    fn ensure_directories(&self) {
        ensure_dir(&self.output_dir);
        if let Some(dir) = &self.temp_dir {
            ensure_dir(dir);
        }
    }
}

impl Default for EffectiveConfig {
    /// Built-in defaults only; touches neither the environment nor the filesystem.
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout_seconds: DEFAULT_TIMEOUT_SECS,
            default_voice: DEFAULT_VOICE.to_string(),
            default_quality: DEFAULT_QUALITY,
            default_speed: DEFAULT_SPEED,
            default_format: DEFAULT_FORMAT.to_string(),
            output_dir: PathBuf::from(DEFAULT_OUTPUT_DIR),
            temp_dir: None,
            sample_rate: DEFAULT_SAMPLE_RATE,
            ffmpeg_path: PathBuf::from(DEFAULT_FFMPEG_PATH),
        }
    }
}

/// A zero timeout would fail every request; it means "use the default".
pub(crate) fn sanitize_timeout(secs: u64) -> u64 {
    if secs == 0 {
        warn!("timeout of 0 seconds, using {}", DEFAULT_TIMEOUT_SECS);
        DEFAULT_TIMEOUT_SECS
    } else {
        secs
    }
}

fn parse_or<T, F>(env: &F, key: &str, default: T) -> T
where
    T: FromStr + Copy,
    F: Fn(&str) -> Option<String>,
{
    match env(key) {
        None => default,
        Some(raw) => match raw.trim().parse::<T>() {
            Ok(v) => v,
            Err(_) => {
                warn!(key, value = %raw, "unparseable numeric config value, using default");
                default
            }
        },
    }
}

fn normalize_base_url(raw: &str) -> String {
    let trimmed = raw.trim().trim_end_matches('/');
    match url::Url::parse(trimmed) {
        Ok(parsed) if matches!(parsed.scheme(), "http" | "https") => trimmed.to_string(),
        _ => {
            warn!(value = %raw, "invalid base URL, using {}", DEFAULT_BASE_URL);
            DEFAULT_BASE_URL.to_string()
        }
    }
}

fn ensure_dir(dir: &Path) {
    if let Err(e) = std::fs::create_dir_all(dir) {
        warn!(dir = %dir.display(), error = %e, "could not create directory");
    }
}
