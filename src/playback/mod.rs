//! Local playback backends.
//!
//! Backends are detected at startup: an in-process output device first (with the
//! `device-playback` feature), then a platform sound player found on `PATH`.
//! When both exist the device backend keeps the sound player as its fallback.
//! Playback is fire-and-forget. Each backend plays one clip at a time, so a new
//! request stops whatever that backend is still playing.

mod convert;
#[cfg(feature = "device-playback")]
mod device;
mod system;

#[cfg(feature = "device-playback")]
pub use device::DevicePlayer;
pub use system::SystemPlayer;

use std::ffi::OsStr;
use std::sync::{Arc, Mutex, MutexGuard};
use std::thread::JoinHandle;

use tempfile::TempPath;

use crate::Result;

pub trait PlaybackBackend: Send + Sync + std::fmt::Debug {
    fn name(&self) -> &str;

    /// Schedule playback of a WAV scratch file.
    ///
    /// The backend owns `file` and deletes it once the audio has been handed
    /// off. Returns before playback finishes.
    fn play(&self, file: TempPath) -> Result<PlaybackHandle>;
}

/// A scheduled playback. Dropping the handle detaches it.
#[derive(Debug)]
pub struct PlaybackHandle {
    message: String,
    finished: Option<JoinHandle<()>>,
}

impl PlaybackHandle {
    /// `finished` completes when the audio is done and the scratch file is gone.
    pub fn new(message: impl Into<String>, finished: Option<JoinHandle<()>>) -> Self {
        Self {
            message: message.into(),
            finished,
        }
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn into_message(self) -> String {
        self.message
    }

    /// Block until playback ends; returns the diagnostic message.
    pub fn wait(self) -> String {
        if let Some(handle) = self.finished {
            if handle.join().is_err() {
                tracing::warn!("playback thread panicked");
            }
        }
        self.message
    }
}

/// First available backend, searching `search_path` for sound players.
pub fn detect(search_path: Option<&OsStr>) -> Option<Arc<dyn PlaybackBackend>> {
    let system = SystemPlayer::detect(search_path);

    #[cfg(feature = "device-playback")]
    if let Some(device) = DevicePlayer::detect() {
        return Some(Arc::new(device.with_fallback(system)));
    }

    system.map(|p| Arc::new(p) as Arc<dyn PlaybackBackend>)
}

/// Lock that survives a panicked holder; playback state stays usable.
pub(crate) fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

/// [`detect`] against the process `PATH`.
pub fn detect_host() -> Option<Arc<dyn PlaybackBackend>> {
    let path_var = std::env::var_os("PATH");
    detect(path_var.as_deref())
}
