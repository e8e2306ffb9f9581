use std::ffi::OsStr;
use std::path::{Path, PathBuf};
use std::process::{Child, Command, Stdio};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use tempfile::TempPath;
use tracing::{debug, warn};

use super::{lock, PlaybackBackend, PlaybackHandle};
use crate::utils::find_executable;
use crate::{Error, Result};

/// (program, leading args) in preference order.
#[cfg(target_os = "macos")]
const CANDIDATES: &[(&str, &[&str])] = &[("afplay", &[])];

#[cfg(windows)]
const CANDIDATES: &[(&str, &[&str])] =
    &[("powershell", &["-NoProfile", "-NonInteractive", "-Command"])];

#[cfg(not(any(target_os = "macos", windows)))]
const CANDIDATES: &[(&str, &[&str])] = &[
    ("paplay", &[]),
    ("pw-play", &[]),
    ("aplay", &["-q"]),
    ("ffplay", &["-autoexit", "-nodisp", "-loglevel", "error"]),
];

const EXIT_POLL: Duration = Duration::from_millis(20);

/// A platform sound player run as a child process.
///
/// Only one clip plays at a time: starting a new one kills the player still
/// running for the previous clip.
#[derive(Debug)]
pub struct SystemPlayer {
    name: String,
    program: PathBuf,
    args: Vec<String>,
    current: Mutex<Option<Arc<Mutex<Child>>>>,
}

impl SystemPlayer {
    pub fn new(name: impl Into<String>, program: impl Into<PathBuf>, args: Vec<String>) -> Self {
        Self {
            name: name.into(),
            program: program.into(),
            args,
            current: Mutex::new(None),
        }
    }

    pub fn detect(search_path: Option<&OsStr>) -> Option<Self> {
        CANDIDATES.iter().find_map(|(name, args)| {
            find_executable(Path::new(name), search_path).map(|program| {
                debug!(player = *name, program = %program.display(), "found sound player");
                Self::new(*name, program, args.iter().map(|a| a.to_string()).collect())
            })
        })
    }

    fn command(&self, file: &Path) -> Command {
        let mut cmd = Command::new(&self.program);
        cmd.args(&self.args);
        if cfg!(windows) {
            let escaped = file.display().to_string().replace('\'', "''");
            cmd.arg(format!(
                "(New-Object Media.SoundPlayer '{}').PlaySync()",
                escaped
            ));
        } else {
            cmd.arg(file);
        }
        cmd.stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null());
        cmd
    }
}

impl PlaybackBackend for SystemPlayer {
    fn name(&self) -> &str {
        &self.name
    }

    fn play(&self, file: TempPath) -> Result<PlaybackHandle> {
        let mut current = lock(&self.current);
        if let Some(previous) = current.take() {
            interrupt(&previous, &self.name);
        }

        let child = self.command(&file).spawn().map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                Error::playback_unavailable(format!(
                    "sound player '{}' is no longer available",
                    self.program.display()
                ))
            } else {
                Error::Io(e)
            }
        })?;
        let child = Arc::new(Mutex::new(child));
        *current = Some(Arc::clone(&child));
        drop(current);

        let label = file
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        let player = self.name.clone();

        // The player reads the file while it runs; remove it after exit.
        let finished = std::thread::spawn(move || {
            match wait_for_exit(&child) {
                Ok(status) if status.success() => {}
                // Killed by a signal: interrupted by the next clip.
                Ok(status) if status.code().is_none() => {
                    debug!(player = %player, "sound player stopped")
                }
                Ok(status) => warn!(player = %player, %status, "sound player exited with failure"),
                Err(e) => warn!(player = %player, error = %e, "waiting on sound player failed"),
            }
            if let Err(e) = file.close() {
                warn!(error = %e, "could not remove playback scratch file");
            }
        });

        Ok(PlaybackHandle::new(
            format!("Playback of {} started via {}.", label, self.name),
            Some(finished),
        ))
    }
}

/// Poll instead of blocking in `wait` so `interrupt` can take the lock.
fn wait_for_exit(child: &Mutex<Child>) -> std::io::Result<std::process::ExitStatus> {
    loop {
        if let Some(status) = lock(child).try_wait()? {
            return Ok(status);
        }
        std::thread::sleep(EXIT_POLL);
    }
}

fn interrupt(child: &Mutex<Child>, player: &str) {
    let mut child = lock(child);
    if let Ok(None) = child.try_wait() {
        debug!(player, "interrupting previous clip");
        if let Err(e) = child.kill() {
            warn!(player, error = %e, "could not stop previous clip");
        }
    }
}
