//! Host capability helpers.

use std::ffi::OsStr;
use std::path::{Path, PathBuf};

/// Locate an executable.
///
/// A `program` containing a path separator is checked as given; a bare name
/// is searched for in `search_path` (a `PATH`-style list).
pub fn find_executable(program: &Path, search_path: Option<&OsStr>) -> Option<PathBuf> {
    if program.components().count() > 1 || program.is_absolute() {
        return program.is_file().then(|| program.to_path_buf());
    }

    let search_path = search_path?;
    for dir in std::env::split_paths(search_path) {
        let candidate = dir.join(program);
        if candidate.is_file() {
            return Some(candidate);
        }
        #[cfg(windows)]
        for ext in windows_extensions() {
            let mut name = program.as_os_str().to_os_string();
            name.push(&ext);
            let with_ext = dir.join(name);
            if with_ext.is_file() {
                return Some(with_ext);
            }
        }
    }
    None
}

/// [`find_executable`] against the process `PATH`.
pub fn which(program: impl AsRef<Path>) -> Option<PathBuf> {
    let path_var = std::env::var_os("PATH");
    find_executable(program.as_ref(), path_var.as_deref())
}

#[cfg(windows)]
fn windows_extensions() -> Vec<String> {
    std::env::var_os("PATHEXT")
        .map(|v| {
            v.to_string_lossy()
                .split(';')
                .map(|s| s.trim().to_ascii_lowercase())
                .filter(|s| !s.is_empty())
                .collect::<Vec<_>>()
        })
        .unwrap_or_else(|| vec![".exe".to_string(), ".bat".to_string(), ".cmd".to_string()])
}
