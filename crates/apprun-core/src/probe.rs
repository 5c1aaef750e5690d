//! Read-only filesystem queries made during resolution.
//!
//! Resolution never writes anything; the few questions it asks of the disk
//! go through [`Probe`] so they can be answered by a fake in tests.

use std::path::{Path, PathBuf};

/// Filesystem questions asked while resolving a launch.
pub trait Probe {
    /// Whether `path` exists and is a regular file (after following links).
    fn is_file(&self, path: &Path) -> bool;

    /// Resolve symlinks and relative components of an existing path.
    fn canonicalize(&self, path: &Path) -> Option<PathBuf>;

    /// Find an executable named `program` in `dirs`, first match wins.
    fn find_program(&self, program: &str, dirs: &[PathBuf]) -> Option<PathBuf>;
}

/// [`Probe`] backed by the real filesystem.
#[derive(Debug, Clone, Copy, Default)]
pub struct HostProbe;

impl Probe for HostProbe {
    fn is_file(&self, path: &Path) -> bool {
        path.is_file()
    }

    fn canonicalize(&self, path: &Path) -> Option<PathBuf> {
        std::fs::canonicalize(path).ok()
    }

    fn find_program(&self, program: &str, dirs: &[PathBuf]) -> Option<PathBuf> {
        if dirs.is_empty() {
            return None;
        }
        let search = std::env::join_paths(dirs).ok()?;
        let cwd = std::env::current_dir().ok()?;
        which::which_in(program, Some(search), cwd).ok()
    }
}
