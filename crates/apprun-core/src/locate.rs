//! Where the launcher itself lives.

use crate::error::LaunchError;
use std::path::{Path, PathBuf};

/// The installation root: the directory holding the launcher executable,
/// with symlinks resolved.
///
/// A symlink such as `~/bin/emacsclient -> /opt/Emacs/AppRun` therefore
/// still finds `/opt/Emacs`. The working directory plays no part.
///
/// # Errors
///
/// Returns [`LaunchError::LocateSelf`] if the executable path is unknown
/// or cannot be resolved.
pub fn install_root() -> Result<PathBuf, LaunchError> {
    let exe = std::env::current_exe().map_err(LaunchError::LocateSelf)?;
    root_of(&exe)
}

/// The resolved parent directory of `exe`.
///
/// # Errors
///
/// Returns [`LaunchError::LocateSelf`] if `exe` cannot be resolved.
pub fn root_of(exe: &Path) -> Result<PathBuf, LaunchError> {
    let exe = std::fs::canonicalize(exe).map_err(LaunchError::LocateSelf)?;
    let root = exe.parent().map(Path::to_path_buf).ok_or_else(|| {
        LaunchError::LocateSelf(std::io::Error::new(
            std::io::ErrorKind::NotFound,
            format!("{} has no parent directory", exe.display()),
        ))
    })?;
    tracing::debug!("Installation root is {}", root.display());
    Ok(root)
}
