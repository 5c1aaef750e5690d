//! Launch failures.

use apprun_schema::ManifestError;
use std::path::PathBuf;
use thiserror::Error;

/// Exit status when the resolved target does not exist (shell convention).
pub const EXIT_NOT_FOUND: u8 = 127;

/// Exit status when the OS refuses to execute the target (shell convention).
pub const EXIT_EXEC_FAILED: u8 = 126;

/// Exit status for configuration and self-location failures.
pub const EXIT_FAILURE: u8 = 1;

/// Everything that can stop the launcher from handing over to its target.
///
/// None of these are retried: they are packaging defects or OS refusals.
#[derive(Error, Debug)]
pub enum LaunchError {
    /// The selected binary is absent from the installation root.
    #[error("bundled executable not found: {}", .0.display())]
    TargetNotFound(PathBuf),

    /// The OS refused to replace the process image.
    #[error("failed to execute {}: {source}", path.display())]
    ExecFailed {
        /// The target that could not be executed.
        path: PathBuf,
        /// The OS error.
        #[source]
        source: std::io::Error,
    },

    /// `apprun.toml` could not be loaded.
    #[error(transparent)]
    Manifest(#[from] ManifestError),

    /// The launcher's own location could not be determined.
    #[error("cannot locate the launcher executable: {0}")]
    LocateSelf(#[source] std::io::Error),

    /// A path list could not be assembled for a variable.
    #[error("cannot build {var}: {source}")]
    JoinPaths {
        /// The variable being assembled.
        var: String,
        /// Why joining failed (an entry contains the list separator).
        #[source]
        source: std::env::JoinPathsError,
    },

    /// A run-time override variable holds an unusable value.
    #[error("invalid value for {var}: {reason}")]
    Override {
        /// The offending variable.
        var: &'static str,
        /// Why the value was rejected.
        reason: String,
    },
}

impl LaunchError {
    /// Process exit status reported for this error.
    pub fn exit_code(&self) -> u8 {
        match self {
            Self::TargetNotFound(_) => EXIT_NOT_FOUND,
            Self::ExecFailed { .. } => EXIT_EXEC_FAILED,
            Self::Manifest(_)
            | Self::LocateSelf(_)
            | Self::JoinPaths { .. }
            | Self::Override { .. } => EXIT_FAILURE,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_not_found_names_missing_path() {
        let err = LaunchError::TargetNotFound(PathBuf::from("/opt/app/bin/emacs"));
        assert_eq!(err.exit_code(), EXIT_NOT_FOUND);
        assert!(err.to_string().contains("/opt/app/bin/emacs"));
    }

    #[test]
    fn test_exec_failure_code() {
        let err = LaunchError::ExecFailed {
            path: PathBuf::from("/opt/app/bin/emacs"),
            source: std::io::Error::from(std::io::ErrorKind::PermissionDenied),
        };
        assert_eq!(err.exit_code(), EXIT_EXEC_FAILED);
    }
}
