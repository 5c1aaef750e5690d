//! The environment handed to the child.
//!
//! | Variable | Value |
//! |---|---|
//! | `PATH` | see [`search_path`](crate::search_path) |
//! | `LD_LIBRARY_PATH` (`DYLD_LIBRARY_PATH` on macOS) | bundled library dirs, then the inherited value |
//! | every `data_paths` variable | absolute directories under the root, never inherited |
//!
//! Removed from the inherited set before anything is added: the data
//! variables themselves, the manifest's `scrub` list, the launcher's own
//! `APPRUN_*` controls, the AppImage runtime's `ARGV0` (valid for this
//! launch only), and (under [`PathPolicy::Sanitize`]) version-manager marker
//! variables.

use crate::env::EnvMap;
use crate::error::LaunchError;
use crate::invocation::APPIMAGE_ARGV0_VAR;
use crate::layout::InstallLayout;
use crate::search_path::prepend_list;
use apprun_schema::{PathPolicy, ShimManager};
use std::ffi::OsString;

/// Executable search path variable.
pub const PATH_VAR: &str = "PATH";

/// Dynamic loader search path variable for this platform.
#[cfg(target_os = "macos")]
pub const LIBRARY_PATH_VAR: &str = "DYLD_LIBRARY_PATH";

/// Dynamic loader search path variable for this platform.
#[cfg(not(target_os = "macos"))]
pub const LIBRARY_PATH_VAR: &str = "LD_LIBRARY_PATH";

/// Prefix of the variables that steer the launcher itself.
pub const CONTROL_PREFIX: &str = "APPRUN_";

/// Result of environment construction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChildEnvironment {
    /// The complete environment for the child.
    pub vars: EnvMap,
    /// Inherited variables that were dropped, in name order.
    pub unset: Vec<OsString>,
}

/// Derive the child environment from `inherited` without modifying it.
///
/// `search_path` is the already assembled `PATH` value.
///
/// # Errors
///
/// Returns [`LaunchError::JoinPaths`] if a bundled directory contains the
/// path-list separator.
pub fn build(
    layout: &InstallLayout<'_>,
    policy: PathPolicy,
    search_path: OsString,
    inherited: &EnvMap,
) -> Result<ChildEnvironment, LaunchError> {
    let manifest = layout.manifest();
    let data_paths = layout.data_paths();

    let mut vars = inherited.clone();
    let mut unset = Vec::new();
    vars.retain(|name, _| {
        let drop = match name.to_str() {
            Some(name) => {
                name.starts_with(CONTROL_PREFIX)
                    || name == APPIMAGE_ARGV0_VAR
                    || data_paths.contains_key(name)
                    || manifest.scrub.iter().any(|s| s == name)
                    || (policy.filters_inherited() && ShimManager::owning_marker(name).is_some())
            }
            None => false,
        };
        if drop {
            unset.push(name.to_os_string());
        }
        !drop
    });
    if !unset.is_empty() {
        tracing::debug!("Unset inherited variables: {unset:?}");
    }

    let libs = join(LIBRARY_PATH_VAR, layout.library_dirs())?;
    vars.set(
        LIBRARY_PATH_VAR,
        prepend_list(libs, inherited.get(LIBRARY_PATH_VAR)),
    );

    for (var, dirs) in data_paths {
        vars.set(var, join(var, dirs)?);
    }

    vars.set(PATH_VAR, search_path);

    Ok(ChildEnvironment { vars, unset })
}

fn join(var: &str, dirs: Vec<std::path::PathBuf>) -> Result<OsString, LaunchError> {
    std::env::join_paths(dirs).map_err(|source| LaunchError::JoinPaths {
        var: var.to_string(),
        source,
    })
}
