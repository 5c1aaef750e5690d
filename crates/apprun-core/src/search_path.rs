//! Construction of the child's `PATH`.
//!
//! Order under [`PathPolicy::Sanitize`]:
//!
//! 1. the bundled `bin` directory;
//! 2. extra directories (manifest, caller, detected toolchain);
//! 3. the inherited `PATH` without empty entries, shim directories and
//!    entries already listed;
//! 4. the standard system directories not already listed.
//!
//! Under [`PathPolicy::Preserve`] steps 1 and 2 are followed by the inherited
//! value exactly as it was.

use apprun_schema::{PATH_LIST_SEPARATOR, PathPolicy, ShimManager};
use std::ffi::{OsStr, OsString};
use std::path::PathBuf;

/// Inherited entries usable for lookups: no empty entries, no shim
/// directories. Duplicates are kept; callers deduplicate on insertion.
pub fn usable_entries(inherited: Option<&OsStr>) -> Vec<PathBuf> {
    let Some(inherited) = inherited else {
        return Vec::new();
    };
    std::env::split_paths(inherited)
        .filter(|entry| {
            if entry.as_os_str().is_empty() {
                tracing::trace!("Dropping empty PATH entry");
                return false;
            }
            if let Some(manager) = ShimManager::detect(entry) {
                tracing::trace!("Dropping {manager} shim directory {}", entry.display());
                return false;
            }
            true
        })
        .collect()
}

/// An ordered list of directories without duplicates.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SearchPath {
    entries: Vec<PathBuf>,
}

impl SearchPath {
    /// Start with no entries.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append `dir` unless an equal entry is already present.
    pub fn push(&mut self, dir: impl Into<PathBuf>) {
        let dir = dir.into();
        if !self.entries.contains(&dir) {
            self.entries.push(dir);
        }
    }

    /// Append every directory of `dirs`, skipping duplicates.
    pub fn extend<I>(&mut self, dirs: I)
    where
        I: IntoIterator,
        I::Item: Into<PathBuf>,
    {
        for dir in dirs {
            self.push(dir);
        }
    }

    /// The entries in order.
    pub fn entries(&self) -> &[PathBuf] {
        &self.entries
    }

    /// Join into a path-list value.
    ///
    /// # Errors
    ///
    /// Fails if an entry contains the path-list separator.
    pub fn join(&self) -> Result<OsString, std::env::JoinPathsError> {
        std::env::join_paths(&self.entries)
    }
}

/// Assemble the child's `PATH` value.
///
/// `leading` holds the bundled `bin` directory followed by every extra
/// directory; `inherited` is the host `PATH`.
///
/// # Errors
///
/// Fails if an entry contains the path-list separator.
pub fn build(
    policy: PathPolicy,
    leading: &[PathBuf],
    inherited: Option<&OsStr>,
    system_dirs: &[PathBuf],
) -> Result<OsString, std::env::JoinPathsError> {
    let mut path = SearchPath::new();
    path.extend(leading.iter().cloned());

    match policy {
        PathPolicy::Sanitize => {
            path.extend(usable_entries(inherited));
            path.extend(system_dirs.iter().cloned());
            path.join()
        }
        PathPolicy::Preserve => {
            let joined = path.join()?;
            Ok(prepend_list(joined, inherited))
        }
    }
}

/// `prefix` followed by `inherited`, separated only when both are non-empty.
pub fn prepend_list(prefix: OsString, inherited: Option<&OsStr>) -> OsString {
    match inherited.filter(|v| !v.is_empty()) {
        Some(rest) if !prefix.is_empty() => {
            let mut value = prefix;
            value.push(PATH_LIST_SEPARATOR);
            value.push(rest);
            value
        }
        Some(rest) => rest.to_os_string(),
        None => prefix,
    }
}
