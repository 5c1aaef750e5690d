//! Shared types for the AppRun launcher.
//!
//! The launcher and the inspection tool agree on three things: the
//! [`LauncherManifest`] describing the embedded layout of an installation
//! root, the [`ArchTriple`] that versioned support directories are keyed by,
//! and the catalogue of version managers ([`ShimManager`]) whose shim
//! directories must never leak into the child's search path.

pub mod manifest;
pub mod policy;
pub mod shim;
pub mod triple;

// Re-exports
pub use manifest::{
    Alternate, DumpSpec, LauncherManifest, MANIFEST_FILE, ManifestError, SearchPathSpec,
};
pub use policy::PathPolicy;
pub use shim::ShimManager;
pub use triple::ArchTriple;

/// Separator between entries of a path-list variable such as `PATH`.
#[cfg(windows)]
pub const PATH_LIST_SEPARATOR: &str = ";";

/// Separator between entries of a path-list variable such as `PATH`.
#[cfg(not(windows))]
pub const PATH_LIST_SEPARATOR: &str = ":";
