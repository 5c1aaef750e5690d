//! Absolute locations inside an installation root.

use apprun_schema::LauncherManifest;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

/// An installation root paired with the manifest describing it.
///
/// Every path handed out is `root` joined with a manifest template, so it is
/// absolute whenever `root` is, and never influenced by the inherited
/// environment.
#[derive(Debug, Clone, Copy)]
pub struct InstallLayout<'a> {
    root: &'a Path,
    manifest: &'a LauncherManifest,
}

impl<'a> InstallLayout<'a> {
    /// Pair `root` with its manifest.
    pub fn new(root: &'a Path, manifest: &'a LauncherManifest) -> Self {
        Self { root, manifest }
    }

    /// The installation root.
    pub fn root(&self) -> &'a Path {
        self.root
    }

    /// The manifest.
    pub fn manifest(&self) -> &'a LauncherManifest {
        self.manifest
    }

    /// `<root>/<bin_dir>`.
    pub fn bin_dir(&self) -> PathBuf {
        self.join_template(&self.manifest.bin_dir)
    }

    /// Absolute path of the named binary under the bin directory.
    pub fn tool_path(&self, binary: &str) -> PathBuf {
        self.bin_dir().join(binary)
    }

    /// Bundled shared-library directories, in manifest order.
    pub fn library_dirs(&self) -> Vec<PathBuf> {
        self.manifest
            .library_dirs
            .iter()
            .map(|t| self.join_template(t))
            .collect()
    }

    /// Absolute path of the portable dump, if the manifest declares one.
    pub fn dump_path(&self) -> Option<PathBuf> {
        self.manifest
            .dump
            .as_ref()
            .map(|dump| self.join_template(&dump.path))
    }

    /// Auxiliary data variables and their absolute directories.
    pub fn data_paths(&self) -> BTreeMap<&'a str, Vec<PathBuf>> {
        self.manifest
            .data_paths
            .iter()
            .map(|(var, templates)| {
                let dirs = templates.iter().map(|t| self.join_template(t)).collect();
                (var.as_str(), dirs)
            })
            .collect()
    }

    /// Manifest extra directories; relative entries are taken from the root.
    pub fn extra_dirs(&self) -> Vec<PathBuf> {
        self.manifest
            .search_path
            .extra_dirs
            .iter()
            .map(|dir| {
                if dir.is_absolute() {
                    dir.clone()
                } else {
                    self.root.join(dir)
                }
            })
            .collect()
    }

    fn join_template(&self, template: &str) -> PathBuf {
        self.root.join(self.manifest.expand(template))
    }
}
