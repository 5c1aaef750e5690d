//! Subcommands of `apprun-inspect`.

pub mod check;
pub mod manifest;
pub mod plan;

use anyhow::{Context, Result};
use apprun_schema::LauncherManifest;
use std::path::Path;

fn load_manifest(root: &Path) -> Result<LauncherManifest> {
    LauncherManifest::load(root)
        .with_context(|| format!("Failed to load manifest for {}", root.display()))
}
