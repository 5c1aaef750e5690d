//! Print the effective manifest.

use anyhow::{Context, Result};
use std::path::Path;

/// Print the manifest in effect for `root` (preset plus `apprun.toml`), as
/// TOML or JSON.
///
/// # Errors
///
/// Fails if the manifest cannot be loaded or rendered.
pub fn manifest(root: &Path, json: bool) -> Result<()> {
    let manifest = super::load_manifest(root)?;
    if json {
        println!("{}", serde_json::to_string_pretty(&manifest)?);
    } else {
        let rendered = manifest.to_toml().context("Failed to render manifest")?;
        print!("{rendered}");
    }
    Ok(())
}
