//! Verify an installation root against its manifest.

use anyhow::{Result, bail};
use apprun_core::{HostProbe, InstallLayout, Probe};
use std::path::{Path, PathBuf};

struct Entry {
    label: String,
    path: PathBuf,
    present: bool,
}

impl Entry {
    fn to_json(&self) -> serde_json::Value {
        serde_json::json!({
            "name": self.label,
            "path": self.path.display().to_string(),
            "present": self.present,
        })
    }
}

/// Report every declared tool, the dump file and each data directory.
///
/// The dump file and data directories are informational; only missing
/// tools make the check fail.
///
/// # Errors
///
/// Fails if the manifest cannot be loaded or any declared tool binary is
/// missing.
pub fn check(root: &Path, json: bool) -> Result<()> {
    let manifest = super::load_manifest(root)?;
    let layout = InstallLayout::new(root, &manifest);
    let probe = HostProbe;

    let tools: Vec<Entry> = manifest
        .tool_names()
        .into_iter()
        .map(|name| {
            let path = layout.tool_path(name);
            Entry {
                label: name.to_string(),
                present: probe.is_file(&path),
                path,
            }
        })
        .collect();

    let dump = layout.dump_path().map(|path| Entry {
        label: "dump".to_string(),
        present: probe.is_file(&path),
        path,
    });

    let data: Vec<Entry> = layout
        .data_paths()
        .into_iter()
        .flat_map(|(var, dirs)| {
            dirs.into_iter().map(move |path| Entry {
                label: var.to_string(),
                present: path.is_dir(),
                path,
            })
        })
        .collect();

    if json {
        let report = serde_json::json!({
            "root": root.display().to_string(),
            "tools": tools.iter().map(Entry::to_json).collect::<Vec<_>>(),
            "dump": dump.as_ref().map(Entry::to_json),
            "data_paths": data.iter().map(Entry::to_json).collect::<Vec<_>>(),
        });
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        println!("Installation root: {}", root.display());
        println!("Tools:");
        tools.iter().for_each(print_entry);
        if let Some(dump) = &dump {
            println!("Dump:");
            print_entry(dump);
        }
        println!("Data paths:");
        data.iter().for_each(print_entry);
    }

    let missing: Vec<&str> = tools
        .iter()
        .filter(|t| !t.present)
        .map(|t| t.label.as_str())
        .collect();
    if !missing.is_empty() {
        bail!("Missing bundled tools: {}", missing.join(", "));
    }
    Ok(())
}

fn print_entry(entry: &Entry) {
    let status = if entry.present { "ok" } else { "missing" };
    println!("  {status:<8} {:<16} {}", entry.label, entry.path.display());
}
