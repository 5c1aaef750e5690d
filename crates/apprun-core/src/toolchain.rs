//! Locating the host's native compiler toolchain.
//!
//! Native compilation in the bundled editor shells out to a compiler driver,
//! assembler and linker that are not bundled. Their directories are found on
//! the non-shim part of the inherited `PATH`, then resolved through symlinks
//! so that the directory added to the child's search path is where the
//! program really lives.

use crate::probe::Probe;
use crate::search_path::SearchPath;
use apprun_schema::ShimManager;
use std::path::{Path, PathBuf};

/// Real directories of `programs`, in program order, without duplicates.
///
/// `candidates` are the directories searched (already stripped of shim
/// directories). A program whose resolved location is a shim directory, or
/// lies inside `root`, contributes nothing.
pub fn detect_dirs<P: Probe>(
    probe: &P,
    programs: &[String],
    candidates: &[PathBuf],
    root: &Path,
) -> Vec<PathBuf> {
    let mut found = SearchPath::new();
    for program in programs {
        let Some(hit) = probe.find_program(program, candidates) else {
            tracing::debug!("Toolchain program {program} not found on host PATH");
            continue;
        };
        let real = probe.canonicalize(&hit).unwrap_or_else(|| hit.clone());
        let Some(dir) = real.parent() else {
            continue;
        };
        if let Some(manager) = ShimManager::detect(dir) {
            tracing::warn!(
                "Ignoring {program}: {} resolves into {manager} shims at {}",
                hit.display(),
                dir.display()
            );
            continue;
        }
        if dir.starts_with(root) {
            continue;
        }
        tracing::debug!("Toolchain program {program} found in {}", dir.display());
        found.push(dir);
    }
    found.entries().to_vec()
}
