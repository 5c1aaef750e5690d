//! Choosing which bundled binary an invocation means.

use crate::invocation::Invocation;
use apprun_schema::LauncherManifest;
use std::ffi::OsString;

/// Why a binary was selected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TargetKind {
    /// The invoked name starts with an alternate-tool prefix.
    Alternate,
    /// The first argument named a sub-tool and was consumed.
    SubTool,
    /// Nothing else matched: the main editor.
    Default,
}

impl TargetKind {
    /// Lowercase label for reports.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Alternate => "alternate",
            Self::SubTool => "subtool",
            Self::Default => "default",
        }
    }
}

impl std::fmt::Display for TargetKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The chosen binary and the arguments it receives.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Selection {
    /// Which rule matched.
    pub kind: TargetKind,
    /// Binary name under the manifest's bin directory.
    pub binary: String,
    /// Arguments to forward (the sub-tool name removed, nothing added yet).
    pub args: Vec<OsString>,
}

/// Apply the selection rules, first match wins:
///
/// 1. invoked name starts with an alternate prefix (longest prefix wins when
///    several match);
/// 2. the first argument equals a sub-tool name, which is then dropped;
/// 3. the default tool.
pub fn select(manifest: &LauncherManifest, invocation: &Invocation) -> Selection {
    let invoked = invocation.invoked_name_lossy();

    let alternate = manifest
        .alternates
        .iter()
        .filter(|a| invoked.starts_with(&a.prefix))
        .max_by_key(|a| a.prefix.len());
    if let Some(alternate) = alternate {
        tracing::debug!(
            "Invoked as {invoked:?}: alternate tool {} (prefix {:?})",
            alternate.binary,
            alternate.prefix
        );
        return Selection {
            kind: TargetKind::Alternate,
            binary: alternate.binary.clone(),
            args: invocation.args.clone(),
        };
    }

    if let Some((first, rest)) = invocation.args.split_first() {
        if let Some(subtool) = manifest.subtools.iter().find(|s| first == s.as_str()) {
            tracing::debug!("Leading argument selects sub-tool {subtool}");
            return Selection {
                kind: TargetKind::SubTool,
                binary: subtool.clone(),
                args: rest.to_vec(),
            };
        }
    }

    tracing::debug!("Using default tool {}", manifest.default_tool);
    Selection {
        kind: TargetKind::Default,
        binary: manifest.default_tool.clone(),
        args: invocation.args.clone(),
    }
}
