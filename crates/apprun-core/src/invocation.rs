//! How the launcher was called.

use crate::env::EnvMap;
use std::ffi::{OsStr, OsString};
use std::path::Path;

/// Variable the AppImage runtime sets to the original `argv[0]`.
///
/// When the launcher runs from a mounted AppImage its own `argv[0]` is the
/// path inside the mount, so the name the user typed (or the symlink they
/// went through) is only available here.
pub const APPIMAGE_ARGV0_VAR: &str = "ARGV0";

/// The name the launcher was invoked as plus its arguments.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Invocation {
    /// Base name of `argv[0]` (or of `$ARGV0` under an AppImage runtime).
    pub invoked_name: OsString,
    /// Arguments after `argv[0]`.
    pub args: Vec<OsString>,
}

impl Invocation {
    /// Build an invocation from an already-extracted name and arguments.
    pub fn new<I, A>(invoked_name: impl Into<OsString>, args: I) -> Self
    where
        I: IntoIterator<Item = A>,
        A: Into<OsString>,
    {
        Self {
            invoked_name: invoked_name.into(),
            args: args.into_iter().map(Into::into).collect(),
        }
    }

    /// Split a full argument vector, preferring `$ARGV0` for the name.
    pub fn from_argv<I>(argv: I, env: &EnvMap) -> Self
    where
        I: IntoIterator<Item = OsString>,
    {
        let mut argv = argv.into_iter();
        let argv0 = argv.next().unwrap_or_default();
        let name_source = env
            .get_non_empty(APPIMAGE_ARGV0_VAR)
            .unwrap_or(argv0.as_os_str());
        Self {
            invoked_name: base_name(name_source),
            args: argv.collect(),
        }
    }

    /// The invocation of the current process.
    pub fn from_host(env: &EnvMap) -> Self {
        Self::from_argv(std::env::args_os(), env)
    }

    /// The invoked name as text, for prefix matching.
    pub fn invoked_name_lossy(&self) -> String {
        self.invoked_name.to_string_lossy().into_owned()
    }
}

fn base_name(s: &OsStr) -> OsString {
    Path::new(s)
        .file_name()
        .map_or_else(|| s.to_os_string(), OsStr::to_os_string)
}
