//! Entry points of the Emacs AppImage launcher.
//!
//! Two binaries are built from this crate:
//!
//! - `apprun`, installed as `AppRun` at the root of the image, which resolves
//!   the invocation and replaces itself with the bundled tool;
//! - `apprun-inspect`, which performs the same resolution and prints it
//!   instead of launching anything.

pub mod cmd;
pub mod logging;

use apprun_core::locate;
use apprun_core::{EnvMap, HostProbe, Invocation, LaunchError, LaunchPlan, ResolveOptions, Resolver};
use apprun_schema::{LauncherManifest, PathPolicy};
use clap::{Parser, Subcommand};
use std::ffi::OsString;
use std::path::PathBuf;

/// Version reported by both binaries, derived from git tags at build time.
pub const VERSION: &str = env!("APPRUN_VERSION");

/// Resolve the current process's invocation against its own installation
/// root, with the host environment and filesystem.
///
/// # Errors
///
/// Returns the first [`LaunchError`] hit while locating the root, loading
/// the manifest, reading overrides or resolving the target.
pub fn host_plan() -> Result<LaunchPlan, LaunchError> {
    let env = EnvMap::from_host();
    let invocation = Invocation::from_host(&env);
    let root = locate::install_root()?;
    let manifest = LauncherManifest::load(&root)?;
    let options = ResolveOptions::from_env(&manifest, &env)?;
    Resolver::new(&root, &manifest, &HostProbe)
        .with_options(options)
        .resolve(&invocation, &env)
}

/// Command line of `apprun-inspect`.
#[derive(Debug, Parser)]
#[command(name = "apprun-inspect")]
#[command(version = VERSION, about = "Inspect how the AppRun launcher resolves an invocation")]
pub struct InspectCli {
    /// Installation root (defaults to the directory holding this executable)
    #[arg(long, global = true, env = "APPRUN_ROOT")]
    pub root: Option<PathBuf>,

    /// Print machine-readable JSON instead of text
    #[arg(long, global = true)]
    pub json: bool,

    /// What to inspect
    #[command(subcommand)]
    pub command: InspectCommand,
}

/// Subcommands of `apprun-inspect`.
#[derive(Debug, Subcommand)]
pub enum InspectCommand {
    /// Show the target, arguments and environment a launch would use
    Plan {
        /// Name to resolve as, as if invoked through a symlink of that name
        #[arg(long = "as", default_value = "AppRun")]
        invoked_as: OsString,
        /// Override the search-path policy (sanitize or preserve)
        #[arg(long)]
        policy: Option<PathPolicy>,
        /// Extra directory placed after the bundled bin directory
        #[arg(long = "extra-path", value_name = "DIR")]
        extra_paths: Vec<PathBuf>,
        /// Arguments the launcher would receive
        #[arg(trailing_var_arg = true, allow_hyphen_values = true)]
        args: Vec<OsString>,
    },
    /// Verify that every bundled tool and data directory is present
    Check,
    /// Print the effective manifest
    Manifest,
}

impl InspectCli {
    /// The installation root to inspect.
    ///
    /// # Errors
    ///
    /// Fails if no `--root` was given and the executable cannot be located.
    pub fn install_root(&self) -> anyhow::Result<PathBuf> {
        match &self.root {
            Some(root) => Ok(root.clone()),
            None => Ok(locate::install_root()?),
        }
    }
}
