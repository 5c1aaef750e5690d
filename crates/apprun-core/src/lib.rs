//! Launch logic for a relocatable Emacs bundle.
//!
//! The launcher sits at the root of an extracted or mounted AppImage. For
//! every start it:
//!
//! 1. locates its own root ([`locate::install_root`]);
//! 2. loads the layout description ([`LauncherManifest`](apprun_schema::LauncherManifest));
//! 3. picks the binary the invocation means ([`target::select`]);
//! 4. derives a sanitized environment ([`environment::build`]) with a
//!    search path free of version-manager shims ([`search_path::build`]);
//! 5. replaces itself with the target ([`LaunchPlan::launch`]).
//!
//! Steps 3 and 4 are pure apart from read-only [`Probe`] queries, so a
//! [`LaunchPlan`] can be computed and inspected without launching anything.

pub mod env;
pub mod environment;
pub mod error;
pub mod invocation;
pub mod launch;
pub mod layout;
pub mod locate;
pub mod probe;
pub mod resolver;
pub mod search_path;
pub mod target;
pub mod toolchain;

pub use env::EnvMap;
pub use error::{EXIT_EXEC_FAILED, EXIT_FAILURE, EXIT_NOT_FOUND, LaunchError};
pub use invocation::Invocation;
pub use layout::InstallLayout;
pub use probe::{HostProbe, Probe};
pub use resolver::{LaunchPlan, ResolveOptions, Resolver};
pub use target::TargetKind;
