//! From an invocation to a complete launch plan.
//!
//! Resolution is a function of the installation root, the invocation and the
//! inherited environment; the filesystem is only read through a [`Probe`].
//! Running it twice on the same inputs yields the same [`LaunchPlan`].

use crate::env::EnvMap;
use crate::environment::{self, ChildEnvironment, PATH_VAR};
use crate::error::LaunchError;
use crate::invocation::Invocation;
use crate::layout::InstallLayout;
use crate::probe::Probe;
use crate::search_path;
use crate::target::{self, TargetKind};
use crate::toolchain;
use apprun_schema::{LauncherManifest, PathPolicy};
use std::ffi::OsString;
use std::path::{Path, PathBuf};

/// Overrides the search-path policy at run time.
pub const POLICY_VAR: &str = "APPRUN_PATH_POLICY";

/// Extra directories supplied by the caller, in path-list syntax.
pub const EXTRA_PATH_VAR: &str = "APPRUN_EXTRA_PATH";

/// Run-time knobs layered over the manifest.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolveOptions {
    /// Treatment of the inherited `PATH`.
    pub policy: PathPolicy,
    /// Caller-supplied directories placed after the manifest's extra dirs.
    pub extra_dirs: Vec<PathBuf>,
    /// Whether to look for the manifest's toolchain programs on the host.
    pub detect_toolchain: bool,
}

impl ResolveOptions {
    /// Options taken from the manifest alone.
    pub fn from_manifest(manifest: &LauncherManifest) -> Self {
        Self {
            policy: manifest.search_path.policy,
            extra_dirs: Vec::new(),
            detect_toolchain: true,
        }
    }

    /// Manifest options overridden by `APPRUN_PATH_POLICY` and
    /// `APPRUN_EXTRA_PATH` from `env`.
    ///
    /// # Errors
    ///
    /// Returns [`LaunchError::Override`] if `APPRUN_PATH_POLICY` names an
    /// unknown policy.
    pub fn from_env(manifest: &LauncherManifest, env: &EnvMap) -> Result<Self, LaunchError> {
        let mut options = Self::from_manifest(manifest);
        if let Some(raw) = env.get_non_empty(POLICY_VAR) {
            options.policy = raw
                .to_string_lossy()
                .parse()
                .map_err(|reason| LaunchError::Override {
                    var: POLICY_VAR,
                    reason,
                })?;
        }
        if let Some(raw) = env.get_non_empty(EXTRA_PATH_VAR) {
            options.extra_dirs = std::env::split_paths(raw)
                .filter(|p| !p.as_os_str().is_empty())
                .collect();
        }
        Ok(options)
    }
}

/// Everything needed to replace the process with the target.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LaunchPlan {
    /// Absolute path of the binary to execute.
    pub target: PathBuf,
    /// Which selection rule chose it.
    pub kind: TargetKind,
    /// Arguments after `argv[0]`.
    pub args: Vec<OsString>,
    /// The complete child environment.
    pub env: EnvMap,
    /// Inherited variables removed from the environment.
    pub unset: Vec<OsString>,
    /// Search-path policy that was applied.
    pub policy: PathPolicy,
}

/// Resolves invocations against one installation root.
#[derive(Debug)]
pub struct Resolver<'a, P: Probe> {
    layout: InstallLayout<'a>,
    probe: &'a P,
    options: ResolveOptions,
}

impl<'a, P: Probe> Resolver<'a, P> {
    /// Create a resolver with options taken from the manifest.
    pub fn new(root: &'a Path, manifest: &'a LauncherManifest, probe: &'a P) -> Self {
        Self {
            layout: InstallLayout::new(root, manifest),
            probe,
            options: ResolveOptions::from_manifest(manifest),
        }
    }

    /// Replace the run-time options.
    pub fn with_options(mut self, options: ResolveOptions) -> Self {
        self.options = options;
        self
    }

    /// The layout being resolved against.
    pub fn layout(&self) -> &InstallLayout<'a> {
        &self.layout
    }

    /// Work out target, arguments and environment.
    ///
    /// # Errors
    ///
    /// Returns [`LaunchError::TargetNotFound`] if the selected binary does
    /// not exist under the root (there is no fallback to a host binary), or
    /// [`LaunchError::JoinPaths`] if a path list cannot be assembled.
    pub fn resolve(
        &self,
        invocation: &Invocation,
        inherited: &EnvMap,
    ) -> Result<LaunchPlan, LaunchError> {
        let manifest = self.layout.manifest();
        let selection = target::select(manifest, invocation);

        let target = self.layout.tool_path(&selection.binary);
        if !self.probe.is_file(&target) {
            return Err(LaunchError::TargetNotFound(target));
        }

        let mut args = selection.args;
        if selection.kind == TargetKind::Default {
            self.add_dump_flag(&mut args);
        }

        let search_path = self.search_path(inherited)?;
        let ChildEnvironment { vars, unset } =
            environment::build(&self.layout, self.options.policy, search_path, inherited)?;

        Ok(LaunchPlan {
            target,
            kind: selection.kind,
            args,
            env: vars,
            unset,
            policy: self.options.policy,
        })
    }

    fn search_path(&self, inherited: &EnvMap) -> Result<OsString, LaunchError> {
        let inherited_path = inherited.get(PATH_VAR);

        let mut leading = vec![self.layout.bin_dir()];
        leading.extend(self.layout.extra_dirs());
        leading.extend(self.options.extra_dirs.iter().cloned());
        if self.options.detect_toolchain {
            let candidates = search_path::usable_entries(inherited_path);
            leading.extend(toolchain::detect_dirs(
                self.probe,
                &self.layout.manifest().search_path.toolchain,
                &candidates,
                self.layout.root(),
            ));
        }

        search_path::build(
            self.options.policy,
            &leading,
            inherited_path,
            &self.layout.manifest().search_path.system_dirs,
        )
        .map_err(|source| LaunchError::JoinPaths {
            var: PATH_VAR.to_string(),
            source,
        })
    }

    // The flag goes first so that it is seen before any file arguments. A
    // caller-supplied dump flag is respected and nothing is added.
    fn add_dump_flag(&self, args: &mut Vec<OsString>) {
        let Some(dump) = self.layout.manifest().dump.as_ref() else {
            return;
        };
        let Some(path) = self.layout.dump_path() else {
            return;
        };
        if !self.probe.is_file(&path) {
            tracing::debug!("No dump file at {}", path.display());
            return;
        }
        let prefixed = format!("{}=", dump.flag);
        let already_given = args.iter().any(|a| {
            a.to_str()
                .is_some_and(|a| a == dump.flag || a.starts_with(&prefixed))
        });
        if already_given {
            tracing::debug!("Caller passed {} already", dump.flag);
            return;
        }
        let mut flag = OsString::from(prefixed);
        flag.push(path.as_os_str());
        args.insert(0, flag);
    }
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;
    use crate::environment::LIBRARY_PATH_VAR;
    use crate::probe::fake::FakeProbe;
    use apprun_schema::{Alternate, DumpSpec};
    use std::collections::BTreeMap;

    fn os(items: &[&str]) -> Vec<OsString> {
        items.iter().map(OsString::from).collect()
    }

    /// The `/opt/app` layout used in the launcher's documented scenarios.
    fn app_manifest() -> LauncherManifest {
        let mut m = LauncherManifest::emacs();
        m.name = "app".to_string();
        m.version = "1.0".to_string();
        m.triple = "x86_64-pc-linux-gnu".parse().unwrap();
        m.default_tool = "app".to_string();
        m.alternates = vec![Alternate {
            prefix: "app-client".to_string(),
            binary: "app-client-real".to_string(),
        }];
        m.subtools = vec!["tool-x".to_string()];
        m.dump = Some(DumpSpec {
            path: "libexec/{version}/{triple}/app.dump".to_string(),
            flag: "--dump-file".to_string(),
        });
        m.data_paths = BTreeMap::from([(
            "APPDATA".to_string(),
            vec!["share/{name}/{version}".to_string()],
        )]);
        m.search_path.toolchain = Vec::new();
        m
    }

    const DUMP: &str = "/opt/app/libexec/1.0/x86_64-pc-linux-gnu/app.dump";

    fn probe() -> FakeProbe {
        FakeProbe::new()
            .with_file("/opt/app/bin/app")
            .with_file("/opt/app/bin/app-client-real")
            .with_file("/opt/app/bin/tool-x")
    }

    fn host() -> EnvMap {
        [("PATH", "/usr/bin:/home/u/.asdf/shims"), ("APPDATA", "/host")]
            .into_iter()
            .collect()
    }

    #[test]
    fn test_alternate_tool_scenario() {
        let m = app_manifest();
        let p = probe().with_file(DUMP);
        let plan = Resolver::new(Path::new("/opt/app"), &m, &p)
            .resolve(&Invocation::new("app-client", ["--connect"]), &host())
            .unwrap();
        assert_eq!(plan.target, Path::new("/opt/app/bin/app-client-real"));
        assert_eq!(plan.kind, TargetKind::Alternate);
        // Dump flag is only for the default tool.
        assert_eq!(plan.args, os(&["--connect"]));
    }

    #[test]
    fn test_subtool_scenario() {
        let m = app_manifest();
        let p = probe();
        let plan = Resolver::new(Path::new("/opt/app"), &m, &p)
            .resolve(&Invocation::new("app", ["tool-x", "--flag"]), &host())
            .unwrap();
        assert_eq!(plan.target, Path::new("/opt/app/bin/tool-x"));
        assert_eq!(plan.kind, TargetKind::SubTool);
        assert_eq!(plan.args, os(&["--flag"]));
    }

    #[test]
    fn test_dump_scenario() {
        let m = app_manifest();
        let p = probe().with_file(DUMP);
        let plan = Resolver::new(Path::new("/opt/app"), &m, &p)
            .resolve(&Invocation::new("app", ["file.txt"]), &host())
            .unwrap();
        let flag = format!("--dump-file={DUMP}");
        assert_eq!(plan.target, Path::new("/opt/app/bin/app"));
        assert_eq!(plan.args, os(&[flag.as_str(), "file.txt"]));
    }

    #[test]
    fn test_no_dump_no_flag() {
        let m = app_manifest();
        let p = probe();
        let plan = Resolver::new(Path::new("/opt/app"), &m, &p)
            .resolve(&Invocation::new("app", ["file.txt"]), &host())
            .unwrap();
        assert_eq!(plan.args, os(&["file.txt"]));
    }

    #[test]
    fn test_dump_flag_appears_once() {
        let m = app_manifest();
        let p = probe().with_file(DUMP);
        let resolver = Resolver::new(Path::new("/opt/app"), &m, &p);
        for args in [&["--dump-file=/tmp/other.pdmp", "x"][..], &["--dump-file", "/tmp/o"]] {
            let plan = resolver
                .resolve(&Invocation::new("app", args.iter().copied()), &host())
                .unwrap();
            let count = plan
                .args
                .iter()
                .filter(|a| a.to_string_lossy().starts_with("--dump-file"))
                .count();
            assert_eq!(count, 1, "{args:?}");
            assert_eq!(plan.args, os(args));
        }
    }

    #[test]
    fn test_missing_target_is_fatal() {
        let m = app_manifest();
        let p = FakeProbe::new();
        let err = Resolver::new(Path::new("/opt/app"), &m, &p)
            .resolve(&Invocation::new("app", ["file.txt"]), &host())
            .unwrap_err();
        match err {
            LaunchError::TargetNotFound(path) => assert_eq!(path, Path::new("/opt/app/bin/app")),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_environment_is_rooted_and_sanitized() {
        let m = app_manifest();
        let p = probe();
        let plan = Resolver::new(Path::new("/opt/app"), &m, &p)
            .resolve(&Invocation::new("app", Vec::<String>::new()), &host())
            .unwrap();
        assert_eq!(plan.env.get("APPDATA").unwrap(), "/opt/app/share/app/1.0");
        assert_eq!(plan.env.get(LIBRARY_PATH_VAR).unwrap(), "/opt/app/lib");
        assert_eq!(
            plan.env.get("PATH").unwrap(),
            "/opt/app/bin:/usr/bin:/usr/local/sbin:/usr/local/bin:/usr/sbin:/sbin:/bin"
        );
        assert_eq!(plan.policy, PathPolicy::Sanitize);
    }

    #[test]
    fn test_toolchain_and_extra_dirs_follow_bin() {
        let mut m = app_manifest();
        m.search_path.toolchain = vec!["gcc".to_string()];
        m.search_path.system_dirs = Vec::new();
        let p = probe().with_link("/usr/bin/gcc", "/opt/gcc-14/bin/gcc");
        let options = ResolveOptions {
            extra_dirs: vec![PathBuf::from("/srv/tools")],
            ..ResolveOptions::from_manifest(&m)
        };
        let plan = Resolver::new(Path::new("/opt/app"), &m, &p)
            .with_options(options)
            .resolve(&Invocation::new("app", Vec::<String>::new()), &host())
            .unwrap();
        assert_eq!(
            plan.env.get("PATH").unwrap(),
            "/opt/app/bin:/srv/tools:/opt/gcc-14/bin:/usr/bin"
        );
    }

    #[test]
    fn test_child_env_does_not_steer_nested_launch() {
        let m = app_manifest();
        let p = probe();
        let resolver = Resolver::new(Path::new("/opt/app"), &m, &p);
        let mut inherited = host();
        inherited.set("ARGV0", "/home/u/Emacs.AppImage");

        let outer = Invocation::from_argv(["/tmp/.mount_app/AppRun".into()], &inherited);
        let plan = resolver.resolve(&outer, &inherited).unwrap();
        assert_eq!(plan.env.get("ARGV0"), None);
        assert!(plan.unset.iter().any(|v| v == "ARGV0"));

        // A client link run from inside the session sees the child env.
        let nested = Invocation::from_argv(
            ["/home/u/bin/app-client".into(), "-c".into()],
            &plan.env,
        );
        let plan = resolver.resolve(&nested, &plan.env).unwrap();
        assert_eq!(plan.kind, TargetKind::Alternate);
        assert_eq!(plan.target, Path::new("/opt/app/bin/app-client-real"));
    }

    #[test]
    fn test_disabled_dump_adds_no_flag() {
        let mut m = app_manifest();
        m.dump = None;
        let p = probe().with_file(DUMP);
        let plan = Resolver::new(Path::new("/opt/app"), &m, &p)
            .resolve(&Invocation::new("app", ["file.txt"]), &host())
            .unwrap();
        assert_eq!(plan.args, os(&["file.txt"]));
    }

    #[test]
    fn test_resolution_is_idempotent() {
        let m = app_manifest();
        let p = probe().with_file(DUMP);
        let resolver = Resolver::new(Path::new("/opt/app"), &m, &p);
        let inv = Invocation::new("app", ["a", "b"]);
        let env = host();
        assert_eq!(resolver.resolve(&inv, &env).unwrap(), resolver.resolve(&inv, &env).unwrap());
    }

    #[test]
    fn test_options_from_env() {
        let m = app_manifest();
        let env: EnvMap = [
            (POLICY_VAR, "preserve"),
            (EXTRA_PATH_VAR, "/opt/a::/opt/b"),
        ]
        .into_iter()
        .collect();
        let options = ResolveOptions::from_env(&m, &env).unwrap();
        assert_eq!(options.policy, PathPolicy::Preserve);
        assert_eq!(
            options.extra_dirs,
            [PathBuf::from("/opt/a"), PathBuf::from("/opt/b")]
        );

        let bad: EnvMap = [(POLICY_VAR, "yolo")].into_iter().collect();
        assert!(matches!(
            ResolveOptions::from_env(&m, &bad),
            Err(LaunchError::Override { .. })
        ));
    }
}
