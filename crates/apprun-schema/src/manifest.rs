//! Launcher manifest (`apprun.toml`).
//!
//! The manifest describes the embedded layout of an installation root: which
//! binaries exist, which variables point into `share/` and `libexec/`, where
//! the portable dump lives and how the search path is built. The launcher
//! ships with an Emacs preset ([`LauncherManifest::emacs`]); a packaging
//! pipeline may place an `apprun.toml` next to the launcher to override any
//! subset of it.
//!
//! Path templates are relative to the installation root and may use the
//! `{name}`, `{version}` and `{triple}` placeholders:
//!
//! ```toml
//! version = "29.4"
//! subtools = ["emacsclient", "etags"]
//!
//! [dump]
//! path = "libexec/{name}/{version}/{triple}/emacs.pdmp"
//!
//! [data_paths]
//! EMACSLOADPATH = ["share/{name}/{version}/lisp", "share/{name}/site-lisp"]
//!
//! [search_path]
//! policy = "preserve"
//! ```
//!
//! A bundle built without a portable dump sets `dump = false`.

use crate::{ArchTriple, PathPolicy};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Component, Path, PathBuf};

/// File name of the manifest inside an installation root.
pub const MANIFEST_FILE: &str = "apprun.toml";

/// Version baked into the Emacs preset. Packaging builds set
/// `APPRUN_EMACS_VERSION` so the preset matches the bundled tree.
const PRESET_VERSION: &str = match option_env!("APPRUN_EMACS_VERSION") {
    Some(v) => v,
    None => "30.1",
};

/// Errors raised while loading or validating a [`LauncherManifest`].
#[derive(thiserror::Error, Debug)]
pub enum ManifestError {
    /// The manifest file exists but could not be read.
    #[error("Failed to read {}: {source}", path.display())]
    Io {
        /// Path of the manifest file.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// The manifest file is not valid TOML for the manifest schema.
    #[error("Failed to parse {}: {source}", path.display())]
    Parse {
        /// Path of the manifest file.
        path: PathBuf,
        /// Underlying TOML error.
        #[source]
        source: toml::de::Error,
    },

    /// A field holds a value the launcher cannot use.
    #[error("Invalid manifest field `{field}`: {reason}")]
    Invalid {
        /// Name of the offending field.
        field: String,
        /// Why the value was rejected.
        reason: String,
    },
}

impl ManifestError {
    fn invalid(field: impl Into<String>, reason: impl std::fmt::Display) -> Self {
        Self::Invalid {
            field: field.into(),
            reason: reason.to_string(),
        }
    }
}

/// Effective description of an installation root.
///
/// Scalar and list fields come first so that the TOML rendering keeps plain
/// values ahead of tables.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct LauncherManifest {
    /// Application name, substituted for `{name}` in templates.
    pub name: String,
    /// Embedded version string, substituted for `{version}`.
    pub version: String,
    /// Architecture triple, substituted for `{triple}`.
    pub triple: ArchTriple,
    /// Directory holding every launchable binary, relative to the root.
    pub bin_dir: String,
    /// The main editor executable launched when nothing else matches.
    pub default_tool: String,
    /// Sub-tools selectable by a leading argument equal to their name.
    pub subtools: Vec<String>,
    /// Bundled shared-library directories, relative to the root.
    pub library_dirs: Vec<String>,
    /// Inherited variables that are always removed from the child environment.
    pub scrub: Vec<String>,
    /// Tools selected by the name the launcher was invoked as.
    pub alternates: Vec<Alternate>,
    /// Portable dump handed to the default tool when present.
    pub dump: Option<DumpSpec>,
    /// Auxiliary data variables and the templates they are built from.
    pub data_paths: BTreeMap<String, Vec<String>>,
    /// Search path construction.
    pub search_path: SearchPathSpec,
}

/// An alternate tool chosen by invoked-name prefix.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Alternate {
    /// Prefix of the invoked name, e.g. `emacsclient` also covers `emacsclient-30`.
    pub prefix: String,
    /// Binary under `bin_dir` that is launched.
    pub binary: String,
}

/// Location of the portable dump and the flag that passes it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct DumpSpec {
    /// Path template relative to the root.
    pub path: String,
    /// Flag name; the argument is rendered as `<flag>=<absolute path>`.
    #[serde(default = "default_dump_flag")]
    pub flag: String,
}

fn default_dump_flag() -> String {
    "--dump-file".to_string()
}

/// How the child's `PATH` is assembled.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields, default)]
pub struct SearchPathSpec {
    /// Treatment of the inherited `PATH`.
    pub policy: PathPolicy,
    /// Fallback directories appended last under [`PathPolicy::Sanitize`].
    pub system_dirs: Vec<PathBuf>,
    /// Directories placed right after the bundled `bin` directory. Relative
    /// entries are resolved against the installation root.
    pub extra_dirs: Vec<PathBuf>,
    /// Programs whose real (non-shim) host directory is added after the
    /// extra directories, e.g. the compiler driver used for native
    /// compilation.
    pub toolchain: Vec<String>,
}

impl Default for SearchPathSpec {
    fn default() -> Self {
        Self {
            policy: PathPolicy::Sanitize,
            system_dirs: [
                "/usr/local/sbin",
                "/usr/local/bin",
                "/usr/sbin",
                "/usr/bin",
                "/sbin",
                "/bin",
            ]
            .into_iter()
            .map(PathBuf::from)
            .collect(),
            extra_dirs: Vec::new(),
            toolchain: Vec::new(),
        }
    }
}

/// Partial manifest as read from `apprun.toml`; every present field replaces
/// the preset's value.
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct ManifestOverrides {
    name: Option<String>,
    version: Option<String>,
    triple: Option<ArchTriple>,
    bin_dir: Option<String>,
    default_tool: Option<String>,
    subtools: Option<Vec<String>>,
    library_dirs: Option<Vec<String>>,
    scrub: Option<Vec<String>>,
    alternates: Option<Vec<Alternate>>,
    dump: Option<DumpOverride>,
    data_paths: Option<BTreeMap<String, Vec<String>>>,
    search_path: Option<SearchPathOverrides>,
}

/// `dump = false` switches the dump off, `dump = true` keeps the preset's,
/// a `[dump]` table replaces it.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum DumpOverride {
    Enabled(bool),
    Spec(DumpSpec),
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct SearchPathOverrides {
    policy: Option<PathPolicy>,
    system_dirs: Option<Vec<PathBuf>>,
    extra_dirs: Option<Vec<PathBuf>>,
    toolchain: Option<Vec<String>>,
}

impl ManifestOverrides {
    fn apply(self, manifest: &mut LauncherManifest) {
        if let Some(v) = self.name {
            manifest.name = v;
        }
        if let Some(v) = self.version {
            manifest.version = v;
        }
        if let Some(v) = self.triple {
            manifest.triple = v;
        }
        if let Some(v) = self.bin_dir {
            manifest.bin_dir = v;
        }
        if let Some(v) = self.default_tool {
            manifest.default_tool = v;
        }
        if let Some(v) = self.subtools {
            manifest.subtools = v;
        }
        if let Some(v) = self.library_dirs {
            manifest.library_dirs = v;
        }
        if let Some(v) = self.scrub {
            manifest.scrub = v;
        }
        if let Some(v) = self.alternates {
            manifest.alternates = v;
        }
        match self.dump {
            Some(DumpOverride::Enabled(false)) => manifest.dump = None,
            Some(DumpOverride::Enabled(true)) | None => {}
            Some(DumpOverride::Spec(v)) => manifest.dump = Some(v),
        }
        if let Some(v) = self.data_paths {
            manifest.data_paths = v;
        }
        if let Some(sp) = self.search_path {
            let target = &mut manifest.search_path;
            if let Some(v) = sp.policy {
                target.policy = v;
            }
            if let Some(v) = sp.system_dirs {
                target.system_dirs = v;
            }
            if let Some(v) = sp.extra_dirs {
                target.extra_dirs = v;
            }
            if let Some(v) = sp.toolchain {
                target.toolchain = v;
            }
        }
    }
}

impl LauncherManifest {
    /// The layout produced by the Emacs AppImage build.
    ///
    /// | Variable | Template |
    /// |---|---|
    /// | `EMACSDATA` | `share/{name}/{version}/etc` |
    /// | `EMACSDOC` | `share/{name}/{version}/etc` |
    /// | `EMACSLOADPATH` | `share/{name}/{version}/lisp`, `share/{name}/{version}/site-lisp`, `share/{name}/site-lisp` |
    /// | `EMACSPATH` | `libexec/{name}/{version}/{triple}` |
    /// | `FONTCONFIG_PATH` | `etc/fonts` |
    pub fn emacs() -> Self {
        let data_paths = [
            ("EMACSDATA", vec!["share/{name}/{version}/etc"]),
            ("EMACSDOC", vec!["share/{name}/{version}/etc"]),
            (
                "EMACSLOADPATH",
                vec![
                    "share/{name}/{version}/lisp",
                    "share/{name}/{version}/site-lisp",
                    "share/{name}/site-lisp",
                ],
            ),
            ("EMACSPATH", vec!["libexec/{name}/{version}/{triple}"]),
            ("FONTCONFIG_PATH", vec!["etc/fonts"]),
        ]
        .into_iter()
        .map(|(var, dirs)| {
            (
                var.to_string(),
                dirs.into_iter().map(str::to_string).collect(),
            )
        })
        .collect();

        Self {
            name: "emacs".to_string(),
            version: PRESET_VERSION.to_string(),
            triple: ArchTriple::current(),
            bin_dir: "bin".to_string(),
            default_tool: "emacs".to_string(),
            subtools: ["emacsclient", "etags", "ctags", "ebrowse"]
                .into_iter()
                .map(str::to_string)
                .collect(),
            library_dirs: vec!["lib".to_string()],
            scrub: vec!["EMACSNATIVELOADPATH".to_string()],
            alternates: vec![Alternate {
                prefix: "emacsclient".to_string(),
                binary: "emacsclient".to_string(),
            }],
            dump: Some(DumpSpec {
                path: "libexec/{name}/{version}/{triple}/emacs.pdmp".to_string(),
                flag: default_dump_flag(),
            }),
            data_paths,
            search_path: SearchPathSpec {
                toolchain: ["gcc", "as", "ld"].into_iter().map(str::to_string).collect(),
                ..SearchPathSpec::default()
            },
        }
    }

    /// Load the manifest for an installation root.
    ///
    /// Starts from the Emacs preset and applies `<root>/apprun.toml` on top
    /// when that file exists.
    ///
    /// # Errors
    ///
    /// Returns [`ManifestError::Io`] if the file exists but cannot be read,
    /// [`ManifestError::Parse`] if it is not valid, and
    /// [`ManifestError::Invalid`] if the merged manifest fails
    /// [`validate`](Self::validate).
    pub fn load(root: &Path) -> Result<Self, ManifestError> {
        let path = root.join(MANIFEST_FILE);
        let content = match std::fs::read_to_string(&path) {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                let preset = Self::emacs();
                preset.validate()?;
                return Ok(preset);
            }
            Err(source) => return Err(ManifestError::Io { path, source }),
        };
        Self::emacs().overlay(&content, &path)
    }

    /// Apply TOML overrides in `content` on top of `self`.
    ///
    /// `origin` only labels parse errors.
    ///
    /// # Errors
    ///
    /// Returns [`ManifestError::Parse`] for malformed TOML or unknown keys and
    /// [`ManifestError::Invalid`] if the result fails validation.
    pub fn overlay(mut self, content: &str, origin: &Path) -> Result<Self, ManifestError> {
        let overrides: ManifestOverrides =
            toml::from_str(content).map_err(|source| ManifestError::Parse {
                path: origin.to_path_buf(),
                source,
            })?;
        overrides.apply(&mut self);
        self.validate()?;
        Ok(self)
    }

    /// Render the manifest as TOML.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization fails.
    pub fn to_toml(&self) -> Result<String, toml::ser::Error> {
        toml::to_string_pretty(self)
    }

    /// Substitute `{name}`, `{version}` and `{triple}` in a template.
    pub fn expand(&self, template: &str) -> String {
        template
            .replace("{name}", &self.name)
            .replace("{version}", &self.version)
            .replace("{triple}", self.triple.as_str())
    }

    /// Every binary the manifest can launch: the default tool, then the
    /// alternates, then the sub-tools, without duplicates.
    pub fn tool_names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = Vec::new();
        let candidates = std::iter::once(self.default_tool.as_str())
            .chain(self.alternates.iter().map(|a| a.binary.as_str()))
            .chain(self.subtools.iter().map(String::as_str));
        for name in candidates {
            if !names.contains(&name) {
                names.push(name);
            }
        }
        names
    }

    /// Check that every field can be turned into paths under the root.
    ///
    /// # Errors
    ///
    /// Returns [`ManifestError::Invalid`] naming the first offending field.
    pub fn validate(&self) -> Result<(), ManifestError> {
        for (field, value) in [
            ("name", &self.name),
            ("version", &self.version),
            ("default_tool", &self.default_tool),
        ] {
            if value.trim().is_empty() {
                return Err(ManifestError::invalid(field, "must not be empty"));
            }
        }
        if self.version.contains(['/', '\\']) {
            return Err(ManifestError::invalid(
                "version",
                "must not contain path separators",
            ));
        }

        check_file_name("default_tool", &self.default_tool)?;
        for alternate in &self.alternates {
            if alternate.prefix.is_empty() {
                return Err(ManifestError::invalid(
                    "alternates.prefix",
                    "must not be empty",
                ));
            }
            check_file_name("alternates.binary", &alternate.binary)?;
        }
        for subtool in &self.subtools {
            check_file_name("subtools", subtool)?;
        }

        check_relative("bin_dir", &self.bin_dir)?;
        for dir in &self.library_dirs {
            check_relative("library_dirs", &self.expand(dir))?;
        }
        if let Some(dump) = &self.dump {
            check_relative("dump.path", &self.expand(&dump.path))?;
            if !dump.flag.starts_with('-') || dump.flag.contains('=') {
                return Err(ManifestError::invalid(
                    "dump.flag",
                    format!("{:?} is not a flag name", dump.flag),
                ));
            }
        }
        for (var, templates) in &self.data_paths {
            check_var_name("data_paths", var)?;
            if templates.is_empty() {
                return Err(ManifestError::invalid(
                    format!("data_paths.{var}"),
                    "needs at least one path",
                ));
            }
            for template in templates {
                check_relative(&format!("data_paths.{var}"), &self.expand(template))?;
            }
        }
        for var in &self.scrub {
            check_var_name("scrub", var)?;
        }
        Ok(())
    }
}

fn check_file_name(field: &str, value: &str) -> Result<(), ManifestError> {
    if value.is_empty() || value.contains(['/', '\\']) || value == "." || value == ".." {
        return Err(ManifestError::invalid(
            field,
            format!("{value:?} is not a plain file name"),
        ));
    }
    Ok(())
}

// Templates must stay inside the installation root once expanded.
fn check_relative(field: &str, value: &str) -> Result<(), ManifestError> {
    let path = Path::new(value);
    if value.is_empty() {
        return Err(ManifestError::invalid(field, "must not be empty"));
    }
    let escapes = path.components().any(|c| {
        matches!(
            c,
            Component::RootDir | Component::Prefix(_) | Component::ParentDir
        )
    });
    if escapes {
        return Err(ManifestError::invalid(
            field,
            format!("{value:?} must be relative to the installation root"),
        ));
    }
    Ok(())
}

fn check_var_name(field: &str, var: &str) -> Result<(), ManifestError> {
    if var.is_empty() || var.contains(['=', '\0']) {
        return Err(ManifestError::invalid(
            field,
            format!("{var:?} is not a variable name"),
        ));
    }
    Ok(())
}
