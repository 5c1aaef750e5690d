//! Catalogue of version managers that put shim directories on `PATH`.
//!
//! A shim intercepts a tool invocation (`gcc`, `python`, ...) and redirects it
//! to whatever version the manager selects for the current directory. Inside
//! the bundled editor that means an unrelated toolchain could answer the
//! native compiler's calls, so shim directories are filtered from the
//! resolved search path and the managers' marker variables are unset.

use regex::Regex;
use std::path::Path;
use std::sync::LazyLock;

/// A version manager known to inject shim directories.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ShimManager {
    /// asdf (`~/.asdf/shims`).
    Asdf,
    /// mise (`~/.local/share/mise/shims`).
    Mise,
    /// rtx, the former name of mise.
    Rtx,
    /// rbenv (`~/.rbenv/shims`).
    Rbenv,
    /// pyenv and pyenv-win (`~/.pyenv/shims`).
    Pyenv,
    /// nodenv (`~/.nodenv/shims`).
    Nodenv,
    /// goenv (`~/.goenv/shims`).
    Goenv,
    /// jenv (`~/.jenv/shims`).
    Jenv,
    /// plenv (`~/.plenv/shims`).
    Plenv,
    /// Volta, whose `bin` directory only holds shims.
    Volta,
}

/// Compiled directory patterns, in catalogue order.
static PATTERNS: LazyLock<Vec<(ShimManager, Regex)>> = LazyLock::new(|| {
    ShimManager::ALL
        .iter()
        .map(|&manager| {
            let re = Regex::new(manager.dir_pattern()).expect("shim patterns are valid regexes");
            (manager, re)
        })
        .collect()
});

impl ShimManager {
    /// Every known manager, in the order patterns are tested.
    pub const ALL: [ShimManager; 10] = [
        Self::Asdf,
        Self::Mise,
        Self::Rtx,
        Self::Rbenv,
        Self::Pyenv,
        Self::Nodenv,
        Self::Goenv,
        Self::Jenv,
        Self::Plenv,
        Self::Volta,
    ];

    /// Lowercase manager name.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Asdf => "asdf",
            Self::Mise => "mise",
            Self::Rtx => "rtx",
            Self::Rbenv => "rbenv",
            Self::Pyenv => "pyenv",
            Self::Nodenv => "nodenv",
            Self::Goenv => "goenv",
            Self::Jenv => "jenv",
            Self::Plenv => "plenv",
            Self::Volta => "volta",
        }
    }

    // Matched against the whole directory path, separators normalised to '/'
    // and trailing separators stripped.
    fn dir_pattern(self) -> &'static str {
        match self {
            Self::Asdf => r"(^|/)\.?asdf(-data)?/shims$",
            Self::Mise => r"(^|/)\.?mise/shims$",
            Self::Rtx => r"(^|/)\.?rtx/shims$",
            Self::Rbenv => r"(^|/)\.?rbenv/shims$",
            Self::Pyenv => r"(^|/)\.?pyenv(-win)?/shims$",
            Self::Nodenv => r"(^|/)\.?nodenv/shims$",
            Self::Goenv => r"(^|/)\.?goenv/shims$",
            Self::Jenv => r"(^|/)\.?jenv/shims$",
            Self::Plenv => r"(^|/)\.?plenv/shims$",
            Self::Volta => r"(^|/)\.?volta/bin$",
        }
    }

    /// Environment variables whose presence means the manager is active.
    pub fn marker_vars(self) -> &'static [&'static str] {
        match self {
            Self::Asdf => &["ASDF_DIR", "ASDF_DATA_DIR", "ASDF_CONFIG_FILE"],
            Self::Mise => &["MISE_SHELL", "__MISE_DIFF", "__MISE_SESSION", "__MISE_WATCH"],
            Self::Rtx => &["RTX_SHELL", "__RTX_DIFF", "__RTX_WATCH"],
            Self::Rbenv => &["RBENV_VERSION", "RBENV_ROOT", "RBENV_SHELL", "RBENV_DIR"],
            Self::Pyenv => &["PYENV_VERSION", "PYENV_ROOT", "PYENV_SHELL", "PYENV_DIR"],
            Self::Nodenv => &["NODENV_VERSION", "NODENV_ROOT", "NODENV_SHELL"],
            Self::Goenv => &["GOENV_VERSION", "GOENV_ROOT", "GOENV_SHELL"],
            Self::Jenv => &["JENV_VERSION", "JENV_ROOT", "JENV_SHELL"],
            Self::Plenv => &["PLENV_VERSION", "PLENV_ROOT", "PLENV_SHELL"],
            Self::Volta => &["VOLTA_HOME"],
        }
    }

    /// The first manager (in catalogue order) owning `dir`, if any.
    pub fn detect(dir: &Path) -> Option<Self> {
        let normalized = normalize(dir);
        PATTERNS
            .iter()
            .find(|(_, re)| re.is_match(&normalized))
            .map(|(manager, _)| *manager)
    }

    /// The manager that sets `name`, if it is a known marker variable.
    pub fn owning_marker(name: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|manager| manager.marker_vars().contains(&name))
    }
}

fn normalize(dir: &Path) -> String {
    let s = dir.to_string_lossy().replace('\\', "/");
    let trimmed = s.trim_end_matches('/');
    if trimmed.is_empty() {
        s
    } else {
        trimmed.to_string()
    }
}

impl std::fmt::Display for ShimManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
