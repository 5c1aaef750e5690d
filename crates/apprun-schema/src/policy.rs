//! Treatment of the inherited search path.

use serde::{Deserialize, Serialize};

/// How the inherited `PATH` is carried into the child's search path.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum PathPolicy {
    /// Drop shim directories, empty entries and duplicates from the inherited
    /// `PATH`, append the standard system directories, and unset
    /// version-manager marker variables (default).
    #[default]
    Sanitize,
    /// Keep the inherited `PATH` verbatim after the bundled and extra
    /// directories.
    Preserve,
}

impl PathPolicy {
    /// Lowercase name as used in `apprun.toml` and `APPRUN_PATH_POLICY`.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Sanitize => "sanitize",
            Self::Preserve => "preserve",
        }
    }

    /// Whether inherited entries and marker variables are filtered.
    pub fn filters_inherited(self) -> bool {
        matches!(self, Self::Sanitize)
    }
}

impl std::fmt::Display for PathPolicy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for PathPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "sanitize" | "filter" => Ok(Self::Sanitize),
            "preserve" | "prepend" => Ok(Self::Preserve),
            _ => Err(format!(
                "Unknown search path policy: {s} (expected 'sanitize' or 'preserve')"
            )),
        }
    }
}
