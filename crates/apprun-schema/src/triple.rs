//! Architecture triples.

/// Architecture triple naming the versioned `libexec` directory.
///
/// Emacs installs its architecture-dependent helpers (and the portable dump)
/// under `libexec/emacs/<version>/<triple>`, where the triple is the
/// configure-time host, e.g. `x86_64-pc-linux-gnu`.
///
/// # Example
///
/// ```
/// use apprun_schema::ArchTriple;
///
/// let triple: ArchTriple = "aarch64-unknown-linux-gnu".parse().unwrap();
/// assert_eq!(triple.as_str(), "aarch64-unknown-linux-gnu");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ArchTriple(String);

impl ArchTriple {
    /// The triple configure would pick for the architecture we run on.
    pub fn current() -> Self {
        let arch = configure_arch(std::env::consts::ARCH);
        Self(format!("{arch}-{}", host_suffix(arch)))
    }

    /// The full triple as a string.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

// Rust and configure disagree on the name of 32-bit x86.
fn configure_arch(arch: &str) -> &str {
    match arch {
        "x86" => "i686",
        other => other,
    }
}

#[cfg(target_os = "linux")]
fn host_suffix(arch: &str) -> &'static str {
    match arch {
        "x86_64" | "i686" => "pc-linux-gnu",
        _ => "unknown-linux-gnu",
    }
}

#[cfg(target_os = "macos")]
fn host_suffix(_arch: &str) -> &'static str {
    "apple-darwin"
}

#[cfg(not(any(target_os = "linux", target_os = "macos")))]
fn host_suffix(_arch: &str) -> &'static str {
    "unknown-unknown"
}

impl std::fmt::Display for ArchTriple {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl std::str::FromStr for ArchTriple {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        let parts: Vec<&str> = s.split('-').collect();
        if parts.len() < 2 || parts.iter().any(|p| p.is_empty()) {
            return Err(format!("Invalid architecture triple: {s:?}"));
        }
        if s.contains(['/', '\\']) {
            return Err(format!("Architecture triple must not contain path separators: {s:?}"));
        }
        Ok(Self(s.to_string()))
    }
}

impl TryFrom<String> for ArchTriple {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<ArchTriple> for String {
    fn from(value: ArchTriple) -> Self {
        value.0
    }
}
