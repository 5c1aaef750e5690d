//! Environment snapshots.

use std::collections::BTreeMap;
use std::ffi::{OsStr, OsString};

/// An environment as a name → value mapping.
///
/// Values are kept as [`OsString`] so non-UTF-8 paths inherited from the host
/// survive the round trip to the child. Ordered so that resolution output is
/// deterministic.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EnvMap(BTreeMap<OsString, OsString>);

impl EnvMap {
    /// Create an empty environment.
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot the current process environment.
    pub fn from_host() -> Self {
        std::env::vars_os().collect()
    }

    /// Look up a variable.
    pub fn get(&self, key: impl AsRef<OsStr>) -> Option<&OsStr> {
        self.0.get(key.as_ref()).map(OsString::as_os_str)
    }

    /// Look up a variable and treat an empty value as unset.
    pub fn get_non_empty(&self, key: impl AsRef<OsStr>) -> Option<&OsStr> {
        self.get(key).filter(|v| !v.is_empty())
    }

    /// Set a variable, replacing any previous value.
    pub fn set(&mut self, key: impl Into<OsString>, value: impl Into<OsString>) {
        self.0.insert(key.into(), value.into());
    }

    /// Whether the variable is present (even if empty).
    pub fn contains(&self, key: impl AsRef<OsStr>) -> bool {
        self.0.contains_key(key.as_ref())
    }

    /// Keep only the variables for which `keep` returns true.
    pub fn retain(&mut self, mut keep: impl FnMut(&OsStr, &OsStr) -> bool) {
        self.0.retain(|k, v| keep(k, v));
    }

    /// Iterate over `(name, value)` pairs in name order.
    pub fn iter(&self) -> impl Iterator<Item = (&OsStr, &OsStr)> {
        self.0.iter().map(|(k, v)| (k.as_os_str(), v.as_os_str()))
    }
}

impl<K, V> FromIterator<(K, V)> for EnvMap
where
    K: Into<OsString>,
    V: Into<OsString>,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self(
            iter.into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        )
    }
}
