//! Per-type versions index (`<type>/versions/index.json`).
//!
//! The index is long-lived: every build loads it, merges newly published
//! `(version, os, arch)` triples, and writes it back. Version entries are
//! unique, platforms within an entry are unique, and entries are kept in
//! descending version order after every merge.

use crate::error::{BuildError, Result};
use crate::fs::Filesystem;
use camino::Utf8Path;
use log::debug;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;

/// Protocol versions advertised for every published version.
pub const SUPPORTED_PROTOCOLS: &[&str] = &["6.0"];

/// Returns [`SUPPORTED_PROTOCOLS`] as owned strings.
#[must_use]
pub fn supported_protocols() -> Vec<String> {
    SUPPORTED_PROTOCOLS.iter().map(|p| (*p).to_owned()).collect()
}

/// A platform a version has been published for.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlatformEntry {
    /// Operating system.
    pub os: String,
    /// Architecture.
    pub arch: String,
}

/// One published version and its platforms.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VersionEntry {
    /// Opaque version string.
    pub version: String,
    /// Protocol versions, fixed when the entry is created.
    pub protocols: Vec<String>,
    /// Platforms published for this version.
    pub platforms: Vec<PlatformEntry>,
}

impl VersionEntry {
    /// Returns true if `(os, arch)` is already listed.
    #[must_use]
    pub fn has_platform(&self, os: &str, arch: &str) -> bool {
        self.platforms.iter().any(|p| p.os == os && p.arch == arch)
    }
}

/// How version strings are ordered in the index.
///
/// The registry has always sorted by plain string comparison, which puts
/// `9.0.0` above `10.0.0`. [`VersionOrder::Semantic`] is opt-in.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VersionOrder {
    /// Byte-wise string comparison.
    #[default]
    Lexicographic,
    /// Semantic-version comparison; unparseable versions sort below
    /// parseable ones and compare lexicographically among themselves.
    Semantic,
}

impl VersionOrder {
    /// Compare two version strings in ascending order.
    #[must_use]
    pub fn compare(self, a: &str, b: &str) -> Ordering {
        match self {
            Self::Lexicographic => a.cmp(b),
            Self::Semantic => {
                match (semver::Version::parse(a), semver::Version::parse(b)) {
                    (Ok(left), Ok(right)) => left.cmp(&right).then_with(|| a.cmp(b)),
                    (Ok(_), Err(_)) => Ordering::Greater,
                    (Err(_), Ok(_)) => Ordering::Less,
                    (Err(_), Err(_)) => a.cmp(b),
                }
            }
        }
    }
}

/// The versions manifest for one provider type.
///
/// # Examples
///
/// ```
/// use terraform_registry_builder::index::{VersionOrder, VersionsIndex};
///
/// let mut index = VersionsIndex::new("test");
/// index.merge("1.0.0", "linux", "amd64", VersionOrder::Lexicographic);
/// index.merge("1.0.0", "darwin", "arm64", VersionOrder::Lexicographic);
/// assert!(index.contains("1.0.0", "darwin", "arm64"));
/// assert_eq!(index.versions().len(), 1);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VersionsIndex {
    #[serde(default)]
    id: String,
    #[serde(default)]
    versions: Vec<VersionEntry>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    warnings: Option<Vec<String>>,
}

impl VersionsIndex {
    /// Create an empty index for `id`.
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            versions: Vec::new(),
            warnings: None,
        }
    }

    /// The provider type this index describes.
    #[must_use]
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Version entries in index order.
    #[must_use]
    pub fn versions(&self) -> &[VersionEntry] {
        &self.versions
    }

    /// Warnings carried over from the existing file, if any.
    #[must_use]
    pub fn warnings(&self) -> Option<&[String]> {
        self.warnings.as_deref()
    }

    /// Look up a version entry.
    #[must_use]
    pub fn entry(&self, version: &str) -> Option<&VersionEntry> {
        self.versions.iter().find(|v| v.version == version)
    }

    /// Returns true if `version` is already published for `(os, arch)`.
    #[must_use]
    pub fn contains(&self, version: &str, os: &str, arch: &str) -> bool {
        self.entry(version).is_some_and(|v| v.has_platform(os, arch))
    }

    /// Record `(version, os, arch)` and re-sort the entries.
    ///
    /// Returns `false` when the triple was already present.
    pub fn merge(&mut self, version: &str, os: &str, arch: &str, order: VersionOrder) -> bool {
        let platform = PlatformEntry {
            os: os.to_owned(),
            arch: arch.to_owned(),
        };
        let changed = match self.versions.iter_mut().find(|v| v.version == version) {
            Some(existing) if existing.has_platform(os, arch) => false,
            Some(existing) => {
                existing.platforms.push(platform);
                true
            }
            None => {
                self.versions.push(VersionEntry {
                    version: version.to_owned(),
                    protocols: supported_protocols(),
                    platforms: vec![platform],
                });
                true
            }
        };
        self.sort(order);
        changed
    }

    /// Sort entries by descending version.
    pub fn sort(&mut self, order: VersionOrder) {
        self.versions
            .sort_by(|a, b| order.compare(&b.version, &a.version));
    }

    /// Serialize with stable field order, two-space indentation, and a
    /// trailing newline.
    ///
    /// # Errors
    ///
    /// Returns [`BuildError::Serialization`] if serialization fails.
    pub fn to_json(&self) -> Result<String> {
        let mut json = serde_json::to_string_pretty(self)?;
        json.push('\n');
        Ok(json)
    }
}

/// Load the index at `path`.
///
/// A missing or empty file yields a fresh index for `provider_type`.
///
/// # Errors
///
/// Returns [`BuildError::CorruptIndex`] if the file exists but cannot be
/// parsed, or [`BuildError::Io`] if it cannot be read.
pub fn load_index(
    fs: &dyn Filesystem,
    path: &Utf8Path,
    provider_type: &str,
) -> Result<VersionsIndex> {
    if !fs.exists(path) {
        return Ok(VersionsIndex::new(provider_type));
    }
    let bytes = fs.read(path).map_err(|e| BuildError::io(path, e))?;
    if bytes.is_empty() {
        return Ok(VersionsIndex::new(provider_type));
    }

    let mut index: VersionsIndex =
        serde_json::from_slice(&bytes).map_err(|e| BuildError::CorruptIndex {
            path: path.to_owned(),
            reason: e.to_string(),
        })?;
    if index.id.is_empty() {
        provider_type.clone_into(&mut index.id);
    }
    Ok(index)
}

/// Write `index` to `path`, creating the parent directory first.
///
/// # Errors
///
/// Returns [`BuildError::Io`] if the directory or file cannot be written.
pub fn persist_index(fs: &dyn Filesystem, path: &Utf8Path, index: &VersionsIndex) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs.create_dir_all(parent)
            .map_err(|e| BuildError::io(parent, e))?;
    }
    let json = index.to_json()?;
    debug!("writing versions index {path} ({} versions)", index.versions.len());
    fs.write(path, json.as_bytes())
        .map_err(|e| BuildError::io(path, e))
}

#[cfg(test)]
#[path = "index_tests.rs"]
mod tests;
