//! Provider artefact naming policy.
//!
//! Source artefacts follow the release convention
//! `terraform-provider-<type>_v<version>_<os>_<arch>`, optionally suffixed
//! with `.exe` (a raw Windows binary) or `.zip` (a prebuilt archive). The
//! two suffixes are mutually exclusive.
//!
//! A name either yields complete metadata or is rejected.

use crate::error::{BuildError, Result};
use std::fmt;

/// The fixed prefix shared by every provider artefact.
pub const PROVIDER_PREFIX: &str = "terraform-provider-";

/// Suffix marking a prebuilt archive.
const ARCHIVE_EXTENSION: &str = "zip";

/// The only recognised native executable suffix.
const NATIVE_EXTENSION: &str = "exe";

/// Separator between name components.
const SEPARATOR: char = '_';

/// Marker preceding the version component.
const VERSION_MARKER: char = 'v';

/// How the source artefact is stored.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SourceKind {
    /// A raw provider binary that must be archived.
    Binary,
    /// A prebuilt `.zip` archive that is published verbatim.
    Archive,
}

/// Metadata derived from a provider artefact file name.
///
/// Every component is non-empty, is neither `.` nor `..`, and is free of
/// the `_` separator and path separators; the provider type additionally
/// contains no `-`.
///
/// # Examples
///
/// ```
/// use terraform_registry_builder::artefact::naming::{parse_artefact_name, SourceKind};
///
/// let meta = parse_artefact_name("terraform-provider-aws_v5.1.0_windows_amd64.exe")
///     .expect("valid name");
/// assert_eq!(meta.provider_type(), "aws");
/// assert_eq!(meta.version(), "5.1.0");
/// assert_eq!(meta.native_ext(), Some("exe"));
/// assert_eq!(meta.kind(), SourceKind::Binary);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ArtefactMetadata {
    provider_type: String,
    version: String,
    os: String,
    arch: String,
    native_ext: Option<String>,
    kind: SourceKind,
}

impl ArtefactMetadata {
    /// Build metadata for a raw binary from validated components.
    ///
    /// # Errors
    ///
    /// Returns [`BuildError::InvalidName`] if any component is empty or
    /// contains a delimiter.
    pub fn new(provider_type: &str, version: &str, os: &str, arch: &str) -> Result<Self> {
        let candidate = Self {
            provider_type: provider_type.to_owned(),
            version: version.to_owned(),
            os: os.to_owned(),
            arch: arch.to_owned(),
            native_ext: None,
            kind: SourceKind::Binary,
        };
        if candidate.components_valid() {
            Ok(candidate)
        } else {
            Err(BuildError::InvalidName {
                name: candidate.file_name(),
            })
        }
    }

    /// Mark the artefact as a native executable carrying `.exe`.
    #[must_use]
    pub fn with_native_ext(mut self) -> Self {
        self.native_ext = Some(NATIVE_EXTENSION.to_owned());
        self.kind = SourceKind::Binary;
        self
    }

    /// Mark the artefact as a prebuilt archive.
    #[must_use]
    pub fn as_archive(mut self) -> Self {
        self.native_ext = None;
        self.kind = SourceKind::Archive;
        self
    }

    /// Provider type, e.g. `aws`.
    #[must_use]
    pub fn provider_type(&self) -> &str {
        &self.provider_type
    }

    /// Opaque version string without the leading `v`.
    #[must_use]
    pub fn version(&self) -> &str {
        &self.version
    }

    /// Target operating system.
    #[must_use]
    pub fn os(&self) -> &str {
        &self.os
    }

    /// Target architecture.
    #[must_use]
    pub fn arch(&self) -> &str {
        &self.arch
    }

    /// Native executable suffix without the dot, if any.
    #[must_use]
    pub fn native_ext(&self) -> Option<&str> {
        self.native_ext.as_deref()
    }

    /// Whether the source is a raw binary or a prebuilt archive.
    #[must_use]
    pub fn kind(&self) -> SourceKind {
        self.kind
    }

    /// Reconstruct the source file name these metadata were parsed from.
    #[must_use]
    pub fn file_name(&self) -> String {
        self.to_string()
    }

    /// Common stem `terraform-provider-<type>_v<version>_<os>_<arch>`.
    #[must_use]
    pub fn stem(&self) -> String {
        format!(
            "{PROVIDER_PREFIX}{}{SEPARATOR}{VERSION_MARKER}{}{SEPARATOR}{}{SEPARATOR}{}",
            self.provider_type, self.version, self.os, self.arch
        )
    }

    /// Name of the binary inside a generated archive.
    ///
    /// OS and architecture are omitted; the native suffix is kept.
    #[must_use]
    pub fn inner_binary_name(&self) -> String {
        let base = format!(
            "{PROVIDER_PREFIX}{}{SEPARATOR}{VERSION_MARKER}{}",
            self.provider_type, self.version
        );
        match &self.native_ext {
            Some(ext) => format!("{base}.{ext}"),
            None => base,
        }
    }

    fn components_valid(&self) -> bool {
        valid_component(&self.provider_type)
            && !self.provider_type.contains('-')
            && valid_component(&self.version)
            && valid_component(&self.os)
            && valid_component(&self.arch)
            && !self.arch.contains('.')
    }
}

impl fmt::Display for ArtefactMetadata {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.stem())?;
        match (self.kind, &self.native_ext) {
            (SourceKind::Archive, _) => write!(f, ".{ARCHIVE_EXTENSION}"),
            (SourceKind::Binary, Some(ext)) => write!(f, ".{ext}"),
            (SourceKind::Binary, None) => Ok(()),
        }
    }
}

/// Returns true if `file_name` carries the provider prefix.
///
/// Such files are build candidates; whether they parse is decided later.
#[must_use]
pub fn is_candidate(file_name: &str) -> bool {
    file_name.starts_with(PROVIDER_PREFIX)
}

/// Parse a path-stripped artefact file name.
///
/// # Errors
///
/// Returns [`BuildError::InvalidName`] carrying `file_name` if the name
/// does not match the convention, including names that combine `.exe`
/// with `.zip`.
pub fn parse_artefact_name(file_name: &str) -> Result<ArtefactMetadata> {
    split_name(file_name).ok_or_else(|| BuildError::InvalidName {
        name: file_name.to_owned(),
    })
}

fn split_name(file_name: &str) -> Option<ArtefactMetadata> {
    let rest = file_name.strip_prefix(PROVIDER_PREFIX)?;
    let mut parts = rest.split(SEPARATOR);
    let provider_type = parts.next()?;
    let version = parts.next()?.strip_prefix(VERSION_MARKER)?;
    let os = parts.next()?;
    let tail = parts.next()?;
    if parts.next().is_some() {
        return None;
    }

    let (arch, suffix) = match tail.split_once('.') {
        Some((arch, suffix)) => (arch, Some(suffix)),
        None => (tail, None),
    };

    let meta = ArtefactMetadata::new(provider_type, version, os, arch).ok()?;
    match suffix {
        None => Some(meta),
        Some(NATIVE_EXTENSION) => Some(meta.with_native_ext()),
        Some(ARCHIVE_EXTENSION) => Some(meta.as_archive()),
        Some(_) => None,
    }
}

/// Components become directory names in the registry tree, so `.` and `..`
/// are refused alongside separators.
fn valid_component(value: &str) -> bool {
    !value.is_empty()
        && !matches!(value, "." | "..")
        && !value.contains(SEPARATOR)
        && !value.contains('/')
        && !value.contains('\\')
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case::binary(
        "terraform-provider-test_v1.0.0_linux_amd64",
        ("test", "1.0.0", "linux", "amd64"),
        None,
        SourceKind::Binary
    )]
    #[case::windows(
        "terraform-provider-aws_v0.1.0_windows_amd64.exe",
        ("aws", "0.1.0", "windows", "amd64"),
        Some("exe"),
        SourceKind::Binary
    )]
    #[case::archive(
        "terraform-provider-example_v2.0.0_darwin_arm64.zip",
        ("example", "2.0.0", "darwin", "arm64"),
        None,
        SourceKind::Archive
    )]
    #[case::prerelease(
        "terraform-provider-null_v3.2.1-beta.1_freebsd_386",
        ("null", "3.2.1-beta.1", "freebsd", "386"),
        None,
        SourceKind::Binary
    )]
    fn parses_valid_names(
        #[case] name: &str,
        #[case] expected: (&str, &str, &str, &str),
        #[case] native_ext: Option<&str>,
        #[case] kind: SourceKind,
    ) {
        let meta = parse_artefact_name(name).expect("valid name");
        assert_eq!(
            (meta.provider_type(), meta.version(), meta.os(), meta.arch()),
            expected
        );
        assert_eq!(meta.native_ext(), native_ext);
        assert_eq!(meta.kind(), kind);
    }

    #[rstest]
    #[case::exe_then_zip("terraform-provider-aws_v1.0.0_windows_amd64.exe.zip")]
    #[case::dash_in_type("terraform-provider-test-v1.0.0_linux_amd64")]
    #[case::missing_v("terraform-provider-test_1.0.0_linux_amd64")]
    #[case::missing_arch("terraform-provider-test_v1.0.0_linux")]
    #[case::extra_component("terraform-provider-test_v1.0.0_linux_amd64_extra")]
    #[case::empty_version("terraform-provider-test_v_linux_amd64")]
    #[case::unknown_suffix("terraform-provider-test_v1.0.0_linux_amd64.tar.gz")]
    #[case::other_prefix("provider-test_v1.0.0_linux_amd64")]
    #[case::empty_type("terraform-provider-_v1.0.0_linux_amd64")]
    #[case::parent_type("terraform-provider-.._v1.0.0_linux_amd64")]
    #[case::current_type("terraform-provider-._v1.0.0_linux_amd64")]
    #[case::parent_version("terraform-provider-test_v.._linux_amd64")]
    #[case::current_version("terraform-provider-test_v._linux_amd64")]
    #[case::parent_os("terraform-provider-test_v1.0.0_.._amd64")]
    #[case::backslash_os("terraform-provider-test_v1.0.0_a\\b_amd64")]
    fn rejects_invalid_names(#[case] name: &str) {
        let err = parse_artefact_name(name).expect_err("invalid name");
        assert!(matches!(err, BuildError::InvalidName { name: ref n } if n == name));
    }

    #[rstest]
    #[case::plain("terraform-provider-test_v1.0.0_linux_amd64")]
    #[case::exe("terraform-provider-aws_v0.1.0_windows_386.exe")]
    #[case::zip("terraform-provider-example_v2.0.0_darwin_arm64.zip")]
    fn file_name_reproduces_the_parsed_name(#[case] name: &str) {
        let meta = parse_artefact_name(name).expect("valid name");
        assert_eq!(meta.file_name(), name);
        assert_eq!(parse_artefact_name(&meta.file_name()).expect("reparse"), meta);
    }

    #[test]
    fn constructed_metadata_round_trips_through_the_parser() {
        let meta = ArtefactMetadata::new("google", "4.0.0-rc1", "openbsd", "arm").expect("valid");
        assert_eq!(parse_artefact_name(&meta.file_name()).expect("reparse"), meta);
    }

    #[test]
    fn new_rejects_delimiters_inside_components() {
        assert!(ArtefactMetadata::new("my_type", "1.0.0", "linux", "amd64").is_err());
        assert!(ArtefactMetadata::new("test", "1.0.0", "linux", "").is_err());
        assert!(ArtefactMetadata::new("..", "1.0.0", "linux", "amd64").is_err());
        assert!(ArtefactMetadata::new("test", "..", "linux", "amd64").is_err());
        assert!(ArtefactMetadata::new("test", "1.0.0", ".", "amd64").is_err());
    }

    #[rstest]
    #[case::plain("terraform-provider-test_v1.0.0_linux_amd64", "terraform-provider-test_v1.0.0")]
    #[case::exe(
        "terraform-provider-test_v1.0.0_windows_amd64.exe",
        "terraform-provider-test_v1.0.0.exe"
    )]
    fn inner_binary_name_omits_platform(#[case] name: &str, #[case] inner: &str) {
        let meta = parse_artefact_name(name).expect("valid name");
        assert_eq!(meta.inner_binary_name(), inner);
    }

    #[test]
    fn candidates_only_need_the_prefix() {
        assert!(is_candidate("terraform-provider-anything"));
        assert!(!is_candidate("README.md"));
    }
}
