//! Destination layout of the static registry tree.
//!
//! ```text
//! <type>/versions/index.json
//! <type>/<version>/download/<os>/<arch>/index.json
//! <type>/<version>/download/<os>/<arch>/terraform-provider-<type>_v<version>_<os>_<arch>.zip
//! <type>/<version>/download/<os>/<arch>/<archive stem>_SHA256SUMS
//! <type>/<version>/download/<os>/<arch>/<archive stem>_SHA256SUMS.sig
//! ```
//!
//! Every path is a pure function of the artefact metadata and an optional
//! root; nothing here touches the filesystem.

use super::naming::ArtefactMetadata;
use camino::{Utf8Path, Utf8PathBuf};

const VERSIONS_DIR: &str = "versions";
const DOWNLOAD_DIR: &str = "download";
const INDEX_FILE: &str = "index.json";
const SHASUMS_SUFFIX: &str = "_SHA256SUMS";
const SIGNATURE_EXTENSION: &str = ".sig";

/// Derived destination paths for one `(type, version, os, arch)` artefact.
///
/// # Examples
///
/// ```
/// use terraform_registry_builder::artefact::layout::ArtefactLayout;
/// use terraform_registry_builder::artefact::naming::parse_artefact_name;
///
/// let meta = parse_artefact_name("terraform-provider-test_v1.0.0_linux_amd64").unwrap();
/// let layout = ArtefactLayout::new(&meta);
/// assert_eq!(layout.versions_index_path(), "test/versions/index.json");
/// assert_eq!(
///     layout.archive_path(),
///     "test/1.0.0/download/linux/amd64/terraform-provider-test_v1.0.0_linux_amd64.zip"
/// );
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArtefactLayout {
    root: Utf8PathBuf,
    provider_type: String,
    version: String,
    os: String,
    arch: String,
    stem: String,
}

impl ArtefactLayout {
    /// Layout relative to the registry root.
    #[must_use]
    pub fn new(meta: &ArtefactMetadata) -> Self {
        Self::under(Utf8Path::new(""), meta)
    }

    /// Layout rooted at `root`.
    #[must_use]
    pub fn under(root: &Utf8Path, meta: &ArtefactMetadata) -> Self {
        Self {
            root: root.to_owned(),
            provider_type: meta.provider_type().to_owned(),
            version: meta.version().to_owned(),
            os: meta.os().to_owned(),
            arch: meta.arch().to_owned(),
            stem: meta.stem(),
        }
    }

    /// Directory holding the versions index for this provider type.
    #[must_use]
    pub fn versions_dir(&self) -> Utf8PathBuf {
        self.root.join(&self.provider_type).join(VERSIONS_DIR)
    }

    /// `<type>/versions/index.json`
    #[must_use]
    pub fn versions_index_path(&self) -> Utf8PathBuf {
        self.versions_dir().join(INDEX_FILE)
    }

    /// `<type>/<version>/download/<os>/<arch>`
    #[must_use]
    pub fn download_dir(&self) -> Utf8PathBuf {
        self.root
            .join(&self.provider_type)
            .join(&self.version)
            .join(DOWNLOAD_DIR)
            .join(&self.os)
            .join(&self.arch)
    }

    /// Canonical archive file name, independent of the source suffix.
    #[must_use]
    pub fn archive_file_name(&self) -> String {
        format!("{}.zip", self.stem)
    }

    /// Full path of the published archive.
    #[must_use]
    pub fn archive_path(&self) -> Utf8PathBuf {
        self.download_dir().join(self.archive_file_name())
    }

    /// Checksum manifest file name.
    #[must_use]
    pub fn shasums_file_name(&self) -> String {
        format!("{}{SHASUMS_SUFFIX}", self.stem)
    }

    /// Full path of the checksum manifest.
    #[must_use]
    pub fn shasums_path(&self) -> Utf8PathBuf {
        self.download_dir().join(self.shasums_file_name())
    }

    /// Detached signature file name.
    #[must_use]
    pub fn signature_file_name(&self) -> String {
        format!("{}{SIGNATURE_EXTENSION}", self.shasums_file_name())
    }

    /// Full path of the detached signature.
    #[must_use]
    pub fn signature_path(&self) -> Utf8PathBuf {
        self.download_dir().join(self.signature_file_name())
    }

    /// Full path of the per-platform download manifest.
    #[must_use]
    pub fn download_manifest_path(&self) -> Utf8PathBuf {
        self.download_dir().join(INDEX_FILE)
    }
}
