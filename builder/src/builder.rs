//! Build orchestration over a source tree.
//!
//! Every candidate file runs through
//! `parse → gate → package → merge index → checksums → manifest`. A failing
//! step ends that candidate only; the walk carries on and the failure is
//! recorded in the [`BuildReport`].
//!
//! Candidates are processed in `(type, path)` order, so reports come out
//! the same however many jobs run. With more than one job, candidates are
//! grouped by provider type and each type is drained by exactly one worker. The versions index of a type is
//! therefore only ever read and written by one thread, which keeps the
//! gate-then-write sequence race-free without locking the index itself.

use crate::artefact::layout::ArtefactLayout;
use crate::artefact::naming::{ArtefactMetadata, is_candidate, parse_artefact_name};
use crate::artefact::packaging::package_artefact;
use crate::checksum::publish_checksums;
use crate::error::{BuildError, Result};
use crate::fs::Filesystem;
use crate::index::{VersionOrder, load_index, persist_index};
use crate::report::{ArtefactOutcome, BuildReport};
use crate::signing::Signer;
use camino::{Utf8Path, Utf8PathBuf};
use log::{debug, info, warn};
use std::collections::BTreeMap;
use std::sync::{Mutex, PoisonError};

/// Tunables for a build run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BuildOptions {
    /// Maximum number of provider types processed concurrently.
    pub jobs: usize,
    /// Ordering applied to version entries.
    pub version_order: VersionOrder,
}

impl Default for BuildOptions {
    fn default() -> Self {
        Self {
            jobs: 1,
            version_order: VersionOrder::default(),
        }
    }
}

type Candidate = (Utf8PathBuf, ArtefactMetadata);
type TypeQueue = Mutex<std::vec::IntoIter<(String, Vec<Candidate>)>>;

/// Drives the pipeline with injected filesystem and signer.
///
/// # Examples
///
/// ```
/// use camino::Utf8Path;
/// use terraform_registry_builder::builder::{BuildOptions, RegistryBuilder};
/// use terraform_registry_builder::fs::MemoryFilesystem;
/// use terraform_registry_builder::signing::FakeSigner;
///
/// let fs = MemoryFilesystem::new();
/// fs.seed("src/terraform-provider-test_v1.0.0_linux_amd64", b"binary");
/// let signer = FakeSigner::default();
///
/// let report = RegistryBuilder::new(&fs, &signer, BuildOptions::default())
///     .build(Utf8Path::new("src"), Utf8Path::new("dst"))
///     .expect("build runs");
/// assert_eq!(report.published(), 1);
/// assert!(fs.contents("dst/test/versions/index.json").is_some());
/// ```
pub struct RegistryBuilder<'a> {
    fs: &'a dyn Filesystem,
    signer: &'a dyn Signer,
    options: BuildOptions,
}

impl<'a> RegistryBuilder<'a> {
    /// Create a builder.
    #[must_use]
    pub fn new(fs: &'a dyn Filesystem, signer: &'a dyn Signer, options: BuildOptions) -> Self {
        Self {
            fs,
            signer,
            options,
        }
    }

    /// Build the registry tree for `source` under `destination`.
    ///
    /// # Errors
    ///
    /// Returns [`BuildError::SourceNotDirectory`] if `source` is not a
    /// directory, [`BuildError::DestinationUnavailable`] if `destination`
    /// cannot be created, and [`BuildError::Io`] if the source root cannot
    /// be listed. Per-artefact failures are reported, not returned.
    pub fn build(&self, source: &Utf8Path, destination: &Utf8Path) -> Result<BuildReport> {
        if !self.fs.is_dir(source) {
            return Err(BuildError::SourceNotDirectory {
                path: source.to_owned(),
            });
        }
        self.fs
            .create_dir_all(destination)
            .map_err(|e| BuildError::DestinationUnavailable {
                path: destination.to_owned(),
                source: e,
            })?;

        let mut report = BuildReport::new();
        let paths = self.discover(source, &mut report)?;
        let mut candidates = parse_candidates(paths, &mut report);
        candidates.sort_by(|(path_a, meta_a), (path_b, meta_b)| {
            meta_a
                .provider_type()
                .cmp(meta_b.provider_type())
                .then_with(|| path_a.cmp(path_b))
        });
        info!(
            "found {} candidate artefact(s) under {source}",
            candidates.len()
        );

        if self.options.jobs <= 1 {
            for (path, meta) in &candidates {
                self.process(&mut report, destination, path, meta)?;
            }
        } else {
            report.extend(self.build_parallel(candidates, destination)?);
        }
        Ok(report)
    }

    /// Recursive listing of candidate files, sorted by path.
    ///
    /// Unreadable subdirectories are reported as failures; an unreadable
    /// root is an error.
    fn discover(&self, root: &Utf8Path, report: &mut BuildReport) -> Result<Vec<Utf8PathBuf>> {
        let mut found = Vec::new();
        let mut pending = vec![root.to_owned()];
        while let Some(dir) = pending.pop() {
            let entries = match self.fs.read_dir(&dir) {
                Ok(entries) => entries,
                Err(e) if dir.as_path() == root => return Err(BuildError::io(dir, e)),
                Err(e) => {
                    let err = BuildError::io(dir.as_path(), e);
                    warn!("skipping unreadable directory {dir}: {err}");
                    report.record(
                        dir,
                        ArtefactOutcome::Failed {
                            reason: err.to_string(),
                        },
                    );
                    continue;
                }
            };
            for entry in entries {
                if entry.is_dir {
                    pending.push(entry.path);
                } else if is_candidate(entry.file_name()) {
                    found.push(entry.path);
                }
            }
        }
        found.sort();
        Ok(found)
    }

    fn build_parallel(
        &self,
        candidates: Vec<Candidate>,
        destination: &Utf8Path,
    ) -> Result<BuildReport> {
        let mut by_type: BTreeMap<String, Vec<Candidate>> = BTreeMap::new();
        for (path, meta) in candidates {
            by_type
                .entry(meta.provider_type().to_owned())
                .or_default()
                .push((path, meta));
        }
        let workers = self.options.jobs.min(by_type.len()).max(1);
        debug!(
            "processing {} provider type(s) with {workers} worker(s)",
            by_type.len()
        );
        let queue: TypeQueue = Mutex::new(by_type.into_iter().collect::<Vec<_>>().into_iter());

        let outcomes = std::thread::scope(|scope| {
            let handles: Vec<_> = (0..workers)
                .map(|_| scope.spawn(|| self.drain(&queue, destination)))
                .collect();
            handles
                .into_iter()
                .map(|handle| {
                    handle
                        .join()
                        .unwrap_or_else(|payload| std::panic::resume_unwind(payload))
                })
                .collect::<Vec<_>>()
        });

        let mut per_type = BTreeMap::new();
        for outcome in outcomes {
            per_type.extend(outcome?);
        }
        let mut report = BuildReport::new();
        for (_, type_report) in per_type {
            report.extend(type_report);
        }
        Ok(report)
    }

    fn drain(
        &self,
        queue: &TypeQueue,
        destination: &Utf8Path,
    ) -> Result<Vec<(String, BuildReport)>> {
        let mut done = Vec::new();
        loop {
            let next = queue.lock().unwrap_or_else(PoisonError::into_inner).next();
            let Some((provider_type, batch)) = next else {
                break;
            };
            let mut report = BuildReport::new();
            for (path, meta) in &batch {
                self.process(&mut report, destination, path, meta)?;
            }
            done.push((provider_type, report));
        }
        Ok(done)
    }

    fn process(
        &self,
        report: &mut BuildReport,
        destination: &Utf8Path,
        source: &Utf8Path,
        meta: &ArtefactMetadata,
    ) -> Result<()> {
        match self.publish(destination, source, meta) {
            Ok(outcome) => report.record(source, outcome),
            Err(err) if err.is_per_artefact() => {
                warn!("failed to publish {source}: {err}");
                report.record(
                    source,
                    ArtefactOutcome::Failed {
                        reason: err.to_string(),
                    },
                );
            }
            Err(err) => return Err(err),
        }
        Ok(())
    }

    fn publish(
        &self,
        destination: &Utf8Path,
        source: &Utf8Path,
        meta: &ArtefactMetadata,
    ) -> Result<ArtefactOutcome> {
        let layout = ArtefactLayout::under(destination, meta);
        let index_path = layout.versions_index_path();
        let mut index = load_index(self.fs, &index_path, meta.provider_type())?;
        if index.contains(meta.version(), meta.os(), meta.arch()) {
            info!("{meta} is already published, skipping {source}");
            return Ok(ArtefactOutcome::Skipped);
        }

        let download_dir = layout.download_dir();
        debug!("publishing {source} into {download_dir}");
        self.fs
            .create_dir_all(&download_dir)
            .map_err(|e| BuildError::io(download_dir.as_path(), e))?;
        let archive = package_artefact(self.fs, source, meta, &layout)?;

        index.merge(
            meta.version(),
            meta.os(),
            meta.arch(),
            self.options.version_order,
        );
        persist_index(self.fs, &index_path, &index)?;

        publish_checksums(self.fs, self.signer, meta, &layout, &archive)?;
        info!("published {meta} as {}", archive.path);
        Ok(ArtefactOutcome::Published)
    }
}

fn parse_candidates(paths: Vec<Utf8PathBuf>, report: &mut BuildReport) -> Vec<Candidate> {
    let mut candidates = Vec::with_capacity(paths.len());
    for path in paths {
        match parse_artefact_name(path.file_name().unwrap_or_default()) {
            Ok(meta) => candidates.push((path, meta)),
            Err(err) => {
                warn!("ignoring {path}: {err}");
                report.record(
                    path,
                    ArtefactOutcome::Failed {
                        reason: err.to_string(),
                    },
                );
            }
        }
    }
    candidates
}

#[cfg(test)]
#[path = "builder_tests.rs"]
mod tests;
