//! Filesystem capability used by the build pipeline.
//!
//! All reads and writes performed by the core go through [`Filesystem`], so
//! tests can substitute an in-memory tree or a mock that injects failures.

use camino::{Utf8Path, Utf8PathBuf};
use log::warn;
use std::io;

/// One entry returned by [`Filesystem::read_dir`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DirEntry {
    /// Full path of the entry.
    pub path: Utf8PathBuf,
    /// Whether the entry is a directory.
    pub is_dir: bool,
}

impl DirEntry {
    /// Base name of the entry.
    #[must_use]
    pub fn file_name(&self) -> &str {
        self.path.file_name().unwrap_or_default()
    }
}

/// Minimal filesystem surface needed to build a registry tree.
#[cfg_attr(test, mockall::automock)]
pub trait Filesystem: Send + Sync {
    /// Read a whole file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file is missing or unreadable.
    fn read(&self, path: &Utf8Path) -> io::Result<Vec<u8>>;

    /// Create or truncate a file and write `contents` to it.
    ///
    /// # Errors
    ///
    /// Returns an error if the parent directory is missing or the write fails.
    fn write(&self, path: &Utf8Path, contents: &[u8]) -> io::Result<()>;

    /// Create a directory and all missing ancestors.
    ///
    /// # Errors
    ///
    /// Returns an error if any component cannot be created.
    fn create_dir_all(&self, path: &Utf8Path) -> io::Result<()>;

    /// List the direct children of a directory, sorted by path.
    ///
    /// # Errors
    ///
    /// Returns an error if `path` is not a readable directory.
    fn read_dir(&self, path: &Utf8Path) -> io::Result<Vec<DirEntry>>;

    /// Returns true if `path` names an existing file or directory.
    fn exists(&self, path: &Utf8Path) -> bool;

    /// Returns true if `path` names an existing directory.
    fn is_dir(&self, path: &Utf8Path) -> bool;
}

/// [`Filesystem`] backed by `std::fs`.
#[derive(Debug, Clone, Copy, Default)]
pub struct OsFilesystem;

impl Filesystem for OsFilesystem {
    fn read(&self, path: &Utf8Path) -> io::Result<Vec<u8>> {
        std::fs::read(path)
    }

    fn write(&self, path: &Utf8Path, contents: &[u8]) -> io::Result<()> {
        std::fs::write(path, contents)
    }

    fn create_dir_all(&self, path: &Utf8Path) -> io::Result<()> {
        std::fs::create_dir_all(path)
    }

    fn read_dir(&self, path: &Utf8Path) -> io::Result<Vec<DirEntry>> {
        let mut entries = Vec::new();
        for entry in std::fs::read_dir(path)? {
            let entry = entry?;
            let entry_path = match Utf8PathBuf::from_path_buf(entry.path()) {
                Ok(entry_path) => entry_path,
                Err(raw) => {
                    warn!("skipping non UTF-8 path {}", raw.display());
                    continue;
                }
            };
            entries.push(DirEntry {
                is_dir: entry.file_type()?.is_dir(),
                path: entry_path,
            });
        }
        entries.sort_by(|a, b| a.path.cmp(&b.path));
        Ok(entries)
    }

    fn exists(&self, path: &Utf8Path) -> bool {
        path.exists()
    }

    fn is_dir(&self, path: &Utf8Path) -> bool {
        path.is_dir()
    }
}

#[cfg(any(test, feature = "test-support"))]
pub use memory::MemoryFilesystem;

#[cfg(any(test, feature = "test-support"))]
mod memory {
    use super::{DirEntry, Filesystem};
    use camino::{Utf8Path, Utf8PathBuf};
    use std::collections::BTreeMap;
    use std::io;
    use std::sync::{Mutex, MutexGuard, PoisonError};

    #[derive(Debug, Clone)]
    enum Node {
        File(Vec<u8>),
        Dir,
    }

    /// In-memory [`Filesystem`] for tests.
    ///
    /// Writes require the parent directory to exist, mirroring `std::fs`.
    #[derive(Debug, Default)]
    pub struct MemoryFilesystem {
        nodes: Mutex<BTreeMap<Utf8PathBuf, Node>>,
    }

    impl MemoryFilesystem {
        /// Create an empty tree.
        #[must_use]
        pub fn new() -> Self {
            Self::default()
        }

        /// Create `path` with `contents`, creating parents as needed.
        pub fn seed(&self, path: impl AsRef<Utf8Path>, contents: impl AsRef<[u8]>) {
            let path = path.as_ref();
            let mut nodes = self.lock();
            if let Some(parent) = path.parent() {
                insert_dirs(&mut nodes, parent);
            }
            nodes.insert(path.to_owned(), Node::File(contents.as_ref().to_vec()));
        }

        /// Return a file's bytes, if present.
        #[must_use]
        pub fn contents(&self, path: impl AsRef<Utf8Path>) -> Option<Vec<u8>> {
            match self.lock().get(path.as_ref()) {
                Some(Node::File(bytes)) => Some(bytes.clone()),
                _ => None,
            }
        }

        /// All file paths currently stored, sorted.
        #[must_use]
        pub fn files(&self) -> Vec<Utf8PathBuf> {
            self.lock()
                .iter()
                .filter(|(_, node)| matches!(node, Node::File(_)))
                .map(|(path, _)| path.clone())
                .collect()
        }

        fn lock(&self) -> MutexGuard<'_, BTreeMap<Utf8PathBuf, Node>> {
            self.nodes.lock().unwrap_or_else(PoisonError::into_inner)
        }
    }

    fn is_root(path: &Utf8Path) -> bool {
        path.as_str().is_empty() || path.as_str() == "/"
    }

    fn insert_dirs(nodes: &mut BTreeMap<Utf8PathBuf, Node>, path: &Utf8Path) {
        for ancestor in path.ancestors().filter(|p| !is_root(p)) {
            nodes.entry(ancestor.to_owned()).or_insert(Node::Dir);
        }
    }

    fn not_found(path: &Utf8Path) -> io::Error {
        io::Error::new(io::ErrorKind::NotFound, format!("{path} does not exist"))
    }

    impl Filesystem for MemoryFilesystem {
        fn read(&self, path: &Utf8Path) -> io::Result<Vec<u8>> {
            self.contents(path).ok_or_else(|| not_found(path))
        }

        fn write(&self, path: &Utf8Path, contents: &[u8]) -> io::Result<()> {
            let mut nodes = self.lock();
            let parent_ok = path
                .parent()
                .is_none_or(|p| is_root(p) || matches!(nodes.get(p), Some(Node::Dir)));
            if !parent_ok {
                return Err(not_found(path));
            }
            if matches!(nodes.get(path), Some(Node::Dir)) {
                return Err(io::Error::new(
                    io::ErrorKind::IsADirectory,
                    format!("{path} is a directory"),
                ));
            }
            nodes.insert(path.to_owned(), Node::File(contents.to_vec()));
            Ok(())
        }

        fn create_dir_all(&self, path: &Utf8Path) -> io::Result<()> {
            let mut nodes = self.lock();
            if let Some(Node::File(_)) = path
                .ancestors()
                .find_map(|a| nodes.get(a).filter(|n| matches!(n, Node::File(_))))
            {
                return Err(io::Error::new(
                    io::ErrorKind::AlreadyExists,
                    format!("a file blocks {path}"),
                ));
            }
            insert_dirs(&mut nodes, path);
            Ok(())
        }

        fn read_dir(&self, path: &Utf8Path) -> io::Result<Vec<DirEntry>> {
            let nodes = self.lock();
            if !is_root(path) && !matches!(nodes.get(path), Some(Node::Dir)) {
                return Err(not_found(path));
            }
            Ok(nodes
                .iter()
                .filter(|(candidate, _)| candidate.parent() == Some(path))
                .map(|(candidate, node)| DirEntry {
                    path: candidate.clone(),
                    is_dir: matches!(node, Node::Dir),
                })
                .collect())
        }

        fn exists(&self, path: &Utf8Path) -> bool {
            is_root(path) || self.lock().contains_key(path)
        }

        fn is_dir(&self, path: &Utf8Path) -> bool {
            is_root(path) || matches!(self.lock().get(path), Some(Node::Dir))
        }
    }
}
