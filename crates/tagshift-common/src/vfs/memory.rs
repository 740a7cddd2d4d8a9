use super::Vfs;
use std::collections::{BTreeMap, BTreeSet};
use std::io::{Error, ErrorKind, Result};
use std::path::{Component, Path, PathBuf};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

/// In-memory file system, used by tests and by callers that already hold
/// tree bytes. Clones share the same files.
#[derive(Clone, Default, Debug)]
pub struct MemoryVfs {
    files: Arc<Mutex<BTreeMap<PathBuf, Vec<u8>>>>,
}

impl MemoryVfs {
    pub fn new() -> Self {
        Self::default()
    }

    fn files(&self) -> MutexGuard<'_, BTreeMap<PathBuf, Vec<u8>>> {
        self.files.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn normalize_path(path: &Path) -> PathBuf {
        let normalized: PathBuf = path
            .components()
            .filter(|component| !matches!(component, Component::CurDir))
            .collect();
        if normalized.as_os_str().is_empty() {
            return PathBuf::from(".");
        }
        normalized
    }

    fn is_root(path: &Path) -> bool {
        path == Path::new(".") || path == Path::new("/")
    }
}

impl Vfs for MemoryVfs {
    fn read(&self, path: &Path) -> Result<Vec<u8>> {
        let path = MemoryVfs::normalize_path(path);
        self.files()
            .get(&path)
            .cloned()
            .ok_or_else(|| {
                Error::new(ErrorKind::NotFound, format!("File not found: {}", path.display()))
            })
    }

    fn write(&self, path: &Path, bytes: &[u8]) -> Result<()> {
        let path = MemoryVfs::normalize_path(path);
        self.files().insert(path, bytes.to_vec());
        Ok(())
    }

    fn exists(&self, path: &Path) -> bool {
        let path = MemoryVfs::normalize_path(path);
        let is_file = self.files().contains_key(&path);
        is_file || self.is_dir(&path)
    }

    fn is_dir(&self, path: &Path) -> bool {
        let path = MemoryVfs::normalize_path(path);
        let files = self.files();
        if MemoryVfs::is_root(&path) {
            return !files.is_empty();
        }
        files.keys().any(|k| k.starts_with(&path) && k != &path)
    }

    fn list_dir(&self, path: &Path) -> Result<Vec<PathBuf>> {
        let path = MemoryVfs::normalize_path(path);
        if !self.is_dir(&path) {
            return Err(Error::new(
                ErrorKind::NotFound,
                format!("Not a directory: {}", path.display()),
            ));
        }
        let root = MemoryVfs::is_root(&path);
        let mut entries = BTreeSet::new();
        for key in self.files().keys() {
            let relative = if root {
                key.strip_prefix("/").unwrap_or(key)
            } else {
                match key.strip_prefix(&path) {
                    Ok(relative) => relative,
                    Err(_) => continue,
                }
            };
            if let Some(first) = relative.components().next() {
                let base = if root { PathBuf::new() } else { path.clone() };
                entries.insert(base.join(first));
            }
        }
        Ok(entries.into_iter().collect())
    }

    fn remove(&self, path: &Path) -> Result<()> {
        let path = MemoryVfs::normalize_path(path);
        let mut files = self.files();
        let before = files.len();
        files.retain(|k, _| !k.starts_with(&path));
        if files.len() == before {
            return Err(Error::new(
                ErrorKind::NotFound,
                format!("File not found: {}", path.display()),
            ));
        }
        Ok(())
    }
}
