use std::io::Result;
use std::path::{Path, PathBuf};

/// Virtual File System trait
///
/// Lets the loader read tree files from disk or from memory in tests.
///
/// # Contract
///
/// - **`exists(path)`**: `true` for a file OR a directory, matching
///   `std::path::Path::exists()`.
/// - **`is_dir(path)`**: `true` only for directories. Implies `exists()`.
/// - **`read(path)`**: only succeeds for files.
/// - **`write(path, bytes)`**: creates parent directories as needed.
/// - **`list_dir(path)`**: fails if the path is not a directory.
pub trait Vfs {
    /// Read a whole file.
    fn read(&self, path: &Path) -> Result<Vec<u8>>;

    /// Write a file, replacing any existing content.
    fn write(&self, path: &Path, bytes: &[u8]) -> Result<()>;

    fn read_to_string(&self, path: &Path) -> Result<String> {
        let bytes = self.read(path)?;
        String::from_utf8(bytes)
            .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidData, e))
    }

    fn write_from_string(&self, path: &Path, content: &str) -> Result<()> {
        self.write(path, content.as_bytes())
    }

    fn exists(&self, path: &Path) -> bool;

    fn is_dir(&self, path: &Path) -> bool;

    /// Entries directly inside a directory, sorted.
    fn list_dir(&self, path: &Path) -> Result<Vec<PathBuf>>;

    /// Remove a file, or a directory and everything below it.
    fn remove(&self, path: &Path) -> Result<()>;
}

pub use memory::MemoryVfs;
pub use os::OsVfs;

mod memory;
mod os;
