//! Filesystem seam
//!
//! Every filesystem call the pipeline makes goes through [`FileSystem`], so
//! the retry heuristics can be exercised against scripted fakes.

use std::fs;
use std::io;
use std::path::Path;

/// Minimal filesystem capability used by [`super::RetryableOps`]
pub trait FileSystem {
    /// Names of the entries directly under `path`, in no particular order
    fn list_dir(&self, path: &Path) -> io::Result<Vec<String>>;

    /// Whether `path` currently looks like a directory
    fn is_dir(&self, path: &Path) -> bool;

    /// Whether `path` currently looks like a regular file
    fn is_file(&self, path: &Path) -> bool;

    /// Reads a whole file
    fn read(&self, path: &Path) -> io::Result<Vec<u8>>;

    /// Creates or truncates a file and writes `contents`
    fn write(&self, path: &Path, contents: &[u8]) -> io::Result<()>;

    /// Renames `from` to `to`, replacing `to` if it exists
    fn rename(&self, from: &Path, to: &Path) -> io::Result<()>;

    /// Creates a directory and all missing parents
    fn create_dir_all(&self, path: &Path) -> io::Result<()>;

    /// Removes a directory tree
    fn remove_dir_all(&self, path: &Path) -> io::Result<()>;
}

/// [`FileSystem`] backed by `std::fs`
#[derive(Debug, Clone, Copy, Default)]
pub struct LocalFileSystem;

impl FileSystem for LocalFileSystem {
    fn list_dir(&self, path: &Path) -> io::Result<Vec<String>> {
        let mut names = Vec::new();
        for entry in fs::read_dir(path)? {
            names.push(entry?.file_name().to_string_lossy().into_owned());
        }
        Ok(names)
    }

    fn is_dir(&self, path: &Path) -> bool {
        path.is_dir()
    }

    fn is_file(&self, path: &Path) -> bool {
        path.is_file()
    }

    fn read(&self, path: &Path) -> io::Result<Vec<u8>> {
        fs::read(path)
    }

    fn write(&self, path: &Path, contents: &[u8]) -> io::Result<()> {
        fs::write(path, contents)
    }

    fn rename(&self, from: &Path, to: &Path) -> io::Result<()> {
        fs::rename(from, to)
    }

    fn create_dir_all(&self, path: &Path) -> io::Result<()> {
        fs::create_dir_all(path)
    }

    fn remove_dir_all(&self, path: &Path) -> io::Result<()> {
        fs::remove_dir_all(path)
    }
}
