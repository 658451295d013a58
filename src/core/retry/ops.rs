//! Retry-hardened filesystem and record operations
//!
//! The storage this tool runs against (network shares holding scanner
//! exports) fails in three ways: calls error out transiently, existence
//! checks return false negatives, and directory listings come back silently
//! truncated. [`RetryableOps`] answers each with a bounded, delay-free loop:
//!
//! - fallible calls are retried with [`retry`] and the last error is kept;
//! - existence checks are OR-reduced over several probes;
//! - listings are repeated and the largest one wins.
//!
//! The largest-listing rule is a heuristic. A truncation that recurs on every
//! attempt goes unnoticed.

use crate::core::retry::fs::{FileSystem, LocalFileSystem};
use crate::domain::record::RecordStore;
use crate::domain::{LinkageError, Result};
use crate::log_retry_attempt;
use std::fmt::Display;
use std::io;
use std::path::{Path, PathBuf};

/// Executes `operation` up to `attempts` times, returning the first success
///
/// `attempts` counts every call, the first one included; zero is treated as
/// one. Once the budget is spent the last error is returned unchanged.
///
/// # Examples
///
/// ```
/// use linkage::core::retry::retry;
///
/// let mut calls = 0;
/// let value: Result<u32, String> = retry(3, || {
///     calls += 1;
///     if calls < 3 { Err(format!("glitch {calls}")) } else { Ok(7) }
/// });
/// assert_eq!(value, Ok(7));
/// ```
pub fn retry<T, E, F>(attempts: usize, mut operation: F) -> std::result::Result<T, E>
where
    E: Display,
    F: FnMut() -> std::result::Result<T, E>,
{
    let attempts = attempts.max(1);
    let mut attempt = 1;
    loop {
        match operation() {
            Ok(value) => return Ok(value),
            Err(e) if attempt >= attempts => return Err(e),
            Err(e) => {
                log_retry_attempt!(attempt, attempts, e.to_string().as_str());
                attempt += 1;
            }
        }
    }
}

/// Attempt budgets per operation class
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Attempts to read one record
    pub read_attempts: usize,
    /// Attempts to write one record or file
    pub write_attempts: usize,
    /// Independent listing attempts per directory
    pub list_attempts: usize,
    /// Retries inside each listing attempt
    pub list_inner_attempts: usize,
    /// Existence probes per check
    pub probe_attempts: usize,
    /// Attempts to persist the ledger
    pub serialize_attempts: usize,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            read_attempts: 50,
            write_attempts: 50,
            list_attempts: 20,
            list_inner_attempts: 10,
            probe_attempts: 40,
            serialize_attempts: 20,
        }
    }
}

impl RetryPolicy {
    /// A policy that tries everything exactly once
    pub fn single_attempt() -> Self {
        Self {
            read_attempts: 1,
            write_attempts: 1,
            list_attempts: 1,
            list_inner_attempts: 1,
            probe_attempts: 1,
            serialize_attempts: 1,
        }
    }
}

/// Guarded I/O over a [`FileSystem`]
///
/// # Examples
///
/// ```no_run
/// use linkage::core::retry::{RetryPolicy, RetryableOps};
///
/// # fn example() -> linkage::domain::Result<()> {
/// let ops = RetryableOps::local(RetryPolicy::default());
/// for patient in ops.list_directory("/mnt/scanner/export".as_ref())? {
///     println!("{patient}");
/// }
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct RetryableOps<F: FileSystem = LocalFileSystem> {
    fs: F,
    policy: RetryPolicy,
}

impl RetryableOps<LocalFileSystem> {
    /// Guarded operations over the local filesystem
    pub fn local(policy: RetryPolicy) -> Self {
        Self::new(LocalFileSystem, policy)
    }
}

impl<F: FileSystem> RetryableOps<F> {
    /// Creates guarded operations over `fs`
    pub fn new(fs: F, policy: RetryPolicy) -> Self {
        Self { fs, policy }
    }

    /// The attempt budgets in force
    pub fn policy(&self) -> &RetryPolicy {
        &self.policy
    }

    /// The underlying filesystem
    pub fn fs(&self) -> &F {
        &self.fs
    }

    /// Lists `path`, keeping the largest of several independent listings
    ///
    /// Each listing attempt is itself retried. Entry names are returned
    /// sorted, so traversal order is stable across runs.
    ///
    /// # Errors
    ///
    /// Returns [`LinkageError::TransientIo`] only if no attempt succeeded.
    pub fn list_directory(&self, path: &Path) -> Result<Vec<String>> {
        let mut best: Option<Vec<String>> = None;
        let mut last_error = None;
        let mut sizes = Vec::with_capacity(self.policy.list_attempts);

        for _ in 0..self.policy.list_attempts.max(1) {
            match retry(self.policy.list_inner_attempts, || self.fs.list_dir(path)) {
                Ok(listing) => {
                    sizes.push(listing.len());
                    if best.as_ref().map_or(true, |b| listing.len() > b.len()) {
                        best = Some(listing);
                    }
                }
                Err(e) => last_error = Some(e),
            }
        }

        let Some(mut listing) = best else {
            let error = last_error
                .unwrap_or_else(|| io::Error::new(io::ErrorKind::Other, "no listing attempt made"));
            return Err(LinkageError::transient(
                "list",
                path,
                self.policy.list_attempts,
                error,
            ));
        };

        if sizes.iter().any(|&s| s != listing.len()) {
            tracing::warn!(
                path = %path.display(),
                sizes = ?sizes,
                kept = listing.len(),
                "Directory listings disagreed, keeping the largest"
            );
        }

        listing.sort();
        Ok(listing)
    }

    /// Whether any of several probes sees `path` as a directory
    pub fn path_is_dir(&self, path: &Path) -> bool {
        (0..self.policy.probe_attempts.max(1)).any(|_| self.fs.is_dir(path))
    }

    /// Whether any of several probes sees `path` as a regular file
    pub fn path_is_file(&self, path: &Path) -> bool {
        (0..self.policy.probe_attempts.max(1)).any(|_| self.fs.is_file(path))
    }

    /// Reads a whole file with the read budget
    pub fn read_file(&self, path: &Path) -> Result<Vec<u8>> {
        let attempts = self.policy.read_attempts;
        retry(attempts, || self.fs.read(path))
            .map_err(|e| LinkageError::transient("read", path, attempts, e))
    }

    /// Creates a directory tree with the write budget
    pub fn create_dir_all(&self, path: &Path) -> Result<()> {
        let attempts = self.policy.write_attempts;
        retry(attempts, || self.fs.create_dir_all(path))
            .map_err(|e| LinkageError::transient("create directory", path, attempts, e))
    }

    /// Removes a directory tree with the write budget
    pub fn remove_dir_all(&self, path: &Path) -> Result<()> {
        let attempts = self.policy.write_attempts;
        retry(attempts, || self.fs.remove_dir_all(path))
            .map_err(|e| LinkageError::transient("remove directory", path, attempts, e))
    }

    /// Replaces `path` with `contents` via a sibling temporary file
    ///
    /// Parent directories are created as needed. The rename is the commit
    /// point: a crash before it leaves the previous file intact.
    pub fn write_atomic(&self, path: &Path, contents: &[u8]) -> Result<()> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            self.create_dir_all(parent)?;
        }

        let staging = staging_path(path);
        let attempts = self.policy.serialize_attempts;
        retry(attempts, || {
            self.fs.write(&staging, contents)?;
            self.fs.rename(&staging, path)
        })
        .map_err(|e| LinkageError::transient("serialize", path, attempts, e))
    }

    /// Reads one record through `store` with the read budget
    pub fn read_record<S: RecordStore>(&self, store: &S, path: &Path) -> Result<S::Record> {
        let attempts = self.policy.read_attempts;
        retry(attempts, || store.read(path))
            .map_err(|e| LinkageError::transient("read", path, attempts, e))
    }

    /// Writes one record through `store` with the write budget
    pub fn write_record<S: RecordStore>(
        &self,
        store: &S,
        record: &S::Record,
        path: &Path,
    ) -> Result<()> {
        let attempts = self.policy.write_attempts;
        retry(attempts, || store.write(record, path))
            .map_err(|e| LinkageError::transient("write", path, attempts, e))
    }
}

fn staging_path(path: &Path) -> PathBuf {
    let mut name = path
        .file_name()
        .map(|n| n.to_os_string())
        .unwrap_or_default();
    name.push(".tmp");
    path.with_file_name(name)
}
