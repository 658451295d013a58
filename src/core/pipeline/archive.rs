//! Packing of finished pseudonym directories
//!
//! `target/<pseudonym>/` becomes `target/<pseudonym>.tar.gz` holding a single
//! top-level `<pseudonym>/` directory, after which the uncompressed copy is
//! removed. When the archive already exists (a later source folder produced
//! the same pseudonym, or a resumed run), its entries are carried over and
//! files from the directory replace entries of the same name.
//!
//! Archives are built in memory and written through [`RetryableOps`], so the
//! same retry budgets and filesystem seam apply as for every other write.

use crate::core::retry::{FileSystem, RetryableOps};
use crate::domain::ids::Pseudonym;
use crate::domain::{LinkageError, Result};
use flate2::read::GzDecoder;
use flate2::write::GzEncoder;
use flate2::Compression;
use std::collections::BTreeMap;
use std::io::{self, Read};
use std::path::{Component, Path, PathBuf};

/// Archive path for a pseudonym's output directory
pub fn archive_path(target: &Path, pseudonym: &Pseudonym) -> PathBuf {
    target.join(format!("{pseudonym}.tar.gz"))
}

/// Packs `target/<pseudonym>` into a gzip'd tarball and removes the directory
///
/// Entries of an existing archive are kept. Returns the archive path.
///
/// # Errors
///
/// Returns [`LinkageError::Archive`] if the directory is missing or an
/// existing archive cannot be unpacked, and a transient error if the
/// filesystem keeps failing.
pub fn archive_pseudonym_dir<F: FileSystem>(
    ops: &RetryableOps<F>,
    target: &Path,
    pseudonym: &Pseudonym,
) -> Result<PathBuf> {
    let dir = target.join(pseudonym.as_str());
    let archive = archive_path(target, pseudonym);
    let archive_error = |e: io::Error| LinkageError::Archive(format!("{}: {e}", archive.display()));

    if !ops.path_is_dir(&dir) {
        return Err(LinkageError::Archive(format!(
            "{}: output directory not found",
            dir.display()
        )));
    }

    let mut files = if ops.path_is_file(&archive) {
        let existing = ops.read_file(&archive)?;
        let carried = unpack(&existing, pseudonym.as_str()).map_err(archive_error)?;
        tracing::debug!(
            pseudonym = %pseudonym,
            entries = carried.len(),
            "Merging into existing archive"
        );
        carried
    } else {
        BTreeMap::new()
    };

    for name in ops.list_directory(&dir)? {
        let path = dir.join(&name);
        if ops.path_is_file(&path) {
            files.insert(name, ops.read_file(&path)?);
        }
    }

    let packed = pack(pseudonym.as_str(), &files).map_err(archive_error)?;
    ops.write_atomic(&archive, &packed)?;
    ops.remove_dir_all(&dir)?;

    tracing::info!(
        pseudonym = %pseudonym,
        archive = %archive.display(),
        files = files.len(),
        "Archived output"
    );
    Ok(archive)
}

/// Regular files stored directly under `root/`, keyed by file name
fn unpack(bytes: &[u8], root: &str) -> io::Result<BTreeMap<String, Vec<u8>>> {
    let mut archive = tar::Archive::new(GzDecoder::new(bytes));
    let mut files = BTreeMap::new();

    for entry in archive.entries()? {
        let mut entry = entry?;
        if !entry.header().entry_type().is_file() {
            continue;
        }
        let path = entry.path()?.into_owned();
        let mut components = path.components();
        let name = match (components.next(), components.next(), components.next()) {
            (Some(Component::Normal(top)), Some(Component::Normal(name)), None) if top == root => {
                name.to_string_lossy().into_owned()
            }
            _ => {
                return Err(io::Error::new(
                    io::ErrorKind::InvalidData,
                    format!("unexpected entry {} outside {root}/", path.display()),
                ))
            }
        };
        let mut contents = Vec::with_capacity(entry.size() as usize);
        entry.read_to_end(&mut contents)?;
        files.insert(name, contents);
    }

    Ok(files)
}

fn pack(root: &str, files: &BTreeMap<String, Vec<u8>>) -> io::Result<Vec<u8>> {
    let mut builder = tar::Builder::new(GzEncoder::new(Vec::new(), Compression::default()));

    let mut dir_header = tar::Header::new_gnu();
    dir_header.set_entry_type(tar::EntryType::Directory);
    dir_header.set_mode(0o755);
    dir_header.set_size(0);
    builder.append_data(&mut dir_header, format!("{root}/"), io::empty())?;

    for (name, contents) in files {
        let mut header = tar::Header::new_gnu();
        header.set_entry_type(tar::EntryType::Regular);
        header.set_mode(0o644);
        header.set_size(contents.len() as u64);
        builder.append_data(&mut header, format!("{root}/{name}"), contents.as_slice())?;
    }

    builder.into_inner()?.finish()
}
