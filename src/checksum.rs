//! Content hashes for files and directory trees.
//!
//! A file hashes to the hex SHA-256 of its bytes. A directory hashes every
//! regular file below it (symlinks are not followed), ordered by relative
//! path; each file contributes its `/`-separated relative path, a NUL byte and
//! the raw digest of its contents. The blocking and async walks produce the
//! same string for the same tree.

use crate::error::{LoaderError, Result};
use sha2::{Digest, Sha256};
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

pub fn digest_path(path: &Path) -> Result<String> {
    let metadata = std::fs::metadata(path).map_err(|e| LoaderError::from_io(path, e))?;
    if !metadata.is_dir() {
        let bytes = std::fs::read(path).map_err(|e| LoaderError::from_io(path, e))?;
        return Ok(sha256_hex(&bytes));
    }

    let mut files = Vec::new();
    for entry in WalkDir::new(path).min_depth(1) {
        let entry = entry.map_err(|e| walk_error(path, e))?;
        if entry.file_type().is_file() {
            files.push(relative_to(path, entry.path()));
        }
    }
    files.sort();

    let mut tree = TreeDigest::default();
    for relative in &files {
        let full = path.join(relative);
        let bytes = std::fs::read(&full).map_err(|e| LoaderError::from_io(&full, e))?;
        tree.add(relative, &bytes);
    }
    Ok(tree.finish())
}

pub async fn digest_path_async(path: &Path) -> Result<String> {
    let metadata = tokio::fs::metadata(path)
        .await
        .map_err(|e| LoaderError::from_io(path, e))?;
    if !metadata.is_dir() {
        let bytes = tokio::fs::read(path)
            .await
            .map_err(|e| LoaderError::from_io(path, e))?;
        return Ok(sha256_hex(&bytes));
    }

    let mut files = Vec::new();
    let mut pending = vec![path.to_path_buf()];
    while let Some(directory) = pending.pop() {
        let mut entries = tokio::fs::read_dir(&directory)
            .await
            .map_err(|e| LoaderError::from_io(&directory, e))?;
        while let Some(entry) = entries
            .next_entry()
            .await
            .map_err(|e| LoaderError::from_io(&directory, e))?
        {
            let file_type = entry
                .file_type()
                .await
                .map_err(|e| LoaderError::from_io(&entry.path(), e))?;
            if file_type.is_dir() {
                pending.push(entry.path());
            } else if file_type.is_file() {
                files.push(relative_to(path, &entry.path()));
            }
        }
    }
    files.sort();

    let mut tree = TreeDigest::default();
    for relative in &files {
        let full = path.join(relative);
        let bytes = tokio::fs::read(&full)
            .await
            .map_err(|e| LoaderError::from_io(&full, e))?;
        tree.add(relative, &bytes);
    }
    Ok(tree.finish())
}

#[derive(Default)]
struct TreeDigest {
    hasher: Sha256,
}

impl TreeDigest {
    fn add(&mut self, relative: &Path, contents: &[u8]) {
        let name = relative
            .components()
            .map(|component| component.as_os_str().to_string_lossy())
            .collect::<Vec<_>>()
            .join("/");
        self.hasher.update(name.as_bytes());
        self.hasher.update([0u8]);
        self.hasher.update(Sha256::digest(contents));
    }

    fn finish(self) -> String {
        format!("{:x}", self.hasher.finalize())
    }
}

fn relative_to(root: &Path, path: &Path) -> PathBuf {
    path.strip_prefix(root).unwrap_or(path).to_path_buf()
}

fn walk_error(root: &Path, error: walkdir::Error) -> LoaderError {
    let path = error
        .path()
        .map(Path::to_path_buf)
        .unwrap_or_else(|| root.to_path_buf());
    match error.into_io_error() {
        Some(io) => LoaderError::from_io(&path, io),
        None => LoaderError::Io {
            path,
            source: std::io::Error::other("filesystem loop"),
        },
    }
}

fn sha256_hex(bytes: &[u8]) -> String {
    let digest = Sha256::digest(bytes);
    format!("{digest:x}")
}
