//! Suspending counterparts of [`FileLoader`](super::FileLoader) on `tokio::fs`.
//!
//! Semantics match the blocking loader call for call. Batch reads and the
//! per-directory fan-out are awaited together with `try_join_all`; fallback
//! lookups await one candidate at a time.

use super::extension::{candidates, is_excluded, ExtensionFilter};
use super::{ListOptions, LoadedFile};
use crate::checksum;
use crate::error::{LoaderError, Result};
use futures::future::{try_join_all, BoxFuture};
use futures::FutureExt;
use std::path::{Path, PathBuf};
use tokio::fs;

#[derive(Debug, Clone, Copy, Default)]
pub struct AsyncFileLoader;

impl AsyncFileLoader {
    pub fn new() -> Self {
        Self
    }

    /// Checks the file type before opening, as the blocking form does.
    pub async fn exists(&self, path: impl AsRef<Path>) -> bool {
        let path = path.as_ref();
        let is_file = fs::metadata(path)
            .await
            .is_ok_and(|metadata| metadata.is_file());
        let readable = is_file && fs::File::open(path).await.is_ok();
        tracing::trace!(path = %path.display(), readable, "checked");
        readable
    }

    pub async fn is_directory(&self, path: impl AsRef<Path>) -> bool {
        fs::metadata(path)
            .await
            .map(|metadata| metadata.is_dir())
            .unwrap_or(false)
    }

    pub async fn load(&self, path: impl AsRef<Path>) -> Result<Vec<u8>> {
        let path = path.as_ref();
        fs::read(path)
            .await
            .map_err(|e| LoaderError::from_io(path, e))
    }

    pub async fn get_with_first_matched_extension<E: AsRef<str>, X: AsRef<str>>(
        &self,
        path: impl AsRef<Path>,
        extensions: &[E],
        exclude: &[X],
    ) -> Option<PathBuf> {
        let path = path.as_ref();
        for candidate in candidates(path, extensions) {
            if !is_excluded(&candidate, exclude) && self.exists(&candidate).await {
                tracing::debug!(matched = %candidate.display(), "extension matched");
                return Some(candidate);
            }
        }
        tracing::debug!(path = %path.display(), "no extension matched");
        None
    }

    pub async fn load_with_first_matched_extension<E: AsRef<str>, X: AsRef<str>>(
        &self,
        path: impl AsRef<Path>,
        extensions: &[E],
        exclude: &[X],
    ) -> Result<Option<LoadedFile>> {
        let Some(matched) = self
            .get_with_first_matched_extension(path, extensions, exclude)
            .await
        else {
            return Ok(None);
        };
        let contents = self.load(&matched).await?;
        Ok(Some(LoadedFile {
            contents,
            path: matched,
        }))
    }

    pub async fn load_any<P: AsRef<Path>>(&self, paths: &[P]) -> Option<LoadedFile> {
        for path in paths {
            let path = path.as_ref();
            match self.load(path).await {
                Ok(contents) => {
                    return Some(LoadedFile {
                        contents,
                        path: path.to_path_buf(),
                    })
                }
                Err(e) => tracing::debug!(error = %e, "skipping candidate"),
            }
        }
        None
    }

    /// Reads all paths concurrently; output order follows input order.
    pub async fn load_all<P: AsRef<Path>>(&self, paths: &[P]) -> Result<Vec<Vec<u8>>> {
        try_join_all(paths.iter().map(|path| self.load(path))).await
    }

    pub async fn get_all_in_directory(
        &self,
        directory: impl AsRef<Path>,
        options: &ListOptions,
    ) -> Result<Vec<PathBuf>> {
        let filter = options.filter();
        self.collect_directory(directory.as_ref().to_path_buf(), &filter, options.recursive)
            .await
    }

    fn collect_directory<'a>(
        &'a self,
        directory: PathBuf,
        filter: &'a ExtensionFilter,
        recursive: bool,
    ) -> BoxFuture<'a, Result<Vec<PathBuf>>> {
        async move {
            let mut entries = fs::read_dir(&directory)
                .await
                .map_err(|e| LoaderError::from_io(&directory, e))?;
            let mut children = Vec::new();
            while let Some(entry) = entries
                .next_entry()
                .await
                .map_err(|e| LoaderError::from_io(&directory, e))?
            {
                children.push(entry.path());
            }

            let nested = try_join_all(children.into_iter().map(|path| async move {
                if listed_as_directory(&path).await? {
                    if recursive {
                        self.collect_directory(path, filter, recursive).await
                    } else {
                        Ok(Vec::new())
                    }
                } else if filter.accepts(&path) {
                    Ok(vec![path])
                } else {
                    Ok(Vec::new())
                }
            }))
            .await?;
            Ok(nested.into_iter().flatten().collect())
        }
        .boxed()
    }

    pub async fn load_all_in_directory(
        &self,
        directory: impl AsRef<Path>,
        options: &ListOptions,
    ) -> Result<Vec<Vec<u8>>> {
        let paths = self.get_all_in_directory(directory, options).await?;
        self.load_all(&paths).await
    }

    pub async fn get_checksum(&self, path: impl AsRef<Path>) -> Result<String> {
        checksum::digest_path_async(path.as_ref()).await
    }
}

async fn listed_as_directory(path: &Path) -> Result<bool> {
    match fs::metadata(path).await {
        Ok(metadata) => Ok(metadata.is_dir()),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(false),
        Err(e) => Err(LoaderError::from_io(path, e)),
    }
}
