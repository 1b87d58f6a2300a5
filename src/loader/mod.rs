pub mod extension;
pub mod nonblocking;

use crate::checksum;
use crate::error::{LoaderError, Result};
use extension::{candidates, is_excluded, ExtensionFilter};
use std::fs;
use std::path::{Path, PathBuf};

pub use nonblocking::AsyncFileLoader;

/// Bytes read from disk together with the path they came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoadedFile {
    pub contents: Vec<u8>,
    pub path: PathBuf,
}

/// Filters for directory enumeration.
///
/// No extensions means every file is accepted. Exclusions are raw suffixes.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ListOptions {
    pub extensions: Vec<String>,
    pub exclude: Vec<String>,
    pub recursive: bool,
}

impl ListOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn extensions<I, S>(mut self, extensions: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.extensions = extensions.into_iter().map(Into::into).collect();
        self
    }

    pub fn exclude<I, S>(mut self, exclude: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.exclude = exclude.into_iter().map(Into::into).collect();
        self
    }

    pub fn recursive(mut self, recursive: bool) -> Self {
        self.recursive = recursive;
        self
    }

    pub(crate) fn filter(&self) -> ExtensionFilter {
        ExtensionFilter::new(self.extensions.as_slice(), self.exclude.as_slice())
    }
}

/// Blocking file access with first-match fallback.
///
/// Holds no state; every call goes straight to the OS. Checks (`exists`,
/// `is_directory`, the `*_first_matched_*` and `load_any` lookups) turn I/O
/// errors into a negative answer, while `load` and the batch loaders report them.
#[derive(Debug, Clone, Copy, Default)]
pub struct FileLoader;

impl FileLoader {
    pub fn new() -> Self {
        Self
    }

    /// True iff `path` is a regular file that can be opened for reading.
    ///
    /// The file type is checked before opening; opening a FIFO for reading
    /// would block until a writer appears.
    pub fn exists(&self, path: impl AsRef<Path>) -> bool {
        let path = path.as_ref();
        let readable = fs::metadata(path).is_ok_and(|metadata| metadata.is_file())
            && fs::File::open(path).is_ok();
        tracing::trace!(path = %path.display(), readable, "checked");
        readable
    }

    pub fn is_directory(&self, path: impl AsRef<Path>) -> bool {
        fs::metadata(path)
            .map(|metadata| metadata.is_dir())
            .unwrap_or(false)
    }

    pub fn load(&self, path: impl AsRef<Path>) -> Result<Vec<u8>> {
        let path = path.as_ref();
        fs::read(path).map_err(|e| LoaderError::from_io(path, e))
    }

    /// First existing, non-excluded candidate for `path` across `extensions`,
    /// tried in order. See [`extension::candidates`] for the lookup order.
    pub fn get_with_first_matched_extension<E: AsRef<str>, X: AsRef<str>>(
        &self,
        path: impl AsRef<Path>,
        extensions: &[E],
        exclude: &[X],
    ) -> Option<PathBuf> {
        let path = path.as_ref();
        let matched = candidates(path, extensions)
            .into_iter()
            .find(|candidate| !is_excluded(candidate, exclude) && self.exists(candidate));
        if let Some(found) = &matched {
            tracing::debug!(matched = %found.display(), "extension matched");
        } else {
            tracing::debug!(path = %path.display(), "no extension matched");
        }
        matched
    }

    pub fn load_with_first_matched_extension<E: AsRef<str>, X: AsRef<str>>(
        &self,
        path: impl AsRef<Path>,
        extensions: &[E],
        exclude: &[X],
    ) -> Result<Option<LoadedFile>> {
        let Some(matched) = self.get_with_first_matched_extension(path, extensions, exclude) else {
            return Ok(None);
        };
        let contents = self.load(&matched)?;
        Ok(Some(LoadedFile {
            contents,
            path: matched,
        }))
    }

    /// Loads the first candidate that reads successfully. Failed candidates are skipped.
    pub fn load_any<P: AsRef<Path>>(&self, paths: &[P]) -> Option<LoadedFile> {
        for path in paths {
            let path = path.as_ref();
            match self.load(path) {
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

    /// Loads every path, in input order. The first failure aborts the batch.
    pub fn load_all<P: AsRef<Path>>(&self, paths: &[P]) -> Result<Vec<Vec<u8>>> {
        paths.iter().map(|path| self.load(path)).collect()
    }

    /// Files under `directory` accepted by `options`, in listing order.
    ///
    /// With `options.recursive`, a subdirectory's matches are spliced in where the
    /// subdirectory was listed; otherwise subdirectories are skipped.
    pub fn get_all_in_directory(
        &self,
        directory: impl AsRef<Path>,
        options: &ListOptions,
    ) -> Result<Vec<PathBuf>> {
        self.collect_directory(directory.as_ref(), &options.filter(), options.recursive)
    }

    fn collect_directory(
        &self,
        directory: &Path,
        filter: &ExtensionFilter,
        recursive: bool,
    ) -> Result<Vec<PathBuf>> {
        let entries = fs::read_dir(directory).map_err(|e| LoaderError::from_io(directory, e))?;
        let mut files = Vec::new();
        for entry in entries {
            let entry = entry.map_err(|e| LoaderError::from_io(directory, e))?;
            let path = entry.path();
            if listed_as_directory(&path)? {
                if recursive {
                    files.extend(self.collect_directory(&path, filter, recursive)?);
                }
            } else if filter.accepts(&path) {
                files.push(path);
            }
        }
        Ok(files)
    }

    pub fn load_all_in_directory(
        &self,
        directory: impl AsRef<Path>,
        options: &ListOptions,
    ) -> Result<Vec<Vec<u8>>> {
        let paths = self.get_all_in_directory(directory, options)?;
        self.load_all(&paths)
    }

    /// Hex SHA-256 of a file, or of every file below a directory.
    pub fn get_checksum(&self, path: impl AsRef<Path>) -> Result<String> {
        checksum::digest_path(path.as_ref())
    }
}

/// Classifies a listed entry, following symlinks. A dangling link counts as a
/// file; any other stat failure (e.g. a symlink loop) aborts the listing.
fn listed_as_directory(path: &Path) -> Result<bool> {
    match fs::metadata(path) {
        Ok(metadata) => Ok(metadata.is_dir()),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(false),
        Err(e) => Err(LoaderError::from_io(path, e)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    const NO_EXCLUDE: &[&str] = &[];

    fn write(dir: &TempDir, relative: &str, contents: &str) -> PathBuf {
        let path = dir.path().join(relative);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).expect("parent dir should be created");
        }
        fs::write(&path, contents).expect("fixture should write");
        path
    }

    fn names(paths: &[PathBuf], root: &Path) -> Vec<String> {
        let mut out = paths
            .iter()
            .map(|path| {
                path.strip_prefix(root)
                    .expect("listed path should be under root")
                    .to_string_lossy()
                    .replace('\\', "/")
            })
            .collect::<Vec<_>>();
        out.sort();
        out
    }

    #[test]
    fn exists_and_load_agree_on_real_files() {
        let dir = TempDir::new().expect("temp dir should be created");
        let file = write(&dir, "a.txt", "alpha");
        let empty = write(&dir, "empty.txt", "");

        let loader = FileLoader::new();
        assert!(loader.exists(&file));
        assert_eq!(loader.load(&file).expect("load should succeed"), b"alpha");
        assert!(loader.exists(&empty));
        assert!(loader.load(&empty).expect("empty load").is_empty());
    }

    #[test]
    fn missing_path_is_absent_and_load_reports_not_found() {
        let dir = TempDir::new().expect("temp dir should be created");
        let missing = dir.path().join("missing.txt");

        let loader = FileLoader::new();
        assert!(!loader.exists(&missing));
        assert!(!loader.is_directory(&missing));
        assert!(matches!(
            loader.load(&missing),
            Err(LoaderError::NotFound(p)) if p == missing
        ));
    }

    #[test]
    fn directories_are_not_files() {
        let dir = TempDir::new().expect("temp dir should be created");
        let loader = FileLoader::new();
        assert!(!loader.exists(dir.path()));
        assert!(loader.is_directory(dir.path()));
        assert!(loader.load(dir.path()).is_err());
    }

    #[cfg(unix)]
    fn make_fifo(path: &Path) {
        let status = std::process::Command::new("mkfifo")
            .arg(path)
            .status()
            .expect("mkfifo should run");
        assert!(status.success(), "mkfifo should succeed");
    }

    #[cfg(unix)]
    #[test]
    fn fifo_is_not_a_readable_file() {
        let dir = TempDir::new().expect("temp dir should be created");
        let pipe = dir.path().join("events.json");
        make_fifo(&pipe);

        let loader = FileLoader::new();
        assert!(!loader.exists(&pipe));
        assert!(!loader.is_directory(&pipe));
        let base = dir.path().join("events");
        assert_eq!(
            loader.get_with_first_matched_extension(&base, &["json"], NO_EXCLUDE),
            None
        );
    }

    #[cfg(unix)]
    #[test]
    fn unreadable_file_is_absent_and_load_reports_access_denied() {
        use std::os::unix::fs::PermissionsExt;

        let dir = TempDir::new().expect("temp dir should be created");
        let locked = write(&dir, "locked.txt", "secret");
        let open = write(&dir, "open.txt", "public");
        fs::set_permissions(&locked, fs::Permissions::from_mode(0o000))
            .expect("permissions should change");

        // Permission bits do not apply to root.
        if fs::read(&locked).is_ok() {
            return;
        }

        let loader = FileLoader::new();
        assert!(!loader.exists(&locked));
        assert!(matches!(
            loader.load(&locked),
            Err(LoaderError::AccessDenied(p)) if p == locked
        ));
        assert!(matches!(
            loader.load_all(&[&open, &locked]),
            Err(LoaderError::AccessDenied(_))
        ));
        let loaded = loader
            .load_any(&[&locked, &open])
            .expect("open.txt should load");
        assert_eq!(loaded.path, open);
        assert_eq!(loaded.contents, b"public");
    }

    #[cfg(unix)]
    #[test]
    fn recursive_listing_rejects_symlink_loop() {
        let dir = TempDir::new().expect("temp dir should be created");
        write(&dir, "a.txt", "a");
        std::os::unix::fs::symlink(".", dir.path().join("loop")).expect("symlink should create");

        let loader = FileLoader::new();
        let flat = loader
            .get_all_in_directory(dir.path(), &ListOptions::new())
            .expect("flat listing skips the link");
        assert_eq!(names(&flat, dir.path()), vec!["a.txt"]);
        assert!(matches!(
            loader.get_all_in_directory(dir.path(), &ListOptions::new().recursive(true)),
            Err(LoaderError::Io { .. })
        ));
    }

    #[test]
    fn first_matched_extension_follows_list_order() {
        let dir = TempDir::new().expect("temp dir should be created");
        write(&dir, "app.js", "js");
        write(&dir, "app.json", "json");
        let base = dir.path().join("app");

        let loader = FileLoader::new();
        assert_eq!(
            loader.get_with_first_matched_extension(&base, &["ts", "json", "js"], NO_EXCLUDE),
            Some(dir.path().join("app.json"))
        );
        assert_eq!(
            loader.get_with_first_matched_extension(&base, &[".js", "json"], NO_EXCLUDE),
            Some(dir.path().join("app.js"))
        );
        assert_eq!(
            loader.get_with_first_matched_extension(&base, &["yaml"], NO_EXCLUDE),
            None
        );
    }

    #[test]
    fn first_matched_extension_returns_path_already_carrying_it() {
        let dir = TempDir::new().expect("temp dir should be created");
        let file = write(&dir, "app.json", "{}");

        let loader = FileLoader::new();
        assert_eq!(
            loader.get_with_first_matched_extension(&file, &["json"], NO_EXCLUDE),
            Some(file.clone())
        );
    }

    #[test]
    fn first_matched_extension_honours_exclusions() {
        let dir = TempDir::new().expect("temp dir should be created");
        write(&dir, "types.d.ts", "declare");
        write(&dir, "types.ts.js", "compiled");
        let base = dir.path().join("types");

        let loader = FileLoader::new();
        assert_eq!(
            loader.get_with_first_matched_extension(&base, &["d.ts", "ts.js"], &[".d.ts"]),
            Some(dir.path().join("types.ts.js"))
        );
        assert_eq!(
            loader.get_with_first_matched_extension(&base, &["d.ts"], &[".d.ts"]),
            None
        );

        let configured_exclude = vec![String::from(".d.ts")];
        assert_eq!(
            loader.get_with_first_matched_extension(&base, &["d.ts", "ts.js"], &configured_exclude),
            Some(dir.path().join("types.ts.js"))
        );
    }

    #[test]
    fn load_with_first_matched_extension_pairs_bytes_and_path() {
        let dir = TempDir::new().expect("temp dir should be created");
        write(&dir, "settings.toml", "x = 1");
        let base = dir.path().join("settings");

        let loader = FileLoader::new();
        let loaded = loader
            .load_with_first_matched_extension(&base, &["json", "toml"], NO_EXCLUDE)
            .expect("load should not fail")
            .expect("a match should exist");
        assert_eq!(loaded.path, dir.path().join("settings.toml"));
        assert_eq!(loaded.contents, b"x = 1");

        assert!(loader
            .load_with_first_matched_extension(&base, &["yaml"], NO_EXCLUDE)
            .expect("load should not fail")
            .is_none());
    }

    #[test]
    fn load_any_returns_first_success_with_its_own_path() {
        let dir = TempDir::new().expect("temp dir should be created");
        let real = write(&dir, "real.txt", "real");
        let later = write(&dir, "later.txt", "later");
        let missing1 = dir.path().join("missing1.txt");
        let missing2 = dir.path().join("missing2.txt");

        let loader = FileLoader::new();
        let loaded = loader
            .load_any(&[&missing1, &missing2, &real, &later])
            .expect("real should load");
        assert_eq!(loaded.path, real);
        assert_eq!(loaded.contents, b"real");

        assert!(loader.load_any(&[&missing1, &missing2]).is_none());
        assert!(loader.load_any::<PathBuf>(&[]).is_none());
    }

    #[test]
    fn load_all_preserves_order_and_fails_whole_batch() {
        let dir = TempDir::new().expect("temp dir should be created");
        let first = write(&dir, "1.txt", "one");
        let second = write(&dir, "2.txt", "two");

        let loader = FileLoader::new();
        let loaded = loader
            .load_all(&[&second, &first])
            .expect("both files should load");
        assert_eq!(loaded, vec![b"two".to_vec(), b"one".to_vec()]);

        let missing = dir.path().join("3.txt");
        assert!(matches!(
            loader.load_all(&[&first, &missing]),
            Err(LoaderError::NotFound(_))
        ));
    }

    #[test]
    fn get_all_in_directory_filters_by_extension() {
        let dir = TempDir::new().expect("temp dir should be created");
        write(&dir, "notes.txt", "n");
        write(&dir, "README.md", "r");
        fs::create_dir_all(dir.path().join("nested")).expect("nested dir should create");

        let loader = FileLoader::new();
        let all = loader
            .get_all_in_directory(dir.path(), &ListOptions::new())
            .expect("listing should succeed");
        assert_eq!(names(&all, dir.path()), vec!["README.md", "notes.txt"]);

        let txt = loader
            .get_all_in_directory(dir.path(), &ListOptions::new().extensions(["txt"]))
            .expect("listing should succeed");
        assert_eq!(names(&txt, dir.path()), vec!["notes.txt"]);

        let none = loader
            .get_all_in_directory(
                dir.path(),
                &ListOptions::new().extensions([".weird_extension"]),
            )
            .expect("listing should succeed");
        assert!(none.is_empty());

        let excluded = loader
            .get_all_in_directory(dir.path(), &ListOptions::new().exclude([".md"]))
            .expect("listing should succeed");
        assert_eq!(names(&excluded, dir.path()), vec!["notes.txt"]);
    }

    #[test]
    fn get_all_in_directory_recurses_only_when_asked() {
        let dir = TempDir::new().expect("temp dir should be created");
        write(&dir, "a.txt", "a");
        write(&dir, "sub/b.txt", "b");
        write(&dir, "sub/deeper/c.txt", "c");

        let loader = FileLoader::new();
        let flat = loader
            .get_all_in_directory(dir.path(), &ListOptions::new())
            .expect("listing should succeed");
        assert_eq!(names(&flat, dir.path()), vec!["a.txt"]);

        let deep = loader
            .get_all_in_directory(dir.path(), &ListOptions::new().recursive(true))
            .expect("listing should succeed");
        assert_eq!(
            names(&deep, dir.path()),
            vec!["a.txt", "sub/b.txt", "sub/deeper/c.txt"]
        );
    }

    #[test]
    fn get_all_in_directory_reports_missing_directory() {
        let dir = TempDir::new().expect("temp dir should be created");
        let loader = FileLoader::new();
        assert!(matches!(
            loader.get_all_in_directory(dir.path().join("gone"), &ListOptions::new()),
            Err(LoaderError::NotFound(_))
        ));
    }

    #[test]
    fn load_all_in_directory_loads_listed_files_in_listing_order() {
        let dir = TempDir::new().expect("temp dir should be created");
        write(&dir, "a.json", "{\"a\":1}");
        write(&dir, "b.json", "{\"b\":2}");
        write(&dir, "c.txt", "skip");

        let loader = FileLoader::new();
        let options = ListOptions::new().extensions(["json"]);
        let listed = loader
            .get_all_in_directory(dir.path(), &options)
            .expect("listing should succeed");
        let loaded = loader
            .load_all_in_directory(dir.path(), &options)
            .expect("loading should succeed");
        assert_eq!(loaded.len(), 2);
        for (path, contents) in listed.iter().zip(&loaded) {
            assert_eq!(&fs::read(path).expect("fixture readable"), contents);
        }
    }
}
