use std::ffi::OsString;
use std::path::{Path, PathBuf};

/// Prefixes `.` when the caller left it off. Idempotent.
pub fn normalize(extension: &str) -> String {
    if extension.starts_with('.') {
        extension.to_string()
    } else {
        format!(".{extension}")
    }
}

/// Plain suffix comparison on the path's encoded bytes.
pub fn ends_with(path: &Path, suffix: &str) -> bool {
    path.as_os_str()
        .as_encoded_bytes()
        .ends_with(suffix.as_bytes())
}

/// `path` with `extension` appended verbatim, e.g. `config` + `.json` -> `config.json`.
pub fn with_appended(path: &Path, extension: &str) -> PathBuf {
    let mut raw = OsString::from(path.as_os_str());
    raw.push(extension);
    PathBuf::from(raw)
}

pub fn is_excluded<X: AsRef<str>>(path: &Path, exclude: &[X]) -> bool {
    exclude
        .iter()
        .any(|suffix| ends_with(path, suffix.as_ref()))
}

/// Paths to try, in order, when resolving `path` against `extensions`.
///
/// For each extension: `path` itself when it already carries that extension,
/// then `path` with the extension appended.
pub fn candidates<E: AsRef<str>>(path: &Path, extensions: &[E]) -> Vec<PathBuf> {
    let mut out = Vec::new();
    for extension in extensions {
        let extension = normalize(extension.as_ref());
        if ends_with(path, &extension) {
            out.push(path.to_path_buf());
        }
        out.push(with_appended(path, &extension));
    }
    out
}

/// Accept/reject rule for directory listings.
///
/// Extensions are normalized once up front; exclusions are compared as given.
#[derive(Debug, Clone, Default)]
pub struct ExtensionFilter {
    extensions: Vec<String>,
    exclude: Vec<String>,
}

impl ExtensionFilter {
    pub fn new<E: AsRef<str>, X: AsRef<str>>(extensions: &[E], exclude: &[X]) -> Self {
        Self {
            extensions: extensions
                .iter()
                .map(|extension| normalize(extension.as_ref()))
                .collect(),
            exclude: exclude
                .iter()
                .map(|suffix| suffix.as_ref().to_string())
                .collect(),
        }
    }

    pub fn has_valid_extension(&self, path: &Path) -> bool {
        self.extensions.is_empty()
            || self
                .extensions
                .iter()
                .any(|extension| ends_with(path, extension))
    }

    pub fn accepts(&self, path: &Path) -> bool {
        self.has_valid_extension(path) && !is_excluded(path, &self.exclude)
    }
}
