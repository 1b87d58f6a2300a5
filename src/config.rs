use crate::error::{LoaderError, Result};
use crate::loader::ListOptions;
use serde::Deserialize;
use std::path::{Path, PathBuf};
use toml::map::Map;
use toml::Value;

pub const DEFAULT_CONFIG_FILE: &str = "fileloader.toml";
pub const DEFAULT_LOCAL_FILE: &str = ".fileloader/local.toml";
pub const DEFAULT_GLOBAL_CONFIG_FILE: &str = ".config/fileloader/config.toml";

#[derive(Debug, Clone, Default, Deserialize)]
pub struct LoaderConfig {
    #[serde(default)]
    pub filters: FilterConfig,
}

/// Default filters applied by the CLI when no flags are given.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct FilterConfig {
    #[serde(default)]
    pub extensions: Vec<String>,
    #[serde(default)]
    pub exclude: Vec<String>,
    #[serde(default)]
    pub recursive: bool,
}

impl FilterConfig {
    /// Flags win over configured values; an empty flag list falls back to config.
    pub fn list_options(
        &self,
        extensions: &[String],
        exclude: &[String],
        recursive: bool,
    ) -> ListOptions {
        let pick = |flags: &[String], configured: &[String]| {
            if flags.is_empty() {
                configured.to_vec()
            } else {
                flags.to_vec()
            }
        };
        ListOptions::new()
            .extensions(pick(extensions, self.extensions.as_slice()))
            .exclude(pick(exclude, self.exclude.as_slice()))
            .recursive(recursive || self.recursive)
    }
}

pub fn load_config(root: &Path) -> Result<Option<LoaderConfig>> {
    let global = std::env::var_os("HOME")
        .map(PathBuf::from)
        .map(|home| home.join(DEFAULT_GLOBAL_CONFIG_FILE));
    load_config_with_global(root, global.as_deref())
}

pub(crate) fn load_config_with_global(
    root: &Path,
    global_path: Option<&Path>,
) -> Result<Option<LoaderConfig>> {
    let project_path = root.join(DEFAULT_CONFIG_FILE);
    if !project_path.exists() {
        return Ok(None);
    }

    let mut merged = Value::Table(Map::new());
    if let Some(path) = global_path {
        merge_file_if_exists(&mut merged, path)?;
    }
    merge_file_if_exists(&mut merged, &project_path)?;
    merge_file_if_exists(&mut merged, &root.join(DEFAULT_LOCAL_FILE))?;

    let cfg: LoaderConfig = merged
        .try_into()
        .map_err(|e: toml::de::Error| LoaderError::ConfigParse(e.to_string()))?;
    Ok(Some(cfg))
}

fn merge_file_if_exists(merged: &mut Value, path: &Path) -> Result<()> {
    if !path.exists() {
        return Ok(());
    }
    let value = read_toml_value(path)?;
    merge_toml(merged, value);
    Ok(())
}

fn read_toml_value(path: &Path) -> Result<Value> {
    let content = std::fs::read_to_string(path).map_err(|e| LoaderError::from_io(path, e))?;
    toml::from_str(&content)
        .map_err(|e| LoaderError::ConfigParse(format!("{}: {}", path.display(), e)))
}

fn merge_toml(base: &mut Value, overlay: Value) {
    match (base, overlay) {
        (Value::Table(base_table), Value::Table(overlay_table)) => {
            for (key, value) in overlay_table {
                match base_table.get_mut(&key) {
                    Some(existing) => merge_toml(existing, value),
                    None => {
                        base_table.insert(key, value);
                    }
                }
            }
        }
        (slot, value) => {
            *slot = value;
        }
    }
}
