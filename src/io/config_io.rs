use std::fs;
use std::path::{Path, PathBuf};

use crate::io::recovery;
use crate::io::store_io::data_dir;
use crate::model::config::AppConfig;
use crate::ops::view::{FilterMode, SortMode};

/// Keys accepted by `config get` / `config set`
pub const CONFIG_KEYS: &[&str] = &[
    "view.filter",
    "view.sort",
    "ui.show_key_hints",
    "ui.status_timeout_ms",
];

/// Error type for config file access
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("could not read {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("could not write {path}: {source}")]
    Write {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("invalid config file: {0}")]
    Parse(#[from] toml_edit::TomlError),
    #[error("unknown config key: {0} (expected one of: {keys})", keys = CONFIG_KEYS.join(", "))]
    UnknownKey(String),
    #[error("invalid value for {key}: {value:?} (expected {expected})")]
    InvalidValue {
        key: String,
        value: String,
        expected: &'static str,
    },
}

/// Default config location: `<config-dir>/taskterm/config.toml`
pub fn config_path() -> PathBuf {
    data_dir().join("config.toml")
}

/// Load the config, falling back to defaults. A missing file is silent; an
/// unreadable or invalid one is reported on stderr.
pub fn load_config(path: &Path) -> AppConfig {
    let text = match fs::read_to_string(path) {
        Ok(text) => text,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return AppConfig::default(),
        Err(e) => {
            eprintln!("warning: could not read {}: {}", path.display(), e);
            return AppConfig::default();
        }
    };
    match toml::from_str(&text) {
        Ok(config) => config,
        Err(e) => {
            eprintln!(
                "warning: ignoring invalid config {}: {}",
                path.display(),
                e.message()
            );
            AppConfig::default()
        }
    }
}

/// Read the config as an editable document. A missing file is an empty one.
pub fn read_document(path: &Path) -> Result<toml_edit::DocumentMut, ConfigError> {
    let text = match fs::read_to_string(path) {
        Ok(text) => text,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => String::new(),
        Err(e) => {
            return Err(ConfigError::Read {
                path: path.to_path_buf(),
                source: e,
            });
        }
    };
    Ok(text.parse()?)
}

/// Write the document back, preserving comments and layout.
pub fn write_document(path: &Path, doc: &toml_edit::DocumentMut) -> Result<(), ConfigError> {
    let write_err = |e: std::io::Error| ConfigError::Write {
        path: path.to_path_buf(),
        source: e,
    };
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).map_err(write_err)?;
    }
    recovery::atomic_write(path, doc.to_string().as_bytes()).map_err(write_err)
}

fn split_key(key: &str) -> Result<(&str, &str), ConfigError> {
    if !CONFIG_KEYS.contains(&key) {
        return Err(ConfigError::UnknownKey(key.to_string()));
    }
    // every known key is `section.name`
    key.split_once('.')
        .ok_or_else(|| ConfigError::UnknownKey(key.to_string()))
}

/// Current value of `key`, or None when the file does not set it.
pub fn get_value(doc: &toml_edit::DocumentMut, key: &str) -> Result<Option<String>, ConfigError> {
    let (section, name) = split_key(key)?;
    let value = doc
        .get(section)
        .and_then(|s| s.get(name))
        .and_then(|item| item.as_value())
        .map(|v| match v.as_str() {
            Some(s) => s.to_string(),
            None => v.to_string().trim().to_string(),
        });
    Ok(value)
}

/// Value `key` takes when the file does not set it
pub fn default_value(key: &str) -> Result<String, ConfigError> {
    let defaults = AppConfig::default();
    let value = match key {
        "view.filter" => defaults.view.filter.to_string(),
        "view.sort" => defaults.view.sort.to_string(),
        "ui.show_key_hints" => defaults.ui.show_key_hints.to_string(),
        "ui.status_timeout_ms" => defaults.ui.status_timeout_ms.to_string(),
        _ => return Err(ConfigError::UnknownKey(key.to_string())),
    };
    Ok(value)
}

/// Validate `raw` for `key` and store it in the document.
pub fn set_value(doc: &mut toml_edit::DocumentMut, key: &str, raw: &str) -> Result<(), ConfigError> {
    let (section, name) = split_key(key)?;
    let invalid = |expected| ConfigError::InvalidValue {
        key: key.to_string(),
        value: raw.to_string(),
        expected,
    };
    let value = match key {
        "view.filter" => {
            let mode = FilterMode::parse(raw).ok_or_else(|| invalid("all, completed or uncompleted"))?;
            toml_edit::value(mode.as_str())
        }
        "view.sort" => {
            let mode = SortMode::parse(raw)
                .ok_or_else(|| invalid("default, priority, due-date or created"))?;
            toml_edit::value(mode.as_str())
        }
        "ui.show_key_hints" => {
            let b: bool = raw.parse().map_err(|_| invalid("true or false"))?;
            toml_edit::value(b)
        }
        "ui.status_timeout_ms" => {
            let ms: i64 = raw
                .parse()
                .ok()
                .filter(|ms| *ms >= 0)
                .ok_or_else(|| invalid("a non-negative number of milliseconds"))?;
            toml_edit::value(ms)
        }
        _ => return Err(ConfigError::UnknownKey(key.to_string())),
    };

    if !doc.contains_key(section) {
        doc[section] = toml_edit::Item::Table(toml_edit::Table::new());
    }
    doc[section][name] = value;
    Ok(())
}
