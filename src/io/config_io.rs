use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use crate::io::store::atomic_write;
use crate::model::config::NookConfig;

pub const CONFIG_FILE: &str = "nook.toml";

/// Written by `nook init`
pub const DEFAULT_CONFIG: &str = r#"[todos]
show_done = true

[bookmarks]
default_color = "default"

[scratch]
default_language = "plaintext"
"#;

/// Error type for config I/O
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("could not read {path}: {source}")]
    ReadError { path: PathBuf, source: io::Error },
    #[error("could not write {path}: {source}")]
    WriteError { path: PathBuf, source: io::Error },
    #[error("could not parse nook.toml: {0}")]
    ParseError(#[from] toml::de::Error),
    #[error("could not parse nook.toml: {0}")]
    DocumentError(#[from] toml_edit::TomlError),
    #[error("unknown config key: {0} (expected section.key)")]
    UnknownKey(String),
    #[error("invalid value for {key}: {reason}")]
    InvalidValue { key: String, reason: String },
}

/// Read the config, returning both the parsed config and the raw
/// toml_edit document for formatting-preserving edits. A missing file
/// yields defaults and an empty document.
pub fn read_config(data_dir: &Path) -> Result<(NookConfig, toml_edit::DocumentMut), ConfigError> {
    let path = data_dir.join(CONFIG_FILE);
    let text = match fs::read_to_string(&path) {
        Ok(text) => text,
        Err(e) if e.kind() == io::ErrorKind::NotFound => String::new(),
        Err(e) => return Err(ConfigError::ReadError { path, source: e }),
    };
    let config: NookConfig = toml::from_str(&text)?;
    let doc: toml_edit::DocumentMut = text.parse()?;
    Ok((config, doc))
}

/// Write the config document back to disk, preserving formatting.
pub fn write_config(data_dir: &Path, doc: &toml_edit::DocumentMut) -> Result<(), ConfigError> {
    let path = data_dir.join(CONFIG_FILE);
    atomic_write(&path, doc.to_string().as_bytes()).map_err(|e| ConfigError::WriteError { path, source: e })
}

fn split_key(key: &str) -> Result<(&str, &str), ConfigError> {
    match key.split_once('.') {
        Some((section, field)) if !section.is_empty() && !field.is_empty() => Ok((section, field)),
        _ => Err(ConfigError::UnknownKey(key.to_string())),
    }
}

/// Effective value of `section.key`, defaults included.
pub fn get_value(config: &NookConfig, key: &str) -> Result<String, ConfigError> {
    let value = toml::Value::try_from(config).map_err(|e| ConfigError::InvalidValue {
        key: key.to_string(),
        reason: e.to_string(),
    })?;
    let (section, field) = split_key(key)?;
    match value.get(section).and_then(|s| s.get(field)) {
        Some(toml::Value::String(s)) => Ok(s.clone()),
        Some(other) => Ok(other.to_string()),
        None => Err(ConfigError::UnknownKey(key.to_string())),
    }
}

/// Set `section.key` in the document. The value is typed after the current
/// one (`true`/`false` for flags, text otherwise) and the whole document must
/// still parse as a config. Returns the config it now describes.
pub fn set_value(doc: &mut toml_edit::DocumentMut, key: &str, raw: &str) -> Result<NookConfig, ConfigError> {
    let (section, field) = split_key(key)?;
    let current = get_value(&NookConfig::default(), key)?;

    let item = if current == "true" || current == "false" {
        let flag: bool = raw.parse().map_err(|_| ConfigError::InvalidValue {
            key: key.to_string(),
            reason: format!("expected true or false, got {}", raw),
        })?;
        toml_edit::value(flag)
    } else {
        toml_edit::value(raw)
    };

    let mut edited = doc.clone();
    if !edited.contains_key(section) {
        edited[section] = toml_edit::Item::Table(toml_edit::Table::new());
    }
    edited[section][field] = item;

    let config = toml::from_str(&edited.to_string()).map_err(|e: toml::de::Error| ConfigError::InvalidValue {
        key: key.to_string(),
        reason: e.message().to_string(),
    })?;
    *doc = edited;
    Ok(config)
}
