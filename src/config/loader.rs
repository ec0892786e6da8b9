use anyhow::{Context, Result};
use schemars::{Schema, schema_for};
use std::io::Write;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

use super::models::ConfigRecord;
use super::registry::Registry;
use super::result::{TranscodeError, TranscodeResult};
use super::transcode::{Destination, Source, transcode};

/// The game configuration as seen by the rest of the application.
///
/// Owns the live [`ConfigRecord`], the file it was loaded from and the result of
/// the last load. Unknown keys of that load are kept in the result and written
/// back by [`GameConfig::save`].
#[derive(Debug, Clone, Default)]
pub struct GameConfig {
    path: PathBuf,
    record: ConfigRecord,
    result: TranscodeResult,
}

impl GameConfig {
    /// A configuration holding the built-in defaults and no load result.
    pub fn new() -> Self {
        Self::default()
    }

    /// Load `path` into the live record. Returns whether the load succeeded.
    ///
    /// The path is remembered for [`GameConfig::save`] even when loading fails.
    pub fn load_file<P: AsRef<Path>>(&mut self, path: P) -> bool {
        self.path = path.as_ref().to_path_buf();
        let result = transcode(
            Registry::standard(),
            &mut self.record,
            &mut self.result,
            Source::File(&self.path),
            Destination::Live,
        );
        self.finish_load(result)
    }

    /// Load an in-memory document into the live record.
    pub fn load_str(&mut self, text: &str) -> bool {
        let result = transcode(
            Registry::standard(),
            &mut self.record,
            &mut self.result,
            Source::Text(text),
            Destination::Live,
        );
        self.finish_load(result)
    }

    fn finish_load(&mut self, result: TranscodeResult) -> bool {
        if result.is_valid() {
            debug!(target: "gameconf::loader", input = %result.input_label(), "Loaded configuration");
        } else {
            warn!(target: "gameconf::loader", "{result}");
        }
        self.result = result;
        self.is_valid()
    }

    /// Write the live record, plus carried unknown keys, to the loaded file.
    pub fn save(&mut self) -> TranscodeResult {
        let result = transcode(
            Registry::standard(),
            &mut self.record,
            &mut self.result,
            Source::Live,
            Destination::File(&self.path),
        );
        if result.is_valid() {
            info!(target: "gameconf::loader", path = %self.path.display(), "Saved configuration");
        }
        result
    }

    /// Serialize the live record, plus carried unknown keys, into a string.
    pub fn to_document_text(&mut self) -> Result<String, TranscodeError> {
        let mut text = String::new();
        transcode(
            Registry::standard(),
            &mut self.record,
            &mut self.result,
            Source::Live,
            Destination::Text(&mut text),
        )
        .into_checked()?;
        Ok(text)
    }

    /// Document text of an all-defaults configuration, used to seed a new file.
    pub fn default_document_text() -> Result<String, TranscodeError> {
        let mut record = ConfigRecord::default();
        let mut last = TranscodeResult::default();
        let mut text = String::new();
        transcode(
            Registry::standard(),
            &mut record,
            &mut last,
            Source::Default,
            Destination::Text(&mut text),
        )
        .into_checked()?;
        Ok(text)
    }

    /// Whether the last load succeeded.
    pub fn is_valid(&self) -> bool {
        self.result.is_valid()
    }

    /// Result of the last load.
    pub fn result(&self) -> &TranscodeResult {
        &self.result
    }

    pub fn config_path(&self) -> &Path {
        &self.path
    }

    pub fn set_config_path<P: Into<PathBuf>>(&mut self, path: P) {
        self.path = path.into();
    }

    pub fn record(&self) -> &ConfigRecord {
        &self.record
    }

    pub fn record_mut(&mut self) -> &mut ConfigRecord {
        &mut self.record
    }
}

/// Write the default document to `path` unless a file already exists there.
///
/// Returns `true` when a file was created.
pub fn write_default_if_missing<P: AsRef<Path>>(path: P) -> Result<bool> {
    let path_ref = path.as_ref();
    if path_ref.exists() {
        return Ok(false);
    }
    if let Some(parent) = path_ref.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create config directory {}", parent.display()))?;
    }
    let text = GameConfig::default_document_text().context("Failed to render default config")?;
    std::fs::write(path_ref, text)
        .with_context(|| format!("Failed to write config file {}", path_ref.display()))?;
    info!(target: "gameconf::loader", path = %path_ref.display(), "Wrote default configuration");
    Ok(true)
}

/// Generate the JSON Schema for [`ConfigRecord`] (for external tooling).
pub fn generate_schema() -> Schema {
    schema_for!(ConfigRecord)
}

/// Write the JSON Schema for [`ConfigRecord`] to any writer (pretty-printed).
pub fn write_schema_to_writer<W: Write>(mut writer: W) -> Result<()> {
    let schema = generate_schema();
    let json = serde_json::to_string_pretty(&schema).context("Failed to serialize schema")?;
    writer
        .write_all(json.as_bytes())
        .context("Failed to write schema to writer")?;
    Ok(())
}
