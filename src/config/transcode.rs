//! The transcode engine.
//!
//! One driver, [`transcode`], moves every registered field from a [`Source`]
//! to a [`Destination`]:
//!
//! 1. The (source, destination) pair is checked against [`VALID_PAIRS`];
//!    `Default` is never a destination.
//! 2. A textual source is read and parsed. A syntax error aborts the run with
//!    [`Outcome::InvalidInputData`] before any field is looked at.
//! 3. Each field is resolved in registry order. Missing required keys and
//!    undecodable values are collected, never raised one by one.
//! 4. Unknown keys of a textual source are recorded; keys carried by the live
//!    record's last result are re-emitted into textual destinations.
//! 5. A live destination always receives the fields that resolved; a failed
//!    field keeps its previous value. A textual destination is written only
//!    when no field failed.

use std::fs;
use std::path::Path;

use tracing::{debug, error, trace, warn};

use super::ini::{IniDocument, IniError};
use super::models::ConfigRecord;
use super::registry::{FieldDescriptor, Registry};
use super::result::{Outcome, TranscodeResult};
use super::translators::FieldValue;

/// Endpoint kind, shared by sources and destinations.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum Kind {
    Default = 0,
    Live = 1,
    File = 2,
    String = 3,
}

/// Allowed (source, destination) pairs, indexed `[source][destination]`.
pub const VALID_PAIRS: [[bool; 4]; 4] = [
    // dest:  Default Live  File  String
    /* Default */ [false, true, true, true],
    /* Live    */ [false, true, true, true],
    /* File    */ [false, true, true, true],
    /* String  */ [false, true, true, true],
];

pub fn is_valid_pair(source: Kind, destination: Kind) -> bool {
    VALID_PAIRS[source as usize][destination as usize]
}

/// Where field values come from.
#[derive(Debug, Clone, Copy)]
pub enum Source<'a> {
    /// Built-in defaults, ignoring any prior state.
    Default,
    /// The caller's live record.
    Live,
    File(&'a Path),
    Text(&'a str),
}

impl Source<'_> {
    pub fn kind(&self) -> Kind {
        match self {
            Source::Default => Kind::Default,
            Source::Live => Kind::Live,
            Source::File(_) => Kind::File,
            Source::Text(_) => Kind::String,
        }
    }

    pub fn label(&self) -> String {
        match self {
            Source::File(path) => path.display().to_string(),
            _ => kind_label(self.kind()).to_string(),
        }
    }
}

/// Where resolved values go.
#[derive(Debug)]
pub enum Destination<'a> {
    /// Always rejected with [`Outcome::InvalidArgument`].
    Default,
    Live,
    File(&'a Path),
    Text(&'a mut String),
}

impl Destination<'_> {
    pub fn kind(&self) -> Kind {
        match self {
            Destination::Default => Kind::Default,
            Destination::Live => Kind::Live,
            Destination::File(_) => Kind::File,
            Destination::Text(_) => Kind::String,
        }
    }

    pub fn label(&self) -> String {
        match self {
            Destination::File(path) => path.display().to_string(),
            _ => kind_label(self.kind()).to_string(),
        }
    }

    fn is_textual(&self) -> bool {
        matches!(self, Destination::File(_) | Destination::Text(_))
    }
}

fn kind_label(kind: Kind) -> &'static str {
    match kind {
        Kind::Default => "<default>",
        Kind::Live => "<configuration>",
        Kind::File => "<file>",
        Kind::String => "<string>",
    }
}

/// Source after reading; textual sources are fully parsed up front.
enum SourceData {
    Default,
    Live,
    Document(IniDocument),
}

fn read_source(source: &Source<'_>) -> Result<SourceData, IniError> {
    match source {
        Source::Default => Ok(SourceData::Default),
        Source::Live => Ok(SourceData::Live),
        Source::File(path) => {
            let text = fs::read_to_string(path)
                .map_err(|e| IniError::new(0, format!("cannot open file: {e}")))?;
            IniDocument::parse(&text).map(SourceData::Document)
        }
        Source::Text(text) => IniDocument::parse(text).map(SourceData::Document),
    }
}

/// Look a field up in a parsed document, recording a failure when it cannot be used.
fn resolve_from_document(
    doc: &IniDocument,
    field: &FieldDescriptor,
    result: &mut TranscodeResult,
) -> Option<FieldValue> {
    let Some(raw) = doc.get(&field.name) else {
        if field.required {
            warn!(target: "gameconf::transcode", key = %field.name, "Required key is missing");
            result.fail_required_missing(&field.name);
            return None;
        }
        trace!(target: "gameconf::transcode", key = %field.name, "Using default");
        return Some(field.default.clone());
    };

    match field.translator().decode(raw) {
        Some(value) => Some(value),
        None => {
            warn!(
                target: "gameconf::transcode",
                key = %field.name, raw = %raw, kind = ?field.kind,
                "Key contains invalid data"
            );
            result.fail_invalid_data(&field.name);
            None
        }
    }
}

/// Run one transcode.
///
/// `record` is read for a `Live` source and updated for a `Live` destination,
/// where every field that failed keeps its previous value. `last` is the result attached to the live
/// record: its unknown keys are re-emitted when reading from `Live`, and it
/// receives the run's unknown keys when writing to `Live`.
pub fn transcode(
    registry: &Registry,
    record: &mut ConfigRecord,
    last: &mut TranscodeResult,
    source: Source<'_>,
    destination: Destination<'_>,
) -> TranscodeResult {
    let mut result = TranscodeResult::new(source.label(), destination.label());

    if !is_valid_pair(source.kind(), destination.kind()) {
        error!(
            target: "gameconf::transcode",
            source = ?source.kind(), destination = ?destination.kind(),
            "Destination cannot be the default config"
        );
        result.fail_argument();
        return result;
    }

    let data = match read_source(&source) {
        Ok(data) => data,
        Err(e) => {
            error!(
                target: "gameconf::transcode",
                input = %result.input_label(), line = e.line, message = %e.message,
                "Failed to read configuration source"
            );
            result.fail_input(e.line, e.message);
            return result;
        }
    };

    let textual_out = destination.is_textual();
    let mut working = record.clone();
    let mut staged = match &data {
        SourceData::Document(doc) if textual_out => doc.clone(),
        _ => IniDocument::new(),
    };

    for field in registry.iter() {
        let value = match &data {
            SourceData::Default => field.default.clone(),
            SourceData::Live => record.get(field.target),
            SourceData::Document(doc) => match resolve_from_document(doc, field, &mut result) {
                Some(value) => value,
                None => continue,
            },
        };

        if textual_out {
            staged.set(&field.name, field.translator().encode(&value));
        }
        if !working.set(field.target, value) {
            warn!(
                target: "gameconf::transcode",
                key = %field.name,
                "Value does not fit the record field"
            );
            result.fail_invalid_data(&field.name);
        }
    }

    match &data {
        SourceData::Document(doc) => {
            for (key, raw) in doc.entries() {
                if !registry.contains(&key) {
                    debug!(target: "gameconf::transcode", key = %key, "Unknown configuration key");
                    result.add_unknown(key, raw);
                }
            }
        }
        SourceData::Live => result.set_unknown(last.unknown().clone()),
        SourceData::Default => {}
    }

    match &destination {
        Destination::Live => {
            last.set_unknown(result.unknown().clone());
            *record = working;
        }
        Destination::File(_) | Destination::Text(_) => {
            for (key, raw) in result.unknown() {
                if !staged.set(key, raw.as_str()) {
                    warn!(target: "gameconf::transcode", key = %key, "Dropping undotted unknown key");
                }
            }
        }
        Destination::Default => {}
    }

    if result.has_content_errors() {
        warn!(
            target: "gameconf::transcode",
            input = %result.input_label(),
            missing = result.missing_required().len(),
            invalid = result.invalid_data().len(),
            "Configuration content is invalid"
        );
        return result;
    }

    match destination {
        Destination::File(path) => match staged.serialize() {
            Ok(text) => {
                if let Err(e) = fs::write(path, text) {
                    result.fail_output(0, format!("cannot write file: {e}"));
                }
            }
            Err(e) => result.fail_output(e.line, e.message),
        },
        Destination::Text(buffer) => match staged.serialize() {
            Ok(text) => *buffer = text,
            Err(e) => result.fail_output(e.line, e.message),
        },
        Destination::Live | Destination::Default => {}
    }

    if result.outcome() == Outcome::InvalidOutputData {
        error!(
            target: "gameconf::transcode",
            output = %result.output_label(), line = result.line(), message = %result.message(),
            "Failed to write configuration"
        );
    }

    result.finish();
    debug!(
        target: "gameconf::transcode",
        input = %result.input_label(), output = %result.output_label(),
        outcome = ?result.outcome(),
        "Transcode finished"
    );
    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::registry::{FieldDescriptor, FieldTarget};
    use std::path::PathBuf;

    fn run(
        record: &mut ConfigRecord,
        last: &mut TranscodeResult,
        source: Source<'_>,
        destination: Destination<'_>,
    ) -> TranscodeResult {
        transcode(Registry::standard(), record, last, source, destination)
    }

    fn load_str(text: &str) -> (ConfigRecord, TranscodeResult) {
        let mut record = ConfigRecord::default();
        let mut last = TranscodeResult::default();
        let result = run(&mut record, &mut last, Source::Text(text), Destination::Live);
        (record, result)
    }

    fn save_to_string(record: &mut ConfigRecord, last: &mut TranscodeResult) -> (String, TranscodeResult) {
        let mut out = String::new();
        let result = run(record, last, Source::Live, Destination::Text(&mut out));
        (out, result)
    }

    #[test]
    fn minimal_document_loads_with_defaults() {
        let (record, result) = load_str("[game]\npath=/x\n[window]\nwidth=1024\n");
        assert_eq!(result.outcome(), Outcome::Good);
        assert_eq!(record.game_path, PathBuf::from("/x"));
        assert_eq!(record.window_width, 1024);
        assert_eq!(record.window_height, 600);
        assert_eq!(record.game_language, "american");
        assert!(result.unknown().is_empty());
        assert_eq!(result.input_label(), "<string>");
        assert_eq!(result.output_label(), "<configuration>");
    }

    #[test]
    fn missing_required_key_is_reported() {
        let (record, result) = load_str("[window]\nwidth=1024\n");
        assert_eq!(result.outcome(), Outcome::InvalidContent);
        assert_eq!(result.missing_required(), ["game.path"]);
        assert!(result.invalid_data().is_empty());
        assert_eq!(record.window_width, 1024);
        assert_eq!(record.game_path, ConfigRecord::default().game_path);
    }

    #[test]
    fn all_missing_required_keys_are_collected_in_order() {
        let registry = Registry::new(vec![
            FieldDescriptor::required("game.path", PathBuf::from("/d"), FieldTarget::GamePath),
            FieldDescriptor::optional("window.width", 800, FieldTarget::WindowWidth),
            FieldDescriptor::required("game.language", "x", FieldTarget::GameLanguage),
        ])
        .unwrap();
        let mut record = ConfigRecord::default();
        let mut last = TranscodeResult::default();
        let result = transcode(
            &registry,
            &mut record,
            &mut last,
            Source::Text("[window]\nwidth=abc\n"),
            Destination::Live,
        );
        assert_eq!(result.outcome(), Outcome::InvalidContent);
        assert_eq!(result.missing_required(), ["game.path", "game.language"]);
        assert_eq!(result.invalid_data(), ["window.width"]);
    }

    #[test]
    fn invalid_value_only_flags_that_key() {
        let mut record = ConfigRecord::default();
        record.window_width = 800;
        let mut last = TranscodeResult::default();
        let result = run(
            &mut record,
            &mut last,
            Source::Text("[game]\npath=/x\n[window]\nwidth=notanumber\nheight=700\nfullscreen=1\n"),
            Destination::Live,
        );
        assert_eq!(result.outcome(), Outcome::InvalidContent);
        assert_eq!(result.invalid_data(), ["window.width"]);
        assert!(result.missing_required().is_empty());

        assert_eq!(record.game_path, PathBuf::from("/x"));
        assert_eq!(record.window_width, 800);
        assert_eq!(record.window_height, 700);
        assert!(record.window_fullscreen);
    }

    #[test]
    fn dotted_section_unknown_key_is_written_once() {
        let mut record = ConfigRecord::default();
        let mut last = TranscodeResult::default();
        let mut out = String::new();
        let result = run(
            &mut record,
            &mut last,
            Source::Text("[game]\npath=/x\n[mod.cfg]\nlevel=3\n"),
            Destination::Text(&mut out),
        );
        assert!(result.is_valid(), "{result}");
        assert_eq!(
            result.unknown().get("mod.cfg.level").map(String::as_str),
            Some("3")
        );
        assert!(out.contains("[mod.cfg]\nlevel=3\n"), "{out}");
        assert!(!out.contains("cfg.level"), "{out}");
        assert_eq!(out.matches("level=3").count(), 1);
        IniDocument::parse(&out).unwrap();
    }

    #[test]
    fn inline_comments_are_stripped_before_decoding() {
        let (record, result) =
            load_str("[game]\npath=/x ; data dir\nlanguage = german # de\n[window]\nwidth = 1280 ; wide\n");
        assert!(result.is_valid(), "{result}");
        assert_eq!(record.game_path, PathBuf::from("/x"));
        assert_eq!(record.game_language, "german");
        assert_eq!(record.window_width, 1280);
    }

    #[test]
    fn unknown_keys_pass_through_a_load_save_cycle() {
        let text = "[game]\npath=/x\nmods=on\n[extra]\nfoo = bar ; note\n";
        let mut record = ConfigRecord::default();
        let mut last = TranscodeResult::default();
        let loaded = run(&mut record, &mut last, Source::Text(text), Destination::Live);
        assert!(loaded.is_valid());
        assert_eq!(loaded.unknown().get("game.mods").map(String::as_str), Some("on"));
        assert_eq!(
            loaded.unknown().get("extra.foo").map(String::as_str),
            Some("bar ; note")
        );
        assert_eq!(last.unknown(), loaded.unknown());

        let (out, saved) = save_to_string(&mut record, &mut last);
        assert!(saved.is_valid());
        assert_eq!(saved.unknown(), loaded.unknown());
        let doc = IniDocument::parse(&out).unwrap();
        assert_eq!(doc.get("game.mods"), Some("on"));
        assert_eq!(doc.get("extra.foo"), Some("bar ; note"));
    }

    #[test]
    fn unknown_keys_survive_a_failed_load() {
        let mut record = ConfigRecord::default();
        let mut last = TranscodeResult::default();
        let loaded = run(
            &mut record,
            &mut last,
            Source::Text("[window]\nwidth=1\n[extra]\nfoo=bar\n"),
            Destination::Live,
        );
        assert_eq!(loaded.outcome(), Outcome::InvalidContent);
        assert_eq!(loaded.unknown().get("extra.foo").map(String::as_str), Some("bar"));

        let (out, saved) = save_to_string(&mut record, &mut last);
        assert!(saved.is_valid());
        assert!(out.contains("[extra]\nfoo=bar\n"));
    }

    #[test]
    fn failed_content_writes_no_output() {
        let mut record = ConfigRecord::default();
        let mut last = TranscodeResult::default();
        let mut out = String::from("untouched");
        let result = run(
            &mut record,
            &mut last,
            Source::Text("[window]\nwidth=1\n"),
            Destination::Text(&mut out),
        );
        assert_eq!(result.outcome(), Outcome::InvalidContent);
        assert_eq!(out, "untouched");
    }

    #[test]
    fn default_destination_is_always_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.ini");
        let sources = [
            Source::Default,
            Source::Live,
            Source::File(&path),
            Source::Text("[game]\npath=/x\n"),
            Source::Text("this is not a document"),
        ];
        for source in sources {
            let mut record = ConfigRecord::default();
            record.window_width = 1;
            let before = record.clone();
            let mut last = TranscodeResult::default();
            let result = run(&mut record, &mut last, source, Destination::Default);
            assert_eq!(result.outcome(), Outcome::InvalidArgument);
            assert_eq!(record, before);
            assert!(result.unknown().is_empty());
        }
        assert!(!path.exists());
    }

    #[test]
    fn syntax_error_aborts_before_field_resolution() {
        let (record, result) = load_str("[window]\nwidth=1\nwidth=2\n");
        assert_eq!(result.outcome(), Outcome::InvalidInputData);
        assert_eq!(result.line(), 3);
        assert!(result.missing_required().is_empty());
        assert_eq!(record, ConfigRecord::default());
    }

    #[test]
    fn missing_file_is_invalid_input() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("absent.ini");
        let mut record = ConfigRecord::default();
        let mut last = TranscodeResult::default();
        let result = run(&mut record, &mut last, Source::File(&path), Destination::Live);
        assert_eq!(result.outcome(), Outcome::InvalidInputData);
        assert_eq!(result.line(), 0);
        assert_eq!(result.input_label(), path.display().to_string());
    }

    #[test]
    fn unwritable_value_is_invalid_output() {
        let mut record = ConfigRecord::default();
        record.game_language = "two\nlines".into();
        let mut last = TranscodeResult::default();
        let mut out = String::new();
        let result = run(&mut record, &mut last, Source::Live, Destination::Text(&mut out));
        assert_eq!(result.outcome(), Outcome::InvalidOutputData);
        assert_eq!(result.line(), 3);
        assert!(out.is_empty());
    }

    #[test]
    fn live_roundtrip_preserves_every_field() {
        let mut record = ConfigRecord::default();
        record.game_path = PathBuf::from("/games/city");
        record.game_language = "spanish".into();
        record.input_invert_y = true;
        record.window_width = i32::MAX;
        record.window_height = -1;
        record.window_fullscreen = true;
        record.bindings[3].code = 0;
        record.bindings[10].code = i32::MIN;

        let mut last = TranscodeResult::default();
        let (text, saved) = save_to_string(&mut record, &mut last);
        assert!(saved.is_valid(), "{saved}");

        let (reloaded, result) = load_str(&text);
        assert!(result.is_valid(), "{result}");
        assert_eq!(reloaded, record);
    }

    #[test]
    fn file_roundtrip_through_live() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.ini");
        fs::write(&path, "[game]\npath=/x\nlanguage=french\n[input]\ninvert_y=1\n").unwrap();

        let mut record = ConfigRecord::default();
        let mut last = TranscodeResult::default();
        let loaded = run(&mut record, &mut last, Source::File(&path), Destination::Live);
        assert!(loaded.is_valid(), "{loaded}");
        assert!(record.input_invert_y);

        record.window_fullscreen = true;
        let saved = run(&mut record, &mut last, Source::Live, Destination::File(&path));
        assert!(saved.is_valid(), "{saved}");
        assert_eq!(saved.output_label(), path.display().to_string());

        let mut reloaded = ConfigRecord::default();
        let mut last2 = TranscodeResult::default();
        let again = run(&mut reloaded, &mut last2, Source::File(&path), Destination::Live);
        assert!(again.is_valid());
        assert_eq!(reloaded, record);
    }

    #[test]
    fn defaults_serialize_in_registry_order() {
        let mut record = ConfigRecord::default();
        let mut last = TranscodeResult::default();
        let mut out = String::new();
        let result = run(&mut record, &mut last, Source::Default, Destination::Text(&mut out));
        assert!(result.is_valid());
        assert!(out.starts_with("[game]\npath="));
        assert!(out.contains("\nlanguage=american\n\n[input]\ninvert_y=0\nkey_onFoot_FireWeapon="));
        assert!(out.ends_with("[window]\nwidth=800\nheight=600\nfullscreen=0\n"));

        let (reloaded, result) = load_str(&out);
        assert!(result.is_valid());
        assert_eq!(reloaded, ConfigRecord::default());
    }

    #[test]
    fn default_source_ignores_live_state() {
        let mut record = ConfigRecord::default();
        record.window_width = 3;
        let mut last = TranscodeResult::default();
        let result = run(&mut record, &mut last, Source::Default, Destination::Live);
        assert!(result.is_valid());
        assert_eq!(record, ConfigRecord::default());
    }

    #[test]
    fn text_to_text_fills_defaults_and_keeps_layout() {
        let mut record = ConfigRecord::default();
        let mut last = TranscodeResult::default();
        let mut out = String::new();
        let result = run(
            &mut record,
            &mut last,
            Source::Text("[extra]\nkeep=me\n[game]\npath=/x\n"),
            Destination::Text(&mut out),
        );
        assert!(result.is_valid());
        assert!(out.starts_with("[extra]\nkeep=me\n\n[game]\npath=/x\nlanguage=american\n"));
        assert!(out.contains("[window]\nwidth=800\n"));
        assert_eq!(record, ConfigRecord::default());
    }

    #[test]
    fn pair_table_rejects_only_default_destination() {
        for source in [Kind::Default, Kind::Live, Kind::File, Kind::String] {
            assert!(!is_valid_pair(source, Kind::Default));
            for destination in [Kind::Live, Kind::File, Kind::String] {
                assert!(is_valid_pair(source, destination));
            }
        }
    }
}
