use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use super::bindings::{BindingEntry, ControlMap, DEFAULT_BINDINGS};
use super::registry::FieldTarget;
use super::translators::FieldValue;
use crate::utils::paths;

/// The live, typed game configuration.
///
/// Every field always holds a valid value; [`Default`] yields the built-in
/// defaults. The binding table has one row per entry of [`DEFAULT_BINDINGS`],
/// in the same order, with only the raw code being configurable.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
pub struct ConfigRecord {
    /// Game data directory.
    pub game_path: PathBuf,

    /// Language of the game text.
    pub game_language: String,

    /// Invert vertical mouse look.
    pub input_invert_y: bool,

    /// Key bindings, one row per control slot.
    pub bindings: Vec<BindingEntry>,

    pub window_width: i32,
    pub window_height: i32,
    pub window_fullscreen: bool,
}

impl Default for ConfigRecord {
    fn default() -> Self {
        Self {
            game_path: paths::default_game_path(),
            game_language: "american".to_string(),
            input_invert_y: false,
            bindings: DEFAULT_BINDINGS.to_vec(),
            window_width: 800,
            window_height: 600,
            window_fullscreen: false,
        }
    }
}

impl ConfigRecord {
    /// Current value of a field.
    ///
    /// A binding index past the table reads as `0` (no key); it can only come
    /// from a registry that was not built from [`DEFAULT_BINDINGS`].
    pub fn get(&self, target: FieldTarget) -> FieldValue {
        match target {
            FieldTarget::GamePath => FieldValue::Path(self.game_path.clone()),
            FieldTarget::GameLanguage => FieldValue::Text(self.game_language.clone()),
            FieldTarget::InputInvertY => FieldValue::Bool(self.input_invert_y),
            FieldTarget::Binding(idx) => {
                FieldValue::Int(self.bindings.get(idx).map_or(0, |b| b.code))
            }
            FieldTarget::WindowWidth => FieldValue::Int(self.window_width),
            FieldTarget::WindowHeight => FieldValue::Int(self.window_height),
            FieldTarget::WindowFullscreen => FieldValue::Bool(self.window_fullscreen),
        }
    }

    /// Assign a field. Returns `false`, leaving the record untouched, when the
    /// value has the wrong type or the binding index is out of range.
    pub fn set(&mut self, target: FieldTarget, value: FieldValue) -> bool {
        match (target, value) {
            (FieldTarget::GamePath, FieldValue::Path(p)) => self.game_path = p,
            (FieldTarget::GameLanguage, FieldValue::Text(s)) => self.game_language = s,
            (FieldTarget::InputInvertY, FieldValue::Bool(b)) => self.input_invert_y = b,
            (FieldTarget::Binding(idx), FieldValue::Int(code)) => match self.bindings.get_mut(idx) {
                Some(entry) => entry.code = code,
                None => return false,
            },
            (FieldTarget::WindowWidth, FieldValue::Int(i)) => self.window_width = i,
            (FieldTarget::WindowHeight, FieldValue::Int(i)) => self.window_height = i,
            (FieldTarget::WindowFullscreen, FieldValue::Bool(b)) => self.window_fullscreen = b,
            _ => return false,
        }
        true
    }

    /// Raw code to controls multimap for the input layer.
    pub fn controls(&self) -> ControlMap {
        ControlMap::from_entries(&self.bindings)
    }
}
