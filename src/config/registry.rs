//! The typed field registry: every known configuration key, in document order.
//!
//! Registration is static. [`Registry::standard`] returns the process-wide
//! registry built once from [`standard_fields`]; the binding table expands into
//! one integer field per [`BindingEntry`].

use std::collections::HashMap;
use std::sync::LazyLock;

use thiserror::Error;

use super::bindings::{BindingEntry, DEFAULT_BINDINGS};
use super::translators::{FieldValue, Translator, ValueKind};
use crate::utils::paths;

/// Where a field lives inside a [`ConfigRecord`](super::models::ConfigRecord).
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum FieldTarget {
    GamePath,
    GameLanguage,
    InputInvertY,
    /// Index into the binding table.
    Binding(usize),
    WindowWidth,
    WindowHeight,
    WindowFullscreen,
}

/// Declaration of one field.
#[derive(Debug, Clone)]
pub struct FieldDescriptor {
    /// Dotted `section.key` name.
    pub name: String,
    pub kind: ValueKind,
    pub default: FieldValue,
    pub required: bool,
    pub target: FieldTarget,
}

impl FieldDescriptor {
    pub fn optional(
        name: impl Into<String>,
        default: impl Into<FieldValue>,
        target: FieldTarget,
    ) -> Self {
        let default = default.into();
        Self {
            name: name.into(),
            kind: default.kind(),
            default,
            required: false,
            target,
        }
    }

    pub fn required(
        name: impl Into<String>,
        default: impl Into<FieldValue>,
        target: FieldTarget,
    ) -> Self {
        Self {
            required: true,
            ..Self::optional(name, default, target)
        }
    }

    pub fn translator(&self) -> &'static dyn Translator {
        self.kind.translator()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RegistryError {
    #[error("field '{0}' is declared more than once")]
    DuplicateField(String),
    #[error("field name '{0}' is not of the form section.key")]
    InvalidName(String),
    #[error("default of field '{name}' is {found:?}, expected {expected:?}")]
    KindMismatch {
        name: String,
        expected: ValueKind,
        found: ValueKind,
    },
}

/// Ordered, name-unique list of field descriptors.
#[derive(Debug, Clone)]
pub struct Registry {
    fields: Vec<FieldDescriptor>,
    by_name: HashMap<String, usize>,
}

impl Registry {
    /// Build a registry, rejecting duplicate or malformed names.
    pub fn new(fields: Vec<FieldDescriptor>) -> Result<Self, RegistryError> {
        let mut by_name = HashMap::with_capacity(fields.len());
        for (idx, field) in fields.iter().enumerate() {
            match field.name.split_once('.') {
                Some((section, key)) if !section.is_empty() && !key.is_empty() => {}
                _ => return Err(RegistryError::InvalidName(field.name.clone())),
            }
            if field.default.kind() != field.kind {
                return Err(RegistryError::KindMismatch {
                    name: field.name.clone(),
                    expected: field.kind,
                    found: field.default.kind(),
                });
            }
            if by_name.insert(field.name.clone(), idx).is_some() {
                return Err(RegistryError::DuplicateField(field.name.clone()));
            }
        }
        Ok(Self { fields, by_name })
    }

    /// The built-in registry shared by the whole process.
    pub fn standard() -> &'static Registry {
        static STANDARD: LazyLock<Registry> = LazyLock::new(|| {
            Registry::new(standard_fields()).expect("built-in field names are unique")
        });
        &STANDARD
    }

    pub fn get(&self, name: &str) -> Option<&FieldDescriptor> {
        self.by_name.get(name).map(|&idx| &self.fields[idx])
    }

    pub fn contains(&self, name: &str) -> bool {
        self.by_name.contains_key(name)
    }

    pub fn iter(&self) -> impl Iterator<Item = &FieldDescriptor> {
        self.fields.iter()
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

fn binding_field(idx: usize, entry: &BindingEntry) -> FieldDescriptor {
    FieldDescriptor::optional(entry.field_name(), entry.code, FieldTarget::Binding(idx))
}

/// Field declarations in document order.
///
/// New settings go here and into [`ConfigRecord`](super::models::ConfigRecord).
pub fn standard_fields() -> Vec<FieldDescriptor> {
    use FieldTarget as T;

    let mut fields = vec![
        FieldDescriptor::required("game.path", paths::default_game_path(), T::GamePath),
        FieldDescriptor::optional("game.language", "american", T::GameLanguage),
        FieldDescriptor::optional("input.invert_y", false, T::InputInvertY),
    ];
    fields.extend(
        DEFAULT_BINDINGS
            .iter()
            .enumerate()
            .map(|(idx, entry)| binding_field(idx, entry)),
    );
    fields.extend([
        FieldDescriptor::optional("window.width", 800, T::WindowWidth),
        FieldDescriptor::optional("window.height", 600, T::WindowHeight),
        FieldDescriptor::optional("window.fullscreen", false, T::WindowFullscreen),
    ]);
    fields
}
