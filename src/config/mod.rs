//! Configuration module for gameconf.
//!
//! Converts between the typed [`ConfigRecord`] and its INI text, in either
//! direction, through one engine ([`transcode`]) driven by the field
//! [`Registry`]. Collaborators normally only touch [`GameConfig`].
//!
//! Example:
//! use gameconf::config::GameConfig;
//!
//! let mut cfg = GameConfig::new();
//! if !cfg.load_file("config.ini") {
//!     eprintln!("{}", cfg.result());
//! }

pub mod bindings;
pub mod ini;
pub mod loader;
pub mod models;
pub mod registry;
pub mod result;
pub mod transcode;
pub mod translators;

// Re-export core data models
pub use bindings::{
    BindingEntry, BindingSlot, Control, ControlMap, DEFAULT_BINDINGS, InputContext, keycodes,
};
pub use models::ConfigRecord;
pub use registry::{FieldDescriptor, FieldTarget, Registry, RegistryError};
pub use result::{Outcome, TranscodeError, TranscodeResult, UnknownKeyTable};
pub use translators::{FieldValue, Translator, ValueKind};

// Re-export engine and loader utilities
pub use ini::{IniDocument, IniError};
pub use loader::{GameConfig, generate_schema, write_default_if_missing, write_schema_to_writer};
pub use transcode::{Destination, Kind, Source, transcode};
