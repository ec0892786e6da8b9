//! Outcome and diagnostics of one transcode.

use serde::Serialize;
use std::collections::BTreeMap;
use std::fmt;
use thiserror::Error;

/// Keys found in a textual source that no field declares, with their raw text.
pub type UnknownKeyTable = BTreeMap<String, String>;

/// Terminal outcome of a transcode.
#[derive(Debug, Copy, Clone, Serialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum Outcome {
    /// No transcode has run yet.
    #[default]
    Uninitialized,
    Good,
    /// `Default` was selected as destination.
    InvalidArgument,
    /// The textual source could not be read or parsed.
    InvalidInputData,
    /// The textual destination could not be serialized or written.
    InvalidOutputData,
    /// Required fields were missing or values failed to decode.
    InvalidContent,
}

/// Full diagnostics of one transcode call.
#[derive(Debug, Clone, Serialize, PartialEq, Eq, Default)]
pub struct TranscodeResult {
    outcome: Outcome,
    input: String,
    output: String,
    line: usize,
    message: String,
    missing_required: Vec<String>,
    invalid_data: Vec<String>,
    unknown: UnknownKeyTable,
}

impl TranscodeResult {
    /// A fresh result for a run between the two labeled endpoints.
    pub fn new(input: impl Into<String>, output: impl Into<String>) -> Self {
        Self {
            input: input.into(),
            output: output.into(),
            ..Self::default()
        }
    }

    pub fn outcome(&self) -> Outcome {
        self.outcome
    }

    pub fn is_valid(&self) -> bool {
        self.outcome == Outcome::Good
    }

    pub fn input_label(&self) -> &str {
        &self.input
    }

    pub fn output_label(&self) -> &str {
        &self.output
    }

    /// Line of a document-level failure (0 when not tied to a line).
    pub fn line(&self) -> usize {
        self.line
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn missing_required(&self) -> &[String] {
        &self.missing_required
    }

    pub fn invalid_data(&self) -> &[String] {
        &self.invalid_data
    }

    pub fn unknown(&self) -> &UnknownKeyTable {
        &self.unknown
    }

    /// True once any field-level problem has been recorded.
    pub fn has_content_errors(&self) -> bool {
        !self.missing_required.is_empty() || !self.invalid_data.is_empty()
    }

    pub(crate) fn fail_argument(&mut self) {
        self.outcome = Outcome::InvalidArgument;
    }

    pub(crate) fn fail_input(&mut self, line: usize, message: impl Into<String>) {
        self.outcome = Outcome::InvalidInputData;
        self.line = line;
        self.message = message.into();
    }

    pub(crate) fn fail_output(&mut self, line: usize, message: impl Into<String>) {
        self.outcome = Outcome::InvalidOutputData;
        self.line = line;
        self.message = message.into();
    }

    pub(crate) fn fail_required_missing(&mut self, key: impl Into<String>) {
        self.outcome = Outcome::InvalidContent;
        self.missing_required.push(key.into());
    }

    pub(crate) fn fail_invalid_data(&mut self, key: impl Into<String>) {
        self.outcome = Outcome::InvalidContent;
        self.invalid_data.push(key.into());
    }

    pub(crate) fn add_unknown(&mut self, key: impl Into<String>, raw: impl Into<String>) {
        self.unknown.insert(key.into(), raw.into());
    }

    pub(crate) fn set_unknown(&mut self, unknown: UnknownKeyTable) {
        self.unknown = unknown;
    }

    /// Mark the run successful unless another outcome was already recorded.
    pub(crate) fn finish(&mut self) {
        if self.outcome == Outcome::Uninitialized {
            self.outcome = Outcome::Good;
        }
    }

    /// `Ok(self)` when good, otherwise a [`TranscodeError`] carrying the result.
    pub fn into_checked(self) -> Result<Self, TranscodeError> {
        if self.is_valid() {
            Ok(self)
        } else {
            Err(TranscodeError {
                result: Box::new(self),
            })
        }
    }
}

impl fmt::Display for TranscodeResult {
    /// Multi-line human summary, always listing every problem key and unknown key.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.outcome {
            Outcome::Uninitialized => f.write_str("Parsing was skipped or did not finish.")?,
            Outcome::Good => f.write_str("Parsing completed without errors.")?,
            Outcome::InvalidArgument => {
                f.write_str("Invalid argument: destination cannot be the default config.")?
            }
            Outcome::InvalidInputData => write!(
                f,
                "Error while reading \"{}\":{}:\n{}.",
                self.input, self.line, self.message
            )?,
            Outcome::InvalidOutputData => write!(
                f,
                "Error while writing \"{}\":{}:\n{}.",
                self.output, self.line, self.message
            )?,
            Outcome::InvalidContent => write!(f, "Error while parsing \"{}\".", self.input)?,
        }
        if !self.missing_required.is_empty() {
            f.write_str("\nRequired keys that are missing:")?;
            for key in &self.missing_required {
                write!(f, "\n - {key}")?;
            }
        }
        if !self.invalid_data.is_empty() {
            f.write_str("\nKeys that contain invalid data:")?;
            for key in &self.invalid_data {
                write!(f, "\n - {key}")?;
            }
        }
        if !self.unknown.is_empty() {
            f.write_str("\nUnknown configuration keys:")?;
            for key in self.unknown.keys() {
                write!(f, "\n - {key}")?;
            }
        }
        Ok(())
    }
}

/// A transcode that did not end [`Outcome::Good`].
#[derive(Debug, Clone, Error)]
#[error("{result}")]
pub struct TranscodeError {
    result: Box<TranscodeResult>,
}

impl TranscodeError {
    pub fn outcome(&self) -> Outcome {
        self.result.outcome()
    }

    pub fn result(&self) -> &TranscodeResult {
        &self.result
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_is_uninitialized() {
        let r = TranscodeResult::default();
        assert_eq!(r.outcome(), Outcome::Uninitialized);
        assert!(!r.is_valid());
        assert_eq!(r.to_string(), "Parsing was skipped or did not finish.");
    }

    #[test]
    fn finish_keeps_recorded_failures() {
        let mut r = TranscodeResult::new("<string>", "<configuration>");
        r.fail_invalid_data("window.width");
        r.finish();
        assert_eq!(r.outcome(), Outcome::InvalidContent);

        let mut ok = TranscodeResult::new("<default>", "<string>");
        ok.finish();
        assert!(ok.is_valid());
    }

    #[test]
    fn summary_lists_every_key_category() {
        let mut r = TranscodeResult::new("settings.ini", "<configuration>");
        r.fail_required_missing("game.path");
        r.fail_invalid_data("window.width");
        r.add_unknown("extra.flag", "1");
        assert_eq!(
            r.to_string(),
            "Error while parsing \"settings.ini\".\n\
             Required keys that are missing:\n - game.path\n\
             Keys that contain invalid data:\n - window.width\n\
             Unknown configuration keys:\n - extra.flag"
        );
    }

    #[test]
    fn output_failure_names_the_output() {
        let mut r = TranscodeResult::new("<configuration>", "out.ini");
        r.fail_output(4, "value of 'language' contains a line break");
        r.add_unknown("mods.enabled", "1");
        let text = r.to_string();
        assert!(text.starts_with("Error while writing \"out.ini\":4:\n"));
        assert!(text.ends_with("Unknown configuration keys:\n - mods.enabled"));
    }

    #[test]
    fn into_checked_wraps_failures() {
        let mut r = TranscodeResult::new("<default>", "<default>");
        r.fail_argument();
        let err = r.into_checked().unwrap_err();
        assert_eq!(err.outcome(), Outcome::InvalidArgument);
        assert_eq!(
            err.to_string(),
            "Invalid argument: destination cannot be the default config."
        );
    }
}
