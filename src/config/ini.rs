//! Section / `key=value` document grammar.
//!
//! Grammar accepted by [`IniDocument::parse`]:
//! - blank lines and lines whose first non-blank character is `;` or `#` are ignored
//! - `[name]` opens a section; a section name may appear only once per document,
//!   and only a `;` or `#` comment may follow the closing `]`
//! - `key = value` adds a key to the current section; key and value are trimmed
//! - a key may appear only once per section
//! - keys outside any section are rejected
//!
//! Values are stored raw: inline comments stay part of the value and are only
//! stripped by the field translators. Section and key order is preserved, so a
//! parse/serialize cycle keeps the document layout stable.
//!
//! Keys are addressed as `section.key`. Section names may contain dots, so a
//! name is matched against the existing sections first and only split at the
//! first `.` when no section claims it.

use std::fmt::Write as _;
use thiserror::Error;
use tracing::trace;

/// Syntax error with the 1-based line it was found on (0 when not tied to a line).
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("line {line}: {message}")]
pub struct IniError {
    pub line: usize,
    pub message: String,
}

impl IniError {
    pub fn new(line: usize, message: impl Into<String>) -> Self {
        Self {
            line,
            message: message.into(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
struct Section {
    name: String,
    entries: Vec<(String, String)>,
}

impl Section {
    fn get(&self, key: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }
}

/// An ordered two-level document.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IniDocument {
    sections: Vec<Section>,
}

/// Split `section.key` at the first dot.
pub fn split_dotted(name: &str) -> Option<(&str, &str)> {
    name.split_once('.')
}

/// Key part of `dotted` when it lies in `section`, e.g. `level` for `mod.cfg` / `mod.cfg.level`.
fn section_key<'a>(section: &str, dotted: &'a str) -> Option<&'a str> {
    dotted
        .strip_prefix(section)?
        .strip_prefix('.')
        .filter(|key| !key.is_empty())
}

impl IniDocument {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse a whole document. Fails on the first malformed line.
    pub fn parse(text: &str) -> Result<Self, IniError> {
        let mut doc = IniDocument::new();
        let mut current: Option<usize> = None;

        for (idx, raw_line) in text.lines().enumerate() {
            let line_no = idx + 1;
            let line = raw_line.trim();

            if line.is_empty() || line.starts_with(';') || line.starts_with('#') {
                continue;
            }

            if let Some(rest) = line.strip_prefix('[') {
                let Some((name, trailing)) = rest.split_once(']') else {
                    return Err(IniError::new(line_no, "unmatched '[' in section header"));
                };
                let trailing = trailing.trim_start();
                if !trailing.is_empty() && !trailing.starts_with([';', '#']) {
                    return Err(IniError::new(
                        line_no,
                        "unexpected text after section header",
                    ));
                }
                let name = name.trim();
                if name.is_empty() {
                    return Err(IniError::new(line_no, "empty section name"));
                }
                if doc.section_index(name).is_some() {
                    return Err(IniError::new(
                        line_no,
                        format!("duplicate section name '{name}'"),
                    ));
                }
                doc.sections.push(Section {
                    name: name.to_string(),
                    entries: Vec::new(),
                });
                current = Some(doc.sections.len() - 1);
                continue;
            }

            let Some((key, value)) = line.split_once('=') else {
                return Err(IniError::new(line_no, "'=' character not found in line"));
            };
            let key = key.trim();
            if key.is_empty() {
                return Err(IniError::new(line_no, "empty key name"));
            }
            let Some(section_idx) = current else {
                return Err(IniError::new(
                    line_no,
                    format!("key '{key}' appears outside of any section"),
                ));
            };
            let section = &mut doc.sections[section_idx];
            if section.get(key).is_some() {
                return Err(IniError::new(
                    line_no,
                    format!("duplicate key name '{}.{key}'", section.name),
                ));
            }
            section
                .entries
                .push((key.to_string(), value.trim().to_string()));
        }

        trace!(
            target: "gameconf::ini",
            sections = doc.sections.len(),
            "Parsed document"
        );
        Ok(doc)
    }

    fn section_index(&self, name: &str) -> Option<usize> {
        self.sections.iter().position(|s| s.name == name)
    }

    /// Section index and key holding the entry named `dotted`, if present.
    ///
    /// Section names may contain dots themselves, so every section whose name
    /// prefixes `dotted` is tried, not only the first-dot split.
    fn locate_entry(&self, dotted: &str) -> Option<(usize, usize)> {
        self.sections.iter().enumerate().find_map(|(s_idx, section)| {
            let key = section_key(&section.name, dotted)?;
            let e_idx = section.entries.iter().position(|(k, _)| k == key)?;
            Some((s_idx, e_idx))
        })
    }

    /// Raw value of `section.key`, if present.
    pub fn get(&self, dotted: &str) -> Option<&str> {
        let (s_idx, e_idx) = self.locate_entry(dotted)?;
        Some(self.sections[s_idx].entries[e_idx].1.as_str())
    }

    /// Insert or replace `section.key`. Returns `false` if the name has no dot.
    ///
    /// An existing entry is replaced in place. A new key goes into the longest
    /// existing section prefixing the name, otherwise into the section named
    /// by the part before the first dot, appended if needed.
    pub fn set(&mut self, dotted: &str, value: impl Into<String>) -> bool {
        let value = value.into();
        if let Some((s_idx, e_idx)) = self.locate_entry(dotted) {
            self.sections[s_idx].entries[e_idx].1 = value;
            return true;
        }

        let existing = self
            .sections
            .iter()
            .enumerate()
            .filter_map(|(idx, s)| {
                section_key(&s.name, dotted).map(|key| (idx, s.name.len(), key))
            })
            .max_by_key(|(_, len, _)| *len);
        let (idx, key) = match existing {
            Some((idx, _, key)) => (idx, key),
            None => {
                let Some((section, key)) = split_dotted(dotted) else {
                    return false;
                };
                self.sections.push(Section {
                    name: section.to_string(),
                    entries: Vec::new(),
                });
                (self.sections.len() - 1, key)
            }
        };
        self.sections[idx].entries.push((key.to_string(), value));
        true
    }

    /// Every `(section.key, raw value)` pair in document order.
    pub fn entries(&self) -> impl Iterator<Item = (String, &str)> + '_ {
        self.sections.iter().flat_map(|s| {
            s.entries
                .iter()
                .map(move |(k, v)| (format!("{}.{k}", s.name), v.as_str()))
        })
    }

    /// Render the document, rejecting names or values the grammar cannot read back.
    pub fn serialize(&self) -> Result<String, IniError> {
        let mut out = String::new();
        let mut line_no = 0;

        for (i, section) in self.sections.iter().enumerate() {
            if i > 0 {
                out.push('\n');
                line_no += 1;
            }
            line_no += 1;
            check_section_name(&section.name, line_no)?;
            let _ = writeln!(out, "[{}]", section.name);

            for (key, value) in &section.entries {
                line_no += 1;
                check_key(key, line_no)?;
                check_value(key, value, line_no)?;
                let _ = writeln!(out, "{key}={value}");
            }
        }
        Ok(out)
    }
}

fn has_line_break(s: &str) -> bool {
    s.contains(['\n', '\r'])
}

fn check_section_name(name: &str, line: usize) -> Result<(), IniError> {
    if name.trim().is_empty() {
        return Err(IniError::new(line, "empty section name"));
    }
    if has_line_break(name) || name.contains(']') || name != name.trim() {
        return Err(IniError::new(
            line,
            format!("section name '{}' cannot be written", name.escape_debug()),
        ));
    }
    Ok(())
}

fn check_key(key: &str, line: usize) -> Result<(), IniError> {
    if key.trim().is_empty() {
        return Err(IniError::new(line, "empty key name"));
    }
    let bad_start = key.starts_with(['[', ';', '#']);
    if bad_start || has_line_break(key) || key.contains('=') || key != key.trim() {
        return Err(IniError::new(
            line,
            format!("key '{}' cannot be written", key.escape_debug()),
        ));
    }
    Ok(())
}

fn check_value(key: &str, value: &str, line: usize) -> Result<(), IniError> {
    if has_line_break(value) {
        return Err(IniError::new(
            line,
            format!("value of '{key}' contains a line break"),
        ));
    }
    Ok(())
}
