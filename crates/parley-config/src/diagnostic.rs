// SPDX-FileCopyrightText: 2026 Parley Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Miette diagnostics for configuration failures.
//!
//! Figment reports where a bad key or value lives as a path of table names.
//! This module maps that path back onto the TOML text the value came from so
//! the rendered report can point at the offending line, and offers a
//! Jaro-Winkler "did you mean" for misspelled keys.

#![allow(unused_assignments)] // miette's Diagnostic derive generates code triggering this lint

use std::ops::Range;
use std::path::Path;

use miette::{Diagnostic, NamedSource, SourceSpan};
use thiserror::Error;

/// Below this Jaro-Winkler score a key is not offered as a correction.
const SUGGESTION_THRESHOLD: f64 = 0.75;

/// Name under which inline TOML strings are registered as sources.
pub const INLINE_SOURCE: &str = "<inline>";

/// TOML text that took part in a load, kept for span lookup.
#[derive(Debug, Clone)]
pub struct TomlSource {
    /// File path, or [`INLINE_SOURCE`] for string input.
    pub name: String,
    /// Raw file content.
    pub content: String,
}

impl TomlSource {
    pub fn new(name: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            content: content.into(),
        }
    }

    fn named(&self) -> NamedSource<String> {
        NamedSource::new(&self.name, self.content.clone())
    }
}

/// A configuration error ready for miette rendering.
#[derive(Debug, Error, Diagnostic)]
pub enum ConfigError {
    /// A key that no section of the config declares.
    #[error("unknown configuration key `{key}`")]
    #[diagnostic(
        code(parley::config::unknown_key),
        help("{}", unknown_key_help(suggestion.as_deref(), valid_keys))
    )]
    UnknownKey {
        key: String,
        suggestion: Option<String>,
        /// Comma separated keys of the enclosing section.
        valid_keys: String,
        #[label("not a parley setting")]
        span: Option<SourceSpan>,
        #[source_code]
        src: Option<NamedSource<String>>,
    },

    /// A value that does not deserialize into its field's type.
    #[error("invalid type for key `{key}`: {detail}")]
    #[diagnostic(code(parley::config::invalid_type), help("expected {expected}"))]
    InvalidType {
        /// Dotted path, e.g. `engine.auto_reply`.
        key: String,
        detail: String,
        expected: String,
        #[label("value has the wrong type")]
        span: Option<SourceSpan>,
        #[source_code]
        src: Option<NamedSource<String>>,
    },

    /// A value that parsed but breaks a semantic rule.
    #[error("validation error: {message}")]
    #[diagnostic(code(parley::config::validation))]
    Validation { message: String },

    #[error("configuration error: {0}")]
    #[diagnostic(code(parley::config::other))]
    Other(String),
}

fn unknown_key_help(suggestion: Option<&str>, valid_keys: &str) -> String {
    match suggestion {
        Some(s) => format!("did you mean `{s}`? Valid keys: {valid_keys}"),
        None => format!("valid keys: {valid_keys}"),
    }
}

/// Converts every error inside a `figment::Error` into a [`ConfigError`].
pub fn figment_to_config_errors(err: figment::Error, sources: &[TomlSource]) -> Vec<ConfigError> {
    use figment::error::Kind;

    err.into_iter()
        .map(|error| {
            let tables: Vec<String> = error.path.iter().map(|s| s.to_string()).collect();
            let source = source_of(&error, sources);
            match &error.kind {
                Kind::UnknownField(field, expected) => {
                    let location = source.and_then(|s| {
                        locate_key(&s.content, &tables, field).map(|loc| (s, loc.key))
                    });
                    let (span, src) = to_span(location);
                    ConfigError::UnknownKey {
                        key: field.clone(),
                        suggestion: suggest_key(field, expected),
                        valid_keys: expected.join(", "),
                        span,
                        src,
                    }
                }
                Kind::InvalidType(actual, expected) => {
                    // The path ends at the field itself for type errors.
                    let location = tables.split_last().and_then(|(field, parents)| {
                        source.and_then(|s| {
                            locate_key(&s.content, parents, field).map(|loc| (s, loc.value))
                        })
                    });
                    let (span, src) = to_span(location);
                    ConfigError::InvalidType {
                        key: tables.join("."),
                        detail: format!("found {actual}, expected {expected}"),
                        expected: expected.to_string(),
                        span,
                        src,
                    }
                }
                _ => ConfigError::Other(error.to_string()),
            }
        })
        .collect()
}

fn to_span(
    location: Option<(&TomlSource, Range<usize>)>,
) -> (Option<SourceSpan>, Option<NamedSource<String>>) {
    match location {
        Some((source, range)) => (
            Some(SourceSpan::new(range.start.into(), range.len())),
            Some(source.named()),
        ),
        None => (None, None),
    }
}

/// Picks the TOML text a figment error was read from.
///
/// File providers report their path; string providers report a code
/// location, which maps to the inline source. Env errors have no text.
fn source_of<'a>(error: &figment::Error, sources: &'a [TomlSource]) -> Option<&'a TomlSource> {
    match error.metadata.as_ref()?.source.as_ref()? {
        figment::Source::File(path) => sources
            .iter()
            .find(|s| same_file(Path::new(&s.name), path)),
        figment::Source::Code(_) => sources.iter().find(|s| s.name == INLINE_SOURCE),
        _ => None,
    }
}

fn same_file(a: &Path, b: &Path) -> bool {
    if a == b || b.ends_with(a) {
        return true;
    }
    match (a.canonicalize(), b.canonicalize()) {
        (Ok(a), Ok(b)) => a == b,
        _ => false,
    }
}

/// Byte ranges of a key and its value inside TOML text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyLocation {
    pub key: Range<usize>,
    pub value: Range<usize>,
}

/// Finds `field` inside the table named by `tables` (`[]` is the root table).
///
/// Looks under a `[a.b]` header first, stopping at the next header, then
/// falls back to a dotted `a.b.field = ...` assignment at the root.
pub fn locate_key(content: &str, tables: &[String], field: &str) -> Option<KeyLocation> {
    let table = tables.join(".");
    if table.is_empty() {
        return scan_table(content, 0, field);
    }
    let in_table = table_body(content, &table).and_then(|start| scan_table(content, start, field));
    if in_table.is_some() {
        return in_table;
    }
    let dotted = format!("{table}.{field}");
    scan_table(content, 0, &dotted).map(|mut location| {
        // Point at the field, not the table prefix.
        location.key.start = location.key.end - field.len();
        location
    })
}

/// Byte offset just past the `[table]` header line.
fn table_body(content: &str, table: &str) -> Option<usize> {
    let mut offset = 0;
    for line in content.split_inclusive('\n') {
        let header = line.trim();
        if let Some(name) = header.strip_prefix('[').and_then(|h| h.strip_suffix(']')) {
            if name.trim() == table {
                return Some(offset + line.len());
            }
        }
        offset += line.len();
    }
    None
}

/// Scans assignments from `start` until the next table header.
fn scan_table(content: &str, start: usize, key: &str) -> Option<KeyLocation> {
    let mut offset = start;
    for line in content[start..].split_inclusive('\n') {
        let trimmed = line.trim_start();
        if trimmed.starts_with('[') {
            return None;
        }
        let indent = line.len() - trimmed.len();
        if let Some(rest) = trimmed.strip_prefix(key) {
            let after_key = rest.trim_start();
            if let Some(value) = after_key.strip_prefix('=') {
                let key_start = offset + indent;
                let value_text = value.trim();
                let value_start = offset + line.len() - value.trim_start().len();
                return Some(KeyLocation {
                    key: key_start..key_start + key.len(),
                    value: value_start..value_start + value_text.len(),
                });
            }
        }
        offset += line.len();
    }
    None
}

/// Closest valid key by Jaro-Winkler similarity, if any clears the threshold.
pub fn suggest_key(unknown: &str, valid_keys: &[&str]) -> Option<String> {
    valid_keys
        .iter()
        .map(|key| (strsim::jaro_winkler(unknown, key), *key))
        .filter(|(score, _)| *score > SUGGESTION_THRESHOLD)
        .max_by(|a, b| a.0.total_cmp(&b.0))
        .map(|(_, key)| key.to_string())
}

/// Renders each error to stderr with miette's graphical handler.
pub fn render_errors(errors: &[ConfigError]) {
    let handler = miette::GraphicalReportHandler::new();
    for error in errors {
        let mut buf = String::new();
        match handler.render_report(&mut buf, error as &dyn Diagnostic) {
            Ok(()) => eprint!("{buf}"),
            Err(_) => eprintln!("Error: {error}"),
        }
    }
}
