//! BibTeX reference loading and author display names.
//!
//! Builds the index that maps citation keys to the short author form used
//! in author-in-text citations ("Smith", "Smith and Doe", "Smith et al.").

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use biblatex::{Bibliography, Entry, Person, RetrievalError};
use thiserror::Error;
use tracing::debug;

use crate::ast::{Meta, MetaValue};
use crate::diagnostics::Diagnostic;

/// Errors that can occur when loading a bibliography file.
#[derive(Error, Debug)]
pub enum BibliographyError {
    #[error("Failed to read file: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Invalid BibTeX: {0}")]
    ParseError(String),
}

/// Person data that could not be turned into a display name.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum PersonDataError {
    #[error("'{field}' has no names")]
    Empty { field: &'static str },

    #[error("'{field}' is malformed: {message}")]
    Malformed {
        field: &'static str,
        message: String,
    },
}

/// One parsed entry with its display name.
#[derive(Debug, Clone, PartialEq)]
pub struct FormattedEntry {
    pub key: String,
    pub display_name: String,
    /// Set when the display name fell back to the key because of bad person data.
    pub fallback: Option<PersonDataError>,
}

/// Maps citation keys to author display names.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BibliographyIndex {
    names: HashMap<String, String>,
}

impl BibliographyIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Loads every file in order. Unreadable or unparseable files are
    /// skipped; on duplicate keys the later file wins.
    pub fn build(paths: &[PathBuf]) -> (Self, Vec<Diagnostic>) {
        let mut index = Self::new();
        let mut diagnostics = Vec::new();

        for path in paths {
            match load_bibliography(path) {
                Ok(entries) => {
                    debug!(path = %path.display(), entries = entries.len(), "loaded bibliography");
                    for entry in entries {
                        if let Some(reason) = entry.fallback {
                            debug!(key = %entry.key, %reason, "falling back to citation key");
                            diagnostics.push(Diagnostic::PersonData {
                                key: entry.key.clone(),
                                reason: reason.to_string(),
                            });
                        }
                        index.insert(entry.key, entry.display_name);
                    }
                }
                Err(source) => {
                    debug!(path = %path.display(), error = %source, "skipping bibliography");
                    diagnostics.push(Diagnostic::BibliographySkipped {
                        path: path.clone(),
                        source,
                    });
                }
            }
        }

        (index, diagnostics)
    }

    pub fn insert(&mut self, key: impl Into<String>, display_name: impl Into<String>) {
        self.names.insert(key.into(), display_name.into());
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.names.get(key).map(String::as_str)
    }

    /// The display name for `key`, or the key itself when it is unknown.
    pub fn resolve<'a>(&'a self, key: &'a str) -> &'a str {
        self.get(key).unwrap_or(key)
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }
}

/// Reads the `bibliography` metadata field as a list of paths.
///
/// A string (or inline or block text) gives one path, a list gives one path
/// per item.
/// Any other shape is ignored and reported.
pub fn bibliography_sources(meta: &Meta) -> Result<Vec<String>, Diagnostic> {
    match meta.get("bibliography") {
        None => Ok(Vec::new()),
        Some(MetaValue::MetaString(s)) => Ok(vec![s.clone()]),
        Some(value @ (MetaValue::MetaInlines(_) | MetaValue::MetaBlocks(_))) => {
            Ok(vec![value.stringify()])
        }
        Some(MetaValue::MetaList(items)) => Ok(items.iter().map(MetaValue::stringify).collect()),
        Some(MetaValue::MetaBool(_)) => Err(Diagnostic::BibliographyMetadataIgnored {
            found: "a boolean",
        }),
        Some(MetaValue::MetaMap(_)) => Err(Diagnostic::BibliographyMetadataIgnored {
            found: "a map",
        }),
    }
}

/// Loads a BibTeX/BibLaTeX file and formats a display name for each entry.
///
/// # Errors
///
/// Returns an error if the file cannot be read or is not valid BibTeX.
pub fn load_bibliography(path: &Path) -> Result<Vec<FormattedEntry>, BibliographyError> {
    let content = fs::read_to_string(path)?;
    parse_bibliography(&content)
}

/// Parses BibTeX source and formats a display name for each entry.
pub fn parse_bibliography(content: &str) -> Result<Vec<FormattedEntry>, BibliographyError> {
    let bibliography =
        Bibliography::parse(content).map_err(|e| BibliographyError::ParseError(e.to_string()))?;

    Ok(bibliography
        .iter()
        .map(|entry| match format_display_name(entry) {
            Ok(display_name) => FormattedEntry {
                key: entry.key.clone(),
                display_name,
                fallback: None,
            },
            Err(reason) => FormattedEntry {
                key: entry.key.clone(),
                display_name: entry.key.clone(),
                fallback: Some(reason),
            },
        })
        .collect())
}

/// Formats the short author form of an entry.
///
/// Authors are preferred over editors; editors get an `" (Ed.)"` suffix.
/// Entries with neither use their own key.
pub fn format_display_name(entry: &Entry) -> Result<String, PersonDataError> {
    let (persons, suffix) = match person_list(entry, "author")? {
        Some(persons) => (persons, ""),
        None => match person_list(entry, "editor")? {
            Some(persons) => (persons, " (Ed.)"),
            None => return Ok(entry.key.clone()),
        },
    };

    let families: Vec<String> = persons
        .iter()
        .map(family_name)
        .filter(|name| !name.is_empty())
        .collect();

    let names = match families.as_slice() {
        [] => {
            let field = if suffix.is_empty() { "author" } else { "editor" };
            return Err(PersonDataError::Empty { field });
        }
        [only] => only.clone(),
        [first, second] => format!("{} and {}", first, second),
        [first, ..] => format!("{} et al.", first),
    };

    Ok(names + suffix)
}

/// Person list stored in `field`, `None` if the field is absent.
fn person_list(entry: &Entry, field: &'static str) -> Result<Option<Vec<Person>>, PersonDataError> {
    match entry.get_as::<Vec<Person>>(field) {
        Ok(persons) => Ok(Some(persons)),
        Err(RetrievalError::Missing(_)) => Ok(None),
        Err(e) => Err(PersonDataError::Malformed {
            field,
            message: e.to_string(),
        }),
    }
}

/// Family-name words joined by single spaces.
fn family_name(person: &Person) -> String {
    person.name.split_whitespace().collect::<Vec<_>>().join(" ")
}
