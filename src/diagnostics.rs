//! Non-fatal problems recorded while a document is filtered.
//!
//! None of these stop the run; they are handed back next to the filtered
//! document so callers can report them.

use std::path::PathBuf;

use thiserror::Error;

use crate::refs::BibliographyError;

#[derive(Error, Debug)]
pub enum Diagnostic {
    #[error("skipped bibliography '{}': {source}", .path.display())]
    BibliographySkipped {
        path: PathBuf,
        #[source]
        source: BibliographyError,
    },

    #[error("ignored 'bibliography' metadata: expected a string or a list, found {found}")]
    BibliographyMetadataIgnored { found: &'static str },

    #[error("entry '{key}': {reason}; using the key as display name")]
    PersonData { key: String, reason: String },

    #[error("could not read '{}': {source}", .path.display())]
    MainFileUnreadable {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("no teaser region or top-level paragraph to hold the margin note; note discarded")]
    AnnotationDiscarded,
}
