//! tufte-filter: pandoc JSON filter for ACM-style papers.
//!
//! This library provides functionality to:
//! - Rewrite author-in-text citations (`\citet`) as "Author [marker]"
//!   using names from BibTeX bibliographies
//! - Extract venue metadata (`\acmConference`, `\acmDOI`, ...) from the
//!   LaTeX main file and raw LaTeX in the document
//! - Publish that metadata as document fields and as a margin note

pub mod annotation;
pub mod ast;
pub mod citations;
pub mod conference;
pub mod diagnostics;
pub mod filter;
pub mod refs;
pub mod walk;

pub use annotation::{attach_annotation, build_annotation, inject, write_metadata, Attachment};
pub use ast::{Block, Citation, CitationMode, Inline, MetaValue, Pandoc};
pub use citations::rewrite_citation;
pub use conference::{ConferenceInfo, DEFAULT_MAIN_FILES};
pub use diagnostics::Diagnostic;
pub use filter::{
    apply_json, run_filter, FilterContext, FilterError, FilterMode, FilterOptions, FilterOutput,
};
pub use refs::{format_display_name, load_bibliography, BibliographyIndex};
pub use walk::{walk_document, Filter};
