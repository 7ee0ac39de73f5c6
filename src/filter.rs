//! Filter run: prepare, traverse, finalize.
//!
//! Every run owns its own [`FilterContext`], so independent documents can
//! be filtered side by side without sharing any state.

use std::path::PathBuf;

use thiserror::Error;
use tracing::{debug, info};

use crate::annotation::{self, Attachment};
use crate::ast::{Block, Inline, Pandoc};
use crate::citations::rewrite_citation;
use crate::conference::{ConferenceInfo, DEFAULT_MAIN_FILES};
use crate::diagnostics::Diagnostic;
use crate::refs::{bibliography_sources, BibliographyIndex};
use crate::walk::{walk_document, Filter};

/// Errors that stop a run before it starts.
#[derive(Error, Debug)]
pub enum FilterError {
    #[error("Invalid pandoc JSON: {0}")]
    InvalidDocument(#[source] serde_json::Error),

    #[error("Failed to serialize document: {0}")]
    Serialize(#[source] serde_json::Error),
}

/// What the filter does.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FilterMode {
    /// Citation rewriting plus venue metadata and margin note.
    #[default]
    Full,
    /// Citation rewriting only.
    CitationsOnly,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilterOptions {
    pub mode: FilterMode,
    /// Base for relative bibliography paths and main-file candidates.
    pub working_dir: PathBuf,
    /// Main-document candidates scanned for venue commands, in order.
    pub main_files: Vec<String>,
}

impl Default for FilterOptions {
    fn default() -> Self {
        Self {
            mode: FilterMode::Full,
            working_dir: PathBuf::from("."),
            main_files: DEFAULT_MAIN_FILES.iter().map(|s| s.to_string()).collect(),
        }
    }
}

/// Result of a run: the filtered document plus everything that went wrong
/// along the way.
#[derive(Debug)]
pub struct FilterOutput {
    pub document: Pandoc,
    pub diagnostics: Vec<Diagnostic>,
    /// Where the margin note went; `None` if there was no note.
    pub attachment: Option<Attachment>,
}

/// Run-scoped state threaded through all three phases.
#[derive(Debug, Default)]
pub struct FilterContext {
    pub bibliography: BibliographyIndex,
    pub conference: ConferenceInfo,
    pub diagnostics: Vec<Diagnostic>,
    options: FilterOptions,
}

impl FilterContext {
    pub fn new(options: FilterOptions) -> Self {
        Self {
            options,
            ..Self::default()
        }
    }

    fn scans_conference(&self) -> bool {
        self.options.mode == FilterMode::Full
    }

    /// Builds the bibliography index and, in full mode, scans the first
    /// matching main-document file.
    pub fn prepare(&mut self, doc: &Pandoc) {
        let paths: Vec<PathBuf> = match bibliography_sources(&doc.meta) {
            Ok(sources) => sources
                .iter()
                .map(|s| self.options.working_dir.join(s))
                .collect(),
            Err(diagnostic) => {
                debug!(%diagnostic, "bibliography metadata ignored");
                self.diagnostics.push(diagnostic);
                Vec::new()
            }
        };

        let (index, diagnostics) = BibliographyIndex::build(&paths);
        debug!(entries = index.len(), files = paths.len(), "bibliography index built");
        self.bibliography = index;
        self.diagnostics.extend(diagnostics);

        if self.scans_conference() {
            let (matched, diagnostics) = self
                .conference
                .scan_main_files(&self.options.working_dir, &self.options.main_files);
            if let Some(path) = matched {
                info!(path = %path.display(), "read venue metadata from main file");
            }
            self.diagnostics.extend(diagnostics);
        }
    }

    /// Walks the document once, rewriting citations and scanning raw LaTeX.
    pub fn traverse(&mut self, doc: &mut Pandoc) {
        walk_document(doc, self);
    }

    /// Writes venue metadata and places the margin note. Does nothing in
    /// citations-only mode.
    pub fn finalize(&mut self, doc: &mut Pandoc) -> Option<Attachment> {
        if !self.scans_conference() {
            return None;
        }

        let attachment = annotation::inject(doc, &self.conference);
        if attachment == Some(Attachment::Discarded) {
            debug!("no anchor for margin note");
            self.diagnostics.push(Diagnostic::AnnotationDiscarded);
        }
        attachment
    }

    fn scan_raw(&mut self, format_is_latex: bool, text: &str) {
        if self.scans_conference() && format_is_latex {
            self.conference.scan(text);
        }
    }
}

impl Filter for FilterContext {
    fn filter_inline(&mut self, inline: Inline) -> Vec<Inline> {
        if let Inline::RawInline(format, text) = &inline {
            self.scan_raw(format.is_latex(), text);
            return vec![inline];
        }

        match rewrite_citation(inline, &self.bibliography) {
            Ok(rewritten) => rewritten,
            Err(inline) => vec![inline],
        }
    }

    fn filter_block(&mut self, block: Block) -> Vec<Block> {
        if let Block::RawBlock(format, text) = &block {
            self.scan_raw(format.is_latex(), text);
        }
        vec![block]
    }
}

/// Filters a whole document.
pub fn run_filter(mut document: Pandoc, options: &FilterOptions) -> FilterOutput {
    let mut context = FilterContext::new(options.clone());

    context.prepare(&document);
    context.traverse(&mut document);
    let attachment = context.finalize(&mut document);

    FilterOutput {
        document,
        diagnostics: context.diagnostics,
        attachment,
    }
}

/// Filters a document given as pandoc JSON and returns the filtered JSON.
///
/// # Errors
///
/// Returns an error if `json` is not a pandoc document.
pub fn apply_json(
    json: &str,
    options: &FilterOptions,
) -> Result<(String, Vec<Diagnostic>), FilterError> {
    let document = Pandoc::from_json(json).map_err(FilterError::InvalidDocument)?;
    let output = run_filter(document, options);
    let json = output.document.to_json().map_err(FilterError::Serialize)?;
    Ok((json, output.diagnostics))
}
