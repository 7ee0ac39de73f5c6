//! Venue metadata injection.
//!
//! Writes the collected venue fields into document metadata and places a
//! `marginnote` span with the venue and DOI near the start of the body.

use tracing::debug;

use crate::ast::{Attr, Block, Inline, Meta, MetaValue, Pandoc};
use crate::conference::ConferenceInfo;

/// Class of the synthesized margin note span.
pub const MARGIN_NOTE_CLASS: &str = "marginnote";

/// Class marking the teaser region used by `acmart`-style layouts.
pub const TEASER_CLASS: &str = "teaserfigure";

/// Prefix turning a DOI into a resolvable URL.
pub const DOI_RESOLVER: &str = "https://doi.org/";

/// Where the margin note ended up.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Attachment {
    /// First inline of the first paragraph inside the teaser region.
    TeaserParagraph,
    /// New paragraph inserted at the top of a teaser region that had none.
    TeaserSynthesized,
    /// First inline of the first top-level paragraph.
    LeadingParagraph,
    /// No anchor existed; the note was dropped.
    Discarded,
}

/// Writes `conference`, `doi` and `conference_year` for the fields present.
///
/// `conference` prefers the full citation over the book title.
pub fn write_metadata(info: &ConferenceInfo, meta: &mut Meta) {
    let conference = info.full_citation.as_ref().or(info.book_title.as_ref());
    for (key, value) in [
        ("conference", conference),
        ("doi", info.doi.as_ref()),
        ("conference_year", info.year.as_ref()),
    ] {
        if let Some(value) = value {
            meta.insert(key.to_string(), MetaValue::MetaString(value.clone()));
        }
    }
}

/// Builds the margin note: venue, two line breaks, then a DOI link.
///
/// Returns `None` when there is nothing to show, e.g. when only the
/// copyright year is known.
pub fn build_annotation(info: &ConferenceInfo) -> Option<Inline> {
    let mut content = Vec::new();

    if let Some(venue) = info.full_citation.as_ref().or(info.book_title.as_ref()) {
        content.push(Inline::Str(venue.clone()));
        content.push(Inline::LineBreak);
        content.push(Inline::LineBreak);
    }

    if let Some(doi) = &info.doi {
        content.push(Inline::Str("DOI: ".to_string()));
        content.push(Inline::Link(
            Attr::default(),
            vec![Inline::Str(doi.clone())],
            (format!("{}{}", DOI_RESOLVER, doi), String::new()),
        ));
        content.push(Inline::LineBreak);
    }

    if content.is_empty() {
        return None;
    }

    Some(Inline::Span(Attr::with_classes([MARGIN_NOTE_CLASS]), content))
}

/// Inserts `note` at the first valid anchor among top-level `blocks`.
///
/// A teaser region wins whenever one exists, even if it has no paragraph
/// and a top-level paragraph comes earlier. Only direct top-level blocks
/// are considered for the paragraph fallback.
pub fn attach_annotation(blocks: &mut [Block], note: Inline) -> Attachment {
    let teaser = blocks.iter_mut().find_map(|block| match block {
        Block::Div(attr, content) if attr.has_class(TEASER_CLASS) => Some(content),
        _ => None,
    });

    if let Some(content) = teaser {
        return match first_paragraph(content) {
            Some(inlines) => {
                inlines.insert(0, note);
                Attachment::TeaserParagraph
            }
            None => {
                content.insert(0, Block::Para(vec![note]));
                Attachment::TeaserSynthesized
            }
        };
    }

    match first_paragraph(blocks) {
        Some(inlines) => {
            inlines.insert(0, note);
            Attachment::LeadingParagraph
        }
        None => Attachment::Discarded,
    }
}

fn first_paragraph(blocks: &mut [Block]) -> Option<&mut Vec<Inline>> {
    blocks.iter_mut().find_map(|block| match block {
        Block::Para(inlines) => Some(inlines),
        _ => None,
    })
}

/// Runs the whole finalize step on `doc`.
///
/// Metadata is always written. Returns `None` when there was no note to
/// attach, otherwise where the note went.
pub fn inject(doc: &mut Pandoc, info: &ConferenceInfo) -> Option<Attachment> {
    write_metadata(info, &mut doc.meta);

    if info.is_empty() {
        return None;
    }
    let note = build_annotation(info)?;
    let attachment = attach_annotation(&mut doc.blocks, note);
    debug!(?attachment, "margin note placed");
    Some(attachment)
}
