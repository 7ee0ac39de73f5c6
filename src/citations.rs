//! Author-in-text citation rewriting.
//!
//! Turns `\citet{key}`-style citations (pandoc's `AuthorInText` mode) into
//! `Author [marker]`: the resolved author names, a space, and the original
//! citation, which the renderer still numbers as usual.

use crate::ast::{Citation, CitationMode, Inline};
use crate::refs::BibliographyIndex;

/// Rewrites an author-in-text `Cite` into `[Str(names), Space, cite]`.
///
/// The mode of the first citation decides. Anything else, including
/// non-`Cite` inlines and cites with no citations, is handed back as
/// `Err` so the caller can keep it in place.
pub fn rewrite_citation(inline: Inline, index: &BibliographyIndex) -> Result<Vec<Inline>, Inline> {
    let names = match &inline {
        Inline::Cite(citations, _) if is_author_in_text(citations) => {
            Some(author_names(citations, index))
        }
        _ => None,
    };

    match names {
        Some(names) => Ok(vec![Inline::Str(names), Inline::Space, inline]),
        None => Err(inline),
    }
}

fn is_author_in_text(citations: &[Citation]) -> bool {
    citations
        .first()
        .is_some_and(|c| c.citation_mode == CitationMode::AuthorInText)
}

/// Display names for every cited key, joined with `" and "`.
///
/// Keys missing from the index are used verbatim.
pub fn author_names(citations: &[Citation], index: &BibliographyIndex) -> String {
    citations
        .iter()
        .map(|c| index.resolve(&c.citation_id))
        .collect::<Vec<_>>()
        .join(" and ")
}
