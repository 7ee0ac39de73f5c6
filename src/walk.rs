//! Single-pass document traversal.
//!
//! Walks metadata first, then the body, in document order. Children are
//! walked before their parent reaches the filter, and each node is replaced
//! by whatever sequence the filter returns. Replacements are spliced in as
//! they are and never walked again.

use crate::ast::{Block, Caption, Cell, Citation, Inline, MetaValue, Pandoc, Row};

/// Per-node hooks invoked during [`walk_document`].
///
/// Returning `vec![node]` keeps the node, an empty vector deletes it, and
/// any other sequence replaces it.
pub trait Filter {
    fn filter_inline(&mut self, inline: Inline) -> Vec<Inline> {
        vec![inline]
    }

    fn filter_block(&mut self, block: Block) -> Vec<Block> {
        vec![block]
    }
}

/// Walks the whole document: metadata values, then blocks.
pub fn walk_document<F: Filter + ?Sized>(doc: &mut Pandoc, filter: &mut F) {
    for value in doc.meta.values_mut() {
        walk_meta_value(value, filter);
    }
    walk_blocks(&mut doc.blocks, filter);
}

pub fn walk_meta_value<F: Filter + ?Sized>(value: &mut MetaValue, filter: &mut F) {
    match value {
        MetaValue::MetaMap(map) => {
            for v in map.values_mut() {
                walk_meta_value(v, filter);
            }
        }
        MetaValue::MetaList(items) => {
            for v in items {
                walk_meta_value(v, filter);
            }
        }
        MetaValue::MetaInlines(inlines) => walk_inlines(inlines, filter),
        MetaValue::MetaBlocks(blocks) => walk_blocks(blocks, filter),
        MetaValue::MetaBool(_) | MetaValue::MetaString(_) => {}
    }
}

pub fn walk_blocks<F: Filter + ?Sized>(blocks: &mut Vec<Block>, filter: &mut F) {
    let mut out = Vec::with_capacity(blocks.len());
    for mut block in blocks.drain(..) {
        walk_block_children(&mut block, filter);
        out.extend(filter.filter_block(block));
    }
    *blocks = out;
}

pub fn walk_inlines<F: Filter + ?Sized>(inlines: &mut Vec<Inline>, filter: &mut F) {
    let mut out = Vec::with_capacity(inlines.len());
    for mut inline in inlines.drain(..) {
        walk_inline_children(&mut inline, filter);
        out.extend(filter.filter_inline(inline));
    }
    *inlines = out;
}

fn walk_inline_children<F: Filter + ?Sized>(inline: &mut Inline, filter: &mut F) {
    match inline {
        Inline::Emph(content)
        | Inline::Underline(content)
        | Inline::Strong(content)
        | Inline::Strikeout(content)
        | Inline::Superscript(content)
        | Inline::Subscript(content)
        | Inline::SmallCaps(content)
        | Inline::Quoted(_, content)
        | Inline::Link(_, content, _)
        | Inline::Image(_, content, _)
        | Inline::Span(_, content) => walk_inlines(content, filter),
        Inline::Cite(citations, content) => {
            for citation in citations.iter_mut() {
                walk_citation(citation, filter);
            }
            walk_inlines(content, filter);
        }
        Inline::Note(blocks) => walk_blocks(blocks, filter),
        Inline::Str(_)
        | Inline::Code(..)
        | Inline::Space
        | Inline::SoftBreak
        | Inline::LineBreak
        | Inline::Math(..)
        | Inline::RawInline(..) => {}
    }
}

fn walk_citation<F: Filter + ?Sized>(citation: &mut Citation, filter: &mut F) {
    walk_inlines(&mut citation.citation_prefix, filter);
    walk_inlines(&mut citation.citation_suffix, filter);
}

fn walk_block_children<F: Filter + ?Sized>(block: &mut Block, filter: &mut F) {
    match block {
        Block::Plain(inlines) | Block::Para(inlines) | Block::Header(_, _, inlines) => {
            walk_inlines(inlines, filter)
        }
        Block::LineBlock(lines) => {
            for line in lines {
                walk_inlines(line, filter);
            }
        }
        Block::BlockQuote(blocks) | Block::Div(_, blocks) => walk_blocks(blocks, filter),
        Block::OrderedList(_, items) | Block::BulletList(items) => {
            for item in items {
                walk_blocks(item, filter);
            }
        }
        Block::DefinitionList(items) => {
            for (term, definitions) in items {
                walk_inlines(term, filter);
                for definition in definitions {
                    walk_blocks(definition, filter);
                }
            }
        }
        Block::Figure(_, caption, blocks) => {
            walk_caption(caption, filter);
            walk_blocks(blocks, filter);
        }
        Block::Table(_, caption, _, head, bodies, foot) => {
            walk_caption(caption, filter);
            walk_rows(&mut head.1, filter);
            for body in bodies {
                walk_rows(&mut body.2, filter);
                walk_rows(&mut body.3, filter);
            }
            walk_rows(&mut foot.1, filter);
        }
        Block::CodeBlock(..) | Block::RawBlock(..) | Block::HorizontalRule => {}
    }
}

fn walk_caption<F: Filter + ?Sized>(caption: &mut Caption, filter: &mut F) {
    if let Some(short) = caption.0.as_mut() {
        walk_inlines(short, filter);
    }
    walk_blocks(&mut caption.1, filter);
}

fn walk_rows<F: Filter + ?Sized>(rows: &mut [Row], filter: &mut F) {
    for row in rows {
        for Cell(_, _, _, _, blocks) in row.1.iter_mut() {
            walk_blocks(blocks, filter);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::{Attr, CitationMode, Format};

    /// Records the order nodes reach the filter.
    #[derive(Default)]
    struct Recorder {
        seen: Vec<String>,
    }

    impl Filter for Recorder {
        fn filter_inline(&mut self, inline: Inline) -> Vec<Inline> {
            match &inline {
                Inline::Str(s) => self.seen.push(format!("Str:{}", s)),
                Inline::RawInline(_, text) => self.seen.push(format!("Raw:{}", text)),
                Inline::Cite(..) => self.seen.push("Cite".to_string()),
                _ => {}
            }
            vec![inline]
        }

        fn filter_block(&mut self, block: Block) -> Vec<Block> {
            if let Block::RawBlock(_, text) = &block {
                self.seen.push(format!("RawBlock:{}", text));
            }
            vec![block]
        }
    }

    fn str_(s: &str) -> Inline {
        Inline::Str(s.to_string())
    }

    #[test]
    fn test_walk_visits_metadata_before_body() {
        // Given: a document with an inline in metadata and one in the body
        let mut doc = Pandoc::new(vec![Block::Para(vec![str_("body")])]);
        doc.meta.insert(
            "abstract".to_string(),
            MetaValue::MetaInlines(vec![str_("meta")]),
        );

        // When: we walk it
        let mut recorder = Recorder::default();
        walk_document(&mut doc, &mut recorder);

        // Then: metadata comes first
        assert_eq!(recorder.seen, vec!["Str:meta", "Str:body"]);
    }

    #[test]
    fn test_walk_reaches_nested_content_in_document_order() {
        // Given: raw markup nested in a div, a note and a table-less figure caption
        let mut doc = Pandoc::new(vec![
            Block::RawBlock(Format("latex".to_string()), "first".to_string()),
            Block::Div(
                Attr::default(),
                vec![Block::Para(vec![
                    Inline::RawInline(Format("latex".to_string()), "second".to_string()),
                    Inline::Note(vec![Block::Para(vec![str_("note")])]),
                ])],
            ),
            Block::Figure(
                Attr::default(),
                Caption(None, vec![Block::Plain(vec![str_("caption")])]),
                vec![],
            ),
        ]);

        // When: we walk it
        let mut recorder = Recorder::default();
        walk_document(&mut doc, &mut recorder);

        // Then: every node is seen once, in order
        assert_eq!(
            recorder.seen,
            vec!["RawBlock:first", "Raw:second", "Str:note", "Str:caption"]
        );
    }

    #[test]
    fn test_walk_visits_citation_content_before_cite() {
        // Given: a cite whose rendered content and suffix hold Str nodes
        let mut citation = Citation::new("key", CitationMode::NormalCitation);
        citation.citation_suffix = vec![str_("suffix")];
        let mut doc = Pandoc::new(vec![Block::Para(vec![Inline::Cite(
            vec![citation],
            vec![str_("[1]")],
        )])]);

        // When: we walk it
        let mut recorder = Recorder::default();
        walk_document(&mut doc, &mut recorder);

        // Then: children reach the filter before the cite itself
        assert_eq!(recorder.seen, vec!["Str:suffix", "Str:[1]", "Cite"]);
    }

    struct Duplicator;

    impl Filter for Duplicator {
        fn filter_inline(&mut self, inline: Inline) -> Vec<Inline> {
            match inline {
                Inline::Str(s) => vec![Inline::Str(s.clone()), Inline::Space, Inline::Str(s)],
                other => vec![other],
            }
        }
    }

    #[test]
    fn test_replacements_are_spliced_and_not_rewalked() {
        // Given: a paragraph with one Str
        let mut doc = Pandoc::new(vec![Block::Para(vec![str_("x")])]);

        // When: a filter triples every Str
        walk_document(&mut doc, &mut Duplicator);

        // Then: the replacement is spliced once, not recursively expanded
        assert_eq!(
            doc.blocks,
            vec![Block::Para(vec![str_("x"), Inline::Space, str_("x")])]
        );
    }
}
