//! Pandoc JSON document model.
//!
//! Mirrors the AST pandoc streams to JSON filters: every node is encoded as
//! `{"t": "<Kind>", "c": <contents>}`, with tuple contents serialized as
//! JSON arrays. Only the shape is modeled; no rendering happens here.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Document metadata, keyed by field name.
pub type Meta = BTreeMap<String, MetaValue>;

/// A complete Pandoc document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Pandoc {
    #[serde(rename = "pandoc-api-version")]
    pub api_version: Vec<u32>,
    pub meta: Meta,
    pub blocks: Vec<Block>,
}

impl Pandoc {
    /// Creates a document with the given blocks and empty metadata.
    pub fn new(blocks: Vec<Block>) -> Self {
        Self {
            api_version: vec![1, 23, 1],
            meta: Meta::new(),
            blocks,
        }
    }

    /// Parses a document from pandoc's JSON representation.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    /// Serializes the document back to pandoc's JSON representation.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }
}

/// Identifier, classes and key-value attributes.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Attr(pub String, pub Vec<String>, pub Vec<(String, String)>);

impl Attr {
    /// An attribute set carrying only the given classes.
    pub fn with_classes<I, S>(classes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Attr(
            String::new(),
            classes.into_iter().map(Into::into).collect(),
            Vec::new(),
        )
    }

    pub fn has_class(&self, class: &str) -> bool {
        self.1.iter().any(|c| c == class)
    }
}

/// Link or image target: (url, title).
pub type Target = (String, String);

/// Raw content format, e.g. `latex` or `html`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Format(pub String);

impl Format {
    pub fn is_latex(&self) -> bool {
        self.0 == "latex"
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "t", content = "c")]
pub enum Inline {
    Str(String),
    Emph(Vec<Inline>),
    Underline(Vec<Inline>),
    Strong(Vec<Inline>),
    Strikeout(Vec<Inline>),
    Superscript(Vec<Inline>),
    Subscript(Vec<Inline>),
    SmallCaps(Vec<Inline>),
    Quoted(QuoteType, Vec<Inline>),
    Cite(Vec<Citation>, Vec<Inline>),
    Code(Attr, String),
    Space,
    SoftBreak,
    LineBreak,
    Math(MathType, String),
    RawInline(Format, String),
    Link(Attr, Vec<Inline>, Target),
    Image(Attr, Vec<Inline>, Target),
    Note(Vec<Block>),
    Span(Attr, Vec<Inline>),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "t", content = "c")]
pub enum Block {
    Plain(Vec<Inline>),
    Para(Vec<Inline>),
    LineBlock(Vec<Vec<Inline>>),
    CodeBlock(Attr, String),
    RawBlock(Format, String),
    BlockQuote(Vec<Block>),
    OrderedList(ListAttributes, Vec<Vec<Block>>),
    BulletList(Vec<Vec<Block>>),
    DefinitionList(Vec<(Vec<Inline>, Vec<Vec<Block>>)>),
    Header(i32, Attr, Vec<Inline>),
    HorizontalRule,
    Table(Attr, Caption, Vec<ColSpec>, TableHead, Vec<TableBody>, TableFoot),
    Figure(Attr, Caption, Vec<Block>),
    Div(Attr, Vec<Block>),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "t")]
pub enum QuoteType {
    SingleQuote,
    DoubleQuote,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "t")]
pub enum MathType {
    DisplayMath,
    InlineMath,
}

/// One bibliographic reference inside a `Cite`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Citation {
    pub citation_id: String,
    pub citation_prefix: Vec<Inline>,
    pub citation_suffix: Vec<Inline>,
    pub citation_mode: CitationMode,
    pub citation_note_num: i64,
    pub citation_hash: i64,
}

impl Citation {
    /// A citation with no prefix, suffix or numbering.
    pub fn new(id: impl Into<String>, mode: CitationMode) -> Self {
        Self {
            citation_id: id.into(),
            citation_prefix: Vec::new(),
            citation_suffix: Vec::new(),
            citation_mode: mode,
            citation_note_num: 0,
            citation_hash: 0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "t")]
pub enum CitationMode {
    AuthorInText,
    SuppressAuthor,
    NormalCitation,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ListAttributes(pub i32, pub ListNumberStyle, pub ListNumberDelim);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "t")]
pub enum ListNumberStyle {
    DefaultStyle,
    Example,
    Decimal,
    LowerRoman,
    UpperRoman,
    LowerAlpha,
    UpperAlpha,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "t")]
pub enum ListNumberDelim {
    DefaultDelim,
    Period,
    OneParen,
    TwoParens,
}

/// Figure or table caption: optional short caption plus body blocks.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Caption(pub Option<Vec<Inline>>, pub Vec<Block>);

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ColSpec(pub Alignment, pub ColWidth);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "t")]
pub enum Alignment {
    AlignLeft,
    AlignRight,
    AlignCenter,
    AlignDefault,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "t", content = "c")]
pub enum ColWidth {
    ColWidth(f64),
    ColWidthDefault,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TableHead(pub Attr, pub Vec<Row>);

/// Table body: attributes, row-head column count, intermediate head, rows.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TableBody(pub Attr, pub i32, pub Vec<Row>, pub Vec<Row>);

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TableFoot(pub Attr, pub Vec<Row>);

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Row(pub Attr, pub Vec<Cell>);

/// Table cell: attributes, alignment, row span, column span, content.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Cell(pub Attr, pub Alignment, pub i32, pub i32, pub Vec<Block>);

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "t", content = "c")]
pub enum MetaValue {
    MetaMap(BTreeMap<String, MetaValue>),
    MetaList(Vec<MetaValue>),
    MetaBool(bool),
    MetaString(String),
    MetaInlines(Vec<Inline>),
    MetaBlocks(Vec<Block>),
}

/// Renders inlines as plain text, dropping formatting and raw content.
pub fn stringify(inlines: &[Inline]) -> String {
    let mut out = String::new();
    push_inlines(&mut out, inlines);
    out
}

/// Renders blocks as plain text, separating blocks with a blank line.
pub fn stringify_blocks(blocks: &[Block]) -> String {
    let parts: Vec<String> = blocks
        .iter()
        .map(|block| {
            let mut out = String::new();
            push_block(&mut out, block);
            out
        })
        .filter(|s| !s.is_empty())
        .collect();
    parts.join("\n\n")
}

impl MetaValue {
    /// Plain-text rendering of a metadata value.
    pub fn stringify(&self) -> String {
        match self {
            MetaValue::MetaString(s) => s.clone(),
            MetaValue::MetaInlines(inlines) => stringify(inlines),
            MetaValue::MetaBlocks(blocks) => stringify_blocks(blocks),
            MetaValue::MetaBool(b) => b.to_string(),
            MetaValue::MetaList(items) => items
                .iter()
                .map(MetaValue::stringify)
                .collect::<Vec<_>>()
                .join(" "),
            MetaValue::MetaMap(_) => String::new(),
        }
    }
}

fn push_inlines(out: &mut String, inlines: &[Inline]) {
    for inline in inlines {
        match inline {
            Inline::Str(s) | Inline::Code(_, s) | Inline::Math(_, s) => out.push_str(s),
            Inline::Space | Inline::SoftBreak | Inline::LineBreak => out.push(' '),
            Inline::Quoted(QuoteType::SingleQuote, content) => {
                out.push('\'');
                push_inlines(out, content);
                out.push('\'');
            }
            Inline::Quoted(QuoteType::DoubleQuote, content) => {
                out.push('"');
                push_inlines(out, content);
                out.push('"');
            }
            Inline::Emph(content)
            | Inline::Underline(content)
            | Inline::Strong(content)
            | Inline::Strikeout(content)
            | Inline::Superscript(content)
            | Inline::Subscript(content)
            | Inline::SmallCaps(content)
            | Inline::Cite(_, content)
            | Inline::Link(_, content, _)
            | Inline::Image(_, content, _)
            | Inline::Span(_, content) => push_inlines(out, content),
            Inline::RawInline(..) | Inline::Note(_) => {}
        }
    }
}

fn push_block(out: &mut String, block: &Block) {
    match block {
        Block::Plain(inlines) | Block::Para(inlines) | Block::Header(_, _, inlines) => {
            push_inlines(out, inlines)
        }
        Block::LineBlock(lines) => {
            let rendered: Vec<String> = lines.iter().map(|l| stringify(l)).collect();
            out.push_str(&rendered.join("\n"));
        }
        Block::CodeBlock(_, text) => out.push_str(text),
        Block::BlockQuote(blocks) | Block::Div(_, blocks) | Block::Figure(_, _, blocks) => {
            out.push_str(&stringify_blocks(blocks))
        }
        Block::BulletList(items) | Block::OrderedList(_, items) => {
            let rendered: Vec<String> = items.iter().map(|item| stringify_blocks(item)).collect();
            out.push_str(&rendered.join("\n"));
        }
        Block::DefinitionList(items) => {
            let rendered: Vec<String> = items
                .iter()
                .map(|(term, definitions)| {
                    let mut text = stringify(term);
                    for definition in definitions {
                        text.push('\n');
                        text.push_str(&stringify_blocks(definition));
                    }
                    text
                })
                .collect();
            out.push_str(&rendered.join("\n"));
        }
        Block::RawBlock(..) | Block::HorizontalRule | Block::Table(..) => {}
    }
}
