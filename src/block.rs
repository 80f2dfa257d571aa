use std::ops::Range;

use serde::Serialize;

/// Inline text spans with formatting
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Span {
    Text { text: String },
    Bold { text: String },
    Italic { text: String },
    Code { text: String },
    Link { text: String, url: String },
}

impl Span {
    pub fn text(text: impl Into<String>) -> Self {
        Span::Text { text: text.into() }
    }

    pub fn bold(text: impl Into<String>) -> Self {
        Span::Bold { text: text.into() }
    }

    pub fn italic(text: impl Into<String>) -> Self {
        Span::Italic { text: text.into() }
    }

    pub fn code(text: impl Into<String>) -> Self {
        Span::Code { text: text.into() }
    }

    pub fn link(text: impl Into<String>, url: impl Into<String>) -> Self {
        Span::Link {
            text: text.into(),
            url: url.into(),
        }
    }
}

/// Block-level elements parsed from a content body
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Block {
    /// Level is always 2 or 3.
    Heading { level: u8, text: String },
    Quote { text: String },
    OrderedList { items: Vec<String> },
    UnorderedList { items: Vec<String> },
    CodeBlock { code: String },
    Paragraph { spans: Vec<Span> },
}

/// A block together with the byte range of the paragraph it was built from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SourcedBlock {
    pub range: Range<usize>,
    pub block: Block,
}
