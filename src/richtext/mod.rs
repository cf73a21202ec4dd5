//! Structured rich text as delivered by the content API
//!
//! A rich-text field is an array of blocks. Each block carries its plain
//! text plus a list of spans (bold, italic, links, labels) addressed by
//! UTF-16 offsets into that text. This module turns that model into plain
//! text (for display and word counting) or HTML (for post bodies).

mod html;

use serde::{Deserialize, Serialize};

/// Kind of a rich-text block
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BlockKind {
    #[serde(rename = "heading1")]
    Heading1,
    #[serde(rename = "heading2")]
    Heading2,
    #[serde(rename = "heading3")]
    Heading3,
    #[serde(rename = "heading4")]
    Heading4,
    #[serde(rename = "heading5")]
    Heading5,
    #[serde(rename = "heading6")]
    Heading6,
    #[serde(rename = "paragraph")]
    Paragraph,
    #[serde(rename = "preformatted")]
    Preformatted,
    #[serde(rename = "list-item")]
    ListItem,
    #[serde(rename = "o-list-item")]
    OrderedListItem,
    #[serde(rename = "image")]
    Image,
    #[serde(rename = "embed")]
    Embed,
    #[serde(other)]
    Unknown,
}

/// Kind of an inline span
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SpanKind {
    Strong,
    Em,
    Hyperlink,
    Label,
    #[serde(other)]
    Unknown,
}

/// Extra data attached to hyperlink and label spans
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SpanData {
    pub url: Option<String>,
    pub target: Option<String>,
    pub label: Option<String>,
}

/// Inline formatting over `[start, end)` of the block text (UTF-16 offsets)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Span {
    pub start: usize,
    pub end: usize,
    #[serde(rename = "type")]
    pub kind: SpanKind,
    #[serde(default)]
    pub data: Option<SpanData>,
}

/// oEmbed payload of an embed block
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Oembed {
    pub embed_url: Option<String>,
    pub html: Option<String>,
}

/// One block of rich text
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Block {
    #[serde(rename = "type")]
    pub kind: BlockKind,
    #[serde(default)]
    pub text: String,
    #[serde(default)]
    pub spans: Vec<Span>,
    /// Image source (image blocks)
    #[serde(default)]
    pub url: Option<String>,
    /// Image alternative text (image blocks)
    #[serde(default)]
    pub alt: Option<String>,
    #[serde(default)]
    pub oembed: Option<Oembed>,
}

impl Block {
    /// A plain paragraph without formatting
    pub fn paragraph(text: impl Into<String>) -> Self {
        Self::text(BlockKind::Paragraph, text)
    }

    /// A text block of the given kind without formatting
    pub fn text(kind: BlockKind, text: impl Into<String>) -> Self {
        Self {
            kind,
            text: text.into(),
            spans: Vec::new(),
            url: None,
            alt: None,
            oembed: None,
        }
    }

    /// Add a span, builder style
    pub fn with_span(mut self, start: usize, end: usize, kind: SpanKind) -> Self {
        self.spans.push(Span {
            start,
            end,
            kind,
            data: None,
        });
        self
    }

    /// Add a hyperlink span, builder style
    pub fn with_link(mut self, start: usize, end: usize, url: &str) -> Self {
        self.spans.push(Span {
            start,
            end,
            kind: SpanKind::Hyperlink,
            data: Some(SpanData {
                url: Some(url.to_string()),
                ..SpanData::default()
            }),
        });
        self
    }
}

/// A rich-text field: an ordered list of blocks
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RichText(pub Vec<Block>);

impl RichText {
    pub fn new(blocks: Vec<Block>) -> Self {
        Self(blocks)
    }

    pub fn blocks(&self) -> &[Block] {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Flatten to plain text, one space between blocks
    pub fn as_text(&self) -> String {
        self.0
            .iter()
            .filter(|block| !block.text.is_empty())
            .map(|block| block.text.as_str())
            .collect::<Vec<_>>()
            .join(" ")
    }

    /// Render to HTML markup
    pub fn as_html(&self) -> String {
        html::render(&self.0)
    }
}

/// A text field that may arrive either as a plain string or as rich text
///
/// Listing queries and key-text fields come back as strings, title fields
/// as structured text, and unset fields as `null`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RichField {
    Plain(String),
    Rich(RichText),
    #[default]
    Missing,
}

impl RichField {
    /// Resolve to plain text regardless of the wire shape
    pub fn resolve(&self) -> String {
        match self {
            RichField::Plain(text) => text.clone(),
            RichField::Rich(rich) => rich.as_text(),
            RichField::Missing => String::new(),
        }
    }
}
