//! Rich text to HTML

use super::{Block, BlockKind, Span, SpanKind};
use crate::helpers::{html_escape, image_tag};

/// A span with its offsets converted to byte positions in the block text
struct ByteSpan<'a> {
    start: usize,
    end: usize,
    span: &'a Span,
}

/// Render blocks to HTML, grouping consecutive list items into lists
pub(super) fn render(blocks: &[Block]) -> String {
    let mut out = String::new();
    let mut open_list: Option<BlockKind> = None;

    for block in blocks {
        let list = match block.kind {
            BlockKind::ListItem | BlockKind::OrderedListItem => Some(block.kind),
            _ => None,
        };

        if open_list != list {
            if let Some(kind) = open_list {
                out.push_str(list_close(kind));
            }
            if let Some(kind) = list {
                out.push_str(list_open(kind));
            }
            open_list = list;
        }

        render_block(block, &mut out);
    }

    if let Some(kind) = open_list {
        out.push_str(list_close(kind));
    }

    out
}

fn list_open(kind: BlockKind) -> &'static str {
    if kind == BlockKind::OrderedListItem {
        "<ol>"
    } else {
        "<ul>"
    }
}

fn list_close(kind: BlockKind) -> &'static str {
    if kind == BlockKind::OrderedListItem {
        "</ol>"
    } else {
        "</ul>"
    }
}

fn render_block(block: &Block, out: &mut String) {
    let tag = match block.kind {
        BlockKind::Heading1 => "h1",
        BlockKind::Heading2 => "h2",
        BlockKind::Heading3 => "h3",
        BlockKind::Heading4 => "h4",
        BlockKind::Heading5 => "h5",
        BlockKind::Heading6 => "h6",
        BlockKind::Preformatted => "pre",
        BlockKind::ListItem | BlockKind::OrderedListItem => "li",
        BlockKind::Paragraph => "p",
        BlockKind::Image => {
            if let Some(url) = &block.url {
                out.push_str(r#"<p class="block-img">"#);
                out.push_str(&image_tag(url, block.alt.as_deref(), None));
                out.push_str("</p>");
            }
            return;
        }
        BlockKind::Embed => {
            if let Some(oembed) = &block.oembed {
                let embed_url = oembed.embed_url.as_deref().unwrap_or("");
                out.push_str(&format!(
                    r#"<div data-oembed="{}">{}</div>"#,
                    html_escape(embed_url),
                    oembed.html.as_deref().unwrap_or("")
                ));
            }
            return;
        }
        // Keep the words of block types we do not know about
        BlockKind::Unknown if !block.text.is_empty() => "p",
        BlockKind::Unknown => return,
    };

    out.push('<');
    out.push_str(tag);
    out.push('>');
    out.push_str(&render_inline(&block.text, &block.spans));
    out.push_str("</");
    out.push_str(tag);
    out.push('>');
}

/// Render block text with its spans applied
fn render_inline(text: &str, spans: &[Span]) -> String {
    let mut spans: Vec<ByteSpan> = spans
        .iter()
        .filter_map(|span| {
            let start = utf16_to_byte(text, span.start);
            let end = utf16_to_byte(text, span.end);
            (start < end).then_some(ByteSpan { start, end, span })
        })
        .collect();
    // Outer spans first when two start at the same offset
    spans.sort_by(|a, b| a.start.cmp(&b.start).then(b.end.cmp(&a.end)));

    let mut out = String::with_capacity(text.len());
    render_range(text, &spans, 0, text.len(), &mut out);
    out
}

/// Render `text[from..to]`; `spans` are sorted and all start inside the range
fn render_range(text: &str, spans: &[ByteSpan], from: usize, to: usize, out: &mut String) {
    let mut pos = from;
    let mut i = 0;

    while i < spans.len() {
        let current = &spans[i];
        if current.start < pos || current.start >= to {
            i += 1;
            continue;
        }
        let end = current.end.min(to);

        push_text(&text[pos..current.start], out);

        let mut nested_end = i + 1;
        while nested_end < spans.len() && spans[nested_end].start < end {
            nested_end += 1;
        }

        open_span(current.span, out);
        render_range(text, &spans[i + 1..nested_end], current.start, end, out);
        close_span(current.span, out);

        pos = end;
        i = nested_end;
    }

    push_text(&text[pos..to], out);
}

fn push_text(text: &str, out: &mut String) {
    out.push_str(&html_escape(text).replace('\n', "<br />"));
}

fn open_span(span: &Span, out: &mut String) {
    match span.kind {
        SpanKind::Strong => out.push_str("<strong>"),
        SpanKind::Em => out.push_str("<em>"),
        SpanKind::Hyperlink => match link_url(span) {
            Some(url) => {
                let target = span
                    .data
                    .as_ref()
                    .and_then(|d| d.target.as_deref())
                    .map(|t| {
                        format!(
                            r#" target="{}" rel="noopener noreferrer""#,
                            html_escape(t)
                        )
                    })
                    .unwrap_or_default();
                out.push_str(&format!(r#"<a href="{}"{}>"#, html_escape(url), target));
            }
            None => out.push_str("<span>"),
        },
        SpanKind::Label => {
            let label = span
                .data
                .as_ref()
                .and_then(|d| d.label.as_deref())
                .unwrap_or("");
            out.push_str(&format!(r#"<span class="{}">"#, html_escape(label)));
        }
        SpanKind::Unknown => out.push_str("<span>"),
    }
}

fn close_span(span: &Span, out: &mut String) {
    match span.kind {
        SpanKind::Strong => out.push_str("</strong>"),
        SpanKind::Em => out.push_str("</em>"),
        SpanKind::Hyperlink if link_url(span).is_some() => out.push_str("</a>"),
        _ => out.push_str("</span>"),
    }
}

/// Hyperlink target, refusing script-capable schemes
fn link_url(span: &Span) -> Option<&str> {
    let url = span.data.as_ref()?.url.as_deref()?.trim();
    let lower = url.to_ascii_lowercase();
    if url.is_empty()
        || lower.starts_with("javascript:")
        || lower.starts_with("vbscript:")
        || lower.starts_with("data:")
    {
        return None;
    }
    Some(url)
}

/// Convert a UTF-16 code unit offset into a byte offset on a char boundary
fn utf16_to_byte(text: &str, offset: usize) -> usize {
    let mut units = 0;
    for (index, ch) in text.char_indices() {
        if units >= offset {
            return index;
        }
        units += ch.len_utf16();
    }
    text.len()
}
