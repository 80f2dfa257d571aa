use html_escape::{encode_double_quoted_attribute, encode_text};

use crate::block::{Block, Span};
use crate::config::{Config, LinksConfig};

/// Convert blocks to an HTML fragment, one element per block
pub fn blocks_to_html(blocks: &[Block], config: &Config) -> String {
    let mut out = String::new();

    for block in blocks {
        emit_block(block, config, &mut out);
        out.push('\n');
    }

    out
}

fn emit_block(block: &Block, config: &Config, out: &mut String) {
    match block {
        Block::Heading { level, text } => {
            out.push_str(&format!("<h{level}>"));
            out.push_str(&encode_text(text));
            out.push_str(&format!("</h{level}>"));
        }
        Block::Quote { text } => {
            out.push_str("<blockquote>");
            out.push_str(&encode_text(text));
            out.push_str("</blockquote>");
        }
        Block::OrderedList { items } => list_to_html("ol", items, out),
        Block::UnorderedList { items } => list_to_html("ul", items, out),
        Block::CodeBlock { code } => {
            out.push_str("<pre><code>");
            out.push_str(&encode_text(code));
            out.push_str("</code></pre>");
        }
        Block::Paragraph { spans } => {
            out.push_str("<p>");
            spans_to_html(spans, &config.links, out);
            out.push_str("</p>");
        }
    }
}

fn list_to_html(tag: &str, items: &[String], out: &mut String) {
    out.push_str(&format!("<{tag}>\n"));
    for item in items {
        out.push_str("<li>");
        out.push_str(&encode_text(item));
        out.push_str("</li>\n");
    }
    out.push_str(&format!("</{tag}>"));
}

fn spans_to_html(spans: &[Span], links: &LinksConfig, out: &mut String) {
    for span in spans {
        span_to_html(span, links, out);
    }
}

fn span_to_html(span: &Span, links: &LinksConfig, out: &mut String) {
    match span {
        Span::Text { text } => out.push_str(&encode_text(text)),
        Span::Bold { text } => {
            out.push_str("<strong>");
            out.push_str(&encode_text(text));
            out.push_str("</strong>");
        }
        Span::Italic { text } => {
            out.push_str("<em>");
            out.push_str(&encode_text(text));
            out.push_str("</em>");
        }
        Span::Code { text } => {
            out.push_str("<code>");
            out.push_str(&encode_text(text));
            out.push_str("</code>");
        }
        Span::Link { text, url } => {
            out.push_str("<a href=\"");
            out.push_str(&encode_double_quoted_attribute(url));
            out.push('"');
            if links.new_tab {
                out.push_str(" target=\"_blank\"");
                if !links.rel.is_empty() {
                    out.push_str(" rel=\"");
                    out.push_str(&encode_double_quoted_attribute(&links.rel));
                    out.push('"');
                }
            }
            out.push('>');
            out.push_str(&encode_text(text));
            out.push_str("</a>");
        }
    }
}
