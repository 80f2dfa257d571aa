use std::ops::Range;
use std::sync::OnceLock;

use log::debug;
use regex::Regex;

use crate::block::{Block, SourcedBlock};
use crate::inline;

fn paragraph_break() -> &'static Regex {
    static PARAGRAPH_BREAK: OnceLock<Regex> = OnceLock::new();
    PARAGRAPH_BREAK.get_or_init(|| Regex::new(r"\n{2,}").expect("Invalid paragraph regex"))
}

fn ordered_marker() -> &'static Regex {
    static ORDERED_MARKER: OnceLock<Regex> = OnceLock::new();
    ORDERED_MARKER.get_or_init(|| Regex::new(r"^[0-9]+\.\s").expect("Invalid ordered regex"))
}

fn bullet_marker() -> &'static Regex {
    static BULLET_MARKER: OnceLock<Regex> = OnceLock::new();
    BULLET_MARKER.get_or_init(|| Regex::new(r"^[-*]\s").expect("Invalid bullet regex"))
}

/// Parse a content body into a list of blocks
pub fn parse(document: &str) -> Vec<Block> {
    parse_sourced(document)
        .into_iter()
        .map(|sourced| sourced.block)
        .collect()
}

/// Parse a content field that may be unset in the store.
pub fn parse_field(document: Option<&str>) -> Vec<Block> {
    document.map(parse).unwrap_or_default()
}

/// Parse a content body, keeping the byte range of each block's paragraph.
pub fn parse_sourced(document: &str) -> Vec<SourcedBlock> {
    let blocks: Vec<SourcedBlock> = paragraphs(document)
        .into_iter()
        .map(|range| SourcedBlock {
            block: classify(&document[range.clone()]),
            range,
        })
        .collect();

    debug!(
        "parsed {} blocks from {} bytes of content",
        blocks.len(),
        document.len()
    );
    blocks
}

/// Byte ranges of the non-empty paragraphs in `document`, in order.
///
/// Paragraphs are separated by two or more newlines. Newlines at either edge
/// of a paragraph are not part of its range.
pub fn paragraphs(document: &str) -> Vec<Range<usize>> {
    let mut ranges = Vec::new();
    let mut start = 0;

    let mut push = |range: Range<usize>| {
        let text = &document[range.clone()];
        if text.trim().is_empty() {
            return;
        }
        let leading = text.len() - text.trim_start_matches('\n').len();
        let trailing = text.len() - text.trim_end_matches('\n').len();
        ranges.push(range.start + leading..range.end - trailing);
    };

    for separator in paragraph_break().find_iter(document) {
        push(start..separator.start());
        start = separator.end();
    }
    push(start..document.len());

    ranges
}

/// Classify a single paragraph by its leading marker. First match wins.
fn classify(paragraph: &str) -> Block {
    if let Some(text) = paragraph.strip_prefix("## ") {
        return Block::Heading {
            level: 2,
            text: text.to_string(),
        };
    }
    if let Some(text) = paragraph.strip_prefix("### ") {
        return Block::Heading {
            level: 3,
            text: text.to_string(),
        };
    }
    if let Some(text) = paragraph.strip_prefix("> ") {
        return Block::Quote {
            text: text.to_string(),
        };
    }
    if ordered_marker().is_match(paragraph) {
        return Block::OrderedList {
            items: list_items(paragraph, ordered_marker()),
        };
    }
    if paragraph.starts_with("- ") || paragraph.starts_with("* ") {
        return Block::UnorderedList {
            items: list_items(paragraph, bullet_marker()),
        };
    }
    if paragraph.starts_with("```") {
        return Block::CodeBlock {
            code: strip_fence(paragraph),
        };
    }

    Block::Paragraph {
        spans: inline::parse_spans(paragraph),
    }
}

fn list_items(paragraph: &str, marker: &Regex) -> Vec<String> {
    paragraph
        .split('\n')
        .filter(|line| !line.trim().is_empty())
        .map(|line| match marker.find(line) {
            Some(found) => line[found.end()..].to_string(),
            None => line.to_string(),
        })
        .collect()
}

/// Drop the opening fence with its language tag and the closing fence.
fn strip_fence(paragraph: &str) -> String {
    let body = &paragraph["```".len()..];
    let body = match body.find('\n') {
        Some(newline) => &body[newline + 1..],
        None => body.trim_start_matches(|c: char| c.is_alphanumeric() || c == '_'),
    };
    let body = match body.strip_suffix("```") {
        Some(inner) => inner.strip_suffix('\n').unwrap_or(inner),
        None => body,
    };
    body.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::block::Span;
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    fn items(list: &[&str]) -> Vec<String> {
        list.iter().map(|item| item.to_string()).collect()
    }

    #[test]
    fn empty_document() {
        assert!(parse("").is_empty());
        assert!(parse_field(None).is_empty());
        assert!(parse_field(Some("")).is_empty());
    }

    #[rstest]
    #[case("## Title", 2, "Title")]
    #[case("### Sub", 3, "Sub")]
    #[case("## ### nested", 2, "### nested")]
    #[case("## Two\nlines", 2, "Two\nlines")]
    fn headings(#[case] input: &str, #[case] level: u8, #[case] text: &str) {
        assert_eq!(
            parse(input),
            vec![Block::Heading {
                level,
                text: text.to_string()
            }]
        );
    }

    #[test]
    fn heading_marker_needs_space() {
        assert_eq!(
            parse("##Title"),
            vec![Block::Paragraph {
                spans: vec![Span::text("##Title")]
            }]
        );
    }

    #[test]
    fn quote() {
        assert_eq!(
            parse("> quoted text"),
            vec![Block::Quote {
                text: "quoted text".to_string()
            }]
        );
    }

    #[test]
    fn quote_keeps_later_markers() {
        assert_eq!(
            parse("> first\n> second"),
            vec![Block::Quote {
                text: "first\n> second".to_string()
            }]
        );
    }

    #[test]
    fn ordered_list() {
        assert_eq!(
            parse("1. first\n2. second"),
            vec![Block::OrderedList {
                items: items(&["first", "second"])
            }]
        );
    }

    #[test]
    fn ordered_list_with_multi_digit_markers() {
        assert_eq!(
            parse("9. nine\n10. ten\n\n   \n"),
            vec![Block::OrderedList {
                items: items(&["nine", "ten"])
            }]
        );
    }

    #[test]
    fn ordered_list_keeps_unmarked_lines() {
        assert_eq!(
            parse("1. first\ncontinued\n2. second"),
            vec![Block::OrderedList {
                items: items(&["first", "continued", "second"])
            }]
        );
    }

    #[rstest]
    #[case("- a\n- b\n- c")]
    #[case("* a\n* b\n* c")]
    #[case("- a\n* b\n- c")]
    fn unordered_list(#[case] input: &str) {
        assert_eq!(
            parse(input),
            vec![Block::UnorderedList {
                items: items(&["a", "b", "c"])
            }]
        );
    }

    #[test]
    fn list_items_are_not_inline_parsed() {
        assert_eq!(
            parse("- **bold** item"),
            vec![Block::UnorderedList {
                items: items(&["**bold** item"])
            }]
        );
    }

    #[test]
    fn quoted_list_is_a_quote() {
        assert_eq!(
            parse("> - item"),
            vec![Block::Quote {
                text: "- item".to_string()
            }]
        );
    }

    #[rstest]
    #[case("```js\nconsole.log(1)\n```", "console.log(1)")]
    #[case("```\nplain\n```", "plain")]
    #[case("```c++\nint x;\n```", "int x;")]
    #[case("```rust\nfn main() {\n    let x = 1;\n}\n```", "fn main() {\n    let x = 1;\n}")]
    #[case("```\nunterminated", "unterminated")]
    #[case("```inline```", "")]
    fn code_blocks(#[case] input: &str, #[case] code: &str) {
        assert_eq!(
            parse(input),
            vec![Block::CodeBlock {
                code: code.to_string()
            }]
        );
    }

    #[test]
    fn paragraphs_in_order() {
        assert_eq!(
            parse("Para one.\n\nPara two."),
            vec![
                Block::Paragraph {
                    spans: vec![Span::text("Para one.")]
                },
                Block::Paragraph {
                    spans: vec![Span::text("Para two.")]
                },
            ]
        );
    }

    #[test]
    fn single_newlines_stay_inside_paragraph() {
        assert_eq!(
            parse("line one\nline two"),
            vec![Block::Paragraph {
                spans: vec![Span::text("line one\nline two")]
            }]
        );
    }

    #[test]
    fn extra_newlines_produce_no_blocks() {
        let blocks = parse("\n\nfirst\n\n\n\n\nsecond\n\n  \n\n");
        assert_eq!(blocks.len(), 2);
    }

    #[test]
    fn trailing_newline_is_not_content() {
        assert_eq!(
            parse("## Title\n"),
            vec![Block::Heading {
                level: 2,
                text: "Title".to_string()
            }]
        );
    }

    #[test]
    fn mixed_document() {
        let doc = "## Intro\n\nSome *text*.\n\n- one\n- two\n\n```sh\nls -la\n```\n\n> done";
        let blocks = parse(doc);
        assert_eq!(
            blocks,
            vec![
                Block::Heading {
                    level: 2,
                    text: "Intro".to_string()
                },
                Block::Paragraph {
                    spans: vec![Span::text("Some "), Span::italic("text"), Span::text(".")]
                },
                Block::UnorderedList {
                    items: items(&["one", "two"])
                },
                Block::CodeBlock {
                    code: "ls -la".to_string()
                },
                Block::Quote {
                    text: "done".to_string()
                },
            ]
        );
    }

    #[test]
    fn sourced_ranges_slice_back_to_paragraphs() {
        let doc = "\nfirst\n\n\nsecond line\nstill second\n\n## third\n";
        let sourced = parse_sourced(doc);
        let texts: Vec<&str> = sourced.iter().map(|s| &doc[s.range.clone()]).collect();
        assert_eq!(texts, vec!["first", "second line\nstill second", "## third"]);

        for pair in sourced.windows(2) {
            assert!(pair[0].range.end < pair[1].range.start);
        }
    }

    #[test]
    fn paragraph_ranges_skip_whitespace_only() {
        let doc = "a\n\n \t \n\nb";
        assert_eq!(paragraphs(doc), vec![0..1, 8..9]);
    }
}
