//! Inline span extraction for paragraph text.
//!
//! Recognised constructs are `**bold**`, `*italic*` / `_italic_`,
//! `` `code` `` and `[text](url)`. The text is scanned left to right and the
//! construct that starts earliest wins; when two start at the same position
//! the order above decides. Whatever is left over becomes plain text, so the
//! extraction never fails.

use std::sync::OnceLock;

use regex::Regex;

use crate::block::Span;

fn bold_pattern() -> &'static Regex {
    static BOLD: OnceLock<Regex> = OnceLock::new();
    BOLD.get_or_init(|| Regex::new(r"\*\*(.+?)\*\*").expect("Invalid bold regex"))
}

fn underscore_pattern() -> &'static Regex {
    static UNDERSCORE: OnceLock<Regex> = OnceLock::new();
    UNDERSCORE.get_or_init(|| Regex::new(r"_(.+?)_").expect("Invalid italic regex"))
}

fn code_pattern() -> &'static Regex {
    static CODE: OnceLock<Regex> = OnceLock::new();
    CODE.get_or_init(|| Regex::new(r"`(.+?)`").expect("Invalid code regex"))
}

fn link_pattern() -> &'static Regex {
    static LINK: OnceLock<Regex> = OnceLock::new();
    LINK.get_or_init(|| Regex::new(r"\[(.*?)\]\((.*?)\)").expect("Invalid link regex"))
}

/// A construct found in the unconsumed text, positions relative to it.
struct Found {
    start: usize,
    end: usize,
    span: Span,
}

/// Split paragraph text into styled and plain spans.
pub fn parse_spans(text: &str) -> Vec<Span> {
    let mut spans = Vec::new();
    let mut cursor = 0;

    while cursor < text.len() {
        let rest = &text[cursor..];
        let Some(found) = next_construct(rest) else {
            break;
        };
        if found.start > 0 {
            spans.push(Span::text(&rest[..found.start]));
        }
        spans.push(found.span);
        cursor += found.end;
    }

    if cursor < text.len() {
        spans.push(Span::text(&text[cursor..]));
    }

    spans
}

fn next_construct(rest: &str) -> Option<Found> {
    // Order matters: min_by_key keeps the first of equal starts.
    [
        find_bold(rest),
        find_star_italic(rest),
        find_wrapped(rest, underscore_pattern(), |text| Span::italic(text)),
        find_wrapped(rest, code_pattern(), |text| Span::code(text)),
        find_link(rest),
    ]
    .into_iter()
    .flatten()
    .min_by_key(|found| found.start)
}

fn find_wrapped(rest: &str, pattern: &Regex, make: fn(&str) -> Span) -> Option<Found> {
    let captures = pattern.captures(rest)?;
    let whole = captures.get(0)?;
    let inner = captures.get(1)?;
    Some(Found {
        start: whole.start(),
        end: whole.end(),
        span: make(inner.as_str()),
    })
}

/// Bold whose opener does not touch a preceding `*` and whose content does
/// not start with one, so a run of stars never opens it.
fn find_bold(rest: &str) -> Option<Found> {
    let bytes = rest.as_bytes();
    let mut from = 0;

    while let Some(captures) = bold_pattern().captures_at(rest, from) {
        let whole = captures.get(0)?;
        let inner = captures.get(1)?;
        let after_star = whole.start() > 0 && bytes[whole.start() - 1] == b'*';
        if !after_star && !inner.as_str().starts_with('*') {
            return Some(Found {
                start: whole.start(),
                end: whole.end(),
                span: Span::bold(inner.as_str()),
            });
        }
        from = whole.start() + 1;
    }

    None
}

fn find_link(rest: &str) -> Option<Found> {
    let captures = link_pattern().captures(rest)?;
    let whole = captures.get(0)?;
    Some(Found {
        start: whole.start(),
        end: whole.end(),
        span: Span::link(&captures[1], &captures[2]),
    })
}

/// Single-star italic. Neither delimiter may touch another `*`, and the
/// content runs to the next `*`.
fn find_star_italic(rest: &str) -> Option<Found> {
    let bytes = rest.as_bytes();
    let mut from = 0;

    while let Some(offset) = rest[from..].find('*') {
        let open = from + offset;
        from = open + 1;

        if open > 0 && bytes[open - 1] == b'*' {
            continue;
        }
        if bytes.get(open + 1) == Some(&b'*') {
            continue;
        }

        let close = open + 1 + rest[open + 1..].find('*')?;
        if bytes.get(close + 1) == Some(&b'*') {
            continue;
        }

        return Some(Found {
            start: open,
            end: close + 1,
            span: Span::italic(&rest[open + 1..close]),
        });
    }

    None
}
