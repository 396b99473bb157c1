//! Rich-text rendering for notification strings.
//!
//! Accepts the small HTML subset hosts use in titles and bodies: `<b>`,
//! `<strong>`, `<i>`, `<em>`, `<u>`, `<s>`/`<strike>`/`<del>`, `<br>`, and
//! character entities. Unknown tags are dropped; their text is kept.

use beacon_core::types::{RichText, TextSpan, TextStyle};

/// Render markup into plain text plus formatting spans (char indices).
pub fn render(markup: &str) -> RichText {
    let mut text = String::with_capacity(markup.len());
    let mut len = 0usize;
    let mut open: Vec<(TextStyle, usize)> = Vec::new();
    let mut spans = Vec::new();
    let mut rest = markup;

    while let Some(c) = rest.chars().next() {
        if c == '<'
            && looks_like_tag(rest)
            && let Some(end) = rest.find('>')
        {
            let (closing, name) = parse_tag(&rest[1..end]);
            if name == "br" {
                text.push('\n');
                len += 1;
            } else if let Some(style) = style_for(&name) {
                if !closing {
                    open.push((style, len));
                } else if let Some(pos) = open.iter().rposition(|(s, _)| *s == style) {
                    let (_, start) = open.remove(pos);
                    if len > start {
                        spans.push(TextSpan { start, end: len, style });
                    }
                }
            }
            rest = &rest[end + 1..];
            continue;
        }

        if c == '&'
            && let Some((decoded, consumed)) = decode_entity(rest)
        {
            text.push(decoded);
            len += 1;
            rest = &rest[consumed..];
            continue;
        }

        text.push(c);
        len += 1;
        rest = &rest[c.len_utf8()..];
    }

    // Unclosed tags run to the end of the text.
    for (style, start) in open {
        if len > start {
            spans.push(TextSpan { start, end: len, style });
        }
    }
    spans.sort_by_key(|s| (s.start, s.end));

    RichText { text, spans }
}

fn looks_like_tag(s: &str) -> bool {
    s[1..]
        .chars()
        .next()
        .is_some_and(|c| c.is_ascii_alphabetic() || c == '/')
}

fn parse_tag(inner: &str) -> (bool, String) {
    let inner = inner.trim();
    let closing = inner.starts_with('/');
    let name = inner
        .trim_start_matches('/')
        .trim_end_matches('/')
        .split_whitespace()
        .next()
        .unwrap_or("")
        .to_ascii_lowercase();
    (closing, name)
}

fn style_for(name: &str) -> Option<TextStyle> {
    match name {
        "b" | "strong" => Some(TextStyle::Bold),
        "i" | "em" => Some(TextStyle::Italic),
        "u" => Some(TextStyle::Underline),
        "s" | "strike" | "del" => Some(TextStyle::Strikethrough),
        _ => None,
    }
}

/// Decode an entity at the start of `s`; returns the char and bytes consumed.
fn decode_entity(s: &str) -> Option<(char, usize)> {
    let (semi, _) = s.char_indices().take(12).find(|(_, c)| *c == ';')?;
    let name = &s[1..semi];
    let decoded = match name {
        "amp" => '&',
        "lt" => '<',
        "gt" => '>',
        "quot" => '"',
        "apos" => '\'',
        "nbsp" => '\u{a0}',
        _ => {
            let num = name.strip_prefix('#')?;
            let code = match num.strip_prefix(['x', 'X']) {
                Some(hex) => u32::from_str_radix(hex, 16).ok()?,
                None => num.parse().ok()?,
            };
            char::from_u32(code)?
        }
    };
    Some((decoded, semi + 1))
}
