//! Links and images: `[text](url "title")`, `[text][label]`, `[label]` and `![alt]...`.

use std::sync::LazyLock;

use regex::Regex;

use super::inline::balanced_parens;
use super::{Context, Parser};
use crate::ast::{Attributes, Inline, LinkTarget};
use crate::references::normalize_label;

static LINK_ATTRIBUTES: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^\{((?:[#.][A-Za-z0-9_-]+\s*)+)\}").expect("valid regex")
});

/// Position of the `]` closing the `[` at the start of `text`
fn matching_bracket(text: &str) -> Option<usize> {
    let bytes = text.as_bytes();
    let mut depth = 0usize;
    let mut p = 0;
    while p < bytes.len() {
        match bytes[p] {
            b'\\' => p += 1,
            b'[' => depth += 1,
            b']' => {
                depth -= 1;
                if depth == 0 {
                    return Some(p);
                }
            }
            _ => {}
        }
        p += 1;
    }
    None
}

/// Literal text for a `[` (or `![`) that does not start a link: the whole run of
/// brackets, so the next one is not tried again
fn literal_brackets(text: &str, skip: usize) -> (Inline, usize) {
    let end = skip + text[skip..].bytes().take_while(|&b| b == b'[').count();
    (Inline::Text(text[..end].to_string()), end)
}

/// `(destination "title")` at the start of `text`, returning destination, title and length
fn inline_destination(text: &str) -> Option<(&str, Option<&str>, usize)> {
    let bytes = text.as_bytes();
    let mut p = 1;
    while bytes.get(p).is_some_and(|b| b.is_ascii_whitespace()) {
        p += 1;
    }

    let destination = if bytes.get(p) == Some(&b'<') {
        let close = p + text[p..].find('>')?;
        let destination = &text[p + 1..close];
        p = close + 1;
        destination
    } else {
        let start = p;
        while let Some(&b) = bytes.get(p) {
            match b {
                b'\\' if p + 1 < bytes.len() => p += 2,
                b'(' => p = balanced_parens(bytes, p)?,
                b')' => break,
                b if b.is_ascii_whitespace() => break,
                _ => p += 1,
            }
        }
        &text[start..p]
    };

    let gap = bytes[p..].iter().take_while(|b| b.is_ascii_whitespace()).count();
    p += gap;
    match bytes.get(p) {
        Some(b')') => Some((destination, None, p + 1)),
        Some(&open @ (b'"' | b'\'' | b'(')) if gap > 0 => {
            let close = if open == b'(' { b')' } else { open };
            let title_start = p + 1;
            let mut q = title_start;
            // The title ends at the first closing quote followed by `)`
            while q < bytes.len() {
                if bytes[q] == close {
                    let after = q + 1 + bytes[q + 1..].iter().take_while(|b| b.is_ascii_whitespace()).count();
                    if bytes.get(after) == Some(&b')') {
                        return Some((destination, Some(&text[title_start..q]), after + 1));
                    }
                }
                q += 1;
            }
            None
        }
        _ => None,
    }
}

/// `[label]` after the link text, optionally separated by one space or newline.
/// Returns the label (None when absent or empty) and the consumed length.
fn reference_label(text: &str) -> (Option<&str>, usize) {
    let skip = usize::from(text.starts_with([' ', '\n']));
    let Some(rest) = text[skip..].strip_prefix('[') else {
        return (None, 0);
    };
    match rest.find(']') {
        Some(close) => {
            let label = &rest[..close];
            ((!label.is_empty()).then_some(label), skip + close + 2)
        }
        None => (None, 0),
    }
}

impl Parser<'_> {
    pub(super) fn parse_link(&mut self, text: &str) -> Option<(Inline, usize)> {
        if !self.in_context(Context::Link)
            && let Some((content, target, end)) = self.link_or_image(text)
        {
            let source = text[..end].to_string();
            let (attributes, extra) = self.trailing_attributes(&text[end..]);
            let children = self.parse_inline_in(Context::Link, content);
            return Some((
                Inline::Link {
                    target,
                    children,
                    attributes,
                    source,
                },
                end + extra,
            ));
        }
        Some(literal_brackets(text, 0))
    }

    pub(super) fn parse_image(&mut self, text: &str) -> Option<(Inline, usize)> {
        match self.link_or_image(&text[1..]) {
            Some((alt, target, end)) => {
                let end = end + 1;
                let (attributes, extra) = self.trailing_attributes(&text[end..]);
                Some((
                    Inline::Image {
                        target,
                        alt: alt.to_string(),
                        attributes,
                        source: text[..end].to_string(),
                    },
                    end + extra,
                ))
            }
            None => Some(literal_brackets(text, 1)),
        }
    }

    /// Bracketed text followed by an inline destination or a reference label
    fn link_or_image<'t>(&self, text: &'t str) -> Option<(&'t str, LinkTarget, usize)> {
        let close = matching_bracket(text)?;
        let content = &text[1..close];
        let rest = &text[close + 1..];

        if rest.starts_with('(')
            && let Some((destination, title, len)) = inline_destination(rest)
        {
            let target = LinkTarget::Inline {
                destination: self.unescape(destination),
                title: title.map(str::to_string),
            };
            return Some((content, target, close + 1 + len));
        }

        let (label, len) = reference_label(rest);
        let key = normalize_label(label.unwrap_or(content));
        Some((content, LinkTarget::Reference(key), close + 1 + len))
    }

    /// `{#id .class}` directly after a link or image, in dialects that support it
    fn trailing_attributes(&self, text: &str) -> (Option<Attributes>, usize) {
        if !self.dialect.special_attributes {
            return (None, 0);
        }
        match LINK_ATTRIBUTES.captures(text) {
            Some(caps) => match Attributes::parse(&caps[1]) {
                Some(attributes) => (Some(attributes), caps[0].len()),
                None => (None, 0),
            },
            None => (None, 0),
        }
    }
}
