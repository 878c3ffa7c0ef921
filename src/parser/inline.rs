//! Inline scanning: markers, the scan loop and the span handlers.
//!
//! The scanner jumps to the next byte that can start one of the document's active
//! markers and hands the remaining text to the matching handlers, longest marker
//! first. A handler returns the node it built and how many bytes it consumed, or
//! `None` to let the next candidate (and finally a literal character) take over.

use std::cmp::Reverse;
use std::sync::LazyLock;

use log::{trace, warn};
use regex::Regex;

use super::{Context, Parser};
use crate::ast::Inline;
use crate::dialect::{Dialect, MarkerKind};

static HARD_BREAK: LazyLock<Regex> = LazyLock::new(|| Regex::new(r" {2,}\n").expect("valid regex"));
static ANY_NEWLINE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r" *\n").expect("valid regex"));
static WHITESPACE_RUN: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\s+").expect("valid regex"));

static ENTITY: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^&#?[A-Za-z0-9_]+;").expect("valid regex"));
static EMAIL_AUTOLINK: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^<([^\s>]*?@[^\s]*?\.\w+?)>").expect("valid regex"));
static URL_AUTOLINK: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^<([a-z]{3,}://[^\s]+?)>").expect("valid regex"));
static INLINE_TAG: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^</?\w+(?:\s[^>]*)?/?>").expect("valid regex"));
static HTML_COMMENT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)^<!--.*?-->").expect("valid regex"));

const URL_SCHEMES: [&str; 3] = ["https://", "http://", "ftp://"];

/// Markers of a dialect that occur in the current document, grouped by first byte
#[derive(Debug, Clone)]
pub(crate) struct MarkerSet {
    starts: [bool; 256],
    groups: Vec<(u8, Vec<(&'static str, MarkerKind)>)>,
}

impl MarkerSet {
    pub(crate) fn new() -> Self {
        MarkerSet {
            starts: [false; 256],
            groups: Vec::new(),
        }
    }

    pub(crate) fn prepare(dialect: &Dialect, text: &str) -> Self {
        let mut set = MarkerSet::new();
        for &(marker, kind) in dialect.markers {
            if !text.contains(marker) {
                continue;
            }
            let first = marker.as_bytes()[0];
            set.starts[first as usize] = true;
            match set.groups.iter_mut().find(|(byte, _)| *byte == first) {
                Some((_, group)) => group.push((marker, kind)),
                None => set.groups.push((first, vec![(marker, kind)])),
            }
        }
        // longest first; the sort is stable so equal lengths keep declaration order
        for (_, group) in &mut set.groups {
            group.sort_by_key(|(marker, _)| Reverse(marker.len()));
        }
        set
    }

    pub(crate) fn next_position(&self, text: &str) -> Option<usize> {
        text.bytes().position(|b| self.starts[b as usize])
    }

    pub(crate) fn candidates(&self, first: u8) -> &[(&'static str, MarkerKind)] {
        self.groups
            .iter()
            .find(|(byte, _)| *byte == first)
            .map_or(&[], |(_, group)| group.as_slice())
    }
}

/// Append a node, merging adjacent text
fn push_node(nodes: &mut Vec<Inline>, node: Inline) {
    if let Inline::Text(text) = &node {
        if text.is_empty() {
            return;
        }
        if let Some(Inline::Text(previous)) = nodes.last_mut() {
            previous.push_str(text);
            return;
        }
    }
    nodes.push(node);
}

impl Parser<'_> {
    /// Scan `text` into inline nodes. Past the nesting limit the text is returned as is.
    pub(crate) fn parse_inline(&mut self, text: &str) -> Vec<Inline> {
        if self.depth >= self.options.maximum_nesting_level {
            warn!(
                "maximum nesting level {} reached, leaving inline text unparsed",
                self.options.maximum_nesting_level
            );
            return vec![Inline::Text(text.to_string())];
        }
        self.depth += 1;

        let mut nodes = Vec::new();
        let mut rest = text;
        while let Some(position) = self.markers.next_position(rest) {
            if position > 0 {
                self.push_text(&mut nodes, &rest[..position]);
                rest = &rest[position..];
            }
            let (node, consumed) = self.dispatch_marker(rest);
            push_node(&mut nodes, node);
            rest = &rest[consumed..];
        }
        self.push_text(&mut nodes, rest);

        self.depth -= 1;
        nodes
    }

    pub(super) fn parse_inline_in(&mut self, context: Context, text: &str) -> Vec<Inline> {
        self.context.push(context);
        let nodes = self.parse_inline(text);
        self.context.pop();
        nodes
    }

    fn dispatch_marker(&mut self, text: &str) -> (Inline, usize) {
        let first = text.as_bytes()[0];
        let count = self.markers.candidates(first).len();
        for index in 0..count {
            let (marker, kind) = self.markers.candidates(first)[index];
            if !text.starts_with(marker) {
                continue;
            }
            trace!("marker {:?} -> {:?}", marker, kind);
            if let Some(hit) = self.run_marker(kind, marker, text) {
                return hit;
            }
        }
        (Inline::Text(text[..1].to_string()), 1)
    }

    fn run_marker(&mut self, kind: MarkerKind, marker: &str, text: &str) -> Option<(Inline, usize)> {
        match kind {
            MarkerKind::Escape => self.parse_escape(text),
            MarkerKind::Entity => parse_entity(text),
            MarkerKind::Angle => self.parse_angle(text),
            MarkerKind::Code => parse_code_span(text),
            MarkerKind::Emphasis => self.parse_emphasis(text),
            MarkerKind::Image => self.parse_image(text),
            MarkerKind::Link => self.parse_link(text),
            MarkerKind::Url => self.parse_url(text, marker.len()),
            MarkerKind::Strikeout => self.parse_strikeout(text),
            MarkerKind::CellBoundary => self.parse_cell_boundary(),
            MarkerKind::FootnoteLink => self.parse_footnote_link(text),
            MarkerKind::Superscript => parse_superscript(text),
        }
    }

    /// Plain text between markers; trailing double spaces (or any newline in
    /// hard-newline mode) become line breaks, the newline itself stays in the text.
    fn push_text(&self, nodes: &mut Vec<Inline>, text: &str) {
        let breaks = if self.options.enable_newlines && self.dialect.hard_newlines {
            &*ANY_NEWLINE
        } else {
            &*HARD_BREAK
        };
        let mut last = 0;
        for found in breaks.find_iter(text) {
            push_node(nodes, Inline::Text(text[last..found.start()].to_string()));
            nodes.push(Inline::LineBreak);
            last = found.end() - 1;
        }
        push_node(nodes, Inline::Text(text[last..].to_string()));
    }

    /// Drop backslashes in front of escapable characters
    pub(crate) fn unescape(&self, text: &str) -> String {
        let mut unescaped = String::with_capacity(text.len());
        let mut chars = text.chars().peekable();
        while let Some(c) = chars.next() {
            if c == '\\'
                && let Some(&next) = chars.peek()
                && next.is_ascii()
                && self.dialect.is_escapable(next as u8)
            {
                unescaped.push(next);
                chars.next();
            } else {
                unescaped.push(c);
            }
        }
        unescaped
    }

    fn parse_escape(&mut self, text: &str) -> Option<(Inline, usize)> {
        match text.as_bytes().get(1) {
            None | Some(b'\n') => Some((Inline::LineBreak, 1)),
            Some(&next) if self.dialect.is_escapable(next) => {
                Some((Inline::Text(char::from(next).to_string()), 2))
            }
            _ => None,
        }
    }

    /// `<` starts an email or URL autolink, a raw tag or a comment
    fn parse_angle(&mut self, text: &str) -> Option<(Inline, usize)> {
        if !text.contains('>') {
            return None;
        }
        if !self.in_context(Context::Link) {
            if let Some(caps) = EMAIL_AUTOLINK.captures(text) {
                return Some((Inline::Email(self.unescape(&caps[1])), caps[0].len()));
            }
            if let Some(caps) = URL_AUTOLINK.captures(text) {
                return Some((Inline::Autolink(self.unescape(&caps[1])), caps[0].len()));
            }
        }
        INLINE_TAG
            .find(text)
            .or_else(|| HTML_COMMENT.find(text))
            .map(|found| (Inline::HtmlInline(found.as_str().to_string()), found.end()))
    }

    fn parse_emphasis(&mut self, text: &str) -> Option<(Inline, usize)> {
        let bytes = text.as_bytes();
        let marker = bytes[0];
        if bytes.get(1) == Some(&marker) {
            let end = match_strong(bytes, marker)?;
            let children = self.parse_inline_in(Context::Strong, &text[2..end]);
            return Some((Inline::Strong(children), end + 2));
        }

        let end = match_emphasis(text, marker)?;
        let content = &text[1..end];
        if content == " " {
            return None;
        }
        let children = self.parse_inline_in(Context::Emphasis, content);
        Some((Inline::Emphasis(children), end + 1))
    }

    fn parse_strikeout(&mut self, text: &str) -> Option<(Inline, usize)> {
        match closing_delimiter(text, 2, "~~") {
            Some(end) => {
                let children = self.parse_inline_in(Context::Strikeout, &text[2..end]);
                Some((Inline::Strikeout(children), end + 2))
            }
            None => Some((Inline::Text("~~".to_string()), 2)),
        }
    }

    /// Bare `http://`, `https://` and `ftp://` URLs, never inside link text
    fn parse_url(&mut self, text: &str, marker_len: usize) -> Option<(Inline, usize)> {
        let end = if self.in_context(Context::Link) {
            None
        } else {
            match_url(text)
        };
        match end {
            Some(end) => Some((Inline::Autolink(text[..end].to_string()), end)),
            None => Some((Inline::Text(text[..marker_len].to_string()), marker_len)),
        }
    }

    fn parse_cell_boundary(&mut self) -> Option<(Inline, usize)> {
        (self.context.last() == Some(&Context::Table)).then_some((Inline::CellBoundary, 1))
    }
}

fn parse_entity(text: &str) -> Option<(Inline, usize)> {
    ENTITY
        .find(text)
        .map(|found| (Inline::HtmlInline(found.as_str().to_string()), found.end()))
}

/// Backtick code span; the opening run must be closed by a run of the same length
fn parse_code_span(text: &str) -> Option<(Inline, usize)> {
    let bytes = text.as_bytes();
    let fence = bytes.iter().take_while(|&&b| b == b'`').count();

    let mut j = fence;
    while j < bytes.len() {
        if bytes[j] != b'`' {
            j += 1;
            continue;
        }
        let close_start = j;
        while j < bytes.len() && bytes[j] == b'`' {
            j += 1;
        }
        if j - close_start == fence {
            let mut content = WHITESPACE_RUN.replace_all(&text[fence..close_start], " ").into_owned();
            // Strip one space of padding on each side, unless the span is all spaces
            if content.len() > 2
                && content.starts_with(' ')
                && content.ends_with(' ')
                && !content.trim().is_empty()
            {
                content = content[1..content.len() - 1].to_string();
            }
            return Some((Inline::Code(content), j));
        }
    }
    None
}

fn parse_superscript(text: &str) -> Option<(Inline, usize)> {
    let end = closing_delimiter(text, 1, "^")?;
    Some((Inline::Superscript(text[1..end].to_string()), end + 1))
}

/// Position of the first `delimiter` after at least one character of content starting
/// at `open`, as long as the content stays on one line
fn closing_delimiter(text: &str, open: usize, delimiter: &str) -> Option<usize> {
    let body = &text[open..];
    let first = body.chars().next().filter(|&c| c != '\n')?;
    let from = open + first.len_utf8();
    let close = from + text[from..].find(delimiter)?;
    (!text[from..close].contains('\n')).then_some(close)
}

/// Strong span opened by two markers at the start of `bytes`; returns where the
/// closing pair starts. Content units: an escaped marker, a non-marker byte, or a
/// run enclosed in single markers.
fn match_strong(bytes: &[u8], marker: u8) -> Option<usize> {
    let mut p = 2;
    let mut units = 0;
    loop {
        if units > 0
            && bytes.get(p) == Some(&marker)
            && bytes.get(p + 1) == Some(&marker)
            && bytes.get(p + 2) != Some(&marker)
        {
            return Some(p);
        }
        let &b = bytes.get(p)?;
        if b == b'\\' && bytes.get(p + 1) == Some(&marker) {
            p += 2;
        } else if b != marker {
            p += 1;
        } else {
            let run = bytes[p + 1..].iter().take_while(|&&c| c != marker).count();
            let close = p + 1 + run;
            if close >= bytes.len() {
                return None;
            }
            p = close + 1;
        }
        units += 1;
    }
}

/// Emphasis opened by a single marker; returns the position of the closing marker.
/// Content units: an escaped marker, a non-marker byte, or a nested strong run.
fn match_emphasis(text: &str, marker: u8) -> Option<usize> {
    let bytes = text.as_bytes();
    let mut p = 1;
    let mut units = 0;
    loop {
        if units > 0 && bytes.get(p) == Some(&marker) && closes_emphasis(text, p, marker) {
            return Some(p);
        }
        let &b = bytes.get(p)?;
        if b == b'\\' && bytes.get(p + 1) == Some(&marker) {
            p += 2;
        } else if b != marker {
            p += 1;
        } else if bytes.get(p + 1) == Some(&marker) {
            let inner = p + 2;
            let run = bytes[inner..].iter().take_while(|&&c| c != marker).count();
            let close = inner + run;
            // `**` needs at least one character between its markers, `__` does not
            if (marker == b'*' && run == 0) || bytes.get(close + 1) != Some(&marker) {
                return None;
            }
            p = close + 2;
        } else {
            return None;
        }
        units += 1;
    }
}

fn closes_emphasis(text: &str, p: usize, marker: u8) -> bool {
    let bytes = text.as_bytes();
    // A marker directly followed by another one never closes
    if bytes.get(p + 1) == Some(&marker) {
        return false;
    }
    if marker == b'_' {
        // no intraword underscores
        return !text[p + 1..]
            .chars()
            .next()
            .is_some_and(|c| c.is_alphanumeric() || c == '_');
    }
    true
}

/// End of a bare URL, excluding trailing punctuation and unbalanced parentheses
fn match_url(text: &str) -> Option<usize> {
    let scheme = URL_SCHEMES.iter().find(|scheme| text.starts_with(**scheme))?;
    let bytes = text.as_bytes();
    let mut p = scheme.len();
    loop {
        match bytes.get(p) {
            Some(b'(') => match balanced_parens(bytes, p) {
                Some(end) => p = end,
                None => break,
            },
            Some(&b) if !(b.is_ascii_whitespace() || matches!(b, b'<' | b'>' | b')')) => p += 1,
            _ => break,
        }
    }
    while p > scheme.len() && matches!(bytes[p - 1], b'.' | b',' | b':' | b';' | b'\'' | b'"' | b'!' | b'?') {
        p -= 1;
    }
    (p > scheme.len()).then_some(p)
}

/// End (exclusive) of a parenthesized group starting at `start`, without whitespace inside
pub(super) fn balanced_parens(bytes: &[u8], start: usize) -> Option<usize> {
    let mut depth = 0usize;
    for (offset, &b) in bytes[start..].iter().enumerate() {
        match b {
            b'(' => depth += 1,
            b')' => {
                depth -= 1;
                if depth == 0 {
                    return Some(start + offset + 1);
                }
            }
            b if b.is_ascii_whitespace() => return None,
            _ => {}
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dialect::{GFM, LEANPUB, MARKDOWN};

    #[test]
    fn test_marker_set_is_pruned_and_sorted() {
        let set = MarkerSet::prepare(&LEANPUB, "see ![img](x) and [^1]");
        let brackets: Vec<&str> = set.candidates(b'[').iter().map(|(m, _)| *m).collect();
        assert_eq!(brackets, vec!["[^", "["]);
        assert_eq!(set.candidates(b'!').len(), 1);
        assert!(set.candidates(b'*').is_empty());
        assert_eq!(set.next_position("plain [x"), Some(6));

        let set = MarkerSet::prepare(&MARKDOWN, "no markers here");
        assert_eq!(set.next_position("no markers here"), None);
    }

    #[test]
    fn test_marker_set_only_dialect_markers() {
        let set = MarkerSet::prepare(&MARKDOWN, "~~gone~~ http://x");
        assert!(set.candidates(b'~').is_empty());
        let set = MarkerSet::prepare(&GFM, "~~gone~~ http://x");
        assert_eq!(set.candidates(b'~').len(), 1);
        assert_eq!(set.candidates(b'h').len(), 1);
    }

    #[test]
    fn test_match_strong() {
        assert_eq!(match_strong(b"**b**", b'*'), Some(3));
        assert_eq!(match_strong(b"**a *b* c** d", b'*'), Some(9));
        assert_eq!(match_strong(b"**open", b'*'), None);
        assert_eq!(match_strong(b"****", b'*'), None);
        assert_eq!(match_strong(b"__a__", b'_'), Some(3));
        assert_eq!(match_strong(b"**foo***", b'*'), None);
        assert_eq!(match_strong(b"__a___", b'_'), None);
    }

    #[test]
    fn test_match_emphasis() {
        assert_eq!(match_emphasis("*a **b** c*", b'*'), Some(10));
        assert_eq!(match_emphasis("*a*", b'*'), Some(2));
        assert_eq!(match_emphasis("_a_b_", b'_'), None);
        assert_eq!(match_emphasis("_a_.", b'_'), Some(2));
        assert_eq!(match_emphasis("*open", b'*'), None);
        assert_eq!(match_emphasis("*a**", b'*'), None);
        assert_eq!(match_emphasis("*a **b***", b'*'), Some(8));
    }

    #[test]
    fn test_code_span() {
        assert_eq!(parse_code_span("`a`"), Some((Inline::Code("a".to_string()), 3)));
        assert_eq!(
            parse_code_span("`` a`b ``"),
            Some((Inline::Code("a`b".to_string()), 9))
        );
        assert_eq!(
            parse_code_span("`a\n  b`"),
            Some((Inline::Code("a b".to_string()), 7))
        );
        assert_eq!(parse_code_span("``a`"), None);
    }

    #[test]
    fn test_match_url() {
        assert_eq!(match_url("http://example.com."), Some(18));
        assert_eq!(match_url("https://en.wikipedia.org/wiki/Rust_(language)) x"), Some(45));
        assert_eq!(match_url("ftp://host/file, next"), Some(15));
        assert_eq!(match_url("http://"), None);
        assert_eq!(match_url("httpx"), None);
    }

    #[test]
    fn test_closing_delimiter() {
        assert_eq!(closing_delimiter("~~a~~", 2, "~~"), Some(3));
        assert_eq!(closing_delimiter("~~~~", 2, "~~"), None);
        assert_eq!(closing_delimiter("^a\nb^", 1, "^"), None);
        assert_eq!(closing_delimiter("^é^", 1, "^"), Some(3));
    }
}
