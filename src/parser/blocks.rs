//! Recognizers and consumers for the core block constructs.

use std::sync::LazyLock;

use log::debug;
use regex::Regex;

use super::{Context, Parser, is_blank};
use crate::ast::{Attributes, Block};
use crate::references::Reference;

/// Elements that live inside prose; a line opening with one of these is not an HTML block
const INLINE_HTML_ELEMENTS: &[&str] = &[
    "a", "abbr", "acronym", "b", "basefont", "bdo", "big", "br", "button", "blink", "cite",
    "code", "del", "dfn", "em", "font", "i", "img", "ins", "input", "iframe", "kbd", "label",
    "map", "object", "output", "q", "s", "samp", "script", "select", "small", "span", "strike",
    "strong", "sub", "sup", "textarea", "time", "tt", "u", "var",
];

const SELF_CLOSING_HTML_ELEMENTS: &[&str] = &["br", "hr", "img", "input", "nobr"];

static SETEXT_UNDERLINE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(?:-+|=+)\s*$").expect("valid regex"));

static REFERENCE_DEFINITION: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"^ {0,3}\[([^\[].*?)\]:\s*(\S+?)(?:\s+["'(](.+?)["')])?\s*$"#)
        .expect("valid regex")
});

static REFERENCE_TITLE_LINE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"^\s+["'(](.+?)["')]\s*$"#).expect("valid regex"));

static TRAILING_ATTRIBUTES: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\s*\{((?:[#.][A-Za-z0-9_-]+\s*)+)\}\s*$").expect("valid regex")
});

/// Text so far ends inside an unclosed tag
static OPEN_INLINE_TAG: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)<\w+[^>]+$").expect("valid regex"));

/// Number of leading spaces when there are at most three, None for deeper indentation
pub(super) fn shallow_indent(line: &str) -> Option<usize> {
    let indent = line.bytes().take_while(|&b| b == b' ').count();
    (indent <= 3).then_some(indent)
}

/// A line of three or more `-`, `*` or `_`, optionally separated by whitespace
pub(super) fn is_rule(line: &str) -> bool {
    let Some(indent) = shallow_indent(line) else {
        return false;
    };
    let marks: Vec<char> = line[indent..].chars().filter(|c| !c.is_whitespace()).collect();
    if marks.len() < 3 {
        return false;
    }
    matches!(marks[0], '-' | '*' | '_') && marks.iter().all(|&c| c == marks[0])
}

pub(super) fn is_indented_code(line: &str) -> bool {
    line.starts_with('\t') || line.starts_with("    ")
}

fn strip_code_indent(line: &str) -> &str {
    line.strip_prefix('\t')
        .or_else(|| line.strip_prefix("    "))
        .unwrap_or(line)
}

/// ATX headline on this line, or a setext underline on the next one
pub(super) fn is_headline(lines: &[&str], i: usize) -> bool {
    let line = lines[i];
    if let Some(rest) = line.strip_prefix('#') {
        // `#5` reads as an issue number, not a heading
        return !rest.starts_with(|c: char| c.is_ascii_digit());
    }
    match lines.get(i + 1) {
        Some(next) if next.starts_with(['=', '-']) => SETEXT_UNDERLINE.is_match(next),
        _ => false,
    }
}

/// Remove an optional closing sequence of `#`s (it must be preceded by whitespace)
fn strip_closing_hashes(text: &str) -> &str {
    let without = text.trim_end_matches('#');
    if without.is_empty() {
        return "";
    }
    if without.len() < text.len() && without.ends_with([' ', '\t']) {
        without.trim_end()
    } else {
        text
    }
}

pub(super) fn is_quote(line: &str) -> bool {
    shallow_indent(line).is_some_and(|indent| line[indent..].starts_with('>'))
}

fn strip_quote_marker(line: &str) -> Option<&str> {
    let indent = shallow_indent(line)?;
    let rest = line[indent..].strip_prefix('>')?;
    Some(rest.strip_prefix(' ').unwrap_or(rest))
}

/// Tag name of a line opening an HTML element, e.g. `div` for `<div class="x">`
fn html_block_tag(line: &str) -> Option<&str> {
    let rest = line.strip_prefix('<')?;
    let end = rest.find([' ', '>'])?;
    let tag = rest[..end].trim_end_matches('/');
    if tag.is_empty() || !tag.bytes().all(|b| b.is_ascii_alphanumeric()) {
        return None;
    }
    Some(tag)
}

pub(super) fn is_html_start(line: &str) -> bool {
    if !line.starts_with('<') || line[1..].starts_with(' ') {
        return false;
    }
    if line.starts_with("<!--") {
        return true;
    }
    match html_block_tag(line) {
        Some(tag) => !INLINE_HTML_ELEMENTS.contains(&tag.to_ascii_lowercase().as_str()),
        None => false,
    }
}

pub(super) fn is_reference(line: &str) -> bool {
    line.starts_with([' ', '[']) && REFERENCE_DEFINITION.is_match(line)
}

/// Opening fence run and the info string after it
pub(super) fn fence_start(line: &str) -> Option<(&str, &str)> {
    let indent = shallow_indent(line)?;
    let rest = &line[indent..];
    let fence_char = match rest.bytes().next() {
        Some(c @ (b'`' | b'~')) => c,
        _ => return None,
    };
    let len = rest.bytes().take_while(|&b| b == fence_char).count();
    if len < 3 {
        return None;
    }
    let info = rest[len..].trim();
    // A backtick fence cannot carry backticks in its info string
    if fence_char == b'`' && info.contains('`') {
        return None;
    }
    Some((&rest[..len], info))
}

fn is_closing_fence(line: &str, fence: &str, strict: bool) -> bool {
    let candidate = line.trim();
    if strict {
        return candidate == fence;
    }
    let fence_char = fence.as_bytes()[0];
    candidate.len() >= fence.len() && candidate.bytes().all(|b| b == fence_char)
}

/// Join paragraph lines, dropping indentation and trailing whitespace
pub(super) fn paragraph_text(lines: &[&str]) -> String {
    lines
        .iter()
        .map(|line| line.trim_start())
        .collect::<Vec<_>>()
        .join("\n")
        .trim_end()
        .to_string()
}

impl Parser<'_> {
    pub(super) fn consume_paragraph(&mut self, lines: &[&str], start: usize) -> (Option<Block>, usize) {
        let mut end = start + 1;
        while end < lines.len()
            && !is_blank(lines[end])
            && !self.interrupts_paragraph(&lines[start..end], lines, end)
        {
            end += 1;
        }

        let children = self.parse_inline(&paragraph_text(&lines[start..end]));
        (Some(Block::Paragraph(children)), end)
    }

    /// Whether line `i` starts a new block instead of continuing the paragraph in `content`
    fn interrupts_paragraph(&self, content: &[&str], lines: &[&str], i: usize) -> bool {
        let rules = self.dialect.interrupts;
        let line = lines[i];

        if rules.headline && is_headline(lines, i) {
            return true;
        }
        if rules.code && is_indented_code(line) {
            // Continuation of a tag spread over several lines
            return !OPEN_INLINE_TAG.is_match(&content.join("\n"));
        }
        let in_list = self.context.last() == Some(&Context::ListItem);
        if (rules.lists || in_list)
            && (super::lists::is_unordered_item(line) || super::lists::is_ordered_item(line))
        {
            return true;
        }
        (rules.quote && is_quote(line))
            || (rules.fenced_code && fence_start(line).is_some())
            || (rules.rule && is_rule(line))
    }

    pub(super) fn consume_headline(&mut self, lines: &[&str], start: usize) -> (Option<Block>, usize) {
        let line = lines[start];
        let (level, raw, next) = if line.starts_with('#') {
            let hashes = line.bytes().take_while(|&b| b == b'#').count();
            let text = strip_closing_hashes(line[hashes..].trim());
            (hashes.min(6) as u8, text, start + 1)
        } else {
            let level = if lines[start + 1].starts_with('=') { 1 } else { 2 };
            (level, line.trim(), start + 2)
        };

        let (text, attributes) = self.split_trailing_attributes(raw);
        let children = self.parse_inline(text);
        debug!("heading level {}", level);
        (
            Some(Block::Heading {
                level,
                attributes,
                children,
            }),
            next,
        )
    }

    /// Separate a trailing `{#id .class}` annotation when the dialect supports it
    fn split_trailing_attributes<'t>(&self, text: &'t str) -> (&'t str, Option<Attributes>) {
        if !self.dialect.special_attributes {
            return (text, None);
        }
        match TRAILING_ATTRIBUTES.captures(text) {
            Some(caps) => {
                let start = caps.get(0).map_or(text.len(), |m| m.start());
                (&text[..start], Attributes::parse(&caps[1]))
            }
            None => (text, None),
        }
    }

    pub(super) fn consume_code(&mut self, lines: &[&str], start: usize) -> (Option<Block>, usize) {
        let mut content: Vec<&str> = Vec::new();
        let mut i = start;
        while i < lines.len() {
            let line = lines[i];
            if is_indented_code(line) {
                content.push(strip_code_indent(line));
            } else if is_blank(line) && lines.get(i + 1).is_some_and(|next| is_indented_code(next)) {
                content.push("");
            } else {
                break;
            }
            i += 1;
        }
        if content.len() > 1 && content.last().is_some_and(|line| line.trim().is_empty()) {
            content.pop();
        }

        let mut literal = content.join("\n");
        literal.push('\n');
        (
            Some(Block::CodeBlock {
                language: None,
                attributes: None,
                literal,
            }),
            i,
        )
    }

    pub(super) fn consume_fenced_code(&mut self, lines: &[&str], start: usize) -> (Option<Block>, usize) {
        let Some((fence, info)) = fence_start(lines[start]) else {
            return self.consume_paragraph(lines, start);
        };

        let mut i = start + 1;
        while i < lines.len() && !is_closing_fence(lines[i], fence, self.dialect.strict_fences) {
            i += 1;
        }
        let content = &lines[start + 1..i];
        // An unclosed fence runs to the end of the input
        let next = if i < lines.len() { i + 1 } else { i };

        let mut literal = content.join("\n");
        if !content.is_empty() {
            literal.push('\n');
        }
        let (language, attributes) = self.fence_info(info);
        (
            Some(Block::CodeBlock {
                language,
                attributes,
                literal,
            }),
            next,
        )
    }

    /// Language (first word of the info string) or, in the Extra flavor, `{...}` attributes
    fn fence_info(&self, info: &str) -> (Option<String>, Option<Attributes>) {
        if self.dialect.special_attributes {
            if let Some(inner) = info.strip_prefix('{').and_then(|rest| rest.strip_suffix('}')) {
                return (None, Attributes::parse(inner));
            }
            let language = info.split_whitespace().next().map(|word| word.trim_start_matches('.'));
            return (language.filter(|l| !l.is_empty()).map(str::to_string), None);
        }
        (info.split_whitespace().next().map(str::to_string), None)
    }

    pub(super) fn consume_quote(&mut self, lines: &[&str], start: usize) -> (Option<Block>, usize) {
        let mut content = Vec::new();
        let mut i = start;
        while i < lines.len() && !is_blank(lines[i]) {
            // marker-less lines are lazy continuations
            let line = strip_quote_marker(lines[i]).unwrap_or(lines[i]);
            content.push(line.to_string());
            i += 1;
        }

        let children = self.parse_nested(Context::Quote, &content);
        (Some(Block::BlockQuote { children }), i)
    }

    pub(super) fn consume_html(&mut self, lines: &[&str], start: usize) -> (Option<Block>, usize) {
        let mut i = start;
        if lines[start].starts_with("<!--") {
            while i < lines.len() {
                let closed = lines[i].contains("-->");
                i += 1;
                if closed {
                    break;
                }
            }
        } else {
            let tag = html_block_tag(lines[start]).unwrap_or_default();
            let open = format!("<{}", tag);
            let close = format!("</{}>", tag);
            let mut level: isize = 0;
            // Only the opening element may close itself; `/>` on later lines belongs to children
            let self_closing = SELF_CLOSING_HTML_ELEMENTS.contains(&tag.to_ascii_lowercase().as_str())
                || lines[start]
                    .find('>')
                    .is_some_and(|end| lines[start][..end].ends_with('/'));
            if self_closing {
                level -= 1;
            }
            while i < lines.len() {
                let line = lines[i];
                level += line.matches(open.as_str()).count() as isize;
                level -= line.matches(close.as_str()).count() as isize;
                i += 1;
                if level <= 0 {
                    break;
                }
            }
        }
        (Some(Block::HtmlBlock(lines[start..i].join("\n"))), i)
    }

    /// Record a link reference definition; nothing is emitted for it
    pub(super) fn consume_reference(&mut self, lines: &[&str], start: usize) -> (Option<Block>, usize) {
        let Some(caps) = REFERENCE_DEFINITION.captures(lines[start]) else {
            return self.consume_paragraph(lines, start);
        };
        let label = &caps[1];
        let raw_url = &caps[2];
        let raw_url = raw_url
            .strip_prefix('<')
            .and_then(|url| url.strip_suffix('>'))
            .unwrap_or(raw_url);
        let mut title = caps.get(3).map(|m| m.as_str().to_string());

        let mut next = start + 1;
        if title.is_none()
            && let Some(title_caps) = lines.get(next).and_then(|line| REFERENCE_TITLE_LINE.captures(line))
        {
            title = Some(title_caps[1].to_string());
            next += 1;
        }

        let reference = Reference {
            url: self.unescape(raw_url),
            title,
        };
        if !self.references.insert(label, reference) {
            debug!("duplicate reference definition `{}` ignored", label);
        }
        (None, next)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_rule() {
        assert!(is_rule("***"));
        assert!(is_rule(" - - -"));
        assert!(is_rule("_____"));
        assert!(!is_rule("--"));
        assert!(!is_rule("-*-"));
        assert!(!is_rule("    ---"));
    }

    #[test]
    fn test_is_headline() {
        assert!(is_headline(&["# Title"], 0));
        assert!(!is_headline(&["#5 is an issue"], 0));
        assert!(is_headline(&["Title", "====="], 0));
        assert!(is_headline(&["Title", "--- "], 0));
        assert!(!is_headline(&["Title", "-=-"], 0));
    }

    #[test]
    fn test_strip_closing_hashes() {
        assert_eq!(strip_closing_hashes("Title ##"), "Title");
        assert_eq!(strip_closing_hashes("C#"), "C#");
        assert_eq!(strip_closing_hashes("###"), "");
    }

    #[test]
    fn test_html_block_start() {
        assert!(is_html_start("<div class=\"x\">"));
        assert!(is_html_start("<table>"));
        assert!(is_html_start("<!-- note -->"));
        assert!(!is_html_start("<span>inline</span>"));
        assert!(!is_html_start("< div>"));
        assert!(!is_html_start("<div"));
        assert!(!is_html_start("</div>"));
    }

    #[test]
    fn test_fence_start() {
        assert_eq!(fence_start("```rust"), Some(("```", "rust")));
        assert_eq!(fence_start("~~~~ {.php}"), Some(("~~~~", "{.php}")));
        assert_eq!(fence_start("``"), None);
        assert_eq!(fence_start("``` a`b"), None);
        assert!(is_closing_fence("`````", "```", false));
        assert!(!is_closing_fence("`````", "```", true));
        assert!(!is_closing_fence("~~~", "```", false));
    }

    #[test]
    fn test_is_reference() {
        assert!(is_reference("[foo]: /url \"Title\""));
        assert!(is_reference("   [foo]: <http://example.com>"));
        assert!(!is_reference("[foo]: /my url"));
        assert!(!is_reference("[[foo]]: /url"));
    }
}
