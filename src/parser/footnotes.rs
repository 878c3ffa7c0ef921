//! Footnote definitions (`[^name]: text`) and references (`[^name]`).

use std::sync::LazyLock;

use log::debug;
use regex::Regex;

use super::{Context, Parser, is_blank};
use crate::ast::{Block, Inline};

static FOOTNOTE_DEFINITION: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\[\^(.+?)\]:[ \t]*").expect("valid regex"));
static FOOTNOTE_LINK: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\[\^(.+?)\]").expect("valid regex"));

pub(super) fn is_footnote_definition(line: &str) -> bool {
    line.starts_with("[^") && FOOTNOTE_DEFINITION.is_match(line)
}

/// Indentation that continues a footnote across a blank line
fn continuation_indent(line: &str) -> Option<&'static str> {
    if line.starts_with('\t') {
        Some("\t")
    } else if line.starts_with("    ") {
        Some("    ")
    } else {
        None
    }
}

impl Parser<'_> {
    pub(super) fn consume_footnote_definition(&mut self, lines: &[&str], start: usize) -> (Option<Block>, usize) {
        let Some(caps) = FOOTNOTE_DEFINITION.captures(lines[start]) else {
            return self.consume_paragraph(lines, start);
        };
        let name = caps[1].to_string();
        let mut content = vec![lines[start][caps[0].len()..].trim().to_string()];

        let mut indent = None;
        let mut i = start + 1;
        while i < lines.len() {
            let line = lines[i];
            if is_footnote_definition(line) {
                break;
            }
            if is_blank(line) {
                match lines.get(i + 1).and_then(|next| continuation_indent(next)) {
                    Some(prefix) => {
                        indent = Some(prefix);
                        content.push(String::new());
                    }
                    None => break,
                }
            } else {
                let line = match indent {
                    Some(prefix) => line.strip_prefix(prefix).unwrap_or(line),
                    None => line.trim(),
                };
                content.push(line.to_string());
            }
            i += 1;
        }

        debug!("footnote `{}` with {} line(s)", name, content.len());
        let children = self.parse_nested(Context::Footnote, &content);
        (Some(Block::FootnoteDefinition { name, children }), i)
    }

    /// Record a footnote reference; it is numbered once the whole document is known
    pub(super) fn parse_footnote_link(&mut self, text: &str) -> Option<(Inline, usize)> {
        let caps = FOOTNOTE_LINK.captures(text)?;
        let name = caps[1].to_string();
        self.footnote_links.push(name.clone());
        let occurrence = self.footnote_links.len();
        Some((Inline::FootnoteReference { name, occurrence }, caps[0].len()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Options;
    use crate::dialect::Flavor;

    #[test]
    fn test_is_footnote_definition() {
        assert!(is_footnote_definition("[^1]: note"));
        assert!(is_footnote_definition("[^note]:"));
        assert!(!is_footnote_definition("[^1] no colon"));
        assert!(!is_footnote_definition(" [^1]: indented"));
    }

    #[test]
    fn test_indented_continuation() {
        let options = Options::new(Flavor::Leanpub);
        let mut parser = Parser::new(&options);
        let document = parser.parse("[^1]: First.\n\n    Second.\n\nAfter.");
        let Block::FootnoteDefinition { name, children } = &document.blocks[0] else {
            panic!("expected a footnote definition, got {:?}", document.blocks);
        };
        assert_eq!(name, "1");
        assert_eq!(children.len(), 2);
        assert_eq!(
            document.blocks[1],
            Block::Paragraph(vec![Inline::Text("After.".to_string())])
        );
    }

    #[test]
    fn test_references_are_numbered_by_occurrence() {
        let options = Options::new(Flavor::Leanpub);
        let mut parser = Parser::new(&options);
        let document = parser.parse("a[^x] b[^y] c[^x]");
        assert_eq!(document.footnote_links, vec!["x", "y", "x"]);
        let Block::Paragraph(children) = &document.blocks[0] else {
            panic!("expected a paragraph");
        };
        assert_eq!(
            children[3],
            Inline::FootnoteReference {
                name: "y".to_string(),
                occurrence: 2
            }
        );
    }
}
