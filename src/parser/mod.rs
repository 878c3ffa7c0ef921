//! Block and inline parsing.
//!
//! A [`Parser`] is a parse session: it owns the reference table, the nesting depth,
//! the context stack and the footnote occurrences of the document being parsed.
//! All of it is reset by every call to [`Parser::parse`] or [`Parser::parse_paragraph`].

mod admonitions;
mod blocks;
mod footnotes;
mod inline;
mod links;
mod lists;
mod tables;

use std::mem;

use log::{debug, warn};

use crate::ast::{Block, Document};
use crate::config::Options;
use crate::dialect::{BlockKind, Dialect};
use crate::references::ReferenceTable;

use inline::MarkerSet;

/// Construct currently being parsed; inline handlers consult the innermost entries
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Context {
    Quote,
    ListItem,
    Admonition,
    Footnote,
    Table,
    Link,
    Emphasis,
    Strong,
    Strikeout,
}

pub struct Parser<'a> {
    options: &'a Options,
    dialect: &'static Dialect,
    markers: MarkerSet,
    references: ReferenceTable,
    depth: usize,
    context: Vec<Context>,
    footnote_links: Vec<String>,
}

impl<'a> Parser<'a> {
    pub fn new(options: &'a Options) -> Self {
        Parser {
            options,
            dialect: options.dialect(),
            markers: MarkerSet::new(),
            references: ReferenceTable::new(),
            depth: 0,
            context: Vec::new(),
            footnote_links: Vec::new(),
        }
    }

    /// Parse a complete document into blocks
    pub fn parse(&mut self, input: &str) -> Document {
        let text = normalize_line_endings(input);
        self.prepare(&text);
        if text.trim().is_empty() {
            return self.finish(Vec::new());
        }

        let lines: Vec<&str> = text.split('\n').collect();
        let blocks = self.parse_blocks(&lines);
        self.finish(blocks)
    }

    /// Parse text as inline content only, without block structure
    pub fn parse_paragraph(&mut self, input: &str) -> Document {
        let text = normalize_line_endings(input);
        self.prepare(&text);
        if text.trim().is_empty() {
            return self.finish(Vec::new());
        }

        let children = self.parse_inline(&text);
        self.finish(vec![Block::Plain(children)])
    }

    /// Reset per-document state and select the markers present in `text`
    fn prepare(&mut self, text: &str) {
        self.markers = MarkerSet::prepare(self.dialect, text);
        self.references.clear();
        self.depth = 0;
        self.context.clear();
        self.footnote_links.clear();
    }

    fn finish(&mut self, blocks: Vec<Block>) -> Document {
        Document {
            blocks,
            references: mem::take(&mut self.references),
            footnote_links: mem::take(&mut self.footnote_links),
        }
    }

    /// Split lines into blocks. Past the nesting limit the lines are returned as literal text.
    pub(crate) fn parse_blocks(&mut self, lines: &[&str]) -> Vec<Block> {
        if self.depth >= self.options.maximum_nesting_level {
            warn!(
                "maximum nesting level {} reached, leaving {} line(s) unparsed",
                self.options.maximum_nesting_level,
                lines.len()
            );
            return vec![Block::Literal(lines.join("\n"))];
        }
        self.depth += 1;

        let mut blocks = Vec::new();
        let mut i = 0;
        while i < lines.len() {
            if is_blank(lines[i]) {
                i += 1;
                continue;
            }
            let kind = self.identify(lines, i);
            debug!("line {}: {:?}", i, kind);
            let (block, next) = self.consume(kind, lines, i);
            if let Some(block) = block {
                blocks.push(block);
            }
            // Every consumer takes at least the line it was handed
            i = next.max(i + 1);
        }

        self.depth -= 1;
        blocks
    }

    /// Block-parse owned lines with `context` pushed for the duration
    pub(crate) fn parse_nested(&mut self, context: Context, lines: &[String]) -> Vec<Block> {
        let lines: Vec<&str> = lines.iter().map(String::as_str).collect();
        self.context.push(context);
        let blocks = self.parse_blocks(&lines);
        self.context.pop();
        blocks
    }

    /// First block kind of the dialect that claims line `i`
    pub(crate) fn identify(&self, lines: &[&str], i: usize) -> BlockKind {
        self.dialect
            .blocks
            .iter()
            .copied()
            .find(|&kind| self.claims(kind, lines, i))
            .unwrap_or(BlockKind::Paragraph)
    }

    fn claims(&self, kind: BlockKind, lines: &[&str], i: usize) -> bool {
        let line = lines[i];
        match kind {
            BlockKind::Rule => blocks::is_rule(line),
            BlockKind::UnorderedList => lists::is_unordered_item(line),
            BlockKind::OrderedList => lists::is_ordered_item(line),
            BlockKind::Code => blocks::is_indented_code(line),
            BlockKind::FencedCode => blocks::fence_start(line).is_some(),
            BlockKind::Table => tables::is_table_start(lines, i),
            BlockKind::Headline => blocks::is_headline(lines, i),
            BlockKind::Html => blocks::is_html_start(line),
            BlockKind::Quote => blocks::is_quote(line),
            BlockKind::Reference => blocks::is_reference(line),
            BlockKind::FootnoteDefinition => footnotes::is_footnote_definition(line),
            BlockKind::Admonition => admonitions::admonition_kind(line).is_some(),
            BlockKind::Paragraph => true,
        }
    }

    fn consume(&mut self, kind: BlockKind, lines: &[&str], i: usize) -> (Option<Block>, usize) {
        match kind {
            BlockKind::Rule => (Some(Block::ThematicBreak), i + 1),
            BlockKind::UnorderedList => self.consume_list(lines, i, false),
            BlockKind::OrderedList => self.consume_list(lines, i, true),
            BlockKind::Code => self.consume_code(lines, i),
            BlockKind::FencedCode => self.consume_fenced_code(lines, i),
            BlockKind::Table => self.consume_table(lines, i),
            BlockKind::Headline => self.consume_headline(lines, i),
            BlockKind::Html => self.consume_html(lines, i),
            BlockKind::Quote => self.consume_quote(lines, i),
            BlockKind::Reference => self.consume_reference(lines, i),
            BlockKind::FootnoteDefinition => self.consume_footnote_definition(lines, i),
            BlockKind::Admonition => self.consume_admonition(lines, i),
            BlockKind::Paragraph => self.consume_paragraph(lines, i),
        }
    }

    pub(crate) fn in_context(&self, context: Context) -> bool {
        self.context.contains(&context)
    }
}

pub(crate) fn is_blank(line: &str) -> bool {
    line.trim().is_empty()
}

fn normalize_line_endings(input: &str) -> String {
    input
        .replace("\r\n", "\n")
        .replace("\n\r", "\n")
        .replace('\r', "\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::Inline;
    use crate::dialect::Flavor;

    fn init_logger() {
        let _ = env_logger::builder().is_test(true).try_init();
    }

    #[test]
    fn test_line_endings_are_normalized() {
        assert_eq!(normalize_line_endings("a\r\nb\rc\n\rd"), "a\nb\nc\nd");
    }

    #[test]
    fn test_parse_resets_state_between_calls() {
        init_logger();
        let options = Options::new(Flavor::Markdown);
        let mut parser = Parser::new(&options);
        let first = parser.parse("[a]: /one\n");
        assert_eq!(first.references.len(), 1);
        let second = parser.parse("text\n");
        assert!(second.references.is_empty());
        assert_eq!(
            second.blocks,
            vec![Block::Paragraph(vec![Inline::Text("text".to_string())])]
        );
    }

    #[test]
    fn test_depth_limit_returns_literal() {
        init_logger();
        let options = Options {
            maximum_nesting_level: 3,
            ..Options::default()
        };
        let mut parser = Parser::new(&options);
        let document = parser.parse("> > > > deep");
        let mut block = &document.blocks[0];
        let mut levels = 0;
        while let Block::BlockQuote { children, .. } = block {
            levels += 1;
            block = &children[0];
        }
        assert_eq!(levels, 3);
        assert_eq!(block, &Block::Literal("> deep".to_string()));
    }

    #[test]
    fn test_identify_uses_dialect_priority() {
        let options = Options::new(Flavor::Gfm);
        let parser = Parser::new(&options);
        let lines = ["a | b", "--|--"];
        assert_eq!(parser.identify(&lines, 0), BlockKind::Table);

        let options = Options::new(Flavor::Markdown);
        let parser = Parser::new(&options);
        assert_eq!(parser.identify(&lines, 0), BlockKind::Paragraph);
    }
}
