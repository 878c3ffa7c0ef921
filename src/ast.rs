/// AST node types for flavored Markdown documents
use serde::{Deserialize, Serialize};

use crate::references::ReferenceTable;

/// A parsed document: block tree plus the per-parse tables the renderer resolves against
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Document {
    pub blocks: Vec<Block>,
    pub references: ReferenceTable,
    /// Footnote names in order of inline occurrence (occurrence `n` is at index `n - 1`)
    pub footnote_links: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Block {
    Paragraph(Vec<Inline>),
    /// Inline content rendered without a wrapping element (lead line of a list item)
    Plain(Vec<Inline>),
    Heading {
        level: u8,
        attributes: Option<Attributes>,
        children: Vec<Inline>,
    },
    CodeBlock {
        language: Option<String>,
        attributes: Option<Attributes>,
        literal: String,
    },
    ThematicBreak,
    BlockQuote {
        children: Vec<Block>,
    },
    Admonition {
        kind: AdmonitionKind,
        children: Vec<Block>,
    },
    List {
        ordered: bool,
        start: Option<u64>,
        items: Vec<ListItem>,
    },
    Table {
        alignments: Vec<Alignment>,
        head: TableRow,
        body: Vec<TableRow>,
    },
    HtmlBlock(String),
    FootnoteDefinition {
        name: String,
        children: Vec<Block>,
    },
    /// Input left unparsed because the nesting limit was reached
    Literal(String),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ListItem {
    /// Lazy items wrap every paragraph in `<p>`; others render their lead line inline
    pub lazy: bool,
    pub children: Vec<Block>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TableRow {
    pub cells: Vec<Vec<Inline>>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Inline {
    Text(String),
    Code(String),
    Emphasis(Vec<Inline>),
    Strong(Vec<Inline>),
    Strikeout(Vec<Inline>),
    Superscript(String),
    Link {
        target: LinkTarget,
        children: Vec<Inline>,
        attributes: Option<Attributes>,
        /// Source as written, emitted when a reference cannot be resolved
        source: String,
    },
    Image {
        target: LinkTarget,
        alt: String,
        attributes: Option<Attributes>,
        source: String,
    },
    /// Bare or angle-bracketed URL
    Autolink(String),
    Email(String),
    /// Raw tag, comment or entity passed through unchanged
    HtmlInline(String),
    LineBreak,
    FootnoteReference {
        name: String,
        occurrence: usize,
    },
    /// Separator between table cells, only produced inside a table row
    CellBoundary,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum LinkTarget {
    Inline {
        destination: String,
        title: Option<String>,
    },
    /// Normalized label looked up in the reference table at render time
    Reference(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Alignment {
    None,
    Left,
    Right,
    Center,
}

impl Alignment {
    pub fn as_attr(self) -> Option<&'static str> {
        match self {
            Alignment::None => None,
            Alignment::Left => Some("left"),
            Alignment::Right => Some("right"),
            Alignment::Center => Some("center"),
        }
    }
}

/// `{#id .class}` annotations of the Extra flavor
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Attributes {
    pub id: Option<String>,
    pub classes: Vec<String>,
}

impl Attributes {
    /// Parse the inside of a `{...}` block, e.g. `#intro .lead .wide`
    pub fn parse(annotation: &str) -> Option<Attributes> {
        let mut attributes = Attributes::default();
        for token in annotation.split_whitespace() {
            if let Some(id) = token.strip_prefix('#') {
                attributes.id = Some(id.to_string());
            } else if let Some(class) = token.strip_prefix('.') {
                attributes.classes.push(class.to_string());
            } else {
                return None;
            }
        }
        if attributes.id.is_none() && attributes.classes.is_empty() {
            return None;
        }
        Some(attributes)
    }
}

/// Leanpub `X> ` block types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AdmonitionKind {
    Aside,
    Warning,
    Tip,
    Error,
    Information,
    Question,
    Discussion,
    Exercise,
    Generic,
    CenteredParagraph,
}

impl AdmonitionKind {
    pub fn from_letter(letter: u8) -> Option<AdmonitionKind> {
        Some(match letter {
            b'A' => AdmonitionKind::Aside,
            b'W' => AdmonitionKind::Warning,
            b'T' => AdmonitionKind::Tip,
            b'E' => AdmonitionKind::Error,
            b'I' => AdmonitionKind::Information,
            b'Q' => AdmonitionKind::Question,
            b'D' => AdmonitionKind::Discussion,
            b'X' => AdmonitionKind::Exercise,
            b'G' => AdmonitionKind::Generic,
            b'C' => AdmonitionKind::CenteredParagraph,
            _ => return None,
        })
    }

    pub fn name(self) -> &'static str {
        match self {
            AdmonitionKind::Aside => "aside",
            AdmonitionKind::Warning => "warning",
            AdmonitionKind::Tip => "tip",
            AdmonitionKind::Error => "error",
            AdmonitionKind::Information => "information",
            AdmonitionKind::Question => "question",
            AdmonitionKind::Discussion => "discussion",
            AdmonitionKind::Exercise => "exercise",
            AdmonitionKind::Generic => "generic",
            AdmonitionKind::CenteredParagraph => "centeredparagraph",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_attributes_parse() {
        let attributes = Attributes::parse("#intro .lead .wide").unwrap();
        assert_eq!(attributes.id.as_deref(), Some("intro"));
        assert_eq!(attributes.classes, vec!["lead", "wide"]);
        assert_eq!(Attributes::parse("lead"), None);
        assert_eq!(Attributes::parse("  "), None);
    }

    #[test]
    fn test_admonition_letters() {
        assert_eq!(AdmonitionKind::from_letter(b'W'), Some(AdmonitionKind::Warning));
        assert_eq!(AdmonitionKind::from_letter(b'Z'), None);
        assert_eq!(AdmonitionKind::CenteredParagraph.name(), "centeredparagraph");
    }
}
