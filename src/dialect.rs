//! Dialect composition: which block recognizers, inline markers and escapes each flavor uses.
//!
//! A dialect is plain static data. Block kinds are listed in priority order and the
//! first recognizer that claims a line decides the block; lines nobody claims become
//! paragraphs.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::Error;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Flavor {
    #[default]
    Markdown,
    #[serde(alias = "github")]
    Gfm,
    Extra,
    Leanpub,
}

impl Flavor {
    pub fn dialect(self) -> &'static Dialect {
        match self {
            Flavor::Markdown => &MARKDOWN,
            Flavor::Gfm => &GFM,
            Flavor::Extra => &EXTRA,
            Flavor::Leanpub => &LEANPUB,
        }
    }
}

impl FromStr for Flavor {
    type Err = Error;

    fn from_str(name: &str) -> Result<Self, Self::Err> {
        match name.to_ascii_lowercase().as_str() {
            "markdown" | "base" => Ok(Flavor::Markdown),
            "gfm" | "github" => Ok(Flavor::Gfm),
            "extra" => Ok(Flavor::Extra),
            "leanpub" => Ok(Flavor::Leanpub),
            _ => Err(Error::UnknownFlavor(name.to_string())),
        }
    }
}

impl fmt::Display for Flavor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Flavor::Markdown => "markdown",
            Flavor::Gfm => "gfm",
            Flavor::Extra => "extra",
            Flavor::Leanpub => "leanpub",
        })
    }
}

/// Block constructs a dialect can recognize
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BlockKind {
    Rule,
    UnorderedList,
    OrderedList,
    Code,
    FencedCode,
    Table,
    Headline,
    Html,
    Quote,
    Reference,
    FootnoteDefinition,
    Admonition,
    Paragraph,
}

/// Inline handlers a marker can dispatch to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MarkerKind {
    Escape,
    Entity,
    Angle,
    Code,
    Emphasis,
    Image,
    Link,
    Url,
    Strikeout,
    CellBoundary,
    FootnoteLink,
    Superscript,
}

/// Constructs that end a running paragraph without a blank line
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Interrupts {
    pub headline: bool,
    pub code: bool,
    pub quote: bool,
    pub fenced_code: bool,
    pub rule: bool,
    /// List markers interrupt anywhere, not only inside another list item
    pub lists: bool,
}

#[derive(Debug)]
pub struct Dialect {
    pub blocks: &'static [BlockKind],
    pub markers: &'static [(&'static str, MarkerKind)],
    pub escapes: &'static [u8],
    pub interrupts: Interrupts,
    /// `{#id .class}` on headings, fenced code, links and images
    pub special_attributes: bool,
    /// Closing fence must repeat the opening fence exactly
    pub strict_fences: bool,
    /// Honors the `enable-newlines` option
    pub hard_newlines: bool,
}

impl Dialect {
    pub fn is_escapable(&self, byte: u8) -> bool {
        self.escapes.contains(&byte)
    }

    pub fn has_block(&self, kind: BlockKind) -> bool {
        self.blocks.contains(&kind)
    }
}

const BASE_MARKERS: [(&str, MarkerKind); 8] = [
    ("\\", MarkerKind::Escape),
    ("&", MarkerKind::Entity),
    ("<", MarkerKind::Angle),
    ("`", MarkerKind::Code),
    ("*", MarkerKind::Emphasis),
    ("_", MarkerKind::Emphasis),
    ("![", MarkerKind::Image),
    ("[", MarkerKind::Link),
];

const BASE_ESCAPES: &[u8] = b"\\`*_{}[]()#+-.!";

pub static MARKDOWN: Dialect = Dialect {
    blocks: &[
        BlockKind::Rule,
        BlockKind::UnorderedList,
        BlockKind::Code,
        BlockKind::Headline,
        BlockKind::Html,
        BlockKind::OrderedList,
        BlockKind::Quote,
        BlockKind::Reference,
    ],
    markers: &BASE_MARKERS,
    escapes: BASE_ESCAPES,
    interrupts: Interrupts {
        headline: true,
        code: false,
        quote: false,
        fenced_code: false,
        rule: false,
        lists: false,
    },
    special_attributes: false,
    strict_fences: false,
    hard_newlines: false,
};

pub static GFM: Dialect = Dialect {
    blocks: &[
        BlockKind::Rule,
        BlockKind::Code,
        BlockKind::FencedCode,
        BlockKind::Table,
        BlockKind::UnorderedList,
        BlockKind::OrderedList,
        BlockKind::Headline,
        BlockKind::Html,
        BlockKind::Quote,
        BlockKind::Reference,
    ],
    markers: &[
        ("\\", MarkerKind::Escape),
        ("&", MarkerKind::Entity),
        ("<", MarkerKind::Angle),
        ("`", MarkerKind::Code),
        ("*", MarkerKind::Emphasis),
        ("_", MarkerKind::Emphasis),
        ("![", MarkerKind::Image),
        ("[", MarkerKind::Link),
        ("~~", MarkerKind::Strikeout),
        ("http", MarkerKind::Url),
        ("ftp", MarkerKind::Url),
        ("|", MarkerKind::CellBoundary),
    ],
    escapes: b"\\`*_{}[]()#+-.!<>:|~",
    interrupts: Interrupts {
        headline: true,
        code: true,
        quote: true,
        fenced_code: true,
        rule: true,
        lists: true,
    },
    special_attributes: false,
    strict_fences: false,
    hard_newlines: true,
};

pub static EXTRA: Dialect = Dialect {
    blocks: &[
        BlockKind::Rule,
        BlockKind::Code,
        BlockKind::FencedCode,
        BlockKind::Table,
        BlockKind::UnorderedList,
        BlockKind::OrderedList,
        BlockKind::Headline,
        BlockKind::Html,
        BlockKind::Quote,
        BlockKind::Reference,
    ],
    markers: &[
        ("\\", MarkerKind::Escape),
        ("&", MarkerKind::Entity),
        ("<", MarkerKind::Angle),
        ("`", MarkerKind::Code),
        ("*", MarkerKind::Emphasis),
        ("_", MarkerKind::Emphasis),
        ("![", MarkerKind::Image),
        ("[", MarkerKind::Link),
        ("|", MarkerKind::CellBoundary),
    ],
    escapes: b"\\`*_{}[]()#+-.!<>:|",
    interrupts: Interrupts {
        headline: true,
        code: true,
        quote: false,
        fenced_code: false,
        rule: false,
        lists: false,
    },
    special_attributes: true,
    strict_fences: true,
    hard_newlines: false,
};

pub static LEANPUB: Dialect = Dialect {
    blocks: &[
        BlockKind::Rule,
        BlockKind::Code,
        BlockKind::FencedCode,
        BlockKind::Table,
        BlockKind::Admonition,
        BlockKind::UnorderedList,
        BlockKind::OrderedList,
        BlockKind::Headline,
        BlockKind::Html,
        BlockKind::Quote,
        BlockKind::FootnoteDefinition,
        BlockKind::Reference,
    ],
    markers: &[
        ("\\", MarkerKind::Escape),
        ("&", MarkerKind::Entity),
        ("<", MarkerKind::Angle),
        ("`", MarkerKind::Code),
        ("*", MarkerKind::Emphasis),
        ("_", MarkerKind::Emphasis),
        ("![", MarkerKind::Image),
        ("[^", MarkerKind::FootnoteLink),
        ("[", MarkerKind::Link),
        ("~~", MarkerKind::Strikeout),
        ("http", MarkerKind::Url),
        ("ftp", MarkerKind::Url),
        ("|", MarkerKind::CellBoundary),
        ("^", MarkerKind::Superscript),
    ],
    escapes: b"\\`*_{}[]()#+-.!<>:|~^",
    interrupts: Interrupts {
        headline: true,
        code: true,
        quote: true,
        fenced_code: true,
        rule: true,
        lists: true,
    },
    special_attributes: false,
    strict_fences: false,
    hard_newlines: true,
};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_flavor_names() {
        assert_eq!("GitHub".parse::<Flavor>().unwrap(), Flavor::Gfm);
        assert_eq!("leanpub".parse::<Flavor>().unwrap(), Flavor::Leanpub);
        assert!(matches!("rst".parse::<Flavor>(), Err(Error::UnknownFlavor(name)) if name == "rst"));
        assert_eq!(Flavor::Extra.to_string(), "extra");
    }

    #[test]
    fn test_tables_precede_lists() {
        for dialect in [&GFM, &EXTRA, &LEANPUB] {
            let position = |kind| dialect.blocks.iter().position(|k| *k == kind).unwrap();
            assert!(position(BlockKind::Table) < position(BlockKind::UnorderedList));
            assert!(position(BlockKind::Table) < position(BlockKind::Headline));
        }
        assert!(!MARKDOWN.has_block(BlockKind::Table));
    }

    #[test]
    fn test_escape_sets() {
        assert!(MARKDOWN.is_escapable(b'*'));
        assert!(!MARKDOWN.is_escapable(b'|'));
        assert!(GFM.is_escapable(b'|'));
        assert!(LEANPUB.is_escapable(b'^'));
    }
}
