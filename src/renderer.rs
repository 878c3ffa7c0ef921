/// HTML renderer for flavored Markdown documents
use std::collections::HashMap;

use crate::ast::{Alignment, Attributes, Block, Document, Inline, LinkTarget, ListItem, TableRow};
use crate::config::Options;
use crate::escape::{escape_html, url_display_text};
use crate::references::ReferenceTable;

pub struct HtmlRenderer<'a> {
    options: &'a Options,
}

impl<'a> HtmlRenderer<'a> {
    pub fn new(options: &'a Options) -> Self {
        HtmlRenderer { options }
    }

    /// Render a parsed document. References and footnotes resolve against the
    /// tables collected while parsing it.
    pub fn render(&self, document: &Document) -> String {
        let render = Render {
            options: self.options,
            references: &document.references,
            footnotes: FootnoteTable::build(document),
        };
        let mut html: String = document.blocks.iter().map(|block| render.block(block)).collect();
        html.push_str(&render.footnote_section());
        html
    }
}

/// A footnote that is both defined and referenced
struct Note<'d> {
    children: &'d [Block],
    /// Link occurrences pointing at this note, in document order
    occurrences: Vec<usize>,
}

/// Footnotes numbered by their first reference
#[derive(Default)]
struct FootnoteTable<'d> {
    notes: Vec<Note<'d>>,
    by_name: HashMap<&'d str, usize>,
}

impl<'d> FootnoteTable<'d> {
    fn build(document: &'d Document) -> Self {
        let mut definitions = HashMap::new();
        collect_definitions(&document.blocks, &mut definitions);

        let mut table = FootnoteTable::default();
        for (index, name) in document.footnote_links.iter().enumerate() {
            let Some(&children) = definitions.get(name.as_str()) else {
                continue;
            };
            let occurrence = index + 1;
            match table.by_name.get(name.as_str()) {
                Some(&position) => table.notes[position].occurrences.push(occurrence),
                None => {
                    table.by_name.insert(name.as_str(), table.notes.len());
                    table.notes.push(Note {
                        children,
                        occurrences: vec![occurrence],
                    });
                }
            }
        }
        table
    }

    /// Footnote number and the id suffix of one reference to it
    fn anchor(&self, name: &str, occurrence: usize) -> Option<(usize, String)> {
        let position = *self.by_name.get(name)?;
        let note = &self.notes[position];
        Some((position + 1, note_anchor(position + 1, note, occurrence)))
    }
}

fn note_anchor(number: usize, note: &Note<'_>, occurrence: usize) -> String {
    if note.occurrences.len() > 1 {
        let k = note.occurrences.iter().position(|&o| o == occurrence).unwrap_or(0) + 1;
        format!("{}-{}", number, k)
    } else {
        number.to_string()
    }
}

/// First definition of every footnote name, wherever it is nested
fn collect_definitions<'d>(blocks: &'d [Block], definitions: &mut HashMap<&'d str, &'d [Block]>) {
    for block in blocks {
        match block {
            Block::FootnoteDefinition { name, children } => {
                definitions.entry(name.as_str()).or_insert(children.as_slice());
                collect_definitions(children, definitions);
            }
            Block::BlockQuote { children, .. } | Block::Admonition { children, .. } => {
                collect_definitions(children, definitions)
            }
            Block::List { items, .. } => {
                for item in items {
                    collect_definitions(&item.children, definitions);
                }
            }
            _ => {}
        }
    }
}

struct Render<'a> {
    options: &'a Options,
    references: &'a ReferenceTable,
    footnotes: FootnoteTable<'a>,
}

impl Render<'_> {
    fn blocks(&self, blocks: &[Block]) -> String {
        blocks.iter().map(|block| self.block(block)).collect()
    }

    fn inlines(&self, nodes: &[Inline]) -> String {
        nodes.iter().map(|node| self.inline(node)).collect()
    }

    fn block(&self, block: &Block) -> String {
        match block {
            Block::Paragraph(children) => format!("<p>{}</p>\n", self.inlines(children)),
            Block::Plain(children) => self.inlines(children),
            Block::Heading {
                level,
                attributes,
                children,
            } => format!(
                "<h{}{}>{}</h{}>\n",
                level,
                attributes_html(attributes.as_ref()),
                self.inlines(children),
                level
            ),
            Block::CodeBlock {
                language,
                attributes,
                literal,
            } => self.code_block(language.as_deref(), attributes.as_ref(), literal),
            Block::ThematicBreak => self.void_tag("hr") + "\n",
            Block::BlockQuote { children, .. } => {
                format!("<blockquote>{}</blockquote>\n", self.blocks(children))
            }
            Block::Admonition { kind, children } => format!(
                "<blockquote class=\"notquote {}\" data-type=\"{}\">{}</blockquote>\n",
                kind.name(),
                kind.name(),
                self.blocks(children)
            ),
            Block::List {
                ordered,
                start,
                items,
            } => self.list(*ordered, *start, items),
            Block::Table {
                alignments,
                head,
                body,
            } => {
                let rows: String = body.iter().map(|row| self.table_row(row, alignments, "td")).collect();
                format!(
                    "<table>\n<thead>\n{}</thead>\n<tbody>\n{}</tbody>\n</table>\n",
                    self.table_row(head, alignments, "th"),
                    rows
                )
            }
            Block::HtmlBlock(html) => format!("{}\n", html),
            // collected into the footnote section
            Block::FootnoteDefinition { .. } => String::new(),
            Block::Literal(text) => format!("{}\n", escape_html(text)),
        }
    }

    fn code_block(&self, language: Option<&str>, attributes: Option<&Attributes>, literal: &str) -> String {
        let attributes = attributes_html(attributes);
        let (pre, code) = match language {
            Some(language) => (String::new(), format!(" class=\"language-{}\"", language)),
            None if self.options.code_attributes_on_pre => (attributes, String::new()),
            None => (String::new(), attributes),
        };
        format!("<pre{}><code{}>{}</code></pre>\n", pre, code, escape_html(literal))
    }

    fn list(&self, ordered: bool, start: Option<u64>, items: &[ListItem]) -> String {
        let tag = if ordered { "ol" } else { "ul" };
        let start = match start {
            Some(n) if ordered && n != 1 && self.options.keep_list_start_number => format!(" start=\"{}\"", n),
            _ => String::new(),
        };
        let content: String = items
            .iter()
            .map(|item| format!("<li>{}</li>\n", self.blocks(&item.children)))
            .collect();
        format!("<{}{}>\n{}</{}>\n", tag, start, content, tag)
    }

    fn table_row(&self, row: &TableRow, alignments: &[Alignment], cell_tag: &str) -> String {
        let cells: String = row
            .cells
            .iter()
            .enumerate()
            .map(|(c, cell)| {
                let align = alignments
                    .get(c)
                    .and_then(|alignment| alignment.as_attr())
                    .map(|value| format!(" align=\"{}\"", value))
                    .unwrap_or_default();
                format!("<{}{}>{}</{}>", cell_tag, align, self.inlines(cell).trim(), cell_tag)
            })
            .collect();
        format!("<tr>{}</tr>\n", cells)
    }

    fn inline(&self, node: &Inline) -> String {
        match node {
            Inline::Text(text) => escape_html(text).into_owned(),
            Inline::Code(code) => format!("<code>{}</code>", escape_html(code)),
            Inline::Emphasis(children) => format!("<em>{}</em>", self.inlines(children)),
            Inline::Strong(children) => format!("<strong>{}</strong>", self.inlines(children)),
            Inline::Strikeout(children) => format!("<del>{}</del>", self.inlines(children)),
            Inline::Superscript(text) => format!("<sup>{}</sup>", escape_html(text)),
            Inline::Link {
                target,
                children,
                attributes,
                source,
            } => match self.resolve(target) {
                Some((url, title)) => format!(
                    "<a href=\"{}\"{}{}>{}</a>",
                    escape_html(url),
                    title_html(title),
                    attributes_html(attributes.as_ref()),
                    self.inlines(children)
                ),
                None => escape_html(source).into_owned(),
            },
            Inline::Image {
                target,
                alt,
                attributes,
                source,
            } => match self.resolve(target) {
                Some((url, title)) => {
                    let tag = format!(
                        "img src=\"{}\" alt=\"{}\"{}{}",
                        escape_html(url),
                        escape_html(alt),
                        title_html(title),
                        attributes_html(attributes.as_ref())
                    );
                    self.void_tag(&tag)
                }
                None => escape_html(source).into_owned(),
            },
            Inline::Autolink(url) => format!(
                "<a href=\"{}\">{}</a>",
                escape_html(url),
                escape_html(&url_display_text(url))
            ),
            Inline::Email(email) => {
                let email = escape_html(email);
                format!("<a href=\"mailto:{}\">{}</a>", email, email)
            }
            Inline::HtmlInline(html) => html.clone(),
            Inline::LineBreak => self.void_tag("br"),
            Inline::FootnoteReference { name, occurrence } => match self.footnotes.anchor(name, *occurrence) {
                Some((number, anchor)) => format!(
                    "<sup id=\"fnref-{}\" class=\"footnote-ref\"><a href=\"#fn-{}\" role=\"doc-noteref\">{}</a></sup>",
                    anchor, number, number
                ),
                None => format!("[^{}]", escape_html(name)),
            },
            Inline::CellBoundary => String::new(),
        }
    }

    /// Destination and title of a link, looking references up in the document's table
    fn resolve<'t>(&'t self, target: &'t LinkTarget) -> Option<(&'t str, Option<&'t str>)> {
        match target {
            LinkTarget::Inline { destination, title } => Some((destination, title.as_deref())),
            LinkTarget::Reference(label) => self
                .references
                .get(label)
                .map(|reference| (reference.url.as_str(), reference.title.as_deref())),
        }
    }

    /// `<tag />`, or `<tag>` in HTML5 mode
    fn void_tag(&self, tag: &str) -> String {
        if self.options.html5 {
            format!("<{}>", tag)
        } else {
            format!("<{} />", tag)
        }
    }

    fn footnote_section(&self) -> String {
        if self.footnotes.notes.is_empty() {
            return String::new();
        }
        let mut html = format!(
            "\n<div class=\"footnotes\" role=\"doc-endnotes\">\n{}\n<ol>\n\n",
            self.void_tag("hr")
        );
        for (position, note) in self.footnotes.notes.iter().enumerate() {
            let number = position + 1;
            let backlinks: Vec<String> = note
                .occurrences
                .iter()
                .map(|&occurrence| {
                    format!(
                        "<a href=\"#fnref-{}\" role=\"doc-backlink\">&#8617;&#xFE0E;</a>",
                        note_anchor(number, note, occurrence)
                    )
                })
                .collect();
            html.push_str(&format!(
                "<li id=\"fn-{}\" role=\"doc-endnote\">\n{}<p class=\"footnote-backrefs\">{}</p>\n</li>\n\n",
                number,
                self.blocks(note.children),
                backlinks.join("\n")
            ));
        }
        html.push_str("</ol>\n</div>\n");
        html
    }
}

fn title_html(title: Option<&str>) -> String {
    match title {
        Some(title) if !title.is_empty() => format!(" title=\"{}\"", escape_html(title)),
        _ => String::new(),
    }
}

fn attributes_html(attributes: Option<&Attributes>) -> String {
    let Some(attributes) = attributes else {
        return String::new();
    };
    let mut html = String::new();
    if let Some(id) = &attributes.id {
        html.push_str(&format!(" id=\"{}\"", escape_html(id)));
    }
    if !attributes.classes.is_empty() {
        html.push_str(&format!(" class=\"{}\"", escape_html(&attributes.classes.join(" "))));
    }
    html
}
