/// Markdown to HTML conversion with base, GitHub, Extra and Leanpub flavors
pub mod ast;
pub mod config;
pub mod dialect;
pub mod error;
pub mod escape;
pub mod parser;
pub mod references;
pub mod renderer;

pub use ast::Document;
pub use config::Options;
pub use dialect::Flavor;
pub use error::Error;

use parser::Parser;
use renderer::HtmlRenderer;

/// Parse markdown text with the base flavor and render to HTML
pub fn markdown_to_html(markdown: &str) -> String {
    Markdown::new(Flavor::Markdown).parse(markdown)
}

/// A converter bound to one set of options. Every call parses independently.
#[derive(Debug, Clone, Default)]
pub struct Markdown {
    options: Options,
}

impl Markdown {
    pub fn new(flavor: Flavor) -> Self {
        Markdown {
            options: Options::new(flavor),
        }
    }

    pub fn with_options(options: Options) -> Result<Self, Error> {
        options.validate()?;
        Ok(Markdown { options })
    }

    pub fn options(&self) -> &Options {
        &self.options
    }

    /// Convert a complete document
    pub fn parse(&self, markdown: &str) -> String {
        self.render(&self.parse_document(markdown))
    }

    /// Convert inline markup only, without paragraphs or other blocks
    pub fn parse_paragraph(&self, markdown: &str) -> String {
        let document = Parser::new(&self.options).parse_paragraph(markdown);
        self.render(&document)
    }

    pub fn parse_document(&self, markdown: &str) -> Document {
        Parser::new(&self.options).parse(markdown)
    }

    pub fn render(&self, document: &Document) -> String {
        HtmlRenderer::new(&self.options).render(document)
    }
}
