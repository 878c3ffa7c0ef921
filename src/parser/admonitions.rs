//! Leanpub admonitions: `W> text`, `T> text`, ... rendered as typed blockquotes.

use super::{Context, Parser, is_blank};
use crate::ast::{AdmonitionKind, Block};

/// Kind of the admonition opened by `X>` followed by a space, a tab or the end of the line
pub(super) fn admonition_kind(line: &str) -> Option<AdmonitionKind> {
    let bytes = line.as_bytes();
    if bytes.get(1) != Some(&b'>') || !matches!(bytes.get(2), None | Some(b' ' | b'\t')) {
        return None;
    }
    AdmonitionKind::from_letter(bytes[0])
}

impl Parser<'_> {
    pub(super) fn consume_admonition(&mut self, lines: &[&str], start: usize) -> (Option<Block>, usize) {
        let Some(kind) = admonition_kind(lines[start]) else {
            return self.consume_paragraph(lines, start);
        };
        let marker = &lines[start][..2];

        let mut content = Vec::new();
        let mut i = start;
        while i < lines.len() && !is_blank(lines[i]) {
            let line = lines[i];
            // lines without the marker continue the block as they are
            let inner = match line.strip_prefix(marker) {
                Some(rest) => rest.strip_prefix([' ', '\t']).unwrap_or(rest),
                None => line,
            };
            content.push(inner.to_string());
            i += 1;
        }

        let children = self.parse_nested(Context::Admonition, &content);
        (Some(Block::Admonition { kind, children }), i)
    }
}
