//! Ordered and unordered lists.

use log::debug;

use super::blocks::{is_reference, paragraph_text};
use super::{Context, Parser, is_blank};
use crate::ast::{Block, ListItem};
use crate::dialect::BlockKind;

/// A list marker matched at the start of a line
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct ItemMarker {
    /// Leading spaces before the marker
    indent: usize,
    /// Bytes taken by indentation, marker and the whitespace after it
    len: usize,
    /// Tabs within those bytes
    tabs: usize,
    number: Option<u64>,
}

/// Match `^ {0,max_indent}(\d+\.|<bullet>)[ \t]+`
fn match_item(line: &str, ordered: bool, bullet: u8, max_indent: usize) -> Option<ItemMarker> {
    let bytes = line.as_bytes();
    let indent = bytes.iter().take_while(|&&b| b == b' ').count();
    if indent > max_indent {
        return None;
    }

    let mut pos = indent;
    let number = if ordered {
        let digits = bytes[pos..].iter().take_while(|b| b.is_ascii_digit()).count();
        if digits == 0 || bytes.get(pos + digits) != Some(&b'.') {
            return None;
        }
        let number = line[pos..pos + digits].parse().ok();
        pos += digits + 1;
        number
    } else {
        if bytes.get(pos) != Some(&bullet) {
            return None;
        }
        pos += 1;
        None
    };

    let gap = bytes[pos..]
        .iter()
        .take_while(|&&b| b == b' ' || b == b'\t')
        .count();
    if gap == 0 {
        return None;
    }
    let len = pos + gap;
    Some(ItemMarker {
        indent,
        len,
        tabs: line[..len].matches('\t').count(),
        number,
    })
}

fn bullet_of(line: &str) -> Option<u8> {
    match line.trim_start_matches(' ').bytes().next() {
        Some(b @ (b'-' | b'+' | b'*')) => Some(b),
        _ => None,
    }
}

pub(super) fn is_unordered_item(line: &str) -> bool {
    bullet_of(line).is_some_and(|bullet| match_item(line, false, bullet, 3).is_some())
}

pub(super) fn is_ordered_item(line: &str) -> bool {
    match_item(line, true, 0, 3).is_some()
}

/// Indentation continuation lines of the current item carry
#[derive(Debug, Clone, Copy)]
struct ItemIndent {
    tabs: bool,
    len: usize,
}

impl ItemIndent {
    fn matches(self, line: &str) -> bool {
        let unit = if self.tabs { b'\t' } else { b' ' };
        line.len() >= self.len && line.as_bytes()[..self.len].iter().all(|&b| b == unit)
    }

    fn strip(self, line: &str) -> &str {
        if let Some(rest) = line.strip_prefix('\t') {
            rest
        } else if self.matches(line) {
            &line[self.len..]
        } else {
            line
        }
    }
}

struct RawItem {
    lines: Vec<String>,
    lazy: bool,
}

impl Parser<'_> {
    pub(super) fn consume_list(&mut self, lines: &[&str], start: usize, ordered: bool) -> (Option<Block>, usize) {
        let bullet = bullet_of(lines[start]).unwrap_or(b'-');
        let mut max_indent = 3;
        let mut start_number = None;
        let mut indent = ItemIndent { tabs: false, len: 0 };
        let mut items: Vec<RawItem> = Vec::new();
        let mut last_line_empty = false;

        let mut i = start;
        while i < lines.len() {
            let line = lines[i];
            if let Some(marker) = match_item(line, ordered, bullet, max_indent) {
                if i == start {
                    // Markers indented deeper than the first one belong to a nested list
                    max_indent = marker.indent + 1;
                    start_number = marker.number;
                }
                indent = if marker.tabs > 0 {
                    ItemIndent { tabs: true, len: marker.tabs }
                } else {
                    ItemIndent { tabs: false, len: marker.len }
                };
                let lazy = last_line_empty || items.last().is_some_and(|item| item.lazy);
                items.push(RawItem {
                    lines: vec![line[marker.len..].to_string()],
                    lazy,
                });
                last_line_empty = false;
            } else if is_blank(line) {
                last_line_empty = true;
                let Some(item) = items.last_mut() else { break };
                match lines.get(i + 1) {
                    Some(next) if !is_blank(next) => {
                        if match_item(next, ordered, bullet, max_indent).is_some() {
                            item.lines.push(String::new());
                            item.lazy = true;
                        } else if indent.matches(next) || next.starts_with('\t') {
                            item.lines.push(String::new());
                            let continued = indent.strip(next);
                            item.lazy = is_blank(continued)
                                || !self.dialect.has_block(BlockKind::Reference)
                                || !is_reference(continued);
                        } else {
                            break;
                        }
                    }
                    // two blank lines or the end of input close the list
                    _ => break,
                }
            } else {
                let Some(item) = items.last_mut() else { break };
                item.lines.push(indent.strip(line).to_string());
                last_line_empty = false;
            }
            i += 1;
        }

        debug!("{} list with {} item(s)", if ordered { "ordered" } else { "unordered" }, items.len());
        let items = items.into_iter().map(|item| self.build_list_item(item)).collect();
        (
            Some(Block::List {
                ordered,
                start: if ordered { start_number } else { None },
                items,
            }),
            i,
        )
    }

    /// Non-lazy items keep their leading paragraph as bare inline content
    fn build_list_item(&mut self, item: RawItem) -> ListItem {
        let lines: Vec<&str> = item.lines.iter().map(String::as_str).collect();
        let mut rest = &lines[..];
        let mut children = Vec::new();

        self.context.push(Context::ListItem);
        if !item.lazy {
            let mut lead = 0;
            while lead < rest.len()
                && !is_blank(rest[lead])
                && self.identify(&rest[lead..], 0) == BlockKind::Paragraph
            {
                lead += 1;
            }
            if lead > 0 {
                let text = paragraph_text(&rest[..lead]);
                children.push(Block::Plain(self.parse_inline(&text)));
                rest = &rest[lead..];
            }
        }
        if !rest.is_empty() {
            children.extend(self.parse_blocks(rest));
        }
        self.context.pop();

        ListItem {
            lazy: item.lazy,
            children,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_match_item() {
        let marker = match_item("  - item", false, b'-', 3).unwrap();
        assert_eq!((marker.indent, marker.len, marker.tabs), (2, 4, 0));
        assert_eq!(match_item("12. item", true, 0, 3).unwrap().number, Some(12));
        assert_eq!(match_item("-\titem", false, b'-', 3).unwrap().tabs, 1);
        assert!(match_item("-item", false, b'-', 3).is_none());
        assert!(match_item("* item", false, b'-', 3).is_none());
        assert!(match_item("    - item", false, b'-', 3).is_none());
        assert!(match_item("1) item", true, 0, 3).is_none());
    }

    #[test]
    fn test_item_recognizers() {
        assert!(is_unordered_item("+ a"));
        assert!(is_unordered_item("   * a"));
        assert!(!is_unordered_item("*emphasis*"));
        assert!(is_ordered_item("1. a"));
        assert!(!is_ordered_item("2019."));
    }
}
