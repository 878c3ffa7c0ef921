//! Pipe tables: a header row, a separator row carrying the column alignments, body rows.

use log::debug;

use super::blocks::is_indented_code;
use super::{Context, Parser, is_blank};
use crate::ast::{Alignment, Block, Inline, TableRow};

/// Column alignments of a separator row such as `|:--|--:|:-:|`
fn parse_separator(line: &str) -> Option<Vec<Alignment>> {
    let row = line.trim();
    if !row.contains('|') {
        return None;
    }
    let row = row.strip_prefix('|').unwrap_or(row);
    let row = row.strip_suffix('|').unwrap_or(row);

    row.split('|')
        .map(|cell| {
            let cell = cell.trim();
            let left = cell.starts_with(':');
            let right = cell.len() > 1 && cell.ends_with(':');
            let dashes = cell.trim_start_matches(':').trim_end_matches(':');
            if dashes.is_empty() || !dashes.bytes().all(|b| b == b'-' || b == b' ') || !dashes.starts_with('-') {
                return None;
            }
            Some(match (left, right) {
                (true, true) => Alignment::Center,
                (true, false) => Alignment::Left,
                (false, true) => Alignment::Right,
                (false, false) => Alignment::None,
            })
        })
        .collect()
}

pub(super) fn is_table_start(lines: &[&str], i: usize) -> bool {
    lines[i].contains('|') && lines.get(i + 1).is_some_and(|next| parse_separator(next).is_some())
}

/// Strip the outer pipes of a row; a trailing `\|` is an escaped pipe, `\\|` is not
fn trim_row_pipes(line: &str) -> &str {
    let row = line.trim();
    let row = row.strip_prefix('|').unwrap_or(row);
    if row.ends_with('|') && (!row.ends_with("\\|") || row.ends_with("\\\\|")) {
        &row[..row.len() - 1]
    } else {
        row
    }
}

impl Parser<'_> {
    pub(super) fn consume_table(&mut self, lines: &[&str], start: usize) -> (Option<Block>, usize) {
        let Some(alignments) = lines.get(start + 1).and_then(|line| parse_separator(line)) else {
            return self.consume_paragraph(lines, start);
        };
        let head = self.parse_table_row(lines[start]);

        let mut body = Vec::new();
        let mut i = start + 2;
        while i < lines.len() {
            let line = lines[i];
            if is_blank(line) || is_indented_code(line) || !line.contains('|') {
                break;
            }
            body.push(self.parse_table_row(line));
            i += 1;
        }

        debug!("table with {} column(s) and {} body row(s)", alignments.len(), body.len());
        (
            Some(Block::Table {
                alignments,
                head,
                body,
            }),
            i,
        )
    }

    /// Inline-parse a row and split it at the cell boundaries the scanner produced
    fn parse_table_row(&mut self, line: &str) -> TableRow {
        let nodes = self.parse_inline_in(Context::Table, trim_row_pipes(line));
        let mut cells = vec![Vec::new()];
        for node in nodes {
            match node {
                Inline::CellBoundary => cells.push(Vec::new()),
                node => {
                    if let Some(cell) = cells.last_mut() {
                        cell.push(node);
                    }
                }
            }
        }
        TableRow { cells }
    }
}
