//! CSV tokenizer
//!
//! Single left-to-right scan with one character of lookahead. Cells are
//! trimmed, quoted cells may hold commas and line breaks, `""` inside quotes
//! is a literal quote. Rows whose cells are all empty are dropped, but they
//! still count towards the record position carried by every emitted [`Row`],
//! so row numbers keep pointing at the right place in the file.

use tracing::debug;

use crate::core::models::{trim_cell, Row};

/// Tokenize CSV text into rows of trimmed cells.
pub fn parse(content: &str) -> Vec<Row> {
    let mut rows = Vec::new();
    let mut row: Vec<String> = Vec::new();
    let mut cell = String::new();
    let mut in_quotes = false;
    let mut record = 1usize;
    let mut chars = content.chars().peekable();

    while let Some(ch) = chars.next() {
        match ch {
            '"' => {
                if in_quotes && chars.peek() == Some(&'"') {
                    cell.push('"');
                    chars.next();
                } else {
                    in_quotes = !in_quotes;
                }
            }
            ',' if !in_quotes => finish_cell(&mut row, &mut cell),
            '\n' if !in_quotes => {
                finish_row(&mut rows, &mut row, &mut cell, record);
                record += 1;
            }
            '\r' if !in_quotes && chars.peek() != Some(&'\n') => {
                finish_row(&mut rows, &mut row, &mut cell, record);
                record += 1;
            }
            // the \r of a \r\n pair, or any \r inside quotes
            '\r' => {}
            _ => cell.push(ch),
        }
    }

    if !trim_cell(&cell).is_empty() || !row.is_empty() {
        finish_row(&mut rows, &mut row, &mut cell, record);
    }

    debug!("Tokenized {} non-blank rows from {} records", rows.len(), record);
    rows
}

fn finish_cell(row: &mut Vec<String>, cell: &mut String) {
    row.push(trim_cell(cell).to_string());
    cell.clear();
}

fn finish_row(rows: &mut Vec<Row>, row: &mut Vec<String>, cell: &mut String, record: usize) {
    finish_cell(row, cell);
    let cells = std::mem::take(row);
    if cells.iter().any(|c| !c.is_empty()) {
        rows.push(Row::new(record, cells));
    }
}
