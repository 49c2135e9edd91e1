use crate::registry::CodeRegistry;
use crate::schema::{CodeValues, PeriodValue};
use crate::utils::parse_cell;
use log::debug;
use serde::{Deserialize, Serialize};

/// Minimum width of a statement table: code, description, current, previous.
pub const MIN_TABLE_COLUMNS: usize = 4;

/// One table as delivered by the document converter: an optional header row and
/// the body rows, all as raw cell text.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RawTable {
    pub header: Option<Vec<String>>,
    pub rows: Vec<Vec<String>>,
}

impl RawTable {
    pub fn new(header: Option<Vec<String>>, rows: Vec<Vec<String>>) -> Self {
        Self { header, rows }
    }

    /// Builds a table from string literals; handy for fixtures.
    pub fn from_strs(header: Option<&[&str]>, rows: &[&[&str]]) -> Self {
        let to_row = |cells: &[&str]| cells.iter().map(|c| c.to_string()).collect::<Vec<_>>();
        Self {
            header: header.map(to_row),
            rows: rows.iter().map(|r| to_row(*r)).collect(),
        }
    }

    pub fn width(&self) -> usize {
        let header_width = self.header.as_ref().map_or(0, Vec::len);
        let body_width = self.rows.iter().map(Vec::len).max().unwrap_or(0);
        header_width.max(body_width)
    }
}

/// Where the code column sits and whether the first body row served as the header.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CodeColumn {
    pub index: usize,
    pub header_in_first_row: bool,
}

/// Index of the first cell that contains any of `tokens`, compared case-insensitively.
pub fn find_code_cell(cells: &[String], tokens: &[String]) -> Option<usize> {
    let tokens: Vec<String> = tokens
        .iter()
        .map(|t| t.trim().to_lowercase())
        .filter(|t| !t.is_empty())
        .collect();

    cells.iter().position(|cell| {
        let cell = cell.trim().to_lowercase();
        tokens.iter().any(|token| cell.contains(token.as_str()))
    })
}

/// Locates the code column, first in the header and then in the first body row.
pub fn detect_code_column(table: &RawTable, tokens: &[String]) -> Option<CodeColumn> {
    if let Some(index) = table
        .header
        .as_deref()
        .and_then(|header| find_code_cell(header, tokens))
    {
        return Some(CodeColumn {
            index,
            header_in_first_row: false,
        });
    }

    let first_row = table.rows.first()?;
    find_code_cell(first_row, tokens).map(|index| CodeColumn {
        index,
        header_in_first_row: true,
    })
}

pub struct CodeTableExtractor<'a> {
    registry: &'a CodeRegistry,
    header_tokens: &'a [String],
}

impl<'a> CodeTableExtractor<'a> {
    pub fn new(registry: &'a CodeRegistry, header_tokens: &'a [String]) -> Self {
        Self {
            registry,
            header_tokens,
        }
    }

    /// Merges every qualifying table into one code mapping. Tables are visited in
    /// order and rows top to bottom; a later non-empty figure replaces an earlier
    /// one for the same code and period.
    pub fn extract(&self, tables: &[RawTable]) -> CodeValues {
        let mut codes = CodeValues::new();

        for (idx, table) in tables.iter().enumerate() {
            self.extract_table(idx, table, &mut codes);
        }

        codes
    }

    fn extract_table(&self, idx: usize, table: &RawTable, codes: &mut CodeValues) {
        let width = table.width();
        if width < MIN_TABLE_COLUMNS {
            debug!("Skipping table #{}: only {} columns", idx, width);
            return;
        }

        let Some(column) = detect_code_column(table, self.header_tokens) else {
            debug!("Skipping table #{}: no code column found", idx);
            return;
        };

        let body = if column.header_in_first_row {
            debug!(
                "Table #{}: using first row as header, code column {}",
                idx, column.index
            );
            &table.rows[1..]
        } else {
            &table.rows[..]
        };

        let current_idx = width - 2;
        let previous_idx = width - 1;
        let mut matched = 0usize;

        for row in body {
            let Some(code_cell) = row.get(column.index) else {
                continue;
            };
            let Some(code) = self.registry.resolve(code_cell) else {
                continue;
            };

            let parsed = PeriodValue::new(
                row.get(current_idx).and_then(|c| parse_cell(c)),
                row.get(previous_idx).and_then(|c| parse_cell(c)),
            );

            codes.entry(code).or_default().merge(parsed);
            matched += 1;
        }

        debug!("Table #{}: matched {} registry rows", idx, matched);
    }
}
