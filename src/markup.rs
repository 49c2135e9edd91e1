//! Reading the markdown produced by the document converter.
//!
//! The converter writes one `<stem>.md` per document and embeds every detected
//! table as an HTML `<table>` element. This module finds that file and turns the
//! embedded tables into [`RawTable`] grids; everything else in the markdown is
//! ignored.

use crate::error::{Result, SolvencyError};
use crate::ingestion::RawTable;
use crate::utils::collapse_whitespace;
use log::debug;
use scraper::{ElementRef, Html, Selector};
use std::path::{Path, PathBuf};
use std::sync::OnceLock;

/// Upper bound on `colspan`/`rowspan`, so a corrupt attribute cannot blow up a grid.
const MAX_SPAN: usize = 64;

fn table_selector() -> &'static Selector {
    static SEL: OnceLock<Selector> = OnceLock::new();
    SEL.get_or_init(|| Selector::parse("table").expect("invalid table selector"))
}

fn tr_selector() -> &'static Selector {
    static SEL: OnceLock<Selector> = OnceLock::new();
    SEL.get_or_init(|| Selector::parse("tr").expect("invalid tr selector"))
}

/// Candidate locations of the converted markdown, in lookup order.
pub fn markup_candidates(output_dir: &Path, stem: &str) -> Vec<PathBuf> {
    let file_name = format!("{}.md", stem);
    vec![
        output_dir.join(stem).join("auto").join(&file_name),
        output_dir.join(stem).join(&file_name),
    ]
}

/// Finds the converted markdown for `stem` under `output_dir`.
///
/// Fails with [`SolvencyError::ExtractionUnavailable`] when the converter left
/// nothing behind for this document.
pub fn locate_markup(output_dir: &Path, stem: &str) -> Result<PathBuf> {
    let candidates = markup_candidates(output_dir, stem);

    match candidates.iter().find(|path| path.is_file()) {
        Some(path) => {
            debug!("Found converted markup for '{}' at {}", stem, path.display());
            Ok(path.clone())
        }
        None => Err(SolvencyError::ExtractionUnavailable {
            document: stem.to_string(),
            searched: candidates,
        }),
    }
}

pub fn read_tables_from_file(path: &Path) -> Result<Vec<RawTable>> {
    let text = std::fs::read_to_string(path)?;
    Ok(read_tables(&text))
}

/// Extracts every `<table>` in document order. Tables with no non-empty rows are
/// dropped.
pub fn read_tables(markup: &str) -> Vec<RawTable> {
    let doc = Html::parse_document(markup);

    doc.select(table_selector())
        .filter_map(read_table)
        .collect()
}

struct GridRow {
    cells: Vec<String>,
    is_header: bool,
}

fn read_table(table: ElementRef<'_>) -> Option<RawTable> {
    let mut grid: Vec<GridRow> = Vec::new();
    // Per column: text and remaining rows of an active rowspan.
    let mut carried: Vec<Option<(String, usize)>> = Vec::new();

    for tr in table.select(tr_selector()) {
        if !belongs_to(tr, table) {
            continue;
        }

        let cells: Vec<ElementRef<'_>> = tr
            .children()
            .filter_map(ElementRef::wrap)
            .filter(|cell| {
                let name = cell.value().name();
                name.eq_ignore_ascii_case("td") || name.eq_ignore_ascii_case("th")
            })
            .collect();

        let is_header = in_thead(tr, table)
            || (!cells.is_empty()
                && cells
                    .iter()
                    .all(|c| c.value().name().eq_ignore_ascii_case("th")));

        let mut row: Vec<String> = Vec::new();

        for cell in cells {
            while let Some(text) = take_carried(&mut carried, row.len()) {
                row.push(text);
            }

            let text = collapse_whitespace(&cell.text().collect::<Vec<_>>().join(" "));
            let colspan = span_attr(cell, "colspan");
            let rowspan = span_attr(cell, "rowspan");

            for _ in 0..colspan {
                let col = row.len();
                // Overlapping a carried slot: the spanning cell takes it for this row.
                let _ = take_carried(&mut carried, col);
                if rowspan > 1 {
                    if carried.len() <= col {
                        carried.resize(col + 1, None);
                    }
                    carried[col] = Some((text.clone(), rowspan - 1));
                }
                row.push(text.clone());
            }
        }

        // Carried columns past the last cell of a short (or empty) row.
        if let Some(last) = carried.iter().rposition(Option::is_some) {
            while row.len() <= last {
                let text = take_carried(&mut carried, row.len()).unwrap_or_default();
                row.push(text);
            }
        }

        if row.iter().any(|c| !c.is_empty()) {
            grid.push(GridRow {
                cells: row,
                is_header,
            });
        }
    }

    if grid.is_empty() {
        return None;
    }

    let width = grid.iter().map(|r| r.cells.len()).max().unwrap_or(0);
    for row in &mut grid {
        row.cells.resize(width, String::new());
    }

    let header_rows = grid.iter().take_while(|r| r.is_header).count();
    let header = if header_rows > 0 {
        Some(merge_header_rows(&grid[..header_rows], width))
    } else {
        None
    };

    let rows = grid
        .into_iter()
        .skip(header_rows)
        .map(|r| r.cells)
        .collect();

    Some(RawTable::new(header, rows))
}

/// Joins stacked header rows column by column ("Код" over "строки" becomes
/// "Код строки"), skipping repeats produced by spans.
fn merge_header_rows(rows: &[GridRow], width: usize) -> Vec<String> {
    (0..width)
        .map(|col| {
            let mut parts: Vec<&str> = Vec::new();
            for row in rows {
                let text = row.cells[col].as_str();
                if !text.is_empty() && parts.last() != Some(&text) {
                    parts.push(text);
                }
            }
            parts.join(" ")
        })
        .collect()
}

/// Yields the text carried down into `col` by a `rowspan`, counting the current row
/// against the span.
fn take_carried(carried: &mut [Option<(String, usize)>], col: usize) -> Option<String> {
    let slot = carried.get_mut(col)?;
    let (text, remaining) = slot.as_mut()?;
    let text = text.clone();
    *remaining -= 1;
    if *remaining == 0 {
        *slot = None;
    }
    Some(text)
}

fn span_attr(cell: ElementRef<'_>, name: &str) -> usize {
    cell.value()
        .attr(name)
        .and_then(|v| v.trim().parse::<usize>().ok())
        .unwrap_or(1)
        .clamp(1, MAX_SPAN)
}

/// True when the nearest enclosing `<table>` of `tr` is `table` itself, so rows of
/// nested tables are not read twice.
fn belongs_to(tr: ElementRef<'_>, table: ElementRef<'_>) -> bool {
    tr.ancestors()
        .filter_map(ElementRef::wrap)
        .find(|el| el.value().name().eq_ignore_ascii_case("table"))
        .map(|el| el.id() == table.id())
        .unwrap_or(false)
}

fn in_thead(tr: ElementRef<'_>, table: ElementRef<'_>) -> bool {
    tr.ancestors()
        .filter_map(ElementRef::wrap)
        .take_while(|el| el.id() != table.id())
        .any(|el| el.value().name().eq_ignore_ascii_case("thead"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reads_plain_table_without_header() {
        let markup = r#"
# Бухгалтерский баланс

<table><tr><td>Наименование</td><td>Код</td><td>2023</td><td>2022</td></tr>
<tr><td>Запасы</td><td>1210</td><td>1 500</td><td>1 200</td></tr></table>
"#;
        let tables = read_tables(markup);
        assert_eq!(tables.len(), 1);
        assert_eq!(tables[0].header, None);
        assert_eq!(tables[0].rows.len(), 2);
        assert_eq!(tables[0].rows[1], vec!["Запасы", "1210", "1 500", "1 200"]);
    }

    #[test]
    fn test_th_row_becomes_header() {
        let markup = "<table><tr><th>Показатель</th><th>Код</th><th>2023</th><th>2022</th></tr>\
                      <tr><td>Выручка</td><td>2110</td><td>10</td><td>8</td></tr></table>";
        let tables = read_tables(markup);
        assert_eq!(
            tables[0].header.as_deref(),
            Some(&["Показатель".to_string(), "Код".to_string(), "2023".to_string(), "2022".to_string()][..])
        );
        assert_eq!(tables[0].rows.len(), 1);
    }

    #[test]
    fn test_thead_rows_are_merged_into_header() {
        let markup = r#"<table>
<thead><tr><td rowspan="2">Наименование</td><td>Код</td><td colspan="2">На отчетную дату</td></tr>
<tr><td>строки</td><td>2023</td><td>2022</td></tr></thead>
<tbody><tr><td>Баланс</td><td>1600</td><td>10</td><td>9</td></tr></tbody>
</table>"#;
        let tables = read_tables(markup);
        let header = tables[0].header.clone().unwrap();
        assert_eq!(
            header,
            vec![
                "Наименование",
                "Код строки",
                "На отчетную дату 2023",
                "На отчетную дату 2022"
            ]
        );
        assert_eq!(tables[0].rows, vec![vec!["Баланс", "1600", "10", "9"]]);
    }

    #[test]
    fn test_colspan_repeats_and_rows_are_padded() {
        let markup = r#"<table>
<tr><td colspan="2">АКТИВ</td></tr>
<tr><td>Запасы</td><td>1210</td><td>5</td><td>4</td></tr>
</table>"#;
        let tables = read_tables(markup);
        assert_eq!(tables[0].width(), 4);
        assert_eq!(tables[0].rows[0], vec!["АКТИВ", "АКТИВ", "", ""]);
    }

    #[test]
    fn test_rowspan_carries_cell_down() {
        let markup = r#"<table>
<tr><td rowspan="2">Раздел</td><td>1100</td><td>1</td><td>2</td></tr>
<tr><td>1200</td><td>3</td><td>4</td></tr>
</table>"#;
        let tables = read_tables(markup);
        assert_eq!(tables[0].rows[1], vec!["Раздел", "1200", "3", "4"]);
    }

    #[test]
    fn test_trailing_rowspan_is_consumed_by_short_row() {
        let markup = r#"<table>
<tr><td>Наименование</td><td>Код</td><td>2023</td><td rowspan="2">2022</td></tr>
<tr><td>Раздел</td></tr>
<tr><td>Запасы</td><td>1210</td><td>100</td><td>90</td></tr>
</table>"#;
        let tables = read_tables(markup);
        assert_eq!(tables[0].width(), 4);
        assert_eq!(tables[0].rows[1], vec!["Раздел", "", "", "2022"]);
        assert_eq!(tables[0].rows[2], vec!["Запасы", "1210", "100", "90"]);

        let result = crate::analyze_markup(markup);
        assert_eq!(
            result.codes["1210"],
            crate::PeriodValue::new(Some(100.0), Some(90.0))
        );
    }

    #[test]
    fn test_colspan_row_over_carried_column_keeps_width() {
        let markup = r#"<table>
<tr><td>Наименование</td><td>Код</td><td>2023</td><td>2022</td></tr>
<tr><td>Итого внеоборотные активы</td><td rowspan="2">1100</td><td>1</td><td>2</td></tr>
<tr><td colspan="4">ПАССИВ</td></tr>
<tr><td>Запасы</td><td>1210</td><td>100</td><td>90</td></tr>
</table>"#;
        let tables = read_tables(markup);
        assert_eq!(tables[0].width(), 4);
        assert_eq!(tables[0].rows[2], vec!["ПАССИВ"; 4]);
        assert_eq!(tables[0].rows[3], vec!["Запасы", "1210", "100", "90"]);

        let result = crate::analyze_markup(markup);
        assert_eq!(
            result.codes["1100"],
            crate::PeriodValue::new(Some(1.0), Some(2.0))
        );
        assert_eq!(
            result.codes["1210"],
            crate::PeriodValue::new(Some(100.0), Some(90.0))
        );
    }

    #[test]
    fn test_rowspan_counts_empty_row() {
        let markup = r#"<table>
<tr><td rowspan="2">Раздел</td><td>1100</td><td>1</td><td>2</td></tr>
<tr></tr>
<tr><td>Запасы</td><td>1210</td><td>100</td><td>90</td></tr>
</table>"#;
        let tables = read_tables(markup);
        assert_eq!(tables[0].rows.len(), 3);
        assert_eq!(tables[0].rows[1], vec!["Раздел", "", "", ""]);
        assert_eq!(tables[0].rows[2], vec!["Запасы", "1210", "100", "90"]);
    }

    #[test]
    fn test_nested_tables_are_read_separately() {
        let markup = r#"<table><tr><td>outer</td><td>
<table><tr><td>a</td><td>b</td></tr></table>
</td></tr></table>"#;
        let tables = read_tables(markup);
        assert_eq!(tables.len(), 2);
        assert_eq!(tables[0].rows.len(), 1);
        assert_eq!(tables[1].rows, vec![vec!["a", "b"]]);
    }

    #[test]
    fn test_blank_rows_and_empty_tables_are_dropped() {
        let markup = "<table><tr><td> </td><td></td></tr></table>\
                      <table><tr><td>x</td></tr><tr><td></td></tr></table>";
        let tables = read_tables(markup);
        assert_eq!(tables.len(), 1);
        assert_eq!(tables[0].rows, vec![vec!["x"]]);
    }

    #[test]
    fn test_locate_markup_reports_searched_paths() {
        let dir = std::env::temp_dir().join("solvency_index_missing_markup");
        let err = locate_markup(&dir, "report").unwrap_err();
        match err {
            SolvencyError::ExtractionUnavailable { document, searched } => {
                assert_eq!(document, "report");
                assert_eq!(searched, markup_candidates(&dir, "report"));
            }
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[test]
    fn test_markup_candidates_order() {
        let candidates = markup_candidates(Path::new("out"), "doc");
        assert_eq!(candidates[0], Path::new("out/doc/auto/doc.md"));
        assert_eq!(candidates[1], Path::new("out/doc/doc.md"));
    }
}
