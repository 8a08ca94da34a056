//! Cleaning and validation of decoder-supplied candidate tables.
//!
//! The decoder's grid strategy finds candidate tables; this module only
//! decides which of them are usable. Cells are stringified and trimmed, rows
//! with no content are dropped, and a table survives only if at least two rows
//! remain and the first of them has at least two columns.

use indexmap::IndexMap;
use unicode_normalization::UnicodeNormalization;

use crate::model::{BBox, RawTable, Table, TableRow};

/// Minimum number of rows for an accepted table.
pub const MIN_ROWS: usize = 2;

/// Minimum number of columns (in the first row) for an accepted table.
pub const MIN_COLUMNS: usize = 2;

/// How the first row of a table is treated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TableHeaderMode {
    /// Keep every row as plain cells
    #[default]
    Raw,
    /// Use the first row as column headers and key matching rows by them
    FirstRowAsHeader,
}

/// Cleans raw candidate tables into validated [`Table`]s.
#[derive(Debug, Clone, Copy, Default)]
pub struct TableNormalizer {
    header_mode: TableHeaderMode,
}

impl TableNormalizer {
    /// Create a normalizer that keeps rows as plain cells.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a normalizer with the given header mode.
    pub fn with_header_mode(header_mode: TableHeaderMode) -> Self {
        Self { header_mode }
    }

    /// Normalize every candidate table of a page, dropping malformed ones.
    pub fn normalize_page(&self, raw_tables: &[RawTable], page: u32, bbox: BBox) -> Vec<Table> {
        raw_tables
            .iter()
            .filter_map(|raw| self.normalize(raw, page, Some(bbox)))
            .collect()
    }

    /// Normalize one candidate table.
    ///
    /// Returns `None` if the cleaned table has fewer than two rows or fewer
    /// than two columns in its first row.
    pub fn normalize(&self, raw: &RawTable, page: u32, bbox: Option<BBox>) -> Option<Table> {
        let rows: Vec<Vec<String>> = raw
            .rows
            .iter()
            .map(|row| row.iter().map(|c| clean_cell(c.as_deref())).collect::<Vec<_>>())
            .filter(|row| row.iter().any(|c| !c.is_empty()))
            .collect();

        if rows.len() < MIN_ROWS {
            log::debug!(
                "TableNormalizer: page {}: skipping table with {} rows",
                page,
                rows.len()
            );
            return None;
        }
        if rows[0].len() < MIN_COLUMNS {
            log::debug!(
                "TableNormalizer: page {}: skipping table with {} columns",
                page,
                rows[0].len()
            );
            return None;
        }

        let table = Table {
            page,
            headers: None,
            rows: rows.into_iter().map(TableRow::Cells).collect(),
            bbox,
        };

        Some(match self.header_mode {
            TableHeaderMode::Raw => table,
            TableHeaderMode::FirstRowAsHeader => apply_header_row(&table),
        })
    }
}

/// Re-shape a plain table so its first row becomes the header.
///
/// Headers are the non-empty cells of the first row. A data row whose width
/// equals the header count becomes a header-keyed record; any other row is
/// kept as plain cells. Tables that already carry headers are returned as is.
pub fn apply_header_row(table: &Table) -> Table {
    if table.headers.is_some() {
        return table.clone();
    }
    let Some((first, body)) = table.rows.split_first() else {
        return table.clone();
    };

    let headers: Vec<String> = first
        .values()
        .filter(|h| !h.is_empty())
        .map(str::to_string)
        .collect();

    let rows = body
        .iter()
        .map(|row| match row {
            TableRow::Cells(cells) if !headers.is_empty() && cells.len() == headers.len() => {
                TableRow::Record(
                    headers
                        .iter()
                        .cloned()
                        .zip(cells.iter().cloned())
                        .collect::<IndexMap<_, _>>(),
                )
            }
            other => other.clone(),
        })
        .collect();

    Table {
        page: table.page,
        headers: (!headers.is_empty()).then_some(headers),
        rows,
        bbox: table.bbox,
    }
}

/// Tables with at least one cell containing `keyword`, ignoring case.
pub fn tables_with_keyword<'a>(
    tables: impl IntoIterator<Item = &'a Table>,
    keyword: &str,
) -> Vec<&'a Table> {
    tables
        .into_iter()
        .filter(|t| t.contains_keyword(keyword))
        .collect()
}

fn clean_cell(cell: Option<&str>) -> String {
    cell.map(|c| c.nfc().collect::<String>().trim().to_string())
        .unwrap_or_default()
}
