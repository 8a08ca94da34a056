//! Table types.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use super::BBox;

/// A candidate table as emitted by the decoder, before cleaning.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RawTable {
    /// Rows of nullable cells
    pub rows: Vec<Vec<Option<String>>>,
}

impl RawTable {
    /// Create a raw table from rows.
    pub fn new(rows: Vec<Vec<Option<String>>>) -> Self {
        Self { rows }
    }

    /// Create a raw table where every cell is present.
    pub fn from_strings<R, S>(rows: impl IntoIterator<Item = R>) -> Self
    where
        R: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            rows: rows
                .into_iter()
                .map(|row| row.into_iter().map(|c| Some(c.into())).collect())
                .collect(),
        }
    }
}

/// A cleaned and validated table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Table {
    /// Page number the table was found on (1-indexed)
    pub page: u32,

    /// Header cells, when the first row was taken as a header
    #[serde(skip_serializing_if = "Option::is_none")]
    pub headers: Option<Vec<String>>,

    /// Data rows
    #[serde(rename = "data")]
    pub rows: Vec<TableRow>,

    /// Bounding box of the source page
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bbox: Option<BBox>,
}

impl Table {
    /// Create a table of plain cell rows.
    pub fn new(page: u32, rows: Vec<TableRow>) -> Self {
        Self {
            page,
            headers: None,
            rows,
            bbox: None,
        }
    }

    /// Get the number of rows (excluding the header).
    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    /// Get the number of columns (based on first row).
    pub fn column_count(&self) -> usize {
        self.rows.first().map(|r| r.len()).unwrap_or(0)
    }

    /// Check if the table is empty.
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Iterate over every cell, header cells included.
    pub fn cells(&self) -> impl Iterator<Item = &str> {
        self.headers
            .iter()
            .flatten()
            .map(String::as_str)
            .chain(self.rows.iter().flat_map(|r| r.values()))
    }

    /// Check if any cell contains `keyword`, ignoring case.
    pub fn contains_keyword(&self, keyword: &str) -> bool {
        let needle = keyword.to_lowercase();
        self.cells().any(|c| c.to_lowercase().contains(&needle))
    }

    /// Get plain text representation of the table.
    pub fn plain_text(&self) -> String {
        let header = self.headers.as_ref().map(|h| h.join("\t"));
        header
            .into_iter()
            .chain(self.rows.iter().map(|r| r.values().collect::<Vec<_>>().join("\t")))
            .collect::<Vec<_>>()
            .join("\n")
    }
}

/// A table row: either ordered cells or a header-keyed record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum TableRow {
    /// Ordered cell values
    Cells(Vec<String>),
    /// Values keyed by column header
    Record(IndexMap<String, String>),
}

impl TableRow {
    /// Create a row from text values.
    pub fn from_strings<S: Into<String>>(values: impl IntoIterator<Item = S>) -> Self {
        TableRow::Cells(values.into_iter().map(Into::into).collect())
    }

    /// Number of cells in the row.
    pub fn len(&self) -> usize {
        match self {
            TableRow::Cells(cells) => cells.len(),
            TableRow::Record(record) => record.len(),
        }
    }

    /// Check if the row has no cells.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Cell value at a column position.
    pub fn get(&self, index: usize) -> Option<&str> {
        match self {
            TableRow::Cells(cells) => cells.get(index).map(String::as_str),
            TableRow::Record(record) => record.get_index(index).map(|(_, v)| v.as_str()),
        }
    }

    /// Iterate over cell values in column order.
    pub fn values(&self) -> Box<dyn Iterator<Item = &str> + '_> {
        match self {
            TableRow::Cells(cells) => Box::new(cells.iter().map(String::as_str)),
            TableRow::Record(record) => Box::new(record.values().map(String::as_str)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_table_shape() {
        let table = Table::new(
            1,
            vec![
                TableRow::from_strings(["Test", "Value"]),
                TableRow::from_strings(["WBC", "8.5"]),
            ],
        );
        assert_eq!(table.row_count(), 2);
        assert_eq!(table.column_count(), 2);
        assert_eq!(table.plain_text(), "Test\tValue\nWBC\t8.5");
    }

    #[test]
    fn test_contains_keyword_case_insensitive() {
        let table = Table::new(
            2,
            vec![
                TableRow::from_strings(["Laboratory Results", ""]),
                TableRow::from_strings(["WBC", "8.5"]),
            ],
        );
        assert!(table.contains_keyword("laboratory"));
        assert!(table.contains_keyword("wbc"));
        assert!(!table.contains_keyword("glucose"));
    }

    #[test]
    fn test_record_row_access() {
        let mut record = IndexMap::new();
        record.insert("Name".to_string(), "Alice".to_string());
        record.insert("Age".to_string(), "30".to_string());
        let row = TableRow::Record(record);

        assert_eq!(row.len(), 2);
        assert_eq!(row.get(1), Some("30"));
        assert_eq!(row.values().collect::<Vec<_>>(), vec!["Alice", "30"]);
    }

    #[test]
    fn test_row_serializes_untagged() {
        let row = TableRow::from_strings(["a", "b"]);
        assert_eq!(serde_json::to_string(&row).unwrap(), r#"["a","b"]"#);
    }
}
