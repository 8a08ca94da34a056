//! Document-level types.

use chrono::{DateTime, FixedOffset, NaiveDate, NaiveDateTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};

use super::{ImageRef, Page, RawPage, Table};

/// Separator placed between page texts in [`Document::full_text`].
///
/// Downstream section lookup treats it as the only block boundary.
pub const PAGE_SEPARATOR: &str = "\n\n";

/// A reconstructed document.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Document {
    /// Document metadata (title, author, etc.)
    pub metadata: Metadata,

    /// Pages in the document
    pub pages: Vec<Page>,

    /// Page texts joined by [`PAGE_SEPARATOR`]
    pub full_text: String,
}

impl Document {
    /// Create a new empty document.
    pub fn new() -> Self {
        Self::default()
    }

    /// Get the number of pages in the document.
    pub fn page_count(&self) -> u32 {
        self.pages.len() as u32
    }

    /// Get a page by number (1-indexed).
    pub fn get_page(&self, page_num: u32) -> Option<&Page> {
        if page_num == 0 {
            return None;
        }
        self.pages.get((page_num - 1) as usize)
    }

    /// Check if the document has any pages.
    pub fn is_empty(&self) -> bool {
        self.pages.is_empty()
    }

    /// All accepted tables, in page order.
    pub fn tables(&self) -> impl Iterator<Item = &Table> {
        self.pages.iter().flat_map(|p| p.tables.iter())
    }

    /// All images, in page order.
    pub fn images(&self) -> impl Iterator<Item = &ImageRef> {
        self.pages.iter().flat_map(|p| p.images.iter())
    }

    /// Tables with at least one cell containing `keyword` (ignoring case).
    pub fn tables_by_keyword(&self, keyword: &str) -> Vec<&Table> {
        crate::parser::tables_with_keyword(self.tables(), keyword)
    }

    /// Body of the section introduced by `header`, if any.
    ///
    /// See [`crate::extract::section_text`] for the lookup rules.
    pub fn section_text(&self, header: &str) -> Option<String> {
        crate::extract::section_text(&self.full_text, header)
    }
}

/// Document metadata as reported by the decoder.
///
/// Dates are kept as the raw strings found in the file; use
/// [`Metadata::created`] and [`Metadata::modified`] for parsed values.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Metadata {
    /// Document title
    pub title: Option<String>,

    /// Document author
    pub author: Option<String>,

    /// Document subject
    pub subject: Option<String>,

    /// Keywords
    pub keywords: Option<String>,

    /// Creator application
    pub creator: Option<String>,

    /// PDF producer
    pub producer: Option<String>,

    /// Creation date, raw
    pub creation_date: Option<String>,

    /// Last modification date, raw
    pub modification_date: Option<String>,
}

impl Metadata {
    /// Parsed creation date.
    pub fn created(&self) -> Option<DateTime<Utc>> {
        self.creation_date.as_deref().and_then(parse_pdf_date)
    }

    /// Parsed modification date.
    pub fn modified(&self) -> Option<DateTime<Utc>> {
        self.modification_date.as_deref().and_then(parse_pdf_date)
    }

    /// Check if no metadata field is set.
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}

/// Parse a PDF date string (`D:YYYYMMDDHHmmSSOHH'mm'`).
///
/// Every component after the year is optional. A missing offset is read as UTC.
pub fn parse_pdf_date(raw: &str) -> Option<DateTime<Utc>> {
    let s = raw.trim();
    let s = s.strip_prefix("D:").unwrap_or(s);

    let digits_len = s.chars().take_while(|c| c.is_ascii_digit()).count();
    if digits_len < 4 {
        return None;
    }
    let (digits, zone) = s.split_at(digits_len.min(14));

    let mut padded = digits.to_string();
    for default in ["01", "01", "00", "00", "00"].iter().skip((digits.len() - 4) / 2) {
        padded.push_str(default);
    }
    if padded.len() != 14 {
        return None;
    }

    let naive = NaiveDateTime::parse_from_str(&padded, "%Y%m%d%H%M%S").ok()?;
    let offset = parse_pdf_offset(zone)?;
    offset
        .from_local_datetime(&naive)
        .single()
        .map(|dt| dt.with_timezone(&Utc))
}

fn parse_pdf_offset(zone: &str) -> Option<FixedOffset> {
    let zone = zone.trim();
    if zone.is_empty() || zone.starts_with('Z') {
        return FixedOffset::east_opt(0);
    }

    let sign = match zone.chars().next()? {
        '+' => 1,
        '-' => -1,
        _ => return None,
    };
    let parts: Vec<i32> = zone[1..]
        .split('\'')
        .filter(|p| !p.is_empty())
        .map(|p| p.parse::<i32>())
        .collect::<std::result::Result<_, _>>()
        .ok()?;
    let hours = *parts.first()?;
    let minutes = parts.get(1).copied().unwrap_or(0);
    if !(0..=23).contains(&hours) || !(0..=59).contains(&minutes) {
        return None;
    }
    FixedOffset::east_opt(sign * (hours * 3600 + minutes * 60))
}

/// A decoded document held in memory: the decoder's complete output.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RawDocument {
    /// Document metadata
    #[serde(default)]
    pub metadata: Metadata,

    /// Decoded pages, in order
    #[serde(default)]
    pub pages: Vec<RawPage>,
}

impl RawDocument {
    /// Create an empty decoded document.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a page.
    pub fn add_page(&mut self, page: RawPage) {
        self.pages.push(page);
    }
}

/// Parse a plain calendar date used in body text.
///
/// Accepts the month-first, day-first and ISO layouts found in reports.
pub fn parse_text_date(raw: &str) -> Option<NaiveDate> {
    const FORMATS: &[&str] = &[
        "%m/%d/%Y", "%m-%d-%Y", "%m/%d/%y", "%m-%d-%y", "%d/%m/%Y", "%d-%m-%Y", "%Y-%m-%d",
        "%Y/%m/%d",
    ];
    let raw = raw.trim();
    FORMATS
        .iter()
        .find_map(|fmt| NaiveDate::parse_from_str(raw, fmt).ok())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Datelike, Timelike};

    #[test]
    fn test_document_new() {
        let doc = Document::new();
        assert!(doc.is_empty());
        assert_eq!(doc.page_count(), 0);
        assert!(doc.get_page(0).is_none());
        assert!(doc.get_page(1).is_none());
    }

    #[test]
    fn test_parse_pdf_date_full() {
        let dt = parse_pdf_date("D:20230115103000Z").unwrap();
        assert_eq!((dt.year(), dt.month(), dt.day()), (2023, 1, 15));
        assert_eq!((dt.hour(), dt.minute()), (10, 30));
    }

    #[test]
    fn test_parse_pdf_date_with_offset() {
        let dt = parse_pdf_date("D:20230115103000+05'30'").unwrap();
        assert_eq!((dt.hour(), dt.minute()), (5, 0));
    }

    #[test]
    fn test_parse_pdf_date_partial() {
        let dt = parse_pdf_date("D:2021").unwrap();
        assert_eq!((dt.year(), dt.month(), dt.day()), (2021, 1, 1));

        let dt = parse_pdf_date("20210704").unwrap();
        assert_eq!((dt.month(), dt.day()), (7, 4));
    }

    #[test]
    fn test_parse_pdf_date_invalid() {
        assert!(parse_pdf_date("yesterday").is_none());
        assert!(parse_pdf_date("D:20231345").is_none());
    }

    #[test]
    fn test_parse_pdf_date_bad_offset() {
        assert!(parse_pdf_date("D:20240101000000+99999999'").is_none());
        assert!(parse_pdf_date("D:20240101000000+24'00'").is_none());
        assert!(parse_pdf_date("D:20240101000000-05'60'").is_none());
        assert!(parse_pdf_date("D:20240101000000+99999999999'").is_none());

        let metadata = Metadata {
            creation_date: Some("D:20240101000000+99999999'".to_string()),
            ..Default::default()
        };
        assert!(metadata.created().is_none());
    }

    #[test]
    fn test_metadata_dates() {
        let metadata = Metadata {
            creation_date: Some("D:20240301".to_string()),
            ..Default::default()
        };
        assert!(metadata.created().is_some());
        assert!(metadata.modified().is_none());
        assert!(!metadata.is_empty());
        assert!(Metadata::default().is_empty());
    }

    #[test]
    fn test_parse_text_date() {
        assert!(parse_text_date("01/15/2024").is_some());
        assert!(parse_text_date("15/01/2024").is_some());
        assert!(parse_text_date("2024-01-15").is_some());
        assert!(parse_text_date("13/13/2024").is_none());
    }
}
