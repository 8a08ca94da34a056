//! # pdfscrape
//!
//! Structured data extraction from decoded PDF page geometry.
//!
//! A decoder hands over positioned words, candidate tables and images per
//! page. This crate rebuilds reading-order lines and sections, validates the
//! tables, and runs a declarative pattern engine over the result to produce a
//! typed record: vitals, lab values, diagnoses and medications for clinical
//! reports, or dates, contacts, headings, lists and references for anything
//! else.
//!
//! ## Quick Start
//!
//! ```no_run
//! use pdfscrape::{extract_file, render, ExtractorKind};
//!
//! fn main() -> pdfscrape::Result<()> {
//!     let record = extract_file("report.json", ExtractorKind::Medical)?;
//!     println!("{}", render::to_json(&record, render::JsonFormat::Pretty)?);
//!     Ok(())
//! }
//! ```
//!
//! ## Layout
//!
//! - [`parser`]: word clustering, table normalization and the
//!   [`PageSource`] decoder contract
//! - [`model`]: pages, tables, metadata and the reconstructed [`Document`]
//! - [`extract`]: the pattern engine and the medical/general extractors
//! - [`batch`]: best-effort extraction over a directory

pub mod batch;
pub mod error;
pub mod extract;
pub mod model;
pub mod parser;
pub mod render;

// Re-export commonly used types
pub use batch::{BatchFailure, BatchProcessor, BatchReport, ExtractionOutput};
pub use error::{Error, Result};
pub use extract::{
    AnyExtractor, Extractor, ExtractorKind, GeneralConfig, GeneralExtractor, GeneralRecord,
    MedicalConfig, MedicalExtractor, MedicalRecord, Record,
};
pub use model::{Document, Metadata, Page, RawDocument, RawPage, Table, TableRow, Word};
pub use parser::{DocumentParser, JsonSource, PageSelection, PageSource, ParseOptions};
pub use render::JsonFormat;

use std::path::Path;

/// Parse a decoded page dump into a [`Document`].
///
/// # Example
///
/// ```no_run
/// use pdfscrape::parse_file;
///
/// let doc = parse_file("scan.json").unwrap();
/// println!("Pages: {}", doc.page_count());
/// ```
pub fn parse_file<P: AsRef<Path>>(path: P) -> Result<Document> {
    DocumentParser::open(path)?.parse()
}

/// Parse a decoded page dump with custom options.
pub fn parse_file_with_options<P: AsRef<Path>>(path: P, options: ParseOptions) -> Result<Document> {
    DocumentParser::open_with_options(path, options)?.parse()
}

/// Extract the document text of a decoded page dump.
pub fn extract_text<P: AsRef<Path>>(path: P) -> Result<String> {
    DocumentParser::open(path)?.extract_text()
}

/// Parse a decoded page dump and run the extractor for `kind` over it.
pub fn extract_file<P: AsRef<Path>>(path: P, kind: ExtractorKind) -> Result<Record> {
    let doc = parse_file(path)?;
    extract_document(&doc, kind)
}

/// Run the extractor for `kind` over an already parsed document.
pub fn extract_document(doc: &Document, kind: ExtractorKind) -> Result<Record> {
    Ok(AnyExtractor::new(kind)?.extract(doc))
}

/// Builder for one-off extractions with custom settings.
///
/// # Example
///
/// ```no_run
/// use pdfscrape::{ExtractorKind, PdfScrape};
///
/// let record = PdfScrape::new()
///     .with_kind(ExtractorKind::General)
///     .with_table_headers()
///     .extract("brochure.json")
///     .unwrap();
/// ```
#[derive(Debug, Clone, Default)]
pub struct PdfScrape {
    kind: ExtractorKind,
    options: ParseOptions,
    config_json: Option<String>,
}

impl PdfScrape {
    /// Create a builder with default settings (general variant).
    pub fn new() -> Self {
        Self::default()
    }

    /// Select the extractor variant.
    pub fn with_kind(mut self, kind: ExtractorKind) -> Self {
        self.kind = kind;
        self
    }

    /// Replace the parsing options.
    pub fn with_options(mut self, options: ParseOptions) -> Self {
        self.options = options;
        self
    }

    /// Treat the first row of every table as its header.
    pub fn with_table_headers(mut self) -> Self {
        self.options = self.options.with_table_headers();
        self
    }

    /// Restrict parsing to the selected pages.
    pub fn with_pages(mut self, pages: PageSelection) -> Self {
        self.options = self.options.with_pages(pages);
        self
    }

    /// Use extractor tables loaded from a JSON configuration.
    pub fn with_config_json(mut self, json: impl Into<String>) -> Self {
        self.config_json = Some(json.into());
        self
    }

    /// Build the configured extractor.
    pub fn extractor(&self) -> Result<AnyExtractor> {
        match &self.config_json {
            Some(json) => AnyExtractor::from_config_json(self.kind, json),
            None => AnyExtractor::new(self.kind),
        }
    }

    /// Parse and extract a decoded page dump.
    pub fn extract<P: AsRef<Path>>(&self, path: P) -> Result<Record> {
        let extractor = self.extractor()?;
        let doc = parse_file_with_options(path, self.options.clone())?;
        Ok(extractor.extract(&doc))
    }

    /// Extract from any page source.
    pub fn extract_source<S: PageSource>(&self, source: S) -> Result<Record> {
        let extractor = self.extractor()?;
        let doc = DocumentParser::with_options(source, self.options.clone()).parse()?;
        Ok(extractor.extract(&doc))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::RawTable;
    use crate::parser::TableHeaderMode;

    fn report() -> RawDocument {
        let mut page = RawPage::letter(1);
        let mut top = 100.0;
        for line in ["Patient ID: P-77", "BP: 118/76 mmHg", "HR: 64 bpm"] {
            let mut x = 10.0;
            for w in line.split_whitespace() {
                page.words.push(Word::new(w, x, top, x + 30.0, top + 10.0));
                x += 35.0;
            }
            top += 14.0;
        }
        page.tables
            .push(RawTable::from_strings([["Lab Results", ""], ["K", "4.1"]]));

        let mut doc = RawDocument::new();
        doc.add_page(page);
        doc
    }

    #[test]
    fn test_builder_defaults() {
        let builder = PdfScrape::new();
        assert_eq!(builder.kind, ExtractorKind::General);
        assert_eq!(builder.options.header_mode, TableHeaderMode::Raw);
        assert!(builder.config_json.is_none());
    }

    #[test]
    fn test_builder_chained() {
        let builder = PdfScrape::new()
            .with_kind(ExtractorKind::Medical)
            .with_table_headers()
            .with_pages(PageSelection::Pages(vec![1]));
        assert_eq!(builder.kind, ExtractorKind::Medical);
        assert_eq!(builder.options.header_mode, TableHeaderMode::FirstRowAsHeader);
        assert_eq!(builder.options.pages, PageSelection::Pages(vec![1]));
    }

    #[test]
    fn test_extract_source_medical() {
        let record = PdfScrape::new()
            .with_kind(ExtractorKind::Medical)
            .extract_source(report())
            .unwrap();
        let medical = record.as_medical().unwrap();
        assert_eq!(medical.patient_info.patient_id.as_deref(), Some("P-77"));
        assert_eq!(medical.vital_signs.heart_rate, Some(64));
        assert_eq!(medical.lab_results.get("K").map(String::as_str), Some("4.1"));
    }

    #[test]
    fn test_extract_document() {
        let doc = DocumentParser::new(report()).parse().unwrap();
        let record = extract_document(&doc, ExtractorKind::General).unwrap();
        assert!(record.as_general().is_some());
        assert_eq!(record.kind(), ExtractorKind::General);
    }

    #[test]
    fn test_extract_file_missing() {
        assert!(matches!(
            extract_file("/nonexistent/report.json", ExtractorKind::Medical),
            Err(Error::ResourceNotFound(_))
        ));
    }

    #[test]
    fn test_bad_config_json() {
        let result = PdfScrape::new()
            .with_config_json("not json")
            .extract_source(report());
        assert!(matches!(result, Err(Error::Decode(_))));
    }
}
