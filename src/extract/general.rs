//! General-purpose document extraction.

use regex::Regex;
use serde::{Deserialize, Serialize};

use super::{Extractor, ExtractorKind, Record};
use crate::error::Result;
use crate::model::{Document, Metadata, Table};
use crate::parser::apply_header_row;

/// Patterns used by [`GeneralExtractor`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneralConfig {
    /// Numeric dates
    pub date: String,
    /// Email addresses
    pub email: String,
    /// Phone numbers
    pub phone: String,
    /// URLs
    pub url: String,
    /// Currency amounts
    pub currency: String,
    /// Percentages
    pub percentage: String,
    /// Heading line prefix
    pub heading: String,
    /// List item line
    pub list_item: String,
    /// Marker stripped from the front of a list item
    pub list_marker: String,
    /// Citation marker such as `[3]`
    pub citation: String,
    /// Other reference styles, matched anywhere in the text
    pub references: Vec<String>,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            date: r"\b(?:\d{1,2}[/-]\d{1,2}[/-]\d{2,4}|\d{4}[/-]\d{1,2}[/-]\d{1,2})\b".into(),
            email: r"\b[A-Za-z0-9._%+-]+@[A-Za-z0-9.-]+\.[A-Za-z]{2,}\b".into(),
            phone: r"(?:\+\d{1,3}[-.\s]?)?(?:\(\d{3}\)|\b\d{3})[-.\s]?\d{3}[-.\s]?\d{4}\b".into(),
            url: r"https?://(?:[-\w.]|%[\da-fA-F]{2})+".into(),
            currency: r"\$\s*\d+(?:,\d{3})*(?:\.\d{2})?|\b\d+(?:,\d{3})*(?:\.\d{2})?\s*(?:USD|EUR|GBP)\b"
                .into(),
            percentage: r"\b\d+(?:\.\d+)?%".into(),
            heading: r"^[A-Z][A-Za-z\s]+[:.]".into(),
            list_item: r"^(?:\d+\.|\*|-|•)\s+[A-Za-z]".into(),
            list_marker: r"^(?:\d+\.|\*|-|•)\s+".into(),
            citation: r"\[\d+\]".into(),
            references: vec![
                r"\(\d{4}\)[^)]*".into(),
                r"[A-Z][a-z]+ et al\., \d{4}".into(),
                r"https?://[^\s]+".into(),
            ],
        }
    }
}

impl GeneralConfig {
    /// Load a configuration from JSON. Missing keys keep their defaults.
    pub fn from_json_str(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }
}

/// Scalar facts found anywhere in the text.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct DocumentInfo {
    /// Dates
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub dates: Vec<String>,
    /// Email addresses
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub emails: Vec<String>,
    /// URLs
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub urls: Vec<String>,
    /// Currency amounts
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub currencies: Vec<String>,
    /// Percentages
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub percentages: Vec<String>,
}

/// A heading with the lines that follow it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HeadedSection {
    /// Heading text without its trailing `:` or `.`
    pub heading: String,
    /// Content lines joined by `\n`
    pub content: String,
}

/// Headings and the sections they introduce.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ContentStructure {
    /// Every heading, in order
    pub headings: Vec<String>,
    /// Headings that have content
    pub sections: Vec<HeadedSection>,
}

/// Kind of list marker.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ListKind {
    /// `*`, `-` or `•`
    Bullet,
    /// `1.`, `2.`, ...
    Numbered,
}

/// A run of list items sharing a marker kind.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct List {
    /// Marker kind
    #[serde(rename = "type")]
    pub kind: ListKind,
    /// Items with markers stripped
    pub items: Vec<String>,
}

/// A citation or reference.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Reference {
    /// Matched text
    pub text: String,
    /// First URL inside the text
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
}

/// Contact details found in the text.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ContactInfo {
    /// Email addresses
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub emails: Vec<String>,
    /// Phone numbers
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub phones: Vec<String>,
    /// URLs
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub urls: Vec<String>,
}

/// Output of [`GeneralExtractor`].
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct GeneralRecord {
    /// Document metadata
    pub metadata: Metadata,
    /// Scalar facts
    pub document_info: DocumentInfo,
    /// Headings and sections
    pub content_structure: ContentStructure,
    /// Tables with their first row as header
    pub tables: Vec<Table>,
    /// Lists
    pub lists: Vec<List>,
    /// References and citations
    pub references: Vec<Reference>,
    /// Contact details
    pub contact_info: ContactInfo,
}

/// Extractor for arbitrary documents.
#[derive(Debug, Clone)]
pub struct GeneralExtractor {
    date: Regex,
    email: Regex,
    phone: Regex,
    url: Regex,
    currency: Regex,
    percentage: Regex,
    heading: Regex,
    list_item: Regex,
    list_marker: Regex,
    citation: Regex,
    references: Vec<Regex>,
}

impl GeneralExtractor {
    /// Create an extractor with the built-in patterns.
    pub fn new() -> Result<Self> {
        Self::with_config(GeneralConfig::default())
    }

    /// Create an extractor from a configuration, compiling every pattern.
    pub fn with_config(config: GeneralConfig) -> Result<Self> {
        Ok(Self {
            date: Regex::new(&config.date)?,
            email: Regex::new(&config.email)?,
            phone: Regex::new(&config.phone)?,
            url: Regex::new(&config.url)?,
            currency: Regex::new(&config.currency)?,
            percentage: Regex::new(&config.percentage)?,
            heading: Regex::new(&config.heading)?,
            list_item: Regex::new(&config.list_item)?,
            list_marker: Regex::new(&config.list_marker)?,
            citation: Regex::new(&config.citation)?,
            references: config
                .references
                .iter()
                .map(|p| Regex::new(p))
                .collect::<std::result::Result<Vec<_>, _>>()?,
        })
    }

    /// Build the general record for a document.
    pub fn extract_record(&self, doc: &Document) -> GeneralRecord {
        let text = &doc.full_text;
        GeneralRecord {
            metadata: doc.metadata.clone(),
            document_info: self.extract_document_info(text),
            content_structure: self.extract_structure(text),
            tables: doc.tables().map(apply_header_row).collect(),
            lists: self.extract_lists(text),
            references: self.extract_references(text),
            contact_info: self.extract_contact_info(text),
        }
    }

    /// Dates, emails, urls, currencies and percentages.
    pub fn extract_document_info(&self, text: &str) -> DocumentInfo {
        DocumentInfo {
            dates: self.find_pattern(&self.date, text),
            emails: self.find_pattern(&self.email, text),
            urls: self.find_pattern(&self.url, text),
            currencies: self.find_pattern(&self.currency, text),
            percentages: self.find_pattern(&self.percentage, text),
        }
    }

    /// Headings and the content lines under each.
    ///
    /// A heading line's remainder after the `:` or `.` becomes the first
    /// content line. Lines before the first heading are ignored.
    pub fn extract_structure(&self, text: &str) -> ContentStructure {
        let mut structure = ContentStructure::default();
        let mut current: Option<(String, Vec<String>)> = None;

        for line in text.lines().map(str::trim).filter(|l| !l.is_empty()) {
            if let Some(m) = self.heading.find(line) {
                if let Some(section) = current.take().and_then(close_section) {
                    structure.sections.push(section);
                }
                let heading = m.as_str().trim_end_matches([':', '.']).trim().to_string();
                let rest = line[m.end()..].trim();
                let content = if rest.is_empty() {
                    Vec::new()
                } else {
                    vec![rest.to_string()]
                };
                structure.headings.push(heading.clone());
                current = Some((heading, content));
            } else if let Some((_, content)) = current.as_mut() {
                content.push(line.to_string());
            }
        }

        if let Some(section) = current.and_then(close_section) {
            structure.sections.push(section);
        }
        structure
    }

    /// Runs of consecutive list items of the same marker kind.
    ///
    /// A plain line following an item continues that item. A blank line or a
    /// heading closes the list.
    pub fn extract_lists(&self, text: &str) -> Vec<List> {
        let mut lists = Vec::new();
        let mut current: Option<List> = None;

        for line in text.lines().map(str::trim) {
            if line.is_empty() {
                lists.extend(current.take());
                continue;
            }

            if !self.list_item.is_match(line) {
                if self.heading.is_match(line) {
                    lists.extend(current.take());
                } else if let Some(last) = current.as_mut().and_then(|l| l.items.last_mut()) {
                    last.push(' ');
                    last.push_str(line);
                }
                continue;
            }

            let kind = if line.starts_with(['*', '-', '•']) {
                ListKind::Bullet
            } else {
                ListKind::Numbered
            };
            let item = self.list_marker.replace(line, "").into_owned();

            match current.as_mut() {
                Some(list) if list.kind == kind => list.items.push(item),
                _ => {
                    lists.extend(current.take());
                    current = Some(List {
                        kind,
                        items: vec![item],
                    });
                }
            }
        }

        lists.extend(current);
        lists
    }

    /// Citations, dated parentheticals, author-year mentions and URLs.
    ///
    /// A `[n]` citation runs until the next marker on the same line or the
    /// end of the line.
    pub fn extract_references(&self, text: &str) -> Vec<Reference> {
        let mut texts = Vec::new();

        for line in text.lines() {
            let starts: Vec<usize> = self.citation.find_iter(line).map(|m| m.start()).collect();
            for (i, start) in starts.iter().enumerate() {
                let end = starts.get(i + 1).copied().unwrap_or(line.len());
                texts.push(line[*start..end].trim());
            }
        }
        for pattern in &self.references {
            texts.extend(pattern.find_iter(text).map(|m| m.as_str().trim()));
        }

        texts
            .into_iter()
            .filter(|t| !t.is_empty())
            .map(|t| Reference {
                text: t.to_string(),
                url: self.url.find(t).map(|m| m.as_str().to_string()),
            })
            .collect()
    }

    /// Emails, phone numbers and urls.
    pub fn extract_contact_info(&self, text: &str) -> ContactInfo {
        ContactInfo {
            emails: self.find_pattern(&self.email, text),
            phones: self.find_pattern(&self.phone, text),
            urls: self.find_pattern(&self.url, text),
        }
    }
}

fn close_section((heading, content): (String, Vec<String>)) -> Option<HeadedSection> {
    (!content.is_empty()).then(|| HeadedSection {
        heading,
        content: content.join("\n"),
    })
}

impl Extractor for GeneralExtractor {
    fn kind(&self) -> ExtractorKind {
        ExtractorKind::General
    }

    fn extract(&self, doc: &Document) -> Record {
        Record::General(self.extract_record(doc))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Page, TableRow};

    fn extractor() -> GeneralExtractor {
        GeneralExtractor::new().unwrap()
    }

    #[test]
    fn test_document_info() {
        let text = "Invoice dated 2024-03-01, due 04/01/2024.\n\
                    Total $1,250.00 or 1200 EUR, discount 12.5%.\n\
                    Contact billing@example.com or visit https://example.com/pay";
        let info = extractor().extract_document_info(text);
        assert_eq!(info.dates, vec!["2024-03-01", "04/01/2024"]);
        assert_eq!(info.currencies, vec!["$1,250.00", "1200 EUR"]);
        assert_eq!(info.percentages, vec!["12.5%"]);
        assert_eq!(info.emails, vec!["billing@example.com"]);
        assert_eq!(info.urls, vec!["https://example.com"]);
    }

    #[test]
    fn test_empty_categories_omitted() {
        let info = extractor().extract_document_info("nothing here");
        assert_eq!(serde_json::to_string(&info).unwrap(), "{}");
    }

    #[test]
    fn test_structure() {
        let text = "preamble line\nIntroduction:\nFirst line\nSecond line\nMethods: sampled weekly\nResults:\n";
        let structure = extractor().extract_structure(text);
        assert_eq!(structure.headings, vec!["Introduction", "Methods", "Results"]);
        assert_eq!(structure.sections.len(), 2);
        assert_eq!(structure.sections[0].content, "First line\nSecond line");
        assert_eq!(structure.sections[1].heading, "Methods");
        assert_eq!(structure.sections[1].content, "sampled weekly");
    }

    #[test]
    fn test_lists_grouped_by_kind() {
        let text = "Steps\n1. Open the valve\n2. Wait\n- bullet one\n- bullet two\nNotes:\n* after break";
        let lists = extractor().extract_lists(text);
        assert_eq!(lists.len(), 3);
        assert_eq!(lists[0].kind, ListKind::Numbered);
        assert_eq!(lists[0].items, vec!["Open the valve", "Wait"]);
        assert_eq!(lists[1].kind, ListKind::Bullet);
        assert_eq!(lists[1].items, vec!["bullet one", "bullet two"]);
        assert_eq!(lists[2].items, vec!["after break"]);

        let json = serde_json::to_value(&lists[0]).unwrap();
        assert_eq!(json["type"], "numbered");
    }

    #[test]
    fn test_list_item_continues_on_next_line() {
        let lists = extractor().extract_lists("1. Open the valve\ncarefully and slowly\n2. Wait");
        assert_eq!(lists.len(), 1);
        assert_eq!(lists[0].items, vec!["Open the valve carefully and slowly", "Wait"]);
    }

    #[test]
    fn test_blank_line_closes_list() {
        let lists = extractor().extract_lists("- salt\n\ntrailing prose\n- pepper");
        assert_eq!(lists.len(), 2);
        assert_eq!(lists[0].items, vec!["salt"]);
        assert_eq!(lists[1].items, vec!["pepper"]);
    }

    #[test]
    fn test_custom_list_marker() {
        let config = GeneralConfig::from_json_str(
            r#"{"list_item": "^(?:[a-z]\\)|>)\\s+[A-Za-z]", "list_marker": "^(?:[a-z]\\)|>)\\s+"}"#,
        )
        .unwrap();
        let extractor = GeneralExtractor::with_config(config).unwrap();
        let lists = extractor.extract_lists("a) Stop\nb) Drop\n> Roll");
        assert_eq!(lists.len(), 1);
        assert_eq!(lists[0].kind, ListKind::Numbered);
        assert_eq!(lists[0].items, vec!["Stop", "Drop", "Roll"]);
    }

    #[test]
    fn test_references() {
        let text = "[1] Smith J. Layout analysis. [2] Doe A. https://doi.org/10.1/x\n\
                    As shown by Miller et al., 2019 and in the report (2021) draft";
        let refs = extractor().extract_references(text);
        let texts: Vec<&str> = refs.iter().map(|r| r.text.as_str()).collect();
        assert!(texts.contains(&"[1] Smith J. Layout analysis."));
        assert!(texts.contains(&"[2] Doe A. https://doi.org/10.1/x"));
        assert!(texts.contains(&"Miller et al., 2019"));
        assert!(texts.contains(&"(2021) draft"));
        assert!(texts.contains(&"https://doi.org/10.1/x"));

        let cited = refs.iter().find(|r| r.text.starts_with("[2]")).unwrap();
        assert_eq!(cited.url.as_deref(), Some("https://doi.org"));
        assert!(refs[0].url.is_none());
    }

    #[test]
    fn test_contact_info() {
        let info = extractor().extract_contact_info("Call (555) 123-4567 or +1 555.987.6543");
        assert_eq!(info.phones, vec!["(555) 123-4567", "+1 555.987.6543"]);
        assert!(info.emails.is_empty());
    }

    #[test]
    fn test_tables_use_header_row() {
        let mut page = Page::new(1, 612.0, 792.0);
        page.tables.push(Table::new(
            1,
            vec![
                TableRow::from_strings(["Item", "Qty"]),
                TableRow::from_strings(["Bolt", "4"]),
            ],
        ));
        let doc = Document {
            pages: vec![page],
            ..Default::default()
        };
        let record = extractor().extract_record(&doc);
        assert_eq!(record.tables.len(), 1);
        assert_eq!(
            record.tables[0].headers,
            Some(vec!["Item".to_string(), "Qty".to_string()])
        );
        let json = serde_json::to_value(&record.tables[0]).unwrap();
        assert_eq!(json["data"][0]["Qty"], "4");
    }

    #[test]
    fn test_custom_config() {
        let config = GeneralConfig::from_json_str(r#"{"percentage": "\\d+ percent"}"#).unwrap();
        let extractor = GeneralExtractor::with_config(config).unwrap();
        let info = extractor.extract_document_info("grew 40 percent, not 5%");
        assert_eq!(info.percentages, vec!["40 percent"]);
    }
}
