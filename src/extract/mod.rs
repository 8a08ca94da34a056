//! Field and record extraction from a reconstructed [`Document`].
//!
//! Two extractor variants exist: [`MedicalExtractor`] for clinical reports
//! and [`GeneralExtractor`] for anything else. Both implement [`Extractor`]
//! and are selected through [`ExtractorKind`].

pub mod general;
pub mod medical;
pub mod pattern;
pub mod section;

use std::fmt;
use std::str::FromStr;

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::model::{Document, Metadata, Table};

pub use general::{GeneralConfig, GeneralExtractor, GeneralRecord};
pub use medical::{MedicalConfig, MedicalExtractor, MedicalRecord, Medication};
pub use pattern::{
    find_pattern, CompiledField, ExtractedField, FieldKind, FieldSpec, PatternTable, TypedValue,
    ValidRange,
};
pub use section::{section_text, split_items, ItemFilter};

/// Capabilities shared by every extractor variant.
pub trait Extractor {
    /// Which variant this is.
    fn kind(&self) -> ExtractorKind;

    /// Build the record for a document.
    fn extract(&self, doc: &Document) -> Record;

    /// Every match of `pattern` in `text`.
    fn find_pattern(&self, pattern: &Regex, text: &str) -> Vec<String> {
        find_pattern(pattern, text)
    }

    /// Tables with a cell containing `keyword`, ignoring case.
    fn extract_tables_by_keyword<'d>(&self, doc: &'d Document, keyword: &str) -> Vec<&'d Table> {
        doc.tables_by_keyword(keyword)
    }

    /// Body of the section introduced by `header`.
    fn extract_text_by_section(&self, doc: &Document, header: &str) -> Option<String> {
        doc.section_text(header)
    }
}

/// Extractor variant.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExtractorKind {
    /// Clinical reports
    Medical,
    /// Arbitrary documents
    #[default]
    General,
}

impl ExtractorKind {
    /// All variants.
    pub const ALL: [ExtractorKind; 2] = [ExtractorKind::Medical, ExtractorKind::General];

    /// Variant name.
    pub fn as_str(&self) -> &'static str {
        match self {
            ExtractorKind::Medical => "medical",
            ExtractorKind::General => "general",
        }
    }
}

impl fmt::Display for ExtractorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ExtractorKind {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "medical" => Ok(ExtractorKind::Medical),
            "general" => Ok(ExtractorKind::General),
            other => Err(Error::Config(format!(
                "unknown extractor variant '{}' (expected medical or general)",
                other
            ))),
        }
    }
}

/// A constructed extractor of either variant.
#[derive(Debug, Clone)]
pub enum AnyExtractor {
    /// Medical variant
    Medical(MedicalExtractor),
    /// General variant
    General(GeneralExtractor),
}

impl AnyExtractor {
    /// Create the extractor for `kind` with its built-in tables.
    pub fn new(kind: ExtractorKind) -> Result<Self> {
        Ok(match kind {
            ExtractorKind::Medical => AnyExtractor::Medical(MedicalExtractor::new()?),
            ExtractorKind::General => AnyExtractor::General(GeneralExtractor::new()?),
        })
    }

    /// Create the extractor for `kind` from a JSON configuration.
    pub fn from_config_json(kind: ExtractorKind, json: &str) -> Result<Self> {
        Ok(match kind {
            ExtractorKind::Medical => AnyExtractor::Medical(MedicalExtractor::with_config(
                MedicalConfig::from_json_str(json)?,
            )?),
            ExtractorKind::General => AnyExtractor::General(GeneralExtractor::with_config(
                GeneralConfig::from_json_str(json)?,
            )?),
        })
    }
}

impl Extractor for AnyExtractor {
    fn kind(&self) -> ExtractorKind {
        match self {
            AnyExtractor::Medical(e) => e.kind(),
            AnyExtractor::General(e) => e.kind(),
        }
    }

    fn extract(&self, doc: &Document) -> Record {
        match self {
            AnyExtractor::Medical(e) => e.extract(doc),
            AnyExtractor::General(e) => e.extract(doc),
        }
    }
}

impl From<MedicalExtractor> for AnyExtractor {
    fn from(extractor: MedicalExtractor) -> Self {
        AnyExtractor::Medical(extractor)
    }
}

impl From<GeneralExtractor> for AnyExtractor {
    fn from(extractor: GeneralExtractor) -> Self {
        AnyExtractor::General(extractor)
    }
}

/// Output record of an extractor.
///
/// Serializes as the inner record without a variant tag.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Record {
    /// Medical record
    Medical(MedicalRecord),
    /// General record
    General(GeneralRecord),
}

impl Record {
    /// Variant that produced this record.
    pub fn kind(&self) -> ExtractorKind {
        match self {
            Record::Medical(_) => ExtractorKind::Medical,
            Record::General(_) => ExtractorKind::General,
        }
    }

    /// Document metadata carried by the record.
    pub fn metadata(&self) -> &Metadata {
        match self {
            Record::Medical(r) => &r.metadata,
            Record::General(r) => &r.metadata,
        }
    }

    /// The medical record, if this is one.
    pub fn as_medical(&self) -> Option<&MedicalRecord> {
        match self {
            Record::Medical(r) => Some(r),
            Record::General(_) => None,
        }
    }

    /// The general record, if this is one.
    pub fn as_general(&self) -> Option<&GeneralRecord> {
        match self {
            Record::General(r) => Some(r),
            Record::Medical(_) => None,
        }
    }
}
