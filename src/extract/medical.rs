//! Medical report extraction: patient info, vitals, labs, diagnoses and
//! medications.

use std::collections::BTreeMap;

use indexmap::{IndexMap, IndexSet};
use regex::Regex;
use serde::{Deserialize, Serialize};

use super::pattern::{CompiledField, FieldKind, FieldSpec, PatternTable, TypedValue, ValidRange};
use super::section::ItemFilter;
use super::{Extractor, ExtractorKind, Record};
use crate::error::Result;
use crate::model::{Document, Metadata, Table};

/// Field name for the patient identifier.
pub const PATIENT_ID: &str = "patient_id";
/// Field name for the exam date.
pub const DATE: &str = "date";
/// Field name for blood pressure.
pub const BLOOD_PRESSURE: &str = "blood_pressure";
/// Field name for heart rate.
pub const HEART_RATE: &str = "heart_rate";
/// Field name for body temperature.
pub const TEMPERATURE: &str = "temperature";

/// A laboratory analyte and its plausible value range.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalyteSpec {
    /// Analyte code as printed in reports (e.g. `WBC`)
    pub code: String,
    /// Accepted value range
    pub range: ValidRange,
}

impl AnalyteSpec {
    /// Create an analyte.
    pub fn new(code: impl Into<String>, min: f64, max: f64) -> Self {
        Self {
            code: code.into(),
            range: ValidRange::new(min, max),
        }
    }

    /// Scalar field that finds `<CODE>: <number>` in running text.
    fn to_field(&self) -> FieldSpec {
        FieldSpec {
            name: self.code.to_uppercase(),
            pattern: format!(r"\b{}:?\s*(\d+(?:\.\d+)?)", regex::escape(&self.code)),
            kind: FieldKind::Float,
            ranges: vec![self.range],
        }
    }
}

/// Patterns used to decompose a medication item.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MedicationPatterns {
    /// Leading capitalized words forming the drug name
    pub name: String,
    /// Dose amount with unit, optionally qualified by `per <n> <unit>`
    pub dosage: String,
    /// Dosing interval
    pub frequency: String,
}

impl Default for MedicationPatterns {
    fn default() -> Self {
        Self {
            name: r"^[A-Z][A-Za-z0-9]*(?:[ \t]+[A-Z][A-Za-z0-9]*)*".to_string(),
            dosage: r"\b(\d+(?:\.\d+)?\s*(?:mg|g|ml|mL|IU|units?)(?:\s+per\s+\d+(?:\.\d+)?\s*(?:mg|g|ml|mL|kg|L|hours?|days?|doses?))?)\b".to_string(),
            frequency: r"(?i)\b(?:q|every|take|administer)\s*(\d+)\s*(?:hours?|hrs?|h|days?|times?|weeks?)\b".to_string(),
        }
    }
}

/// Declarative configuration for [`MedicalExtractor`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MedicalConfig {
    /// Scalar fields searched in the document text
    pub fields: Vec<FieldSpec>,
    /// Recognized laboratory analytes
    pub analytes: Vec<AnalyteSpec>,
    /// Cell text identifying a laboratory results table
    pub lab_table_keywords: Vec<String>,
    /// Header aliases of the diagnosis section
    pub diagnosis_headers: Vec<String>,
    /// Header aliases of the medication section
    pub medication_headers: Vec<String>,
    /// Item filtering rules for both sections
    pub items: ItemFilter,
    /// Medication decomposition patterns
    pub medication: MedicationPatterns,
}

impl Default for MedicalConfig {
    fn default() -> Self {
        Self {
            fields: vec![
                FieldSpec::new(
                    PATIENT_ID,
                    r"\b(?:Patient ID|MRN):?\s*([A-Z0-9-]+)\b",
                    FieldKind::Text,
                ),
                FieldSpec::new(
                    DATE,
                    r"\b(?:Exam Date|Date):?\s*(\d{1,2}[/-]\d{1,2}[/-]\d{2,4})\b",
                    FieldKind::Date,
                ),
                FieldSpec::new(
                    BLOOD_PRESSURE,
                    r"\b(?:BP|B/P|Blood Pressure):?\s*(\d{2,3})\s*/\s*(\d{2,3})\s*(?:mmHg)?",
                    FieldKind::IntegerPair,
                )
                .with_range(60.0, 250.0)
                .with_range(40.0, 150.0),
                FieldSpec::new(
                    HEART_RATE,
                    r"\b(?:HR|Heart Rate|Pulse):?\s*(\d{2,3})\s*(?:bpm)?\b",
                    FieldKind::Integer,
                )
                .with_range(30.0, 250.0),
                FieldSpec::new(
                    TEMPERATURE,
                    r"\b(?:Temp|Temperature):?\s*(\d{2,3}\.\d)\s*(?:°[CF])?",
                    FieldKind::Float,
                )
                .with_range(35.0, 42.0),
            ],
            analytes: vec![
                AnalyteSpec::new("WBC", 2.0, 20.0),
                AnalyteSpec::new("RBC", 2.0, 8.0),
                AnalyteSpec::new("HGB", 5.0, 25.0),
                AnalyteSpec::new("HCT", 15.0, 65.0),
                AnalyteSpec::new("PLT", 20.0, 1000.0),
                AnalyteSpec::new("GLU", 20.0, 800.0),
                AnalyteSpec::new("NA", 110.0, 170.0),
                AnalyteSpec::new("K", 2.0, 8.0),
            ],
            lab_table_keywords: vec![
                "Laboratory Results".into(),
                "Lab Results".into(),
                "Lab Values".into(),
                "Laboratory Values".into(),
                "Blood Work".into(),
            ],
            diagnosis_headers: vec![
                "Diagnosis".into(),
                "Diagnoses".into(),
                "Assessment".into(),
                "Impression".into(),
            ],
            medication_headers: vec![
                "Medications".into(),
                "Current Medications".into(),
                "Prescriptions".into(),
            ],
            items: ItemFilter::default(),
            medication: MedicationPatterns::default(),
        }
    }
}

impl MedicalConfig {
    /// Load a configuration from JSON. Missing keys keep their defaults.
    pub fn from_json_str(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }
}

/// Patient identification fields.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct PatientInfo {
    /// Patient identifier or MRN
    #[serde(skip_serializing_if = "Option::is_none")]
    pub patient_id: Option<String>,
    /// Exam or report date, as written
    #[serde(skip_serializing_if = "Option::is_none")]
    pub date: Option<String>,
}

/// Systolic/diastolic pressure in mmHg.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct BloodPressure {
    /// Systolic pressure
    pub systolic: i64,
    /// Diastolic pressure
    pub diastolic: i64,
}

/// Validated vital signs.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct VitalSigns {
    /// Blood pressure
    #[serde(skip_serializing_if = "Option::is_none")]
    pub blood_pressure: Option<BloodPressure>,
    /// Heart rate in bpm
    #[serde(skip_serializing_if = "Option::is_none")]
    pub heart_rate: Option<i64>,
    /// Body temperature in °C
    #[serde(skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f64>,
}

/// A medication entry.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct Medication {
    /// Drug name
    pub name: String,
    /// Dose, as written
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dosage: Option<String>,
    /// Dosing interval, as written
    #[serde(skip_serializing_if = "Option::is_none")]
    pub frequency: Option<String>,
}

/// Output of [`MedicalExtractor`].
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct MedicalRecord {
    /// Document metadata
    pub metadata: Metadata,
    /// Patient identification
    pub patient_info: PatientInfo,
    /// Vital signs
    pub vital_signs: VitalSigns,
    /// Analyte code to value, as written
    pub lab_results: BTreeMap<String, String>,
    /// Distinct diagnoses
    pub diagnoses: Vec<String>,
    /// Medications with a name and a dose or interval
    pub medications: Vec<Medication>,
    /// Configured fields with no dedicated slot
    #[serde(skip_serializing_if = "IndexMap::is_empty")]
    pub other_fields: IndexMap<String, TypedValue>,
}

/// Extractor for clinical reports.
#[derive(Debug, Clone)]
pub struct MedicalExtractor {
    fields: PatternTable,
    analytes: Vec<CompiledField>,
    lab_table_keywords: Vec<String>,
    diagnosis_headers: Vec<String>,
    medication_headers: Vec<String>,
    items: ItemFilter,
    name_re: Regex,
    dosage_re: Regex,
    frequency_re: Regex,
}

impl MedicalExtractor {
    /// Create an extractor with the built-in tables.
    pub fn new() -> Result<Self> {
        Self::with_config(MedicalConfig::default())
    }

    /// Create an extractor from a configuration, compiling every pattern.
    pub fn with_config(config: MedicalConfig) -> Result<Self> {
        let analytes = config
            .analytes
            .iter()
            .map(|a| CompiledField::compile(a.to_field()))
            .collect::<Result<Vec<_>>>()?;

        Ok(Self {
            fields: PatternTable::compile(config.fields)?,
            analytes,
            lab_table_keywords: config.lab_table_keywords,
            diagnosis_headers: config.diagnosis_headers,
            medication_headers: config.medication_headers,
            items: config.items,
            name_re: Regex::new(&config.medication.name)?,
            dosage_re: Regex::new(&config.medication.dosage)?,
            frequency_re: Regex::new(&config.medication.frequency)?,
        })
    }

    /// Build the medical record for a document.
    pub fn extract_record(&self, doc: &Document) -> MedicalRecord {
        let mut record = MedicalRecord {
            metadata: doc.metadata.clone(),
            lab_results: self.extract_lab_results(doc),
            diagnoses: self.extract_diagnoses(doc),
            medications: self.extract_medications(doc),
            ..Default::default()
        };

        for (name, value) in self.fields.extract(&doc.full_text) {
            match (name.as_str(), value) {
                (PATIENT_ID, TypedValue::Text(id)) => record.patient_info.patient_id = Some(id),
                (DATE, TypedValue::Text(date)) => record.patient_info.date = Some(date),
                (BLOOD_PRESSURE, TypedValue::IntegerPair(systolic, diastolic)) => {
                    record.vital_signs.blood_pressure = Some(BloodPressure {
                        systolic,
                        diastolic,
                    })
                }
                (HEART_RATE, TypedValue::Integer(bpm)) => record.vital_signs.heart_rate = Some(bpm),
                (TEMPERATURE, value) if value.as_float().is_some() => {
                    record.vital_signs.temperature = value.as_float()
                }
                (_, value) => {
                    record.other_fields.insert(name.clone(), value);
                }
            }
        }

        record
    }

    /// Lab values from running text and from recognized lab tables.
    ///
    /// Table values replace text values for the same analyte.
    pub fn extract_lab_results(&self, doc: &Document) -> BTreeMap<String, String> {
        let mut results = BTreeMap::new();

        for analyte in &self.analytes {
            if let Some(field) = analyte.evaluate(&doc.full_text).filter(|f| f.valid) {
                if let Some(caps) = analyte.regex().captures(&field.raw_match) {
                    if let Some(value) = caps.get(1) {
                        results.insert(analyte.name().to_string(), value.as_str().to_string());
                    }
                }
            }
        }

        for table in self.lab_tables(doc) {
            for row in &table.rows {
                let (Some(code), Some(value)) = (row.get(0), row.get(1)) else {
                    continue;
                };
                let code = code.trim().to_uppercase();
                let Some(analyte) = self.analytes.iter().find(|a| a.name() == code) else {
                    continue;
                };
                if analyte.validate_value(value).is_some() {
                    results.insert(code, value.trim().to_string());
                } else {
                    log::debug!("lab table: dropping {} = '{}'", code, value);
                }
            }
        }

        results
    }

    /// Distinct diagnosis items across all diagnosis header aliases.
    pub fn extract_diagnoses(&self, doc: &Document) -> Vec<String> {
        let mut diagnoses = IndexSet::new();
        for header in &self.diagnosis_headers {
            if let Some(body) = self.extract_text_by_section(doc, header) {
                diagnoses.extend(self.items.filter(&body).into_iter().map(str::to_string));
            }
        }
        diagnoses.into_iter().collect()
    }

    /// Medication entries across all medication header aliases.
    pub fn extract_medications(&self, doc: &Document) -> Vec<Medication> {
        let mut medications = IndexSet::new();
        for header in &self.medication_headers {
            if let Some(body) = self.extract_text_by_section(doc, header) {
                medications.extend(
                    self.items
                        .filter(&body)
                        .into_iter()
                        .filter_map(|item| self.parse_medication(item)),
                );
            }
        }
        medications.into_iter().collect()
    }

    /// Decompose one medication item.
    ///
    /// Requires a name and at least one of dosage or frequency.
    pub fn parse_medication(&self, item: &str) -> Option<Medication> {
        let name = self.name_re.find(item)?.as_str().trim();
        if name.is_empty() || self.items.mentions_stopword(name) {
            return None;
        }

        let dosage = self
            .dosage_re
            .captures(item)
            .and_then(|c| c.get(1).or_else(|| c.get(0)))
            .map(|m| m.as_str().trim().to_string());
        let frequency = self
            .frequency_re
            .find(item)
            .map(|m| m.as_str().trim().to_string());

        if dosage.is_none() && frequency.is_none() {
            return None;
        }

        Some(Medication {
            name: name.to_string(),
            dosage,
            frequency,
        })
    }

    fn lab_tables<'d>(&self, doc: &'d Document) -> Vec<&'d Table> {
        let mut tables: Vec<&Table> = Vec::new();
        for keyword in &self.lab_table_keywords {
            for table in self.extract_tables_by_keyword(doc, keyword) {
                if !tables.iter().any(|t| std::ptr::eq(*t, table)) {
                    tables.push(table);
                }
            }
        }
        tables
    }
}

impl Extractor for MedicalExtractor {
    fn kind(&self) -> ExtractorKind {
        ExtractorKind::Medical
    }

    fn extract(&self, doc: &Document) -> Record {
        Record::Medical(self.extract_record(doc))
    }
}
