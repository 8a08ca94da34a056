//! Configuration-driven scalar field extraction.
//!
//! Each field is a named regular expression, a value kind and an optional
//! inclusive range per numeric component. Only the first match of a field is
//! considered. A value that fails to parse is dropped; a value outside its
//! range is reported with `valid == false` and never reaches a record.

use indexmap::IndexMap;
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::model::parse_text_date;

/// How a field's captured text is typed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FieldKind {
    /// Capture kept as text
    Text,
    /// Capture kept as text, but it must parse as a calendar date
    Date,
    /// Signed integer
    Integer,
    /// Floating point number
    Float,
    /// Two integers from capture groups 1 and 2 (e.g. `120/80`)
    IntegerPair,
}

/// Inclusive numeric bounds.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ValidRange {
    /// Lower bound
    pub min: f64,
    /// Upper bound
    pub max: f64,
}

impl ValidRange {
    /// Create a range.
    pub const fn new(min: f64, max: f64) -> Self {
        Self { min, max }
    }

    /// Check if `value` lies within the bounds.
    pub fn contains(&self, value: f64) -> bool {
        value >= self.min && value <= self.max
    }
}

/// Declarative description of one field.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldSpec {
    /// Field name, used as the output key
    pub name: String,
    /// Regular expression; capture group 1 (and 2 for pairs) holds the value
    pub pattern: String,
    /// Value type
    pub kind: FieldKind,
    /// One range per numeric component; missing ranges are not checked
    #[serde(default)]
    pub ranges: Vec<ValidRange>,
}

impl FieldSpec {
    /// Create a field without range checks.
    pub fn new(name: impl Into<String>, pattern: impl Into<String>, kind: FieldKind) -> Self {
        Self {
            name: name.into(),
            pattern: pattern.into(),
            kind,
            ranges: Vec::new(),
        }
    }

    /// Add a range for the next numeric component.
    pub fn with_range(mut self, min: f64, max: f64) -> Self {
        self.ranges.push(ValidRange::new(min, max));
        self
    }
}

/// A typed field value.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum TypedValue {
    /// Text value
    Text(String),
    /// Integer value
    Integer(i64),
    /// Floating point value
    Float(f64),
    /// Pair of integers
    IntegerPair(i64, i64),
}

impl TypedValue {
    /// Numeric components checked against ranges.
    pub fn components(&self) -> Vec<f64> {
        match self {
            TypedValue::Text(_) => vec![],
            TypedValue::Integer(v) => vec![*v as f64],
            TypedValue::Float(v) => vec![*v],
            TypedValue::IntegerPair(a, b) => vec![*a as f64, *b as f64],
        }
    }

    /// Text value, if this is text.
    pub fn as_text(&self) -> Option<&str> {
        match self {
            TypedValue::Text(s) => Some(s),
            _ => None,
        }
    }

    /// Integer value, if this is an integer.
    pub fn as_integer(&self) -> Option<i64> {
        match self {
            TypedValue::Integer(v) => Some(*v),
            _ => None,
        }
    }

    /// Float value; integers are widened.
    pub fn as_float(&self) -> Option<f64> {
        match self {
            TypedValue::Float(v) => Some(*v),
            TypedValue::Integer(v) => Some(*v as f64),
            _ => None,
        }
    }

    /// Integer pair, if this is a pair.
    pub fn as_pair(&self) -> Option<(i64, i64)> {
        match self {
            TypedValue::IntegerPair(a, b) => Some((*a, *b)),
            _ => None,
        }
    }
}

/// Result of evaluating one field against a text.
#[derive(Debug, Clone, PartialEq)]
pub struct ExtractedField {
    /// Field name
    pub name: String,
    /// Full text of the match
    pub raw_match: String,
    /// Parsed value
    pub value: TypedValue,
    /// Whether every numeric component passed its range
    pub valid: bool,
}

/// A field with its pattern compiled.
#[derive(Debug, Clone)]
pub struct CompiledField {
    spec: FieldSpec,
    regex: Regex,
}

impl CompiledField {
    /// Compile a field specification.
    pub fn compile(spec: FieldSpec) -> Result<Self> {
        let regex = Regex::new(&spec.pattern)?;
        if spec.kind == FieldKind::IntegerPair && regex.captures_len() < 3 {
            return Err(Error::Config(format!(
                "field '{}' needs two capture groups",
                spec.name
            )));
        }
        Ok(Self { spec, regex })
    }

    /// Field name.
    pub fn name(&self) -> &str {
        &self.spec.name
    }

    /// Field specification.
    pub fn spec(&self) -> &FieldSpec {
        &self.spec
    }

    /// Compiled pattern.
    pub fn regex(&self) -> &Regex {
        &self.regex
    }

    /// Evaluate the first match of the field in `text`.
    ///
    /// Returns `None` if nothing matches or the capture does not parse.
    pub fn evaluate(&self, text: &str) -> Option<ExtractedField> {
        let caps = self.regex.captures(text)?;
        let raw_match = caps.get(0)?.as_str();
        let group = |i: usize| caps.get(i).map(|m| m.as_str().trim());
        let primary = group(1).unwrap_or(raw_match.trim());

        let value = match self.parse_value(primary, group(2)) {
            Some(value) => value,
            None => {
                log::debug!(
                    "field '{}': could not parse '{}' as {:?}",
                    self.spec.name,
                    raw_match,
                    self.spec.kind
                );
                return None;
            }
        };

        let valid = value
            .components()
            .iter()
            .zip(&self.spec.ranges)
            .all(|(v, range)| range.contains(*v));
        if !valid {
            log::debug!(
                "field '{}': {:?} outside {:?}",
                self.spec.name,
                value,
                self.spec.ranges
            );
        }

        Some(ExtractedField {
            name: self.spec.name.clone(),
            raw_match: raw_match.to_string(),
            value,
            valid,
        })
    }

    /// First valid value of the field in `text`.
    pub fn value(&self, text: &str) -> Option<TypedValue> {
        self.evaluate(text)
            .filter(|field| field.valid)
            .map(|field| field.value)
    }

    /// Check a standalone value (e.g. a table cell) against this field's
    /// type and ranges, without running the pattern.
    pub fn validate_value(&self, raw: &str) -> Option<TypedValue> {
        let value = self.parse_value(raw.trim(), None)?;
        value
            .components()
            .iter()
            .zip(&self.spec.ranges)
            .all(|(v, range)| range.contains(*v))
            .then_some(value)
    }

    fn parse_value(&self, primary: &str, second: Option<&str>) -> Option<TypedValue> {
        match self.spec.kind {
            FieldKind::Text => (!primary.is_empty()).then(|| TypedValue::Text(primary.to_string())),
            FieldKind::Date => {
                parse_text_date(primary).map(|_| TypedValue::Text(primary.to_string()))
            }
            FieldKind::Integer => primary.parse().ok().map(TypedValue::Integer),
            FieldKind::Float => primary.parse().ok().map(TypedValue::Float),
            FieldKind::IntegerPair => {
                let first = primary.parse().ok()?;
                let second = second?.parse().ok()?;
                Some(TypedValue::IntegerPair(first, second))
            }
        }
    }
}

/// An ordered set of compiled fields.
#[derive(Debug, Clone, Default)]
pub struct PatternTable {
    fields: Vec<CompiledField>,
}

impl PatternTable {
    /// Compile every field specification.
    pub fn compile(specs: impl IntoIterator<Item = FieldSpec>) -> Result<Self> {
        let fields = specs
            .into_iter()
            .map(CompiledField::compile)
            .collect::<Result<Vec<_>>>()?;
        Ok(Self { fields })
    }

    /// Number of fields.
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    /// Check if the table has no fields.
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Look up a field by name.
    pub fn get(&self, name: &str) -> Option<&CompiledField> {
        self.fields.iter().find(|f| f.name() == name)
    }

    /// Iterate over the fields in declaration order.
    pub fn iter(&self) -> impl Iterator<Item = &CompiledField> {
        self.fields.iter()
    }

    /// Evaluate every field, including ones that failed validation.
    pub fn evaluate_all(&self, text: &str) -> Vec<ExtractedField> {
        self.fields.iter().filter_map(|f| f.evaluate(text)).collect()
    }

    /// Valid values keyed by field name, in declaration order.
    pub fn extract(&self, text: &str) -> IndexMap<String, TypedValue> {
        self.evaluate_all(text)
            .into_iter()
            .filter(|f| f.valid)
            .map(|f| (f.name, f.value))
            .collect()
    }
}

/// Find every match of `pattern` in `text`.
///
/// Returns capture group 1 when the pattern has groups, otherwise the whole
/// match. Non-participating groups yield empty strings.
pub fn find_pattern(pattern: &Regex, text: &str) -> Vec<String> {
    if pattern.captures_len() > 1 {
        pattern
            .captures_iter(text)
            .map(|caps| {
                caps.get(1)
                    .map(|m| m.as_str().to_string())
                    .unwrap_or_default()
            })
            .collect()
    } else {
        pattern
            .find_iter(text)
            .map(|m| m.as_str().to_string())
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn blood_pressure() -> CompiledField {
        CompiledField::compile(
            FieldSpec::new(
                "blood_pressure",
                r"\b(?:BP|Blood Pressure):?\s*(\d{2,3})/(\d{2,3})",
                FieldKind::IntegerPair,
            )
            .with_range(60.0, 250.0)
            .with_range(40.0, 150.0),
        )
        .unwrap()
    }

    #[test]
    fn test_pair_in_range() {
        let field = blood_pressure().evaluate("BP: 120/80 mmHg").unwrap();
        assert!(field.valid);
        assert_eq!(field.value, TypedValue::IntegerPair(120, 80));
        assert_eq!(field.raw_match, "BP: 120/80");
    }

    #[test]
    fn test_pair_out_of_range() {
        let field = blood_pressure().evaluate("BP: 400/80").unwrap();
        assert!(!field.valid);
        assert!(blood_pressure().value("BP: 400/80").is_none());
    }

    #[test]
    fn test_second_component_checked() {
        assert!(blood_pressure().value("BP: 120/20").is_none());
    }

    #[test]
    fn test_first_match_is_authoritative() {
        // A later in-range reading does not replace a rejected first one.
        assert!(blood_pressure()
            .value("BP: 300/80 then BP: 120/80")
            .is_none());
    }

    #[test]
    fn test_range_bounds_inclusive() {
        let hr = CompiledField::compile(
            FieldSpec::new("heart_rate", r"HR:?\s*(\d{2,3})", FieldKind::Integer)
                .with_range(30.0, 250.0),
        )
        .unwrap();
        assert_eq!(hr.value("HR: 30"), Some(TypedValue::Integer(30)));
        assert_eq!(hr.value("HR: 250"), Some(TypedValue::Integer(250)));
        assert_eq!(hr.value("HR: 29"), None);
    }

    #[test]
    fn test_parse_failure_drops_field() {
        let field = CompiledField::compile(FieldSpec::new(
            "count",
            r"Count:\s*(\S+)",
            FieldKind::Integer,
        ))
        .unwrap();
        assert!(field.evaluate("Count: many").is_none());
    }

    #[test]
    fn test_date_kind_requires_calendar_date() {
        let field = CompiledField::compile(FieldSpec::new(
            "date",
            r"Date:?\s*(\d{1,2}[/-]\d{1,2}[/-]\d{2,4})",
            FieldKind::Date,
        ))
        .unwrap();
        assert_eq!(
            field.value("Date: 03/14/2024"),
            Some(TypedValue::Text("03/14/2024".to_string()))
        );
        assert!(field.value("Date: 44/44/2024").is_none());
    }

    #[test]
    fn test_pair_needs_two_groups() {
        let result = CompiledField::compile(FieldSpec::new(
            "bp",
            r"(\d+)/\d+",
            FieldKind::IntegerPair,
        ));
        assert!(matches!(result, Err(Error::Config(_))));
    }

    #[test]
    fn test_invalid_regex_rejected() {
        let result = PatternTable::compile(vec![FieldSpec::new("bad", "(", FieldKind::Text)]);
        assert!(matches!(result, Err(Error::Pattern(_))));
    }

    #[test]
    fn test_validate_value() {
        let wbc = CompiledField::compile(
            FieldSpec::new("WBC", r"\bWBC:?\s*(\d+(?:\.\d+)?)", FieldKind::Float)
                .with_range(2.0, 20.0),
        )
        .unwrap();
        assert_eq!(wbc.validate_value(" 8.5 "), Some(TypedValue::Float(8.5)));
        assert_eq!(wbc.validate_value("9999"), None);
        assert_eq!(wbc.validate_value("high"), None);
    }

    #[test]
    fn test_table_extract_keeps_only_valid() {
        let table = PatternTable::compile(vec![
            FieldSpec::new("hr", r"HR:\s*(\d+)", FieldKind::Integer).with_range(30.0, 250.0),
            FieldSpec::new("temp", r"Temp:\s*(\d+\.\d)", FieldKind::Float).with_range(35.0, 42.0),
            FieldSpec::new("id", r"ID:\s*([A-Z0-9-]+)", FieldKind::Text),
        ])
        .unwrap();

        let values = table.extract("ID: X-9 HR: 72 Temp: 98.6");
        assert_eq!(values.len(), 2);
        assert_eq!(values.get("hr"), Some(&TypedValue::Integer(72)));
        assert_eq!(values.get("id"), Some(&TypedValue::Text("X-9".to_string())));
        assert!(!values.contains_key("temp"));

        assert_eq!(table.evaluate_all("ID: X-9 HR: 72 Temp: 98.6").len(), 3);
    }

    #[test]
    fn test_find_pattern_groups() {
        let with_group = Regex::new(r"HR:\s*(\d+)").unwrap();
        assert_eq!(find_pattern(&with_group, "HR: 72, HR: 80"), vec!["72", "80"]);

        let whole = Regex::new(r"\d+%").unwrap();
        assert_eq!(find_pattern(&whole, "up 5% and 12%"), vec!["5%", "12%"]);

        assert!(find_pattern(&whole, "none").is_empty());
    }
}
