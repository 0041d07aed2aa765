//! Field readers over JSON objects
//!
//! A [`Fields`] wraps one JSON object and hands out typed values field by
//! field. Every failed lookup is recorded as a [`FieldIssue`] instead of
//! returning early, so a single validation pass reports all offending fields.

use super::Schema;
use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use serde_json::{Map, Value};
use std::fmt;

/// Unix timestamps above this magnitude are read as milliseconds
const MILLIS_THRESHOLD: f64 = 2e10;

/// Largest float that still converts to an `i64` without saturating
const I64_FLOAT_LIMIT: f64 = 9.2e18;

// ============================================================================
// Issues
// ============================================================================

/// What went wrong with a single field
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IssueKind {
    /// The body was not valid JSON
    Malformed(String),
    /// A required field is absent
    Missing,
    /// The field is present but cannot be read as the declared type
    InvalidType {
        /// Declared type
        expected: &'static str,
        /// JSON type actually found
        found: &'static str,
    },
    /// The value is outside a closed set
    UnknownVariant {
        /// Value received
        value: String,
        /// Accepted values
        allowed: &'static [&'static str],
    },
}

impl fmt::Display for IssueKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            IssueKind::Malformed(message) => write!(f, "malformed JSON ({message})"),
            IssueKind::Missing => f.write_str("missing required field"),
            IssueKind::InvalidType { expected, found } => {
                write!(f, "expected {expected}, found {found}")
            }
            IssueKind::UnknownVariant { value, allowed } => {
                write!(f, "unknown value '{value}', expected one of: {}", allowed.join(", "))
            }
        }
    }
}

/// A problem with one field, addressed by its path (`token`, `backlinks[2].flags`)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldIssue {
    /// Path of the offending field; `$` for the payload itself
    pub field: String,
    /// What went wrong
    pub kind: IssueKind,
}

impl FieldIssue {
    pub fn new(field: impl Into<String>, kind: IssueKind) -> Self {
        Self {
            field: field.into(),
            kind,
        }
    }
}

impl fmt::Display for FieldIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.field, self.kind)
    }
}

/// A response body that does not match its declared schema
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
#[error("Response does not match {schema}: {}", render_issues(.issues))]
pub struct SchemaValidationError {
    /// Name of the schema the payload was checked against
    pub schema: String,
    /// Every offending field found in the payload
    pub issues: Vec<FieldIssue>,
    /// The raw payload, kept for diagnosis
    pub payload: String,
}

impl SchemaValidationError {
    pub fn new(
        schema: impl Into<String>,
        issues: Vec<FieldIssue>,
        payload: impl Into<String>,
    ) -> Self {
        Self {
            schema: schema.into(),
            issues,
            payload: payload.into(),
        }
    }

    /// Paths of all offending fields
    pub fn fields(&self) -> Vec<&str> {
        self.issues.iter().map(|i| i.field.as_str()).collect()
    }

    /// Check whether a given field path was reported
    pub fn has_field(&self, field: &str) -> bool {
        self.issues.iter().any(|i| i.field == field)
    }
}

fn render_issues(issues: &[FieldIssue]) -> String {
    issues
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

// ============================================================================
// Closed sets
// ============================================================================

/// A string field restricted to a fixed set of values
pub trait Closed: Sized {
    /// Accepted wire values
    const VARIANTS: &'static [&'static str];

    /// Look up a variant by its wire value
    fn from_name(name: &str) -> Option<Self>;
}

// ============================================================================
// Field reader
// ============================================================================

/// Typed access to the fields of one JSON object
pub struct Fields<'a> {
    object: &'a Map<String, Value>,
    path: &'a str,
    issues: &'a mut Vec<FieldIssue>,
}

impl<'a> Fields<'a> {
    /// Required string
    pub fn string(&mut self, name: &str) -> Option<String> {
        let value = self.required(name)?;
        self.coerce(name, value, "string", coerce_string)
    }

    /// String that may be absent or null
    pub fn optional_string(&mut self, name: &str) -> Option<Option<String>> {
        match self.object.get(name) {
            None | Some(Value::Null) => Some(None),
            Some(value) => self.coerce(name, value, "string", coerce_string).map(Some),
        }
    }

    /// Required integer
    pub fn integer(&mut self, name: &str) -> Option<i64> {
        let value = self.required(name)?;
        self.coerce(name, value, "integer", coerce_integer)
    }

    /// Required boolean
    pub fn boolean(&mut self, name: &str) -> Option<bool> {
        let value = self.required(name)?;
        self.coerce(name, value, "boolean", coerce_boolean)
    }

    /// Required timestamp
    pub fn timestamp(&mut self, name: &str) -> Option<DateTime<Utc>> {
        let value = self.required(name)?;
        self.coerce(name, value, "timestamp", coerce_timestamp)
    }

    /// Required string from a closed set
    pub fn choice<T: Closed>(&mut self, name: &str) -> Option<T> {
        let value = self.required(name)?;
        let text = self.coerce(name, value, "string", coerce_string)?;
        let variant = T::from_name(&text);
        if variant.is_none() {
            self.report(
                name,
                IssueKind::UnknownVariant {
                    value: text,
                    allowed: T::VARIANTS,
                },
            );
        }
        variant
    }

    /// Required array of nested records
    pub fn list<T: Schema>(&mut self, name: &str) -> Option<Vec<T>> {
        let value = self.required(name)?;
        let Some(items) = value.as_array() else {
            self.report(
                name,
                IssueKind::InvalidType {
                    expected: "array",
                    found: json_kind(value),
                },
            );
            return None;
        };
        let path = self.path_of(name);
        read_items(items, &path, self.issues)
    }

    fn required(&mut self, name: &str) -> Option<&'a Value> {
        let value = self.object.get(name);
        if value.is_none() {
            self.report(name, IssueKind::Missing);
        }
        value
    }

    fn coerce<T>(
        &mut self,
        name: &str,
        value: &Value,
        expected: &'static str,
        read: fn(&Value) -> Option<T>,
    ) -> Option<T> {
        let coerced = read(value);
        if coerced.is_none() {
            self.report(
                name,
                IssueKind::InvalidType {
                    expected,
                    found: json_kind(value),
                },
            );
        }
        coerced
    }

    fn report(&mut self, name: &str, kind: IssueKind) {
        let field = self.path_of(name);
        self.issues.push(FieldIssue { field, kind });
    }

    fn path_of(&self, name: &str) -> String {
        if self.path.is_empty() {
            name.to_string()
        } else {
            format!("{}.{name}", self.path)
        }
    }
}

/// Read one record at `path`, appending any problems to `issues`
pub(crate) fn read_object<T: Schema>(
    value: &Value,
    path: &str,
    issues: &mut Vec<FieldIssue>,
) -> Option<T> {
    let Some(object) = value.as_object() else {
        let field = if path.is_empty() { "$" } else { path };
        issues.push(FieldIssue::new(
            field,
            IssueKind::InvalidType {
                expected: "object",
                found: json_kind(value),
            },
        ));
        return None;
    };

    let before = issues.len();
    let mut fields = Fields {
        object,
        path,
        issues,
    };
    let record = T::read(&mut fields);
    if issues.len() > before {
        return None;
    }
    record
}

/// Read every element of an array; all elements are checked even after a failure
pub(crate) fn read_items<T: Schema>(
    items: &[Value],
    path: &str,
    issues: &mut Vec<FieldIssue>,
) -> Option<Vec<T>> {
    let mut records = Vec::with_capacity(items.len());
    let mut complete = true;
    for (index, item) in items.iter().enumerate() {
        match read_object::<T>(item, &format!("{path}[{index}]"), issues) {
            Some(record) => records.push(record),
            None => complete = false,
        }
    }
    complete.then_some(records)
}

// ============================================================================
// Coercions
// ============================================================================

pub(crate) fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

fn coerce_string(value: &Value) -> Option<String> {
    value.as_str().map(str::to_owned)
}

fn coerce_integer(value: &Value) -> Option<i64> {
    match value {
        Value::Number(n) => n.as_i64().or_else(|| {
            n.as_f64()
                .filter(|f| f.fract() == 0.0 && f.abs() < I64_FLOAT_LIMIT)
                .map(|f| f as i64)
        }),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

fn coerce_boolean(value: &Value) -> Option<bool> {
    match value {
        Value::Bool(b) => Some(*b),
        Value::Number(n) => match n.as_f64() {
            Some(f) if f.abs() < f64::EPSILON => Some(false),
            Some(f) if (f - 1.0).abs() < f64::EPSILON => Some(true),
            _ => None,
        },
        Value::String(s) => match s.trim().to_ascii_lowercase().as_str() {
            "true" | "t" | "1" | "yes" | "y" | "on" => Some(true),
            "false" | "f" | "0" | "no" | "n" | "off" => Some(false),
            _ => None,
        },
        _ => None,
    }
}

fn coerce_timestamp(value: &Value) -> Option<DateTime<Utc>> {
    match value {
        Value::Number(n) => n.as_f64().and_then(from_unix),
        Value::String(s) => {
            let s = s.trim();
            match s.parse::<f64>() {
                Ok(secs) => from_unix(secs),
                Err(_) => parse_datetime(s),
            }
        }
        _ => None,
    }
}

/// RFC 3339, else ISO 8601 without an offset or a bare date, read as UTC
fn parse_datetime(s: &str) -> Option<DateTime<Utc>> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.with_timezone(&Utc));
    }
    for format in ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"] {
        if let Ok(naive) = NaiveDateTime::parse_from_str(s, format) {
            return Some(naive.and_utc());
        }
    }
    NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc())
}

fn from_unix(value: f64) -> Option<DateTime<Utc>> {
    if !value.is_finite() {
        return None;
    }
    let millis = if value.abs() > MILLIS_THRESHOLD {
        value
    } else {
        value * 1000.0
    };
    DateTime::from_timestamp_millis(millis.round() as i64)
}

#[cfg(test)]
mod coercion_tests {
    use super::*;
    use serde_json::json;
    use test_case::test_case;

    #[test_case(json!(7), Some(7) ; "plain integer")]
    #[test_case(json!(7.0), Some(7) ; "whole float")]
    #[test_case(json!(" 42 "), Some(42) ; "numeric string")]
    #[test_case(json!(7.5), None ; "fractional float")]
    #[test_case(json!(true), None ; "boolean")]
    #[test_case(json!("seven"), None ; "word")]
    fn test_coerce_integer(value: Value, expected: Option<i64>) {
        assert_eq!(coerce_integer(&value), expected);
    }

    #[test_case(json!(true), Some(true) ; "bool true")]
    #[test_case(json!(0), Some(false) ; "zero")]
    #[test_case(json!("Yes"), Some(true) ; "yes string")]
    #[test_case(json!("off"), Some(false) ; "off string")]
    #[test_case(json!(1.0), Some(true) ; "float one")]
    #[test_case(json!(0.0), Some(false) ; "float zero")]
    #[test_case(json!("T"), Some(true) ; "t letter")]
    #[test_case(json!("n"), Some(false) ; "n letter")]
    #[test_case(json!(0.5), None ; "half")]
    #[test_case(json!(2), None ; "two")]
    #[test_case(json!("maybe"), None ; "maybe")]
    #[test_case(json!(null), None ; "null")]
    fn test_coerce_boolean(value: Value, expected: Option<bool>) {
        assert_eq!(coerce_boolean(&value), expected);
    }

    #[test]
    fn test_coerce_timestamp_seconds_and_millis() {
        let expected = DateTime::from_timestamp(1_700_000_000, 0).unwrap();
        assert_eq!(coerce_timestamp(&json!(1_700_000_000)), Some(expected));
        assert_eq!(coerce_timestamp(&json!(1_700_000_000_000_i64)), Some(expected));
        assert_eq!(coerce_timestamp(&json!("1700000000")), Some(expected));
    }

    #[test]
    fn test_coerce_timestamp_rfc3339() {
        let parsed = coerce_timestamp(&json!("2024-03-01T09:30:00+09:00")).unwrap();
        assert_eq!(parsed.to_rfc3339(), "2024-03-01T00:30:00+00:00");
    }

    #[test_case("2024-01-01T00:00:00", "2024-01-01T00:00:00+00:00" ; "no offset")]
    #[test_case("2024-01-01T12:34:56.5", "2024-01-01T12:34:56.500+00:00" ; "no offset fractional")]
    #[test_case("2024-01-01 08:00:00", "2024-01-01T08:00:00+00:00" ; "space separated")]
    #[test_case("2024-01-01", "2024-01-01T00:00:00+00:00" ; "date only")]
    fn test_coerce_timestamp_naive_is_utc(raw: &str, expected: &str) {
        let parsed = coerce_timestamp(&json!(raw)).unwrap();
        assert_eq!(parsed.to_rfc3339(), expected);
    }

    #[test]
    fn test_coerce_timestamp_rejects_garbage() {
        assert_eq!(coerce_timestamp(&json!("yesterday")), None);
        assert_eq!(coerce_timestamp(&json!("NaN")), None);
        assert_eq!(coerce_timestamp(&json!(false)), None);
        assert_eq!(coerce_timestamp(&json!("2024-13-01")), None);
    }

    #[test]
    fn test_strings_are_not_coerced() {
        assert_eq!(coerce_string(&json!(12)), None);
        assert_eq!(coerce_string(&json!("12")), Some("12".to_string()));
    }
}
