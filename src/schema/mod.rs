//! Response schemas
//!
//! Each record implements [`Schema`], a pure function from a JSON value to
//! the typed record or a [`SchemaValidationError`]. Nothing here touches the
//! network, so every schema can be checked on its own.
//!
//! # Coercion rules
//!
//! - **string**: JSON strings only
//! - **integer**: integers, whole floats, decimal strings
//! - **boolean**: booleans, `0`/`1`, `true/false/yes/no/on/off`
//! - **timestamp**: Unix seconds (milliseconds past 2×10¹⁰), numeric strings, RFC 3339
//! - **closed set**: exact match against the allowed values
//!
//! Optional fields may be absent or `null`. Unknown fields are ignored.

mod reader;
mod types;

pub use reader::{Closed, FieldIssue, Fields, IssueKind, SchemaValidationError};
pub use types::{
    BacklinkEntry, BacklinkResult, DiscussionStatus, DiscussionThread, EditFetchResult,
    EditSubmitRequest, EditSubmitResult, NamespaceCount,
};

use reader::{json_kind, read_items, read_object};
use serde_json::Value;

/// A record that can be validated out of a JSON object
pub trait Schema: Sized {
    /// Name used in validation errors
    const NAME: &'static str;

    /// Read the record, reporting every bad field on `fields`
    ///
    /// Implementations read all fields before combining them so that one
    /// pass reports every problem.
    fn read(fields: &mut Fields<'_>) -> Option<Self>;

    /// Validate a JSON value into this record
    fn from_json(value: &Value) -> Result<Self, SchemaValidationError> {
        let mut issues = Vec::new();
        match read_object::<Self>(value, "", &mut issues) {
            Some(record) if issues.is_empty() => Ok(record),
            _ => Err(SchemaValidationError::new(
                Self::NAME,
                issues,
                value.to_string(),
            )),
        }
    }
}

/// Validate a JSON array where every element must match `T`
///
/// One bad element fails the whole list.
pub fn list_from_json<T: Schema>(value: &Value) -> Result<Vec<T>, SchemaValidationError> {
    let mut issues = Vec::new();
    let records = match value.as_array() {
        Some(items) => read_items::<T>(items, "", &mut issues),
        None => {
            issues.push(FieldIssue::new(
                "$",
                IssueKind::InvalidType {
                    expected: "array",
                    found: json_kind(value),
                },
            ));
            None
        }
    };

    match records {
        Some(records) if issues.is_empty() => Ok(records),
        _ => Err(SchemaValidationError::new(
            list_name::<T>(),
            issues,
            value.to_string(),
        )),
    }
}

/// Parse a response body and validate it as `T`
pub fn parse<T: Schema>(body: &str) -> Result<T, SchemaValidationError> {
    let value = parse_body(T::NAME, body)?;
    T::from_json(&value).map_err(|e| with_payload(e, body))
}

/// Parse a response body and validate it as a list of `T`
pub fn parse_list<T: Schema>(body: &str) -> Result<Vec<T>, SchemaValidationError> {
    let value = parse_body(&list_name::<T>(), body)?;
    list_from_json(&value).map_err(|e| with_payload(e, body))
}

fn parse_body(schema: &str, body: &str) -> Result<Value, SchemaValidationError> {
    serde_json::from_str(body).map_err(|e| {
        SchemaValidationError::new(
            schema,
            vec![FieldIssue::new("$", IssueKind::Malformed(e.to_string()))],
            body,
        )
    })
}

/// Keep the body exactly as the server sent it
fn with_payload(mut error: SchemaValidationError, body: &str) -> SchemaValidationError {
    body.clone_into(&mut error.payload);
    error
}

fn list_name<T: Schema>() -> String {
    format!("[{}]", T::NAME)
}
