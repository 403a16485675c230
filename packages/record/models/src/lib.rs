#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions)]

//! Schemaless record model for the insight dataset.
//!
//! Upstream survey/report records carry no enforced schema: any field may be
//! absent, `null`, an empty string, an empty array, or an empty object, and
//! year-like fields are stored as strings in some records and numbers in
//! others. Records are therefore plain JSON objects rather than a fixed
//! struct, and this crate holds the value-classification helpers shared by
//! filtering and aggregation.

use serde_json::{Map, Value};

/// A single survey/report record as stored in the document collection.
pub type Record = Map<String, Value>;

/// Name of the internal identifier field, excluded from all API output.
pub const ID_FIELD: &str = "_id";

/// Returns `true` if `value` carries an actual value.
///
/// `null`, `""`, `[]`, and `{}` all count as "no value", matching how the
/// upstream data encodes missing fields.
#[must_use]
pub fn has_value(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::String(s) => !s.is_empty(),
        Value::Array(items) => !items.is_empty(),
        Value::Object(map) => !map.is_empty(),
        Value::Bool(_) | Value::Number(_) => true,
    }
}

/// Extracts a field value as `f64` for range matching and averages.
///
/// Only JSON numbers participate; numeric-looking strings do not.
#[must_use]
pub fn numeric(value: &Value) -> Option<f64> {
    value.as_f64()
}

/// Renders a value as a filter-option string.
///
/// Integer numbers render without a fractional part (`2018`, not `2018.0`),
/// strings render without quotes, and anything else falls back to its JSON
/// text.
#[must_use]
pub fn display_string(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Number(n) => n
            .as_i64()
            .map_or_else(|| n.to_string(), |i| i.to_string()),
        other => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn empty_variants_have_no_value() {
        assert!(!has_value(&Value::Null));
        assert!(!has_value(&json!("")));
        assert!(!has_value(&json!([])));
        assert!(!has_value(&json!({})));
    }

    #[test]
    fn populated_variants_have_value() {
        assert!(has_value(&json!("Asia")));
        assert!(has_value(&json!(0)));
        assert!(has_value(&json!(false)));
        assert!(has_value(&json!(["gas"])));
    }

    #[test]
    fn numeric_rejects_numeric_strings() {
        assert_eq!(numeric(&json!(4.5)), Some(4.5));
        assert_eq!(numeric(&json!("4.5")), None);
    }

    #[test]
    fn integers_display_without_fraction() {
        assert_eq!(display_string(&json!(2018)), "2018");
        assert_eq!(display_string(&json!(2018.5)), "2018.5");
        assert_eq!(display_string(&json!("World")), "World");
    }
}
