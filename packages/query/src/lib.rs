#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions)]

//! Filter expression building and evaluation for insight records.
//!
//! [`build_filter`] turns the flat string parameters of an incoming request
//! into a structured [`FilterExpression`]. Building is pure and total:
//! unknown parameters are ignored and malformed numeric bounds degrade to
//! "bound absent" rather than an error, so the same parameter map always
//! produces the same expression.

pub mod parse;

use std::collections::BTreeMap;

use insight_map_record_models::{Record, numeric};
use serde_json::Value;

/// Categorical parameters recognized by the filter builder.
///
/// Values are comma-separated lists; a single entry becomes an equality
/// constraint, several become set membership.
pub const TEXT_FIELDS: &[&str] = &[
    "country", "city", "region", "sector", "source", "swot", "pestle", "topic", "end_year",
];

/// Float-valued parameters recognized via `<field>_min` / `<field>_max`.
///
/// `year` is range-filtered too, but its bounds parse as integers.
pub const FLOAT_RANGE_FIELDS: &[&str] = &["intensity", "likelihood", "relevance"];

/// A single per-field constraint inside a [`FilterExpression`].
#[derive(Debug, Clone, PartialEq)]
pub enum Constraint {
    /// The field must equal this value.
    Equals(String),
    /// The field must equal one of these values.
    OneOf(Vec<String>),
    /// The field must be numeric and fall inside the inclusive bounds.
    Range {
        /// Inclusive lower bound, if given.
        min: Option<f64>,
        /// Inclusive upper bound, if given.
        max: Option<f64>,
    },
}

impl Constraint {
    /// Returns `true` if a field value satisfies this constraint.
    ///
    /// Equality matches a string field directly or any element of an array
    /// field; range constraints only ever match numeric fields. An absent
    /// field satisfies nothing.
    #[must_use]
    pub fn matches(&self, value: Option<&Value>) -> bool {
        match self {
            Self::Equals(target) => value.is_some_and(|v| value_equals(v, target)),
            Self::OneOf(targets) => {
                value.is_some_and(|v| targets.iter().any(|target| value_equals(v, target)))
            }
            Self::Range { min, max } => value.and_then(numeric).is_some_and(|n| {
                min.is_none_or(|lo| n >= lo) && max.is_none_or(|hi| n <= hi)
            }),
        }
    }
}

fn value_equals(value: &Value, target: &str) -> bool {
    match value {
        Value::String(s) => s == target,
        Value::Array(items) => items.iter().any(|item| item.as_str() == Some(target)),
        _ => false,
    }
}

/// A structured predicate over record fields.
///
/// Built once per request and reused unchanged by every read operation in
/// that request.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FilterExpression {
    fields: BTreeMap<String, Constraint>,
}

impl FilterExpression {
    /// Returns `true` if no constraints are present.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Returns the constraint for `field`, if any.
    #[must_use]
    pub fn get(&self, field: &str) -> Option<&Constraint> {
        self.fields.get(field)
    }

    /// Returns `true` if `record` satisfies every constraint.
    #[must_use]
    pub fn matches(&self, record: &Record) -> bool {
        self.fields
            .iter()
            .all(|(field, constraint)| constraint.matches(record.get(field)))
    }
}

/// Builds a [`FilterExpression`] from request parameters.
///
/// Categorical values are split on commas, trimmed, and emptied-out parts
/// dropped; one remaining part yields [`Constraint::Equals`], several yield
/// [`Constraint::OneOf`]. Numeric ranges come from `<field>_min` /
/// `<field>_max` pairs; a bound that fails to parse is simply absent, and a
/// field with no surviving bound is omitted entirely. Never fails.
#[must_use]
pub fn build_filter(params: &BTreeMap<String, String>) -> FilterExpression {
    let mut fields = BTreeMap::new();

    for &field in TEXT_FIELDS {
        let Some(raw) = params.get(field) else {
            continue;
        };
        let mut parts: Vec<String> = raw
            .split(',')
            .map(str::trim)
            .filter(|part| !part.is_empty())
            .map(ToString::to_string)
            .collect();
        match parts.len() {
            0 => {}
            1 => {
                fields.insert(field.to_string(), Constraint::Equals(parts.remove(0)));
            }
            _ => {
                fields.insert(field.to_string(), Constraint::OneOf(parts));
            }
        }
    }

    for &field in FLOAT_RANGE_FIELDS {
        if let Some(range) = range_constraint(params, field, parse::float) {
            fields.insert(field.to_string(), range);
        }
    }

    if let Some(range) = range_constraint(params, "year", year_bound) {
        fields.insert("year".to_string(), range);
    }

    FilterExpression { fields }
}

fn range_constraint(
    params: &BTreeMap<String, String>,
    field: &str,
    parse_bound: fn(&str) -> Option<f64>,
) -> Option<Constraint> {
    let min = params
        .get(&format!("{field}_min"))
        .and_then(|raw| parse_bound(raw));
    let max = params
        .get(&format!("{field}_max"))
        .and_then(|raw| parse_bound(raw));
    (min.is_some() || max.is_some()).then_some(Constraint::Range { min, max })
}

/// Year bounds parse as integers, so `year_min=2018.5` is no bound at all.
#[allow(clippy::cast_precision_loss)]
fn year_bound(raw: &str) -> Option<f64> {
    parse::int(raw).map(|year| year as f64)
}
