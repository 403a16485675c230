//! Per-record effective-year resolution.
//!
//! Year-like data is spread across three fields of varying reliability:
//! `year`, `end_year`, and the leading four characters of `published`. The
//! priority is encoded as an ordered rule list: the first rule whose source
//! field is present and non-empty wins outright, and its candidate is then
//! coerced and range-checked. A winning candidate that fails coercion
//! excludes the record; later rules are not consulted.

use insight_map_record_models::{Record, has_value};
use serde_json::Value;

/// Years outside this range are treated as data errors and excluded.
const YEAR_RANGE: std::ops::RangeInclusive<i64> = 1900..=2100;

/// One entry in the fallback chain: a source field and how to read a year
/// candidate out of it.
struct YearRule {
    source: &'static str,
    resolve: fn(&Value) -> Option<Candidate>,
}

enum Candidate {
    Number(f64),
    Text(String),
}

const YEAR_RULES: &[YearRule] = &[
    YearRule {
        source: "year",
        resolve: raw_candidate,
    },
    YearRule {
        source: "end_year",
        resolve: raw_candidate,
    },
    YearRule {
        source: "published",
        resolve: leading_year,
    },
];

fn raw_candidate(value: &Value) -> Option<Candidate> {
    match value {
        Value::Number(n) => n.as_f64().map(Candidate::Number),
        Value::String(s) => Some(Candidate::Text(s.clone())),
        _ => None,
    }
}

fn leading_year(value: &Value) -> Option<Candidate> {
    match value {
        Value::String(s) => Some(Candidate::Text(s.chars().take(4).collect())),
        _ => None,
    }
}

#[allow(clippy::cast_possible_truncation)]
fn to_year(n: f64) -> i64 {
    n.trunc() as i64
}

/// Resolves the effective year of `record`, if it has one.
#[must_use]
pub fn derived_year(record: &Record) -> Option<i64> {
    let rule = YEAR_RULES
        .iter()
        .find(|rule| record.get(rule.source).is_some_and(has_value))?;
    let candidate = (rule.resolve)(record.get(rule.source)?)?;

    let year = match candidate {
        Candidate::Number(n) => to_year(n),
        Candidate::Text(text) => text.trim().parse().ok()?,
    };

    YEAR_RANGE.contains(&year).then_some(year)
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    fn record(value: serde_json::Value) -> Record {
        value.as_object().cloned().unwrap()
    }

    #[test]
    fn empty_year_falls_back_to_end_year() {
        let rec = record(json!({"year": "", "end_year": 2019, "published": null}));
        assert_eq!(derived_year(&rec), Some(2019));
    }

    #[test]
    fn published_prefix_is_last_resort() {
        let rec = record(json!({"published": "2017-01-20 00:00:00"}));
        assert_eq!(derived_year(&rec), Some(2017));
    }

    #[test]
    fn year_strings_are_coerced() {
        let rec = record(json!({"year": "2019"}));
        assert_eq!(derived_year(&rec), Some(2019));
    }

    #[test]
    fn unparsable_winner_does_not_fall_through() {
        let rec = record(json!({"year": "soon", "end_year": 2019}));
        assert_eq!(derived_year(&rec), None);
    }

    #[test]
    fn fractional_years_truncate() {
        let rec = record(json!({"year": 2018.7}));
        assert_eq!(derived_year(&rec), Some(2018));
    }

    #[test]
    fn out_of_range_years_are_excluded() {
        assert_eq!(derived_year(&record(json!({"year": 1850}))), None);
        assert_eq!(derived_year(&record(json!({"year": 2200}))), None);
        assert_eq!(derived_year(&record(json!({"year": 1900}))), Some(1900));
    }

    #[test]
    fn absent_sources_yield_nothing() {
        let rec = record(json!({"country": "India"}));
        assert_eq!(derived_year(&rec), None);
    }
}
