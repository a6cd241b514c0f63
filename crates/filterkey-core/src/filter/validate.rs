//! Value validation and normalization against a column's value type.

use std::sync::LazyLock;

use chrono::{DateTime, Datelike, NaiveDate, NaiveDateTime, NaiveTime, Timelike};
use regex::Regex;
use tracing::debug;

use super::types::FilterType;
use super::value::{join_values, FilterValue};
use crate::config::CodecConfig;
use crate::error::ValidationError;
use crate::json_type::JsonType;

static ISO_DATE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^\s*\d{4}-\d{2}-\d{2}(\s*\d{2}:\d{2})?\s*$").expect("valid iso date regex")
});

/// Text that looks like `M/D/YY`, not `M/D/YYYY`.
static SHORT_YEAR: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^\s*\d{1,2}/\d{1,2}/\d{2}(\D|$)").expect("valid short year regex")
});

static SHORT_YEAR_DATE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(\d{1,2})/(\d{1,2})/(\d{2})(?:\s+(\d{1,2}):(\d{2})(?::(\d{2}))?)?$")
        .expect("valid short year date regex")
});

const DATE_TIME_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M:%S",
    "%Y/%m/%d %H:%M:%S",
    "%Y/%m/%d %H:%M",
    "%m/%d/%Y %H:%M:%S",
    "%m/%d/%Y %H:%M",
    "%d %b %Y %H:%M",
    "%b %d, %Y %H:%M",
];

const DATE_FORMATS: &[&str] = &[
    "%Y/%m/%d",
    "%m/%d/%Y",
    "%m-%d-%Y",
    "%d %b %Y",
    "%d-%b-%Y",
    "%b %d %Y",
    "%b %d, %Y",
    "%d %B %Y",
    "%B %d %Y",
    "%B %d, %Y",
];

const TRUE_WORDS: &[&str] = &["TRUE", "Y", "YES", "ON", "T"];
const FALSE_WORDS: &[&str] = &["FALSE", "N", "NO", "OFF", "F"];

impl FilterType {
    /// Validate a value for a column, using the local clock for date heuristics.
    ///
    /// Returns the URL parameter form of the normalized value.
    pub fn validate(
        &self,
        value: impl Into<FilterValue>,
        json_type: JsonType,
        column: &str,
    ) -> Result<String, ValidationError> {
        self.validate_with(value, json_type, column, &CodecConfig::default())
    }

    /// Validate a value for a column with explicit settings.
    pub fn validate_with(
        &self,
        value: impl Into<FilterValue>,
        json_type: JsonType,
        column: &str,
        config: &CodecConfig,
    ) -> Result<String, ValidationError> {
        if !self.is_data_value_required() {
            return Ok(String::new());
        }

        let value = value.into();
        let Some(separator) = self.multi_value_separator() else {
            let text = match value {
                FilterValue::Text(text) => text,
                FilterValue::List(values) => values.join(","),
            };
            return validate_value(&text, json_type, column, config);
        };

        let validated = self
            .split_value(value)
            .iter()
            .map(|v| validate_value(v, json_type, column, config))
            .collect::<Result<Vec<_>, _>>()?;

        if let (Some(min), Some(max)) = (self.min_occurs(), self.max_occurs()) {
            if !(min..=max).contains(&validated.len()) {
                debug!(column, count = validated.len(), min, max, "wrong number of filter values");
                return Err(ValidationError::Cardinality {
                    count: validated.len(),
                    min,
                    max,
                    column: column.to_string(),
                });
            }
        }

        Ok(join_values(&validated, separator))
    }
}

/// Validate and normalize one value against a value type.
pub fn validate_value(
    value: &str,
    json_type: JsonType,
    column: &str,
    config: &CodecConfig,
) -> Result<String, ValidationError> {
    let normalized = match json_type {
        JsonType::Boolean => normalize_boolean(value),
        JsonType::Date => normalize_date(value, config),
        JsonType::Int => value.trim().parse::<i64>().ok().map(|i| i.to_string()),
        JsonType::Float => value
            .trim()
            .parse::<f64>()
            .ok()
            .filter(|f| f.is_finite())
            .map(|f| f.to_string()),
        JsonType::String => Some(value.to_string()),
    };

    normalized.ok_or_else(|| {
        debug!(value, %json_type, column, "filter value rejected");
        ValidationError::InvalidValue {
            value: value.to_string(),
            json_type,
            column: column.to_string(),
        }
    })
}

fn normalize_boolean(value: &str) -> Option<String> {
    let upper = value.to_uppercase();
    if value == "1" || TRUE_WORDS.contains(&upper.as_str()) {
        Some("1".to_string())
    } else if value == "0" || FALSE_WORDS.contains(&upper.as_str()) {
        Some("0".to_string())
    } else {
        None
    }
}

fn normalize_date(value: &str, config: &CodecConfig) -> Option<String> {
    if ISO_DATE.is_match(value) {
        return Some(value.to_string());
    }

    let Some(mut parsed) = parse_date_time(value.trim()) else {
        // relative dates such as +1d or -5H pass through untouched
        return (value.starts_with('+') || value.starts_with('-')).then(|| value.to_string());
    };

    if SHORT_YEAR.is_match(value)
        && parsed.year() < config.current_year() - config.two_digit_year_window
    {
        parsed = parsed.with_year(parsed.year() + 100).unwrap_or(parsed);
    }

    let mut formatted = parsed.format("%Y-%m-%d").to_string();
    if parsed.hour() != 0 || parsed.minute() != 0 {
        formatted.push_str(&parsed.format(" %H:%M").to_string());
    }
    Some(formatted)
}

/// Best-effort parse of the date shapes people type into filter boxes.
fn parse_date_time(text: &str) -> Option<NaiveDateTime> {
    if let Some(caps) = SHORT_YEAR_DATE.captures(text) {
        let number = |i: usize| caps.get(i).and_then(|m| m.as_str().parse::<u32>().ok());
        // two digit years read as 19xx; the caller moves them forward
        let year = 1900 + number(3)? as i32;
        let date = NaiveDate::from_ymd_opt(year, number(1)?, number(2)?)?;
        let time = NaiveTime::from_hms_opt(
            number(4).unwrap_or(0),
            number(5).unwrap_or(0),
            number(6).unwrap_or(0),
        )?;
        return Some(date.and_time(time));
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(text) {
        return Some(dt.naive_local());
    }
    if let Ok(dt) = DateTime::parse_from_rfc2822(text) {
        return Some(dt.naive_local());
    }

    DATE_TIME_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(text, fmt).ok())
        .or_else(|| {
            DATE_FORMATS
                .iter()
                .find_map(|fmt| NaiveDate::parse_from_str(text, fmt).ok())
                .and_then(|date| date.and_hms_opt(0, 0, 0))
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::filter::types::{BETWEEN, CONTAINS_ONE_OF, EQUAL, IN, MISSING};
    use pretty_assertions::assert_eq;

    fn config() -> CodecConfig {
        CodecConfig::default().with_reference_year(2024)
    }

    #[test]
    fn test_boolean_vocabulary() {
        for input in ["YES", "1", "T", "true", "on", "y"] {
            assert_eq!(EQUAL.validate(input, JsonType::Boolean, "Flag").unwrap(), "1");
        }
        for input in ["no", "0", "f", "FALSE", "Off", "N"] {
            assert_eq!(EQUAL.validate(input, JsonType::Boolean, "Flag").unwrap(), "0");
        }
        let err = EQUAL.validate("nope", JsonType::Boolean, "Flag").unwrap_err();
        assert!(matches!(err, ValidationError::InvalidValue { .. }));
    }

    #[test]
    fn test_numbers() {
        assert_eq!(EQUAL.validate(" 42 ", JsonType::Int, "Age").unwrap(), "42");
        assert!(EQUAL.validate("4.2", JsonType::Int, "Age").is_err());
        assert_eq!(EQUAL.validate("2.50", JsonType::Float, "Ratio").unwrap(), "2.5");
        assert!(EQUAL.validate("abc", JsonType::Float, "Ratio").is_err());
        assert!(EQUAL.validate("NaN", JsonType::Float, "Ratio").is_err());
    }

    #[test]
    fn test_float_rejects_infinity() {
        for input in ["inf", "-infinity", "Infinity", "1e400"] {
            assert!(EQUAL.validate(input, JsonType::Float, "Ratio").is_err(), "{}", input);
        }
        assert_eq!(EQUAL.validate("1e3", JsonType::Float, "Ratio").unwrap(), "1000");
    }

    #[test]
    fn test_string_passes_through() {
        assert_eq!(EQUAL.validate(" a b ", JsonType::String, "Name").unwrap(), " a b ");
    }

    #[test]
    fn test_iso_dates_verbatim() {
        let cfg = config();
        assert_eq!(
            validate_value("2024-03-05", JsonType::Date, "Date", &cfg).unwrap(),
            "2024-03-05"
        );
        assert_eq!(
            validate_value("2024-03-05 14:30", JsonType::Date, "Date", &cfg).unwrap(),
            "2024-03-05 14:30"
        );
    }

    #[test]
    fn test_general_dates_normalized() {
        let cfg = config();
        assert_eq!(
            validate_value("3/5/2024", JsonType::Date, "Date", &cfg).unwrap(),
            "2024-03-05"
        );
        assert_eq!(
            validate_value("2024-03-05T09:15:00", JsonType::Date, "Date", &cfg).unwrap(),
            "2024-03-05 09:15"
        );
        assert_eq!(
            validate_value("5 Mar 2024", JsonType::Date, "Date", &cfg).unwrap(),
            "2024-03-05"
        );
    }

    #[test]
    fn test_two_digit_years() {
        let cfg = config();
        assert_eq!(
            validate_value("1/2/03", JsonType::Date, "Date", &cfg).unwrap(),
            "2003-01-02"
        );
        assert_eq!(
            validate_value("1/2/75", JsonType::Date, "Date", &cfg).unwrap(),
            "1975-01-02"
        );
        assert_eq!(
            validate_value("12/31/99 13:45", JsonType::Date, "Date", &cfg).unwrap(),
            "1999-12-31 13:45"
        );
    }

    #[test]
    fn test_four_digit_year_not_shifted() {
        let cfg = config();
        assert_eq!(
            validate_value("1930/01/02", JsonType::Date, "Date", &cfg).unwrap(),
            "1930-01-02"
        );
        assert_eq!(
            validate_value("1/2/1930", JsonType::Date, "Date", &cfg).unwrap(),
            "1930-01-02"
        );
    }

    #[test]
    fn test_relative_dates_pass_through() {
        let cfg = config();
        assert_eq!(validate_value("+1d", JsonType::Date, "Date", &cfg).unwrap(), "+1d");
        assert_eq!(validate_value("-5H", JsonType::Date, "Date", &cfg).unwrap(), "-5H");
        assert!(validate_value("someday", JsonType::Date, "Date", &cfg).is_err());
    }

    #[test]
    fn test_between_cardinality() {
        let err = BETWEEN.validate(vec![1], JsonType::Int, "Age").unwrap_err();
        assert!(matches!(err, ValidationError::Cardinality { count: 1, min: 2, max: 2, .. }));
        assert_eq!(BETWEEN.validate(vec![1, 2], JsonType::Int, "Age").unwrap(), "1,2");
        assert!(BETWEEN.validate(vec![1, 2, 3], JsonType::Int, "Age").is_err());
        assert_eq!(BETWEEN.validate("5,10", JsonType::Int, "Age").unwrap(), "5,10");
    }

    #[test]
    fn test_multi_value_validates_each() {
        assert_eq!(IN.validate("1;2;3", JsonType::Int, "Age").unwrap(), "1;2;3");
        assert!(IN.validate("1;x;3", JsonType::Int, "Age").is_err());
        assert_eq!(IN.validate("yes;no", JsonType::Boolean, "Flag").unwrap(), "1;0");
    }

    #[test]
    fn test_multi_value_keeps_separator_safe() {
        let validated = CONTAINS_ONE_OF
            .validate(vec!["a;b", "c"], JsonType::String, "Name")
            .unwrap();
        assert_eq!(validated, r#"{json:["a;b","c"]}"#);
        let again = CONTAINS_ONE_OF
            .validate(validated.as_str(), JsonType::String, "Name")
            .unwrap();
        assert_eq!(again, validated);
    }

    #[test]
    fn test_no_value_types_validate_empty() {
        assert_eq!(MISSING.validate("ignored", JsonType::Int, "Age").unwrap(), "");
    }
}
