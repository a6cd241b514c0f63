//! Raw filter values and their URL parameter form.

use tracing::debug;

use super::types::FilterType;

/// Prefix of the JSON fallback used when a value contains the separator.
pub const JSON_SENTINEL_PREFIX: &str = "{json:";

/// Suffix of the JSON fallback.
pub const JSON_SENTINEL_SUFFIX: &str = "}";

/// A value as handed to a filter, before the operator splits it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FilterValue {
    /// One string, possibly separator-joined or in `{json:[...]}` form.
    Text(String),
    /// Values that are already separate.
    List(Vec<String>),
}

impl From<&str> for FilterValue {
    fn from(value: &str) -> Self {
        FilterValue::Text(value.to_string())
    }
}

impl From<String> for FilterValue {
    fn from(value: String) -> Self {
        FilterValue::Text(value)
    }
}

impl From<&String> for FilterValue {
    fn from(value: &String) -> Self {
        FilterValue::Text(value.clone())
    }
}

impl From<bool> for FilterValue {
    fn from(value: bool) -> Self {
        FilterValue::Text(value.to_string())
    }
}

impl From<i32> for FilterValue {
    fn from(value: i32) -> Self {
        FilterValue::Text(value.to_string())
    }
}

impl From<i64> for FilterValue {
    fn from(value: i64) -> Self {
        FilterValue::Text(value.to_string())
    }
}

impl From<f64> for FilterValue {
    fn from(value: f64) -> Self {
        FilterValue::Text(value.to_string())
    }
}

impl<T: ToString> From<Vec<T>> for FilterValue {
    fn from(values: Vec<T>) -> Self {
        FilterValue::List(values.iter().map(ToString::to_string).collect())
    }
}

impl<T: ToString, const N: usize> From<[T; N]> for FilterValue {
    fn from(values: [T; N]) -> Self {
        FilterValue::List(values.iter().map(ToString::to_string).collect())
    }
}

/// Parse the `{json:[...]}` form, if `text` is in it.
fn parse_json_sentinel(text: &str) -> Option<Vec<String>> {
    let inner = text
        .strip_prefix(JSON_SENTINEL_PREFIX)?
        .strip_suffix(JSON_SENTINEL_SUFFIX)?;
    match serde_json::from_str::<Vec<serde_json::Value>>(inner) {
        Ok(items) => Some(
            items
                .into_iter()
                .map(|item| match item {
                    serde_json::Value::String(s) => s,
                    serde_json::Value::Null => String::new(),
                    other => other.to_string(),
                })
                .collect(),
        ),
        Err(err) => {
            debug!(error = %err, "value looks like a json list but does not parse, splitting instead");
            None
        }
    }
}

impl FilterType {
    /// Break a raw value into the individual values this operator works on.
    ///
    /// Multi-valued operators split text on their separator unless it is in
    /// the `{json:[...]}` form, which is decoded as a list instead.
    pub fn split_value(&self, value: FilterValue) -> Vec<String> {
        match (value, self.multi_value_separator()) {
            (FilterValue::List(values), _) => values,
            (FilterValue::Text(text), Some(separator)) => parse_json_sentinel(&text)
                .unwrap_or_else(|| text.split(separator).map(str::to_string).collect()),
            (FilterValue::Text(text), None) => vec![text],
        }
    }

    /// The URL parameter value for already-split values.
    ///
    /// Operators without a value always produce an empty string. Operators
    /// that need one produce `None` when there is nothing to send.
    pub fn url_parameter_value(&self, values: &[String]) -> Option<String> {
        if !self.is_data_value_required() {
            return Some(String::new());
        }
        if values.is_empty() {
            return None;
        }
        match self.multi_value_separator() {
            Some(separator) => Some(join_values(values, separator)),
            None => Some(values.join(",")),
        }
    }
}

/// Join values with `separator`, or emit the JSON form when any value
/// contains the separator.
pub(crate) fn join_values(values: &[String], separator: &str) -> String {
    if values.iter().any(|v| v.contains(separator)) {
        // a Vec<String> always serializes
        let json = serde_json::to_string(values).unwrap_or_default();
        format!("{}{}{}", JSON_SENTINEL_PREFIX, json, JSON_SENTINEL_SUFFIX)
    } else {
        values.join(separator)
    }
}
