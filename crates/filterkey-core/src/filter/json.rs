//! Filters as JSON records, for request bodies.

use serde::{Deserialize, Serialize};

use super::applied::{Filter, FilterOperator};
use super::params::ParamValue;
use super::value::FilterValue;
use crate::error::Result;

/// One filter on the wire: `{"column": "Age", "op": "gt", "value": "5"}`.
///
/// `value` is left out for operators without one.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FilterJson {
    pub column: String,
    pub op: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<ParamValue>,
}

impl From<&Filter> for FilterJson {
    fn from(filter: &Filter) -> Self {
        let value = filter
            .url_parameter_value()
            .filter(|v| !v.is_empty())
            .map(ParamValue::Single);
        Self {
            column: filter.column_name().to_string(),
            op: filter.operator().url_suffix().to_string(),
            value,
        }
    }
}

impl From<FilterJson> for Filter {
    fn from(record: FilterJson) -> Self {
        let value = record.value.map(|value| match value {
            ParamValue::Single(text) => FilterValue::Text(text),
            ParamValue::Multiple(values) => FilterValue::List(values),
        });
        Filter::with_operator(
            record.column,
            value,
            FilterOperator::from_url_suffix(&record.op),
        )
    }
}

/// Serialize filters as a JSON array of records.
pub fn filters_to_json<'a>(filters: impl IntoIterator<Item = &'a Filter>) -> Result<String> {
    let records: Vec<FilterJson> = filters.into_iter().map(FilterJson::from).collect();
    Ok(serde_json::to_string(&records)?)
}

/// Parse a JSON array of records.
pub fn filters_from_json(json: &str) -> Result<Vec<Filter>> {
    let records: Vec<FilterJson> = serde_json::from_str(json)?;
    Ok(records.into_iter().map(Filter::from).collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::filter::types::FilterKind;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_record_shape() {
        let filters = [
            Filter::new("Age", 5, FilterKind::GreaterThan),
            Filter::without_value("Notes", FilterKind::Missing),
        ];
        let json = filters_to_json(&filters).unwrap();
        assert_eq!(
            json,
            r#"[{"column":"Age","op":"gt","value":"5"},{"column":"Notes","op":"isblank"}]"#
        );
        assert_eq!(filters_from_json(&json).unwrap(), filters.to_vec());
    }

    #[test]
    fn test_list_value() {
        let filters = filters_from_json(r#"[{"column":"Name","op":"in","value":["a;b","c"]}]"#)
            .unwrap();
        assert_eq!(filters[0].values(), ["a;b", "c"]);
        assert_eq!(
            filters[0].url_parameter_value().as_deref(),
            Some(r#"{json:["a;b","c"]}"#)
        );
    }

    #[test]
    fn test_unknown_op_is_kept() {
        let filters = filters_from_json(r#"[{"column":"Age","op":"later","value":"1"}]"#).unwrap();
        assert_eq!(
            filters[0].operator(),
            &FilterOperator::Unrecognized("later".to_string())
        );
    }

    #[test]
    fn test_malformed_json() {
        assert!(filters_from_json("{not json").is_err());
    }
}
