//! Filter sets in URL query parameter form.
//!
//! Each filter becomes one parameter named `<region>.<column>~<suffix>`.
//! Several filters with the same name are kept as a repeated key.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use tracing::debug;
use url::{form_urlencoded, Url};

use super::applied::{Filter, FilterOperator};
use super::types::FilterKind;
use crate::error::Result;

/// The value of one query parameter.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ParamValue {
    Single(String),
    Multiple(Vec<String>),
}

impl ParamValue {
    /// Add another value, turning a single value into a list.
    pub fn push(&mut self, value: String) {
        match self {
            ParamValue::Single(existing) => {
                let existing = std::mem::take(existing);
                *self = ParamValue::Multiple(vec![existing, value]);
            }
            ParamValue::Multiple(values) => values.push(value),
        }
    }

    /// All values, in insertion order.
    pub fn values(&self) -> &[String] {
        match self {
            ParamValue::Single(value) => std::slice::from_ref(value),
            ParamValue::Multiple(values) => values,
        }
    }
}

impl From<String> for ParamValue {
    fn from(value: String) -> Self {
        ParamValue::Single(value)
    }
}

impl From<&str> for ParamValue {
    fn from(value: &str) -> Self {
        ParamValue::Single(value.to_string())
    }
}

/// Query parameters keyed by name.
pub type FilterParams = BTreeMap<String, ParamValue>;

/// Add `filters` to `params` under `region_name`.
///
/// Filters that need a value but have none are skipped, as is the
/// "has any value" operator, which has no suffix.
pub fn append_filter_params<'a>(
    params: &mut FilterParams,
    filters: impl IntoIterator<Item = &'a Filter>,
    region_name: &str,
) {
    for filter in filters {
        if filter.operator() == &FilterOperator::Known(FilterKind::HasAnyValue) {
            continue;
        }
        let Some(value) = filter.url_parameter_value() else {
            debug!(column = filter.column_name(), "skipping filter without a value");
            continue;
        };
        let name = filter.url_parameter_name(region_name);
        match params.get_mut(&name) {
            Some(existing) => {
                debug!(%name, "parameter already set, storing as a list");
                existing.push(value);
            }
            None => {
                params.insert(name, ParamValue::Single(value));
            }
        }
    }
}

/// Build a fresh parameter map from `filters`.
pub fn filter_params<'a>(
    filters: impl IntoIterator<Item = &'a Filter>,
    region_name: &str,
) -> FilterParams {
    let mut params = FilterParams::new();
    append_filter_params(&mut params, filters, region_name);
    params
}

/// Rebuild filters from a parameter map.
///
/// Only names starting with `<region_name>.` are read. A list value gives
/// one filter per entry. Names with an empty suffix are ignored, since
/// "has any value" is never written.
pub fn filters_from_params(params: &FilterParams, region_name: &str) -> Vec<Filter> {
    collect_filters(
        params
            .iter()
            .flat_map(|(name, value)| value.values().iter().map(move |v| (name.as_str(), v.as_str()))),
        region_name,
    )
}

/// Rebuild filters from a URL or a bare query string.
///
/// Parameters are read in the order they appear.
pub fn filters_from_url(url: &str, region_name: &str) -> Result<Vec<Filter>> {
    // a "://" inside a parameter value does not make the input absolute
    let head = url.split(['?', '=']).next().unwrap_or_default();
    let query = if head.contains("://") {
        Url::parse(url)?.query().unwrap_or_default().to_string()
    } else {
        let query = url.split_once('?').map_or(url, |(_, query)| query);
        query.split('#').next().unwrap_or_default().to_string()
    };

    let pairs: Vec<(String, String)> = form_urlencoded::parse(query.as_bytes())
        .into_owned()
        .collect();
    Ok(collect_filters(
        pairs.iter().map(|(name, value)| (name.as_str(), value.as_str())),
        region_name,
    ))
}

fn collect_filters<'a>(
    pairs: impl Iterator<Item = (&'a str, &'a str)>,
    region_name: &str,
) -> Vec<Filter> {
    let prefix = format!("{}.", region_name);
    pairs
        .filter_map(|(name, value)| {
            let rest = name.strip_prefix(&prefix)?;
            let (column, suffix) = rest.rsplit_once('~')?;
            if suffix.is_empty() {
                debug!(name, "ignoring parameter without a filter suffix");
                return None;
            }
            let operator = FilterOperator::from_url_suffix(suffix);
            Some(Filter::with_operator(column, Some(value.into()), operator))
        })
        .collect()
}

/// Serialize parameters as a query string, repeating keys for lists.
pub fn to_query_string(params: &FilterParams) -> String {
    let mut serializer = form_urlencoded::Serializer::new(String::new());
    for (name, value) in params {
        for v in value.values() {
            serializer.append_pair(name, v);
        }
    }
    serializer.finish()
}

/// Describe the filters on one column for people to read.
///
/// Clauses look like `"Is Greater Than 5"` and are joined by `" AND "`.
/// Unknown operators show their raw suffix.
pub fn describe_filters(params: &FilterParams, region_name: &str, column_name: &str) -> String {
    let prefix = format!("{}.{}~", region_name, column_name);
    let mut clauses = Vec::new();
    for (name, value) in params {
        let Some(suffix) = name.strip_prefix(&prefix) else {
            continue;
        };
        let operator = FilterOperator::from_url_suffix(suffix);
        for v in value.values() {
            let clause = if v.is_empty() {
                operator.display_text().to_string()
            } else {
                format!("{} {}", operator.display_text(), v)
            };
            clauses.push(clause);
        }
    }
    clauses.join(" AND ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_param_value_promotion() {
        let mut value = ParamValue::from("a");
        value.push("b".to_string());
        value.push("c".to_string());
        assert_eq!(
            value,
            ParamValue::Multiple(vec!["a".into(), "b".into(), "c".into()])
        );
    }

    #[test]
    fn test_append_distinct_names() {
        let filters = [
            Filter::new("Age", 5, FilterKind::GreaterThan),
            Filter::new("Age", 65, FilterKind::LessThan),
        ];
        let params = filter_params(&filters, "query");
        assert_eq!(params.len(), 2);
        assert_eq!(params["query.Age~gt"], ParamValue::from("5"));
        assert_eq!(params["query.Age~lt"], ParamValue::from("65"));
    }

    #[test]
    fn test_append_same_name_becomes_list() {
        let filters = [
            Filter::new("Name", "a", FilterKind::Contains),
            Filter::new("Name", "b", FilterKind::Contains),
        ];
        let params = filter_params(&filters, "query");
        assert_eq!(
            params["query.Name~contains"],
            ParamValue::Multiple(vec!["a".into(), "b".into()])
        );

        let parsed = filters_from_params(&params, "query");
        assert_eq!(parsed, filters.to_vec());
    }

    #[test]
    fn test_append_skips_missing_values() {
        let filters = [
            Filter::without_value("Age", FilterKind::Equal),
            Filter::without_value("Age", FilterKind::HasAnyValue),
            Filter::without_value("Notes", FilterKind::Missing),
        ];
        let params = filter_params(&filters, "query");
        assert_eq!(params.len(), 1);
        assert_eq!(params["query.Notes~isblank"], ParamValue::from(""));
    }

    #[test]
    fn test_parse_ignores_other_regions() {
        let url = "/list?query.Age~gt=5&other.Age~lt=3&query.sort=Name";
        let filters = filters_from_url(url, "query").unwrap();
        assert_eq!(filters, vec![Filter::new("Age", 5, FilterKind::GreaterThan)]);
    }

    #[test]
    fn test_parse_splits_at_last_tilde() {
        let filters = filters_from_url("query.a~b~eq=1", "query").unwrap();
        assert_eq!(filters[0].column_name(), "a~b");
        assert_eq!(filters[0].filter_type().map(|t| t.kind()), Some(FilterKind::Equal));
    }

    #[test]
    fn test_parse_full_url_decodes_values() {
        let url = "https://example.com/grid?query.Name~in=x%3By#top";
        let filters = filters_from_url(url, "query").unwrap();
        assert_eq!(filters, vec![Filter::new("Name", "x;y", FilterKind::In)]);
        assert_eq!(filters[0].values(), ["x", "y"]);
    }

    #[test]
    fn test_parse_bare_query_with_url_value() {
        let url = "query.Link~startswith=https://example.com";
        let filters = filters_from_url(url, "query").unwrap();
        assert_eq!(
            filters,
            vec![Filter::new("Link", "https://example.com", FilterKind::StartsWith)]
        );

        let filters = filters_from_url("/grid?query.Link~eq=http://a/b?c", "query").unwrap();
        assert_eq!(filters[0].values(), ["http://a/b?c"]);
    }

    #[test]
    fn test_has_any_value_not_written_or_read() {
        let filters = [Filter::without_value("Age", FilterKind::HasAnyValue)];
        assert!(filter_params(&filters, "query").is_empty());
        assert!(filters_from_url("query.Age~=5", "query").unwrap().is_empty());
    }

    #[test]
    fn test_parse_bad_url() {
        assert!(filters_from_url("http://[::1", "query").is_err());
    }

    #[test]
    fn test_query_string_repeats_keys() {
        let mut params = FilterParams::new();
        params.insert(
            "query.Name~contains".to_string(),
            ParamValue::Multiple(vec!["a b".into(), "c".into()]),
        );
        assert_eq!(
            to_query_string(&params),
            "query.Name%7Econtains=a+b&query.Name%7Econtains=c"
        );
    }

    #[test]
    fn test_describe_filters() {
        let filters = [
            Filter::new("Age", 5, FilterKind::GreaterThan),
            Filter::new("Age", 65, FilterKind::LessThan),
            Filter::new("Name", "x", FilterKind::Equal),
        ];
        let mut params = filter_params(&filters, "query");
        params.insert("query.Age~newop".to_string(), ParamValue::from("7"));
        assert_eq!(
            describe_filters(&params, "query", "Age"),
            "Is Greater Than 5 AND Is Less Than 65 AND newop 7"
        );
    }
}
