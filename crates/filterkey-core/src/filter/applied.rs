//! Filters bound to a column.

use std::fmt;

use tracing::warn;

use super::types::{FilterKind, FilterType};
use super::value::FilterValue;
use crate::key::FieldKey;

/// Column name used by table-wise operators.
pub const ALL_COLUMNS: &str = "*";

/// The operator of an applied filter.
///
/// Suffixes missing from the registry are kept verbatim so that filter
/// sets written by newer peers still decode and re-encode unchanged.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FilterOperator {
    /// A registered operator.
    Known(FilterKind),
    /// An unregistered URL suffix.
    Unrecognized(String),
}

impl FilterOperator {
    /// Resolve a URL suffix. The empty suffix means "has any value".
    pub fn from_url_suffix(suffix: &str) -> Self {
        if suffix.is_empty() {
            return FilterOperator::Known(FilterKind::HasAnyValue);
        }
        match FilterKind::from_url_suffix(suffix) {
            Some(kind) => FilterOperator::Known(kind),
            None => {
                warn!(suffix, "unrecognized filter suffix, keeping it verbatim");
                FilterOperator::Unrecognized(suffix.to_string())
            }
        }
    }

    /// The descriptor, for registered operators.
    pub fn filter_type(&self) -> Option<&'static FilterType> {
        match self {
            FilterOperator::Known(kind) => Some(kind.descriptor()),
            FilterOperator::Unrecognized(_) => None,
        }
    }

    /// Suffix written after `~` in the parameter name.
    pub fn url_suffix(&self) -> &str {
        match self {
            FilterOperator::Known(kind) => kind.descriptor().url_suffix().unwrap_or(""),
            FilterOperator::Unrecognized(suffix) => suffix,
        }
    }

    /// Menu label, or the raw suffix when the operator is unknown.
    pub fn display_text(&self) -> &str {
        match self {
            FilterOperator::Known(kind) => kind.descriptor().display_text(),
            FilterOperator::Unrecognized(suffix) => suffix,
        }
    }

    fn is_data_value_required(&self) -> bool {
        self.filter_type()
            .map_or(true, FilterType::is_data_value_required)
    }
}

impl From<FilterKind> for FilterOperator {
    fn from(kind: FilterKind) -> Self {
        FilterOperator::Known(kind)
    }
}

/// A column reference as accepted by [`Filter::new`].
///
/// Field keys contribute their encoded form; name paths are joined with
/// `/` as given.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnRef(String);

impl ColumnRef {
    /// The column name string.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for ColumnRef {
    fn from(name: &str) -> Self {
        ColumnRef(name.to_string())
    }
}

impl From<String> for ColumnRef {
    fn from(name: String) -> Self {
        ColumnRef(name)
    }
}

impl From<&String> for ColumnRef {
    fn from(name: &String) -> Self {
        ColumnRef(name.clone())
    }
}

impl From<&FieldKey> for ColumnRef {
    fn from(key: &FieldKey) -> Self {
        ColumnRef(key.to_external_string())
    }
}

impl From<FieldKey> for ColumnRef {
    fn from(key: FieldKey) -> Self {
        ColumnRef::from(&key)
    }
}

impl From<&[&str]> for ColumnRef {
    fn from(path: &[&str]) -> Self {
        ColumnRef(path.join("/"))
    }
}

impl From<Vec<&str>> for ColumnRef {
    fn from(path: Vec<&str>) -> Self {
        ColumnRef(path.join("/"))
    }
}

impl From<Vec<String>> for ColumnRef {
    fn from(path: Vec<String>) -> Self {
        ColumnRef(path.join("/"))
    }
}

/// A (column, operator, values) triple.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Filter {
    column_name: String,
    operator: FilterOperator,
    values: Vec<String>,
}

impl Filter {
    /// Create a filter with a value.
    pub fn new(
        column: impl Into<ColumnRef>,
        value: impl Into<FilterValue>,
        kind: FilterKind,
    ) -> Self {
        Self::with_operator(column, Some(value.into()), kind.into())
    }

    /// Create a filter without a value, e.g. "is blank".
    pub fn without_value(column: impl Into<ColumnRef>, kind: FilterKind) -> Self {
        Self::with_operator(column, None, kind.into())
    }

    /// Create a filter for any operator, registered or not.
    ///
    /// Table-wise operators always target [`ALL_COLUMNS`]. Values are split
    /// by the operator; operators that take no value drop it.
    pub fn with_operator(
        column: impl Into<ColumnRef>,
        value: Option<FilterValue>,
        operator: FilterOperator,
    ) -> Self {
        let filter_type = operator.filter_type();
        let column_name = if filter_type.is_some_and(FilterType::is_table_wise) {
            ALL_COLUMNS.to_string()
        } else {
            column.into().0
        };

        let values = match (value, filter_type) {
            _ if !operator.is_data_value_required() => Vec::new(),
            (None, _) => Vec::new(),
            (Some(value), Some(filter_type)) => filter_type.split_value(value),
            (Some(FilterValue::Text(text)), None) => vec![text],
            (Some(FilterValue::List(values)), None) => values,
        };

        Self {
            column_name,
            operator,
            values,
        }
    }

    /// The column as written in the parameter name.
    pub fn column_name(&self) -> &str {
        &self.column_name
    }

    /// The column parsed as a field key.
    pub fn field_key(&self) -> FieldKey {
        FieldKey::from_external_string(&self.column_name)
    }

    /// The operator.
    pub fn operator(&self) -> &FilterOperator {
        &self.operator
    }

    /// The operator's descriptor, if it is registered.
    pub fn filter_type(&self) -> Option<&'static FilterType> {
        self.operator.filter_type()
    }

    /// The split values.
    pub fn values(&self) -> &[String] {
        &self.values
    }

    /// `"<region>.<column>~<suffix>"`.
    pub fn url_parameter_name(&self, region_name: &str) -> String {
        format!(
            "{}.{}~{}",
            region_name,
            self.column_name,
            self.operator.url_suffix()
        )
    }

    /// The URL parameter value, or `None` when a required value is absent.
    pub fn url_parameter_value(&self) -> Option<String> {
        match self.filter_type() {
            Some(filter_type) => filter_type.url_parameter_value(&self.values),
            None if self.values.is_empty() => None,
            None => Some(self.values.join(",")),
        }
    }

    /// The same column and values under the opposite operator.
    pub fn opposite(&self) -> Option<Filter> {
        let &FilterOperator::Known(kind) = &self.operator else {
            return None;
        };
        let opposite = kind.opposite()?;
        Some(Self::with_operator(
            self.column_name.as_str(),
            Some(FilterValue::List(self.values.clone())),
            opposite.into(),
        ))
    }
}

impl fmt::Display for Filter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = self
            .filter_type()
            .and_then(FilterType::display_symbol)
            .unwrap_or_else(|| self.operator.display_text());
        write!(f, "{} {}", self.column_name, label)?;
        if let Some(value) = self.url_parameter_value().filter(|v| !v.is_empty()) {
            write!(f, " {}", value)?;
        }
        Ok(())
    }
}

/// Replace every filter on `column_name` with `column_filters`.
///
/// Unrelated filters keep their order; the replacements go at the end.
/// Column names compare as field keys, so case does not matter.
pub fn merge(base_filters: &[Filter], column_name: &str, column_filters: &[Filter]) -> Vec<Filter> {
    let target = FieldKey::from_external_string(column_name);
    base_filters
        .iter()
        .filter(|filter| filter.field_key() != target)
        .chain(column_filters)
        .cloned()
        .collect()
}
