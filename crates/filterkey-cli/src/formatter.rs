//! Output formatters for command results.

use clap::ValueEnum;
use comfy_table::Table;
use filterkey_core::{Filter, FilterJson, FilterParams, FilterType, Key, KeyKind};

/// Output format for results.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// ASCII table format
    Table,
    /// JSON format
    Json,
}

impl std::fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OutputFormat::Table => write!(f, "table"),
            OutputFormat::Json => write!(f, "json"),
        }
    }
}

/// The forms of one key, ready for output.
#[derive(Debug, Clone)]
pub struct KeyReport {
    pub kind: &'static str,
    pub external: String,
    pub display: String,
    pub sql: String,
    pub parts: Vec<String>,
}

impl<K: KeyKind> From<&Key<K>> for KeyReport {
    fn from(key: &Key<K>) -> Self {
        Self {
            kind: K::NAME,
            external: key.to_external_string(),
            display: key.to_display_string(),
            sql: key.to_sql_quoted_string(),
            parts: key.parts().into_iter().map(str::to_string).collect(),
        }
    }
}

/// Trait for formatting output.
pub trait Formatter {
    /// Format the forms of a key.
    fn format_key(&self, key: &KeyReport) -> String;

    /// Format the operators for a value type.
    fn format_filter_types(&self, types: &[&FilterType], default: &FilterType) -> String;

    /// Format applied filters.
    fn format_filters(&self, filters: &[Filter], region_name: &str) -> String;

    /// Format a built query string.
    fn format_query(&self, query: &str, params: &FilterParams) -> String;

    /// Format a normalized filter value.
    fn format_value(&self, column: &str, suffix: &str, value: &str) -> String;
}

/// Create a formatter for the given output format.
pub fn create_formatter(format: OutputFormat) -> Box<dyn Formatter> {
    match format {
        OutputFormat::Table => Box::new(TableFormatter),
        OutputFormat::Json => Box::new(JsonFormatter),
    }
}

/// Table formatter using comfy-table.
pub struct TableFormatter;

impl Formatter for TableFormatter {
    fn format_key(&self, key: &KeyReport) -> String {
        let mut table = Table::new();
        table.set_header(vec!["Form", key.kind]);
        table.add_row(vec!["external", key.external.as_str()]);
        table.add_row(vec!["display", key.display.as_str()]);
        table.add_row(vec!["sql", key.sql.as_str()]);
        for (i, part) in key.parts.iter().enumerate() {
            table.add_row(vec![format!("part {}", i), part.clone()]);
        }
        table.to_string()
    }

    fn format_filter_types(&self, types: &[&FilterType], default: &FilterType) -> String {
        let mut table = Table::new();
        table.set_header(vec!["Suffix", "Operator", "Values", "Default"]);
        for filter_type in types {
            let values = match (filter_type.is_data_value_required(), filter_type.multi_value_separator()) {
                (false, _) => "none".to_string(),
                (true, Some(separator)) => format!("list ({})", separator),
                (true, None) => "one".to_string(),
            };
            let is_default = filter_type.kind() == default.kind();
            table.add_row(vec![
                filter_type.url_suffix().unwrap_or("").to_string(),
                filter_type.long_display_text().to_string(),
                values,
                if is_default { "*" } else { "" }.to_string(),
            ]);
        }
        table.to_string()
    }

    fn format_filters(&self, filters: &[Filter], region_name: &str) -> String {
        if filters.is_empty() {
            return "No filters".to_string();
        }
        let mut table = Table::new();
        table.set_header(vec!["Parameter", "Column", "Operator", "Values"]);
        for filter in filters {
            table.add_row(vec![
                filter.url_parameter_name(region_name),
                filter.field_key().to_display_string(),
                filter.operator().display_text().to_string(),
                filter.values().join(", "),
            ]);
        }
        table.to_string()
    }

    fn format_query(&self, query: &str, params: &FilterParams) -> String {
        let mut table = Table::new();
        table.set_header(vec!["Parameter", "Value"]);
        for (name, value) in params {
            for v in value.values() {
                table.add_row(vec![name.as_str(), v.as_str()]);
            }
        }
        format!("{}\n{}", query, table)
    }

    fn format_value(&self, _column: &str, _suffix: &str, value: &str) -> String {
        value.to_string()
    }
}

/// JSON formatter.
pub struct JsonFormatter;

impl Formatter for JsonFormatter {
    fn format_key(&self, key: &KeyReport) -> String {
        serde_json::to_string_pretty(&serde_json::json!({
            "kind": key.kind,
            "external": key.external,
            "display": key.display,
            "sql": key.sql,
            "parts": key.parts,
        }))
        .unwrap_or_else(|_| "{}".to_string())
    }

    fn format_filter_types(&self, types: &[&FilterType], default: &FilterType) -> String {
        let rows: Vec<serde_json::Value> = types
            .iter()
            .map(|filter_type| {
                serde_json::json!({
                    "suffix": filter_type.url_suffix(),
                    "label": filter_type.display_text(),
                    "requiresValue": filter_type.is_data_value_required(),
                    "separator": filter_type.multi_value_separator(),
                    "default": filter_type.kind() == default.kind(),
                })
            })
            .collect();
        serde_json::to_string_pretty(&rows).unwrap_or_else(|_| "[]".to_string())
    }

    fn format_filters(&self, filters: &[Filter], _region_name: &str) -> String {
        let records: Vec<FilterJson> = filters.iter().map(FilterJson::from).collect();
        serde_json::to_string_pretty(&records).unwrap_or_else(|_| "[]".to_string())
    }

    fn format_query(&self, query: &str, params: &FilterParams) -> String {
        serde_json::to_string_pretty(&serde_json::json!({
            "query": query,
            "params": params,
        }))
        .unwrap_or_else(|_| "{}".to_string())
    }

    fn format_value(&self, column: &str, suffix: &str, value: &str) -> String {
        serde_json::json!({
            "column": column,
            "op": suffix,
            "value": value,
        })
        .to_string()
    }
}
