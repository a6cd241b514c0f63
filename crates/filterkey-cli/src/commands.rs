//! Subcommand execution.

use std::io::Read;

use anyhow::{anyhow, Context};
use filterkey_core::{
    default_filter_for_type, filter_params, filter_type_for_url_suffix, filter_types_for_type,
    filters_from_json, filters_from_url, to_query_string, CodecConfig, FieldKey, SchemaKey,
};
use tracing::debug;

use crate::config::{Command, KeyAction};
use crate::formatter::{Formatter, KeyReport};

/// Run one subcommand and return its formatted output.
pub fn execute(
    command: &Command,
    config: &CodecConfig,
    formatter: &dyn Formatter,
) -> anyhow::Result<String> {
    match command {
        Command::Key { action } => execute_key(action, formatter),

        Command::Types { json_type, mv } => {
            let types = filter_types_for_type(*json_type, *mv);
            Ok(formatter.format_filter_types(&types, default_filter_for_type(*json_type)))
        }

        Command::Validate {
            suffix,
            json_type,
            value,
            column,
        } => {
            let filter_type = filter_type_for_url_suffix(suffix)
                .ok_or_else(|| anyhow!("unknown filter suffix '{}'", suffix))?;
            let normalized = filter_type.validate_with(value.as_str(), *json_type, column, config)?;
            Ok(formatter.format_value(column, suffix, &normalized))
        }

        Command::Parse { url } => {
            config.validate()?;
            let filters = filters_from_url(url, &config.region_name)?;
            debug!(count = filters.len(), "parsed filters");
            Ok(formatter.format_filters(&filters, &config.region_name))
        }

        Command::Build { input } => {
            config.validate()?;
            let json = read_input(input)?;
            let filters = filters_from_json(&json)?;
            let params = filter_params(&filters, &config.region_name);
            Ok(formatter.format_query(&to_query_string(&params), &params))
        }
    }
}

fn execute_key(action: &KeyAction, formatter: &dyn Formatter) -> anyhow::Result<String> {
    let report = match action {
        KeyAction::Encode { schema: false, parts } => {
            KeyReport::from(&FieldKey::from_parts(parts.iter().map(String::as_str))?)
        }
        KeyAction::Encode { schema: true, parts } => {
            KeyReport::from(&SchemaKey::from_parts(parts.iter().map(String::as_str))?)
        }
        KeyAction::Decode { schema: false, key } => {
            KeyReport::from(&FieldKey::from_external_string(key))
        }
        KeyAction::Decode { schema: true, key } => {
            KeyReport::from(&SchemaKey::from_external_string(key))
        }
    };
    Ok(formatter.format_key(&report))
}

fn read_input(input: &str) -> anyhow::Result<String> {
    if input == "-" {
        let mut buf = String::new();
        std::io::stdin()
            .read_to_string(&mut buf)
            .context("failed to read filters from stdin")?;
        Ok(buf)
    } else {
        std::fs::read_to_string(input).with_context(|| format!("failed to read {}", input))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::formatter::{JsonFormatter, TableFormatter};
    use filterkey_core::JsonType;
    use pretty_assertions::assert_eq;

    fn config() -> CodecConfig {
        CodecConfig::default().with_reference_year(2024)
    }

    fn run_json(command: Command) -> serde_json::Value {
        let output = execute(&command, &config(), &JsonFormatter).unwrap();
        serde_json::from_str(&output).unwrap()
    }

    #[test]
    fn test_key_encode_schema() {
        let output = run_json(Command::Key {
            action: KeyAction::Encode {
                schema: true,
                parts: vec!["assay.General".to_string(), "Results".to_string()],
            },
        });
        assert_eq!(output["external"], "assay$PGeneral.Results");
        assert_eq!(output["sql"], "\"assay.General\".Results");
    }

    #[test]
    fn test_key_decode_field() {
        let output = run_json(Command::Key {
            action: KeyAction::Decode {
                schema: false,
                key: "Run/a$Sb".to_string(),
            },
        });
        assert_eq!(output["parts"], serde_json::json!(["Run", "a/b"]));
    }

    #[test]
    fn test_validate_normalizes() {
        let output = run_json(Command::Validate {
            suffix: "in".to_string(),
            json_type: JsonType::Boolean,
            value: "yes;off".to_string(),
            column: "Flag".to_string(),
        });
        assert_eq!(output["value"], "1;0");
    }

    #[test]
    fn test_validate_rejects() {
        let command = Command::Validate {
            suffix: "eq".to_string(),
            json_type: JsonType::Int,
            value: "abc".to_string(),
            column: "Age".to_string(),
        };
        let err = execute(&command, &config(), &JsonFormatter).unwrap_err();
        assert_eq!(err.to_string(), "abc is not a valid int for field 'Age'");
    }

    #[test]
    fn test_validate_unknown_suffix() {
        let command = Command::Validate {
            suffix: "nope".to_string(),
            json_type: JsonType::Int,
            value: "1".to_string(),
            column: "Age".to_string(),
        };
        assert!(execute(&command, &config(), &TableFormatter).is_err());
    }

    #[test]
    fn test_parse_url() {
        let output = run_json(Command::Parse {
            url: "https://example.com/grid?query.Age~gt=5&query.Age~lt=65".to_string(),
        });
        assert_eq!(
            output,
            serde_json::json!([
                {"column": "Age", "op": "gt", "value": "5"},
                {"column": "Age", "op": "lt", "value": "65"},
            ])
        );
    }

    #[test]
    fn test_parse_rejects_bad_region() {
        let command = Command::Parse {
            url: "a.b.Age~gt=5".to_string(),
        };
        let config = CodecConfig::new("a.b");
        assert!(execute(&command, &config, &JsonFormatter).is_err());
    }
}
