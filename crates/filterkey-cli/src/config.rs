//! Command line arguments.

use clap::{Parser, Subcommand};
use filterkey_core::config::{DEFAULT_REGION_NAME, DEFAULT_TWO_DIGIT_YEAR_WINDOW};
use filterkey_core::{CodecConfig, JsonType};

use crate::formatter::OutputFormat;

/// Field key and URL filter tool.
#[derive(Debug, Parser)]
#[command(name = "filterkey")]
#[command(version, about = "Encode and decode field keys and URL filters")]
pub struct Args {
    /// Data region prefix of filter parameters.
    #[arg(long, global = true, default_value = DEFAULT_REGION_NAME)]
    pub region: String,

    /// Output format
    #[arg(long, global = true, default_value = "table", value_enum)]
    pub format: OutputFormat,

    /// Year used as "now" when expanding two-digit years. Defaults to the local clock.
    #[arg(long, global = true)]
    pub reference_year: Option<i32>,

    /// Two-digit years more than this many years in the past move forward a century.
    #[arg(long, global = true, default_value_t = DEFAULT_TWO_DIGIT_YEAR_WINDOW)]
    pub year_window: i32,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Field and schema key conversions.
    Key {
        #[command(subcommand)]
        action: KeyAction,
    },

    /// List the filter operators for a value type.
    Types {
        /// boolean, date, float, int or string
        json_type: JsonType,

        /// Include the missing-value indicator operators.
        #[arg(long)]
        mv: bool,
    },

    /// Validate and normalize a filter value.
    Validate {
        /// URL suffix of the operator, e.g. `eq` or `in`.
        suffix: String,

        /// boolean, date, float, int or string
        json_type: JsonType,

        value: String,

        /// Column name used in error messages.
        #[arg(long, default_value = "value")]
        column: String,
    },

    /// Show the filters in a URL or query string.
    Parse { url: String },

    /// Build a query string from JSON filter records. Use `-` for stdin.
    Build { input: String },
}

#[derive(Debug, Subcommand)]
pub enum KeyAction {
    /// Encode name parts into a key.
    Encode {
        /// Build a schema key (`.` separated) instead of a field key.
        #[arg(long)]
        schema: bool,

        #[arg(required = true)]
        parts: Vec<String>,
    },

    /// Decode an encoded key into its parts.
    Decode {
        /// Read a schema key (`.` separated) instead of a field key.
        #[arg(long)]
        schema: bool,

        key: String,
    },
}

impl From<&Args> for CodecConfig {
    fn from(args: &Args) -> Self {
        let config = CodecConfig::new(&args.region).with_two_digit_year_window(args.year_window);
        match args.reference_year {
            Some(year) => config.with_reference_year(year),
            None => config,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_config_from_args() {
        let args = Args::try_parse_from([
            "filterkey",
            "--region",
            "grid",
            "--reference-year",
            "2024",
            "parse",
            "grid.Age~gt=5",
        ])
        .unwrap();
        let config = CodecConfig::from(&args);
        assert_eq!(config.region_name, "grid");
        assert_eq!(config.reference_year, Some(2024));
        assert_eq!(config.two_digit_year_window, 80);
    }

    #[test]
    fn test_defaults() {
        let args = Args::try_parse_from(["filterkey", "types", "int"]).unwrap();
        assert_eq!(args.region, "query");
        assert_eq!(args.format, OutputFormat::Table);
        assert!(matches!(
            args.command,
            Command::Types {
                json_type: JsonType::Int,
                mv: false
            }
        ));
    }

    #[test]
    fn test_rejects_unknown_type() {
        assert!(Args::try_parse_from(["filterkey", "types", "blob"]).is_err());
    }
}
